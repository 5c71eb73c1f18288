//! Token sliding-window chunker (spec.md §4.C).

use crate::text::Tokenizer;

#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    pub max_tokens: usize,
    pub overlap_tokens: usize,
    /// Split on this separator before token-windowing (spec.md §4.C
    /// two-mode behavior, grounded in `original_source`'s
    /// `chunking_by_token_size`). `None` is the pure sliding-window mode.
    pub split_by_character: Option<String>,
    /// When `split_by_character` is set: if `true`, each separator-delimited
    /// fragment is kept whole regardless of size; if `false`, a fragment
    /// longer than `max_tokens` is further token-windowed.
    pub split_by_character_only: bool,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self { max_tokens: 1200, overlap_tokens: 100, split_by_character: None, split_by_character_only: false }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub order: usize,
    pub content: String,
    pub token_count: usize,
}

/// Splits `content` into overlapping, token-bounded windows using
/// `tokenizer` for both the window boundaries and the reported token count
/// (spec.md §4.C: chunk boundaries are real tokenizer boundaries, not
/// whitespace or character splits).
///
/// A window shorter than `max_tokens` at the tail of the document is kept
/// as the final chunk rather than dropped (spec.md §4.C edge case).
pub fn chunk_document(content: &str, tokenizer: &dyn Tokenizer, config: &ChunkerConfig) -> Vec<Chunk> {
    if content.trim().is_empty() {
        return Vec::new();
    }

    let Some(separator) = &config.split_by_character else {
        return sliding_window(content, tokenizer, config, 0);
    };

    let mut chunks = Vec::new();
    for fragment in content.split(separator.as_str()) {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            continue;
        }
        let ids = tokenizer.encode(fragment);
        if ids.is_empty() {
            continue;
        }
        if ids.len() > config.max_tokens && !config.split_by_character_only {
            chunks.extend(sliding_window(fragment, tokenizer, config, chunks.len()));
        } else {
            chunks.push(Chunk { order: chunks.len(), content: fragment.to_string(), token_count: ids.len() });
        }
    }

    chunks
}

fn sliding_window(content: &str, tokenizer: &dyn Tokenizer, config: &ChunkerConfig, order_offset: usize) -> Vec<Chunk> {
    let ids = tokenizer.encode(content);
    if ids.is_empty() {
        return Vec::new();
    }

    let step = config.max_tokens.saturating_sub(config.overlap_tokens).max(1);
    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < ids.len() {
        let end = (start + config.max_tokens).min(ids.len());
        let window = &ids[start..end];
        let text = tokenizer.decode(window);
        chunks.push(Chunk { order: order_offset + chunks.len(), content: text, token_count: window.len() });
        if end == ids.len() {
            break;
        }
        start += step;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::WhitespaceTokenizer;

    #[test]
    fn empty_content_yields_no_chunks() {
        let tokenizer = WhitespaceTokenizer;
        let config = ChunkerConfig::default();
        assert!(chunk_document("   ", &tokenizer, &config).is_empty());
    }

    #[test]
    fn short_document_yields_single_chunk() {
        let tokenizer = WhitespaceTokenizer;
        let config = ChunkerConfig { max_tokens: 50, overlap_tokens: 5, ..ChunkerConfig::default() };
        let chunks = chunk_document("alex is in tokyo with taylor", &tokenizer, &config);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].order, 0);
    }

    #[test]
    fn long_document_produces_overlapping_windows() {
        let tokenizer = WhitespaceTokenizer;
        let words: Vec<String> = (0..100).map(|i| format!("w{i}")).collect();
        let content = words.join(" ");
        let config = ChunkerConfig { max_tokens: 20, overlap_tokens: 5, ..ChunkerConfig::default() };
        let chunks = chunk_document(&content, &tokenizer, &config);
        assert!(chunks.len() > 1);
        for window in chunks.windows(2) {
            assert_eq!(window[1].order, window[0].order + 1);
        }
    }

    #[test]
    fn split_by_character_only_keeps_fragments_whole() {
        let tokenizer = WhitespaceTokenizer;
        let config = ChunkerConfig {
            max_tokens: 3,
            overlap_tokens: 1,
            split_by_character: Some("\n\n".to_string()),
            split_by_character_only: true,
        };
        let content = "alex is in tokyo with taylor and jordan\n\nshort one";
        let chunks = chunk_document(content, &tokenizer, &config);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].content.contains("jordan"), "oversized fragment stays whole under split_by_character_only");
        assert_eq!(chunks[1].content, "short one");
    }

    #[test]
    fn split_by_character_token_windows_oversized_fragments() {
        let tokenizer = WhitespaceTokenizer;
        let config = ChunkerConfig {
            max_tokens: 3,
            overlap_tokens: 1,
            split_by_character: Some("\n\n".to_string()),
            split_by_character_only: false,
        };
        let content = "alex is in tokyo with taylor and jordan\n\nshort one";
        let chunks = chunk_document(content, &tokenizer, &config);
        assert!(chunks.len() > 2, "oversized fragment should be further token-windowed");
        for window in chunks.windows(2) {
            assert_eq!(window[1].order, window[0].order + 1);
        }
    }
}
