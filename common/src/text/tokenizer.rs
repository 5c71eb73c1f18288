use once_cell::sync::OnceCell;
use tokenizers::Tokenizer as HfTokenizerInner;

/// Token counting abstraction (spec.md §4.C chunker, §4.G budget truncation).
///
/// Kept as a trait rather than a single concrete type so the chunker and
/// the retrieval truncation pass can run against a fast whitespace
/// approximation in tests while production wiring uses the real
/// `tokenizers`-backed model tokenizer.
pub trait Tokenizer: Send + Sync {
    /// Encodes to token ids.
    fn encode(&self, text: &str) -> Vec<u32>;
    /// Decodes token ids back to text.
    fn decode(&self, ids: &[u32]) -> String;
    /// Convenience: token count without materializing the id vector.
    fn count(&self, text: &str) -> usize {
        self.encode(text).len()
    }
}

/// Whitespace-splitting tokenizer used in tests and as a cheap fallback.
/// Ids are indices into the split produced at encode time; decoding
/// therefore only round-trips for text this instance itself encoded, which
/// matches the way it is used: counting and windowing, never persisted ids.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn encode(&self, text: &str) -> Vec<u32> {
        (0..text.split_whitespace().count()).map(|i| i as u32).collect()
    }

    fn decode(&self, ids: &[u32]) -> String {
        ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ")
    }
}

/// Wraps a `tokenizers::Tokenizer` loaded from a HF `tokenizer.json`
/// (spec.md §4.C: chunk boundaries are real model token boundaries, not
/// whitespace splits).
pub struct HfTokenizer {
    inner: HfTokenizerInner,
}

impl HfTokenizer {
    /// Loads a tokenizer definition from a local JSON file.
    pub fn from_file(path: &str) -> Result<Self, crate::error::AppError> {
        let inner = HfTokenizerInner::from_file(path)
            .map_err(|e| crate::error::AppError::Internal(format!("tokenizer load failed: {e}")))?;
        Ok(Self { inner })
    }

    /// Process-wide fallback tokenizer (`bert-base-cased`-style
    /// whitespace+punctuation split is not what we want here, so this lazily
    /// loads from the well-known `cl100k_base`-equivalent bundled path if
    /// configured; callers should prefer [`HfTokenizer::from_file`]).
    pub fn shared(path: &str) -> &'static HfTokenizer {
        static INSTANCE: OnceCell<HfTokenizer> = OnceCell::new();
        INSTANCE.get_or_init(|| {
            HfTokenizer::from_file(path)
                .unwrap_or_else(|_| panic!("failed to load shared tokenizer from {path}"))
        })
    }
}

impl Tokenizer for HfTokenizer {
    fn encode(&self, text: &str) -> Vec<u32> {
        self.inner
            .encode(text, false)
            .map(|enc| enc.get_ids().to_vec())
            .unwrap_or_default()
    }

    fn decode(&self, ids: &[u32]) -> String {
        self.inner.decode(ids, true).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_tokenizer_counts_words() {
        let t = WhitespaceTokenizer;
        assert_eq!(t.count("alex is in tokyo"), 4);
    }
}
