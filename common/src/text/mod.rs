//! Tokenizer & text utilities (spec.md §4.B / §4.C): token counting,
//! normalization, and the delimiter/separator constants shared by the
//! record parser, chunker, and merge engine.

mod normalize;
mod tokenizer;

pub use normalize::{first_json_object, normalize_comma, parse_strength, standardize_entity_name};
pub use tokenizer::{HfTokenizer, Tokenizer, WhitespaceTokenizer};

/// Tuple field delimiter inside one record (spec.md §4.B / §6).
pub const TUPLE_DELIM: &str = "<|>";
/// Record delimiter between records in one LLM completion (spec.md §4.B / §6).
pub const RECORD_DELIM: &str = "##";
/// Marks the end of a delimited LLM completion (spec.md §4.B / §6).
pub const COMPLETE_DELIM: &str = "<|COMPLETE|>";
/// Reserved separator joining description/source_id/file_path fragments
/// inside a stored string (spec.md §3 / §6). Must never appear in raw input;
/// `standardize_entity_name`/chunk content never introduce it.
pub const GRAPH_FIELD_SEP: &str = "<SEP>";

/// Upper bound on vector-store payload content, enforced before every
/// upsert (spec.md §4.A/§8: "Vector-store content never exceeds 65,000
/// characters").
pub const MAX_VECTOR_CONTENT_CHARS: usize = 65_000;

/// Truncates `content` to at most [`MAX_VECTOR_CONTENT_CHARS`] characters,
/// cutting on a char boundary.
pub fn truncate_vector_content(content: &str) -> String {
    if content.chars().count() <= MAX_VECTOR_CONTENT_CHARS {
        content.to_string()
    } else {
        content.chars().take(MAX_VECTOR_CONTENT_CHARS).collect()
    }
}

/// Joins non-empty fragments with [`GRAPH_FIELD_SEP`], skipping duplicates
/// while preserving first-seen order — the "union via reserved separator"
/// operation spec.md §4.E names for entity/edge merge.
pub fn union_fragments<'a>(existing: &str, incoming: impl IntoIterator<Item = &'a str>) -> String {
    let mut seen: Vec<&str> = existing.split(GRAPH_FIELD_SEP).filter(|s| !s.is_empty()).collect();
    for frag in incoming {
        if frag.is_empty() {
            continue;
        }
        if !seen.contains(&frag) {
            seen.push(frag);
        }
    }
    seen.join(GRAPH_FIELD_SEP)
}

/// Comma-split, set-unioned, sorted keyword list (spec.md §4.E edge merge).
pub fn union_keywords<'a>(existing: &str, incoming: impl IntoIterator<Item = &'a str>) -> String {
    let mut set: std::collections::BTreeSet<String> = existing
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect();
    for kw in incoming {
        let kw = kw.trim();
        if !kw.is_empty() {
            set.insert(kw.to_owned());
        }
    }
    set.into_iter().collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_fragments_dedupes_preserving_order() {
        let merged = union_fragments("a<SEP>b", ["b", "c"]);
        assert_eq!(merged, "a<SEP>b<SEP>c");
    }

    #[test]
    fn union_keywords_sorts_and_dedupes() {
        let merged = union_keywords("b, a", ["c", "a"]);
        assert_eq!(merged, "a,b,c");
    }

    #[test]
    fn truncate_vector_content_caps_at_max_chars() {
        let long = "a".repeat(MAX_VECTOR_CONTENT_CHARS + 500);
        let truncated = truncate_vector_content(&long);
        assert_eq!(truncated.chars().count(), MAX_VECTOR_CONTENT_CHARS);
    }

    #[test]
    fn truncate_vector_content_leaves_short_content_untouched() {
        assert_eq!(truncate_vector_content("short"), "short");
    }
}
