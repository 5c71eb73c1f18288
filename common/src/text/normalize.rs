/// Trims surrounding quotes/whitespace and collapses internal whitespace,
/// the normalization every entity/relation name goes through before an id
/// is derived from it (spec.md §4.B, §6).
pub fn standardize_entity_name(name: &str) -> String {
    let trimmed = name.trim().trim_matches(|c| c == '"' || c == '\'');
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase()
}

/// Parses a relationship strength field, defaulting to `1.0` on anything
/// that doesn't parse as a float (spec.md §4.B edge cases: malformed
/// numeric fields never abort extraction).
pub fn parse_strength(raw: &str) -> f32 {
    raw.trim().parse::<f32>().unwrap_or(1.0)
}

/// Normalizes a comma/semicolon separated keyword list: trims each entry,
/// drops empties, rejoins with `, ` (spec.md §4.F keyword post-processing).
pub fn normalize_comma(raw: &str) -> String {
    raw.split(|c| c == ',' || c == ';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Scans `text` for the first balanced `{ ... }` object, tolerating the
/// common LLM habit of wrapping JSON in prose or markdown fences
/// (spec.md §4.F / §4.H: keyword and prompt-assembly responses are
/// extracted this way rather than requiring a strict-JSON completion).
///
/// Braces inside string literals are ignored for balance purposes so a
/// `}` in a quoted value doesn't terminate the scan early.
pub fn first_json_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = text.find('{')?;
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return text.get(start..=offset);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standardize_trims_and_upcases() {
        assert_eq!(standardize_entity_name("  \"alex chen\"  "), "ALEX CHEN");
    }

    #[test]
    fn parse_strength_defaults_on_garbage() {
        assert_eq!(parse_strength("not-a-number"), 1.0);
        assert_eq!(parse_strength("0.7"), 0.7);
    }

    #[test]
    fn first_json_object_skips_prose_and_braces_in_strings() {
        let text = r#"Sure, here you go: {"a": "b{c}d", "n": 1} and some trailing text"#;
        let obj = first_json_object(text).expect("should find object");
        assert_eq!(obj, r#"{"a": "b{c}d", "n": 1}"#);
    }

    #[test]
    fn first_json_object_none_when_unbalanced() {
        assert_eq!(first_json_object("no braces here"), None);
    }
}
