//! Delimited-tuple record parser (spec.md §4.B): turns one raw LLM
//! extraction completion into the typed [`Record`]s it names. Malformed
//! records are logged and dropped rather than failing the whole
//! completion (spec.md §4.B edge cases).

use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    text::{normalize_comma, parse_strength, standardize_entity_name, RECORD_DELIM, TUPLE_DELIM},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub name: String,
    pub entity_type: String,
    pub description: String,
    pub additional_properties: String,
    pub community: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationRecord {
    pub source: String,
    pub target: String,
    pub description: String,
    pub keywords: String,
    pub strength: f32,
    /// `true` for a `latent_relation` record — an inferred, non-explicit
    /// connection (spec.md §3) — kept on the same shape as an explicit
    /// `relationship` since every other field means the same thing.
    pub latent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiHopRecord {
    pub path: Vec<String>,
    pub description: String,
    pub keywords: String,
    pub strength: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationRecord {
    pub entities: Vec<String>,
    pub description: String,
    pub generalization: String,
    pub keywords: String,
    pub strength: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentKeywordsRecord {
    pub high_level_keywords: Vec<String>,
}

/// One parsed record from a delimited extraction completion (spec.md §3,
/// §4.B). `Relation` covers both `relationship` and `latent_relation` tags;
/// the `latent` flag on [`RelationRecord`] distinguishes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Record {
    Entity(EntityRecord),
    Relation(RelationRecord),
    MultiHop(MultiHopRecord),
    Association(AssociationRecord),
    ContentKeywords(ContentKeywordsRecord),
}

/// Splits a raw tuple field list on [`TUPLE_DELIM`], trimming each field
/// and stripping one layer of surrounding `"`/`(`/`)`.
fn split_fields(body: &str) -> Vec<String> {
    body.split(TUPLE_DELIM)
        .map(|f| f.trim().trim_matches(|c| c == '"' || c == '(' || c == ')').to_string())
        .collect()
}

/// Parses a bracketed `[A, B, C]` entity path into its component names,
/// tolerating quoted or bare entries (spec.md §4.B multi-hop path field).
fn parse_path(field: &str) -> Vec<String> {
    field
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(|s| standardize_entity_name(s))
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_one_record(raw: &str) -> Option<Record> {
    let raw = raw.trim();
    let raw = raw.strip_prefix('(').unwrap_or(raw);
    let raw = raw.strip_suffix(')').unwrap_or(raw);
    let fields = split_fields(raw);
    let tag = fields.first()?.to_lowercase();

    match tag.as_str() {
        "entity" if fields.len() >= 6 => Some(Record::Entity(EntityRecord {
            name: standardize_entity_name(&fields[1]),
            entity_type: fields[2].clone(),
            description: fields[3].clone(),
            additional_properties: fields[4].clone(),
            community: fields[5].clone(),
        })),
        "relationship" if fields.len() >= 5 => Some(Record::Relation(RelationRecord {
            source: standardize_entity_name(&fields[1]),
            target: standardize_entity_name(&fields[2]),
            description: fields[3].clone(),
            keywords: normalize_comma(&fields[4]),
            strength: fields.get(5).map(|s| parse_strength(s)).unwrap_or(1.0),
            latent: false,
        })),
        "latent_relation" if fields.len() >= 6 => Some(Record::Relation(RelationRecord {
            source: standardize_entity_name(&fields[1]),
            target: standardize_entity_name(&fields[2]),
            description: fields[3].clone(),
            keywords: normalize_comma(&fields[4]),
            strength: fields.get(5).map(|s| parse_strength(s)).unwrap_or(1.0),
            latent: true,
        })),
        "multi_hop" if fields.len() >= 5 => {
            let path = parse_path(&fields[1]);
            if path.len() < 2 {
                return None;
            }
            Some(Record::MultiHop(MultiHopRecord {
                path,
                description: fields[2].clone(),
                keywords: fields.get(3).map(|s| normalize_comma(s)).unwrap_or_default(),
                strength: fields.get(4).map(|s| parse_strength(s)).unwrap_or(1.0),
            }))
        }
        "association" if fields.len() >= 5 => {
            // Trailing 4 fields are fixed (description, generalization,
            // keywords, strength); everything between the tag and those is
            // the variable-length entity list (spec.md §3 associations).
            let trailing = 4;
            if fields.len() < 1 + 2 + trailing {
                return None;
            }
            let entity_end = fields.len() - trailing;
            let entities: Vec<String> = fields[1..entity_end].iter().map(|e| standardize_entity_name(e)).collect();
            Some(Record::Association(AssociationRecord {
                entities,
                description: fields[entity_end].clone(),
                generalization: fields[entity_end + 1].clone(),
                keywords: normalize_comma(&fields[entity_end + 2]),
                strength: parse_strength(&fields[entity_end + 3]),
            }))
        }
        "content_keywords" if fields.len() >= 2 => Some(Record::ContentKeywords(ContentKeywordsRecord {
            high_level_keywords: fields[1].split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect(),
        })),
        _ => None,
    }
}

/// Splits a raw completion on [`RECORD_DELIM`] and parses each record,
/// logging and skipping anything malformed rather than failing the batch.
pub fn parse_records(completion: &str) -> Vec<Record> {
    let body = completion.split("<|COMPLETE|>").next().unwrap_or(completion);
    body.split(RECORD_DELIM)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|raw| match parse_one_record(raw) {
            Some(record) => Some(record),
            None => {
                AppError::log_dropped_record("parse_records", raw);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_entity_relationship_and_content_keywords() {
        let completion = format!(
            r#"("entity"{t}"Alex"{t}"person"{t}"Alex is a character."{t}"emotion: frustration"{t}"unknown"){r}("relationship"{t}"Alex"{t}"Taylor"{t}"Alex observes Taylor."{t}"power dynamics"{t}7){r}("content_keywords"{t}"power dynamics, discovery"){completion_tag}"#,
            t = TUPLE_DELIM,
            r = RECORD_DELIM,
            completion_tag = "<|COMPLETE|>",
        );
        let records = parse_records(&completion);
        assert_eq!(records.len(), 3);
        assert!(matches!(&records[0], Record::Entity(e) if e.name == "ALEX"));
        assert!(matches!(&records[1], Record::Relation(r) if r.source == "ALEX" && r.target == "TAYLOR" && !r.latent));
        assert!(matches!(&records[2], Record::ContentKeywords(k) if k.high_level_keywords.len() == 2));
    }

    #[test]
    fn parses_multi_hop_path() {
        let completion = format!(
            r#"("multi_hop"{t}["Alex", "Jordan", "The Device"]{t}"shared curiosity path"{t}"curiosity"{t}0.6){completion_tag}"#,
            t = TUPLE_DELIM,
            completion_tag = "<|COMPLETE|>",
        );
        let records = parse_records(&completion);
        assert_eq!(records.len(), 1);
        match &records[0] {
            Record::MultiHop(mh) => assert_eq!(mh.path, vec!["ALEX", "JORDAN", "THE DEVICE"]),
            other => panic!("expected multi-hop record, got {other:?}"),
        }
    }

    #[test]
    fn parses_association_with_variable_entity_count() {
        let completion = format!(
            r#"("Association"{t}"Alex"{t}"Taylor"{t}"Jordan"{t}"The Device"{t}"Linked through shared device interactions."{t}"Team dynamics"{t}"technology curiosity"{t}7){completion_tag}"#,
            t = TUPLE_DELIM,
            completion_tag = "<|COMPLETE|>",
        );
        let records = parse_records(&completion);
        assert_eq!(records.len(), 1);
        match &records[0] {
            Record::Association(a) => {
                assert_eq!(a.entities, vec!["ALEX", "TAYLOR", "JORDAN", "THE DEVICE"]);
                assert_eq!(a.keywords, "technology curiosity");
            }
            other => panic!("expected association record, got {other:?}"),
        }
    }

    #[test]
    fn drops_malformed_record_without_failing_batch() {
        let completion = format!(
            r#"("entity"{t}"only one field"){r}("entity"{t}"Valid"{t}"person"{t}"a valid entity"{t}""{t}"unknown"){completion_tag}"#,
            t = TUPLE_DELIM,
            r = RECORD_DELIM,
            completion_tag = "<|COMPLETE|>",
        );
        let records = parse_records(&completion);
        assert_eq!(records.len(), 1);
        assert!(matches!(&records[0], Record::Entity(e) if e.name == "VALID"));
    }
}
