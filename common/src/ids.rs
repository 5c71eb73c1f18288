//! Identifier formats (spec.md §6): content-addressed IDs for every derived
//! record kind, all `<prefix>-<md5(seed)>`.

fn md5_hex(seed: &str) -> String {
    format!("{:x}", md5::compute(seed.as_bytes()))
}

/// `ent-<md5(entity_name)>`
pub fn entity_id(entity_name: &str) -> String {
    format!("ent-{}", md5_hex(entity_name))
}

/// `rel-<md5(src+tgt)>`. Endpoints are taken in the caller-supplied order;
/// callers that want the undirected canonical key should sort first via
/// [`crate::model::edge::EdgeKey`].
pub fn edge_id(src: &str, tgt: &str) -> String {
    format!("rel-{}", md5_hex(&format!("{src}{tgt}")))
}

/// `assoc-<md5("::".join(sorted(entities)))>`
pub fn association_id(entities: &[String]) -> String {
    let mut sorted = entities.to_vec();
    sorted.sort();
    format!("assoc-{}", md5_hex(&sorted.join("::")))
}

/// `mh-<md5("->".join(entities))>` — order-preserving, the path order matters.
pub fn multi_hop_id(entities: &[String]) -> String {
    format!("mh-{}", md5_hex(&entities.join("->")))
}

/// `chunk-<md5(content)>`
pub fn chunk_id(content: &str) -> String {
    format!("chunk-{}", md5_hex(content))
}

/// Content-addressed cache key: `hash(mode, input, cache_type)`.
pub fn cache_key(mode: &str, input: &str, cache_type: &str) -> String {
    md5_hex(&format!("{mode}|{input}|{cache_type}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_is_stable() {
        assert_eq!(entity_id("Alex"), entity_id("Alex"));
        assert_ne!(entity_id("Alex"), entity_id("Taylor"));
    }

    #[test]
    fn edge_id_is_order_sensitive_but_stable() {
        assert_eq!(edge_id("a", "b"), edge_id("a", "b"));
        assert_ne!(edge_id("a", "b"), edge_id("b", "a"));
    }

    #[test]
    fn association_id_is_order_independent() {
        let a = association_id(&["Alex".into(), "Taylor".into(), "Tokyo".into()]);
        let b = association_id(&["Tokyo".into(), "Alex".into(), "Taylor".into()]);
        assert_eq!(a, b);
    }

    #[test]
    fn multi_hop_id_is_order_dependent() {
        let a = multi_hop_id(&["Alex".into(), "Taylor".into(), "Tokyo".into()]);
        let b = multi_hop_id(&["Tokyo".into(), "Taylor".into(), "Alex".into()]);
        assert_ne!(a, b);
    }
}
