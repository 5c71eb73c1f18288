use serde::{Deserialize, Serialize};

/// Normative 3-tuple keyword extraction output (spec.md §9 Open Question c,
/// resolved in SPEC_FULL.md §4.F): high-level themes drive global-mode
/// retrieval, low-level entities drive local-mode retrieval, and community
/// keywords drive the community-summary layer mix mode consults.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Keywords {
    pub high_level: Vec<String>,
    pub low_level: Vec<String>,
    pub community: Vec<String>,
}

impl Keywords {
    pub fn is_empty(&self) -> bool {
        self.high_level.is_empty() && self.low_level.is_empty() && self.community.is_empty()
    }
}
