use serde::{Deserialize, Serialize};

/// Result of a geocoder lookup (spec.md §6 Geocoder collaborator), fields
/// verbatim from the spec's external-interface contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeoResult {
    pub lieu: String,
    pub pays: String,
    pub code_pays: String,
    pub region: String,
    pub province: String,
    pub departement: String,
    pub commune: String,
    pub latitude: f64,
    pub longitude: f64,
    pub osm_type: String,
    pub importance: f64,
}
