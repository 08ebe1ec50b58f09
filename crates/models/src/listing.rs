use serde::{Deserialize, Serialize};

/// A service listing owned by a vendor, as returned by the listing directory.
///
/// The same shape annotates every aggregated review with its origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub category_name: String,
}

impl Listing {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, category_name: impl Into<String>) -> Self {
        Self { id: id.into(), display_name: display_name.into(), category_name: category_name.into() }
    }
}
