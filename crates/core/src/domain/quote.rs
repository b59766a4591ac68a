use serde::{Deserialize, Serialize};

use crate::domain::variable::VariableMap;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteId(pub String);

impl std::fmt::Display for QuoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The three raw mappings the caller fetches from storage for one quote.
/// Admin settings are organization-wide constants and are never product- or
/// quote-overridable; they travel here explicitly so the engine stays a pure
/// function of its input.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawVariableSet {
    #[serde(default)]
    pub quote: VariableMap,
    #[serde(default)]
    pub products: Vec<VariableMap>,
    #[serde(default)]
    pub admin: VariableMap,
}

impl RawVariableSet {
    pub fn line_count(&self) -> usize {
        self.products.len()
    }
}
