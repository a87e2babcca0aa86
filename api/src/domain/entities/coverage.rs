//! Add-on coverage records

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier of an add-on coverage in the coverage store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoverageId(pub i64);

impl std::fmt::Display for CoverageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An add-on coverage as returned by `GET /coverages/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageRecord {
    pub id: CoverageId,
    #[serde(default)]
    pub name: String,
    /// Flat cost added after the multiplicative adjustments
    pub cost: Decimal,
}
