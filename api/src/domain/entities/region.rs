//! Region multiplier record

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A region as returned by `GET /regions/{name}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRecord {
    /// Unique region name, also the lookup key
    pub name: String,
    /// Expected to be strictly positive
    pub multiplier: Decimal,
}
