//! Customer record
//!
//! Read-only view of a customer profile owned by the customer store.

use serde::{Deserialize, Serialize};

/// Identifier of a customer in the customer store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub i64);

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A customer as returned by `GET /customers/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: CustomerId,
    #[serde(default)]
    pub name: String,
    /// Signed so that a corrupt upstream value reaches the calculator
    /// instead of failing deserialization.
    pub age: i64,
    pub smoker: bool,
    pub has_illness: bool,
    /// Name of the region whose multiplier applies
    pub region: String,
}
