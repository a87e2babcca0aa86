//! Policy record
//!
//! Read-only view of a policy owned by the policy store.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier of a policy in the policy store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyId(pub i64);

impl std::fmt::Display for PolicyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A policy as returned by `GET /policies/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRecord {
    pub id: PolicyId,
    #[serde(default)]
    pub name: String,
    /// Premium before any adjustment. Expected to be non-negative.
    pub base_premium: Decimal,
}
