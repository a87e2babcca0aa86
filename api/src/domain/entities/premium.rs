//! Premium request and breakdown
//!
//! `PremiumRequest` is the validated input of a calculation and
//! `PremiumBreakdown` its result. A breakdown has no identity and is never
//! stored; it is rebuilt from the upstream records on every request.

use rust_decimal::Decimal;
use serde::Serialize;

use super::{CustomerId, PolicyId};

/// A validated premium calculation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PremiumRequest {
    pub customer_id: CustomerId,
    pub policy_id: PolicyId,
}

/// Every intermediate factor alongside the final premium
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PremiumBreakdown {
    pub base_premium: Decimal,
    pub age_factor: Decimal,
    pub risk_factor: Decimal,
    pub region_factor: Decimal,
    pub add_ons_total: Decimal,
    pub final_premium: Decimal,
}

/// Upstream record kinds the premium depends on
///
/// Variants are declared in reporting priority: when several fetches of the
/// same stage fail, the one that sorts first is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dependency {
    Customer,
    Policy,
    Region,
    Coverage,
}

impl Dependency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dependency::Customer => "customer",
            Dependency::Policy => "policy",
            Dependency::Region => "region",
            Dependency::Coverage => "coverage",
        }
    }

    /// Capitalized name for human-readable messages
    pub fn title(&self) -> &'static str {
        match self {
            Dependency::Customer => "Customer",
            Dependency::Policy => "Policy",
            Dependency::Region => "Region",
            Dependency::Coverage => "Coverage",
        }
    }
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
