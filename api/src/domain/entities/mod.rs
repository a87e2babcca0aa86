//! Domain entities
//!
//! Read-only views of the upstream records and the premium types built from them.

pub mod coverage;
pub mod customer;
pub mod policy;
pub mod premium;
pub mod region;

pub use coverage::{CoverageId, CoverageRecord};
pub use customer::{CustomerId, CustomerRecord};
pub use policy::{PolicyId, PolicyRecord};
pub use premium::{Dependency, PremiumBreakdown, PremiumRequest};
pub use region::RegionRecord;
