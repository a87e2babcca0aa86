//! Record store port traits
//!
//! One client per upstream record store. Every call is a read and resolves to
//! the record or an [`UpstreamError`] saying why it could not be produced.
//! Implementations are provided by adapters (e.g., HTTP).

use async_trait::async_trait;

use crate::domain::entities::{
    CoverageId, CoverageRecord, CustomerId, CustomerRecord, PolicyId, PolicyRecord, RegionRecord,
};
use crate::error::UpstreamError;

/// Client for the policy store
#[async_trait]
pub trait PolicyClient: Send + Sync {
    /// Fetch a policy by ID
    async fn fetch_policy(&self, id: PolicyId) -> Result<PolicyRecord, UpstreamError>;
}

/// Client for the customer store
#[async_trait]
pub trait CustomerClient: Send + Sync {
    /// Fetch a customer by ID
    async fn fetch_customer(&self, id: CustomerId) -> Result<CustomerRecord, UpstreamError>;
}

/// Client for the region multiplier table
#[async_trait]
pub trait RegionClient: Send + Sync {
    /// Fetch a region by its unique name
    async fn fetch_region(&self, name: &str) -> Result<RegionRecord, UpstreamError>;
}

/// Client for the add-on coverage catalog
#[async_trait]
pub trait CoverageClient: Send + Sync {
    /// IDs of the coverages a customer selected, in store order
    async fn fetch_coverage_selections(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<CoverageId>, UpstreamError>;

    /// Fetch a coverage by ID
    async fn fetch_coverage(&self, id: CoverageId) -> Result<CoverageRecord, UpstreamError>;
}
