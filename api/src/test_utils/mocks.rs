//! Mock implementations of port traits
//!
//! In-memory record store clients that can be configured for testing.
//! Each one can be told to fail, to answer slowly, and counts its calls so
//! tests can verify which fetches actually happened.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::domain::entities::{
    CoverageId, CoverageRecord, CustomerId, CustomerRecord, PolicyId, PolicyRecord, RegionRecord,
};
use crate::domain::ports::{CoverageClient, CustomerClient, PolicyClient, RegionClient};
use crate::error::UpstreamError;

// ============================================================================
// Shared call behaviour
// ============================================================================

#[derive(Default)]
struct Behaviour {
    failure: RwLock<Option<UpstreamError>>,
    delay: RwLock<Option<Duration>>,
    calls: AtomicUsize,
}

impl Behaviour {
    /// Count the call, wait out the delay, then apply the configured failure
    async fn enter(&self) -> Result<(), UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.read().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.failure.read().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

// ============================================================================
// In-Memory Policy Client
// ============================================================================

#[derive(Default)]
pub struct InMemoryPolicyClient {
    policies: Arc<RwLock<HashMap<PolicyId, PolicyRecord>>>,
    behaviour: Behaviour,
}

impl InMemoryPolicyClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(self, policy: PolicyRecord) -> Self {
        self.policies.write().unwrap().insert(policy.id, policy);
        self
    }

    pub fn failing_with(self, err: UpstreamError) -> Self {
        *self.behaviour.failure.write().unwrap() = Some(err);
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        *self.behaviour.delay.write().unwrap() = Some(delay);
        self
    }
}

#[async_trait]
impl PolicyClient for InMemoryPolicyClient {
    async fn fetch_policy(&self, id: PolicyId) -> Result<PolicyRecord, UpstreamError> {
        self.behaviour.enter().await?;
        let policies = self.policies.read().unwrap();
        policies.get(&id).cloned().ok_or(UpstreamError::NotFound)
    }
}

// ============================================================================
// In-Memory Customer Client
// ============================================================================

#[derive(Default)]
pub struct InMemoryCustomerClient {
    customers: Arc<RwLock<HashMap<CustomerId, CustomerRecord>>>,
    behaviour: Behaviour,
}

impl InMemoryCustomerClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_customer(self, customer: CustomerRecord) -> Self {
        self.customers
            .write()
            .unwrap()
            .insert(customer.id, customer);
        self
    }

    pub fn failing_with(self, err: UpstreamError) -> Self {
        *self.behaviour.failure.write().unwrap() = Some(err);
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        *self.behaviour.delay.write().unwrap() = Some(delay);
        self
    }
}

#[async_trait]
impl CustomerClient for InMemoryCustomerClient {
    async fn fetch_customer(&self, id: CustomerId) -> Result<CustomerRecord, UpstreamError> {
        self.behaviour.enter().await?;
        let customers = self.customers.read().unwrap();
        customers.get(&id).cloned().ok_or(UpstreamError::NotFound)
    }
}

// ============================================================================
// In-Memory Region Client
// ============================================================================

#[derive(Default)]
pub struct InMemoryRegionClient {
    regions: Arc<RwLock<HashMap<String, RegionRecord>>>,
    behaviour: Behaviour,
}

impl InMemoryRegionClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(self, region: RegionRecord) -> Self {
        self.regions
            .write()
            .unwrap()
            .insert(region.name.clone(), region);
        self
    }

    pub fn failing_with(self, err: UpstreamError) -> Self {
        *self.behaviour.failure.write().unwrap() = Some(err);
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        *self.behaviour.delay.write().unwrap() = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.behaviour.calls()
    }
}

#[async_trait]
impl RegionClient for InMemoryRegionClient {
    async fn fetch_region(&self, name: &str) -> Result<RegionRecord, UpstreamError> {
        self.behaviour.enter().await?;
        let regions = self.regions.read().unwrap();
        regions.get(name).cloned().ok_or(UpstreamError::NotFound)
    }
}

// ============================================================================
// In-Memory Coverage Client
// ============================================================================

#[derive(Default)]
pub struct InMemoryCoverageClient {
    coverages: Arc<RwLock<HashMap<CoverageId, CoverageRecord>>>,
    selections: Arc<RwLock<HashMap<CustomerId, Vec<CoverageId>>>>,
    coverage_failures: Arc<RwLock<HashMap<CoverageId, UpstreamError>>>,
    coverage_delays: Arc<RwLock<HashMap<CoverageId, Duration>>>,
    selection_behaviour: Behaviour,
    coverage_calls: AtomicUsize,
}

impl InMemoryCoverageClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_coverage(self, coverage: CoverageRecord) -> Self {
        self.coverages
            .write()
            .unwrap()
            .insert(coverage.id, coverage);
        self
    }

    /// Record that `customer_id` selected `coverage_id`
    pub fn with_selection(self, customer_id: i64, coverage_id: i64) -> Self {
        self.selections
            .write()
            .unwrap()
            .entry(CustomerId(customer_id))
            .or_default()
            .push(CoverageId(coverage_id));
        self
    }

    pub fn failing_selections(self, err: UpstreamError) -> Self {
        *self.selection_behaviour.failure.write().unwrap() = Some(err);
        self
    }

    pub fn failing_coverage(self, id: i64, err: UpstreamError) -> Self {
        self.coverage_failures
            .write()
            .unwrap()
            .insert(CoverageId(id), err);
        self
    }

    pub fn with_coverage_delay(self, id: i64, delay: Duration) -> Self {
        self.coverage_delays
            .write()
            .unwrap()
            .insert(CoverageId(id), delay);
        self
    }

    pub fn selection_calls(&self) -> usize {
        self.selection_behaviour.calls()
    }

    pub fn coverage_calls(&self) -> usize {
        self.coverage_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CoverageClient for InMemoryCoverageClient {
    async fn fetch_coverage_selections(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<CoverageId>, UpstreamError> {
        self.selection_behaviour.enter().await?;
        let selections = self.selections.read().unwrap();
        Ok(selections.get(&customer_id).cloned().unwrap_or_default())
    }

    async fn fetch_coverage(&self, id: CoverageId) -> Result<CoverageRecord, UpstreamError> {
        self.coverage_calls.fetch_add(1, Ordering::SeqCst);

        let delay = self.coverage_delays.read().unwrap().get(&id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self.coverage_failures.read().unwrap().get(&id).cloned();
        if let Some(err) = failure {
            return Err(err);
        }

        let coverages = self.coverages.read().unwrap();
        coverages.get(&id).cloned().ok_or(UpstreamError::NotFound)
    }
}
