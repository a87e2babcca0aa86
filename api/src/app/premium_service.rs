//! Premium service
//!
//! Resolves the records a premium depends on and runs the calculator.
//!
//! A calculation moves through two fetch stages:
//! 1. customer and policy, concurrently
//! 2. the customer's region and coverage selections, concurrently
//!
//! Stage 2 needs the customer record, so it starts only after stage 1 has
//! fully succeeded. Every fetch is bounded by the request deadline.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{timeout_at, Instant};

use super::fan_in::{join_all_ranked, join_ranked};
use crate::domain::calculator;
use crate::domain::entities::{
    CoverageId, CoverageRecord, CustomerId, Dependency, PremiumBreakdown, PremiumRequest,
};
use crate::domain::ports::{CoverageClient, CustomerClient, PolicyClient, RegionClient};
use crate::error::{AppError, CalculationError, UpstreamError};

/// Service for calculating premiums
pub struct PremiumService<PC, CC, RC, VC>
where
    PC: PolicyClient,
    CC: CustomerClient,
    RC: RegionClient,
    VC: CoverageClient,
{
    policies: Arc<PC>,
    customers: Arc<CC>,
    regions: Arc<RC>,
    coverages: Arc<VC>,
    request_deadline: Duration,
}

impl<PC, CC, RC, VC> PremiumService<PC, CC, RC, VC>
where
    PC: PolicyClient,
    CC: CustomerClient,
    RC: RegionClient,
    VC: CoverageClient,
{
    pub fn new(
        policies: Arc<PC>,
        customers: Arc<CC>,
        regions: Arc<RC>,
        coverages: Arc<VC>,
        request_deadline: Duration,
    ) -> Self {
        Self {
            policies,
            customers,
            regions,
            coverages,
            request_deadline,
        }
    }

    /// Calculate the premium for a validated request
    pub async fn calculate(&self, request: PremiumRequest) -> Result<PremiumBreakdown, AppError> {
        let result = self.resolve_and_compute(request).await;

        match &result {
            Ok(breakdown) => {
                tracing::info!(final_premium = %breakdown.final_premium, "Premium calculated")
            }
            Err(e) => tracing::info!(error = %e, "Premium calculation failed"),
        }

        result
    }

    async fn resolve_and_compute(
        &self,
        request: PremiumRequest,
    ) -> Result<PremiumBreakdown, AppError> {
        let deadline = Instant::now() + self.request_deadline;

        let (customer, policy) = join_ranked(
            bounded(
                deadline,
                Dependency::Customer,
                request.customer_id,
                self.customers.fetch_customer(request.customer_id),
            ),
            bounded(
                deadline,
                Dependency::Policy,
                request.policy_id,
                self.policies.fetch_policy(request.policy_id),
            ),
        )
        .await?;
        tracing::debug!(region = %customer.region, "Customer and policy resolved");

        let (region, coverages) = join_ranked(
            bounded(
                deadline,
                Dependency::Region,
                &customer.region,
                self.regions.fetch_region(&customer.region),
            ),
            self.fetch_selected_coverages(deadline, customer.id),
        )
        .await?;
        tracing::debug!(coverages = coverages.len(), "Region and coverages resolved");

        let add_ons_total = calculator::add_ons_total(&coverages).map_err(corrupt)?;

        calculator::compute(
            policy.base_premium,
            customer.age,
            customer.smoker,
            customer.has_illness,
            region.multiplier,
            add_ons_total,
        )
        .map_err(corrupt)
    }

    async fn fetch_selected_coverages(
        &self,
        deadline: Instant,
        customer_id: CustomerId,
    ) -> Result<Vec<CoverageRecord>, AppError> {
        let selected = match timeout_at(
            deadline,
            self.coverages.fetch_coverage_selections(customer_id),
        )
        .await
        {
            Ok(Ok(ids)) => ids,
            // The coverage store keeps no selection set for this customer
            Ok(Err(UpstreamError::NotFound)) => Vec::new(),
            Ok(Err(e)) => return Err(AppError::from_upstream(Dependency::Coverage, customer_id, e)),
            Err(_) => return Err(AppError::deadline_exceeded(Dependency::Coverage)),
        };

        let mut seen = HashSet::new();
        let ids: Vec<CoverageId> = selected.into_iter().filter(|id| seen.insert(*id)).collect();

        join_all_ranked(ids.into_iter().map(|id| {
            bounded(
                deadline,
                Dependency::Coverage,
                id,
                self.coverages.fetch_coverage(id),
            )
        }))
        .await
    }
}

/// Await one fetch under the request deadline and type its failure
async fn bounded<T, F>(
    deadline: Instant,
    entity: Dependency,
    id: impl ToString,
    fetch: F,
) -> Result<T, AppError>
where
    F: Future<Output = Result<T, UpstreamError>>,
{
    match timeout_at(deadline, fetch).await {
        Ok(Ok(record)) => Ok(record),
        Ok(Err(e)) => Err(AppError::from_upstream(entity, id.to_string(), e)),
        Err(_) => Err(AppError::deadline_exceeded(entity)),
    }
}

/// Attribute a calculator rejection to the record the bad value came from
fn corrupt(source: CalculationError) -> AppError {
    let entity = match source.field() {
        "base_premium" => Dependency::Policy,
        "age" => Dependency::Customer,
        "multiplier" => Dependency::Region,
        _ => Dependency::Coverage,
    };
    AppError::UpstreamDataCorrupt { entity, source }
}
