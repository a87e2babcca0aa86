//! Record store client implementations

use async_trait::async_trait;
use serde::Deserialize;
use urlencoding::encode;

use super::http::RecordStoreHttp;
use crate::domain::entities::{
    CoverageId, CoverageRecord, CustomerId, CustomerRecord, PolicyId, PolicyRecord, RegionRecord,
};
use crate::domain::ports::{CoverageClient, CustomerClient, PolicyClient, RegionClient};
use crate::error::UpstreamError;

/// Policy store over HTTP
pub struct HttpPolicyClient {
    store: RecordStoreHttp,
}

impl HttpPolicyClient {
    pub fn new(store: RecordStoreHttp) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PolicyClient for HttpPolicyClient {
    async fn fetch_policy(&self, id: PolicyId) -> Result<PolicyRecord, UpstreamError> {
        self.store.get_json(&format!("/policies/{}", id)).await
    }
}

/// Customer store over HTTP
pub struct HttpCustomerClient {
    store: RecordStoreHttp,
}

impl HttpCustomerClient {
    pub fn new(store: RecordStoreHttp) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CustomerClient for HttpCustomerClient {
    async fn fetch_customer(&self, id: CustomerId) -> Result<CustomerRecord, UpstreamError> {
        self.store.get_json(&format!("/customers/{}", id)).await
    }
}

/// Region table over HTTP
pub struct HttpRegionClient {
    store: RecordStoreHttp,
}

impl HttpRegionClient {
    pub fn new(store: RecordStoreHttp) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RegionClient for HttpRegionClient {
    async fn fetch_region(&self, name: &str) -> Result<RegionRecord, UpstreamError> {
        self.store
            .get_json(&format!("/regions/{}", encode(name)))
            .await
    }
}

/// Coverage catalog over HTTP
pub struct HttpCoverageClient {
    store: RecordStoreHttp,
}

impl HttpCoverageClient {
    pub fn new(store: RecordStoreHttp) -> Self {
        Self { store }
    }
}

/// One entry of `GET /customers/{id}/coverages/`
#[derive(Deserialize)]
struct SelectionResponse {
    coverage_id: CoverageId,
}

/// Upper bound on followed `next` links, so a store that keeps handing out
/// links cannot hold a calculation forever
const MAX_SELECTION_PAGES: usize = 50;

/// The listing is either a bare array or a paginated envelope
#[derive(Deserialize)]
#[serde(untagged)]
enum SelectionListResponse {
    Plain(Vec<SelectionResponse>),
    Paginated {
        results: Vec<SelectionResponse>,
        #[serde(default)]
        next: Option<String>,
    },
}

impl SelectionListResponse {
    /// Split into this page's coverage IDs and the link to the next page
    fn into_page(self) -> (Vec<CoverageId>, Option<String>) {
        let (items, next) = match self {
            SelectionListResponse::Plain(items) => (items, None),
            SelectionListResponse::Paginated { results, next } => (results, next),
        };
        let ids = items.into_iter().map(|s| s.coverage_id).collect();
        (ids, next.filter(|link| !link.is_empty()))
    }
}

#[async_trait]
impl CoverageClient for HttpCoverageClient {
    async fn fetch_coverage_selections(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<CoverageId>, UpstreamError> {
        let first: SelectionListResponse = self
            .store
            .get_json(&format!("/customers/{}/coverages/", customer_id))
            .await?;
        let (mut selected, mut next) = first.into_page();
        let mut pages = 1;

        while let Some(link) = next {
            if pages >= MAX_SELECTION_PAGES {
                return Err(UpstreamError::InvalidResponse(format!(
                    "selection listing for customer {} exceeds {} pages",
                    customer_id, MAX_SELECTION_PAGES
                )));
            }

            // Stores normally return absolute links; a bare path is resolved against the base URL
            let page: SelectionListResponse = if link.starts_with('/') {
                self.store.get_json(&link).await
            } else {
                self.store.get_json_url(&link).await
            }
            .map_err(|e| match e {
                // The listing exists, so a missing later page is a broken link, not "no selections"
                UpstreamError::NotFound => {
                    UpstreamError::InvalidResponse(format!("selection page {} not found", link))
                }
                other => other,
            })?;
            pages += 1;

            let (ids, link) = page.into_page();
            selected.extend(ids);
            next = link;
        }

        tracing::debug!(customer_id = %customer_id, pages, selections = selected.len(), "Coverage selections listed");
        Ok(selected)
    }

    async fn fetch_coverage(&self, id: CoverageId) -> Result<CoverageRecord, UpstreamError> {
        self.store.get_json(&format!("/coverages/{}", id)).await
    }
}
