//! Premium handlers
//!
//! The HTTP face of the premium service: body validation, the response
//! document, and a request-scoped span tying the fetches of one calculation
//! together in the logs.

use axum::{body::Bytes, extract::State, Extension, Json};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use crate::app::validate_premium_request;
use crate::auth::Authenticated;
use crate::domain::entities::PremiumBreakdown;
use crate::error::AppError;
use crate::AppState;

/// Response body for POST /premium/calculate
///
/// Amounts serialize as decimal strings so no precision is lost on the wire.
#[derive(Debug, Serialize)]
pub struct PremiumResponse {
    pub base_premium: Decimal,
    pub age_factor: Decimal,
    pub risk_factor: Decimal,
    pub add_ons: Decimal,
    pub region_factor: Decimal,
    pub final_premium: Decimal,
}

impl From<PremiumBreakdown> for PremiumResponse {
    fn from(b: PremiumBreakdown) -> Self {
        Self {
            base_premium: b.base_premium,
            age_factor: b.age_factor,
            risk_factor: b.risk_factor,
            add_ons: b.add_ons_total,
            region_factor: b.region_factor,
            final_premium: b.final_premium,
        }
    }
}

/// POST /premium/calculate
///
/// Body: `{"customer_id": <int>, "policy_id": <int>}`.
/// The body is validated by hand so malformed input gets the same
/// field-keyed 400 document as a missing field.
pub async fn calculate_premium(
    State(state): State<AppState>,
    Extension(principal): Extension<Authenticated>,
    body: Bytes,
) -> Result<Json<PremiumResponse>, AppError> {
    let request = validate_premium_request(&body)?;

    let span = tracing::info_span!(
        "premium",
        request_id = %Uuid::new_v4(),
        subject = %principal.subject,
        customer_id = %request.customer_id,
        policy_id = %request.policy_id,
    );

    let breakdown = state
        .premium_service
        .calculate(request)
        .instrument(span)
        .await?;

    Ok(Json(breakdown.into()))
}
