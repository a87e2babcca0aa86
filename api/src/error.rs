//! Unified error types for the premium API
//!
//! This module defines error types for each layer:
//! - `UpstreamError`: a single record store call that did not return a record
//! - `CalculationError`: a resolved record violates a calculator invariant
//! - `AuthError`: bearer credential rejected by the access guard
//! - `AppError`: the typed failures a calculation can end in, rendered as HTTP responses

use std::collections::BTreeMap;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::domain::entities::Dependency;

/// Field name mapped to every reason that field was rejected
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Key used for errors that concern the request body as a whole
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Record store call errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    #[error("record not found")]
    NotFound,

    #[error("upstream unreachable: {0}")]
    Unreachable(String),

    #[error("upstream timed out")]
    TimedOut,

    #[error("invalid upstream response: {0}")]
    InvalidResponse(String),
}

impl UpstreamError {
    /// Whether a read that failed this way may be attempted again
    pub fn is_transient(&self) -> bool {
        matches!(self, UpstreamError::Unreachable(_) | UpstreamError::TimedOut)
    }
}

/// Premium calculator errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalculationError {
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
}

impl CalculationError {
    /// Name of the calculator input that was rejected
    pub fn field(&self) -> &'static str {
        match self {
            CalculationError::InvalidInput { field, .. } => field,
        }
    }
}

/// Access guard errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authentication credentials were not provided.")]
    MissingCredentials,

    #[error("Token has expired.")]
    Expired,

    #[error("Token is invalid: {0}")]
    InvalidToken(String),
}

impl AuthError {
    /// Message shown to the caller; never includes verifier internals
    fn detail(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "Authentication credentials were not provided.",
            AuthError::Expired => "Token has expired.",
            AuthError::InvalidToken(_) => "Given token not valid for any token type.",
        }
    }
}

/// Generic failure category exposed for an unavailable dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableCategory {
    Timeout,
    Unreachable,
    BadGateway,
}

impl UnavailableCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnavailableCategory::Timeout => "timeout",
            UnavailableCategory::Unreachable => "unreachable",
            UnavailableCategory::BadGateway => "bad_gateway",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            UnavailableCategory::Timeout => StatusCode::GATEWAY_TIMEOUT,
            UnavailableCategory::Unreachable | UnavailableCategory::BadGateway => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

impl std::fmt::Display for UnavailableCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application layer errors - the outcome of a failed calculation
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid request: {0:?}")]
    InvalidRequest(FieldErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(#[from] AuthError),

    #[error("{entity} {id} not found")]
    DependencyNotFound { entity: Dependency, id: String },

    #[error("{entity} unavailable ({category}): {cause}")]
    DependencyUnavailable {
        entity: Dependency,
        category: UnavailableCategory,
        cause: String,
    },

    #[error("corrupt {entity} record: {source}")]
    UpstreamDataCorrupt {
        entity: Dependency,
        #[source]
        source: CalculationError,
    },
}

impl AppError {
    /// Invalid request with a single rejected field
    pub fn invalid_field(field: &str, reason: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![reason.into()]);
        AppError::InvalidRequest(errors)
    }

    /// Map a failed record store call for `entity` keyed by `id`
    pub fn from_upstream(entity: Dependency, id: impl ToString, err: UpstreamError) -> Self {
        let (category, cause) = match err {
            UpstreamError::NotFound => {
                return AppError::DependencyNotFound {
                    entity,
                    id: id.to_string(),
                }
            }
            UpstreamError::TimedOut => (UnavailableCategory::Timeout, "timeout".to_string()),
            UpstreamError::Unreachable(cause) => (UnavailableCategory::Unreachable, cause),
            UpstreamError::InvalidResponse(cause) => (UnavailableCategory::BadGateway, cause),
        };
        AppError::DependencyUnavailable {
            entity,
            category,
            cause,
        }
    }

    /// Deadline for the whole calculation passed while `entity` was in flight
    pub fn deadline_exceeded(entity: Dependency) -> Self {
        AppError::DependencyUnavailable {
            entity,
            category: UnavailableCategory::Timeout,
            cause: "request deadline exceeded".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::InvalidRequest(fields) => {
                (StatusCode::BAD_REQUEST, Json(fields)).into_response()
            }
            AppError::Unauthorized(e) => {
                tracing::debug!(error = %e, "Rejected credentials");
                (
                    StatusCode::UNAUTHORIZED,
                    [(header::WWW_AUTHENTICATE, "Bearer")],
                    Json(json!({ "detail": e.detail() })),
                )
                    .into_response()
            }
            AppError::DependencyNotFound { entity, id } => (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "detail": format!("{} not found.", entity.title()),
                    "entity": entity,
                    "id": id,
                })),
            )
                .into_response(),
            AppError::DependencyUnavailable {
                entity,
                category,
                cause,
            } => {
                tracing::warn!(entity = %entity, category = %category, cause = %cause, "Dependency unavailable");
                (
                    category.status(),
                    Json(json!({
                        "detail": format!("{} service unavailable.", entity.title()),
                        "entity": entity,
                        "category": category,
                    })),
                )
                    .into_response()
            }
            AppError::UpstreamDataCorrupt { entity, source } => {
                tracing::error!(entity = %entity, error = %source, "Upstream data violates premium invariants");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "detail": "Upstream data is invalid.",
                        "entity": entity,
                        "field": source.field(),
                    })),
                )
                    .into_response()
            }
        }
    }
}
