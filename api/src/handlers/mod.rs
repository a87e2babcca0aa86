//! HTTP handlers
//!
//! Axum request handlers for the API endpoints.

pub mod premium;

pub use premium::calculate_premium;
