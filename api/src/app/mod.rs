//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services coordinate between domain entities, ports, and the calculator.

pub mod fan_in;
pub mod premium_service;
pub mod request_validation;

pub use premium_service::PremiumService;
pub use request_validation::validate_premium_request;
