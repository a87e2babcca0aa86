//! Authentication
//!
//! - `guard`: stateless bearer token verification
//! - `bearer`: axum middleware that runs the guard on protected routes

pub mod bearer;
pub mod guard;

pub use bearer::auth_middleware;
pub use guard::{AccessGuard, Authenticated};
