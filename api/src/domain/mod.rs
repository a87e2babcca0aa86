//! Domain layer
//!
//! Contains pure business logic with no external dependencies.
//! - `entities`: upstream records and premium types
//! - `ports`: trait definitions for the record stores
//! - `calculator`: the premium formula

pub mod calculator;
pub mod entities;
pub mod ports;
