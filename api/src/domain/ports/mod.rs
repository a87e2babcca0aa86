//! Domain ports (traits)
//!
//! Port traits define interfaces that the domain layer requires.
//! Adapters provide concrete implementations of these traits.

pub mod record_stores;

pub use record_stores::{CoverageClient, CustomerClient, PolicyClient, RegionClient};
