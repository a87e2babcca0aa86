//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod record_store;

pub use record_store::{
    HttpCoverageClient, HttpCustomerClient, HttpPolicyClient, HttpRegionClient, RecordStoreHttp,
};
