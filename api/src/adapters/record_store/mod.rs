//! Record store adapter
//!
//! HTTP implementations of the record store ports.

pub mod clients;
pub mod http;

pub use clients::{HttpCoverageClient, HttpCustomerClient, HttpPolicyClient, HttpRegionClient};
pub use http::RecordStoreHttp;
