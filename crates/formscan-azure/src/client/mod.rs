//! Shared HTTP client for Azure services.
//!
//! Both adapters talk to key-authenticated Azure endpoints with the same
//! retry and status-mapping behavior; this module holds that common part.

mod az_client;
mod az_config;

pub use az_client::AzClient;
pub use az_config::AzConfig;
pub(crate) use az_client::read_json;
