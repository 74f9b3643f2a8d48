//! Outbound calls to the order, product and customer services.
//!
//! [`Endpoint`] names a fixed upstream contract, [`UpstreamTransport`] moves
//! bytes, and [`FanoutClient`] turns one endpoint call into a typed value or a
//! typed [`UpstreamError`](crate::errors::UpstreamError).

pub mod client;
pub mod endpoints;
pub mod transport;

pub use client::FanoutClient;
pub use endpoints::{Endpoint, HttpMethod};
pub use transport::{HttpTransport, UpstreamBaseUrls, UpstreamRequest, UpstreamTransport};

use std::fmt;

/// Logical name of an upstream service. Host and port come from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamService {
    Order,
    Product,
    Customer,
}

impl UpstreamService {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamService::Order => "order",
            UpstreamService::Product => "product",
            UpstreamService::Customer => "customer",
        }
    }
}

impl fmt::Display for UpstreamService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} service", self.as_str())
    }
}
