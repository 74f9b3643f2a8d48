//! Aggregation layer of the admin dashboard.
//! - `upstream`: typed, single-attempt HTTP calls to the order, product and customer services.
//! - `merge`: key-based join of best-seller stats with product info.
//! - `dashboard`: the named aggregate views built from the two.

pub mod dashboard;
pub mod errors;
pub mod merge;
pub mod observability;
pub mod retry;
#[cfg(test)]
pub mod test_support;
pub mod upstream;

pub use dashboard::AdminDashboardService;
pub use errors::{AggregationError, JoinError, UpstreamError};
