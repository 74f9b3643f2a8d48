//! Request-scoped DTOs exchanged with the order, product and customer services.
//!
//! Nothing here is persisted: values are decoded from an upstream response,
//! reshaped by the aggregation layer and dropped once the response is written.

pub mod best_seller;
pub mod product;
pub mod sales;

pub use best_seller::{CompositeBestSeller, DashboardOverview};
pub use product::ProductInfo;
pub use sales::{MonthlyQuantity, MonthlyRevenue, MonthlySelling, OrderCount, ProductStat};

/// Integer product identifier shared by the order and product services.
pub type ProductId = i32;
