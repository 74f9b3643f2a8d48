use serde::{Deserialize, Serialize};

use crate::{MonthlyQuantity, MonthlyRevenue, MonthlySelling, OrderCount, ProductId, ProductInfo, ProductStat};

/// One best-selling product: the order service's measures joined with the
/// product service's name and rating.
///
/// `name` and `avg_ratings` are `None` when the product service had no record
/// for `product_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeBestSeller {
    pub product_id: ProductId,
    pub total_quantity: i64,
    pub total_price: f64,
    pub total_discounted_price: f64,
    pub name: Option<String>,
    pub avg_ratings: Option<f64>,
}

impl CompositeBestSeller {
    pub fn new(stat: &ProductStat, info: Option<&ProductInfo>) -> Self {
        Self {
            product_id: stat.product_id,
            total_quantity: stat.total_quantity,
            total_price: stat.total_price,
            total_discounted_price: stat.total_discounted_price,
            name: info.map(|i| i.name.clone()),
            avg_ratings: info.map(|i| i.avg_ratings),
        }
    }

    pub fn is_matched(&self) -> bool {
        self.name.is_some()
    }
}

/// Every order/customer dashboard view fetched in one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub monthly_sum_total: Vec<MonthlyRevenue>,
    pub monthly_sum_qty: Vec<MonthlyQuantity>,
    pub order_summary: Vec<OrderCount>,
    pub monthly_selling: Vec<MonthlySelling>,
    pub total_customers: i64,
}
