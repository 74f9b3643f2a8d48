use serde::{Deserialize, Serialize};

use crate::ProductId;

/// Revenue for one month, `/api/orders/getMonthlySumTotal`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRevenue {
    pub period: String,
    pub total: f64,
}

/// Items sold in one month, `/api/orders/getMonthlySumQty`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyQuantity {
    pub period: String,
    pub item_total: i64,
}

/// Orders placed in one month, `/api/orders/orderSummery`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCount {
    pub period: String,
    pub count: i64,
}

/// Chart point, `/api/orders/monthly-selling`. Chronological order is kept as
/// the order service returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySelling {
    pub period: String,
    pub total: f64,
}

/// Sales aggregate for one product as computed by the order service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStat {
    pub product_id: ProductId,
    pub total_quantity: i64,
    pub total_price: f64,
    pub total_discounted_price: f64,
}
