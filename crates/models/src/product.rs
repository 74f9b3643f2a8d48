use serde::{Deserialize, Serialize};

use crate::ProductId;

/// Descriptive product attributes from `/api/product/getInfo`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInfo {
    pub product_id: ProductId,
    pub name: String,
    pub avg_ratings: f64,
}
