use std::sync::Arc;

use axum::{extract::State, Json};
use models::{
    CompositeBestSeller, DashboardOverview, MonthlyQuantity, MonthlyRevenue, MonthlySelling, OrderCount,
};
use service::AdminDashboardService;
use tracing::info;

use crate::errors::JsonApiError;

#[derive(Clone)]
pub struct DashboardState {
    pub dashboard: Arc<AdminDashboardService>,
}

impl DashboardState {
    pub fn new(dashboard: AdminDashboardService) -> Self {
        Self { dashboard: Arc::new(dashboard) }
    }
}

// Each handler awaits its view directly: if the caller disconnects, axum drops
// the future and the outstanding upstream calls with it.

pub async fn monthly_sum_total(State(state): State<DashboardState>) -> Result<Json<Vec<MonthlyRevenue>>, JsonApiError> {
    Ok(Json(state.dashboard.monthly_sum_total().await?))
}

pub async fn monthly_sum_qty(State(state): State<DashboardState>) -> Result<Json<Vec<MonthlyQuantity>>, JsonApiError> {
    Ok(Json(state.dashboard.monthly_sum_qty().await?))
}

pub async fn order_summary(State(state): State<DashboardState>) -> Result<Json<Vec<OrderCount>>, JsonApiError> {
    Ok(Json(state.dashboard.order_summary().await?))
}

pub async fn monthly_selling(State(state): State<DashboardState>) -> Result<Json<Vec<MonthlySelling>>, JsonApiError> {
    Ok(Json(state.dashboard.monthly_selling().await?))
}

pub async fn total_customers(State(state): State<DashboardState>) -> Result<Json<i64>, JsonApiError> {
    Ok(Json(state.dashboard.total_customers().await?))
}

pub async fn best_selling(State(state): State<DashboardState>) -> Result<Json<Vec<CompositeBestSeller>>, JsonApiError> {
    let rows = state.dashboard.best_selling_products().await?;
    info!(count = rows.len(), "best selling products");
    Ok(Json(rows))
}

pub async fn overview(State(state): State<DashboardState>) -> Result<Json<DashboardOverview>, JsonApiError> {
    Ok(Json(state.dashboard.dashboard_overview().await?))
}
