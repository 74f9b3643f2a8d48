use axum::{http::StatusCode, routing::get, Json, Router};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

pub mod dashboard;

pub use dashboard::DashboardState;

pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

pub async fn metrics() -> (StatusCode, String) {
    match service::observability::encode_metrics() {
        Ok(text) => (StatusCode::OK, text),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics encode error: {e}")),
    }
}

/// Build the full application router: health, metrics and the dashboard views.
pub fn build_router(state: DashboardState, cors: CorsLayer) -> Router {
    let views = Router::new()
        .route("/api/admin/monthly-sum-total", get(dashboard::monthly_sum_total))
        .route("/api/admin/monthly-sum-qty", get(dashboard::monthly_sum_qty))
        .route("/api/admin/order-summary", get(dashboard::order_summary))
        .route("/api/admin/monthly-selling", get(dashboard::monthly_selling))
        .route("/api/admin/total-customers", get(dashboard::total_customers))
        .route("/api/admin/best-selling", get(dashboard::best_selling))
        .route("/api/admin/overview", get(dashboard::overview))
        .with_state(state);

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .merge(views)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // 响应返回时打点，包含状态码与耗时
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx 以 ERROR 记录
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
