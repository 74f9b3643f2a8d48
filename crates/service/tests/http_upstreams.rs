//! Drives the real `reqwest` transport against fake upstream services bound
//! on an ephemeral local port.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use service::merge::JoinOptions;
use service::upstream::{FanoutClient, HttpTransport, UpstreamBaseUrls, UpstreamService};
use service::{AdminDashboardService, AggregationError, UpstreamError};

#[derive(Clone, Default)]
struct Hits {
    best_selling: Arc<AtomicUsize>,
    product_info: Arc<AtomicUsize>,
}

async fn serve(app: Router) -> anyhow::Result<String> {
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("fake upstream error: {}", e); }
    });
    Ok(format!("http://{}:{}", addr.ip(), addr.port()))
}

fn dashboard(base: &str, request_timeout: Duration) -> anyhow::Result<AdminDashboardService> {
    let transport = HttpTransport::new(
        UpstreamBaseUrls { order: base.to_string(), product: base.to_string(), customer: base.to_string() },
        Duration::from_millis(500),
        request_timeout,
    )?;
    let client = FanoutClient::new(Arc::new(transport));
    Ok(AdminDashboardService::new(Arc::new(client)).with_join_options(JoinOptions::default()))
}

async fn best_selling(State(hits): State<Hits>) -> Json<Value> {
    hits.best_selling.fetch_add(1, Ordering::SeqCst);
    Json(json!([
        {"productId": 1, "totalQuantity": 10, "totalPrice": 100.0, "totalDiscountedPrice": 90.0},
        {"productId": 2, "totalQuantity": 5, "totalPrice": 50.0, "totalDiscountedPrice": 45.0}
    ]))
}

async fn product_info(State(hits): State<Hits>, Json(ids): Json<Vec<i32>>) -> Json<Value> {
    hits.product_info.fetch_add(1, Ordering::SeqCst);
    let known: Vec<Value> = ids
        .into_iter()
        .filter(|id| *id == 2)
        .map(|id| json!({"productId": id, "name": "Widget", "avgRatings": 4.5}))
        .collect();
    Json(Value::Array(known))
}

fn healthy_upstreams(hits: Hits) -> Router {
    Router::new()
        .route("/api/orders/best-selling", get(best_selling))
        .route("/api/product/getInfo", post(product_info))
        .route("/api/customers/total", get(|| async { Json(json!(321)) }))
        .route(
            "/api/orders/monthly-selling",
            get(|| async { Json(json!([{"period": "2024-01", "total": 5.0}, {"period": "2024-02", "total": 7.5}])) }),
        )
        .with_state(hits)
}

#[tokio::test]
async fn best_sellers_over_http() -> anyhow::Result<()> {
    let hits = Hits::default();
    let base = serve(healthy_upstreams(hits.clone())).await?;
    let svc = dashboard(&base, Duration::from_secs(2))?;

    let rows = svc.best_selling_products().await?;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].product_id, 1);
    assert!(rows[0].name.is_none());
    assert_eq!(rows[1].name.as_deref(), Some("Widget"));
    assert_eq!(hits.best_selling.load(Ordering::SeqCst), 1);
    assert_eq!(hits.product_info.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn scalar_and_series_over_http() -> anyhow::Result<()> {
    let base = serve(healthy_upstreams(Hits::default())).await?;
    let svc = dashboard(&base, Duration::from_secs(2))?;

    assert_eq!(svc.total_customers().await?, 321);
    let series = svc.monthly_selling().await?;
    assert_eq!(series.iter().map(|p| p.period.as_str()).collect::<Vec<_>>(), vec!["2024-01", "2024-02"]);
    Ok(())
}

#[tokio::test]
async fn slow_order_service_times_out_without_product_call() -> anyhow::Result<()> {
    let hits = Hits::default();
    let product_hits = hits.clone();
    let app = Router::new()
        .route(
            "/api/orders/best-selling",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(json!([]))
            }),
        )
        .route("/api/product/getInfo", post(product_info))
        .with_state(product_hits);
    let base = serve(app).await?;
    let svc = dashboard(&base, Duration::from_millis(200))?;

    let err = svc.best_selling_products().await.expect_err("timeout");
    match err {
        AggregationError::Upstream(UpstreamError::Timeout { service, path, timeout }) => {
            assert_eq!(service, UpstreamService::Order);
            assert_eq!(path, "/api/orders/best-selling");
            // 连接已建立，超时的是整次请求
            assert_eq!(timeout, Duration::from_millis(200));
        }
        other => panic!("expected timeout, got {other:?}"),
    }
    assert_eq!(hits.product_info.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn non_2xx_is_bad_status() -> anyhow::Result<()> {
    let app = Router::new().route("/api/customers/total", get(|| async { StatusCode::SERVICE_UNAVAILABLE }));
    let base = serve(app).await?;
    let svc = dashboard(&base, Duration::from_secs(2))?;

    let err = svc.total_customers().await.expect_err("503");
    assert!(matches!(
        err,
        AggregationError::Upstream(UpstreamError::BadStatus { code: 503, service: UpstreamService::Customer, .. })
    ));
    Ok(())
}

#[tokio::test]
async fn unexpected_body_is_malformed() -> anyhow::Result<()> {
    let app = Router::new().route("/api/orders/getMonthlySumQty", get(|| async { "<html>oops</html>" }));
    let base = serve(app).await?;
    let svc = dashboard(&base, Duration::from_secs(2))?;

    let err = svc.monthly_sum_qty().await.expect_err("malformed");
    assert!(matches!(err, AggregationError::Upstream(UpstreamError::MalformedResponse { .. })));
    Ok(())
}

#[tokio::test]
async fn closed_port_is_unreachable() -> anyhow::Result<()> {
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr = listener.local_addr()?;
    drop(listener);
    let svc = dashboard(&format!("http://{}", addr), Duration::from_secs(2))?;

    let err = svc.order_summary().await.expect_err("unreachable");
    assert!(matches!(err, AggregationError::Upstream(UpstreamError::Unreachable { .. })));
    Ok(())
}
