use std::{future::Future, net::SocketAddr, sync::Arc};

use axum::Router;
use configs::AppConfig;
use service::{
    merge::JoinOptions,
    retry::RetryPolicy,
    upstream::{FanoutClient, HttpTransport},
    AdminDashboardService,
};
use tokio::task::{JoinError, JoinHandle};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, DashboardState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Wire the fan-out client and the dashboard service from configuration.
pub fn build_state(cfg: &AppConfig) -> anyhow::Result<DashboardState> {
    let transport = HttpTransport::from_config(&cfg.upstreams)?;
    let client = FanoutClient::new(Arc::new(transport)).with_retry(RetryPolicy::from_config(&cfg.retry));
    let dashboard = AdminDashboardService::new(Arc::new(client)).with_join_options(JoinOptions::from(&cfg.join));
    Ok(DashboardState::new(dashboard))
}

pub fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let state = build_state(cfg)?;
    Ok(routes::build_router(state, build_cors()))
}

/// Public entry: build the app and run the HTTP server until it fails.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg)?;

    let addr: SocketAddr = cfg.server.bind_addr().parse()?;
    info!(
        %addr,
        order = %cfg.upstreams.order_url,
        product = %cfg.upstreams.product_url,
        customer = %cfg.upstreams.customer_url,
        request_timeout_secs = cfg.upstreams.request_timeout_secs,
        retry = cfg.retry.enabled,
        missing_match = ?cfg.join.missing_match,
        "starting admin dashboard server"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// How a supervised server task ended.
#[derive(Debug)]
pub enum Exit {
    Stopped,
    Failed(anyhow::Error),
    Crashed(JoinError),
    /// The shutdown signal fired and the task was aborted.
    Shutdown,
}

/// Wait for the server task or the shutdown signal, whichever comes first.
pub async fn supervise<F>(mut task: JoinHandle<anyhow::Result<()>>, shutdown: F) -> Exit
where
    F: Future<Output = ()>,
{
    tokio::select! {
        res = &mut task => match res {
            Ok(Ok(())) => Exit::Stopped,
            Ok(Err(e)) => Exit::Failed(e),
            Err(e) => Exit::Crashed(e),
        },
        _ = shutdown => {
            // 主动中止服务任务，放弃进行中的上游调用
            task.abort();
            let _ = task.await;
            Exit::Shutdown
        }
    }
}
