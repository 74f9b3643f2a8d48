use std::time::Duration;

use async_trait::async_trait;
use configs::UpstreamsConfig;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

use super::{Endpoint, UpstreamService};
use crate::errors::UpstreamError;

/// One outbound call, body already encoded as JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    pub endpoint: Endpoint,
    pub body: Option<Vec<u8>>,
}

/// Moves a request to an upstream and returns the raw 2xx body.
///
/// Implementations classify failures into `Unreachable`, `BadStatus` and
/// `Timeout`; decoding the body is left to [`FanoutClient`](super::FanoutClient).
#[async_trait]
pub trait UpstreamTransport: Send + Sync {
    async fn send(&self, request: &UpstreamRequest) -> Result<Vec<u8>, UpstreamError>;
}

/// Base URL (scheme, host, port) per upstream service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamBaseUrls {
    pub order: String,
    pub product: String,
    pub customer: String,
}

impl UpstreamBaseUrls {
    pub fn for_service(&self, service: UpstreamService) -> &str {
        match service {
            UpstreamService::Order => &self.order,
            UpstreamService::Product => &self.product,
            UpstreamService::Customer => &self.customer,
        }
    }
}

/// `reqwest`-backed transport. Holds one connection pool for every upstream
/// and is cheap to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_urls: UpstreamBaseUrls,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl HttpTransport {
    pub fn new(
        base_urls: UpstreamBaseUrls,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()?;
        Ok(Self { http, base_urls, connect_timeout, request_timeout })
    }

    pub fn from_config(cfg: &UpstreamsConfig) -> anyhow::Result<Self> {
        let base_urls = UpstreamBaseUrls {
            order: cfg.order_url.clone(),
            product: cfg.product_url.clone(),
            customer: cfg.customer_url.clone(),
        };
        Self::new(base_urls, cfg.connect_timeout(), cfg.request_timeout())
    }

    pub fn url_for(&self, endpoint: &Endpoint) -> String {
        format!("{}{}", self.base_urls.for_service(endpoint.service), endpoint.path)
    }

    /// 连接阶段超时报告 connect_timeout，其余报告整次请求的 request_timeout
    fn expired_limit(&self, during_connect: bool) -> Duration {
        if during_connect {
            self.connect_timeout
        } else {
            self.request_timeout
        }
    }

    fn classify(&self, endpoint: &Endpoint, err: reqwest::Error) -> UpstreamError {
        let service = endpoint.service;
        let path = endpoint.path;
        if err.is_timeout() {
            UpstreamError::Timeout { service, path, timeout: self.expired_limit(err.is_connect()) }
        } else if err.is_decode() {
            UpstreamError::MalformedResponse { service, path, reason: err.to_string() }
        } else {
            UpstreamError::Unreachable { service, path, reason: err.to_string() }
        }
    }
}

#[async_trait]
impl UpstreamTransport for HttpTransport {
    async fn send(&self, request: &UpstreamRequest) -> Result<Vec<u8>, UpstreamError> {
        let endpoint = request.endpoint;
        let mut builder = self
            .http
            .request(endpoint.method.into(), self.url_for(&endpoint))
            .header(ACCEPT, "application/json");
        if let Some(body) = &request.body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body.clone());
        }

        let resp = builder.send().await.map_err(|e| self.classify(&endpoint, e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(UpstreamError::BadStatus {
                service: endpoint.service,
                path: endpoint.path,
                code: status.as_u16(),
            });
        }
        let body = resp.bytes().await.map_err(|e| self.classify(&endpoint, e))?;
        Ok(body.to_vec())
    }
}
