use std::sync::Arc;
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::{Endpoint, UpstreamRequest, UpstreamTransport};
use crate::errors::UpstreamError;
use crate::observability::{UPSTREAM_DURATION, UPSTREAM_ERRORS_TOTAL, UPSTREAM_REQUESTS_TOTAL};
use crate::retry::{retry_with_policy, RetryPolicy};

/// Typed fan-out client shared by every aggregate view.
///
/// Stateless apart from the transport's connection pool, so one instance
/// behind an `Arc` serves concurrent requests. No caching; one attempt per
/// call unless a retry policy is enabled.
#[derive(Clone)]
pub struct FanoutClient {
    transport: Arc<dyn UpstreamTransport>,
    retry: RetryPolicy,
}

impl FanoutClient {
    pub fn new(transport: Arc<dyn UpstreamTransport>) -> Self {
        Self { transport, retry: RetryPolicy::disabled() }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Call `endpoint` without a body and decode the answer as `T`.
    /// `T` is a `Vec<_>` for sequence endpoints and a scalar otherwise.
    pub async fn fetch<T>(&self, endpoint: Endpoint) -> Result<T, UpstreamError>
    where
        T: DeserializeOwned,
    {
        self.call(UpstreamRequest { endpoint, body: None }).await
    }

    /// Call `endpoint` with `body` encoded as JSON and decode the answer as `T`.
    pub async fn fetch_with_body<B, T>(&self, endpoint: Endpoint, body: &B) -> Result<T, UpstreamError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let encoded = serde_json::to_vec(body).map_err(|e| UpstreamError::InvalidRequest {
            service: endpoint.service,
            path: endpoint.path,
            reason: e.to_string(),
        })?;
        self.call(UpstreamRequest { endpoint, body: Some(encoded) }).await
    }

    async fn call<T>(&self, request: UpstreamRequest) -> Result<T, UpstreamError>
    where
        T: DeserializeOwned,
    {
        let endpoint = request.endpoint;
        let service = endpoint.service.as_str();
        UPSTREAM_REQUESTS_TOTAL.with_label_values(&[service, endpoint.path]).inc();
        let started = Instant::now();

        let result = retry_with_policy(&self.retry, || self.attempt::<T>(&request)).await;

        let elapsed = started.elapsed();
        UPSTREAM_DURATION.with_label_values(&[service]).observe(elapsed.as_secs_f64());
        match &result {
            Ok(_) => debug!(
                service,
                method = endpoint.method.as_str(),
                path = endpoint.path,
                elapsed_ms = elapsed.as_millis() as u64,
                "upstream_call_ok"
            ),
            Err(e) => {
                UPSTREAM_ERRORS_TOTAL.with_label_values(&[service, e.kind().as_str()]).inc();
                warn!(
                    service,
                    method = endpoint.method.as_str(),
                    path = endpoint.path,
                    kind = e.kind().as_str(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "upstream_call_failed"
                );
            }
        }
        result
    }

    async fn attempt<T>(&self, request: &UpstreamRequest) -> Result<T, UpstreamError>
    where
        T: DeserializeOwned,
    {
        let body = self.transport.send(request).await?;
        serde_json::from_slice(&body).map_err(|e| UpstreamError::MalformedResponse {
            service: request.endpoint.service,
            path: request.endpoint.path,
            reason: e.to_string(),
        })
    }
}
