use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::errors::{AggregationError, UpstreamErrorKind};
use tracing::error;

/// JSON error body: `{"error": <title>, "detail": <message>}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub title: &'static str,
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: &'static str, detail: Option<String>) -> Self {
        Self { status, title, detail }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({"error": self.title, "detail": self.detail}))).into_response()
    }
}

impl From<AggregationError> for JsonApiError {
    fn from(e: AggregationError) -> Self {
        error!(error = %e, "aggregate view failed");
        let (status, title) = match &e {
            AggregationError::Upstream(u) if u.kind() == UpstreamErrorKind::Timeout => {
                (StatusCode::GATEWAY_TIMEOUT, "Upstream Timeout")
            }
            AggregationError::Upstream(_) => (StatusCode::BAD_GATEWAY, "Upstream Error"),
            AggregationError::Join(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Join Failed"),
        };
        JsonApiError::new(status, title, Some(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use service::errors::{JoinError, JoinSide, UpstreamError};
    use service::upstream::UpstreamService;

    #[test]
    fn timeout_maps_to_504() {
        let e = AggregationError::Upstream(UpstreamError::Timeout {
            service: UpstreamService::Order,
            path: "/api/orders/best-selling",
            timeout: Duration::from_secs(10),
        });
        assert_eq!(JsonApiError::from(e).status, StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn bad_status_maps_to_502() {
        let e = AggregationError::Upstream(UpstreamError::BadStatus {
            service: UpstreamService::Product,
            path: "/api/product/getInfo",
            code: 404,
        });
        let api = JsonApiError::from(e);
        assert_eq!(api.status, StatusCode::BAD_GATEWAY);
        assert_eq!(api.title, "Upstream Error");
    }

    #[test]
    fn join_ambiguity_maps_to_500() {
        let e = AggregationError::Join(JoinError::KeyAmbiguous { side: JoinSide::Secondary, key: "3".into() });
        assert_eq!(JsonApiError::from(e).status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
