use std::time::Duration;

use thiserror::Error;

use crate::upstream::UpstreamService;

/// Failure of a single outbound call. Each variant is a distinct condition so
/// callers never confuse "upstream broken" with "upstream had no data".
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UpstreamError {
    #[error("{service} unreachable on {path}: {reason}")]
    Unreachable { service: UpstreamService, path: &'static str, reason: String },
    #[error("{service} answered {path} with HTTP {code}")]
    BadStatus { service: UpstreamService, path: &'static str, code: u16 },
    #[error("{service} sent a malformed body for {path}: {reason}")]
    MalformedResponse { service: UpstreamService, path: &'static str, reason: String },
    #[error("{service} did not answer {path} within {timeout:?}")]
    Timeout { service: UpstreamService, path: &'static str, timeout: Duration },
    #[error("request body for {service} {path} could not be encoded: {reason}")]
    InvalidRequest { service: UpstreamService, path: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamErrorKind {
    Unreachable,
    BadStatus,
    MalformedResponse,
    Timeout,
    InvalidRequest,
}

impl UpstreamErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unreachable => "unreachable",
            Self::BadStatus => "bad_status",
            Self::MalformedResponse => "malformed_response",
            Self::Timeout => "timeout",
            Self::InvalidRequest => "invalid_request",
        }
    }
}

impl UpstreamError {
    pub fn kind(&self) -> UpstreamErrorKind {
        match self {
            Self::Unreachable { .. } => UpstreamErrorKind::Unreachable,
            Self::BadStatus { .. } => UpstreamErrorKind::BadStatus,
            Self::MalformedResponse { .. } => UpstreamErrorKind::MalformedResponse,
            Self::Timeout { .. } => UpstreamErrorKind::Timeout,
            Self::InvalidRequest { .. } => UpstreamErrorKind::InvalidRequest,
        }
    }

    pub fn service(&self) -> UpstreamService {
        match self {
            Self::Unreachable { service, .. }
            | Self::BadStatus { service, .. }
            | Self::MalformedResponse { service, .. }
            | Self::Timeout { service, .. }
            | Self::InvalidRequest { service, .. } => *service,
        }
    }

    /// Transport-level failures and 5xx answers may succeed on a second try;
    /// a 4xx or an unreadable body will not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Unreachable { .. } | Self::Timeout { .. } => true,
            Self::BadStatus { code, .. } => *code >= 500,
            Self::MalformedResponse { .. } | Self::InvalidRequest { .. } => false,
        }
    }
}

/// Which input of a join carried the offending key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinSide {
    Primary,
    Secondary,
}

impl std::fmt::Display for JoinSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JoinSide::Primary => f.write_str("primary"),
            JoinSide::Secondary => f.write_str("secondary"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    /// Only raised when strict key uniqueness is requested.
    #[error("join key {key} appears more than once in the {side} sequence")]
    KeyAmbiguous { side: JoinSide, key: String },
}

/// Error of a whole aggregate view. There is no partial result: the first
/// failing step aborts the view.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AggregationError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error(transparent)]
    Join(#[from] JoinError),
}

impl AggregationError {
    pub fn upstream(&self) -> Option<&UpstreamError> {
        match self {
            AggregationError::Upstream(e) => Some(e),
            AggregationError::Join(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        let svc = UpstreamService::Order;
        let path = "/api/orders/best-selling";
        assert!(UpstreamError::Timeout { service: svc, path, timeout: Duration::from_secs(1) }.is_retryable());
        assert!(UpstreamError::BadStatus { service: svc, path, code: 503 }.is_retryable());
        assert!(!UpstreamError::BadStatus { service: svc, path, code: 404 }.is_retryable());
        assert!(!UpstreamError::MalformedResponse { service: svc, path, reason: "eof".into() }.is_retryable());
    }

    #[test]
    fn display_names_service_and_path() {
        let e = UpstreamError::BadStatus { service: UpstreamService::Product, path: "/api/product/getInfo", code: 500 };
        assert_eq!(e.to_string(), "product service answered /api/product/getInfo with HTTP 500");
        assert_eq!(e.kind().as_str(), "bad_status");
    }
}
