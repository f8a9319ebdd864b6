use axum::http::{HeaderName, request::Parts};
use std::time::{Duration, Instant};
use uuid::Uuid;

pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Default bound for a single business operation.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-router operation timeout, read from request extensions.
///
/// Install with `Router::layer(Extension(RequestTimeout(..)))`; requests
/// without it use [`DEFAULT_REQUEST_TIMEOUT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTimeout(pub Duration);

/// Request-scoped context handed to every business operation.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: String,
    started_at: Instant,
    timeout: Duration,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>, timeout: Duration) -> Self {
        Self {
            request_id: request_id.into(),
            started_at: Instant::now(),
            timeout,
        }
    }

    /// Build from request parts, reusing an incoming `x-request-id`.
    pub fn from_parts(parts: &Parts) -> Self {
        let request_id = parts
            .headers
            .get(&REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| Uuid::now_v7().to_string());

        let timeout = parts
            .extensions
            .get::<RequestTimeout>()
            .map(|t| t.0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        Self::new(request_id, timeout)
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn deadline(&self) -> Instant {
        self.started_at + self.timeout
    }

    /// Time left before the deadline, zero once it has passed.
    pub fn remaining(&self) -> Duration {
        self.deadline().saturating_duration_since(Instant::now())
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new(Uuid::now_v7().to_string(), DEFAULT_REQUEST_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[test]
    fn test_reuses_incoming_request_id() {
        let (parts, _) = Request::builder()
            .header("x-request-id", "abc-123")
            .body(())
            .unwrap()
            .into_parts();

        let ctx = RequestContext::from_parts(&parts);
        assert_eq!(ctx.request_id(), "abc-123");
        assert_eq!(ctx.timeout(), DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn test_generates_request_id_and_reads_timeout() {
        let mut request = Request::builder().body(()).unwrap();
        request
            .extensions_mut()
            .insert(RequestTimeout(Duration::from_secs(3)));
        let (parts, _) = request.into_parts();

        let ctx = RequestContext::from_parts(&parts);
        assert!(Uuid::parse_str(ctx.request_id()).is_ok());
        assert_eq!(ctx.timeout(), Duration::from_secs(3));
        assert!(ctx.remaining() <= Duration::from_secs(3));
    }

    #[test]
    fn test_remaining_is_zero_past_deadline() {
        let ctx = RequestContext::new("late", Duration::ZERO);
        assert!(ctx.deadline() <= Instant::now());
        assert_eq!(ctx.remaining(), Duration::ZERO);
    }
}
