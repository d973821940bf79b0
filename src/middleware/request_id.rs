use std::convert::Infallible;

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, Request},
    http::{request::Parts, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// Header carrying the request id, in both directions
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Identifier attached to every request and echoed in the response
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Reuses a client supplied id when it is a valid UUID
    fn from_header(value: &HeaderValue) -> Option<Self> {
        value
            .to_str()
            .ok()
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .map(Self)
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lets handlers take the id as an argument for their log lines.
///
/// Outside of [`request_id_middleware`] a fresh id is generated, so the
/// extractor never rejects.
#[async_trait]
impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestId>()
            .copied()
            .unwrap_or_default())
    }
}

/// Assigns a request id, stores it in the request extensions and copies it to
/// the `x-request-id` response header.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(RequestId::from_header)
        .unwrap_or_default();

    request.extensions_mut().insert(request_id);

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// Span for `TraceLayer`, tagged with the id assigned by the middleware
pub fn make_span_with_request_id(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(ToString::to_string)
        .unwrap_or_else(|| "unknown".to_string());

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Router};
    use axum_test::TestServer;

    async fn echo(request_id: RequestId) -> String {
        request_id.to_string()
    }

    fn server() -> TestServer {
        let app = Router::new()
            .route("/echo", get(echo))
            .layer(axum::middleware::from_fn(request_id_middleware));
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_generates_id_and_exposes_it_to_handlers() {
        let response = server().get("/echo").await;

        let header = response.header(REQUEST_ID_HEADER);
        let header = header.to_str().unwrap();
        assert!(Uuid::parse_str(header).is_ok());
        assert_eq!(response.text(), header);
    }

    #[tokio::test]
    async fn test_reuses_valid_client_id() {
        let id = "6f1c1a52-8f0e-4a47-9a8b-3f1f4cf1d2aa";
        let response = server()
            .get("/echo")
            .add_header(
                axum::http::HeaderName::from_static(REQUEST_ID_HEADER),
                HeaderValue::from_static(id),
            )
            .await;

        assert_eq!(response.header(REQUEST_ID_HEADER), id);
        assert_eq!(response.text(), id);
    }

    #[tokio::test]
    async fn test_replaces_malformed_client_id() {
        let response = server()
            .get("/echo")
            .add_header(
                axum::http::HeaderName::from_static(REQUEST_ID_HEADER),
                HeaderValue::from_static("not-a-uuid"),
            )
            .await;

        let header = response.header(REQUEST_ID_HEADER);
        assert_ne!(header, "not-a-uuid");
        assert!(Uuid::parse_str(header.to_str().unwrap()).is_ok());
    }

    #[test]
    fn test_from_header_trims_whitespace() {
        let value = HeaderValue::from_static(" 6f1c1a52-8f0e-4a47-9a8b-3f1f4cf1d2aa ");
        assert!(RequestId::from_header(&value).is_some());
    }
}
