//! Axum request handlers for all responder endpoints.
//!
//! Handlers are stateless: each one maps the request to a fixed response.

use axum::{
    extract::Query,
    http::{header, StatusCode, Uri, Version},
    response::{IntoResponse, Response},
    Json,
};
use common::{
    error::require_major_version,
    protocol::{greeting, ErrorResponse, HELLO_BODY, REQUIRED_MAJOR_VERSION, ROOT_HTML},
    ServiceError,
};
use tracing::{debug, warn};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// `/` — the static HTML landing page, for any method.
pub async fn root() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html")],
        ROOT_HTML,
    )
        .into_response()
}

/// `/api/hello` — JSON greeting, only over HTTP/2.
///
/// Any other negotiated protocol version gets `505 HTTP Version Not Supported`
/// with a plain-text body. The connection itself stays usable.
pub async fn api_hello(version: Version) -> Response {
    if let Err(e) = require_major_version(version, REQUIRED_MAJOR_VERSION) {
        warn!(negotiated = ?version, "rejecting request over unsupported protocol version");
        return service_error(e);
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        HELLO_BODY,
    )
        .into_response()
}

/// `/hello?name=<name>` — plain-text greeting, `World` by default.
///
/// Query pairs are read raw so a repeated `name` key is not a rejection: the
/// first occurrence wins.
pub async fn hello(Query(pairs): Query<Vec<(String, String)>>) -> Response {
    let name = pairs
        .iter()
        .find(|(key, _)| key == "name")
        .map(|(_, value)| value.as_str());
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, TEXT_PLAIN)],
        greeting(name),
    )
        .into_response()
}

/// `/health` — liveness check.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, [(header::CONTENT_TYPE, TEXT_PLAIN)], "OK")
}

/// Catch-all 404 handler.
pub async fn not_found(uri: Uri) -> Response {
    debug!(path = uri.path(), "no route");
    service_error(ServiceError::NotFound(uri.path().to_owned()))
}

/// Render a [`ServiceError`] with its mapped status.
fn service_error(err: ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    match &err {
        ServiceError::ProtocolMismatch { .. } => {
            (status, [(header::CONTENT_TYPE, TEXT_PLAIN)], err.to_string()).into_response()
        }
        ServiceError::NotFound(_) => {
            let body = ErrorResponse::new("not_found", "the requested resource does not exist");
            (status, Json(body)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get, Router};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_router() -> Router {
        Router::new()
            .route("/", get(root))
            .route("/api/hello", get(api_hello))
            .route("/hello", get(hello))
            .fallback(not_found)
    }

    async fn body_string(resp: Response) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn content_type(resp: &Response) -> &str {
        resp.headers()[header::CONTENT_TYPE].to_str().unwrap()
    }

    #[tokio::test]
    async fn root_serves_html() {
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let resp = test_router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(content_type(&resp), "text/html");
        assert_eq!(body_string(resp).await, ROOT_HTML);
    }

    #[tokio::test]
    async fn api_hello_over_http2_returns_json() {
        let req = Request::builder()
            .uri("/api/hello")
            .version(Version::HTTP_2)
            .body(Body::empty())
            .unwrap();
        let resp = test_router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(content_type(&resp), "application/json");
        assert_eq!(body_string(resp).await, r#"{"message": "Hello, HTTP/2!"}"#);
    }

    #[tokio::test]
    async fn api_hello_rejects_every_other_version() {
        for version in [
            Version::HTTP_09,
            Version::HTTP_10,
            Version::HTTP_11,
            Version::HTTP_3,
        ] {
            let req = Request::builder()
                .uri("/api/hello")
                .version(version)
                .body(Body::empty())
                .unwrap();
            let resp = test_router().oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::HTTP_VERSION_NOT_SUPPORTED, "{version:?}");
            assert!(content_type(&resp).starts_with("text/plain"));
            assert_eq!(body_string(resp).await, "Only HTTP/2 is supported");
        }
    }

    async fn hello_body(uri: &str) -> String {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = test_router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        body_string(resp).await
    }

    #[tokio::test]
    async fn hello_takes_first_of_repeated_names() {
        assert_eq!(hello_body("/hello?name=a&name=b").await, "Hello, a!");
        assert_eq!(hello_body("/hello?lang=en&name=b&name=a").await, "Hello, b!");
    }

    #[tokio::test]
    async fn hello_keeps_padding_in_names() {
        assert_eq!(hello_body("/hello?name=%20Bob%20").await, "Hello,  Bob !");
        assert_eq!(hello_body("/hello?name=+").await, "Hello,  !");
    }

    #[tokio::test]
    async fn hello_without_name_greets_world() {
        assert_eq!(hello_body("/hello").await, "Hello, World!");
        assert_eq!(hello_body("/hello?name=").await, "Hello, World!");
        assert_eq!(hello_body("/hello?other=x").await, "Hello, World!");
    }

    #[tokio::test]
    async fn unknown_path_is_json_404() {
        let req = Request::builder().uri("/unknown").body(Body::empty()).unwrap();
        let resp = test_router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: ErrorResponse = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(body.code, "not_found");
    }
}
