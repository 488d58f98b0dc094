//! Request pipeline: panic recovery, CORS, timeouts and request logging.

use std::any::Any;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::{ConnectInfo, Request},
    http::{HeaderMap, HeaderName, Method, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    timeout::{RequestBodyTimeoutLayer, TimeoutLayer},
};
use tracing::{Level, error, info, warn};

use crate::domain::{AppError, ErrorResponse};

/// Logged bodies are cut at this many bytes
pub const MAX_LOGGED_BODY: usize = 10 * 1024;

/// Upper bound on a request body buffered for logging
const MAX_BUFFERED_BODY: usize = 2 * 1024 * 1024;

const REQUEST_SENSITIVE_PATHS: &[&str] = &["/login", "/register", "/users", "/auth", "/password"];
const RESPONSE_SENSITIVE_PATHS: &[&str] = &["/users", "/profile", "/auth"];
const MEDIA_CONTENT_TYPES: &[&str] = &[
    "image/",
    "video/",
    "audio/",
    "application/pdf",
    "application/zip",
    "application/octet-stream",
];

/// Time limits applied by the pipeline
#[derive(Debug, Clone, Copy)]
pub struct PipelineTimeouts {
    /// Limit on receiving the request body
    pub read: Duration,
    /// Limit on producing the response
    pub write: Duration,
}

impl Default for PipelineTimeouts {
    fn default() -> Self {
        Self {
            read: Duration::from_secs(10),
            write: Duration::from_secs(10),
        }
    }
}

/// Wrap a router in the full request pipeline.
///
/// Layers from the outside in: panic recovery, CORS, timeouts, request
/// logging.
pub fn apply_pipeline(router: Router, timeouts: PipelineTimeouts) -> Router {
    router
        .layer(middleware::from_fn(log_requests))
        .layer(RequestBodyTimeoutLayer::new(timeouts.read))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeouts.write,
        ))
        .layer(cors_layer())
        .layer(CatchPanicLayer::custom(handle_panic))
}

/// Permissive CORS policy for browser clients
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::CONTENT_LENGTH,
            header::ACCEPT_ENCODING,
            HeaderName::from_static("x-csrf-token"),
            header::AUTHORIZATION,
        ])
        .expose_headers([header::CONTENT_LENGTH])
        .max_age(Duration::from_secs(12 * 60 * 60))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };
    error!(panic = %detail, "Recovered from panic in request handler");

    let body = ErrorResponse {
        code: "INTERNAL_ERROR".to_string(),
        message: "An unexpected error occurred".to_string(),
        details: None,
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

/// Structured access log with optional request and response bodies
pub async fn log_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let query = request.uri().query().unwrap_or_default().to_string();
    let user_agent = header_str(request.headers(), header::USER_AGENT).to_string();
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_default();
    let body_loggable = !is_media(header_str(request.headers(), header::CONTENT_TYPE));

    let (request, request_body) = if body_loggable && !is_request_sensitive(&path) {
        let (parts, body) = request.into_parts();
        let bytes = match axum::body::to_bytes(body, MAX_BUFFERED_BODY).await {
            Ok(bytes) => bytes,
            Err(e) => {
                return AppError::invalid_input("Failed to read request body")
                    .with_source(e)
                    .into_response();
            }
        };
        let logged = truncate_body(&bytes);
        (Request::from_parts(parts, Body::from(bytes)), logged)
    } else {
        (request, None)
    };

    let response = next.run(request).await;

    let status = response.status();
    let response_loggable = body_loggable
        && !is_response_sensitive(&path)
        && !is_media(header_str(response.headers(), header::CONTENT_TYPE));

    let (response, response_body) = if response_loggable {
        let (parts, body) = response.into_parts();
        match axum::body::to_bytes(body, usize::MAX).await {
            Ok(bytes) => {
                let logged = truncate_body(&bytes);
                (Response::from_parts(parts, Body::from(bytes)), logged)
            }
            Err(e) => {
                error!(error = %e, "Failed to buffer response body");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        }
    } else {
        (response, None)
    };

    let duration_ms = start.elapsed().as_millis() as u64;
    let request_body = request_body.unwrap_or_default();
    let response_body = response_body.unwrap_or_default();

    macro_rules! access_log {
        ($level:ident) => {
            $level!(
                client_ip = %client_ip,
                method = %method,
                path = %path,
                query = %query,
                status = status.as_u16(),
                duration_ms,
                user_agent = %user_agent,
                request_body = %request_body,
                response_body = %response_body,
                "HTTP Request"
            )
        };
    }

    let level = log_level(status);
    if level == Level::ERROR {
        access_log!(error);
    } else if level == Level::WARN {
        access_log!(warn);
    } else {
        access_log!(info);
    }

    response
}

fn header_str(headers: &HeaderMap, name: HeaderName) -> &str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn log_level(status: StatusCode) -> Level {
    if status.is_server_error() {
        Level::ERROR
    } else if status.is_client_error() {
        Level::WARN
    } else {
        Level::INFO
    }
}

fn is_request_sensitive(path: &str) -> bool {
    REQUEST_SENSITIVE_PATHS.iter().any(|p| path.contains(p))
}

fn is_response_sensitive(path: &str) -> bool {
    RESPONSE_SENSITIVE_PATHS.iter().any(|p| path.contains(p))
}

fn is_media(content_type: &str) -> bool {
    MEDIA_CONTENT_TYPES.iter().any(|m| content_type.contains(m))
}

/// Render a body for the log, `None` when empty
fn truncate_body(bytes: &Bytes) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }
    if bytes.len() > MAX_LOGGED_BODY {
        let head = String::from_utf8_lossy(&bytes[..MAX_LOGGED_BODY]);
        return Some(format!("{head}...(truncated)"));
    }
    Some(String::from_utf8_lossy(bytes).into_owned())
}
