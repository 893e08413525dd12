use std::{
    future::Future,
    io,
    net::SocketAddr,
    path::Path,
};

use anyhow::Context;
use axum::{
    extract::Request,
    http::{header, HeaderName, HeaderValue, Method, StatusCode, Uri, Version},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Local};
use percent_encoding::percent_decode_str;
use tower_http::services::ServeDir;

use crate::{
    conf::Conf,
    mime,
    types::{ErrorResponse, ValidationResult},
    usage,
};


pub const API_PREFIX: &str = "/api/";

/// Attached to every response, whichever handler produced it.
pub const FIXED_HEADERS: [(HeaderName, &str); 9] = [
    (header::X_FRAME_OPTIONS, "DENY"),
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_XSS_PROTECTION, "1; mode=block"),
    (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
    (header::PRAGMA, "no-cache"),
    (header::EXPIRES, "0"),
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"),
    (
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        "Content-Type, Authorization",
    ),
];

#[derive(Debug)]
pub struct ApiError(StatusCode, Json<ErrorResponse>);

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        ApiError(
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(error.to_string())),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let ApiError(status, body) = self;
        (status, body).into_response()
    }
}

#[tracing::instrument(name = "server", skip_all)]
pub async fn run(conf: &Conf) -> anyhow::Result<()> {
    let addr = SocketAddr::from((conf.addr, conf.port));
    tracing::info!(?conf, "Starting.");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(?addr, "Listening.");
    serve(listener, &conf.root, shutdown_signal()).await
}

pub async fn serve<F>(
    listener: tokio::net::TcpListener,
    root: &Path,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(root))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server failed")?;
    tracing::info!("Stopped.");
    Ok(())
}

/// Whether `error` was caused by the port being taken.
#[must_use]
pub fn is_addr_in_use(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause
            .downcast_ref::<io::Error>()
            .is_some_and(|e| e.kind() == io::ErrorKind::AddrInUse)
    })
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(?error, "Failed to listen for Ctrl+C.");
        std::future::pending::<()>().await;
    }
}

pub fn router(root: &Path) -> Router {
    let files = Router::new()
        .fallback_service(ServeDir::new(root))
        .layer(middleware::from_fn(override_content_type));
    Router::new()
        .route(API_PREFIX, get(handle_api))
        .route("/api/*endpoint", get(handle_api))
        .fallback_service(files)
        .layer(middleware::from_fn(preflight))
        .layer(middleware::from_fn(access_log))
        .layer(middleware::from_fn(finalize_headers))
        .layer(middleware::from_fn({
            |req, next: Next| REQ_ID.scope(ReqId::new(), next.run(req))
        }))
}

#[tracing::instrument(skip_all, fields(req_id = REQ_ID.get().req_id))]
async fn handle_api(uri: Uri) -> Result<Response, ApiError> {
    mock_api(uri.path(), uri.query().unwrap_or_default())
}

/// Canned responses for everything under [`API_PREFIX`]. The query is
/// accepted but no endpoint looks at it.
pub fn mock_api(path: &str, query: &str) -> Result<Response, ApiError> {
    tracing::debug!(path, query, "Handling mock API request.");
    let resp = match path {
        "/api/validate" => Json(ValidationResult::accepted()).into_response(),
        "/api/usage" => {
            let report = usage::generate_now().inspect_err(|error| {
                tracing::error!(?error, "Failed to generate mock usage.");
            })?;
            Json(report).into_response()
        }
        _ => {
            tracing::warn!(path, "Unknown mock endpoint.");
            // Still a 200.
            Json(ErrorResponse::new("Endpoint not found")).into_response()
        }
    };
    Ok(resp)
}

async fn preflight(req: Request, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    next.run(req).await
}

async fn override_content_type(req: Request, next: Next) -> Response {
    // ServeDir opens the decoded path, so match on that too.
    let forced = percent_decode_str(req.uri().path())
        .decode_utf8()
        .ok()
        .and_then(|path| mime::override_for(&path));
    let mut resp = next.run(req).await;
    if let Some(mime) = forced {
        if resp.status().is_success() {
            resp.headers_mut()
                .insert(header::CONTENT_TYPE, HeaderValue::from_static(mime));
        }
    }
    resp
}

async fn finalize_headers(req: Request, next: Next) -> Response {
    let mut resp = next.run(req).await;
    let headers = resp.headers_mut();
    for (name, value) in FIXED_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
    resp
}

async fn access_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let version = req.version();
    let resp = next.run(req).await;
    let status = resp.status();
    tracing::debug!(
        req_id = %REQ_ID.get().req_id,
        %method,
        %uri,
        %status,
        "Handled."
    );
    println!(
        "{}",
        access_line(Local::now(), &method, &uri, version, status)
    );
    resp
}

/// `[YYYY-MM-DD HH:MM:SS] "GET /path HTTP/1.1" 200 -`
pub fn access_line(
    time: DateTime<Local>,
    method: &Method,
    uri: &Uri,
    version: Version,
    status: StatusCode,
) -> String {
    let target = uri
        .path_and_query()
        .map_or_else(|| uri.path(), |pq| pq.as_str());
    format!(
        "[{}] \"{method} {target} {version:?}\" {} -",
        time.format("%Y-%m-%d %H:%M:%S"),
        status.as_u16()
    )
}

#[derive(Debug, Clone)]
struct ReqId {
    pub req_id: String,
}

impl ReqId {
    fn new() -> Self {
        let req_id = cuid2::create_id();
        Self { req_id }
    }
}

tokio::task_local! {
    static REQ_ID: ReqId;
}
