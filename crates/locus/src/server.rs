//! Inbound HTTP endpoint.
//!
//! `POST /upload-photo` takes a capture payload, runs it through the
//! pipeline, and acknowledges with `OK` once delivery has been attempted.
//! Only a body that fails to parse is rejected.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{ConnectInfo, DefaultBodyLimit, OriginalUri, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use locus_core::{
    CaptureEvent, CapturePayload, CoreError, IpLocator, Messenger, Pipeline, RequestMetadata,
    ReverseGeocode,
};

use crate::error::CliError;

pub const UPLOAD_PATH: &str = "/upload-photo";

/// Several camera frames as base64 exceed axum's 2 MB default.
pub const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

const X_FORWARDED_FOR: &str = "x-forwarded-for";

// ── Errors ───────────────────────────────────────────────────────────

/// Rejections returned to the submitter.
#[derive(Debug, Error)]
pub enum RejectError {
    #[error("invalid JSON")]
    InvalidJson(#[source] CoreError),
}

impl IntoResponse for RejectError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::InvalidJson(_) => StatusCode::BAD_REQUEST,
        };
        (status, format!("{self}\n")).into_response()
    }
}

// ── Router ───────────────────────────────────────────────────────────

/// Build the router. Other methods on the upload path get a 405.
pub fn router<I, G, M>(pipeline: Arc<Pipeline<I, G, M>>) -> Router
where
    I: IpLocator + 'static,
    G: ReverseGeocode + 'static,
    M: Messenger + 'static,
{
    Router::new()
        .route(UPLOAD_PATH, post(upload_photo::<I, G, M>))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(pipeline)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve<I, G, M>(addr: SocketAddr, pipeline: Pipeline<I, G, M>) -> Result<(), CliError>
where
    I: IpLocator + 'static,
    G: ReverseGeocode + 'static,
    M: Messenger + 'static,
{
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| CliError::Bind { addr, source })?;
    info!(%addr, path = UPLOAD_PATH, "listening for captures");

    let app = router(Arc::new(pipeline)).into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(CliError::Serve)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "could not install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

// ── Handler ──────────────────────────────────────────────────────────

async fn upload_photo<I, G, M>(
    State(pipeline): State<Arc<Pipeline<I, G, M>>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, RejectError>
where
    I: IpLocator + 'static,
    G: ReverseGeocode + 'static,
    M: Messenger + 'static,
{
    let payload = CapturePayload::from_json(&body).map_err(|e| {
        debug!(%peer, error = %e, "rejecting capture");
        RejectError::InvalidJson(e)
    })?;

    let request = RequestMetadata {
        raw_client_address: client_address(&headers, peer),
        user_agent: header_str(&headers, header::USER_AGENT.as_str()).to_owned(),
        referer: header_str(&headers, header::REFERER.as_str()).to_owned(),
        request_uri: uri
            .path_and_query()
            .map_or_else(|| uri.path().to_owned(), |pq| pq.as_str().to_owned()),
    };

    let event = CaptureEvent::from_payload(payload, request);
    pipeline.process(&event).await;
    Ok("OK\n")
}

/// `X-Forwarded-For` as sent, else the socket peer.
fn client_address(headers: &HeaderMap, peer: SocketAddr) -> String {
    match header_str(headers, X_FORWARDED_FOR).trim() {
        "" => peer.to_string(),
        forwarded => forwarded.to_owned(),
    }
}

fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> &'h str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}
