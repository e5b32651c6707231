//! Request completion logging.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Request},
    middleware::Next,
    response::Response,
};
use tracing::{Instrument, error, info, info_span};

use super::RequestId;

/// Logs one event per request once the response is ready.
///
/// Fields: request id, method, path, status, latency and client IP.
/// 5xx responses are logged at `error`, everything else at `info`.
/// Handler events are nested in the `http_request` span.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_else(|| "unknown".to_string());
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let span = info_span!(
        "http_request",
        method = %method,
        path = %path,
        request_id = %request_id
    );

    let start = Instant::now();
    let response = next.run(request).instrument(span.clone()).await;
    let latency_ms = start.elapsed().as_millis() as u64;
    let status = response.status().as_u16();

    span.in_scope(|| {
        if response.status().is_server_error() {
            error!(
                request_id = %request_id,
                method = %method,
                path = %path,
                status,
                latency_ms,
                client_ip = %client_ip,
                "Request failed"
            );
        } else {
            info!(
                request_id = %request_id,
                method = %method,
                path = %path,
                status,
                latency_ms,
                client_ip = %client_ip,
                "Request completed"
            );
        }
    });

    response
}
