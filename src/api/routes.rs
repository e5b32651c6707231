//! Router configuration for the API.

use axum::{Router, http::Uri, middleware};

use crate::api::handlers;
use crate::api::middleware::{logging_middleware, request_id_middleware};
use crate::error::AppError;
use crate::state::AppState;

/// Creates the application router with all routes and middleware.
///
/// Layers run in reverse order of declaration, so the request id is set
/// before the logging middleware reads it. Unknown paths get a JSON 404.
///
/// # Example
/// ```ignore
/// let state = AppState::new(store, Arc::new(SystemClock));
/// let router = create_router(state);
/// ```
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(handlers::users::user_routes())
        .fallback(route_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

async fn route_not_found(uri: Uri) -> AppError {
    tracing::debug!(path = %uri.path(), "No route matched");
    AppError::not_found("Route", "path", uri.path())
}
