//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Middleware stack (outermost → innermost):
//! 1. CORS → 2. Access log → 3. Session gate (data routes only)

use std::sync::Arc;

use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the dashboard API router.
///
/// Middleware uses `Extension<ApiContext>`; handlers use `State<ApiContext>`.
pub fn api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);

    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route("/appointments", get(endpoints::appointments::list))
        .route("/appointments/agenda", get(endpoints::appointments::agenda))
        .route("/appointments/refresh", post(endpoints::appointments::refresh))
        .route(
            "/appointments/:id/cancel",
            post(endpoints::appointments::cancel),
        )
        .route(
            "/appointments/:id/complete",
            post(endpoints::appointments::complete),
        )
        .route("/calendar/month", get(endpoints::calendar::month))
        .route("/calendar/day", get(endpoints::calendar::day))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::require_session))
        // Extension must wrap the gate so it can extract ApiContext
        .layer(axum::Extension(ctx.clone()));

    let open = Router::new()
        .route("/health", get(endpoints::health::check))
        .route(
            "/session",
            get(endpoints::session::current).delete(endpoints::session::end),
        )
        .with_state(ctx);

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_origin(Any);

    Router::new()
        .nest("/api", protected.merge(open))
        .layer(axum::middleware::from_fn(middleware::log_access))
        .layer(cors)
}
