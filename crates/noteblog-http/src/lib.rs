//! Noteblog HTTP: axum transport adapter for the Noteblog server.
//!
//! Provides:
//! - Entrance pages (index, registration, login, logout, management landing)
//! - Health and Prometheus metrics endpoints
//! - Session middleware that resolves the visitor's session on every page
//! - Request-ID middleware, request tracing, compression and CORS

pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod types;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::get;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Builds the HTTP router.
///
/// Page routes run behind the session middleware. Health and metrics do
/// not, so monitoring scrapes never allocate sessions.
pub fn router(state: AppState) -> Router {
    let pages = Router::new()
        .route("/", get(routes::entrance::index))
        .route(
            "/registration",
            get(routes::entrance::registration_page).post(routes::entrance::register),
        )
        .route(
            "/login",
            get(routes::entrance::login_page).post(routes::entrance::login),
        )
        .route("/logout", get(routes::entrance::logout))
        .route(
            routes::MANAGEMENT_INDEX,
            get(routes::entrance::management_index),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::session::session_middleware,
        ));

    let system = Router::new()
        .route("/health", get(routes::system::health))
        .route("/metrics", get(routes::system::metrics_endpoint));

    pages
        .merge(system)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(
            middleware::request_id::request_id_middleware,
        ))
        .layer(cors_layer(&state))
        .with_state(state)
}

/// Serve the HTTP router on the given listener with graceful shutdown.
pub async fn serve(
    listener: tokio::net::TcpListener,
    app: Router,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let origins = state.cors_origins();

    // No origins configured: no CORS headers, cross-origin denied.
    if origins.is_empty() {
        return CorsLayer::new();
    }

    let x_request_id = middleware::request_id::X_REQUEST_ID.clone();
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, x_request_id.clone()])
        .expose_headers([x_request_id]);

    if origins.len() == 1 && origins[0] == "*" {
        // Credentials cannot be combined with a wildcard origin, so session
        // cookies are not sent cross-origin in this mode.
        tracing::warn!("CORS configured with wildcard origin, all cross-origin requests allowed");
        base.allow_origin(tower_http::cors::Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .map(|o| o.parse().expect("invalid CORS origin"))
            .collect();
        base.allow_origin(parsed).allow_credentials(true)
    }
}
