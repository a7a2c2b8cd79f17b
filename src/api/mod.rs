use crate::api::handlers::{auth, root};
use anyhow::Result;
use axum::{
    Extension, Json, Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::get,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{Span, error, info, info_span};
use ulid::Ulid;
use utoipa_axum::router::OpenApiRouter;

pub mod gate;
pub(crate) mod handlers;
// OpenAPI router wiring and route registration live in openapi.rs.
mod openapi;

pub use handlers::auth::{AuthConfig, AuthState};
pub use openapi::openapi;

/// Set on every request that lacks one and echoed on the response.
const REQUEST_ID: &str = "x-request-id";

/// Build the API router with all documented routes registered.
#[must_use]
pub fn router() -> OpenApiRouter {
    openapi::api_router()
}

/// Assemble the full application: documented routes, pages, the gate and the
/// hardening headers.
pub fn app(auth_state: Arc<AuthState>, policy: gate::GatePolicy) -> Router {
    let (router, openapi) = router().split_for_parts();
    let openapi = Arc::new(openapi);

    let mut app = router
        .route("/", get(root::root))
        .route("/admin", get(root::admin))
        .route("/admin/{*rest}", get(root::admin))
        .route(
            "/openapi.json",
            get(move || {
                let openapi = Arc::clone(&openapi);
                async move { Json(openapi.as_ref().clone()) }
            }),
        )
        .fallback(root::not_found)
        .layer(middleware::from_fn_with_state(Arc::new(policy), gate::gate))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static(REQUEST_ID),
                    |_req: &_| HeaderValue::from_str(&Ulid::new().to_string()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    REQUEST_ID,
                )))
                .layer(TraceLayer::new_for_http().make_span_with(request_span))
                .layer(Extension(auth_state)),
        );

    for layer in gate::security_header_layers() {
        app = app.layer(layer);
    }
    app
}

/// Bind `[::]:port` and serve until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or serving fails
pub async fn new(port: u16, auth_config: AuthConfig) -> Result<()> {
    let sweep_interval = auth_config.rate_limit_sweep_interval();
    let auth_state = Arc::new(AuthState::with_memory_rate_limiter(auth_config));

    let initialized = auth_state.is_initialized();
    if !initialized {
        error!("Admin identity or session secret missing; run `portfolio-os bootstrap`");
    }

    // Expired rate-limit entries are dropped in the background so the map stays bounded.
    let sweeper = auth::spawn_sweeper(auth_state.shared_rate_limiter(), sweep_interval);

    let app = app(auth_state, gate::GatePolicy::default());

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!(port, initialized, "portfolio-os listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {err}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("Failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, draining connections");
}

/// One span per request, keyed by route template rather than raw path.
fn request_span(request: &Request<Body>) -> Span {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);
    let request_id = request
        .headers()
        .get(REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("none");

    info_span!("http.request", http.method = %request.method(), http.route = route, request_id)
}
