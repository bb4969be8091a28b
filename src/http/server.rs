//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request ID, timeout, body limit, CSRF)
//! - Own the shared login limiter (one per process)
//! - Bind server to listener with graceful shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::admin;
use crate::config::GuardConfig;
use crate::http::handlers::{health, issue_csrf, login_attempt, validate_cliente};
use crate::http::middleware::csrf_middleware;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::security::{LoginGuard, SlidingWindowLimiter};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub guard: LoginGuard,
    pub config: Arc<GuardConfig>,
}

impl AppState {
    pub fn new(config: GuardConfig) -> Self {
        let limiter = Arc::new(SlidingWindowLimiter::from_config(&config.rate_limit));
        Self {
            guard: LoginGuard::new(limiter),
            config: Arc::new(config),
        }
    }
}

/// HTTP server for the guard API.
pub struct GuardServer {
    router: Router,
    state: AppState,
}

impl GuardServer {
    pub fn new(config: GuardConfig) -> Self {
        let state = AppState::new(config);
        let router = Self::build_router(state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: AppState) -> Router {
        let config = state.config.clone();

        let mut router = Router::new()
            .route("/api/clientes/validate", post(validate_cliente))
            .layer(middleware::from_fn_with_state(state.clone(), csrf_middleware))
            .route("/api/csrf", get(issue_csrf))
            .route("/api/login/attempt", post(login_attempt))
            .route("/health", get(health))
            .with_state(state.clone());

        if config.admin.enabled {
            router = router.merge(admin::setup_admin_router(state));
        }

        router
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.listener.request_timeout_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// A clone of the fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Serve until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
