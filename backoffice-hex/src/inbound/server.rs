//! HTTP Server configuration and startup.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;

use backoffice_types::BackofficeRepository;

use super::auth::auth_middleware;
use super::handlers::{self, AppState};
use super::rate_limit::{RateLimiterState, rate_limit_middleware};

/// HTTP Server for the back-office API.
pub struct HttpServer<R: BackofficeRepository> {
    state: Arc<AppState<R>>,
    rate_limiter: Arc<RateLimiterState>,
}

impl<R: BackofficeRepository> HttpServer<R> {
    /// Creates a new HTTP server over the given repository.
    pub fn new(repo: R) -> Self {
        Self {
            state: Arc::new(AppState::new(Arc::new(repo))),
            rate_limiter: Arc::new(RateLimiterState::default()), // 100 req/min default
        }
    }

    /// Creates a new HTTP server with custom rate limiting.
    pub fn with_rate_limit(repo: R, requests_per_minute: u32) -> Self {
        use std::time::Duration;
        Self {
            state: Arc::new(AppState::new(Arc::new(repo))),
            rate_limiter: Arc::new(RateLimiterState::new(
                requests_per_minute,
                Duration::from_secs(60),
            )),
        }
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(handlers::health))
            .route("/api/bootstrap", post(handlers::bootstrap::<R>))
            .route("/api/staff", post(handlers::create_staff::<R>))
            .route("/api/staff", get(handlers::list_staff::<R>))
            .route("/api/staff/{id}", delete(handlers::deactivate_staff::<R>))
            .route("/api/payments", post(handlers::create_payment::<R>))
            .route("/api/payments", get(handlers::list_payments::<R>))
            .route("/api/payments/{id}", get(handlers::get_payment::<R>))
            .route("/api/payments/{id}", put(handlers::update_payment::<R>))
            .route(
                "/api/payments/{id}/transactions",
                post(handlers::record_transaction::<R>),
            )
            .route(
                "/api/payments/{id}/transactions",
                get(handlers::list_transactions::<R>),
            )
            .route(
                "/api/transactions/{id}/notes",
                put(handlers::update_transaction_notes::<R>),
            )
            .route(
                "/api/payment-methods",
                post(handlers::create_payment_method::<R>),
            )
            .route(
                "/api/payment-methods",
                get(handlers::list_payment_methods::<R>),
            )
            .route("/api/posts", post(handlers::create_post::<R>))
            .route("/api/posts", get(handlers::list_posts::<R>))
            .route("/api/posts/{id}", get(handlers::get_post::<R>))
            .route("/api/posts/{id}", delete(handlers::delete_post::<R>))
            .route("/api/posts/{id}/submit", post(handlers::submit_post::<R>))
            .route("/api/posts/{id}/approve", post(handlers::approve_post::<R>))
            .route("/api/posts/{id}/reject", post(handlers::reject_post::<R>))
            .route(
                "/api/posts/{id}/unpublish",
                post(handlers::unpublish_post::<R>),
            )
            .route("/api/posts/{id}/restore", post(handlers::restore_post::<R>))
            .route("/api/post-types", post(handlers::create_post_type::<R>))
            .route("/api/post-types", get(handlers::list_post_types::<R>))
            .layer(middleware::from_fn_with_state(
                self.rate_limiter.clone(),
                rate_limit_middleware,
            ))
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                auth_middleware::<R>,
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
