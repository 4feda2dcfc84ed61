//! HTTP backend of a small business ERP.
//!
//! Serves CRUD and aggregate endpoints for customers, products, invoices,
//! sales and purchase orders, suppliers, warehouses, employees, projects and
//! reports, plus CSV import and analytics over sales transactions.
//!
//!
//!
//! # Infrastructure
//! - Records are JSON documents in one Redis hash per table
//! - Without `REDIS_URL` an in-memory store is used and nothing persists
//! - CSV uploads may be handed to an external enrichment service first
//! - Every `/api` route except register and login needs a bearer token
//!
//!
//!
//! # Environment
//!
//! | key | default |
//! |---|---|
//! | `RUST_PORT` | `8080` |
//! | `REDIS_URL` | unset |
//! | `AI_ENGINE_URL` | unset |
//! | `AI_ENGINE_TIMEOUT_MS` | `10000` |
//! | `MAX_UPLOAD_BYTES` | `10485760` |
//! | `TOKEN_TTL_SECS` | `86400` |
//! | `REQUIRE_AUTH` | `true` |
//!
//! `ERP_TOKEN_SECRET` is read from `/run/secrets/ERP_TOKEN_SECRET`, falling
//! back to the environment.
//!
//!
//!
//! # Setup
//!
//! Run with logs.
//! ```sh
//! ERP_TOKEN_SECRET=dev RUST_LOG=info cargo run -p erp
//! ```
//!
//! Import a file without the server.
//! ```sh
//! cargo run -p process -- data.csv --redis-url redis://localhost:6379
//! ```
use std::{sync::Arc, time::Duration};

use anyhow::Context;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tokio::{net::TcpListener, signal::ctrl_c};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod import;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;

use auth::{login_handler, me_handler, register_handler, require_auth};
use state::AppState;

/// Builds the full router over `state`.
pub fn app(state: Arc<AppState>) -> Router {
    let mut api = routes::resources();
    if state.config.require_auth {
        api = api.route_layer(from_fn_with_state(state.clone(), require_auth));
    }

    let api = Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/me", get(me_handler))
        .merge(api);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .nest("/api", api)
        .merge(routes::health())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(state.config.max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new().await.context("Failed to initialize state")?;

    info!("Starting server...");
    let address = format!("0.0.0.0:{}", state.config.port);
    let app = app(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
