//! Accounts API server
//!
//! Connects to PostgreSQL, creates the schema, mounts the account routes
//! under `/api` and serves them until Ctrl-C.

use accounts_service::store::{migrate, PgAccountStore, PgTokenBlacklist};
use accounts_service::{create_routes, AuthConfig, AuthError, AuthService, AuthState, ServerConfig};

use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    Router, ServiceExt,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower::Layer;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    normalize_path::NormalizePathLayer,
    trace::TraceLayer,
};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,accounts_service=debug".into()),
        )
        .init();

    if let Err(e) = run().await {
        error!("Server failed: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AuthError> {
    let server = ServerConfig::from_env()?;
    let auth_config = AuthConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(server.max_connections)
        .connect(&server.database_url)
        .await?;

    migrate(&pool).await?;

    let auth: AuthState = Arc::new(AuthService::new(
        auth_config,
        Arc::new(PgAccountStore::new(pool.clone())),
        Arc::new(PgTokenBlacklist::new(pool)),
    )?);

    spawn_blacklist_purge(auth.clone(), server.blacklist_purge_interval);

    let app = Router::new()
        .nest("/api", create_routes(auth))
        .layer(cors_layer(&server.cors_allowed_origins)?)
        .layer(TraceLayer::new_for_http());

    // Trailing slashes are trimmed before routing so `/api/login/` matches
    let app = NormalizePathLayer::trim_trailing_slash().layer(app);

    let listener = tokio::net::TcpListener::bind(server.bind_addr)
        .await
        .map_err(|e| AuthError::Config(format!("Cannot bind {}: {e}", server.bind_addr)))?;
    info!(addr = %server.bind_addr, "Accounts API listening");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("Server error: {:?}", e);
            AuthError::Internal
        })?;

    info!("Accounts API stopped");
    Ok(())
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer, AuthError> {
    let origins = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|_| AuthError::Config(format!("Invalid CORS origin: {origin}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}

fn spawn_blacklist_purge(auth: AuthState, every: std::time::Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            if let Err(e) = auth.tokens().purge_expired().await {
                error!("Blacklist purge failed: {}", e);
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
