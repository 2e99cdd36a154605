// Hydrogen Gateway - Web Server
//
// Reads config from env vars:
//   GATEWAY_DB_PATH    - SQLite database path (default: gateway.db)
//   GATEWAY_JWT_SECRET - token signing secret (required)
//   GATEWAY_BIND_ADDR  - listen address (default: 0.0.0.0:3000)

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use rusqlite::Connection;

use hydrogen_gateway::api::{build_router, AppState};
use hydrogen_gateway::auth::TokenKeys;
use hydrogen_gateway::db::setup_database;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,hydrogen_gateway=debug".into()),
        )
        .init();

    // Read config from environment
    let db_path = std::env::var("GATEWAY_DB_PATH").unwrap_or_else(|_| "gateway.db".into());
    let jwt_secret =
        std::env::var("GATEWAY_JWT_SECRET").context("GATEWAY_JWT_SECRET must be set")?;
    let bind_addr = std::env::var("GATEWAY_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    // Open database
    let conn =
        Connection::open(&db_path).with_context(|| format!("failed to open database {db_path}"))?;
    setup_database(&conn)?;
    tracing::info!("Database opened: {db_path}");

    // Create shared state
    let state = AppState {
        db: Arc::new(Mutex::new(conn)),
        keys: TokenKeys::from_secret(jwt_secret.as_bytes()),
    };

    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind to {bind_addr}"))?;
    tracing::info!("gateway-server listening on {bind_addr}");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
