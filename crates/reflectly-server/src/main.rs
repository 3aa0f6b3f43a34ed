//! # reflectly-server
//!
//! HTTP service behind the Reflectly feedback widget.
//!
//! This binary provides:
//! - **Public feedback API**: list a project's feedback ranked by upvotes,
//!   submit new feedback, upvote (one accepted vote per voter token per item)
//! - **Project admin API** guarded by a bearer token
//! - **Per-IP rate limiting** to protect the anonymous endpoints

mod api;
mod config;
mod error;
mod rate_limit;

use std::time::Duration;

use reflectly_store::{Database, FeedbackStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api::AppState;
use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reflectly_server=debug")),
        )
        .init();

    info!("Starting Reflectly server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(
        instance = %config.instance_name,
        http_addr = %config.http_addr,
        admin_enabled = config.admin_token.is_some(),
        rate_limit_per_sec = config.rate_limit_per_sec,
        rate_limit_burst = config.rate_limit_burst,
        "Loaded configuration"
    );

    // -----------------------------------------------------------------------
    // 3. Open the database (runs migrations)
    // -----------------------------------------------------------------------
    let db = match &config.database_path {
        Some(path) => Database::open_at(path)?,
        None => Database::new()?,
    };
    let store = FeedbackStore::new(db);

    let http_addr = config.http_addr;
    let app_state = AppState::new(store, config);

    // -----------------------------------------------------------------------
    // 4. Spawn background tasks
    // -----------------------------------------------------------------------

    // Evict rate limiter buckets idle for more than 10 minutes, every 5 minutes.
    let rl = app_state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(300));
        loop {
            interval.tick().await;
            let purged = rl.purge_idle(Duration::from_secs(600)).await;
            if purged > 0 {
                tracing::debug!(purged, "Purged idle rate limit buckets");
            }
        }
    });

    // -----------------------------------------------------------------------
    // 5. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = api::serve(app_state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
