use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::info;

use timetable::auth::{hash_credential, SessionStore};
use timetable::config::AppConfig;
use timetable::db::TimetableStore;
use timetable::models::{NewAccount, Role};
use timetable::server::create_router;
use timetable::types::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(
            std::env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(tracing::Level::INFO),
        )
        .init();

    let config = AppConfig::load(Path::new("timetable.json"))
        .map_err(|e| anyhow::anyhow!(e.to_string()))
        .context("failed to load configuration")?;

    let store = TimetableStore::open(&config.db_path)
        .with_context(|| format!("failed to open database at {}", config.db_path))?;
    seed_admin(&store, &config)?;

    let sessions = SessionStore::new(Duration::from_secs(config.session_ttl_hours * 60 * 60));
    let addr = format!("{}:{}", config.host, config.port);
    let state = Arc::new(AppState::new(store, sessions, config));

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("timetable server listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Creates the configured admin account when the store has no admin,
/// so a fresh deployment is never locked out.
fn seed_admin(store: &TimetableStore, config: &AppConfig) -> anyhow::Result<()> {
    if store.admin_count()? > 0 {
        return Ok(());
    }
    let seed = &config.seed_admin;
    let account = NewAccount {
        username: seed.username.clone(),
        credential: seed.credential.clone(),
        role: Role::Admin,
        display_name: seed.display_name.clone(),
        department_id: None,
    };
    store.create_account(&account, &hash_credential(&seed.credential))?;
    info!("seeded admin account '{}'", seed.username);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
}
