use axum::{extract::Request, ServiceExt};
use tracing_subscriber::EnvFilter;

use jewelry_catalog::{app, auth, config::AppConfig, error::StartupError, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up FIREBASE_*, AUTH_TOKEN_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = AppConfig::from_env()?;
    tracing::info!("Starting jewelry catalog in {:?} mode", config.environment);

    auth::load_remote_keys(&mut config.auth)
        .await
        .map_err(StartupError::from)?;

    let bind_addr = config.bind_addr();
    let state = AppState::from_config(config)?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|source| StartupError::Bind {
            addr: bind_addr.clone(),
            source,
        })?;

    tracing::info!("Jewelry catalog listening on http://{}", bind_addr);

    let service = app::service(state);
    axum::serve(listener, ServiceExt::<Request>::into_make_service(service)).await?;

    Ok(())
}
