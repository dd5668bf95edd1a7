// src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use halisaha_backend::{
    app,
    config::{AppState, Settings},
    db::MIGRATOR,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Bad configuration stops start-up
    let settings = Settings::from_env()?;
    let bind_addr = settings.bind_addr.clone();
    let reconcile_interval = settings.reconcile_interval;

    let app_state = AppState::new(settings).await?;

    MIGRATOR.run(&app_state.db_pool).await?;
    tracing::info!("Database migrations applied");

    // Completion reconciler runs beside the server on the same pool
    let reconciler = app_state.completion_service.clone().spawn(reconcile_interval);
    tracing::info!("Completion reconciler every {:?}", reconcile_interval);

    let router = app(app_state);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;

    reconciler.abort();
    Ok(())
}
