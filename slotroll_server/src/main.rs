use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use slotroll_server::{cors_layer, create_router, DefaultState, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::from_env()?;
    let state = Arc::new(DefaultState::from_config(&settings.game, settings.cookie_secure)?);
    info!(
        initial_credits = settings.game.initial_credits,
        roll_cost = settings.game.roll_cost,
        "sessions are held in memory and are lost on restart"
    );

    let app = create_router(state).layer(cors_layer(&settings.allowed_origins));

    let listener = tokio::net::TcpListener::bind(&settings.bind).await?;
    info!("listening on {}", settings.bind);
    axum::serve(listener, app).await?;
    Ok(())
}
