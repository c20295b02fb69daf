mod config;
mod routes;
mod state;

use std::process::ExitCode;

use crate::config::{ConfigError, ServerConfig};

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("network: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is normal in deployed environments.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "tibot server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), StartupError> {
    let config = ServerConfig::from_env()?;
    let port = config.port;
    tracing::info!(
        identity_url = %config.identity_url,
        login_locked = config.login_locked,
        "configuration loaded"
    );

    let app = routes::leptos_app(state::AppState::new(config))?;
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;

    tracing::info!(%port, "tibot listening");
    axum::serve(listener, app).await?;
    Ok(())
}
