use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kiemdinh_server::config::ServerConfig;
use kiemdinh_server::error::AppError;
use kiemdinh_server::router::build_app_router;
use kiemdinh_server::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kiemdinh_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let config = ServerConfig::from_env()?;

    let table = kiemdinh_core::load_rule_table(config.rules_file.as_deref(), &config.rules_preset)?;
    tracing::info!(
        ruleset = table.name(),
        version = table.version(),
        "Rule table loaded"
    );

    let host = config
        .host
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid HOST '{}': {e}", config.host)))?;
    let addr = SocketAddr::new(host, config.port);

    let app = build_app_router(AppState::new(table, config));

    tracing::info!("Starting server on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
