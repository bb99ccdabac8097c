use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use tracing::info;

use cricket_analytics::config::Config;
use cricket_analytics::dashboard::{self, AppState};
use cricket_analytics::{AnalyticsEngine, MatchFeed, MatchModel};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let feed = MatchFeed::load(&config.match_file)?;
    let model = MatchModel::build(&feed)?;
    let engine = AnalyticsEngine::new(model, config.analysis_settings());

    if config.print_report {
        println!("{}", serde_json::to_string_pretty(engine.report())?);
        return Ok(());
    }

    let app = dashboard::router(AppState { engine });
    let addr: SocketAddr = config.listen_addr.parse()?;
    info!("Analytics API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Run API server (blocks until shutdown)
    axum::serve(listener, app).await?;

    Ok(())
}
