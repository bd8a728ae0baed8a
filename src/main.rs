use anyhow::Result;
use clap::Parser;
use shopmate::config::Settings;
use shopmate::engines::LiveEngineFactory;
use shopmate::{start_server, utils, AppState};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shopmate")]
#[command(author, version, about = "Conversational shopping assistant API", long_about = None)]
struct Cli {
    /// Bind address (overrides the configured server.host)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides the configured server.port)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let mut settings = Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(settings.logging.level.clone())),
        )
        .init();

    let cli = Cli::parse();
    if let Some(host) = cli.host {
        settings.server.host = host;
    }
    if let Some(port) = cli.port {
        settings.server.port = port;
    }

    utils::print_header("Shopmate API");
    utils::print_info(&format!(
        "Listening on {}:{}",
        settings.server.host, settings.server.port
    ));
    utils::print_success(&format!("LLM model: {}", settings.llm.model));

    let factory = Arc::new(LiveEngineFactory::new(settings.clone()));
    let state = AppState::new(settings, factory);

    start_server(state).await
}
