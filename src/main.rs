use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{info, warn};

use jstage_relay::{
    config::Config,
    llm::adapter_from_config,
    routes::create_router,
    search::JStageClient,
    snapshot::{build_snapshot, write_snapshot},
    utils::{init_logger, DEFAULT_LOG_FILTER},
    AppState,
};

#[derive(Debug, Parser)]
#[command(name = "jstage-relay", version, about = "JSON relay for J-STAGE journals and LLM answers")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Overrides PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// Write the journal and news digest to a JSON file
    Snapshot {
        #[arg(short, long, default_value = "data.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger(DEFAULT_LOG_FILTER);

    let cli = Cli::parse();
    let mut config = Config::from_env()?;

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await
        }
        Command::Snapshot { output } => {
            let snapshot = build_snapshot(&config).await;
            write_snapshot(&snapshot, &output).await
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    info!("Configuration loaded: {:?}", config.server);

    let llm = adapter_from_config(&config.llm);
    if llm.is_none() {
        warn!("ANTHROPIC_API_KEY is not set; /api/ai-search will answer 500");
    }

    let state = AppState {
        jstage: Arc::new(JStageClient::new(&config.jstage)),
        llm,
        config: config.clone(),
    };

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
