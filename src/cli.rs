use clap::{Args, Parser, Subcommand};
use std::{net::SocketAddr, path::PathBuf};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::{api::router, state::AppState, utils::shutdown_token};

/// Back-office API for the lmgfood delivery platform
#[derive(Parser)]
#[command(name = "lmgfood", version, about)]
struct Cli {
    /// Log filter used when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "LMGFOOD_LOG", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "LMGFOOD_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Directory holding the database files (created if missing)
    #[arg(long, env = "LMGFOOD_DATA_DIR", default_value = "./data")]
    pub data_dir: PathBuf,
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

pub async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let state = AppState::new(&args.data_dir)?;
    let app = router(state);

    let listener = TcpListener::bind(args.bind).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        data_dir = %args.data_dir.display(),
        "lmgfood API listening"
    );

    let token = shutdown_token();
    axum::serve(listener, app)
        .with_graceful_shutdown(token.cancelled_owned())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    match cli.command {
        Commands::Serve(args) => serve(args).await,
    }
}
