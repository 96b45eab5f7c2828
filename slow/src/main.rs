use std::net::SocketAddr;
use std::process::ExitCode;

use clap::Parser;
use slow::state::AppState;
use slow_core::{init_tracing, DatabaseConfig, LogConfig, ServerConfig, SlowConfig};
use sqlx::MySql;

/// slow is fast.
#[derive(Debug, Parser)]
#[command(name = "slow", version, about)]
struct Cli {
    /// Configuration profile (`application-{profile}.yaml`); `SLOW_PROFILE` wins.
    #[arg(long, default_value = "dev")]
    profile: String,

    /// Listen address, overriding `server.addr`.
    #[arg(long)]
    addr: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "slow exited with error");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = SlowConfig::load(&cli.profile);
    let log = match &config {
        Ok(config) => config.section::<LogConfig>(),
        Err(_) => Ok(LogConfig::default()),
    };
    // Tracing comes up before any failure is reported, even a config failure.
    init_tracing(log.as_ref().unwrap_or(&LogConfig::default()));

    let config = config?;
    log?;
    tracing::info!(profile = config.profile(), "configuration loaded");

    let db: DatabaseConfig = config.section()?;
    let mut server: ServerConfig = config.section()?;
    if let Some(addr) = cli.addr {
        server.addr = addr;
    }

    let pool = slow_data_sqlx::connect::<MySql>(&db).await?;
    let state = AppState::new(pool.clone(), server.request_timeout);

    let result = slow_core::serve(slow::app(state), &server).await;
    pool.close().await;
    Ok(result?)
}
