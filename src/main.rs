use std::process::ExitCode;

use clap::Parser;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use devserve::{LsofReclaimer, Server, shutdown_signal};

mod cli;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(args: cli::Args) -> anyhow::Result<()> {
    let config = args.into_config()?;
    if !config.confine_to_root {
        warn!("request paths may resolve outside the root; pass --confine-to-root to prevent it");
    }

    // Install signal handlers before the ready line so an early Ctrl-C is not lost
    let shutdown = shutdown_signal()?;
    let server = Server::bind(config, &LsofReclaimer).await?;
    server.run(shutdown).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = cli::Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
