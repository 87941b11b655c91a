use anyhow::Result;
use clap::Parser;
use photostudio::models::Config;
use photostudio::server;
use std::net::{IpAddr, SocketAddr};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "photostudio")]
#[command(about = "Product photo studio server")]
struct CliArgs {
    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on.
    #[arg(long, default_value_t = 3000, env = "PORT")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "photostudio=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting photostudio server");

    let args = CliArgs::parse();
    let addr = SocketAddr::new(args.host, args.port);

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server::run(&config, addr).await {
        error!("Server exited with error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
