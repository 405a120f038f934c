//! Bobbin Server - REST backend for the sewing-machine catalog.

mod error;
mod handlers;
mod server;

use anyhow::Result;
use bobbin_core::{config::ServerConfig, CatalogApi};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "bobbin-server")]
#[command(about = "REST server for the Bobbin sewing-machine catalog")]
struct Args {
    /// Port to listen on (0 = auto-assign)
    #[arg(short, long, default_value_t = ServerConfig::DEFAULT_PORT)]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = ServerConfig::DEFAULT_HOST)]
    host: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Catalog data directory (defaults to ./bobbin-data)
    #[arg(long)]
    data_root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    info!("Starting Bobbin catalog server");

    let data_root = match args.data_root {
        Some(path) => path,
        None => std::env::current_dir()?.join("bobbin-data"),
    };
    info!("Data root: {}", data_root.display());

    let api = CatalogApi::new(&data_root)?;
    let addr = server::start_server(api, &args.host, args.port).await?;

    // Machine-readable port line for supervisors and the integration tests.
    println!("HTTP_PORT={}", addr.port());

    info!("Catalog server running on {}", addr);

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting");

    Ok(())
}
