use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use urlsieve::{Config, FilterSpec, Server};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on (unprivileged range)
    port: Option<u16>,

    /// Filter spec: counter capacity followed by one seed per hash function
    filter: Vec<String>,

    /// Bind address
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// Config file path (replaces the positional arguments)
    #[arg(short, long)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        "debug"
    } else {
        &args.log_level
    };
    tracing_subscriber::fmt()
        .with_env_filter(format!("urlsieve={}", log_level))
        .init();

    let config = if let Some(config_path) = args.config {
        Config::from_file(&config_path)?
    } else {
        let port = args
            .port
            .context("port argument is required without --config")?;
        let filter = FilterSpec::parse(&args.filter.join(" "))
            .context("filter spec arguments are required without --config")?;

        Config {
            bind_addr: args.bind,
            port,
            filter,
            ..Default::default()
        }
    };

    info!(
        "Starting urlsieve v{} on {}:{}",
        env!("CARGO_PKG_VERSION"),
        config.bind_addr,
        config.port
    );

    let server = Arc::new(Server::new(config)?);

    // Setup signal handler for graceful shutdown
    let server_clone = Arc::clone(&server);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal, shutting down gracefully...");
        server_clone.shutdown();
    })?;

    if let Err(e) = server.run() {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
