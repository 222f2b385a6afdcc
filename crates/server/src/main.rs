use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use burnlink_server::api::{self, AppState};
use burnlink_server::config::BurnlinkConfig;
use burnlink_server::storage_factory;

/// Burnlink one-shot message sharing server.
#[derive(Parser, Debug)]
#[command(name = "burnlink-server", about = "One-shot ephemeral message and file sharing")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "burnlink.toml")]
    config: String,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber from RUST_LOG or default to info.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Load configuration from TOML file, or use defaults if the file does not exist.
    let config: BurnlinkConfig = if Path::new(&cli.config).exists() {
        let contents = std::fs::read_to_string(&cli.config)?;
        toml::from_str(&contents)?
    } else {
        info!(
            path = %cli.config,
            "config file not found, using defaults"
        );
        BurnlinkConfig::default()
    };

    // Create the storage backend; unsupported backends are fatal here.
    let store = storage_factory::create_store(&config.storage)?;
    info!(
        client = %config.storage.client,
        ttl_seconds = config.storage.ttl_seconds,
        "message store initialized"
    );

    // Spawn backend maintenance (the in-memory pruner; a no-op wait for
    // Redis) with a shutdown handle.
    let (maintenance_tx, maintenance_rx) = mpsc::channel(1);
    let maintenance = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            if let Err(e) = store.run(maintenance_rx).await {
                error!(error = %e, "storage maintenance failed");
            }
        })
    };

    let state = AppState {
        store,
        max_upload_bytes: config.server.max_upload_bytes,
    };
    let app = api::router(state);

    // Resolve the bind address (CLI overrides take precedence).
    let host = cli.host.unwrap_or(config.server.host);
    let port = cli.port.unwrap_or(config.server.port);
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "burnlink-server listening");

    // Serve with graceful shutdown on SIGINT / SIGTERM.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop backend maintenance and wait for it to wind down.
    let _ = maintenance_tx.send(()).await;
    if let Err(e) = maintenance.await {
        warn!(error = %e, "storage maintenance task panicked");
    }

    info!("burnlink-server shut down");
    Ok(())
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM, then return to trigger graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
