use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use panicguard_server::api::{self, AppState};
use panicguard_server::config::PanicguardConfig;
use panicguard_server::telemetry;
use panicguard_storage::{MemoryStorage, StorageRegistry};

/// Panicguard file storage HTTP server.
#[derive(Parser, Debug)]
#[command(name = "panicguard-server", about = "File storage HTTP server")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "panicguard.toml")]
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
    let cli = Cli::parse();

    // Load configuration from TOML file, or use defaults if the file does not exist.
    let mut config = PanicguardConfig::load(Path::new(&cli.config))?;

    telemetry::init(&config.logging)?;
    panicguard_core::install_panic_hook();

    if !Path::new(&cli.config).exists() {
        info!(
            path = %cli.config,
            "config file not found, using defaults"
        );
    }

    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let registry = StorageRegistry::new();
    registry.register(Arc::new(MemoryStorage::new(config.storage.clone())));
    let storage = registry.load()?;

    let sink = telemetry::sink(&config.logging);
    let app = api::router(AppState { storage }, &config, sink);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        %addr,
        storage_route = %config.server.storage_route,
        bucket = %config.storage.bucket,
        "panicguard-server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    registry.unload();
    info!("panicguard-server shut down");
    Ok(())
}

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
