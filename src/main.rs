//! nutri-guard service.
//!
//! ```text
//!  Dashboard UI / data-access layer
//!        │
//!        ▼
//!  ┌──────────────────────────────────────────────┐
//!  │ http (axum)                                   │
//!  │   /api/csrf            → security::csrf       │
//!  │   /api/login/attempt   → security::login      │
//!  │                            └ rate_limit       │
//!  │   /api/clientes/validate → sanitize,          │
//!  │                            integrity, validate│
//!  │   /admin/*             → limiter inspection   │
//!  └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use nutri_guard::config::{load_config, GuardConfig};
use nutri_guard::lifecycle::{wait_for_signal, Shutdown};
use nutri_guard::observability::{logging, metrics};
use nutri_guard::GuardServer;

#[derive(Parser)]
#[command(name = "nutri-guard")]
#[command(about = "Security utility service for the nutrition dashboard", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GuardConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!("nutri-guard v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_attempts = config.rate_limit.max_attempts,
        window_ms = config.rate_limit.window_ms,
        session_timeout_minutes = config.session.timeout_minutes,
        admin_enabled = config.admin.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = GuardServer::new(config);

    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
