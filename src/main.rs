//! AMF service shell.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                   AMF SHELL                      │
//!                      │                                                  │
//!   SBI request        │  ┌────────┐   ┌───────────┐   ┌──────────────┐   │
//!   ───────────────────┼─▶│  http  │──▶│  routing  │──▶│   services   │   │
//!                      │  │ server │   │   table   │   │ (handler)    │   │
//!                      │  └────────┘   └───────────┘   └──────────────┘   │
//!                      │                                                  │
//!   Signaling peer     │  ┌──────────────────────┐                        │
//!   ───────────────────┼─▶│ signaling listener   │──▶ SignalingHandler    │
//!                      │  └──────────────────────┘                        │
//!                      │                                                  │
//!   NRF                │  ┌──────────────────────┐                        │
//!   ◀──────────────────┼──│ registry client      │                        │
//!                      │  └──────────────────────┘                        │
//!                      │                                                  │
//!                      │  config · lifecycle · observability              │
//!                      └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use amf_service::config::load_config;
use amf_service::lifecycle::Nf;
use amf_service::observability::{logging, metrics};
use amf_service::registry::{NrfClient, Registry};
use amf_service::services::UnimplementedHandler;
use amf_service::signaling::LoggingSignalingHandler;

#[derive(Debug, Parser)]
#[command(name = "amf-service", version, about = "AMF service shell")]
struct Args {
    /// Path to the configuration file (YAML, or TOML with a .toml extension)
    #[arg(short, long, default_value = "config/amfcfg.yaml")]
    config: PathBuf,

    /// Log level filter; overrides `logger.level`. `RUST_LOG` overrides both.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match load_config(&args.config) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            logging::init_logging(args.log_level.as_deref().unwrap_or("info"));
            tracing::error!(path = %args.config.display(), error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    logging::init_logging(args.log_level.as_deref().unwrap_or(&config.logger.level));
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %args.config.display(),
        "amf-service starting"
    );

    if config.metrics.enabled {
        match config.metrics.bind_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.metrics.bind_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let registry_timeout = Duration::from_millis(config.lifecycle.registry_timeout_ms);
    let registry: Option<Arc<dyn Registry>> = match NrfClient::new(&config.configuration.nrf_uri, registry_timeout) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            tracing::error!(error = %e, "NRF client unavailable, running unregistered");
            None
        }
    };

    let nf = match Nf::builder(Arc::clone(&config))
        .handler(Arc::new(UnimplementedHandler))
        .signaling(Arc::new(LoggingSignalingHandler))
        .registry(registry)
        .start()
        .await
    {
        Ok(nf) => nf,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            std::process::exit(1);
        }
    };

    if let Err(e) = nf.wait().await {
        tracing::error!(error = %e, "SBI server failed");
        std::process::exit(1);
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
