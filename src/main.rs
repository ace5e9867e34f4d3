use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};

use custom_exporter::collector::ExporterCollector;
use custom_exporter::config::{LogLevel, load_config};
use custom_exporter::server;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "custom-exporter", version, about = "Expose command, HTTP and file output as Prometheus metrics")]
struct Args {
    /// Serve app at the specified port
    #[arg(long, default_value_t = 9100)]
    port: u16,

    /// Path to the YAML export configuration file
    #[arg(long, default_value = "export.yaml")]
    config: PathBuf,

    /// Logging level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    custom_exporter::init_logging(args.log_level);

    let config = match load_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e).context(format!("loading {}", args.config.display()));
        }
    };

    let collector = ExporterCollector::new(&config).context("building collector")?;
    info!(
        "Custom Exporter {} collecting {} exporters",
        custom_exporter::VERSION,
        collector.len()
    );
    if collector.is_empty() {
        warn!("No exporters configured in {}, /metrics will be empty", args.config.display());
    }

    server::serve(Arc::new(collector), args.port).await?;

    Ok(())
}
