use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use order_sync::pipeline::SyncPipeline;
use order_sync::server;
use order_sync::utils::config_loader;
use order_sync::utils::logging::{self, LogLevel};
use reqwest::Client;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "order-sync.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// Run one sync, print the report and exit instead of serving HTTP.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level)?;

    // -------------------------------
    // 2. Create request client
    // -------------------------------

    let mut builder = Client::builder();
    if let Some(timeout) = service_config.settings.http.timeout_seconds {
        builder = builder.timeout(Duration::from_secs(timeout));
    }
    let client = builder.build()?;

    // -------------------------------
    // 3. Build pipeline
    // -------------------------------

    let pipeline = SyncPipeline::new(client, &service_config);
    info!(
        strategy = service_config.marketplace.auth_strategy.as_str(),
        forward_mode = ?service_config.destination.forward_mode,
        "pipeline ready"
    );

    if args.once {
        let report = pipeline.run(None).await?;
        println!("{}", serde_json::to_string(&report)?);
        return Ok(());
    }

    // -------------------------------
    // 4. Start http server
    // -------------------------------

    info!("Service starting...");
    server::server::start(&service_config.settings, pipeline, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received");
    })
    .await
}
