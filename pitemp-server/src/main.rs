// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  pitemp — Raspberry Pi temperature exporter
//
//  Sampler:  tokio interval task → pi_temperature{name=...}
//  Scrape:   axum, single GET route
//  Config:   environment only, read once
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use anyhow::Context;
use pitemp_core::ExporterConfig;
use pitemp_observability::TemperatureGauge;
use pitemp_observability::logger::{self, LogFormat};
use pitemp_sampler::Sampler;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    let log_format = LogFormat::from_env_value(std::env::var("LOG_FORMAT").ok().as_deref());

    // ── Config ──
    let config = match ExporterConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            logger::init(false, log_format);
            error!(error = %e, "error parsing configuration");
            std::process::exit(1);
        }
    };

    // ── Tracing ──
    logger::init(config.debug, log_format);

    if let Err(e) = run(config).await {
        error!(error = %format!("{e:#}"), "fatal error");
        std::process::exit(1);
    }
}

async fn run(config: ExporterConfig) -> anyhow::Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        metrics_path = %config.metrics_path,
        temp_file = %config.temp_file.display(),
        "pitemp starting"
    );

    let gauge = TemperatureGauge::new()?;

    // ── Sampler ──
    Sampler::new(
        config.temp_file.clone(),
        config.name.clone(),
        config.interval,
        gauge.clone(),
    )?
    .start();

    // ── Scrape endpoint ──
    let router = pitemp_server::build_router(&config.metrics_path, gauge, config.debug);
    let addr = config.listen_addr();

    debug!(port = %config.port, "Starting server");
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("error starting server on {addr}"))?;

    pitemp_server::serve(listener, router).await?;

    info!("pitemp stopped");
    Ok(())
}
