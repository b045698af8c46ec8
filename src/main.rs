//! Stock Pitch - valuation and pitch analysis service.
//!
//! Accepts stock snapshots over HTTP and returns valuation reports,
//! AI-assisted analyses, and pitch-deck content.

use anyhow::Result;
use stock_pitch::config::Config;
use stock_pitch::logging::init_logging;
use stock_pitch::PitchService;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );

    tracing::info!("Stock Pitch v{}", env!("CARGO_PKG_VERSION"));

    let service = PitchService::new(config);
    service.start().await
}
