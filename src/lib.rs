//! Stock Pitch Library
//!
//! This library turns one stock's market data into a valuation report and
//! slide-deck content: DCF and WACC estimates, comparative multiples, a
//! blended fair value with confidence, a rule-based recommendation, and a
//! long-form narrative. An optional generative-analyst path enriches the
//! report when an API key is configured.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      stock-pitch (Rust Service)                     │
//! │                              :4436                                  │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────┐     │
//! │  │  Valuation      │  │  AI Analyst     │  │  Pitch Deck     │     │
//! │  │  Engine         │  │  Bridge         │  │  Builder        │     │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Concepts
//!
//! ## Valuation pipeline
//! - **Tier assumptions**: growth/discount bundles selected by market cap
//! - **DCF**: five projected years plus a Gordon-growth terminal value
//! - **WACC**: CAPM cost of equity with size-banded debt assumptions
//! - **Multiples**: fair value anchored to industry-average P/E and P/B
//! - **Blend**: 0.4/0.6 weighting renormalized over available methods
//!
//! ## Degradation
//! Every calculator is total. Missing inputs mark the affected sub-result
//! "Unable to calculate" and the pipeline continues; a failed analyst call
//! falls back to the rule-based report.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod ai;
pub mod analysis;
pub mod config;
pub mod logging;
pub mod market;
pub mod pitch;
pub mod routes;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

use crate::ai::AiAnalyst;
use crate::analysis::StockAnalyzer;
use crate::config::Config;

/// Maximum accepted request body (snapshots plus statements stay small).
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Per-request timeout, generous enough for one analyst call.
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Pitch service state
pub struct PitchState {
    /// Configuration
    pub config: Config,
    /// Valuation engine
    pub analyzer: StockAnalyzer,
    /// Generative analyst bridge, present when an API key is configured
    pub ai: Option<AiAnalyst>,
}

impl PitchState {
    /// Create a new service state
    pub fn new(config: Config) -> Self {
        let analyzer = StockAnalyzer::with_config(config.analysis.clone());
        let ai = AiAnalyst::from_config(&config);

        if ai.is_none() {
            tracing::info!("No analyst API key configured, premium path will degrade");
        }

        Self {
            config,
            analyzer,
            ai,
        }
    }
}

/// Main pitch service
pub struct PitchService {
    state: Arc<PitchState>,
}

impl PitchService {
    /// Create a new pitch service
    pub fn new(config: Config) -> Self {
        let state = Arc::new(PitchState::new(config));
        Self { state }
    }

    /// Build the HTTP router.
    pub fn router(state: Arc<PitchState>) -> Router {
        Router::new()
            .route("/health", get(routes::health))
            .route("/api/v1/analyze", post(routes::analyze))
            .route("/api/v1/analyze/premium", post(routes::analyze_premium))
            .route("/api/v1/pitch", post(routes::pitch))
            .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
            .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
            .with_state(state)
    }

    /// Start the service
    pub async fn start(self) -> Result<()> {
        let host = self.state.config.service.host.clone();
        let port = self.state.config.service.port;

        let app = Self::router(self.state.clone());

        let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
        tracing::info!(address = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
