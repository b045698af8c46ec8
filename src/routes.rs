//! HTTP routes for the pitch service.

use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::ai;
use crate::analysis::StockAnalysis;
use crate::market::{FinancialStatements, PricePoint, StockSnapshot};
use crate::pitch::{self, PitchDeck};
use crate::PitchState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub service: String,
    pub ai_available: bool,
}

/// Analysis request: the snapshot supplied by the market-data collaborator,
/// plus optional raw statements and price history for the premium path.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub snapshot: StockSnapshot,
    #[serde(default)]
    pub statements: Option<FinancialStatements>,
    #[serde(default)]
    pub price_history: Vec<PricePoint>,
}

#[derive(Debug, Serialize)]
pub struct PitchResponse {
    pub deck: PitchDeck,
    pub markdown: String,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Health check endpoint
pub async fn health(State(state): State<Arc<PitchState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        service: "stock-pitch".to_string(),
        ai_available: state.ai.is_some(),
    })
}

/// Rule-based analysis of a posted snapshot
pub async fn analyze(
    State(state): State<Arc<PitchState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Json<StockAnalysis> {
    Json(state.analyzer.analyze(&request.snapshot))
}

/// AI-assisted analysis; degrades to the rule-based report when the analyst
/// is unconfigured or fails
pub async fn analyze_premium(
    State(state): State<Arc<PitchState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Json<StockAnalysis> {
    let mut analysis = state.analyzer.analyze(&request.snapshot);

    match &state.ai {
        Some(analyst) => {
            match analyst
                .analyze(
                    &request.snapshot,
                    request.statements.as_ref(),
                    &request.price_history,
                )
                .await
            {
                Ok(ai_analysis) => {
                    ai::apply(&mut analysis, &ai_analysis);
                }
                Err(e) => {
                    tracing::error!(
                        symbol = %request.snapshot.symbol,
                        error = %e,
                        "Analyst call failed, serving rule-based analysis"
                    );
                }
            }
        }
        None => {
            tracing::warn!(
                symbol = %request.snapshot.symbol,
                "Analyst not configured, serving rule-based analysis"
            );
        }
    }

    Json(analysis)
}

/// Pitch-deck content for a posted snapshot
pub async fn pitch(
    State(state): State<Arc<PitchState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<PitchResponse>, StatusCode> {
    let analysis = state.analyzer.analyze(&request.snapshot);
    let deck = pitch::build_deck(&analysis);
    let markdown = deck.to_markdown();

    Ok(Json(PitchResponse { deck, markdown }))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn state() -> Arc<PitchState> {
        Arc::new(PitchState::new(Config::default()))
    }

    fn request() -> AnalyzeRequest {
        AnalyzeRequest {
            snapshot: StockSnapshot {
                symbol: "TEST".to_string(),
                company_name: "Test Corp".to_string(),
                sector: None,
                industry: None,
                current_price: 100.0,
                pe_ratio: Some(10.0),
                eps: Some(5.0),
                market_cap: Some(5e9),
                beta: Some(1.0),
                dividend_yield: Some(0.0),
                pb_ratio: None,
                week52_high: None,
                week52_low: None,
            },
            statements: None,
            price_history: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_health_reports_ai_availability() {
        let response = health(State(state())).await;
        assert_eq!(response.0.status, "healthy");
        assert_eq!(response.0.service, "stock-pitch");
        assert!(!response.0.ai_available);
    }

    #[tokio::test]
    async fn test_analyze_returns_report() {
        let response = analyze(State(state()), Json(request())).await;
        assert_eq!(response.0.symbol, "TEST");
        assert_eq!(response.0.analysis_type, "Rule-based Fundamental Analysis");
    }

    #[tokio::test]
    async fn test_premium_without_analyst_degrades_to_rule_based() {
        let response = analyze_premium(State(state()), Json(request())).await;
        assert_eq!(response.0.analysis_type, "Rule-based Fundamental Analysis");
    }

    #[tokio::test]
    async fn test_pitch_returns_deck_and_markdown() {
        let response = pitch(State(state()), Json(request())).await.unwrap();
        assert_eq!(response.0.deck.slides.len(), 6);
        assert!(response.0.markdown.contains("TEST Stock Pitch"));
    }
}
