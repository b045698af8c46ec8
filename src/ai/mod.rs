//! Generative analyst integration (premium path).
//!
//! The bridge sends one chat request per analysis to an OpenAI-compatible
//! endpoint and parses the structured payload best-effort. When the service
//! is unconfigured or fails, callers fall back to the rule-based report, so
//! this path only ever upgrades an analysis.

pub mod analyst;
pub mod types;

pub use analyst::{AiAnalyst, AiError};
pub use types::AiAnalysis;

use crate::analysis::StockAnalysis;

/// Label attached to reports enriched by the generative analyst.
pub const AI_ASSISTED_ANALYSIS: &str = "AI-Assisted Analysis";

/// Fold an analyst payload into a rule-based report.
///
/// Only non-empty analyst fields replace the rule-based ones, so a partial
/// payload degrades field by field instead of wiping the report.
pub fn apply(analysis: &mut StockAnalysis, ai: &AiAnalysis) {
    analysis.analysis_type = AI_ASSISTED_ANALYSIS.to_string();
    analysis.recommendation.rating = ai.recommendation;

    if ai.target_price > 0.0 {
        analysis.recommendation.target_price = (ai.target_price * 100.0).round() / 100.0;
        analysis.recommendation.upside_percent = ai.upside_potential.clone();
    }
    if !ai.investment_thesis.is_empty() {
        analysis.investment_thesis = ai.investment_thesis.clone();
    }
    if !ai.highlights.is_empty() {
        analysis.highlights = ai.highlights.clone();
    }
    if !ai.risks.is_empty() {
        analysis.risks = ai.risks.clone();
    }
    if !ai.analysis.is_empty() {
        analysis.analysis_text = ai.analysis.clone();
    }
}

// ============================================================================
// Tests
// ============================================================================
