//! Valuation engine.
//!
//! A pure, synchronous pipeline over one [`StockSnapshot`]:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        StockAnalyzer                             │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  snapshot ─▶ tier assumptions ─▶ DCF ─┐                          │
//! │                               ─▶ WACC ├─▶ blend ─▶ recommendation│
//! │                               ─▶ multiples ─┘        + narrative │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every stage is total: missing inputs degrade individual sub-results to
//! conservative defaults instead of failing the analysis, so the caller
//! always receives a usable report.
//!
//! # Usage
//!
//! ```ignore
//! use stock_pitch::analysis::StockAnalyzer;
//!
//! let analyzer = StockAnalyzer::with_config(config.analysis.clone());
//! let report = analyzer.analyze(&snapshot);
//! println!("{} -> {}", report.symbol, report.recommendation.rating);
//! ```

pub mod assumptions;
pub mod blend;
pub mod comparative;
pub mod dcf;
pub mod narrative;
pub mod recommendation;
pub mod scorecard;
pub mod types;
pub mod wacc;

pub use assumptions::{CapTier, ValuationAssumptions};
pub use types::{
    Assessment, BlendedValuation, ComparativeValuation, DcfValuation, FinancialHealthScorecard,
    MethodStatus, MultipleEstimate, PricePerformance, ProjectedCashFlow, Rating, RatioAssessments,
    Recommendation, RiskLevel, StockAnalysis, ValuationSummary, WaccAnalysis, YieldComparison,
};

use chrono::Utc;

use crate::config::AnalysisConfig;
use crate::market::StockSnapshot;

/// Label attached to reports produced purely by the rule engine.
pub const RULE_BASED_ANALYSIS: &str = "Rule-based Fundamental Analysis";

/// Valuation engine over per-call configuration.
///
/// Holds the analysis configuration by value: construction is cheap and the
/// engine carries no other state, so one analyzer per request is fine.
#[derive(Debug, Clone, Default)]
pub struct StockAnalyzer {
    config: AnalysisConfig,
}

impl StockAnalyzer {
    /// Create an analyzer with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an analyzer with explicit configuration.
    pub fn with_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Run the full valuation pipeline for one snapshot.
    pub fn analyze(&self, snapshot: &StockSnapshot) -> StockAnalysis {
        tracing::info!(symbol = %snapshot.symbol, "Starting rule-based analysis");

        let assumptions =
            ValuationAssumptions::for_market_cap(snapshot.market_cap).with_overrides(&self.config);

        let dcf = dcf::calculate(snapshot, &assumptions);
        let wacc = wacc::calculate(snapshot, &assumptions);
        let comparative = comparative::calculate(snapshot, &assumptions);
        let blended = blend::combine(&dcf, &comparative, snapshot.current_price);

        let base = recommendation::base_recommendation(snapshot);
        let recommendation = recommendation::adjust_for_dcf(&base, &dcf);

        let scorecard = scorecard::build_scorecard(snapshot);
        let ratios = scorecard::assess_ratios(snapshot);
        let risk_level = narrative::assess_risk_level(snapshot);

        let investment_thesis = narrative::investment_thesis(snapshot, &recommendation);
        let highlights = narrative::generate_highlights(snapshot);
        let risks = narrative::identify_risks(snapshot);
        let catalysts = narrative::identify_catalysts(snapshot);

        let mut analysis = StockAnalysis {
            symbol: snapshot.symbol.clone(),
            company_name: snapshot.display_name().to_string(),
            analysis_type: RULE_BASED_ANALYSIS.to_string(),
            snapshot: snapshot.clone(),
            recommendation,
            valuation: ValuationSummary {
                dcf,
                wacc,
                comparative,
                blended,
            },
            scorecard,
            ratios,
            risk_level,
            price_performance: narrative::price_performance(snapshot),
            investment_thesis,
            highlights,
            risks,
            catalysts,
            sector_outlook: narrative::sector_outlook(snapshot.sector.as_deref()),
            competitive_position: narrative::competitive_position(snapshot.market_cap),
            financial_strength: narrative::financial_strength(snapshot),
            growth_prospects: narrative::growth_prospects(snapshot),
            analysis_text: String::new(),
            analyzed_at: Utc::now(),
        };
        analysis.analysis_text = narrative::analysis_text(&analysis);

        tracing::info!(
            symbol = %analysis.symbol,
            rating = %analysis.recommendation.rating,
            target_price = analysis.recommendation.target_price,
            confidence = analysis.valuation.blended.confidence_percent,
            "Analysis completed"
        );

        analysis
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> StockSnapshot {
        StockSnapshot {
            symbol: "TEST".to_string(),
            company_name: "Test Corp".to_string(),
            sector: Some("Technology".to_string()),
            industry: None,
            current_price: 100.0,
            pe_ratio: Some(20.0),
            eps: Some(5.0),
            market_cap: Some(50e9),
            beta: Some(1.0),
            dividend_yield: Some(0.025),
            pb_ratio: Some(2.0),
            week52_high: Some(120.0),
            week52_low: Some(80.0),
        }
    }

    #[test]
    fn test_analyze_produces_complete_report() {
        let analyzer = StockAnalyzer::new();
        let report = analyzer.analyze(&snapshot());

        assert_eq!(report.symbol, "TEST");
        assert_eq!(report.analysis_type, RULE_BASED_ANALYSIS);
        assert_eq!(report.valuation.dcf.status, MethodStatus::Completed);
        assert_eq!(report.valuation.comparative.status, MethodStatus::Completed);
        assert!((report.valuation.blended.confidence_percent - 50.0).abs() < 1e-9);
        assert!(!report.highlights.is_empty());
        assert!(!report.risks.is_empty());
        assert!(report.analysis_text.contains("Investment Analysis"));
        assert!(report.analysis_text.contains("Blended Fair Value"));
    }

    #[test]
    fn test_analyze_is_total_on_sparse_snapshot() {
        let sparse = StockSnapshot {
            symbol: "SPARSE".to_string(),
            company_name: String::new(),
            sector: None,
            industry: None,
            current_price: 10.0,
            pe_ratio: None,
            eps: None,
            market_cap: None,
            beta: None,
            dividend_yield: None,
            pb_ratio: None,
            week52_high: None,
            week52_low: None,
        };

        let report = StockAnalyzer::new().analyze(&sparse);
        assert_eq!(report.valuation.dcf.status, MethodStatus::InsufficientData);
        assert_eq!(
            report.valuation.comparative.status,
            MethodStatus::InsufficientData
        );
        assert!((report.valuation.blended.confidence_percent - 0.0).abs() < 1e-9);
        assert!((report.valuation.blended.weighted_fair_value - 10.0).abs() < 1e-9);
        assert_eq!(report.recommendation.rating, Rating::Hold);
        assert!(report.price_performance.is_none());
    }

    #[test]
    fn test_config_override_changes_dcf() {
        let config = AnalysisConfig {
            growth_rate: Some(0.20),
            ..AnalysisConfig::default()
        };
        let default_report = StockAnalyzer::new().analyze(&snapshot());
        let boosted_report = StockAnalyzer::with_config(config).analyze(&snapshot());

        assert!(
            boosted_report.valuation.dcf.fair_value > default_report.valuation.dcf.fair_value
        );
    }
}
