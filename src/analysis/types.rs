//! Result records produced by the valuation pipeline.
//!
//! Every record is created once per analysis call and never mutated. The
//! pipeline is total: when inputs are missing, a method reports
//! `MethodStatus::InsufficientData` instead of failing the analysis.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::assumptions::ValuationAssumptions;
use crate::market::StockSnapshot;

// ============================================================================
// Assessment and status
// ============================================================================

/// Five-band fair-value classification, plus the degenerate outcomes for
/// methods whose inputs were insufficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Assessment {
    /// Fair value more than 15% above the current price
    SignificantlyUndervalued,
    /// Fair value 5-15% above the current price
    Undervalued,
    /// Fair value within 5% of the current price
    FairValue,
    /// Fair value 5-15% below the current price
    Overvalued,
    /// Fair value more than 15% below the current price
    SignificantlyOvervalued,
    /// DCF inputs were insufficient (missing or zero EPS)
    UnableToCalculate,
    /// No comparative multiple was available
    UnableToDetermine,
}

impl Assessment {
    /// Classify a fair-value / current-price ratio into the five bands.
    ///
    /// Band edges follow the upstream evaluation order: undervaluation
    /// checks run before overvaluation checks, so a ratio of exactly 1.05
    /// or 0.95 lands in the fair band.
    pub fn classify(fair_value: f64, current_price: f64) -> Self {
        if fair_value > current_price * 1.15 {
            Self::SignificantlyUndervalued
        } else if fair_value > current_price * 1.05 {
            Self::Undervalued
        } else if fair_value < current_price * 0.85 {
            Self::SignificantlyOvervalued
        } else if fair_value < current_price * 0.95 {
            Self::Overvalued
        } else {
            Self::FairValue
        }
    }

    /// Whether this assessment signals undervaluation.
    pub fn is_undervalued(&self) -> bool {
        matches!(self, Self::SignificantlyUndervalued | Self::Undervalued)
    }

    /// Whether this assessment signals overvaluation.
    pub fn is_overvalued(&self) -> bool {
        matches!(self, Self::SignificantlyOvervalued | Self::Overvalued)
    }
}

impl std::fmt::Display for Assessment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SignificantlyUndervalued => write!(f, "Significantly Undervalued"),
            Self::Undervalued => write!(f, "Undervalued"),
            Self::FairValue => write!(f, "Fair Value"),
            Self::Overvalued => write!(f, "Overvalued"),
            Self::SignificantlyOvervalued => write!(f, "Significantly Overvalued"),
            Self::UnableToCalculate => write!(f, "Unable to calculate"),
            Self::UnableToDetermine => write!(f, "Unable to determine"),
        }
    }
}

/// Whether a valuation method ran with sufficient inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MethodStatus {
    /// The method produced a usable estimate
    Completed,
    /// Inputs were missing; the result carries conservative defaults
    InsufficientData,
}

// ============================================================================
// DCF
// ============================================================================

/// One projected year of the DCF model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProjectedCashFlow {
    /// Projection year (1-5)
    pub year: u32,
    /// Projected cash flow per share
    pub projected_cf: f64,
    /// Present value at the discount rate
    pub present_value: f64,
}

/// Discounted-cash-flow valuation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DcfValuation {
    pub assumptions: ValuationAssumptions,
    pub projected_cashflows: Vec<ProjectedCashFlow>,
    /// Terminal value at the end of the projection horizon
    pub terminal_value: f64,
    /// Terminal value discounted back to today
    pub terminal_pv: f64,
    /// Sum of the discounted explicit-horizon cash flows
    pub sum_pv_cashflows: f64,
    /// Estimated fair value per share
    pub fair_value: f64,
    pub current_price: f64,
    /// Upside to fair value, percent of current price
    pub upside_percent: f64,
    pub assessment: Assessment,
    pub status: MethodStatus,
}

// ============================================================================
// WACC
// ============================================================================

/// Weighted-average-cost-of-capital analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaccAnalysis {
    pub risk_free_rate: f64,
    pub market_risk_premium: f64,
    /// Beta used (defaults to 1.0 when missing)
    pub beta: f64,
    pub tax_rate: f64,
    /// Debt-to-equity ratio estimated from company size
    pub debt_to_equity: f64,
    /// CAPM cost of equity
    pub cost_of_equity: f64,
    /// Pre-tax cost of debt (risk-free plus credit spread)
    pub cost_of_debt: f64,
    pub after_tax_cost_of_debt: f64,
    pub equity_weight: f64,
    pub debt_weight: f64,
    pub wacc: f64,
    /// One-line reading of the WACC level
    pub interpretation: String,
}

// ============================================================================
// Comparative multiples
// ============================================================================

/// Fair-value estimate from a single market multiple.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MultipleEstimate {
    /// The company's current multiple
    pub current_multiple: f64,
    /// Industry average used as the anchor
    pub industry_average: f64,
    /// Implied fair value per share
    pub fair_value: f64,
    /// Premium (positive) or discount (negative) to the industry average,
    /// percent
    pub premium_discount_percent: f64,
}

/// Dividend-yield comparison against the industry average.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct YieldComparison {
    /// Current dividend yield (fraction)
    pub current_yield: f64,
    /// Industry average yield (fraction)
    pub industry_average_yield: f64,
    /// Premium of the current yield over the average, percent
    pub yield_premium_percent: f64,
}

/// Comparative (multiples) valuation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparativeValuation {
    /// P/E multiple estimate, when P/E and EPS are present
    pub pe_estimate: Option<MultipleEstimate>,
    /// P/B multiple estimate, when P/B is present
    pub pb_estimate: Option<MultipleEstimate>,
    /// Dividend-yield comparison, when a yield is present
    pub dividend_comparison: Option<YieldComparison>,
    /// Average of the available multiple estimates
    pub average_fair_value: f64,
    pub current_price: f64,
    pub upside_percent: f64,
    pub assessment: Assessment,
    pub status: MethodStatus,
}

// ============================================================================
// Blended valuation
// ============================================================================

/// Weighted combination of the available valuation methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlendedValuation {
    pub weighted_fair_value: f64,
    /// 25% per contributing method, capped at 100
    pub confidence_percent: f64,
    pub methods_used: u32,
    pub current_price: f64,
    /// Return implied by moving from price to the blended fair value,
    /// percent
    pub implied_return_percent: f64,
    /// Consensus wording across the per-method assessments
    pub consensus: String,
}

// ============================================================================
// Recommendation
// ============================================================================

/// Discrete recommendation label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rating {
    #[serde(rename = "STRONG BUY")]
    StrongBuy,
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "HOLD")]
    Hold,
    #[serde(rename = "SELL")]
    Sell,
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StrongBuy => write!(f, "STRONG BUY"),
            Self::Buy => write!(f, "BUY"),
            Self::Hold => write!(f, "HOLD"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

impl Rating {
    /// Parse a rating from free text, defaulting to HOLD.
    pub fn parse_lenient(s: &str) -> Self {
        let normalized = s.trim().to_uppercase();
        if normalized.contains("STRONG BUY") {
            Self::StrongBuy
        } else if normalized.contains("BUY") {
            Self::Buy
        } else if normalized.contains("SELL") {
            Self::Sell
        } else {
            Self::Hold
        }
    }
}

/// 12-month recommendation with target price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub rating: Rating,
    /// 12-month price target, rounded to cents
    pub target_price: f64,
    /// Formatted upside to target, e.g. "25.0%"
    pub upside_percent: String,
    /// Valuation wording from the P/E bands, e.g. "Moderately undervalued"
    pub valuation_wording: String,
}

/// Overall risk classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW RISK"),
            Self::Moderate => write!(f, "MODERATE RISK"),
            Self::High => write!(f, "HIGH RISK"),
        }
    }
}

// ============================================================================
// Scorecard and ratios
// ============================================================================

/// One scored dimension of the financial health scorecard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionScore {
    pub score: u32,
    /// Qualitative reading of the score ("Excellent" ... "Poor")
    pub assessment: String,
}

/// Six-dimension financial health scorecard over snapshot fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialHealthScorecard {
    pub profitability: DimensionScore,
    pub liquidity: DimensionScore,
    pub leverage: DimensionScore,
    pub efficiency: DimensionScore,
    pub valuation_ratios: DimensionScore,
    pub growth: DimensionScore,
    /// Sum of the dimension scores
    pub overall_score: u32,
    /// Letter grade, "A+ (Excellent)" through "D (Poor)"
    pub grade: String,
    pub summary: String,
}

/// One-line assessments of the basic market ratios.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RatioAssessments {
    pub pe_ratio: Option<f64>,
    pub pe_assessment: Option<String>,
    pub pb_ratio: Option<f64>,
    pub pb_assessment: Option<String>,
    pub dividend_yield: Option<f64>,
    pub dividend_assessment: Option<String>,
    pub beta: Option<f64>,
    pub beta_assessment: Option<String>,
}

/// Price performance within the 52-week range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PricePerformance {
    /// Gain from the 52-week low, percent
    pub gain_from_low_percent: f64,
    /// Distance below the 52-week high, percent
    pub distance_from_high_percent: f64,
    /// Position inside the range, percent (0 = at low, 100 = at high)
    pub position_in_range_percent: f64,
}

// ============================================================================
// Top-level report
// ============================================================================

/// Grouping of the per-method valuation results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationSummary {
    pub dcf: DcfValuation,
    pub wacc: WaccAnalysis,
    pub comparative: ComparativeValuation,
    pub blended: BlendedValuation,
}

/// Complete analysis report for one snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAnalysis {
    pub symbol: String,
    pub company_name: String,
    /// "Rule-based Fundamental Analysis" or "AI-Assisted Analysis"
    pub analysis_type: String,
    /// Echo of the analyzed snapshot
    pub snapshot: StockSnapshot,
    pub recommendation: Recommendation,
    pub valuation: ValuationSummary,
    pub scorecard: FinancialHealthScorecard,
    pub ratios: RatioAssessments,
    pub risk_level: RiskLevel,
    pub price_performance: Option<PricePerformance>,
    pub investment_thesis: String,
    pub highlights: Vec<String>,
    pub risks: Vec<String>,
    pub catalysts: Vec<String>,
    pub sector_outlook: String,
    pub competitive_position: String,
    pub financial_strength: String,
    pub growth_prospects: String,
    /// Long-form markdown analysis for display
    pub analysis_text: String,
    pub analyzed_at: DateTime<Utc>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_bands() {
        assert_eq!(
            Assessment::classify(120.0, 100.0),
            Assessment::SignificantlyUndervalued
        );
        assert_eq!(Assessment::classify(110.0, 100.0), Assessment::Undervalued);
        assert_eq!(Assessment::classify(100.0, 100.0), Assessment::FairValue);
        assert_eq!(Assessment::classify(90.0, 100.0), Assessment::Overvalued);
        assert_eq!(
            Assessment::classify(80.0, 100.0),
            Assessment::SignificantlyOvervalued
        );
    }

    #[test]
    fn test_classification_edges_land_fair() {
        // Exactly +5% and -5% are not strict exceedances of the band edges
        assert_eq!(Assessment::classify(105.0, 100.0), Assessment::FairValue);
        assert_eq!(Assessment::classify(95.0, 100.0), Assessment::FairValue);
    }

    #[test]
    fn test_assessment_display() {
        assert_eq!(
            Assessment::SignificantlyUndervalued.to_string(),
            "Significantly Undervalued"
        );
        assert_eq!(Assessment::UnableToCalculate.to_string(), "Unable to calculate");
        assert_eq!(Assessment::UnableToDetermine.to_string(), "Unable to determine");
    }

    #[test]
    fn test_rating_display_and_parse() {
        assert_eq!(Rating::StrongBuy.to_string(), "STRONG BUY");
        assert_eq!(Rating::parse_lenient("strong buy"), Rating::StrongBuy);
        assert_eq!(Rating::parse_lenient("BUY"), Rating::Buy);
        assert_eq!(Rating::parse_lenient("Sell"), Rating::Sell);
        assert_eq!(Rating::parse_lenient("whatever"), Rating::Hold);
    }

    #[test]
    fn test_rating_serde_uses_labels() {
        assert_eq!(
            serde_json::to_string(&Rating::StrongBuy).unwrap(),
            "\"STRONG BUY\""
        );
        let parsed: Rating = serde_json::from_str("\"SELL\"").unwrap();
        assert_eq!(parsed, Rating::Sell);
    }

    #[test]
    fn test_risk_level_display() {
        assert_eq!(RiskLevel::Moderate.to_string(), "MODERATE RISK");
    }
}
