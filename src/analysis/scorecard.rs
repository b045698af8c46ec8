//! Financial health scorecard and basic ratio assessments.
//!
//! Threshold scoring over the snapshot fields. Each dimension scores a few
//! points from simple rules; the total maps to a letter grade. All rules
//! treat missing fields as zero except where noted.

use crate::market::StockSnapshot;
use crate::analysis::types::{DimensionScore, FinancialHealthScorecard, RatioAssessments};

/// Build the six-dimension scorecard for a snapshot.
pub fn build_scorecard(snapshot: &StockSnapshot) -> FinancialHealthScorecard {
    let profitability = profitability_score(snapshot);
    let liquidity = liquidity_score(snapshot);
    let leverage = leverage_score(snapshot);
    let efficiency = efficiency_score(snapshot);
    let valuation_ratios = valuation_ratio_score(snapshot);
    let growth = growth_score(snapshot);

    let overall_score = profitability.score
        + liquidity.score
        + leverage.score
        + efficiency.score
        + valuation_ratios.score
        + growth.score;
    let grade = assign_grade(overall_score);
    let summary = format!(
        "Financial Health Grade: {} (Score: {}/24). Assessment based on profitability, liquidity, leverage, efficiency, valuation, and growth metrics.",
        grade, overall_score
    );

    FinancialHealthScorecard {
        profitability,
        liquidity,
        leverage,
        efficiency,
        valuation_ratios,
        growth,
        overall_score,
        grade,
        summary,
    }
}

fn profitability_score(snapshot: &StockSnapshot) -> DimensionScore {
    let eps = snapshot.eps.unwrap_or(0.0);
    let pe = snapshot.pe_ratio.unwrap_or(0.0);

    let mut score = 0;
    if eps > 0.0 {
        score += 3;
        if eps > 2.0 {
            score += 2;
        }
    }
    if pe > 0.0 && pe < 25.0 {
        score += 2;
    }

    dimension(score, 5)
}

fn liquidity_score(snapshot: &StockSnapshot) -> DimensionScore {
    let market_cap = snapshot.market_cap.unwrap_or(0.0);

    let score = if market_cap > 10e9 {
        5
    } else if market_cap > 2e9 {
        3
    } else {
        1
    };

    dimension(score, 5)
}

fn leverage_score(snapshot: &StockSnapshot) -> DimensionScore {
    let dividend_yield = snapshot.dividend_yield.unwrap_or(0.0);
    let market_cap = snapshot.market_cap.unwrap_or(0.0);

    let mut score = if dividend_yield > 0.03 {
        3
    } else if dividend_yield > 0.01 {
        2
    } else {
        1
    };
    if market_cap > 10e9 {
        score += 2;
    }

    dimension(score, 5)
}

fn efficiency_score(snapshot: &StockSnapshot) -> DimensionScore {
    let pe = snapshot.pe_ratio.unwrap_or(0.0);
    // Beta here defaults to the market rather than to zero: an unknown beta
    // should not read as ultra-defensive.
    let beta = snapshot.beta.unwrap_or(1.0);

    let mut score = 0;
    if pe > 0.0 && pe < 20.0 {
        score += 3;
    } else if pe > 0.0 && pe < 30.0 {
        score += 2;
    }
    if (0.8..=1.2).contains(&beta) {
        score += 2;
    }

    dimension(score, 5)
}

fn valuation_ratio_score(snapshot: &StockSnapshot) -> DimensionScore {
    let pe = snapshot.pe_ratio.unwrap_or(0.0);
    let pb = snapshot.pb_ratio.unwrap_or(0.0);

    let mut score = 0;
    if pe > 0.0 {
        score += if pe < 15.0 {
            3
        } else if pe < 25.0 {
            2
        } else {
            1
        };
    }
    if pb > 0.0 {
        if pb < 2.0 {
            score += 2;
        } else if pb < 3.0 {
            score += 1;
        }
    }

    dimension(score, 5)
}

fn growth_score(snapshot: &StockSnapshot) -> DimensionScore {
    let pe = snapshot.pe_ratio.unwrap_or(0.0);
    let market_cap = snapshot.market_cap.unwrap_or(0.0);

    let mut score = 0;
    if pe > 20.0 {
        score += 2;
    } else if pe > 15.0 {
        score += 1;
    }
    if market_cap < 10e9 {
        score += 2;
    } else if market_cap < 50e9 {
        score += 1;
    }

    dimension(score, 4)
}

fn dimension(score: u32, max_score: u32) -> DimensionScore {
    DimensionScore {
        score,
        assessment: score_to_assessment(score, max_score).to_string(),
    }
}

fn score_to_assessment(score: u32, max_score: u32) -> &'static str {
    let ratio = score as f64 / max_score as f64;
    if ratio >= 0.8 {
        "Excellent"
    } else if ratio >= 0.6 {
        "Good"
    } else if ratio >= 0.4 {
        "Average"
    } else if ratio >= 0.2 {
        "Below Average"
    } else {
        "Poor"
    }
}

fn assign_grade(score: u32) -> String {
    let grade = if score >= 20 {
        "A+ (Excellent)"
    } else if score >= 17 {
        "A (Very Good)"
    } else if score >= 14 {
        "B+ (Good)"
    } else if score >= 11 {
        "B (Above Average)"
    } else if score >= 8 {
        "C+ (Average)"
    } else if score >= 5 {
        "C (Below Average)"
    } else {
        "D (Poor)"
    };
    grade.to_string()
}

// ============================================================================
// Basic ratio assessments
// ============================================================================

/// One-line assessments of P/E, P/B, dividend yield, and beta.
pub fn assess_ratios(snapshot: &StockSnapshot) -> RatioAssessments {
    let mut ratios = RatioAssessments::default();

    if let Some(pe) = snapshot.pe_ratio.filter(|p| *p > 0.0) {
        ratios.pe_ratio = Some(pe);
        ratios.pe_assessment = Some(
            if pe < 15.0 {
                "Low (Potentially undervalued)"
            } else if pe > 30.0 {
                "High (Potentially overvalued)"
            } else {
                "Moderate (Fair value)"
            }
            .to_string(),
        );
    }

    if let Some(pb) = snapshot.pb_ratio.filter(|p| *p > 0.0) {
        ratios.pb_ratio = Some(pb);
        ratios.pb_assessment = Some(if pb < 1.5 { "Low" } else { "High" }.to_string());
    }

    if let Some(dy) = snapshot.dividend_yield.filter(|y| *y > 0.0) {
        ratios.dividend_yield = Some(dy);
        ratios.dividend_assessment = Some(if dy > 0.03 { "High" } else { "Low" }.to_string());
    }

    if let Some(beta) = snapshot.beta.filter(|b| *b > 0.0) {
        ratios.beta = Some(beta);
        ratios.beta_assessment = Some(
            if beta < 1.0 {
                "Low volatility (Defensive)"
            } else if beta > 1.5 {
                "High volatility (Aggressive)"
            } else {
                "Moderate volatility"
            }
            .to_string(),
        );
    }

    ratios
}

// ============================================================================
// Tests
// ============================================================================
