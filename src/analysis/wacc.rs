//! Weighted average cost of capital.
//!
//! Cost of equity comes from CAPM; debt-to-equity and the credit spread are
//! estimated from company size. Never fails: every input has a default.

use crate::analysis::assumptions::ValuationAssumptions;
use crate::analysis::types::WaccAnalysis;
use crate::market::StockSnapshot;

/// Size band above which a company gets the tightest credit spread ($50B).
const LARGE_BALANCE_SHEET: f64 = 50e9;

/// Size band for the middle credit spread ($10B).
const MID_BALANCE_SHEET: f64 = 10e9;

/// Compute WACC for a snapshot. Total over all inputs.
pub fn calculate(snapshot: &StockSnapshot, assumptions: &ValuationAssumptions) -> WaccAnalysis {
    let beta = snapshot.beta.unwrap_or(1.0);
    let market_cap = snapshot.market_cap.unwrap_or(0.0);

    let risk_free_rate = assumptions.risk_free_rate;
    let market_risk_premium = assumptions.market_risk_premium;
    let tax_rate = assumptions.tax_rate;

    let cost_of_equity = risk_free_rate + beta * market_risk_premium;

    // Larger balance sheets support more leverage at tighter spreads.
    let (debt_to_equity, credit_spread) = if market_cap > LARGE_BALANCE_SHEET {
        (0.30, 0.02)
    } else if market_cap > MID_BALANCE_SHEET {
        (0.25, 0.03)
    } else {
        (0.20, 0.05)
    };

    let cost_of_debt = risk_free_rate + credit_spread;
    let after_tax_cost_of_debt = cost_of_debt * (1.0 - tax_rate);

    let equity_weight = 1.0 / (1.0 + debt_to_equity);
    let debt_weight = debt_to_equity / (1.0 + debt_to_equity);

    let wacc = equity_weight * cost_of_equity + debt_weight * after_tax_cost_of_debt;

    WaccAnalysis {
        risk_free_rate,
        market_risk_premium,
        beta,
        tax_rate,
        debt_to_equity,
        cost_of_equity,
        cost_of_debt,
        after_tax_cost_of_debt,
        equity_weight,
        debt_weight,
        wacc,
        interpretation: interpret(wacc).to_string(),
    }
}

/// One-line reading of a WACC level.
fn interpret(wacc: f64) -> &'static str {
    if wacc < 0.08 {
        "Low cost of capital - favorable for investment"
    } else if wacc < 0.12 {
        "Moderate cost of capital - typical for most companies"
    } else {
        "High cost of capital - higher risk profile"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(beta: Option<f64>, market_cap: Option<f64>) -> StockSnapshot {
        StockSnapshot {
            symbol: "TEST".to_string(),
            company_name: String::new(),
            sector: None,
            industry: None,
            current_price: 100.0,
            pe_ratio: None,
            eps: None,
            market_cap,
            beta,
            dividend_yield: None,
            pb_ratio: None,
            week52_high: None,
            week52_low: None,
        }
    }

    fn run(beta: Option<f64>, market_cap: Option<f64>) -> WaccAnalysis {
        let snap = snapshot(beta, market_cap);
        let assumptions = ValuationAssumptions::for_market_cap(snap.market_cap);
        calculate(&snap, &assumptions)
    }

    #[test]
    fn test_capm_cost_of_equity() {
        let result = run(Some(1.0), Some(5e9));
        assert!((result.cost_of_equity - 0.11).abs() < 1e-9);

        let result = run(Some(2.0), Some(5e9));
        assert!((result.cost_of_equity - 0.175).abs() < 1e-9);
    }

    #[test]
    fn test_missing_beta_defaults_to_one() {
        let with_default = run(None, Some(5e9));
        let explicit = run(Some(1.0), Some(5e9));
        assert!((with_default.wacc - explicit.wacc).abs() < 1e-12);
        assert!((with_default.beta - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_size_bands() {
        let large = run(Some(1.0), Some(100e9));
        assert!((large.debt_to_equity - 0.30).abs() < 1e-12);
        assert!((large.cost_of_debt - 0.065).abs() < 1e-12);

        let mid = run(Some(1.0), Some(20e9));
        assert!((mid.debt_to_equity - 0.25).abs() < 1e-12);
        assert!((mid.cost_of_debt - 0.075).abs() < 1e-12);

        let small = run(Some(1.0), Some(1e9));
        assert!((small.debt_to_equity - 0.20).abs() < 1e-12);
        assert!((small.cost_of_debt - 0.095).abs() < 1e-12);

        let unknown = run(Some(1.0), None);
        assert!((unknown.debt_to_equity - 0.20).abs() < 1e-12);
    }

    #[test]
    fn test_wacc_formula_small_band() {
        // beta 1.0, small band: coe 11%, cod 9.5% -> 7.125% after tax,
        // weights 5/6 and 1/6.
        let result = run(Some(1.0), Some(5e9));
        assert!((result.after_tax_cost_of_debt - 0.07125).abs() < 1e-9);
        assert!((result.equity_weight - 1.0 / 1.2).abs() < 1e-9);
        assert!((result.debt_weight - 0.2 / 1.2).abs() < 1e-9);
        let expected = (1.0 / 1.2) * 0.11 + (0.2 / 1.2) * 0.07125;
        assert!((result.wacc - expected).abs() < 1e-9);
    }

    #[test]
    fn test_weights_sum_to_one() {
        for mc in [None, Some(1e9), Some(20e9), Some(100e9)] {
            let result = run(Some(1.2), mc);
            assert!((result.equity_weight + result.debt_weight - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_interpretation_bands() {
        assert_eq!(interpret(0.07), "Low cost of capital - favorable for investment");
        assert_eq!(
            interpret(0.10),
            "Moderate cost of capital - typical for most companies"
        );
        assert_eq!(interpret(0.13), "High cost of capital - higher risk profile");
    }
}
