//! Discounted-cash-flow valuation.
//!
//! Projects trailing EPS forward five years at the tier growth rate,
//! discounts each year at the tier discount rate, and adds a Gordon-growth
//! terminal value discounted back over the horizon. EPS missing or zero
//! yields a degenerate result anchored at the current price instead of an
//! error.

use crate::analysis::assumptions::ValuationAssumptions;
use crate::analysis::types::{Assessment, DcfValuation, MethodStatus, ProjectedCashFlow};
use crate::market::StockSnapshot;

/// Explicit projection horizon in years.
const PROJECTION_YEARS: u32 = 5;

/// Run the DCF model for a snapshot. Total over all inputs.
pub fn calculate(snapshot: &StockSnapshot, assumptions: &ValuationAssumptions) -> DcfValuation {
    let current_price = snapshot.current_price;

    let eps = match snapshot.eps.filter(|e| *e != 0.0) {
        Some(eps) => eps,
        None => return insufficient(current_price, assumptions),
    };

    let growth = assumptions.growth_rate_5y;
    let terminal_growth = assumptions.terminal_growth_rate;
    let discount = assumptions.discount_rate;

    let mut projected_cashflows = Vec::with_capacity(PROJECTION_YEARS as usize);
    for year in 1..=PROJECTION_YEARS {
        let projected_cf = eps * (1.0 + growth).powi(year as i32);
        let present_value = projected_cf / (1.0 + discount).powi(year as i32);
        projected_cashflows.push(ProjectedCashFlow {
            year,
            projected_cf,
            present_value,
        });
    }

    // Tier tables guarantee discount > terminal growth, so the denominator
    // stays positive.
    let final_cf = projected_cashflows[PROJECTION_YEARS as usize - 1].projected_cf;
    let terminal_value = final_cf * (1.0 + terminal_growth) / (discount - terminal_growth);
    let terminal_pv = terminal_value / (1.0 + discount).powi(PROJECTION_YEARS as i32);

    let sum_pv_cashflows: f64 = projected_cashflows.iter().map(|cf| cf.present_value).sum();
    let fair_value = sum_pv_cashflows + terminal_pv;

    let upside_percent = if current_price > 0.0 {
        (fair_value - current_price) / current_price * 100.0
    } else {
        0.0
    };

    DcfValuation {
        assumptions: *assumptions,
        projected_cashflows,
        terminal_value,
        terminal_pv,
        sum_pv_cashflows,
        fair_value,
        current_price,
        upside_percent,
        assessment: Assessment::classify(fair_value, current_price),
        status: MethodStatus::Completed,
    }
}

/// Degenerate result when EPS is missing: fair value pinned to the current
/// price so downstream consumers always see a usable number.
fn insufficient(current_price: f64, assumptions: &ValuationAssumptions) -> DcfValuation {
    DcfValuation {
        assumptions: *assumptions,
        projected_cashflows: Vec::new(),
        terminal_value: 0.0,
        terminal_pv: 0.0,
        sum_pv_cashflows: 0.0,
        fair_value: current_price,
        current_price,
        upside_percent: 0.0,
        assessment: Assessment::UnableToCalculate,
        status: MethodStatus::InsufficientData,
    }
}

// ============================================================================
// Tests
// ============================================================================
