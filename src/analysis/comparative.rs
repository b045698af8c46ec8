//! Comparative valuation from market multiples.
//!
//! Anchors fair value to industry-average P/E and P/B multiples, averaging
//! whichever estimates the inputs allow. A dividend-yield comparison is
//! carried as supporting detail but does not feed the fair value.

use crate::analysis::assumptions::ValuationAssumptions;
use crate::analysis::types::{
    Assessment, ComparativeValuation, MethodStatus, MultipleEstimate, YieldComparison,
};
use crate::market::StockSnapshot;

/// Run the multiples valuation for a snapshot. Total over all inputs.
pub fn calculate(
    snapshot: &StockSnapshot,
    assumptions: &ValuationAssumptions,
) -> ComparativeValuation {
    let current_price = snapshot.current_price;

    let pe_estimate = match (
        snapshot.pe_ratio.filter(|p| *p > 0.0),
        snapshot.eps.filter(|e| *e != 0.0),
    ) {
        (Some(pe), Some(eps)) => Some(MultipleEstimate {
            current_multiple: pe,
            industry_average: assumptions.industry_pe,
            fair_value: eps * assumptions.industry_pe,
            premium_discount_percent: (pe - assumptions.industry_pe) / assumptions.industry_pe
                * 100.0,
        }),
        _ => None,
    };

    let pb_estimate = snapshot.pb_ratio.filter(|p| *p > 0.0).map(|pb| {
        let book_value_per_share = current_price / pb;
        MultipleEstimate {
            current_multiple: pb,
            industry_average: assumptions.industry_pb,
            fair_value: book_value_per_share * assumptions.industry_pb,
            premium_discount_percent: (pb - assumptions.industry_pb) / assumptions.industry_pb
                * 100.0,
        }
    });

    let dividend_comparison = snapshot
        .dividend_yield
        .filter(|y| *y > 0.0)
        .map(|current_yield| YieldComparison {
            current_yield,
            industry_average_yield: assumptions.industry_dividend_yield,
            yield_premium_percent: (current_yield - assumptions.industry_dividend_yield)
                / assumptions.industry_dividend_yield
                * 100.0,
        });

    let fair_values: Vec<f64> = [pe_estimate, pb_estimate]
        .iter()
        .flatten()
        .map(|e| e.fair_value)
        .collect();

    let (average_fair_value, assessment, status) = if fair_values.is_empty() {
        (
            current_price,
            Assessment::UnableToDetermine,
            MethodStatus::InsufficientData,
        )
    } else {
        let avg = fair_values.iter().sum::<f64>() / fair_values.len() as f64;
        (
            avg,
            Assessment::classify(avg, current_price),
            MethodStatus::Completed,
        )
    };

    let upside_percent = if status == MethodStatus::Completed && current_price > 0.0 {
        (average_fair_value - current_price) / current_price * 100.0
    } else {
        0.0
    };

    ComparativeValuation {
        pe_estimate,
        pb_estimate,
        dividend_comparison,
        average_fair_value,
        current_price,
        upside_percent,
        assessment,
        status,
    }
}

// ============================================================================
// Tests
// ============================================================================
