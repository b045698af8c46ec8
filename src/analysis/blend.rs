//! Blended fair value across valuation methods.
//!
//! The DCF estimate carries a 0.4 weight and the comparative estimate 0.6;
//! weights renormalize over whichever methods completed. Confidence grows
//! 25% per contributing method.

use crate::analysis::types::{
    Assessment, BlendedValuation, ComparativeValuation, DcfValuation, MethodStatus,
};

/// Weight of the DCF estimate in the blend.
const DCF_WEIGHT: f64 = 0.4;

/// Weight of the comparative estimate in the blend.
const COMPARATIVE_WEIGHT: f64 = 0.6;

/// Confidence contributed by each completed method, percent.
const CONFIDENCE_PER_METHOD: f64 = 25.0;

/// Blend the available fair-value estimates.
pub fn combine(
    dcf: &DcfValuation,
    comparative: &ComparativeValuation,
    current_price: f64,
) -> BlendedValuation {
    let mut fair_values = Vec::new();
    let mut weights = Vec::new();

    if dcf.status == MethodStatus::Completed && dcf.fair_value > 0.0 {
        fair_values.push(dcf.fair_value);
        weights.push(DCF_WEIGHT);
    }
    if comparative.status == MethodStatus::Completed && comparative.average_fair_value > 0.0 {
        fair_values.push(comparative.average_fair_value);
        weights.push(COMPARATIVE_WEIGHT);
    }

    if fair_values.is_empty() {
        return BlendedValuation {
            weighted_fair_value: current_price,
            confidence_percent: 0.0,
            methods_used: 0,
            current_price,
            implied_return_percent: 0.0,
            consensus: consensus(dcf, comparative),
        };
    }

    let total_weight: f64 = weights.iter().sum();
    let weighted_fair_value = fair_values
        .iter()
        .zip(&weights)
        .map(|(fv, w)| fv * w / total_weight)
        .sum();

    let methods_used = fair_values.len() as u32;
    let confidence_percent = (methods_used as f64 * CONFIDENCE_PER_METHOD).min(100.0);

    let implied_return_percent = if current_price > 0.0 {
        (weighted_fair_value - current_price) / current_price * 100.0
    } else {
        0.0
    };

    BlendedValuation {
        weighted_fair_value,
        confidence_percent,
        methods_used,
        current_price,
        implied_return_percent,
        consensus: consensus(dcf, comparative),
    }
}

/// Consensus wording across the per-method assessments.
fn consensus(dcf: &DcfValuation, comparative: &ComparativeValuation) -> String {
    let mut assessments: Vec<Assessment> = Vec::new();
    if dcf.status == MethodStatus::Completed {
        assessments.push(dcf.assessment);
    }
    if comparative.status == MethodStatus::Completed {
        assessments.push(comparative.assessment);
    }

    if assessments.is_empty() {
        return "Unable to determine valuation".to_string();
    }

    let undervalued = assessments.iter().filter(|a| a.is_undervalued()).count();
    let overvalued = assessments.iter().filter(|a| a.is_overvalued()).count();
    let fair = assessments
        .iter()
        .filter(|a| **a == Assessment::FairValue)
        .count();

    if undervalued > overvalued && undervalued > fair {
        if undervalued == assessments.len() {
            "Strong Undervaluation Signal".to_string()
        } else {
            "Likely Undervalued".to_string()
        }
    } else if overvalued > undervalued && overvalued > fair {
        if overvalued == assessments.len() {
            "Strong Overvaluation Signal".to_string()
        } else {
            "Likely Overvalued".to_string()
        }
    } else {
        "Mixed Signals - Fair Value Range".to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::assumptions::ValuationAssumptions;

    fn dcf_with(fair_value: f64, status: MethodStatus) -> DcfValuation {
        let assessment = match status {
            MethodStatus::Completed => Assessment::classify(fair_value, 100.0),
            MethodStatus::InsufficientData => Assessment::UnableToCalculate,
        };
        DcfValuation {
            assumptions: ValuationAssumptions::for_market_cap(None),
            projected_cashflows: Vec::new(),
            terminal_value: 0.0,
            terminal_pv: 0.0,
            sum_pv_cashflows: 0.0,
            fair_value,
            current_price: 100.0,
            upside_percent: 0.0,
            assessment,
            status,
        }
    }

    fn comparative_with(fair_value: f64, status: MethodStatus) -> ComparativeValuation {
        let assessment = match status {
            MethodStatus::Completed => Assessment::classify(fair_value, 100.0),
            MethodStatus::InsufficientData => Assessment::UnableToDetermine,
        };
        ComparativeValuation {
            pe_estimate: None,
            pb_estimate: None,
            dividend_comparison: None,
            average_fair_value: fair_value,
            current_price: 100.0,
            upside_percent: 0.0,
            assessment,
            status,
        }
    }

    #[test]
    fn test_both_methods_weighted() {
        let dcf = dcf_with(90.0, MethodStatus::Completed);
        let comp = comparative_with(110.0, MethodStatus::Completed);
        let blended = combine(&dcf, &comp, 100.0);

        assert_eq!(blended.methods_used, 2);
        assert!((blended.confidence_percent - 50.0).abs() < 1e-9);
        // 0.4 * 90 + 0.6 * 110 = 102
        assert!((blended.weighted_fair_value - 102.0).abs() < 1e-9);
        assert!((blended.implied_return_percent - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_method_renormalizes() {
        let dcf = dcf_with(120.0, MethodStatus::Completed);
        let comp = comparative_with(100.0, MethodStatus::InsufficientData);
        let blended = combine(&dcf, &comp, 100.0);

        assert_eq!(blended.methods_used, 1);
        assert!((blended.confidence_percent - 25.0).abs() < 1e-9);
        assert!((blended.weighted_fair_value - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_methods_falls_back_to_price() {
        let dcf = dcf_with(100.0, MethodStatus::InsufficientData);
        let comp = comparative_with(100.0, MethodStatus::InsufficientData);
        let blended = combine(&dcf, &comp, 100.0);

        assert_eq!(blended.methods_used, 0);
        assert!((blended.confidence_percent - 0.0).abs() < 1e-9);
        assert!((blended.weighted_fair_value - 100.0).abs() < 1e-9);
        assert_eq!(blended.consensus, "Unable to determine valuation");
    }

    #[test]
    fn test_negative_dcf_value_is_excluded() {
        let dcf = dcf_with(-20.0, MethodStatus::Completed);
        let comp = comparative_with(110.0, MethodStatus::Completed);
        let blended = combine(&dcf, &comp, 100.0);

        assert_eq!(blended.methods_used, 1);
        assert!((blended.weighted_fair_value - 110.0).abs() < 1e-9);
    }

    #[test]
    fn test_consensus_wording() {
        let dcf = dcf_with(130.0, MethodStatus::Completed);
        let comp = comparative_with(120.0, MethodStatus::Completed);
        assert_eq!(combine(&dcf, &comp, 100.0).consensus, "Strong Undervaluation Signal");

        let dcf = dcf_with(130.0, MethodStatus::Completed);
        let comp = comparative_with(100.0, MethodStatus::Completed);
        assert_eq!(combine(&dcf, &comp, 100.0).consensus, "Mixed Signals - Fair Value Range");

        let dcf = dcf_with(80.0, MethodStatus::Completed);
        let comp = comparative_with(82.0, MethodStatus::Completed);
        assert_eq!(combine(&dcf, &comp, 100.0).consensus, "Strong Overvaluation Signal");

        let dcf = dcf_with(130.0, MethodStatus::InsufficientData);
        let comp = comparative_with(120.0, MethodStatus::Completed);
        assert_eq!(combine(&dcf, &comp, 100.0).consensus, "Strong Undervaluation Signal");
    }
}
