//! Rule-based recommendation.
//!
//! A first-pass rating and price target derive purely from trailing P/E
//! bands; the completed DCF assessment then adjusts both through an
//! explicit lookup table so every (rating, assessment) pair is auditable.
//! A STRONG BUY from the P/E bands is never lowered by the adjustment.

use crate::analysis::types::{
    Assessment, DcfValuation, MethodStatus, Rating, Recommendation,
};
use crate::market::StockSnapshot;

/// First-pass recommendation from the P/E bands.
///
/// A missing or non-positive P/E falls through to the default band.
pub fn base_recommendation(snapshot: &StockSnapshot) -> Recommendation {
    let price = snapshot.current_price;
    let pe = snapshot.pe_ratio.filter(|p| *p > 0.0);

    let (rating, valuation_wording, multiplier) = match pe {
        Some(p) if p < 12.0 => (Rating::StrongBuy, "Significantly undervalued", 1.25),
        Some(p) if p < 18.0 => (Rating::Buy, "Moderately undervalued", 1.15),
        Some(p) if p > 35.0 => (Rating::Sell, "Significantly overvalued", 0.85),
        Some(p) if p > 25.0 => (Rating::Hold, "Moderately overvalued", 0.95),
        _ => (Rating::Hold, "Fair value", 1.05),
    };

    build(rating, price * multiplier, price, valuation_wording)
}

/// Adjust the base recommendation with the DCF assessment.
///
/// The table upgrades toward STRONG BUY on undervaluation signals and
/// downgrades on overvaluation signals; target clamps pull the target
/// toward the DCF fair value. Rows for an indeterminate DCF and for the
/// fair-value band are explicit identity entries. Downward clamps apply
/// only to downgraded ratings, so an undisturbed STRONG BUY keeps its
/// P/E-band target.
pub fn adjust_for_dcf(base: &Recommendation, dcf: &DcfValuation) -> Recommendation {
    if dcf.status != MethodStatus::Completed {
        return base.clone();
    }

    let fv = dcf.fair_value;
    let price = dcf.current_price;
    let rating = base.rating;
    let target = base.target_price;

    let (adjusted_rating, adjusted_target) = match (dcf.assessment, rating) {
        (Assessment::SignificantlyUndervalued, Rating::StrongBuy) => {
            (Rating::StrongBuy, target.max(fv * 0.90))
        }
        (Assessment::SignificantlyUndervalued, Rating::Buy) => {
            (Rating::StrongBuy, target.max(fv * 0.90))
        }
        (Assessment::SignificantlyUndervalued, Rating::Hold) => {
            (Rating::StrongBuy, target.max(fv * 0.90))
        }
        (Assessment::SignificantlyUndervalued, Rating::Sell) => {
            (Rating::Hold, target.max(fv * 0.90))
        }

        (Assessment::Undervalued, Rating::StrongBuy) => (Rating::StrongBuy, target.max(fv * 0.95)),
        (Assessment::Undervalued, Rating::Buy) => (Rating::Buy, target.max(fv * 0.95)),
        (Assessment::Undervalued, Rating::Hold) => (Rating::Buy, target.max(fv * 0.95)),
        (Assessment::Undervalued, Rating::Sell) => (Rating::Hold, target.max(fv * 0.95)),

        (Assessment::FairValue, rating) => (rating, target),

        (Assessment::Overvalued, Rating::StrongBuy) => (Rating::StrongBuy, target),
        (Assessment::Overvalued, Rating::Buy) => (Rating::Hold, target.min(fv * 1.05)),
        (Assessment::Overvalued, Rating::Hold) => (Rating::Hold, target.min(fv * 1.05)),
        (Assessment::Overvalued, Rating::Sell) => (Rating::Sell, target.min(fv * 1.05)),

        (Assessment::SignificantlyOvervalued, Rating::StrongBuy) => (Rating::StrongBuy, target),
        (Assessment::SignificantlyOvervalued, Rating::Buy) => (Rating::Hold, target.min(fv * 1.10)),
        (Assessment::SignificantlyOvervalued, Rating::Hold) => (Rating::Sell, target.min(fv * 1.10)),
        (Assessment::SignificantlyOvervalued, Rating::Sell) => (Rating::Sell, target.min(fv * 1.10)),

        // A completed DCF never carries these, kept for exhaustiveness
        (Assessment::UnableToCalculate, rating) | (Assessment::UnableToDetermine, rating) => {
            (rating, target)
        }
    };

    build(
        adjusted_rating,
        adjusted_target,
        price,
        &base.valuation_wording,
    )
}

fn build(rating: Rating, target: f64, price: f64, valuation_wording: &str) -> Recommendation {
    let target_price = round_cents(target);
    let upside_percent = if price > 0.0 {
        format!("{:.1}%", (target_price - price) / price * 100.0)
    } else {
        "N/A".to_string()
    };

    Recommendation {
        rating,
        target_price,
        upside_percent,
        valuation_wording: valuation_wording.to_string(),
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// Tests
// ============================================================================
