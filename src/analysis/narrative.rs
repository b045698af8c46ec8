//! Narrative generation from the structured analysis.
//!
//! Independent pure functions over the snapshot and the valuation results.
//! Each produces display text from threshold rules; none can fail, and each
//! falls back to generic wording when no rule fires.

use crate::analysis::types::{PricePerformance, Rating, Recommendation, RiskLevel, StockAnalysis};
use crate::market::StockSnapshot;

// ============================================================================
// Highlights, risks, catalysts
// ============================================================================

/// Key investment highlights from price position, multiples, size, income,
/// and volatility.
pub fn generate_highlights(snapshot: &StockSnapshot) -> Vec<String> {
    let mut highlights = Vec::new();

    if let Some(position) = snapshot.range_position() {
        if position < 0.3 {
            if let Some(low) = snapshot.week52_low {
                highlights.push(format!("Trading near 52-week low (${:.2})", low));
            }
        } else if position > 0.7 {
            if let Some(high) = snapshot.week52_high {
                highlights.push(format!("Trading near 52-week high (${:.2})", high));
            }
        }
    }

    if let Some(pe) = snapshot.pe_ratio.filter(|p| *p > 0.0) {
        if pe < 15.0 {
            highlights.push(format!("Low P/E ratio of {:.1} suggests potential value", pe));
        } else if pe > 30.0 {
            highlights.push(format!("High P/E ratio of {:.1} indicates growth premium", pe));
        }
    }

    if let Some(mc) = snapshot.market_cap.filter(|m| *m > 0.0) {
        if mc > 10e9 {
            highlights.push("Large-cap stock with established market presence".to_string());
        } else if mc > 2e9 {
            highlights.push("Mid-cap stock with growth potential".to_string());
        } else {
            highlights.push("Small-cap stock with higher growth/risk profile".to_string());
        }
    }

    if let Some(dy) = snapshot.dividend_yield.filter(|y| *y > 0.02) {
        highlights.push(format!("Dividend yield of {:.1}% provides income", dy * 100.0));
    }

    if let Some(beta) = snapshot.beta.filter(|b| *b > 0.0) {
        if beta < 0.8 {
            highlights.push("Low beta suggests defensive characteristics".to_string());
        } else if beta > 1.5 {
            highlights.push("High beta indicates growth/cyclical nature".to_string());
        }
    }

    if highlights.is_empty() {
        highlights = vec![
            "Standard market characteristics across reported metrics".to_string(),
            "Diversification recommended".to_string(),
        ];
    }

    highlights
}

/// Financial risk flags from valuation, volatility, income, size, and price
/// position.
pub fn identify_risks(snapshot: &StockSnapshot) -> Vec<String> {
    let mut risks = Vec::new();

    if snapshot.pe_ratio.filter(|p| *p >= 40.0).is_some() {
        risks.push("High P/E ratio suggests elevated valuation risk".to_string());
    }

    if snapshot.beta.filter(|b| *b > 1.5).is_some() {
        risks.push("High beta indicates above-average market sensitivity".to_string());
    }

    if snapshot.dividend_yield.filter(|y| *y >= 0.01).is_none() {
        risks.push(
            "Low/no dividend yield - not suitable for income-focused portfolios".to_string(),
        );
    }

    if snapshot.market_cap.filter(|m| *m > 0.0 && *m < 2e9).is_some() {
        risks.push("Small market cap increases liquidity and volatility risks".to_string());
    }

    if let Some(high) = snapshot.week52_high.filter(|h| *h > 0.0) {
        if snapshot.current_price / high > 0.95 {
            risks.push("Trading near 52-week high - limited upside potential".to_string());
        }
    }

    if risks.is_empty() {
        risks = vec![
            "General market volatility".to_string(),
            "Sector-specific risks".to_string(),
            "Economic cycle sensitivity".to_string(),
        ];
    }

    risks
}

/// Potential catalysts from the same threshold rules.
pub fn identify_catalysts(snapshot: &StockSnapshot) -> Vec<String> {
    let mut catalysts = Vec::new();

    if let Some(pe) = snapshot.pe_ratio.filter(|p| *p > 0.0) {
        if pe < 15.0 {
            catalysts.push("Potential re-rating as market recognizes value".to_string());
        } else if pe > 30.0 {
            catalysts.push("Earnings growth needed to justify valuation".to_string());
        }
    }

    if snapshot.dividend_yield.filter(|y| *y > 0.04).is_some() {
        catalysts.push("Attractive dividend yield in low-rate environment".to_string());
    }

    if let Some(mc) = snapshot.market_cap.filter(|m| *m > 0.0) {
        if mc < 2e9 {
            catalysts.push("Potential acquisition target".to_string());
        } else if mc > 50e9 {
            catalysts.push("Index inclusion and institutional buying".to_string());
        }
    }

    if snapshot.beta.filter(|b| *b > 0.0 && *b < 0.8).is_some() {
        catalysts.push("Defensive characteristics in volatile markets".to_string());
    }

    if catalysts.is_empty() {
        catalysts = vec![
            "Earnings growth acceleration".to_string(),
            "Market sentiment improvement".to_string(),
            "Sector rotation benefits".to_string(),
        ];
    }

    catalysts
}

// ============================================================================
// Qualitative assessments
// ============================================================================

/// Fixed sector outlook table.
pub fn sector_outlook(sector: Option<&str>) -> String {
    match sector {
        Some("Technology") => "Positive long-term growth driven by digital transformation",
        Some("Healthcare") => "Stable growth supported by aging demographics",
        Some("Financial Services") => "Cyclical performance tied to interest rates",
        Some("Consumer Discretionary") => "Sensitive to economic cycles and consumer spending",
        Some("Consumer Staples") => "Defensive characteristics with steady demand",
        Some("Energy") => "Volatile sector dependent on commodity prices",
        Some("Industrials") => "Cyclical growth tied to economic expansion",
        Some("Materials") => "Commodity-dependent with cyclical patterns",
        Some("Real Estate") => "Interest rate sensitive with income generation",
        Some("Utilities") => "Defensive sector with stable dividend yields",
        Some("Communication Services") => "Mixed growth driven by media and telecom trends",
        _ => "Sector-specific dynamics require careful analysis",
    }
    .to_string()
}

/// Competitive position from company size.
pub fn competitive_position(market_cap: Option<f64>) -> String {
    match market_cap.unwrap_or(0.0) {
        mc if mc > 100e9 => "Market leader with significant competitive advantages",
        mc if mc > 10e9 => "Established player with solid market position",
        mc if mc > 2e9 => "Growing company with emerging market presence",
        _ => "Smaller player with niche opportunities",
    }
    .to_string()
}

/// Financial strength wording from a three-point checklist.
pub fn financial_strength(snapshot: &StockSnapshot) -> String {
    let mut strength_score = 0;

    if snapshot
        .pe_ratio
        .filter(|p| (10.0..=20.0).contains(p))
        .is_some()
    {
        strength_score += 1;
    }
    if snapshot.dividend_yield.filter(|y| *y > 0.02).is_some() {
        strength_score += 1;
    }
    if snapshot.market_cap.filter(|m| *m > 10e9).is_some() {
        strength_score += 1;
    }

    match strength_score {
        3 => "Strong financial foundation",
        2 => "Solid financial position",
        _ => "Moderate financial strength",
    }
    .to_string()
}

/// Growth prospects from the P/E level and beta.
pub fn growth_prospects(snapshot: &StockSnapshot) -> String {
    let pe = snapshot.pe_ratio.filter(|p| *p > 0.0);
    let beta = snapshot.beta.unwrap_or(0.0);

    match pe {
        Some(p) if p > 25.0 && beta > 1.2 => "High growth expectations with elevated risk",
        Some(p) if p > 25.0 => "Growth premium reflected in valuation",
        Some(p) if p < 15.0 => "Value opportunity with potential upside",
        _ => "Balanced growth and value characteristics",
    }
    .to_string()
}

/// Overall risk level from accumulated risk factors.
pub fn assess_risk_level(snapshot: &StockSnapshot) -> RiskLevel {
    let beta = snapshot.beta.unwrap_or(0.0);
    let pe = snapshot.pe_ratio.unwrap_or(0.0);
    let market_cap = snapshot.market_cap.unwrap_or(0.0);

    let mut risk_factors = 0;

    if beta > 1.5 {
        risk_factors += 2;
    } else if beta > 1.2 {
        risk_factors += 1;
    }

    if pe > 40.0 {
        risk_factors += 2;
    } else if pe > 25.0 {
        risk_factors += 1;
    }

    if market_cap < 2e9 {
        risk_factors += 2;
    } else if market_cap < 10e9 {
        risk_factors += 1;
    }

    if risk_factors >= 4 {
        RiskLevel::High
    } else if risk_factors >= 2 {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}

/// Price performance inside the 52-week range.
pub fn price_performance(snapshot: &StockSnapshot) -> Option<PricePerformance> {
    let high = snapshot.week52_high.filter(|h| *h > 0.0)?;
    let low = snapshot.week52_low.filter(|l| *l > 0.0)?;
    if high <= low {
        return None;
    }
    let price = snapshot.current_price;

    Some(PricePerformance {
        gain_from_low_percent: (price - low) / low * 100.0,
        distance_from_high_percent: (high - price) / high * 100.0,
        position_in_range_percent: (price - low) / (high - low) * 100.0,
    })
}

/// Investment thesis sentence built from size, valuation wording, and the
/// rating.
pub fn investment_thesis(snapshot: &StockSnapshot, recommendation: &Recommendation) -> String {
    let name = snapshot.display_name();
    let mut parts = Vec::new();

    if let Some(mc) = snapshot.market_cap.filter(|m| *m > 0.0) {
        if mc > 10e9 {
            parts.push(format!("{} is a large-cap stock with established market presence", name));
        } else if mc > 2e9 {
            parts.push(format!("{} is a mid-cap stock with significant growth potential", name));
        } else {
            parts.push(format!("{} is a small-cap stock with high growth prospects", name));
        }
    } else {
        parts.push(format!("{} has an unreported market capitalization", name));
    }

    let wording = recommendation.valuation_wording.to_lowercase();
    if wording.contains("undervalued") {
        parts.push("trading at attractive valuation levels".to_string());
    } else if wording.contains("overvalued") {
        parts.push("reflecting premium growth expectations".to_string());
    } else {
        parts.push("trading at fair market value".to_string());
    }

    match recommendation.rating {
        Rating::StrongBuy | Rating::Buy => {
            parts.push("presenting a compelling investment opportunity with upside potential".to_string())
        }
        Rating::Sell => parts.push("facing headwinds that warrant caution".to_string()),
        Rating::Hold => parts.push(
            "suitable for portfolio diversification with balanced risk-return profile".to_string(),
        ),
    }

    format!(
        "{}. Our analysis suggests a {} rating based on fundamental metrics.",
        parts.join(", "),
        recommendation.rating
    )
}

// ============================================================================
// Long-form analysis text
// ============================================================================

/// Render the long-form markdown analysis for display.
///
/// Straight templated formatting over the structured fields; the
/// presentation exporter owns any further layout.
pub fn analysis_text(analysis: &StockAnalysis) -> String {
    let snapshot = &analysis.snapshot;
    let rec = &analysis.recommendation;

    let pe_line = snapshot
        .pe_ratio
        .map(|p| format!("{:.2}x", p))
        .unwrap_or_else(|| "N/A".to_string());
    let beta_line = snapshot
        .beta
        .map(|b| format!("{:.2} ({})", b, interpret_beta(b)))
        .unwrap_or_else(|| "N/A".to_string());
    let dy_line = snapshot
        .dividend_yield
        .map(|y| format!("{:.2}%", y * 100.0))
        .unwrap_or_else(|| "N/A".to_string());
    let range_line = match (snapshot.week52_low, snapshot.week52_high) {
        (Some(low), Some(high)) => format!("${:.2} - ${:.2}", low, high),
        _ => "N/A".to_string(),
    };
    let market_cap_line = snapshot
        .market_cap
        .map(format_market_cap)
        .unwrap_or_else(|| "N/A".to_string());

    format!(
        r#"# {name} ({symbol}) - Investment Analysis

## Executive Summary
{name} presents a {rating_lower} opportunity with our 12-month price target of ${target:.2}, representing {upside} potential upside from current levels.

## Current Market Position
- **Current Price**: ${price:.2}
- **Market Capitalization**: {market_cap}
- **P/E Ratio**: {pe}
- **Risk Level**: {risk}

## Valuation Assessment
Our analysis indicates the stock is **{wording_lower}** based on:
- Price-to-earnings ratio of {pe} vs sector average
- {strength}
- {position}

## Investment Thesis
{thesis}

## Valuation Summary
- **DCF Fair Value**: ${dcf_fair:.2} ({dcf_assessment})
- **WACC**: {wacc:.1}%
- **Comparative Fair Value**: ${comp_fair:.2} ({comp_assessment})
- **Blended Fair Value**: ${blended:.2} (confidence {confidence:.0}%)

## Financial Metrics Summary
- **Beta**: {beta}
- **Dividend Yield**: {dy}
- **52-Week Range**: {range}

## Growth Prospects
{growth}

## Risk Assessment
- **Overall Risk Level**: {risk}
- **Key Risk Factors**: {risk_factors}

## Analyst Recommendation
**{rating}** - Based on fundamental analysis of financial metrics, valuation parameters, and market positioning.
"#,
        name = snapshot.display_name(),
        symbol = snapshot.symbol,
        rating_lower = rec.rating.to_string().to_lowercase(),
        target = rec.target_price,
        upside = rec.upside_percent,
        price = snapshot.current_price,
        market_cap = market_cap_line,
        pe = pe_line,
        risk = analysis.risk_level,
        wording_lower = rec.valuation_wording.to_lowercase(),
        strength = analysis.financial_strength,
        position = analysis.competitive_position,
        thesis = analysis.investment_thesis,
        dcf_fair = analysis.valuation.dcf.fair_value,
        dcf_assessment = analysis.valuation.dcf.assessment,
        wacc = analysis.valuation.wacc.wacc * 100.0,
        comp_fair = analysis.valuation.comparative.average_fair_value,
        comp_assessment = analysis.valuation.comparative.assessment,
        blended = analysis.valuation.blended.weighted_fair_value,
        confidence = analysis.valuation.blended.confidence_percent,
        beta = beta_line,
        dy = dy_line,
        range = range_line,
        growth = analysis.growth_prospects,
        rating = rec.rating,
        risk_factors = analysis.risks.join("; "),
    )
}

/// Human-readable market cap: $2.9T, $150.0B, $500.0M.
pub fn format_market_cap(market_cap: f64) -> String {
    if market_cap > 1e12 {
        format!("${:.1}T", market_cap / 1e12)
    } else if market_cap > 1e9 {
        format!("${:.1}B", market_cap / 1e9)
    } else if market_cap > 1e6 {
        format!("${:.1}M", market_cap / 1e6)
    } else {
        format!("${:.0}", market_cap)
    }
}

fn interpret_beta(beta: f64) -> &'static str {
    if beta < 0.8 {
        "Low volatility"
    } else if beta > 1.5 {
        "High volatility"
    } else {
        "Moderate volatility"
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
    fn test_highlights_for_dividend_large_cap() {
        let highlights = generate_highlights(&snapshot());
        assert!(highlights
            .iter()
            .any(|h| h == "Large-cap stock with established market presence"));
        assert!(highlights
            .iter()
            .any(|h| h == "Dividend yield of 2.5% provides income"));
    }

    #[test]
    fn test_highlights_near_low() {
        let mut snap = snapshot();
        snap.current_price = 82.0;
        let highlights = generate_highlights(&snap);
        assert!(highlights.iter().any(|h| h.contains("52-week low")));
    }

    #[test]
    fn test_highlights_fallback() {
        let snap = StockSnapshot {
            symbol: "X".to_string(),
            company_name: String::new(),
            sector: None,
            industry: None,
            current_price: 10.0,
            pe_ratio: Some(20.0),
            eps: None,
            market_cap: None,
            beta: Some(1.0),
            dividend_yield: None,
            pb_ratio: None,
            week52_high: None,
            week52_low: None,
        };
        let highlights = generate_highlights(&snap);
        assert!(!highlights.is_empty());
    }

    #[test]
    fn test_risks_high_pe_at_threshold() {
        let mut snap = snapshot();
        snap.pe_ratio = Some(40.0);
        let risks = identify_risks(&snap);
        assert!(risks
            .iter()
            .any(|r| r == "High P/E ratio suggests elevated valuation risk"));
    }

    #[test]
    fn test_risks_small_cap_and_no_dividend() {
        let mut snap = snapshot();
        snap.market_cap = Some(1e9);
        snap.dividend_yield = None;
        let risks = identify_risks(&snap);
        assert!(risks
            .iter()
            .any(|r| r == "Small market cap increases liquidity and volatility risks"));
        assert!(risks.iter().any(|r| r.contains("Low/no dividend yield")));
    }

    #[test]
    fn test_risks_near_high() {
        let mut snap = snapshot();
        snap.current_price = 118.0;
        let risks = identify_risks(&snap);
        assert!(risks
            .iter()
            .any(|r| r == "Trading near 52-week high - limited upside potential"));
    }

    #[test]
    fn test_catalysts_mega_cap() {
        let mut snap = snapshot();
        snap.market_cap = Some(80e9);
        let catalysts = identify_catalysts(&snap);
        assert!(catalysts
            .iter()
            .any(|c| c == "Index inclusion and institutional buying"));
    }

    #[test]
    fn test_sector_outlook_known_and_unknown() {
        assert_eq!(
            sector_outlook(Some("Utilities")),
            "Defensive sector with stable dividend yields"
        );
        assert_eq!(
            sector_outlook(Some("Quantum Widgets")),
            "Sector-specific dynamics require careful analysis"
        );
        assert_eq!(
            sector_outlook(None),
            "Sector-specific dynamics require careful analysis"
        );
    }

    #[test]
    fn test_competitive_position_bands() {
        assert_eq!(
            competitive_position(Some(200e9)),
            "Market leader with significant competitive advantages"
        );
        assert_eq!(
            competitive_position(Some(20e9)),
            "Established player with solid market position"
        );
        assert_eq!(
            competitive_position(Some(5e9)),
            "Growing company with emerging market presence"
        );
        assert_eq!(
            competitive_position(None),
            "Smaller player with niche opportunities"
        );
    }

    #[test]
    fn test_financial_strength_checklist() {
        let snap = snapshot();
        // pe 20 in range, dy > 2%, mc > 10B
        assert_eq!(financial_strength(&snap), "Strong financial foundation");

        let mut weak = snap.clone();
        weak.pe_ratio = Some(30.0);
        weak.dividend_yield = None;
        weak.market_cap = Some(1e9);
        assert_eq!(financial_strength(&weak), "Moderate financial strength");
    }

    #[test]
    fn test_risk_level_accumulation() {
        // Small cap, high P/E, high beta
        let snap = StockSnapshot {
            symbol: "X".to_string(),
            company_name: String::new(),
            sector: None,
            industry: None,
            current_price: 10.0,
            pe_ratio: Some(45.0),
            eps: None,
            market_cap: Some(1e9),
            beta: Some(1.8),
            dividend_yield: None,
            pb_ratio: None,
            week52_high: None,
            week52_low: None,
        };
        assert_eq!(assess_risk_level(&snap), RiskLevel::High);

        // Large cap, moderate multiple, market beta
        assert_eq!(assess_risk_level(&snapshot()), RiskLevel::Low);
    }

    #[test]
    fn test_price_performance() {
        let perf = price_performance(&snapshot()).unwrap();
        assert!((perf.gain_from_low_percent - 25.0).abs() < 1e-9);
        assert!((perf.position_in_range_percent - 50.0).abs() < 1e-9);
        assert!((perf.distance_from_high_percent - (20.0 / 120.0 * 100.0)).abs() < 1e-9);
    }

    #[test]
    fn test_investment_thesis_wording() {
        let rec = Recommendation {
            rating: Rating::Buy,
            target_price: 115.0,
            upside_percent: "15.0%".to_string(),
            valuation_wording: "Moderately undervalued".to_string(),
        };
        let thesis = investment_thesis(&snapshot(), &rec);
        assert!(thesis.contains("Test Corp is a large-cap stock"));
        assert!(thesis.contains("attractive valuation levels"));
        assert!(thesis.contains("BUY rating"));
    }

    #[test]
    fn test_format_market_cap() {
        assert_eq!(format_market_cap(2.9e12), "$2.9T");
        assert_eq!(format_market_cap(150e9), "$150.0B");
        assert_eq!(format_market_cap(500e6), "$500.0M");
        assert_eq!(format_market_cap(1000.0), "$1000");
    }
}
