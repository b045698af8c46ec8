//! Pitch-deck content builder.
//!
//! Maps a completed [`StockAnalysis`] onto structured slide content for the
//! external presentation exporter, which owns layout and file output. A
//! markdown rendering is provided for direct display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::{MethodStatus, StockAnalysis};
use crate::analysis::narrative::format_market_cap;

/// One slide of structured content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slide {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    /// Bullet lines for list slides
    #[serde(default)]
    pub bullets: Vec<String>,
    /// Long-form body for text slides
    #[serde(default)]
    pub body: Option<String>,
}

impl Slide {
    fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            bullets: Vec::new(),
            body: None,
        }
    }
}

/// Slide-deck content for one analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PitchDeck {
    pub symbol: String,
    pub company_name: String,
    pub slides: Vec<Slide>,
    pub generated_at: DateTime<Utc>,
}

/// Build the pitch deck for an analysis report.
pub fn build_deck(analysis: &StockAnalysis) -> PitchDeck {
    let snapshot = &analysis.snapshot;
    let rec = &analysis.recommendation;
    let generated_at = Utc::now();

    // Title
    let mut title = Slide::titled(format!("{} Stock Pitch", analysis.symbol));
    title.subtitle = Some(format!(
        "Investment Analysis - {}\n{}",
        analysis.company_name,
        generated_at.format("%B %d, %Y")
    ));

    // Executive summary: thesis plus the key metrics
    let mut summary = Slide::titled("Executive Summary");
    summary.body = Some(analysis.investment_thesis.clone());
    summary.bullets.push(format!("Current Price: ${:.2}", snapshot.current_price));
    if let Some(mc) = snapshot.market_cap {
        summary.bullets.push(format!("Market Cap: {}", format_market_cap(mc)));
    }
    if let Some(pe) = snapshot.pe_ratio {
        summary.bullets.push(format!("P/E Ratio: {:.2}x", pe));
    }
    if let Some(eps) = snapshot.eps {
        summary.bullets.push(format!("EPS: ${:.2}", eps));
    }
    if let Some(dy) = snapshot.dividend_yield {
        summary.bullets.push(format!("Dividend Yield: {:.2}%", dy * 100.0));
    }
    summary.bullets.push(format!("Risk Level: {}", analysis.risk_level));
    summary.bullets.push(format!(
        "Financial Health: {}",
        analysis.scorecard.grade
    ));

    // Valuation
    let mut valuation = Slide::titled("Valuation Analysis");
    let dcf = &analysis.valuation.dcf;
    if dcf.status == MethodStatus::Completed {
        valuation.bullets.push(format!(
            "DCF Fair Value: ${:.2} ({})",
            dcf.fair_value, dcf.assessment
        ));
    } else {
        valuation.bullets.push(format!("DCF: {}", dcf.assessment));
    }
    valuation.bullets.push(format!(
        "WACC: {:.1}% ({})",
        analysis.valuation.wacc.wacc * 100.0,
        analysis.valuation.wacc.interpretation
    ));
    let comparative = &analysis.valuation.comparative;
    if comparative.status == MethodStatus::Completed {
        valuation.bullets.push(format!(
            "Comparative Fair Value: ${:.2} ({})",
            comparative.average_fair_value, comparative.assessment
        ));
    } else {
        valuation
            .bullets
            .push(format!("Comparative: {}", comparative.assessment));
    }
    let blended = &analysis.valuation.blended;
    valuation.bullets.push(format!(
        "Blended Fair Value: ${:.2} (confidence {:.0}%)",
        blended.weighted_fair_value, blended.confidence_percent
    ));
    valuation.bullets.push(format!("Consensus: {}", blended.consensus));

    // Detailed analysis
    let mut detail = Slide::titled("Detailed Analysis");
    detail.body = Some(analysis.analysis_text.clone());

    // Highlights and risks
    let mut highlights_risks = Slide::titled("Highlights & Risks");
    for h in &analysis.highlights {
        highlights_risks.bullets.push(format!("Highlight: {}", h));
    }
    for r in &analysis.risks {
        highlights_risks.bullets.push(format!("Risk: {}", r));
    }

    // Recommendation
    let mut recommendation = Slide::titled("Investment Recommendation");
    recommendation.body = Some(analysis.investment_thesis.clone());
    recommendation.bullets.push(format!("Recommendation: {}", rec.rating));
    recommendation.bullets.push(format!(
        "Price Target (12m): ${:.2} ({} upside)",
        rec.target_price, rec.upside_percent
    ));
    recommendation
        .bullets
        .push(format!("Sector Outlook: {}", analysis.sector_outlook));

    PitchDeck {
        symbol: analysis.symbol.clone(),
        company_name: analysis.company_name.clone(),
        slides: vec![
            title,
            summary,
            valuation,
            detail,
            highlights_risks,
            recommendation,
        ],
        generated_at,
    }
}

impl PitchDeck {
    /// Render the deck as markdown for display.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        for (i, slide) in self.slides.iter().enumerate() {
            if i == 0 {
                md.push_str(&format!("# {}\n\n", slide.title));
            } else {
                md.push_str(&format!("## {}\n\n", slide.title));
            }

            if let Some(ref subtitle) = slide.subtitle {
                md.push_str(&format!("*{}*\n\n", subtitle.replace('\n', " - ")));
            }

            if let Some(ref body) = slide.body {
                md.push_str(body);
                md.push_str("\n\n");
            }

            for bullet in &slide.bullets {
                md.push_str(&format!("- {}\n", bullet));
            }
            if !slide.bullets.is_empty() {
                md.push('\n');
            }
        }

        md
    }
}

// ============================================================================
// Tests
// ============================================================================
