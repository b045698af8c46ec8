//! Market data input records.
//!
//! These are the plain numeric records supplied by the external market-data
//! collaborator. The service performs no quote fetching itself: the caller
//! posts a [`StockSnapshot`] (and optionally raw statements and a price
//! series for the AI-assisted path) and receives the analysis back.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Snapshot
// ============================================================================

/// Flat snapshot of market and per-share data for one company.
///
/// Optional fields model data the upstream source could not supply; every
/// calculator substitutes a conservative default instead of failing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockSnapshot {
    /// Ticker symbol (e.g., "AAPL")
    pub symbol: String,
    /// Company long name
    #[serde(default)]
    pub company_name: String,
    /// Sector (e.g., "Technology")
    #[serde(default)]
    pub sector: Option<String>,
    /// Industry within the sector
    #[serde(default)]
    pub industry: Option<String>,
    /// Last traded price
    pub current_price: f64,
    /// Trailing P/E ratio
    #[serde(default)]
    pub pe_ratio: Option<f64>,
    /// Trailing earnings per share
    #[serde(default)]
    pub eps: Option<f64>,
    /// Market capitalization (USD)
    #[serde(default)]
    pub market_cap: Option<f64>,
    /// Beta versus the broad market
    #[serde(default)]
    pub beta: Option<f64>,
    /// Dividend yield as a fraction (0.025 = 2.5%)
    #[serde(default)]
    pub dividend_yield: Option<f64>,
    /// Price-to-book ratio
    #[serde(default)]
    pub pb_ratio: Option<f64>,
    /// 52-week high
    #[serde(default)]
    pub week52_high: Option<f64>,
    /// 52-week low
    #[serde(default)]
    pub week52_low: Option<f64>,
}

impl StockSnapshot {
    /// Position of the current price inside the 52-week range (0.0-1.0).
    ///
    /// Returns `None` when the range is missing or degenerate.
    pub fn range_position(&self) -> Option<f64> {
        let high = self.week52_high?;
        let low = self.week52_low?;
        if high > low && self.current_price > 0.0 {
            Some((self.current_price - low) / (high - low))
        } else {
            None
        }
    }

    /// Company name, falling back to the symbol.
    pub fn display_name(&self) -> &str {
        if self.company_name.is_empty() {
            &self.symbol
        } else {
            &self.company_name
        }
    }
}

// ============================================================================
// Premium-path inputs
// ============================================================================

/// One point of a historical close series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// One fiscal period of a financial statement: named line items in
/// reporting currency.
pub type StatementPeriod = BTreeMap<String, f64>;

/// Raw financial statements keyed by fiscal period label (e.g., "2024").
///
/// Only the AI-assisted path reads these; they are embedded verbatim into
/// the analyst prompt and carry no computation invariants.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialStatements {
    #[serde(default)]
    pub income_statement: BTreeMap<String, StatementPeriod>,
    #[serde(default)]
    pub balance_sheet: BTreeMap<String, StatementPeriod>,
    #[serde(default)]
    pub cash_flow: BTreeMap<String, StatementPeriod>,
}

impl FinancialStatements {
    /// Whether any statement contains data.
    pub fn is_empty(&self) -> bool {
        self.income_statement.is_empty()
            && self.balance_sheet.is_empty()
            && self.cash_flow.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with_range(price: f64, low: Option<f64>, high: Option<f64>) -> StockSnapshot {
        StockSnapshot {
            symbol: "TEST".to_string(),
            company_name: String::new(),
            sector: None,
            industry: None,
            current_price: price,
            pe_ratio: None,
            eps: None,
            market_cap: None,
            beta: None,
            dividend_yield: None,
            pb_ratio: None,
            week52_high: high,
            week52_low: low,
        }
    }

    #[test]
    fn test_range_position() {
        let snap = snapshot_with_range(75.0, Some(50.0), Some(100.0));
        assert!((snap.range_position().unwrap() - 0.5).abs() < 1e-9);

        let snap = snapshot_with_range(50.0, Some(50.0), Some(100.0));
        assert!((snap.range_position().unwrap() - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_range_position_missing_or_degenerate() {
        assert!(snapshot_with_range(75.0, None, Some(100.0)).range_position().is_none());
        assert!(snapshot_with_range(75.0, Some(50.0), None).range_position().is_none());
        // Inverted range is rejected rather than extrapolated
        assert!(snapshot_with_range(75.0, Some(100.0), Some(50.0)).range_position().is_none());
    }

    #[test]
    fn test_display_name_falls_back_to_symbol() {
        let snap = snapshot_with_range(10.0, None, None);
        assert_eq!(snap.display_name(), "TEST");
    }

    #[test]
    fn test_snapshot_deserializes_with_missing_optionals() {
        let snap: StockSnapshot =
            serde_json::from_str(r#"{"symbol": "XYZ", "current_price": 12.5}"#).unwrap();
        assert_eq!(snap.symbol, "XYZ");
        assert!(snap.pe_ratio.is_none());
        assert!(snap.market_cap.is_none());
    }
}
