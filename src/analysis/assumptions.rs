//! Valuation assumptions derived from market-capitalization tier.
//!
//! Larger companies get lower growth and lower discount rates; smaller
//! companies get higher growth paired with a higher required return. The
//! selector is a total function: a missing or zero market cap resolves to
//! the small-cap bundle.

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;

/// Mega-cap threshold ($1T)
const MEGA_CAP_THRESHOLD: f64 = 1e12;

/// Large-cap threshold ($200B)
const LARGE_CAP_THRESHOLD: f64 = 2e11;

/// Mid-cap threshold ($10B)
const MID_CAP_THRESHOLD: f64 = 1e10;

/// Market-capitalization tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapTier {
    /// Above $1T
    Mega,
    /// Above $200B
    Large,
    /// Above $10B
    Mid,
    /// Everything else, including unknown market cap
    Small,
}

impl CapTier {
    /// Classify a market cap into a tier. Total over all inputs.
    pub fn from_market_cap(market_cap: Option<f64>) -> Self {
        match market_cap {
            Some(mc) if mc > MEGA_CAP_THRESHOLD => Self::Mega,
            Some(mc) if mc > LARGE_CAP_THRESHOLD => Self::Large,
            Some(mc) if mc > MID_CAP_THRESHOLD => Self::Mid,
            _ => Self::Small,
        }
    }
}

impl std::fmt::Display for CapTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mega => write!(f, "Mega-cap"),
            Self::Large => write!(f, "Large-cap"),
            Self::Mid => write!(f, "Mid-cap"),
            Self::Small => write!(f, "Small-cap"),
        }
    }
}

/// Assumption bundle used by the DCF, WACC, and comparative calculators.
///
/// All rates are fractions (0.06 = 6%).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ValuationAssumptions {
    /// Tier the bundle was derived from
    pub tier: CapTier,
    /// Annual cash-flow growth over the explicit 5-year horizon
    pub growth_rate_5y: f64,
    /// Perpetual growth beyond the horizon
    pub terminal_growth_rate: f64,
    /// Discount rate applied to projected cash flows
    pub discount_rate: f64,
    /// 10-year treasury proxy
    pub risk_free_rate: f64,
    /// Historical equity risk premium
    pub market_risk_premium: f64,
    /// Flat corporate tax rate
    pub tax_rate: f64,
    /// Industry average P/E for multiple valuation
    pub industry_pe: f64,
    /// Industry average P/B for multiple valuation
    pub industry_pb: f64,
    /// Industry average dividend yield (fraction)
    pub industry_dividend_yield: f64,
}

impl ValuationAssumptions {
    /// Select the assumption bundle for a market cap.
    pub fn for_market_cap(market_cap: Option<f64>) -> Self {
        let tier = CapTier::from_market_cap(market_cap);
        let (growth_rate_5y, terminal_growth_rate, discount_rate) = match tier {
            CapTier::Mega => (0.06, 0.025, 0.08),
            CapTier::Large => (0.08, 0.03, 0.09),
            CapTier::Mid => (0.10, 0.035, 0.10),
            CapTier::Small => (0.12, 0.04, 0.12),
        };

        Self {
            tier,
            growth_rate_5y,
            terminal_growth_rate,
            discount_rate,
            risk_free_rate: 0.045,
            market_risk_premium: 0.065,
            tax_rate: 0.25,
            industry_pe: 20.0,
            industry_pb: 2.5,
            industry_dividend_yield: 0.025,
        }
    }

    /// Apply caller-supplied overrides from the analysis configuration.
    ///
    /// An override that would break `discount_rate > terminal_growth_rate`
    /// is ignored, keeping the terminal-value denominator positive.
    pub fn with_overrides(mut self, config: &AnalysisConfig) -> Self {
        if let Some(g) = config.growth_rate {
            self.growth_rate_5y = g;
        }
        if let Some(tg) = config.terminal_growth_rate {
            if tg < self.discount_rate {
                self.terminal_growth_rate = tg;
            }
        }
        if let Some(r) = config.discount_rate {
            if r > self.terminal_growth_rate {
                self.discount_rate = r;
            }
        }
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
