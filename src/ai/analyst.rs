//! Generative analyst bridge (premium path).
//!
//! Calls an OpenAI-compatible chat-completions endpoint with a prompt
//! embedding the snapshot and, when supplied, the raw financial statements.
//! The response is parsed best-effort: strict JSON first, then JSON lifted
//! out of a markdown code block or brace-matched from surrounding prose,
//! then pattern extraction of individual fields with defaults.
//!
//! One request per analysis, no retries; callers degrade to the rule-based
//! path when this bridge fails.

use regex::Regex;
use std::time::Duration;
use tracing::{debug, warn};

use super::types::{AiAnalysis, ChatMessage, ChatRequest, ChatResponse};
use crate::analysis::Rating;
use crate::config::{AiConfig, Config};
use crate::market::{FinancialStatements, PricePoint, StockSnapshot};

/// Errors from the analyst bridge.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error: HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("response carried no completion")]
    EmptyResponse,
}

/// Bridge to the generative analyst service.
pub struct AiAnalyst {
    config: AiConfig,
    api_key: String,
    client: reqwest::Client,
}

impl AiAnalyst {
    /// Build from the service configuration. Returns `None` when no API key
    /// is configured, which selects the rule-based path.
    pub fn from_config(config: &Config) -> Option<Self> {
        let api_key = config.openai_api_key()?.to_string();
        Some(Self::new(config.ai.clone(), api_key))
    }

    /// Build with explicit settings.
    pub fn new(config: AiConfig, api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            config,
            api_key,
            client,
        }
    }

    /// Request an analyst report for a snapshot.
    pub async fn analyze(
        &self,
        snapshot: &StockSnapshot,
        statements: Option<&FinancialStatements>,
        price_history: &[PricePoint],
    ) -> Result<AiAnalysis, AiError> {
        let prompt = build_prompt(snapshot, statements, price_history);

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(prompt),
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let content = self.send_chat(&request).await?;
        debug!(
            symbol = %snapshot.symbol,
            response_len = content.len(),
            "Analyst response received"
        );

        Ok(parse_response(&content))
    }

    /// Send one chat request. A single attempt; failures surface to the
    /// caller, which falls back to the rule-based report.
    async fn send_chat(&self, request: &ChatRequest) -> Result<String, AiError> {
        let url = format!(
            "{}/chat/completions",
            self.config.endpoint.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AiError::Network("request timeout".into())
                } else {
                    AiError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AiError::Network(format!("failed to parse response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .ok_or(AiError::EmptyResponse)
    }
}

const SYSTEM_PROMPT: &str = "You are a professional equity research analyst. You provide balanced, objective analysis using the financial data supplied. You calculate DCF and WACC from the actual numbers, recommend BUY for significantly undervalued stocks, HOLD for fairly valued stocks, and SELL for overvalued stocks. Respond ONLY with valid JSON showing your calculations.";

/// Build the analysis prompt for one snapshot.
fn build_prompt(
    snapshot: &StockSnapshot,
    statements: Option<&FinancialStatements>,
    price_history: &[PricePoint],
) -> String {
    let fmt_opt = |v: Option<f64>| v.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "N/A".into());
    let fmt_cap = |v: Option<f64>| {
        v.map(|v| format!("${:.0}", v))
            .unwrap_or_else(|| "N/A".into())
    };

    let mut prompt = format!(
        r#"Analyze {name} ({symbol}) as an equity research analyst.

COMPANY DATA (use these exact numbers):
- Sector: {sector} | Industry: {industry}
- Current Price: ${price:.2}
- Market Cap: {market_cap}
- P/E Ratio: {pe} | EPS: {eps}
- Price-to-Book: {pb}
- Dividend Yield: {dy}
- Beta: {beta}
- 52-Week Range: {low} - {high}

REQUIRED ANALYSIS:
1. DCF valuation: project 5 years of cash flows with a terminal value,
   discount at a CAPM-based rate, and compare fair value to price.
2. WACC: cost of equity from CAPM, cost of debt from credit quality.
3. Valuation assessment: is the current multiple justified against peers?
4. Recommendation: BUY if more than 15% undervalued with sound
   fundamentals, HOLD if fairly valued, SELL if overvalued.

RESPOND WITH ONLY THIS JSON:
{{
  "analysis": "detailed analysis with calculation steps",
  "investment_thesis": "one-paragraph thesis",
  "highlights": ["...", "..."],
  "risks": ["...", "..."],
  "recommendation": "STRONG BUY|BUY|HOLD|SELL",
  "target_price": 0.0,
  "upside_potential": 0.0
}}
"#,
        name = snapshot.display_name(),
        symbol = snapshot.symbol,
        sector = snapshot.sector.as_deref().unwrap_or("N/A"),
        industry = snapshot.industry.as_deref().unwrap_or("N/A"),
        price = snapshot.current_price,
        market_cap = fmt_cap(snapshot.market_cap),
        pe = fmt_opt(snapshot.pe_ratio),
        eps = fmt_opt(snapshot.eps),
        pb = fmt_opt(snapshot.pb_ratio),
        dy = fmt_opt(snapshot.dividend_yield),
        beta = fmt_opt(snapshot.beta),
        low = fmt_opt(snapshot.week52_low),
        high = fmt_opt(snapshot.week52_high),
    );

    if let (Some(first), Some(last)) = (price_history.first(), price_history.last()) {
        let low = price_history.iter().map(|p| p.close).fold(f64::INFINITY, f64::min);
        let high = price_history
            .iter()
            .map(|p| p.close)
            .fold(f64::NEG_INFINITY, f64::max);
        let period_return = if first.close > 0.0 {
            (last.close - first.close) / first.close * 100.0
        } else {
            0.0
        };
        prompt.push_str(&format!(
            "\nPRICE HISTORY ({} to {}): {} closes, range ${:.2} - ${:.2}, period return {:.1}%\n",
            first.date,
            last.date,
            price_history.len(),
            low,
            high,
            period_return,
        ));
    }

    if let Some(statements) = statements.filter(|s| !s.is_empty()) {
        prompt.push_str("\nFINANCIAL STATEMENTS (latest periods):\n");
        for (label, periods) in [
            ("Income Statement", &statements.income_statement),
            ("Balance Sheet", &statements.balance_sheet),
            ("Cash Flow", &statements.cash_flow),
        ] {
            if let Some((period, items)) = periods.iter().next_back() {
                prompt.push_str(&format!("{} ({}):\n", label, period));
                for (item, value) in items {
                    prompt.push_str(&format!("  {}: {:.0}\n", item, value));
                }
            }
        }
    }

    prompt
}

// ============================================================================
// Response parsing
// ============================================================================

/// Parse the analyst's response into a structured record. Total: a response
/// no parser understands still yields a record carrying the raw text.
pub fn parse_response(content: &str) -> AiAnalysis {
    if let Some(json) = extract_json(content) {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&json) {
            return from_json_value(&value, content);
        }
    }

    warn!("Analyst response was not valid JSON, extracting fields by pattern");
    from_patterns(content)
}

/// Extract JSON from a response that may wrap it in a markdown code block
/// or surrounding prose.
fn extract_json(content: &str) -> Option<String> {
    // Code block first
    if let Some(start) = content.find("```json") {
        let start = start + 7;
        if let Some(end) = content[start..].find("```") {
            return Some(content[start..start + end].trim().to_string());
        }
    }

    // Brace-matched raw JSON
    let start = content.find('{')?;
    let mut depth = 0usize;
    for (i, c) in content[start..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(content[start..start + i + 1].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

fn from_json_value(value: &serde_json::Value, raw: &str) -> AiAnalysis {
    let str_field = |key: &str| {
        value
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string()
    };
    let list_field = |key: &str| {
        value
            .get(key)
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(|s| s.to_string()))
                    .collect()
            })
            .unwrap_or_default()
    };

    let analysis = {
        let text = str_field("analysis");
        if text.is_empty() {
            raw.to_string()
        } else {
            text
        }
    };

    let recommendation = value
        .get("recommendation")
        .and_then(|v| v.as_str())
        .map(Rating::parse_lenient)
        .unwrap_or(Rating::Hold);

    let target_price = number_field(value, "target_price");
    let upside = value
        .get("upside_potential")
        .map(format_upside)
        .unwrap_or_else(|| "0.0%".to_string());

    AiAnalysis {
        analysis,
        investment_thesis: str_field("investment_thesis"),
        highlights: list_field("highlights"),
        risks: list_field("risks"),
        recommendation,
        target_price,
        upside_potential: upside,
    }
}

/// Accept a numeric field given either as a number or a numeric string.
fn number_field(value: &serde_json::Value, key: &str) -> f64 {
    match value.get(key) {
        Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .trim_start_matches('$')
            .trim_end_matches('%')
            .parse()
            .unwrap_or(0.0),
        _ => 0.0,
    }
}

fn format_upside(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Number(n) => format!("{:.1}%", n.as_f64().unwrap_or(0.0)),
        serde_json::Value::String(s) => {
            let trimmed = s.trim().trim_end_matches('%');
            match trimmed.parse::<f64>() {
                Ok(v) => format!("{:.1}%", v),
                Err(_) => s.clone(),
            }
        }
        _ => "0.0%".to_string(),
    }
}

/// Last-resort field extraction from a malformed response.
fn from_patterns(content: &str) -> AiAnalysis {
    let capture = |pattern: &str| -> Option<String> {
        Regex::new(pattern)
            .ok()?
            .captures(content)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
    };

    let recommendation = capture(r#""recommendation"\s*:\s*"([^"]+)""#)
        .map(|s| Rating::parse_lenient(&s))
        .unwrap_or(Rating::Hold);

    let target_price = capture(r#""target_price"\s*:\s*([\d.]+)"#)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.0);

    let upside_potential = capture(r#""upside_potential"\s*:\s*"?(-?[\d.]+)"#)
        .and_then(|s| s.parse::<f64>().ok())
        .map(|v| format!("{:.1}%", v))
        .unwrap_or_else(|| "0.0%".to_string());

    let list = |key: &str| -> Vec<String> {
        let pattern = format!(r#"(?s)"{}"\s*:\s*\[(.*?)\]"#, key);
        Regex::new(&pattern)
            .ok()
            .and_then(|re| re.captures(content))
            .and_then(|c| c.get(1))
            .map(|m| {
                m.as_str()
                    .split(',')
                    .map(|s| s.trim().trim_matches('"').to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    };

    AiAnalysis {
        analysis: content.to_string(),
        investment_thesis: capture(r#""investment_thesis"\s*:\s*"([^"]+)""#).unwrap_or_default(),
        highlights: list("highlights"),
        risks: list("risks"),
        recommendation,
        target_price,
        upside_potential,
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
            industry: Some("Software".to_string()),
            current_price: 100.0,
            pe_ratio: Some(20.0),
            eps: Some(5.0),
            market_cap: Some(50e9),
            beta: Some(1.1),
            dividend_yield: Some(0.02),
            pb_ratio: Some(3.0),
            week52_high: Some(120.0),
            week52_low: Some(80.0),
        }
    }

    #[test]
    fn test_prompt_embeds_snapshot() {
        let prompt = build_prompt(&snapshot(), None, &[]);
        assert!(prompt.contains("Test Corp (TEST)"));
        assert!(prompt.contains("Current Price: $100.00"));
        assert!(prompt.contains("P/E Ratio: 20.00"));
        assert!(prompt.contains("RESPOND WITH ONLY THIS JSON"));
        assert!(!prompt.contains("PRICE HISTORY"));
    }

    #[test]
    fn test_prompt_embeds_price_history() {
        let history = vec![
            PricePoint {
                date: chrono::NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
                close: 90.0,
            },
            PricePoint {
                date: chrono::NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
                close: 99.0,
            },
        ];
        let prompt = build_prompt(&snapshot(), None, &history);
        assert!(prompt.contains("PRICE HISTORY (2025-01-02 to 2025-06-30)"));
        assert!(prompt.contains("range $90.00 - $99.00"));
        assert!(prompt.contains("period return 10.0%"));
    }

    #[test]
    fn test_prompt_embeds_statements() {
        let mut statements = FinancialStatements::default();
        let mut period = std::collections::BTreeMap::new();
        period.insert("Total Revenue".to_string(), 1_000_000.0);
        statements
            .income_statement
            .insert("2024".to_string(), period);

        let prompt = build_prompt(&snapshot(), Some(&statements), &[]);
        assert!(prompt.contains("Income Statement (2024):"));
        assert!(prompt.contains("Total Revenue: 1000000"));
    }

    #[test]
    fn test_prompt_missing_fields_render_na() {
        let mut snap = snapshot();
        snap.pe_ratio = None;
        snap.beta = None;
        let prompt = build_prompt(&snap, None, &[]);
        assert!(prompt.contains("P/E Ratio: N/A"));
        assert!(prompt.contains("Beta: N/A"));
    }

    #[test]
    fn test_extract_json_from_code_block() {
        let content = "Here you go:\n```json\n{\"recommendation\": \"BUY\"}\n```\nDone.";
        let json = extract_json(content).unwrap();
        assert_eq!(json, "{\"recommendation\": \"BUY\"}");
    }

    #[test]
    fn test_extract_json_brace_matched() {
        let content = r#"Based on analysis: {"recommendation": "SELL", "nested": {"a": 1}} is the result."#;
        let json = extract_json(content).unwrap();
        assert!(json.starts_with('{'));
        assert!(json.ends_with('}'));
        assert!(json.contains("nested"));
    }

    #[test]
    fn test_extract_json_absent() {
        assert!(extract_json("no structured output here").is_none());
    }

    #[test]
    fn test_parse_well_formed_response() {
        let content = r#"```json
{
  "analysis": "DCF fair value $115 vs $100.",
  "investment_thesis": "Modest upside at reasonable risk.",
  "highlights": ["DCF fair value $115", "WACC 9.2%"],
  "risks": ["Valuation risk", "Beta 1.1"],
  "recommendation": "BUY",
  "target_price": 115.0,
  "upside_potential": 15.0
}
```"#;
        let parsed = parse_response(content);
        assert_eq!(parsed.recommendation, Rating::Buy);
        assert!((parsed.target_price - 115.0).abs() < 1e-9);
        assert_eq!(parsed.upside_potential, "15.0%");
        assert_eq!(parsed.highlights.len(), 2);
        assert_eq!(parsed.risks.len(), 2);
        assert_eq!(parsed.investment_thesis, "Modest upside at reasonable risk.");
    }

    #[test]
    fn test_parse_numeric_strings() {
        let content = r#"{"recommendation": "HOLD", "target_price": "$105.50", "upside_potential": "5.5%"}"#;
        let parsed = parse_response(content);
        assert!((parsed.target_price - 105.5).abs() < 1e-9);
        assert_eq!(parsed.upside_potential, "5.5%");
    }

    #[test]
    fn test_parse_malformed_falls_back_to_patterns() {
        // Trailing comma breaks strict JSON parsing
        let content = r#"
Some prose first.
"recommendation": "STRONG BUY",
"target_price": 130.5,
"upside_potential": 30.5,
"highlights": ["Strong growth", "Wide moat"],
"risks": ["Execution risk"],
"#;
        let parsed = parse_response(content);
        assert_eq!(parsed.recommendation, Rating::StrongBuy);
        assert!((parsed.target_price - 130.5).abs() < 1e-9);
        assert_eq!(parsed.upside_potential, "30.5%");
        assert_eq!(parsed.highlights, vec!["Strong growth", "Wide moat"]);
        assert_eq!(parsed.risks, vec!["Execution risk"]);
        // Raw text preserved as the analysis body
        assert!(parsed.analysis.contains("Some prose"));
    }

    #[test]
    fn test_parse_garbage_yields_defaults() {
        let parsed = parse_response("the model had nothing useful to say");
        assert_eq!(parsed.recommendation, Rating::Hold);
        assert!((parsed.target_price - 0.0).abs() < 1e-9);
        assert_eq!(parsed.upside_potential, "0.0%");
        assert!(parsed.highlights.is_empty());
    }

    #[test]
    fn test_analyst_requires_api_key() {
        let config = Config::default();
        assert!(AiAnalyst::from_config(&config).is_none());

        let mut with_key = Config::default();
        with_key.secrets.llm.openai = Some("sk-test".to_string());
        assert!(AiAnalyst::from_config(&with_key).is_some());
    }
}
