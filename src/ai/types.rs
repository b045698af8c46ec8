//! Wire types for the generative analyst bridge.

use serde::{Deserialize, Serialize};

use crate::analysis::Rating;

// ============================================================================
// Chat API types
// ============================================================================

/// One chat message.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat completion request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
}

/// Chat completion response body.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponseMessage {
    #[serde(default)]
    pub content: String,
}

// ============================================================================
// Parsed analyst output
// ============================================================================

/// Structured payload extracted from the analyst's response.
///
/// Parsing is best-effort: absent fields carry conservative defaults so a
/// malformed response still yields a usable record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiAnalysis {
    /// Free-text analysis
    pub analysis: String,
    /// One-paragraph investment thesis
    pub investment_thesis: String,
    /// Key highlight strings
    pub highlights: Vec<String>,
    /// Risk strings
    pub risks: Vec<String>,
    /// Recommendation label (defaults to HOLD)
    pub recommendation: Rating,
    /// 12-month target price (0.0 when absent)
    pub target_price: f64,
    /// Formatted upside, e.g. "5.0%"
    pub upside_potential: String,
}

impl Default for AiAnalysis {
    fn default() -> Self {
        Self {
            analysis: String::new(),
            investment_thesis: String::new(),
            highlights: Vec::new(),
            risks: Vec::new(),
            recommendation: Rating::Hold,
            target_price: 0.0,
            upside_potential: "0.0%".to_string(),
        }
    }
}
