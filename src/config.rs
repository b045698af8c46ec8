//! Configuration for the stock-pitch service.
//!
//! Configuration lives in a single JSON file at `~/.stockpitch/config.json`.
//!
//! # Configuration Priority
//!
//! 1. Explicit config file values
//! 2. Environment variables
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `STOCKPITCH_BIND` → service.host
//! - `STOCKPITCH_PORT` → service.port
//! - `STOCKPITCH_AI_ENDPOINT` → ai.endpoint
//! - `OPENAI_API_KEY` → secrets.llm.openai
//!
//! The file is loaded once at startup and treated as immutable afterwards;
//! the engine receives its `analysis` section by value per call.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".stockpitch"),
        |dirs| dirs.home_dir().join(".stockpitch"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// Service
// ============================================================================

/// HTTP service binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Bind address. Default: "127.0.0.1" (local only)
    #[serde(default = "default_host")]
    pub host: String,
    /// Service port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    4436
}

// ============================================================================
// Observability
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Base log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Output format: "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

// ============================================================================
// Analysis
// ============================================================================

/// Per-call analysis knobs.
///
/// The overrides replace the tier-derived assumption where set. The cache
/// fields are declared for compatibility with the upstream data layer but
/// no calculation path reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Default analysis period requested from the data collaborator
    #[serde(default = "default_period")]
    pub default_period: String,
    /// Override for the tier discount rate (fraction)
    #[serde(default)]
    pub discount_rate: Option<f64>,
    /// Override for the tier 5-year growth rate (fraction)
    #[serde(default)]
    pub growth_rate: Option<f64>,
    /// Override for the tier terminal growth rate (fraction)
    #[serde(default)]
    pub terminal_growth_rate: Option<f64>,
    /// Declared but unused by the calculators
    #[serde(default = "default_cache_enabled")]
    pub cache_enabled: bool,
    /// Declared but unused by the calculators
    #[serde(default = "default_cache_duration")]
    pub cache_duration_minutes: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_period: default_period(),
            discount_rate: None,
            growth_rate: None,
            terminal_growth_rate: None,
            cache_enabled: default_cache_enabled(),
            cache_duration_minutes: default_cache_duration(),
        }
    }
}

fn default_period() -> String {
    "1y".into()
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_duration() -> u32 {
    60
}

// ============================================================================
// AI analyst
// ============================================================================

/// Generative analyst settings (premium path).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// OpenAI-compatible API base URL
    #[serde(default = "default_ai_endpoint")]
    pub endpoint: String,
    /// Chat model name
    #[serde(default = "default_ai_model")]
    pub model: String,
    /// Completion token budget
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Request timeout in seconds
    #[serde(default = "default_ai_timeout")]
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_ai_endpoint(),
            model: default_ai_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_ai_timeout(),
        }
    }
}

fn default_ai_endpoint() -> String {
    "https://api.openai.com/v1".into()
}

fn default_ai_model() -> String {
    "gpt-4o-mini".into()
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_temperature() -> f64 {
    0.7
}

fn default_ai_timeout() -> u64 {
    30
}

// ============================================================================
// Secrets
// ============================================================================

/// Grouped secrets configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecretsConfig {
    /// LLM provider API keys
    #[serde(default)]
    pub llm: LlmSecretsConfig,
}

/// LLM provider API keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmSecretsConfig {
    /// OpenAI API key
    #[serde(default)]
    pub openai: Option<String>,
}

// ============================================================================
// Root
// ============================================================================

/// Root configuration for the service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub secrets: SecretsConfig,
}

impl Config {
    /// Load configuration from the default path, falling back to defaults
    /// when the file does not exist. Environment overrides apply last.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("STOCKPITCH_BIND") {
            if !host.is_empty() {
                self.service.host = host;
            }
        }
        if let Ok(port) = std::env::var("STOCKPITCH_PORT") {
            if let Ok(port) = port.parse() {
                self.service.port = port;
            }
        }
        if let Ok(endpoint) = std::env::var("STOCKPITCH_AI_ENDPOINT") {
            if !endpoint.is_empty() {
                self.ai.endpoint = endpoint;
            }
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                self.secrets.llm.openai = Some(key);
            }
        }
    }

    /// OpenAI API key, when configured.
    pub fn openai_api_key(&self) -> Option<&str> {
        self.secrets.llm.openai.as_deref()
    }
}

// ============================================================================
// Tests
// ============================================================================
