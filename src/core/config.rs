//! Agent configuration
//!
//! One explicit value passed to the commander at construction. Sources are
//! layered: defaults, then an optional TOML file, then environment variables,
//! then whatever the binary's flags override.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::core::error::{AgentError, Result};

/// Default chat-completions endpoint
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// How much of each turn is narrated to the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogMode {
    /// Nothing beyond warnings
    #[default]
    None,
    /// Turn header, candidate table and the final decision
    Compact,
    /// Compact plus the prompt and the raw model output
    Full,
}

impl LogMode {
    pub fn is_compact(&self) -> bool {
        matches!(self, LogMode::Compact | LogMode::Full)
    }

    pub fn is_full(&self) -> bool {
        matches!(self, LogMode::Full)
    }
}

impl FromStr for LogMode {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(LogMode::None),
            "compact" => Ok(LogMode::Compact),
            "full" => Ok(LogMode::Full),
            other => Err(AgentError::ConfigError(format!("unknown log mode: {}", other))),
        }
    }
}

/// Overrides taken from command-line flags, the last configuration layer
#[derive(Debug, Clone, Default)]
pub struct FlagOverrides {
    pub log_mode: Option<LogMode>,
    pub trace_file: Option<PathBuf>,
    pub model: Option<String>,
    /// Only ever switches forced bad output on
    pub force_bad_output: bool,
    /// Only ever switches the oracle off
    pub no_llm: bool,
}

/// Configuration for the decision agent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Console narration level
    pub log_mode: LogMode,

    /// JSON Lines event log; no events are recorded when unset
    pub trace_file: Option<PathBuf>,

    /// Model identifier sent with every request
    pub model: String,

    /// API credential. Without one the oracle is unavailable and every
    /// turn is decided by the fallback chain.
    pub api_key: Option<String>,

    /// Endpoint for the oracle service. The request format is picked
    /// from the URL (Anthropic vs OpenAI-compatible).
    pub api_url: String,

    /// Master switch for the oracle
    pub enabled: bool,

    /// Make every oracle call fail with a malformed response.
    /// Only meant for exercising the fallback path.
    pub force_bad_output: bool,

    /// Upper bound on a single oracle request
    ///
    /// The request is awaited inside the battle client's event loop, so a
    /// stalled service would otherwise hold up every concurrent battle.
    pub request_timeout_secs: u64,

    /// Sampling temperature for the oracle
    pub temperature: f32,

    /// Completion budget; the expected reply is a single small JSON object
    pub max_tokens: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            log_mode: LogMode::None,
            trace_file: None,
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            enabled: true,
            force_bad_output: false,
            request_timeout_secs: 20,
            temperature: 0.15,
            max_tokens: 128,
        }
    }
}

impl AgentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from a TOML file; missing keys keep their defaults
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Defaults, then the optional TOML file, then `lookup`, then flags
    pub fn layered<F>(file: Option<&Path>, lookup: F, flags: &FlagOverrides) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match file {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(lookup)?;
        config.apply_flags(flags);
        Ok(config)
    }

    /// Apply command-line flags on top of every other layer
    pub fn apply_flags(&mut self, flags: &FlagOverrides) {
        if let Some(mode) = flags.log_mode {
            self.log_mode = mode;
        }
        if let Some(path) = &flags.trace_file {
            self.trace_file = Some(path.clone());
        }
        if let Some(model) = &flags.model {
            self.model = model.clone();
        }
        if flags.force_bad_output {
            self.force_bad_output = true;
        }
        if flags.no_llm {
            self.enabled = false;
        }
    }

    /// Defaults overridden by the process environment
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override fields from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Override fields from any key lookup
    ///
    /// Recognised keys: `LLM_LOG_MODE`, `LLM_TRACE_FILE`, `OPENAI_MODEL`,
    /// `LLM_MODEL`, `OPENAI_API_KEY`, `LLM_API_KEY`, `LLM_API_URL`,
    /// `LLM_ENABLED`, `LLM_FORCE_BAD_OUTPUT`, `LLM_TIMEOUT_SECS`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(mode) = non_empty("LLM_LOG_MODE") {
            self.log_mode = mode.parse()?;
        }
        if let Some(path) = non_empty("LLM_TRACE_FILE") {
            self.trace_file = Some(PathBuf::from(path));
        }
        if let Some(model) = non_empty("OPENAI_MODEL").or_else(|| non_empty("LLM_MODEL")) {
            self.model = model;
        }
        if let Some(key) = non_empty("OPENAI_API_KEY").or_else(|| non_empty("LLM_API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(url) = non_empty("LLM_API_URL") {
            self.api_url = url;
        }
        if let Some(enabled) = non_empty("LLM_ENABLED") {
            self.enabled = parse_flag(&enabled);
        }
        if let Some(forced) = non_empty("LLM_FORCE_BAD_OUTPUT") {
            self.force_bad_output = forced.trim() == "1";
        }
        if let Some(secs) = non_empty("LLM_TIMEOUT_SECS") {
            self.request_timeout_secs = secs.trim().parse().map_err(|_| {
                AgentError::ConfigError(format!("LLM_TIMEOUT_SECS is not a number: {}", secs))
            })?;
        }
        Ok(())
    }

    /// Whether an oracle client can be built from this config
    pub fn oracle_configured(&self) -> bool {
        self.enabled && self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(AgentError::ConfigError("model must not be empty".into()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(AgentError::ConfigError(format!(
                "temperature ({}) should be within 0.0..=2.0",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(AgentError::ConfigError("max_tokens must be positive".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(AgentError::ConfigError(
                "request_timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
