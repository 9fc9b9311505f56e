//! Agent configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.

use std::time::Duration;

use crate::error::AgentError;

/// Default per-tool timeout in seconds.
const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 10;
/// Default minimum candidate pool size before the web fallback triggers.
const DEFAULT_MIN_CANDIDATES: usize = 3;
/// Default reciprocal-rank-fusion constant.
const DEFAULT_RRF_K: f32 = 60.0;
/// Default character-to-token ratio for budget estimation.
const DEFAULT_CHARS_PER_TOKEN: usize = 4;
/// Default rerank model identifier.
const DEFAULT_RERANK_MODEL: &str = "rerank-english-v3";

/// Configuration for the retrieval agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Timeout applied to each tool invocation.
    pub tool_timeout: Duration,
    /// When the pooled candidate count after the planned retrieval steps is
    /// below this, the web fallback branch fires (if allowed).
    pub min_candidates: usize,
    /// Model identifier passed to the rerank backend.
    pub rerank_model: String,
    /// Reciprocal-rank-fusion constant; larger values flatten the rank
    /// contribution curve.
    pub rrf_k: f32,
    /// Character-to-token ratio used by the context builder's estimator.
    pub chars_per_token: usize,
}

impl AgentConfig {
    /// Creates a new builder for `AgentConfig`.
    #[must_use]
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] when a value is out of range.
    pub fn from_env() -> Result<Self, AgentError> {
        Self::builder().from_env().build()
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            tool_timeout: Duration::from_secs(DEFAULT_TOOL_TIMEOUT_SECS),
            min_candidates: DEFAULT_MIN_CANDIDATES,
            rerank_model: DEFAULT_RERANK_MODEL.to_string(),
            rrf_k: DEFAULT_RRF_K,
            chars_per_token: DEFAULT_CHARS_PER_TOKEN,
        }
    }
}

/// Builder for [`AgentConfig`].
#[derive(Debug, Clone, Default)]
pub struct AgentConfigBuilder {
    tool_timeout: Option<Duration>,
    min_candidates: Option<usize>,
    rerank_model: Option<String>,
    rrf_k: Option<f32>,
    chars_per_token: Option<usize>,
}

impl AgentConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.tool_timeout.is_none() {
            self.tool_timeout = std::env::var("PAPERSEEK_TOOL_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs);
        }
        if self.min_candidates.is_none() {
            self.min_candidates = std::env::var("PAPERSEEK_MIN_CANDIDATES")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.rerank_model.is_none() {
            self.rerank_model = std::env::var("PAPERSEEK_RERANK_MODEL").ok();
        }
        if self.rrf_k.is_none() {
            self.rrf_k = std::env::var("PAPERSEEK_RRF_K")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.chars_per_token.is_none() {
            self.chars_per_token = std::env::var("PAPERSEEK_CHARS_PER_TOKEN")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        self
    }

    /// Sets the per-tool timeout.
    #[must_use]
    pub const fn tool_timeout(mut self, duration: Duration) -> Self {
        self.tool_timeout = Some(duration);
        self
    }

    /// Sets the web-fallback candidate threshold.
    #[must_use]
    pub const fn min_candidates(mut self, n: usize) -> Self {
        self.min_candidates = Some(n);
        self
    }

    /// Sets the rerank model identifier.
    #[must_use]
    pub fn rerank_model(mut self, model: impl Into<String>) -> Self {
        self.rerank_model = Some(model.into());
        self
    }

    /// Sets the rank-fusion constant.
    #[must_use]
    pub const fn rrf_k(mut self, k: f32) -> Self {
        self.rrf_k = Some(k);
        self
    }

    /// Sets the character-to-token ratio.
    #[must_use]
    pub const fn chars_per_token(mut self, n: usize) -> Self {
        self.chars_per_token = Some(n);
        self
    }

    /// Builds the [`AgentConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] when `rrf_k` is not positive finite,
    /// `chars_per_token` is zero, or the tool timeout is zero.
    pub fn build(self) -> Result<AgentConfig, AgentError> {
        let config = AgentConfig {
            tool_timeout: self
                .tool_timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TOOL_TIMEOUT_SECS)),
            min_candidates: self.min_candidates.unwrap_or(DEFAULT_MIN_CANDIDATES),
            rerank_model: self
                .rerank_model
                .unwrap_or_else(|| DEFAULT_RERANK_MODEL.to_string()),
            rrf_k: self.rrf_k.unwrap_or(DEFAULT_RRF_K),
            chars_per_token: self.chars_per_token.unwrap_or(DEFAULT_CHARS_PER_TOKEN),
        };

        if !(config.rrf_k.is_finite() && config.rrf_k > 0.0) {
            return Err(AgentError::Config {
                message: format!("rrf_k must be positive finite, got {}", config.rrf_k),
            });
        }
        if config.chars_per_token == 0 {
            return Err(AgentError::Config {
                message: "chars_per_token must be at least 1".to_string(),
            });
        }
        if config.tool_timeout.is_zero() {
            return Err(AgentError::Config {
                message: "tool_timeout must be non-zero".to_string(),
            });
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = AgentConfig::builder()
            .build()
            .unwrap_or_else(|e| panic!("default config must build: {e}"));
        assert_eq!(config.tool_timeout, Duration::from_secs(10));
        assert_eq!(config.min_candidates, 3);
        assert_eq!(config.rerank_model, "rerank-english-v3");
        assert!((config.rrf_k - 60.0).abs() < f32::EPSILON);
        assert_eq!(config.chars_per_token, 4);
    }

    #[test]
    fn test_builder_custom_values() {
        let config = AgentConfig::builder()
            .tool_timeout(Duration::from_secs(2))
            .min_candidates(5)
            .rerank_model("custom-model")
            .rrf_k(10.0)
            .chars_per_token(3)
            .build()
            .unwrap_or_else(|e| panic!("config must build: {e}"));
        assert_eq!(config.tool_timeout, Duration::from_secs(2));
        assert_eq!(config.min_candidates, 5);
        assert_eq!(config.rerank_model, "custom-model");
        assert_eq!(config.chars_per_token, 3);
    }

    #[test]
    fn test_builder_rejects_zero_rrf_k() {
        assert!(AgentConfig::builder().rrf_k(0.0).build().is_err());
        assert!(AgentConfig::builder().rrf_k(f32::NAN).build().is_err());
    }

    #[test]
    fn test_builder_rejects_zero_chars_per_token() {
        assert!(AgentConfig::builder().chars_per_token(0).build().is_err());
    }

    #[test]
    fn test_builder_rejects_zero_timeout() {
        assert!(
            AgentConfig::builder()
                .tool_timeout(Duration::ZERO)
                .build()
                .is_err()
        );
    }
}
