//! Caller-supplied constraints for one agent invocation.

use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// Default maximum candidates requested from each retrieval tool.
pub const DEFAULT_MAX_CHUNKS: usize = 10;
/// Default token budget for the packed context.
pub const DEFAULT_MAX_TOKENS: usize = 2000;
/// Default minimum similarity for vector hits and near-dup collapsing.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.3;

/// Per-invocation retrieval constraints. Immutable for the duration of a
/// run; validated before any tool executes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constraints {
    /// Maximum candidates each retrieval tool may return.
    pub max_chunks: usize,
    /// Token budget for the packed context.
    pub max_tokens: usize,
    /// Minimum similarity for vector search hits; also the near-duplicate
    /// collapse threshold for deduplication.
    pub similarity_threshold: f32,
    /// Restrict retrieval to these containers, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_ids: Option<Vec<String>>,
    /// Restrict retrieval to these documents, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_ids: Option<Vec<String>>,
    /// Capability gate for the exploratory web-search fallback. Off by
    /// default; the agent never reaches for the web unless the caller
    /// explicitly allows it.
    #[serde(default)]
    pub allow_web_search: bool,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            max_chunks: DEFAULT_MAX_CHUNKS,
            max_tokens: DEFAULT_MAX_TOKENS,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            container_ids: None,
            document_ids: None,
            allow_web_search: false,
        }
    }
}

impl Constraints {
    /// Validates the constraints before a run starts.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidInput`] when `max_chunks` or
    /// `max_tokens` is zero, or the similarity threshold is outside
    /// `[0.0, 1.0]`.
    pub fn validate(&self) -> Result<(), AgentError> {
        if self.max_chunks == 0 {
            return Err(AgentError::invalid_input("max_chunks must be at least 1"));
        }
        if self.max_tokens == 0 {
            return Err(AgentError::invalid_input("max_tokens must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(AgentError::invalid_input(format!(
                "similarity_threshold must be in [0.0, 1.0], got {}",
                self.similarity_threshold
            )));
        }
        Ok(())
    }
}
