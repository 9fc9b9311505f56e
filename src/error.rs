//! Error types for the retrieval core.
//!
//! Failures inside a run are represented as data on [`ToolResult`] and
//! [`AgentResult`](crate::core::AgentResult) rather than propagated as
//! errors; `AgentError` surfaces only at the seams where that contract
//! does not apply (input validation, backend transport, configuration).
//!
//! [`ToolResult`]: crate::core::ToolResult

use thiserror::Error;

/// Errors produced by the agent system and its backends.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The caller-supplied query or constraints were rejected before any
    /// tool executed. No partial trace is produced for this error.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// What was wrong with the input.
        message: String,
    },

    /// A backing resource (index, rerank service, web search) failed.
    #[error("backend '{provider}' failed: {message}")]
    Backend {
        /// Identifier of the backing resource.
        provider: String,
        /// Description of the failure.
        message: String,
    },

    /// A backend call exceeded its per-tool timeout.
    #[error("backend '{provider}' timed out after {elapsed_ms}ms")]
    Timeout {
        /// Identifier of the backing resource.
        provider: String,
        /// Configured timeout that elapsed.
        elapsed_ms: u64,
    },

    /// A tool failed while executing (bad arguments, serialization, etc.).
    #[error("tool '{name}' failed: {message}")]
    ToolExecution {
        /// Name of the failing tool.
        name: String,
        /// Description of the failure.
        message: String,
    },

    /// Configuration was incomplete or inconsistent.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the problem.
        message: String,
    },
}

impl AgentError {
    /// Creates an [`AgentError::InvalidInput`] from any displayable message.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates an [`AgentError::Backend`] for the given provider.
    #[must_use]
    pub fn backend(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AgentError::invalid_input("query is empty");
        assert_eq!(err.to_string(), "invalid input: query is empty");

        let err = AgentError::backend("vector_index", "connection refused");
        assert_eq!(
            err.to_string(),
            "backend 'vector_index' failed: connection refused"
        );

        let err = AgentError::Timeout {
            provider: "rerank".to_string(),
            elapsed_ms: 500,
        };
        assert_eq!(err.to_string(), "backend 'rerank' timed out after 500ms");
    }

    #[test]
    fn test_tool_execution_display() {
        let err = AgentError::ToolExecution {
            name: "vector_search".to_string(),
            message: "missing query embedding".to_string(),
        };
        assert!(err.to_string().contains("vector_search"));
        assert!(err.to_string().contains("missing query embedding"));
    }
}
