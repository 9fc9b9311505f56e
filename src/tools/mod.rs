//! Atomic retrieval and processing tools.
//!
//! Each tool is independent and stateless: it takes the current candidate
//! set and/or query inputs and returns a [`ToolResult`] envelope, never a
//! Rust error. The agent invokes tools through the closed [`ToolName`]
//! set; there is no string-keyed dispatch, so an unknown tool cannot be
//! expressed at all.
//!
//! [`ToolResult`]: crate::core::ToolResult

pub mod context;
pub mod dedup;
pub mod fulltext;
pub mod fusion;
pub mod keyword;
pub mod rerank;
pub mod vector;
pub mod web;

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::backend::Scope;
use crate::core::{Constraints, ToolMetrics};

pub use context::{CharEstimator, ContextBuilderTool, TokenEstimator};
pub use dedup::DeduplicateTool;
pub use fulltext::FulltextSearchTool;
pub use fusion::{RankedList, fuse};
pub use keyword::KeywordSearchTool;
pub use rerank::RerankTool;
pub use vector::VectorSearchTool;
pub use web::WebSearchTool;

/// Closed set of tool identifiers the agent can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    /// Similarity search over stored embeddings.
    VectorSearch,
    /// Substring/pattern matching over an extracted keyword list.
    KeywordSearch,
    /// Engine-native full-text search (BM25-like).
    FulltextSearch,
    /// Cross-query relevance re-scoring.
    Rerank,
    /// Exact and near-duplicate removal.
    Deduplicate,
    /// Capability-gated web-search fallback.
    WebSearch,
    /// Token-budgeted context packing.
    ContextBuilder,
}

impl ToolName {
    /// Every tool the agent can dispatch, in a stable order.
    pub const ALL: [Self; 7] = [
        Self::VectorSearch,
        Self::KeywordSearch,
        Self::FulltextSearch,
        Self::Rerank,
        Self::Deduplicate,
        Self::WebSearch,
        Self::ContextBuilder,
    ];

    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::VectorSearch => "vector_search",
            Self::KeywordSearch => "keyword_search",
            Self::FulltextSearch => "fulltext_search",
            Self::Rerank => "rerank",
            Self::Deduplicate => "deduplicate",
            Self::WebSearch => "web_search",
            Self::ContextBuilder => "context_builder",
        }
    }

    /// Whether this tool produces candidates from a backing resource.
    /// Failure of every retrieval-stage tool terminates a run; processing
    /// tools failing only degrades it.
    #[must_use]
    pub const fn is_retrieval(&self) -> bool {
        matches!(
            self,
            Self::VectorSearch | Self::KeywordSearch | Self::FulltextSearch | Self::WebSearch
        )
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-invocation inputs shared by every tool call.
///
/// Owned by the orchestrator and threaded through each step; tools only
/// read from it, which keeps concurrent invocations free of shared state.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Correlates all step metrics of the invocation.
    pub trace_id: String,
    /// The original natural-language query.
    pub query: String,
    /// Caller-supplied constraints, immutable for the run.
    pub constraints: Constraints,
}

impl RunContext {
    /// Builds the scope filter backends apply before scoring.
    #[must_use]
    pub fn scope(&self) -> Scope {
        Scope {
            container_ids: self.constraints.container_ids.clone(),
            document_ids: self.constraints.document_ids.clone(),
        }
    }

    /// Starts metrics for a tool call against `provider`.
    #[must_use]
    pub fn start_metrics(&self, provider: &str) -> MetricsTimer {
        MetricsTimer {
            provider: provider.to_string(),
            trace_id: self.trace_id.clone(),
            started: Instant::now(),
        }
    }
}

/// Captures the start of a tool call and stamps latency on completion.
#[derive(Debug)]
pub struct MetricsTimer {
    provider: String,
    trace_id: String,
    started: Instant,
}

impl MetricsTimer {
    /// Finishes the timer into a [`ToolMetrics`]; `items_returned` is
    /// filled in by the result constructor.
    #[must_use]
    pub fn finish(self) -> ToolMetrics {
        ToolMetrics {
            latency_ms: self.started.elapsed().as_secs_f64() * 1000.0,
            items_returned: 0,
            provider: self.provider,
            cache_hit: false,
            retries: 0,
            trace_id: self.trace_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_name_strings() {
        assert_eq!(ToolName::VectorSearch.as_str(), "vector_search");
        assert_eq!(ToolName::ContextBuilder.as_str(), "context_builder");
        assert_eq!(ToolName::ALL.len(), 7);
    }

    #[test]
    fn test_retrieval_classification() {
        assert!(ToolName::VectorSearch.is_retrieval());
        assert!(ToolName::KeywordSearch.is_retrieval());
        assert!(ToolName::FulltextSearch.is_retrieval());
        assert!(ToolName::WebSearch.is_retrieval());
        assert!(!ToolName::Rerank.is_retrieval());
        assert!(!ToolName::Deduplicate.is_retrieval());
        assert!(!ToolName::ContextBuilder.is_retrieval());
    }

    #[test]
    fn test_tool_name_serialization() {
        let json = serde_json::to_string(&ToolName::FulltextSearch).unwrap_or_default();
        assert_eq!(json, "\"fulltext_search\"");
    }

    #[test]
    fn test_metrics_timer_stamps_trace_id() {
        let ctx = RunContext {
            trace_id: "trace-1".to_string(),
            query: "q".to_string(),
            constraints: Constraints::default(),
        };
        let metrics = ctx.start_metrics("memory_index").finish();
        assert_eq!(metrics.trace_id, "trace-1");
        assert_eq!(metrics.provider, "memory_index");
        assert!(metrics.latency_ms >= 0.0);
    }
}
