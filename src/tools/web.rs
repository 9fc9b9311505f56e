//! Capability-gated web-search fallback tool.

use std::sync::Arc;

use tracing::{debug, warn};

use super::RunContext;
use crate::backend::WebSearchBackend;
use crate::core::{ToolData, ToolResult};

/// Retrieval tool over an external web-search API.
///
/// Only ever invoked on the fallback branch, and only when the caller's
/// constraints allow web search; the gate lives in the orchestrator, not
/// here. Results are mapped into ordinary candidate records so downstream
/// dedup and context packing treat them like local chunks.
pub struct WebSearchTool {
    backend: Arc<dyn WebSearchBackend>,
}

impl WebSearchTool {
    /// Creates the tool over a shared web-search backend.
    #[must_use]
    pub fn new(backend: Arc<dyn WebSearchBackend>) -> Self {
        Self { backend }
    }

    /// Searches the web for the original query.
    pub async fn run(&self, ctx: &RunContext) -> ToolResult {
        let timer = ctx.start_metrics(self.backend.provider());

        if ctx.query.trim().is_empty() {
            return ToolResult::failed("web search requires a non-empty query", timer.finish());
        }

        match self
            .backend
            .search(&ctx.query, ctx.constraints.max_chunks)
            .await
        {
            Ok(mut hits) => {
                hits.truncate(ctx.constraints.max_chunks);
                debug!(trace_id = %ctx.trace_id, hits = hits.len(), "web search completed");
                ToolResult::ok(ToolData::Candidates(hits), timer.finish())
            }
            Err(e) => {
                warn!(trace_id = %ctx.trace_id, error = %e, "web search failed");
                ToolResult::failed(e.to_string(), timer.finish())
            }
        }
    }
}
