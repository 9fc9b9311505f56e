//! Engine-native full-text search tool.

use std::sync::Arc;

use tracing::debug;

use super::RunContext;
use crate::backend::SearchBackend;
use crate::core::{ToolData, ToolResult};

/// Retrieval tool running a query through the backend's full-text engine.
///
/// Takes a query already transformed into the engine's syntax (see
/// [`to_fulltext_query`](crate::agent::classify::to_fulltext_query)).
/// Scores are engine-native rank values and must not be compared raw with
/// vector or keyword scores; multi-modality pools go through rank fusion.
pub struct FulltextSearchTool {
    backend: Arc<dyn SearchBackend>,
}

impl FulltextSearchTool {
    /// Creates the tool over a shared search backend.
    #[must_use]
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }

    /// Runs the full-text search.
    pub async fn run(&self, fulltext_query: &str, ctx: &RunContext) -> ToolResult {
        let timer = ctx.start_metrics(self.backend.provider());

        if fulltext_query.trim().is_empty() {
            return ToolResult::failed("fulltext query is empty", timer.finish());
        }

        let outcome = self
            .backend
            .fulltext_search(fulltext_query, &ctx.scope(), ctx.constraints.max_chunks)
            .await;

        match outcome {
            Ok(hits) => {
                debug!(trace_id = %ctx.trace_id, hits = hits.len(), "fulltext search completed");
                ToolResult::ok(ToolData::Candidates(hits), timer.finish())
            }
            Err(e) => ToolResult::failed(e.to_string(), timer.finish()),
        }
    }
}
