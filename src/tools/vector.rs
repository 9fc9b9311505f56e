//! Vector similarity search tool.

use std::sync::Arc;

use tracing::debug;

use super::RunContext;
use crate::backend::SearchBackend;
use crate::core::{ToolData, ToolResult};

/// Retrieval tool querying the similarity index.
///
/// Requires a precomputed query embedding; producing it is the embedding
/// collaborator's job, not this tool's. Returns at most
/// `constraints.max_chunks` candidates, all with
/// `score >= constraints.similarity_threshold`.
pub struct VectorSearchTool {
    backend: Arc<dyn SearchBackend>,
}

impl VectorSearchTool {
    /// Creates the tool over a shared search backend.
    #[must_use]
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }

    /// Runs the similarity search.
    ///
    /// An empty result set is a success; a backend failure produces a
    /// failed [`ToolResult`], never a Rust error.
    pub async fn run(&self, embedding: &[f32], ctx: &RunContext) -> ToolResult {
        let timer = ctx.start_metrics(self.backend.provider());

        if embedding.is_empty() {
            return ToolResult::failed("query embedding is empty", timer.finish());
        }

        let outcome = self
            .backend
            .vector_search(
                embedding,
                &ctx.scope(),
                ctx.constraints.max_chunks,
                ctx.constraints.similarity_threshold,
            )
            .await;

        match outcome {
            Ok(mut hits) => {
                // The threshold contract holds even against a sloppy backend.
                hits.retain(|c| c.score >= ctx.constraints.similarity_threshold);
                hits.truncate(ctx.constraints.max_chunks);
                debug!(trace_id = %ctx.trace_id, hits = hits.len(), "vector search completed");
                ToolResult::ok(ToolData::Candidates(hits), timer.finish())
            }
            Err(e) => ToolResult::failed(e.to_string(), timer.finish()),
        }
    }
}
