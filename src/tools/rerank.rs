//! Cross-query relevance reranking tool.

use std::sync::Arc;

use tracing::{debug, warn};

use super::RunContext;
use crate::backend::RerankBackend;
use crate::core::{CandidateRecord, ToolData, ToolResult};

/// Processing tool that re-scores candidates against the query.
///
/// Replaces each candidate's `score` with the rerank model's relevance and
/// re-sorts descending (stable, so input order breaks ties). When the
/// backend is unavailable the tool fails gracefully; the agent carries the
/// pre-rerank ordering forward instead of aborting the run.
pub struct RerankTool {
    backend: Arc<dyn RerankBackend>,
    model: String,
}

impl RerankTool {
    /// Creates the tool over a shared rerank backend using `model`.
    #[must_use]
    pub fn new(backend: Arc<dyn RerankBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    /// Runs the reranking pass.
    pub async fn run(&self, candidates: &[CandidateRecord], ctx: &RunContext) -> ToolResult {
        let timer = ctx.start_metrics(self.backend.provider());

        if candidates.is_empty() {
            return ToolResult::ok(ToolData::Candidates(Vec::new()), timer.finish());
        }

        let docs: Vec<String> = candidates.iter().map(|c| c.content.clone()).collect();
        let outcome = self.backend.score(&self.model, &ctx.query, &docs).await;

        match outcome {
            Ok(scores) if scores.len() == candidates.len() => {
                let mut rescored: Vec<CandidateRecord> = candidates
                    .iter()
                    .zip(&scores)
                    .map(|(candidate, &score)| {
                        let mut updated = candidate.clone();
                        updated.score = score;
                        updated
                    })
                    .collect();
                rescored.sort_by(|a, b| b.score.total_cmp(&a.score));
                debug!(trace_id = %ctx.trace_id, reranked = rescored.len(), "rerank completed");
                ToolResult::ok(ToolData::Candidates(rescored), timer.finish())
            }
            Ok(scores) => {
                warn!(
                    trace_id = %ctx.trace_id,
                    expected = candidates.len(),
                    got = scores.len(),
                    "rerank backend returned misaligned scores"
                );
                ToolResult::failed(
                    format!(
                        "rerank backend returned {} scores for {} documents",
                        scores.len(),
                        candidates.len()
                    ),
                    timer.finish(),
                )
            }
            Err(e) => {
                warn!(trace_id = %ctx.trace_id, error = %e, "rerank backend unavailable");
                ToolResult::failed(e.to_string(), timer.finish())
            }
        }
    }
}
