//! Keyword matching search tool.

use std::sync::Arc;

use tracing::debug;

use super::RunContext;
use crate::backend::SearchBackend;
use crate::core::{ToolData, ToolResult};

/// Retrieval tool matching an explicit keyword list against chunk text.
///
/// Keywords are extracted upstream (see
/// [`extract_keywords`](crate::agent::classify::extract_keywords)); scores
/// are coverage ratios in `[0, 1]`.
pub struct KeywordSearchTool {
    backend: Arc<dyn SearchBackend>,
}

impl KeywordSearchTool {
    /// Creates the tool over a shared search backend.
    #[must_use]
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }

    /// Runs the keyword search.
    pub async fn run(&self, keywords: &[String], ctx: &RunContext) -> ToolResult {
        let timer = ctx.start_metrics(self.backend.provider());

        if keywords.is_empty() {
            return ToolResult::failed("keyword list is empty", timer.finish());
        }

        let outcome = self
            .backend
            .keyword_search(keywords, &ctx.scope(), ctx.constraints.max_chunks)
            .await;

        match outcome {
            Ok(hits) => {
                debug!(trace_id = %ctx.trace_id, hits = hits.len(), "keyword search completed");
                ToolResult::ok(ToolData::Candidates(hits), timer.finish())
            }
            Err(e) => ToolResult::failed(e.to_string(), timer.finish()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::{HashEmbedder, MemoryIndex, StoredChunk};
    use crate::core::Constraints;

    fn stored(chunk_id: &str, content: &str) -> StoredChunk {
        StoredChunk {
            chunk_id: chunk_id.to_string(),
            document_id: "doc1".to_string(),
            container_id: "main".to_string(),
            content: content.to_string(),
            page_number: None,
            section_title: None,
            embedding: HashEmbedder::embed_text(content),
        }
    }

    fn ctx() -> RunContext {
        RunContext {
            trace_id: "t".to_string(),
            query: "budget report 2024".to_string(),
            constraints: Constraints::default(),
        }
    }

    #[tokio::test]
    async fn test_scores_are_coverage_ratios() {
        let index = Arc::new(MemoryIndex::new(vec![
            stored("c1", "The 2024 budget report is attached."),
            stored("c2", "An older budget summary."),
        ]));
        let tool = KeywordSearchTool::new(index);
        let keywords = vec![
            "budget".to_string(),
            "report".to_string(),
            "2024".to_string(),
        ];

        let result = tool.run(&keywords, &ctx()).await;
        assert!(result.success);
        let hits = result.candidates();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk_id, "c1");
        for hit in hits {
            assert!((0.0..=1.0).contains(&hit.score));
        }
    }

    #[tokio::test]
    async fn test_empty_keywords_fail() {
        let index = Arc::new(MemoryIndex::default());
        let tool = KeywordSearchTool::new(index);

        let result = tool.run(&[], &ctx()).await;
        assert!(!result.success);
        assert!(!result.errors.is_empty());
    }
}
