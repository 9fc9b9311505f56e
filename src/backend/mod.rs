//! Trait boundaries for external collaborators.
//!
//! The retrieval core does not own an index, an embedding model, a rerank
//! model, or a web-search API; it consumes them through these traits. All
//! implementations must be `Send + Sync` so concurrent agent invocations
//! can share them behind an `Arc`.
//!
//! [`memory`] ships a deterministic in-process implementation used by tests
//! and the CLI; [`http`] (feature `http`) adds a reqwest-backed rerank
//! client.

pub mod memory;

#[cfg(feature = "http")]
pub mod http;

use async_trait::async_trait;

use crate::core::CandidateRecord;
use crate::error::AgentError;

pub use memory::{HashEmbedder, MemoryIndex, StoredChunk};

#[cfg(feature = "http")]
pub use http::{HttpReranker, HttpRerankerConfig};

/// Scope filter applied by backends *before* scoring.
///
/// Filtering before scoring is a contract, not an optimization hint:
/// out-of-scope chunks must never consume similarity computation.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    /// Restrict to these containers, when present.
    pub container_ids: Option<Vec<String>>,
    /// Restrict to these documents, when present.
    pub document_ids: Option<Vec<String>>,
}

impl Scope {
    /// Returns `true` when a chunk with the given provenance passes the
    /// filter.
    #[must_use]
    pub fn allows(&self, container_id: &str, document_id: &str) -> bool {
        let container_ok = self
            .container_ids
            .as_ref()
            .is_none_or(|ids| ids.iter().any(|id| id == container_id));
        let document_ok = self
            .document_ids
            .as_ref()
            .is_none_or(|ids| ids.iter().any(|id| id == document_id));
        container_ok && document_ok
    }
}

/// Produces query embeddings for vector search.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds `text` into the index's vector space.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Backend`] when the embedding service fails.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AgentError>;
}

/// Storage/index backend exposing the three retrieval modalities.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Backend identifier recorded in tool metrics.
    fn provider(&self) -> &str;

    /// Similarity search against stored embeddings. Returns up to `limit`
    /// candidates with `score >= threshold`, descending.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Backend`] on index failures.
    async fn vector_search(
        &self,
        embedding: &[f32],
        scope: &Scope,
        limit: usize,
        threshold: f32,
    ) -> Result<Vec<CandidateRecord>, AgentError>;

    /// Substring/pattern matching against an explicit keyword list. Scores
    /// are coverage ratios in `[0, 1]`, descending.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Backend`] on index failures.
    async fn keyword_search(
        &self,
        keywords: &[String],
        scope: &Scope,
        limit: usize,
    ) -> Result<Vec<CandidateRecord>, AgentError>;

    /// Full-text search for a query already transformed into the engine's
    /// syntax. Scores are engine-native rank values (BM25-like), descending,
    /// and not comparable raw to other modalities.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Backend`] on index failures.
    async fn fulltext_search(
        &self,
        query: &str,
        scope: &Scope,
        limit: usize,
    ) -> Result<Vec<CandidateRecord>, AgentError>;
}

/// Cross-query relevance scoring backend for reranking.
#[async_trait]
pub trait RerankBackend: Send + Sync {
    /// Backend identifier recorded in tool metrics.
    fn provider(&self) -> &str;

    /// Scores each document against the query. The returned vector is
    /// aligned by index with `docs`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Backend`] when the rerank service fails.
    async fn score(
        &self,
        model: &str,
        query: &str,
        docs: &[String],
    ) -> Result<Vec<f32>, AgentError>;
}

/// Optional web-search backend for the exploratory fallback branch.
#[async_trait]
pub trait WebSearchBackend: Send + Sync {
    /// Backend identifier recorded in tool metrics.
    fn provider(&self) -> &str;

    /// Searches the web and maps hits into candidate records.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Backend`] when the search API fails.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<CandidateRecord>, AgentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_scope_allows_everything() {
        let scope = Scope::default();
        assert!(scope.allows("any-container", "any-doc"));
    }

    #[test]
    fn test_container_scope_filters() {
        let scope = Scope {
            container_ids: Some(vec!["c1".to_string()]),
            document_ids: None,
        };
        assert!(scope.allows("c1", "doc1"));
        assert!(!scope.allows("c2", "doc1"));
    }

    #[test]
    fn test_document_scope_filters() {
        let scope = Scope {
            container_ids: None,
            document_ids: Some(vec!["doc1".to_string()]),
        };
        assert!(scope.allows("c1", "doc1"));
        assert!(!scope.allows("c1", "doc2"));
    }

    #[test]
    fn test_both_filters_must_pass() {
        let scope = Scope {
            container_ids: Some(vec!["c1".to_string()]),
            document_ids: Some(vec!["doc1".to_string()]),
        };
        assert!(scope.allows("c1", "doc1"));
        assert!(!scope.allows("c1", "doc2"));
        assert!(!scope.allows("c2", "doc1"));
    }
}
