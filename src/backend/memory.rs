//! Deterministic in-process backend used by tests and the CLI.
//!
//! [`MemoryIndex`] implements all three retrieval modalities over chunks
//! held in memory: cosine similarity for vector search, keyword-coverage
//! ratios for keyword search, and BM25 for full-text search.
//! [`HashEmbedder`] is a model-free embedding provider: a hashed
//! bag-of-words projection that is stable across runs, which is what the
//! determinism tests need.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use super::{EmbeddingProvider, Scope, SearchBackend};
use crate::core::CandidateRecord;
use crate::error::AgentError;

/// Dimensionality of [`HashEmbedder`] vectors.
const HASH_EMBEDDING_DIM: usize = 64;
/// BM25 term-frequency saturation parameter.
const BM25_K1: f32 = 1.2;
/// BM25 length-normalization parameter.
const BM25_B: f32 = 0.75;

/// One chunk held by the in-memory index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    /// Identity within the owning document.
    pub chunk_id: String,
    /// Owning document.
    pub document_id: String,
    /// Owning container (collection/folder grouping of documents).
    pub container_id: String,
    /// Chunk text.
    pub content: String,
    /// Page provenance, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    /// Section provenance, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_title: Option<String>,
    /// Stored embedding; filled in by [`MemoryIndex::build`] when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embedding: Vec<f32>,
}

impl StoredChunk {
    fn to_candidate(&self, score: f32) -> CandidateRecord {
        CandidateRecord {
            chunk_id: self.chunk_id.clone(),
            document_id: self.document_id.clone(),
            content: self.content.clone(),
            score,
            page_number: self.page_number,
            section_title: self.section_title.clone(),
        }
    }
}

/// In-memory search backend over a fixed chunk set.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    chunks: Vec<StoredChunk>,
}

impl MemoryIndex {
    /// Creates an index over chunks that already carry embeddings.
    #[must_use]
    pub const fn new(chunks: Vec<StoredChunk>) -> Self {
        Self { chunks }
    }

    /// Creates an index, embedding any chunk whose `embedding` is empty.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Backend`] when the embedding provider fails.
    pub async fn build(
        mut chunks: Vec<StoredChunk>,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<Self, AgentError> {
        for chunk in &mut chunks {
            if chunk.embedding.is_empty() {
                chunk.embedding = embedder.embed(&chunk.content).await?;
            }
        }
        Ok(Self { chunks })
    }

    /// Number of chunks in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns `true` when the index holds no chunks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    fn scoped(&self, scope: &Scope) -> impl Iterator<Item = &StoredChunk> {
        self.chunks
            .iter()
            .filter(|c| scope.allows(&c.container_id, &c.document_id))
    }
}

#[async_trait]
impl SearchBackend for MemoryIndex {
    fn provider(&self) -> &str {
        "memory_index"
    }

    async fn vector_search(
        &self,
        embedding: &[f32],
        scope: &Scope,
        limit: usize,
        threshold: f32,
    ) -> Result<Vec<CandidateRecord>, AgentError> {
        let mut hits: Vec<CandidateRecord> = self
            .scoped(scope)
            .filter_map(|chunk| {
                let score = cosine_similarity(embedding, &chunk.embedding);
                // Below-threshold candidates are excluded, not zero-scored.
                (score >= threshold).then(|| chunk.to_candidate(score))
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn keyword_search(
        &self,
        keywords: &[String],
        scope: &Scope,
        limit: usize,
    ) -> Result<Vec<CandidateRecord>, AgentError> {
        if keywords.is_empty() {
            return Ok(Vec::new());
        }
        let lowered: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
        let total = lowered.len() as f32;

        let mut hits: Vec<CandidateRecord> = self
            .scoped(scope)
            .filter_map(|chunk| {
                let haystack = chunk.content.to_lowercase();
                let matched = lowered.iter().filter(|k| haystack.contains(k.as_str())).count();
                (matched > 0).then(|| chunk.to_candidate(matched as f32 / total))
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn fulltext_search(
        &self,
        query: &str,
        scope: &Scope,
        limit: usize,
    ) -> Result<Vec<CandidateRecord>, AgentError> {
        let terms: Vec<String> = tokenize(query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        // Corpus statistics over the scoped subset only; out-of-scope
        // chunks never influence idf or length normalization.
        let scoped: Vec<&StoredChunk> = self.scoped(scope).collect();
        let doc_count = scoped.len();
        if doc_count == 0 {
            return Ok(Vec::new());
        }

        let token_lists: Vec<Vec<String>> = scoped.iter().map(|c| tokenize(&c.content)).collect();
        let avg_len = token_lists.iter().map(Vec::len).sum::<usize>() as f32 / doc_count as f32;

        let mut hits: Vec<CandidateRecord> = Vec::new();
        for (chunk, tokens) in scoped.iter().zip(&token_lists) {
            let score = bm25_score(&terms, tokens, &token_lists, avg_len);
            if score > 0.0 {
                hits.push(chunk.to_candidate(score));
            }
        }
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit);
        Ok(hits)
    }
}

/// Model-free embedding provider: hashed bag-of-words projection,
/// L2-normalized. Stable across runs and platforms.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashEmbedder;

impl HashEmbedder {
    /// Embeds text synchronously; the async trait impl delegates here.
    #[must_use]
    pub fn embed_text(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; HASH_EMBEDDING_DIM];
        for word in tokenize(text) {
            let hash = fnv1a(word.as_bytes());
            let bucket = (hash as usize) % HASH_EMBEDDING_DIM;
            let sign = if hash & (1 << 63) == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AgentError> {
        Ok(Self::embed_text(text))
    }
}

/// Lowercased unicode word tokens.
fn tokenize(text: &str) -> Vec<String> {
    text.unicode_words().map(str::to_lowercase).collect()
}

/// FNV-1a, inlined so embeddings do not depend on `DefaultHasher`'s
/// unspecified algorithm.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut hash = OFFSET;
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// BM25 with standard parameters over a small in-memory corpus.
fn bm25_score(
    terms: &[String],
    doc_tokens: &[String],
    all_docs: &[Vec<String>],
    avg_len: f32,
) -> f32 {
    let doc_len = doc_tokens.len() as f32;
    let n = all_docs.len() as f32;
    let mut score = 0.0f32;

    for term in terms {
        let tf = doc_tokens.iter().filter(|t| *t == term).count() as f32;
        if tf == 0.0 {
            continue;
        }
        let df = all_docs.iter().filter(|d| d.contains(term)).count() as f32;
        let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();
        let denom = tf + BM25_K1 * (1.0 - BM25_B + BM25_B * doc_len / avg_len);
        score += idf * tf * (BM25_K1 + 1.0) / denom;
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(chunk_id: &str, document_id: &str, content: &str) -> StoredChunk {
        StoredChunk {
            chunk_id: chunk_id.to_string(),
            document_id: document_id.to_string(),
            container_id: "main".to_string(),
            content: content.to_string(),
            page_number: None,
            section_title: None,
            embedding: HashEmbedder::embed_text(content),
        }
    }

    fn index() -> MemoryIndex {
        MemoryIndex::new(vec![
            chunk("c1", "doc1", "Paris is the capital of France."),
            chunk("c2", "doc1", "France borders Spain and Italy."),
            chunk("c3", "doc2", "The annual budget report for 2024."),
            chunk("c4", "doc2", "Quarterly revenue grew by ten percent."),
        ])
    }

    #[tokio::test]
    async fn test_vector_search_respects_threshold() {
        let idx = index();
        let query = HashEmbedder::embed_text("capital of France");
        let hits = idx
            .vector_search(&query, &Scope::default(), 10, 0.2)
            .await
            .unwrap_or_default();
        assert!(!hits.is_empty());
        for hit in &hits {
            assert!(hit.score >= 0.2, "hit {} below threshold", hit.chunk_id);
        }
    }

    #[tokio::test]
    async fn test_vector_search_is_deterministic() {
        let idx = index();
        let query = HashEmbedder::embed_text("France");
        let a = idx
            .vector_search(&query, &Scope::default(), 10, 0.0)
            .await
            .unwrap_or_default();
        let b = idx
            .vector_search(&query, &Scope::default(), 10, 0.0)
            .await
            .unwrap_or_default();
        let ids_a: Vec<&str> = a.iter().map(|c| c.chunk_id.as_str()).collect();
        let ids_b: Vec<&str> = b.iter().map(|c| c.chunk_id.as_str()).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[tokio::test]
    async fn test_keyword_search_coverage_ratio() {
        let idx = index();
        let keywords = vec!["budget".to_string(), "report".to_string(), "zzz".to_string()];
        let hits = idx
            .keyword_search(&keywords, &Scope::default(), 10)
            .await
            .unwrap_or_default();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chunk_id, "c3");
        let expected = 2.0 / 3.0;
        assert!((hits[0].score - expected).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_keyword_search_empty_keywords() {
        let idx = index();
        let hits = idx
            .keyword_search(&[], &Scope::default(), 10)
            .await
            .unwrap_or_default();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_fulltext_search_ranks_matching_chunks() {
        let idx = index();
        let hits = idx
            .fulltext_search("budget report", &Scope::default(), 10)
            .await
            .unwrap_or_default();
        assert!(!hits.is_empty());
        assert_eq!(hits[0].chunk_id, "c3");
        // BM25 scores are engine-native, not bounded to [0, 1].
        assert!(hits[0].score > 0.0);
    }

    #[tokio::test]
    async fn test_document_scope_filters_before_scoring() {
        let idx = index();
        let scope = Scope {
            container_ids: None,
            document_ids: Some(vec!["doc2".to_string()]),
        };
        let query = HashEmbedder::embed_text("France");
        let hits = idx.vector_search(&query, &scope, 10, 0.0).await.unwrap_or_default();
        assert!(hits.iter().all(|h| h.document_id == "doc2"));
    }

    #[tokio::test]
    async fn test_build_fills_missing_embeddings() {
        let mut raw = chunk("c1", "doc1", "hello world");
        raw.embedding = Vec::new();
        let idx = MemoryIndex::build(vec![raw], &HashEmbedder)
            .await
            .unwrap_or_default();
        assert_eq!(idx.len(), 1);
        let query = HashEmbedder::embed_text("hello world");
        let hits = idx
            .vector_search(&query, &Scope::default(), 1, 0.9)
            .await
            .unwrap_or_default();
        assert_eq!(hits.len(), 1, "self-similarity should be ~1.0");
    }

    #[test]
    fn test_hash_embedder_stable_and_normalized() {
        let a = HashEmbedder::embed_text("stable embedding");
        let b = HashEmbedder::embed_text("stable embedding");
        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_cosine_edge_cases() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }
}
