//! Candidate records and the per-tool result envelope.

use serde::{Deserialize, Serialize};

/// One retrieved unit of content considered for inclusion in the context.
///
/// `score` is only comparable *within* a single tool's output; different
/// retrieval modalities score on different scales. Cross-tool merging goes
/// through rank fusion (see [`fuse`](crate::tools::fusion::fuse)) rather
/// than raw score comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Identity of the retrieved unit, unique within its document.
    pub chunk_id: String,
    /// Owning document.
    pub document_id: String,
    /// The retrievable text.
    pub content: String,
    /// Relevance signal from the producing tool (modality-specific scale).
    pub score: f32,
    /// Page the chunk came from, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    /// Section title the chunk came from, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_title: Option<String>,
}

impl CandidateRecord {
    /// Dedup identity: `chunk_id` is only unique within a document, so the
    /// pair is the global key.
    #[must_use]
    pub fn identity(&self) -> (&str, &str) {
        (self.document_id.as_str(), self.chunk_id.as_str())
    }
}

/// Execution metadata attached to every tool result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolMetrics {
    /// Wall-clock latency of the tool call.
    pub latency_ms: f64,
    /// Number of items in the result data.
    pub items_returned: usize,
    /// Identifier of the backing resource that served the call.
    pub provider: String,
    /// Whether the result was served from a cache. Always `false` for the
    /// in-process backends, which never cache; kept for trace consumers.
    pub cache_hit: bool,
    /// Retries performed before this result. Always `0` for the in-process
    /// backends, which never retry; kept for trace consumers.
    pub retries: u32,
    /// Correlates the call to its parent agent invocation.
    pub trace_id: String,
}

/// Payload of the context-builder tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextData {
    /// The packed, citation-annotated context text.
    pub text: String,
    /// Number of candidates that made it into the context.
    pub used_chunks: usize,
    /// Estimated tokens consumed, never above the budget.
    pub total_tokens: usize,
    /// Set when the first candidate alone exceeded the budget and was
    /// truncated to fit.
    pub truncated: bool,
}

/// Tool-specific payload inside a [`ToolResult`].
///
/// A closed set: retrieval and processing tools carry candidate lists, the
/// context builder carries [`ContextData`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolData {
    /// An ordered candidate list (descending score or engine-native rank).
    Candidates(Vec<CandidateRecord>),
    /// The packed context produced by the context builder.
    Context(ContextData),
}

impl Default for ToolData {
    fn default() -> Self {
        Self::Candidates(Vec::new())
    }
}

impl ToolData {
    /// Number of items carried by this payload.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Candidates(c) => c.len(),
            Self::Context(ctx) => ctx.used_chunks,
        }
    }

    /// Returns `true` when the payload carries nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Envelope returned by every tool.
///
/// Invariant: when `success` is `false`, `data` is empty and `errors` is
/// non-empty. Tools never return a Rust `Err` across the agent boundary;
/// failures are always represented here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the tool call succeeded. An empty result set is a success.
    pub success: bool,
    /// Tool-specific payload; empty on failure.
    pub data: ToolData,
    /// Execution metadata.
    pub metrics: ToolMetrics,
    /// Human-readable error messages; non-empty exactly on failure.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ToolResult {
    /// Builds a successful result carrying `data`.
    #[must_use]
    pub fn ok(data: ToolData, mut metrics: ToolMetrics) -> Self {
        metrics.items_returned = data.len();
        Self {
            success: true,
            data,
            metrics,
            errors: Vec::new(),
        }
    }

    /// Builds a failed result with empty data and the given error.
    #[must_use]
    pub fn failed(error: impl Into<String>, mut metrics: ToolMetrics) -> Self {
        metrics.items_returned = 0;
        Self {
            success: false,
            data: ToolData::default(),
            metrics,
            errors: vec![error.into()],
        }
    }

    /// Returns the candidate payload, or an empty slice for context payloads
    /// and failures.
    #[must_use]
    pub fn candidates(&self) -> &[CandidateRecord] {
        match &self.data {
            ToolData::Candidates(c) => c,
            ToolData::Context(_) => &[],
        }
    }

    /// Returns the context payload if this result carries one.
    #[must_use]
    pub const fn context(&self) -> Option<&ContextData> {
        match &self.data {
            ToolData::Context(ctx) => Some(ctx),
            ToolData::Candidates(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(chunk_id: &str, score: f32) -> CandidateRecord {
        CandidateRecord {
            chunk_id: chunk_id.to_string(),
            document_id: "doc1".to_string(),
            content: "text".to_string(),
            score,
            page_number: None,
            section_title: None,
        }
    }

    #[test]
    fn test_ok_result_counts_items() {
        let result = ToolResult::ok(
            ToolData::Candidates(vec![record("c1", 0.9), record("c2", 0.5)]),
            ToolMetrics::default(),
        );
        assert!(result.success);
        assert!(result.errors.is_empty());
        assert_eq!(result.metrics.items_returned, 2);
        assert_eq!(result.candidates().len(), 2);
    }

    #[test]
    fn test_failed_result_is_empty_with_errors() {
        let result = ToolResult::failed("index unreachable", ToolMetrics::default());
        assert!(!result.success);
        assert!(result.candidates().is_empty());
        assert_eq!(result.metrics.items_returned, 0);
        assert_eq!(result.errors, vec!["index unreachable".to_string()]);
    }

    #[test]
    fn test_identity_pairs_document_and_chunk() {
        let r = record("c3", 0.1);
        assert_eq!(r.identity(), ("doc1", "c3"));
    }

    #[test]
    fn test_context_payload_accessors() {
        let result = ToolResult::ok(
            ToolData::Context(ContextData {
                text: "[1] text".to_string(),
                used_chunks: 1,
                total_tokens: 2,
                truncated: false,
            }),
            ToolMetrics::default(),
        );
        assert!(result.candidates().is_empty());
        let ctx = result.context();
        assert!(ctx.is_some_and(|c| c.used_chunks == 1));
    }

    #[test]
    fn test_serialization_skips_empty_errors() {
        let result = ToolResult::ok(ToolData::default(), ToolMetrics::default());
        let json = serde_json::to_string(&result).unwrap_or_default();
        assert!(!json.contains("errors"));
    }
}
