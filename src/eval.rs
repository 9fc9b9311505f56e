//! Offline retrieval-quality evaluation over labeled queries.
//!
//! Each labeled query names the documents a good run should surface; the
//! harness executes the agent and scores the cited references with standard
//! rank metrics (recall@k, precision@k, reciprocal rank, nDCG with binary
//! gains). Because classification and strategy selection are deterministic,
//! a fixed corpus and dataset give reproducible numbers.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::agent::PaperSearchAgent;
use crate::core::Constraints;
use crate::error::AgentError;

/// One labeled query in an evaluation dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledQuery {
    /// Stable identifier for reporting; falls back to the query text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The query to run.
    pub query: String,
    /// Documents a good run should cite.
    pub expected_document_ids: Vec<String>,
    /// Per-query constraint override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
}

/// Rank metrics for a single query.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RetrievalMetrics {
    /// Fraction of expected documents retrieved.
    pub recall_at_k: f64,
    /// Fraction of retrieved documents that were expected.
    pub precision_at_k: f64,
    /// Reciprocal rank of the first relevant document; `0.0` when none.
    pub rr: f64,
    /// Normalized discounted cumulative gain with binary gains.
    pub ndcg: f64,
    /// Number of retrieved documents that were expected.
    pub relevant_count: usize,
}

/// Per-query evaluation record.
#[derive(Debug, Clone, Serialize)]
pub struct QueryReport {
    /// Dataset identifier of the query.
    pub id: String,
    /// The query text.
    pub query: String,
    /// Trace of the underlying agent run.
    pub trace_id: String,
    /// Terminal status of the run.
    pub status: String,
    /// Number of expected documents.
    pub expected_count: usize,
    /// Number of distinct documents cited.
    pub retrieved_count: usize,
    /// Rank metrics for this query.
    #[serde(flatten)]
    pub metrics: RetrievalMetrics,
    /// Total agent latency for this query.
    pub latency_ms: f64,
}

/// Dataset-level aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct EvalSummary {
    /// Number of queries evaluated.
    pub query_count: usize,
    /// Mean recall@k over all queries.
    pub avg_recall_at_k: f64,
    /// Mean precision@k over all queries.
    pub avg_precision_at_k: f64,
    /// Mean reciprocal rank over all queries.
    pub mean_rr: f64,
    /// Mean nDCG over all queries.
    pub mean_ndcg: f64,
    /// Median agent latency.
    pub latency_ms_p50: f64,
    /// 95th-percentile agent latency.
    pub latency_ms_p95: f64,
}

/// Full evaluation output: aggregate plus per-query records.
#[derive(Debug, Clone, Serialize)]
pub struct EvalReport {
    /// Dataset-level aggregate.
    pub summary: EvalSummary,
    /// One record per labeled query, in dataset order.
    pub queries: Vec<QueryReport>,
}

/// Runs every labeled query through the agent and scores the results.
///
/// # Errors
///
/// Returns [`AgentError::InvalidInput`] when a dataset entry is itself
/// invalid (blank query or bad constraints); run-level retrieval failures
/// are scored as zero-metric rows instead.
pub async fn evaluate(
    agent: &PaperSearchAgent,
    dataset: &[LabeledQuery],
) -> Result<EvalReport, AgentError> {
    let mut queries = Vec::with_capacity(dataset.len());

    for labeled in dataset {
        let constraints = labeled.constraints.clone().unwrap_or_default();
        let result = agent.execute(&labeled.query, constraints).await?;

        let expected: HashSet<String> = labeled.expected_document_ids.iter().cloned().collect();
        let retrieved = cited_documents(result.references.iter().map(|r| r.document_id.as_str()));
        let metrics = compute_metrics(&retrieved, &expected);

        queries.push(QueryReport {
            id: labeled.id.clone().unwrap_or_else(|| labeled.query.clone()),
            query: labeled.query.clone(),
            trace_id: result.trace_id,
            status: result.status.to_string(),
            expected_count: expected.len(),
            retrieved_count: retrieved.len(),
            metrics,
            latency_ms: result.metrics.total_latency_ms,
        });
    }

    Ok(EvalReport {
        summary: summarize(&queries),
        queries,
    })
}

/// Distinct document ids in citation order.
fn cited_documents<'a>(references: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for id in references {
        if seen.insert(id) {
            out.push(id.to_string());
        }
    }
    out
}

/// Scores one ranked retrieval against a binary relevance set.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compute_metrics(retrieved: &[String], expected: &HashSet<String>) -> RetrievalMetrics {
    let mut relevant_count = 0usize;
    let mut dcg = 0.0_f64;
    let mut first_hit: Option<usize> = None;

    for (idx, id) in retrieved.iter().enumerate() {
        if expected.contains(id) {
            relevant_count += 1;
            let rank = idx + 1;
            dcg += 1.0 / (rank as f64 + 1.0).log2();
            if first_hit.is_none() {
                first_hit = Some(rank);
            }
        }
    }

    let rr = first_hit.map_or(0.0, |rank| 1.0 / rank as f64);

    let ideal_hits = expected.len().min(retrieved.len());
    let mut idcg = 0.0_f64;
    for idx in 0..ideal_hits {
        idcg += 1.0 / ((idx + 1) as f64 + 1.0).log2();
    }
    let ndcg = if idcg > 0.0 { dcg / idcg } else { 0.0 };

    let precision_at_k = if retrieved.is_empty() {
        0.0
    } else {
        relevant_count as f64 / retrieved.len() as f64
    };
    let recall_at_k = if expected.is_empty() {
        0.0
    } else {
        relevant_count as f64 / expected.len() as f64
    };

    RetrievalMetrics {
        recall_at_k,
        precision_at_k,
        rr,
        ndcg,
        relevant_count,
    }
}

#[allow(clippy::cast_precision_loss)]
fn summarize(queries: &[QueryReport]) -> EvalSummary {
    let n = queries.len();
    let mean = |f: fn(&QueryReport) -> f64| {
        if n == 0 {
            0.0
        } else {
            queries.iter().map(f).sum::<f64>() / n as f64
        }
    };

    let mut latencies: Vec<f64> = queries.iter().map(|q| q.latency_ms).collect();
    latencies.sort_by(f64::total_cmp);

    EvalSummary {
        query_count: n,
        avg_recall_at_k: mean(|q| q.metrics.recall_at_k),
        avg_precision_at_k: mean(|q| q.metrics.precision_at_k),
        mean_rr: mean(|q| q.metrics.rr),
        mean_ndcg: mean(|q| q.metrics.ndcg),
        latency_ms_p50: percentile(&latencies, 0.50),
        latency_ms_p95: percentile(&latencies, 0.95),
    }
}

/// Linear-interpolated percentile over a sorted slice.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percentile(sorted: &[f64], percentile: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let clamped = percentile.clamp(0.0, 1.0);
    let pos = clamped * (sorted.len() as f64 - 1.0);
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let weight = pos - lower as f64;
        sorted[lower].mul_add(1.0 - weight, sorted[upper] * weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| (*s).to_string()).collect()
    }

    fn retrieved(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_perfect_retrieval() {
        let m = compute_metrics(&retrieved(&["a", "b"]), &expected(&["a", "b"]));
        assert!((m.recall_at_k - 1.0).abs() < 1e-9);
        assert!((m.precision_at_k - 1.0).abs() < 1e-9);
        assert!((m.rr - 1.0).abs() < 1e-9);
        assert!((m.ndcg - 1.0).abs() < 1e-9);
        assert_eq!(m.relevant_count, 2);
    }

    #[test]
    fn test_miss_everything() {
        let m = compute_metrics(&retrieved(&["x", "y"]), &expected(&["a"]));
        assert!(m.recall_at_k.abs() < 1e-9);
        assert!(m.precision_at_k.abs() < 1e-9);
        assert!(m.rr.abs() < 1e-9);
        assert!(m.ndcg.abs() < 1e-9);
    }

    #[test]
    fn test_first_hit_at_rank_two() {
        let m = compute_metrics(&retrieved(&["x", "a"]), &expected(&["a"]));
        assert!((m.rr - 0.5).abs() < 1e-9);
        assert!((m.recall_at_k - 1.0).abs() < 1e-9);
        assert!((m.precision_at_k - 0.5).abs() < 1e-9);
        // dcg = 1/log2(3), idcg = 1/log2(2) = 1
        let expected_ndcg = 1.0 / 3.0_f64.log2();
        assert!((m.ndcg - expected_ndcg).abs() < 1e-9);
    }

    #[test]
    fn test_empty_retrieval_scores_zero() {
        let m = compute_metrics(&[], &expected(&["a"]));
        assert!(m.recall_at_k.abs() < 1e-9);
        assert!(m.precision_at_k.abs() < 1e-9);
        assert!(m.ndcg.abs() < 1e-9);
    }

    #[test]
    fn test_percentile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert!((percentile(&values, 0.0) - 1.0).abs() < 1e-9);
        assert!((percentile(&values, 1.0) - 4.0).abs() < 1e-9);
        assert!((percentile(&values, 0.5) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_percentile_empty_is_zero() {
        assert!(percentile(&[], 0.5).abs() < 1e-9);
    }
}
