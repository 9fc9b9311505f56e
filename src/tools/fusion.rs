//! Rank-based merging of multi-modality candidate lists.
//!
//! Retrieval modalities score on incompatible scales (cosine similarity,
//! coverage ratios, BM25), so merging is done by Reciprocal Rank Fusion
//! rather than score normalization: each candidate's fused score is
//! `Σ 1 / (k + rank)` over the lists it appears in. A pool backed by a
//! single list keeps its native scores untouched.

use std::collections::HashMap;

use crate::core::CandidateRecord;
use crate::tools::ToolName;

/// Default RRF smoothing constant.
pub const DEFAULT_RRF_K: f32 = 60.0;

/// One retrieval tool's ranked output, queued for fusion.
#[derive(Debug, Clone)]
pub struct RankedList {
    /// Tool that produced the list.
    pub source: ToolName,
    /// Candidates in the tool's output order (best first).
    pub candidates: Vec<CandidateRecord>,
}

/// Merges ranked lists into one pool.
///
/// With zero lists the pool is empty; with one list the candidates pass
/// through unchanged (native scores preserved); with several, candidates
/// are fused by RRF, each identity keeping the record from the first list
/// it appeared in. Output is sorted by fused score descending; ties keep
/// first-appearance order (iteration over lists in input order).
#[must_use]
pub fn fuse(lists: &[RankedList], rrf_k: f32) -> Vec<CandidateRecord> {
    match lists {
        [] => Vec::new(),
        [single] => single.candidates.clone(),
        many => {
            // Identity -> (first-seen record, fused score, first-seen order).
            let mut fused: HashMap<(String, String), (CandidateRecord, f32, usize)> =
                HashMap::new();
            let mut order = 0usize;

            for list in many {
                for (rank, candidate) in list.candidates.iter().enumerate() {
                    let contribution = 1.0 / (rrf_k + rank as f32 + 1.0);
                    let key = (candidate.document_id.clone(), candidate.chunk_id.clone());
                    match fused.get_mut(&key) {
                        Some((_, score, _)) => *score += contribution,
                        None => {
                            fused.insert(key, (candidate.clone(), contribution, order));
                            order += 1;
                        }
                    }
                }
            }

            let mut pool: Vec<(CandidateRecord, f32, usize)> = fused.into_values().collect();
            pool.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.2.cmp(&b.2)));
            pool.into_iter()
                .map(|(mut record, score, _)| {
                    record.score = score;
                    record
                })
                .collect()
        }
    }
}
