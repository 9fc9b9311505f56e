//! Exact and near-duplicate candidate removal.

use std::collections::{HashMap, HashSet};

use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

use super::RunContext;
use crate::core::{CandidateRecord, ToolData, ToolResult};

/// Shingle width for textual similarity.
const SHINGLE_WIDTH: usize = 3;

/// Processing tool that collapses redundant candidates.
///
/// Pass 1 removes exact `(document_id, chunk_id)` duplicates, keeping the
/// highest-scored occurrence. Pass 2 collapses near-duplicates whose word
/// 3-gram Jaccard similarity exceeds the run's `similarity_threshold`,
/// keeping the higher-scored member. Both passes are deterministic and the
/// output preserves the relative order of survivors; on score ties the
/// earlier candidate wins. Running the tool on its own output changes
/// nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeduplicateTool;

impl DeduplicateTool {
    /// Runs both deduplication passes.
    #[must_use]
    pub fn run(&self, candidates: &[CandidateRecord], ctx: &RunContext) -> ToolResult {
        let timer = ctx.start_metrics("in_process");
        let threshold = ctx.constraints.similarity_threshold;

        let survivors = collapse_near(&collapse_exact(candidates), threshold);
        debug!(
            trace_id = %ctx.trace_id,
            before = candidates.len(),
            after = survivors.len(),
            "deduplication completed"
        );
        ToolResult::ok(ToolData::Candidates(survivors), timer.finish())
    }
}

/// Removes exact identity duplicates, keeping the highest-scored occurrence
/// (earliest on ties) at its original position.
fn collapse_exact(candidates: &[CandidateRecord]) -> Vec<CandidateRecord> {
    let mut best: HashMap<(&str, &str), usize> = HashMap::new();
    for (idx, candidate) in candidates.iter().enumerate() {
        match best.get(&candidate.identity()) {
            Some(&kept) if candidates[kept].score >= candidate.score => {}
            _ => {
                best.insert(candidate.identity(), idx);
            }
        }
    }
    candidates
        .iter()
        .enumerate()
        .filter(|(idx, candidate)| best.get(&candidate.identity()) == Some(idx))
        .map(|(_, candidate)| candidate.clone())
        .collect()
}

/// Collapses textual near-duplicates; each cluster keeps its higher-scored
/// member in the slot of the member seen first.
fn collapse_near(candidates: &[CandidateRecord], threshold: f32) -> Vec<CandidateRecord> {
    let mut kept: Vec<(CandidateRecord, HashSet<String>)> = Vec::new();

    for candidate in candidates {
        let shingles = shingles(&candidate.content);
        let collision = kept
            .iter()
            .position(|(_, existing)| jaccard(&shingles, existing) > threshold);
        match collision {
            Some(i) => {
                if candidate.score > kept[i].0.score {
                    kept[i] = (candidate.clone(), shingles);
                    merge_colliding(&mut kept, i, threshold);
                }
            }
            None => kept.push((candidate.clone(), shingles)),
        }
    }

    kept.into_iter().map(|(candidate, _)| candidate).collect()
}

/// Restores pairwise dissimilarity after a representative swap.
///
/// A replacement can bridge clusters the old representative was not similar
/// to. Folds every now-colliding cluster into the earliest slot, keeping the
/// higher-scored representative, until no pair collides.
fn merge_colliding(
    kept: &mut Vec<(CandidateRecord, HashSet<String>)>,
    mut i: usize,
    threshold: f32,
) {
    loop {
        let Some(j) =
            (0..kept.len()).find(|&j| j != i && jaccard(&kept[i].1, &kept[j].1) > threshold)
        else {
            return;
        };
        let (lo, hi) = (i.min(j), i.max(j));
        let winner = if kept[j].0.score > kept[i].0.score { j } else { i };
        if winner == hi {
            kept.swap(lo, hi);
        }
        kept.remove(hi);
        i = lo;
    }
}

/// Word 3-gram shingle set; short texts fall back to their word set.
fn shingles(text: &str) -> HashSet<String> {
    let words: Vec<String> = text.unicode_words().map(str::to_lowercase).collect();
    if words.len() < SHINGLE_WIDTH {
        return words.into_iter().collect();
    }
    words
        .windows(SHINGLE_WIDTH)
        .map(|w| w.join(" "))
        .collect()
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f32 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count() as f32;
    let union = (a.len() + b.len()) as f32 - intersection;
    intersection / union
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Constraints;

    fn record(chunk_id: &str, document_id: &str, content: &str, score: f32) -> CandidateRecord {
        CandidateRecord {
            chunk_id: chunk_id.to_string(),
            document_id: document_id.to_string(),
            content: content.to_string(),
            score,
            page_number: None,
            section_title: None,
        }
    }

    fn ctx(threshold: f32) -> RunContext {
        RunContext {
            trace_id: "t".to_string(),
            query: "q".to_string(),
            constraints: Constraints {
                similarity_threshold: threshold,
                ..Constraints::default()
            },
        }
    }

    #[test]
    fn test_exact_duplicates_keep_highest_score() {
        let candidates = vec![
            record("c3", "doc1", "overlapping hit", 0.9),
            record("other", "doc1", "different entirely unrelated words here", 0.8),
            record("c3", "doc1", "overlapping hit", 0.5),
        ];
        let result = DeduplicateTool.run(&candidates, &ctx(0.8));
        let survivors = result.candidates();
        assert_eq!(survivors.len(), 2);
        assert_eq!(survivors[0].chunk_id, "c3");
        assert!((survivors[0].score - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn test_same_chunk_id_different_documents_kept() {
        let candidates = vec![
            record("c1", "doc1", "alpha beta gamma delta epsilon", 0.9),
            record("c1", "doc2", "completely different words in this one", 0.8),
        ];
        let result = DeduplicateTool.run(&candidates, &ctx(0.8));
        assert_eq!(result.candidates().len(), 2);
    }

    #[test]
    fn test_near_duplicates_collapse_to_higher_score() {
        let text = "the quick brown fox jumps over the lazy dog near the river";
        let near = "the quick brown fox jumps over the lazy dog near the riverbank";
        let candidates = vec![
            record("a", "doc1", text, 0.9),
            record("b", "doc2", near, 0.7),
            record("c", "doc3", "an entirely unrelated passage about astronomy", 0.6),
        ];
        let result = DeduplicateTool.run(&candidates, &ctx(0.5));
        let survivors = result.candidates();
        assert_eq!(survivors.len(), 2);
        assert_eq!(survivors[0].chunk_id, "a");
        assert_eq!(survivors[1].chunk_id, "c");
    }

    #[test]
    fn test_order_preserved_for_survivors() {
        let candidates = vec![
            record("a", "doc1", "first topic entirely about oceans and tides", 0.9),
            record("b", "doc2", "second topic entirely about mountain geology", 0.8),
            record("c", "doc3", "third topic entirely about desert climates", 0.7),
        ];
        let result = DeduplicateTool.run(&candidates, &ctx(0.8));
        let ids: Vec<&str> = result
            .candidates()
            .iter()
            .map(|c| c.chunk_id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_idempotent() {
        let candidates = vec![
            record("a", "doc1", "shared text about retrieval systems design", 0.9),
            record("a", "doc1", "shared text about retrieval systems design", 0.4),
            record("b", "doc2", "shared text about retrieval systems designs", 0.8),
            record("c", "doc3", "unrelated discussion of cooking techniques", 0.5),
        ];
        let ctx = ctx(0.5);
        let once = DeduplicateTool.run(&candidates, &ctx);
        let twice = DeduplicateTool.run(once.candidates(), &ctx);
        assert_eq!(once.candidates(), twice.candidates());
    }

    #[test]
    fn test_replacement_merges_bridged_clusters() {
        // "a" overlaps both "b" and "c", which do not overlap each other.
        // When "a" replaces "b" it must also absorb "c", otherwise a second
        // run would still find that collision and shrink the set again.
        let candidates = vec![
            record("b", "doc1", "alpha beta gamma delta epsilon zeta", 0.5),
            record("c", "doc2", "one two three four five six", 0.4),
            record("a", "doc3", "alpha beta gamma delta one two three four", 0.9),
        ];
        let ctx = ctx(0.2);
        let once = DeduplicateTool.run(&candidates, &ctx);
        let ids: Vec<&str> = once
            .candidates()
            .iter()
            .map(|c| c.chunk_id.as_str())
            .collect();
        assert_eq!(ids, vec!["a"]);
        let twice = DeduplicateTool.run(once.candidates(), &ctx);
        assert_eq!(once.candidates(), twice.candidates());
    }

    #[test]
    fn test_score_tie_keeps_earlier() {
        let candidates = vec![
            record("a", "doc1", "identical text body for both candidates", 0.5),
            record("b", "doc2", "identical text body for both candidates", 0.5),
        ];
        let result = DeduplicateTool.run(&candidates, &ctx(0.5));
        let survivors = result.candidates();
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].chunk_id, "a");
    }

    #[test]
    fn test_jaccard_bounds() {
        let a = shingles("alpha beta gamma delta");
        let b = shingles("alpha beta gamma delta");
        assert!((jaccard(&a, &b) - 1.0).abs() < f32::EPSILON);
        let c = shingles("entirely different words altogether here");
        assert!(jaccard(&a, &c) < 0.01);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        // The last phrase bridges the first two otherwise-dissimilar ones at
        // the property threshold, so replacement-induced merges get exercised.
        const PHRASES: [&str; 5] = [
            "alpha beta gamma delta epsilon zeta",
            "one two three four five six",
            "dropout regularization prevents overfitting in networks",
            "dropout regularization prevents overfitting in models",
            "alpha beta gamma delta one two three four",
        ];

        fn arb_candidates() -> impl Strategy<Value = Vec<CandidateRecord>> {
            prop::collection::vec(
                (0u8..3, 0u8..2, 0usize..PHRASES.len(), 0.0f32..1.0),
                0..12,
            )
            .prop_map(|entries| {
                entries
                    .into_iter()
                    .map(|(chunk, doc, phrase, score)| {
                        record(
                            &format!("c{chunk}"),
                            &format!("doc{doc}"),
                            PHRASES[phrase],
                            score,
                        )
                    })
                    .collect()
            })
        }

        proptest! {
            #[test]
            fn dedup_is_idempotent(candidates in arb_candidates()) {
                let ctx = ctx(0.2);
                let once = DeduplicateTool.run(&candidates, &ctx);
                let twice = DeduplicateTool.run(once.candidates(), &ctx);
                prop_assert_eq!(once.candidates(), twice.candidates());
            }

            #[test]
            fn dedup_never_grows_the_set(candidates in arb_candidates()) {
                let result = DeduplicateTool.run(&candidates, &ctx(0.2));
                prop_assert!(result.candidates().len() <= candidates.len());
            }
        }
    }
}
