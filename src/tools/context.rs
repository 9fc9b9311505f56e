//! Token-budgeted context packing with citation markers.

use tracing::debug;

use super::RunContext;
use crate::core::{CandidateRecord, ContextData, ToolData, ToolResult};

/// Estimates how many tokens a piece of text will consume.
///
/// The agent never calls a tokenizer; an estimator keeps the budget check
/// cheap and provider-agnostic. Estimates only need to be monotone in text
/// length and consistent within a run.
pub trait TokenEstimator: Send + Sync {
    /// Estimated token count for `text`.
    fn estimate(&self, text: &str) -> usize;
}

/// Character-ratio token estimator.
///
/// Roughly four characters per token holds for English prose, which is what
/// paper chunks are. Deliberately overcounts short strings (minimum one
/// token per non-empty text) so the budget is never exceeded in practice.
#[derive(Debug, Clone, Copy)]
pub struct CharEstimator {
    chars_per_token: usize,
}

impl CharEstimator {
    /// Creates an estimator with the given character-to-token ratio.
    /// A ratio of zero is clamped to one.
    #[must_use]
    pub const fn new(chars_per_token: usize) -> Self {
        Self {
            chars_per_token: if chars_per_token == 0 {
                1
            } else {
                chars_per_token
            },
        }
    }
}

impl Default for CharEstimator {
    fn default() -> Self {
        Self::new(4)
    }
}

impl TokenEstimator for CharEstimator {
    fn estimate(&self, text: &str) -> usize {
        text.chars().count().div_ceil(self.chars_per_token)
    }
}

/// Processing tool that packs ranked candidates into a citeable context.
///
/// Candidates are consumed in order; each is rendered as a `[n]`-numbered
/// block with its source attribution. Packing stops at the first candidate
/// that would exceed the token budget, so the included set is always a
/// prefix of the input. The one exception: when the *first* candidate alone
/// does not fit, its content is truncated to the budget and the result is
/// flagged `truncated`.
pub struct ContextBuilderTool {
    estimator: Box<dyn TokenEstimator>,
}

impl ContextBuilderTool {
    /// Creates the tool with the given token estimator.
    #[must_use]
    pub fn new(estimator: Box<dyn TokenEstimator>) -> Self {
        Self { estimator }
    }

    /// Packs `candidates` into a context within `ctx.constraints.max_tokens`.
    ///
    /// Pure computation; never fails. An empty candidate list yields an
    /// empty (successful) context.
    pub fn run(&self, candidates: &[CandidateRecord], ctx: &RunContext) -> ToolResult {
        let timer = ctx.start_metrics("in_process");
        let budget = ctx.constraints.max_tokens;

        let mut text = String::new();
        let mut total_tokens = 0usize;
        let mut used_chunks = 0usize;
        let mut truncated = false;

        for (i, candidate) in candidates.iter().enumerate() {
            let block = render_block(i + 1, candidate);
            let block_tokens = self.estimator.estimate(&block);

            if total_tokens + block_tokens <= budget {
                text.push_str(&block);
                total_tokens += block_tokens;
                used_chunks += 1;
                continue;
            }

            if used_chunks == 0 {
                let (clipped, clipped_tokens) =
                    self.truncate_block(i + 1, candidate, budget);
                text.push_str(&clipped);
                total_tokens += clipped_tokens;
                used_chunks = 1;
                truncated = true;
            }
            break;
        }

        debug!(
            trace_id = %ctx.trace_id,
            used_chunks,
            total_tokens,
            truncated,
            "context packed"
        );
        ToolResult::ok(
            ToolData::Context(ContextData {
                text,
                used_chunks,
                total_tokens,
                truncated,
            }),
            timer.finish(),
        )
    }

    /// Shrinks a candidate's content until its rendered block fits `budget`.
    /// If the bare citation header already overflows, the rendered block
    /// itself is clipped so the emitted text never exceeds the budget.
    fn truncate_block(
        &self,
        number: usize,
        candidate: &CandidateRecord,
        budget: usize,
    ) -> (String, usize) {
        let mut content = candidate.content.clone();
        loop {
            let block = render_block_with(number, candidate, &content);
            let tokens = self.estimator.estimate(&block);
            if tokens <= budget {
                return (block, tokens);
            }
            if content.is_empty() {
                return self.clip_text(block, budget);
            }
            content.truncate(cut_point(&content));
        }
    }

    /// Clips raw text until its estimate fits `budget`.
    fn clip_text(&self, mut text: String, budget: usize) -> (String, usize) {
        loop {
            let tokens = self.estimator.estimate(&text);
            if tokens <= budget || text.is_empty() {
                return (text, tokens);
            }
            text.truncate(cut_point(&text));
        }
    }
}

impl Default for ContextBuilderTool {
    fn default() -> Self {
        Self::new(Box::new(CharEstimator::default()))
    }
}

/// Char-boundary truncation target that removes roughly an eighth of `text`.
fn cut_point(text: &str) -> usize {
    let cut = text.len().div_ceil(8);
    let mut target = text.len().saturating_sub(cut);
    while target > 0 && !text.is_char_boundary(target) {
        target -= 1;
    }
    target
}

fn render_block(number: usize, candidate: &CandidateRecord) -> String {
    render_block_with(number, candidate, &candidate.content)
}

fn render_block_with(number: usize, candidate: &CandidateRecord, content: &str) -> String {
    let mut header = format!("[{number}] {}", candidate.document_id);
    if let Some(page) = candidate.page_number {
        header.push_str(&format!(", page {page}"));
    }
    if let Some(section) = &candidate.section_title {
        header.push_str(&format!(", {section}"));
    }
    format!("{header}\n{content}\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Constraints;

    fn record(chunk_id: &str, content: &str) -> CandidateRecord {
        CandidateRecord {
            chunk_id: chunk_id.to_string(),
            document_id: "doc1".to_string(),
            content: content.to_string(),
            score: 0.5,
            page_number: Some(3),
            section_title: Some("Methods".to_string()),
        }
    }

    fn ctx_with_budget(max_tokens: usize) -> RunContext {
        RunContext {
            trace_id: "t".to_string(),
            query: "q".to_string(),
            constraints: Constraints {
                max_tokens,
                ..Constraints::default()
            },
        }
    }

    #[test]
    fn test_packs_within_budget() {
        let tool = ContextBuilderTool::default();
        let candidates = vec![record("c1", "alpha beta"), record("c2", "gamma delta")];

        let result = tool.run(&candidates, &ctx_with_budget(1000));
        assert!(result.success);
        let data = result.context().cloned().unwrap_or_default();
        assert_eq!(data.used_chunks, 2);
        assert!(!data.truncated);
        assert!(data.total_tokens <= 1000);
        assert!(data.text.contains("[1] doc1, page 3, Methods"));
        assert!(data.text.contains("[2] doc1"));
    }

    #[test]
    fn test_stops_at_budget_boundary() {
        let tool = ContextBuilderTool::default();
        let big = "x".repeat(200);
        let candidates = vec![record("c1", &big), record("c2", &big), record("c3", &big)];

        let result = tool.run(&candidates, &ctx_with_budget(70));
        let data = result.context().cloned().unwrap_or_default();
        assert_eq!(data.used_chunks, 1);
        assert!(!data.truncated);
        assert!(data.total_tokens <= 70);
        assert!(!data.text.contains("[2]"));
    }

    #[test]
    fn test_first_candidate_truncated_to_fit() {
        let tool = ContextBuilderTool::default();
        let huge = "y".repeat(4000);
        let candidates = vec![record("c1", &huge)];

        let result = tool.run(&candidates, &ctx_with_budget(50));
        assert!(result.success);
        let data = result.context().cloned().unwrap_or_default();
        assert_eq!(data.used_chunks, 1);
        assert!(data.truncated);
        assert!(data.total_tokens <= 50);
        assert!(data.text.starts_with("[1] doc1"));
    }

    #[test]
    fn test_header_over_budget_clips_emitted_text() {
        let tool = ContextBuilderTool::default();
        let candidate = CandidateRecord {
            chunk_id: "c1".to_string(),
            document_id: "a-very-long-document-identifier".to_string(),
            content: "z".repeat(100),
            score: 0.5,
            page_number: None,
            section_title: None,
        };

        let result = tool.run(&[candidate], &ctx_with_budget(1));
        assert!(result.success);
        let data = result.context().cloned().unwrap_or_default();
        assert_eq!(data.used_chunks, 1);
        assert!(data.truncated);
        assert!(data.total_tokens <= 1);
        // The reported count must describe the emitted text, not the budget.
        let est = CharEstimator::default();
        assert_eq!(est.estimate(&data.text), data.total_tokens);
    }

    #[test]
    fn test_empty_candidates_yield_empty_context() {
        let tool = ContextBuilderTool::default();
        let result = tool.run(&[], &ctx_with_budget(100));
        assert!(result.success);
        let data = result.context().cloned().unwrap_or_default();
        assert_eq!(data.used_chunks, 0);
        assert_eq!(data.total_tokens, 0);
        assert!(data.text.is_empty());
        assert!(!data.truncated);
    }

    #[test]
    fn test_char_estimator_rounds_up() {
        let est = CharEstimator::default();
        assert_eq!(est.estimate(""), 0);
        assert_eq!(est.estimate("abc"), 1);
        assert_eq!(est.estimate("abcd"), 1);
        assert_eq!(est.estimate("abcde"), 2);
    }
}
