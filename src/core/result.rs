//! Execution trace and final result types for one agent run.

use serde::{Deserialize, Serialize};

use super::intent::Intent;
use super::record::{CandidateRecord, ToolResult};
use crate::tools::ToolName;

/// One executed tool call within an agent run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStep {
    /// 1-based position within the run, monotonically increasing.
    pub step_number: usize,
    /// The tool that was executed.
    pub tool_name: ToolName,
    /// Why this tool was chosen at this point in the strategy.
    pub reasoning: String,
    /// Full tool output, recorded whether the call succeeded or not.
    pub tool_output: ToolResult,
    /// Mirrors `tool_output.success`.
    pub success: bool,
}

/// Aggregate metrics for one agent run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentMetrics {
    /// Sum of per-step latencies.
    pub total_latency_ms: f64,
    /// Candidates produced across all retrieval steps, before dedup.
    pub candidates_found: usize,
    /// Candidates that made it into the final context.
    pub candidates_used: usize,
    /// `1 - post/pre` across the deduplication step; `0.0` when dedup
    /// never ran or saw no input.
    pub dedup_rate: f64,
}

/// Terminal state of an agent run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// At least one candidate reached the context.
    CompletedSuccess,
    /// Zero candidates but no hard failure.
    CompletedEmpty,
    /// Every retrieval-stage tool in the strategy failed.
    Failed,
}

impl RunStatus {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CompletedSuccess => "completed_success",
            Self::CompletedEmpty => "completed_empty",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final output of one agent invocation.
///
/// Always well-formed, even on total failure: the caller never receives a
/// run failure as a Rust error, only as `status` / `errors` here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    /// The packed context ready for answer generation; empty when the run
    /// produced no candidates.
    pub answer_context: String,
    /// Classified intent that drove strategy selection.
    pub intent: Intent,
    /// Names of the tool steps actually executed, in order. Always the
    /// same length as `steps`.
    pub strategy_used: Vec<ToolName>,
    /// Candidates actually included in the context, in citation order.
    pub references: Vec<CandidateRecord>,
    /// Full trace of executed tool calls.
    pub steps: Vec<AgentStep>,
    /// Aggregate run metrics.
    pub metrics: AgentMetrics,
    /// Errors collected from failed steps.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    /// Terminal state of the run.
    pub status: RunStatus,
    /// `true` unless the run terminated as [`RunStatus::Failed`].
    pub success: bool,
    /// Correlates all step metrics of this invocation.
    pub trace_id: String,
}

/// Operational readiness report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// Tools the agent can dispatch.
    pub tools: Vec<ToolName>,
    /// Crate version.
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_status_display() {
        assert_eq!(RunStatus::CompletedSuccess.to_string(), "completed_success");
        assert_eq!(RunStatus::CompletedEmpty.to_string(), "completed_empty");
        assert_eq!(RunStatus::Failed.to_string(), "failed");
    }

    #[test]
    fn test_run_status_serialization() {
        let json = serde_json::to_string(&RunStatus::Failed).unwrap_or_default();
        assert_eq!(json, "\"failed\"");
    }
}
