//! Output formatting for CLI results.

#![allow(clippy::format_push_string)]

use crate::core::{AgentResult, HealthReport, Intent};
use crate::error::AgentError;
use crate::eval::EvalReport;
use crate::tools::ToolName;

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl OutputFormat {
    /// Parses a format string; anything other than `json` is text.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, AgentError> {
    serde_json::to_string_pretty(value).map_err(|e| AgentError::Config {
        message: format!("failed to serialize output: {e}"),
    })
}

/// Formats one agent run result.
///
/// # Errors
///
/// Returns [`AgentError::Config`] when JSON serialization fails.
pub fn format_result(
    result: &AgentResult,
    trace: bool,
    format: OutputFormat,
) -> Result<String, AgentError> {
    if format == OutputFormat::Json {
        return to_json(result);
    }

    let mut out = String::new();
    out.push_str(&format!(
        "status: {}  intent: {}  trace: {}\n",
        result.status, result.intent, result.trace_id
    ));
    let strategy: Vec<&str> = result.strategy_used.iter().map(ToolName::as_str).collect();
    out.push_str(&format!("strategy: {}\n", strategy.join(" -> ")));
    out.push_str(&format!(
        "candidates: {} found, {} used, dedup rate {:.2}, {:.1}ms total\n",
        result.metrics.candidates_found,
        result.metrics.candidates_used,
        result.metrics.dedup_rate,
        result.metrics.total_latency_ms
    ));

    if !result.errors.is_empty() {
        out.push_str("errors:\n");
        for error in &result.errors {
            out.push_str(&format!("  - {error}\n"));
        }
    }

    if trace {
        out.push_str("steps:\n");
        for step in &result.steps {
            out.push_str(&format!(
                "  {}. {} [{}] {} items, {:.1}ms ({})\n",
                step.step_number,
                step.tool_name,
                if step.success { "ok" } else { "failed" },
                step.tool_output.metrics.items_returned,
                step.tool_output.metrics.latency_ms,
                step.reasoning
            ));
        }
    }

    if result.references.is_empty() {
        out.push_str("no references\n");
    } else {
        out.push_str("references:\n");
        for (i, reference) in result.references.iter().enumerate() {
            out.push_str(&format!(
                "  [{}] {} / {} (score {:.3})\n",
                i + 1,
                reference.document_id,
                reference.chunk_id,
                reference.score
            ));
        }
        out.push_str("\n");
        out.push_str(&result.answer_context);
    }
    Ok(out)
}

/// Formats a dry-run classification.
///
/// # Errors
///
/// Returns [`AgentError::Config`] when JSON serialization fails.
pub fn format_classification(
    query: &str,
    intent: Intent,
    tools: &[ToolName],
    web_fallback: bool,
    format: OutputFormat,
) -> Result<String, AgentError> {
    if format == OutputFormat::Json {
        return to_json(&serde_json::json!({
            "query": query,
            "intent": intent,
            "strategy": tools,
            "web_fallback": web_fallback,
        }));
    }
    let names: Vec<&str> = tools.iter().map(ToolName::as_str).collect();
    Ok(format!(
        "intent: {intent}\nstrategy: {}\nweb fallback: {web_fallback}\n",
        names.join(" -> ")
    ))
}

/// Formats an evaluation report.
///
/// # Errors
///
/// Returns [`AgentError::Config`] when JSON serialization fails.
pub fn format_eval(report: &EvalReport, format: OutputFormat) -> Result<String, AgentError> {
    if format == OutputFormat::Json {
        return to_json(report);
    }

    let s = &report.summary;
    let mut out = String::new();
    out.push_str(&format!(
        "{} queries  recall@k {:.3}  precision@k {:.3}  mrr {:.3}  ndcg {:.3}\n",
        s.query_count, s.avg_recall_at_k, s.avg_precision_at_k, s.mean_rr, s.mean_ndcg
    ));
    out.push_str(&format!(
        "latency p50 {:.1}ms  p95 {:.1}ms\n",
        s.latency_ms_p50, s.latency_ms_p95
    ));
    for q in &report.queries {
        out.push_str(&format!(
            "  {}: recall {:.2} precision {:.2} rr {:.2} ndcg {:.2} ({})\n",
            q.id,
            q.metrics.recall_at_k,
            q.metrics.precision_at_k,
            q.metrics.rr,
            q.metrics.ndcg,
            q.status
        ));
    }
    Ok(out)
}

/// Formats a health report.
///
/// # Errors
///
/// Returns [`AgentError::Config`] when JSON serialization fails.
pub fn format_health(report: &HealthReport, format: OutputFormat) -> Result<String, AgentError> {
    if format == OutputFormat::Json {
        return to_json(report);
    }
    let names: Vec<&str> = report.tools.iter().map(ToolName::as_str).collect();
    Ok(format!(
        "paperseek {}\ntools: {}\n",
        report.version,
        names.join(", ")
    ))
}
