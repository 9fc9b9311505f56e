//! The retrieval agent: strategy execution over pluggable backends.

use std::sync::Arc;

use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::classify::{classify_intent, extract_keywords, to_fulltext_query};
use super::config::AgentConfig;
use super::strategy::{Strategy, select_strategy};
use crate::backend::{EmbeddingProvider, RerankBackend, SearchBackend, WebSearchBackend};
use crate::core::{
    AgentMetrics, AgentResult, AgentStep, CandidateRecord, Constraints, HealthReport, Intent,
    RunStatus, ToolResult,
};
use crate::error::AgentError;
use crate::tools::{
    CharEstimator, ContextBuilderTool, DeduplicateTool, FulltextSearchTool, KeywordSearchTool,
    RankedList, RerankTool, RunContext, ToolName, VectorSearchTool, WebSearchTool, fuse,
};

/// Orchestrates one retrieval strategy per query.
///
/// The agent owns no state between invocations; everything per-run lives in
/// a [`RunContext`] and local variables, so a single agent can serve
/// concurrent callers behind an `Arc`.
///
/// Failure policy: tool failures degrade the run (the last good candidate
/// set carries forward) and only the total loss of every retrieval step
/// terminates it. `execute` returns `Err` exclusively for invalid input;
/// run-level failure is expressed in the returned [`AgentResult`].
pub struct PaperSearchAgent {
    config: AgentConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    vector: VectorSearchTool,
    keyword: KeywordSearchTool,
    fulltext: FulltextSearchTool,
    dedup: DeduplicateTool,
    context: ContextBuilderTool,
    rerank: Option<RerankTool>,
    web: Option<WebSearchTool>,
}

impl PaperSearchAgent {
    /// Creates an agent over the required backends. Rerank and web search
    /// are optional capabilities added with [`Self::with_reranker`] and
    /// [`Self::with_web_search`].
    #[must_use]
    pub fn new(
        config: AgentConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        search: Arc<dyn SearchBackend>,
    ) -> Self {
        let context =
            ContextBuilderTool::new(Box::new(CharEstimator::new(config.chars_per_token)));
        Self {
            config,
            embedder,
            vector: VectorSearchTool::new(Arc::clone(&search)),
            keyword: KeywordSearchTool::new(Arc::clone(&search)),
            fulltext: FulltextSearchTool::new(search),
            dedup: DeduplicateTool,
            context,
            rerank: None,
            web: None,
        }
    }

    /// Adds a rerank backend; without one, rerank steps fail gracefully.
    #[must_use]
    pub fn with_reranker(mut self, backend: Arc<dyn RerankBackend>) -> Self {
        self.rerank = Some(RerankTool::new(backend, self.config.rerank_model.clone()));
        self
    }

    /// Adds a web-search backend for the exploratory fallback branch.
    #[must_use]
    pub fn with_web_search(mut self, backend: Arc<dyn WebSearchBackend>) -> Self {
        self.web = Some(WebSearchTool::new(backend));
        self
    }

    /// Reports the tools this agent can currently dispatch.
    #[must_use]
    pub fn health(&self) -> HealthReport {
        let tools = ToolName::ALL
            .into_iter()
            .filter(|tool| match tool {
                ToolName::Rerank => self.rerank.is_some(),
                ToolName::WebSearch => self.web.is_some(),
                _ => true,
            })
            .collect();
        HealthReport {
            tools,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Runs the full classify → plan → execute → pack pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidInput`] for a blank query or invalid
    /// constraints. Every other failure mode is reported inside the
    /// returned [`AgentResult`].
    pub async fn execute(
        &self,
        query: &str,
        constraints: Constraints,
    ) -> Result<AgentResult, AgentError> {
        if query.trim().is_empty() {
            return Err(AgentError::invalid_input("query must not be blank"));
        }
        constraints.validate()?;

        let ctx = RunContext {
            trace_id: Uuid::new_v4().to_string(),
            query: query.trim().to_string(),
            constraints,
        };
        let intent = classify_intent(&ctx.query);
        let strategy = select_strategy(intent, &ctx.constraints);
        info!(
            trace_id = %ctx.trace_id,
            intent = %intent,
            steps = strategy.tools.len(),
            web_fallback = strategy.web_fallback,
            "strategy selected"
        );

        let mut run = RunState::new(intent, ctx.trace_id.clone());
        self.execute_strategy(&strategy, &ctx, &mut run).await;
        Ok(run.finish())
    }

    async fn execute_strategy(&self, strategy: &Strategy, ctx: &RunContext, run: &mut RunState) {
        for &tool in &strategy.tools {
            if !tool.is_retrieval() && !run.pooled {
                // All planned retrieval has run; resolve the fallback and
                // fuse before the first processing step.
                if strategy.web_fallback {
                    self.maybe_web_fallback(ctx, run).await;
                }
                run.fuse_pool(self.config.rrf_k);
                if run.retrieval_attempts > 0 && run.retrieval_successes == 0 {
                    warn!(trace_id = %ctx.trace_id, "every retrieval step failed");
                    run.failed = true;
                    return;
                }
            }

            let result = self.dispatch(tool, ctx, run).await;
            run.record(tool, reasoning(tool, run.intent), result);
        }
    }

    async fn dispatch(&self, tool: ToolName, ctx: &RunContext, run: &mut RunState) -> ToolResult {
        match tool {
            ToolName::VectorSearch => {
                self.timed(tool, ctx, async {
                    match self.embedder.embed(&ctx.query).await {
                        Ok(embedding) => self.vector.run(&embedding, ctx).await,
                        Err(e) => ToolResult::failed(
                            e.to_string(),
                            ctx.start_metrics("embedding").finish(),
                        ),
                    }
                })
                .await
            }
            ToolName::KeywordSearch => {
                let keywords = extract_keywords(&ctx.query);
                self.timed(tool, ctx, self.keyword.run(&keywords, ctx)).await
            }
            ToolName::FulltextSearch => {
                let fulltext_query = to_fulltext_query(&ctx.query);
                self.timed(tool, ctx, self.fulltext.run(&fulltext_query, ctx))
                    .await
            }
            ToolName::Rerank => match &self.rerank {
                Some(rerank) => {
                    let result = self.timed(tool, ctx, rerank.run(&run.pool, ctx)).await;
                    if result.success {
                        run.pool = result.candidates().to_vec();
                    }
                    result
                }
                None => ToolResult::failed(
                    AgentError::ToolExecution {
                        name: tool.to_string(),
                        message: "no rerank backend configured".to_string(),
                    }
                    .to_string(),
                    ctx.start_metrics("none").finish(),
                ),
            },
            ToolName::Deduplicate => {
                run.dedup_input = run.pool.len();
                let result = self.dedup.run(&run.pool, ctx);
                if result.success {
                    run.pool = result.candidates().to_vec();
                    run.dedup_output = Some(run.pool.len());
                }
                result
            }
            ToolName::WebSearch => match &self.web {
                Some(web) => self.timed(tool, ctx, web.run(ctx)).await,
                None => ToolResult::failed(
                    "no web-search backend configured",
                    ctx.start_metrics("none").finish(),
                ),
            },
            ToolName::ContextBuilder => {
                let result = self.context.run(&run.pool, ctx);
                if let Some(data) = result.context() {
                    run.answer_context = data.text.clone();
                    run.used_chunks = data.used_chunks;
                    run.references = run.pool[..data.used_chunks.min(run.pool.len())].to_vec();
                }
                result
            }
        }
    }

    /// Fires the web-search fallback when the pooled yield is too low.
    async fn maybe_web_fallback(&self, ctx: &RunContext, run: &mut RunState) {
        let pooled: usize = run.pending.iter().map(|list| list.candidates.len()).sum();
        if pooled >= self.config.min_candidates {
            return;
        }
        let Some(web) = &self.web else {
            debug!(trace_id = %ctx.trace_id, "fallback skipped, no web backend");
            return;
        };
        debug!(trace_id = %ctx.trace_id, pooled, "pool below threshold, trying web search");
        let result = self.timed(ToolName::WebSearch, ctx, web.run(ctx)).await;
        run.record(
            ToolName::WebSearch,
            reasoning(ToolName::WebSearch, run.intent),
            result,
        );
    }

    /// Applies the per-tool timeout to an async tool call.
    async fn timed(
        &self,
        tool: ToolName,
        ctx: &RunContext,
        fut: impl Future<Output = ToolResult>,
    ) -> ToolResult {
        match timeout(self.config.tool_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(trace_id = %ctx.trace_id, tool = %tool, "tool call timed out");
                let elapsed_ms = u64::try_from(self.config.tool_timeout.as_millis())
                    .unwrap_or(u64::MAX);
                ToolResult::failed(
                    AgentError::Timeout {
                        provider: tool.to_string(),
                        elapsed_ms,
                    }
                    .to_string(),
                    ctx.start_metrics("timeout").finish(),
                )
            }
        }
    }
}

/// Mutable state threaded through one strategy execution.
struct RunState {
    intent: Intent,
    trace_id: String,
    /// Retrieval outputs awaiting rank fusion.
    pending: Vec<RankedList>,
    /// Working candidate set once fused.
    pool: Vec<CandidateRecord>,
    pooled: bool,
    retrieval_attempts: usize,
    retrieval_successes: usize,
    candidates_found: usize,
    dedup_input: usize,
    dedup_output: Option<usize>,
    answer_context: String,
    used_chunks: usize,
    references: Vec<CandidateRecord>,
    steps: Vec<AgentStep>,
    strategy_used: Vec<ToolName>,
    errors: Vec<String>,
    failed: bool,
}

impl RunState {
    fn new(intent: Intent, trace_id: String) -> Self {
        Self {
            intent,
            trace_id,
            pending: Vec::new(),
            pool: Vec::new(),
            pooled: false,
            retrieval_attempts: 0,
            retrieval_successes: 0,
            candidates_found: 0,
            dedup_input: 0,
            dedup_output: None,
            answer_context: String::new(),
            used_chunks: 0,
            references: Vec::new(),
            steps: Vec::new(),
            strategy_used: Vec::new(),
            errors: Vec::new(),
            failed: false,
        }
    }

    /// Records an executed step, keeping `steps` and `strategy_used` in
    /// lockstep and folding retrieval output into the pending lists.
    fn record(&mut self, tool: ToolName, reasoning: String, result: ToolResult) {
        if tool.is_retrieval() {
            self.retrieval_attempts += 1;
            if result.success {
                self.retrieval_successes += 1;
                self.candidates_found += result.candidates().len();
                self.pending.push(RankedList {
                    source: tool,
                    candidates: result.candidates().to_vec(),
                });
            }
        }
        self.errors.extend(result.errors.iter().cloned());
        let success = result.success;
        self.strategy_used.push(tool);
        self.steps.push(AgentStep {
            step_number: self.steps.len() + 1,
            tool_name: tool,
            reasoning,
            tool_output: result,
            success,
        });
    }

    /// Fuses pending retrieval lists into the working pool, once.
    fn fuse_pool(&mut self, rrf_k: f32) {
        self.pool = fuse(&self.pending, rrf_k);
        self.pending.clear();
        self.pooled = true;
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(self) -> AgentResult {
        let total_latency_ms = self
            .steps
            .iter()
            .map(|s| s.tool_output.metrics.latency_ms)
            .sum();
        let dedup_rate = match self.dedup_output {
            Some(output) if self.dedup_input > 0 => {
                1.0 - output as f64 / self.dedup_input as f64
            }
            _ => 0.0,
        };
        let status = if self.failed {
            RunStatus::Failed
        } else if self.used_chunks > 0 {
            RunStatus::CompletedSuccess
        } else {
            RunStatus::CompletedEmpty
        };
        AgentResult {
            answer_context: self.answer_context,
            intent: self.intent,
            strategy_used: self.strategy_used,
            references: self.references,
            steps: self.steps,
            metrics: AgentMetrics {
                total_latency_ms,
                candidates_found: self.candidates_found,
                candidates_used: self.used_chunks,
                dedup_rate,
            },
            errors: self.errors,
            status,
            success: status != RunStatus::Failed,
            trace_id: self.trace_id,
        }
    }
}

fn reasoning(tool: ToolName, intent: Intent) -> String {
    match tool {
        ToolName::VectorSearch => format!("semantic similarity retrieval for {intent} query"),
        ToolName::KeywordSearch => "exact matching of extracted keywords".to_string(),
        ToolName::FulltextSearch => "engine-ranked full-text retrieval".to_string(),
        ToolName::Rerank => "cross-query re-scoring of the fused pool".to_string(),
        ToolName::Deduplicate => "collapse exact and near-duplicate candidates".to_string(),
        ToolName::WebSearch => "local pool below threshold, widening to web search".to_string(),
        ToolName::ContextBuilder => "pack ranked candidates into a cited context".to_string(),
    }
}
