//! CLI command implementations.

use std::path::Path;
use std::sync::Arc;

use crate::agent::{AgentConfig, PaperSearchAgent, classify_intent, select_strategy};
use crate::backend::{HashEmbedder, MemoryIndex, StoredChunk};
use crate::cli::output::{
    OutputFormat, format_classification, format_eval, format_health, format_result,
};
use crate::cli::parser::{Cli, Commands};
use crate::core::Constraints;
use crate::error::AgentError;
use crate::eval::{LabeledQuery, evaluate};

/// Executes the parsed CLI command and returns its rendered output.
///
/// # Errors
///
/// Returns [`AgentError::Config`] for missing or unreadable input files and
/// [`AgentError::InvalidInput`] for invalid query parameters.
pub async fn execute(cli: &Cli) -> Result<String, AgentError> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Query {
            query,
            max_chunks,
            max_tokens,
            threshold,
            containers,
            documents,
            allow_web,
            trace,
        } => {
            let constraints = Constraints {
                max_chunks: *max_chunks,
                max_tokens: *max_tokens,
                similarity_threshold: *threshold,
                container_ids: some_ids(containers),
                document_ids: some_ids(documents),
                allow_web_search: *allow_web,
            };
            let agent = build_agent(cli).await?;
            let result = agent.execute(query, constraints).await?;
            format_result(&result, *trace, format)
        }
        Commands::Classify { query } => {
            let intent = classify_intent(query);
            let strategy = select_strategy(intent, &Constraints::default());
            format_classification(query, intent, &strategy.tools, strategy.web_fallback, format)
        }
        Commands::Eval { dataset } => {
            let agent = build_agent(cli).await?;
            let queries: Vec<LabeledQuery> = read_json(dataset)?;
            let report = evaluate(&agent, &queries).await?;
            format_eval(&report, format)
        }
        Commands::Health => {
            // Health works without a corpus; an empty index is fine.
            let agent = if cli.corpus.is_some() {
                build_agent(cli).await?
            } else {
                PaperSearchAgent::new(
                    AgentConfig::from_env()?,
                    Arc::new(HashEmbedder::default()),
                    Arc::new(MemoryIndex::new(Vec::new())),
                )
            };
            format_health(&agent.health(), format)
        }
    }
}

fn some_ids(ids: &[String]) -> Option<Vec<String>> {
    if ids.is_empty() {
        None
    } else {
        Some(ids.to_vec())
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, AgentError> {
    let raw = std::fs::read_to_string(path).map_err(|e| AgentError::Config {
        message: format!("cannot read {}: {e}", path.display()),
    })?;
    serde_json::from_str(&raw).map_err(|e| AgentError::Config {
        message: format!("cannot parse {}: {e}", path.display()),
    })
}

/// Builds an agent over the corpus file named on the command line.
async fn build_agent(cli: &Cli) -> Result<PaperSearchAgent, AgentError> {
    let chunks: Vec<StoredChunk> = match &cli.corpus {
        Some(path) => read_json(path)?,
        None => {
            return Err(AgentError::Config {
                message: "no corpus file; pass --corpus or set PAPERSEEK_CORPUS".to_string(),
            });
        }
    };
    let embedder = Arc::new(HashEmbedder::default());
    let index = MemoryIndex::build(chunks, embedder.as_ref()).await?;
    let config = AgentConfig::from_env()?;
    Ok(PaperSearchAgent::new(config, embedder, Arc::new(index)))
}
