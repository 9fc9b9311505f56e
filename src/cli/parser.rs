//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::constraints::{
    DEFAULT_MAX_CHUNKS, DEFAULT_MAX_TOKENS, DEFAULT_SIMILARITY_THRESHOLD,
};

/// Paperseek: agent-orchestrated retrieval over a paper corpus.
///
/// Classifies a query, picks a retrieval strategy, runs the tool pipeline,
/// and prints a token-budgeted, citation-annotated context.
#[derive(Parser, Debug)]
#[command(name = "paperseek")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a JSON corpus file (array of chunks).
    #[arg(short, long, env = "PAPERSEEK_CORPUS", global = true)]
    pub corpus: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one retrieval query through the agent.
    #[command(after_help = r#"Examples:
  paperseek -c corpus.json query "what is dropout regularization?"
  paperseek -c corpus.json query "compare BERT and GPT" --max-chunks 5
  paperseek -c corpus.json query "scaling laws" --document paper-a --document paper-b
  paperseek -c corpus.json query "survey of RLHF" --allow-web --trace
  paperseek -c corpus.json --format json query "batch norm" | jq '.references[].document_id'
"#)]
    Query {
        /// The natural-language query.
        query: String,

        /// Maximum candidates carried through the pipeline.
        #[arg(long, default_value_t = DEFAULT_MAX_CHUNKS)]
        max_chunks: usize,

        /// Token budget for the packed context.
        #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
        max_tokens: usize,

        /// Minimum similarity threshold (0.0-1.0).
        #[arg(short, long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD)]
        threshold: f32,

        /// Restrict retrieval to these containers (repeatable).
        #[arg(long = "container")]
        containers: Vec<String>,

        /// Restrict retrieval to these documents (repeatable).
        #[arg(long = "document")]
        documents: Vec<String>,

        /// Allow the web-search fallback for exploratory queries.
        #[arg(long)]
        allow_web: bool,

        /// Include the full step trace in the output.
        #[arg(long)]
        trace: bool,
    },

    /// Show the intent and strategy a query would get, without running it.
    #[command(after_help = r#"Examples:
  paperseek classify "what is dropout?"
  paperseek classify "transformers vs RNNs"
"#)]
    Classify {
        /// The query to classify.
        query: String,
    },

    /// Score the agent against a labeled dataset.
    #[command(after_help = r#"Examples:
  paperseek -c corpus.json eval dataset.json
  paperseek -c corpus.json --format json eval dataset.json | jq '.summary'
"#)]
    Eval {
        /// Path to a JSON dataset (array of labeled queries).
        dataset: PathBuf,
    },

    /// Report the tools the agent can dispatch.
    Health,
}
