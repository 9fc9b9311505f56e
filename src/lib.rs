//! Paperseek: an agent-orchestrated retrieval core for paper corpora.
//!
//! One query flows through a fixed pipeline: a deterministic classifier
//! maps it to an intent, a strategy table maps the intent to an ordered
//! tool list, and the agent executes those tools sequentially over
//! pluggable backends, ending in a token-budgeted, citation-annotated
//! context. Tool failures are values, not panics: every step is recorded
//! in the result trace and a degraded run still returns a well-formed
//! [`AgentResult`](crate::core::AgentResult).
//!
//! # Layers
//!
//! - [`core`] - shared contracts: candidate records, tool result
//!   envelopes, constraints, the run trace.
//! - [`backend`] - trait seams for embeddings, search, rerank, and web
//!   search, plus a deterministic in-memory implementation.
//! - [`tools`] - the atomic retrieval and processing tools.
//! - [`agent`] - intent classification, strategy selection, and the
//!   orchestrator.
//! - [`eval`] - offline retrieval-quality scoring over labeled queries.
//! - [`cli`] - the command-line surface.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use paperseek::agent::{AgentConfig, PaperSearchAgent};
//! use paperseek::backend::{HashEmbedder, MemoryIndex, StoredChunk};
//! use paperseek::core::Constraints;
//!
//! # async fn run() -> Result<(), paperseek::error::AgentError> {
//! let embedder = Arc::new(HashEmbedder::default());
//! let chunks: Vec<StoredChunk> = Vec::new();
//! let index = MemoryIndex::build(chunks, embedder.as_ref()).await?;
//!
//! let agent = PaperSearchAgent::new(AgentConfig::default(), embedder, Arc::new(index));
//! let result = agent
//!     .execute("what is dropout regularization?", Constraints::default())
//!     .await?;
//! println!("{}", result.answer_context);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod backend;
pub mod cli;
pub mod core;
pub mod error;
pub mod eval;
pub mod tools;

pub use crate::agent::{AgentConfig, PaperSearchAgent};
pub use crate::core::{
    AgentResult, CandidateRecord, Constraints, Intent, RunStatus, ToolResult,
};
pub use crate::error::AgentError;

/// Crate version, exposed for health reporting.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
