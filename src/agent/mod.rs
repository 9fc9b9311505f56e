//! Agent orchestration: intent classification, strategy selection, and
//! sequential tool execution.
//!
//! The control flow is deliberately boring: a deterministic classifier maps
//! the query to an intent, a fixed table maps the intent to an ordered tool
//! plan, and [`PaperSearchAgent`] executes the plan step by step, recording
//! a full trace. No step is chosen by a model at runtime.

pub mod classify;
pub mod config;
pub mod orchestrator;
pub mod strategy;

pub use classify::{classify_intent, extract_keywords, to_fulltext_query};
pub use config::{AgentConfig, AgentConfigBuilder};
pub use orchestrator::PaperSearchAgent;
pub use strategy::{Strategy, select_strategy};
