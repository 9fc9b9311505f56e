//! Shared contracts used by every tool and the agent.
//!
//! These types are the boundary language of the system: retrieval tools
//! produce [`CandidateRecord`]s wrapped in [`ToolResult`] envelopes, the
//! agent threads them through a strategy, and the final trace is made of
//! [`AgentStep`]s inside an [`AgentResult`]. Everything here is created
//! fresh per agent invocation and discarded with the result; nothing is
//! persisted.

pub mod constraints;
pub mod intent;
pub mod record;
pub mod result;

pub use constraints::Constraints;
pub use intent::Intent;
pub use record::{CandidateRecord, ContextData, ToolData, ToolMetrics, ToolResult};
pub use result::{AgentMetrics, AgentResult, AgentStep, HealthReport, RunStatus};
