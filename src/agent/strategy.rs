//! Intent-to-strategy lookup table.

use crate::core::{Constraints, Intent};
use crate::tools::ToolName;

/// An ordered tool plan for a single invocation.
///
/// Strategies come from a fixed table, never from model output, so every
/// tool in `tools` is guaranteed to exist. The web fallback is not part of
/// the ordered plan: it fires conditionally after the planned retrieval
/// steps, and only when `web_fallback` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strategy {
    /// Tools to execute in order; always ends with the context builder.
    pub tools: Vec<ToolName>,
    /// Whether a low-yield pool may trigger web search.
    pub web_fallback: bool,
}

/// Maps an intent to its strategy.
///
/// The fallback flag is the conjunction of intent (only exploratory queries
/// fall back) and capability (`constraints.allow_web_search`); the pool-size
/// condition is checked at execution time.
#[must_use]
pub fn select_strategy(intent: Intent, constraints: &Constraints) -> Strategy {
    match intent {
        Intent::FactualQa | Intent::Default => Strategy {
            tools: vec![
                ToolName::VectorSearch,
                ToolName::Deduplicate,
                ToolName::ContextBuilder,
            ],
            web_fallback: false,
        },
        Intent::KeywordSearch => Strategy {
            tools: vec![
                ToolName::KeywordSearch,
                ToolName::FulltextSearch,
                ToolName::Deduplicate,
                ToolName::ContextBuilder,
            ],
            web_fallback: false,
        },
        Intent::Comparison => Strategy {
            tools: vec![
                ToolName::VectorSearch,
                ToolName::FulltextSearch,
                ToolName::Rerank,
                ToolName::Deduplicate,
                ToolName::ContextBuilder,
            ],
            web_fallback: false,
        },
        Intent::Exploratory => Strategy {
            tools: vec![
                ToolName::VectorSearch,
                ToolName::KeywordSearch,
                ToolName::Rerank,
                ToolName::Deduplicate,
                ToolName::ContextBuilder,
            ],
            web_fallback: constraints.allow_web_search,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Intent::FactualQa, 3; "factual")]
    #[test_case(Intent::KeywordSearch, 4; "keyword")]
    #[test_case(Intent::Comparison, 5; "comparison")]
    #[test_case(Intent::Exploratory, 5; "exploratory")]
    #[test_case(Intent::Default, 3; "default")]
    fn test_strategy_shape(intent: Intent, len: usize) {
        let strategy = select_strategy(intent, &Constraints::default());
        assert_eq!(strategy.tools.len(), len);
        assert_eq!(
            strategy.tools.last().copied(),
            Some(ToolName::ContextBuilder)
        );
        assert!(
            strategy.tools.first().is_some_and(ToolName::is_retrieval),
            "strategies start with a retrieval tool"
        );
    }

    #[test]
    fn test_web_fallback_requires_capability() {
        let denied = select_strategy(Intent::Exploratory, &Constraints::default());
        assert!(!denied.web_fallback);

        let allowed = select_strategy(
            Intent::Exploratory,
            &Constraints {
                allow_web_search: true,
                ..Constraints::default()
            },
        );
        assert!(allowed.web_fallback);
    }

    #[test]
    fn test_only_exploratory_falls_back() {
        let constraints = Constraints {
            allow_web_search: true,
            ..Constraints::default()
        };
        for intent in [
            Intent::FactualQa,
            Intent::KeywordSearch,
            Intent::Comparison,
            Intent::Default,
        ] {
            assert!(!select_strategy(intent, &constraints).web_fallback);
        }
    }
}
