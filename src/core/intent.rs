//! Query intent classification result.
//!
//! The intent drives strategy selection: each variant maps to one fixed,
//! ordered tool chain. Ambiguous queries resolve to [`Intent::Default`].

use serde::{Deserialize, Serialize};

/// Classified intent of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// A direct factual question ("what is X", "when did Y happen").
    FactualQa,
    /// An explicit term lookup (quoted phrases, "find", short noun queries).
    KeywordSearch,
    /// A comparison between two or more named things.
    Comparison,
    /// An open-ended survey question ("overview of", "tell me about").
    Exploratory,
    /// Fallback when no rule fires or rules tie.
    Default,
}

impl Intent {
    /// Parses an intent string (case-insensitive). Unknown values resolve
    /// to [`Intent::Default`], mirroring the classifier's tie policy.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "factual_qa" => Self::FactualQa,
            "keyword_search" => Self::KeywordSearch,
            "comparison" => Self::Comparison,
            "exploratory" => Self::Exploratory,
            _ => Self::Default,
        }
    }

    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FactualQa => "factual_qa",
            Self::KeywordSearch => "keyword_search",
            Self::Comparison => "comparison",
            Self::Exploratory => "exploratory",
            Self::Default => "default",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_parse() {
        assert_eq!(Intent::parse("factual_qa"), Intent::FactualQa);
        assert_eq!(Intent::parse("KEYWORD_SEARCH"), Intent::KeywordSearch);
        assert_eq!(Intent::parse("Comparison"), Intent::Comparison);
        assert_eq!(Intent::parse("exploratory"), Intent::Exploratory);
        assert_eq!(Intent::parse("unknown"), Intent::Default);
    }

    #[test]
    fn test_intent_display() {
        assert_eq!(format!("{}", Intent::FactualQa), "factual_qa");
        assert_eq!(format!("{}", Intent::Default), "default");
    }

    #[test]
    fn test_intent_serialization() {
        let json = serde_json::to_string(&Intent::KeywordSearch).unwrap_or_default();
        assert_eq!(json, "\"keyword_search\"");
    }
}
