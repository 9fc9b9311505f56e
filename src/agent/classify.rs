//! Rule-based intent classification and query transforms.
//!
//! The classifier is deterministic on purpose: the same query always maps
//! to the same intent, which makes strategies reproducible and the eval
//! harness meaningful. Rules are checked in precedence order; anything
//! that matches no rule falls through to [`Intent::Default`].

use unicode_segmentation::UnicodeSegmentation;

use crate::core::Intent;

/// Tokens excluded from keyword extraction and fulltext queries.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "do", "does", "for", "from", "how", "in",
    "is", "it", "of", "on", "or", "that", "the", "their", "them", "these", "this", "to", "was",
    "were", "what", "when", "where", "which", "who", "why", "with",
];

/// Phrases that mark a comparison query.
const COMPARISON_MARKERS: &[&str] = &[
    "compare",
    "comparison",
    "versus",
    " vs ",
    " vs. ",
    "difference between",
    "differences between",
    "contrast",
    "better than",
    "tradeoff",
    "trade-off",
];

/// Phrases that mark an exploratory query.
const EXPLORATORY_MARKERS: &[&str] = &[
    "overview",
    "survey",
    "state of the art",
    "recent work",
    "recent advances",
    "literature",
    "landscape",
    "tell me about",
    "summarize",
    "trends",
];

/// Leading words that mark a factual question.
const QUESTION_WORDS: &[&str] = &[
    "what", "who", "when", "where", "which", "why", "how", "is", "are", "does", "do", "did",
    "can",
];

/// Maximum keywords extracted from a query.
const MAX_KEYWORDS: usize = 8;

/// Classifies a query into one of the closed intents.
///
/// Precedence: comparison markers, then exploratory markers, then quoted or
/// very short term-list queries (keyword search), then question forms
/// (factual), then [`Intent::Default`].
#[must_use]
pub fn classify_intent(query: &str) -> Intent {
    let trimmed = query.trim();
    let lower = trimmed.to_lowercase();

    if COMPARISON_MARKERS.iter().any(|m| lower.contains(m)) {
        return Intent::Comparison;
    }
    if EXPLORATORY_MARKERS.iter().any(|m| lower.contains(m)) {
        return Intent::Exploratory;
    }
    if trimmed.contains('"') || word_count(&lower) <= 3 && !is_question(&lower) {
        return Intent::KeywordSearch;
    }
    if is_question(&lower) {
        return Intent::FactualQa;
    }
    Intent::Default
}

/// Extracts search keywords from a query.
///
/// Double-quoted phrases are kept whole; the remainder is tokenized,
/// lowercased, stopword-filtered, and deduplicated in first-seen order.
/// Capped at eight keywords.
#[must_use]
pub fn extract_keywords(query: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    let mut push = |kw: String| {
        if !kw.is_empty() && !keywords.contains(&kw) && keywords.len() < MAX_KEYWORDS {
            keywords.push(kw);
        }
    };

    let mut remainder = String::new();
    let mut in_phrase = false;
    let mut phrase = String::new();
    for ch in query.chars() {
        if ch == '"' {
            if in_phrase {
                push(phrase.trim().to_lowercase());
                phrase.clear();
            }
            in_phrase = !in_phrase;
        } else if in_phrase {
            phrase.push(ch);
        } else {
            remainder.push(ch);
        }
    }
    // Unbalanced quote: treat the tail as plain text.
    if in_phrase {
        remainder.push_str(&phrase);
    }

    for word in remainder.unicode_words() {
        let lower = word.to_lowercase();
        if !STOPWORDS.contains(&lower.as_str()) {
            push(lower);
        }
    }
    keywords
}

/// Transforms a natural-language query into the fulltext engine's form:
/// stopwords and punctuation stripped, terms space-joined. Falls back to
/// the trimmed query when stripping removes everything.
#[must_use]
pub fn to_fulltext_query(query: &str) -> String {
    let terms: Vec<String> = query
        .unicode_words()
        .map(str::to_lowercase)
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .collect();
    if terms.is_empty() {
        query.trim().to_string()
    } else {
        terms.join(" ")
    }
}

fn word_count(lower: &str) -> usize {
    lower.unicode_words().count()
}

fn is_question(lower: &str) -> bool {
    lower.ends_with('?')
        || lower
            .unicode_words()
            .next()
            .is_some_and(|first| QUESTION_WORDS.contains(&first))
}
