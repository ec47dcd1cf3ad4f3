//! Pattern scorer - combines several similarity signals into one score
//!
//! Every signal lives in 0.0-1.0 and the weighted sum is normalized back into
//! that range. The weights are empirical; changing them changes which intent
//! wins ties and where the acceptance threshold bites.

use regex::Regex;
use serde::Serialize;

use crate::error::{ChatbotError, Result};
use crate::similarity::similarity;
use crate::types::Intent;

/// Best similarity a query word needs against a pattern word to count as matched
pub const WORD_MATCH_THRESHOLD: f64 = 0.6;
/// Word-order bonus per matched pair involving a domain keyword
pub const KEYWORD_BONUS: f64 = 0.2;

pub const EXACT_MATCH_WEIGHT: f64 = 1.0;
pub const WORD_SIMILARITY_WEIGHT: f64 = 0.7;
pub const WORD_ORDER_WEIGHT: f64 = 0.6;
pub const COVERAGE_WEIGHT: f64 = 0.9;
pub const WEIGHT_NORMALIZER: f64 = 3.2;

/// Lower-case and trim text before comparison
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Clinical vocabulary biasing word order toward domain-relevant matches
#[derive(Debug, Clone)]
pub struct DomainVocabulary {
    matcher: Option<Regex>,
}

impl DomainVocabulary {
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Result<Self> {
        let alternatives: Vec<String> = keywords
            .iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .map(|k| regex::escape(&k))
            .collect();

        if alternatives.is_empty() {
            return Ok(Self { matcher: None });
        }

        let matcher = Regex::new(&format!("(?:{})", alternatives.join("|")))
            .map_err(|e| ChatbotError::InvalidConfig(format!("Invalid domain keyword: {e}")))?;

        Ok(Self {
            matcher: Some(matcher),
        })
    }

    /// Vocabulary with no keywords; no bonus is ever awarded
    pub fn empty() -> Self {
        Self { matcher: None }
    }

    /// Whether `word` contains any keyword
    pub fn contains_keyword(&self, word: &str) -> bool {
        self.matcher
            .as_ref()
            .is_some_and(|matcher| matcher.is_match(word))
    }
}

/// Per-signal breakdown of one (query, pattern) comparison
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PatternScore {
    pub exact_match: f64,
    pub word_similarity: f64,
    pub word_order: f64,
    pub coverage: f64,
    pub total: f64,
}

/// Best pattern word for one query word
#[derive(Debug, Clone, Copy)]
struct WordMatch {
    query_index: usize,
    pattern_index: usize,
    similarity: f64,
}

impl WordMatch {
    fn is_match(&self) -> bool {
        self.similarity > WORD_MATCH_THRESHOLD
    }
}

/// Scores normalized queries against catalog patterns
#[derive(Debug, Clone)]
pub struct PatternScorer {
    vocabulary: DomainVocabulary,
}

impl PatternScorer {
    pub fn new(vocabulary: DomainVocabulary) -> Self {
        Self { vocabulary }
    }

    /// Score a normalized query against one raw pattern
    pub fn score(&self, query: &str, pattern: &str) -> PatternScore {
        let pattern = normalize(pattern);
        let query_words: Vec<&str> = query.split_whitespace().collect();
        let pattern_words: Vec<&str> = pattern.split_whitespace().collect();

        let matches = best_word_matches(&query_words, &pattern_words);

        let exact_match = if query == pattern { 1.0 } else { 0.0 };
        let word_similarity = word_similarity_score(&matches);
        let word_order = self.word_order_score(&matches, &query_words, &pattern_words);
        let coverage = matched_word_coverage(&matches, query_words.len(), pattern_words.len());

        let total = (exact_match * EXACT_MATCH_WEIGHT
            + word_similarity * WORD_SIMILARITY_WEIGHT
            + word_order * WORD_ORDER_WEIGHT
            + coverage * COVERAGE_WEIGHT)
            / WEIGHT_NORMALIZER;

        PatternScore {
            exact_match,
            word_similarity,
            word_order,
            coverage,
            total,
        }
    }

    /// Best pattern score of an intent, or `None` when it has no usable pattern
    pub fn score_intent(&self, query: &str, intent: &Intent) -> Option<PatternScore> {
        let mut best: Option<PatternScore> = None;

        for pattern in &intent.patterns {
            if pattern.trim().is_empty() {
                continue;
            }

            let score = self.score(query, pattern);
            if best.map_or(true, |b| score.total > b.total) {
                best = Some(score);
            }
        }

        best
    }

    /// Positional agreement of matched words plus the domain keyword bonus
    fn word_order_score(
        &self,
        matches: &[WordMatch],
        query_words: &[&str],
        pattern_words: &[&str],
    ) -> f64 {
        let longest = query_words.len().max(pattern_words.len()) as f64;
        let mut positional = 0.0;
        let mut matched = 0usize;
        let mut bonus = 0.0;

        for m in matches.iter().filter(|m| m.is_match()) {
            let offset = m.query_index.abs_diff(m.pattern_index) as f64;
            positional += 1.0 - offset / longest;
            matched += 1;

            if self.vocabulary.contains_keyword(query_words[m.query_index])
                || self.vocabulary.contains_keyword(pattern_words[m.pattern_index])
            {
                bonus += KEYWORD_BONUS;
            }
        }

        if matched == 0 {
            return 0.0;
        }

        (positional / matched as f64 + bonus).min(1.0)
    }
}

/// For each query word, its most similar pattern word (first one wins ties)
fn best_word_matches(query_words: &[&str], pattern_words: &[&str]) -> Vec<WordMatch> {
    query_words
        .iter()
        .enumerate()
        .map(|(query_index, query_word)| {
            let mut best = WordMatch {
                query_index,
                pattern_index: 0,
                similarity: 0.0,
            };
            for (pattern_index, pattern_word) in pattern_words.iter().enumerate() {
                let score = similarity(query_word, pattern_word);
                if score > best.similarity {
                    best.pattern_index = pattern_index;
                    best.similarity = score;
                }
            }
            best
        })
        .collect()
}

fn word_similarity_score(matches: &[WordMatch]) -> f64 {
    if matches.is_empty() {
        return 0.0;
    }
    matches.iter().map(|m| m.similarity).sum::<f64>() / matches.len() as f64
}

fn matched_word_coverage(matches: &[WordMatch], query_len: usize, pattern_len: usize) -> f64 {
    let longest = query_len.max(pattern_len);
    if longest == 0 {
        return 0.0;
    }
    matches.iter().filter(|m| m.is_match()).count() as f64 / longest as f64
}
