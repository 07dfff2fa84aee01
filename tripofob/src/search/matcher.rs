use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::config::PatternMode;
use crate::errors::{SearchError, SearchResult};

/// Compiled, case-insensitive search pattern shared by all workers
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    source: String,
    mode: PatternMode,
    regex: Regex,
}

impl PatternMatcher {
    /// Compiles `pattern`. Literal patterns are escaped first so every
    /// character matches itself. Invalid regular expressions are rejected.
    pub fn new(pattern: &str, mode: PatternMode) -> SearchResult<Self> {
        if pattern.is_empty() {
            return Err(SearchError::invalid_pattern("pattern is empty"));
        }

        let expression = match mode {
            PatternMode::Literal => regex::escape(pattern),
            PatternMode::Regex => pattern.to_string(),
        };

        let regex = RegexBuilder::new(&expression)
            .case_insensitive(true)
            .multi_line(true)
            .build()
            .map_err(|e| SearchError::invalid_pattern(e.to_string()))?;

        debug!("Compiled {:?} pattern '{}'", mode, pattern);
        Ok(Self {
            source: pattern.to_string(),
            mode,
            regex,
        })
    }

    /// Literal substring matcher
    pub fn literal(pattern: &str) -> SearchResult<Self> {
        Self::new(pattern, PatternMode::Literal)
    }

    /// Regular expression matcher
    pub fn regex(pattern: &str) -> SearchResult<Self> {
        Self::new(pattern, PatternMode::Regex)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn mode(&self) -> PatternMode {
        self.mode
    }

    /// Byte ranges of all non-empty, non-overlapping matches in document order
    pub fn find_matches(&self, text: &str) -> Vec<(usize, usize)> {
        self.regex
            .find_iter(text)
            .filter(|m| !m.is_empty())
            .map(|m| (m.start(), m.end()))
            .collect()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_is_case_insensitive() {
        let matcher = PatternMatcher::literal("Needle").unwrap();
        assert_eq!(
            matcher.find_matches("a needle and a NEEDLE"),
            vec![(2, 8), (15, 21)]
        );
    }

    #[test]
    fn test_literal_escapes_metacharacters() {
        let matcher = PatternMatcher::literal("a.b(c)").unwrap();
        assert!(matcher.is_match("x a.b(c) y"));
        assert!(!matcher.is_match("axb(c)"));

        // "(" is fine as a literal
        assert!(PatternMatcher::literal("(").is_ok());
    }

    #[test]
    fn test_invalid_regex_is_rejected() {
        let err = PatternMatcher::regex("(").unwrap_err();
        assert!(matches!(err, SearchError::InvalidPattern(_)));

        let err = PatternMatcher::regex("[a-").unwrap_err();
        assert!(matches!(err, SearchError::InvalidPattern(_)));
    }

    #[test]
    fn test_empty_pattern_is_rejected() {
        assert!(PatternMatcher::literal("").is_err());
        assert!(PatternMatcher::regex("").is_err());
    }

    #[test]
    fn test_regex_is_multi_line() {
        let matcher = PatternMatcher::regex(r"^todo:.*$").unwrap();
        let text = "first\nTODO: one\nsecond\ntodo: two";
        let found: Vec<&str> = matcher
            .find_matches(text)
            .into_iter()
            .map(|(s, e)| &text[s..e])
            .collect();
        assert_eq!(found, vec!["TODO: one", "todo: two"]);
    }

    #[test]
    fn test_zero_width_matches_are_skipped() {
        let matcher = PatternMatcher::regex("x*").unwrap();
        assert_eq!(matcher.find_matches("abxxc"), vec![(2, 4)]);
    }
}
