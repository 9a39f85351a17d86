use regex::Regex;
use std::collections::HashMap;

use crate::error::{PatternError, Result};

/// How a pattern is tested against a line
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PatternKind {
    Literal,
    Regex,
}

/// A compiled line pattern
///
/// The pattern's own text doubles as its identifier.
#[derive(Clone)]
pub enum LinePattern {
    /// Plain substring containment; reports the pattern text itself
    Literal(String),

    /// Whole-line match of `.*(<pattern>).*`; reports the captured group
    Regex {
        /// Original pattern string
        source: String,

        /// Unanchored pattern, decides whether the line can match at all
        probe: Regex,

        /// Anchored wrapper that extracts the captured group
        capture: Regex,
    },
}

impl LinePattern {
    /// Create a literal pattern
    pub fn literal(text: &str) -> Self {
        Self::Literal(text.to_string())
    }

    /// Compile a regex pattern
    pub fn regex(pattern: &str) -> Result<Self> {
        let invalid = |source| PatternError::InvalidRegex {
            pattern: pattern.to_string(),
            source,
        };

        let probe = Regex::new(pattern).map_err(invalid)?;
        let capture = Regex::new(&format!("^.*({pattern}).*$")).map_err(invalid)?;

        Ok(Self::Regex {
            source: pattern.to_string(),
            probe,
            capture,
        })
    }

    /// Pattern identifier (the original pattern text)
    pub fn id(&self) -> &str {
        match self {
            Self::Literal(text) => text,
            Self::Regex { source, .. } => source,
        }
    }

    /// Whether this is a literal or a regex pattern
    pub fn kind(&self) -> PatternKind {
        match self {
            Self::Literal(_) => PatternKind::Literal,
            Self::Regex { .. } => PatternKind::Regex,
        }
    }

    /// Test a line, returning the text to report on a match
    pub fn try_match(&self, line: &str) -> Option<String> {
        match self {
            Self::Literal(text) => line.contains(text.as_str()).then(|| text.clone()),
            Self::Regex { probe, capture, .. } => {
                // The anchored capture is the authority; the probe only skips
                // lines that cannot match.
                if !probe.is_match(line) {
                    return None;
                }
                capture
                    .captures(line)
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str().to_string())
            }
        }
    }
}

impl std::fmt::Debug for LinePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinePattern")
            .field("kind", &self.kind())
            .field("pattern", &self.id())
            .finish()
    }
}

/// Registry of patterns, in registration order
///
/// Built once and then shared read-only (usually behind an `Arc`) by every
/// scanner that looks for the same signatures.
#[derive(Clone, Debug, Default)]
pub struct PatternSet {
    patterns: Vec<LinePattern>,
    index: HashMap<String, usize>,
}

impl PatternSet {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a literal pattern
    pub fn register_literal(&mut self, text: &str) -> Result<()> {
        self.insert(LinePattern::literal(text))
    }

    /// Register a regex pattern, failing on invalid syntax
    pub fn register_regex(&mut self, pattern: &str) -> Result<()> {
        self.insert(LinePattern::regex(pattern)?)
    }

    /// Register several literal patterns
    pub fn register_literals<I, S>(&mut self, texts: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        texts
            .into_iter()
            .try_for_each(|text| self.register_literal(text.as_ref()))
    }

    /// Register several regex patterns
    pub fn register_regexes<I, S>(&mut self, patterns: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        patterns
            .into_iter()
            .try_for_each(|pattern| self.register_regex(pattern.as_ref()))
    }

    fn insert(&mut self, pattern: LinePattern) -> Result<()> {
        if self.index.contains_key(pattern.id()) {
            return Err(PatternError::DuplicatePattern(pattern.id().to_string()));
        }
        self.index.insert(pattern.id().to_string(), self.patterns.len());
        self.patterns.push(pattern);
        Ok(())
    }

    /// Registration slot of a pattern id
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Pattern registered at `position`
    pub fn get(&self, position: usize) -> Option<&LinePattern> {
        self.patterns.get(position)
    }

    /// Whether a pattern with this id is registered
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Patterns in registration order
    pub fn iter(&self) -> impl Iterator<Item = &LinePattern> {
        self.patterns.iter()
    }

    /// Number of registered patterns
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether no pattern is registered
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_reports_pattern_text() {
        let pattern = LinePattern::literal("my error");
        assert_eq!(
            pattern.try_match("long my error line"),
            Some("my error".to_string())
        );
        assert_eq!(pattern.try_match("all good"), None);
        assert_eq!(pattern.kind(), PatternKind::Literal);
    }

    #[test]
    fn test_regex_reports_captured_group() {
        let pattern = LinePattern::regex("my .* error").unwrap();
        assert_eq!(
            pattern.try_match("long my shiny error line"),
            Some("my shiny error".to_string())
        );
        assert_eq!(pattern.try_match("my error"), None);
        assert_eq!(pattern.kind(), PatternKind::Regex);
    }

    #[test]
    fn test_regex_group_starts_as_late_as_possible() {
        // The greedy leading `.*` pushes the group to the last viable start
        let pattern = LinePattern::regex("indy.*:80 failed to respond").unwrap();
        assert_eq!(
            pattern.try_match("indy-a indy-b:80 failed to respond"),
            Some("indy-b:80 failed to respond".to_string())
        );
    }

    #[test]
    fn test_regex_with_alternation_stays_grouped() {
        let pattern = LinePattern::regex("foo|bar").unwrap();
        assert_eq!(pattern.try_match("xx bar yy"), Some("bar".to_string()));
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let err = LinePattern::regex("unclosed (group").unwrap_err();
        assert!(matches!(err, PatternError::InvalidRegex { .. }));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut set = PatternSet::new();
        set.register_literal("Read timed out").unwrap();
        let err = set.register_regex("Read timed out").unwrap_err();
        assert!(matches!(err, PatternError::DuplicatePattern(id) if id == "Read timed out"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_registration_order_kept() {
        let mut set = PatternSet::new();
        set.register_literals(["b", "a"]).unwrap();
        set.register_regexes(["c.*"]).unwrap();

        let ids: Vec<_> = set.iter().map(LinePattern::id).collect();
        assert_eq!(ids, vec!["b", "a", "c.*"]);
        assert_eq!(set.position("a"), Some(1));
        assert_eq!(set.position("missing"), None);
    }
}
