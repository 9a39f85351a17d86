use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::pattern::PatternSet;
use crate::tail::TailWindow;

/// Match state of one pattern within one scan
///
/// Once found, a state never reverts and its captured text never changes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchState {
    captured: Option<String>,
}

impl MatchState {
    pub fn is_found(&self) -> bool {
        self.captured.is_some()
    }

    /// Text reported by the first matching line
    pub fn captured(&self) -> Option<&str> {
        self.captured.as_deref()
    }

    fn record(&mut self, captured: String) {
        if self.captured.is_none() {
            self.captured = Some(captured);
        }
    }
}

/// Single-pass scanner over one log
///
/// A scanner has exactly one writer: every `scan_*` method takes `&mut self`
/// and the match states are owned by the scanner. Scanners that look for the
/// same signatures share only the read-only [`PatternSet`], so two logs can
/// be scanned on two threads or tasks at once.
pub struct LogScanner {
    patterns: Arc<PatternSet>,

    /// One state per registered pattern, same order as the registry
    states: Vec<MatchState>,

    /// Patterns not yet found
    pending: usize,

    tail: TailWindow,

    /// No non-empty line seen so far
    empty: bool,

    lines: u64,
}

impl LogScanner {
    /// Create a scanner with no patterns
    ///
    /// `trim_limit` bounds the retained tail in bytes; 0 disables it.
    pub fn new(trim_limit: usize) -> Self {
        Self::with_patterns(Arc::new(PatternSet::new()), trim_limit)
    }

    /// Create a scanner over an already-built pattern registry
    pub fn with_patterns(patterns: Arc<PatternSet>, trim_limit: usize) -> Self {
        let states = vec![MatchState::default(); patterns.len()];
        Self {
            pending: states.len(),
            patterns,
            states,
            tail: TailWindow::new(trim_limit),
            empty: true,
            lines: 0,
        }
    }

    /// Register a literal pattern on this scanner
    pub fn register_literal(&mut self, text: &str) -> Result<()> {
        Arc::make_mut(&mut self.patterns).register_literal(text)?;
        self.track_new_pattern();
        Ok(())
    }

    /// Register a regex pattern on this scanner, failing on invalid syntax
    pub fn register_regex(&mut self, pattern: &str) -> Result<()> {
        Arc::make_mut(&mut self.patterns).register_regex(pattern)?;
        self.track_new_pattern();
        Ok(())
    }

    fn track_new_pattern(&mut self) {
        self.states.push(MatchState::default());
        self.pending += 1;
    }

    /// Process one line
    pub fn scan_line(&mut self, line: &str) {
        self.lines += 1;

        if self.empty && !line.is_empty() {
            self.empty = false;
        }

        self.tail.push(line);

        if self.pending == 0 {
            return;
        }

        for (pattern, state) in self.patterns.iter().zip(self.states.iter_mut()) {
            if state.is_found() {
                continue;
            }
            if let Some(captured) = pattern.try_match(line) {
                debug!(
                    pattern = pattern.id(),
                    captured = %captured,
                    line = self.lines,
                    "signature matched"
                );
                state.record(captured);
                self.pending -= 1;
            }
        }
    }

    /// Process every line of an in-memory sequence, returning how many were read
    pub fn scan<I>(&mut self, lines: I) -> u64
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let before = self.lines;
        for line in lines {
            self.scan_line(line.as_ref());
        }
        self.lines - before
    }

    /// Whether the pattern matched some line so far
    pub fn contains(&self, id: &str) -> bool {
        state_of(&self.patterns, &self.states, id).is_some_and(MatchState::is_found)
    }

    /// Text captured for the pattern, if it matched
    pub fn captured(&self, id: &str) -> Option<&str> {
        state_of(&self.patterns, &self.states, id).and_then(MatchState::captured)
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// Retained tail of the log, newline-joined
    pub fn trimmed_tail(&self) -> String {
        self.tail.export()
    }

    pub fn lines_scanned(&self) -> u64 {
        self.lines
    }

    /// Found patterns with their captured text, in registration order
    pub fn matches(&self) -> impl Iterator<Item = (&str, &str)> {
        found(&self.patterns, &self.states)
    }

    pub fn patterns(&self) -> &Arc<PatternSet> {
        &self.patterns
    }

    /// Freeze the scan into a read-only result
    pub fn finish(self) -> LogScanResult {
        LogScanResult {
            trimmed_tail: self.tail.export(),
            patterns: self.patterns,
            states: self.states,
            empty: self.empty,
            lines: self.lines,
        }
    }
}

/// Immutable outcome of a finished scan
#[derive(Clone, Debug)]
pub struct LogScanResult {
    patterns: Arc<PatternSet>,
    states: Vec<MatchState>,
    empty: bool,
    trimmed_tail: String,
    lines: u64,
}

impl LogScanResult {
    /// Result of a scan that read no lines
    pub fn empty(patterns: Arc<PatternSet>) -> Self {
        LogScanner::with_patterns(patterns, 0).finish()
    }

    pub fn contains(&self, id: &str) -> bool {
        state_of(&self.patterns, &self.states, id).is_some_and(MatchState::is_found)
    }

    pub fn captured(&self, id: &str) -> Option<&str> {
        state_of(&self.patterns, &self.states, id).and_then(MatchState::captured)
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn trimmed_tail(&self) -> &str {
        &self.trimmed_tail
    }

    pub fn lines_scanned(&self) -> u64 {
        self.lines
    }

    pub fn matches(&self) -> impl Iterator<Item = (&str, &str)> {
        found(&self.patterns, &self.states)
    }

    pub fn patterns(&self) -> &Arc<PatternSet> {
        &self.patterns
    }
}

fn state_of<'a>(
    patterns: &PatternSet,
    states: &'a [MatchState],
    id: &str,
) -> Option<&'a MatchState> {
    patterns.position(id).and_then(|position| states.get(position))
}

fn found<'a>(
    patterns: &'a PatternSet,
    states: &'a [MatchState],
) -> impl Iterator<Item = (&'a str, &'a str)> {
    patterns
        .iter()
        .zip(states)
        .filter_map(|(pattern, state)| state.captured().map(|text| (pattern.id(), text)))
}
