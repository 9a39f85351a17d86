use std::collections::VecDeque;

/// Substring that marks the start of the interesting part of a log
pub const ERROR_MARKER: &str = "Caught exception:";

/// Size-bounded FIFO of the most recent log lines
///
/// Sizes are measured in UTF-8 bytes, newlines excluded. The first line
/// carrying [`ERROR_MARKER`] discards everything buffered before it; later
/// marker lines are ordinary lines.
#[derive(Clone, Debug)]
pub struct TailWindow {
    /// Buffered lines, oldest first
    lines: VecDeque<String>,

    /// Total length of the buffered lines
    size: usize,

    /// Maximum total length, 0 disables retention
    limit: usize,

    /// Whether the one-time reset already happened
    marker_seen: bool,
}

impl TailWindow {
    /// Create a window holding at most `limit` bytes of lines
    pub fn new(limit: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            size: 0,
            limit,
            marker_seen: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.limit > 0
    }

    /// Append a line, evicting the oldest lines while over the limit
    pub fn push(&mut self, line: &str) {
        if !self.is_enabled() {
            return;
        }

        if !self.marker_seen && line.contains(ERROR_MARKER) {
            self.lines.clear();
            self.size = 0;
            self.marker_seen = true;
        }

        self.size += line.len();
        self.lines.push_back(line.to_string());

        while self.size > self.limit {
            match self.lines.pop_front() {
                Some(evicted) => self.size -= evicted.len(),
                None => break,
            }
        }
    }

    /// Total length of the buffered lines
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Buffered line count
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn marker_seen(&self) -> bool {
        self.marker_seen
    }

    /// Export the buffered lines joined by newlines
    pub fn export(&self) -> String {
        self.lines
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
