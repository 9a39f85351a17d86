//! Log scanning for buildsift
//!
//! This crate provides a single-pass scanner that looks for a fixed set of
//! literal and regex signatures in a log while keeping a size-bounded tail
//! of it.

mod codec;
mod error;
mod pattern;
mod scanner;
mod source;
mod tail;

pub use codec::{DEFAULT_MAX_LINE_LENGTH, LogLineCodec, decode_line};
pub use error::{PatternError, Result};
pub use pattern::{LinePattern, PatternKind, PatternSet};
pub use scanner::{LogScanResult, LogScanner, MatchState};
pub use tail::{ERROR_MARKER, TailWindow};
