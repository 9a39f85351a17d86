//! Failure categorization for buildsift
//!
//! Known failure signatures are scanned for in a build's logs, then an
//! ordered rule table maps the signatures found to an error group and
//! message.

mod archive;
mod categorizer;
pub mod rules;
pub mod signatures;
mod status;

pub use archive::{ErrorOutcome, MVN_WRAPPED_NPM, needs_log_scan, process_errors, summarize, trim_limit};
pub use categorizer::categorize;
pub use rules::{Message, Predicate, RULES, Rule};
pub use signatures::{new_scanner, signature_patterns, unscanned_log};
pub use status::correct_status;
