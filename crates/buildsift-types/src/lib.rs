//! Shared types for buildsift
//!
//! This crate contains data structures used across multiple buildsift crates.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Build Types
// ============================================================================

/// Terminal status of a finished build
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildStatus {
    Success,
    Failed,
    NoRebuildRequired,
    Rejected,
    RejectedFailedDependencies,
    Cancelled,
    SystemError,
}

impl BuildStatus {
    pub const ALL: [BuildStatus; 7] = [
        Self::Success,
        Self::Failed,
        Self::NoRebuildRequired,
        Self::Rejected,
        Self::RejectedFailedDependencies,
        Self::Cancelled,
        Self::SystemError,
    ];

    /// Wire name, as reported by the build system
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::NoRebuildRequired => "NO_REBUILD_REQUIRED",
            Self::Rejected => "REJECTED",
            Self::RejectedFailedDependencies => "REJECTED_FAILED_DEPENDENCIES",
            Self::Cancelled => "CANCELLED",
            Self::SystemError => "SYSTEM_ERROR",
        }
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a status name is not recognised
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown build status: {0}")]
pub struct StatusParseError(pub String);

impl FromStr for BuildStatus {
    type Err = StatusParseError;

    /// Accepts the wire name in any case, with `-` in place of `_`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| StatusParseError(s.to_string()))
    }
}

/// Metadata of a finished build, as supplied by the build system
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    pub id: String,
    pub status: BuildStatus,
    pub temporary_build: bool,
    /// Configured build type (MVN, NPM, GRADLE, ...)
    pub build_type: String,
    pub submit_time: Option<DateTime<Utc>>,
}

impl BuildInfo {
    pub fn new(id: String, status: BuildStatus, build_type: String) -> Self {
        Self {
            id,
            status,
            temporary_build: false,
            build_type,
            submit_time: None,
        }
    }

    /// Mark the build as temporary
    pub fn temporary(mut self, temporary: bool) -> Self {
        self.temporary_build = temporary;
        self
    }

    /// Set the submit time
    pub fn with_submit_time(mut self, submit_time: DateTime<Utc>) -> Self {
        self.submit_time = Some(submit_time);
        self
    }
}

// ============================================================================
// Categorization Types
// ============================================================================

/// Failure group a categorized build is attributed to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorGroup {
    /// The build system itself
    #[serde(rename = "PNC")]
    Pnc,
    /// The underlying cloud platform
    #[serde(rename = "PSI")]
    Psi,
    /// The artifact repository service
    #[serde(rename = "INDY")]
    Indy,
    /// Not determined
    #[serde(rename = "ND")]
    Nd,
}

impl ErrorGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pnc => "PNC",
            Self::Psi => "PSI",
            Self::Indy => "INDY",
            Self::Nd => "ND",
        }
    }
}

impl fmt::Display for ErrorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of categorizing a build's logs
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedCategory {
    pub group: ErrorGroup,
    pub message: String,

    /// The failure is a known user-caused condition that used to be reported
    /// as a system error
    pub previously_marked_system_error: bool,
}

impl DetectedCategory {
    pub fn new(group: ErrorGroup, message: impl Into<String>) -> Self {
        Self {
            group,
            message: message.into(),
            previously_marked_system_error: false,
        }
    }

    /// Category for a known condition that should not count as a system error
    pub fn previously_marked(group: ErrorGroup, message: impl Into<String>) -> Self {
        Self {
            previously_marked_system_error: true,
            ..Self::new(group, message)
        }
    }

    /// The "N.D." fallback used when no rule matched
    pub fn not_determined() -> Self {
        Self::new(ErrorGroup::Nd, "N.D.")
    }
}

// ============================================================================
// Archive Types
// ============================================================================

/// Everything the archiver stores about one finished build
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveSummary {
    pub build_id: String,

    /// Status reported by the build system
    pub nominal_status: BuildStatus,

    /// Status after correction by the detected category
    pub status: BuildStatus,

    pub build_type: String,
    pub temporary_build: bool,

    /// Alignment ran with manipulation enabled
    pub auto_align: bool,
    pub brew_pull_active: bool,

    pub categorized_error_group: Option<ErrorGroup>,
    pub categorized_error_message: Option<String>,

    pub submit_year: Option<i32>,
    pub submit_month: Option<u32>,
    pub submit_quarter: Option<u32>,

    pub trimmed_build_log: String,
    pub trimmed_alignment_log: String,
}
