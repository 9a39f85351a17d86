//! Archive summary of a finished build
//!
//! Combines the build metadata with the scan results of its two logs into
//! the record an archiver stores.

use buildsift_logs::LogScanResult;
use buildsift_types::{ArchiveSummary, BuildInfo, BuildStatus, DetectedCategory, ErrorGroup};
use chrono::Datelike;
use tracing::info;

use crate::categorizer::categorize;
use crate::signatures::{
    BREW_PULL_ACTIVE, FRONTEND_MAVEN_PLUGIN, MANIPULATION_DISABLED, MANIPULATION_DISABLED_CAMEL,
};
use crate::status::correct_status;

/// Build type reported for Maven builds that drive an npm frontend
pub const MVN_WRAPPED_NPM: &str = "MVN-WRAPPED-NPM";

/// Tail size to keep for the logs of `build`
///
/// Only failed temporary builds keep a trimmed log.
pub fn trim_limit(build: &BuildInfo, max_size: usize) -> usize {
    if build.temporary_build && build.status != BuildStatus::Success {
        max_size
    } else {
        0
    }
}

/// Whether the logs of a build with this status are worth reading
pub fn needs_log_scan(status: BuildStatus) -> bool {
    !matches!(
        status,
        BuildStatus::NoRebuildRequired | BuildStatus::RejectedFailedDependencies
    )
}

/// Outcome of categorizing a build's errors
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorOutcome {
    pub status: BuildStatus,
    /// Category recorded for the build, if any
    pub category: Option<DetectedCategory>,
}

/// Categorize and correct the status of a build
///
/// System errors always record their category. Failures record it only
/// when they are escalated.
pub fn process_errors(
    nominal: BuildStatus,
    build: &LogScanResult,
    alignment: &LogScanResult,
) -> ErrorOutcome {
    match nominal {
        BuildStatus::SystemError => {
            let category = categorize(build, alignment);
            ErrorOutcome {
                status: correct_status(nominal, &category),
                category: Some(category),
            }
        }
        BuildStatus::Failed => {
            let category = categorize(build, alignment);
            if category.group == ErrorGroup::Indy {
                ErrorOutcome {
                    status: correct_status(nominal, &category),
                    category: Some(category),
                }
            } else {
                ErrorOutcome {
                    status: nominal,
                    category: None,
                }
            }
        }
        _ => ErrorOutcome {
            status: nominal,
            category: None,
        },
    }
}

pub fn summarize(
    build: &BuildInfo,
    build_log: &LogScanResult,
    alignment_log: &LogScanResult,
) -> ArchiveSummary {
    let outcome = process_errors(build.status, build_log, alignment_log);

    let build_type = if build_log.contains(FRONTEND_MAVEN_PLUGIN) {
        MVN_WRAPPED_NPM.to_string()
    } else {
        build.build_type.clone()
    };

    let submitted = build.submit_time.map(|t| t.date_naive());
    let (group, message) = match outcome.category {
        Some(category) => (Some(category.group), Some(category.message)),
        None => (None, None),
    };

    let summary = ArchiveSummary {
        build_id: build.id.clone(),
        nominal_status: build.status,
        status: outcome.status,
        build_type,
        temporary_build: build.temporary_build,
        auto_align: !alignment_log.contains(MANIPULATION_DISABLED)
            && !alignment_log.contains(MANIPULATION_DISABLED_CAMEL),
        brew_pull_active: alignment_log.contains(BREW_PULL_ACTIVE),
        categorized_error_group: group,
        categorized_error_message: message,
        submit_year: submitted.map(|d| d.year()),
        submit_month: submitted.map(|d| d.month()),
        submit_quarter: submitted.map(|d| (d.month() - 1) / 3 + 1),
        trimmed_build_log: build_log.trimmed_tail().to_string(),
        trimmed_alignment_log: alignment_log.trimmed_tail().to_string(),
    };

    info!(
        build = %summary.build_id,
        nominal = %summary.nominal_status,
        status = %summary.status,
        "build summarized"
    );
    summary
}
