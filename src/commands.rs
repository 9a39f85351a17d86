//! Subcommand implementations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use buildsift_logs::{LogLineCodec, LogScanResult};
use buildsift_triage::{RULES, needs_log_scan, new_scanner, summarize, trim_limit, unscanned_log};
use buildsift_types::{BuildInfo, BuildStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::fs::File;
use tokio_util::codec::FramedRead;
use tracing::debug;

/// JSON report of a single log scan
#[derive(Debug, Serialize)]
struct ScanReport<'a> {
    empty: bool,
    lines: u64,
    matches: Vec<MatchReport<'a>>,
    trimmed_tail: &'a str,
}

#[derive(Debug, Serialize)]
struct MatchReport<'a> {
    pattern: &'a str,
    captured: &'a str,
}

/// Scan a log file with every known signature
///
/// Invalid UTF-8 is replaced and overlong lines are cut, so only an I/O
/// error ends the scan early; it keeps the lines scanned so far.
async fn scan_file(path: &Path, trim_limit: usize) -> Result<LogScanResult> {
    let file = File::open(path)
        .await
        .with_context(|| format!("Failed to open log {}", path.display()))?;

    let mut scanner = new_scanner(trim_limit);
    scanner
        .scan_stream(FramedRead::new(file, LogLineCodec::new()))
        .await;
    Ok(scanner.finish())
}

/// Scan an optional log; an omitted log counts as empty
async fn scan_optional(path: Option<&Path>, trim_limit: usize) -> Result<LogScanResult> {
    match path {
        Some(path) => scan_file(path, trim_limit).await,
        None => Ok(unscanned_log()),
    }
}

pub async fn scan(path: &Path, trim_limit: usize) -> Result<()> {
    let result = scan_file(path, trim_limit).await?;

    let report = ScanReport {
        empty: result.is_empty(),
        lines: result.lines_scanned(),
        matches: result
            .matches()
            .map(|(pattern, captured)| MatchReport { pattern, captured })
            .collect(),
        trimmed_tail: result.trimmed_tail(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Inputs of the `categorize` subcommand
#[derive(Debug)]
pub struct CategorizeRequest {
    pub status: BuildStatus,
    pub build_log: Option<PathBuf>,
    pub alignment_log: Option<PathBuf>,
    pub id: String,
    pub temporary: bool,
    pub build_type: String,
    pub submit_time: Option<DateTime<Utc>>,
    pub max_trim: usize,
}

pub async fn categorize(request: CategorizeRequest) -> Result<()> {
    let mut build = BuildInfo::new(request.id, request.status, request.build_type)
        .temporary(request.temporary);
    if let Some(submit_time) = request.submit_time {
        build = build.with_submit_time(submit_time);
    }

    let (build_log, alignment_log) = if needs_log_scan(build.status) {
        let limit = trim_limit(&build, request.max_trim);
        let (build_log, alignment_log) = tokio::join!(
            scan_optional(request.build_log.as_deref(), limit),
            scan_optional(request.alignment_log.as_deref(), limit),
        );
        (build_log?, alignment_log?)
    } else {
        debug!(status = %build.status, "skipping log scan");
        (unscanned_log(), unscanned_log())
    };

    let summary = summarize(&build, &build_log, &alignment_log);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

pub fn rules() {
    for (index, rule) in RULES.iter().enumerate() {
        let marker = if rule.previously_marked_system_error {
            " (previously marked)"
        } else {
            ""
        };
        println!(
            "{index:>2}  {:<4}  {}  =>  {}{marker}",
            rule.group.as_str(),
            rule.predicate,
            rule.message
        );
    }
}
