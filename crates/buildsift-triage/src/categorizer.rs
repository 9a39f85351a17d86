use buildsift_logs::LogScanResult;
use buildsift_types::DetectedCategory;
use tracing::debug;

use crate::rules::RULES;

/// Categorize a failed build from its finished log scans
///
/// Walks the rule table in priority order and returns the category of the
/// first rule that holds. Logs that match no rule are `ND`.
pub fn categorize(build: &LogScanResult, alignment: &LogScanResult) -> DetectedCategory {
    match RULES
        .iter()
        .enumerate()
        .find(|(_, rule)| rule.matches(build, alignment))
    {
        Some((index, rule)) => {
            let category = rule.category(build);
            debug!(
                rule = index,
                group = %category.group,
                message = %category.message,
                "build categorized"
            );
            category
        }
        None => {
            debug!("no rule matched, category not determined");
            DetectedCategory::not_determined()
        }
    }
}
