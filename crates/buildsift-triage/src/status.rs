use buildsift_types::{BuildStatus, DetectedCategory, ErrorGroup};

/// Rewrite a nominal terminal status using the detected category
///
/// A system error caused by a known user condition is de-escalated to
/// `FAILED`, and a plain failure caused by the repository service is
/// escalated to `SYSTEM_ERROR`. Every other status is returned unchanged.
pub fn correct_status(nominal: BuildStatus, category: &DetectedCategory) -> BuildStatus {
    match nominal {
        BuildStatus::SystemError if category.previously_marked_system_error => BuildStatus::Failed,
        BuildStatus::Failed if category.group == ErrorGroup::Indy => BuildStatus::SystemError,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_condition_is_de_escalated() {
        let category = DetectedCategory::previously_marked(ErrorGroup::Pnc, "user error");
        assert_eq!(
            correct_status(BuildStatus::SystemError, &category),
            BuildStatus::Failed
        );
    }

    #[test]
    fn test_repository_failure_is_escalated() {
        let category = DetectedCategory::new(ErrorGroup::Indy, "INDY - Failed to promote");
        assert_eq!(
            correct_status(BuildStatus::Failed, &category),
            BuildStatus::SystemError
        );
    }

    #[test]
    fn test_system_error_stays_without_marker() {
        for group in [ErrorGroup::Pnc, ErrorGroup::Psi, ErrorGroup::Indy, ErrorGroup::Nd] {
            let category = DetectedCategory::new(group, "x");
            assert_eq!(
                correct_status(BuildStatus::SystemError, &category),
                BuildStatus::SystemError
            );
        }
    }

    #[test]
    fn test_failed_stays_for_other_groups() {
        for group in [ErrorGroup::Pnc, ErrorGroup::Psi, ErrorGroup::Nd] {
            let category = DetectedCategory::new(group, "x");
            assert_eq!(correct_status(BuildStatus::Failed, &category), BuildStatus::Failed);

            let marked = DetectedCategory::previously_marked(group, "x");
            assert_eq!(correct_status(BuildStatus::Failed, &marked), BuildStatus::Failed);
        }
    }

    #[test]
    fn test_other_statuses_are_never_rewritten() {
        let categories = [
            DetectedCategory::previously_marked(ErrorGroup::Indy, "x"),
            DetectedCategory::new(ErrorGroup::Indy, "x"),
            DetectedCategory::not_determined(),
        ];
        let untouched = BuildStatus::ALL
            .into_iter()
            .filter(|s| !matches!(s, BuildStatus::Failed | BuildStatus::SystemError));

        for status in untouched {
            for category in &categories {
                assert_eq!(correct_status(status, category), status);
            }
        }
    }
}
