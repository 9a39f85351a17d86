//! Ordered rule table used to categorize failed builds
//!
//! Rules are evaluated top to bottom and the first match wins. Several
//! predicates can hold for the same pair of logs, so the order below is
//! significant and must not be rearranged.

use std::fmt;

use buildsift_logs::LogScanResult;
use buildsift_types::{DetectedCategory, ErrorGroup};

use crate::signatures::*;

/// Condition over the build log and the alignment log
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Predicate {
    /// The build log matched the signature
    Build(&'static str),
    /// The alignment log matched the signature
    Alignment(&'static str),
    /// The alignment log had no non-empty line
    AlignmentEmpty,
    All(&'static [Predicate]),
    Any(&'static [Predicate]),
}

impl Predicate {
    pub fn evaluate(&self, build: &LogScanResult, alignment: &LogScanResult) -> bool {
        match self {
            Self::Build(signature) => build.contains(signature),
            Self::Alignment(signature) => alignment.contains(signature),
            Self::AlignmentEmpty => alignment.is_empty(),
            Self::All(all) => all.iter().all(|p| p.evaluate(build, alignment)),
            Self::Any(any) => any.iter().any(|p| p.evaluate(build, alignment)),
        }
    }

    /// Every signature the predicate refers to
    pub fn signatures(&self) -> Vec<&'static str> {
        match self {
            Self::Build(signature) | Self::Alignment(signature) => vec![*signature],
            Self::AlignmentEmpty => Vec::new(),
            Self::All(nested) | Self::Any(nested) => {
                nested.iter().flat_map(Predicate::signatures).collect()
            }
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |f: &mut fmt::Formatter<'_>, nested: &[Predicate], op: &str| {
            f.write_str("(")?;
            for (i, p) in nested.iter().enumerate() {
                if i > 0 {
                    write!(f, " {op} ")?;
                }
                write!(f, "{p}")?;
            }
            f.write_str(")")
        };

        match self {
            Self::Build(signature) => write!(f, "build[{signature:?}]"),
            Self::Alignment(signature) => write!(f, "alignment[{signature:?}]"),
            Self::AlignmentEmpty => f.write_str("alignment.empty"),
            Self::All(nested) => join(f, nested, "&&"),
            Self::Any(nested) => join(f, nested, "||"),
        }
    }
}

/// Where a rule's message comes from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Message {
    Fixed(&'static str),
    /// Text the build log captured for the signature
    Captured(&'static str),
}

impl Message {
    pub fn render(&self, build: &LogScanResult) -> String {
        match self {
            Self::Fixed(text) => text.to_string(),
            Self::Captured(signature) => {
                build.captured(signature).unwrap_or(*signature).to_string()
            }
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(text) => f.write_str(text),
            Self::Captured(signature) => write!(f, "<captured {signature:?}>"),
        }
    }
}

/// One entry of the rule table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rule {
    pub predicate: Predicate,
    pub group: ErrorGroup,
    pub message: Message,
    pub previously_marked_system_error: bool,
}

impl Rule {
    pub fn matches(&self, build: &LogScanResult, alignment: &LogScanResult) -> bool {
        self.predicate.evaluate(build, alignment)
    }

    pub fn category(&self, build: &LogScanResult) -> DetectedCategory {
        DetectedCategory {
            group: self.group,
            message: self.message.render(build),
            previously_marked_system_error: self.previously_marked_system_error,
        }
    }
}

const fn rule(predicate: Predicate, group: ErrorGroup, message: Message) -> Rule {
    Rule {
        predicate,
        group,
        message,
        previously_marked_system_error: false,
    }
}

/// Rule for a known condition that should not count as a system error
const fn marked(predicate: Predicate, group: ErrorGroup, message: Message) -> Rule {
    Rule {
        predicate,
        group,
        message,
        previously_marked_system_error: true,
    }
}

/// Platform signature reported with the text it captured
const fn platform(signature: &'static str) -> Rule {
    rule(Build(signature), Psi, Captured(signature))
}

use ErrorGroup::{Indy, Pnc, Psi};
use Message::{Captured, Fixed};
use Predicate::{Alignment, AlignmentEmpty, All, Any, Build};

const MANIPULATION_OFF: Predicate = Any(&[
    Alignment(MANIPULATION_DISABLED),
    Alignment(MANIPULATION_DISABLED_CAMEL),
]);

/// The rule table, highest priority first
pub static RULES: &[Rule] = &[
    // Platform failures, reported verbatim
    platform(UNAUTHORIZED),
    platform(QUOTA_EXCEEDED),
    platform(PAAS_HEALTHZ_READY),
    platform(HEALTH_READY_CHECK_FAILED),
    platform(PAAS_SERVICE_CATALOG),
    platform(PAAS_CERTIFICATES),
    platform(PAAS_POST_BUILDERS),
    platform(SERVICE_IP_ALLOCATION_FAILED),
    platform(REPOUR_ADJUST_503),
    platform(REPOUR_ADJUST_504),
    platform(ERR_IMAGE_PULL),
    platform(SERVICE_NOT_READY_300S),
    platform(CONDITION_TIMEOUT_300S),
    platform(CONDITION_TIMEOUT_600S),
    platform(PAAS_EXECUTE_BUILDERS),
    platform(USER_CANNOT_CREATE),
    platform(OPENSHIFT_NOT_FOUND),
    platform(ORCH_UNKNOWN_HOST),
    platform(BROKEN_PIPE),
    // Platform failures with a fixed description
    rule(Build(QUOTA_UPDATE_CONFLICT), Psi, Fixed(QUOTA_EXCEEDED)),
    rule(
        All(&[Build(REMOTE_CLIENT_CONNECT_FAILED), Build(NO_ROUTE_TO_HOST)]),
        Psi,
        Fixed("Failed to connect to remote client. No route to host. [NCLSUP-162]"),
    ),
    rule(
        All(&[Build(BUILD_SCRIPT_UPLOAD_FAILED), Build(HOST_UNREACHABLE)]),
        Psi,
        Fixed("Could not upload build script - No route to host (Host unreachable) [NCLSUP-217]"),
    ),
    rule(
        All(&[
            Build(REPOUR_SYSTEM_ERROR),
            Alignment(DA_REST_FAILED),
            Alignment(HOST_UNREACHABLE),
        ]),
        Psi,
        Fixed("DA - No route to host (Host unreachable)"),
    ),
    rule(
        All(&[Build(REPOSITORY_SETUP_FAILED), Build(INDY_HOST_UNREACHABLE)]),
        Psi,
        Fixed("INDY - No route to host (Host unreachable)"),
    ),
    rule(
        All(&[Build(BPM_START_FAILED), Build(HOST_UNREACHABLE)]),
        Psi,
        Fixed("MAITAI - No route to host (Host unreachable)"),
    ),
    rule(
        Build(BUILD_AGENT_GONE),
        Psi,
        Fixed("Build Agent has gone away (Network issues)"),
    ),
    // Alignment finished with a system error
    rule(
        All(&[Build(REPOUR_SYSTEM_ERROR), Alignment(VERSIONS_NOT_OBTAINED)]),
        Indy,
        Fixed("INDY - Failed to obtain versions"),
    ),
    rule(
        All(&[
            Build(REPOUR_SYSTEM_ERROR),
            Alignment(DA_REST_FAILED),
            Alignment(RESPONSE_STATUS_500),
        ]),
        Pnc,
        Fixed("DA - Response status 500"),
    ),
    rule(
        All(&[
            Build(REPOUR_SYSTEM_ERROR),
            Alignment(DA_REST_FAILED),
            Alignment(READ_TIMED_OUT),
        ]),
        Pnc,
        Fixed("DA - Read timed out"),
    ),
    rule(
        All(&[Build(REPOUR_SYSTEM_ERROR), Alignment(DA_REST_FAILED)]),
        Pnc,
        Fixed("DA - REST communication failed"),
    ),
    rule(
        All(&[Build(REPOUR_SYSTEM_ERROR), Alignment(DA_FAILED_TO_RESPOND)]),
        Pnc,
        Fixed("DA - Failed to respond (da.newcastle.svc.cluster.local:80)"),
    ),
    marked(
        All(&[
            Build(REPOUR_SYSTEM_ERROR),
            Alignment(GROUP_ID_NOT_FOUND),
            MANIPULATION_OFF,
        ]),
        Pnc,
        Fixed("user did not specify BREW_BUILD_VERSION or BREW_BUILD_NAME"),
    ),
    marked(
        All(&[
            Build(REPOUR_SYSTEM_ERROR),
            Alignment(EXECUTION_ROOT_NAME_MALFORMED),
            MANIPULATION_OFF,
        ]),
        Pnc,
        Fixed("user wrongly specified BREW_BUILD_VERSION or BREW_BUILD_NAME"),
    ),
    marked(
        All(&[
            Build(REPOUR_SYSTEM_ERROR),
            Alignment(NO_SUCH_FILE),
            Alignment(POM_FILE_OPTION),
        ]),
        Pnc,
        Fixed("user wrongly specified custom pom.xml location"),
    ),
    marked(
        All(&[Build(REPOUR_SYSTEM_ERROR), AlignmentEmpty]),
        Pnc,
        Fixed("Build abortion in alignment phase causes system error [NCLSUP-248]"),
    ),
    rule(
        Build(REPOUR_SYSTEM_ERROR),
        Pnc,
        Fixed("REPOUR - completed with system error"),
    ),
    // Build system and repository service failures
    rule(
        Build(JSON_CONVERSION_FAILED),
        Pnc,
        Fixed(JSON_CONVERSION_FAILED),
    ),
    rule(
        All(&[Build(REPOSITORY_SETUP_FAILED), Build(INDY_CONNECT_FAILED)]),
        Indy,
        Fixed("INDY - Failed to respond during repository setup"),
    ),
    rule(
        All(&[Build(REPOSITORY_SETUP_FAILED), Build(INTERNAL_SERVER_ERROR)]),
        Indy,
        Fixed("INDY - Response status 500"),
    ),
    rule(
        Build(REPOSITORY_SETUP_FAILED),
        Pnc,
        Fixed(REPOSITORY_SETUP_FAILED),
    ),
    rule(
        Build(PROMOTION_POST_FAILED),
        Indy,
        Fixed("INDY - Failed to promote"),
    ),
    rule(
        Build(REMOTE_CLIENT_CONNECT_FAILED),
        Pnc,
        Fixed("Failed to connect to remote client [NCLSUP-53]"),
    ),
    rule(
        Build(REPOUR_ADJUST_500),
        Pnc,
        Fixed("REPOUR - Response status 500"),
    ),
    rule(
        Build(EXISTENCE_CHECK_FAILED),
        Pnc,
        Fixed("Error checking existence of [NCLSUP-51]"),
    ),
    rule(
        All(&[Build(PROMOTION_FAILED), Build(FAILED_TO_RESPOND)]),
        Indy,
        Fixed("INDY - Failed to respond during promotion"),
    ),
    rule(Build(PROMOTION_FAILED), Pnc, Fixed(PROMOTION_FAILED)),
    rule(
        Build(VALIDATION_PROVIDER_MISSING),
        Pnc,
        Fixed("Add a provider like Hibernate Validator [NCLSUP-79]"),
    ),
    rule(
        Build(AGENT_CLIENT_INIT_FAILED),
        Pnc,
        Fixed(AGENT_CLIENT_INIT_FAILED),
    ),
    rule(
        Build(IMPLEMENTATION_CLASS_MISSING),
        Pnc,
        Fixed(IMPLEMENTATION_CLASS_MISSING),
    ),
    rule(
        Build(CONFLICTING_ARTIFACT),
        Pnc,
        Fixed("Conflicting artifact"),
    ),
    rule(
        Build(COMPLETION_CANCELLED),
        Pnc,
        Fixed(COMPLETION_CANCELLED),
    ),
    rule(
        Build(INVALID_IMAGE_NAME),
        Pnc,
        Fixed("BUILDERS - Throwable: Pod failed with status: InvalidImageName"),
    ),
    rule(
        Build(BUILDER_POD_START_FAILED),
        Pnc,
        Fixed("BUILDERS - Bogus script detected during builder pod start"),
    ),
    // Process engine failures
    rule(
        All(&[
            Build(BPM_START_FAILED),
            Any(&[
                Build(CONNECTION_REFUSED_CAUSE),
                Build(UNEXPECTED_EOF),
                Build(RESPONSE_CONTENT_UNREADABLE),
            ]),
        ]),
        Pnc,
        Fixed("RHPAM - Connection refused"),
    ),
    rule(
        All(&[Build(BPM_START_FAILED), Build(NO_WORKFLOW_DEPLOYMENTS)]),
        Pnc,
        Fixed("RHPAM - No deployments available"),
    ),
    rule(
        All(&[Build(BPM_START_FAILED), Build(SOCKET_READ_TIMEOUT)]),
        Pnc,
        Fixed("RHPAM - Read timed out"),
    ),
    rule(
        All(&[
            Build(BPM_START_FAILED),
            Any(&[Build(HIBERNATE_CAUSE), Build(GENERIC_JDBC)]),
        ]),
        Pnc,
        Fixed("RHPAM - Persistence exception"),
    ),
    rule(
        Build(BPM_START_FAILED),
        Pnc,
        Fixed("RHPAM - Error while trying to startBuilding"),
    ),
    rule(
        All(&[Build(BPM_CORE_START_FAILED), Build(DEVEL_BPM_BASE_URL)]),
        Pnc,
        Fixed("DEVEL - Error while trying to startBuilding with BpmBuildScheduler on new RHPAM server"),
    ),
    // Repository service connectivity
    rule(
        All(&[Build(CONNECT_TO_INDY), Build(CONNECTION_REFUSED)]),
        Indy,
        Fixed("INDY - Connection refused"),
    ),
    rule(
        All(&[Build(CONNECT_TO_INDY), Build(CONNECT_TIMED_OUT)]),
        Indy,
        Fixed("INDY - Connection timeout"),
    ),
    rule(
        Build(INDY_FAILED_TO_RESPOND),
        Indy,
        Fixed("INDY - Failed to respond"),
    ),
    rule(
        Build(INDY_GATEWAY_FAILED_TO_RESPOND),
        Indy,
        Fixed("INDY - Failed to respond"),
    ),
    rule(
        All(&[
            Build(COULD_NOT_GET),
            Build(INDY_HTTP_URL),
            Build(READ_TIMED_OUT_SPACED),
        ]),
        Indy,
        Fixed("INDY - Read timed out"),
    ),
    rule(
        All(&[
            Build(COULD_NOT_GET),
            Build(INDY_HTTPS_URL),
            Build(READ_TIMED_OUT_SPACED),
        ]),
        Indy,
        Fixed("INDY - Read timed out"),
    ),
];
