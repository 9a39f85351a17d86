//! Catalogue of known failure signatures
//!
//! Every signature is registered on every scanned log. The pattern text is
//! also the identifier used to query scan results, so rules refer to the
//! constants below.

use std::sync::{Arc, LazyLock};

use buildsift_logs::{LogScanResult, LogScanner, PatternSet};

// ============================================================================
// Regex signatures
// ============================================================================

pub const PAAS_HEALTHZ_READY: &str = "Exception trying to GET https://paas.*/healthz/ready";
pub const PAAS_SERVICE_CATALOG: &str =
    "Exception trying to GET https://paas.*/apis/servicecatalog.k8s.io/v1beta1";
pub const PAAS_CERTIFICATES: &str =
    "Unable to read endpoint https://paas.*//apis/certificates.k8s.io/v1beta1";
pub const PAAS_POST_BUILDERS: &str =
    "Exception trying to POST https://paas.*/v1/namespaces/newcastle-builders";
pub const PAAS_EXECUTE_BUILDERS: &str =
    "Unable to execute request to https://paas.*/v1/namespaces/newcastle-builders";
pub const REPOUR_ADJUST_503: &str = "Request to endpoint http://repour.*/adjust failed: HTTP/1.0 503";
pub const REPOUR_ADJUST_504: &str = "Request to endpoint http://repour.*/adjust failed: HTTP/1.0 504";
pub const DA_REST_FAILED: &str = "REST communication with http://da.*/da/rest/v-1 failed.";
pub const ORCH_UNKNOWN_HOST: &str = "java.net.UnknownHostException: orch.*";
pub const DA_FAILED_TO_RESPOND: &str = "da.*:80 failed to respond";
pub const REPOUR_ADJUST_500: &str = "Request to endpoint http://repour.*/adjust failed: HTTP/1.1 500";
pub const DEVEL_BPM_BASE_URL: &str =
    "bpmNewBaseUrl=https://devkieserver-newcastle-devel.*/services/rest/server/containers/";
pub const INDY_FAILED_TO_RESPOND: &str = "indy.*:80 failed to respond";
pub const INDY_GATEWAY_FAILED_TO_RESPOND: &str = "indy-gateway.*:443 failed to respond";
pub const USER_CANNOT_CREATE: &str = "User \".*\" cannot create";

pub const REGEX_SIGNATURES: &[&str] = &[
    PAAS_HEALTHZ_READY,
    PAAS_SERVICE_CATALOG,
    PAAS_CERTIFICATES,
    PAAS_POST_BUILDERS,
    PAAS_EXECUTE_BUILDERS,
    REPOUR_ADJUST_503,
    REPOUR_ADJUST_504,
    DA_REST_FAILED,
    ORCH_UNKNOWN_HOST,
    DA_FAILED_TO_RESPOND,
    REPOUR_ADJUST_500,
    DEVEL_BPM_BASE_URL,
    INDY_FAILED_TO_RESPOND,
    INDY_GATEWAY_FAILED_TO_RESPOND,
    USER_CANNOT_CREATE,
];

// ============================================================================
// Literal signatures
// ============================================================================

// Platform
pub const UNAUTHORIZED: &str = "Unauthorized to access resource";
pub const QUOTA_EXCEEDED: &str = "exceeded quota: newcastle-builders-quota";
pub const HEALTH_READY_CHECK_FAILED: &str =
    "Exception while trying to determine the health/ready response of the server";
pub const SERVICE_IP_ALLOCATION_FAILED: &str = "failed to allocate a serviceIP: etcdserver";
pub const ERR_IMAGE_PULL: &str = "Pod failed with status: ErrImagePull";
pub const SERVICE_NOT_READY_300S: &str = "Service was not ready in: 300 SECONDS";
pub const QUOTA_UPDATE_CONFLICT: &str =
    "Operation cannot be fulfilled on resourcequotas \"newcastle-builders-quota\"";
pub const CONDITION_TIMEOUT_300S: &str =
    "TimeoutException: Condition was not satisfied in: 300 SECONDS";
pub const CONDITION_TIMEOUT_600S: &str =
    "TimeoutException: Condition was not satisfied in: 600 SECONDS";
pub const OPENSHIFT_NOT_FOUND: &str = "com.openshift.restclient.NotFoundException: Not Found";
pub const REMOTE_CLIENT_CONNECT_FAILED: &str = "Failed to connect to remote client";
pub const NO_ROUTE_TO_HOST: &str = "No route to host";
pub const BUILD_SCRIPT_UPLOAD_FAILED: &str = "Could not upload build script";
pub const HOST_UNREACHABLE: &str = "No route to host (Host unreachable)";
pub const BROKEN_PIPE: &str = "Broken pipe (Write failed)";

// Alignment and repository setup
pub const REPOUR_SYSTEM_ERROR: &str = "Repour completed with system error";
pub const REPOSITORY_SETUP_FAILED: &str =
    "Failed to setup repository or repository group for this build";
pub const INDY_HOST_UNREACHABLE: &str = "Indy request failed: No route to host (Host unreachable)";
pub const BPM_START_FAILED: &str = "Error while trying to startBuilding with BpmBuildScheduler.";
pub const BUILD_AGENT_GONE: &str = "Build Agent has gone away";
pub const VERSIONS_NOT_OBTAINED: &str = "Failed to obtain versions";
pub const RESPONSE_STATUS_500: &str = "Received response status 500";
pub const READ_TIMED_OUT: &str = "Read timed out";
pub const GROUP_ID_NOT_FOUND: &str = "Could not find the groupId in the pom.xml";
pub const MANIPULATION_DISABLED: &str = "-Dmanipulation.disable=true";
pub const MANIPULATION_DISABLED_CAMEL: &str = "-DmanipulationDisable=true";
pub const NO_SUCH_FILE: &str = "No such file or directory";
pub const JSON_CONVERSION_FAILED: &str = "Could not convert object to JSON";
pub const INDY_CONNECT_FAILED: &str = "Indy request failed: Connect to indy";
pub const INTERNAL_SERVER_ERROR: &str = "Status: 500 Internal Server Error";
pub const PROMOTION_POST_FAILED: &str =
    "Error POSTING with PathsPromoteResult result from: promotion/paths/promote";
pub const EXISTENCE_CHECK_FAILED: &str = "Error checking existence of";
pub const PROMOTION_FAILED: &str = "RepositoryManagerException: Failed to promote";
pub const FAILED_TO_RESPOND: &str = "failed to respond";

// Build system internals
pub const VALIDATION_PROVIDER_MISSING: &str = "Add a provider like Hibernate Validator";
pub const AGENT_CLIENT_INIT_FAILED: &str =
    "Could not initialize class org.jboss.pnc.buildagent.client.BuildAgentSocketClient";
pub const IMPLEMENTATION_CLASS_MISSING: &str = "Could not find an implementation class";
pub const CONFLICTING_ARTIFACT: &str =
    "Trying to store success build with invalid repository manager result. Conflicting artifact";
pub const COMPLETION_CANCELLED: &str =
    "CompletionException: java.util.concurrent.CancellationException";
pub const INVALID_IMAGE_NAME: &str = "Throwable: Pod failed with status: InvalidImageName";
pub const BUILDER_POD_START_FAILED: &str = "The builder pod failed to start (this could be due to misconfigured or bogus scripts, or other unknown reasons)";

// Process engine
pub const CONNECTION_REFUSED_CAUSE: &str = "Caused by: java.net.ConnectException: Connection refused";
pub const UNEXPECTED_EOF: &str = "java.net.SocketException: Unexpected end of file from server";
pub const RESPONSE_CONTENT_UNREADABLE: &str = "Unable to retrieve content from response";
pub const NO_WORKFLOW_DEPLOYMENTS: &str =
    "No deployments available for com.redhat.maitai.ncl:ncl-workflows:";
pub const SOCKET_READ_TIMEOUT: &str = "java.net.SocketTimeoutException: Read timed out";
pub const HIBERNATE_CAUSE: &str = "Caused by: org.hibernate.HibernateException";
pub const GENERIC_JDBC: &str = "org.hibernate.exception.GenericJDBCException";
pub const BPM_CORE_START_FAILED: &str =
    "CoreException: Error while trying to startBuilding with BpmBuildScheduler";

// Repository service connectivity
pub const CONNECT_TO_INDY: &str = "Connect to indy";
pub const COULD_NOT_GET: &str = "Could not GET";
pub const INDY_HTTP_URL: &str = "http://indy";
pub const INDY_HTTPS_URL: &str = "https://indy";
pub const READ_TIMED_OUT_SPACED: &str = "Read timed out ";

// Build metadata
pub const FRONTEND_MAVEN_PLUGIN: &str = "--- frontend-maven-plugin";
pub const EXECUTION_ROOT_NAME_MALFORMED: &str =
    "EXECUTION_ROOT_NAME parameter has as value the wrong format";
pub const POM_FILE_OPTION: &str = "--file=";
pub const CONNECTION_REFUSED: &str = "failed: Connection refused";
pub const CONNECT_TIMED_OUT: &str = "failed: connect timed out";
pub const BREW_PULL_ACTIVE: &str = "-DbrewPullActive=true";

pub const LITERAL_SIGNATURES: &[&str] = &[
    UNAUTHORIZED,
    QUOTA_EXCEEDED,
    HEALTH_READY_CHECK_FAILED,
    SERVICE_IP_ALLOCATION_FAILED,
    ERR_IMAGE_PULL,
    SERVICE_NOT_READY_300S,
    QUOTA_UPDATE_CONFLICT,
    CONDITION_TIMEOUT_300S,
    CONDITION_TIMEOUT_600S,
    OPENSHIFT_NOT_FOUND,
    REMOTE_CLIENT_CONNECT_FAILED,
    NO_ROUTE_TO_HOST,
    BUILD_SCRIPT_UPLOAD_FAILED,
    HOST_UNREACHABLE,
    BROKEN_PIPE,
    REPOUR_SYSTEM_ERROR,
    REPOSITORY_SETUP_FAILED,
    INDY_HOST_UNREACHABLE,
    BPM_START_FAILED,
    BUILD_AGENT_GONE,
    VERSIONS_NOT_OBTAINED,
    RESPONSE_STATUS_500,
    READ_TIMED_OUT,
    GROUP_ID_NOT_FOUND,
    MANIPULATION_DISABLED,
    MANIPULATION_DISABLED_CAMEL,
    NO_SUCH_FILE,
    JSON_CONVERSION_FAILED,
    INDY_CONNECT_FAILED,
    INTERNAL_SERVER_ERROR,
    PROMOTION_POST_FAILED,
    EXISTENCE_CHECK_FAILED,
    PROMOTION_FAILED,
    FAILED_TO_RESPOND,
    VALIDATION_PROVIDER_MISSING,
    AGENT_CLIENT_INIT_FAILED,
    IMPLEMENTATION_CLASS_MISSING,
    CONFLICTING_ARTIFACT,
    COMPLETION_CANCELLED,
    INVALID_IMAGE_NAME,
    BUILDER_POD_START_FAILED,
    CONNECTION_REFUSED_CAUSE,
    UNEXPECTED_EOF,
    RESPONSE_CONTENT_UNREADABLE,
    NO_WORKFLOW_DEPLOYMENTS,
    SOCKET_READ_TIMEOUT,
    HIBERNATE_CAUSE,
    GENERIC_JDBC,
    BPM_CORE_START_FAILED,
    CONNECT_TO_INDY,
    COULD_NOT_GET,
    INDY_HTTP_URL,
    INDY_HTTPS_URL,
    READ_TIMED_OUT_SPACED,
    FRONTEND_MAVEN_PLUGIN,
    EXECUTION_ROOT_NAME_MALFORMED,
    POM_FILE_OPTION,
    CONNECTION_REFUSED,
    CONNECT_TIMED_OUT,
    BREW_PULL_ACTIVE,
];

static SIGNATURES: LazyLock<Arc<PatternSet>> = LazyLock::new(|| {
    let mut set = PatternSet::new();
    set.register_literals(LITERAL_SIGNATURES)
        .and_then(|()| set.register_regexes(REGEX_SIGNATURES))
        .unwrap_or_else(|e| panic!("built-in signature catalogue is invalid: {e}"));
    Arc::new(set)
});

/// The compiled signature catalogue, shared process-wide
pub fn signature_patterns() -> Arc<PatternSet> {
    Arc::clone(&SIGNATURES)
}

/// A scanner looking for every known signature
pub fn new_scanner(trim_limit: usize) -> LogScanner {
    LogScanner::with_patterns(signature_patterns(), trim_limit)
}

/// Scan result standing in for a log that was not read
pub fn unscanned_log() -> LogScanResult {
    LogScanResult::empty(signature_patterns())
}
