/// This is the helm release which is downloaded when no version is asked for.
pub const DEFAULT_HELM_VERSION: &str = "v3.18.4";

/// This is the Kubernetes API version passed to 'helm template' via '--api-versions' when
/// HELM3_API_VERSIONS is not set.
pub const DEFAULT_API_VERSIONS: &str = "1.18.0";

/// Comma separated list of helm versions to be exercised by `supported()`.
pub const HELM_VERSIONS_ENV: &str = "HELM3_VERSIONS";

/// Comma separated list of API versions to be passed to 'helm template'.
pub const HELM_API_VERSIONS_ENV: &str = "HELM3_API_VERSIONS";

/// This is the directory which downloaded helm binaries are written into.
pub const HELM_INSTALL_DIR: &str = ".helm/bin";

/// This is the base URL for helm release archives.
pub const HELM_DOWNLOAD_BASE_URL: &str = "https://get.helm.sh";

/// The number of times a failed download request is retried.
pub const DOWNLOAD_MAX_RETRIES: u32 = 3;

/// This is the name of the helm chart metadata file.
pub const CHART_METADATA_FILE: &str = "Chart.yaml";

/// This is the directory inside a chart which holds the chart's test values.
pub const CHART_TESTS_DIR: &str = "tests";

/// This is the field manager used for server-side apply of rendered chart objects.
pub const FIELD_MANAGER: &str = "helm-toolkit";

/// Placeholder printed in place of secret values, e.g. repository passwords.
pub const REDACTED: &str = "<redacted>";

/// Returns the path a downloaded helm binary of the given version is stored at.
pub fn helm_binary_path(version: &str) -> String {
    format!("{HELM_INSTALL_DIR}/helm-{version}")
}
