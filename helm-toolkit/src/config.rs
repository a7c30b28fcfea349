use crate::{
    client::Helm3,
    common::{
        constants::{
            helm_binary_path, DEFAULT_API_VERSIONS, DEFAULT_HELM_VERSION, HELM_API_VERSIONS_ENV,
            HELM_VERSIONS_ENV,
        },
        error::Result,
    },
    download::download,
};
use futures::{stream, Stream, StreamExt};
use tracing::warn;

/// Returns the value of an environment variable, or the default if the variable is unset. A
/// variable which is set to an empty string is not replaced by the default.
fn env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',').map(ToString::to_string).collect()
}

/// Settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// The helm versions exercised by `supported()`.
    pub helm_versions: Vec<String>,
    /// The Kubernetes API versions passed to 'helm template'.
    pub api_versions: Vec<String>,
}

impl Settings {
    /// Reads HELM3_VERSIONS and HELM3_API_VERSIONS.
    pub fn from_env() -> Self {
        Self {
            helm_versions: split_list(&env_or_default(HELM_VERSIONS_ENV, DEFAULT_HELM_VERSION)),
            api_versions: split_list(&env_or_default(
                HELM_API_VERSIONS_ENV,
                DEFAULT_API_VERSIONS,
            )),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            helm_versions: split_list(DEFAULT_HELM_VERSION),
            api_versions: split_list(DEFAULT_API_VERSIONS),
        }
    }
}

/// Downloads the given helm version to its install location and returns a client for it.
pub async fn helm_version(version: &str, api_versions: &[String]) -> Result<Helm3> {
    let path = helm_binary_path(version);
    download(version, path.as_str()).await?;
    Ok(Helm3::builder()
        .with_path(path)
        .with_api_versions(api_versions)
        .build())
}

/// Downloads the default helm version and returns a client for it.
pub async fn default_helm() -> Result<Helm3> {
    let settings = Settings::from_env();
    helm_version(DEFAULT_HELM_VERSION, settings.api_versions.as_slice()).await
}

/// Yields a client for each of the helm versions listed in HELM3_VERSIONS. Versions which fail to
/// download are skipped.
pub fn supported() -> impl Stream<Item = Helm3> {
    supported_with(Settings::from_env())
}

/// Yields a client for each of the helm versions in the settings. Versions which fail to download
/// are skipped.
pub fn supported_with(settings: Settings) -> impl Stream<Item = Helm3> {
    let api_versions = settings.api_versions;
    stream::iter(settings.helm_versions).filter_map(move |version| {
        let api_versions = api_versions.clone();
        async move {
            match helm_version(version.as_str(), api_versions.as_slice()).await {
                Ok(helm) => Some(helm),
                Err(error) => {
                    warn!(%version, %error, "Skipping helm version which failed to download");
                    None
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{env_or_default, split_list, supported_with, Settings};
    use futures::StreamExt;

    #[test]
    fn lists_are_comma_separated() {
        assert_eq!(split_list("v3.17.0,v3.18.4"), ["v3.17.0", "v3.18.4"]);
        assert_eq!(split_list("1.18.0"), ["1.18.0"]);
    }

    #[test]
    fn defaults_are_pinned() {
        let settings = Settings::default();
        assert_eq!(settings.helm_versions, ["v3.18.4"]);
        assert_eq!(settings.api_versions, ["1.18.0"]);
    }

    #[tokio::test]
    async fn empty_version_list_yields_nothing() {
        let settings = Settings {
            helm_versions: vec![],
            api_versions: vec![],
        };
        let found: Vec<_> = supported_with(settings).collect().await;
        assert!(found.is_empty());
    }

    #[test]
    fn empty_env_var_overrides_default() {
        // Not read by any other test.
        let key = "HELM_TOOLKIT_CONFIG_TEST_EMPTY";
        std::env::set_var(key, "");
        assert_eq!(split_list(&env_or_default(key, "1.18.0")), [""]);
        std::env::remove_var(key);
        assert_eq!(split_list(&env_or_default(key, "1.18.0")), ["1.18.0"]);
    }

    #[tokio::test]
    async fn failed_downloads_are_skipped() {
        let settings = Settings {
            helm_versions: vec!["v0.0.0-does-not-exist".to_string()],
            api_versions: vec![],
        };
        let found: Vec<_> = supported_with(settings).collect().await;
        assert!(found.is_empty());
    }

    #[tokio::test]
    #[ignore = "requires network access to get.helm.sh"]
    async fn supported_versions_render_charts() {
        use crate::client::Helm;

        let rendered_chart = "---
# Source: test-chart/templates/test-namespace.yaml
apiVersion: v1
kind: Namespace
metadata:
  name: release
  labels:
    name: release
";
        let chart = concat!(env!("CARGO_MANIFEST_DIR"), "/test-data/chart/test-chart");
        let helms: Vec<_> = super::supported().collect().await;
        assert!(!helms.is_empty());
        for helm in helms {
            let output = helm.template("namespace", "release", chart, &[]).unwrap();
            assert_eq!(String::from_utf8(output).unwrap(), rendered_chart);
            assert!(!helm.version().unwrap().is_empty());
        }
    }
}
