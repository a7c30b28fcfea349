use crate::common::{
    constants::CHART_METADATA_FILE,
    error::{ReadingFile, Result, U8VectorToString, YamlParseFromFile, YamlParseFromSlice},
};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use std::{collections::BTreeMap, fs::read, path::Path, str};

/// This struct is used to deserialize helm charts' Chart.yaml file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// This is the name of the helm chart.
    pub name: String,
    /// The chart API version, 'v2' for helm v3 charts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    /// This is the SemVer 2 version of the helm chart.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// A SemVer range of compatible Kubernetes versions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kube_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Either 'application' or 'library'.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    /// The URL of this project's home page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<String>,
    /// URLs to the source code of this project.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub maintainers: Vec<Maintainer>,
    /// A URL to an SVG or PNG image to be used as an icon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// The version of the app that this chart contains.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

/// A sub-chart listed in a chart's dependencies.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub name: String,
    /// A SemVer range of acceptable sub-chart versions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// The repository URL or alias, e.g. '@stable'.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// A yaml path that resolves to a boolean, used for enabling/disabling the sub-chart.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Values to import from the sub-chart into the parent chart.
    #[serde(
        default,
        rename = "import-values",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub import_values: Vec<serde_yaml::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

/// The maintainer of a chart.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Maintainer {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl TryFrom<&[u8]> for Metadata {
    type Error = crate::common::error::Error;

    fn try_from(buf: &[u8]) -> Result<Self, Self::Error> {
        serde_yaml::from_slice(buf).context(YamlParseFromSlice {
            input_yaml: str::from_utf8(buf).context(U8VectorToString)?.to_string(),
        })
    }
}

/// Reads and decodes the Chart.yaml in the chart directory.
pub fn load_metadata<P>(chart_dir: P) -> Result<Metadata>
where
    P: AsRef<Path>,
{
    let filepath = chart_dir.as_ref().join(CHART_METADATA_FILE);
    let buf = read(filepath.as_path()).context(ReadingFile {
        filepath: filepath.clone(),
    })?;

    serde_yaml::from_slice(buf.as_slice()).context(YamlParseFromFile { filepath })
}

#[cfg(test)]
mod tests {
    use super::{load_metadata, Metadata};
    use crate::common::error::Error;
    use std::fs;

    #[test]
    fn load_metadata_accepts_json() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("Chart.yaml"), r#"{"name": "chart-name"}"#).unwrap();

        let metadata = load_metadata(tmp.path()).unwrap();

        assert_eq!(metadata.name, "chart-name");
        assert_eq!(metadata.version, None);
    }

    #[test]
    fn load_metadata_reads_full_chart_yaml() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("Chart.yaml"),
            r#"apiVersion: v2
name: hello-world
description: A Helm chart for Kubernetes
type: application
version: 0.1.0
appVersion: "1.16.0"
kubeVersion: ">=1.18.0-0"
keywords: [demo]
maintainers:
  - name: charts team
    email: charts@example.com
dependencies:
  - name: redis
    version: 17.x.x
    repository: https://charts.bitnami.com/bitnami
    condition: redis.enabled
    import-values:
      - child: default.data
        parent: myimports
annotations:
  category: Demo
"#,
        )
        .unwrap();

        let metadata = load_metadata(tmp.path()).unwrap();

        assert_eq!(metadata.api_version.as_deref(), Some("v2"));
        assert_eq!(metadata.chart_type.as_deref(), Some("application"));
        assert_eq!(metadata.version.as_deref(), Some("0.1.0"));
        assert_eq!(metadata.app_version.as_deref(), Some("1.16.0"));
        assert_eq!(metadata.kube_version.as_deref(), Some(">=1.18.0-0"));
        assert_eq!(metadata.maintainers[0].email.as_deref(), Some("charts@example.com"));
        assert_eq!(metadata.dependencies[0].name, "redis");
        assert_eq!(
            metadata.dependencies[0].condition.as_deref(),
            Some("redis.enabled")
        );
        assert_eq!(metadata.dependencies[0].import_values.len(), 1);
        assert_eq!(metadata.annotations["category"], "Demo");
    }

    #[test]
    fn missing_chart_yaml_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_metadata(tmp.path()),
            Err(Error::ReadingFile { .. })
        ));
    }

    #[test]
    fn malformed_chart_yaml_is_an_error() {
        let buf: &[u8] = b"name: [unterminated";
        assert!(matches!(
            Metadata::try_from(buf),
            Err(Error::YamlParseFromSlice { .. })
        ));
    }
}
