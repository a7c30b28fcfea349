use clap::{Parser, Subcommand};
use helm_toolkit::common::constants::{
    DEFAULT_API_VERSIONS, DEFAULT_HELM_VERSION, HELM_API_VERSIONS_ENV, HELM_VERSIONS_ENV,
};
use std::path::PathBuf;

/// These are the supported cli configuration options.
#[derive(Parser)]
#[command(
    name = "helm-toolkit",
    version,
    about = "Downloads helm, and inspects and renders charts"
)]
pub(crate) struct CliArgs {
    #[command(subcommand)]
    operation: Operation,
}

impl CliArgs {
    /// This returns the requested operation.
    pub(crate) fn operation(&self) -> &Operation {
        &self.operation
    }
}

/// The operations this binary can perform.
#[derive(Subcommand)]
pub(crate) enum Operation {
    /// Downloads a helm release binary.
    Download {
        /// The helm release to download.
        #[arg(long, default_value = DEFAULT_HELM_VERSION)]
        version: String,

        /// Where to write the binary. Defaults to .helm/bin/helm-<version>.
        #[arg(long, value_name = "FILE_PATH")]
        dest: Option<PathBuf>,
    },

    /// Lists the helm charts found below a directory.
    Charts {
        /// The directory to search.
        #[arg(default_value = ".", value_name = "DIR_PATH")]
        root: PathBuf,
    },

    /// Lists the test values files of a helm chart.
    Tests {
        /// The chart directory.
        #[arg(value_name = "DIR_PATH")]
        chart: PathBuf,
    },

    /// Prints the Chart.yaml metadata of a helm chart.
    Metadata {
        /// The chart directory.
        #[arg(value_name = "DIR_PATH")]
        chart: PathBuf,

        /// Print the full metadata as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Renders a helm chart.
    Template {
        /// This is the Kubernetes Namespace the chart is rendered for.
        #[arg(short, long, default_value = "default")]
        namespace: String,

        /// This is the release name the chart is rendered with.
        #[arg(long, default_value = "release-name")]
        release_name: String,

        /// A chart directory, packaged chart or <repo>/<chart> reference.
        chart: String,

        /// Values files, in order of increasing precedence.
        #[arg(short = 'f', long = "values", value_name = "FILE_PATH")]
        values: Vec<PathBuf>,

        /// Values in key=value form, passed on to 'helm --set'.
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        set: Vec<(String, String)>,

        /// Also render the chart's CustomResourceDefinitions.
        #[arg(long, default_value_t = false)]
        include_crds: bool,

        /// Kubernetes API versions made available to the chart's templates.
        #[arg(
            long,
            env = HELM_API_VERSIONS_ENV,
            value_delimiter = ',',
            default_value = DEFAULT_API_VERSIONS
        )]
        api_versions: Vec<String>,

        /// Use this helm binary instead of downloading one.
        #[arg(long, value_name = "FILE_PATH")]
        helm: Option<PathBuf>,
    },

    /// Downloads each of the supported helm versions and prints the versions which work.
    Supported {
        /// The helm releases to try.
        #[arg(
            long,
            env = HELM_VERSIONS_ENV,
            value_delimiter = ',',
            default_value = DEFAULT_HELM_VERSION
        )]
        helm_versions: Vec<String>,

        /// Kubernetes API versions made available to chart templates.
        #[arg(
            long,
            env = HELM_API_VERSIONS_ENV,
            value_delimiter = ',',
            default_value = DEFAULT_API_VERSIONS
        )]
        api_versions: Vec<String>,
    },
}

/// Splits a KEY=VALUE argument on its first '='.
fn parse_key_value(arg: &str) -> Result<(String, String), String> {
    arg.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, found '{arg}'"))
}
