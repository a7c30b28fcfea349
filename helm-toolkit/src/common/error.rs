use snafu::Snafu;
use std::{path::PathBuf, process::ExitStatus};

/// For use with multiple fallible operations which may fail for different reasons, but are
/// defined within the same scope and must return to the outer scope (calling scope) using
/// the try operator -- '?'.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
#[snafu(context(suffix(false)))]
pub enum Error {
    /// Error for when a helm process could not be spawned.
    #[snafu(display(
        "Failed to run Helm command,\ncommand: {},\nargs: {:?},\ncommand_error: {}",
        command,
        args,
        source
    ))]
    HelmCommand {
        source: std::io::Error,
        command: String,
        args: Vec<String>,
    },

    /// Error for when a helm process exits with a non-zero status.
    #[snafu(display(
        "Helm command failed,\ncommand: {},\nargs: {:?},\nstatus: {}",
        command,
        args,
        status
    ))]
    HelmCommandStatus {
        command: String,
        args: Vec<String>,
        status: ExitStatus,
    },

    /// Error for when a byte slice could not be converted to a UTF-8 string.
    #[snafu(display("Failed to convert byte slice to UTF-8 string: {}", source))]
    U8VectorToString { source: std::str::Utf8Error },

    /// Error for when the current platform has no matching helm release archive.
    #[snafu(display("No helm release is published for platform {}/{}", os, arch))]
    UnsupportedPlatform { os: String, arch: String },

    /// Error for when an HTTP request could not be completed.
    #[snafu(display("Failed to GET {}: {}", url, source))]
    HttpRequest {
        source: reqwest_middleware::Error,
        url: String,
    },

    /// Error for when an HTTP response carries a non-success status.
    #[snafu(display("Unexpected response from {}: {}", url, source))]
    HttpStatus { source: reqwest::Error, url: String },

    /// Error for when an HTTP response body could not be read.
    #[snafu(display("Failed to read response body from {}: {}", url, source))]
    HttpBody { source: reqwest::Error, url: String },

    /// Error for when a helm release archive could not be read.
    #[snafu(display("Failed to read helm release archive: {}", source))]
    ReadArchive { source: std::io::Error },

    /// Error for when a helm release archive does not contain a helm binary.
    #[snafu(display("Unable to find helm binary in release archive"))]
    HelmBinaryNotFound,

    /// Error for when a directory could not be created.
    #[snafu(display("Failed to create directory {}: {}", path.display(), source))]
    CreateDirectory {
        source: std::io::Error,
        path: PathBuf,
    },

    /// Error for when a file could not be created or written to.
    #[snafu(display("Failed to write file {}: {}", filepath.display(), source))]
    WriteFile {
        source: std::io::Error,
        filepath: PathBuf,
    },

    /// Error for when a file could not be read.
    #[snafu(display("Failed to read file {}: {}", filepath.display(), source))]
    ReadingFile {
        source: std::io::Error,
        filepath: PathBuf,
    },

    /// Error for when the contents of a directory could not be listed.
    #[snafu(display("Failed to read contents of directory {}: {}", path.display(), source))]
    ReadingDirectoryContents {
        source: std::io::Error,
        path: PathBuf,
    },

    /// Error for when yaml could not be parsed from a file.
    #[snafu(display("Failed to parse YAML at {}: {}", filepath.display(), source))]
    YamlParseFromFile {
        source: serde_yaml::Error,
        filepath: PathBuf,
    },

    /// Error for when yaml could not be parsed from a slice.
    #[snafu(display("Failed to parse YAML {}: {}", input_yaml, source))]
    YamlParseFromSlice {
        source: serde_yaml::Error,
        input_yaml: String,
    },

    /// Error for when output could not be written to stdout.
    #[snafu(display("Failed to write to stdout: {}", source))]
    WriteStdout { source: std::io::Error },

    /// Error for when a value could not be serialized to JSON.
    #[snafu(display("Failed to serialize to JSON: {}", source))]
    JsonSerialize { source: serde_json::Error },

    /// Error for when a rendered YAML document is not a Kubernetes object.
    #[snafu(display("Failed to parse Kubernetes object from YAML document: {}", source))]
    ParseKubernetesObject { source: serde_yaml::Error },

    /// Error for when a Kubernetes object has no apiVersion or kind.
    #[snafu(display("Kubernetes object {} has no apiVersion/kind", name))]
    MissingTypeMeta { name: String },

    /// Error for when a Kubernetes object has no .metadata.name.
    #[snafu(display("Kubernetes object of kind {} has no .metadata.name", kind))]
    MissingObjectName { kind: String },

    /// Error for when Kubernetes API client generation fails.
    #[snafu(display("Failed to generate kubernetes client: {}", source))]
    K8sClientGeneration { source: kube_client::Error },

    /// Error for when the API resource for a group/version/kind could not be discovered.
    #[snafu(display(
        "Failed to discover API resource for {} {}: {}",
        api_version,
        kind,
        source
    ))]
    ResourceDiscovery {
        source: kube::Error,
        api_version: String,
        kind: String,
    },

    /// Error for when a server-side apply of a Kubernetes object fails.
    #[snafu(display("Failed to apply {} '{}': {}", kind, name, source))]
    ApplyObject {
        source: kube::Error,
        kind: String,
        name: String,
    },
}

/// A wrapper type to remove repeated Result<T, Error> returns.
pub type Result<T, E = Error> = std::result::Result<T, E>;
