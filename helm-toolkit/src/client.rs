use crate::{
    common::error::{HelmCommand, HelmCommandStatus, Result, U8VectorToString},
    flag::Flag,
    vec_to_strings,
};
use snafu::{ensure, ResultExt};
use std::{
    path::{Path, PathBuf},
    process::{Command, Stdio},
    str,
};
use tracing::debug;

/// Operations on charts and releases, executed by a helm binary.
pub trait Helm: Send + Sync {
    /// Runs `helm template <release> <chart> --namespace <namespace>` and returns the rendered
    /// manifests.
    fn template(&self, namespace: &str, release: &str, chart: &str, flags: &[Flag])
        -> Result<Vec<u8>>;

    /// Runs `helm install <release> <chart> --namespace <namespace>`.
    fn install(&self, namespace: &str, release: &str, chart: &str, flags: &[Flag]) -> Result<()>;

    /// Runs `helm upgrade <release> <chart> --namespace <namespace>`.
    fn update(&self, namespace: &str, release: &str, chart: &str, flags: &[Flag]) -> Result<()>;

    /// Runs `helm package <chart>`.
    fn package(&self, chart: &str, flags: &[Flag]) -> Result<()>;

    /// Runs `helm dependency update <chart>`.
    fn update_deps(&self, chart: &str) -> Result<()>;

    /// Runs `helm test <release> --namespace <namespace>`.
    fn test(&self, namespace: &str, release: &str) -> Result<()>;

    /// Runs `helm delete <release> --namespace <namespace>`.
    fn delete(&self, namespace: &str, release: &str) -> Result<()>;

    /// Prepares helm for use. Helm v3 has nothing to set up.
    fn init(&self) -> Result<()>;

    /// Runs `helm repo add <name> <url>`.
    fn repo_add(&self, name: &str, url: &str, flags: &[Flag]) -> Result<()>;

    /// Runs `helm repo update`.
    fn repo_update(&self) -> Result<()>;

    /// Returns the version of the helm binary, e.g. 'v3.18.4'.
    fn version(&self) -> Result<String>;
}

/// Argument list for a single helm invocation. A redacted copy is kept alongside the real
/// arguments for use in logs and errors.
#[derive(Debug, Default, Clone)]
struct HelmArgs {
    args: Vec<String>,
    redacted: Vec<String>,
}

impl HelmArgs {
    fn new(global_flags: &[String]) -> Self {
        Self {
            args: global_flags.to_vec(),
            redacted: global_flags.to_vec(),
        }
    }

    fn with_args(mut self, args: Vec<String>) -> Self {
        self.redacted.extend(args.iter().cloned());
        self.args.extend(args);
        self
    }

    fn with_flags(mut self, flags: &[Flag]) -> Self {
        for flag in flags {
            self.args.extend(flag.args().iter().cloned());
            self.redacted.extend(flag.redacted_args());
        }
        self
    }
}

/// This is a builder for Helm3.
#[derive(Default)]
pub struct Helm3Builder {
    path: Option<PathBuf>,
    api_versions: Vec<String>,
    global_flags: Vec<String>,
}

impl Helm3Builder {
    /// This is a builder option to set the path to the helm binary. Defaults to 'helm', which is
    /// looked up in $PATH.
    #[must_use]
    pub fn with_path<P>(mut self, path: P) -> Self
    where
        P: AsRef<Path>,
    {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// This is a builder option to add the Kubernetes API versions passed to 'helm template'.
    #[must_use]
    pub fn with_api_versions<I, S>(mut self, api_versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.api_versions
            .extend(api_versions.into_iter().map(|v| v.to_string()));
        self
    }

    /// This is a builder option to add arguments which precede the subcommand of every helm
    /// invocation, e.g. '--kube-context'.
    #[must_use]
    pub fn with_global_flags<I, S>(mut self, global_flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.global_flags
            .extend(global_flags.into_iter().map(|f| f.to_string()));
        self
    }

    /// Build the Helm3 client.
    pub fn build(self) -> Helm3 {
        Helm3 {
            path: self.path.unwrap_or_else(|| PathBuf::from("helm")),
            api_versions: self.api_versions,
            global_flags: self.global_flags,
        }
    }
}

/// This type executes helm v3 commands using a helm binary.
#[derive(Debug, Clone)]
pub struct Helm3 {
    path: PathBuf,
    api_versions: Vec<String>,
    global_flags: Vec<String>,
}

impl Helm3 {
    /// This creates an empty builder.
    pub fn builder() -> Helm3Builder {
        Helm3Builder::default()
    }

    /// The path to the helm binary.
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// The Kubernetes API versions passed to 'helm template'.
    pub fn api_versions(&self) -> &[String] {
        self.api_versions.as_slice()
    }

    fn args(&self) -> HelmArgs {
        HelmArgs::new(self.global_flags.as_slice())
    }

    fn command(&self, args: &HelmArgs) -> Command {
        debug!(command = %self.path.display(), args = ?args.redacted, "Helm command");
        let mut command = Command::new(self.path.as_path());
        command.args(args.args.as_slice());
        command
    }

    /// Runs helm with stdout captured. Stderr is passed through.
    fn output(&self, args: HelmArgs) -> Result<Vec<u8>> {
        let output = self
            .command(&args)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .context(HelmCommand {
                command: self.path.to_string_lossy().to_string(),
                args: args.redacted.clone(),
            })?;

        ensure!(
            output.status.success(),
            HelmCommandStatus {
                command: self.path.to_string_lossy().to_string(),
                args: args.redacted,
                status: output.status,
            }
        );

        Ok(output.stdout)
    }

    /// Runs helm with stdout and stderr passed through.
    fn run(&self, args: HelmArgs) -> Result<()> {
        let status = self
            .command(&args)
            .stdin(Stdio::null())
            .status()
            .context(HelmCommand {
                command: self.path.to_string_lossy().to_string(),
                args: args.redacted.clone(),
            })?;

        ensure!(
            status.success(),
            HelmCommandStatus {
                command: self.path.to_string_lossy().to_string(),
                args: args.redacted,
                status,
            }
        );

        Ok(())
    }

    fn template_args(
        &self,
        namespace: &str,
        release: &str,
        chart: &str,
        flags: &[Flag],
    ) -> HelmArgs {
        let mut args = self
            .args()
            .with_args(vec_to_strings![
                "template",
                release,
                chart,
                "--namespace",
                namespace
            ])
            .with_flags(flags);
        for api_version in self.api_versions.iter() {
            args = args.with_args(vec_to_strings!["--api-versions", api_version]);
        }
        args
    }

    fn release_args(
        &self,
        subcommand: &str,
        namespace: &str,
        release: &str,
        chart: &str,
        flags: &[Flag],
    ) -> HelmArgs {
        self.args()
            .with_args(vec_to_strings![
                subcommand,
                release,
                chart,
                "--namespace",
                namespace
            ])
            .with_flags(flags)
    }
}

impl Helm for Helm3 {
    fn template(
        &self,
        namespace: &str,
        release: &str,
        chart: &str,
        flags: &[Flag],
    ) -> Result<Vec<u8>> {
        self.output(self.template_args(namespace, release, chart, flags))
    }

    fn install(&self, namespace: &str, release: &str, chart: &str, flags: &[Flag]) -> Result<()> {
        self.run(self.release_args("install", namespace, release, chart, flags))
    }

    fn update(&self, namespace: &str, release: &str, chart: &str, flags: &[Flag]) -> Result<()> {
        self.run(self.release_args("upgrade", namespace, release, chart, flags))
    }

    fn package(&self, chart: &str, flags: &[Flag]) -> Result<()> {
        self.run(
            self.args()
                .with_args(vec_to_strings!["package", chart])
                .with_flags(flags),
        )
    }

    fn update_deps(&self, chart: &str) -> Result<()> {
        self.run(
            self.args()
                .with_args(vec_to_strings!["dependency", "update", chart]),
        )
    }

    fn test(&self, namespace: &str, release: &str) -> Result<()> {
        self.run(self.args().with_args(vec_to_strings![
            "test",
            release,
            "--namespace",
            namespace
        ]))
    }

    fn delete(&self, namespace: &str, release: &str) -> Result<()> {
        self.run(self.args().with_args(vec_to_strings![
            "delete",
            release,
            "--namespace",
            namespace
        ]))
    }

    fn init(&self) -> Result<()> {
        Ok(())
    }

    fn repo_add(&self, name: &str, url: &str, flags: &[Flag]) -> Result<()> {
        self.run(
            self.args()
                .with_args(vec_to_strings!["repo", "add", name, url])
                .with_flags(flags),
        )
    }

    fn repo_update(&self) -> Result<()> {
        self.run(self.args().with_args(vec_to_strings!["repo", "update"]))
    }

    fn version(&self) -> Result<String> {
        let stdout = self.output(self.args().with_args(vec_to_strings![
            "version",
            "--template",
            "{{.Version}}"
        ]))?;
        let version = str::from_utf8(stdout.as_slice()).context(U8VectorToString)?;
        Ok(version.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{Helm, Helm3};
    use crate::{common::error::Error, flag::Flag};

    fn helm3() -> Helm3 {
        Helm3::builder()
            .with_path("helm")
            .with_api_versions(["1.18.0", "2.0.0"])
            .with_global_flags(["--kube-context", "kind"])
            .build()
    }

    #[test]
    fn template_args_end_with_api_versions() {
        let args = helm3().template_args(
            "my-namespace",
            "my-release",
            "./chart",
            &[Flag::include_crds(), Flag::values("values.yaml")],
        );
        assert_eq!(
            args.args,
            [
                "--kube-context",
                "kind",
                "template",
                "my-release",
                "./chart",
                "--namespace",
                "my-namespace",
                "--include-crds",
                "--values",
                "values.yaml",
                "--api-versions",
                "1.18.0",
                "--api-versions",
                "2.0.0"
            ]
        );
    }

    #[test]
    fn upgrade_args_do_not_carry_api_versions() {
        let args = helm3().release_args(
            "upgrade",
            "ns",
            "release",
            "repo/chart",
            &[Flag::upgrade_install(), Flag::version("1.0.0")],
        );
        assert_eq!(
            args.args,
            [
                "--kube-context",
                "kind",
                "upgrade",
                "release",
                "repo/chart",
                "--namespace",
                "ns",
                "--install",
                "--version",
                "1.0.0"
            ]
        );
    }

    #[test]
    fn builder_defaults_to_helm_in_path() {
        let helm = Helm3::builder().build();
        assert_eq!(helm.path().to_str(), Some("helm"));
        assert!(helm.api_versions().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn template_captures_stdout() {
        let helm = Helm3::builder()
            .with_path("echo")
            .with_api_versions(["1.18.0"])
            .build();
        let stdout = helm
            .template("ns", "release", "chart", &[Flag::debug()])
            .expect("echo should succeed");
        assert_eq!(
            String::from_utf8(stdout).unwrap(),
            "template release chart --namespace ns --debug --api-versions 1.18.0\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn version_is_trimmed() {
        let helm = Helm3::builder().with_path("echo").build();
        assert_eq!(
            helm.version().unwrap(),
            "version --template {{.Version}}"
        );
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_status_is_an_error() {
        let helm = Helm3::builder().with_path("false").build();
        match helm.repo_update() {
            Err(Error::HelmCommandStatus { args, status, .. }) => {
                assert_eq!(args, ["repo", "update"]);
                assert!(!status.success());
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(Helm3::builder().with_path("true").build().repo_update().is_ok());
    }

    #[test]
    fn missing_binary_is_an_error() {
        let helm = Helm3::builder()
            .with_path("/nonexistent/helm-toolkit/helm")
            .build();
        assert!(matches!(helm.init(), Ok(())));
        assert!(matches!(
            helm.delete("ns", "release"),
            Err(Error::HelmCommand { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn password_is_redacted_in_errors() {
        let helm = Helm3::builder().with_path("false").build();
        let error = helm
            .repo_add(
                "private",
                "https://charts.example.com",
                &[Flag::repo_username("bob"), Flag::repo_password("s3cr3t")],
            )
            .unwrap_err();
        let message = error.to_string();
        assert!(message.contains("<redacted>"));
        assert!(!message.contains("s3cr3t"));
    }
}
