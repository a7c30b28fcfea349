use crate::opts::{CliArgs, Operation};
use clap::Parser;
use futures::StreamExt;
use helm_toolkit::{
    client::{Helm, Helm3},
    common::{
        constants::helm_binary_path,
        error::{JsonSerialize, Result, WriteStdout},
    },
    config::{helm_version, supported_with, Settings},
    discover_chart_dirs, discover_chart_tests, download, load_metadata, Flag,
    DEFAULT_HELM_VERSION,
};
use snafu::ResultExt;
use std::io::{self, Write};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod opts;
mod output;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let opts = CliArgs::parse();
    run(opts.operation()).await.map_err(|error| {
        error!(%error, "helm-toolkit failed");
        error
    })
}

/// Initialize logging components -- tracing. Logs go to stderr, to keep rendered charts on stdout
/// clean.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

async fn run(operation: &Operation) -> Result<()> {
    match operation {
        Operation::Download { version, dest } => {
            let dest = dest
                .clone()
                .unwrap_or_else(|| helm_binary_path(version).into());
            download(version, dest.as_path()).await?;
            output::entry("helm", dest.to_string_lossy().as_ref());
        }
        Operation::Charts { root } => {
            for chart_dir in discover_chart_dirs(root) {
                match load_metadata(chart_dir.as_path()) {
                    Ok(metadata) => output::entry(
                        chart_dir.to_string_lossy().as_ref(),
                        format!(
                            "{} {}",
                            metadata.name,
                            metadata.version.unwrap_or_default()
                        )
                        .as_str(),
                    ),
                    Err(error) => output::warn(
                        format!("Invalid chart {}", chart_dir.display()).as_str(),
                        error.to_string().as_str(),
                    ),
                }
            }
        }
        Operation::Tests { chart } => {
            for test in discover_chart_tests(chart)? {
                println!("{}", test.display());
            }
        }
        Operation::Metadata { chart, json: true } => {
            let metadata = load_metadata(chart)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&metadata).context(JsonSerialize)?
            );
        }
        Operation::Metadata { chart, json: false } => {
            let metadata = load_metadata(chart)?;
            output::entry("name", metadata.name.as_str());
            for (label, value) in [
                ("version", metadata.version.as_deref()),
                ("appVersion", metadata.app_version.as_deref()),
                ("apiVersion", metadata.api_version.as_deref()),
                ("type", metadata.chart_type.as_deref()),
                ("description", metadata.description.as_deref()),
            ] {
                if let Some(value) = value {
                    output::entry(label, value);
                }
            }
            for dependency in metadata.dependencies.iter() {
                output::entry(
                    "dependency",
                    format!(
                        "{} {}",
                        dependency.name,
                        dependency.version.as_deref().unwrap_or("*")
                    )
                    .as_str(),
                );
            }
        }
        Operation::Template {
            namespace,
            release_name,
            chart,
            values,
            set,
            include_crds,
            api_versions,
            helm,
        } => {
            let helm = match helm {
                Some(path) => Helm3::builder()
                    .with_path(path)
                    .with_api_versions(api_versions)
                    .build(),
                None => helm_version(DEFAULT_HELM_VERSION, api_versions).await?,
            };

            let mut flags: Vec<Flag> = values.iter().map(Flag::values).collect();
            flags.extend(set.iter().map(|(key, value)| Flag::set(key, value)));
            if *include_crds {
                flags.push(Flag::include_crds());
            }

            let rendered = helm.template(namespace, release_name, chart, flags.as_slice())?;
            write_output(std::io::stdout().lock(), rendered.as_slice())?;
        }
        Operation::Supported {
            helm_versions,
            api_versions,
        } => {
            let settings = Settings {
                helm_versions: helm_versions.clone(),
                api_versions: api_versions.clone(),
            };
            let mut helms = Box::pin(supported_with(settings));
            let mut found = 0;
            while let Some(helm) = helms.next().await {
                match helm.version() {
                    Ok(version) => {
                        found += 1;
                        info!(path = %helm.path().display(), %version, "Helm version is usable");
                        output::entry(version.as_str(), helm.path().to_string_lossy().as_ref());
                    }
                    Err(error) => output::warn(
                        format!("Unusable helm binary {}", helm.path().display()).as_str(),
                        error.to_string().as_str(),
                    ),
                }
            }
            if found == 0 {
                output::warn("No usable helm version", helm_versions.join(",").as_str());
            } else {
                output::info(format!("{found} usable helm version(s)").as_str());
            }
        }
    }
    Ok(())
}

/// Writes the output and flushes it. A closed reader, e.g. 'head', is not an error.
fn write_output<W>(mut writer: W, output: &[u8]) -> Result<()>
where
    W: Write,
{
    match writer.write_all(output).and_then(|_| writer.flush()) {
        Err(error) if error.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        result => result.context(WriteStdout),
    }
}

#[cfg(test)]
mod tests {
    use super::write_output;
    use helm_toolkit::Error;
    use std::io::{self, Write};

    /// A writer which fails every write with the given error kind.
    struct FailingWriter(io::ErrorKind);

    impl Write for FailingWriter {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(self.0))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn output_is_written() {
        let mut buffer = Vec::new();
        write_output(&mut buffer, b"kind: Namespace\n").unwrap();
        assert_eq!(buffer, b"kind: Namespace\n");
    }

    #[test]
    fn closed_pipe_is_not_an_error() {
        assert!(write_output(FailingWriter(io::ErrorKind::BrokenPipe), b"output").is_ok());
    }

    #[test]
    fn write_failure_is_an_error() {
        let result = write_output(FailingWriter(io::ErrorKind::Other), b"output");
        assert!(matches!(result, Err(Error::WriteStdout { .. })));
    }
}
