use crate::common::{
    constants::{DOWNLOAD_MAX_RETRIES, HELM_DOWNLOAD_BASE_URL},
    error::{
        CreateDirectory, HelmBinaryNotFound, HttpBody, HttpRequest, HttpStatus, ReadArchive,
        Result, UnsupportedPlatform, WriteFile,
    },
};
use flate2::read::GzDecoder;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use snafu::ResultExt;
use std::{
    fs::{self, OpenOptions},
    io::{self, Read},
    path::Path,
};
use tar::{Archive, EntryType};
use tracing::{debug, info};

/// Returns the operating system and architecture names helm uses for its release archives.
pub fn platform() -> Result<(&'static str, &'static str)> {
    platform_for(std::env::consts::OS, std::env::consts::ARCH)
}

fn platform_for(os: &str, arch: &str) -> Result<(&'static str, &'static str)> {
    platform_for_endian(os, arch, cfg!(target_endian = "little"))
}

/// Helm only publishes little-endian powerpc64 releases.
fn platform_for_endian(
    os: &str,
    arch: &str,
    little_endian: bool,
) -> Result<(&'static str, &'static str)> {
    let helm_os = match os {
        "linux" => "linux",
        "macos" => "darwin",
        "windows" => "windows",
        _ => {
            return UnsupportedPlatform { os, arch }.fail();
        }
    };
    let helm_arch = match arch {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        "arm" => "arm",
        "powerpc64" if little_endian => "ppc64le",
        "s390x" => "s390x",
        "riscv64" => "riscv64",
        _ => {
            return UnsupportedPlatform { os, arch }.fail();
        }
    };
    Ok((helm_os, helm_arch))
}

/// Returns the URL of the helm release archive for the given version and the current platform.
pub fn release_url(version: &str) -> Result<String> {
    let (os, arch) = platform()?;
    Ok(format!(
        "{HELM_DOWNLOAD_BASE_URL}/helm-{version}-{os}-{arch}.tar.gz"
    ))
}

/// Creates an HTTP client which retries transient failures with increasing intervals between
/// attempts.
fn http_client() -> ClientWithMiddleware {
    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(DOWNLOAD_MAX_RETRIES);
    ClientBuilder::new(reqwest::Client::new())
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build()
}

/// Downloads the helm release archive of the given version and writes the helm binary it
/// contains to `dest`.
pub async fn download<P>(version: &str, dest: P) -> Result<()>
where
    P: AsRef<Path>,
{
    let url = release_url(version)?;
    info!(%url, dest = %dest.as_ref().display(), "Downloading helm");

    let response = http_client()
        .get(url.as_str())
        .send()
        .await
        .context(HttpRequest { url: url.clone() })?
        .error_for_status()
        .context(HttpStatus { url: url.clone() })?;
    let body = response.bytes().await.context(HttpBody { url })?;
    debug!(bytes = body.len(), "Downloaded helm release archive");

    extract_helm_binary(body.as_ref(), dest)
}

/// Walks a gzip'd tar stream and writes the first regular file named 'helm' to `dest`, with the
/// permissions recorded in the archive.
pub fn extract_helm_binary<R, P>(reader: R, dest: P) -> Result<()>
where
    R: Read,
    P: AsRef<Path>,
{
    let dest = dest.as_ref();
    let mut archive = Archive::new(GzDecoder::new(reader));

    for entry in archive.entries().context(ReadArchive)? {
        let mut entry = entry.context(ReadArchive)?;
        if entry.header().entry_type() != EntryType::Regular {
            continue;
        }
        let is_helm = entry
            .path()
            .context(ReadArchive)?
            .to_string_lossy()
            .ends_with("/helm");
        if !is_helm {
            continue;
        }

        let mode = entry.header().mode().context(ReadArchive)?;
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context(CreateDirectory {
                path: parent.to_path_buf(),
            })?;
        }
        let mut file = open_truncated(dest, mode).context(WriteFile {
            filepath: dest.to_path_buf(),
        })?;
        io::copy(&mut entry, &mut file).context(WriteFile {
            filepath: dest.to_path_buf(),
        })?;

        info!(dest = %dest.display(), "Extracted helm binary");
        return Ok(());
    }

    HelmBinaryNotFound.fail()
}

#[cfg(unix)]
fn open_truncated(path: &Path, mode: u32) -> io::Result<fs::File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode)
        .open(path)?;
    // The mode passed to open() is ignored for pre-existing files and masked by the umask.
    file.set_permissions(fs::Permissions::from_mode(mode))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_truncated(path: &Path, _mode: u32) -> io::Result<fs::File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
