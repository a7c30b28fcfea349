use crate::common::{
    constants::{CHART_METADATA_FILE, CHART_TESTS_DIR},
    error::{ReadingDirectoryContents, Result},
};
use snafu::ResultExt;
use std::{
    ffi::OsStr,
    io,
    path::{Path, PathBuf},
};
use tracing::trace;
use walkdir::WalkDir;

/// Walks the tree below `root`, the root itself included. Entries are visited in file name order,
/// and symbolic links are not followed.
fn walk(root: &Path) -> walkdir::IntoIter {
    WalkDir::new(root)
        .sort_by_file_name()
        .follow_links(false)
        .into_iter()
}

/// Returns the directory of every Chart.yaml found below `root`. Entries which can't be read are
/// skipped.
pub fn discover_chart_dirs<P>(root: P) -> Vec<PathBuf>
where
    P: AsRef<Path>,
{
    walk(root.as_ref())
        .filter_map(|entry| {
            entry
                .map_err(|error| trace!(%error, "Skipping unreadable entry"))
                .ok()
        })
        .filter(|entry| entry.file_name() == OsStr::new(CHART_METADATA_FILE))
        .filter_map(|entry| entry.path().parent().map(Path::to_path_buf))
        .collect()
}

/// Returns every YAML file below the chart's tests/ directory.
pub fn discover_chart_tests<P>(chart_dir: P) -> Result<Vec<PathBuf>>
where
    P: AsRef<Path>,
{
    let tests_dir = chart_dir.as_ref().join(CHART_TESTS_DIR);
    let mut tests = Vec::new();
    for entry in walk(tests_dir.as_path()) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) if error.depth() == 0 && is_not_found(&error) => break,
            Err(error) => {
                let path = error.path().unwrap_or(tests_dir.as_path()).to_path_buf();
                return Err(io::Error::from(error)).context(ReadingDirectoryContents { path });
            }
        };
        let is_yaml = entry.file_name().to_string_lossy().ends_with(".yaml");
        if !entry.file_type().is_dir() && is_yaml {
            tests.push(entry.into_path());
        }
    }
    Ok(tests)
}

fn is_not_found(error: &walkdir::Error) -> bool {
    error
        .io_error()
        .map(|error| error.kind() == io::ErrorKind::NotFound)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::{discover_chart_dirs, discover_chart_tests};
    use std::{fs, path::Path};

    fn touch(root: &Path, path: &str) {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn discover_chart_dirs_finds_all_charts() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        touch(root, "subfolder/some/chart/Chart.yaml");
        touch(root, "other/chart/Chart.yaml");
        touch(root, "some-other-subfolder/some-folder");

        let chart_dirs = discover_chart_dirs(root);

        assert_eq!(
            chart_dirs,
            [root.join("other/chart"), root.join("subfolder/some/chart")]
        );
    }

    #[test]
    fn discover_chart_dirs_of_missing_root_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(discover_chart_dirs(tmp.path().join("missing")).is_empty());
    }

    #[test]
    fn discover_chart_tests_finds_all_tests() {
        let tmp = tempfile::tempdir().unwrap();
        let chart = tmp.path().join("subfolder/some/chart");
        touch(&chart, "Chart.yaml");
        touch(&chart, "templates/some-file.yaml");
        touch(&chart, "templates/_helpers.tpl");
        touch(&chart, "tests/test-1.yaml");
        touch(&chart, "tests/some/details/test-2.yaml");
        touch(&chart, "tests/README.md");

        let tests = discover_chart_tests(&chart).unwrap();

        assert_eq!(
            tests,
            [
                chart.join("tests/some/details/test-2.yaml"),
                chart.join("tests/test-1.yaml"),
            ]
        );
    }

    #[test]
    fn chart_without_tests_has_no_tests() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "Chart.yaml");
        assert!(discover_chart_tests(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn discover_chart_dirs_of_chart_file_is_its_directory() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "chart/Chart.yaml");

        let chart_dirs = discover_chart_dirs(tmp.path().join("chart/Chart.yaml"));

        assert_eq!(chart_dirs, [tmp.path().join("chart")]);
    }

    #[test]
    fn tests_file_instead_of_directory_has_no_tests() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "Chart.yaml");
        touch(tmp.path(), "tests");

        assert!(discover_chart_tests(tmp.path()).unwrap().is_empty());
    }
}
