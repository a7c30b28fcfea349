use crate::{common::constants::REDACTED, vec_to_strings};
use std::{fmt, path::Path};

/// A helm command-line option. Flags expand to one or more arguments which are appended after
/// the positional arguments of a helm subcommand, in the order they were given.
#[derive(Clone, PartialEq, Eq)]
pub struct Flag {
    args: Vec<String>,
    /// Values of sensitive flags are not logged.
    sensitive: bool,
}

impl Flag {
    fn new(args: Vec<String>) -> Self {
        Self {
            args,
            sensitive: false,
        }
    }

    /// `--debug`
    pub fn debug() -> Self {
        Self::new(vec_to_strings!["--debug"])
    }

    /// `--install`, makes 'helm upgrade' install the release if it does not exist yet.
    pub fn upgrade_install() -> Self {
        Self::new(vec_to_strings!["--install"])
    }

    /// `--values <path>`
    pub fn values<P>(path: P) -> Self
    where
        P: AsRef<Path>,
    {
        Self::new(vec_to_strings!["--values", path.as_ref().to_string_lossy()])
    }

    /// `--username <username>`, for chart repositories which require authentication.
    pub fn repo_username<U>(username: U) -> Self
    where
        U: ToString,
    {
        Self::new(vec_to_strings!["--username", username])
    }

    /// `--password <password>`, for chart repositories which require authentication.
    pub fn repo_password<P>(password: P) -> Self
    where
        P: ToString,
    {
        Self {
            args: vec_to_strings!["--password", password],
            sensitive: true,
        }
    }

    /// `--version <version>`
    pub fn version<V>(version: V) -> Self
    where
        V: ToString,
    {
        Self::new(vec_to_strings!["--version", version])
    }

    /// `--include-crds`, renders the chart's crds/ directory alongside its templates.
    pub fn include_crds() -> Self {
        Self::new(vec_to_strings!["--include-crds"])
    }

    /// `--set <key>=<value>`
    pub fn set<K, V>(key: K, value: V) -> Self
    where
        K: fmt::Display,
        V: fmt::Display,
    {
        Self::new(vec_to_strings!["--set", format!("{key}={value}")])
    }

    /// Any other helm option, passed through verbatim.
    pub fn custom<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        Self::new(args.into_iter().map(|arg| arg.to_string()).collect())
    }

    /// The command-line arguments this flag expands to.
    pub fn args(&self) -> &[String] {
        self.args.as_slice()
    }

    /// The arguments, with the values of sensitive flags replaced by a placeholder.
    pub(crate) fn redacted_args(&self) -> Vec<String> {
        if !self.sensitive {
            return self.args.clone();
        }
        self.args
            .iter()
            .enumerate()
            .map(|(idx, arg)| match idx {
                0 => arg.clone(),
                _ => REDACTED.to_string(),
            })
            .collect()
    }
}

impl fmt::Debug for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Flag").field(&self.redacted_args()).finish()
    }
}
