//! Runs the helm command-line tool from Rust: downloads pinned helm releases, builds and executes
//! helm commands, discovers charts and their tests, and applies rendered charts to Kubernetes
//! clusters in tests.

/// Module for Chart.yaml metadata.
pub mod chart;
/// The Helm interface, and its helm v3 implementation.
pub mod client;
/// Contains constants, errors and macros shared across modules.
pub mod common;
/// Default helm versions and settings read from the environment.
pub mod config;
/// Finding charts and chart tests on the filesystem.
pub mod discovery;
/// Downloading helm release binaries.
pub mod download;
/// Command-line flags for helm subcommands.
pub mod flag;
/// Rendering and applying charts in tests.
pub mod testutils;

pub use chart::{load_metadata, Metadata};
pub use client::{Helm, Helm3};
pub use common::{
    constants::DEFAULT_HELM_VERSION,
    error::{Error, Result},
};
pub use config::{default_helm, supported};
pub use discovery::{discover_chart_dirs, discover_chart_tests};
pub use download::download;
pub use flag::Flag;
