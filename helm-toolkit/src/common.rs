/// Contains constant values which are used as defaults and in log messages.
pub mod constants;

/// Contains the error handling tooling.
pub mod error;

/// Contains macros.
pub(crate) mod macros;
