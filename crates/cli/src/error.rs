//! Failures of the `heartworks` binary and the exit code each one maps to.
//!
//! | code | cause |
//! |------|-------|
//! | 0    | frame, cycle, params or shader printed |
//! | 2    | clap rejected the arguments before `run` started |
//! | 10   | `FireworkParams` or `Scene` validation failed (out-of-range count, zero size, NaN time) |
//! | 11   | a PNG, scene sidecar or frame directory could not be written or read |
//! | 12   | `--params` was not a JSON object, or `--frames 0` |
//! | 13   | `--json` output could not be serialized |

use heartworks_core::FireworksError;
use std::fmt;

/// Why a subcommand stopped.
#[derive(Debug)]
pub enum CliError {
    /// Params or scene were well-formed but rejected by validation.
    Effect(FireworksError),
    /// Filesystem failure while writing frames or sidecars, or reading `--scene`.
    Io(String),
    /// Flag values that cannot describe a render at all.
    Input(String),
    /// `--json` output failed to serialize.
    Serialization(String),
}

impl CliError {
    /// Process exit status for `main`.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Effect(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Effect(e) => write!(f, "{e}"),
            CliError::Io(msg) | CliError::Input(msg) | CliError::Serialization(msg) => {
                f.write_str(msg)
            }
        }
    }
}

impl From<FireworksError> for CliError {
    fn from(e: FireworksError) -> Self {
        match e {
            FireworksError::Io(msg) => CliError::Io(msg),
            other => CliError::Effect(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}
