use std::fmt;
use std::path::PathBuf;

use crate::constants::{
    EXIT_ALL_USER_HIVES_WITHOUT_ROOT, EXIT_FAILURE, EXIT_PLUGIN_NOT_FOUND, EXIT_USAGE,
};

/// Conditions that decide how the process exits.
///
/// Everything else travels as a plain `anyhow::Error`; `main` downcasts to
/// this type to pick the exit code.
#[derive(Debug, PartialEq, Eq)]
pub enum RegripError {
    /// `--all-user-hives` was requested but no `--root` was given
    AllUserHivesWithoutRoot,
    /// No plugin with this name is registered
    PluginNotFound(String),
    /// Neither `Users` nor `Documents and Settings` exists below the root
    ProfilesDirNotFound(PathBuf),
    /// No positional plugin name and no alias in the program name
    NoPluginSpecified,
    /// Standard input cannot serve this hive request
    StdinUnavailable(String),
}

impl RegripError {
    pub fn exit_code(&self) -> i32 {
        match self {
            RegripError::AllUserHivesWithoutRoot => EXIT_ALL_USER_HIVES_WITHOUT_ROOT,
            RegripError::PluginNotFound(_) => EXIT_PLUGIN_NOT_FOUND,
            RegripError::NoPluginSpecified => EXIT_USAGE,
            RegripError::ProfilesDirNotFound(_) | RegripError::StdinUnavailable(_) => EXIT_FAILURE,
        }
    }
}

impl std::error::Error for RegripError {}

impl fmt::Display for RegripError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegripError::AllUserHivesWithoutRoot => write!(f, "--all-user-hives requires --root"),
            RegripError::PluginNotFound(name) => write!(f, "No such plugin: {}", name),
            RegripError::ProfilesDirNotFound(root) => {
                write!(f, "Could not find the Users folder under {}", root.display())
            }
            RegripError::NoPluginSpecified => write!(f, "No plugin name given (see --list)"),
            RegripError::StdinUnavailable(reason) => {
                write!(f, "Cannot read hive from standard input: {}", reason)
            }
        }
    }
}

/// Exit code for an error coming out of the run.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<RegripError>()
        .map(RegripError::exit_code)
        .unwrap_or(EXIT_FAILURE)
}
