//! Error taxonomy for HFS volume access

use thiserror::Error;

use super::engine::EngineOutput;
use super::macroman;

/// Errors that can occur while talking to an HFS volume
#[derive(Debug, Error)]
pub enum HfsError {
    #[error("Failed to mount {image}: {reason}")]
    MountFailed { image: String, reason: String },

    #[error("A volume is already mounted")]
    SessionAlreadyActive,

    #[error("No volume is mounted")]
    NoActiveSession,

    #[error("Unable to parse listing line: {line}")]
    MalformedListingLine { line: String },

    #[error("Character {ch:?} cannot be represented in Mac OS Roman")]
    UnsupportedCharacter { ch: char },

    #[error("{command} failed (status {status:?}): {stderr}")]
    EngineError {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("Invalid volume size: {0} bytes")]
    InvalidSize(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HfsError {
    /// Build an engine error from a finished command
    pub(crate) fn engine(command: &str, output: &EngineOutput) -> Self {
        HfsError::EngineError {
            command: command.to_string(),
            status: output.status,
            stderr: macroman::decode(&output.stderr).trim_end().to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HfsError>;
