//! Error types for idled.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SentinelError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Interface {name}: {reason}")]
    Interface { name: String, reason: String },

    #[error("Command '{command}' failed: {reason}")]
    Command { command: String, reason: String },
}

impl SentinelError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SentinelError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        SentinelError::Parse(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        SentinelError::Config(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SentinelError>;
