use std::path::PathBuf;

use thiserror::Error;

/// Failure to resolve or parse the suite or config sources.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Unable to read {kind} file `{}`: {source}", path.display())]
    Read {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unable to parse {kind} file `{}`: {source}", path.display())]
    Parse {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid {kind} file `{}`: {message}", path.display())]
    Shape {
        kind: &'static str,
        path: PathBuf,
        message: String,
    },
    #[error("Invalid config string: {0}")]
    ConfigString(String),
}

/// An invocation could not be constructed from its test description.
#[derive(Debug, Error)]
#[error("Unable to build test `{test}`: {message}")]
pub struct BuildError {
    pub test: String,
    pub message: String,
}

impl BuildError {
    pub fn new(test: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            test: test.into(),
            message: message.into(),
        }
    }
}

/// An invocation failed outside the normal pass/fail reporting path.
#[derive(Debug, Error)]
#[error("Test `{test}` failed to execute: {message}")]
pub struct ExecutionError {
    pub test: String,
    pub message: String,
}

impl ExecutionError {
    pub fn new(test: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            test: test.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Every fatal condition of a run. Failed tests are never represented here.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

pub type Result<T> = std::result::Result<T, Error>;
