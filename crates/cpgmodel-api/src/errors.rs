use std::path::PathBuf;
use thiserror::Error;

/// Errors that end an extraction run
///
/// Every variant is terminal: the pipeline produces no partial output.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The engine could not ingest the project directory
    #[error("Engine failed to import {path}")]
    Import { path: String, stderr: String },

    /// A query reported failure
    #[error("Query failed: {query}")]
    Query { query: String, stderr: String },

    /// A query succeeded but returned nothing
    #[error("Query returned an empty result: {query}")]
    EmptyResult { query: String },

    /// Engine output did not follow the quoted-JSON convention
    #[error("Failed to decode engine output: {0}")]
    Decode(String),

    /// Nothing left to emit after filtering
    #[error("No project classes remained after filtering")]
    NoClasses,

    /// Best-effort cleanup request failed
    #[error("Cleanup request failed: {0}")]
    Cleanup(String),

    /// Failed to read a source file
    #[error("IO error reading {0}: {1}")]
    IoError(PathBuf, #[source] std::io::Error),

    /// Source file has no lines
    #[error("Source file {0} is empty")]
    EmptySource(PathBuf),

    /// Request could not be delivered to the engine
    #[error("Engine transport error: {0}")]
    Transport(String),

    /// The engine never became reachable
    #[error("Engine at {endpoint} unreachable after {attempts} attempts")]
    ConnectTimeout { endpoint: String, attempts: u32 },

    /// Output stream error
    #[error("Failed to write output: {0}")]
    Output(#[source] std::io::Error),
}

impl ExtractError {
    /// The engine's stderr, for variants that carry it
    pub fn engine_stderr(&self) -> Option<&str> {
        match self {
            ExtractError::Import { stderr, .. } | ExtractError::Query { stderr, .. } => {
                Some(stderr.as_str())
            }
            _ => None,
        }
    }
}

/// Result type for extraction operations
pub type ExtractResult<T> = Result<T, ExtractError>;
