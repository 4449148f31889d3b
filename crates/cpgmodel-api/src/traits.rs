use crate::errors::{ExtractError, ExtractResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Outcome of one query as reported by the engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub success: bool,

    #[serde(default)]
    pub stdout: String,

    #[serde(default)]
    pub stderr: String,
}

impl QueryResponse {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Succeeded with a non-blank body
    pub fn has_output(&self) -> bool {
        self.success && !self.stdout.trim().is_empty()
    }
}

/// The code-property-graph query service.
///
/// Implementations answer one query at a time; callers never issue a second
/// query before the previous one returned.
///
/// # Errors
/// Return `Err` only when the request could not be delivered or answered.
/// A query the engine itself rejects is `Ok` with `success == false`.
pub trait QueryEngine {
    fn execute(&mut self, query: &str) -> ExtractResult<QueryResponse>;
}

impl<E: QueryEngine + ?Sized> QueryEngine for &mut E {
    fn execute(&mut self, query: &str) -> ExtractResult<QueryResponse> {
        (**self).execute(query)
    }
}

impl<E: QueryEngine + ?Sized> QueryEngine for Box<E> {
    fn execute(&mut self, query: &str) -> ExtractResult<QueryResponse> {
        (**self).execute(query)
    }
}

/// Access to the original source files the engine analyzed
pub trait SourceReader {
    /// Lines of the file without line terminators.
    ///
    /// # Errors
    /// Fails when the file cannot be read or has no lines at all.
    fn read_lines(&self, path: &Path) -> ExtractResult<Vec<String>>;
}

/// Reads sources from the local file system
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSourceReader;

impl SourceReader for FsSourceReader {
    fn read_lines(&self, path: &Path) -> ExtractResult<Vec<String>> {
        let bytes = fs::read(path).map_err(|e| ExtractError::IoError(path.to_path_buf(), e))?;
        let source = String::from_utf8_lossy(&bytes);
        // str::lines strips both "\n" and "\r\n"
        let lines: Vec<String> = source.lines().map(str::to_string).collect();
        if lines.is_empty() {
            return Err(ExtractError::EmptySource(path.to_path_buf()));
        }
        Ok(lines)
    }
}
