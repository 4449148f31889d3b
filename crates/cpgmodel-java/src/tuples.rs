//! Typed records for the engine's positional query results
//!
//! The engine renders Scala tuples as JSON objects keyed `_1`, `_2`, ... and
//! omits `None` values entirely. Each query shape gets one record type here so
//! the rest of the crate never sees ordinal names.

use cpgmodel_api::{ExtractError, ExtractResult};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Quoting marker around JSON payloads in engine stdout
const PAYLOAD_QUOTE: &str = "\"\"\"";

/// One entry of the class inventory
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawInventoryEntry {
    #[serde(rename = "_1")]
    pub full_name: String,

    #[serde(rename = "_2", default)]
    pub ast_size: usize,

    /// Combined AST size of the class's methods
    #[serde(rename = "_3", default)]
    pub method_ast_size: usize,
}

/// A type declaration with its members
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawClass {
    #[serde(rename = "_1")]
    pub name: String,

    #[serde(rename = "_2")]
    pub full_name: String,

    #[serde(rename = "_3", default)]
    pub inherits_from: Vec<String>,

    /// Declaration text
    #[serde(rename = "_4", default)]
    pub code: String,

    #[serde(rename = "_5", default)]
    pub line_number: Option<usize>,

    #[serde(rename = "_6", default)]
    pub attributes: Vec<RawAttribute>,

    #[serde(rename = "_7", default)]
    pub file_name: String,

    #[serde(rename = "_8", default)]
    pub methods: Vec<RawMethod>,
}

/// A member (field or enum constant)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawAttribute {
    #[serde(rename = "_1")]
    pub name: String,

    #[serde(rename = "_2", default)]
    pub type_full_name: String,

    #[serde(rename = "_3", default)]
    pub line_number: Option<usize>,

    #[serde(rename = "_4", default)]
    pub modifiers: Vec<String>,
}

/// A method. Default constructors come without line numbers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawMethod {
    #[serde(rename = "_1")]
    pub name: String,

    #[serde(rename = "_2", default)]
    pub code: String,

    #[serde(rename = "_3", default)]
    pub line_number: Option<usize>,

    #[serde(rename = "_4", default)]
    pub line_number_end: Option<usize>,

    #[serde(rename = "_5", default)]
    pub modifiers: Vec<String>,

    #[serde(rename = "_6", default)]
    pub parameters: Vec<RawParameter>,

    /// Absent when the query deferred instruction retrieval
    #[serde(rename = "_7", default)]
    pub instructions: Option<Vec<RawInstruction>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawParameter {
    #[serde(rename = "_1")]
    pub code: String,

    #[serde(rename = "_2", default)]
    pub index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawInstruction {
    #[serde(rename = "_1")]
    pub label: String,

    #[serde(rename = "_2", default)]
    pub code: String,

    #[serde(rename = "_3", default)]
    pub line_number: Option<usize>,

    /// Full names of the methods called within this node
    #[serde(rename = "_4", default)]
    pub call_full_names: Vec<String>,
}

/// Instructions of one method, as returned by a class-level instruction query
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawMethodInstructions {
    #[serde(rename = "_1")]
    pub name: String,

    #[serde(rename = "_2", default)]
    pub line_number: Option<usize>,

    #[serde(rename = "_3", default)]
    pub instructions: Vec<RawInstruction>,
}

/// Locate the quoted JSON payload in engine stdout and strip the quoting.
///
/// The engine prints results as `val res0: String = """[...]"""`.
pub fn unwrap_payload(stdout: &str) -> ExtractResult<&str> {
    let start = stdout.find(PAYLOAD_QUOTE).ok_or_else(|| {
        ExtractError::Decode(format!(
            "no {PAYLOAD_QUOTE} marker in engine output ({} bytes)",
            stdout.len()
        ))
    })?;
    let rest = &stdout[start + PAYLOAD_QUOTE.len()..];
    let payload = match rest.rfind(PAYLOAD_QUOTE) {
        Some(end) => &rest[..end],
        None => rest,
    };
    Ok(payload.trim())
}

/// Decode engine stdout into a typed record list
pub fn decode<T: DeserializeOwned>(stdout: &str) -> ExtractResult<T> {
    let payload = unwrap_payload(stdout)?;
    serde_json::from_str(payload).map_err(|e| ExtractError::Decode(e.to_string()))
}
