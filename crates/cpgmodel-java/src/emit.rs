//! Output framing for the parent process
//!
//! Each class is written as a 4-byte native-endian `i32` length followed by
//! that many bytes of text. A frame holding `-1` ends the stream. On failure
//! nothing marks the stream; the consumer relies on the exit status.

use std::fmt::{self, Write as _};
use std::io::{self, Write};
use std::str::FromStr;

use cpgmodel_api::{ClassEntity, ExtractError, ExtractResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Length value of the closing frame
pub const END_OF_STREAM: i32 = -1;

/// Text rendering of one class payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Python-style literal (`{'name': 'Foo', 'attributes': [], ...}`)
    #[default]
    Literal,
    /// Compact JSON
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Literal => "literal",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "literal" => Ok(OutputFormat::Literal),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{other}' (expected literal or json)")),
        }
    }
}

fn output_error(e: impl std::error::Error + Send + Sync + 'static) -> ExtractError {
    ExtractError::Output(io::Error::other(e))
}

/// Write one length-prefixed frame
pub fn write_frame<W: Write>(out: &mut W, payload: &[u8]) -> ExtractResult<()> {
    let len = i32::try_from(payload.len()).map_err(|_| {
        ExtractError::Output(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("payload of {} bytes exceeds frame limit", payload.len()),
        ))
    })?;
    out.write_all(&len.to_ne_bytes())
        .and_then(|()| out.write_all(payload))
        .map_err(ExtractError::Output)
}

pub fn write_terminator<W: Write>(out: &mut W) -> ExtractResult<()> {
    out.write_all(&END_OF_STREAM.to_ne_bytes())
        .map_err(ExtractError::Output)
}

/// Render a class in the requested format
pub fn render_class(class: &ClassEntity, format: OutputFormat) -> ExtractResult<String> {
    match format {
        OutputFormat::Json => serde_json::to_string(class).map_err(output_error),
        OutputFormat::Literal => {
            let value = serde_json::to_value(class).map_err(output_error)?;
            Ok(to_literal(&value))
        }
    }
}

/// Frame every class, then close the stream
pub fn emit_classes<W: Write>(
    out: &mut W,
    classes: &[ClassEntity],
    format: OutputFormat,
) -> ExtractResult<()> {
    for class in classes {
        let payload = render_class(class, format)?;
        write_frame(out, payload.as_bytes())?;
    }
    write_terminator(out)?;
    out.flush().map_err(ExtractError::Output)
}

/// Python literal for a JSON value, as `repr()` would print the equivalent
/// dict/list/str/int structure
pub fn to_literal(value: &Value) -> String {
    let mut out = String::new();
    write_literal(&mut out, value);
    out
}

fn write_literal(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("None"),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        Value::Number(n) => {
            let _ = write!(out, "{n}");
        }
        Value::String(s) => write_str_literal(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_literal(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_str_literal(out, key);
                out.push_str(": ");
                write_literal(out, item);
            }
            out.push('}');
        }
    }
}

fn write_str_literal(out: &mut String, s: &str) {
    // Single quotes unless only double quotes avoid escaping
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}
