use serde::{Deserialize, Serialize};

/// One statement or expression node inside a method body
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionEntity {
    /// Engine node kind, e.g. `CALL`, `RETURN`
    pub label: String,

    pub code: String,

    pub line_number: usize,

    /// `Class.method` of the resolved in-project callee, or empty
    pub method_call: String,
}

impl InstructionEntity {
    pub fn new(label: impl Into<String>, code: impl Into<String>, line_number: usize) -> Self {
        Self {
            label: label.into(),
            code: code.into(),
            line_number,
            method_call: String::new(),
        }
    }

    pub fn with_method_call(mut self, call: impl Into<String>) -> Self {
        self.method_call = call.into();
        self
    }
}
