use super::instruction::InstructionEntity;
use super::modifiers::Modifiers;
use serde::{Deserialize, Serialize};

/// Return type placeholder the engine reports for synthesized default constructors
pub const DEFAULT_CONSTRUCTOR_MARKER: &str = "<empty>";

/// A method parameter
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parameter {
    /// Raw declaration, e.g. `String name`
    pub code: String,

    pub name: String,

    #[serde(rename = "type")]
    pub parameter_type: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, parameter_type: impl Into<String>) -> Self {
        let name = name.into();
        let parameter_type = parameter_type.into();
        Self {
            code: format!("{parameter_type} {name}"),
            name,
            parameter_type,
        }
    }
}

/// A method or constructor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodEntity {
    /// Constructors carry the simple name of their class
    pub name: String,

    /// Signature without modifiers or return type, e.g. `getNames()`
    pub method_body: String,

    pub modifiers: Modifiers,

    pub parameters: Vec<Parameter>,

    /// Empty for constructors
    pub return_type: String,

    pub line_number_start: usize,

    pub line_number_end: usize,

    /// `end - start + 1`, zero for synthesized default constructors
    pub total_method_length: usize,

    pub instructions: Vec<InstructionEntity>,

    /// Filled in by the consumer of the output
    pub method_calls: Vec<String>,

    /// Filled in by the consumer of the output
    pub attribute_calls: Vec<String>,
}

impl MethodEntity {
    pub fn new(name: impl Into<String>, line_start: usize, line_end: usize) -> Self {
        let total_method_length = if line_end >= line_start && line_start > 0 {
            line_end - line_start + 1
        } else {
            0
        };
        Self {
            name: name.into(),
            line_number_start: line_start,
            line_number_end: line_end,
            total_method_length,
            ..Default::default()
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.method_body = body.into();
        self
    }

    pub fn with_return_type(mut self, ret: impl Into<String>) -> Self {
        self.return_type = ret.into();
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_parameters(mut self, params: Vec<Parameter>) -> Self {
        self.parameters = params;
        self
    }

    pub fn with_instructions(mut self, instructions: Vec<InstructionEntity>) -> Self {
        self.instructions = instructions;
        self
    }

    /// Synthesized zero-argument constructor not yet named after its class
    pub fn is_unnamed_default_constructor(&self) -> bool {
        self.name.is_empty() && self.return_type == DEFAULT_CONSTRUCTOR_MARKER
    }

    /// Abstract and native methods have no body to instrument
    pub fn has_body(&self) -> bool {
        !(self.modifiers.contains("abstract") || self.modifiers.contains("native"))
    }
}
