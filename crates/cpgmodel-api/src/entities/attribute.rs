use super::modifiers::Modifiers;
use serde::{Deserialize, Serialize};

/// A field of a class, or an enum constant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeEntity {
    pub name: String,

    /// Package part of the declared type ("" for primitives)
    pub package_name: String,

    /// Exact source line of the declaration
    pub code: String,

    /// Line of the declaration (1-indexed)
    pub line_number: usize,

    pub modifiers: Modifiers,

    /// Simple type name; container generics kept as `Map<K, V>`
    pub attribute_type: String,

    /// Fully qualified type as reported by the engine
    pub type_full_name: String,
}

impl AttributeEntity {
    pub fn new(name: impl Into<String>, attribute_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attribute_type: attribute_type.into(),
            modifiers: Modifiers::package_private(),
            ..Default::default()
        }
    }

    pub fn with_line_number(mut self, line: usize) -> Self {
        self.line_number = line;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}
