use super::attribute::AttributeEntity;
use super::method::MethodEntity;
use super::modifiers::Modifiers;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of type declaration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassType {
    #[default]
    #[serde(rename = "class")]
    Class,
    #[serde(rename = "abstract class")]
    AbstractClass,
    #[serde(rename = "interface")]
    Interface,
    #[serde(rename = "enum")]
    Enum,
}

impl ClassType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassType::Class => "class",
            ClassType::AbstractClass => "abstract class",
            ClassType::Interface => "interface",
            ClassType::Enum => "enum",
        }
    }

    /// Detect the kind from declaration text.
    ///
    /// Checked in the order abstract class, class, enum, interface; the first
    /// substring hit wins, since "abstract class" also contains "class".
    pub fn from_declaration(declaration: &str) -> Option<Self> {
        if declaration.contains("abstract class") {
            Some(ClassType::AbstractClass)
        } else if declaration.contains("class") {
            Some(ClassType::Class)
        } else if declaration.contains("enum") {
            Some(ClassType::Enum)
        } else if declaration.contains("interface") {
            Some(ClassType::Interface)
        } else {
            None
        }
    }
}

impl fmt::Display for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A class, interface or enum of the analyzed project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassEntity {
    /// Simple name with any nesting prefix removed
    pub name: String,

    /// Declaration line text, without the opening brace
    pub code: String,

    /// Line of the declaration (1-indexed)
    pub line_number: usize,

    /// Import lines of the defining file, verbatim and in order
    pub import_statements: Vec<String>,

    pub modifiers: Modifiers,

    /// Name relative to the package; nesting rendered with `.`
    pub class_full_name: String,

    /// Parent classes and interfaces
    pub inherits_from: Vec<String>,

    pub class_type: ClassType,

    pub file_path: String,

    pub file_length: usize,

    pub empty_lines: usize,

    pub non_empty_lines: usize,

    pub package_name: String,

    /// Ordered by source line
    pub attributes: Vec<AttributeEntity>,

    /// Ordered by start line
    pub methods: Vec<MethodEntity>,
}

impl ClassEntity {
    pub fn new(name: impl Into<String>, class_type: ClassType) -> Self {
        Self {
            name: name.into(),
            class_type,
            ..Default::default()
        }
    }

    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.class_full_name = full_name.into();
        self
    }

    pub fn with_line_number(mut self, line: usize) -> Self {
        self.line_number = line;
        self
    }

    pub fn with_file_path(mut self, path: impl Into<String>) -> Self {
        self.file_path = path.into();
        self
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package_name = package.into();
        self
    }

    pub fn with_inherits_from(mut self, parents: Vec<String>) -> Self {
        self.inherits_from = parents;
        self
    }

    pub fn with_attributes(mut self, attributes: Vec<AttributeEntity>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_methods(mut self, methods: Vec<MethodEntity>) -> Self {
        self.methods = methods;
        self
    }

    pub fn is_enum(&self) -> bool {
        self.class_type == ClassType::Enum
    }

    /// Sum of the lengths of all methods, used to size instruction queries
    pub fn total_method_lines(&self) -> usize {
        self.methods.iter().map(|m| m.total_method_length).sum()
    }

    /// Restore source order after methods or attributes were merged in
    pub fn sort_members(&mut self) {
        self.attributes.sort_by_key(|a| a.line_number);
        self.methods.sort_by_key(|m| m.line_number_start);
    }
}

impl AsRef<ClassEntity> for ClassEntity {
    fn as_ref(&self) -> &ClassEntity {
        self
    }
}

impl AsMut<ClassEntity> for ClassEntity {
    fn as_mut(&mut self) -> &mut ClassEntity {
        self
    }
}
