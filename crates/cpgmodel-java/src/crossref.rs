//! File cross-reference: fills in class facts only the source file knows
//!
//! Package, imports, the exact declaration line, attribute declarations and
//! line counts all come from re-reading the `.java` file. Applying the pass
//! twice to the same class and lines leaves it unchanged.

use std::path::PathBuf;

use cpgmodel_api::{ClassEntity, ClassType, ExtractError, ExtractResult, Modifiers};

use crate::heuristics;

/// Parent the engine reports for every enum
const ENUM_BASE: &str = "java.lang.Enum";

fn source_line(lines: &[String], line_number: usize) -> Option<&str> {
    line_number
        .checked_sub(1)
        .and_then(|idx| lines.get(idx))
        .map(String::as_str)
}

/// Package declared on the first line of the file, or ""
pub fn package_name(lines: &[String]) -> String {
    match lines.first() {
        Some(first) if first.starts_with("package") => first
            .replace(';', "")
            .replace("package ", "")
            .trim()
            .to_string(),
        _ => String::new(),
    }
}

pub fn import_statements(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .filter(|line| line.contains("import"))
        .cloned()
        .collect()
}

/// Full name relative to its package, nesting rendered with `.`
pub fn relative_full_name(full_name: &str, package: &str) -> String {
    let relative = if package.is_empty() {
        full_name
    } else {
        full_name
            .strip_prefix(package)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(full_name)
    };
    relative.replace('$', ".").trim().to_string()
}

fn declares_enum(class: &ClassEntity, declaration: &str) -> bool {
    class.inherits_from.iter().any(|parent| parent == ENUM_BASE)
        || declaration.split_whitespace().any(|token| token == "enum")
}

/// Merge the facts of the defining file into `class`.
///
/// # Errors
/// `EmptySource` when `lines` is empty.
pub fn apply(class: &mut ClassEntity, lines: &[String]) -> ExtractResult<()> {
    if lines.is_empty() {
        return Err(ExtractError::EmptySource(PathBuf::from(&class.file_path)));
    }

    let package = package_name(lines);

    if let Some(line) = source_line(lines, class.line_number) {
        class.code = line.replace('{', "").trim().to_string();
    }
    let class_modifiers = heuristics::extract_modifiers(&class.code);

    if class_modifiers.contains("abstract") {
        class.class_type = ClassType::AbstractClass;
    } else if declares_enum(class, &class.code) {
        class.class_type = ClassType::Enum;
    }

    let is_enum = class.is_enum();
    for attribute in &mut class.attributes {
        let Some(line) = source_line(lines, attribute.line_number) else {
            continue;
        };
        let code = line.trim().to_string();
        let mut modifiers = heuristics::extract_modifiers(&code);

        if is_enum && attribute.attribute_type == class.name {
            // Enum constant: visibility follows the enum itself
            if class_modifiers.contains("public") {
                modifiers.insert("public");
            } else if class_modifiers.contains("private") {
                modifiers.insert("private");
            }
            modifiers.insert("final");
            modifiers.insert("static");
        } else {
            if let Some(declared) = heuristics::declared_type(&code) {
                attribute.attribute_type = declared;
            }
            if modifiers.is_empty() && !is_enum {
                modifiers = Modifiers::package_private();
            }
        }

        attribute.code = code;
        attribute.modifiers = modifiers;
    }

    for method in &mut class.methods {
        if method.is_unnamed_default_constructor() {
            method.method_body = format!("{}()", class.name);
            method.name = class.name.clone();
            method.return_type = String::new();
        }
    }

    class.class_full_name = relative_full_name(&class.class_full_name, &package);
    class.modifiers = class_modifiers;
    class.import_statements = import_statements(lines);
    class.file_length = lines.len();
    class.empty_lines = lines.iter().filter(|line| line.is_empty()).count();
    class.non_empty_lines = class.file_length - class.empty_lines;
    class.package_name = package;

    Ok(())
}
