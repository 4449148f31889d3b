//! Query text sent to the engine
//!
//! Every data query ends in `.toJsonPretty`, so results come back as one JSON
//! document quoted inside the engine's stdout. Tuple positions here must stay
//! in sync with the records in [`crate::tuples`].

/// Classes the engine synthesizes for lambdas are never part of the model
const PROJECT_TYPES: &str =
    "cpg.typeDecl.isExternal(false).filterNot(_.name.contains(\"lambda\"))";

/// `(label, code, lineNumber, called full names)` per instruction of method `m`
const INSTRUCTIONS: &str = "m.ast.isCfgNode.filter(_.lineNumber.isDefined)\
.filterNot(n => n.label == \"METHOD\" || n.label == \"METHOD_RETURN\")\
.l.map(n => (n.label, n.code, n.lineNumber, n.ast.isCall.methodFullName.l))";

/// Lambda bodies are methods to the engine but never part of the model
const SOURCE_METHODS: &str = "filterNot(_.name.contains(\"lambda\"))";

/// Quote `value` as a Scala string literal
pub fn string_literal(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

pub fn import_code(input_path: &str, project_name: &str) -> String {
    format!(
        "importCode(inputPath={}, projectName={})",
        string_literal(input_path),
        string_literal(project_name)
    )
}

pub fn delete_project(project_name: &str) -> String {
    format!("delete({})", string_literal(project_name))
}

/// `(fullName, class AST size, methods' AST size)` for every project class
pub fn inventory() -> String {
    format!(
        "{PROJECT_TYPES}.map(t => (t.fullName, t.ast.size, t.method.ast.size)).toJsonPretty"
    )
}

fn class_shape(with_instructions: bool) -> String {
    let method = if with_instructions {
        format!(
            "(m.name, m.code, m.lineNumber, m.lineNumberEnd, m.modifier.modifierType.l, \
             m.parameter.filterNot(_.name == \"this\").l.map(p => (p.code, p.index)), {INSTRUCTIONS})"
        )
    } else {
        "(m.name, m.code, m.lineNumber, m.lineNumberEnd, m.modifier.modifierType.l, \
         m.parameter.filterNot(_.name == \"this\").l.map(p => (p.code, p.index)))"
            .to_string()
    };
    format!(
        ".map(t => (t.name, t.fullName, t.inheritsFromTypeFullName.l, t.code, t.lineNumber, \
         t.member.l.map(f => (f.name, f.typeFullName, f.lineNumber, f.modifier.modifierType.l)), \
         t.filename, t.method.{SOURCE_METHODS}.l.map(m => {method})))"
    )
}

/// Every project class with attributes, methods and instructions in one query
pub fn all_classes() -> String {
    format!("{PROJECT_TYPES}{}.toJsonPretty", class_shape(true))
}

/// One class by engine full name, instructions included only when asked
pub fn class(full_name: &str, with_instructions: bool) -> String {
    format!(
        "cpg.typeDecl.fullNameExact({}){}.toJsonPretty",
        string_literal(full_name),
        class_shape(with_instructions)
    )
}

/// `(name, lineNumber, instructions)` for every method of a class
pub fn class_instructions(full_name: &str) -> String {
    format!(
        "cpg.typeDecl.fullNameExact({}).method.{SOURCE_METHODS}.l\
         .map(m => (m.name, m.lineNumber, {INSTRUCTIONS})).toJsonPretty",
        string_literal(full_name)
    )
}

/// `(name, lineNumber, instructions)` for the method of a class starting at `line`
pub fn method_instructions(full_name: &str, line: usize) -> String {
    format!(
        "cpg.typeDecl.fullNameExact({}).method.lineNumber({line}).{SOURCE_METHODS}.l\
         .map(m => (m.name, m.lineNumber, {INSTRUCTIONS})).toJsonPretty",
        string_literal(full_name)
    )
}
