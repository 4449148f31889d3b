//! Text heuristics over Java source fragments
//!
//! The engine reports declarations and statements as plain code strings. The
//! helpers here recover modifiers, return types, constructor names, parameters
//! and call targets from those strings. They are best effort: a pattern that
//! does not match yields an empty value, never an error.

use cpgmodel_api::{Modifiers, Parameter};
use regex::Regex;
use std::sync::LazyLock;

/// Engine name for constructors
pub const CONSTRUCTOR_MARKER: &str = "<init>";

/// Instruction labels that can carry a call target
pub const CALL_LABELS: [&str; 2] = ["CALL", "RETURN"];

/// Keywords that can precede `(` without being a call
const STATEMENT_KEYWORDS: [&str; 7] = [
    "return",
    "if",
    "while",
    "for",
    "switch",
    "catch",
    "synchronized",
];

// The trailing space keeps `abstractClass` from matching `abstract`
static RE_MODIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(private|public|protected|static|final|synchronized|virtual|volatile|abstract|native) ",
    )
    .unwrap()
});
static RE_RETURN_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_\[\]]+\s").unwrap());
static RE_LEADING_IDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*").unwrap());
static RE_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(new\s+)?([A-Za-z_][A-Za-z0-9_]*)\s*\(").unwrap());

/// Modifier keywords in order of appearance
pub fn extract_modifiers(text: &str) -> Modifiers {
    RE_MODIFIER
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// The text with every modifier keyword removed, trimmed
pub fn strip_modifiers(text: &str) -> String {
    RE_MODIFIER.replace_all(text, "").trim().to_string()
}

/// Split a declaration (modifiers already removed) into return type and the
/// `name(params)` remainder.
///
/// A leading plain word followed by whitespace is the return type. Otherwise,
/// when the text opens with a generic container such as `List<String>`,
/// everything up to the first `>` is taken as the return type.
pub fn split_return_type(declaration: &str) -> (String, String) {
    let declaration = declaration.trim();
    if declaration.starts_with('(') {
        return (String::new(), declaration.to_string());
    }

    if let Some(m) = RE_RETURN_TYPE.find(declaration) {
        let return_type = m.as_str().trim().to_string();
        let body = declaration[m.end()..].trim().to_string();
        return (return_type, body);
    }

    if let Some(idx) = declaration.find('>') {
        let candidate = &declaration[..=idx];
        if !candidate.contains('(') {
            let body = declaration[idx + 1..].trim().to_string();
            return (candidate.to_string(), body);
        }
    }

    (String::new(), declaration.to_string())
}

/// First identifier of a method body, i.e. the declared name
pub fn leading_identifier(body: &str) -> String {
    RE_LEADING_IDENT
        .find(body.trim_start())
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Name to use for a method, replacing the engine's constructor marker with
/// the name declared in `body`
pub fn resolve_constructor_name(engine_name: &str, body: &str) -> String {
    if engine_name.is_empty() || engine_name.contains(CONSTRUCTOR_MARKER) {
        let declared = leading_identifier(body);
        if engine_name.is_empty() {
            return declared;
        }
        return engine_name.replace(CONSTRUCTOR_MARKER, &declared);
    }
    engine_name.to_string()
}

/// Collapse `A, B` inside generics so a declaration splits cleanly on whitespace
fn protect_generic_commas(text: &str) -> String {
    text.replace(", ", "|")
}

fn restore_generic_commas(text: &str) -> String {
    text.replace('|', ", ")
}

/// Build parameters from their raw declarations (`Type name`).
///
/// Entries that do not split into exactly a type and a name are dropped.
pub fn extract_parameters<'a, I>(declarations: I) -> Vec<Parameter>
where
    I: IntoIterator<Item = &'a str>,
{
    declarations
        .into_iter()
        .filter_map(|code| {
            let cleaned = protect_generic_commas(&strip_modifiers(code));
            let tokens: Vec<&str> = cleaned.split_whitespace().collect();
            match tokens.as_slice() {
                [parameter_type, name] => Some(Parameter {
                    code: code.trim().to_string(),
                    name: (*name).to_string(),
                    parameter_type: restore_generic_commas(parameter_type),
                }),
                _ => None,
            }
        })
        .collect()
}

/// Declared type of a field declaration line, e.g. `Map<String, Integer>`
/// for `private Map<String, Integer> counts = new HashMap<>();`
pub fn declared_type(declaration: &str) -> Option<String> {
    let cleaned = protect_generic_commas(&strip_modifiers(declaration));
    cleaned
        .split_whitespace()
        .next()
        .map(restore_generic_commas)
}

/// Split a fully qualified type into `(package, simple name)`.
///
/// `com.acme.Outer$Inner[]` gives `("com.acme", "Inner")`.
pub fn split_type_name(full_name: &str) -> (String, String) {
    let (package, trailing) = match full_name.rfind('.') {
        Some(idx) => (
            full_name[..idx].replace("[]", "").replace('$', "."),
            &full_name[idx + 1..],
        ),
        None => (String::new(), full_name),
    };
    (package, simple_class_name(trailing).to_string())
}

/// Innermost name of a possibly nested class name (`Outer$Inner` gives `Inner`)
pub fn simple_class_name(name: &str) -> &str {
    match name.rfind('$') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

/// Candidate full names that can never be a project method
fn is_foreign_candidate(full_name: &str) -> bool {
    full_name.starts_with("<operator>")
        || full_name.contains("<unresolved")
        || full_name.starts_with("java.")
        || full_name.starts_with("javax.")
}

/// Render `com.acme.Outer$Inner.run` as `Outer.Inner.run`, with constructors
/// named after their class
fn render_call_target(qualified: &str) -> Option<String> {
    let (owner, method) = qualified.rsplit_once('.')?;
    let class_path = owner.rsplit('.').next().unwrap_or(owner);
    let method = if method == CONSTRUCTOR_MARKER {
        simple_class_name(class_path)
    } else {
        method
    };
    Some(format!("{}.{}", class_path.replace('$', "."), method))
}

/// Resolve the in-project method an instruction calls.
///
/// Only `CALL` and `RETURN` instructions are considered. The first called
/// identifier is matched against the fully qualified names the engine saw at
/// that call site; the call resolves only when exactly one distinct in-project
/// candidate remains, otherwise the result is empty.
pub fn resolve_method_call(code: &str, label: &str, candidates: &[String]) -> String {
    if !CALL_LABELS.contains(&label) {
        return String::new();
    }

    let Some(caps) = RE_CALL
        .captures_iter(code)
        .find(|caps| !STATEMENT_KEYWORDS.contains(&&caps[2]))
    else {
        return String::new();
    };
    let identifier = &caps[2];
    let is_new = caps.get(1).is_some();

    let needles: Vec<String> = if identifier == "super" || identifier == "this" {
        vec![format!(".{CONSTRUCTOR_MARKER}:")]
    } else if is_new {
        vec![
            format!(".{identifier}.{CONSTRUCTOR_MARKER}:"),
            format!("${identifier}.{CONSTRUCTOR_MARKER}:"),
        ]
    } else {
        vec![format!(".{identifier}:")]
    };

    let mut matches: Vec<&str> = Vec::new();
    for candidate in candidates {
        if is_foreign_candidate(candidate) || !needles.iter().any(|n| candidate.contains(n)) {
            continue;
        }
        let qualified = candidate.split(':').next().unwrap_or(candidate);
        if !matches.contains(&qualified) {
            matches.push(qualified);
        }
    }

    match matches.as_slice() {
        [only] => render_call_target(only).unwrap_or_default(),
        _ => String::new(),
    }
}
