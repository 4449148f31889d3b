//! Entity builders: one raw engine record in, one canonical entity out

use cpgmodel_api::{
    AttributeEntity, ClassEntity, ClassType, InstructionEntity, MethodEntity, Modifiers,
    DEFAULT_CONSTRUCTOR_MARKER,
};

use crate::heuristics::{self, CONSTRUCTOR_MARKER};
use crate::tuples::{RawAttribute, RawClass, RawInstruction, RawMethod, RawParameter};

/// Code the engine reports for nodes it synthesized without source
pub const EMPTY_CODE: &str = "<empty>";

/// Engine name for static initializer blocks
const STATIC_INITIALIZER: &str = "<clinit>";

/// Engine-reported modifier names, lowercased, without the CONSTRUCTOR pseudo-modifier
fn engine_modifiers(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|m| m.trim().to_lowercase())
        .filter(|m| !m.is_empty() && m != "constructor")
        .collect()
}

/// Build an attribute from a member record
pub fn build_attribute(raw: &RawAttribute) -> AttributeEntity {
    let (package_name, attribute_type) = heuristics::split_type_name(&raw.type_full_name);

    let mut modifiers: Modifiers = engine_modifiers(&raw.modifiers).into_iter().collect();
    if modifiers.is_empty() {
        modifiers = Modifiers::package_private();
    }

    AttributeEntity {
        name: raw.name.clone(),
        package_name,
        code: String::new(),
        line_number: raw.line_number.unwrap_or(0),
        modifiers,
        attribute_type,
        type_full_name: raw.type_full_name.clone(),
    }
}

fn is_default_constructor(raw: &RawMethod) -> bool {
    let constructor_name = raw.name.is_empty() || raw.name == CONSTRUCTOR_MARKER;
    let no_source =
        raw.code == EMPTY_CODE || raw.line_number.is_none() || raw.line_number_end.is_none();
    constructor_name && no_source
}

/// Static initializers and lambda bodies, which never become methods
pub fn is_synthetic_method(name: &str) -> bool {
    name == STATIC_INITIALIZER || name.contains("lambda")
}

fn build_parameters(raw: &[RawParameter]) -> Vec<cpgmodel_api::Parameter> {
    let mut ordered: Vec<&RawParameter> = raw.iter().collect();
    ordered.sort_by_key(|p| p.index.unwrap_or(usize::MAX));
    heuristics::extract_parameters(ordered.into_iter().map(|p| p.code.as_str()))
}

/// Build a method from its record.
///
/// Returns `None` for static initializers and lambda bodies. A default
/// constructor comes back unnamed with the `<empty>` return type; the
/// cross-reference pass names it once the owning class is known.
pub fn build_method(raw: &RawMethod) -> Option<MethodEntity> {
    if is_synthetic_method(&raw.name) {
        return None;
    }

    if is_default_constructor(raw) {
        let modifiers = engine_modifiers(&raw.modifiers).into_iter().collect();
        return Some(
            MethodEntity::new("", 0, 0)
                .with_return_type(DEFAULT_CONSTRUCTOR_MARKER)
                .with_modifiers(modifiers),
        );
    }

    let mut modifiers = heuristics::extract_modifiers(&raw.code);
    modifiers.extend(engine_modifiers(&raw.modifiers));
    if modifiers.is_empty() && raw.name != CONSTRUCTOR_MARKER {
        modifiers = Modifiers::package_private();
    }

    let declaration = heuristics::strip_modifiers(&raw.code);
    let (return_type, body) = heuristics::split_return_type(&declaration);
    let name = heuristics::resolve_constructor_name(&raw.name, &body);

    let instructions = raw
        .instructions
        .as_deref()
        .map(build_instructions)
        .unwrap_or_default();

    Some(
        MethodEntity::new(
            name,
            raw.line_number.unwrap_or(0),
            raw.line_number_end.unwrap_or(0),
        )
        .with_body(body)
        .with_return_type(return_type)
        .with_modifiers(modifiers)
        .with_parameters(build_parameters(&raw.parameters))
        .with_instructions(instructions),
    )
}

/// Build an instruction; `None` for the engine's empty placeholder node
pub fn build_instruction(raw: &RawInstruction) -> Option<InstructionEntity> {
    if raw.code == EMPTY_CODE {
        return None;
    }

    let code = raw.code.replace("\r\n", "").replace('\n', "");
    let method_call = heuristics::resolve_method_call(&code, &raw.label, &raw.call_full_names);

    Some(
        InstructionEntity::new(raw.label.clone(), code, raw.line_number.unwrap_or(0))
            .with_method_call(method_call),
    )
}

pub fn build_instructions(raw: &[RawInstruction]) -> Vec<InstructionEntity> {
    raw.iter().filter_map(build_instruction).collect()
}

/// Build a class with its attributes and methods.
///
/// File-derived fields (package, imports, declaration text, line counts) stay
/// empty until [`crate::crossref::apply`] runs.
pub fn build_class(raw: &RawClass) -> ClassEntity {
    let class_type = ClassType::from_declaration(&raw.code).unwrap_or_default();

    let mut class = ClassEntity::new(heuristics::simple_class_name(&raw.name), class_type)
        .with_full_name(raw.full_name.clone())
        .with_line_number(raw.line_number.unwrap_or(0))
        .with_file_path(raw.file_name.clone())
        .with_inherits_from(raw.inherits_from.clone())
        .with_attributes(raw.attributes.iter().map(build_attribute).collect())
        .with_methods(raw.methods.iter().filter_map(build_method).collect());

    class.sort_members();
    class
}
