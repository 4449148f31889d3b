//! External-class filter
//!
//! A class whose parent lies outside the project's root package (and outside
//! the Java standard library) cannot be represented faithfully, so the whole
//! class is dropped. The root package is the alphabetically first package seen
//! across all classes; no project manifest is consulted.

use std::collections::BTreeSet;

use cpgmodel_api::ClassEntity;
use log::debug;

/// Substring marking a standard-library type
const STDLIB_MARKER: &str = "java";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalClassFilter {
    root: String,
}

impl ExternalClassFilter {
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }

    /// Derive the root package from the classes' package names
    pub fn from_classes<'a, I>(classes: I) -> Self
    where
        I: IntoIterator<Item = &'a ClassEntity>,
    {
        let packages: BTreeSet<&str> = classes
            .into_iter()
            .map(|class| class.package_name.as_str())
            .collect();
        Self::new(packages.into_iter().next().unwrap_or_default())
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Whether `name` is the root package or lies inside it
    fn is_rooted(&self, name: &str) -> bool {
        !self.root.is_empty()
            && name
                .strip_prefix(self.root.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
    }

    /// Not under the root package and not a standard-library type
    pub fn is_external(&self, parent: &str) -> bool {
        !self.is_rooted(parent) && !parent.contains(STDLIB_MARKER)
    }

    /// Whether `class` survives: none of its parents is external
    pub fn keeps(&self, class: &ClassEntity) -> bool {
        match class.inherits_from.iter().find(|p| self.is_external(p)) {
            Some(parent) => {
                debug!("Dropping {} (inherits from {})", class.class_full_name, parent);
                false
            }
            None => true,
        }
    }

    /// Drop standard-library parents and de-qualify the rest
    pub fn simplify_parents(&self, class: &mut ClassEntity) {
        class.inherits_from = class
            .inherits_from
            .iter()
            .filter(|parent| !parent.contains(STDLIB_MARKER))
            .map(|parent| simple_parent_name(parent))
            .collect();
    }
}

/// `com.acme.Outer$Inner` becomes `Outer.Inner`
fn simple_parent_name(full_name: &str) -> String {
    full_name
        .rsplit('.')
        .next()
        .unwrap_or(full_name)
        .replace('$', ".")
}

/// Remove external classes in place and simplify the survivors' parents.
///
/// Items only need to expose their class, so callers can carry extra state
/// alongside it. Returns the number of items removed.
pub fn remove_external_classes<T>(items: &mut Vec<T>) -> usize
where
    T: AsRef<ClassEntity> + AsMut<ClassEntity>,
{
    let filter = ExternalClassFilter::from_classes(items.iter().map(|item| item.as_ref()));
    debug!("Root package: '{}'", filter.root());
    let before = items.len();
    items.retain(|item| filter.keeps(item.as_ref()));
    for item in items.iter_mut() {
        filter.simplify_parents(item.as_mut());
    }
    before - items.len()
}
