use serde::{Deserialize, Serialize};

/// Placeholder modifier for members declared without any access keyword
pub const PACKAGE_PRIVATE: &str = "package private";

/// Ordered set of textual modifiers ("public", "static", ...)
///
/// Insertion order is kept so the rendered output follows declaration order;
/// duplicates are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Modifiers(Vec<String>);

impl Modifiers {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Add a modifier, returning false if it was already present
    pub fn insert(&mut self, modifier: impl Into<String>) -> bool {
        let modifier = modifier.into();
        if self.0.contains(&modifier) {
            return false;
        }
        self.0.push(modifier);
        true
    }

    pub fn contains(&self, modifier: &str) -> bool {
        self.0.iter().any(|m| m == modifier)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Union in place, keeping the order of `self` first
    pub fn extend<I, S>(&mut self, other: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for modifier in other {
            self.insert(modifier);
        }
    }

    /// The single modifier list used for members with no access keyword
    pub fn package_private() -> Self {
        Self(vec![PACKAGE_PRIVATE.to_string()])
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for Modifiers {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut modifiers = Modifiers::new();
        modifiers.extend(iter);
        modifiers
    }
}
