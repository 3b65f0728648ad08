//! Variable resolution.
//!
//! Substitutes `{{name}}` placeholders using a two-tier context:
//! collection-scoped variables override global environment variables of
//! the same name. Resolution is a single pass; a variable whose value
//! itself contains a placeholder is not resolved further. Unresolved
//! placeholders substitute the empty string, so templated output never
//! leaks literal `{{name}}` text and resolution never fails.

use std::collections::BTreeMap;

/// Two-tier variable lookup context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableContext {
    /// Variables from the selected global environment.
    pub global: BTreeMap<String, String>,

    /// Variables from the collection's active environment. Higher
    /// precedence than `global`.
    pub collection: BTreeMap<String, String>,
}

impl VariableContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context from the two variable scopes.
    #[must_use]
    pub const fn from_scopes(
        global: BTreeMap<String, String>,
        collection: BTreeMap<String, String>,
    ) -> Self {
        Self { global, collection }
    }

    /// Looks up a variable, collection scope first.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.collection
            .get(name)
            .or_else(|| self.global.get(name))
            .map(String::as_str)
    }
}

/// Resolves all `{{name}}` placeholders in `input`.
///
/// Names are trimmed, so `{{ base }}` and `{{base}}` are equivalent.
/// An unterminated `{{` is emitted literally.
#[must_use]
pub fn resolve(input: &str, context: &VariableContext) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("{{") {
        let Some(offset) = rest[start + 2..].find("}}") else {
            break;
        };

        output.push_str(&rest[..start]);
        let name = rest[start + 2..start + 2 + offset].trim();
        if let Some(value) = context.lookup(name) {
            output.push_str(value);
        }
        rest = &rest[start + 2 + offset + 2..];
    }

    output.push_str(rest);
    output
}

/// Applies [`resolve`] to every value of a shallow string map,
/// preserving keys. Used for headers and query parameters.
#[must_use]
pub fn resolve_object(
    object: &BTreeMap<String, String>,
    context: &VariableContext,
) -> BTreeMap<String, String> {
    object
        .iter()
        .map(|(key, value)| (key.clone(), resolve(value, context)))
        .collect()
}
