//! Field addressing
//!
//! A field id is either a bare field name or `prefix__field`, meaning
//! `field` inside the sub-resource held by `prefix`. Only one level of
//! nesting exists: an id that splits into anything other than exactly two
//! tokens is a flat name.
//!
//! List item fields are addressed as `field@list` by the sync framework.

/// Separator between a sub-resource prefix and the nested field
pub const NESTED_SEPARATOR: &str = "__";

/// Separator between a list item field and its list
pub const LIST_SEPARATOR: char = '@';

/// Parsed field identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAddress<'a> {
    /// Field declared directly on the model
    Flat(&'a str),
    /// Field of the sub-resource reachable through `prefix`
    Nested { prefix: &'a str, field: &'a str },
}

impl<'a> FieldAddress<'a> {
    /// Parse a field id
    pub fn parse(field_id: &'a str) -> Self {
        let mut tokens = field_id.split(NESTED_SEPARATOR);
        match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(prefix), Some(field), None) => Self::Nested { prefix, field },
            _ => Self::Flat(field_id),
        }
    }

    /// Sub-resource prefix, if nested
    pub fn prefix(&self) -> Option<&'a str> {
        match self {
            Self::Flat(_) => None,
            Self::Nested { prefix, .. } => Some(prefix),
        }
    }

    /// Innermost field name
    pub fn field(&self) -> &'a str {
        match self {
            Self::Flat(field) | Self::Nested { field, .. } => field,
        }
    }
}

/// Build the id of a nested field
pub fn nested_id(prefix: &str, field: &str) -> String {
    format!("{prefix}{NESTED_SEPARATOR}{field}")
}

/// Split a `field@list` id into `(list, field)`
pub fn split_list_id(field_id: &str) -> Option<(&str, &str)> {
    let (field, list) = field_id.split_once(LIST_SEPARATOR)?;
    if field.is_empty() || list.is_empty() {
        return None;
    }
    Some((list, field))
}

/// Build the id of a list item field
pub fn list_id(list: &str, field: &str) -> String {
    format!("{field}{LIST_SEPARATOR}{list}")
}
