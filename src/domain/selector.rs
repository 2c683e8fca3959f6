//! Field selection policies.

use serde::{Deserialize, Serialize};

use crate::domain::schema::{FieldSchema, ObjectSchema};

/// Chooses which fields of an aggregate participate in mapping, in order.
pub trait FieldSelector {
    fn apply<'s>(&self, schema: &'s ObjectSchema) -> Vec<&'s FieldSchema>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldSelection {
    /// Public fields, inherited ones included.
    #[default]
    Public,
    /// Fields declared on the type itself, any visibility.
    Declared,
    /// Declared fields, then those of every ancestor, any visibility.
    DeclaredWithAncestors,
}

impl FieldSelector for FieldSelection {
    fn apply<'s>(&self, schema: &'s ObjectSchema) -> Vec<&'s FieldSchema> {
        let fields = schema.fields().iter();
        match self {
            FieldSelection::Public => fields.filter(|f| f.is_public()).collect(),
            FieldSelection::Declared => fields.filter(|f| f.depth() == 0).collect(),
            FieldSelection::DeclaredWithAncestors => fields.collect(),
        }
    }
}
