//! Column bindings onto entity property graphs.

use std::sync::Arc;

use compact_str::CompactString;
use smallvec::SmallVec;

use super::Table;
use crate::error::{QuarryError, Result};

/// How a column maps onto an entity's property graph.
#[derive(Debug, Clone)]
pub enum Binding {
    /// A path of property names from the entity root to a scalar leaf.
    Nested(NestedBinding),
    /// A to-one relationship resolved through the referenced table's
    /// primary key.
    Reference(ReferenceBinding),
}

impl Binding {
    /// Binds to a path of property names, e.g. `["address", "city"]`.
    ///
    /// Fails with [`QuarryError::Configuration`] for an empty path.
    pub fn nested<I, S>(path: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        NestedBinding::new(path).map(Binding::Nested)
    }

    /// Binds to a single scalar property of the entity root.
    pub fn property(name: impl Into<CompactString>) -> Self {
        let mut path = SmallVec::new();
        path.push(name.into());
        Binding::Nested(NestedBinding { path })
    }

    /// Binds to a to-one relationship stored under `property`, whose value is
    /// the primary key of `table`.
    pub fn reference(property: impl Into<CompactString>, table: Arc<Table>) -> Self {
        Binding::Reference(ReferenceBinding {
            property: property.into(),
            table,
        })
    }

    /// The first property name this binding touches on the entity root.
    pub fn head(&self) -> &str {
        match self {
            Binding::Nested(nested) => nested.path[0].as_str(),
            Binding::Reference(reference) => reference.property.as_str(),
        }
    }
}

/// An ordered, non-empty property path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedBinding {
    path: SmallVec<[CompactString; 4]>,
}

impl NestedBinding {
    pub fn new<I, S>(path: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        let path: SmallVec<[CompactString; 4]> = path.into_iter().map(Into::into).collect();
        if path.is_empty() {
            return Err(QuarryError::configuration(
                "nested binding needs at least one property name",
            ));
        }
        Ok(Self { path })
    }

    #[inline]
    pub fn path(&self) -> &[CompactString] {
        &self.path
    }

    /// Intermediate steps and the terminal property name.
    #[inline]
    pub fn split_leaf(&self) -> (&[CompactString], &str) {
        match self.path.split_last() {
            Some((leaf, steps)) => (steps, leaf.as_str()),
            None => (&[], ""),
        }
    }
}

/// A to-one relationship.
#[derive(Debug, Clone)]
pub struct ReferenceBinding {
    property: CompactString,
    table: Arc<Table>,
}

impl ReferenceBinding {
    #[inline]
    pub fn property(&self) -> &str {
        &self.property
    }

    /// The referenced table; its primary-key column carries the foreign-key
    /// value.
    #[inline]
    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }
}
