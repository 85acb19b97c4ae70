//! Table and column descriptors.
//!
//! Tables are built once and shared behind `Arc`; columns carry their owning
//! table's name (and alias, for aliased copies) so a column on its own is
//! enough to render a qualified reference or to resolve a result column.

mod binding;

pub use binding::{Binding, NestedBinding, ReferenceBinding};

use std::borrow::Cow;
use std::sync::{Arc, OnceLock};

use compact_str::CompactString;

use crate::error::{QuarryError, Result};
use crate::types::SqlType;

/// A column of a table or a query.
#[derive(Debug, Clone)]
pub struct Column {
    table: CompactString,
    table_alias: Option<CompactString>,
    name: CompactString,
    label: Option<CompactString>,
    ty: SqlType,
    binding: OnceLock<Binding>,
}

impl Column {
    pub fn new(
        table: impl Into<CompactString>,
        name: impl Into<CompactString>,
        ty: SqlType,
    ) -> Self {
        Self {
            table: table.into(),
            table_alias: None,
            name: name.into(),
            label: None,
            ty,
            binding: OnceLock::new(),
        }
    }

    /// Sets the query label (`AS "label"`) used for labeled result lookup.
    pub fn with_label(mut self, label: impl Into<CompactString>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the table alias this column is referenced through.
    pub fn with_table_alias(mut self, alias: impl Into<CompactString>) -> Self {
        self.table_alias = Some(alias.into());
        self
    }

    /// Attaches a binding while building.
    pub fn with_binding(self, binding: Binding) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(binding);
        Self {
            binding: cell,
            ..self
        }
    }

    /// Attaches a binding to a column that has none yet.
    ///
    /// A binding is immutable once attached: a second call fails with
    /// [`QuarryError::Configuration`].
    pub fn bind(&self, binding: Binding) -> Result<()> {
        self.binding.set(binding).map_err(|_| {
            QuarryError::configuration(format!(
                "column {}.{} already has a binding",
                self.table, self.name
            ))
        })
    }

    #[inline]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[inline]
    pub fn table_alias(&self) -> Option<&str> {
        self.table_alias.as_deref()
    }

    /// The name this column's table is referenced by in a query: the alias
    /// when there is one, the base table name otherwise.
    #[inline]
    pub fn table_reference(&self) -> &str {
        self.table_alias.as_deref().unwrap_or(&self.table)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The label a result set reports for this column: the explicit label,
    /// or `{table_reference}_{name}`, which stays unique across the tables
    /// of one query.
    pub fn effective_label(&self) -> Cow<'_, str> {
        match &self.label {
            Some(label) => Cow::Borrowed(label.as_str()),
            None => Cow::Owned(format!("{}_{}", self.table_reference(), self.name)),
        }
    }

    #[inline]
    pub fn ty(&self) -> SqlType {
        self.ty
    }

    #[inline]
    pub fn binding(&self) -> Option<&Binding> {
        self.binding.get()
    }

    /// The binding, or a configuration error naming the column.
    pub fn require_binding(&self) -> Result<&Binding> {
        self.binding.get().ok_or_else(|| {
            QuarryError::configuration(format!(
                "column {}.{} has no binding",
                self.table, self.name
            ))
        })
    }

    /// Case-insensitive match against either the alias or the base table name.
    pub fn belongs_to(&self, table: &str) -> bool {
        self.table.eq_ignore_ascii_case(table)
            || self
                .table_alias
                .as_deref()
                .is_some_and(|alias| alias.eq_ignore_ascii_case(table))
    }
}

/// A table: name, optional alias, ordered columns and an optional
/// single-column primary key.
#[derive(Debug, Clone)]
pub struct Table {
    name: CompactString,
    alias: Option<CompactString>,
    columns: Vec<Arc<Column>>,
    primary_key: Option<CompactString>,
}

impl Table {
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            columns: Vec::new(),
            primary_key: None,
        }
    }

    /// Adds an unbound column.
    pub fn column(self, name: impl Into<CompactString>, ty: SqlType) -> Self {
        let column = Column::new(self.name.clone(), name, ty);
        self.with_column(column)
    }

    /// Adds a column bound to the entity graph.
    pub fn bound_column(self, name: impl Into<CompactString>, ty: SqlType, binding: Binding) -> Self {
        let column = Column::new(self.name.clone(), name, ty).with_binding(binding);
        self.with_column(column)
    }

    /// Adds a prebuilt column, re-homing it onto this table.
    pub fn with_column(mut self, mut column: Column) -> Self {
        column.table = self.name.clone();
        column.table_alias = self.alias.clone();
        self.columns.push(Arc::new(column));
        self
    }

    /// Names the primary-key column. Resolution happens lazily in
    /// [`Table::primary_key_column`].
    pub fn with_primary_key(mut self, column: impl Into<CompactString>) -> Self {
        self.primary_key = Some(column.into());
        self
    }

    /// A copy of this table referenced through `alias`; every column carries
    /// the alias.
    pub fn aliased(&self, alias: impl Into<CompactString>) -> Table {
        let alias = alias.into();
        let columns = self
            .columns
            .iter()
            .map(|column| {
                let mut column = Column::clone(column);
                column.table_alias = Some(alias.clone());
                Arc::new(column)
            })
            .collect();
        Table {
            name: self.name.clone(),
            alias: Some(alias),
            columns,
            primary_key: self.primary_key.clone(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Alias if present, otherwise the table name.
    #[inline]
    pub fn reference_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    #[inline]
    pub fn columns(&self) -> &[Arc<Column>] {
        &self.columns
    }

    /// Looks up a column by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&Arc<Column>> {
        self.columns
            .iter()
            .find(|column| column.name().eq_ignore_ascii_case(name))
    }

    /// Looks up a column by name, failing with a configuration error.
    pub fn require(&self, name: &str) -> Result<&Arc<Column>> {
        self.get(name).ok_or_else(|| {
            QuarryError::configuration(format!("table {} has no column {name}", self.name))
        })
    }

    #[inline]
    pub fn has_primary_key(&self) -> bool {
        self.primary_key.is_some()
    }

    /// The primary-key column.
    ///
    /// Fails with [`QuarryError::Configuration`] when no primary key is
    /// declared or the declared name is not a column of this table.
    pub fn primary_key_column(&self) -> Result<&Arc<Column>> {
        let name = self.primary_key.as_deref().ok_or_else(|| {
            QuarryError::configuration(format!("table {} has no primary key", self.name))
        })?;
        self.get(name).ok_or_else(|| {
            QuarryError::configuration(format!(
                "primary key {name} is not a column of table {}",
                self.name
            ))
        })
    }

    /// The primary-key column's binding; both must be configured.
    pub fn primary_key_binding(&self) -> Result<&Binding> {
        self.primary_key_column()?.require_binding()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dept() -> Table {
        Table::new("dept")
            .bound_column("id", SqlType::Integer, Binding::property("id"))
            .bound_column("name", SqlType::Text, Binding::property("name"))
            .with_primary_key("id")
    }

    #[test]
    fn test_columns_are_homed_on_their_table() {
        let table = dept();
        let column = table.require("NAME").unwrap();
        assert_eq!(column.table(), "dept");
        assert_eq!(column.table_alias(), None);
        assert_eq!(column.table_reference(), "dept");
    }

    #[test]
    fn test_aliased_table_propagates_alias() {
        let aliased = dept().aliased("d");
        let column = aliased.require("name").unwrap();
        assert_eq!(column.table_reference(), "d");
        assert!(column.belongs_to("D"));
        assert!(column.belongs_to("dept"));
        assert!(!column.belongs_to("emp"));
    }

    #[test]
    fn test_binding_is_write_once() {
        let column = Column::new("emp", "name", SqlType::Text);
        assert!(column.binding().is_none());
        column.bind(Binding::property("name")).unwrap();
        let err = column.bind(Binding::property("other")).unwrap_err();
        assert!(matches!(err, QuarryError::Configuration(_)));
        assert_eq!(column.binding().unwrap().head(), "name");
    }

    #[test]
    fn test_missing_primary_key_is_a_configuration_error() {
        let table = Table::new("log").column("line", SqlType::Text);
        assert!(matches!(
            table.primary_key_column(),
            Err(QuarryError::Configuration(_))
        ));

        let unbound = Table::new("tag")
            .column("id", SqlType::Integer)
            .with_primary_key("id");
        assert!(unbound.primary_key_column().is_ok());
        assert!(matches!(
            unbound.primary_key_binding(),
            Err(QuarryError::Configuration(_))
        ));
    }

    #[test]
    fn test_effective_label_defaults_to_table_and_name() {
        let plain = Column::new("dept", "name", SqlType::Text);
        assert_eq!(plain.effective_label(), "dept_name");
        let aliased = plain.clone().with_table_alias("d");
        assert_eq!(aliased.effective_label(), "d_name");
        let labeled = plain.with_label("title");
        assert_eq!(labeled.effective_label(), "title");
    }
}
