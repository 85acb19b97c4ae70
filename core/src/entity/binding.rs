//! Reading and writing entities through column bindings.

use std::sync::Arc;

use smallvec::SmallVec;

use super::{EntityGraph, EntityId};
use crate::ast::{Expr, Insert};
use crate::error::Result;
use crate::result::Row;
use crate::schema::{Binding, Column, Table};
use crate::value::Value;

impl EntityGraph {
    /// Reads the value `column` is bound to, starting at `entity`.
    ///
    /// A missing intermediate entity gives `Ok(None)`. A column without a
    /// binding, or a reference whose table has no bound primary key, is a
    /// configuration error.
    pub fn get_column_value(&self, entity: EntityId, column: &Column) -> Result<Option<Value>> {
        match column.require_binding()? {
            Binding::Reference(reference) => {
                let pk = reference.table().primary_key_column()?;
                pk.require_binding()?;
                match self.child(entity, reference.property())? {
                    Some(target) => self.get_column_value(target, pk),
                    None => Ok(None),
                }
            }
            Binding::Nested(nested) => {
                let (steps, leaf) = nested.split_leaf();
                let mut current = entity;
                for step in steps {
                    match self.child(current, step)? {
                        Some(next) => current = next,
                        None => return Ok(None),
                    }
                }
                Ok(self.value(current, leaf)?.cloned())
            }
        }
    }

    /// Writes `value` where `column` is bound, creating missing entities on
    /// the way.
    ///
    /// Referenced entities are created as roots typed by the referenced
    /// table; nested ones as untyped children of the current entity. Entities
    /// created before a later step fails stay attached. `force` applies to
    /// every property written, including the intermediate ones.
    pub fn set_column_value(
        &mut self,
        entity: EntityId,
        column: &Column,
        value: impl Into<Value>,
        force: bool,
    ) -> Result<()> {
        let value = value.into();
        match column.require_binding()? {
            Binding::Reference(reference) => {
                let pk = reference.table().primary_key_column()?;
                pk.require_binding()?;
                let target = match self.child(entity, reference.property())? {
                    Some(target) => target,
                    None => {
                        self.check_writable(entity, reference.property(), force)?;
                        let target = self.create(Arc::clone(reference.table()));
                        self.attach_reference(entity, reference.property(), target, force)?;
                        crate::quarry_trace_entity!("create_reference", reference.property());
                        target
                    }
                };
                self.set_column_value(target, pk, value, force)
            }
            Binding::Nested(nested) => {
                let (steps, leaf) = nested.split_leaf();
                let mut current = entity;
                for step in steps {
                    current = match self.child(current, step)? {
                        Some(next) => next,
                        None => {
                            self.check_writable(current, step, force)?;
                            let next = self.create_child(current)?;
                            self.attach_nested(current, step, next, force)?;
                            crate::quarry_trace_entity!("create_nested", step);
                            next
                        }
                    };
                }
                self.set_value(current, leaf, value, force)
            }
        }
    }

    /// Whether property `name` of `entity` is the primary key of the table
    /// the entity belongs to.
    ///
    /// The table is taken from the nearest entity, walking up from `entity`,
    /// that has one. For a nested primary-key binding the property path from
    /// that entity down to `name` is rebuilt from the parents' properties and
    /// compared against the binding path from its first element.
    pub fn is_primary_key(&self, entity: EntityId, name: &str) -> Result<bool> {
        let (holder, table) = self.owning_table(entity)?;
        match table.primary_key_binding()? {
            Binding::Reference(reference) => Ok(reference.property() == name),
            Binding::Nested(nested) => {
                let mut path = self.path_candidates(entity, holder)?;
                path.push(smallvec::smallvec![name]);

                let expected = nested.path();
                if path.len() > expected.len() {
                    return Ok(false);
                }
                Ok(path
                    .iter()
                    .zip(expected)
                    .all(|(candidates, step)| candidates.iter().any(|c| *c == step.as_str())))
            }
        }
    }

    /// For every level between `holder` and `entity`, the names under which
    /// the parent stores the child; root side first. Stops at the first
    /// parent that does not store the child at all.
    fn path_candidates(
        &self,
        entity: EntityId,
        holder: EntityId,
    ) -> Result<Vec<SmallVec<[&str; 2]>>> {
        let mut levels = Vec::new();
        let mut current = entity;
        while current != holder {
            let Some(parent) = self.get(current)?.parent() else {
                break;
            };
            let names: SmallVec<[&str; 2]> = self
                .get(parent)?
                .properties()
                .filter(|(_, p)| p.entity() == Some(current))
                .map(|(name, _)| name)
                .collect();
            if names.is_empty() {
                break;
            }
            levels.push(names);
            current = parent;
        }
        levels.reverse();
        Ok(levels)
    }

    /// Creates a root entity for `table` and fills it from `row`.
    ///
    /// Every bound column present in the row is written with `force`. A
    /// NULL foreign key leaves the reference unset.
    pub fn populate(&mut self, table: &Arc<Table>, row: &Row<'_>) -> Result<EntityId> {
        let entity = self.create(Arc::clone(table));
        for column in table.columns() {
            let Some(binding) = column.binding() else {
                continue;
            };
            if !row.has_column(column) {
                continue;
            }
            let Some(value) = row.get(column)? else {
                continue;
            };
            if value.is_null() && matches!(binding, Binding::Reference(_)) {
                continue;
            }
            self.set_column_value(entity, column, value, true)?;
        }
        Ok(entity)
    }

    /// Every bound column of `table` that has a value on `entity`.
    pub fn column_values(
        &self,
        entity: EntityId,
        table: &Table,
    ) -> Result<Vec<(Arc<Column>, Value)>> {
        let mut values = Vec::new();
        for column in table.columns() {
            if column.binding().is_none() {
                continue;
            }
            if let Some(value) = self.get_column_value(entity, column)? {
                values.push((Arc::clone(column), value));
            }
        }
        Ok(values)
    }
}

impl Insert {
    /// An `INSERT` of the values `entity` holds for `table`'s bound columns.
    pub fn from_entity(graph: &EntityGraph, entity: EntityId, table: &Arc<Table>) -> Result<Self> {
        let (columns, row): (Vec<_>, Vec<_>) = graph
            .column_values(entity, table)?
            .into_iter()
            .map(|(column, value)| {
                let expr = Expr::arg(value, column.ty());
                (column, expr)
            })
            .unzip();
        Ok(Insert {
            table: Arc::clone(table),
            columns,
            rows: vec![row],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuarryError;
    use crate::types::SqlType;

    fn dept() -> Arc<Table> {
        Arc::new(
            Table::new("dept")
                .bound_column("id", SqlType::Integer, Binding::property("id"))
                .bound_column("name", SqlType::Text, Binding::property("name"))
                .with_primary_key("id"),
        )
    }

    fn emp(dept: &Arc<Table>) -> Arc<Table> {
        Arc::new(
            Table::new("emp")
                .bound_column("id", SqlType::Integer, Binding::property("id"))
                .bound_column(
                    "city",
                    SqlType::Text,
                    Binding::nested(["address", "city"]).unwrap(),
                )
                .bound_column(
                    "dept_id",
                    SqlType::Integer,
                    Binding::reference("dept", Arc::clone(dept)),
                )
                .with_primary_key("id"),
        )
    }

    #[test]
    fn test_nested_write_creates_intermediates() {
        let dept = dept();
        let emp = emp(&dept);
        let mut graph = EntityGraph::new();
        let e = graph.create(Arc::clone(&emp));

        let city = emp.require("city").unwrap();
        assert_eq!(graph.get_column_value(e, city).unwrap(), None);

        graph.set_column_value(e, city, "Oslo", false).unwrap();
        let address = graph.child(e, "address").unwrap().unwrap();
        assert_eq!(graph.parent(address).unwrap(), Some(e));
        assert_eq!(
            graph.value(address, "city").unwrap(),
            Some(&Value::from("Oslo"))
        );
        assert_eq!(
            graph.get_column_value(e, city).unwrap(),
            Some(Value::from("Oslo"))
        );
    }

    #[test]
    fn test_reference_write_creates_referenced_entity() {
        let dept = dept();
        let emp = emp(&dept);
        let mut graph = EntityGraph::new();
        let e = graph.create(Arc::clone(&emp));

        let dept_id = emp.require("dept_id").unwrap();
        graph.set_column_value(e, dept_id, 10, false).unwrap();

        let d = graph.child(e, "dept").unwrap().unwrap();
        assert_eq!(graph.parent(d).unwrap(), None);
        assert_eq!(graph.get(d).unwrap().table().unwrap().name(), "dept");
        assert_eq!(graph.value(d, "id").unwrap(), Some(&Value::Integer(10)));
        assert_eq!(
            graph.get_column_value(e, dept_id).unwrap(),
            Some(Value::Integer(10))
        );
    }

    #[test]
    fn test_read_only_intermediate_needs_force() {
        let dept = dept();
        let emp = emp(&dept);
        let mut graph = EntityGraph::new();
        let e = graph.create(Arc::clone(&emp));
        graph.mark_read_only(e, "address").unwrap();

        let city = emp.require("city").unwrap();
        let err = graph.set_column_value(e, city, "Oslo", false).unwrap_err();
        assert!(matches!(err, QuarryError::ReadOnlyProperty { .. }));
        assert_eq!(graph.len(), 1);

        graph.set_column_value(e, city, "Oslo", true).unwrap();
        assert!(graph.child(e, "address").unwrap().is_some());
    }

    #[test]
    fn test_unbound_column_and_missing_primary_key() {
        let mut graph = EntityGraph::new();
        let loose = Column::new("emp", "note", SqlType::Text);
        let e = graph.create(None);
        assert!(matches!(
            graph.get_column_value(e, &loose),
            Err(QuarryError::Configuration(_))
        ));

        let keyless = Arc::new(Table::new("tag").column("label", SqlType::Text));
        let column = Column::new("post", "tag", SqlType::Text)
            .with_binding(Binding::reference("tag", keyless));
        assert!(matches!(
            graph.get_column_value(e, &column),
            Err(QuarryError::Configuration(_))
        ));
        assert!(matches!(
            graph.set_column_value(e, &column, "x", false),
            Err(QuarryError::Configuration(_))
        ));
    }

    #[test]
    fn test_is_primary_key_reference_binding() {
        let dept = dept();
        let table = Arc::new(
            Table::new("emp_detail")
                .bound_column(
                    "emp_id",
                    SqlType::Integer,
                    Binding::reference("employee", Arc::clone(&dept)),
                )
                .with_primary_key("emp_id"),
        );
        let mut graph = EntityGraph::new();
        let e = graph.create(table);
        assert!(graph.is_primary_key(e, "employee").unwrap());
        assert!(!graph.is_primary_key(e, "emp_id").unwrap());
    }

    #[test]
    fn test_is_primary_key_nested_binding() {
        let table = Arc::new(
            Table::new("badge")
                .bound_column(
                    "dept_id",
                    SqlType::Integer,
                    Binding::nested(["dept", "id"]).unwrap(),
                )
                .with_primary_key("dept_id"),
        );
        let mut graph = EntityGraph::new();
        let root = graph.create(table);
        let dept = graph.create_child(root).unwrap();
        graph.attach_nested(root, "dept", dept, false).unwrap();

        assert!(graph.is_primary_key(dept, "id").unwrap());
        assert!(!graph.is_primary_key(dept, "name").unwrap());
        // path [dept] from the root is a prefix of [dept, id]
        assert!(graph.is_primary_key(root, "dept").unwrap());
        assert!(!graph.is_primary_key(root, "id").unwrap());

        // aliased child: either name is a candidate
        graph.attach_nested(root, "division", dept, false).unwrap();
        assert!(graph.is_primary_key(dept, "id").unwrap());

        // longer than the binding
        let deeper = graph.create_child(dept).unwrap();
        graph.attach_nested(dept, "id", deeper, false).unwrap();
        assert!(!graph.is_primary_key(deeper, "x").unwrap());
    }

    #[test]
    fn test_is_primary_key_for_unattached_child() {
        let table = Arc::new(
            Table::new("badge")
                .bound_column(
                    "dept_id",
                    SqlType::Integer,
                    Binding::nested(["dept", "id"]).unwrap(),
                )
                .with_primary_key("dept_id"),
        );
        let mut graph = EntityGraph::new();
        let root = graph.create(table);

        // parent stores no property for it: only `name` is compared
        let loose = graph.create_child(root).unwrap();
        assert_eq!(graph.parent(loose).unwrap(), Some(root));
        assert!(graph.is_primary_key(loose, "dept").unwrap());
        assert!(!graph.is_primary_key(loose, "id").unwrap());

        // the walk stops at the first level the parent does not store
        let dept = graph.create_child(root).unwrap();
        graph.attach_nested(root, "dept", dept, false).unwrap();
        let inner = graph.create_child(dept).unwrap();
        assert!(graph.is_primary_key(inner, "dept").unwrap());
        assert!(!graph.is_primary_key(inner, "id").unwrap());
    }

    #[test]
    fn test_is_primary_key_requires_table_and_key() {
        let mut graph = EntityGraph::new();
        let loose = graph.create(None);
        assert!(matches!(
            graph.is_primary_key(loose, "id"),
            Err(QuarryError::Configuration(_))
        ));

        let keyless = graph.create(Arc::new(Table::new("log")));
        assert!(matches!(
            graph.is_primary_key(keyless, "id"),
            Err(QuarryError::Configuration(_))
        ));
    }

    #[test]
    fn test_column_values_and_insert() {
        let dept = dept();
        let emp = emp(&dept);
        let mut graph = EntityGraph::new();
        let e = graph.create(Arc::clone(&emp));
        graph.set_column_value(e, emp.require("id").unwrap(), 7, false).unwrap();
        graph
            .set_column_value(e, emp.require("dept_id").unwrap(), 3, false)
            .unwrap();

        let values = graph.column_values(e, &emp).unwrap();
        let names: Vec<_> = values.iter().map(|(c, _)| c.name()).collect();
        assert_eq!(names, ["id", "dept_id"]);

        let insert = Insert::from_entity(&graph, e, &emp).unwrap();
        assert_eq!(insert.columns.len(), 2);
        assert_eq!(insert.rows[0].len(), 2);
    }
}
