#![allow(dead_code)]

use std::sync::Arc;

use quarry::prelude::*;

pub fn dept() -> Arc<Table> {
    Arc::new(
        Table::new("dept")
            .bound_column("id", SqlType::Integer, Binding::property("id"))
            .bound_column("name", SqlType::Text, Binding::property("name"))
            .with_primary_key("id"),
    )
}

/// `emp` with a nested `address.city` binding and a reference to `dept`.
pub fn emp(dept: &Arc<Table>) -> Arc<Table> {
    Arc::new(
        Table::new("emp")
            .bound_column("id", SqlType::Integer, Binding::property("id"))
            .bound_column("name", SqlType::Text, Binding::property("name"))
            .bound_column(
                "city",
                SqlType::Text,
                Binding::nested(["address", "city"]).unwrap(),
            )
            .bound_column("hired", SqlType::Date, Binding::property("hired"))
            .bound_column(
                "dept_id",
                SqlType::Integer,
                Binding::reference("dept", Arc::clone(dept)),
            )
            .with_primary_key("id"),
    )
}

/// A table keyed by a nested `dept.id` path.
pub fn budget() -> Arc<Table> {
    Arc::new(
        Table::new("budget")
            .bound_column(
                "dept_id",
                SqlType::Integer,
                Binding::nested(["dept", "id"]).unwrap(),
            )
            .bound_column("amount", SqlType::Decimal, Binding::property("amount"))
            .with_primary_key("dept_id"),
    )
}

pub fn col(table: &Table, name: &str) -> Expr {
    Expr::column(table.require(name).unwrap())
}

/// Number of `?` or `$n` markers in rendered SQL without string literals.
pub fn placeholders(sql: &str) -> usize {
    sql.matches('?').count() + sql.matches('$').count()
}
