use std::sync::Arc;

use common::{budget, dept, emp};
use quarry::core::{Property, ResultColumn};
use quarry::prelude::*;

mod common;

#[test]
fn nested_write_creates_missing_entities() {
    let dept = dept();
    let emp = emp(&dept);
    let city = emp.require("city").unwrap();

    let mut graph = EntityGraph::new();
    let ann = graph.create(Arc::clone(&emp));
    assert_eq!(graph.get_column_value(ann, city).unwrap(), None);

    graph.set_column_value(ann, city, "Oslo", false).unwrap();

    let address = graph.child(ann, "address").unwrap().unwrap();
    assert_eq!(graph.parent(address).unwrap(), Some(ann));
    assert!(graph.get(address).unwrap().table().is_none());
    assert_eq!(
        graph.value(address, "city").unwrap(),
        Some(&Value::from("Oslo"))
    );
    assert_eq!(
        graph.get_column_value(ann, city).unwrap(),
        Some(Value::from("Oslo"))
    );

    // The existing intermediate entity is reused
    graph.set_column_value(ann, city, "Bergen", false).unwrap();
    assert_eq!(graph.child(ann, "address").unwrap(), Some(address));
    assert_eq!(graph.len(), 2);
}

#[test]
fn reference_write_goes_through_the_primary_key() {
    let dept = dept();
    let emp = emp(&dept);
    let dept_id = emp.require("dept_id").unwrap();

    let mut graph = EntityGraph::new();
    let ann = graph.create(Arc::clone(&emp));
    graph.set_column_value(ann, dept_id, 10, false).unwrap();

    let target = graph.child(ann, "dept").unwrap().unwrap();
    assert!(matches!(
        graph.property(ann, "dept").unwrap(),
        Some(Property::Reference(_))
    ));
    assert_eq!(graph.parent(target).unwrap(), None);
    assert!(Arc::ptr_eq(graph.get(target).unwrap().table().unwrap(), &dept));
    assert_eq!(graph.value(target, "id").unwrap(), Some(&Value::Integer(10)));
    assert_eq!(
        graph.get_column_value(ann, dept_id).unwrap(),
        Some(Value::Integer(10))
    );
}

#[test]
fn read_only_properties_need_force() {
    let dept = dept();
    let emp = emp(&dept);
    let city = emp.require("city").unwrap();

    let mut graph = EntityGraph::new();
    let ann = graph.create(Arc::clone(&emp));
    graph.mark_read_only(ann, "address").unwrap();

    let err = graph.set_column_value(ann, city, "Oslo", false).unwrap_err();
    assert!(matches!(err, QuarryError::ReadOnlyProperty { .. }));
    assert_eq!(graph.child(ann, "address").unwrap(), None);

    graph.set_column_value(ann, city, "Oslo", true).unwrap();
    assert!(graph.child(ann, "address").unwrap().is_some());
}

#[test]
fn primary_key_on_a_nested_path() {
    let budget = budget();

    let mut graph = EntityGraph::new();
    let root = graph.create(Arc::clone(&budget));
    graph
        .set_column_value(root, budget.require("dept_id").unwrap(), 5, false)
        .unwrap();
    graph
        .set_column_value(root, budget.require("amount").unwrap(), 12, false)
        .unwrap();
    let inner = graph.child(root, "dept").unwrap().unwrap();

    assert!(graph.is_primary_key(inner, "id").unwrap());
    assert!(graph.is_primary_key(root, "dept").unwrap());
    assert!(!graph.is_primary_key(root, "amount").unwrap());
    assert!(!graph.is_primary_key(inner, "name").unwrap());
}

#[test]
fn primary_key_on_a_plain_property() {
    let dept = dept();
    let emp = emp(&dept);

    let mut graph = EntityGraph::new();
    let ann = graph.create(Arc::clone(&emp));
    graph
        .set_column_value(ann, emp.require("city").unwrap(), "Oslo", false)
        .unwrap();
    let address = graph.child(ann, "address").unwrap().unwrap();

    assert!(graph.is_primary_key(ann, "id").unwrap());
    assert!(!graph.is_primary_key(ann, "name").unwrap());
    // The table comes from the nearest typed ancestor
    assert!(!graph.is_primary_key(address, "city").unwrap());
}

#[test]
fn populate_and_insert_from_an_entity() {
    let dept = dept();
    let emp = emp(&dept);
    let rows = BufferedRows::new(
        emp.columns()
            .iter()
            .map(|c| ResultColumn::named(c.name()).with_table("emp"))
            .collect(),
        vec![vec![
            Value::Integer(1),
            Value::from("Ann"),
            Value::from("Oslo"),
            Value::from("2020-03-01"),
            Value::Null,
        ]],
    )
    .unwrap();
    let set = ResultSet::new(rows, LookupMode::Wildcard);

    let mut graph = EntityGraph::new();
    let ann = graph.populate(&emp, &set.row(0).unwrap()).unwrap();
    assert_eq!(graph.child(ann, "dept").unwrap(), None);
    assert!(graph.child(ann, "address").unwrap().is_some());

    let insert = Insert::from_entity(&graph, ann, &emp).unwrap();
    let compiled = Formatter::new(Dialect::SQLite)
        .format(&insert.into())
        .unwrap();
    assert_eq!(
        compiled.sql,
        r#"INSERT INTO "emp" ("id", "name", "city", "hired") VALUES (?, ?, ?, ?)"#
    );
    assert_eq!(
        compiled.arguments[3].value,
        Value::Date(chrono::NaiveDate::from_ymd_opt(2020, 3, 1).unwrap())
    );
}

#[test]
fn removing_an_entity_drops_its_nested_children() {
    let dept = dept();
    let emp = emp(&dept);

    let mut graph = EntityGraph::new();
    let ann = graph.create(Arc::clone(&emp));
    graph
        .set_column_value(ann, emp.require("city").unwrap(), "Oslo", false)
        .unwrap();
    graph
        .set_column_value(ann, emp.require("dept_id").unwrap(), 10, false)
        .unwrap();
    let address = graph.child(ann, "address").unwrap().unwrap();
    let target = graph.child(ann, "dept").unwrap().unwrap();

    graph.remove(ann).unwrap();
    assert!(!graph.contains(ann));
    assert!(!graph.contains(address));
    assert!(graph.contains(target));
}
