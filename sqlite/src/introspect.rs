//! Table descriptors from a live SQLite schema.

use quarry_core::{Binding, QuarryError, Result, SqlType, Table};
use rusqlite::Connection;

/// Builds a [`Table`] for `name` from `pragma_table_info`.
///
/// Every column is bound to the entity property of the same name and typed
/// from its declared type (`Any` when SQLite has none). A single-column
/// primary key is recorded; composite keys are left out.
pub fn load_table(conn: &Connection, name: &str) -> Result<Table> {
    let mut stmt =
        conn.prepare("SELECT name, type, pk FROM pragma_table_info(?1) ORDER BY cid")?;
    let columns = stmt
        .query_map([name], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    if columns.is_empty() {
        return Err(QuarryError::Configuration(format!(
            "table {name} does not exist"
        )));
    }

    let mut table = Table::new(name);
    let mut keys = Vec::new();
    for (column, declared, pk) in columns {
        let ty = SqlType::parse(&declared).unwrap_or(SqlType::Any);
        table = table.bound_column(column.as_str(), ty, Binding::property(column.as_str()));
        if pk > 0 {
            keys.push(column);
        }
    }

    if let [key] = keys.as_slice() {
        table = table.with_primary_key(key.as_str());
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_table() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE emp (id INTEGER PRIMARY KEY, name VARCHAR(40), hired DATE, misc);
             CREATE TABLE pair (a INTEGER, b INTEGER, PRIMARY KEY (a, b));",
        )
        .unwrap();

        let emp = load_table(&conn, "emp").unwrap();
        let types: Vec<_> = emp.columns().iter().map(|c| c.ty()).collect();
        assert_eq!(
            types,
            [SqlType::Integer, SqlType::Text, SqlType::Date, SqlType::Any]
        );
        assert_eq!(emp.primary_key_column().unwrap().name(), "id");
        assert_eq!(emp.primary_key_binding().unwrap().head(), "id");

        let pair = load_table(&conn, "pair").unwrap();
        assert!(!pair.has_primary_key());

        assert!(matches!(
            load_table(&conn, "missing"),
            Err(QuarryError::Configuration(_))
        ));
    }
}
