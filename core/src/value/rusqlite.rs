//! rusqlite glue for [`Value`].
//!
//! SQLite has five storage classes, so richer values are lowered on the way
//! in: booleans become integers, decimals and temporal values become
//! ISO-8601 / canonical text, UUIDs become hyphenated text. TEXT cells that
//! are not valid UTF-8 are read back as blobs with their bytes intact.

use ::rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

use super::Value;

impl ToSql for Value {
    fn to_sql(&self) -> ::rusqlite::Result<ToSqlOutput<'_>> {
        use ::rusqlite::types::Value as Sqlite;

        Ok(match self {
            Value::Null => ToSqlOutput::Owned(Sqlite::Null),
            Value::Boolean(b) => ToSqlOutput::Owned(Sqlite::Integer(i64::from(*b))),
            Value::Integer(i) => ToSqlOutput::Owned(Sqlite::Integer(*i)),
            Value::Real(r) => ToSqlOutput::Owned(Sqlite::Real(*r)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b.as_slice())),
            Value::Decimal(d) => ToSqlOutput::Owned(Sqlite::Text(d.to_string())),
            Value::Date(d) => ToSqlOutput::Owned(Sqlite::Text(d.to_string())),
            Value::Time(t) => ToSqlOutput::Owned(Sqlite::Text(t.to_string())),
            Value::Timestamp(ts) => ToSqlOutput::Owned(Sqlite::Text(ts.to_string())),
            #[cfg(feature = "uuid")]
            Value::Uuid(u) => ToSqlOutput::Owned(Sqlite::Text(u.to_string())),
        })
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(r) => Value::Real(r),
            ValueRef::Text(bytes) => match String::from_utf8(bytes.to_vec()) {
                Ok(text) => Value::Text(text),
                Err(e) => Value::Blob(e.into_bytes()),
            },
            ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
        }
    }
}

impl FromSql for Value {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Ok(Value::from(value))
    }
}

impl ToSql for crate::ast::Argument {
    fn to_sql(&self) -> ::rusqlite::Result<ToSqlOutput<'_>> {
        self.value.to_sql()
    }
}
