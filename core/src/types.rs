//! SQL type registry: semantic types to and from runtime values.
//!
//! Both directions normalize a [`Value`] into the canonical variant of a
//! [`SqlType`]. `encode` runs on every argument the formatter emits, so a
//! caller may hand `"2024-01-31"` to a DATE column and the driver still sees
//! a date. `decode` runs on every result value read through a column, so an
//! SQLite TEXT cell declared as DATE comes back as [`Value::Date`].

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

pub use quarry_types::SqlType;

use crate::error::Result;
use crate::value::{FromValue, Value};

/// Encoding and decoding rules for a semantic column type.
pub trait SqlTypeExt {
    /// Normalizes an argument value before it is bound to a statement.
    fn encode(&self, value: &Value) -> Result<Value>;

    /// Normalizes a raw value read from a result set.
    fn decode(&self, raw: &Value) -> Result<Value>;

    /// Infers the semantic type of a value, used for arguments built
    /// without an explicit type.
    fn of(value: &Value) -> SqlType;
}

impl SqlTypeExt for SqlType {
    #[inline]
    fn encode(&self, value: &Value) -> Result<Value> {
        coerce(*self, value)
    }

    #[inline]
    fn decode(&self, raw: &Value) -> Result<Value> {
        coerce(*self, raw)
    }

    fn of(value: &Value) -> SqlType {
        match value {
            Value::Null => SqlType::Any,
            Value::Boolean(_) => SqlType::Boolean,
            Value::Integer(_) => SqlType::Integer,
            Value::Real(_) => SqlType::Real,
            Value::Decimal(_) => SqlType::Decimal,
            Value::Text(_) => SqlType::Text,
            Value::Blob(_) => SqlType::Blob,
            Value::Date(_) => SqlType::Date,
            Value::Time(_) => SqlType::Time,
            Value::Timestamp(_) => SqlType::Timestamp,
            #[cfg(feature = "uuid")]
            Value::Uuid(_) => SqlType::Uuid,
        }
    }
}

fn coerce(ty: SqlType, value: &Value) -> Result<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }

    Ok(match ty {
        SqlType::Any => value.clone(),
        SqlType::Text => Value::Text(String::from_value(value)?),
        SqlType::Integer => Value::Integer(i64::from_value(value)?),
        SqlType::Real => Value::Real(f64::from_value(value)?),
        SqlType::Decimal => Value::Decimal(Decimal::from_value(value)?),
        SqlType::Boolean => Value::Boolean(bool::from_value(value)?),
        SqlType::Date => Value::Date(NaiveDate::from_value(value)?),
        SqlType::Time => Value::Time(NaiveTime::from_value(value)?),
        SqlType::Timestamp => Value::Timestamp(NaiveDateTime::from_value(value)?),
        SqlType::Blob => Value::Blob(Vec::<u8>::from_value(value)?),
        #[cfg(feature = "uuid")]
        SqlType::Uuid => Value::Uuid(uuid::Uuid::from_value(value)?),
        #[cfg(not(feature = "uuid"))]
        SqlType::Uuid => Value::Text(String::from_value(value)?),
    })
}
