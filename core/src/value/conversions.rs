//! From<T> for Value and FromValue implementations

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::Value;
use crate::error::{QuarryError, Result};

//------------------------------------------------------------------------------
// From<T> implementations
//------------------------------------------------------------------------------

macro_rules! impl_from_int {
    ($($ty:ty),*) => { $(
        impl From<$ty> for Value {
            #[inline]
            fn from(value: $ty) -> Self {
                Value::Integer(i64::from(value))
            }
        }
    )* }
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    #[inline]
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<f32> for Value {
    #[inline]
    fn from(value: f32) -> Self {
        Value::Real(f64::from(value))
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    #[inline]
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&[u8]> for Value {
    #[inline]
    fn from(value: &[u8]) -> Self {
        Value::Blob(value.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    #[inline]
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

impl From<Decimal> for Value {
    #[inline]
    fn from(value: Decimal) -> Self {
        Value::Decimal(value)
    }
}

impl From<NaiveDate> for Value {
    #[inline]
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveTime> for Value {
    #[inline]
    fn from(value: NaiveTime) -> Self {
        Value::Time(value)
    }
}

impl From<NaiveDateTime> for Value {
    #[inline]
    fn from(value: NaiveDateTime) -> Self {
        Value::Timestamp(value)
    }
}

#[cfg(feature = "uuid")]
impl From<uuid::Uuid> for Value {
    #[inline]
    fn from(value: uuid::Uuid) -> Self {
        Value::Uuid(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    #[inline]
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

//------------------------------------------------------------------------------
// FromValue
//------------------------------------------------------------------------------

/// Converts a [`Value`] into a Rust type.
///
/// Implementations accept the variants a driver may plausibly hand back for
/// the target type (an INTEGER for a `bool`, TEXT for a `Decimal`), and fail
/// with [`QuarryError::Conversion`] otherwise. `NULL` only converts into
/// `Option<T>` and `Value`.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self>;
}

fn mismatch<T>(value: &Value, target: &str) -> Result<T> {
    Err(QuarryError::conversion(format!(
        "cannot convert {} to {target}",
        value.kind()
    )))
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => mismatch(value, "String"),
            Value::Text(s) => Ok(s.clone()),
            Value::Blob(b) => String::from_utf8(b.clone())
                .map_err(|e| QuarryError::conversion(e.to_string())),
            other => Ok(other.to_string()),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Integer(i) => Ok(*i),
            Value::Boolean(b) => Ok(i64::from(*b)),
            Value::Real(r) if r.fract() == 0.0 => Ok(*r as i64),
            Value::Decimal(d) => d
                .to_i64()
                .ok_or_else(|| QuarryError::conversion(format!("decimal {d} out of range for i64"))),
            Value::Text(s) => s
                .trim()
                .parse()
                .map_err(|e| QuarryError::conversion(format!("invalid integer {s:?}: {e}"))),
            _ => mismatch(value, "i64"),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Result<Self> {
        let wide = i64::from_value(value)?;
        i32::try_from(wide).map_err(|e| QuarryError::conversion(e.to_string()))
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Real(r) => Ok(*r),
            Value::Integer(i) => Ok(*i as f64),
            Value::Decimal(d) => d
                .to_f64()
                .ok_or_else(|| QuarryError::conversion(format!("decimal {d} out of range for f64"))),
            Value::Text(s) => s
                .trim()
                .parse()
                .map_err(|e| QuarryError::conversion(format!("invalid real {s:?}: {e}"))),
            _ => mismatch(value, "f64"),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Boolean(b) => Ok(*b),
            Value::Integer(i) => Ok(*i != 0),
            Value::Text(s) if s.eq_ignore_ascii_case("true") || s == "1" => Ok(true),
            Value::Text(s) if s.eq_ignore_ascii_case("false") || s == "0" => Ok(false),
            _ => mismatch(value, "bool"),
        }
    }
}

impl FromValue for Decimal {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Decimal(d) => Ok(*d),
            Value::Integer(i) => Ok(Decimal::from(*i)),
            Value::Real(r) => {
                Decimal::try_from(*r).map_err(|e| QuarryError::conversion(e.to_string()))
            }
            Value::Text(s) => s
                .trim()
                .parse()
                .map_err(|e| QuarryError::conversion(format!("invalid decimal {s:?}: {e}"))),
            _ => mismatch(value, "Decimal"),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Blob(b) => Ok(b.clone()),
            Value::Text(s) => Ok(s.as_bytes().to_vec()),
            _ => mismatch(value, "Vec<u8>"),
        }
    }
}

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

impl FromValue for NaiveDate {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Date(d) => Ok(*d),
            Value::Timestamp(ts) => Ok(ts.date()),
            Value::Text(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
                .or_else(|_| parse_timestamp(s).map(|ts| ts.date()))
                .map_err(|_| QuarryError::conversion(format!("invalid date {s:?}"))),
            _ => mismatch(value, "NaiveDate"),
        }
    }
}

impl FromValue for NaiveTime {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Time(t) => Ok(*t),
            Value::Timestamp(ts) => Ok(ts.time()),
            Value::Text(s) => TIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveTime::parse_from_str(s.trim(), fmt).ok())
                .ok_or_else(|| QuarryError::conversion(format!("invalid time {s:?}"))),
            _ => mismatch(value, "NaiveTime"),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Timestamp(ts) => Ok(*ts),
            Value::Date(d) => Ok(d.and_time(NaiveTime::MIN)),
            Value::Integer(secs) => chrono::DateTime::from_timestamp(*secs, 0)
                .map(|dt| dt.naive_utc())
                .ok_or_else(|| QuarryError::conversion(format!("timestamp {secs} out of range"))),
            Value::Text(s) => parse_timestamp(s),
            _ => mismatch(value, "NaiveDateTime"),
        }
    }
}

fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    let trimmed = s.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| QuarryError::conversion(format!("invalid timestamp {s:?}")))
}

#[cfg(feature = "uuid")]
impl FromValue for uuid::Uuid {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Uuid(u) => Ok(*u),
            Value::Text(s) => {
                uuid::Uuid::parse_str(s).map_err(|e| QuarryError::conversion(e.to_string()))
            }
            Value::Blob(b) => {
                uuid::Uuid::from_slice(b).map_err(|e| QuarryError::conversion(e.to_string()))
            }
            _ => mismatch(value, "Uuid"),
        }
    }
}
