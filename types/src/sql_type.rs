//! Semantic column types
//!
//! A [`SqlType`] says what a column *means* (a date, a decimal, a flag), not
//! how a particular database stores it. `quarry-core` uses it to encode
//! arguments for the wire and to decode raw result values.

/// Semantic type of a column or argument.
///
/// # Examples
///
/// ```
/// use quarry_types::SqlType;
///
/// assert_eq!(SqlType::parse("varchar"), Some(SqlType::Text));
/// assert_eq!(SqlType::Decimal.as_str(), "DECIMAL");
/// ```
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SqlType {
    /// Character data.
    Text,
    /// Signed 64-bit integer.
    Integer,
    /// Double precision floating point.
    Real,
    /// Exact decimal number.
    Decimal,
    /// Boolean flag.
    Boolean,
    /// Calendar date without time zone.
    Date,
    /// Time of day without time zone.
    Time,
    /// Date and time without time zone.
    Timestamp,
    /// Binary data.
    Blob,
    /// UUID.
    Uuid,
    /// No semantic constraint; values pass through unchanged.
    #[default]
    Any,
}

impl SqlType {
    /// Canonical upper-case SQL name of this type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Decimal => "DECIMAL",
            SqlType::Boolean => "BOOLEAN",
            SqlType::Date => "DATE",
            SqlType::Time => "TIME",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::Blob => "BLOB",
            SqlType::Uuid => "UUID",
            SqlType::Any => "ANY",
        }
    }

    /// Parse a declared column type (case-insensitive), accepting the
    /// common spellings used by SQLite, PostgreSQL and MySQL.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let base = s.split('(').next().unwrap_or(s).trim();
        let is = |candidates: &[&str]| candidates.iter().any(|c| base.eq_ignore_ascii_case(c));

        let ty = if is(&["text", "varchar", "char", "character varying", "string", "clob"]) {
            SqlType::Text
        } else if is(&["integer", "int", "bigint", "smallint", "tinyint", "int8", "int4"]) {
            SqlType::Integer
        } else if is(&["real", "double", "double precision", "float", "float8"]) {
            SqlType::Real
        } else if is(&["decimal", "numeric", "money"]) {
            SqlType::Decimal
        } else if is(&["boolean", "bool", "bit"]) {
            SqlType::Boolean
        } else if is(&["date"]) {
            SqlType::Date
        } else if is(&["time"]) {
            SqlType::Time
        } else if is(&["timestamp", "datetime", "datetime2"]) {
            SqlType::Timestamp
        } else if is(&["blob", "bytea", "binary", "varbinary"]) {
            SqlType::Blob
        } else if is(&["uuid", "uniqueidentifier"]) {
            SqlType::Uuid
        } else if is(&["any", ""]) {
            SqlType::Any
        } else {
            return None;
        };
        Some(ty)
    }
}

impl core::fmt::Display for SqlType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for SqlType {
    type Err = SqlTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SqlType::parse(s).ok_or(SqlTypeParseError)
    }
}

/// Error returned when parsing an unknown column type name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlTypeParseError;

impl core::fmt::Display for SqlTypeParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("unknown column type")
    }
}

impl std::error::Error for SqlTypeParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_declared_types() {
        assert_eq!(SqlType::parse("VARCHAR(255)"), Some(SqlType::Text));
        assert_eq!(SqlType::parse("numeric(10, 2)"), Some(SqlType::Decimal));
        assert_eq!(SqlType::parse("BIGINT"), Some(SqlType::Integer));
        assert_eq!(SqlType::parse("datetime"), Some(SqlType::Timestamp));
        assert_eq!(SqlType::parse("bytea"), Some(SqlType::Blob));
        assert_eq!(SqlType::parse("geometry"), None);
    }

    #[test]
    fn test_display_matches_parse() {
        for ty in [
            SqlType::Text,
            SqlType::Integer,
            SqlType::Real,
            SqlType::Decimal,
            SqlType::Boolean,
            SqlType::Date,
            SqlType::Time,
            SqlType::Timestamp,
            SqlType::Blob,
            SqlType::Uuid,
            SqlType::Any,
        ] {
            assert_eq!(SqlType::parse(&ty.to_string()), Some(ty));
        }
    }
}
