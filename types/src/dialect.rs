//! Unified database dialect enum
//!
//! Single source of truth for dialect identification. The formatter in
//! `quarry-core` implements its `SqlDialect` strategy trait for this enum, so
//! every built-in dialect is a variant here and custom dialects implement the
//! trait directly.

/// SQL dialect for database-specific behavior
///
/// Each dialect has different placeholder syntax and pagination rules.
///
/// # Examples
///
/// ```
/// use quarry_types::Dialect;
///
/// let dialect = Dialect::PostgreSQL;
/// assert!(dialect.uses_numbered_placeholders());
///
/// let mysql = Dialect::MySQL;
/// assert!(!mysql.uses_numbered_placeholders());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Dialect {
    /// Generic SQL - `?` placeholders, `LIMIT ? OFFSET ?`
    Generic,

    /// SQLite - `?` positional placeholders
    ///
    /// Compatible with: rusqlite
    #[default]
    SQLite,

    /// PostgreSQL - `$1, $2, ...` numbered placeholders
    PostgreSQL,

    /// MySQL - `?` positional placeholders, `LIMIT offset, count`
    MySQL,

    /// Microsoft SQL Server - `@p1, @p2, ...` placeholders,
    /// `OFFSET .. ROWS FETCH NEXT .. ROWS ONLY`
    SqlServer,
}

impl Dialect {
    /// Returns `true` if this dialect numbers its placeholders
    /// (`$1` for PostgreSQL, `@p1` for SQL Server).
    #[inline]
    #[must_use]
    pub const fn uses_numbered_placeholders(&self) -> bool {
        matches!(self, Dialect::PostgreSQL | Dialect::SqlServer)
    }

    /// Parse a dialect from a string (case-insensitive)
    ///
    /// Supports various common aliases:
    /// - Generic: `"generic"`, `"ansi"`
    /// - SQLite: `"sqlite"`, `"sqlite3"`
    /// - PostgreSQL: `"postgresql"`, `"postgres"`, `"pg"`
    /// - MySQL: `"mysql"`, `"mariadb"`
    /// - SQL Server: `"sqlserver"`, `"mssql"`, `"tsql"`
    ///
    /// # Examples
    ///
    /// ```
    /// use quarry_types::Dialect;
    ///
    /// assert_eq!(Dialect::parse("sqlite"), Some(Dialect::SQLite));
    /// assert_eq!(Dialect::parse("pg"), Some(Dialect::PostgreSQL));
    /// assert_eq!(Dialect::parse("MSSQL"), Some(Dialect::SqlServer));
    /// assert_eq!(Dialect::parse("unknown"), None);
    /// ```
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let is = |candidates: &[&str]| candidates.iter().any(|c| s.eq_ignore_ascii_case(c));

        if is(&["generic", "ansi"]) {
            Some(Dialect::Generic)
        } else if is(&["sqlite", "sqlite3"]) {
            Some(Dialect::SQLite)
        } else if is(&["postgresql", "postgres", "pg"]) {
            Some(Dialect::PostgreSQL)
        } else if is(&["mysql", "mariadb"]) {
            Some(Dialect::MySQL)
        } else if is(&["sqlserver", "mssql", "tsql"]) {
            Some(Dialect::SqlServer)
        } else {
            None
        }
    }

    /// Get the dialect name as a lowercase string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Dialect::Generic => "generic",
            Dialect::SQLite => "sqlite",
            Dialect::PostgreSQL => "postgresql",
            Dialect::MySQL => "mysql",
            Dialect::SqlServer => "sqlserver",
        }
    }
}

impl core::fmt::Display for Dialect {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Dialect {
    type Err = DialectParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dialect::parse(s).ok_or(DialectParseError)
    }
}

/// Deserializes through [`Dialect::parse`], so every alias is accepted.
#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Dialect {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = <String as serde::Deserialize>::deserialize(deserializer)?;
        Dialect::parse(&name).ok_or_else(|| {
            serde::de::Error::unknown_variant(
                &name,
                &["generic", "sqlite", "postgresql", "mysql", "sqlserver"],
            )
        })
    }
}

/// Error returned when parsing an unknown dialect string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectParseError;

impl core::fmt::Display for DialectParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("unknown dialect")
    }
}

impl std::error::Error for DialectParseError {}
