//! # Quarry
//!
//! A typed SQL compiler and entity-binding layer. Statements are built as
//! values, rendered for a target dialect with positional arguments, and their
//! buffered results are read back by column or mapped onto entity graphs.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use quarry::prelude::*;
//!
//! # fn main() -> quarry::Result<()> {
//! let emp = Arc::new(
//!     Table::new("emp")
//!         .column("id", SqlType::Integer)
//!         .column("name", SqlType::Text),
//! );
//!
//! let select = Select::from(&emp)
//!     .column(emp.require("name")?)
//!     .filter(Expr::column(emp.require("id")?).eq(Expr::value(7)));
//!
//! let compiled = Formatter::new(Dialect::PostgreSQL).format_select(&select)?;
//! assert_eq!(
//!     compiled.sql,
//!     r#"SELECT "emp"."name" AS "emp_name" FROM "emp" WHERE "emp"."id" = $1"#
//! );
//! assert_eq!(compiled.param_count(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Database Support
//!
//! | Database   | Driver   | Feature Flag | Status |
//! |------------|----------|--------------|--------|
//! | SQLite     | rusqlite | `rusqlite`   | ✅     |
//!
//! Every [`Dialect`] can be rendered; only SQLite has an execution adapter.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub use quarry_core::error::{QuarryError, Result};
pub use quarry_types::Dialect;

/// Error types
pub mod error {
    pub use quarry_core::error::{QuarryError, Result};
    pub use quarry_core::config::ConfigError;
}

/// Statement AST, formatter, result sets and entity graphs.
pub mod core {
    pub use quarry_core::*;
}

/// Dialect and SQL type names.
pub use quarry_types as types;

/// SQLite execution on rusqlite.
#[cfg(feature = "sqlite")]
#[cfg_attr(docsrs, doc(cfg(feature = "sqlite")))]
pub mod sqlite {
    pub use quarry_sqlite::*;
}

/// Prelude module for commonly used types
pub mod prelude {
    pub use quarry_core::prelude::*;

    #[cfg(feature = "rusqlite")]
    pub use quarry_sqlite::prelude::SqliteExt;
}
