//! SQLite adapter for quarry
//!
//! Runs [`Compiled`](quarry_core::Compiled) statements on a
//! [`rusqlite::Connection`] and buffers the results into
//! [`BufferedRows`](quarry_core::BufferedRows), so they can be read after the
//! statement and connection are gone.
//!
//! # Features
//!
//! - `rusqlite` - rusqlite driver (enabled by default)
//! - `tracing` - debug events for executed statements (enabled by default)
//! - `uuid` - bind and read UUID values

#[cfg(feature = "rusqlite")]
pub mod connection;
#[cfg(feature = "rusqlite")]
pub mod introspect;

#[cfg(feature = "rusqlite")]
pub use connection::{
    SqliteExt, buffer_rows, execute, execute_buffered, execute_buffered_with_tables, select_tables,
};
#[cfg(feature = "rusqlite")]
pub use introspect::load_table;

use quarry_core::{Dialect, Formatter};

/// A compact formatter for SQLite.
pub fn formatter() -> Formatter {
    Formatter::new(Dialect::SQLite)
}

/// Prelude module for commonly used types
pub mod prelude {
    #[cfg(feature = "rusqlite")]
    pub use crate::connection::SqliteExt;
    pub use crate::formatter;
    pub use quarry_core::prelude::*;
}
