//! Shared type definitions for quarry
//!
//! This crate provides the vocabulary shared by every quarry crate:
//!
//! - [`Dialect`] - Database dialect enum (generic SQL, SQLite, PostgreSQL, MySQL, SQL Server)
//! - [`SqlType`] - Semantic column types used for argument encoding and result decoding
//!
//! # Features
//!
//! - `std` - Standard library support (enabled by default)
//! - `serde` - Enable serde serialization/deserialization of dialect and type names

mod dialect;
mod sql_type;

pub use dialect::{Dialect, DialectParseError};
pub use sql_type::{SqlType, SqlTypeParseError};

/// Prelude module for commonly used types
pub mod prelude {
    pub use crate::Dialect;
    pub use crate::SqlType;
}
