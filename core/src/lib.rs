//! Core of quarry: statement AST, formatter, result materialization and the
//! entity binding resolver.

pub mod ast;
pub mod config;
pub mod dialect;
pub mod entity;
pub mod error;
pub mod format;
pub mod result;
pub mod schema;
pub mod sql;
pub mod tracing;
pub mod types;
pub mod value;

// Re-export key types and traits
pub use ast::{
    Argument, BinaryOp, Delete, Direction, Expr, Insert, Join, JoinKind, NullsOrder, OrderTerm,
    Pagination, Projection, Select, Source, Statement, UnaryOp, Update,
};
pub use config::{ConfigError, FormatConfig};
pub use dialect::{Dialect, SqlDialect};
pub use entity::{Entity, EntityGraph, EntityId, Property};
pub use error::{QuarryError, Result};
pub use format::{Compiled, Formatter};
pub use result::{BufferedRows, LookupMode, ResultColumn, ResultSet, Row, RowCursor};
pub use schema::{Binding, Column, NestedBinding, ReferenceBinding, Table};
pub use sql::{Layout, SQL, SQLChunk, Token};
pub use types::{SqlType, SqlTypeExt};
pub use value::{FromValue, Value};

/// Prelude module for commonly used types
pub mod prelude {
    pub use crate::ast::{Expr, Insert, JoinKind, OrderTerm, Projection, Select, Statement};
    pub use crate::dialect::{Dialect, SqlDialect};
    pub use crate::entity::{EntityGraph, EntityId};
    pub use crate::error::{QuarryError, Result};
    pub use crate::format::{Compiled, Formatter};
    pub use crate::result::{BufferedRows, LookupMode, ResultSet};
    pub use crate::schema::{Binding, Column, Table};
    pub use crate::types::{SqlType, SqlTypeExt};
    pub use crate::value::Value;
}
