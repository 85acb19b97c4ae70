//! Tracing utilities for query and result observability.
//!
//! Enable the `tracing` feature to emit events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]` boilerplate
//! at every call site.

/// Emit a debug-level tracing event with the SQL text and argument count.
///
/// ```ignore
/// quarry_trace_query!(&compiled.sql, compiled.arguments.len());
/// ```
#[macro_export]
macro_rules! quarry_trace_query {
    ($sql:expr, $arg_count:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(sql = %$sql, args = $arg_count, "quarry.query");
    };
}

/// Emit a warn-level tracing event for a column that matches more than one
/// result column during a lenient existence check.
///
/// ```ignore
/// quarry_warn_ambiguous!(column.name(), column.table(), matches.len());
/// ```
#[macro_export]
macro_rules! quarry_warn_ambiguous {
    ($column:expr, $table:expr, $matches:expr) => {
        #[cfg(feature = "tracing")]
        tracing::warn!(
            column = %$column,
            table = %$table,
            matches = $matches,
            "quarry.ambiguous_column"
        );
    };
}

/// Emit a trace-level event when the entity resolver creates an entity on
/// the write path.
#[macro_export]
macro_rules! quarry_trace_entity {
    ($event:literal, $property:expr) => {
        #[cfg(feature = "tracing")]
        tracing::trace!(event = $event, property = %$property, "quarry.entity");
    };
}
