//! Statement execution on a rusqlite connection.

use compact_str::CompactString;
use quarry_core::{
    BufferedRows, Compiled, Expr, Formatter, Result, ResultSet, Select, Source, Statement,
};
use rusqlite::{Connection, Params, params_from_iter};

/// Reads every row of `stmt` into a [`BufferedRows`].
///
/// `tables[i]` names the table result column `i` comes from, when known.
pub fn buffer_rows<P: Params>(
    stmt: &mut rusqlite::Statement<'_>,
    params: P,
    tables: &[Option<&str>],
) -> Result<BufferedRows> {
    BufferedRows::from_rusqlite_rows(stmt, params, tables)
}

/// Runs a compiled query and buffers its rows. Result columns carry no
/// table names; see [`execute_buffered_with_tables`].
pub fn execute_buffered(conn: &Connection, compiled: &Compiled) -> Result<BufferedRows> {
    execute_buffered_with_tables(conn, compiled, &[])
}

pub fn execute_buffered_with_tables(
    conn: &Connection,
    compiled: &Compiled,
    tables: &[Option<&str>],
) -> Result<BufferedRows> {
    let mut stmt = conn.prepare(&compiled.sql)?;
    let rows = buffer_rows(&mut stmt, params_from_iter(compiled.arguments.iter()), tables)?;
    #[cfg(feature = "tracing")]
    tracing::debug!(rows = rows.len(), "quarry.sqlite.buffered");
    Ok(rows)
}

/// Runs a compiled statement that returns no rows; the number of changed
/// rows is returned.
pub fn execute(conn: &Connection, compiled: &Compiled) -> Result<usize> {
    let changed = conn.execute(&compiled.sql, params_from_iter(compiled.arguments.iter()))?;
    #[cfg(feature = "tracing")]
    tracing::debug!(changed, "quarry.sqlite.executed");
    Ok(changed)
}

/// The table each result column of `select` is read from, as far as the
/// query shape tells.
///
/// With a select list, column projections give their table. For `SELECT *`
/// each table source contributes its descriptor's columns in order, which
/// matches SQLite's expansion when the descriptor lists every column of the
/// table in declaration order. A subquery source ends the known prefix.
pub fn select_tables(select: &Select) -> Vec<Option<CompactString>> {
    if select.has_projections() {
        return select
            .projections
            .iter()
            .map(|projection| match &projection.expr {
                Expr::Column(column) => Some(CompactString::from(column.table_reference())),
                _ => None,
            })
            .collect();
    }

    let sources = select
        .from
        .iter()
        .chain(select.joins.iter().map(|join| &join.source));
    let mut tables = Vec::new();
    for source in sources {
        match source {
            Source::Table(table) => {
                let name = CompactString::from(table.reference_name());
                tables.extend(std::iter::repeat_n(Some(name), table.columns().len()));
            }
            Source::Subquery { .. } => break,
        }
    }
    tables
}

/// Formatting plus execution on a connection.
pub trait SqliteExt {
    /// Formats and runs `select`, returning a result set in the lookup mode
    /// the query calls for.
    fn query_select(&self, formatter: &Formatter, select: &Select) -> Result<ResultSet>;

    /// Formats and runs a statement that returns no rows.
    fn execute_statement(&self, formatter: &Formatter, statement: &Statement) -> Result<usize>;
}

impl SqliteExt for Connection {
    fn query_select(&self, formatter: &Formatter, select: &Select) -> Result<ResultSet> {
        let compiled = formatter.format_select(select)?;
        let tables = select_tables(select);
        let tables: Vec<Option<&str>> = tables.iter().map(|t| t.as_deref()).collect();
        let rows = execute_buffered_with_tables(self, &compiled, &tables)?;
        Ok(ResultSet::for_select(rows, select))
    }

    fn execute_statement(&self, formatter: &Formatter, statement: &Statement) -> Result<usize> {
        let compiled = formatter.format(statement)?;
        execute(self, &compiled)
    }
}
