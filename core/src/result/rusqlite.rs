//! Buffering a live rusqlite cursor.

use super::{BufferedRows, ResultColumn};
use crate::error::Result;
use crate::value::Value;

impl BufferedRows {
    /// Runs `stmt` and reads every row into memory.
    ///
    /// SQLite reports the `AS` label (or the bare expression text) as the
    /// column name, so label and name are the same here. `tables[i]`, when
    /// given, records the table result column `i` was read from; SQLite only
    /// exposes that through optional column metadata.
    pub fn from_rusqlite_rows<P: ::rusqlite::Params>(
        stmt: &mut ::rusqlite::Statement<'_>,
        params: P,
        tables: &[Option<&str>],
    ) -> Result<Self> {
        let columns: Vec<ResultColumn> = stmt
            .column_names()
            .into_iter()
            .enumerate()
            .map(|(index, name)| {
                let column = ResultColumn::named(name);
                match tables.get(index).copied().flatten() {
                    Some(table) => column.with_table(table),
                    None => column,
                }
            })
            .collect();
        let width = columns.len();

        let mut rows = stmt.query(params)?;
        let mut buffered = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(width);
            for index in 0..width {
                values.push(Value::from(row.get_ref(index)?));
            }
            buffered.push(values);
        }

        BufferedRows::new(columns, buffered)
    }
}
