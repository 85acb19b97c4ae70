//! Buffered result sets and column resolution.
//!
//! A [`BufferedRows`] is a fully materialized snapshot of a query result. It
//! owns every value, so it outlives the connection that produced it and can
//! be read from several threads at once; each reader holds its own [`Row`]
//! view or [`RowCursor`].
//!
//! Columns are resolved one of two ways, picked by [`LookupMode`]:
//!
//! ```text
//! Labeled   SELECT "d"."name" AS "dept_name" ...   match on label
//! Wildcard  SELECT * FROM "emp" JOIN "dept" ...     match on name + table
//! ```

#[cfg(feature = "rusqlite")]
mod rusqlite;

use std::io::Cursor;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use compact_str::CompactString;
use rust_decimal::Decimal;
use smallvec::SmallVec;

use crate::ast::Select;
use crate::error::{QuarryError, Result};
use crate::schema::Column;
use crate::types::SqlTypeExt;
use crate::value::{FromValue, Value};

/// Metadata of one result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultColumn {
    label: CompactString,
    name: CompactString,
    table: Option<CompactString>,
}

impl ResultColumn {
    pub fn new(label: impl Into<CompactString>, name: impl Into<CompactString>) -> Self {
        Self {
            label: label.into(),
            name: name.into(),
            table: None,
        }
    }

    /// A column reported under its own name.
    pub fn named(name: impl Into<CompactString>) -> Self {
        let name = name.into();
        Self::new(name.clone(), name)
    }

    /// Records the table the column was read from.
    pub fn with_table(mut self, table: impl Into<CompactString>) -> Self {
        self.table = Some(table.into());
        self
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning table, when the driver reports one.
    #[inline]
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }
}

/// An immutable, connection-independent snapshot of a result.
#[derive(Debug, Clone, Default)]
pub struct BufferedRows {
    columns: Arc<[ResultColumn]>,
    rows: Vec<Box<[Value]>>,
}

impl BufferedRows {
    /// Builds a snapshot from already-read values.
    ///
    /// Fails with [`QuarryError::Execution`] when a row's width differs from
    /// the column count.
    pub fn new(columns: Vec<ResultColumn>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| {
                if row.len() == width {
                    Ok(row.into_boxed_slice())
                } else {
                    Err(QuarryError::Execution(format!(
                        "row {index} has {} values for {width} columns",
                        row.len()
                    )))
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            columns: columns.into(),
            rows,
        })
    }

    #[inline]
    pub fn columns(&self) -> &[ResultColumn] {
        &self.columns
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    pub fn values(&self, row: usize) -> Option<&[Value]> {
        self.rows.get(row).map(AsRef::as_ref)
    }
}

/// How [`Row::get`] finds the result column for a [`Column`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupMode {
    /// The query declared its select list; match on label.
    Labeled,
    /// The query selected every column; match on name and table.
    Wildcard,
}

impl LookupMode {
    pub fn for_select(select: &Select) -> Self {
        if select.has_projections() {
            LookupMode::Labeled
        } else {
            LookupMode::Wildcard
        }
    }
}

/// A buffered result bound to a lookup mode.
#[derive(Debug, Clone)]
pub struct ResultSet {
    rows: BufferedRows,
    mode: LookupMode,
}

impl ResultSet {
    pub fn new(rows: BufferedRows, mode: LookupMode) -> Self {
        Self { rows, mode }
    }

    /// Picks the lookup mode from the query that produced `rows`.
    pub fn for_select(rows: BufferedRows, select: &Select) -> Self {
        Self::new(rows, LookupMode::for_select(select))
    }

    #[inline]
    pub fn mode(&self) -> LookupMode {
        self.mode
    }

    #[inline]
    pub fn columns(&self) -> &[ResultColumn] {
        self.rows.columns()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        (index < self.rows.len()).then_some(Row { set: self, index })
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = Row<'_>> + '_ {
        (0..self.rows.len()).map(move |index| Row { set: self, index })
    }

    /// A positioned reader starting before the first row.
    pub fn cursor(&self) -> RowCursor<'_> {
        RowCursor {
            set: self,
            position: None,
        }
    }

    #[inline]
    pub fn into_buffered(self) -> BufferedRows {
        self.rows
    }
}

/// Forward-only cursor over a [`ResultSet`].
#[derive(Debug, Clone)]
pub struct RowCursor<'r> {
    set: &'r ResultSet,
    position: Option<usize>,
}

impl<'r> RowCursor<'r> {
    /// Advances to the next row; `false` once the rows are exhausted.
    pub fn next(&mut self) -> bool {
        let next = self.position.map_or(0, |p| p + 1);
        if next < self.set.len() {
            self.position = Some(next);
            true
        } else {
            self.position = Some(self.set.len());
            false
        }
    }

    /// The current row, if the cursor is on one.
    pub fn row(&self) -> Option<Row<'r>> {
        self.position.and_then(|index| self.set.row(index))
    }
}

/// One row of a [`ResultSet`].
#[derive(Debug, Clone, Copy)]
pub struct Row<'r> {
    set: &'r ResultSet,
    index: usize,
}

impl<'r> Row<'r> {
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn values(&self) -> &'r [Value] {
        &self.set.rows.rows[self.index]
    }

    /// Reads `column`, decoded through its semantic type.
    ///
    /// Absent columns give `Ok(None)`. In wildcard mode, more than one
    /// matching result column is [`QuarryError::AmbiguousColumn`].
    pub fn get(&self, column: &Column) -> Result<Option<Value>> {
        let index = match self.set.mode {
            LookupMode::Labeled => self.position_by_label(&column.effective_label()),
            LookupMode::Wildcard => {
                let matches = self.wildcard_matches(column);
                match matches.as_slice() {
                    [] => None,
                    [index] => Some(*index),
                    _ => {
                        return Err(QuarryError::AmbiguousColumn {
                            column: column.name().to_string(),
                            table: column.table_reference().to_string(),
                            matches: matches.len(),
                        });
                    }
                }
            }
        };

        match index {
            Some(index) => column.ty().decode(&self.values()[index]).map(Some),
            None => Ok(None),
        }
    }

    /// Whether `column` is present in the row, NULL or not.
    ///
    /// Unlike [`Row::get`], an ambiguous wildcard match is reported as
    /// present after a warning.
    pub fn has_column(&self, column: &Column) -> bool {
        match self.set.mode {
            LookupMode::Labeled => self.position_by_label(&column.effective_label()).is_some(),
            LookupMode::Wildcard => {
                let matches = self.wildcard_matches(column);
                if matches.len() > 1 {
                    crate::quarry_warn_ambiguous!(
                        column.name(),
                        column.table_reference(),
                        matches.len()
                    );
                }
                !matches.is_empty()
            }
        }
    }

    /// Index of the result column reported as `label`, falling back to the
    /// raw column name.
    pub fn find_column(&self, label: &str) -> Option<usize> {
        self.position_by_label(label).or_else(|| {
            self.set
                .columns()
                .iter()
                .position(|c| c.name().eq_ignore_ascii_case(label))
        })
    }

    /// Raw value by label; unknown labels are an error.
    pub fn get_value(&self, label: &str) -> Result<&'r Value> {
        let index = self.find_column(label).ok_or_else(|| {
            QuarryError::Execution(format!("result has no column `{label}`"))
        })?;
        Ok(&self.values()[index])
    }

    /// Typed value by label; NULL gives `Ok(None)`.
    pub fn get_as<T: FromValue>(&self, label: &str) -> Result<Option<T>> {
        Option::<T>::from_value(self.get_value(label)?)
    }

    pub fn get_string(&self, label: &str) -> Result<Option<String>> {
        self.get_as(label)
    }

    pub fn get_i64(&self, label: &str) -> Result<Option<i64>> {
        self.get_as(label)
    }

    pub fn get_i32(&self, label: &str) -> Result<Option<i32>> {
        self.get_as(label)
    }

    pub fn get_f64(&self, label: &str) -> Result<Option<f64>> {
        self.get_as(label)
    }

    pub fn get_bool(&self, label: &str) -> Result<Option<bool>> {
        self.get_as(label)
    }

    pub fn get_decimal(&self, label: &str) -> Result<Option<Decimal>> {
        self.get_as(label)
    }

    pub fn get_date(&self, label: &str) -> Result<Option<NaiveDate>> {
        self.get_as(label)
    }

    pub fn get_time(&self, label: &str) -> Result<Option<NaiveTime>> {
        self.get_as(label)
    }

    pub fn get_timestamp(&self, label: &str) -> Result<Option<NaiveDateTime>> {
        self.get_as(label)
    }

    pub fn get_bytes(&self, label: &str) -> Result<Option<Vec<u8>>> {
        self.get_as(label)
    }

    /// Reader over a BLOB or TEXT cell, borrowed from the buffer.
    pub fn get_stream(&self, label: &str) -> Result<Option<Cursor<&'r [u8]>>> {
        match self.get_value(label)? {
            Value::Null => Ok(None),
            Value::Blob(bytes) => Ok(Some(Cursor::new(bytes.as_slice()))),
            Value::Text(text) => Ok(Some(Cursor::new(text.as_bytes()))),
            other => Err(QuarryError::conversion(format!(
                "cannot stream a {} value",
                other.kind()
            ))),
        }
    }

    fn position_by_label(&self, label: &str) -> Option<usize> {
        self.set
            .columns()
            .iter()
            .position(|c| c.label().eq_ignore_ascii_case(label))
    }

    fn wildcard_matches(&self, column: &Column) -> SmallVec<[usize; 2]> {
        self.set
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, c)| {
                c.name().eq_ignore_ascii_case(column.name())
                    && c.table().is_none_or(|table| column.belongs_to(table))
            })
            .map(|(index, _)| index)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Table;
    use crate::types::SqlType;
    use std::io::Read;

    fn joined() -> BufferedRows {
        BufferedRows::new(
            vec![
                ResultColumn::named("id").with_table("emp"),
                ResultColumn::named("name").with_table("emp"),
                ResultColumn::named("id").with_table("dept"),
                ResultColumn::named("name").with_table("dept"),
            ],
            vec![vec![
                Value::Integer(1),
                Value::from("Ann"),
                Value::Integer(10),
                Value::Null,
            ]],
        )
        .unwrap()
    }

    #[test]
    fn test_row_width_is_checked() {
        let err = BufferedRows::new(vec![ResultColumn::named("a")], vec![vec![]]).unwrap_err();
        assert!(matches!(err, QuarryError::Execution(_)));
    }

    #[test]
    fn test_labeled_lookup() {
        let rows = BufferedRows::new(
            vec![ResultColumn::new("DEPT_NAME", "name")],
            vec![vec![Value::from("Sales")]],
        )
        .unwrap();
        let set = ResultSet::new(rows, LookupMode::Labeled);
        let row = set.row(0).unwrap();

        let labeled = Column::new("dept", "name", SqlType::Text).with_label("dept_name");
        assert_eq!(row.get(&labeled).unwrap(), Some(Value::from("Sales")));
        assert!(row.has_column(&labeled));

        let unlabeled = Column::new("dept", "name", SqlType::Text).with_label("other");
        assert_eq!(row.get(&unlabeled).unwrap(), None);
        assert!(!row.has_column(&unlabeled));
    }

    #[test]
    fn test_wildcard_lookup_by_table_and_name() {
        let set = ResultSet::new(joined(), LookupMode::Wildcard);
        let row = set.row(0).unwrap();

        let dept_id = Column::new("dept", "id", SqlType::Integer);
        assert_eq!(row.get(&dept_id).unwrap(), Some(Value::Integer(10)));

        let aliased = Column::new("departments", "id", SqlType::Integer).with_table_alias("dept");
        assert_eq!(row.get(&aliased).unwrap(), Some(Value::Integer(10)));

        // NULL still counts as present
        let dept_name = Column::new("dept", "name", SqlType::Text);
        assert!(row.has_column(&dept_name));
        assert_eq!(row.get(&dept_name).unwrap(), Some(Value::Null));

        let missing = Column::new("loc", "id", SqlType::Integer);
        assert_eq!(row.get(&missing).unwrap(), None);
    }

    #[test]
    fn test_wildcard_ambiguity_is_strict_on_read_lenient_on_exists() {
        let rows = BufferedRows::new(
            vec![ResultColumn::named("id"), ResultColumn::named("id")],
            vec![vec![Value::Integer(1), Value::Integer(2)]],
        )
        .unwrap();
        let set = ResultSet::new(rows, LookupMode::Wildcard);
        let row = set.row(0).unwrap();
        let id = Column::new("emp", "id", SqlType::Integer);

        assert!(row.has_column(&id));
        let err = row.get(&id).unwrap_err();
        assert!(matches!(
            err,
            QuarryError::AmbiguousColumn { matches: 2, .. }
        ));
    }

    #[test]
    fn test_get_decodes_through_column_type() {
        let rows = BufferedRows::new(
            vec![ResultColumn::named("hired").with_table("emp")],
            vec![vec![Value::from("2021-06-01")]],
        )
        .unwrap();
        let set = ResultSet::new(rows, LookupMode::Wildcard);
        let table = Table::new("emp").column("hired", SqlType::Date);
        let hired = table.require("hired").unwrap();
        assert_eq!(
            set.row(0).unwrap().get(hired).unwrap(),
            Some(Value::Date(NaiveDate::from_ymd_opt(2021, 6, 1).unwrap()))
        );
    }

    #[test]
    fn test_find_column_prefers_label_then_name() {
        let rows = BufferedRows::new(
            vec![
                ResultColumn::new("total", "amount"),
                ResultColumn::new("amount", "other"),
            ],
            vec![vec![Value::Integer(5), Value::Integer(7)]],
        )
        .unwrap();
        let set = ResultSet::new(rows, LookupMode::Labeled);
        let row = set.row(0).unwrap();

        assert_eq!(row.find_column("TOTAL"), Some(0));
        assert_eq!(row.find_column("amount"), Some(1));
        assert_eq!(row.find_column("other"), Some(1));
        assert_eq!(row.find_column("nope"), None);
        assert_eq!(row.get_i64("total").unwrap(), Some(5));
        assert!(matches!(
            row.get_i64("nope"),
            Err(QuarryError::Execution(_))
        ));
    }

    #[test]
    fn test_typed_accessors() {
        let rows = BufferedRows::new(
            vec![
                ResultColumn::named("name"),
                ResultColumn::named("salary"),
                ResultColumn::named("active"),
                ResultColumn::named("photo"),
                ResultColumn::named("manager"),
            ],
            vec![vec![
                Value::from("Ann"),
                Value::from("1234.50"),
                Value::Integer(1),
                Value::Blob(vec![1, 2, 3]),
                Value::Null,
            ]],
        )
        .unwrap();
        let set = ResultSet::new(rows, LookupMode::Labeled);
        let row = set.row(0).unwrap();

        assert_eq!(row.get_string("name").unwrap().as_deref(), Some("Ann"));
        assert_eq!(
            row.get_decimal("salary").unwrap(),
            Some(Decimal::new(123450, 2))
        );
        assert_eq!(row.get_bool("active").unwrap(), Some(true));
        assert_eq!(row.get_bytes("photo").unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(row.get_i32("manager").unwrap(), None);

        let mut buf = Vec::new();
        row.get_stream("photo")
            .unwrap()
            .unwrap()
            .read_to_end(&mut buf)
            .unwrap();
        assert_eq!(buf, [1, 2, 3]);
    }

    #[test]
    fn test_cursor_walks_every_row_once() {
        let rows = BufferedRows::new(
            vec![ResultColumn::named("n")],
            vec![vec![Value::Integer(1)], vec![Value::Integer(2)]],
        )
        .unwrap();
        let set = ResultSet::new(rows, LookupMode::Labeled);
        let mut cursor = set.cursor();
        assert!(cursor.row().is_none());

        let mut seen = Vec::new();
        while cursor.next() {
            seen.push(cursor.row().unwrap().get_i64("n").unwrap().unwrap());
        }
        assert_eq!(seen, [1, 2]);
        assert!(!cursor.next());
        assert!(cursor.row().is_none());
        assert_eq!(set.rows().len(), 2);
    }

    #[test]
    fn test_mode_follows_select_list() {
        let table = Arc::new(Table::new("emp").column("id", SqlType::Integer));
        assert_eq!(
            LookupMode::for_select(&Select::from(&table)),
            LookupMode::Wildcard
        );
        assert_eq!(
            LookupMode::for_select(&Select::from(&table).columns_of(&table)),
            LookupMode::Labeled
        );
    }
}
