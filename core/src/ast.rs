//! Statement AST
//!
//! An immutable tree of owned nodes. Tables and columns are shared through
//! `Arc`, so the tree is acyclic, cheap to clone, and `Send + Sync`. The
//! formatter only ever borrows it.
//!
//! The builder methods here are thin conveniences over the public fields; a
//! caller that already has a validated tree can construct the structs
//! directly.

use std::sync::Arc;

use compact_str::CompactString;

use crate::schema::{Column, Table};
use crate::types::{SqlType, SqlTypeExt};
use crate::value::Value;

/// A bound argument: a value plus the semantic type used to encode it.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub value: Value,
    pub ty: SqlType,
}

impl Argument {
    #[inline]
    pub fn new(value: impl Into<Value>, ty: SqlType) -> Self {
        Self {
            value: value.into(),
            ty,
        }
    }

    /// An argument whose type is inferred from the value.
    #[inline]
    pub fn inferred(value: impl Into<Value>) -> Self {
        let value = value.into();
        let ty = SqlType::of(&value);
        Self { value, ty }
    }
}

//------------------------------------------------------------------------------
// Statements
//------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Statement {
    Select(Select),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
}

impl From<Select> for Statement {
    fn from(value: Select) -> Self {
        Statement::Select(value)
    }
}

impl From<Insert> for Statement {
    fn from(value: Insert) -> Self {
        Statement::Insert(value)
    }
}

impl From<Update> for Statement {
    fn from(value: Update) -> Self {
        Statement::Update(value)
    }
}

impl From<Delete> for Statement {
    fn from(value: Delete) -> Self {
        Statement::Delete(value)
    }
}

/// A `SELECT` query. Clause order on render is fixed: projections, from,
/// joins, where, group by, having, order by, pagination.
#[derive(Debug, Clone, Default)]
pub struct Select {
    pub distinct: bool,
    /// Empty means `SELECT *`.
    pub projections: Vec<Projection>,
    pub from: Option<Source>,
    pub joins: Vec<Join>,
    pub filter: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    pub order_by: Vec<OrderTerm>,
    pub pagination: Option<Pagination>,
}

impl Select {
    /// `SELECT * FROM table`
    pub fn from(table: &Arc<Table>) -> Self {
        Self {
            from: Some(Source::Table(Arc::clone(table))),
            ..Self::default()
        }
    }

    /// `true` when the query declares an explicit select list.
    #[inline]
    pub fn has_projections(&self) -> bool {
        !self.projections.is_empty()
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Projects a column under its effective label.
    pub fn column(mut self, column: &Arc<Column>) -> Self {
        self.projections.push(Projection::column(column));
        self
    }

    /// Projects every column of a table.
    pub fn columns_of(mut self, table: &Table) -> Self {
        self.projections
            .extend(table.columns().iter().map(Projection::column));
        self
    }

    pub fn project(mut self, projection: Projection) -> Self {
        self.projections.push(projection);
        self
    }

    pub fn join(mut self, kind: JoinKind, table: &Arc<Table>, on: Expr) -> Self {
        self.joins.push(Join {
            kind,
            source: Source::Table(Arc::clone(table)),
            on: Some(on),
        });
        self
    }

    pub fn cross_join(mut self, table: &Arc<Table>) -> Self {
        self.joins.push(Join {
            kind: JoinKind::Cross,
            source: Source::Table(Arc::clone(table)),
            on: None,
        });
        self
    }

    /// Adds a predicate; repeated calls are combined with `AND`.
    pub fn filter(mut self, predicate: Expr) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }

    pub fn group_by(mut self, expr: Expr) -> Self {
        self.group_by.push(expr);
        self
    }

    pub fn having(mut self, predicate: Expr) -> Self {
        self.having = Some(match self.having.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }

    pub fn order_by(mut self, term: OrderTerm) -> Self {
        self.order_by.push(term);
        self
    }

    /// Requests pagination; unset bounds fall back to the defaults in
    /// [`Pagination::resolve`].
    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.pagination.get_or_insert_with(Pagination::default).limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.pagination.get_or_insert_with(Pagination::default).offset = Some(offset);
        self
    }
}

/// A `FROM` / `JOIN` source.
#[derive(Debug, Clone)]
pub enum Source {
    Table(Arc<Table>),
    Subquery {
        query: Box<Select>,
        alias: CompactString,
    },
}

/// One item of the select list.
#[derive(Debug, Clone)]
pub struct Projection {
    pub expr: Expr,
    pub label: Option<CompactString>,
}

impl Projection {
    /// Projects a column under its effective label (`AS "label"`).
    pub fn column(column: &Arc<Column>) -> Self {
        Self {
            expr: Expr::Column(Arc::clone(column)),
            label: Some(CompactString::from(column.effective_label())),
        }
    }

    /// Projects an arbitrary expression under `label`.
    pub fn labeled(expr: Expr, label: impl Into<CompactString>) -> Self {
        Self {
            expr,
            label: Some(label.into()),
        }
    }

    pub fn expr(expr: Expr) -> Self {
        Self { expr, label: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Full => "FULL JOIN",
            JoinKind::Cross => "CROSS JOIN",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Join {
    pub kind: JoinKind,
    pub source: Source,
    /// Required for every kind except `Cross`.
    pub on: Option<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullsOrder {
    First,
    Last,
}

#[derive(Debug, Clone)]
pub struct OrderTerm {
    pub expr: Expr,
    pub direction: Direction,
    pub nulls: Option<NullsOrder>,
}

impl OrderTerm {
    pub fn asc(expr: Expr) -> Self {
        Self {
            expr,
            direction: Direction::Asc,
            nulls: None,
        }
    }

    pub fn desc(expr: Expr) -> Self {
        Self {
            expr,
            direction: Direction::Desc,
            nulls: None,
        }
    }

    pub fn nulls(mut self, nulls: NullsOrder) -> Self {
        self.nulls = Some(nulls);
        self
    }
}

/// Pagination bounds as requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pagination {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl Pagination {
    /// Largest count representable as a SQL integer argument.
    pub const MAX_LIMIT: u64 = i64::MAX as u64;

    pub const fn new(offset: Option<u64>, limit: Option<u64>) -> Self {
        Self { offset, limit }
    }

    /// `(offset, limit)` with defaults applied: offset 0, limit
    /// [`Pagination::MAX_LIMIT`].
    pub fn resolve(&self) -> (u64, u64) {
        (
            self.offset.unwrap_or(0),
            self.limit.unwrap_or(Self::MAX_LIMIT),
        )
    }
}

//------------------------------------------------------------------------------
// INSERT / UPDATE / DELETE
//------------------------------------------------------------------------------

/// `INSERT INTO table (columns) VALUES (row), (row), ...`
#[derive(Debug, Clone)]
pub struct Insert {
    pub table: Arc<Table>,
    pub columns: Vec<Arc<Column>>,
    pub rows: Vec<Vec<Expr>>,
}

impl Insert {
    pub fn into(table: &Arc<Table>) -> Self {
        Self {
            table: Arc::clone(table),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn columns<'c>(mut self, columns: impl IntoIterator<Item = &'c Arc<Column>>) -> Self {
        self.columns.extend(columns.into_iter().cloned());
        self
    }

    /// Appends one row of values, typed by the matching columns.
    ///
    /// Values past the column list are kept with an inferred type, so the
    /// formatter rejects the row instead of losing them.
    pub fn values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let row = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| match self.columns.get(index) {
                Some(column) => Expr::arg(value, column.ty()),
                None => Expr::value(value),
            })
            .collect();
        self.rows.push(row);
        self
    }

    pub fn row(mut self, row: Vec<Expr>) -> Self {
        self.rows.push(row);
        self
    }
}

/// `UPDATE table SET column = expr, ... [WHERE ...]`
#[derive(Debug, Clone)]
pub struct Update {
    pub table: Arc<Table>,
    pub assignments: Vec<(Arc<Column>, Expr)>,
    pub filter: Option<Expr>,
}

impl Update {
    pub fn table(table: &Arc<Table>) -> Self {
        Self {
            table: Arc::clone(table),
            assignments: Vec::new(),
            filter: None,
        }
    }

    pub fn set(mut self, column: &Arc<Column>, value: impl Into<Value>) -> Self {
        let expr = Expr::arg(value, column.ty());
        self.assignments.push((Arc::clone(column), expr));
        self
    }

    pub fn set_expr(mut self, column: &Arc<Column>, expr: Expr) -> Self {
        self.assignments.push((Arc::clone(column), expr));
        self
    }

    pub fn filter(mut self, predicate: Expr) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }
}

/// `DELETE FROM table [WHERE ...]`
#[derive(Debug, Clone)]
pub struct Delete {
    pub table: Arc<Table>,
    pub filter: Option<Expr>,
}

impl Delete {
    pub fn from(table: &Arc<Table>) -> Self {
        Self {
            table: Arc::clone(table),
            filter: None,
        }
    }

    pub fn filter(mut self, predicate: Expr) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }
}

//------------------------------------------------------------------------------
// Expressions
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Add,
    Sub,
    Mul,
    Div,
    Concat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone)]
pub enum Expr {
    /// Qualified column reference.
    Column(Arc<Column>),
    /// A bound argument; renders as one placeholder.
    Argument(Argument),
    /// Unparameterized SQL text, rendered verbatim.
    Raw(CompactString),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Function {
        name: CompactString,
        args: Vec<Expr>,
    },
    IsNull {
        expr: Box<Expr>,
        negated: bool,
    },
    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
        negated: bool,
    },
    Like {
        expr: Box<Expr>,
        pattern: Box<Expr>,
        negated: bool,
    },
    Subquery(Box<Select>),
    Exists {
        query: Box<Select>,
        negated: bool,
    },
}

impl Expr {
    #[inline]
    pub fn column(column: &Arc<Column>) -> Self {
        Expr::Column(Arc::clone(column))
    }

    #[inline]
    pub fn arg(value: impl Into<Value>, ty: SqlType) -> Self {
        Expr::Argument(Argument::new(value, ty))
    }

    /// An argument whose type is inferred from the value.
    #[inline]
    pub fn value(value: impl Into<Value>) -> Self {
        Expr::Argument(Argument::inferred(value))
    }

    #[inline]
    pub fn raw(text: impl Into<CompactString>) -> Self {
        Expr::Raw(text.into())
    }

    pub fn func(name: impl Into<CompactString>, args: Vec<Expr>) -> Self {
        Expr::Function {
            name: name.into(),
            args,
        }
    }

    /// `COUNT(*)`
    pub fn count_all() -> Self {
        Expr::func("COUNT", vec![Expr::raw("*")])
    }

    pub fn subquery(query: Select) -> Self {
        Expr::Subquery(Box::new(query))
    }

    pub fn exists(query: Select) -> Self {
        Expr::Exists {
            query: Box::new(query),
            negated: false,
        }
    }

    fn binary(self, op: BinaryOp, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(self),
            rhs: Box::new(rhs),
        }
    }

    pub fn eq(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Eq, rhs)
    }

    pub fn ne(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Ne, rhs)
    }

    pub fn lt(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Lt, rhs)
    }

    pub fn le(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Le, rhs)
    }

    pub fn gt(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Gt, rhs)
    }

    pub fn ge(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Ge, rhs)
    }

    pub fn and(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::And, rhs)
    }

    pub fn or(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Or, rhs)
    }

    pub fn add(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Add, rhs)
    }

    pub fn sub(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Sub, rhs)
    }

    pub fn mul(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Mul, rhs)
    }

    pub fn div(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Div, rhs)
    }

    pub fn concat(self, rhs: Expr) -> Self {
        self.binary(BinaryOp::Concat, rhs)
    }

    pub fn not(self) -> Self {
        Expr::Unary {
            op: UnaryOp::Not,
            expr: Box::new(self),
        }
    }

    pub fn neg(self) -> Self {
        Expr::Unary {
            op: UnaryOp::Neg,
            expr: Box::new(self),
        }
    }

    pub fn is_null(self) -> Self {
        Expr::IsNull {
            expr: Box::new(self),
            negated: false,
        }
    }

    pub fn is_not_null(self) -> Self {
        Expr::IsNull {
            expr: Box::new(self),
            negated: true,
        }
    }

    pub fn in_list(self, list: Vec<Expr>) -> Self {
        Expr::InList {
            expr: Box::new(self),
            list,
            negated: false,
        }
    }

    pub fn not_in_list(self, list: Vec<Expr>) -> Self {
        Expr::InList {
            expr: Box::new(self),
            list,
            negated: true,
        }
    }

    pub fn between(self, low: Expr, high: Expr) -> Self {
        Expr::Between {
            expr: Box::new(self),
            low: Box::new(low),
            high: Box::new(high),
            negated: false,
        }
    }

    pub fn like(self, pattern: Expr) -> Self {
        Expr::Like {
            expr: Box::new(self),
            pattern: Box::new(pattern),
            negated: false,
        }
    }

    pub fn not_like(self, pattern: Expr) -> Self {
        Expr::Like {
            expr: Box::new(self),
            pattern: Box::new(pattern),
            negated: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_ast_is_shareable_across_threads() {
        assert_send_sync::<Statement>();
        assert_send_sync::<Expr>();
        assert_send_sync::<Arc<Table>>();
    }

    #[test]
    fn test_pagination_defaults() {
        assert_eq!(Pagination::default().resolve(), (0, Pagination::MAX_LIMIT));
        assert_eq!(Pagination::new(Some(20), Some(10)).resolve(), (20, 10));
        assert_eq!(Pagination::new(None, Some(5)).resolve(), (0, 5));
    }

    #[test]
    fn test_filter_combines_with_and() {
        let query = Select::default()
            .filter(Expr::raw("a"))
            .filter(Expr::raw("b"));
        assert!(matches!(
            query.filter,
            Some(Expr::Binary {
                op: BinaryOp::And,
                ..
            })
        ));
    }

    #[test]
    fn test_limit_and_offset_share_one_pagination() {
        let query = Select::default().limit(10).offset(30);
        assert_eq!(query.pagination, Some(Pagination::new(Some(30), Some(10))));
    }

    #[test]
    fn test_insert_values_are_typed_by_column() {
        let table = Arc::new(
            Table::new("emp")
                .column("id", SqlType::Integer)
                .column("hired", SqlType::Date),
        );
        let insert = Insert::into(&table)
            .columns(table.columns())
            .values([Value::Integer(1), Value::from("2020-01-01")]);
        let Expr::Argument(arg) = &insert.rows[0][1] else {
            panic!("expected an argument");
        };
        assert_eq!(arg.ty, SqlType::Date);
    }
}
