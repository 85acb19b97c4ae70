mod chunk;
mod tokens;

pub use chunk::*;
pub use tokens::*;

use core::fmt::{Display, Write};

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::ast::Argument;
use crate::dialect::{Dialect, SqlDialect};

/// Whitespace layout for rendered SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Layout {
    /// Start every clause on its own line.
    pub beautify: bool,
    /// Spaces per nesting level when beautifying.
    pub indent: usize,
}

impl Layout {
    /// Single-line output.
    pub const fn compact() -> Self {
        Self {
            beautify: false,
            indent: 0,
        }
    }

    pub const fn beautified(indent: usize) -> Self {
        Self {
            beautify: true,
            indent,
        }
    }
}

/// SQL fragment builder with flat chunk storage.
///
/// Uses `SmallVec<[SQLChunk; 8]>` for inline storage of typical SQL fragments
/// without heap allocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SQL {
    pub chunks: SmallVec<[SQLChunk; 8]>,
}

impl SQL {
    // ==================== constructors ====================

    /// Creates an empty SQL fragment
    #[inline]
    pub const fn empty() -> Self {
        Self {
            chunks: SmallVec::new_const(),
        }
    }

    /// Creates SQL with a single token
    #[inline]
    pub fn token(t: Token) -> Self {
        Self {
            chunks: smallvec::smallvec![SQLChunk::Token(t)],
        }
    }

    /// Creates SQL with a quoted identifier
    #[inline]
    pub fn ident(name: impl Into<CompactString>) -> Self {
        Self {
            chunks: smallvec::smallvec![SQLChunk::Ident(name.into())],
        }
    }

    /// Creates SQL with a table-qualified column reference
    #[inline]
    pub fn qualified(table: impl Into<CompactString>, column: impl Into<CompactString>) -> Self {
        Self {
            chunks: smallvec::smallvec![SQLChunk::Qualified {
                table: table.into(),
                column: column.into(),
            }],
        }
    }

    /// Creates SQL with raw text (unquoted)
    #[inline]
    pub fn raw(text: impl Into<CompactString>) -> Self {
        Self {
            chunks: smallvec::smallvec![SQLChunk::Raw(text.into())],
        }
    }

    /// Creates SQL with a single bound argument
    #[inline]
    pub fn param(argument: Argument) -> Self {
        Self {
            chunks: smallvec::smallvec![SQLChunk::Param(argument)],
        }
    }

    /// Creates a clause boundary
    #[inline]
    pub fn clause() -> Self {
        Self {
            chunks: smallvec::smallvec![SQLChunk::Break],
        }
    }

    /// Creates a function call: NAME(args)
    pub fn func(name: impl Into<CompactString>, args: SQL) -> Self {
        SQL {
            chunks: smallvec::smallvec![SQLChunk::Func(name.into())],
        }
        .append(args)
        .push(Token::RPAREN)
    }

    // ==================== builder methods ====================

    /// Append another SQL fragment (flat extend)
    #[inline]
    pub fn append(mut self, other: impl Into<SQL>) -> Self {
        self.append_mut(other);
        self
    }

    #[inline]
    pub fn append_mut(&mut self, other: impl Into<SQL>) {
        let other = other.into();
        if self.chunks.is_empty() {
            self.chunks = other.chunks;
            return;
        }
        if other.chunks.is_empty() {
            return;
        }
        self.chunks.extend(other.chunks);
    }

    /// Push a single chunk
    #[inline]
    pub fn push(mut self, chunk: impl Into<SQLChunk>) -> Self {
        self.chunks.push(chunk.into());
        self
    }

    #[inline]
    pub fn push_mut(&mut self, chunk: impl Into<SQLChunk>) {
        self.chunks.push(chunk.into());
    }

    // ==================== combinators ====================

    /// Joins multiple SQL fragments with a separator
    pub fn join<T>(sqls: T, separator: Token) -> SQL
    where
        T: IntoIterator<Item = SQL>,
    {
        let mut iter = sqls.into_iter();
        let Some(mut result) = iter.next() else {
            return SQL::empty();
        };
        for other in iter {
            result.chunks.push(SQLChunk::Token(separator));
            result.chunks.extend(other.chunks);
        }
        result
    }

    /// Wrap in parentheses: (self)
    #[inline]
    pub fn parens(self) -> Self {
        SQL::token(Token::LPAREN).append(self).push(Token::RPAREN)
    }

    /// Creates an aliased version: self AS "name"
    pub fn alias(self, name: impl Into<CompactString>) -> SQL {
        self.push(Token::AS).push(SQLChunk::Ident(name.into()))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Bound arguments in placeholder order.
    pub fn params(&self) -> impl Iterator<Item = &Argument> {
        self.chunks.iter().filter_map(|chunk| match chunk {
            SQLChunk::Param(argument) => Some(argument),
            _ => None,
        })
    }

    /// Number of placeholders this fragment renders.
    pub fn param_count(&self) -> usize {
        self.params().count()
    }

    // ==================== rendering ====================

    /// Generates the SQL string and collects arguments in a single pass.
    ///
    /// Placeholder `n` and `arguments[n - 1]` are produced by the same chunk,
    /// so the two can never disagree.
    pub fn build(&self, dialect: &dyn SqlDialect, layout: Layout) -> (String, Vec<Argument>) {
        let sql_cap = self.chunks.len().saturating_mul(8).max(128);
        let mut buf = String::with_capacity(sql_cap);
        let mut arguments = Vec::with_capacity(self.param_count());
        let mut depth = 0usize;

        for (i, chunk) in self.chunks.iter().enumerate() {
            match chunk {
                SQLChunk::Token(t) => {
                    let _ = buf.write_str(t.as_str());
                }
                SQLChunk::Ident(name) => dialect.write_ident(name, &mut buf),
                SQLChunk::Qualified { table, column } => {
                    dialect.write_ident(table, &mut buf);
                    buf.push('.');
                    dialect.write_ident(column, &mut buf);
                }
                SQLChunk::Raw(text) => buf.push_str(text),
                SQLChunk::Func(name) => {
                    buf.push_str(name);
                    buf.push('(');
                }
                SQLChunk::Param(argument) => {
                    arguments.push(argument.clone());
                    let _ = buf.write_str(&dialect.placeholder(arguments.len()));
                }
                SQLChunk::Break => {
                    let at_end = i + 1 == self.chunks.len();
                    if !buf.is_empty() && !at_end {
                        if layout.beautify {
                            buf.push('\n');
                            buf.extend(core::iter::repeat_n(' ', depth * layout.indent));
                        } else {
                            buf.push(' ');
                        }
                    }
                }
            }

            if chunk.opens() {
                depth += 1;
            } else if chunk.closes() {
                depth = depth.saturating_sub(1);
            }

            if let Some(next) = self.chunks.get(i + 1)
                && chunk_needs_space(chunk, next)
            {
                buf.push(' ');
            }
        }

        (buf, arguments)
    }

    /// Compact SQL text for `dialect`, arguments discarded.
    pub fn sql(&self, dialect: &dyn SqlDialect) -> String {
        self.build(dialect, Layout::compact()).0
    }
}

impl From<Token> for SQL {
    #[inline]
    fn from(value: Token) -> Self {
        SQL::token(value)
    }
}

impl From<SQLChunk> for SQL {
    #[inline]
    fn from(value: SQLChunk) -> Self {
        Self {
            chunks: smallvec::smallvec![value],
        }
    }
}

impl FromIterator<SQLChunk> for SQL {
    fn from_iter<T: IntoIterator<Item = SQLChunk>>(iter: T) -> Self {
        Self {
            chunks: iter.into_iter().collect(),
        }
    }
}

/// Renders with generic `?` placeholders, for debugging.
impl Display for SQL {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.sql(&Dialect::Generic))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SqlType;
    use crate::value::Value;

    fn arg(n: i64) -> Argument {
        Argument::new(n, SqlType::Integer)
    }

    #[test]
    fn test_build_numbers_placeholders_in_chunk_order() {
        let sql = SQL::token(Token::SELECT)
            .push(Token::STAR)
            .append(SQL::clause())
            .push(Token::FROM)
            .append(SQL::ident("t"))
            .append(SQL::clause())
            .push(Token::WHERE)
            .append(SQL::qualified("t", "a"))
            .push(Token::EQ)
            .append(SQL::param(arg(1)))
            .push(Token::AND)
            .append(SQL::qualified("t", "b"))
            .push(Token::EQ)
            .append(SQL::param(arg(2)));

        let (text, args) = sql.build(&Dialect::PostgreSQL, Layout::compact());
        assert_eq!(
            text,
            r#"SELECT * FROM "t" WHERE "t"."a" = $1 AND "t"."b" = $2"#
        );
        assert_eq!(args[0].value, Value::Integer(1));
        assert_eq!(args[1].value, Value::Integer(2));

        let (text, _) = sql.build(&Dialect::SQLite, Layout::compact());
        assert_eq!(text, r#"SELECT * FROM "t" WHERE "t"."a" = ? AND "t"."b" = ?"#);
    }

    #[test]
    fn test_func_and_parens() {
        let sql = SQL::token(Token::SELECT)
            .append(SQL::func("COUNT", SQL::raw("*")))
            .push(Token::COMMA)
            .append(SQL::func("MAX", SQL::qualified("t", "a")))
            .push(Token::IN)
            .append(SQL::join([SQL::param(arg(1)), SQL::param(arg(2))], Token::COMMA).parens());
        assert_eq!(
            sql.to_string(),
            r#"SELECT COUNT(*), MAX("t"."a") IN (?, ?)"#
        );
    }

    #[test]
    fn test_beautify_breaks_clauses_and_indents_nesting() {
        let inner = SQL::token(Token::SELECT)
            .append(SQL::raw("1"))
            .append(SQL::clause())
            .push(Token::FROM)
            .append(SQL::ident("u"));
        let sql = SQL::token(Token::SELECT)
            .push(Token::STAR)
            .append(SQL::clause())
            .push(Token::FROM)
            .append(inner.parens())
            .push(Token::AS)
            .append(SQL::ident("x"));

        let (text, _) = sql.build(&Dialect::SQLite, Layout::beautified(4));
        assert_eq!(text, "SELECT *\nFROM (SELECT 1\n    FROM \"u\") AS \"x\"");

        let (compact, _) = sql.build(&Dialect::SQLite, Layout::compact());
        assert_eq!(compact, r#"SELECT * FROM (SELECT 1 FROM "u") AS "x""#);
    }

    #[test]
    fn test_trailing_break_renders_nothing() {
        let sql = SQL::token(Token::SELECT).append(SQL::raw("1")).append(SQL::clause());
        assert_eq!(sql.to_string(), "SELECT 1");
    }
}
