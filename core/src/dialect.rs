//! Dialect strategies.
//!
//! The formatter core renders everything dialect-neutral and defers to a
//! [`SqlDialect`] for placeholder syntax, identifier quoting, pagination and
//! join support. The [`Dialect`] enum from `quarry-types` is the built-in
//! implementation; callers with other engines implement the trait themselves.

use std::borrow::Cow;
use std::fmt;

pub use quarry_types::Dialect;

use crate::ast::{Argument, JoinKind};
use crate::error::{QuarryError, Result};
use crate::sql::{SQL, Token};
use crate::types::SqlType;

/// Dialect extension point.
pub trait SqlDialect: Send + Sync + fmt::Debug {
    /// Name used in log events and error messages.
    fn name(&self) -> &str;

    /// Renders the placeholder for the 1-based argument `index`.
    ///
    /// Returns `Cow::Borrowed("?")` by default (zero allocation).
    fn placeholder(&self, index: usize) -> Cow<'static, str> {
        let _ = index;
        Cow::Borrowed("?")
    }

    /// Writes a quoted identifier. Defaults to ANSI double quotes.
    fn write_ident(&self, name: &str, buf: &mut String) {
        quote_with(buf, '"', '"', name);
    }

    /// Renders the pagination clause for resolved bounds.
    ///
    /// The fragment must contain exactly two parameters. The default is
    /// `LIMIT ? OFFSET ?` bound as (limit, offset).
    fn paginate(&self, offset: u64, limit: u64) -> Result<SQL> {
        Ok(SQL::token(Token::LIMIT)
            .append(SQL::param(count_argument("limit", limit)?))
            .push(Token::OFFSET)
            .append(SQL::param(count_argument("offset", offset)?)))
    }

    fn supports_join(&self, kind: JoinKind) -> bool {
        let _ = kind;
        true
    }

    /// Whether pagination is only valid on an ordered query.
    fn requires_order_for_pagination(&self) -> bool {
        false
    }
}

/// Binds a pagination bound as an integer argument.
///
/// Fails with [`QuarryError::UnsupportedOperation`] when the count does not
/// fit a signed 64-bit SQL integer.
pub fn count_argument(what: &str, count: u64) -> Result<Argument> {
    let count = i64::try_from(count).map_err(|_| {
        QuarryError::unsupported(format!("{what} {count} exceeds the largest SQL integer"))
    })?;
    Ok(Argument::new(count, SqlType::Integer))
}

fn quote_with(buf: &mut String, open: char, close: char, name: &str) {
    buf.push(open);
    for c in name.chars() {
        if c == close {
            buf.push(close);
        }
        buf.push(c);
    }
    buf.push(close);
}

impl SqlDialect for Dialect {
    fn name(&self) -> &str {
        self.as_str()
    }

    #[inline]
    fn placeholder(&self, index: usize) -> Cow<'static, str> {
        if !self.uses_numbered_placeholders() {
            return Cow::Borrowed("?");
        }
        match self {
            Dialect::SqlServer => Cow::Owned(format!("@p{index}")),
            _ => Cow::Owned(format!("${index}")),
        }
    }

    fn write_ident(&self, name: &str, buf: &mut String) {
        match self {
            Dialect::MySQL => quote_with(buf, '`', '`', name),
            Dialect::SqlServer => quote_with(buf, '[', ']', name),
            Dialect::Generic | Dialect::SQLite | Dialect::PostgreSQL => {
                quote_with(buf, '"', '"', name)
            }
        }
    }

    fn paginate(&self, offset: u64, limit: u64) -> Result<SQL> {
        match self {
            // LIMIT offset, count
            Dialect::MySQL => Ok(SQL::token(Token::LIMIT)
                .append(SQL::param(count_argument("offset", offset)?))
                .push(Token::COMMA)
                .append(SQL::param(count_argument("limit", limit)?))),
            Dialect::SqlServer => Ok(SQL::token(Token::OFFSET)
                .append(SQL::param(count_argument("offset", offset)?))
                .push(Token::ROWS)
                .push(Token::FETCH)
                .push(Token::NEXT)
                .append(SQL::param(count_argument("limit", limit)?))
                .push(Token::ROWS)
                .push(Token::ONLY)),
            Dialect::Generic | Dialect::SQLite | Dialect::PostgreSQL => Ok(SQL::token(Token::LIMIT)
                .append(SQL::param(count_argument("limit", limit)?))
                .push(Token::OFFSET)
                .append(SQL::param(count_argument("offset", offset)?))),
        }
    }

    fn supports_join(&self, kind: JoinKind) -> bool {
        !matches!((self, kind), (Dialect::MySQL, JoinKind::Full))
    }

    fn requires_order_for_pagination(&self) -> bool {
        matches!(self, Dialect::SqlServer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn render(dialect: Dialect, offset: u64, limit: u64) -> (String, Vec<Value>) {
        let (sql, args) = dialect
            .paginate(offset, limit)
            .unwrap()
            .build(&dialect, crate::sql::Layout::compact());
        (sql, args.into_iter().map(|a| a.value).collect())
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(Dialect::Generic.placeholder(1), "?");
        assert_eq!(Dialect::SQLite.placeholder(3), "?");
        assert_eq!(Dialect::MySQL.placeholder(3), "?");
        assert_eq!(Dialect::PostgreSQL.placeholder(3), "$3");
        assert_eq!(Dialect::SqlServer.placeholder(3), "@p3");
    }

    #[test]
    fn test_pagination_argument_order() {
        let (sql, args) = render(Dialect::SQLite, 20, 10);
        assert_eq!(sql, "LIMIT ? OFFSET ?");
        assert_eq!(args, [Value::Integer(10), Value::Integer(20)]);

        let (sql, args) = render(Dialect::MySQL, 20, 10);
        assert_eq!(sql, "LIMIT ?, ?");
        assert_eq!(args, [Value::Integer(20), Value::Integer(10)]);

        let (sql, args) = render(Dialect::SqlServer, 20, 10);
        assert_eq!(sql, "OFFSET @p1 ROWS FETCH NEXT @p2 ROWS ONLY");
        assert_eq!(args, [Value::Integer(20), Value::Integer(10)]);
    }

    #[test]
    fn test_oversized_bound_is_unsupported() {
        let err = Dialect::SQLite.paginate(0, u64::MAX).unwrap_err();
        assert!(matches!(err, QuarryError::UnsupportedOperation(_)));
    }

    #[test]
    fn test_identifier_quoting() {
        let mut buf = String::new();
        Dialect::PostgreSQL.write_ident(r#"we"ird"#, &mut buf);
        Dialect::MySQL.write_ident("a`b", &mut buf);
        Dialect::SqlServer.write_ident("c]d", &mut buf);
        assert_eq!(buf, r#""we""ird"`a``b`[c]]d]"#);
    }

    #[test]
    fn test_mysql_rejects_full_join() {
        assert!(!Dialect::MySQL.supports_join(JoinKind::Full));
        assert!(Dialect::MySQL.supports_join(JoinKind::Left));
        assert!(Dialect::SQLite.supports_join(JoinKind::Full));
    }
}
