use compact_str::CompactString;

use crate::ast::Argument;
use crate::sql::tokens::Token;

/// A SQL chunk represents a part of an SQL statement.
///
/// - `Token` - SQL keywords and operators (SELECT, FROM, =, etc.)
/// - `Ident` - Quoted identifiers ("table_name", "column_name")
/// - `Qualified` - Quoted, table-qualified column reference ("t"."c")
/// - `Raw` - Unquoted raw SQL text
/// - `Func` - Function name plus opening parenthesis (`COUNT(`)
/// - `Param` - Argument rendered as one dialect placeholder
/// - `Break` - Clause boundary: a space, or a new line when beautifying
#[derive(Debug, Clone, PartialEq)]
pub enum SQLChunk {
    /// SQL keywords and operators: SELECT, FROM, WHERE, =, AND, etc.
    /// Renders as: keyword with automatic spacing rules
    Token(Token),

    /// Quoted identifier for user-provided names
    /// Renders as: "name" (quote style from the dialect)
    Ident(CompactString),

    /// Column reference qualified by its table name or alias
    /// Renders as: "table"."column"
    Qualified {
        table: CompactString,
        column: CompactString,
    },

    /// Raw SQL text (unquoted)
    /// Renders as: text (no quotes, as-is)
    Raw(CompactString),

    /// Function call head, closed later by `Token::RPAREN`
    /// Renders as: NAME(
    Func(CompactString),

    /// Argument with value and semantic type
    /// Renders as: ? or $1 or @p1 depending on dialect
    Param(Argument),

    /// Clause boundary
    Break,
}

impl SQLChunk {
    /// Creates a token chunk - const
    #[inline]
    pub const fn token(t: Token) -> Self {
        Self::Token(t)
    }

    /// Creates a quoted identifier
    #[inline]
    pub fn ident(name: impl Into<CompactString>) -> Self {
        Self::Ident(name.into())
    }

    /// Creates raw SQL text
    #[inline]
    pub fn raw(text: impl Into<CompactString>) -> Self {
        Self::Raw(text.into())
    }

    /// Check if this chunk is "word-like" (needs space separation from other word-like chunks)
    #[inline]
    pub(crate) const fn is_word_like(&self) -> bool {
        match self {
            SQLChunk::Token(t) => !t.is_punctuation() && !t.is_operator(),
            SQLChunk::Ident(_)
            | SQLChunk::Qualified { .. }
            | SQLChunk::Raw(_)
            | SQLChunk::Func(_)
            | SQLChunk::Param(_) => true,
            SQLChunk::Break => false,
        }
    }

    /// Opens a nesting level (used for beautified indentation).
    #[inline]
    pub(crate) const fn opens(&self) -> bool {
        matches!(self, SQLChunk::Token(Token::LPAREN) | SQLChunk::Func(_))
    }

    /// Closes a nesting level.
    #[inline]
    pub(crate) const fn closes(&self) -> bool {
        matches!(self, SQLChunk::Token(Token::RPAREN))
    }
}

impl From<Token> for SQLChunk {
    #[inline]
    fn from(value: Token) -> Self {
        Self::Token(value)
    }
}

impl From<Argument> for SQLChunk {
    #[inline]
    fn from(value: Argument) -> Self {
        Self::Param(value)
    }
}

/// Canonical spacing logic for SQL chunk rendering.
pub(crate) fn chunk_needs_space(current: &SQLChunk, next: &SQLChunk) -> bool {
    // Clause breaks write their own separator
    if matches!(current, SQLChunk::Break) || matches!(next, SQLChunk::Break) {
        return false;
    }

    // No space if current raw text ends with space
    if let SQLChunk::Raw(text) = current
        && text.ends_with(' ')
    {
        return false;
    }

    // No space if next raw text starts with space
    if let SQLChunk::Raw(text) = next
        && text.starts_with(' ')
    {
        return false;
    }

    match (current, next) {
        // No space before closing/separator punctuation
        (_, SQLChunk::Token(Token::RPAREN | Token::COMMA | Token::SEMI | Token::DOT)) => false,
        // No space after opening punctuation or a function head
        (SQLChunk::Token(Token::LPAREN | Token::DOT) | SQLChunk::Func(_), _) => false,
        // Space after comma
        (SQLChunk::Token(Token::COMMA), _) => true,
        // Space around comparison/arithmetic operators
        (SQLChunk::Token(t), _) if t.is_operator() => true,
        (_, SQLChunk::Token(t)) if t.is_operator() => true,
        // Space after closing paren if next is word-like (e.g., ") FROM")
        (SQLChunk::Token(Token::RPAREN), next) => next.is_word_like(),
        // Space before opening paren if preceded by word-like (e.g., "IN (")
        (current, SQLChunk::Token(Token::LPAREN)) => current.is_word_like(),
        // Space between all word-like chunks
        _ => current.is_word_like() && next.is_word_like(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spacing_rules() {
        let ident = SQLChunk::ident("a");
        assert!(chunk_needs_space(&SQLChunk::Token(Token::SELECT), &ident));
        assert!(!chunk_needs_space(&ident, &SQLChunk::Token(Token::COMMA)));
        assert!(chunk_needs_space(&SQLChunk::Token(Token::RPAREN), &SQLChunk::Token(Token::EQ)));
        assert!(!chunk_needs_space(&SQLChunk::Func("COUNT".into()), &SQLChunk::raw("*")));
        assert!(chunk_needs_space(&SQLChunk::Token(Token::IN), &SQLChunk::Token(Token::LPAREN)));
        assert!(!chunk_needs_space(&SQLChunk::Break, &ident));
    }
}
