/// SQL keywords, operators and punctuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    // Keywords
    SELECT,
    DISTINCT,
    FROM,
    WHERE,
    AND,
    OR,
    NOT,
    AS,
    ON,
    JOIN,
    INNER,
    LEFT,
    RIGHT,
    FULL,
    CROSS,
    GROUP,
    ORDER,
    BY,
    HAVING,
    ASC,
    DESC,
    NULLS,
    FIRST,
    LAST,
    LIMIT,
    OFFSET,
    ROWS,
    FETCH,
    NEXT,
    ONLY,
    INSERT,
    INTO,
    VALUES,
    UPDATE,
    SET,
    DELETE,
    IS,
    NULL,
    IN,
    BETWEEN,
    LIKE,
    EXISTS,

    // Punctuation
    STAR,
    COMMA,
    LPAREN,
    RPAREN,
    DOT,
    SEMI,

    // Operators
    EQ,
    NE,
    LT,
    GT,
    LE,
    GE,
    PLUS,
    MINUS,
    SLASH,
    CONCAT,
}

impl Token {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Token::SELECT => "SELECT",
            Token::DISTINCT => "DISTINCT",
            Token::FROM => "FROM",
            Token::WHERE => "WHERE",
            Token::AND => "AND",
            Token::OR => "OR",
            Token::NOT => "NOT",
            Token::AS => "AS",
            Token::ON => "ON",
            Token::JOIN => "JOIN",
            Token::INNER => "INNER",
            Token::LEFT => "LEFT",
            Token::RIGHT => "RIGHT",
            Token::FULL => "FULL",
            Token::CROSS => "CROSS",
            Token::GROUP => "GROUP",
            Token::ORDER => "ORDER",
            Token::BY => "BY",
            Token::HAVING => "HAVING",
            Token::ASC => "ASC",
            Token::DESC => "DESC",
            Token::NULLS => "NULLS",
            Token::FIRST => "FIRST",
            Token::LAST => "LAST",
            Token::LIMIT => "LIMIT",
            Token::OFFSET => "OFFSET",
            Token::ROWS => "ROWS",
            Token::FETCH => "FETCH",
            Token::NEXT => "NEXT",
            Token::ONLY => "ONLY",
            Token::INSERT => "INSERT",
            Token::INTO => "INTO",
            Token::VALUES => "VALUES",
            Token::UPDATE => "UPDATE",
            Token::SET => "SET",
            Token::DELETE => "DELETE",
            Token::IS => "IS",
            Token::NULL => "NULL",
            Token::IN => "IN",
            Token::BETWEEN => "BETWEEN",
            Token::LIKE => "LIKE",
            Token::EXISTS => "EXISTS",
            Token::STAR => "*",
            Token::COMMA => ",",
            Token::LPAREN => "(",
            Token::RPAREN => ")",
            Token::DOT => ".",
            Token::SEMI => ";",
            Token::EQ => "=",
            Token::NE => "<>",
            Token::LT => "<",
            Token::GT => ">",
            Token::LE => "<=",
            Token::GE => ">=",
            Token::PLUS => "+",
            Token::MINUS => "-",
            Token::SLASH => "/",
            Token::CONCAT => "||",
        }
    }

    /// Binary operators are always surrounded by spaces.
    pub const fn is_operator(&self) -> bool {
        matches!(
            self,
            Token::EQ
                | Token::NE
                | Token::LT
                | Token::GT
                | Token::LE
                | Token::GE
                | Token::PLUS
                | Token::MINUS
                | Token::SLASH
                | Token::CONCAT
        )
    }

    /// Punctuation is never word-like.
    pub const fn is_punctuation(&self) -> bool {
        matches!(
            self,
            Token::COMMA | Token::LPAREN | Token::RPAREN | Token::DOT | Token::SEMI
        )
    }
}

impl core::fmt::Display for Token {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
