use std::fmt;

use lachs::Span;

#[lachs::token]
pub enum Token {
    #[terminal("func")]
    Func,
    #[terminal("return")]
    Return,
    #[terminal("if")]
    If,
    #[terminal("else")]
    Else,
    #[terminal("end")]
    End,
    #[terminal("while")]
    While,
    #[terminal("true")]
    True,
    #[terminal("false")]
    False,
    #[literal("[A-Za-z][A-Za-z0-9_]*")]
    Ident,
    #[literal("[0-9]+")]
    Integer,
    #[terminal(":=")]
    Assign,
    #[terminal("(")]
    LParen,
    #[terminal(")")]
    RParen,
    #[terminal("{")]
    LBrace,
    #[terminal("}")]
    RBrace,
    #[terminal(";")]
    Semicolon,
    #[terminal(",")]
    Comma,
    #[terminal(">=")]
    GreaterEquals,
    #[terminal(">")]
    GreaterThan,
    #[terminal("<=")]
    LessEquals,
    #[terminal("<")]
    LessThan,
    #[terminal("==")]
    DoubleEquals,
    #[terminal("!=")]
    NotEquals,
    #[terminal("&&")]
    LogicalAnd,
    #[terminal("||")]
    LogicalOr,
    #[terminal("!")]
    LogicalNot,
    #[terminal("+")]
    Plus,
    #[terminal("-")]
    Minus,
}

/// Coarse token classes the combinators match on.
///
/// Keywords and punctuation are all `Syntax`, so a literal parser only has
/// to compare lexemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Syntax,
    Number,
    Boolean,
    Variable,
}

impl Token {
    pub fn pos(&self) -> Span {
        match self {
            Token::Func(inner) => inner.position.clone(),
            Token::Return(inner) => inner.position.clone(),
            Token::If(inner) => inner.position.clone(),
            Token::Else(inner) => inner.position.clone(),
            Token::End(inner) => inner.position.clone(),
            Token::While(inner) => inner.position.clone(),
            Token::True(inner) => inner.position.clone(),
            Token::False(inner) => inner.position.clone(),
            Token::Ident(inner) => inner.position.clone(),
            Token::Integer(inner) => inner.position.clone(),
            Token::Assign(inner) => inner.position.clone(),
            Token::LParen(inner) => inner.position.clone(),
            Token::RParen(inner) => inner.position.clone(),
            Token::LBrace(inner) => inner.position.clone(),
            Token::RBrace(inner) => inner.position.clone(),
            Token::Semicolon(inner) => inner.position.clone(),
            Token::Comma(inner) => inner.position.clone(),
            Token::GreaterEquals(inner) => inner.position.clone(),
            Token::GreaterThan(inner) => inner.position.clone(),
            Token::LessEquals(inner) => inner.position.clone(),
            Token::LessThan(inner) => inner.position.clone(),
            Token::DoubleEquals(inner) => inner.position.clone(),
            Token::NotEquals(inner) => inner.position.clone(),
            Token::LogicalAnd(inner) => inner.position.clone(),
            Token::LogicalOr(inner) => inner.position.clone(),
            Token::LogicalNot(inner) => inner.position.clone(),
            Token::Plus(inner) => inner.position.clone(),
            Token::Minus(inner) => inner.position.clone(),
        }
    }

    pub fn tag(&self) -> Tag {
        match self {
            Token::True(_) | Token::False(_) => Tag::Boolean,
            Token::Integer(_) => Tag::Number,
            Token::Ident(_) => Tag::Variable,
            _ => Tag::Syntax,
        }
    }

    /// The source text this token was lexed from
    pub fn lexeme(&self) -> &str {
        match self {
            Token::Func(_) => "func",
            Token::Return(_) => "return",
            Token::If(_) => "if",
            Token::Else(_) => "else",
            Token::End(_) => "end",
            Token::While(_) => "while",
            Token::True(_) => "true",
            Token::False(_) => "false",
            Token::Ident(inner) => &inner.value,
            Token::Integer(inner) => &inner.value,
            Token::Assign(_) => ":=",
            Token::LParen(_) => "(",
            Token::RParen(_) => ")",
            Token::LBrace(_) => "{",
            Token::RBrace(_) => "}",
            Token::Semicolon(_) => ";",
            Token::Comma(_) => ",",
            Token::GreaterEquals(_) => ">=",
            Token::GreaterThan(_) => ">",
            Token::LessEquals(_) => "<=",
            Token::LessThan(_) => "<",
            Token::DoubleEquals(_) => "==",
            Token::NotEquals(_) => "!=",
            Token::LogicalAnd(_) => "&&",
            Token::LogicalOr(_) => "||",
            Token::LogicalNot(_) => "!",
            Token::Plus(_) => "+",
            Token::Minus(_) => "-",
        }
    }

    /// Returns a human-readable description of the token
    pub fn describe(&self) -> String {
        match self.tag() {
            Tag::Variable => format!("identifier '{}'", self.lexeme()),
            Tag::Number => format!("integer '{}'", self.lexeme()),
            Tag::Boolean => format!("boolean '{}'", self.lexeme()),
            Tag::Syntax => format!("'{}'", self.lexeme()),
        }
    }
}

/// No token rule matches at `offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizeError {
    /// Byte offset of the first character no rule matches
    pub offset: usize,
    /// Source text from `offset` on
    pub remainder: String,
    /// Tokens lexed before the failure
    pub tokens: Vec<Token>,
}

impl fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = self.remainder.lines().next().unwrap_or_default();
        write!(
            f,
            "no token matches at offset {} (after {} token(s)): {}",
            self.offset,
            self.tokens.len(),
            line
        )
    }
}

impl std::error::Error for TokenizeError {}

/// Offset lachs stopped at. Its message has the shape
/// `Failed to lex '<source>' at position <offset>; remaining '<rest>'`.
fn failure_offset(source: &str, message: &str) -> Option<usize> {
    let rest = message
        .strip_prefix("Failed to lex '")?
        .strip_prefix(source)?
        .strip_prefix("' at position ")?;
    let digits = rest.split(';').next()?;
    digits.parse().ok().filter(|offset| source.is_char_boundary(*offset))
}

/// Split source text into tokens, dropping whitespace.
pub fn tokenize(source: &str) -> Result<Vec<Token>, TokenizeError> {
    let tokens = Token::lex(source).map_err(|err| {
        let message = err.to_string();
        let offset = failure_offset(source, &message).unwrap_or_else(|| {
            log::warn!("unrecognised lexer failure: {}", message);
            0
        });
        // Everything before the failure lexed once already.
        let tokens = Token::lex(&source[..offset]).unwrap_or_default();
        TokenizeError {
            offset,
            remainder: source[offset..].to_string(),
            tokens,
        }
    })?;
    log::trace!("tokenized {} tokens", tokens.len());
    Ok(tokens)
}
