//! Token types for the Chi lexer.

use chi_ir::{Decimal, Name, Span};
use std::fmt;

/// A token with its span in the source.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {}", self.kind, self.span)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// Integer or decimal literal.
    Number(Decimal),
    /// Identifier (interned).
    Ident(Name),

    // Keywords
    Nil,
    Def,
    If,
    Then,
    Else,
    Close,
    With,
    Var,
    Set,
    Test,
    Module,

    // Punctuation
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Dot,
    Comma,
    Semicolon,
    Eq,
    FatArrow,
    ColonColon,
    Dollar,
    Underscore,

    /// Unrecognized input.
    Error,
    Eof,
}

impl TokenKind {
    /// Short description used in parser diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Number(_) => "number",
            TokenKind::Ident(_) => "identifier",
            TokenKind::Nil => "`nil`",
            TokenKind::Def => "`def`",
            TokenKind::If => "`if`",
            TokenKind::Then => "`then`",
            TokenKind::Else => "`else`",
            TokenKind::Close => "`close`",
            TokenKind::With => "`with`",
            TokenKind::Var => "`var`",
            TokenKind::Set => "`set`",
            TokenKind::Test => "`test`",
            TokenKind::Module => "`module`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::Dot => "`.`",
            TokenKind::Comma => "`,`",
            TokenKind::Semicolon => "`;`",
            TokenKind::Eq => "`=`",
            TokenKind::FatArrow => "`=>`",
            TokenKind::ColonColon => "`::`",
            TokenKind::Dollar => "`$`",
            TokenKind::Underscore => "`_`",
            TokenKind::Error => "unrecognized input",
            TokenKind::Eof => "end of input",
        }
    }
}

/// Lexer output: tokens in source order, always terminated by `Eof`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenList {
    pub tokens: Vec<Token>,
}

impl TokenList {
    pub fn new() -> Self {
        TokenList { tokens: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn kinds(&self) -> impl Iterator<Item = &TokenKind> {
        self.tokens.iter().map(|t| &t.kind)
    }
}
