//! Lexer for Chi using logos with symbol interning.
//!
//! Whitespace and `#` comments are skipped. Identifiers are interned into the
//! session's symbol table as they are produced, so the parser only ever sees
//! [`Name`](chi_ir::Name)s.

mod token;

use chi_ir::{Decimal, Span, SymbolTable};
use logos::Logos;
use std::str::FromStr;

pub use token::{Token, TokenKind, TokenList};

/// Raw token from logos (before interning).
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"#[^\n]*")]
enum RawToken {
    #[token("nil")]
    Nil,
    #[token("def")]
    Def,
    #[token("if")]
    If,
    #[token("then")]
    Then,
    #[token("else")]
    Else,
    #[token("close")]
    Close,
    #[token("with")]
    With,
    #[token("var")]
    Var,
    #[token("set")]
    Set,
    #[token("test")]
    Test,
    #[token("module")]
    Module,

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token("=")]
    Eq,
    #[token("=>")]
    FatArrow,
    #[token("::")]
    ColonColon,
    #[token("$")]
    Dollar,
    #[token("_")]
    Underscore,

    // A sign directly followed by digits is a number, not an identifier.
    #[regex(r"[-+]?[0-9]+(\.[0-9]+)?", parse_number, priority = 10)]
    Number(Decimal),

    #[regex(r"[A-Za-z+\-*/!?][A-Za-z0-9_+\-*/!?]*")]
    Ident,
}

fn parse_number(lex: &mut logos::Lexer<RawToken>) -> Option<Decimal> {
    let slice = lex.slice();
    let unsigned = slice.strip_prefix('+').unwrap_or(slice);
    Decimal::from_str(unsigned).ok()
}

/// Error for the first unrecognized piece of input.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized input `{text}` at {span}")]
pub struct LexError {
    pub text: String,
    pub span: Span,
}

/// Lexer bound to a source text and the session's symbol table.
pub struct Lexer<'src, 'i> {
    source: &'src str,
    symbols: &'i SymbolTable,
}

impl<'src, 'i> Lexer<'src, 'i> {
    pub fn new(source: &'src str, symbols: &'i SymbolTable) -> Self {
        Lexer { source, symbols }
    }

    /// Lex the whole source. Unrecognized input becomes `TokenKind::Error`.
    pub fn lex_all(&self) -> TokenList {
        let mut result = TokenList::new();
        let mut logos = RawToken::lexer(self.source);

        while let Some(token_result) = logos.next() {
            let span = Span::from_range(logos.span());
            let kind = match token_result {
                Ok(raw) => self.convert_token(raw, logos.slice()),
                Err(()) => TokenKind::Error,
            };
            result.tokens.push(Token::new(kind, span));
        }

        let end = Span::from_range(self.source.len()..self.source.len());
        result.tokens.push(Token::new(TokenKind::Eof, end));
        result
    }

    /// Lex the whole source, failing on the first unrecognized input.
    pub fn tokenize(&self) -> Result<TokenList, LexError> {
        let tokens = self.lex_all();
        if let Some(bad) = tokens.tokens.iter().find(|t| t.kind == TokenKind::Error) {
            let range = bad.span.start as usize..bad.span.end as usize;
            return Err(LexError {
                text: self.source.get(range).unwrap_or_default().to_owned(),
                span: bad.span,
            });
        }
        Ok(tokens)
    }

    fn convert_token(&self, raw: RawToken, slice: &str) -> TokenKind {
        match raw {
            RawToken::Nil => TokenKind::Nil,
            RawToken::Def => TokenKind::Def,
            RawToken::If => TokenKind::If,
            RawToken::Then => TokenKind::Then,
            RawToken::Else => TokenKind::Else,
            RawToken::Close => TokenKind::Close,
            RawToken::With => TokenKind::With,
            RawToken::Var => TokenKind::Var,
            RawToken::Set => TokenKind::Set,
            RawToken::Test => TokenKind::Test,
            RawToken::Module => TokenKind::Module,
            RawToken::LBrace => TokenKind::LBrace,
            RawToken::RBrace => TokenKind::RBrace,
            RawToken::LParen => TokenKind::LParen,
            RawToken::RParen => TokenKind::RParen,
            RawToken::LBracket => TokenKind::LBracket,
            RawToken::RBracket => TokenKind::RBracket,
            RawToken::Dot => TokenKind::Dot,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Semicolon => TokenKind::Semicolon,
            RawToken::Eq => TokenKind::Eq,
            RawToken::FatArrow => TokenKind::FatArrow,
            RawToken::ColonColon => TokenKind::ColonColon,
            RawToken::Dollar => TokenKind::Dollar,
            RawToken::Underscore => TokenKind::Underscore,
            RawToken::Number(value) => TokenKind::Number(value),
            RawToken::Ident => TokenKind::Ident(self.symbols.intern(slice)),
        }
    }
}

/// Convenience wrapper: lex `source` with `symbols`.
pub fn lex(source: &str, symbols: &SymbolTable) -> TokenList {
    Lexer::new(source, symbols).lex_all()
}

#[cfg(test)]
mod tests;
