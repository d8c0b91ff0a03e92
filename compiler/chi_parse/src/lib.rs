//! Recursive-descent parser for Chi.
//!
//! The grammar needs one token of lookahead plus explicit follow sets: an
//! expression followed by anything outside [`FOLLOW_OF_EXPRESSION`] continues
//! as a sequence, so `a b c` is the sequence `a :: (b :: c)` while `a (b)` is
//! a call. The `::` separator forces a sequence where juxtaposition would
//! read as a call.

mod dump;
mod error;

use chi_ir::{
    Apply, Binding, Definition, Expr, ExprKind, Identifier, Module, ModuleKind, Program, Span,
    SymbolTable,
};
use chi_lexer::{Token, TokenKind, TokenList};
use chi_stack::ensure_sufficient_stack;
use std::rc::Rc;

pub use dump::dump_program;
pub use error::{ErrorContext, ParseError, ParseErrorKind};

/// Tokens that end an expression instead of continuing a sequence.
const FOLLOW_OF_EXPRESSION: &[TokenKind] = &[
    TokenKind::Semicolon,
    TokenKind::Comma,
    TokenKind::RParen,
    TokenKind::RBrace,
    TokenKind::RBracket,
    TokenKind::Then,
    TokenKind::Else,
    TokenKind::With,
    TokenKind::Eq,
    TokenKind::Eof,
];

/// Parser state.
pub struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    /// End offset of the last consumed token, for node spans.
    prev_end: u32,
    contexts: Vec<ErrorContext>,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t TokenList) -> Self {
        Parser {
            tokens: &tokens.tokens,
            pos: 0,
            prev_end: 0,
            contexts: vec![ErrorContext::Program],
        }
    }

    /// Parse a complete unit.
    pub fn parse_program(mut self) -> Result<Program, ParseError> {
        let instructions = self.instructions()?;
        self.expect(&TokenKind::Eof)?;
        tracing::trace!(instructions = instructions.len(), "parsed program");
        Ok(Program::new(instructions))
    }

    // ===== Token access =====

    fn current(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos).or_else(|| self.tokens.last())
    }

    fn current_kind(&self) -> &'t TokenKind {
        self.current().map_or(&TokenKind::Eof, |t| &t.kind)
    }

    fn current_span(&self) -> Span {
        self.current()
            .map_or(Span::new(self.prev_end, self.prev_end), |t| t.span)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    fn at_instruction_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof | TokenKind::RBrace)
    }

    fn at_follow_of_expression(&self) -> bool {
        FOLLOW_OF_EXPRESSION.iter().any(|kind| self.check(kind))
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let token = self.current();
        if let Some(token) = token {
            if token.kind != TokenKind::Eof {
                self.pos += 1;
                self.prev_end = token.span.end;
            }
        }
        token
    }

    fn context(&self) -> ErrorContext {
        self.contexts
            .last()
            .copied()
            .unwrap_or(ErrorContext::Program)
    }

    fn in_context<T>(
        &mut self,
        context: ErrorContext,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        self.contexts.push(context);
        let result = f(self);
        self.contexts.pop();
        result
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.context(), self.current_span())
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        let kind = match self.current_kind() {
            TokenKind::Error => ParseErrorKind::Unrecognized,
            found => ParseErrorKind::Unexpected {
                expected,
                found: found.describe(),
            },
        };
        self.error(kind)
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<Span, ParseError> {
        if self.check(kind) {
            let span = self.current_span();
            self.advance();
            Ok(span)
        } else {
            Err(self.unexpected(kind.describe()))
        }
    }

    fn identifier(&mut self) -> Result<Identifier, ParseError> {
        match self.current_kind() {
            TokenKind::Ident(name) => {
                let span = self.current_span();
                self.advance();
                Ok(Identifier::new(*name, span))
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    fn span_from(&self, start: Span) -> Span {
        Span::new(start.start, self.prev_end.max(start.start))
    }

    // ===== Instructions =====

    fn instructions(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut instructions = Vec::new();
        while !self.at_instruction_end() {
            instructions.push(self.instruction()?);
            if !self.at_instruction_end() {
                self.expect(&TokenKind::Semicolon)?;
            }
        }
        Ok(instructions)
    }

    fn instruction(&mut self) -> Result<Expr, ParseError> {
        match self.current_kind() {
            TokenKind::Test => {
                self.in_context(ErrorContext::Test, |p| p.module(ModuleKind::Test))
            }
            TokenKind::Module => {
                self.in_context(ErrorContext::Module, |p| p.module(ModuleKind::Module))
            }
            TokenKind::Def => self.in_context(ErrorContext::Definition, Self::definition),
            _ => self.expression(),
        }
    }

    fn module(&mut self, kind: ModuleKind) -> Result<Expr, ParseError> {
        let start = self.current_span();
        self.advance();
        let name = self.identifier()?;
        self.expect(&TokenKind::LBrace)?;
        let instructions = self.instructions()?;
        self.expect(&TokenKind::RBrace)?;

        let span = self.span_from(start);
        let module = Module::new(kind, name, instructions, span);
        Ok(Expr::new(ExprKind::Module(Box::new(module)), span))
    }

    fn definition(&mut self) -> Result<Expr, ParseError> {
        let start = self.expect(&TokenKind::Def)?;
        let name = self.identifier()?;

        let mut params = Vec::new();
        if self.check(&TokenKind::LParen) {
            self.advance();
            while !self.check(&TokenKind::RParen) {
                params.push(self.identifier()?);
                if !self.check(&TokenKind::RParen) {
                    self.expect(&TokenKind::Comma)?;
                }
            }
            self.expect(&TokenKind::RParen)?;
        }

        let body = if self.check(&TokenKind::FatArrow) {
            self.advance();
            Some(self.expression()?)
        } else {
            None
        };

        let span = self.span_from(start);
        let definition = Definition::new(name, params, body, span);
        Ok(Expr::new(ExprKind::Definition(Rc::new(definition)), span))
    }

    // ===== Expressions =====

    /// `postfix (('::')? expression)?`
    fn expression(&mut self) -> Result<Expr, ParseError> {
        ensure_sufficient_stack(|| {
            let head = self.postfix()?;
            if self.at_follow_of_expression() {
                return Ok(head);
            }

            if self.check(&TokenKind::ColonColon) {
                self.advance();
            }

            let tail = self.expression()?;
            let span = head.span.merge(tail.span);
            Ok(Expr::new(
                ExprKind::Sequence {
                    head: Box::new(head),
                    tail: Box::new(tail),
                },
                span,
            ))
        })
    }

    fn postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.atom()?;

        loop {
            match self.current_kind() {
                TokenKind::Dot => {
                    self.advance();
                    if self.check(&TokenKind::LBracket) {
                        self.advance();
                        let key = self.in_context(ErrorContext::Index, Self::expression)?;
                        self.expect(&TokenKind::RBracket)?;
                        let span = self.span_from(expr.span);
                        expr = Expr::new(
                            ExprKind::Index {
                                object: Box::new(expr),
                                key: Box::new(key),
                            },
                            span,
                        );
                    } else {
                        let member = self.identifier()?;
                        let span = self.span_from(expr.span);
                        expr = Expr::new(
                            ExprKind::Access {
                                object: Box::new(expr),
                                member: member.name,
                            },
                            span,
                        );
                    }
                }
                TokenKind::LParen => {
                    let callee_span = expr.span;
                    let ExprKind::Identifier(callee) = expr.kind else {
                        return Err(ParseError::new(
                            ParseErrorKind::InvalidCallee,
                            self.context(),
                            callee_span,
                        ));
                    };
                    let start = callee.span;
                    let args = self.in_context(ErrorContext::Call, |p| {
                        p.delimited(&TokenKind::LParen, &TokenKind::RParen)
                    })?;
                    let span = self.span_from(start);
                    expr = Expr::new(ExprKind::Apply(Apply::new(callee, args)), span);
                }
                _ => return Ok(expr),
            }
        }
    }

    /// `open (expression (',' expression)*)? close`
    fn delimited(&mut self, open: &TokenKind, close: &TokenKind) -> Result<Vec<Expr>, ParseError> {
        self.expect(open)?;
        let mut items = Vec::new();
        while !self.check(close) {
            items.push(self.expression()?);
            if !self.check(close) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        self.expect(close)?;
        Ok(items)
    }

    fn atom(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_span();
        let kind = match self.current_kind() {
            TokenKind::Nil => {
                self.advance();
                ExprKind::Nil
            }
            TokenKind::Number(value) => {
                self.advance();
                ExprKind::Number(*value)
            }
            TokenKind::Underscore => {
                self.advance();
                ExprKind::Wildcard
            }
            TokenKind::Ident(_) => ExprKind::Identifier(self.identifier()?),
            TokenKind::Dollar => {
                self.advance();
                ExprKind::Shielded(self.identifier()?.name)
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.expression()?;
                self.expect(&TokenKind::RParen)?;
                return Ok(inner);
            }
            TokenKind::LBrace => {
                let items = self.in_context(ErrorContext::Tuple, |p| {
                    p.delimited(&TokenKind::LBrace, &TokenKind::RBrace)
                })?;
                ExprKind::Tuple(items)
            }
            TokenKind::If => self.in_context(ErrorContext::Conditional, Self::conditional)?,
            TokenKind::Close => self.in_context(ErrorContext::Close, Self::close)?,
            TokenKind::Var => self.in_context(ErrorContext::Var, Self::var)?,
            TokenKind::Set => self.in_context(ErrorContext::Set, Self::set)?,
            _ => return Err(self.unexpected("expression")),
        };
        Ok(Expr::new(kind, self.span_from(start)))
    }

    fn conditional(&mut self) -> Result<ExprKind, ParseError> {
        self.expect(&TokenKind::If)?;
        let condition = self.expression()?;
        self.expect(&TokenKind::Then)?;
        let then_branch = self.expression()?;
        let else_branch = if self.check(&TokenKind::Else) {
            self.advance();
            Some(Box::new(self.expression()?))
        } else {
            None
        };
        Ok(ExprKind::Conditional {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch,
        })
    }

    fn close(&mut self) -> Result<ExprKind, ParseError> {
        self.expect(&TokenKind::Close)?;
        let body = self.expression()?;
        self.expect(&TokenKind::With)?;
        self.expect(&TokenKind::LParen)?;

        let mut bindings = Vec::new();
        while !self.check(&TokenKind::RParen) {
            let shielded = self.check(&TokenKind::Dollar);
            if shielded {
                self.advance();
            }
            let name = self.identifier()?;
            self.expect(&TokenKind::Eq)?;
            let value = self.expression()?;
            bindings.push(Binding {
                name,
                shielded,
                value,
            });
            if !self.check(&TokenKind::RParen) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        self.expect(&TokenKind::RParen)?;

        Ok(ExprKind::Close {
            body: Box::new(body),
            bindings,
        })
    }

    fn var(&mut self) -> Result<ExprKind, ParseError> {
        self.expect(&TokenKind::Var)?;
        self.expect(&TokenKind::LParen)?;
        let name = self.identifier()?;
        let init = if self.check(&TokenKind::Eq) {
            self.advance();
            Some(Box::new(self.expression()?))
        } else {
            None
        };
        self.expect(&TokenKind::RParen)?;
        Ok(ExprKind::Var { name, init })
    }

    /// `set(target = value)` or `set target = value`.
    fn set(&mut self) -> Result<ExprKind, ParseError> {
        self.expect(&TokenKind::Set)?;
        let parenthesized = self.check(&TokenKind::LParen);
        if parenthesized {
            self.advance();
        }

        let target = self.expression()?;
        if !matches!(
            target.kind,
            ExprKind::Identifier(_) | ExprKind::Access { .. } | ExprKind::Index { .. }
        ) {
            return Err(ParseError::new(
                ParseErrorKind::InvalidSetTarget,
                self.context(),
                target.span,
            ));
        }
        self.expect(&TokenKind::Eq)?;
        let value = self.expression()?;

        if parenthesized {
            self.expect(&TokenKind::RParen)?;
        }
        Ok(ExprKind::Set {
            target: Box::new(target),
            value: Box::new(value),
        })
    }
}

/// Lex and parse `source` in one step.
pub fn parse(source: &str, symbols: &SymbolTable) -> Result<Program, ParseError> {
    let tokens = chi_lexer::lex(source, symbols);
    Parser::new(&tokens).parse_program()
}

#[cfg(test)]
mod tests;
