//! Parse error types.

use chi_ir::Span;
use std::fmt;

/// What the parser was working on when it failed, for "while parsing X"
/// messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorContext {
    Program,
    Test,
    Module,
    Definition,
    Expression,
    Conditional,
    Close,
    Tuple,
    Var,
    Set,
    Call,
    Index,
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self {
            ErrorContext::Program => "a program",
            ErrorContext::Test => "a test block",
            ErrorContext::Module => "a module",
            ErrorContext::Definition => "a definition",
            ErrorContext::Expression => "an expression",
            ErrorContext::Conditional => "an `if` expression",
            ErrorContext::Close => "a `close` expression",
            ErrorContext::Tuple => "a tuple",
            ErrorContext::Var => "a `var` declaration",
            ErrorContext::Set => "a `set` assignment",
            ErrorContext::Call => "call arguments",
            ErrorContext::Index => "an index access",
        };
        f.write_str(what)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("expected {expected}, found {found}")]
    Unexpected {
        expected: &'static str,
        found: &'static str,
    },
    #[error("unrecognized input")]
    Unrecognized,
    #[error("only names can be called")]
    InvalidCallee,
    #[error("only names, members and indexes can be assigned")]
    InvalidSetTarget,
}

/// A syntax error with the innermost construct being parsed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind} while parsing {context} (at {span})")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub context: ErrorContext,
    pub span: Span,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, context: ErrorContext, span: Span) -> Self {
        ParseError {
            kind,
            context,
            span,
        }
    }
}
