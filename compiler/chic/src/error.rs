//! Driver errors: everything that can stop a command, by category.

use chi_eval::errors::{AnalysisError, EvalError, InternalFault, RuntimeError, UnitError};
use chi_ir::Span;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("{0}")]
    Usage(String),
    #[error("cannot read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Lex or parse failure, located in its source.
    #[error("{origin}:{line}:{column}: {message}")]
    Syntax {
        origin: String,
        line: usize,
        column: usize,
        message: String,
    },
    #[error(transparent)]
    Analysis(AnalysisError),
    #[error(transparent)]
    Runtime(RuntimeError),
    #[error(transparent)]
    Internal(InternalFault),
}

impl DriverError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DriverError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn syntax(origin: &str, source: &str, span: Span, message: impl ToString) -> Self {
        let (line, column) = span.line_col(source);
        DriverError::Syntax {
            origin: origin.to_string(),
            line,
            column,
            message: message.to_string(),
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            DriverError::Usage(_) => "usage error",
            DriverError::Io { .. } => "i/o error",
            DriverError::Syntax { .. } => "syntax error",
            DriverError::Analysis(_) => "analysis error",
            DriverError::Runtime(_) => "runtime error",
            DriverError::Internal(_) => "internal error",
        }
    }
}

impl From<UnitError> for DriverError {
    fn from(error: UnitError) -> Self {
        match error {
            UnitError::Analysis(AnalysisError::Internal(fault))
            | UnitError::Eval(EvalError::Internal(fault)) => DriverError::Internal(fault),
            UnitError::Analysis(error) => DriverError::Analysis(error),
            UnitError::Eval(EvalError::Runtime(error)) => DriverError::Runtime(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_internal_faults_are_separated() {
        let fault = InternalFault::NoActiveFrame;
        let from_analysis = DriverError::from(UnitError::Analysis(fault.clone().into()));
        let from_eval = DriverError::from(UnitError::Eval(fault.into()));
        assert_eq!(from_analysis.category(), "internal error");
        assert_eq!(from_eval.category(), "internal error");
    }

    #[test]
    fn test_syntax_error_location() {
        let source = "a\nb @";
        let error = DriverError::syntax("<repl>", source, Span::new(4, 5), "unrecognized input");
        assert_eq!(error.to_string(), "<repl>:2:3: unrecognized input");
        assert_eq!(error.category(), "syntax error");
    }
}
