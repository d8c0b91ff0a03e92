//! Error types for analysis and evaluation.
//!
//! The three families never mix: analysis errors abort a unit before anything
//! is committed, runtime errors are the language's own failures (a test block
//! turns them into `KO`), and internal faults mean the analyzer and the
//! interpreter disagree about the tree.

use crate::value::Value;

/// A unit was rejected by the analyzer.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    #[error("`{name}` is already declared in scope `{scope}`")]
    DuplicateDeclaration { name: String, scope: String },
    #[error(transparent)]
    Internal(#[from] InternalFault),
}

/// Failures of a well-formed program at run time.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    #[error("`{0}` is not callable")]
    NotCallable(String),
    #[error("no definition or primitive matches `{0}`")]
    UnresolvedCallTarget(String),
    #[error("`{0}` is not declared in a local or global scope")]
    TargetNotFound(String),
    #[error("{0} is not a state")]
    NotAState(String),
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("primitive `{primitive}`: {message}")]
    Primitive { primitive: String, message: String },
}

impl RuntimeError {
    pub fn type_mismatch(expected: &'static str, found: &Value) -> Self {
        RuntimeError::TypeMismatch {
            expected,
            found: found.type_name(),
        }
    }
}

/// The tree and the runtime state disagree.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InternalFault {
    #[error("identifier `{0}` was never resolved")]
    UnresolvedIdentifier(String),
    #[error("{0} cannot be evaluated here")]
    UnsupportedNode(&'static str),
    #[error("frame index {index} out of range (frame has {len} slots)")]
    FrameIndexOutOfRange { index: usize, len: usize },
    #[error("local access outside of any activation")]
    NoActiveFrame,
    #[error("scope `{0}` was never placed in the global frame")]
    UnplacedScope(String),
}

/// Anything that can stop an evaluation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error("internal fault: {0}")]
    Internal(#[from] InternalFault),
}

pub type EvalResult<T = Value> = Result<T, EvalError>;

/// Failure of one unit: rejected by the analyzer or stopped while running.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum UnitError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}
