//! Chi evaluation: semantic analysis and a tree-walking interpreter.
//!
//! A [`Session`] owns the global scope and frame that persist across units.
//! [`Session::run`] takes a parsed [`chi_ir::Program`] through the
//! [`analyzer`] (scopes, placement, resolution, commit) and then the
//! [`interpreter`], which reads values from the slots the analyzer computed.
//!
//! Names that resolve nowhere are dynamic: they read as open names unless a
//! `close ... with` binding is live.

pub mod analyzer;
pub mod equivalence;
pub mod errors;
pub mod frame;
pub mod interpreter;
pub mod primitives;
pub mod print_handler;
pub mod scope;
pub mod serialize;
pub mod session;
pub mod value;

#[cfg(test)]
mod test_support;

pub use equivalence::structurally_equal;
pub use errors::{AnalysisError, EvalError, EvalResult, InternalFault, RuntimeError, UnitError};
pub use interpreter::{Interpreter, TestOutcome};
pub use print_handler::{
    buffer_handler, channel_handler, silent_handler, stdout_handler, PrintHandler,
    SharedPrintHandler,
};
pub use scope::LookupMode;
pub use serialize::render;
pub use session::Session;
pub use value::{StateRef, Value};
