//! Helpers shared by the unit tests of this crate.

use crate::errors::UnitError;
use crate::print_handler::{buffer_handler, SharedPrintHandler};
use crate::scope::LookupMode;
use crate::serialize::render;
use crate::session::Session;
use crate::value::Value;
use chi_ir::SharedSymbols;

/// A session that captures `print` output.
pub fn session(mode: LookupMode) -> (Session, SharedPrintHandler) {
    let print = buffer_handler();
    let session = Session::new(SharedSymbols::new(), mode).with_print_handler(print.clone());
    (session, print)
}

/// Parse and run one unit. Parse errors fail the test.
pub fn run(session: &mut Session, source: &str) -> Result<Value, UnitError> {
    let program = match chi_parse::parse(source, session.symbols()) {
        Ok(program) => program,
        Err(error) => panic!("failed to parse {source:?}: {error}"),
    };
    session.run(&program)
}

/// Run a unit that must succeed and render the result of its last
/// instruction compactly.
pub fn eval(session: &mut Session, source: &str) -> String {
    let last = match run(session, source) {
        Ok(Value::Program(mut results)) => results.pop().unwrap_or_default(),
        Ok(other) => other,
        Err(error) => panic!("{source:?} failed: {error}"),
    };
    render(&last, session.symbols(), false)
}

/// Run a single unit in a fresh strict session.
pub fn eval_fresh(source: &str) -> String {
    let (mut session, _) = session(LookupMode::Strict);
    eval(&mut session, source)
}
