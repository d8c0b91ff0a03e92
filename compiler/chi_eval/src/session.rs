//! A session: the symbol table, the global scope and frame, and the state
//! that carries from one unit to the next.

use crate::analyzer::Analyzer;
use crate::errors::UnitError;
use crate::frame::MemoryFrame;
use crate::interpreter::Interpreter;
use crate::primitives;
use crate::print_handler::{stdout_handler, SharedPrintHandler};
use crate::scope::{Declaration, LexicalScope, LookupMode};
use crate::value::Value;
use chi_ir::{Program, SharedSymbols, WellKnownNames};
use std::rc::Rc;

pub struct Session {
    symbols: SharedSymbols,
    names: WellKnownNames,
    mode: LookupMode,
    global_scope: Rc<LexicalScope>,
    global_frame: MemoryFrame,
    last_result: Value,
    print: SharedPrintHandler,
}

impl Session {
    /// A fresh session with the primitives registered.
    pub fn new(symbols: SharedSymbols, mode: LookupMode) -> Self {
        let names = WellKnownNames::new(&symbols);
        let global_scope = LexicalScope::global(names.global);
        let global_frame = MemoryFrame::new(Rc::clone(&global_scope));
        let mut session = Session {
            symbols,
            names,
            mode,
            global_scope,
            global_frame,
            last_result: Value::Nil,
            print: stdout_handler(),
        };
        session.register_primitives();
        session
    }

    #[must_use]
    pub fn with_print_handler(mut self, print: SharedPrintHandler) -> Self {
        self.print = print;
        self
    }

    pub fn symbols(&self) -> &SharedSymbols {
        &self.symbols
    }

    pub fn names(&self) -> &WellKnownNames {
        &self.names
    }

    pub fn mode(&self) -> LookupMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: LookupMode) {
        self.mode = mode;
    }

    pub fn global_scope(&self) -> &Rc<LexicalScope> {
        &self.global_scope
    }

    pub fn global_frame(&self) -> &MemoryFrame {
        &self.global_frame
    }

    pub fn global_frame_mut(&mut self) -> &mut MemoryFrame {
        &mut self.global_frame
    }

    pub fn last_result(&self) -> &Value {
        &self.last_result
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.print
    }

    /// Forget every committed unit and start over with only the primitives.
    ///
    /// Symbols survive: codes stay stable across resets.
    pub fn reset(&mut self) {
        self.global_scope = LexicalScope::global(self.names.global);
        self.global_frame = MemoryFrame::new(Rc::clone(&self.global_scope));
        self.last_result = Value::Nil;
        self.register_primitives();
        tracing::debug!("session reset");
    }

    /// Merge committed declarations into the global scope and frame.
    pub(crate) fn extend(&mut self, declarations: Vec<Declaration>) {
        self.global_frame.extend(&declarations);
        self.global_scope.extend(declarations);
        debug_assert_eq!(self.global_scope.len(), self.global_frame.len());
    }

    /// Analyze and evaluate one unit.
    ///
    /// The result of the unit's last instruction becomes the next unit's
    /// `_`. A unit that was analyzed before is only evaluated again.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run(&mut self, program: &Program) -> Result<Value, UnitError> {
        if !program.is_analyzed() {
            Analyzer::new(self).analyze(program)?;
        }
        let result = Interpreter::new(self).run(program)?;
        self.last_result = match &result {
            Value::Program(results) => results.last().cloned().unwrap_or_default(),
            other => other.clone(),
        };
        Ok(result)
    }

    fn register_primitives(&mut self) {
        let declarations = primitives::declarations(&self.symbols);
        self.extend(declarations);
    }
}
