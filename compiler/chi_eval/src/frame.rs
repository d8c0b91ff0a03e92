//! Memory frames: flat value arrays addressed by analyzer-computed indices.

use crate::errors::InternalFault;
use crate::scope::{Declaration, LexicalScope};
use crate::value::Value;
use std::rc::Rc;

#[derive(Clone, Debug)]
pub struct MemoryFrame {
    scope: Rc<LexicalScope>,
    values: Vec<Value>,
}

impl MemoryFrame {
    /// A frame whose slots start from their declarations' values.
    pub fn new(scope: Rc<LexicalScope>) -> Self {
        let values = scope.declarations().iter().map(Declaration::initial_value).collect();
        MemoryFrame { scope, values }
    }

    /// Activation template for a definition scope: nested definitions and
    /// modules are filled in, parameters and variables start `Nil`.
    ///
    /// Slot 0 stays `Nil` here and receives the callee on each call, so the
    /// template never points back at its own definition.
    pub fn prototype(scope: Rc<LexicalScope>) -> Self {
        let mut frame = MemoryFrame::new(scope);
        if let Some(slot) = frame.values.first_mut() {
            *slot = Value::Nil;
        }
        frame
    }

    pub fn scope(&self) -> &Rc<LexicalScope> {
        &self.scope
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn read(&self, index: usize) -> Result<Value, InternalFault> {
        self.values
            .get(index)
            .cloned()
            .ok_or(InternalFault::FrameIndexOutOfRange {
                index,
                len: self.values.len(),
            })
    }

    pub fn write(&mut self, index: usize, value: Value) -> Result<(), InternalFault> {
        let len = self.values.len();
        let slot = self
            .values
            .get_mut(index)
            .ok_or(InternalFault::FrameIndexOutOfRange { index, len })?;
        *slot = value;
        Ok(())
    }

    /// Grow in place with slots for `declarations`.
    pub fn extend(&mut self, declarations: &[Declaration]) {
        self.values
            .extend(declarations.iter().map(Declaration::initial_value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::{DeclarationKind, LookupMode, ScopeKind};
    use chi_ir::{Decimal, SymbolTable};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_write_and_bounds() {
        let symbols = SymbolTable::new();
        let scope = LexicalScope::new(symbols.intern("s"), ScopeKind::Singleton, None);
        let x = symbols.intern("x");
        assert_eq!(
            scope.append(Declaration::new(x, DeclarationKind::Var), LookupMode::Strict),
            Ok(0)
        );

        let mut frame = MemoryFrame::new(scope);
        assert!(frame.read(0).is_ok_and(|v| v.is_nil()));
        assert_eq!(frame.write(0, Value::Number(Decimal::TWO)), Ok(()));
        assert!(matches!(frame.read(0), Ok(Value::Number(n)) if n == Decimal::TWO));
        assert_eq!(
            frame.write(3, Value::Nil),
            Err(InternalFault::FrameIndexOutOfRange { index: 3, len: 1 })
        );
    }

    #[test]
    fn test_clone_is_private_copy() {
        let symbols = SymbolTable::new();
        let scope = LexicalScope::new(symbols.intern("f(1)"), ScopeKind::Instance, None);
        let n = symbols.intern("n");
        let _ = scope.append(Declaration::new(symbols.intern("f(1)"), DeclarationKind::Param), LookupMode::Strict);
        let _ = scope.append(Declaration::new(n, DeclarationKind::Param), LookupMode::Strict);

        let prototype = MemoryFrame::prototype(scope);
        let mut activation = prototype.clone();
        assert_eq!(activation.write(1, Value::Number(Decimal::ONE)), Ok(()));

        assert!(prototype.read(1).is_ok_and(|v| v.is_nil()));
        assert!(Rc::ptr_eq(prototype.scope(), activation.scope()));
    }

    #[test]
    fn test_extend_appends_initial_values() {
        let symbols = SymbolTable::new();
        let scope = LexicalScope::global(symbols.intern("<global>"));
        let mut frame = MemoryFrame::new(Rc::clone(&scope));
        assert!(frame.is_empty());

        let extra = vec![
            Declaration::new(symbols.intern("a"), DeclarationKind::Var),
            Declaration::new(symbols.intern("b"), DeclarationKind::Var),
        ];
        frame.extend(&extra);
        assert_eq!(frame.len(), 2);
    }
}
