//! Structural equivalence (`steq`).

use crate::value::{StateRef, Value};
use rustc_hash::FxHashSet;
use std::rc::Rc;

/// Deep comparison of two values.
///
/// Different variants are never equivalent. Scalars compare by value,
/// states by key set and per-key equivalence, sequences, tuples and programs
/// item by item. Definitions, primitives and modules compare by identity.
pub fn structurally_equal(left: &Value, right: &Value) -> bool {
    Comparison::default().equal(left, right)
}

#[derive(Default)]
struct Comparison {
    /// State pairs already assumed equal; cyclic states terminate here.
    assumed: FxHashSet<(usize, usize)>,
}

impl Comparison {
    fn equal(&mut self, left: &Value, right: &Value) -> bool {
        match (left, right) {
            (Value::Nil, Value::Nil) => true,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Open(a), Value::Open(b)) => a == b,
            (Value::Definition(a), Value::Definition(b)) => Rc::ptr_eq(a, b),
            (Value::Primitive(a), Value::Primitive(b)) => Rc::ptr_eq(a, b),
            (Value::Module(a), Value::Module(b)) => Rc::ptr_eq(a, b),
            (Value::State(a), Value::State(b)) => self.states(a, b),
            (Value::Sequence(a), Value::Sequence(b))
            | (Value::Tuple(a), Value::Tuple(b))
            | (Value::Program(a), Value::Program(b)) => self.items(a, b),
            _ => false,
        }
    }

    fn items(&mut self, left: &[Value], right: &[Value]) -> bool {
        left.len() == right.len() && left.iter().zip(right).all(|(a, b)| self.equal(a, b))
    }

    fn states(&mut self, left: &StateRef, right: &StateRef) -> bool {
        if left.ptr_eq(right) || !self.assumed.insert((left.addr(), right.addr())) {
            return true;
        }
        let (left, right) = (left.borrow(), right.borrow());
        left.len() == right.len()
            && left.iter().all(|(key, a)| match right.get(key) {
                Some(b) => self.equal(a, b),
                None => false,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chi_ir::{Decimal, SymbolTable};

    fn num(n: i64) -> Value {
        Value::Number(Decimal::from(n))
    }

    #[test]
    fn test_scalars() {
        let symbols = SymbolTable::new();
        let x = symbols.intern("x");
        assert!(structurally_equal(&Value::Nil, &Value::Nil));
        assert!(structurally_equal(&num(3), &Value::Number(Decimal::new(30, 1))));
        assert!(structurally_equal(&Value::Open(x), &Value::Open(x)));
        assert!(!structurally_equal(&num(0), &Value::Nil));
        assert!(!structurally_equal(&Value::Open(x), &num(1)));
    }

    #[test]
    fn test_collections_are_positional() {
        let seq = Value::Sequence(vec![num(1), num(2)]);
        let swapped = Value::Sequence(vec![num(2), num(1)]);
        let tuple = Value::Tuple(vec![num(1), num(2)]);
        assert!(structurally_equal(&seq, &seq.clone()));
        assert!(!structurally_equal(&seq, &swapped));
        assert!(!structurally_equal(&seq, &tuple));
    }

    #[test]
    fn test_states_ignore_insertion_order() {
        let symbols = SymbolTable::new();
        let (a, b) = (symbols.intern("a"), symbols.intern("b"));

        let left = StateRef::new();
        left.insert(a, num(1));
        left.insert(b, Value::new_state());
        let right = StateRef::new();
        right.insert(b, Value::new_state());
        right.insert(a, num(1));
        assert!(structurally_equal(&Value::State(left.clone()), &Value::State(right.clone())));

        right.insert(a, num(2));
        assert!(!structurally_equal(&Value::State(left), &Value::State(right)));
    }

    #[test]
    fn test_cyclic_states_terminate() {
        let symbols = SymbolTable::new();
        let me = symbols.intern("me");
        let left = StateRef::new();
        left.insert(me, Value::State(left.clone()));
        let right = StateRef::new();
        right.insert(me, Value::State(right.clone()));
        assert!(structurally_equal(&Value::State(left), &Value::State(right)));
    }
}
