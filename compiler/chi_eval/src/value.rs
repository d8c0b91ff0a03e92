//! Runtime values.
//!
//! Values are cheap to clone: scalars are `Copy`, callables and modules are
//! reference counted, and a [`StateRef`] shares its map. Collections own their
//! items and are copied on clone.

use crate::errors::InternalFault;
use crate::frame::MemoryFrame;
use crate::primitives::Primitive;
use crate::scope::LexicalScope;
use chi_ir::{ast, Decimal, Name};
use rustc_hash::FxHashMap;
use std::cell::{OnceCell, Ref, RefCell};
use std::fmt;
use std::rc::Rc;

#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Nil,
    Number(Decimal),
    /// An unbound name, used verbatim.
    Open(Name),
    Definition(Rc<Callable>),
    Primitive(Rc<Primitive>),
    Module(Rc<ModuleValue>),
    State(StateRef),
    /// Flattened on normalization; never holds `Nil` or nested sequences
    /// afterwards.
    Sequence(Vec<Value>),
    Tuple(Vec<Value>),
    /// Results of the top-level instructions of a unit.
    Program(Vec<Value>),
}

impl Value {
    /// Name of the variant, for type errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Number(_) => "number",
            Value::Open(_) => "open name",
            Value::Definition(_) => "definition",
            Value::Primitive(_) => "primitive",
            Value::Module(_) => "module",
            Value::State(_) => "state",
            Value::Sequence(_) => "sequence",
            Value::Tuple(_) => "tuple",
            Value::Program(_) => "program",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// `1` for true, `0` for false.
    pub fn boolean(value: bool) -> Value {
        Value::Number(if value { Decimal::ONE } else { Decimal::ZERO })
    }

    pub fn new_state() -> Value {
        Value::State(StateRef::new())
    }

    /// Flatten sequences and drop their `Nil`s, recursively.
    ///
    /// A sequence left with no items becomes `Nil` and one left with a single
    /// item becomes that item. Tuples and programs keep their shape, but
    /// their items are normalized too.
    #[must_use]
    pub fn normalize(self) -> Value {
        match self {
            Value::Sequence(items) => {
                let mut flat = Vec::with_capacity(items.len());
                for item in items {
                    match item.normalize() {
                        Value::Nil => {}
                        Value::Sequence(inner) => flat.extend(inner),
                        other => flat.push(other),
                    }
                }
                if flat.len() > 1 {
                    Value::Sequence(flat)
                } else {
                    flat.pop().unwrap_or(Value::Nil)
                }
            }
            Value::Tuple(items) => Value::Tuple(items.into_iter().map(Value::normalize).collect()),
            Value::Program(items) => {
                Value::Program(items.into_iter().map(Value::normalize).collect())
            }
            other => other,
        }
    }
}

/// A definition bound to its analyzed scope and frame prototype.
///
/// Carries no captured environment: free names inside the body resolve
/// globally or dynamically.
pub struct Callable {
    pub node: Rc<ast::Definition>,
    /// `name(arity)`
    pub signature: Name,
    pub scope: Rc<LexicalScope>,
    prototype: OnceCell<MemoryFrame>,
}

impl Callable {
    pub fn new(node: Rc<ast::Definition>, signature: Name, scope: Rc<LexicalScope>) -> Rc<Self> {
        Rc::new(Callable {
            node,
            signature,
            scope,
            prototype: OnceCell::new(),
        })
    }

    pub fn name(&self) -> Name {
        self.node.name.name
    }

    /// Freeze the activation template. Later calls are ignored.
    pub fn set_prototype(&self, frame: MemoryFrame) {
        let _ = self.prototype.set(frame);
    }

    pub fn prototype(&self) -> Option<&MemoryFrame> {
        self.prototype.get()
    }

    /// A private copy of the prototype for one call.
    pub fn instantiate(&self) -> Result<MemoryFrame, InternalFault> {
        self.prototype
            .get()
            .cloned()
            .ok_or(InternalFault::UnsupportedNode("a definition without a frame prototype"))
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("signature", &self.signature)
            .field("arity", &self.node.arity())
            .finish_non_exhaustive()
    }
}

/// Value of a `module` or `test` block.
#[derive(Debug)]
pub struct ModuleValue {
    pub name: Name,
    /// Scope alias, e.g. `<program>/geometry`.
    pub path: Name,
}

/// Insertion-ordered map from names to values.
#[derive(Default, Debug)]
pub struct State {
    entries: Vec<(Name, Value)>,
    index: FxHashMap<Name, usize>,
}

impl State {
    pub fn get(&self, key: Name) -> Option<&Value> {
        self.index.get(&key).map(|&i| &self.entries[i].1)
    }

    pub fn contains_key(&self, key: Name) -> bool {
        self.index.contains_key(&key)
    }

    /// Insert or overwrite; an overwritten key keeps its position.
    pub fn insert(&mut self, key: Name, value: Value) {
        if let Some(&i) = self.index.get(&key) {
            self.entries[i].1 = value;
        } else {
            self.index.insert(key, self.entries.len());
            self.entries.push((key, value));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Name, &Value)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }
}

/// Shared, mutable handle to a [`State`].
///
/// Cloning the handle shares the map; `set x.a = 1` is visible through every
/// handle to `x`.
#[derive(Clone, Default)]
#[repr(transparent)]
pub struct StateRef(Rc<RefCell<State>>);

impl StateRef {
    pub fn new() -> Self {
        StateRef::default()
    }

    #[inline]
    pub fn borrow(&self) -> Ref<'_, State> {
        self.0.borrow()
    }

    pub fn get(&self, key: Name) -> Option<Value> {
        self.0.borrow().get(key).cloned()
    }

    pub fn insert(&self, key: Name, value: Value) {
        self.0.borrow_mut().insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn ptr_eq(&self, other: &StateRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the shared map, for cycle detection.
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }
}

impl fmt::Debug for StateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keys only: states may contain themselves.
        let state = self.0.borrow();
        f.debug_set().entries(state.iter().map(|(k, _)| k)).finish()
    }
}

#[cfg(test)]
mod tests;
