//! Lexical scopes: ordered, append-only declaration lists.
//!
//! A scope is either a `Singleton` (the global scope, a program, a module or
//! a test block: its slots live in the global frame starting at
//! `global_frame_start`) or an `Instance` (a definition: its slots live in a
//! fresh frame per call). Lookups from an `Instance` skip other `Instance`
//! ancestors, so a body sees its own locals and the globals, nothing between.

use crate::primitives::Primitive;
use crate::value::{Callable, ModuleValue, Value};
use chi_ir::Name;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    Singleton,
    Instance,
}

/// How a scope chooses among several declarations of the same name.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LookupMode {
    /// First match wins; redeclaring in a scope is an error. Used for files.
    #[default]
    Strict,
    /// Last match wins, so redefinitions shadow. Used interactively.
    Permissive,
}

#[derive(Clone)]
pub enum DeclarationKind {
    Primitive(Rc<Primitive>),
    /// Weak: the definition's own scope declares it too, and the callable
    /// owns that scope.
    Def(Weak<Callable>),
    Module(Rc<ModuleValue>),
    Param,
    Var,
}

#[derive(Clone)]
pub struct Declaration {
    pub name: Name,
    pub kind: DeclarationKind,
}

impl Declaration {
    pub fn new(name: Name, kind: DeclarationKind) -> Self {
        Declaration { name, kind }
    }

    /// Value a global slot starts with.
    pub fn initial_value(&self) -> Value {
        match &self.kind {
            DeclarationKind::Primitive(primitive) => Value::Primitive(Rc::clone(primitive)),
            DeclarationKind::Def(callable) => callable.upgrade().map_or(Value::Nil, Value::Definition),
            DeclarationKind::Module(module) => Value::Module(Rc::clone(module)),
            DeclarationKind::Param | DeclarationKind::Var => Value::Nil,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(
            self.kind,
            DeclarationKind::Primitive(_) | DeclarationKind::Def(_)
        )
    }

    pub fn is_param(&self) -> bool {
        matches!(self.kind, DeclarationKind::Param)
    }
}

impl fmt::Debug for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            DeclarationKind::Primitive(_) => "Primitive",
            DeclarationKind::Def(_) => "Def",
            DeclarationKind::Module(_) => "Module",
            DeclarationKind::Param => "Param",
            DeclarationKind::Var => "Var",
        };
        write!(f, "{kind}({:?})", self.name)
    }
}

/// Rejected append: `name` already exists in the scope aliased `scope`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Duplicate {
    pub name: Name,
    pub scope: Name,
}

/// Result of a [`LexicalScope::recursive_lookup`].
pub struct ScopeMatch {
    pub declaration: Declaration,
    pub scope: Rc<LexicalScope>,
    /// Position inside `scope`, not inside the global frame.
    pub index: usize,
}

pub struct LexicalScope {
    alias: Name,
    kind: ScopeKind,
    parent: Option<Rc<LexicalScope>>,
    global_frame_start: Cell<Option<usize>>,
    declarations: RefCell<Vec<Declaration>>,
}

impl LexicalScope {
    pub fn new(alias: Name, kind: ScopeKind, parent: Option<Rc<LexicalScope>>) -> Rc<Self> {
        Rc::new(LexicalScope {
            alias,
            kind,
            parent,
            global_frame_start: Cell::new(None),
            declarations: RefCell::new(Vec::new()),
        })
    }

    /// The permanent root: a parentless `Singleton` placed at offset 0.
    pub fn global(alias: Name) -> Rc<Self> {
        let scope = Self::new(alias, ScopeKind::Singleton, None);
        scope.global_frame_start.set(Some(0));
        scope
    }

    pub fn alias(&self) -> Name {
        self.alias
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    pub fn parent(&self) -> Option<&Rc<LexicalScope>> {
        self.parent.as_ref()
    }

    pub fn global_frame_start(&self) -> Option<usize> {
        self.global_frame_start.get()
    }

    pub fn set_global_frame_start(&self, start: usize) {
        self.global_frame_start.set(Some(start));
    }

    pub fn len(&self) -> usize {
        self.declarations.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.borrow().is_empty()
    }

    pub fn declaration(&self, index: usize) -> Option<Declaration> {
        self.declarations.borrow().get(index).cloned()
    }

    /// Copy of every declaration, in slot order.
    pub fn declarations(&self) -> Vec<Declaration> {
        self.declarations.borrow().clone()
    }

    /// Append and return the new slot index.
    ///
    /// `Instance` scopes reject duplicates in every mode.
    pub fn append(&self, declaration: Declaration, mode: LookupMode) -> Result<usize, Duplicate> {
        let strict = mode == LookupMode::Strict || self.kind == ScopeKind::Instance;
        if strict && self.lookup(declaration.name, mode).is_some() {
            return Err(Duplicate {
                name: declaration.name,
                scope: self.alias,
            });
        }
        let mut declarations = self.declarations.borrow_mut();
        declarations.push(declaration);
        Ok(declarations.len() - 1)
    }

    /// Append without checking for duplicates, when merging a committed
    /// unit into the global scope.
    pub(crate) fn extend(&self, declarations: impl IntoIterator<Item = Declaration>) {
        self.declarations.borrow_mut().extend(declarations);
    }

    /// Find `name` in this scope only.
    pub fn lookup(&self, name: Name, mode: LookupMode) -> Option<(Declaration, usize)> {
        let declarations = self.declarations.borrow();
        let mut candidates = declarations.iter().enumerate();
        let found = match mode {
            LookupMode::Strict => candidates.find(|(_, d)| d.name == name),
            LookupMode::Permissive => candidates.rfind(|(_, d)| d.name == name),
        };
        found.map(|(index, declaration)| (declaration.clone(), index))
    }

    /// Find `name` here, then in the nearest `Singleton` ancestor, and so on
    /// up to the root.
    pub fn recursive_lookup(self: &Rc<Self>, name: Name, mode: LookupMode) -> Option<ScopeMatch> {
        let mut current = Rc::clone(self);
        loop {
            if let Some((declaration, index)) = current.lookup(name, mode) {
                return Some(ScopeMatch {
                    declaration,
                    scope: current,
                    index,
                });
            }
            let mut ancestor = current.parent.clone()?;
            while ancestor.kind == ScopeKind::Instance {
                ancestor = ancestor.parent.clone()?;
            }
            current = ancestor;
        }
    }
}

impl fmt::Debug for LexicalScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LexicalScope")
            .field("alias", &self.alias)
            .field("kind", &self.kind)
            .field("global_frame_start", &self.global_frame_start.get())
            .field("declarations", &self.declarations.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
