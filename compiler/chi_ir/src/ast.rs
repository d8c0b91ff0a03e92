//! Syntax tree for Chi programs.
//!
//! The parser builds the tree with every resolution slot empty. The analyzer
//! fills the slots in place (they are `Cell`s) so the tree itself never has to
//! be rebuilt, and the interpreter only reads them.
//!
//! Definitions are reference counted: a definition value outlives the unit
//! that declared it (the REPL keeps calling it after the unit's tree is gone).

use crate::{Name, Span};
use rust_decimal::Decimal;
use std::cell::Cell;
use std::rc::Rc;

/// Where an identifier's value lives once the analyzer has run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Location {
    #[default]
    Unresolved,
    /// Absolute index into the global frame.
    Global(usize),
    /// Index into the current activation frame.
    Local(usize),
    /// Looked up in the dynamic scope at run time.
    Dynamic,
}

impl Location {
    pub fn is_resolved(self) -> bool {
        !matches!(self, Location::Unresolved)
    }
}

/// Where a call site finds its target once the analyzer has run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CallTarget {
    #[default]
    Unresolved,
    Global(usize),
    Local(usize),
    /// The callee is a parameter; the slot holds an open name whose
    /// signature is looked up at call time.
    Parametric(usize),
    Dynamic,
}

impl CallTarget {
    pub fn is_resolved(self) -> bool {
        !matches!(self, CallTarget::Unresolved)
    }
}

/// Index of a scope in the analyzer's per-unit scope table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    pub const fn new(index: u32) -> Self {
        ScopeId(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A name occurrence with its resolution slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: Name,
    pub span: Span,
    location: Cell<Location>,
}

impl Identifier {
    pub fn new(name: Name, span: Span) -> Self {
        Identifier {
            name,
            span,
            location: Cell::new(Location::Unresolved),
        }
    }

    #[inline]
    pub fn location(&self) -> Location {
        self.location.get()
    }

    pub fn resolve(&self, location: Location) {
        self.location.set(location);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Nil,
    Number(Decimal),
    /// `_`: the previous top-level result of the session.
    Wildcard,
    Identifier(Identifier),
    /// `$name` in expression position: the open name itself, never looked up.
    Shielded(Name),
    Apply(Apply),
    /// `object.member`
    Access {
        object: Box<Expr>,
        member: Name,
    },
    /// `object.[key]`
    Index {
        object: Box<Expr>,
        key: Box<Expr>,
    },
    /// `head :: tail`, right nested.
    Sequence {
        head: Box<Expr>,
        tail: Box<Expr>,
    },
    Tuple(Vec<Expr>),
    Conditional {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Option<Box<Expr>>,
    },
    Close {
        body: Box<Expr>,
        bindings: Vec<Binding>,
    },
    Var {
        name: Identifier,
        init: Option<Box<Expr>>,
    },
    Set {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Definition(Rc<Definition>),
    Module(Box<Module>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Apply {
    pub callee: Identifier,
    pub args: Vec<Expr>,
    target: Cell<CallTarget>,
}

impl Apply {
    pub fn new(callee: Identifier, args: Vec<Expr>) -> Self {
        Apply {
            callee,
            args,
            target: Cell::new(CallTarget::Unresolved),
        }
    }

    #[inline]
    pub fn target(&self) -> CallTarget {
        self.target.get()
    }

    pub fn resolve(&self, target: CallTarget) {
        self.target.set(target);
    }
}

/// One `name = value` pair of a `close ... with (...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: Identifier,
    /// `$name`: bind the literal name instead of evaluating it.
    pub shielded: bool,
    pub value: Expr,
}

/// `def name(params) => body`
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    /// The definition's own declaration, resolved like an identifier.
    pub name: Identifier,
    pub params: Vec<Identifier>,
    pub body: Option<Box<Expr>>,
    pub span: Span,
    scope: Cell<Option<ScopeId>>,
}

impl Definition {
    pub fn new(name: Identifier, params: Vec<Identifier>, body: Option<Expr>, span: Span) -> Self {
        Definition {
            name,
            params,
            body: body.map(Box::new),
            span,
            scope: Cell::new(None),
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn scope(&self) -> Option<ScopeId> {
        self.scope.get()
    }

    pub fn set_scope(&self, scope: ScopeId) {
        self.scope.set(Some(scope));
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ModuleKind {
    Module,
    Test,
}

/// `module name { ... }` or `test name { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub kind: ModuleKind,
    pub name: Identifier,
    pub instructions: Vec<Expr>,
    pub span: Span,
    scope: Cell<Option<ScopeId>>,
}

impl Module {
    pub fn new(kind: ModuleKind, name: Identifier, instructions: Vec<Expr>, span: Span) -> Self {
        Module {
            kind,
            name,
            instructions,
            span,
            scope: Cell::new(None),
        }
    }

    pub fn scope(&self) -> Option<ScopeId> {
        self.scope.get()
    }

    pub fn set_scope(&self, scope: ScopeId) {
        self.scope.set(Some(scope));
    }
}

/// One top-level unit: a file, a REPL line or a startup script.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub instructions: Vec<Expr>,
    scope: Cell<Option<ScopeId>>,
    analyzed: Cell<bool>,
}

impl Program {
    pub fn new(instructions: Vec<Expr>) -> Self {
        Program {
            instructions,
            scope: Cell::new(None),
            analyzed: Cell::new(false),
        }
    }

    pub fn scope(&self) -> Option<ScopeId> {
        self.scope.get()
    }

    pub fn set_scope(&self, scope: ScopeId) {
        self.scope.set(Some(scope));
    }

    pub fn is_analyzed(&self) -> bool {
        self.analyzed.get()
    }

    pub fn mark_analyzed(&self) {
        self.analyzed.set(true);
    }
}

#[cfg(test)]
mod tests;
