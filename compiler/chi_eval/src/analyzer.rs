//! Semantic analysis: turns names into frame offsets.
//!
//! Four passes run over each unit, in order:
//!
//! 1. **Scopes.** One `Singleton` scope for the program and for every module
//!    or test block, one `Instance` scope per definition. Every definition
//!    and module is declared in its parent and as slot 0 of its own scope;
//!    parameters follow. Definitions are declared under `name(arity)`.
//! 2. **Placement.** Each non-empty `Singleton` scope gets its offset in the
//!    global frame, and its declarations are queued as the global extension.
//!    Definition, module and `var` names are then bound to the exact slot
//!    their own declaration took.
//! 3. **Resolution.** Every identifier and call site gets a [`Location`] or
//!    [`CallTarget`] written into its slot.
//! 4. **Commit.** The extension joins the session's global scope and frame.
//!
//! A failing pass stops the unit before the commit, so nothing it declared is
//! visible to later units.

use crate::errors::{AnalysisError, InternalFault};
use crate::frame::MemoryFrame;
use crate::scope::{Declaration, DeclarationKind, Duplicate, LexicalScope, LookupMode, ScopeKind};
use crate::session::Session;
use crate::value::{Callable, ModuleValue};
use chi_ir::visitor::{walk_apply, walk_expr, walk_program, Visitor};
use chi_ir::{
    Apply, CallTarget, Definition, Expr, ExprKind, Identifier, Location, Module, Name, Program,
    ScopeId, SymbolTable,
};
use std::rc::Rc;

pub struct Analyzer<'s> {
    session: &'s mut Session,
}

impl<'s> Analyzer<'s> {
    pub fn new(session: &'s mut Session) -> Self {
        Analyzer { session }
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub fn analyze(self, program: &Program) -> Result<(), AnalysisError> {
        let symbols = self.session.symbols().clone();
        let mode = self.session.mode();
        let global = Rc::clone(self.session.global_scope());
        let program_alias = self.session.names().program;

        let mut builder = ScopeBuilder::new(&symbols, mode, Rc::clone(&global), program_alias);
        builder.visit_program(program);
        let ScopeBuilder {
            scopes,
            callables,
            declared,
            error,
            ..
        } = builder;
        if let Some(error) = error {
            return Err(error);
        }
        tracing::trace!(scopes = scopes.len(), definitions = callables.len(), "built scopes");

        let extension = place_singletons(program, &scopes, global.len())?;
        resolve_declared(&symbols, &declared)?;

        let mut resolver = Resolver::new(&symbols, mode, &scopes, global);
        resolver.visit_program(program);
        if let Some(error) = resolver.error {
            return Err(error);
        }
        debug_assert_eq!(count_unresolved(program), 0);

        tracing::debug!(declarations = extension.len(), "committing unit");
        self.session.extend(extension);
        program.mark_analyzed();
        // The global frame now owns every callable of the unit.
        drop(callables);
        Ok(())
    }
}

fn scope_of(scopes: &[Rc<LexicalScope>], id: Option<ScopeId>) -> Result<Rc<LexicalScope>, InternalFault> {
    id.and_then(|id| scopes.get(id.index()))
        .cloned()
        .ok_or(InternalFault::UnsupportedNode("a block without a scope"))
}

fn duplicate_error(symbols: &SymbolTable, duplicate: Duplicate) -> AnalysisError {
    AnalysisError::DuplicateDeclaration {
        name: symbols.text(duplicate.name).to_string(),
        scope: symbols.text(duplicate.scope).to_string(),
    }
}

// ===== Pass 1: scopes =====

struct ScopeBuilder<'a, 'ast> {
    symbols: &'a SymbolTable,
    mode: LookupMode,
    program_alias: Name,
    /// Indexed by `ScopeId`.
    scopes: Vec<Rc<LexicalScope>>,
    stack: Vec<Rc<LexicalScope>>,
    /// Strong handles until the commit hands them to the global frame.
    callables: Vec<Rc<Callable>>,
    /// Declaring identifiers with the slot their declaration took.
    declared: Vec<(&'ast Identifier, Rc<LexicalScope>, usize)>,
    error: Option<AnalysisError>,
}

impl<'a, 'ast> ScopeBuilder<'a, 'ast> {
    fn new(
        symbols: &'a SymbolTable,
        mode: LookupMode,
        global: Rc<LexicalScope>,
        program_alias: Name,
    ) -> Self {
        ScopeBuilder {
            symbols,
            mode,
            program_alias,
            scopes: Vec::new(),
            stack: vec![global],
            callables: Vec::new(),
            declared: Vec::new(),
            error: None,
        }
    }

    fn current(&self) -> Option<Rc<LexicalScope>> {
        self.stack.last().cloned()
    }

    fn register(&mut self, scope: &Rc<LexicalScope>) -> ScopeId {
        let id = ScopeId::new(u32::try_from(self.scopes.len()).unwrap_or(u32::MAX));
        self.scopes.push(Rc::clone(scope));
        id
    }

    /// `<program>/geometry`, `<program>/geometry/area(2)`
    fn child_alias(&self, parent: &LexicalScope, name: Name) -> Name {
        let path = format!(
            "{}/{}",
            self.symbols.text(parent.alias()),
            self.symbols.text(name)
        );
        self.symbols.intern(&path)
    }

    fn append(&mut self, scope: &LexicalScope, declaration: Declaration) -> Option<usize> {
        if self.error.is_some() {
            return None;
        }
        match scope.append(declaration, self.mode) {
            Ok(index) => Some(index),
            Err(duplicate) => {
                self.error = Some(duplicate_error(self.symbols, duplicate));
                None
            }
        }
    }

    /// Append `declaration` to `scope` and bind `identifier` to that slot.
    fn declare(
        &mut self,
        scope: &Rc<LexicalScope>,
        identifier: &'ast Identifier,
        declaration: Declaration,
    ) {
        if let Some(index) = self.append(scope, declaration) {
            self.declared.push((identifier, Rc::clone(scope), index));
        }
    }

    fn declare_definition(&mut self, definition: &'ast Rc<Definition>) {
        let Some(parent) = self.current() else {
            return;
        };
        let signature = self.symbols.signature(definition.name.name, definition.arity());
        let alias = self.child_alias(&parent, signature);
        let scope = LexicalScope::new(alias, ScopeKind::Instance, Some(Rc::clone(&parent)));
        definition.set_scope(self.register(&scope));

        let callable = Callable::new(Rc::clone(definition), signature, Rc::clone(&scope));
        let declaration = Declaration::new(signature, DeclarationKind::Def(Rc::downgrade(&callable)));
        self.declare(&parent, &definition.name, declaration.clone());
        self.append(&scope, declaration);
        for param in &definition.params {
            self.append(&scope, Declaration::new(param.name, DeclarationKind::Param));
        }

        self.stack.push(Rc::clone(&scope));
        if let Some(body) = &definition.body {
            self.visit_expr(body);
        }
        self.stack.pop();

        callable.set_prototype(MemoryFrame::prototype(scope));
        self.callables.push(callable);
    }

    fn declare_module(&mut self, module: &'ast Module) {
        let Some(parent) = self.current() else {
            return;
        };
        let name = module.name.name;
        let alias = self.child_alias(&parent, name);
        let scope = LexicalScope::new(alias, ScopeKind::Singleton, Some(Rc::clone(&parent)));
        module.set_scope(self.register(&scope));

        let value = Rc::new(ModuleValue { name, path: alias });
        let declaration = Declaration::new(name, DeclarationKind::Module(value));
        self.declare(&parent, &module.name, declaration.clone());
        self.append(&scope, declaration);

        self.stack.push(scope);
        for instruction in &module.instructions {
            self.visit_expr(instruction);
        }
        self.stack.pop();
    }
}

impl<'ast> Visitor<'ast> for ScopeBuilder<'_, 'ast> {
    fn visit_program(&mut self, program: &'ast Program) {
        let global = self.current();
        let scope = LexicalScope::new(self.program_alias, ScopeKind::Singleton, global);
        program.set_scope(self.register(&scope));
        self.stack.push(scope);
        walk_program(self, program);
        self.stack.pop();
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        if self.error.is_some() {
            return;
        }
        match &expr.kind {
            ExprKind::Definition(definition) => self.declare_definition(definition),
            ExprKind::Module(module) => self.declare_module(module),
            ExprKind::Var { name, init } => {
                if let Some(scope) = self.current() {
                    let declaration = Declaration::new(name.name, DeclarationKind::Var);
                    self.declare(&scope, name, declaration);
                }
                if let Some(init) = init {
                    self.visit_expr(init);
                }
            }
            _ => walk_expr(self, expr),
        }
    }
}

// ===== Pass 2: placement =====

/// Give every non-empty `Singleton` scope of the unit its global offset and
/// collect the declarations to append to the global scope.
fn place_singletons(
    program: &Program,
    scopes: &[Rc<LexicalScope>],
    global_len: usize,
) -> Result<Vec<Declaration>, InternalFault> {
    let mut extension = Vec::new();
    let program_scope = scope_of(scopes, program.scope())?;
    place(&program_scope, global_len, &mut extension);
    place_blocks(&program.instructions, scopes, global_len, &mut extension)?;
    Ok(extension)
}

fn place_blocks(
    instructions: &[Expr],
    scopes: &[Rc<LexicalScope>],
    global_len: usize,
    extension: &mut Vec<Declaration>,
) -> Result<(), InternalFault> {
    for instruction in instructions {
        if let ExprKind::Module(module) = &instruction.kind {
            let scope = scope_of(scopes, module.scope())?;
            place(&scope, global_len, extension);
            place_blocks(&module.instructions, scopes, global_len, extension)?;
        }
    }
    Ok(())
}

fn place(scope: &LexicalScope, global_len: usize, extension: &mut Vec<Declaration>) {
    if scope.is_empty() {
        return;
    }
    scope.set_global_frame_start(global_len + extension.len());
    extension.extend(scope.declarations());
}

/// Bind every declaring identifier to the slot its own declaration took, so
/// a redeclaration in permissive mode never redirects an earlier node.
fn resolve_declared(
    symbols: &SymbolTable,
    declared: &[(&Identifier, Rc<LexicalScope>, usize)],
) -> Result<(), InternalFault> {
    for (identifier, scope, index) in declared {
        let location = match (scope.kind(), scope.global_frame_start()) {
            (ScopeKind::Instance, _) => Location::Local(*index),
            (ScopeKind::Singleton, Some(start)) => Location::Global(start + index),
            (ScopeKind::Singleton, None) => {
                let alias = symbols.text(scope.alias()).to_string();
                return Err(InternalFault::UnplacedScope(alias));
            }
        };
        identifier.resolve(location);
    }
    Ok(())
}

// ===== Pass 3: resolution =====

struct Resolver<'a> {
    symbols: &'a SymbolTable,
    mode: LookupMode,
    scopes: &'a [Rc<LexicalScope>],
    stack: Vec<Rc<LexicalScope>>,
    error: Option<AnalysisError>,
}

impl<'a> Resolver<'a> {
    fn new(
        symbols: &'a SymbolTable,
        mode: LookupMode,
        scopes: &'a [Rc<LexicalScope>],
        global: Rc<LexicalScope>,
    ) -> Self {
        Resolver {
            symbols,
            mode,
            scopes,
            stack: vec![global],
            error: None,
        }
    }

    fn fail(&mut self, fault: InternalFault) {
        if self.error.is_none() {
            self.error = Some(fault.into());
        }
    }

    fn enter(&mut self, id: Option<ScopeId>) -> bool {
        match scope_of(self.scopes, id) {
            Ok(scope) => {
                self.stack.push(scope);
                true
            }
            Err(fault) => {
                self.fail(fault);
                false
            }
        }
    }

    /// Find `name` from the current scope; `None` means dynamic.
    fn lookup(&mut self, name: Name) -> Option<(Declaration, Location)> {
        let current = self.stack.last()?;
        let found = current.recursive_lookup(name, self.mode)?;
        let location = match found.scope.kind() {
            ScopeKind::Instance => Location::Local(found.index),
            ScopeKind::Singleton => {
                if let Some(start) = found.scope.global_frame_start() {
                    Location::Global(start + found.index)
                } else {
                    let alias = self.symbols.text(found.scope.alias()).to_string();
                    self.fail(InternalFault::UnplacedScope(alias));
                    Location::Dynamic
                }
            }
        };
        Some((found.declaration, location))
    }

    fn location_of(&mut self, name: Name) -> Location {
        self.lookup(name).map_or(Location::Dynamic, |(_, location)| location)
    }

    fn call_target(&mut self, name: Name, arity: usize) -> CallTarget {
        let exact = self.symbols.signature(name, arity);
        let found = match self.lookup(exact) {
            Some(found) => Some(found),
            None => {
                let variadic = self.symbols.variadic_signature(name);
                self.lookup(variadic)
            }
        };
        match found.map(|(_, location)| location) {
            Some(Location::Local(index)) => CallTarget::Local(index),
            Some(Location::Global(index)) => CallTarget::Global(index),
            _ => CallTarget::Dynamic,
        }
    }
}

impl<'ast> Visitor<'ast> for Resolver<'_> {
    fn visit_program(&mut self, program: &'ast Program) {
        if self.enter(program.scope()) {
            walk_program(self, program);
            self.stack.pop();
        }
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        match &expr.kind {
            // The declared name is already bound to its own slot.
            ExprKind::Var { init, .. } => {
                if let Some(init) = init {
                    self.visit_expr(init);
                }
            }
            _ => walk_expr(self, expr),
        }
    }

    fn visit_identifier(&mut self, identifier: &'ast Identifier) {
        let location = self.location_of(identifier.name);
        identifier.resolve(location);
    }

    fn visit_apply(&mut self, apply: &'ast Apply) {
        let callee = self.lookup(apply.callee.name);
        apply
            .callee
            .resolve(callee.as_ref().map_or(Location::Dynamic, |(_, location)| *location));

        let target = match callee {
            Some((declaration, Location::Local(slot))) if declaration.is_param() => {
                CallTarget::Parametric(slot)
            }
            _ => self.call_target(apply.callee.name, apply.args.len()),
        };
        apply.resolve(target);
        walk_apply(self, apply);
    }

    fn visit_definition(&mut self, definition: &'ast Definition) {
        if self.enter(definition.scope()) {
            if let Some(body) = &definition.body {
                self.visit_expr(body);
            }
            self.stack.pop();
        }
    }

    fn visit_module(&mut self, module: &'ast Module) {
        if self.enter(module.scope()) {
            for instruction in &module.instructions {
                self.visit_expr(instruction);
            }
            self.stack.pop();
        }
    }
}

// ===== Totality =====

#[derive(Default)]
struct UnresolvedCounter {
    count: usize,
}

impl<'ast> Visitor<'ast> for UnresolvedCounter {
    fn visit_identifier(&mut self, identifier: &'ast Identifier) {
        if !identifier.location().is_resolved() {
            self.count += 1;
        }
    }

    fn visit_apply(&mut self, apply: &'ast Apply) {
        self.visit_identifier(&apply.callee);
        if !apply.target().is_resolved() {
            self.count += 1;
        }
        walk_apply(self, apply);
    }
}

/// Identifiers and call sites of `program` still waiting for a resolution.
pub fn count_unresolved(program: &Program) -> usize {
    let mut counter = UnresolvedCounter::default();
    counter.visit_program(program);
    counter.count
}
