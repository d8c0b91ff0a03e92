//! Tree-walking interpreter over analyzed units.
//!
//! Reads go straight to the slots the analyzer computed: `Global` indices
//! into the session's global frame, `Local` indices into the current
//! activation, and `Dynamic` names into the stack of `close ... with`
//! bindings (an unbound dynamic name reads as itself, an open name).
//!
//! Every result passes through [`Value::normalize`], so sequences never nest
//! and never hold `Nil`.

mod scope_guard;

pub use scope_guard::{ActivationGuard, BindingsGuard};

use crate::errors::{EvalError, EvalResult, InternalFault, RuntimeError};
use crate::frame::MemoryFrame;
use crate::scope::ScopeKind;
use crate::session::Session;
use crate::value::{Callable, StateRef, Value};
use chi_ir::{
    Apply, Binding, CallTarget, Expr, ExprKind, Identifier, Location, Module, ModuleKind, Name,
    Program, SymbolTable, WellKnownNames,
};
use chi_stack::ensure_sufficient_stack;
use smallvec::SmallVec;
use std::rc::Rc;

/// How a `test` block ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TestOutcome {
    Passed,
    Failed,
    /// A runtime error stopped the block.
    Errored(RuntimeError),
}

impl TestOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, TestOutcome::Passed)
    }

    /// `OK` or `KO`, as an open name.
    pub fn into_value(self, names: &WellKnownNames) -> Value {
        Value::Open(if self.is_passed() { names.ok } else { names.ko })
    }
}

/// Test rule: every result is `Nil`, a definition or `OK`, and at least one
/// is `OK`.
pub fn test_passed(results: &[Value], names: &WellKnownNames) -> bool {
    let is_ok = |value: &Value| matches!(value, Value::Open(name) if *name == names.ok);
    results.iter().any(is_ok)
        && results
            .iter()
            .all(|value| matches!(value, Value::Nil | Value::Definition(_)) || is_ok(value))
}

pub struct Interpreter<'session> {
    session: &'session mut Session,
    local_frames: Vec<MemoryFrame>,
    /// `close ... with` bindings; searched from the top.
    dynamic_scope: Vec<(Name, Value)>,
    test_depth: usize,
}

impl<'session> Interpreter<'session> {
    pub fn new(session: &'session mut Session) -> Self {
        Interpreter {
            session,
            local_frames: Vec::new(),
            dynamic_scope: Vec::new(),
            test_depth: 0,
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        self.session.symbols()
    }

    /// Number of live call activations.
    pub fn local_depth(&self) -> usize {
        self.local_frames.len()
    }

    /// Number of live dynamic bindings.
    pub fn dynamic_depth(&self) -> usize {
        self.dynamic_scope.len()
    }

    pub fn print_line(&self, line: &str) {
        self.session.print_handler().println(line);
    }

    fn text(&self, name: Name) -> String {
        self.session.symbols().text(name).to_string()
    }

    /// Evaluate every instruction of an analyzed unit.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run(&mut self, program: &Program) -> EvalResult {
        let mut results = Vec::with_capacity(program.instructions.len());
        for instruction in &program.instructions {
            results.push(self.eval(instruction)?);
        }
        Ok(Value::Program(results).normalize())
    }

    /// Evaluate one expression and normalize the result.
    pub fn eval(&mut self, expr: &Expr) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_inner(expr)).map(Value::normalize)
    }

    fn eval_inner(&mut self, expr: &Expr) -> EvalResult {
        match &expr.kind {
            ExprKind::Nil => Ok(Value::Nil),
            ExprKind::Number(number) => Ok(Value::Number(*number)),
            ExprKind::Wildcard => Ok(self.session.last_result().clone()),
            ExprKind::Identifier(identifier) => self.read_identifier(identifier),
            ExprKind::Shielded(name) => Ok(Value::Open(*name)),
            ExprKind::Apply(apply) => self.eval_apply(apply),
            ExprKind::Access { object, member } => {
                let state = self.eval_state(object)?;
                Ok(state.get(*member).unwrap_or_default())
            }
            ExprKind::Index { object, key } => {
                let state = self.eval_state(object)?;
                let key = self.eval_key(key)?;
                Ok(state.get(key).unwrap_or_default())
            }
            ExprKind::Sequence { head, tail } => self.eval_sequence(head, tail),
            ExprKind::Tuple(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval(item)?);
                }
                Ok(Value::Tuple(values))
            }
            ExprKind::Conditional {
                condition,
                then_branch,
                else_branch,
            } => match self.eval(condition)? {
                Value::Number(n) if !n.is_zero() => self.eval(then_branch),
                Value::Number(_) => match else_branch {
                    Some(else_branch) => self.eval(else_branch),
                    None => Ok(Value::Nil),
                },
                other => Err(RuntimeError::type_mismatch("number", &other).into()),
            },
            ExprKind::Close { body, bindings } => self.eval_close(body, bindings),
            ExprKind::Var { name, init } => {
                let value = match init {
                    Some(init) => self.eval(init)?,
                    None => Value::new_state(),
                };
                self.write_identifier(name, value)?;
                Ok(Value::Nil)
            }
            ExprKind::Set { target, value } => self.eval_set(target, value),
            ExprKind::Definition(definition) => self.read_identifier(&definition.name),
            ExprKind::Module(module) => match module.kind {
                ModuleKind::Module => self.eval_module(module),
                ModuleKind::Test => self.eval_test(module),
            },
        }
    }

    // ===== Frames =====

    fn local_frame(&self) -> Result<&MemoryFrame, InternalFault> {
        self.local_frames.last().ok_or(InternalFault::NoActiveFrame)
    }

    fn local_frame_mut(&mut self) -> Result<&mut MemoryFrame, InternalFault> {
        self.local_frames
            .last_mut()
            .ok_or(InternalFault::NoActiveFrame)
    }

    fn lookup_dynamic(&self, name: Name) -> Option<Value> {
        self.dynamic_scope
            .iter()
            .rev()
            .find(|(bound, _)| *bound == name)
            .map(|(_, value)| value.clone())
    }

    fn read_identifier(&self, identifier: &Identifier) -> EvalResult {
        match identifier.location() {
            Location::Global(index) => Ok(self.session.global_frame().read(index)?),
            Location::Local(index) => Ok(self.local_frame()?.read(index)?),
            Location::Dynamic => Ok(self
                .lookup_dynamic(identifier.name)
                .unwrap_or(Value::Open(identifier.name))),
            Location::Unresolved => {
                Err(InternalFault::UnresolvedIdentifier(self.text(identifier.name)).into())
            }
        }
    }

    fn write_identifier(&mut self, identifier: &Identifier, value: Value) -> EvalResult<()> {
        match identifier.location() {
            Location::Global(index) => self.session.global_frame_mut().write(index, value)?,
            Location::Local(index) => self.local_frame_mut()?.write(index, value)?,
            Location::Dynamic => {
                return Err(RuntimeError::TargetNotFound(self.text(identifier.name)).into())
            }
            Location::Unresolved => {
                return Err(InternalFault::UnresolvedIdentifier(self.text(identifier.name)).into())
            }
        }
        Ok(())
    }

    // ===== Calls =====

    fn eval_apply(&mut self, apply: &Apply) -> EvalResult {
        let target = match apply.target() {
            CallTarget::Global(index) => self.session.global_frame().read(index)?,
            CallTarget::Local(index) => self.local_frame()?.read(index)?,
            CallTarget::Parametric(slot) => self.parametric_target(apply, slot)?,
            CallTarget::Dynamic => {
                let signature = self
                    .symbols()
                    .signature(apply.callee.name, apply.args.len());
                return Err(RuntimeError::UnresolvedCallTarget(self.text(signature)).into());
            }
            CallTarget::Unresolved => {
                return Err(InternalFault::UnresolvedIdentifier(self.text(apply.callee.name)).into())
            }
        };

        match target {
            Value::Definition(callable) => self.call(&callable, &apply.args),
            Value::Primitive(primitive) => primitive.apply(self, &apply.args),
            _ => Err(RuntimeError::NotCallable(self.text(apply.callee.name)).into()),
        }
    }

    /// The parameter in `slot` names the callee; find `name(arity)` from
    /// the current activation's scope.
    fn parametric_target(&self, apply: &Apply, slot: usize) -> EvalResult {
        let frame = self.local_frame()?;
        let Value::Open(name) = frame.read(slot)? else {
            return Err(RuntimeError::NotCallable(self.text(apply.callee.name)).into());
        };

        let signature = self.symbols().signature(name, apply.args.len());
        let Some(found) = frame.scope().recursive_lookup(signature, self.session.mode()) else {
            return Err(RuntimeError::UnresolvedCallTarget(self.text(signature)).into());
        };
        if !found.declaration.is_callable() {
            return Err(RuntimeError::NotCallable(self.text(signature)).into());
        }

        match (found.scope.kind(), found.scope.global_frame_start()) {
            (ScopeKind::Instance, _) => Ok(frame.read(found.index)?),
            (ScopeKind::Singleton, Some(start)) => {
                Ok(self.session.global_frame().read(start + found.index)?)
            }
            (ScopeKind::Singleton, None) => {
                Err(InternalFault::UnplacedScope(self.text(found.scope.alias())).into())
            }
        }
    }

    fn call(&mut self, callable: &Rc<Callable>, args: &[Expr]) -> EvalResult {
        let mut frame = callable.instantiate()?;
        // Arguments are evaluated in the caller's activation.
        let mut values: SmallVec<[Value; 4]> = SmallVec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval(arg)?);
        }
        frame.write(0, Value::Definition(Rc::clone(callable)))?;
        for (i, value) in values.into_iter().enumerate() {
            frame.write(i + 1, value)?;
        }

        let Some(body) = &callable.node.body else {
            return Ok(Value::Nil);
        };
        tracing::trace!(signature = %self.text(callable.signature), "call");
        let mut activation = self.activate(frame);
        activation.eval(body)
    }

    // ===== Dynamic scope =====

    fn eval_close(&mut self, body: &Expr, bindings: &[Binding]) -> EvalResult {
        let mut pairs: SmallVec<[(Name, Value); 4]> = SmallVec::with_capacity(bindings.len());
        for binding in bindings {
            let name = if binding.shielded {
                binding.name.name
            } else {
                match self.read_identifier(&binding.name)? {
                    Value::Open(name) => name,
                    other => return Err(RuntimeError::type_mismatch("open name", &other).into()),
                }
            };
            let value = self.eval(&binding.value)?;
            pairs.push((name, value));
        }

        let mut bound = self.bind(pairs);
        bound.eval(body)
    }

    // ===== Sequences =====

    fn eval_sequence(&mut self, head: &Expr, tail: &Expr) -> EvalResult {
        let mut items = vec![self.eval(head)?];
        let mut rest = tail;
        // Right-nested sequences are walked iteratively.
        while let ExprKind::Sequence { head, tail } = &rest.kind {
            items.push(self.eval(head)?);
            rest = tail;
        }
        items.push(self.eval(rest)?);
        Ok(Value::Sequence(items))
    }

    // ===== States =====

    fn describe(&self, expr: &Expr, value: &Value) -> String {
        match &expr.kind {
            ExprKind::Identifier(identifier) => format!("`{}`", self.text(identifier.name)),
            _ => format!("a {}", value.type_name()),
        }
    }

    fn eval_state(&mut self, object: &Expr) -> EvalResult<StateRef> {
        match self.eval(object)? {
            Value::State(state) => Ok(state),
            other => Err(RuntimeError::NotAState(self.describe(object, &other)).into()),
        }
    }

    /// Index keys must be open names.
    fn eval_key(&mut self, key: &Expr) -> EvalResult<Name> {
        match self.eval(key)? {
            Value::Open(name) => Ok(name),
            other => Err(RuntimeError::type_mismatch("open name", &other).into()),
        }
    }

    fn eval_set(&mut self, target: &Expr, value: &Expr) -> EvalResult {
        let value = self.eval(value)?;
        match &target.kind {
            ExprKind::Identifier(identifier) => self.write_identifier(identifier, value)?,
            ExprKind::Access { object, member } => {
                self.target_state(object)?.insert(*member, value);
            }
            ExprKind::Index { object, key } => {
                let state = self.target_state(object)?;
                let key = self.eval_key(key)?;
                state.insert(key, value);
            }
            _ => return Err(InternalFault::UnsupportedNode("this assignment target").into()),
        }
        Ok(Value::Nil)
    }

    /// The state a nested assignment writes into. Missing intermediate keys
    /// are filled with fresh states.
    fn target_state(&mut self, path: &Expr) -> EvalResult<StateRef> {
        match &path.kind {
            ExprKind::Identifier(identifier) => {
                if identifier.location() == Location::Dynamic {
                    return Err(RuntimeError::TargetNotFound(self.text(identifier.name)).into());
                }
                match self.read_identifier(identifier)? {
                    Value::State(state) => Ok(state),
                    other => Err(RuntimeError::NotAState(self.describe(path, &other)).into()),
                }
            }
            ExprKind::Access { object, member } => {
                let parent = self.target_state(object)?;
                self.child_state(&parent, *member)
            }
            ExprKind::Index { object, key } => {
                let parent = self.target_state(object)?;
                let key = self.eval_key(key)?;
                self.child_state(&parent, key)
            }
            _ => Err(InternalFault::UnsupportedNode("this assignment target").into()),
        }
    }

    fn child_state(&self, parent: &StateRef, key: Name) -> EvalResult<StateRef> {
        match parent.get(key) {
            None => {
                let child = StateRef::new();
                parent.insert(key, Value::State(child.clone()));
                Ok(child)
            }
            Some(Value::State(child)) => Ok(child),
            Some(_) => Err(RuntimeError::NotAState(format!("`{}`", self.text(key))).into()),
        }
    }

    // ===== Blocks =====

    /// Run a module's instructions for their effects; the block evaluates to
    /// the module itself.
    fn eval_module(&mut self, module: &Module) -> EvalResult {
        for instruction in &module.instructions {
            self.eval(instruction)?;
        }
        self.read_identifier(&module.name)
    }

    fn eval_test(&mut self, test: &Module) -> EvalResult {
        self.test_depth += 1;
        let depth = self.test_depth;
        let outcome = self.run_test(test);
        self.test_depth -= 1;
        let outcome = outcome?;

        let indent = "  ".repeat(depth);
        let name = self.text(test.name.name);
        let line = match &outcome {
            TestOutcome::Passed => format!("{indent}{name} OK"),
            TestOutcome::Failed => format!("{indent}{name} KO"),
            TestOutcome::Errored(error) => format!("{indent}{name} KO :: {error}"),
        };
        self.print_line(&line);
        tracing::debug!(test = %name, ?outcome, "test block finished");

        Ok(outcome.into_value(self.session.names()))
    }

    /// Runtime errors become `Errored`; internal faults propagate.
    fn run_test(&mut self, test: &Module) -> EvalResult<TestOutcome> {
        let mut results = Vec::with_capacity(test.instructions.len());
        for instruction in &test.instructions {
            match self.eval(instruction) {
                Ok(value) => results.push(value),
                Err(EvalError::Runtime(error)) => {
                    return Ok(TestOutcome::Errored(error))
                }
                Err(fault) => return Err(fault),
            }
        }
        Ok(if test_passed(&results, self.session.names()) {
            TestOutcome::Passed
        } else {
            TestOutcome::Failed
        })
    }
}
