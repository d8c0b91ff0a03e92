//! RAII guards for the interpreter's two stacks.
//!
//! A guard owns the `&mut Interpreter` while a call activation or a set of
//! dynamic bindings is live and pops them on drop, so an error propagated
//! with `?` (or a panic) leaves both stacks as it found them. The guards
//! deref to the interpreter, so evaluation continues through them.

use std::ops::{Deref, DerefMut};

use super::Interpreter;
use crate::frame::MemoryFrame;
use crate::value::Value;
use chi_ir::Name;
use smallvec::SmallVec;

/// Pops the local frame pushed by [`Interpreter::activate`].
pub struct ActivationGuard<'guard, 'session> {
    interpreter: &'guard mut Interpreter<'session>,
}

impl Drop for ActivationGuard<'_, '_> {
    fn drop(&mut self) {
        self.interpreter.local_frames.pop();
    }
}

impl<'session> Deref for ActivationGuard<'_, 'session> {
    type Target = Interpreter<'session>;

    fn deref(&self) -> &Self::Target {
        self.interpreter
    }
}

impl DerefMut for ActivationGuard<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interpreter
    }
}

/// Pops exactly the bindings pushed by [`Interpreter::bind`].
pub struct BindingsGuard<'guard, 'session> {
    interpreter: &'guard mut Interpreter<'session>,
    count: usize,
}

impl Drop for BindingsGuard<'_, '_> {
    fn drop(&mut self) {
        let dynamic = &mut self.interpreter.dynamic_scope;
        dynamic.truncate(dynamic.len().saturating_sub(self.count));
    }
}

impl<'session> Deref for BindingsGuard<'_, 'session> {
    type Target = Interpreter<'session>;

    fn deref(&self) -> &Self::Target {
        self.interpreter
    }
}

impl DerefMut for BindingsGuard<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interpreter
    }
}

impl<'session> Interpreter<'session> {
    /// Push `frame` as the current activation until the guard drops.
    pub fn activate(&mut self, frame: MemoryFrame) -> ActivationGuard<'_, 'session> {
        self.local_frames.push(frame);
        ActivationGuard { interpreter: self }
    }

    /// Push dynamic bindings, innermost last, until the guard drops.
    pub fn bind(
        &mut self,
        bindings: SmallVec<[(Name, Value); 4]>,
    ) -> BindingsGuard<'_, 'session> {
        let count = bindings.len();
        self.dynamic_scope.extend(bindings);
        BindingsGuard {
            interpreter: self,
            count,
        }
    }
}
