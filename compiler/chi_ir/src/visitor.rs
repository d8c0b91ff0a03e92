//! Read-only traversal of the syntax tree.
//!
//! Default `visit_*` methods call the matching `walk_*` function, which
//! recurses into children. Override a `visit_*` method to act on a node and
//! call `walk_*` from it to keep descending.

use crate::ast::{Apply, Definition, Expr, ExprKind, Identifier, Module, Program};

pub trait Visitor<'ast> {
    fn visit_program(&mut self, program: &'ast Program) {
        walk_program(self, program);
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        walk_expr(self, expr);
    }

    /// Called for every identifier that carries a resolution slot.
    fn visit_identifier(&mut self, identifier: &'ast Identifier) {
        let _ = identifier;
    }

    fn visit_apply(&mut self, apply: &'ast Apply) {
        walk_apply(self, apply);
    }

    fn visit_definition(&mut self, definition: &'ast Definition) {
        walk_definition(self, definition);
    }

    fn visit_module(&mut self, module: &'ast Module) {
        walk_module(self, module);
    }
}

pub fn walk_program<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, program: &'ast Program) {
    for instruction in &program.instructions {
        visitor.visit_expr(instruction);
    }
}

pub fn walk_apply<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, apply: &'ast Apply) {
    for arg in &apply.args {
        visitor.visit_expr(arg);
    }
}

pub fn walk_definition<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    definition: &'ast Definition,
) {
    visitor.visit_identifier(&definition.name);
    if let Some(body) = &definition.body {
        visitor.visit_expr(body);
    }
}

pub fn walk_module<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, module: &'ast Module) {
    visitor.visit_identifier(&module.name);
    for instruction in &module.instructions {
        visitor.visit_expr(instruction);
    }
}

pub fn walk_expr<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, expr: &'ast Expr) {
    match &expr.kind {
        ExprKind::Nil | ExprKind::Number(_) | ExprKind::Wildcard | ExprKind::Shielded(_) => {}
        ExprKind::Identifier(identifier) => visitor.visit_identifier(identifier),
        ExprKind::Apply(apply) => visitor.visit_apply(apply),
        ExprKind::Access { object, .. } => visitor.visit_expr(object),
        ExprKind::Index { object, key } => {
            visitor.visit_expr(object);
            visitor.visit_expr(key);
        }
        ExprKind::Sequence { head, tail } => {
            visitor.visit_expr(head);
            visitor.visit_expr(tail);
        }
        ExprKind::Tuple(items) => {
            for item in items {
                visitor.visit_expr(item);
            }
        }
        ExprKind::Conditional {
            condition,
            then_branch,
            else_branch,
        } => {
            visitor.visit_expr(condition);
            visitor.visit_expr(then_branch);
            if let Some(else_branch) = else_branch {
                visitor.visit_expr(else_branch);
            }
        }
        ExprKind::Close { body, bindings } => {
            visitor.visit_expr(body);
            for binding in bindings {
                if !binding.shielded {
                    visitor.visit_identifier(&binding.name);
                }
                visitor.visit_expr(&binding.value);
            }
        }
        ExprKind::Var { name, init } => {
            visitor.visit_identifier(name);
            if let Some(init) = init {
                visitor.visit_expr(init);
            }
        }
        ExprKind::Set { target, value } => {
            visitor.visit_expr(target);
            visitor.visit_expr(value);
        }
        ExprKind::Definition(definition) => visitor.visit_definition(definition),
        ExprKind::Module(module) => visitor.visit_module(module),
    }
}
