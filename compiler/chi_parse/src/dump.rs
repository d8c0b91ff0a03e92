//! S-expression rendering of a parsed tree, used by the REPL's `/parse`.

use chi_ir::{Expr, ExprKind, Identifier, ModuleKind, Name, Program, SymbolTable};
use std::fmt::Write;

/// Render `program` as one S-expression per instruction, separated by newlines.
pub fn dump_program(program: &Program, symbols: &SymbolTable) -> String {
    let mut printer = TreePrinter {
        symbols,
        out: String::new(),
    };
    for (i, instruction) in program.instructions.iter().enumerate() {
        if i > 0 {
            printer.out.push('\n');
        }
        printer.expr(instruction);
    }
    printer.out
}

struct TreePrinter<'a> {
    symbols: &'a SymbolTable,
    out: String,
}

impl TreePrinter<'_> {
    fn name(&mut self, name: Name) {
        let text = self.symbols.text(name);
        self.out.push_str(&text);
    }

    fn ident(&mut self, ident: &Identifier) {
        self.name(ident.name);
    }

    fn list(&mut self, head: &str, items: &[Expr]) {
        self.out.push('(');
        self.out.push_str(head);
        for item in items {
            self.out.push(' ');
            self.expr(item);
        }
        self.out.push(')');
    }

    fn expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Nil => self.out.push_str("nil"),
            ExprKind::Number(value) => {
                let _ = write!(self.out, "{value}");
            }
            ExprKind::Wildcard => self.out.push('_'),
            ExprKind::Identifier(ident) => self.ident(ident),
            ExprKind::Shielded(name) => {
                self.out.push('$');
                self.name(*name);
            }
            ExprKind::Apply(apply) => {
                self.out.push_str("(call ");
                self.ident(&apply.callee);
                for arg in &apply.args {
                    self.out.push(' ');
                    self.expr(arg);
                }
                self.out.push(')');
            }
            ExprKind::Access { object, member } => {
                self.out.push_str("(. ");
                self.expr(object);
                self.out.push(' ');
                self.name(*member);
                self.out.push(')');
            }
            ExprKind::Index { object, key } => {
                self.out.push_str("(.[] ");
                self.expr(object);
                self.out.push(' ');
                self.expr(key);
                self.out.push(')');
            }
            ExprKind::Sequence { head, tail } => {
                self.out.push_str("(:: ");
                self.expr(head);
                self.out.push(' ');
                self.expr(tail);
                self.out.push(')');
            }
            ExprKind::Tuple(items) => self.list("tuple", items),
            ExprKind::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                self.out.push_str("(if ");
                self.expr(condition);
                self.out.push(' ');
                self.expr(then_branch);
                if let Some(else_branch) = else_branch {
                    self.out.push(' ');
                    self.expr(else_branch);
                }
                self.out.push(')');
            }
            ExprKind::Close { body, bindings } => {
                self.out.push_str("(close ");
                self.expr(body);
                for binding in bindings {
                    self.out.push_str(" (");
                    if binding.shielded {
                        self.out.push('$');
                    }
                    self.ident(&binding.name);
                    self.out.push(' ');
                    self.expr(&binding.value);
                    self.out.push(')');
                }
                self.out.push(')');
            }
            ExprKind::Var { name, init } => {
                self.out.push_str("(var ");
                self.ident(name);
                if let Some(init) = init {
                    self.out.push(' ');
                    self.expr(init);
                }
                self.out.push(')');
            }
            ExprKind::Set { target, value } => {
                self.out.push_str("(set ");
                self.expr(target);
                self.out.push(' ');
                self.expr(value);
                self.out.push(')');
            }
            ExprKind::Definition(def) => {
                self.out.push_str("(def ");
                self.ident(&def.name);
                self.out.push_str(" (");
                for (i, param) in def.params.iter().enumerate() {
                    if i > 0 {
                        self.out.push(' ');
                    }
                    self.ident(param);
                }
                self.out.push(')');
                if let Some(body) = &def.body {
                    self.out.push(' ');
                    self.expr(body);
                }
                self.out.push(')');
            }
            ExprKind::Module(module) => {
                let keyword = match module.kind {
                    ModuleKind::Module => "module ",
                    ModuleKind::Test => "test ",
                };
                self.out.push('(');
                self.out.push_str(keyword);
                self.ident(&module.name);
                for instruction in &module.instructions {
                    self.out.push(' ');
                    self.expr(instruction);
                }
                self.out.push(')');
            }
        }
    }
}
