use super::*;
use crate::visitor::{walk_expr, Visitor};
use pretty_assertions::assert_eq;

fn ident(raw: u32) -> Identifier {
    Identifier::new(Name::from_raw(raw), Span::DUMMY)
}

fn expr(kind: ExprKind) -> Expr {
    Expr::new(kind, Span::DUMMY)
}

#[test]
fn test_identifier_starts_unresolved() {
    let id = ident(10);
    assert_eq!(id.location(), Location::Unresolved);
    assert!(!id.location().is_resolved());

    id.resolve(Location::Global(3));
    assert_eq!(id.location(), Location::Global(3));
}

#[test]
fn test_apply_target_slot() {
    let apply = Apply::new(ident(11), vec![expr(ExprKind::Nil)]);
    assert_eq!(apply.target(), CallTarget::Unresolved);

    apply.resolve(CallTarget::Parametric(1));
    assert!(apply.target().is_resolved());
}

#[test]
fn test_definition_arity_and_scope() {
    let def = Definition::new(ident(12), vec![ident(13), ident(14)], None, Span::DUMMY);
    assert_eq!(def.arity(), 2);
    assert_eq!(def.scope(), None);

    def.set_scope(ScopeId::new(4));
    assert_eq!(def.scope().map(ScopeId::index), Some(4));
}

#[test]
fn test_program_analyzed_flag() {
    let program = Program::new(vec![expr(ExprKind::Wildcard)]);
    assert!(!program.is_analyzed());
    program.mark_analyzed();
    assert!(program.is_analyzed());
}

struct CountIdentifiers(usize);

impl<'ast> Visitor<'ast> for CountIdentifiers {
    fn visit_expr(&mut self, expr: &'ast Expr) {
        walk_expr(self, expr);
    }

    fn visit_identifier(&mut self, _identifier: &'ast Identifier) {
        self.0 += 1;
    }
}

#[test]
fn test_visitor_reaches_nested_identifiers() {
    // if a then { b, c.m } else close d with (e = f)
    let tree = expr(ExprKind::Conditional {
        condition: Box::new(expr(ExprKind::Identifier(ident(20)))),
        then_branch: Box::new(expr(ExprKind::Tuple(vec![
            expr(ExprKind::Identifier(ident(21))),
            expr(ExprKind::Access {
                object: Box::new(expr(ExprKind::Identifier(ident(22)))),
                member: Name::from_raw(23),
            }),
        ]))),
        else_branch: Some(Box::new(expr(ExprKind::Close {
            body: Box::new(expr(ExprKind::Identifier(ident(24)))),
            bindings: vec![Binding {
                name: ident(25),
                shielded: false,
                value: expr(ExprKind::Identifier(ident(26))),
            }],
        }))),
    });

    let mut counter = CountIdentifiers(0);
    counter.visit_program(&Program::new(vec![tree]));
    assert_eq!(counter.0, 6);
}
