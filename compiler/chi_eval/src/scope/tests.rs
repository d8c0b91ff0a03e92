use super::*;
use chi_ir::SymbolTable;
use pretty_assertions::assert_eq;

fn var(name: Name) -> Declaration {
    Declaration::new(name, DeclarationKind::Var)
}

fn param(name: Name) -> Declaration {
    Declaration::new(name, DeclarationKind::Param)
}

#[test]
fn test_strict_rejects_duplicates() {
    let symbols = SymbolTable::new();
    let alias = symbols.intern("<program>");
    let x = symbols.intern("x");
    let scope = LexicalScope::new(alias, ScopeKind::Singleton, None);

    assert_eq!(scope.append(var(x), LookupMode::Strict), Ok(0));
    assert_eq!(
        scope.append(var(x), LookupMode::Strict),
        Err(Duplicate { name: x, scope: alias })
    );
    assert_eq!(scope.len(), 1);
}

#[test]
fn test_permissive_shadows_with_latest() {
    let symbols = SymbolTable::new();
    let x = symbols.intern("x");
    let scope = LexicalScope::new(symbols.intern("<program>"), ScopeKind::Singleton, None);

    assert_eq!(scope.append(var(x), LookupMode::Permissive), Ok(0));
    assert_eq!(scope.append(param(x), LookupMode::Permissive), Ok(1));

    let latest = scope.lookup(x, LookupMode::Permissive);
    assert!(matches!(latest, Some((ref d, 1)) if d.is_param()));
    let first = scope.lookup(x, LookupMode::Strict);
    assert!(matches!(first, Some((ref d, 0)) if !d.is_param()));
}

#[test]
fn test_instance_scopes_are_always_strict() {
    let symbols = SymbolTable::new();
    let n = symbols.intern("n");
    let scope = LexicalScope::new(symbols.intern("f(2)"), ScopeKind::Instance, None);

    assert_eq!(scope.append(param(n), LookupMode::Permissive), Ok(0));
    assert!(scope.append(param(n), LookupMode::Permissive).is_err());
}

#[test]
fn test_recursive_lookup_skips_instance_ancestors() {
    let symbols = SymbolTable::new();
    let x = symbols.intern("x");
    let global = LexicalScope::global(symbols.intern("<global>"));
    let program = LexicalScope::new(
        symbols.intern("<program>"),
        ScopeKind::Singleton,
        Some(Rc::clone(&global)),
    );
    let outer = LexicalScope::new(
        symbols.intern("<program>/f(1)"),
        ScopeKind::Instance,
        Some(Rc::clone(&program)),
    );
    let inner = LexicalScope::new(
        symbols.intern("<program>/f(1)/g(0)"),
        ScopeKind::Instance,
        Some(Rc::clone(&outer)),
    );
    let _ = global.append(var(x), LookupMode::Strict);
    let _ = outer.append(param(x), LookupMode::Strict);

    // The enclosing definition's parameter is not visible.
    let found = inner.recursive_lookup(x, LookupMode::Strict);
    let Some(found) = found else {
        panic!("x should resolve globally");
    };
    assert!(Rc::ptr_eq(&found.scope, &global));
    assert_eq!(found.index, 0);

    // But it is from the definition's own scope.
    let own = outer.recursive_lookup(x, LookupMode::Strict);
    assert!(own.is_some_and(|m| Rc::ptr_eq(&m.scope, &outer) && m.declaration.is_param()));
}

#[test]
fn test_recursive_lookup_missing_name() {
    let symbols = SymbolTable::new();
    let global = LexicalScope::global(symbols.intern("<global>"));
    let program = LexicalScope::new(
        symbols.intern("<program>"),
        ScopeKind::Singleton,
        Some(Rc::clone(&global)),
    );

    assert!(program
        .recursive_lookup(symbols.intern("nowhere"), LookupMode::Permissive)
        .is_none());
}

#[test]
fn test_global_scope_is_placed_at_zero() {
    let symbols = SymbolTable::new();
    let global = LexicalScope::global(symbols.intern("<global>"));
    assert_eq!(global.global_frame_start(), Some(0));
    assert!(global.parent().is_none());

    let program = LexicalScope::new(symbols.intern("<program>"), ScopeKind::Singleton, None);
    assert_eq!(program.global_frame_start(), None);
}
