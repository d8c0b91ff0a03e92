use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn test_intern_is_idempotent() {
    let symbols = SymbolTable::new();

    let fact = symbols.intern("fact");
    let again = symbols.intern("fact");
    let other = symbols.intern("dec");

    assert_eq!(fact, again);
    assert_ne!(fact, other);
}

#[test]
fn test_codes_are_sequential() {
    let symbols = SymbolTable::new();
    let before = symbols.len();

    let a = symbols.intern("a");
    let b = symbols.intern("b");

    assert_eq!(a.raw() as usize, before);
    assert_eq!(b.raw(), a.raw() + 1);
    assert_eq!(symbols.len(), before + 2);
}

#[test]
fn test_null_sentinel() {
    let symbols = SymbolTable::new();
    assert_eq!(symbols.intern(NULL_TEXT), Name::NULL);
    assert_eq!(&*symbols.text(Name::NULL), NULL_TEXT);
    assert_eq!(symbols.by_code(0).map(|s| s.name), Ok(Name::NULL));
}

#[test]
fn test_by_code_and_by_text() {
    let symbols = SymbolTable::new();
    let name = symbols.intern("steq");

    let by_code = symbols.by_code(name.raw());
    let by_text = symbols.by_text("steq");

    assert_eq!(by_code.as_ref().map(|s| &*s.text), Ok("steq"));
    assert_eq!(by_text.map(|s| s.name), Ok(name));
}

#[test]
fn test_unknown_symbol() {
    let symbols = SymbolTable::new();
    assert_eq!(symbols.by_code(10_000), Err(UnknownSymbol::Code(10_000)));
    assert_eq!(
        symbols.by_text("never-interned"),
        Err(UnknownSymbol::Text("never-interned".to_owned()))
    );
}

#[test]
fn test_well_known_names_are_stable() {
    let symbols = SymbolTable::new();
    let first = WellKnownNames::new(&symbols);
    let second = WellKnownNames::new(&symbols);

    assert_eq!(first, second);
    assert_eq!(&*symbols.text(first.ok), "OK");
    assert_eq!(&*symbols.text(first.ko), "KO");
    assert_eq!(&*symbols.text(first.program), "<program>");
}

#[test]
fn test_signatures() {
    let symbols = SymbolTable::new();
    let fact = symbols.intern("fact");

    assert_eq!(symbols.signature(fact, 1), symbols.intern("fact(1)"));
    assert_eq!(symbols.variadic_signature(fact), symbols.intern("fact(*)"));
}

#[test]
fn test_shared_symbols() {
    let symbols = SharedSymbols::new();
    let clone = symbols.clone();

    assert_eq!(symbols.intern("shared"), clone.intern("shared"));
}

proptest! {
    #[test]
    fn prop_lookup_inverts_intern(text in "[a-z+*/!?-]{1,12}") {
        let symbols = SymbolTable::new();
        let name = symbols.intern(&text);

        prop_assert_eq!(symbols.by_text(&text).map(|s| s.name), Ok(name));
        let by_code = symbols.by_code(name.raw()).map(|s| s.text.to_string());
        prop_assert_eq!(by_code, Ok(text));
    }
}
