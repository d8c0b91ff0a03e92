use super::*;
use pretty_assertions::assert_eq;

fn dump(source: &str) -> String {
    let symbols = SymbolTable::new();
    match parse(source, &symbols) {
        Ok(program) => dump_program(&program, &symbols),
        Err(err) => panic!("failed to parse {source:?}: {err}"),
    }
}

fn parse_err(source: &str) -> ParseError {
    let symbols = SymbolTable::new();
    match parse(source, &symbols) {
        Ok(program) => panic!("expected an error, parsed {} instructions", program.instructions.len()),
        Err(err) => err,
    }
}

#[test]
fn test_parse_recursive_definition() {
    assert_eq!(
        dump("def fact(n) => if n then mul(n, fact(dec(n))) else 1; fact(5)"),
        "(def fact (n) (if n (call mul n (call fact (call dec n))) 1))\n(call fact 5)"
    );
}

#[test]
fn test_parse_definition_forms() {
    assert_eq!(dump("def a"), "(def a ())");
    assert_eq!(dump("def b => 1"), "(def b () 1)");
    assert_eq!(dump("def c() => nil"), "(def c () nil)");
    assert_eq!(dump("def d(x, y)"), "(def d (x y))");
}

#[test]
fn test_parse_sequence_by_juxtaposition() {
    assert_eq!(dump("1 2 3"), "(:: 1 (:: 2 3))");
}

#[test]
fn test_parse_sequence_separator() {
    assert_eq!(
        dump("nil :: 1 :: (2 :: (3 :: nil))"),
        "(:: nil (:: 1 (:: 2 (:: 3 nil))))"
    );
    // `::` keeps a parenthesized operand from reading as a call argument list.
    assert_eq!(dump("f :: (x)"), "(:: f x)");
    assert_eq!(dump("f (x)"), "(call f x)");
}

#[test]
fn test_parse_tuple() {
    assert_eq!(dump("{nil, 1, nil}"), "(tuple nil 1 nil)");
    assert_eq!(dump("{}"), "(tuple)");
    assert_eq!(dump("{1 2, 3}"), "(tuple (:: 1 2) 3)");
}

#[test]
fn test_parse_access_and_index() {
    assert_eq!(dump("x.a.b"), "(. (. x a) b)");
    assert_eq!(dump("x.[k]"), "(.[] x k)");
    assert_eq!(dump("x.[$k].c"), "(. (.[] x $k) c)");
}

#[test]
fn test_parse_var() {
    assert_eq!(dump("var(x)"), "(var x)");
    assert_eq!(dump("var(x = 1 2)"), "(var x (:: 1 2))");
}

#[test]
fn test_parse_set_forms() {
    assert_eq!(dump("set x.a.b = 5"), "(set (. (. x a) b) 5)");
    assert_eq!(dump("set(x = 1)"), "(set x 1)");
    assert_eq!(dump("set x.[k] = nil"), "(set (.[] x k) nil)");
}

#[test]
fn test_parse_close_bindings() {
    assert_eq!(
        dump("close f(y) with ($y = 2, z = 3)"),
        "(close (call f y) ($y 2) (z 3))"
    );
    assert_eq!(dump("close x with ()"), "(close x)");
}

#[test]
fn test_parse_conditional_without_else() {
    assert_eq!(dump("if 1 then 2"), "(if 1 2)");
    assert_eq!(dump("if a then b c else d"), "(if a (:: b c) d)");
}

#[test]
fn test_parse_module_and_test_blocks() {
    assert_eq!(
        dump("module geometry { def pi => 3.14; var(origin) }"),
        "(module geometry (def pi () 3.14) (var origin))"
    );
    assert_eq!(
        dump("test arith { eq(1, 1); test inner { OK; }; }"),
        "(test arith (call eq 1 1) (test inner OK))"
    );
}

#[test]
fn test_parse_trailing_semicolon_and_wildcard() {
    assert_eq!(dump("_; 1;"), "_\n1");
    assert_eq!(dump(""), "");
}

#[test]
fn test_parse_nested_depth() {
    let source = format!("{}1{}", "(".repeat(2000), ")".repeat(2000));
    assert_eq!(dump(&source), "1");
}

#[test]
fn test_error_missing_then() {
    let err = parse_err("if 1 2");
    assert_eq!(
        err.kind,
        ParseErrorKind::Unexpected {
            expected: "`then`",
            found: "end of input",
        }
    );
    assert_eq!(err.context, ErrorContext::Conditional);
}

#[test]
fn test_error_invalid_callee() {
    let err = parse_err("x.y(1)");
    assert_eq!(err.kind, ParseErrorKind::InvalidCallee);
    assert_eq!(err.span, Span::new(0, 3));
}

#[test]
fn test_error_invalid_set_target() {
    let err = parse_err("set 1 = 2");
    assert_eq!(err.kind, ParseErrorKind::InvalidSetTarget);
    assert_eq!(err.context, ErrorContext::Set);
}

#[test]
fn test_error_unrecognized_input() {
    let err = parse_err("1 @ 2");
    assert_eq!(err.kind, ParseErrorKind::Unrecognized);
    assert_eq!(err.span, Span::new(2, 3));
}

#[test]
fn test_error_message() {
    let err = parse_err("def f(x y)");
    assert_eq!(
        err.to_string(),
        "expected `,`, found identifier while parsing a definition (at 8..9)"
    );
}
