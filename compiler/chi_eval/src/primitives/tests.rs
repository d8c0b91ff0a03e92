use crate::errors::{EvalError, RuntimeError, UnitError};
use crate::scope::LookupMode;
use crate::test_support::{eval, eval_fresh, run, session};
use pretty_assertions::assert_eq;

fn runtime_error(source: &str) -> RuntimeError {
    let (mut session, _) = session(LookupMode::Strict);
    match run(&mut session, source) {
        Err(UnitError::Eval(EvalError::Runtime(error))) => error,
        other => panic!("expected a runtime error from {source:?}, got {other:?}"),
    }
}

#[test]
fn test_arithmetic() {
    assert_eq!(eval_fresh("+(2, 3)"), "5");
    assert_eq!(eval_fresh("-(2, 3)"), "-1");
    assert_eq!(eval_fresh("mul(4, 2.5)"), "10.0");
    assert_eq!(eval_fresh("div(1, 4)"), "0.25");
    assert_eq!(eval_fresh("mod(7, 3)"), "1");
    assert_eq!(eval_fresh("-(5)"), "-5");
}

#[test]
fn test_increment_decrement() {
    assert_eq!(eval_fresh("inc(1)"), "2");
    assert_eq!(eval_fresh("++(1)"), "2");
    assert_eq!(eval_fresh("dec(1)"), "0");
    assert_eq!(eval_fresh("--(0)"), "-1");
}

#[test]
fn test_comparisons_yield_one_or_zero() {
    assert_eq!(eval_fresh("eq(2, 2.0)"), "1");
    assert_eq!(eval_fresh("neq(2, 2)"), "0");
    assert_eq!(eval_fresh("gt(3, 2)"), "1");
    assert_eq!(eval_fresh("lt(3, 2)"), "0");
    assert_eq!(eval_fresh("gte(2, 2)"), "1");
    assert_eq!(eval_fresh("lte(3, 2)"), "0");
}

#[test]
fn test_logic() {
    assert_eq!(eval_fresh("and(1, 0)"), "0");
    assert_eq!(eval_fresh("or(0, 2)"), "1");
    assert_eq!(eval_fresh("not(0)"), "1");
    assert_eq!(eval_fresh("xor(1, 1)"), "0");
}

#[test]
fn test_and_or_short_circuit() {
    // The second operand would be a type error if it were evaluated.
    assert_eq!(eval_fresh("and(0, foo)"), "0");
    assert_eq!(eval_fresh("or(1, foo)"), "1");
}

#[test]
fn test_division_by_zero() {
    assert_eq!(
        runtime_error("div(1, 0)"),
        RuntimeError::Primitive {
            primitive: "div(2)".to_string(),
            message: "division by zero".to_string(),
        }
    );
    assert_eq!(
        runtime_error("mod(1, 0)").to_string(),
        "primitive `mod(2)`: modulo by zero"
    );
}

#[test]
fn test_operands_must_be_numbers() {
    assert_eq!(
        runtime_error("+(1, foo)"),
        RuntimeError::TypeMismatch {
            expected: "number",
            found: "open name",
        }
    );
}

#[test]
fn test_overflow_is_an_error() {
    let error = runtime_error("mul(79228162514264337593543950335, 2)");
    assert!(matches!(error, RuntimeError::Primitive { ref message, .. } if message == "arithmetic overflow"));
}

#[test]
fn test_steq_compares_structure() {
    assert_eq!(eval_fresh("steq(1 2 3, 1 :: 2 :: 3)"), "1");
    assert_eq!(eval_fresh("steq({1, 2}, {1, 3})"), "0");
    assert_eq!(eval_fresh("steq(a, a)"), "1");
    assert_eq!(eval_fresh("steq(1, a)"), "0");

    let (mut session, _) = session(LookupMode::Strict);
    let source = "var(x); var(y); set x.a = 1; set y.a = 1; steq(x, y)";
    assert_eq!(eval(&mut session, source), "1");
}

#[test]
fn test_new_returns_fresh_states() {
    let (mut session, _) = session(LookupMode::Strict);
    eval(&mut session, "var(a = new()); var(b = new()); set a.k = 1");
    assert_eq!(eval(&mut session, "b.k"), "nil");
    assert_eq!(eval(&mut session, "a.k"), "1");
}

#[test]
fn test_print_writes_verbose_line() {
    let (mut session, print) = session(LookupMode::Strict);
    assert_eq!(eval(&mut session, "print(1, a, 2 3)"), "nil");
    assert_eq!(print.captured(), "num:1 opn:a (num:2 num:3)\n");
}
