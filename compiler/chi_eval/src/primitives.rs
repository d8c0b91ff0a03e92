//! Builtin callables registered into every session's global scope.
//!
//! A primitive receives its arguments unevaluated, which lets `and`/`or`
//! short-circuit. Booleans are the numbers `1` and `0`.

use crate::equivalence::structurally_equal;
use crate::errors::{EvalResult, RuntimeError};
use crate::interpreter::Interpreter;
use crate::scope::{Declaration, DeclarationKind};
use crate::serialize::render;
use crate::value::Value;
use chi_ir::{Decimal, Expr, Name, SymbolTable};
use std::fmt;
use std::rc::Rc;

pub type PrimitiveFn = fn(&mut Interpreter<'_>, &Primitive, &[Expr]) -> EvalResult;

pub struct Primitive {
    pub name: Name,
    /// `name(arity)` or `name(*)`.
    pub signature: Name,
    /// `None` for variadic primitives.
    pub arity: Option<usize>,
    apply: PrimitiveFn,
}

impl Primitive {
    pub fn apply(&self, interpreter: &mut Interpreter<'_>, args: &[Expr]) -> EvalResult {
        if let Some(arity) = self.arity {
            if args.len() != arity {
                return Err(self.error(
                    interpreter.symbols(),
                    format!("expected {arity} arguments, found {}", args.len()),
                )
                .into());
            }
        }
        (self.apply)(interpreter, self, args)
    }

    fn error(&self, symbols: &SymbolTable, message: impl Into<String>) -> RuntimeError {
        RuntimeError::Primitive {
            primitive: symbols.text(self.signature).to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Debug for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Primitive")
            .field("signature", &self.signature)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

const PRIMITIVES: &[(&str, Option<usize>, PrimitiveFn)] = &[
    // Arithmetic
    ("+", Some(2), add),
    ("-", Some(2), subtract),
    ("mul", Some(2), multiply),
    ("div", Some(2), divide),
    ("mod", Some(2), modulo),
    ("-", Some(1), negate),
    ("++", Some(1), increment),
    ("--", Some(1), decrement),
    ("inc", Some(1), increment),
    ("dec", Some(1), decrement),
    // Comparison
    ("eq", Some(2), equal),
    ("neq", Some(2), not_equal),
    ("gt", Some(2), greater),
    ("lt", Some(2), less),
    ("gte", Some(2), greater_equal),
    ("lte", Some(2), less_equal),
    // Logic
    ("and", Some(2), and),
    ("or", Some(2), or),
    ("not", Some(1), not),
    ("xor", Some(2), xor),
    // State
    ("new", Some(0), new_state),
    // Equivalence and output
    ("steq", Some(2), steq),
    ("print", None, print),
];

/// Declarations for every builtin, in registration order.
pub fn declarations(symbols: &SymbolTable) -> Vec<Declaration> {
    PRIMITIVES
        .iter()
        .map(|&(text, arity, apply)| {
            let name = symbols.intern(text);
            let signature = match arity {
                Some(arity) => symbols.signature(name, arity),
                None => symbols.variadic_signature(name),
            };
            let primitive = Rc::new(Primitive {
                name,
                signature,
                arity,
                apply,
            });
            Declaration::new(signature, DeclarationKind::Primitive(primitive))
        })
        .collect()
}

// ===== Operand helpers =====

fn number(interpreter: &mut Interpreter<'_>, arg: &Expr) -> EvalResult<Decimal> {
    match interpreter.eval(arg)? {
        Value::Number(n) => Ok(n),
        other => Err(RuntimeError::type_mismatch("number", &other).into()),
    }
}

fn truthy(interpreter: &mut Interpreter<'_>, arg: &Expr) -> EvalResult<bool> {
    number(interpreter, arg).map(|n| !n.is_zero())
}

fn arithmetic(
    interpreter: &mut Interpreter<'_>,
    primitive: &Primitive,
    args: &[Expr],
    op: fn(Decimal, Decimal) -> Option<Decimal>,
) -> EvalResult {
    let a = number(interpreter, &args[0])?;
    let b = number(interpreter, &args[1])?;
    op(a, b)
        .map(Value::Number)
        .ok_or_else(|| primitive.error(interpreter.symbols(), "arithmetic overflow").into())
}

fn comparison(
    interpreter: &mut Interpreter<'_>,
    args: &[Expr],
    op: fn(&Decimal, &Decimal) -> bool,
) -> EvalResult {
    let a = number(interpreter, &args[0])?;
    let b = number(interpreter, &args[1])?;
    Ok(Value::boolean(op(&a, &b)))
}

fn unary(
    interpreter: &mut Interpreter<'_>,
    primitive: &Primitive,
    args: &[Expr],
    op: fn(Decimal) -> Option<Decimal>,
) -> EvalResult {
    let a = number(interpreter, &args[0])?;
    op(a)
        .map(Value::Number)
        .ok_or_else(|| primitive.error(interpreter.symbols(), "arithmetic overflow").into())
}

// ===== Arithmetic =====

fn add(i: &mut Interpreter<'_>, p: &Primitive, args: &[Expr]) -> EvalResult {
    arithmetic(i, p, args, Decimal::checked_add)
}

fn subtract(i: &mut Interpreter<'_>, p: &Primitive, args: &[Expr]) -> EvalResult {
    arithmetic(i, p, args, Decimal::checked_sub)
}

fn multiply(i: &mut Interpreter<'_>, p: &Primitive, args: &[Expr]) -> EvalResult {
    arithmetic(i, p, args, Decimal::checked_mul)
}

fn divide(i: &mut Interpreter<'_>, p: &Primitive, args: &[Expr]) -> EvalResult {
    let a = number(i, &args[0])?;
    let b = number(i, &args[1])?;
    if b.is_zero() {
        return Err(p.error(i.symbols(), "division by zero").into());
    }
    a.checked_div(b)
        .map(Value::Number)
        .ok_or_else(|| p.error(i.symbols(), "arithmetic overflow").into())
}

fn modulo(i: &mut Interpreter<'_>, p: &Primitive, args: &[Expr]) -> EvalResult {
    let a = number(i, &args[0])?;
    let b = number(i, &args[1])?;
    if b.is_zero() {
        return Err(p.error(i.symbols(), "modulo by zero").into());
    }
    a.checked_rem(b)
        .map(Value::Number)
        .ok_or_else(|| p.error(i.symbols(), "arithmetic overflow").into())
}

fn negate(i: &mut Interpreter<'_>, p: &Primitive, args: &[Expr]) -> EvalResult {
    unary(i, p, args, |a| Some(-a))
}

fn increment(i: &mut Interpreter<'_>, p: &Primitive, args: &[Expr]) -> EvalResult {
    unary(i, p, args, |a| a.checked_add(Decimal::ONE))
}

fn decrement(i: &mut Interpreter<'_>, p: &Primitive, args: &[Expr]) -> EvalResult {
    unary(i, p, args, |a| a.checked_sub(Decimal::ONE))
}

// ===== Comparison =====

fn equal(i: &mut Interpreter<'_>, _: &Primitive, args: &[Expr]) -> EvalResult {
    comparison(i, args, Decimal::eq)
}

fn not_equal(i: &mut Interpreter<'_>, _: &Primitive, args: &[Expr]) -> EvalResult {
    comparison(i, args, Decimal::ne)
}

fn greater(i: &mut Interpreter<'_>, _: &Primitive, args: &[Expr]) -> EvalResult {
    comparison(i, args, Decimal::gt)
}

fn less(i: &mut Interpreter<'_>, _: &Primitive, args: &[Expr]) -> EvalResult {
    comparison(i, args, Decimal::lt)
}

fn greater_equal(i: &mut Interpreter<'_>, _: &Primitive, args: &[Expr]) -> EvalResult {
    comparison(i, args, Decimal::ge)
}

fn less_equal(i: &mut Interpreter<'_>, _: &Primitive, args: &[Expr]) -> EvalResult {
    comparison(i, args, Decimal::le)
}

// ===== Logic =====

fn and(i: &mut Interpreter<'_>, _: &Primitive, args: &[Expr]) -> EvalResult {
    let result = truthy(i, &args[0])? && truthy(i, &args[1])?;
    Ok(Value::boolean(result))
}

fn or(i: &mut Interpreter<'_>, _: &Primitive, args: &[Expr]) -> EvalResult {
    let result = truthy(i, &args[0])? || truthy(i, &args[1])?;
    Ok(Value::boolean(result))
}

fn not(i: &mut Interpreter<'_>, _: &Primitive, args: &[Expr]) -> EvalResult {
    Ok(Value::boolean(!truthy(i, &args[0])?))
}

fn xor(i: &mut Interpreter<'_>, _: &Primitive, args: &[Expr]) -> EvalResult {
    let a = truthy(i, &args[0])?;
    let b = truthy(i, &args[1])?;
    Ok(Value::boolean(a ^ b))
}

// ===== State, equivalence, output =====

fn new_state(_: &mut Interpreter<'_>, _: &Primitive, _: &[Expr]) -> EvalResult {
    Ok(Value::new_state())
}

fn steq(i: &mut Interpreter<'_>, _: &Primitive, args: &[Expr]) -> EvalResult {
    let a = i.eval(&args[0])?;
    let b = i.eval(&args[1])?;
    Ok(Value::boolean(structurally_equal(&a, &b)))
}

fn print(i: &mut Interpreter<'_>, _: &Primitive, args: &[Expr]) -> EvalResult {
    let mut rendered = Vec::with_capacity(args.len());
    for arg in args {
        let value = i.eval(arg)?;
        rendered.push(render(&value, i.symbols(), true));
    }
    i.print_line(&rendered.join(" "));
    Ok(Value::Nil)
}

#[cfg(test)]
mod tests;
