//! Native implementations of the global operators.
//!
//! Arithmetic on a nil slot panics with NilUsage; equality compares
//! slots directly, so `nil == nil` is true and `nil == 5` is false;
//! ordering on nil panics. Integer overflow and division by zero
//! panic; float arithmetic follows IEEE semantics.

use moose_ir::{MooseType, OpPosition};

use crate::flow::{Panic, PanicKind};
use crate::interpreter::Interpreter;
use crate::value::{NativeFn, Value};

/// Pick the native for a catalog entry.
///
/// The catalog and this table are written together; a mismatch is a
/// programming error caught by the exhaustive match.
pub(crate) fn native_for(symbol: &str, position: OpPosition, param: &MooseType) -> NativeFn {
    match (position, param, symbol) {
        (OpPosition::Infix, MooseType::Integer, "+") => int_add,
        (OpPosition::Infix, MooseType::Integer, "-") => int_sub,
        (OpPosition::Infix, MooseType::Integer, "*") => int_mul,
        (OpPosition::Infix, MooseType::Integer, "/") => int_div,
        (OpPosition::Infix, MooseType::Integer, "%") => int_rem,
        (OpPosition::Infix, MooseType::Integer, "==") => int_eq,
        (OpPosition::Infix, MooseType::Integer, "!=") => int_ne,
        (OpPosition::Infix, MooseType::Integer, "<") => int_lt,
        (OpPosition::Infix, MooseType::Integer, "<=") => int_le,
        (OpPosition::Infix, MooseType::Integer, ">") => int_gt,
        (OpPosition::Infix, MooseType::Integer, ">=") => int_ge,
        (OpPosition::Prefix, MooseType::Integer, "-") => int_neg,

        (OpPosition::Infix, MooseType::Float, "+") => float_add,
        (OpPosition::Infix, MooseType::Float, "-") => float_sub,
        (OpPosition::Infix, MooseType::Float, "*") => float_mul,
        (OpPosition::Infix, MooseType::Float, "/") => float_div,
        (OpPosition::Infix, MooseType::Float, "%") => float_rem,
        (OpPosition::Infix, MooseType::Float, "==") => float_eq,
        (OpPosition::Infix, MooseType::Float, "!=") => float_ne,
        (OpPosition::Infix, MooseType::Float, "<") => float_lt,
        (OpPosition::Infix, MooseType::Float, "<=") => float_le,
        (OpPosition::Infix, MooseType::Float, ">") => float_gt,
        (OpPosition::Infix, MooseType::Float, ">=") => float_ge,
        (OpPosition::Prefix, MooseType::Float, "-") => float_neg,

        (OpPosition::Infix, MooseType::Bool, "==") => bool_eq,
        (OpPosition::Infix, MooseType::Bool, "!=") => bool_ne,
        (OpPosition::Infix, MooseType::Bool, "&&") => bool_and,
        (OpPosition::Infix, MooseType::Bool, "||") => bool_or,
        (OpPosition::Prefix, MooseType::Bool, "!") => bool_not,

        (OpPosition::Infix, MooseType::String, "+") => string_concat,
        (OpPosition::Infix, MooseType::String, "==") => string_eq,
        (OpPosition::Infix, MooseType::String, "!=") => string_ne,

        _ => unreachable!("no native for built-in operator `{symbol}`"),
    }
}

fn wrong_operand() -> Panic {
    Panic::new(PanicKind::Generic(
        "built-in operator applied to mismatched operands".to_string(),
    ))
}

fn overflow() -> Panic {
    Panic::new(PanicKind::Generic("integer overflow".to_string()))
}

fn int_operands(args: &[Value]) -> Result<(i64, i64), Panic> {
    match (&args[0], &args[1]) {
        (Value::Int(Some(a)), Value::Int(Some(b))) => Ok((*a, *b)),
        (Value::Int(_), Value::Int(_)) => Err(Panic::new(PanicKind::NilUsage)),
        _ => Err(wrong_operand()),
    }
}

fn int_slots(args: &[Value]) -> Result<(Option<i64>, Option<i64>), Panic> {
    match (&args[0], &args[1]) {
        (Value::Int(a), Value::Int(b)) => Ok((*a, *b)),
        _ => Err(wrong_operand()),
    }
}

fn int_add(_: &mut Interpreter<'_>, args: &[Value]) -> Result<Value, Panic> {
    let (a, b) = int_operands(args)?;
    a.checked_add(b).map(Value::int).ok_or_else(overflow)
}

fn int_sub(_: &mut Interpreter<'_>, args: &[Value]) -> Result<Value, Panic> {
    let (a, b) = int_operands(args)?;
    a.checked_sub(b).map(Value::int).ok_or_else(overflow)
}

fn int_mul(_: &mut Interpreter<'_>, args: &[Value]) -> Result<Value, Panic> {
    let (a, b) = int_operands(args)?;
    a.checked_mul(b).map(Value::int).ok_or_else(overflow)
}

fn int_div(_: &mut Interpreter<'_>, args: &[Value]) -> Result<Value, Panic> {
    let (a, b) = int_operands(args)?;
    if b == 0 {
        return Err(Panic::new(PanicKind::DivisionByZero));
    }
    a.checked_div(b).map(Value::int).ok_or_else(overflow)
}

fn int_rem(_: &mut Interpreter<'_>, args: &[Value]) -> Result<Value, Panic> {
    let (a, b) = int_operands(args)?;
    if b == 0 {
        return Err(Panic::new(PanicKind::DivisionByZero));
    }
    a.checked_rem(b).map(Value::int).ok_or_else(overflow)
}

fn int_eq(_: &mut Interpreter<'_>, args: &[Value]) -> Result<Value, Panic> {
    let (a, b) = int_slots(args)?;
    Ok(Value::bool(a == b))
}

fn int_ne(_: &mut Interpreter<'_>, args: &[Value]) -> Result<Value, Panic> {
    let (a, b) = int_slots(args)?;
    Ok(Value::bool(a != b))
}

fn int_lt(_: &mut Interpreter<'_>, args: &[Value]) -> Result<Value, Panic> {
    let (a, b) = int_operands(args)?;
    Ok(Value::bool(a < b))
}

fn int_le(_: &mut Interpreter<'_>, args: &[Value]) -> Result<Value, Panic> {
    let (a, b) = int_operands(args)?;
    Ok(Value::bool(a <= b))
}

fn int_gt(_: &mut Interpreter<'_>, args: &[Value]) -> Result<Value, Panic> {
    let (a, b) = int_operands(args)?;
    Ok(Value::bool(a > b))
}

fn int_ge(_: &mut Interpreter<'_>, args: &[Value]) -> Result<Value, Panic> {
    let (a, b) = int_operands(args)?;
    Ok(Value::bool(a >= b))
}

fn int_neg(_: &mut Interpreter<'_>, args: &[Value]) -> Result<Value, Panic> {
    match &args[0] {
        Value::Int(Some(n)) => n.checked_neg().map(Value::int).ok_or_else(overflow),
        Value::Int(None) => Err(Panic::new(PanicKind::NilUsage)),
        _ => Err(wrong_operand()),
    }
}

fn float_operands(args: &[Value]) -> Result<(f64, f64), Panic> {
    match (&args[0], &args[1]) {
        (Value::Float(Some(a)), Value::Float(Some(b))) => Ok((*a, *b)),
        (Value::Float(_), Value::Float(_)) => Err(Panic::new(PanicKind::NilUsage)),
        _ => Err(wrong_operand()),
    }
}

fn float_slots(args: &[Value]) -> Result<(Option<f64>, Option<f64>), Panic> {
    match (&args[0], &args[1]) {
        (Value::Float(a), Value::Float(b)) => Ok((*a, *b)),
        _ => Err(wrong_operand()),
    }
}

fn float_add(_: &mut Interpreter<'_>, args: &[Value]) -> Result<Value, Panic> {
    let (a, b) = float_operands(args)?;
    Ok(Value::float(a + b))
}

fn float_sub(_: &mut Interpreter<'_>, args: &[Value]) -> Result<Value, Panic> {
    let (a, b) = float_operands(args)?;
    Ok(Value::float(a - b))
}

fn float_mul(_: &mut Interpreter<'_>, args: &[Value]) -> Result<Value, Panic> {
    let (a, b) = float_operands(args)?;
    Ok(Value::float(a * b))
}

fn float_div(_: &mut Interpreter<'_>, args: &[Value]) -> Result<Value, Panic> {
    let (a, b) = float_operands(args)?;
    Ok(Value::float(a / b))
}

fn float_rem(_: &mut Interpreter<'_>, args: &[Value]) -> Result<Value, Panic> {
    let (a, b) = float_operands(args)?;
    Ok(Value::float(a % b))
}

fn float_eq(_: &mut Interpreter<'_>, args: &[Value]) -> Result<Value, Panic> {
    let (a, b) = float_slots(args)?;
    Ok(Value::bool(a == b))
}

fn float_ne(_: &mut Interpreter<'_>, args: &[Value]) -> Result<Value, Panic> {
    let (a, b) = float_slots(args)?;
    Ok(Value::bool(a != b))
}

fn float_lt(_: &mut Interpreter<'_>, args: &[Value]) -> Result<Value, Panic> {
    let (a, b) = float_operands(args)?;
    Ok(Value::bool(a < b))
}

fn float_le(_: &mut Interpreter<'_>, args: &[Value]) -> Result<Value, Panic> {
    let (a, b) = float_operands(args)?;
    Ok(Value::bool(a <= b))
}

fn float_gt(_: &mut Interpreter<'_>, args: &[Value]) -> Result<Value, Panic> {
    let (a, b) = float_operands(args)?;
    Ok(Value::bool(a > b))
}

fn float_ge(_: &mut Interpreter<'_>, args: &[Value]) -> Result<Value, Panic> {
    let (a, b) = float_operands(args)?;
    Ok(Value::bool(a >= b))
}

fn float_neg(_: &mut Interpreter<'_>, args: &[Value]) -> Result<Value, Panic> {
    match &args[0] {
        Value::Float(Some(x)) => Ok(Value::float(-x)),
        Value::Float(None) => Err(Panic::new(PanicKind::NilUsage)),
        _ => Err(wrong_operand()),
    }
}

fn bool_operands(args: &[Value]) -> Result<(bool, bool), Panic> {
    match (&args[0], &args[1]) {
        (Value::Bool(Some(a)), Value::Bool(Some(b))) => Ok((*a, *b)),
        (Value::Bool(_), Value::Bool(_)) => Err(Panic::new(PanicKind::NilUsage)),
        _ => Err(wrong_operand()),
    }
}

fn bool_eq(_: &mut Interpreter<'_>, args: &[Value]) -> Result<Value, Panic> {
    match (&args[0], &args[1]) {
        (Value::Bool(a), Value::Bool(b)) => Ok(Value::bool(a == b)),
        _ => Err(wrong_operand()),
    }
}

fn bool_ne(_: &mut Interpreter<'_>, args: &[Value]) -> Result<Value, Panic> {
    match (&args[0], &args[1]) {
        (Value::Bool(a), Value::Bool(b)) => Ok(Value::bool(a != b)),
        _ => Err(wrong_operand()),
    }
}

fn bool_and(_: &mut Interpreter<'_>, args: &[Value]) -> Result<Value, Panic> {
    let (a, b) = bool_operands(args)?;
    Ok(Value::bool(a && b))
}

fn bool_or(_: &mut Interpreter<'_>, args: &[Value]) -> Result<Value, Panic> {
    let (a, b) = bool_operands(args)?;
    Ok(Value::bool(a || b))
}

fn bool_not(_: &mut Interpreter<'_>, args: &[Value]) -> Result<Value, Panic> {
    match &args[0] {
        Value::Bool(Some(b)) => Ok(Value::bool(!b)),
        Value::Bool(None) => Err(Panic::new(PanicKind::NilUsage)),
        _ => Err(wrong_operand()),
    }
}

fn string_concat(_: &mut Interpreter<'_>, args: &[Value]) -> Result<Value, Panic> {
    match (&args[0], &args[1]) {
        (Value::Str(Some(a)), Value::Str(Some(b))) => {
            Ok(Value::string(format!("{a}{b}")))
        }
        (Value::Str(_), Value::Str(_)) => Err(Panic::new(PanicKind::NilUsage)),
        _ => Err(wrong_operand()),
    }
}

fn string_eq(_: &mut Interpreter<'_>, args: &[Value]) -> Result<Value, Panic> {
    match (&args[0], &args[1]) {
        (Value::Str(a), Value::Str(b)) => Ok(Value::bool(a == b)),
        _ => Err(wrong_operand()),
    }
}

fn string_ne(_: &mut Interpreter<'_>, args: &[Value]) -> Result<Value, Panic> {
    match (&args[0], &args[1]) {
        (Value::Str(a), Value::Str(b)) => Ok(Value::bool(a != b)),
        _ => Err(wrong_operand()),
    }
}
