//! Native implementations of the primitive member functions.
//!
//! Each native reads its receiver from the member frame the evaluator
//! stamped it into. Nil propagation: a nil receiver yields a nil slot
//! of the declared return type (for the parse tuples, all components
//! nil). Parse failures yield `(nil, "Cannot parse 'X' to an T.")`.

use moose_ir::MooseType;

use crate::flow::{Panic, PanicKind};
use crate::interpreter::Interpreter;
use crate::value::{NativeFn, Value};

/// Pick the native for a catalog member.
pub(crate) fn native_for(recv: &MooseType, name: &str) -> NativeFn {
    match (recv, name) {
        (MooseType::Integer, "toBool") => int_to_bool,
        (MooseType::Integer, "toFloat") => int_to_float,
        (MooseType::Integer, "toString") => int_to_string,
        (MooseType::Float, "toInt") => float_to_int,
        (MooseType::Float, "toString") => float_to_string,
        (MooseType::Bool, "toInt") => bool_to_int,
        (MooseType::Bool, "toFloat") => bool_to_float,
        (MooseType::Bool, "toString") => bool_to_string,
        (MooseType::String, "parseInt") => string_parse_int,
        (MooseType::String, "parseFloat") => string_parse_float,
        (MooseType::String, "parseBool") => string_parse_bool,
        (MooseType::List(_), "length") => list_length,
        _ => unreachable!("no native for built-in member `{name}`"),
    }
}

fn wrong_receiver() -> Panic {
    Panic::new(PanicKind::Generic(
        "built-in member applied to the wrong receiver".to_string(),
    ))
}

fn parse_tuple_types() -> Vec<MooseType> {
    vec![MooseType::Integer, MooseType::String]
}

fn int_to_bool(interp: &mut Interpreter<'_>, _: &[Value]) -> Result<Value, Panic> {
    match interp.receiver()? {
        Value::Int(Some(n)) => Ok(Value::bool(n != 0)),
        Value::Int(None) => Ok(Value::Bool(None)),
        _ => Err(wrong_receiver()),
    }
}

fn int_to_float(interp: &mut Interpreter<'_>, _: &[Value]) -> Result<Value, Panic> {
    match interp.receiver()? {
        Value::Int(Some(n)) => Ok(Value::float(n as f64)),
        Value::Int(None) => Ok(Value::Float(None)),
        _ => Err(wrong_receiver()),
    }
}

fn int_to_string(interp: &mut Interpreter<'_>, _: &[Value]) -> Result<Value, Panic> {
    match interp.receiver()? {
        Value::Int(Some(n)) => Ok(Value::string(n.to_string())),
        Value::Int(None) => Ok(Value::Str(None)),
        _ => Err(wrong_receiver()),
    }
}

fn float_to_int(interp: &mut Interpreter<'_>, _: &[Value]) -> Result<Value, Panic> {
    match interp.receiver()? {
        // Truncation toward zero; out-of-range saturates.
        Value::Float(Some(x)) => Ok(Value::int(x as i64)),
        Value::Float(None) => Ok(Value::Int(None)),
        _ => Err(wrong_receiver()),
    }
}

fn float_to_string(interp: &mut Interpreter<'_>, _: &[Value]) -> Result<Value, Panic> {
    match interp.receiver()? {
        Value::Float(Some(x)) => Ok(Value::string(format!("{x:?}"))),
        Value::Float(None) => Ok(Value::Str(None)),
        _ => Err(wrong_receiver()),
    }
}

fn bool_to_int(interp: &mut Interpreter<'_>, _: &[Value]) -> Result<Value, Panic> {
    match interp.receiver()? {
        Value::Bool(Some(b)) => Ok(Value::int(i64::from(b))),
        Value::Bool(None) => Ok(Value::Int(None)),
        _ => Err(wrong_receiver()),
    }
}

fn bool_to_float(interp: &mut Interpreter<'_>, _: &[Value]) -> Result<Value, Panic> {
    match interp.receiver()? {
        Value::Bool(Some(b)) => Ok(Value::float(if b { 1.0 } else { 0.0 })),
        Value::Bool(None) => Ok(Value::Float(None)),
        _ => Err(wrong_receiver()),
    }
}

fn bool_to_string(interp: &mut Interpreter<'_>, _: &[Value]) -> Result<Value, Panic> {
    match interp.receiver()? {
        Value::Bool(Some(b)) => Ok(Value::string(b.to_string())),
        Value::Bool(None) => Ok(Value::Str(None)),
        _ => Err(wrong_receiver()),
    }
}

fn string_parse_int(interp: &mut Interpreter<'_>, _: &[Value]) -> Result<Value, Panic> {
    match interp.receiver()? {
        Value::Str(Some(s)) => Ok(match s.parse::<i64>() {
            Ok(n) => Value::tuple(parse_tuple_types(), vec![Value::int(n), Value::Str(None)]),
            Err(_) => Value::tuple(
                parse_tuple_types(),
                vec![
                    Value::Int(None),
                    Value::string(format!("Cannot parse '{s}' to an Int.")),
                ],
            ),
        }),
        Value::Str(None) => Ok(Value::tuple(
            parse_tuple_types(),
            vec![Value::Int(None), Value::Str(None)],
        )),
        _ => Err(wrong_receiver()),
    }
}

fn string_parse_float(interp: &mut Interpreter<'_>, _: &[Value]) -> Result<Value, Panic> {
    let types = vec![MooseType::Float, MooseType::String];
    match interp.receiver()? {
        Value::Str(Some(s)) => Ok(match s.parse::<f64>() {
            Ok(x) => Value::tuple(types, vec![Value::float(x), Value::Str(None)]),
            Err(_) => Value::tuple(
                types,
                vec![
                    Value::Float(None),
                    Value::string(format!("Cannot parse '{s}' to a Float.")),
                ],
            ),
        }),
        Value::Str(None) => Ok(Value::tuple(
            types,
            vec![Value::Float(None), Value::Str(None)],
        )),
        _ => Err(wrong_receiver()),
    }
}

fn string_parse_bool(interp: &mut Interpreter<'_>, _: &[Value]) -> Result<Value, Panic> {
    let types = vec![MooseType::Bool, MooseType::String];
    match interp.receiver()? {
        Value::Str(Some(s)) => Ok(match s.as_str() {
            "true" => Value::tuple(types, vec![Value::bool(true), Value::Str(None)]),
            "false" => Value::tuple(types, vec![Value::bool(false), Value::Str(None)]),
            _ => Value::tuple(
                types,
                vec![
                    Value::Bool(None),
                    Value::string(format!("Cannot parse '{s}' to a Bool.")),
                ],
            ),
        }),
        Value::Str(None) => Ok(Value::tuple(
            types,
            vec![Value::Bool(None), Value::Str(None)],
        )),
        _ => Err(wrong_receiver()),
    }
}

fn list_length(interp: &mut Interpreter<'_>, _: &[Value]) -> Result<Value, Panic> {
    match interp.receiver()? {
        Value::List { items: Some(items), .. } => {
            Ok(Value::int(items.borrow().len() as i64))
        }
        Value::List { items: None, .. } => Ok(Value::Int(None)),
        _ => Err(wrong_receiver()),
    }
}
