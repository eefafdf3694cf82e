//! Declarative catalog of built-in signatures.
//!
//! Both halves of the engine consume this catalog: the type checker
//! seeds its built-in root scope and the per-primitive member scopes
//! from it, and the evaluator seeds the matching environments and
//! attaches the native implementations keyed by the same names. One
//! catalog, two payloads.

use crate::types::{MooseType, OpPosition, ParamType, Signature};

/// A built-in member function of a primitive type.
pub struct BuiltinMember {
    pub name: &'static str,
    pub sig: Signature,
}

/// A built-in global operator.
pub struct BuiltinOperator {
    pub symbol: &'static str,
    pub position: OpPosition,
    pub sig: Signature,
}

fn nullary(ret: MooseType) -> Signature {
    Signature::new(Vec::new(), ret)
}

fn parse_result(value: MooseType) -> MooseType {
    MooseType::Tuple(vec![value, MooseType::String])
}

/// Member signatures for a primitive receiver type.
///
/// Returns an empty list for types with no member scope (classes have
/// their own environments; Void/Nil/functions have no members).
pub fn member_signatures(recv: &MooseType) -> Vec<BuiltinMember> {
    match recv {
        MooseType::Integer => vec![
            BuiltinMember { name: "toBool", sig: nullary(MooseType::Bool) },
            BuiltinMember { name: "toFloat", sig: nullary(MooseType::Float) },
            BuiltinMember { name: "toString", sig: nullary(MooseType::String) },
        ],
        MooseType::Float => vec![
            BuiltinMember { name: "toInt", sig: nullary(MooseType::Integer) },
            BuiltinMember { name: "toString", sig: nullary(MooseType::String) },
        ],
        MooseType::Bool => vec![
            BuiltinMember { name: "toInt", sig: nullary(MooseType::Integer) },
            BuiltinMember { name: "toFloat", sig: nullary(MooseType::Float) },
            BuiltinMember { name: "toString", sig: nullary(MooseType::String) },
        ],
        MooseType::String => vec![
            BuiltinMember {
                name: "parseInt",
                sig: nullary(parse_result(MooseType::Integer)),
            },
            BuiltinMember {
                name: "parseFloat",
                sig: nullary(parse_result(MooseType::Float)),
            },
            BuiltinMember {
                name: "parseBool",
                sig: nullary(parse_result(MooseType::Bool)),
            },
        ],
        MooseType::List(_) => vec![BuiltinMember {
            name: "length",
            sig: nullary(MooseType::Integer),
        }],
        _ => Vec::new(),
    }
}

/// The global operator table: arithmetic and comparison for numerics,
/// logic for booleans, concatenation and equality for strings.
///
/// Logical operators are ordinary infix operators: both operands are
/// evaluated before dispatch, so there is no short-circuiting.
pub fn operator_signatures() -> Vec<BuiltinOperator> {
    let mut ops = Vec::new();

    for scalar in [MooseType::Integer, MooseType::Float] {
        let binary = |ret: MooseType| {
            Signature::new(
                vec![ParamType::new(scalar.clone()), ParamType::new(scalar.clone())],
                ret,
            )
        };
        for symbol in ["+", "-", "*", "/", "%"] {
            ops.push(BuiltinOperator {
                symbol,
                position: OpPosition::Infix,
                sig: binary(scalar.clone()),
            });
        }
        for symbol in ["==", "!=", "<", "<=", ">", ">="] {
            ops.push(BuiltinOperator {
                symbol,
                position: OpPosition::Infix,
                sig: binary(MooseType::Bool),
            });
        }
        ops.push(BuiltinOperator {
            symbol: "-",
            position: OpPosition::Prefix,
            sig: Signature::new(vec![ParamType::new(scalar.clone())], scalar.clone()),
        });
    }

    let bool_binary = Signature::new(
        vec![ParamType::new(MooseType::Bool), ParamType::new(MooseType::Bool)],
        MooseType::Bool,
    );
    for symbol in ["==", "!=", "&&", "||"] {
        ops.push(BuiltinOperator {
            symbol,
            position: OpPosition::Infix,
            sig: bool_binary.clone(),
        });
    }
    ops.push(BuiltinOperator {
        symbol: "!",
        position: OpPosition::Prefix,
        sig: Signature::new(vec![ParamType::new(MooseType::Bool)], MooseType::Bool),
    });

    let string_binary = |ret: MooseType| {
        Signature::new(
            vec![
                ParamType::new(MooseType::String),
                ParamType::new(MooseType::String),
            ],
            ret,
        )
    };
    ops.push(BuiltinOperator {
        symbol: "+",
        position: OpPosition::Infix,
        sig: string_binary(MooseType::String),
    });
    for symbol in ["==", "!="] {
        ops.push(BuiltinOperator {
            symbol,
            position: OpPosition::Infix,
            sig: string_binary(MooseType::Bool),
        });
    }

    ops
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_members_cover_conversions() {
        let members = member_signatures(&MooseType::Integer);
        let names: Vec<_> = members.iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["toBool", "toFloat", "toString"]);
    }

    #[test]
    fn string_parsers_return_value_error_pairs() {
        let members = member_signatures(&MooseType::String);
        let parse_int = members.iter().find(|m| m.name == "parseInt").unwrap();
        assert_eq!(
            parse_int.sig.ret,
            MooseType::Tuple(vec![MooseType::Integer, MooseType::String])
        );
    }

    #[test]
    fn operator_table_has_no_exact_duplicates() {
        let ops = operator_signatures();
        for (i, a) in ops.iter().enumerate() {
            for b in &ops[i + 1..] {
                assert!(
                    !(a.symbol == b.symbol
                        && a.position == b.position
                        && a.sig.params == b.sig.params),
                    "duplicate built-in operator {}",
                    a.symbol
                );
            }
        }
    }
}
