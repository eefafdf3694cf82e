//! Runtime values.
//!
//! Every scalar carries an `Option` payload: the language permits a
//! typed nil, so `Int(None)` is "an Int that is nil" and participates
//! in dispatch as an Integer. The bare `Nil` value is the untyped nil
//! literal before an assignment or parameter binding retypes it.
//!
//! Lists are shared and interior-mutable (indexed writes are visible
//! through every binding of the same list); tuples are immutable.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use moose_ir::{MooseType, Name, OpPosition, Signature, StmtId};

use crate::environment::SharedEnv;
use crate::flow::Panic;
use crate::interpreter::Interpreter;

/// Native implementation of a built-in function or operator.
pub type NativeFn = fn(&mut Interpreter<'_>, &[Value]) -> Result<Value, Panic>;

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    Int(Option<i64>),
    Float(Option<f64>),
    Bool(Option<bool>),
    Str(Option<Rc<String>>),
    /// The untyped nil literal.
    Nil,
    /// The unit result of statements and Void functions.
    Void,
    Tuple {
        types: Vec<MooseType>,
        items: Option<Vec<Value>>,
    },
    List {
        elem: MooseType,
        items: Option<Rc<RefCell<Vec<Value>>>>,
    },
    Function(Rc<FunctionValue>),
    BuiltinFunction(Rc<BuiltinFunctionValue>),
    Operator(Rc<OperatorValue>),
    BuiltinOperator(Rc<BuiltinOperatorValue>),
    Instance(Rc<InstanceValue>),
}

/// A user-defined function: signature, parameter names, body, and the
/// captured environment.
pub struct FunctionValue {
    pub name: Name,
    pub sig: Signature,
    pub param_names: Vec<Name>,
    /// A `Block` statement in the program arena.
    pub body: StmtId,
    pub closure: SharedEnv,
}

/// A user-defined operator; like a function plus its position.
pub struct OperatorValue {
    pub op: Name,
    pub position: OpPosition,
    pub sig: Signature,
    pub param_names: Vec<Name>,
    pub body: StmtId,
    pub closure: SharedEnv,
}

/// A built-in function with a native closure.
pub struct BuiltinFunctionValue {
    pub name: Name,
    pub sig: Signature,
    pub native: NativeFn,
}

/// A built-in operator with a native closure.
pub struct BuiltinOperatorValue {
    pub op: Name,
    pub position: OpPosition,
    pub sig: Signature,
    pub native: NativeFn,
}

/// A class instance: its class name and its own environment.
pub struct InstanceValue {
    pub class_name: Name,
    pub env: SharedEnv,
}

impl Value {
    pub fn int(n: i64) -> Self {
        Value::Int(Some(n))
    }

    pub fn float(f: f64) -> Self {
        Value::Float(Some(f))
    }

    pub fn bool(b: bool) -> Self {
        Value::Bool(Some(b))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Some(Rc::new(s.into())))
    }

    pub fn list(elem: MooseType, items: Vec<Value>) -> Self {
        Value::List {
            elem,
            items: Some(Rc::new(RefCell::new(items))),
        }
    }

    pub fn tuple(types: Vec<MooseType>, items: Vec<Value>) -> Self {
        Value::Tuple {
            types,
            items: Some(items),
        }
    }

    /// The runtime type, as captured for dispatch.
    pub fn type_of(&self) -> MooseType {
        match self {
            Value::Int(_) => MooseType::Integer,
            Value::Float(_) => MooseType::Float,
            Value::Bool(_) => MooseType::Bool,
            Value::Str(_) => MooseType::String,
            Value::Nil => MooseType::Nil,
            Value::Void => MooseType::Void,
            Value::Tuple { types, .. } => MooseType::Tuple(types.clone()),
            Value::List { elem, .. } => MooseType::List(Box::new(elem.clone())),
            Value::Function(f) => f.sig.as_type(),
            Value::BuiltinFunction(f) => f.sig.as_type(),
            Value::Operator(o) => o.sig.as_type(),
            Value::BuiltinOperator(o) => o.sig.as_type(),
            Value::Instance(inst) => MooseType::Class(inst.class_name),
        }
    }

    /// Whether the value slot is nil (typed or untyped).
    pub fn is_nil(&self) -> bool {
        match self {
            Value::Int(slot) => slot.is_none(),
            Value::Float(slot) => slot.is_none(),
            Value::Bool(slot) => slot.is_none(),
            Value::Str(slot) => slot.is_none(),
            Value::Nil => true,
            Value::List { items, .. } => items.is_none(),
            Value::Tuple { items, .. } => items.is_none(),
            _ => false,
        }
    }

    /// Retype an untyped nil to the declared type.
    ///
    /// Any other value passes through unchanged. Tuples become a tuple
    /// of nil components; class-typed nils stay the bare `Nil` value.
    #[must_use]
    pub fn retype_nil(self, ty: &MooseType) -> Value {
        if !matches!(self, Value::Nil) {
            return self;
        }
        Value::nil_of(ty)
    }

    /// A nil value of the given declared type.
    pub fn nil_of(ty: &MooseType) -> Value {
        match ty {
            MooseType::Integer => Value::Int(None),
            MooseType::Float => Value::Float(None),
            MooseType::Bool => Value::Bool(None),
            MooseType::String => Value::Str(None),
            MooseType::List(elem) => Value::List {
                elem: (**elem).clone(),
                items: None,
            },
            MooseType::Tuple(types) => {
                let items = types.iter().map(Value::nil_of).collect();
                Value::Tuple {
                    types: types.clone(),
                    items: Some(items),
                }
            }
            _ => Value::Nil,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Nil, Value::Nil) | (Value::Void, Value::Void) => true,
            (
                Value::Tuple { items: a, .. },
                Value::Tuple { items: b, .. },
            ) => a == b,
            (Value::List { items: a, .. }, Value::List { items: b, .. }) => match (a, b) {
                (Some(a), Some(b)) => *a.borrow() == *b.borrow(),
                (None, None) => true,
                _ => false,
            },
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Operator(a), Value::Operator(b)) => Rc::ptr_eq(a, b),
            (Value::BuiltinFunction(a), Value::BuiltinFunction(b)) => Rc::ptr_eq(a, b),
            (Value::BuiltinOperator(a), Value::BuiltinOperator(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(Some(n)) => write!(f, "Int({n})"),
            Value::Int(None) => write!(f, "Int(nil)"),
            Value::Float(Some(x)) => write!(f, "Float({x:?})"),
            Value::Float(None) => write!(f, "Float(nil)"),
            Value::Bool(Some(b)) => write!(f, "Bool({b})"),
            Value::Bool(None) => write!(f, "Bool(nil)"),
            Value::Str(Some(s)) => write!(f, "Str({s:?})"),
            Value::Str(None) => write!(f, "Str(nil)"),
            Value::Nil => write!(f, "Nil"),
            Value::Void => write!(f, "Void"),
            Value::Tuple { items: Some(items), .. } => f.debug_tuple("Tuple").field(items).finish(),
            Value::Tuple { items: None, .. } => write!(f, "Tuple(nil)"),
            Value::List { items: Some(items), .. } => {
                f.debug_tuple("List").field(&*items.borrow()).finish()
            }
            Value::List { items: None, .. } => write!(f, "List(nil)"),
            Value::Function(func) => write!(f, "Function(#{})", func.name.raw()),
            Value::BuiltinFunction(func) => write!(f, "BuiltinFunction(#{})", func.name.raw()),
            Value::Operator(op) => write!(f, "Operator(#{})", op.op.raw()),
            Value::BuiltinOperator(op) => write!(f, "BuiltinOperator(#{})", op.op.raw()),
            Value::Instance(inst) => write!(f, "Instance(#{})", inst.class_name.raw()),
        }
    }
}

impl fmt::Display for Value {
    /// The printable form: scalars render their payload, nil slots
    /// render as `nil`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(Some(n)) => write!(f, "{n}"),
            Value::Float(Some(x)) => write!(f, "{x:?}"),
            Value::Bool(Some(b)) => write!(f, "{b}"),
            Value::Str(Some(s)) => write!(f, "{s}"),
            Value::Int(None)
            | Value::Float(None)
            | Value::Bool(None)
            | Value::Str(None)
            | Value::Nil => write!(f, "nil"),
            Value::Void => write!(f, "void"),
            Value::Tuple { items: Some(items), .. } => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Value::Tuple { items: None, .. } | Value::List { items: None, .. } => {
                write!(f, "nil")
            }
            Value::List { items: Some(items), .. } => {
                write!(f, "[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Function(_) | Value::BuiltinFunction(_) => write!(f, "func"),
            Value::Operator(_) | Value::BuiltinOperator(_) => write!(f, "operator"),
            Value::Instance(_) => write!(f, "instance"),
        }
    }
}

/// The declared parameter list of a callable value, for dispatch.
///
/// Non-callable values have no parameters and never match a call.
pub(crate) fn callable_params(value: &Value) -> &[moose_ir::types::ParamType] {
    match value {
        Value::Function(f) => &f.sig.params,
        Value::BuiltinFunction(f) => &f.sig.params,
        Value::Operator(o) => &o.sig.params,
        Value::BuiltinOperator(o) => &o.sig.params,
        _ => &[],
    }
}
