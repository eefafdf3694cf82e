//! Expression evaluation.

use std::rc::Rc;

use moose_ir::types::Resolution;
use moose_ir::{ExprId, ExprKind, MooseType, Name, OpPosition};

use crate::environment::EnvKind;
use crate::flow::{ambiguity, generic, nil_usage, not_found, out_of_bounds, EvalResult, Flow};
use crate::value::{InstanceValue, Value};

use super::stmt::resolve_index;
use super::Interpreter;

impl Interpreter<'_> {
    /// Evaluate an expression, pushing this node onto the trace of any
    /// panic unwinding through it.
    pub(crate) fn eval_expr(&mut self, expr_id: ExprId) -> EvalResult {
        match self.eval_expr_inner(expr_id) {
            Err(Flow::Panic(mut panic)) => {
                let expr = self.arena.expr(expr_id);
                panic.push_trace(self.expr_label(&expr.kind), expr.span);
                Err(Flow::Panic(panic))
            }
            other => other,
        }
    }

    fn expr_label(&self, kind: &ExprKind) -> String {
        match kind {
            ExprKind::Int(_) | ExprKind::Float(_) | ExprKind::Str(_) | ExprKind::Bool(_) => {
                "literal".to_string()
            }
            ExprKind::Nil => "nil literal".to_string(),
            ExprKind::Ident(name) => format!("identifier `{}`", self.interner.lookup(*name)),
            ExprKind::Tuple(_) => "tuple literal".to_string(),
            ExprKind::List(_) => "list literal".to_string(),
            ExprKind::Prefix { op, .. } => {
                format!("prefix operator `{}`", self.interner.lookup(*op))
            }
            ExprKind::Infix { op, .. } => format!("operator `{}`", self.interner.lookup(*op)),
            ExprKind::Postfix { op, .. } => {
                format!("postfix operator `{}`", self.interner.lookup(*op))
            }
            ExprKind::Call { callee, .. } => {
                format!("call to `{}`", self.interner.lookup(*callee))
            }
            ExprKind::Deref { .. } => "member access".to_string(),
            ExprKind::Index { .. } => "index expression".to_string(),
            ExprKind::Me => "`me`".to_string(),
            ExprKind::Is { .. } => "`is` expression".to_string(),
        }
    }

    fn eval_expr_inner(&mut self, expr_id: ExprId) -> EvalResult {
        let expr = self.arena.expr(expr_id).clone();
        match expr.kind {
            ExprKind::Int(n) => Ok(Value::int(n)),
            ExprKind::Float(bits) => Ok(Value::float(f64::from_bits(bits))),
            ExprKind::Str(name) => Ok(Value::string(self.interner.lookup(name))),
            ExprKind::Bool(b) => Ok(Value::bool(b)),
            ExprKind::Nil => Ok(Value::Nil),

            ExprKind::Ident(name) => self.env.lookup(name).ok_or_else(|| {
                not_found(format!("unknown name `{}`", self.interner.lookup(name)))
            }),

            ExprKind::Tuple(range) => {
                let elems = self.arena.exprs(range).to_vec();
                let mut items = Vec::with_capacity(elems.len());
                for elem in elems {
                    items.push(self.eval_expr(elem)?);
                }
                let types = items.iter().map(Value::type_of).collect();
                Ok(Value::tuple(types, items))
            }

            ExprKind::List(range) => {
                let elems = self.arena.exprs(range).to_vec();
                let mut items = Vec::with_capacity(elems.len());
                for elem in elems {
                    items.push(self.eval_expr(elem)?);
                }
                let elem_ty = match self.types.get(expr_id) {
                    Some(MooseType::List(elem)) => (**elem).clone(),
                    _ => items.first().map_or(MooseType::Nil, Value::type_of),
                };
                Ok(Value::list(elem_ty, items))
            }

            ExprKind::Prefix { op, operand } => {
                let operand = {
                    let mut guard = self.enter_open();
                    guard.eval_expr(operand)?
                };
                self.apply_operator(op, OpPosition::Prefix, vec![operand])
            }
            ExprKind::Infix { op, left, right } => {
                let (left, right) = {
                    let mut guard = self.enter_open();
                    let left = guard.eval_expr(left)?;
                    let right = guard.eval_expr(right)?;
                    (left, right)
                };
                self.apply_operator(op, OpPosition::Infix, vec![left, right])
            }
            ExprKind::Postfix { op, operand } => {
                let operand = {
                    let mut guard = self.enter_open();
                    guard.eval_expr(operand)?
                };
                self.apply_operator(op, OpPosition::Postfix, vec![operand])
            }

            ExprKind::Call { callee, args } => {
                let arg_ids = self.arena.exprs(args).to_vec();
                let mut arg_values = Vec::with_capacity(arg_ids.len());
                {
                    let mut guard = self.enter_open();
                    for arg in arg_ids {
                        arg_values.push(guard.eval_expr(arg)?);
                    }
                }
                if self.types.is_constructor(expr_id) {
                    self.construct(callee, arg_values)
                } else {
                    self.call_named(callee, arg_values)
                }
            }

            ExprKind::Deref { object, member } => self.eval_deref(object, member),

            ExprKind::Index { object, index } => {
                let object = self.eval_expr(object)?;
                let index = self.eval_expr(index)?;
                self.index_value(object, index)
            }

            ExprKind::Me => match self.env.nearest_instance() {
                Some((class_name, env)) => {
                    Ok(Value::Instance(Rc::new(InstanceValue { class_name, env })))
                }
                None => Err(generic("`me` used outside of a class")),
            },

            ExprKind::Is { value, name } => {
                let value = self.eval_expr(value)?;
                Ok(Value::bool(self.value_is(&value, name)))
            }
        }
    }

    /// `value is Name`: class instances test their lineage; any other
    /// value tests its type's printable form.
    fn value_is(&self, value: &Value, name: Name) -> bool {
        match value {
            Value::Instance(instance) => {
                if instance.class_name == name {
                    return true;
                }
                use moose_ir::types::ClassGraph;
                self.graph().is_ancestor(name, instance.class_name)
            }
            other => {
                let printable = other.type_of().display(self.interner).to_string();
                printable == self.interner.lookup(name)
            }
        }
    }

    fn eval_deref(&mut self, object: ExprId, member: ExprId) -> EvalResult {
        // The reserved `global` accessor: resolves the member against
        // the global environment, piercing any closed scope.
        if let ExprKind::Ident(name) = self.arena.expr(object).kind {
            if name == self.global_name && self.env.lookup(name).is_none() {
                let global = self.global.clone();
                let mut guard = self.enter_env(global);
                return guard.eval_member(member);
            }
        }

        let object = self.eval_expr(object)?;
        let member_env = match &object {
            Value::Instance(instance) => instance.env.clone(),
            Value::Nil => return Err(nil_usage()),
            other => match self.builtins.member_template(other) {
                Some(template) => {
                    // Stamp a member frame: the template's members plus
                    // the receiver bound under the reserved name. The
                    // frame is closed during the access, so the members
                    // must live in the frame itself.
                    let frame = template.duplicate(EnvKind::BuiltinMembers);
                    frame.define(self.builtins.receiver, object.clone());
                    frame
                }
                None => {
                    return Err(generic(format!(
                        "{} has no members",
                        other.type_of().display(self.interner)
                    )))
                }
            },
        };

        let mut guard = self.enter_closed(member_env);
        guard.eval_member(member)
    }

    /// Evaluate the member expression of a dereference inside the
    /// receiver's (closed) environment.
    fn eval_member(&mut self, member: ExprId) -> EvalResult {
        match self.arena.expr(member).kind {
            ExprKind::Ident(name) => self.env.lookup(name).ok_or_else(|| {
                not_found(format!("unknown member `{}`", self.interner.lookup(name)))
            }),
            _ => self.eval_expr(member),
        }
    }

    pub(crate) fn index_value(&mut self, object: Value, index: Value) -> EvalResult {
        match object {
            Value::List {
                items: Some(items), ..
            } => {
                let i = match index {
                    Value::Int(Some(i)) => i,
                    Value::Int(None) | Value::Nil => return Err(nil_usage()),
                    _ => return Err(generic("list index is not an Int")),
                };
                let items = items.borrow();
                match resolve_index(i, items.len()) {
                    Some(slot) => Ok(items[slot].clone()),
                    None => Err(out_of_bounds(items.len() as i64, i)),
                }
            }
            Value::List { items: None, .. } | Value::Nil => Err(nil_usage()),
            other => Err(generic(format!(
                "cannot index into {}",
                other.type_of().display(self.interner)
            ))),
        }
    }

    /// Resolve and invoke an operator in the current environment.
    fn apply_operator(&mut self, op: Name, position: OpPosition, args: Vec<Value>) -> EvalResult {
        let arg_types: Vec<MooseType> = args.iter().map(Value::type_of).collect();
        match self
            .env
            .resolve_operator(op, position, &arg_types, &self.graph())
        {
            Resolution::Found(callee) => self.call_value(&callee, args),
            Resolution::Ambiguous => Err(ambiguity(format!(
                "ambiguous use of {position} operator `{}` for {}",
                self.interner.lookup(op),
                self.render_args(&args)
            ))),
            Resolution::NotFound => Err(not_found(format!(
                "no {position} operator `{}` for {}",
                self.interner.lookup(op),
                self.render_args(&args)
            ))),
        }
    }

    /// Resolve and invoke a function in the current environment.
    fn call_named(&mut self, callee: Name, args: Vec<Value>) -> EvalResult {
        let arg_types: Vec<MooseType> = args.iter().map(Value::type_of).collect();
        match self.env.resolve_function(callee, &arg_types, &self.graph()) {
            Resolution::Found(value) => self.call_value(&value, args),
            Resolution::Ambiguous => Err(ambiguity(format!(
                "ambiguous call to `{}` with {}",
                self.interner.lookup(callee),
                self.render_args(&args)
            ))),
            Resolution::NotFound => Err(not_found(format!(
                "no function `{}` matching {}",
                self.interner.lookup(callee),
                self.render_args(&args)
            ))),
        }
    }
}
