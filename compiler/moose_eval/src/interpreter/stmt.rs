//! Statement evaluation and assignment-target dispatch.

use moose_ir::{ExprId, ExprKind, MooseType, StmtId, StmtKind};

use crate::environment::EnvKind;
use crate::flow::{generic, nil_usage, out_of_bounds, EvalResult, Flow};
use crate::value::Value;

use super::Interpreter;

/// Convert a signed index to a slot, counting negative indices from
/// the end.
pub(crate) fn resolve_index(index: i64, len: usize) -> Option<usize> {
    if index >= 0 {
        let idx = usize::try_from(index).ok()?;
        (idx < len).then_some(idx)
    } else {
        let back = index.checked_neg().and_then(|p| usize::try_from(p).ok())?;
        (back <= len).then(|| len - back)
    }
}

fn stmt_label(kind: &StmtKind) -> &'static str {
    match kind {
        StmtKind::Expr(_) => "expression statement",
        StmtKind::Assign { .. } => "assignment",
        StmtKind::Return(_) => "return statement",
        StmtKind::Block(_) => "block",
        StmtKind::If { .. } => "if statement",
        StmtKind::Function(_) => "function definition",
        StmtKind::Operation(_) => "operator definition",
        StmtKind::Class(_) => "class definition",
    }
}

impl Interpreter<'_> {
    /// Evaluate a statement, pushing this node onto the trace of any
    /// panic unwinding through it.
    pub(crate) fn eval_stmt(&mut self, stmt_id: StmtId) -> EvalResult {
        match self.eval_stmt_inner(stmt_id) {
            Err(Flow::Panic(mut panic)) => {
                let stmt = self.arena.stmt(stmt_id);
                panic.push_trace(stmt_label(&stmt.kind), stmt.span);
                Err(Flow::Panic(panic))
            }
            other => other,
        }
    }

    fn eval_stmt_inner(&mut self, stmt_id: StmtId) -> EvalResult {
        let stmt = self.arena.stmt(stmt_id).clone();
        match stmt.kind {
            StmtKind::Expr(expr) => {
                self.eval_expr(expr)?;
                Ok(Value::Void)
            }

            StmtKind::Assign {
                target, ty, value, ..
            } => {
                let evaluated = self.eval_expr(value)?;
                let hint = ty.or_else(|| self.types.get(value).cloned());
                self.assign_target(target, evaluated, hint.as_ref())?;
                Ok(Value::Void)
            }

            StmtKind::Return(value) => {
                let result = match value {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Void,
                };
                Err(Flow::Return(result))
            }

            StmtKind::Block(range) => {
                let stmts = self.arena.stmts(range).to_vec();
                let mut guard = self.enter_child(EnvKind::Block);
                for s in stmts {
                    guard.eval_stmt(s)?;
                }
                Ok(Value::Void)
            }

            StmtKind::If {
                cond,
                then_block,
                else_block,
            } => {
                match self.eval_expr(cond)? {
                    Value::Bool(Some(true)) => self.eval_stmt(then_block)?,
                    Value::Bool(Some(false)) => match else_block {
                        Some(else_block) => self.eval_stmt(else_block)?,
                        None => Value::Void,
                    },
                    Value::Bool(None) | Value::Nil => return Err(nil_usage()),
                    _ => return Err(generic("`if` condition is not a Bool")),
                };
                Ok(Value::Void)
            }

            // At global scope these are no-ops: the global-exploration
            // pass already registered them.
            StmtKind::Function(id) => {
                if !self.env.ptr_eq(&self.global) {
                    let def = self.arena.function(id);
                    let value = self.function_value(def, self.env.clone());
                    self.env.define_function(def.name, value);
                }
                Ok(Value::Void)
            }
            StmtKind::Operation(id) => {
                if !self.env.ptr_eq(&self.global) {
                    let def = self.arena.operation(id);
                    let value = self.operator_value(def, self.env.clone());
                    self.env.define_operator(def.op, def.position, value);
                }
                Ok(Value::Void)
            }
            StmtKind::Class(id) => {
                if !self.env.ptr_eq(&self.global) {
                    let def = self.arena.class(id).clone();
                    let current = self.env.clone();
                    self.register_class(&def, &current)?;
                }
                Ok(Value::Void)
            }
        }
    }

    /// Assign an evaluated value into a target expression.
    ///
    /// `hint` is the declared or checked type used to retype an
    /// untyped nil at the moment it lands in a binding.
    pub(crate) fn assign_target(
        &mut self,
        target: ExprId,
        value: Value,
        hint: Option<&MooseType>,
    ) -> Result<(), Flow> {
        let target_expr = self.arena.expr(target).clone();
        match target_expr.kind {
            ExprKind::Ident(name) => {
                let value = match hint {
                    Some(ty) => value.retype_nil(ty),
                    None => value,
                };
                self.env.update(name, value, true);
                Ok(())
            }

            ExprKind::Tuple(range) => {
                let elems = self.arena.exprs(range).to_vec();
                match value {
                    Value::Tuple {
                        types,
                        items: Some(items),
                    } => {
                        if items.len() != elems.len() {
                            return Err(generic(format!(
                                "cannot destructure a {}-tuple into {} targets",
                                items.len(),
                                elems.len()
                            )));
                        }
                        let hints: Option<&Vec<MooseType>> = match hint {
                            Some(MooseType::Tuple(h)) if h.len() == elems.len() => Some(h),
                            _ => None,
                        };
                        for (i, (elem, item)) in elems.iter().zip(items).enumerate() {
                            let component_hint = hints.map_or(&types[i], |h| &h[i]);
                            self.assign_target(*elem, item, Some(component_hint))?;
                        }
                        Ok(())
                    }
                    Value::Tuple { items: None, .. } | Value::Nil => Err(nil_usage()),
                    other => Err(generic(format!(
                        "cannot destructure a value of type {}",
                        other.type_of().display(self.interner)
                    ))),
                }
            }

            ExprKind::Index { object, index } => {
                let object = self.eval_expr(object)?;
                let index = self.eval_expr(index)?;
                match object {
                    Value::List {
                        elem,
                        items: Some(items),
                    } => {
                        let i = match index {
                            Value::Int(Some(i)) => i,
                            Value::Int(None) | Value::Nil => return Err(nil_usage()),
                            _ => return Err(generic("list index is not an Int")),
                        };
                        let len = items.borrow().len();
                        let Some(slot) = resolve_index(i, len) else {
                            return Err(out_of_bounds(len as i64, i));
                        };
                        items.borrow_mut()[slot] = value.retype_nil(&elem);
                        Ok(())
                    }
                    Value::List { items: None, .. } | Value::Nil => Err(nil_usage()),
                    other => Err(generic(format!(
                        "cannot assign into an index of {}",
                        other.type_of().display(self.interner)
                    ))),
                }
            }

            ExprKind::Deref { object, member } => {
                let object = self.eval_expr(object)?;
                match object {
                    Value::Instance(instance) => {
                        let member_hint = self.types.get(member).cloned();
                        let env = instance.env.clone();
                        let mut guard = self.enter_closed(env);
                        guard.assign_target(member, value, member_hint.as_ref())
                    }
                    obj if obj.is_nil() => Err(nil_usage()),
                    other => Err(generic(format!(
                        "cannot assign to a member of {}",
                        other.type_of().display(self.interner)
                    ))),
                }
            }

            _ => Err(generic("invalid assignment target")),
        }
    }
}
