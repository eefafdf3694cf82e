//! Class flattening.
//!
//! Resolves single-inheritance chains: after this pass every class
//! has a cleared superclass pointer, a property list equal to the
//! superclass's properties followed by its own, and member tables
//! that union the superclass's with its own. Overrides must preserve
//! the parent's return type exactly; property names may not shadow
//! inherited ones; inheritance cycles are detected and reported.

use moose_diagnostic::{Diagnostic, ErrorCode};
use moose_ir::types::params_equal;
use moose_ir::StringInterner;

use crate::scope::{SharedClassInfo, SharedScope};

/// Flatten every class registered in the global scope.
pub fn flatten_classes(
    global: &SharedScope,
    interner: &StringInterner,
    diags: &mut Vec<Diagnostic>,
) {
    for name in global.class_names() {
        if let Some(info) = global.class(name) {
            flat(&info, global, interner, diags);
        }
    }
}

/// Flatten one class, flattening its superclass first.
///
/// Idempotent after the first call; re-entry during a cycle is caught
/// by the `visiting` mark.
pub(crate) fn flat(
    info: &SharedClassInfo,
    registry: &SharedScope,
    interner: &StringInterner,
    diags: &mut Vec<Diagnostic>,
) {
    {
        let node = info.borrow();
        if node.flattened {
            return;
        }
        if node.visiting {
            diags.push(
                Diagnostic::error(
                    ErrorCode::E2006,
                    format!(
                        "inheritance cycle through class `{}`",
                        interner.lookup(node.name)
                    ),
                )
                .with_span(node.span),
            );
            return;
        }
    }
    info.borrow_mut().visiting = true;

    let superclass = info.borrow().superclass;
    if let Some(sup_name) = superclass {
        match registry.class(sup_name) {
            None => {
                let node = info.borrow();
                diags.push(
                    Diagnostic::error(
                        ErrorCode::E2002,
                        format!(
                            "unknown superclass `{}` of class `{}`",
                            interner.lookup(sup_name),
                            interner.lookup(node.name)
                        ),
                    )
                    .with_span(node.span),
                );
            }
            Some(sup) => {
                flat(&sup, registry, interner, diags);
                merge_superclass(info, &sup, interner, diags);
            }
        }
    }

    let mut node = info.borrow_mut();
    if node.lineage.is_empty() {
        node.lineage = vec![node.name];
    }
    node.superclass = None;
    node.flattened = true;
    node.visiting = false;
}

/// Merge the flattened superclass's tables into the subclass.
fn merge_superclass(
    info: &SharedClassInfo,
    sup: &SharedClassInfo,
    interner: &StringInterner,
    diags: &mut Vec<Diagnostic>,
) {
    // A cycle leaves the superclass unflattened; merging would then
    // observe partial state, so bail and let the cycle error stand.
    if !sup.borrow().flattened {
        return;
    }

    let sup_props = sup.borrow().properties.clone();
    let sup_scope = sup.borrow().scope.clone();
    let scope = info.borrow().scope.clone();

    // Property conflicts, then prepend inherited properties in order.
    {
        let mut node = info.borrow_mut();
        for (own_name, _) in &node.properties {
            if sup_props.iter().any(|(n, _)| n == own_name) {
                diags.push(
                    Diagnostic::error(
                        ErrorCode::E2007,
                        format!(
                            "property `{}` of class `{}` is already declared in a superclass",
                            interner.lookup(*own_name),
                            interner.lookup(node.name)
                        ),
                    )
                    .with_span(node.span),
                );
            }
        }
        let mut merged = sup_props.clone();
        merged.extend(node.properties.iter().cloned());
        node.properties = merged;
    }

    // Inherited property slots.
    for (name, record) in sup_scope.all_vars() {
        if scope.var_in_current(name).is_none() {
            scope.define_var(name, record.ty, record.mutable);
        }
    }

    // Methods: an override (equal parameter types) must keep the
    // parent's return type; otherwise the parent's overload is added.
    for (name, sup_sigs) in sup_scope.all_functions() {
        for sup_sig in sup_sigs {
            let own = scope.function_overloads(name);
            if let Some(own_sig) = own.iter().find(|s| params_equal(&s.params, &sup_sig.params)) {
                if own_sig.ret != sup_sig.ret {
                    let node = info.borrow();
                    diags.push(
                        Diagnostic::error(
                            ErrorCode::E2008,
                            format!(
                                "override of `{}` in class `{}` changes the return type",
                                interner.lookup(name),
                                interner.lookup(node.name)
                            ),
                        )
                        .with_span(node.span),
                    );
                }
            } else {
                let _ = scope.define_function(name, sup_sig);
            }
        }
    }

    for ((op, position), sup_sigs) in sup_scope.all_operators() {
        for sup_sig in sup_sigs {
            // Same override rule as methods; define_operator refuses
            // equal parameter lists, so overridden entries are skipped.
            let _ = scope.define_operator(op, position, sup_sig);
        }
    }

    let sup_lineage = sup.borrow().lineage.clone();
    let mut node = info.borrow_mut();
    let mut lineage = vec![node.name];
    lineage.extend(sup_lineage);
    node.lineage = lineage;
}
