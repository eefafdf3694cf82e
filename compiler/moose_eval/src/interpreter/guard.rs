//! RAII guards for environment management.
//!
//! Every environment mutation the evaluator performs — switching the
//! current environment, pushing a child frame, toggling the `closed`
//! flag — must be released on all exit paths, including `Return`
//! signals and panics. The [`EnvGuard`] restores everything on drop
//! (including during Rust unwinding) and derefs to the interpreter so
//! evaluation continues through it transparently.

use std::ops::{Deref, DerefMut};

use crate::environment::{EnvKind, SharedEnv};

use super::Interpreter;

/// Guard restoring the interpreter's environment state on drop.
pub(crate) struct EnvGuard<'g, 'a> {
    interp: &'g mut Interpreter<'a>,
    /// The environment to restore as current, if it was switched.
    saved_env: Option<SharedEnv>,
    /// An environment whose `closed` flag was changed, and its prior
    /// value.
    toggled: Option<(SharedEnv, bool)>,
}

impl Drop for EnvGuard<'_, '_> {
    fn drop(&mut self) {
        if let Some((env, prior)) = self.toggled.take() {
            env.set_closed(prior);
        }
        if let Some(saved) = self.saved_env.take() {
            self.interp.env = saved;
        }
    }
}

impl<'a> Deref for EnvGuard<'_, 'a> {
    type Target = Interpreter<'a>;

    fn deref(&self) -> &Self::Target {
        self.interp
    }
}

impl DerefMut for EnvGuard<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interp
    }
}

impl<'a> Interpreter<'a> {
    /// Switch the current environment.
    pub(crate) fn enter_env(&mut self, env: SharedEnv) -> EnvGuard<'_, 'a> {
        let saved = std::mem::replace(&mut self.env, env);
        EnvGuard {
            interp: self,
            saved_env: Some(saved),
            toggled: None,
        }
    }

    /// Switch into `env` as a closed member environment.
    pub(crate) fn enter_closed(&mut self, env: SharedEnv) -> EnvGuard<'_, 'a> {
        let prior = env.closed();
        env.set_closed(true);
        let toggled = Some((env.clone(), prior));
        let saved = std::mem::replace(&mut self.env, env);
        EnvGuard {
            interp: self,
            saved_env: Some(saved),
            toggled,
        }
    }

    /// Clear the current environment's `closed` flag for the guard's
    /// lifetime. Argument subexpressions must see enclosing scopes
    /// even mid-member-access.
    pub(crate) fn enter_open(&mut self) -> EnvGuard<'_, 'a> {
        let env = self.env.clone();
        let prior = env.closed();
        env.set_closed(false);
        EnvGuard {
            interp: self,
            saved_env: None,
            toggled: Some((env, prior)),
        }
    }

    /// Switch into `env` with its `closed` flag cleared (built-in call
    /// frames).
    pub(crate) fn enter_env_open(&mut self, env: SharedEnv) -> EnvGuard<'_, 'a> {
        let prior = env.closed();
        env.set_closed(false);
        let toggled = Some((env.clone(), prior));
        let saved = std::mem::replace(&mut self.env, env);
        EnvGuard {
            interp: self,
            saved_env: Some(saved),
            toggled,
        }
    }

    /// Push a fresh child of the current environment.
    pub(crate) fn enter_child(&mut self, kind: EnvKind) -> EnvGuard<'_, 'a> {
        let child = SharedEnv::child(&self.env, kind);
        self.enter_env(child)
    }

    /// Enter a user call: activate the callee's captured closure with
    /// its `closed` flag cleared, and push a fresh frame under it.
    pub(crate) fn enter_call_frame(&mut self, closure: &SharedEnv) -> EnvGuard<'_, 'a> {
        let prior = closure.closed();
        closure.set_closed(false);
        let frame = SharedEnv::child(closure, EnvKind::Function);
        let saved = std::mem::replace(&mut self.env, frame);
        EnvGuard {
            interp: self,
            saved_env: Some(saved),
            toggled: Some((closure.clone(), prior)),
        }
    }
}

#[cfg(test)]
mod tests {
    use moose_ir::{Arena, StringInterner, TypeTable};

    use crate::environment::EnvKind;
    use crate::interpreter::Interpreter;

    #[test]
    fn guard_restores_on_normal_exit() {
        let interner = StringInterner::new();
        let arena = Arena::new();
        let types = TypeTable::new();
        let mut interp = Interpreter::new(&interner, &arena, &types);

        let before = interp.env.clone();
        {
            let guard = interp.enter_child(EnvKind::Block);
            assert!(!guard.env.ptr_eq(&before));
        }
        assert!(interp.env.ptr_eq(&before));
    }

    #[test]
    fn guard_restores_on_unwind() {
        use std::panic::{catch_unwind, AssertUnwindSafe};

        let interner = StringInterner::new();
        let arena = Arena::new();
        let types = TypeTable::new();
        let mut interp = Interpreter::new(&interner, &arena, &types);

        let before = interp.env.clone();
        let result = catch_unwind(AssertUnwindSafe(|| {
            let _guard = interp.enter_child(EnvKind::Block);
            panic!("test panic");
        }));
        assert!(result.is_err());
        assert!(interp.env.ptr_eq(&before));
    }

    #[test]
    fn closed_flag_is_restored_lifo() {
        let interner = StringInterner::new();
        let arena = Arena::new();
        let types = TypeTable::new();
        let mut interp = Interpreter::new(&interner, &arena, &types);

        let member_env = crate::environment::SharedEnv::child(
            &interp.global_env().clone(),
            EnvKind::Block,
        );
        {
            let mut outer = interp.enter_closed(member_env.clone());
            assert!(member_env.closed());
            {
                let inner = outer.enter_open();
                assert!(!member_env.closed());
                drop(inner);
            }
            assert!(member_env.closed());
        }
        assert!(!member_env.closed());
    }

    #[test]
    fn call_frame_clears_and_restores_closure_flag() {
        let interner = StringInterner::new();
        let arena = Arena::new();
        let types = TypeTable::new();
        let mut interp = Interpreter::new(&interner, &arena, &types);

        let closure = crate::environment::SharedEnv::child(
            &interp.global_env().clone(),
            EnvKind::Function,
        );
        closure.set_closed(true);
        {
            let frame = interp.enter_call_frame(&closure);
            assert!(!closure.closed());
            assert!(frame.env.parent().unwrap().ptr_eq(&closure));
        }
        assert!(closure.closed());
    }
}
