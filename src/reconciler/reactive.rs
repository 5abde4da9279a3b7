//! Reactive runtime for the reconciler, backed by `spark-signals`.
//!
//! Signals, memos and effects are the crate's own primitives; this module
//! only adds the ownership rules the reconciler relies on:
//!
//! - an effect created while another effect runs belongs to it and is
//!   destroyed when that effect re-runs
//! - an effect created inside [`Runtime::create_root`] belongs to the root
//!   and stops when the root's [`Disposer`] is disposed or dropped
//! - any other effect is kept alive by the [`Runtime`] itself
//!
//! Effects run synchronously: once when created and again right after a
//! signal they read is written.

use crate::event::{LogLevel, emit_log};
use spark_signals::{
    AnyReaction, EffectScope, derived, effect_scope, effect_sync, get_current_scope,
    on_scope_dispose, signal, with_context,
};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

pub use spark_signals::{Derived as Memo, Signal};

type Listener = Option<Weak<dyn AnyReaction>>;

/// Restores the active reaction (and optionally the active effect) on drop.
struct ListenerGuard {
    reaction: Listener,
    effect: Option<Listener>,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let reaction = self.reaction.take();
        let effect = self.effect.take();
        with_context(|ctx| {
            ctx.set_active_reaction(reaction);
            if let Some(effect) = effect {
                ctx.set_active_effect(effect);
            }
        });
    }
}

/// Run `f` with no listener, so its reads subscribe nothing. With
/// `detach_owner`, effects created by `f` also get no parent effect.
fn without_listener<R>(detach_owner: bool, f: impl FnOnce() -> R) -> R {
    let _guard = with_context(|ctx| ListenerGuard {
        reaction: ctx.set_active_reaction(None),
        effect: detach_owner.then(|| ctx.set_active_effect(None)),
    });
    f()
}

fn has_owner() -> bool {
    get_current_scope().is_some() || with_context(|ctx| ctx.get_active_effect().is_some())
}

/// Handle to the reactive runtime. Clones share the effects they keep alive.
#[derive(Clone, Default)]
pub struct Runtime {
    unowned: Rc<RefCell<Vec<Box<dyn FnOnce()>>>>,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("unowned_effects", &self.unowned.borrow().len())
            .finish()
    }
}

impl Runtime {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_signal<T: PartialEq + 'static>(&self, value: T) -> Signal<T> {
        signal(value)
    }

    /// Run `body` now and again whenever a signal it read changes.
    pub fn create_effect(&self, body: impl FnMut() + 'static) {
        let owned = has_owner();
        let stop = effect_sync(body);
        if !owned {
            self.unowned.borrow_mut().push(Box::new(stop));
        }
    }

    /// A cached derived value, recomputed lazily when its inputs change.
    /// Readers are only notified when the new value differs.
    pub fn create_memo<T>(&self, compute: impl Fn() -> T + 'static) -> Memo<T>
    where
        T: Clone + PartialEq + 'static,
    {
        derived(compute)
    }

    /// Run `f` in a new root detached from any running effect. Effects it
    /// creates live until the returned [`Disposer`] is disposed or dropped.
    pub fn create_root(&self, f: impl FnOnce()) -> Disposer {
        let scope = effect_scope(true);
        if scope.run(|| without_listener(true, f)).is_none() {
            emit_log(LogLevel::Error, "new reactive root was already stopped");
        }
        Disposer { scope }
    }

    /// Run `f` without subscribing the running effect to what it reads.
    pub fn untrack<R>(&self, f: impl FnOnce() -> R) -> R {
        without_listener(false, f)
    }

    /// Apply every write in `f` before any effect re-runs.
    pub fn batch<R>(&self, f: impl FnOnce() -> R) -> R {
        spark_signals::batch(f)
    }

    /// Run `f` when the enclosing root is disposed. Ignored outside a root.
    pub fn on_cleanup(&self, f: impl FnOnce() + 'static) {
        if get_current_scope().is_some() {
            on_scope_dispose(f);
        } else {
            emit_log(LogLevel::Debug, "on_cleanup outside a reactive root ignored");
        }
    }
}

/// Stops a root created by [`Runtime::create_root`].
#[must_use = "dropping a Disposer disposes its root"]
pub struct Disposer {
    scope: EffectScope,
}

impl fmt::Debug for Disposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposer")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl Disposer {
    /// Destroy every effect of the root and run its cleanups. Idempotent.
    pub fn dispose(&self) {
        self.scope.stop();
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        !self.scope.active()
    }
}
