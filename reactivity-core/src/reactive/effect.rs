//! Effect Implementation
//!
//! An Effect is a side-effecting computation that runs whenever its
//! dependencies change.
//!
//! # How Effects Work
//!
//! 1. When created, the effect runs its function immediately to establish
//!    initial dependencies.
//!
//! 2. When any dependency is written, the effect re-runs: immediately, or
//!    once at the end of the enclosing batch.
//!
//! 3. Each run records the signals it reads. Afterwards the effect stops
//!    listening to signals it read last time but not this time, so a branch
//!    that is no longer taken stops triggering it.
//!
//! # Lifetime
//!
//! Effects are not tied to their handle. Dropping an [`Effect`] leaves it
//! running; use [`Effect::disable`] to pause it or [`Effect::dispose`] to
//! remove it for good.

use tracing::{debug, warn};

use super::change::Change;
use super::runtime::Runtime;
use super::subscriber::{ObserverId, Subscriber};
use crate::error::{ReactiveError, Result};
use crate::graph::NodeKind;

/// Handle to a side-effecting computation.
///
/// # Example
///
/// ```rust
/// use reactivity_core::{effect, signal};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let count = signal(0);
/// let seen = Rc::new(Cell::new(0));
///
/// let (reader, sink) = (count.clone(), seen.clone());
/// let watcher = effect(move |_| sink.set(reader.get()));
///
/// count.set(5);
/// assert_eq!(seen.get(), 5);
///
/// watcher.disable();
/// count.set(6);
/// assert_eq!(seen.get(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Effect {
    id: ObserverId,
}

impl Effect {
    /// Create a new effect with the given function.
    ///
    /// The function runs immediately, with no change pair, to establish
    /// initial dependencies.
    pub fn new<F>(run: F) -> Self
    where
        F: Fn(Option<&Change>) + 'static,
    {
        Self::with_kind(NodeKind::Effect, run)
    }

    pub(crate) fn with_kind<F>(kind: NodeKind, run: F) -> Self
    where
        F: Fn(Option<&Change>) + 'static,
    {
        let effect = Self::register(kind, run);
        Runtime::run(effect.id, None);
        effect
    }

    /// Register the observer without running it.
    pub(crate) fn register<F>(kind: NodeKind, run: F) -> Self
    where
        F: Fn(Option<&Change>) + 'static,
    {
        let id = Runtime::register_observer(Subscriber::new(kind, run));
        debug!(observer = %id, ?kind, "effect created");
        Self { id }
    }

    /// Get the effect's unique ID.
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Stop receiving notifications.
    ///
    /// The effect unsubscribes from every signal it read during its latest
    /// run but remembers them, so [`Effect::enable`] can subscribe again.
    /// Also drops the effect from a pending batch flush.
    pub fn disable(&self) {
        if Runtime::set_enabled(self.id, false) {
            debug!(observer = %self.id, "effect disabled");
        } else {
            warn!(observer = %self.id, "disable called on a disposed effect");
        }
    }

    /// Resume receiving notifications from the remembered dependencies.
    pub fn enable(&self) {
        if Runtime::set_enabled(self.id, true) {
            debug!(observer = %self.id, "effect enabled");
        } else {
            warn!(observer = %self.id, "enable called on a disposed effect");
        }
    }

    /// Remove the effect from the runtime.
    ///
    /// After disposal, the effect will not run again and its callback is
    /// dropped. Disposing twice is a no-op.
    pub fn dispose(&self) {
        if let Some(subscriber) = Runtime::dispose(self.id) {
            debug!(observer = %self.id, "effect disposed");
            drop(subscriber);
        }
    }

    /// Run the effect now, with no change pair.
    ///
    /// Works on disabled effects too; their new dependencies are recorded
    /// but not subscribed.
    pub fn trigger(&self) -> Result<()> {
        if Runtime::run(self.id, None) {
            Ok(())
        } else {
            warn!(observer = %self.id, "trigger called on a disposed effect");
            Err(ReactiveError::Disposed(self.id))
        }
    }

    /// Check if the effect currently receives notifications.
    pub fn is_enabled(&self) -> bool {
        Runtime::is_enabled(self.id).unwrap_or(false)
    }

    /// Check if the effect has been disposed.
    pub fn is_disposed(&self) -> bool {
        Runtime::is_enabled(self.id).is_none()
    }

    /// Get the number of times the effect has run.
    pub fn run_count(&self) -> usize {
        Runtime::run_count(self.id).unwrap_or(0)
    }

    /// Get the number of dependencies recorded during the latest run.
    pub fn dependency_count(&self) -> usize {
        Runtime::dependencies_of(self.id).len()
    }
}

/// Create an effect. See [`Effect::new`].
pub fn effect<F>(run: F) -> Effect
where
    F: Fn(Option<&Change>) + 'static,
{
    Effect::new(run)
}

/// Disposes an observer when the last owner goes away.
///
/// Derived values hold one of these behind an `Rc` so the observer that
/// keeps them current lives exactly as long as their handles.
pub(crate) struct EffectOwner(Effect);

impl EffectOwner {
    pub(crate) fn new(effect: Effect) -> Self {
        Self(effect)
    }

    pub(crate) fn effect(&self) -> Effect {
        self.0
    }
}

impl Drop for EffectOwner {
    fn drop(&mut self) {
        self.0.dispose();
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::signal;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn effect_runs_on_creation() {
        let run_count = Rc::new(Cell::new(0));
        let run_count_clone = run_count.clone();

        let effect = Effect::new(move |change| {
            assert!(change.is_none());
            run_count_clone.set(run_count_clone.get() + 1);
        });

        // Effect should have run once on creation
        assert_eq!(run_count.get(), 1);
        assert_eq!(effect.run_count(), 1);
    }

    #[test]
    fn effect_runs_on_trigger() {
        let run_count = Rc::new(Cell::new(0));
        let run_count_clone = run_count.clone();

        let effect = Effect::new(move |_| {
            run_count_clone.set(run_count_clone.get() + 1);
        });

        effect.trigger().unwrap();
        assert_eq!(run_count.get(), 2);

        effect.trigger().unwrap();
        assert_eq!(run_count.get(), 3);
        assert_eq!(effect.run_count(), 3);
    }

    #[test]
    fn effect_does_not_run_after_disposal() {
        let count = signal(0);
        let run_count = Rc::new(Cell::new(0));
        let run_count_clone = run_count.clone();
        let reader = count.clone();

        let effect = Effect::new(move |_| {
            reader.get();
            run_count_clone.set(run_count_clone.get() + 1);
        });

        effect.dispose();
        assert!(effect.is_disposed());
        assert!(!effect.is_enabled());

        count.set(1);
        assert_eq!(run_count.get(), 1);

        let err = effect.trigger().unwrap_err();
        assert!(matches!(err, ReactiveError::Disposed(id) if id == effect.id()));

        // Second dispose and toggles are harmless
        effect.dispose();
        effect.enable();
        effect.disable();
        assert_eq!(count.observer_count(), 0);
    }

    #[test]
    fn disposal_drops_the_callback() {
        let token = Rc::new(());
        let held = token.clone();

        let effect = Effect::new(move |_| {
            let _ = &held;
        });
        assert_eq!(Rc::strong_count(&token), 2);

        effect.dispose();
        assert_eq!(Rc::strong_count(&token), 1);
    }

    #[test]
    fn disable_and_enable_toggle_subscription() {
        let count = signal(0);
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_clone = log.clone();
        let reader = count.clone();

        let effect = Effect::new(move |_| {
            log_clone.borrow_mut().push(reader.get());
        });

        effect.disable();
        assert!(!effect.is_enabled());
        assert_eq!(effect.dependency_count(), 1);
        count.set(1);
        assert_eq!(*log.borrow(), vec![0]);

        effect.enable();
        assert!(effect.is_enabled());
        count.set(2);
        assert_eq!(*log.borrow(), vec![0, 2]);
    }

    #[test]
    fn trigger_on_disabled_effect_does_not_subscribe() {
        let count = signal(0);
        let reader = count.clone();
        let effect = Effect::new(move |_| {
            reader.get();
        });

        effect.disable();
        effect.trigger().unwrap();

        assert_eq!(count.observer_count(), 0);
        assert_eq!(effect.dependency_count(), 1);

        effect.enable();
        assert_eq!(count.observer_count(), 1);
    }

    #[test]
    fn effect_tracks_dependency_count() {
        let a = signal(1);
        let b = signal(2);
        let (ra, rb) = (a.clone(), b.clone());

        let effect = Effect::new(move |_| {
            ra.get();
            rb.get();
            ra.get();
        });

        assert_eq!(effect.dependency_count(), 2);
    }

    #[test]
    fn owner_disposes_on_drop() {
        let effect = Effect::new(|_| {});
        let owner = Rc::new(EffectOwner::new(effect));
        let second = owner.clone();

        drop(owner);
        assert!(!effect.is_disposed());

        drop(second);
        assert!(effect.is_disposed());
    }
}
