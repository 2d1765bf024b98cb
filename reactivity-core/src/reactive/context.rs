//! Reactive Context
//!
//! The reactive context tracks which observer is currently running.
//! This enables automatic dependency tracking: when a signal is read,
//! the runtime registers the current observer as a dependent.
//!
//! # Implementation
//!
//! Each thread has a single active-observer slot. Entering a context swaps
//! the slot and remembers what it held before; the returned guard puts the
//! previous value back when dropped. Because the restore happens in `Drop`,
//! the slot stays correct when a callback panics, and contexts nest: an
//! observer that runs another observer synchronously gets its own tracking
//! back once the inner run finishes.

use std::cell::Cell;

use super::subscriber::ObserverId;

thread_local! {
    static ACTIVE_OBSERVER: Cell<Option<ObserverId>> = const { Cell::new(None) };
}

/// Guard that restores the previous active observer when dropped.
#[must_use = "the context is exited as soon as the guard is dropped"]
pub struct ReactiveContext {
    previous: Option<ObserverId>,
    entered: Option<ObserverId>,
}

impl ReactiveContext {
    /// Enter a reactive context for the given observer.
    ///
    /// While this context is active, any signals that are read will
    /// register the observer as a dependent.
    pub fn enter(observer: ObserverId) -> Self {
        Self::swap(Some(observer))
    }

    /// Enter a context in which no observer is active.
    ///
    /// Reads performed while the guard lives do not register dependencies.
    pub fn suspend() -> Self {
        Self::swap(None)
    }

    fn swap(entered: Option<ObserverId>) -> Self {
        let previous = ACTIVE_OBSERVER.with(|slot| slot.replace(entered));
        Self { previous, entered }
    }

    /// Check if there is an active observer.
    pub fn is_active() -> bool {
        Self::current_observer().is_some()
    }

    /// Get the currently running observer, if any.
    pub fn current_observer() -> Option<ObserverId> {
        ACTIVE_OBSERVER.with(Cell::get)
    }
}

impl Drop for ReactiveContext {
    fn drop(&mut self) {
        let _ = ACTIVE_OBSERVER.try_with(|slot| {
            let current = slot.replace(self.previous);
            debug_assert_eq!(
                current, self.entered,
                "ReactiveContext mismatch: expected {:?}, got {:?}",
                self.entered, current
            );
        });
    }
}

/// Run `f` without registering dependencies.
///
/// Signals read inside `f` do not subscribe whichever observer was active
/// before the call. The previous observer is restored afterwards, including
/// when `f` panics.
///
/// ```rust
/// use reactivity_core::{computed, signal, untrack};
///
/// let count = signal(0);
/// let count_reader = count.clone();
/// let doubled = computed(move || untrack(|| count_reader.get()) * 2);
///
/// count.set(1);
/// assert_eq!(doubled.get(), 0);
/// ```
pub fn untrack<R>(f: impl FnOnce() -> R) -> R {
    let _ctx = ReactiveContext::suspend();
    f()
}
