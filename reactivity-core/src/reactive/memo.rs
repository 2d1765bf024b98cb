//! Memo Implementation
//!
//! A Memo is a derived value that skips recomputation when the write that
//! triggered it did not change anything.
//!
//! # How Memos Work
//!
//! 1. On creation, the memo runs its computation and stores the result in a
//!    signal, like a [`Computed`](super::Computed).
//!
//! 2. When a dependency is written outside a batch, the memo's observer
//!    receives the old and new value of that write. If they are equal, the
//!    run is skipped: no recomputation, no write, and everything reading the
//!    memo stays quiet.
//!
//! 3. Otherwise, or when there is no change pair to look at (batch flushes
//!    and manual triggers), the memo recomputes and writes its signal.
//!
//! # Limits
//!
//! The check looks at the *input* write, not at the computed output. A
//! batch flush carries no change pair, so a memo always recomputes after a
//! batch that touched one of its dependencies, even if every write in the
//! batch was redundant.

use std::fmt::{self, Debug};
use std::rc::Rc;

use super::computed::derive;
use super::effect::EffectOwner;
use super::signal::Signal;
use super::subscriber::{ObserverId, SignalId};
use crate::graph::NodeKind;

/// A derived value that ignores redundant direct writes to its inputs.
///
/// # Example
///
/// ```rust
/// use reactivity_core::{memo, signal};
///
/// let count = signal(1);
/// let reader = count.clone();
/// let squared = memo(move || reader.get() * reader.get());
///
/// count.set(1);
/// assert_eq!(squared.run_count(), 1);
///
/// count.set(3);
/// assert_eq!(squared.get(), 9);
/// assert_eq!(squared.run_count(), 2);
/// ```
pub struct Memo<T: 'static> {
    value: Signal<T>,
    owner: Rc<EffectOwner>,
}

impl<T> Memo<T>
where
    T: Clone + PartialEq + 'static,
{
    /// Create a new memo. The computation runs immediately.
    pub fn new<F>(compute: F) -> Self
    where
        F: Fn() -> T + 'static,
    {
        let (value, owner) = derive(NodeKind::Memo, compute);
        Self { value, owner }
    }
}

impl<T: 'static> Memo<T> {
    /// Get the current value, registering a dependency.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.value.get()
    }

    /// Read by reference, registering a dependency.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.value.with(f)
    }

    /// Get the current value without tracking.
    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.value.get_untracked()
    }

    /// ID of the signal holding the result.
    pub fn id(&self) -> SignalId {
        self.value.id()
    }

    /// ID of the observer that recomputes the value.
    pub fn observer_id(&self) -> ObserverId {
        self.owner.effect().id()
    }

    /// Number of times the computation has actually run.
    ///
    /// Skipped runs are not counted.
    pub fn run_count(&self) -> usize {
        self.owner.effect().run_count()
    }
}

impl<T: 'static> Clone for Memo<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            owner: Rc::clone(&self.owner),
        }
    }
}

impl<T> Debug for Memo<T>
where
    T: Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memo")
            .field("signal", &self.value)
            .field("observer", &self.observer_id())
            .finish()
    }
}

/// Create a memo. See [`Memo::new`].
pub fn memo<T, F>(compute: F) -> Memo<T>
where
    T: Clone + PartialEq + 'static,
    F: Fn() -> T + 'static,
{
    Memo::new(compute)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
