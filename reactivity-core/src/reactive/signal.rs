//! Signal Implementation
//!
//! A Signal is the fundamental reactive primitive. It holds a value and
//! tracks which observers depend on it.
//!
//! # How Signals Work
//!
//! 1. When a signal is read while an observer is running, the runtime
//!    records an edge between the two.
//!
//! 2. Every write replaces the value, even if it is equal to the old one,
//!    and notifies all observers.
//!
//! 3. Outside a batch, observers run before `set` returns and receive the
//!    old and new value. Inside a batch they are queued instead.
//!
//! # Ownership
//!
//! A `Signal<T>` is a cheap handle. Clones share one value cell. When the
//! last handle is dropped, the runtime forgets the signal and every edge
//! that pointed at it.

use std::cell::RefCell;
use std::fmt::{self, Debug};
use std::rc::Rc;

use tracing::trace;

use super::change::Change;
use super::runtime::Runtime;
use super::subscriber::SignalId;

struct SignalInner<T> {
    id: SignalId,
    value: RefCell<T>,
}

impl<T> Drop for SignalInner<T> {
    fn drop(&mut self) {
        Runtime::unregister_signal(self.id);
    }
}

/// A reactive signal holding a value of type T.
///
/// # Example
///
/// ```rust
/// use reactivity_core::Signal;
///
/// let count = Signal::new(0);
///
/// // Read the value
/// assert_eq!(count.get(), 0);
///
/// // Update the value (notifies observers), getting the old one back
/// assert_eq!(count.set(5), 0);
/// ```
pub struct Signal<T: 'static> {
    inner: Rc<SignalInner<T>>,
}

impl<T: 'static> Signal<T> {
    /// Create a new signal with the given initial value.
    pub fn new(value: T) -> Self {
        let id = SignalId::next();
        Runtime::register_signal(id);
        trace!(signal = %id, "signal created");

        Self {
            inner: Rc::new(SignalInner {
                id,
                value: RefCell::new(value),
            }),
        }
    }

    /// Get the signal's unique ID.
    pub fn id(&self) -> SignalId {
        self.inner.id
    }

    /// Get the current value.
    ///
    /// If called while an observer runs, this also registers the observer as
    /// a dependent.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        Runtime::track(self.inner.id);
        self.inner.value.borrow().clone()
    }

    /// Read by reference without cloning. Still registers the dependency.
    ///
    /// # Panics
    ///
    /// Panics if `f` writes this same signal.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        Runtime::track(self.inner.id);
        f(&*self.inner.value.borrow())
    }

    /// Get the current value without tracking dependencies.
    ///
    /// Use this when you need to read the value without establishing
    /// a reactive dependency.
    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.inner.value.borrow().clone()
    }

    /// Read by reference without tracking.
    pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.inner.value.borrow())
    }

    /// Get the number of subscribed observers.
    pub fn observer_count(&self) -> usize {
        Runtime::observers_of(self.inner.id).len()
    }
}

impl<T> Signal<T>
where
    T: Clone + PartialEq + 'static,
{
    /// Replace the value and notify observers. Returns the previous value.
    ///
    /// No equality check guards the write: storing an equal value still
    /// notifies every observer. Observers that run now receive a [`Change`]
    /// reporting whether the values were equal.
    ///
    /// # Panics
    ///
    /// Panics if called from inside [`Signal::with`] on the same signal.
    pub fn set(&self, value: T) -> T {
        let previous = self.inner.value.replace(value);
        trace!(signal = %self.inner.id, "signal written");

        Runtime::notify(self.inner.id, || {
            Change::new(self.inner.id, previous.clone(), self.get_untracked())
        });

        previous
    }

    /// Update the value using a function of the current one.
    ///
    /// The read is untracked; the write goes through [`Signal::set`].
    pub fn update<F>(&self, f: F) -> T
    where
        F: FnOnce(&T) -> T,
    {
        let next = self.with_untracked(f);
        self.set(next)
    }
}

impl<T: 'static> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Debug for Signal<T>
where
    T: Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.inner.id)
            .field("value", &*self.inner.value.borrow())
            .field("observer_count", &self.observer_count())
            .finish()
    }
}

/// Create a signal holding `initial`.
pub fn signal<T: 'static>(initial: T) -> Signal<T> {
    Signal::new(initial)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::effect;
    use std::cell::Cell;

    #[test]
    fn signal_get_and_set() {
        let signal = Signal::new(0);
        assert_eq!(signal.get(), 0);

        assert_eq!(signal.set(42), 0);
        assert_eq!(signal.get(), 42);
    }

    #[test]
    fn signal_update() {
        let signal = Signal::new(10);
        assert_eq!(signal.update(|v| v + 5), 10);
        assert_eq!(signal.get(), 15);
    }

    #[test]
    fn signal_notifies_observers() {
        let signal = Signal::new(0);
        let call_count = Rc::new(Cell::new(0));
        let call_count_clone = call_count.clone();
        let reader = signal.clone();

        let _effect = effect(move |_| {
            reader.get();
            call_count_clone.set(call_count_clone.get() + 1);
        });
        assert_eq!(call_count.get(), 1);

        signal.set(1);
        assert_eq!(call_count.get(), 2);

        // Same value still notifies
        signal.set(1);
        assert_eq!(call_count.get(), 3);
    }

    #[test]
    fn observers_receive_the_change_pair() {
        let signal = Signal::new(String::from("a"));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        let reader = signal.clone();

        let _effect = effect(move |change| {
            reader.with(|_| ());
            let pair = change.map(|change| {
                (
                    change.previous::<String>().cloned(),
                    change.current::<String>().cloned(),
                )
            });
            seen_clone.borrow_mut().push(pair);
        });

        signal.set(String::from("b"));

        assert_eq!(
            *seen.borrow(),
            vec![None, Some((Some("a".to_string()), Some("b".to_string())))]
        );
    }

    #[test]
    fn untracked_reads_do_not_subscribe() {
        let signal = Signal::new(0);
        let reader = signal.clone();

        let _effect = effect(move |_| {
            reader.get_untracked();
            reader.with_untracked(|_| ());
        });

        assert_eq!(signal.observer_count(), 0);
    }

    #[test]
    fn signal_clone_shares_state() {
        let signal1 = Signal::new(0);
        let signal2 = signal1.clone();

        signal1.set(42);
        assert_eq!(signal2.get(), 42);

        signal2.set(100);
        assert_eq!(signal1.get(), 100);
        assert_eq!(signal1.id(), signal2.id());
    }

    #[test]
    fn signal_ids_are_unique() {
        let s1 = Signal::new(0);
        let s2 = Signal::new(0);
        let s3 = Signal::new(0);

        assert_ne!(s1.id(), s2.id());
        assert_ne!(s2.id(), s3.id());
        assert_ne!(s1.id(), s3.id());
    }

    #[test]
    fn dropping_last_handle_unregisters() {
        let before = Runtime::signal_count();
        let signal = Signal::new(0);
        let clone = signal.clone();
        assert_eq!(Runtime::signal_count(), before + 1);

        drop(signal);
        assert_eq!(Runtime::signal_count(), before + 1);

        drop(clone);
        assert_eq!(Runtime::signal_count(), before);
    }

    #[test]
    fn optional_values_can_be_cleared() {
        let signal = Signal::new(Some(3));
        assert_eq!(signal.set(None), Some(3));
        assert_eq!(signal.get(), None);
    }
}
