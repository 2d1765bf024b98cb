//! Computed Values
//!
//! A computed value is a signal whose value is produced by an observer.
//! The observer runs the computation and writes the result into the signal
//! every time it is triggered, whether or not the result changed, so
//! everything reading the computed value re-runs as well.
//!
//! See [`Memo`](super::Memo) for the variant that skips redundant direct
//! writes.

use std::cell::OnceCell;
use std::fmt::{self, Debug};
use std::rc::Rc;

use super::effect::{Effect, EffectOwner};
use super::runtime::Runtime;
use super::signal::Signal;
use super::subscriber::{ObserverId, SignalId};
use crate::graph::NodeKind;

/// Build the signal and the observer behind a derived value.
///
/// The observer's first run produces the value the signal is created with;
/// later runs write into it.
pub(super) fn derive<T, F>(kind: NodeKind, compute: F) -> (Signal<T>, Rc<EffectOwner>)
where
    T: Clone + PartialEq + 'static,
    F: Fn() -> T + 'static,
{
    let compute = Rc::new(compute);
    let slot: Rc<OnceCell<Signal<T>>> = Rc::new(OnceCell::new());

    let (target, recompute) = (slot.clone(), compute.clone());
    let effect = Effect::register(kind, move |_| {
        if let Some(signal) = target.get() {
            signal.set(recompute());
        }
    });
    let owner = Rc::new(EffectOwner::new(effect));

    let initial = Runtime::first_run(effect.id(), || compute());
    let signal = slot.get_or_init(|| Signal::new(initial)).clone();
    (signal, owner)
}

/// A derived value that recomputes on every upstream write.
///
/// # Example
///
/// ```rust
/// use reactivity_core::{computed, signal};
///
/// let count = signal(2);
/// let reader = count.clone();
/// let doubled = computed(move || reader.get() * 2);
///
/// assert_eq!(doubled.get(), 4);
/// count.set(5);
/// assert_eq!(doubled.get(), 10);
/// ```
pub struct Computed<T: 'static> {
    value: Signal<T>,
    owner: Rc<EffectOwner>,
}

impl<T> Computed<T>
where
    T: Clone + PartialEq + 'static,
{
    /// Create a computed value. The computation runs immediately.
    pub fn new<F>(compute: F) -> Self
    where
        F: Fn() -> T + 'static,
    {
        let (value, owner) = derive(NodeKind::Computed, compute);
        Self { value, owner }
    }
}

impl<T: 'static> Computed<T> {
    /// Get the current value, registering a dependency like a signal read.
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

    /// Number of times the computation has run.
    pub fn run_count(&self) -> usize {
        self.owner.effect().run_count()
    }
}

impl<T: 'static> Clone for Computed<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            owner: Rc::clone(&self.owner),
        }
    }
}

impl<T> Debug for Computed<T>
where
    T: Debug + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Computed")
            .field("signal", &self.value)
            .field("observer", &self.observer_id())
            .finish()
    }
}

/// Create a computed value. See [`Computed::new`].
pub fn computed<T, F>(compute: F) -> Computed<T>
where
    T: Clone + PartialEq + 'static,
    F: Fn() -> T + 'static,
{
    Computed::new(compute)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::{effect, signal, Runtime};
    use std::cell::Cell;

    #[test]
    fn computes_on_creation() {
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();

        let value = computed(move || {
            calls_clone.set(calls_clone.get() + 1);
            42
        });

        assert_eq!(value.get(), 42);
        assert_eq!(calls.get(), 1);
        assert_eq!(value.run_count(), 1);
    }

    #[test]
    fn first_value_subscribes_to_its_inputs() {
        let count = signal(3);
        let reader = count.clone();
        let tripled = computed(move || reader.get() * 3);

        assert_eq!(tripled.get_untracked(), 9);
        assert_eq!(Runtime::observers_of(count.id()), vec![tripled.observer_id()]);
        assert_eq!(Runtime::dependencies_of(tripled.observer_id()), vec![count.id()]);
    }

    #[test]
    fn recomputes_on_every_write() {
        let count = signal(0);
        let reader = count.clone();
        let doubled = computed(move || reader.get() * 2);

        count.set(0);
        count.set(0);
        assert_eq!(doubled.run_count(), 3);

        count.set(4);
        assert_eq!(doubled.get(), 8);
        assert_eq!(doubled.run_count(), 4);
    }

    #[test]
    fn downstream_effect_reruns_on_redundant_writes() {
        let count = signal(0);
        let reader = count.clone();
        let doubled = computed(move || reader.get() * 2);

        let runs = Rc::new(Cell::new(0));
        let runs_clone = runs.clone();
        let last = Rc::new(Cell::new(-1));
        let last_clone = last.clone();
        let doubled_reader = doubled.clone();
        let _watcher = effect(move |_| {
            last_clone.set(doubled_reader.get());
            runs_clone.set(runs_clone.get() + 1);
        });

        count.set(0);
        count.set(0);
        count.set(1);

        assert_eq!(runs.get(), 4);
        assert_eq!(last.get(), 2);
    }

    #[test]
    fn dropping_last_handle_disposes_observer() {
        let count = signal(1);
        let reader = count.clone();
        let plus_one = computed(move || reader.get() + 1);
        let observer = plus_one.observer_id();
        let copy = plus_one.clone();

        drop(plus_one);
        assert_eq!(Runtime::is_enabled(observer), Some(true));

        drop(copy);
        assert_eq!(Runtime::is_enabled(observer), None);
        assert_eq!(count.observer_count(), 0);
    }

    #[test]
    fn computed_reading_computed() {
        let base = signal(2);
        let reader = base.clone();
        let doubled = computed(move || reader.get() * 2);
        let doubled_reader = doubled.clone();
        let plus_ten = computed(move || doubled_reader.get() + 10);

        assert_eq!(plus_ten.get(), 14);
        base.set(5);
        assert_eq!(doubled.get(), 10);
        assert_eq!(plus_ten.get(), 20);
    }
}
