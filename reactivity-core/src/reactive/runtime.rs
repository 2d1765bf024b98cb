//! Reactive Runtime
//!
//! The runtime is the central coordinator that connects signals and
//! observers. It owns the dependency graph and decides, on every write,
//! whether observers run now or wait for the enclosing batch.
//!
//! # How It Works
//!
//! 1. Signals and observers register with the runtime when created and get
//!    a node in one of two arenas, keyed by their integer ID.
//!
//! 2. When an observer reads a signal, the runtime records the edge in both
//!    directions: `signal.observers` and `observer.deps`. Both are
//!    insertion-ordered sets, so re-reading a signal is a no-op.
//!
//! 3. When a signal is written, the runtime either:
//!    a. runs every observer of the signal, in order, with the change pair, or
//!    b. adds them to the pending set when a batch is open.
//!
//! 4. An observer run records exactly the signals it reads this time. When
//!    it returns, the observer is unsubscribed from the signals it stopped
//!    reading; signals it still reads keep it at its original position.
//!
//! # Threading
//!
//! The graph lives in a thread-local. Every thread has an independent
//! runtime, and handles are `!Send`, so values never cross threads.
//!
//! # Borrowing
//!
//! The runtime state sits in a `RefCell`. No user callback is invoked and no
//! user value is dropped while it is borrowed: callbacks are cloned out of
//! the arena first, and removed nodes are returned to the caller to be
//! dropped after the borrow ends.

use std::cell::RefCell;

use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;
use tracing::trace;

use super::change::Change;
use super::context::ReactiveContext;
use super::subscriber::{ObserverId, SignalId, Subscriber};
use crate::graph::{GraphSnapshot, NodeKind, ObserverNode, SignalNode};

/// Observers notified by one write. Most signals have only a handful.
type Targets = SmallVec<[ObserverId; 8]>;

#[derive(Default)]
struct SignalEntry {
    observers: IndexSet<ObserverId>,
}

struct ObserverEntry {
    subscriber: Subscriber,
    deps: IndexSet<SignalId>,
    enabled: bool,
    runs: usize,
}

#[derive(Default)]
struct RuntimeState {
    signals: IndexMap<SignalId, SignalEntry>,
    observers: IndexMap<ObserverId, ObserverEntry>,
    batch_depth: usize,
    pending: IndexSet<ObserverId>,
}

/// Drops the edges an observer run no longer uses, also when it panics.
struct PruneOnExit {
    observer: ObserverId,
    previous: IndexSet<SignalId>,
}

impl Drop for PruneOnExit {
    fn drop(&mut self) {
        Runtime::prune(self.observer, std::mem::take(&mut self.previous));
    }
}

thread_local! {
    static RUNTIME: RefCell<RuntimeState> = RefCell::new(RuntimeState::default());
}

/// The per-thread reactive runtime.
///
/// All state is thread-local; this type only groups the operations on it.
pub struct Runtime;

impl Runtime {
    // ------------------------------------------------------------------
    // Signals
    // ------------------------------------------------------------------

    pub(crate) fn register_signal(id: SignalId) {
        RUNTIME.with(|rt| {
            rt.borrow_mut().signals.insert(id, SignalEntry::default());
        });
    }

    /// Remove a signal node and every edge pointing at it.
    ///
    /// Called when the last handle of a signal is dropped.
    pub(crate) fn unregister_signal(id: SignalId) {
        // The runtime may already be gone during thread teardown.
        let _ = RUNTIME.try_with(|rt| {
            let Ok(mut rt) = rt.try_borrow_mut() else {
                return;
            };
            rt.signals.shift_remove(&id);
            // Disabled observers keep the edge on their side only, so every
            // observer is checked, not just the signal's subscribers.
            for observer in rt.observers.values_mut() {
                observer.deps.shift_remove(&id);
            }
        });
    }

    /// Record that the active observer, if any, read `signal`.
    pub(crate) fn track(signal: SignalId) {
        let Some(observer) = ReactiveContext::current_observer() else {
            return;
        };

        RUNTIME.with(|rt| {
            let mut rt = rt.borrow_mut();
            let state = &mut *rt;
            let (Some(entry), Some(node)) =
                (state.observers.get_mut(&observer), state.signals.get_mut(&signal))
            else {
                return;
            };

            entry.deps.insert(signal);
            if entry.enabled {
                node.observers.insert(observer);
            }
        });
    }

    /// Propagate a write to `signal`.
    ///
    /// Outside a batch every subscribed observer runs now, in insertion
    /// order, with the change pair built by `change`. Inside a batch the
    /// observers are queued and `change` is never called.
    pub(crate) fn notify<F>(signal: SignalId, change: F)
    where
        F: FnOnce() -> Change,
    {
        let targets = RUNTIME.with(|rt| {
            let mut rt = rt.borrow_mut();
            let state = &mut *rt;
            let Some(node) = state.signals.get(&signal) else {
                return Targets::new();
            };

            if state.batch_depth > 0 {
                state.pending.extend(node.observers.iter().copied());
                trace!(%signal, queued = node.observers.len(), "write deferred to batch");
                return Targets::new();
            }

            node.observers.iter().copied().collect()
        });

        if targets.is_empty() {
            return;
        }

        let change = change();
        trace!(%signal, observers = targets.len(), "notifying observers");

        for observer in targets {
            // An earlier observer in this walk may have disabled or disposed
            // this one, or re-run it without reading `signal`.
            if Self::is_subscribed(signal, observer) {
                Self::run(observer, Some(&change));
            }
        }
    }

    fn is_subscribed(signal: SignalId, observer: ObserverId) -> bool {
        RUNTIME.with(|rt| {
            rt.borrow()
                .signals
                .get(&signal)
                .is_some_and(|node| node.observers.contains(&observer))
        })
    }

    // ------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------

    pub(crate) fn register_observer(subscriber: Subscriber) -> ObserverId {
        let id = subscriber.id();
        RUNTIME.with(|rt| {
            rt.borrow_mut().observers.insert(
                id,
                ObserverEntry {
                    subscriber,
                    deps: IndexSet::new(),
                    enabled: true,
                    runs: 0,
                },
            );
        });
        id
    }

    /// Run an observer.
    ///
    /// Returns `false` when the observer no longer exists or declined the
    /// change (a memo seeing an unchanged value). Declined runs keep their
    /// edges.
    pub(crate) fn run(id: ObserverId, change: Option<&Change>) -> bool {
        let subscriber = RUNTIME.with(|rt| {
            let mut rt = rt.borrow_mut();
            let state = &mut *rt;
            let entry = state.observers.get_mut(&id)?;
            if !entry.subscriber.accepts(change) {
                trace!(observer = %id, "unchanged value, run skipped");
                return None;
            }

            entry.runs += 1;
            let previous = std::mem::take(&mut entry.deps);
            Some((entry.subscriber.clone(), previous))
        });

        let Some((subscriber, previous)) = subscriber else {
            return false;
        };

        trace!(observer = %id, kind = ?subscriber.kind(), "running observer");
        let _prune = PruneOnExit { observer: id, previous };
        let _ctx = ReactiveContext::enter(id);
        subscriber.notify(change);
        true
    }

    /// Evaluate `body` as the first run of a freshly registered observer.
    ///
    /// Used by derived values, whose first run produces the value their
    /// signal is created with.
    pub(crate) fn first_run<R>(id: ObserverId, body: impl FnOnce() -> R) -> R {
        RUNTIME.with(|rt| {
            if let Some(entry) = rt.borrow_mut().observers.get_mut(&id) {
                entry.runs += 1;
            }
        });
        let _ctx = ReactiveContext::enter(id);
        body()
    }

    /// Unsubscribe `observer` from the signals of `previous` that its latest
    /// run did not read again. Signals it still reads keep their position.
    fn prune(observer: ObserverId, previous: IndexSet<SignalId>) {
        let _ = RUNTIME.try_with(|rt| {
            let Ok(mut rt) = rt.try_borrow_mut() else {
                return;
            };
            let state = &mut *rt;
            let current = state.observers.get(&observer);
            for signal in previous {
                let kept = current
                    .is_some_and(|entry| entry.enabled && entry.deps.contains(&signal));
                if kept {
                    continue;
                }
                if let Some(node) = state.signals.get_mut(&signal) {
                    node.observers.shift_remove(&observer);
                }
            }
        });
    }

    /// Subscribe or unsubscribe an observer from its recorded dependencies.
    ///
    /// The dependency set itself is left as is. Returns `false` if the
    /// observer has been disposed.
    pub(crate) fn set_enabled(id: ObserverId, enabled: bool) -> bool {
        RUNTIME.with(|rt| {
            let mut rt = rt.borrow_mut();
            let state = &mut *rt;
            let Some(entry) = state.observers.get_mut(&id) else {
                return false;
            };

            entry.enabled = enabled;
            for signal in &entry.deps {
                if let Some(node) = state.signals.get_mut(signal) {
                    if enabled {
                        node.observers.insert(id);
                    } else {
                        node.observers.shift_remove(&id);
                    }
                }
            }
            if !enabled {
                state.pending.shift_remove(&id);
            }
            true
        })
    }

    /// Remove an observer and all its edges.
    ///
    /// Returns the removed subscriber so its callback (and everything the
    /// callback captured) is dropped by the caller, outside the borrow.
    pub(crate) fn dispose(id: ObserverId) -> Option<Subscriber> {
        RUNTIME
            .try_with(|rt| {
                let mut rt = rt.try_borrow_mut().ok()?;
                let state = &mut *rt;
                let entry = state.observers.shift_remove(&id)?;
                for signal in &entry.deps {
                    if let Some(node) = state.signals.get_mut(signal) {
                        node.observers.shift_remove(&id);
                    }
                }
                state.pending.shift_remove(&id);
                Some(entry.subscriber)
            })
            .ok()
            .flatten()
    }

    // ------------------------------------------------------------------
    // Batching
    // ------------------------------------------------------------------

    pub(crate) fn open_batch() -> usize {
        RUNTIME.with(|rt| {
            let mut rt = rt.borrow_mut();
            rt.batch_depth += 1;
            rt.batch_depth
        })
    }

    /// Current batch nesting depth.
    pub(crate) fn batch_depth() -> usize {
        RUNTIME.with(|rt| rt.borrow().batch_depth)
    }

    /// Drain the pending set without closing the batch.
    ///
    /// Writes made while the drained observers run are queued again.
    pub(crate) fn take_pending() -> IndexSet<ObserverId> {
        RUNTIME.with(|rt| std::mem::take(&mut rt.borrow_mut().pending))
    }

    /// Close one batch level.
    ///
    /// When the outermost level closes, the pending set is drained and
    /// returned in insertion order; otherwise the result is empty.
    pub(crate) fn close_batch() -> IndexSet<ObserverId> {
        RUNTIME
            .try_with(|rt| {
                let mut rt = rt.borrow_mut();
                rt.batch_depth = rt.batch_depth.saturating_sub(1);
                if rt.batch_depth == 0 {
                    std::mem::take(&mut rt.pending)
                } else {
                    IndexSet::new()
                }
            })
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Get the observer currently being tracked, if any.
    pub fn current_observer() -> Option<ObserverId> {
        ReactiveContext::current_observer()
    }

    /// Check if reads are currently being tracked.
    pub fn is_tracking() -> bool {
        ReactiveContext::is_active()
    }

    /// Check if a batch is open on this thread.
    pub fn is_batching() -> bool {
        RUNTIME.with(|rt| rt.borrow().batch_depth > 0)
    }

    /// Number of live signals on this thread.
    pub fn signal_count() -> usize {
        RUNTIME.with(|rt| rt.borrow().signals.len())
    }

    /// Number of live (not disposed) observers on this thread.
    pub fn observer_count() -> usize {
        RUNTIME.with(|rt| rt.borrow().observers.len())
    }

    /// Observers subscribed to `signal`, in notification order.
    pub fn observers_of(signal: SignalId) -> Vec<ObserverId> {
        RUNTIME.with(|rt| {
            rt.borrow()
                .signals
                .get(&signal)
                .map(|node| node.observers.iter().copied().collect())
                .unwrap_or_default()
        })
    }

    /// Signals `observer` read during its latest run.
    pub fn dependencies_of(observer: ObserverId) -> Vec<SignalId> {
        RUNTIME.with(|rt| {
            rt.borrow()
                .observers
                .get(&observer)
                .map(|entry| entry.deps.iter().copied().collect())
                .unwrap_or_default()
        })
    }

    /// `Some(enabled)` for a live observer, `None` once disposed.
    pub fn is_enabled(observer: ObserverId) -> Option<bool> {
        RUNTIME.with(|rt| rt.borrow().observers.get(&observer).map(|entry| entry.enabled))
    }

    /// How many times `observer` has run, `None` once disposed.
    pub fn run_count(observer: ObserverId) -> Option<usize> {
        RUNTIME.with(|rt| rt.borrow().observers.get(&observer).map(|entry| entry.runs))
    }

    /// Capture the current graph.
    pub(crate) fn snapshot() -> GraphSnapshot {
        RUNTIME.with(|rt| {
            let rt = rt.borrow();
            GraphSnapshot {
                signals: rt
                    .signals
                    .iter()
                    .map(|(id, node)| SignalNode {
                        id: *id,
                        kind: NodeKind::Source,
                        observers: node.observers.iter().copied().collect(),
                    })
                    .collect(),
                observers: rt
                    .observers
                    .iter()
                    .map(|(id, entry)| ObserverNode {
                        id: *id,
                        kind: entry.subscriber.kind(),
                        dependencies: entry.deps.iter().copied().collect(),
                        enabled: entry.enabled,
                        runs: entry.runs,
                    })
                    .collect(),
                batch_depth: rt.batch_depth,
                pending: rt.pending.iter().copied().collect(),
            }
        })
    }
}
