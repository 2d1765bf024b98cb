//! Batching
//!
//! A batch defers notifications until the batched closure returns. Every
//! observer touched during the batch runs exactly once afterwards, in the
//! order it was first queued, without a change pair.
//!
//! The batch stays open while it flushes. Writes made by the flushed
//! observers are queued behind the rest and delivered in the same flush, so
//! an effect reading several derived values of one source sees them all
//! updated. An observer runs at most once per flush.
//!
//! Batches nest. Only the outermost scope flushes; inner scopes just close
//! their level. A panic inside the batch or its flush closes the scope and
//! throws the queue away, leaving the runtime ready for the next write.

use indexmap::IndexSet;
use tracing::debug;

use super::runtime::Runtime;
use super::subscriber::ObserverId;

/// One open batch level. Closing happens in `Drop` when unwinding.
struct BatchScope {
    closed: bool,
}

impl BatchScope {
    fn open() -> Self {
        let depth = Runtime::open_batch();
        debug!(depth, "batch opened");
        Self { closed: false }
    }

    /// Flush if this is the outermost level, then close it.
    fn close(mut self) {
        if Runtime::batch_depth() == 1 {
            Self::flush();
        }
        self.closed = true;
        let leftover = Runtime::close_batch();
        debug_assert!(leftover.is_empty());
    }

    fn flush() {
        let mut flushed: IndexSet<ObserverId> = IndexSet::new();
        loop {
            let pending = Runtime::take_pending();
            if pending.is_empty() {
                break;
            }

            debug!(observers = pending.len(), "flushing batch");
            for observer in pending {
                if !flushed.insert(observer) {
                    continue;
                }
                // Disabled earlier in this same flush.
                if Runtime::is_enabled(observer) == Some(true) {
                    Runtime::run(observer, None);
                }
            }
        }
    }
}

impl Drop for BatchScope {
    fn drop(&mut self) {
        if !self.closed {
            let discarded = Runtime::close_batch();
            if !discarded.is_empty() {
                debug!(observers = discarded.len(), "batch aborted, queue discarded");
            }
        }
    }
}

/// Run `f` with notifications deferred until it returns.
///
/// ```rust
/// use reactivity_core::{batch, effect, signal};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let a = signal(0);
/// let b = signal(0);
/// let runs = Rc::new(Cell::new(0));
///
/// let (ra, rb, counter) = (a.clone(), b.clone(), runs.clone());
/// let _sum = effect(move |_| {
///     let _ = ra.get() + rb.get();
///     counter.set(counter.get() + 1);
/// });
///
/// batch(|| {
///     a.set(1);
///     b.set(1);
/// });
/// assert_eq!(runs.get(), 2);
/// ```
pub fn batch<R>(f: impl FnOnce() -> R) -> R {
    let scope = BatchScope::open();
    let result = f();
    scope.close();
    result
}
