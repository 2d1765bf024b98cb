//! Subscriber types for the reactive system.
//!
//! A Subscriber represents any computation that depends on reactive values.
//! This includes plain effects and the observers that keep computed values
//! and memos up to date.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::change::Change;
use crate::graph::NodeKind;

/// Unique identifier for a signal.
///
/// Each signal gets a unique ID when created. The runtime keys its signal
/// arena by this ID, so edges never hold references to the signal itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalId(u64);

impl SignalId {
    /// Generate a new unique signal ID.
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Unique identifier for an observer.
///
/// Each observer (effect, computed or memo) gets a unique ID when created.
/// This ID is used to track dependencies and to deduplicate batched
/// notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObserverId(u64);

impl ObserverId {
    /// Generate a new unique observer ID.
    ///
    /// Uses an atomic counter so IDs stay unique across threads, even though
    /// every thread has its own runtime.
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "o{}", self.0)
    }
}

/// Callback invoked when an observer runs.
///
/// The argument is the change that triggered the run, or `None` for the
/// initial run, batch flushes and manual triggers.
pub(crate) type Callback = dyn Fn(Option<&Change>);

/// A subscriber to reactive values.
///
/// Cloning is cheap: the callback is shared, which lets the runtime take a
/// copy out of its arena before invoking it.
#[derive(Clone)]
pub struct Subscriber {
    id: ObserverId,
    kind: NodeKind,
    callback: Rc<Callback>,
}

impl Subscriber {
    /// Create a new subscriber with the given callback.
    pub fn new<F>(kind: NodeKind, callback: F) -> Self
    where
        F: Fn(Option<&Change>) + 'static,
    {
        Self {
            id: ObserverId::next(),
            kind,
            callback: Rc::new(callback),
        }
    }

    /// Get the subscriber's unique ID.
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// What kind of observer this is.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Whether a run triggered by `change` should go ahead.
    ///
    /// Memos skip direct writes that left the value unchanged. Every other
    /// kind always runs.
    pub fn accepts(&self, change: Option<&Change>) -> bool {
        match (self.kind, change) {
            (NodeKind::Memo, Some(change)) => !change.is_unchanged(),
            _ => true,
        }
    }

    /// Invoke the callback.
    pub fn notify(&self, change: Option<&Change>) {
        (self.callback)(change);
    }
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
