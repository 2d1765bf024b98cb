//! Reactivity Core
//!
//! This crate provides a fine-grained reactive dependency-tracking engine.
//! It implements:
//!
//! - Signals: value cells that remember who read them
//! - Effects: callbacks re-run when a signal they read is written
//! - Computed values and memos: signals derived from other signals
//! - Batches: coalesce many writes into one run per observer
//! - Untrack: read without subscribing
//!
//! Everything is synchronous and single-threaded. Each thread owns an
//! independent runtime.
//!
//! # Architecture
//!
//! The crate is organized into two modules:
//!
//! - `reactive`: the primitives and the per-thread runtime that stores the
//!   dependency graph as two arenas keyed by integer IDs
//! - `graph`: a serializable snapshot of that graph for debugging
//!
//! # Example
//!
//! ```rust
//! use reactivity_core::{batch, computed, effect, signal};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! // Create a signal
//! let count = signal(1);
//!
//! // Create a derived value
//! let reader = count.clone();
//! let doubled = computed(move || reader.get() * 2);
//!
//! // Create an effect
//! let log = Rc::new(RefCell::new(Vec::new()));
//! let (sink, source) = (log.clone(), doubled.clone());
//! effect(move |_| sink.borrow_mut().push(source.get()));
//!
//! // Update the signal: the effect runs before `set` returns
//! count.set(5);
//!
//! // Two writes, one run
//! batch(|| {
//!     count.set(6);
//!     count.set(7);
//! });
//!
//! assert_eq!(*log.borrow(), vec![2, 10, 14]);
//! ```

pub mod graph;
pub mod reactive;

mod error;

pub use error::{ReactiveError, Result};
pub use graph::{GraphSnapshot, NodeKind};
pub use reactive::{
    batch, computed, effect, memo, signal, untrack, Change, Computed, Effect, Memo, ObserverId,
    Runtime, Signal, SignalId,
};
