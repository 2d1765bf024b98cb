//! Reactive Primitives
//!
//! This module implements the core reactive system: signals, effects,
//! computed values, memos, batches and the untrack escape hatch.
//!
//! # Concepts
//!
//! ## Signals
//!
//! A Signal is a container for mutable state. When a signal is read while an
//! observer runs, the signal records that observer as a dependent. When the
//! signal is written, all dependents are notified.
//!
//! ## Effects
//!
//! An Effect is a side-effecting computation that runs once on creation and
//! again whenever a signal it read is written. Effects are how reactive state
//! reaches the outside world.
//!
//! ## Computed values and memos
//!
//! Both are signals kept up to date by an effect. A computed value
//! recomputes on every upstream write; a memo skips direct writes that
//! stored an equal value.
//!
//! ## Batches and untrack
//!
//! [`batch`] defers notifications so each observer runs once for a group of
//! writes. [`untrack`] reads signals without subscribing the running
//! observer.
//!
//! # Implementation Notes
//!
//! The active observer lives in a thread-local slot that signal reads
//! consult. This approach (sometimes called "automatic dependency tracking"
//! or "transparent reactivity") is used by SolidJS, Vue 3, and Leptos.

mod batch;
mod change;
mod computed;
mod context;
mod effect;
mod memo;
mod runtime;
mod signal;
mod subscriber;

pub use batch::batch;
pub use change::Change;
pub use computed::{computed, Computed};
pub use context::{untrack, ReactiveContext};
pub use effect::{effect, Effect};
pub use memo::{memo, Memo};
pub use runtime::Runtime;
pub use signal::{signal, Signal};
pub use subscriber::{ObserverId, SignalId};
