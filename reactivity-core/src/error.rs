//! Error types.

use thiserror::Error;

use crate::reactive::ObserverId;

/// Errors reported by the reactive runtime.
///
/// Panics raised inside user callbacks are not converted; they propagate to
/// whoever triggered the run.
#[derive(Debug, Error)]
pub enum ReactiveError {
    /// The effect was disposed and can no longer run.
    #[error("observer {0} has been disposed")]
    Disposed(ObserverId),

    /// A graph snapshot could not be serialized or parsed.
    #[error("graph snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ReactiveError>;
