//! The change pair handed to observers on a direct write.

use std::any::Any;
use std::fmt;

use super::subscriber::SignalId;

/// The prior and new value of a signal write.
///
/// Observers receive `Some(&Change)` when they run synchronously because a
/// signal they read was written outside of a batch. The values are stored
/// type-erased since one observer may depend on signals of many types; use
/// [`Change::previous`] and [`Change::current`] with the signal's value type
/// to read them back.
pub struct Change {
    signal: SignalId,
    previous: Box<dyn Any>,
    current: Box<dyn Any>,
    unchanged: bool,
}

impl Change {
    /// Record a write. Equality is decided once, here, with `PartialEq`.
    pub(crate) fn new<T>(signal: SignalId, previous: T, current: T) -> Self
    where
        T: PartialEq + 'static,
    {
        let unchanged = previous == current;
        Self {
            signal,
            previous: Box::new(previous),
            current: Box::new(current),
            unchanged,
        }
    }

    /// The signal that was written.
    pub fn signal(&self) -> SignalId {
        self.signal
    }

    /// The value before the write, if the signal holds a `T`.
    pub fn previous<T: 'static>(&self) -> Option<&T> {
        self.previous.downcast_ref()
    }

    /// The value after the write, if the signal holds a `T`.
    pub fn current<T: 'static>(&self) -> Option<&T> {
        self.current.downcast_ref()
    }

    /// Whether the write stored a value equal to the one it replaced.
    pub fn is_unchanged(&self) -> bool {
        self.unchanged
    }
}

impl fmt::Debug for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Change")
            .field("signal", &self.signal)
            .field("unchanged", &self.unchanged)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downcasts_to_the_written_type() {
        let change = Change::new(SignalId::next(), String::from("a"), String::from("b"));

        assert_eq!(change.previous::<String>().map(String::as_str), Some("a"));
        assert_eq!(change.current::<String>().map(String::as_str), Some("b"));
        assert!(change.previous::<i32>().is_none());
        assert!(!change.is_unchanged());
    }

    #[test]
    fn nan_is_never_unchanged() {
        let change = Change::new(SignalId::next(), f64::NAN, f64::NAN);
        assert!(!change.is_unchanged());

        let change = Change::new(SignalId::next(), 0.5, 0.5);
        assert!(change.is_unchanged());
    }
}
