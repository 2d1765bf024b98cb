//! Dependency Graph
//!
//! This module exposes a serializable view of the runtime's dependency
//! graph, for debugging and tooling.
//!
//! # Overview
//!
//! The graph is bipartite:
//!
//! - Source nodes are signals.
//! - Observer nodes are effects, and the observers behind computed values
//!   and memos.
//! - An edge `signal -> observer` exists when the observer read the signal
//!   during its latest run.
//!
//! The runtime stores edges in both directions, keyed by integer IDs, so a
//! snapshot is a plain copy of those two adjacency lists plus the batch
//! state. Nothing in a snapshot refers back to live values.

mod node;

pub use node::{NodeKind, ObserverNode, SignalNode};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::reactive::{ObserverId, Runtime, SignalId};

/// A point-in-time copy of the current thread's dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Live signals, in creation order.
    pub signals: Vec<SignalNode>,

    /// Live observers, in creation order.
    pub observers: Vec<ObserverNode>,

    /// Number of open batch scopes.
    pub batch_depth: usize,

    /// Observers queued for the next batch flush, in flush order.
    pub pending: Vec<ObserverId>,
}

impl GraphSnapshot {
    /// Capture the graph of the current thread.
    pub fn capture() -> Self {
        Runtime::snapshot()
    }

    /// Look up a signal node.
    pub fn signal(&self, id: SignalId) -> Option<&SignalNode> {
        self.signals.iter().find(|node| node.id == id)
    }

    /// Look up an observer node.
    pub fn observer(&self, id: ObserverId) -> Option<&ObserverNode> {
        self.observers.iter().find(|node| node.id == id)
    }

    /// Number of active `signal -> observer` subscriptions.
    pub fn edge_count(&self) -> usize {
        self.signals.iter().map(|node| node.observers.len()).sum()
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to indented JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a snapshot produced by [`GraphSnapshot::to_json`].
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReactiveError;
    use crate::reactive::{effect, signal};

    #[test]
    fn capture_lists_nodes_and_edges() {
        let count = signal(1);
        let reader = count.clone();
        let watcher = effect(move |_| {
            reader.get();
        });

        let snapshot = GraphSnapshot::capture();

        let node = snapshot.signal(count.id()).unwrap();
        assert_eq!(node.kind, NodeKind::Source);
        assert_eq!(node.observers, vec![watcher.id()]);

        let observer = snapshot.observer(watcher.id()).unwrap();
        assert_eq!(observer.kind, NodeKind::Effect);
        assert!(observer.depends_on(count.id()));
        assert!(observer.enabled);
        assert_eq!(observer.runs, 1);

        assert_eq!(snapshot.edge_count(), 1);
        assert_eq!(snapshot.batch_depth, 0);
        assert!(snapshot.pending.is_empty());
    }

    #[test]
    fn json_round_trip() {
        let count = signal(0);
        let reader = count.clone();
        let _watcher = effect(move |_| {
            reader.get();
        });

        let snapshot = GraphSnapshot::capture();
        let json = snapshot.to_json().unwrap();
        assert_eq!(GraphSnapshot::from_json(&json).unwrap(), snapshot);
        assert!(snapshot.to_json_pretty().unwrap().contains("\"effect\""));
    }

    #[test]
    fn malformed_json_is_a_snapshot_error() {
        let err = GraphSnapshot::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ReactiveError::Snapshot(_)));
    }
}
