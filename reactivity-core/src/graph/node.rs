//! Graph Nodes
//!
//! This module defines the node types that appear in a dependency graph
//! snapshot.

use serde::{Deserialize, Serialize};

use crate::reactive::{ObserverId, SignalId};

/// The kind of node in the dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A source node (signal). These are the roots of the graph.
    /// They have no dependencies, only observers.
    Source,

    /// A plain effect: runs its callback, produces no value.
    Effect,

    /// The observer behind a computed value. Recomputes on every trigger.
    Computed,

    /// The observer behind a memo. Skips direct writes that leave the
    /// written signal's value unchanged.
    Memo,
}

impl NodeKind {
    /// Whether nodes of this kind observe other nodes.
    pub fn is_observer(&self) -> bool {
        !matches!(self, NodeKind::Source)
    }

    /// Whether nodes of this kind produce a value other nodes can read.
    pub fn is_derived(&self) -> bool {
        matches!(self, NodeKind::Computed | NodeKind::Memo)
    }
}

/// A signal as seen in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalNode {
    /// Unique identifier for this signal.
    pub id: SignalId,

    /// Always [`NodeKind::Source`].
    pub kind: NodeKind,

    /// Subscribed observers, in notification order.
    pub observers: Vec<ObserverId>,
}

/// An observer as seen in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObserverNode {
    /// Unique identifier for this observer.
    pub id: ObserverId,

    /// What kind of observer this is.
    pub kind: NodeKind,

    /// Signals read during the latest run. Kept while disabled.
    pub dependencies: Vec<SignalId>,

    /// False while disabled.
    pub enabled: bool,

    /// Number of completed or in-progress runs.
    pub runs: usize,
}

impl ObserverNode {
    /// Whether `signal` was read during the latest run.
    pub fn depends_on(&self, signal: SignalId) -> bool {
        self.dependencies.contains(&signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_classification() {
        assert!(!NodeKind::Source.is_observer());
        assert!(NodeKind::Effect.is_observer());
        assert!(NodeKind::Memo.is_observer());

        assert!(NodeKind::Computed.is_derived());
        assert!(NodeKind::Memo.is_derived());
        assert!(!NodeKind::Effect.is_derived());
        assert!(!NodeKind::Source.is_derived());
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_string(&NodeKind::Computed).unwrap();
        assert_eq!(json, "\"computed\"");

        let kind: NodeKind = serde_json::from_str("\"memo\"").unwrap();
        assert_eq!(kind, NodeKind::Memo);
    }
}
