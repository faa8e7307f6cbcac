//! Serializable operations and batch replay.
//!
//! An [`Operation`] mirrors one inbound engine call, so a recorded editing
//! session can be stored as JSON and replayed against a fresh engine.

use crate::api::{HistoryControl, LinkOperations, MutationResult, NodeOperations};
use crate::error::Rejection;
use crate::handle::TopologyHandle;
use crate::types::{Link, Node, NodeId, NodePatch};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Operation {
    AddNode { node: Node },
    RemoveNode { id: NodeId },
    UpdateNode { id: NodeId, changes: NodePatch },
    AddLink { link: Link },
    RemoveLink { src: NodeId, dst: NodeId },
    Undo,
    Redo,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::AddNode { .. } => "addNode",
            Operation::RemoveNode { .. } => "removeNode",
            Operation::UpdateNode { .. } => "updateNode",
            Operation::AddLink { .. } => "addLink",
            Operation::RemoveLink { .. } => "removeLink",
            Operation::Undo => "undo",
            Operation::Redo => "redo",
        }
    }
}

impl TopologyHandle {
    /// Dispatch one operation to the matching engine call.
    pub fn apply(&mut self, op: Operation) -> MutationResult {
        match op {
            Operation::AddNode { node } => self.add_node(node),
            Operation::RemoveNode { id } => self.remove_node(id.as_str()),
            Operation::UpdateNode { id, changes } => self.update_node(id.as_str(), changes),
            Operation::AddLink { link } => self.add_link(link),
            Operation::RemoveLink { src, dst } => self.remove_link(src.as_str(), dst.as_str()),
            Operation::Undo => self.undo(),
            Operation::Redo => self.redo(),
        }
    }
}

/// A rejected step of a replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedStep {
    pub index: usize,
    pub op: &'static str,
    pub reason: Rejection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub committed: usize,
    pub rejected: Vec<RejectedStep>,
}

impl ReplaySummary {
    pub fn total(&self) -> usize {
        self.committed + self.rejected.len()
    }
}

/// Apply every operation in order. Rejections are collected, not fatal.
pub fn replay(handle: &mut TopologyHandle, ops: impl IntoIterator<Item = Operation>) -> ReplaySummary {
    let mut summary = ReplaySummary::default();
    for (index, op) in ops.into_iter().enumerate() {
        let name = op.name();
        match handle.apply(op) {
            Ok(_) => summary.committed += 1,
            Err(reason) => summary.rejected.push(RejectedStep {
                index,
                op: name,
                reason,
            }),
        }
    }
    tracing::info!(
        committed = summary.committed,
        rejected = summary.rejected.len(),
        "replay finished"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TopologyView;

    #[test]
    fn parses_tagged_operations() {
        let ops: Vec<Operation> = serde_json::from_str(
            r#"[
                {"op":"addNode","node":{"id":"a","x":0,"y":0,"type":"switch"}},
                {"op":"updateNode","id":"a","changes":{"x":12.5}},
                {"op":"removeLink","src":"a","dst":"b"},
                {"op":"undo"}
            ]"#,
        )
        .unwrap();

        assert_eq!(ops.len(), 4);
        assert_eq!(ops[1].name(), "updateNode");
        assert_eq!(ops[3], Operation::Undo);
    }

    #[test]
    fn replay_collects_rejections_with_positions() {
        let mut handle = TopologyHandle::new();
        let summary = replay(
            &mut handle,
            vec![
                Operation::AddNode { node: Node::new("a", 0.0, 0.0, "switch") },
                Operation::AddNode { node: Node::new("b", 0.0, 0.0, "switch") },
                Operation::AddLink { link: Link::new("a", "b") },
                Operation::AddLink { link: Link::new("b", "a") },
                Operation::Redo,
            ],
        );

        assert_eq!(summary.committed, 3);
        assert_eq!(summary.total(), 5);
        assert_eq!(summary.rejected[0].index, 3);
        assert!(matches!(summary.rejected[0].reason, Rejection::CycleDetected { .. }));
        assert_eq!(summary.rejected[1].op, "redo");
        assert_eq!(handle.links().len(), 1);
    }
}
