use crate::error::{NotifyError, Rejection};
use crate::logging::AuditLogEntry;
use crate::types::{Link, Node, NodeId, NodePatch, TopologyState};
use im::Vector;

/// Evidence of a committed mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    /// Id of the audit entry appended by this commit
    pub entry_id: String,
    /// Audit entries evicted to stay within capacity
    pub evicted_entries: usize,
}

/// Outcome of every mutating call: committed, or refused with a reason.
pub type MutationResult = Result<CommitReceipt, Rejection>;

pub trait NodeOperations {
    fn add_node(&mut self, node: Node) -> MutationResult;
    fn remove_node(&mut self, id: &str) -> MutationResult;
    fn update_node(&mut self, id: &str, changes: NodePatch) -> MutationResult;
}

pub trait LinkOperations {
    fn add_link(&mut self, link: Link) -> MutationResult;
    fn remove_link(&mut self, src: &str, dst: &str) -> MutationResult;
}

pub trait HistoryControl {
    fn undo(&mut self) -> MutationResult;
    fn redo(&mut self) -> MutationResult;
    fn can_undo(&self) -> bool;
    fn can_redo(&self) -> bool;
}

/// Read access for presentation layers.
pub trait TopologyView {
    fn nodes(&self) -> &Vector<Node>;
    fn links(&self) -> &Vector<Link>;
    fn audit_logs(&self) -> Vec<AuditLogEntry>;

    fn node(&self, id: &str) -> Option<&Node> {
        self.nodes().iter().find(|n| n.id == id)
    }

    fn link(&self, src: &str, dst: &str) -> Option<&Link> {
        self.links().iter().find(|l| l.is(src, dst))
    }

    /// Links leaving `id`.
    fn outgoing(&self, id: &str) -> Vec<&Link> {
        self.links().iter().filter(|l| l.src == id).collect()
    }

    /// Links arriving at `id`.
    fn incoming(&self, id: &str) -> Vec<&Link> {
        self.links().iter().filter(|l| l.dst == id).collect()
    }

    fn node_ids(&self) -> Vec<NodeId> {
        self.nodes().iter().map(|n| n.id.clone()).collect()
    }
}

/// Outbound notification, invoked after every commit including undo/redo.
///
/// Fire-and-forget: an error is logged and the commit stands.
pub trait ChangeListener: Send {
    fn on_change(&mut self, state: &TopologyState) -> Result<(), NotifyError>;
}

impl<F> ChangeListener for F
where
    F: FnMut(&TopologyState) -> Result<(), NotifyError> + Send,
{
    fn on_change(&mut self, state: &TopologyState) -> Result<(), NotifyError> {
        self(state)
    }
}
