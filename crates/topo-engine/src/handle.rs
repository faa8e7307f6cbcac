use crate::api::*;
use crate::config::EngineConfig;
use crate::dag;
use crate::error::{ConfigError, Rejection};
use crate::history::History;
use crate::logging::{AuditAction, AuditLog, AuditLogEntry, TargetType};
use crate::types::*;
use im::Vector;
use std::fmt;

const UNDO_TARGET: &str = "undo";
const REDO_TARGET: &str = "redo";

/// The topology editing engine.
///
/// Owns the live graph, the undo/redo stacks and the audit trail. Every
/// mutation either commits fully (history push, redo clear, apply, audit
/// append, notify) or is rejected with no observable change.
pub struct TopologyHandle {
    config: EngineConfig,
    nodes: Vector<Node>,
    links: Vector<Link>,
    audit: AuditLog,
    history: History,
    listener: Option<Box<dyn ChangeListener>>,
}

impl TopologyHandle {
    /// Engine over an empty graph with default configuration
    pub fn new() -> Self {
        Self::from_graph(GraphSnapshot::default())
    }

    /// Engine over caller-supplied initial nodes and links
    pub fn from_graph(graph: GraphSnapshot) -> Self {
        let config = EngineConfig::default();
        Self {
            audit: AuditLog::new(config.audit_capacity),
            history: History::with_limit(config.history_limit),
            config,
            nodes: graph.nodes,
            links: graph.links,
            listener: None,
        }
    }

    /// Engine with custom configuration
    pub fn with_config(graph: GraphSnapshot, config: EngineConfig) -> Result<Self, ConfigError> {
        Self::from_state(
            TopologyState {
                nodes: graph.nodes,
                links: graph.links,
                audit_logs: Vec::new(),
            },
            config,
        )
    }

    /// Engine seeded with a previously persisted state, audit trail included.
    ///
    /// Seeded audit entries beyond capacity are dropped oldest first.
    pub fn from_state(state: TopologyState, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            audit: AuditLog::with_entries(config.audit_capacity, state.audit_logs),
            history: History::with_limit(config.history_limit),
            config,
            nodes: state.nodes,
            links: state.links,
            listener: None,
        })
    }

    #[must_use]
    pub fn with_listener(mut self, listener: impl ChangeListener + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn set_listener(&mut self, listener: impl ChangeListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    pub fn redo_depth(&self) -> usize {
        self.history.redo_depth()
    }

    /// Independent copy of the current `{nodes, links}`
    pub fn graph(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.clone(),
            links: self.links.clone(),
        }
    }

    /// Full state as handed to the listener
    pub fn state(&self) -> TopologyState {
        TopologyState {
            nodes: self.nodes.clone(),
            links: self.links.clone(),
            audit_logs: self.audit.entries(),
        }
    }

    /// Diagnostics over the live graph
    pub fn report(&self) -> dag::GraphReport {
        dag::inspect(&self.nodes, &self.links)
    }

    fn entry(&self, action: AuditAction, target_type: TargetType, target_id: impl Into<String>) -> AuditLogEntry {
        AuditLogEntry::new(action, target_type, target_id).with_user(self.config.actor.clone())
    }

    fn reject(&self, op: &'static str, rejection: Rejection) -> MutationResult {
        tracing::warn!(op, reason = %rejection, "mutation rejected");
        Err(rejection)
    }

    /// Commit protocol shared by every forward edit.
    fn commit(
        &mut self,
        op: &'static str,
        nodes: Vector<Node>,
        links: Vector<Link>,
        entry: AuditLogEntry,
    ) -> MutationResult {
        let before = self.graph();
        self.history.record(before);
        self.nodes = nodes;
        self.links = links;

        let receipt = self.append(entry);
        tracing::debug!(
            op,
            entry = %receipt.entry_id,
            nodes = self.nodes.len(),
            links = self.links.len(),
            undo_depth = self.history.undo_depth(),
            "commit"
        );
        self.notify();
        Ok(receipt)
    }

    /// Undo/redo bypass the commit protocol: no history record, no redo clear.
    fn restore(&mut self, op: &'static str, snapshot: GraphSnapshot, details: &str) -> MutationResult {
        self.nodes = snapshot.nodes;
        self.links = snapshot.links;

        let entry = self
            .entry(AuditAction::Update, TargetType::Node, op)
            .with_details(details);
        let receipt = self.append(entry);
        tracing::debug!(
            op,
            undo_depth = self.history.undo_depth(),
            redo_depth = self.history.redo_depth(),
            "history step"
        );
        self.notify();
        Ok(receipt)
    }

    fn append(&mut self, entry: AuditLogEntry) -> CommitReceipt {
        let entry_id = entry.id.clone();
        let evicted_entries = self.audit.append(entry);
        CommitReceipt {
            entry_id,
            evicted_entries,
        }
    }

    fn notify(&mut self) {
        if self.listener.is_none() {
            return;
        }
        let state = self.state();
        if let Some(listener) = self.listener.as_mut() {
            if let Err(e) = listener.on_change(&state) {
                tracing::warn!(error = %e, "change listener failed; commit kept");
            }
        }
    }
}

impl Default for TopologyHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TopologyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TopologyHandle")
            .field("config", &self.config)
            .field("nodes", &self.nodes.len())
            .field("links", &self.links.len())
            .field("audit_entries", &self.audit.len())
            .field("undo_depth", &self.history.undo_depth())
            .field("redo_depth", &self.history.redo_depth())
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}

impl NodeOperations for TopologyHandle {
    fn add_node(&mut self, node: Node) -> MutationResult {
        // Duplicate ids are a caller error and are not guarded here.
        let entry = self.entry(AuditAction::Create, TargetType::Node, node.id.as_str());
        let mut nodes = self.nodes.clone();
        nodes.push_back(node);
        let links = self.links.clone();
        self.commit("add_node", nodes, links, entry)
    }

    fn remove_node(&mut self, id: &str) -> MutationResult {
        match self.nodes.iter().find(|n| n.id == id) {
            Some(node) if node.is_critical => {
                return self.reject("remove_node", Rejection::CriticalNode { id: node.id.clone() });
            }
            None if self.config.strict_targets => {
                return self.reject("remove_node", Rejection::NodeNotFound { id: id.into() });
            }
            _ => {}
        }

        let mut nodes = self.nodes.clone();
        nodes.retain(|n| n.id != id);
        let mut links = self.links.clone();
        links.retain(|l| !l.touches(id));

        let entry = self.entry(AuditAction::Delete, TargetType::Node, id);
        self.commit("remove_node", nodes, links, entry)
    }

    fn update_node(&mut self, id: &str, changes: NodePatch) -> MutationResult {
        let mut nodes = self.nodes.clone();
        let mut matched = 0usize;
        for node in nodes.iter_mut().filter(|n| n.id == id) {
            node.apply(&changes);
            matched += 1;
        }

        if matched == 0 {
            if self.config.strict_targets {
                return self.reject("update_node", Rejection::NodeNotFound { id: id.into() });
            }
            tracing::debug!(node = id, "update_node on missing node commits unchanged state");
        }

        let entry = self
            .entry(AuditAction::Update, TargetType::Node, id)
            .with_details(changes.to_details());
        let links = self.links.clone();
        self.commit("update_node", nodes, links, entry)
    }
}

impl LinkOperations for TopologyHandle {
    fn add_link(&mut self, link: Link) -> MutationResult {
        if let Err(rejection) = dag::check_link(&self.links, &link) {
            return self.reject("add_link", rejection);
        }

        let entry = self.entry(AuditAction::Create, TargetType::Link, link.label());
        let nodes = self.nodes.clone();
        let mut links = self.links.clone();
        links.push_back(link);
        self.commit("add_link", nodes, links, entry)
    }

    fn remove_link(&mut self, src: &str, dst: &str) -> MutationResult {
        let mut links = self.links.clone();
        links.retain(|l| !l.is(src, dst));

        if links.len() == self.links.len() {
            if self.config.strict_targets {
                return self.reject(
                    "remove_link",
                    Rejection::LinkNotFound {
                        src: src.into(),
                        dst: dst.into(),
                    },
                );
            }
            tracing::debug!(src, dst, "remove_link on missing link commits unchanged state");
        }

        let entry = self.entry(AuditAction::Delete, TargetType::Link, link_label(src, dst));
        let nodes = self.nodes.clone();
        self.commit("remove_link", nodes, links, entry)
    }
}

impl HistoryControl for TopologyHandle {
    fn undo(&mut self) -> MutationResult {
        let current = self.graph();
        match self.history.undo(current) {
            Some(previous) => self.restore(UNDO_TARGET, previous, "Reverted last action"),
            None => self.reject("undo", Rejection::NothingToUndo),
        }
    }

    fn redo(&mut self) -> MutationResult {
        let current = self.graph();
        match self.history.redo(current) {
            Some(next) => self.restore(REDO_TARGET, next, "Redid last action"),
            None => self.reject("redo", Rejection::NothingToRedo),
        }
    }

    fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    fn can_redo(&self) -> bool {
        self.history.can_redo()
    }
}

impl TopologyView for TopologyHandle {
    fn nodes(&self) -> &Vector<Node> {
        &self.nodes
    }

    fn links(&self) -> &Vector<Link> {
        &self.links
    }

    fn audit_logs(&self) -> Vec<AuditLogEntry> {
        self.audit.entries()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> Node {
        Node::new(id, 0.0, 0.0, "default")
    }

    fn handle_with(ids: &[&str], links: &[(&str, &str)]) -> TopologyHandle {
        TopologyHandle::from_graph(GraphSnapshot::new(
            ids.iter().map(|id| node(id)),
            links.iter().map(|(s, d)| Link::new(*s, *d)),
        ))
    }

    #[test]
    fn starts_with_initial_graph_and_empty_history() {
        let handle = handle_with(&["node1", "node2"], &[]);
        assert_eq!(handle.nodes().len(), 2);
        assert!(handle.links().is_empty());
        assert!(!handle.can_undo());
        assert!(!handle.can_redo());
        assert!(handle.audit_logs().is_empty());
    }

    #[test]
    fn rejected_mutation_leaves_everything_untouched() {
        let mut handle = handle_with(&["a", "b"], &[("a", "b")]);
        let before = handle.state();

        assert!(handle.add_link(Link::new("a", "b")).is_err());
        assert!(handle.add_link(Link::new("b", "a")).is_err());
        assert!(handle.add_link(Link::new("a", "a")).is_err());

        assert_eq!(handle.state(), before);
        assert!(!handle.can_undo());
    }

    #[test]
    fn receipt_names_the_appended_entry() {
        let mut handle = handle_with(&[], &[]);
        let receipt = handle.add_node(node("x")).unwrap();
        assert_eq!(handle.audit().last().unwrap().id, receipt.entry_id);
        assert_eq!(receipt.evicted_entries, 0);
    }

    #[test]
    fn actor_is_stamped_on_entries() {
        let config = EngineConfig::new().with_actor("alice");
        let mut handle = TopologyHandle::with_config(GraphSnapshot::default(), config).unwrap();
        handle.add_node(node("x")).unwrap();
        handle.undo().unwrap();

        assert!(handle
            .audit_logs()
            .iter()
            .all(|e| e.user.as_deref() == Some("alice")));
    }

    #[test]
    fn invalid_config_is_refused() {
        let config = EngineConfig::new().with_audit_capacity(0);
        assert!(TopologyHandle::with_config(GraphSnapshot::default(), config).is_err());
    }

    #[test]
    fn update_applies_to_every_node_sharing_the_id() {
        let mut handle = handle_with(&["dup", "dup"], &[]);
        handle
            .update_node("dup", NodePatch::new().with_y(7.0))
            .unwrap();
        assert!(handle.nodes().iter().all(|n| n.y == 7.0));
    }
}
