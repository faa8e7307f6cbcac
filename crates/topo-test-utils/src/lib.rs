//! Testing utilities for the topology workspace
//!
//! Shared fixtures, a recording listener and graph assertions.

#![allow(missing_docs)]

use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use topo_engine::{
    ChangeListener, GraphSnapshot, Link, Node, NotifyError, TopologyHandle, TopologyState,
};

pub fn node(id: &str) -> Node {
    Node::new(id, 0.0, 0.0, "default")
}

pub fn critical_node(id: &str) -> Node {
    node(id).critical()
}

pub fn link(src: &str, dst: &str) -> Link {
    Link::new(src, dst)
}

pub fn graph(ids: &[&str], links: &[(&str, &str)]) -> GraphSnapshot {
    GraphSnapshot::new(
        ids.iter().map(|id| node(id)),
        links.iter().map(|(src, dst)| link(src, dst)),
    )
}

pub fn setup_handle(ids: &[&str], links: &[(&str, &str)]) -> TopologyHandle {
    TopologyHandle::from_graph(graph(ids, links))
}

/// `A -> B -> C`
pub fn setup_chain() -> TopologyHandle {
    setup_handle(&["A", "B", "C"], &[("A", "B"), ("B", "C")])
}

/// Listener that keeps every notified state. Clones share one buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingListener {
    states: Arc<Mutex<Vec<TopologyState>>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.states.lock().len()
    }

    pub fn last(&self) -> Option<TopologyState> {
        self.states.lock().last().cloned()
    }

    pub fn states(&self) -> Vec<TopologyState> {
        self.states.lock().clone()
    }
}

impl ChangeListener for RecordingListener {
    fn on_change(&mut self, state: &TopologyState) -> Result<(), NotifyError> {
        self.states.lock().push(state.clone());
        Ok(())
    }
}

/// Listener that always fails, for fire-and-forget checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingListener;

impl ChangeListener for FailingListener {
    fn on_change(&mut self, _state: &TopologyState) -> Result<(), NotifyError> {
        Err(NotifyError::new("storage unavailable"))
    }
}

/// True when the link set contains a directed cycle (self-loops included).
pub fn has_cycle<'a>(links: impl IntoIterator<Item = &'a Link>) -> bool {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for l in links {
        adjacency.entry(l.src.as_str()).or_default().push(l.dst.as_str());
    }

    // Colour-marking DFS: a grey node reached again closes a cycle.
    fn visit<'g>(
        node: &'g str,
        adjacency: &HashMap<&'g str, Vec<&'g str>>,
        grey: &mut HashSet<&'g str>,
        black: &mut HashSet<&'g str>,
    ) -> bool {
        if black.contains(node) {
            return false;
        }
        if !grey.insert(node) {
            return true;
        }
        let found = adjacency
            .get(node)
            .is_some_and(|next| next.iter().any(|&n| visit(n, adjacency, grey, black)));
        grey.remove(node);
        black.insert(node);
        found
    }

    let mut grey = HashSet::new();
    let mut black = HashSet::new();
    let starts: Vec<&str> = adjacency.keys().copied().collect();
    starts
        .into_iter()
        .any(|start| visit(start, &adjacency, &mut grey, &mut black))
}

/// Ids of nodes in order, for compact assertions.
pub fn node_ids(snapshot: &GraphSnapshot) -> Vec<String> {
    snapshot.nodes.iter().map(|n| n.id.to_string()).collect()
}
