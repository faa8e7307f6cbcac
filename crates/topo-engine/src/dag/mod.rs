//! Reachability and link validation over the live link set.
//!
//! The engine keeps the graph acyclic by induction: every inserted edge is
//! checked, so no global re-verification is needed. [`inspect`] is the
//! read-only counterpart for graphs that arrive from outside the engine.

use crate::error::Rejection;
use crate::types::{Link, Node, NodeId};
use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graphmap::DiGraphMap;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Depth-first search from `from` looking for `to` over `links`.
pub fn has_path<'a, L>(links: L, from: &str, to: &str) -> bool
where
    L: IntoIterator<Item = &'a Link>,
{
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for link in links {
        adjacency
            .entry(link.src.as_str())
            .or_default()
            .push(link.dst.as_str());
    }

    let mut stack = vec![from];
    let mut visited = HashSet::new();

    while let Some(current) = stack.pop() {
        if current == to {
            return true;
        }
        if !visited.insert(current) {
            continue;
        }
        if let Some(next) = adjacency.get(current) {
            stack.extend(next.iter().copied().filter(|n| !visited.contains(n)));
        }
    }
    false
}

/// Validate a candidate link against the current link set.
///
/// Order of checks: self-loop, duplicate pair, cycle.
pub fn check_link<'a, L>(links: L, link: &Link) -> Result<(), Rejection>
where
    L: IntoIterator<Item = &'a Link> + Copy,
{
    if link.src == link.dst {
        return Err(Rejection::SelfLoop {
            node: link.src.clone(),
        });
    }

    if links
        .into_iter()
        .any(|l| l.is(link.src.as_str(), link.dst.as_str()))
    {
        return Err(Rejection::DuplicateLink {
            src: link.src.clone(),
            dst: link.dst.clone(),
        });
    }

    // Adding src -> dst closes a cycle iff dst already reaches src.
    if has_path(links, link.dst.as_str(), link.src.as_str()) {
        return Err(Rejection::CycleDetected {
            src: link.src.clone(),
            dst: link.dst.clone(),
        });
    }

    Ok(())
}

/// Structural diagnostics for an arbitrary graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphReport {
    pub node_count: usize,
    pub link_count: usize,
    pub duplicate_node_ids: Vec<NodeId>,
    pub duplicate_links: Vec<(NodeId, NodeId)>,
    pub self_loops: Vec<NodeId>,
    /// Links whose `src` or `dst` names no node.
    pub dangling_links: Vec<(NodeId, NodeId)>,
    pub is_cyclic: bool,
    /// Present only when the graph is acyclic.
    pub topological_order: Option<Vec<NodeId>>,
}

impl GraphReport {
    pub fn is_clean(&self) -> bool {
        self.duplicate_node_ids.is_empty()
            && self.duplicate_links.is_empty()
            && self.self_loops.is_empty()
            && self.dangling_links.is_empty()
            && !self.is_cyclic
    }
}

/// Inspect a graph without modifying it.
pub fn inspect<'a, N, L>(nodes: N, links: L) -> GraphReport
where
    N: IntoIterator<Item = &'a Node>,
    L: IntoIterator<Item = &'a Link>,
{
    let mut report = GraphReport::default();
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    let mut known = HashSet::new();

    for node in nodes {
        report.node_count += 1;
        if !known.insert(node.id.as_str()) {
            report.duplicate_node_ids.push(node.id.clone());
        }
        graph.add_node(node.id.as_str());
    }

    let mut seen_pairs = HashSet::new();
    let mut reported_pairs = HashSet::new();
    for link in links {
        report.link_count += 1;
        let pair = (link.src.as_str(), link.dst.as_str());

        if link.src == link.dst {
            report.self_loops.push(link.src.clone());
        }
        if !seen_pairs.insert(pair) && reported_pairs.insert(pair) {
            report
                .duplicate_links
                .push((link.src.clone(), link.dst.clone()));
        }
        if !known.contains(pair.0) || !known.contains(pair.1) {
            report
                .dangling_links
                .push((link.src.clone(), link.dst.clone()));
        }
        graph.add_edge(pair.0, pair.1, ());
    }

    report.is_cyclic = is_cyclic_directed(&graph);
    if !report.is_cyclic {
        report.topological_order = toposort(&graph, None)
            .ok()
            .map(|order| order.into_iter().map(NodeId::from).collect());
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Vec<Link> {
        vec![Link::new("A", "B"), Link::new("B", "C")]
    }

    #[test]
    fn finds_transitive_path() {
        let links = chain();
        assert!(has_path(&links, "A", "C"));
        assert!(!has_path(&links, "C", "A"));
        assert!(has_path(&links, "B", "B"));
    }

    #[test]
    fn path_search_terminates_on_cyclic_input() {
        let links = vec![Link::new("A", "B"), Link::new("B", "A")];
        assert!(!has_path(&links, "A", "Z"));
    }

    #[test]
    fn rejects_self_loop_before_other_checks() {
        let links = chain();
        let err = check_link(&links, &Link::new("B", "B")).unwrap_err();
        assert_eq!(err, Rejection::SelfLoop { node: "B".into() });
    }

    #[test]
    fn rejects_duplicate_pair() {
        let links = chain();
        let err = check_link(&links, &Link::new("A", "B")).unwrap_err();
        assert!(matches!(err, Rejection::DuplicateLink { .. }));
    }

    #[test]
    fn rejects_cycle_but_allows_shortcut() {
        let links = chain();
        assert!(matches!(
            check_link(&links, &Link::new("C", "A")),
            Err(Rejection::CycleDetected { .. })
        ));
        assert!(check_link(&links, &Link::new("A", "C")).is_ok());
    }

    #[test]
    fn reverse_direction_is_a_cycle_not_a_duplicate() {
        let links = vec![Link::new("A", "B")];
        assert!(matches!(
            check_link(&links, &Link::new("B", "A")),
            Err(Rejection::CycleDetected { .. })
        ));
    }

    #[test]
    fn inspect_reports_problems() {
        let nodes = vec![
            Node::new("A", 0.0, 0.0, "switch"),
            Node::new("B", 0.0, 0.0, "switch"),
            Node::new("B", 0.0, 0.0, "switch"),
        ];
        let links = vec![
            Link::new("A", "B"),
            Link::new("A", "B"),
            Link::new("A", "B"),
            Link::new("B", "A"),
            Link::new("B", "ghost"),
        ];

        let report = inspect(&nodes, &links);
        assert_eq!(report.node_count, 3);
        assert_eq!(report.link_count, 5);
        assert_eq!(report.duplicate_node_ids, vec![NodeId::from("B")]);
        assert_eq!(report.duplicate_links.len(), 1);
        assert_eq!(
            report.dangling_links,
            vec![(NodeId::from("B"), NodeId::from("ghost"))]
        );
        assert!(report.is_cyclic);
        assert!(report.topological_order.is_none());
        assert!(!report.is_clean());
    }

    #[test]
    fn inspect_orders_acyclic_graph() {
        let nodes = vec![
            Node::new("C", 0.0, 0.0, "switch"),
            Node::new("B", 0.0, 0.0, "switch"),
            Node::new("A", 0.0, 0.0, "switch"),
        ];
        let report = inspect(&nodes, &chain());

        assert!(report.is_clean());
        let order = report.topological_order.unwrap();
        let pos = |id: &str| order.iter().position(|n| n == id).unwrap();
        assert!(pos("A") < pos("B"));
        assert!(pos("B") < pos("C"));
    }
}
