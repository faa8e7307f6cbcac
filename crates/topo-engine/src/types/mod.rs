use crate::logging::AuditLogEntry;
use im::Vector;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Stable identity key of a node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A positioned vertex of the topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_bind: Option<String>,
    /// Critical nodes cannot be removed, only updated.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_critical: bool,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, x: f64, y: f64, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            node_type: node_type.into(),
            width: None,
            height: None,
            icon: None,
            metric_bind: None,
            is_critical: false,
        }
    }

    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    #[must_use]
    pub fn with_metric_bind(mut self, bind: impl Into<String>) -> Self {
        self.metric_bind = Some(bind.into());
        self
    }

    #[must_use]
    pub fn critical(mut self) -> Self {
        self.is_critical = true;
        self
    }

    /// Merge every field set in `patch` into this node. The id is never touched.
    pub fn apply(&mut self, patch: &NodePatch) {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(node_type) = &patch.node_type {
            self.node_type.clone_from(node_type);
        }
        if let Some(width) = patch.width {
            self.width = Some(width);
        }
        if let Some(height) = patch.height {
            self.height = Some(height);
        }
        if let Some(icon) = &patch.icon {
            self.icon = Some(icon.clone());
        }
        if let Some(bind) = &patch.metric_bind {
            self.metric_bind = Some(bind.clone());
        }
        if let Some(critical) = patch.is_critical {
            self.is_critical = critical;
        }
    }
}

/// Partial node changes for `update_node`. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_critical: Option<bool>,
}

impl NodePatch {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    #[must_use]
    pub fn with_x(mut self, x: f64) -> Self {
        self.x = Some(x);
        self
    }

    #[must_use]
    pub fn with_y(mut self, y: f64) -> Self {
        self.y = Some(y);
        self
    }

    #[must_use]
    pub fn with_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = Some(node_type.into());
        self
    }

    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    #[must_use]
    pub fn with_metric_bind(mut self, bind: impl Into<String>) -> Self {
        self.metric_bind = Some(bind.into());
        self
    }

    #[must_use]
    pub fn with_critical(mut self, critical: bool) -> Self {
        self.is_critical = Some(critical);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Compact JSON rendering used as audit details.
    pub fn to_details(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}

/// Intermediate bend point of a rendered link.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub x: f64,
    pub y: f64,
}

/// A directed edge. Identity is the ordered `(src, dst)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub src: NodeId,
    pub dst: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_bind_sec: Option<String>,
    #[serde(rename = "isP2P", default, skip_serializing_if = "Option::is_none")]
    pub is_p2p: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_pos_primary: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_pos_secondary: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub breakpoints: Vec<Breakpoint>,
}

impl Link {
    pub fn new(src: impl Into<NodeId>, dst: impl Into<NodeId>) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
            style: None,
            link_type: None,
            metric_bind: None,
            metric_bind_sec: None,
            is_p2p: None,
            label_pos_primary: None,
            label_pos_secondary: None,
            breakpoints: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_metric_bind(mut self, bind: impl Into<String>) -> Self {
        self.metric_bind = Some(bind.into());
        self
    }

    #[must_use]
    pub fn with_secondary_bind(mut self, bind: impl Into<String>) -> Self {
        self.metric_bind_sec = Some(bind.into());
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    #[must_use]
    pub fn with_breakpoints(mut self, breakpoints: Vec<Breakpoint>) -> Self {
        self.breakpoints = breakpoints;
        self
    }

    /// True when `src` and `dst` match this link's ordered pair.
    pub fn is(&self, src: &str, dst: &str) -> bool {
        self.src == src && self.dst == dst
    }

    pub fn touches(&self, node: &str) -> bool {
        self.src == node || self.dst == node
    }

    /// Audit target id, `"src-dst"`.
    pub fn label(&self) -> String {
        link_label(self.src.as_str(), self.dst.as_str())
    }
}

pub(crate) fn link_label(src: &str, dst: &str) -> String {
    format!("{src}-{dst}")
}

/// Independent copy of `{nodes, links}` held by the history stacks.
///
/// Backed by persistent vectors, so cloning shares structure with the live
/// graph instead of copying it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vector<Node>,
    pub links: Vector<Link>,
}

impl GraphSnapshot {
    pub fn new(
        nodes: impl IntoIterator<Item = Node>,
        links: impl IntoIterator<Item = Link>,
    ) -> Self {
        Self {
            nodes: nodes.into_iter().collect(),
            links: links.into_iter().collect(),
        }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn link(&self, src: &str, dst: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.is(src, dst))
    }
}

/// Full engine state handed to the change listener after every commit.
///
/// Also the on-disk shape used by the CLI harness.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyState {
    pub nodes: Vector<Node>,
    pub links: Vector<Link>,
    #[serde(default)]
    pub audit_logs: Vec<AuditLogEntry>,
}

impl TopologyState {
    pub fn graph(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.clone(),
            links: self.links.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_serializes_with_wire_names() {
        let node = Node::new("core", 1.5, 2.0, "router")
            .with_metric_bind("core: ICMP ping")
            .critical();
        let json = serde_json::to_value(&node).unwrap();

        assert_eq!(json["type"], "router");
        assert_eq!(json["metricBind"], "core: ICMP ping");
        assert_eq!(json["isCritical"], true);
        assert!(json.get("width").is_none());
    }

    #[test]
    fn node_without_critical_flag_deserializes() {
        let node: Node =
            serde_json::from_str(r#"{"id":"a","x":0,"y":0,"type":"switch"}"#).unwrap();
        assert!(!node.is_critical);
        assert_eq!(node.id, "a");
    }

    #[test]
    fn patch_merges_only_set_fields() {
        let mut node = Node::new("a", 0.0, 0.0, "switch").with_icon("fa-wifi");
        node.apply(&NodePatch::new().with_x(100.0).with_critical(true));

        assert_eq!(node.x, 100.0);
        assert_eq!(node.y, 0.0);
        assert_eq!(node.icon.as_deref(), Some("fa-wifi"));
        assert!(node.is_critical);
    }

    #[test]
    fn patch_details_are_compact_json() {
        let patch = NodePatch::new().with_x(100.0);
        assert_eq!(patch.to_details(), r#"{"x":100.0}"#);
        assert!(NodePatch::new().is_empty());
    }

    #[test]
    fn link_p2p_flag_keeps_upper_case_key() {
        let mut link = Link::new("a", "b");
        link.is_p2p = Some(true);
        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["isP2P"], true);
        assert_eq!(link.label(), "a-b");
    }

    #[test]
    fn snapshot_clone_is_independent() {
        let original = GraphSnapshot::new([Node::new("a", 0.0, 0.0, "switch")], []);
        let mut copy = original.clone();
        copy.nodes.push_back(Node::new("b", 0.0, 0.0, "switch"));

        assert_eq!(original.nodes.len(), 1);
        assert_eq!(copy.nodes.len(), 2);
    }
}
