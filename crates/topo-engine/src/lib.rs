//! Topology Engine (topo-engine)
//!
//! Owns a directed graph of nodes and links and is the only way to change it:
//!
//! - every mutation is validated (no self-loops, no parallel links, no cycles,
//!   critical nodes cannot be removed)
//! - committed mutations are undoable; undo/redo move whole snapshots
//! - every commit, undo and redo appends to a capacity-bounded audit trail
//! - a single listener receives the full state after each commit
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use topo_engine::prelude::*;
//!
//! let mut topo = TopologyHandle::new();
//! topo.add_node(Node::new("A", 0.0, 0.0, "router"))?;
//! topo.add_node(Node::new("B", 10.0, 0.0, "switch"))?;
//! topo.add_link(Link::new("A", "B"))?;
//!
//! // B -> A would close a cycle
//! assert!(topo.add_link(Link::new("B", "A")).is_err());
//!
//! topo.undo()?;
//! assert_eq!(topo.links().len(), 0);
//! ```

// Core modules
pub mod api;
pub mod config;
pub mod dag;
pub mod error;
pub mod history;
pub mod logging;
pub mod metrics;
pub mod types;

pub mod handle;
pub mod script;
pub mod shared;

// Re-exports
pub use api::*;
pub use config::EngineConfig;
pub use error::*;
pub use handle::TopologyHandle;
pub use types::*;

pub mod prelude {
    pub use crate::api::{
        ChangeListener, CommitReceipt, HistoryControl, LinkOperations, MutationResult,
        NodeOperations, TopologyView,
    };
    pub use crate::config::EngineConfig;
    pub use crate::error::{NotifyError, Rejection};
    pub use crate::handle::TopologyHandle;
    pub use crate::logging::{AuditAction, AuditLogEntry, TargetType};
    pub use crate::metrics::{MetricSample, MetricSource};
    pub use crate::script::{replay, Operation, ReplaySummary};
    pub use crate::shared::SharedTopology;
    pub use crate::types::{GraphSnapshot, Link, Node, NodeId, NodePatch, TopologyState};
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
