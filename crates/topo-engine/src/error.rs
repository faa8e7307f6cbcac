//! Error types for the topology engine
//!
//! Mutations never fail hard. A refused mutation comes back as a
//! [`Rejection`], which leaves graph, history and audit log untouched.

use crate::types::NodeId;
use std::path::PathBuf;

/// Why a mutation was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// Link would connect a node to itself
    #[error("cannot connect node '{node}' to itself")]
    SelfLoop { node: NodeId },

    /// A link with the same ordered pair already exists
    #[error("link {src} -> {dst} already exists")]
    DuplicateLink { src: NodeId, dst: NodeId },

    /// `dst` already reaches `src`, so the link would close a cycle
    #[error("link {src} -> {dst} would create a cycle")]
    CycleDetected { src: NodeId, dst: NodeId },

    /// Critical nodes cannot be removed
    #[error("node '{id}' is critical and cannot be removed")]
    CriticalNode { id: NodeId },

    /// Target node missing (strict targets only)
    #[error("node '{id}' not found")]
    NodeNotFound { id: NodeId },

    /// Target link missing (strict targets only)
    #[error("link {src} -> {dst} not found")]
    LinkNotFound { src: NodeId, dst: NodeId },

    /// Undo requested with an empty past stack
    #[error("nothing to undo")]
    NothingToUndo,

    /// Redo requested with an empty future stack
    #[error("nothing to redo")]
    NothingToRedo,
}

impl Rejection {
    /// True for refusals caused by an invalid edge.
    pub fn is_invalid_link(&self) -> bool {
        matches!(
            self,
            Rejection::SelfLoop { .. }
                | Rejection::DuplicateLink { .. }
                | Rejection::CycleDetected { .. }
        )
    }

    /// True when history was exhausted rather than input being invalid.
    pub fn is_history_exhausted(&self) -> bool {
        matches!(self, Rejection::NothingToUndo | Rejection::NothingToRedo)
    }
}

/// Failure reported by a change listener. Logged, never rolled back.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("listener failed: {0}")]
pub struct NotifyError(pub String);

impl NotifyError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Invalid or unreadable engine configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("audit capacity must be at least 1")]
    ZeroAuditCapacity,

    #[error("history limit must be at least 1 when set")]
    ZeroHistoryLimit,

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
