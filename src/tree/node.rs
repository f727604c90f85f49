//! Node state tracked during history replay.

use crate::types::NodeKind;

/// Working state for one path in the node table.
///
/// This is the arena entry, not the emitted tree node: parent/child
/// relationships live in the builder's index and are materialized only at
/// snapshot time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeState {
    pub kind: NodeKind,
    /// Timestamp of the event that brought this node into existence, or of
    /// its most recent resurrection.
    pub created_at: i64,
    /// Most recent touch of this node or, for directories, any descendant.
    pub last_modified: i64,
    /// Set by a delete event, cleared again when the path is re-added.
    pub deleted_at: Option<i64>,
}

impl NodeState {
    pub fn new(kind: NodeKind, timestamp: i64) -> Self {
        Self {
            kind,
            created_at: timestamp,
            last_modified: timestamp,
            deleted_at: None,
        }
    }

    /// Whether the node participates in the emitted tree.
    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}
