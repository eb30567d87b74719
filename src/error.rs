use thiserror::Error;

use crate::layout_engine::NodeId;
use crate::registry::ContentId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DockError {
    /// Lookup of an unregistered content id. Indicates an invariant breach
    /// in the caller, never swallowed.
    #[error("unknown content id {0:?}")]
    UnknownId(ContentId),
    /// Inserting a content item into a panel that already lists it.
    #[error("content {0:?} is already present in panel {1:?}")]
    Duplicate(ContentId, NodeId),
    /// Out-of-range tab index for a panel.
    #[error("index {index} out of range for panel {panel:?} of {len} tabs")]
    IndexOutOfRange { panel: NodeId, index: usize, len: usize },
    /// The drop target stopped resolving to a live panel between
    /// classification and commit. Expected and recoverable: the drag
    /// controller converts this into a restore.
    #[error("target {0:?} is not a live panel")]
    TargetNotFound(NodeId),
    /// Unregistering a content item that is still placed in a panel.
    #[error("content {0:?} is still placed in panel {1:?}; detach it first")]
    InUse(ContentId, NodeId),
}
