pub mod engine;
pub mod tree;

pub use engine::{ContentState, DockEngine, EventResponse, GestureEvent};
pub use tree::{LayoutTree, NodeId, NodeKind, Orientation, Panel};
