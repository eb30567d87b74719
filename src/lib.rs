pub mod common;
pub mod drag;
pub mod error;
pub mod layout_engine;
pub mod registry;

pub use common::config::{Settings, ShowBehavior};
pub use common::geometry::{Point, Rect};
pub use drag::{DropZone, HighlightChange};
pub use error::DockError;
pub use layout_engine::{
    ContentState, DockEngine, EventResponse, GestureEvent, LayoutTree, NodeId, Orientation,
};
pub use registry::{ContentHandle, ContentId, ContentRegistry};
