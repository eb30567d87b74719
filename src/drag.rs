//! Drag gesture state and drop-zone classification.
//!
//! The state data lives here; the topology side effects of a commit or a
//! restore are driven by [`crate::layout_engine::DockEngine`], which owns
//! both this state and the tree it mutates.

use crate::common::geometry::{Point, Rect};
use crate::layout_engine::{NodeId, Orientation};
use crate::registry::ContentId;

/// Where a drop over a panel would land.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropZone {
    /// No panel under the pointer.
    None,
    /// Central region: append as a tab of `target`.
    Center { target: NodeId },
    /// Edge region: split `target`, putting the dragged item on the
    /// `insert_before` side of the new splitter.
    Split {
        target: NodeId,
        orientation: Orientation,
        insert_before: bool,
    },
}

impl DropZone {
    pub fn target(self) -> Option<NodeId> {
        match self {
            DropZone::None => None,
            DropZone::Center { target } | DropZone::Split { target, .. } => Some(target),
        }
    }
}

/// Maps a pointer position over a panel's rect to a drop zone. The outer
/// `edge_margin` fraction of each axis classifies as that edge; everything
/// else is the center.
pub fn classify_drop(target: NodeId, rect: Rect, pos: Point, edge_margin: f64) -> DropZone {
    if !rect.contains(pos) {
        return DropZone::None;
    }
    let x_margin = rect.width * edge_margin;
    let y_margin = rect.height * edge_margin;
    let center = Rect::new(
        rect.x + x_margin,
        rect.y + y_margin,
        rect.width - 2.0 * x_margin,
        rect.height - 2.0 * y_margin,
    );
    if center.contains(pos) {
        DropZone::Center { target }
    } else if pos.y < rect.y + y_margin {
        DropZone::Split { target, orientation: Orientation::Vertical, insert_before: true }
    } else if pos.y >= rect.y + rect.height - y_margin {
        DropZone::Split { target, orientation: Orientation::Vertical, insert_before: false }
    } else if pos.x < rect.x + x_margin {
        DropZone::Split { target, orientation: Orientation::Horizontal, insert_before: true }
    } else if pos.x >= rect.x + rect.width - x_margin {
        DropZone::Split { target, orientation: Orientation::Horizontal, insert_before: false }
    } else {
        // Corner overlap outside the center rect but past both edge bands
        // cannot occur with margins < 0.5; treat as center for safety.
        DropZone::Center { target }
    }
}

/// The rect the render layer should highlight for a classified zone.
pub fn highlight_rect(zone: DropZone, target_rect: Rect) -> Option<Rect> {
    match zone {
        DropZone::None => None,
        DropZone::Center { .. } => Some(target_rect),
        DropZone::Split { orientation, insert_before, .. } => Some(match (orientation, insert_before) {
            (Orientation::Vertical, true) => target_rect.top_half(),
            (Orientation::Vertical, false) => target_rect.bottom_half(),
            (Orientation::Horizontal, true) => target_rect.left_half(),
            (Orientation::Horizontal, false) => target_rect.right_half(),
        }),
    }
}

/// Request to the render layer for the transient drop highlight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HighlightChange {
    Show(Rect),
    Hide,
}

/// Ephemeral per-gesture state; at most one session exists at a time.
#[derive(Debug)]
pub struct DragSession {
    pub content: ContentId,
    pub title: String,
    pub source_panel: NodeId,
    pub source_index: usize,
    pub zone: DropZone,
}

#[derive(Default, Debug)]
pub enum DragState {
    #[default]
    Idle,
    /// Pointer down on a tab; not yet a drag until the threshold is
    /// crossed. Release here is a plain click.
    PressArmed {
        panel: NodeId,
        index: usize,
        origin: Point,
    },
    Dragging(DragSession),
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging(_))
    }
}
