//! The engine façade: owns the tree, the registry, the drag state, focus
//! tracking, and the pending-cleanup queue. Every public command is atomic
//! from the caller's point of view; structural cleanup triggered by a
//! removal is queued and drained at the end of the command, after the
//! triggering mutation has fully applied.

use anyhow::bail;
use tracing::{debug, trace, warn};

use crate::common::collections::HashSet;
use crate::common::config::{Settings, ShowBehavior};
use crate::common::geometry::{Point, Rect};
use crate::drag::{DragSession, DragState, DropZone, HighlightChange, classify_drop, highlight_rect};
use crate::error::DockError;
use crate::layout_engine::tree::{LayoutTree, NodeId, NodeKind, Orientation};
use crate::registry::{ContentHandle, ContentId, ContentRegistry};

/// Abstract gesture stream from the host: positions in the same coordinate
/// space as the area given to [`DockEngine::set_area`]. The host resolves
/// which tab a press landed on (it owns the tab-strip geometry); everything
/// after that is the engine's job.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    TabPressed { panel: NodeId, index: usize, pos: Point },
    PointerMoved { pos: Point },
    PointerReleased { pos: Point },
    /// External cancellation (focus loss, escape). Same effect as dropping
    /// over nothing.
    Cancelled,
}

/// What the host must do after a command: update the highlight overlay
/// and/or re-render panels.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct EventResponse {
    pub highlight: Option<HighlightChange>,
    pub layout_changed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentState {
    pub id: ContentId,
    pub title: String,
    pub visible: bool,
}

pub struct DockEngine {
    settings: Settings,
    tree: LayoutTree,
    registry: ContentRegistry,
    drag: DragState,
    area: Rect,
    focused_panel: Option<NodeId>,
    pending_cleanup: Vec<NodeId>,
}

impl Default for DockEngine {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl DockEngine {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            tree: LayoutTree::new(),
            registry: ContentRegistry::default(),
            drag: DragState::default(),
            area: Rect::default(),
            focused_panel: None,
            pending_cleanup: Vec::new(),
        }
    }

    pub fn tree(&self) -> &LayoutTree {
        &self.tree
    }

    pub fn registry(&self) -> &ContentRegistry {
        &self.registry
    }

    /// Content area rect, used for hit-testing drag positions.
    pub fn set_area(&mut self, area: Rect) {
        self.area = area;
    }

    pub fn focus_panel(&mut self, panel: NodeId) -> Result<(), DockError> {
        if !self.tree.is_panel(panel) {
            return Err(DockError::TargetNotFound(panel));
        }
        self.focused_panel = Some(panel);
        Ok(())
    }

    /// The last-interacted panel, falling back to the first panel in
    /// pre-order when none survives.
    pub fn focused_panel(&self) -> NodeId {
        match self.focused_panel {
            Some(panel) if self.tree.is_panel(panel) => panel,
            _ => self.tree.first_panel(),
        }
    }

    /// Registers a content item and places it in the focused panel as the
    /// current tab. File-open glue per the boundary surface.
    pub fn open(&mut self, handle: ContentHandle, title: impl Into<String>) -> Result<ContentId, DockError> {
        let id = self.registry.register(handle, title);
        let panel = self.focused_panel();
        let index = self.tree.panel(panel)?.len();
        self.tree.panel_mut(panel)?.insert(panel, index, id)?;
        self.registry.set_location(id, Some(panel))?;
        self.tree.panel_mut(panel)?.set_current(id);
        self.focused_panel = Some(panel);
        debug!(?id, ?panel, "opened content");
        Ok(id)
    }

    /// Detaches (if visible) and unregisters, returning the host handle.
    pub fn close(&mut self, id: ContentId) -> Result<ContentHandle, DockError> {
        if let Some(panel) = self.registry.location_of(id)? {
            self.detach(id, panel)?;
        }
        let handle = self.registry.unregister(id)?;
        self.drain_cleanup();
        debug!(?id, "closed content");
        Ok(handle)
    }

    /// Hide a visible item or show a hidden one. Returns the new
    /// visibility. Showing re-tabs into the focused panel; only drags
    /// create splits (unless configured otherwise).
    pub fn toggle(&mut self, id: ContentId) -> Result<bool, DockError> {
        let visible = match self.registry.location_of(id)? {
            Some(panel) => {
                self.detach(id, panel)?;
                false
            }
            None => {
                let target = self.focused_panel();
                match self.settings.show_behavior {
                    ShowBehavior::RetabFocused => {
                        let index = self.tree.panel(target)?.len();
                        self.tree.panel_mut(target)?.insert(target, index, id)?;
                        self.registry.set_location(id, Some(target))?;
                        self.tree.panel_mut(target)?.set_current(id);
                        self.focused_panel = Some(target);
                    }
                    ShowBehavior::SplitFocused => {
                        let new_panel =
                            self.tree.split(target, id, Orientation::Horizontal, false)?;
                        self.registry.set_location(id, Some(new_panel))?;
                        self.focused_panel = Some(new_panel);
                    }
                }
                true
            }
        };
        self.drain_cleanup();
        debug!(?id, visible, "toggled content");
        Ok(visible)
    }

    /// Deterministic per-item visibility for the host's menu builder.
    pub fn content_states(&self) -> Vec<ContentState> {
        self.registry
            .ids()
            .map(|id| ContentState {
                id,
                title: self.registry.title_of(id).unwrap_or_default().to_owned(),
                visible: matches!(self.registry.location_of(id), Ok(Some(_))),
            })
            .collect()
    }

    pub fn set_title(&mut self, id: ContentId, title: impl Into<String>) -> Result<(), DockError> {
        self.registry.set_title(id, title)
    }

    pub fn handle_gesture(&mut self, event: GestureEvent) -> Result<EventResponse, DockError> {
        let response = match event {
            GestureEvent::TabPressed { panel, index, pos } => self.on_tab_pressed(panel, index, pos),
            GestureEvent::PointerMoved { pos } => self.on_pointer_moved(pos)?,
            GestureEvent::PointerReleased { pos } => self.on_pointer_released(pos)?,
            GestureEvent::Cancelled => self.on_cancelled()?,
        };
        self.drain_cleanup();
        Ok(response)
    }

    fn on_tab_pressed(&mut self, panel: NodeId, index: usize, pos: Point) -> EventResponse {
        if self.drag.is_dragging() {
            warn!(?panel, index, "tab press ignored while a drag is in flight");
            return EventResponse::default();
        }
        let live = self.tree.panel(panel).map(|p| index < p.len()).unwrap_or(false);
        if !live {
            // The host's hit test can race a layout change; not a fault.
            trace!(?panel, index, "stale tab press ignored");
            return EventResponse::default();
        }
        self.drag = DragState::PressArmed { panel, index, origin: pos };
        EventResponse::default()
    }

    fn on_pointer_moved(&mut self, pos: Point) -> Result<EventResponse, DockError> {
        match self.drag {
            DragState::Idle => Ok(EventResponse::default()),
            DragState::PressArmed { panel, index, origin } => {
                if origin.manhattan_distance(pos) < self.settings.drag_threshold {
                    return Ok(EventResponse::default());
                }
                self.begin_drag(panel, index, pos)
            }
            DragState::Dragging(ref session) => {
                let zone = self.classify_at(pos);
                if zone == session.zone {
                    return Ok(EventResponse::default());
                }
                let highlight = self.highlight_for(zone);
                if let DragState::Dragging(session) = &mut self.drag {
                    session.zone = zone;
                }
                Ok(EventResponse { highlight: Some(highlight), layout_changed: false })
            }
        }
    }

    fn classify_at(&self, pos: Point) -> DropZone {
        match self.tree.panel_at(self.area, pos) {
            Some((target, rect)) => classify_drop(target, rect, pos, self.settings.edge_margin),
            None => DropZone::None,
        }
    }

    fn begin_drag(&mut self, panel: NodeId, index: usize, pos: Point) -> Result<EventResponse, DockError> {
        let stale = self.tree.panel(panel).map(|p| index >= p.len()).unwrap_or(true);
        if stale {
            trace!(?panel, index, "armed press no longer resolves; dropping it");
            self.drag = DragState::Idle;
            return Ok(EventResponse::default());
        }
        let content = self.tree.panel_mut(panel)?.remove_at(panel, index)?;
        let title = self.registry.title_of(content)?.to_owned();
        // Deliberately detached: an in-flight item has no location, so
        // concurrent lookups see "not placed" rather than a stale panel.
        self.registry.set_location(content, None)?;

        let zone = self.classify_at(pos);
        debug!(?content, ?panel, index, "drag started");
        self.drag = DragState::Dragging(DragSession {
            content,
            title,
            source_panel: panel,
            source_index: index,
            zone,
        });
        Ok(EventResponse {
            highlight: Some(self.highlight_for(zone)),
            layout_changed: true,
        })
    }

    fn on_pointer_released(&mut self, pos: Point) -> Result<EventResponse, DockError> {
        match std::mem::take(&mut self.drag) {
            DragState::Idle => Ok(EventResponse::default()),
            DragState::PressArmed { panel, index, .. } => {
                // Plain click: select the pressed tab.
                if let Ok(p) = self.tree.panel(panel)
                    && let Some(&content) = p.tabs().get(index)
                {
                    self.tree.panel_mut(panel)?.set_current(content);
                    self.focused_panel = Some(panel);
                    return Ok(EventResponse { highlight: None, layout_changed: true });
                }
                Ok(EventResponse::default())
            }
            DragState::Dragging(mut session) => {
                session.zone = self.classify_at(pos);
                self.commit_drop(session)
            }
        }
    }

    fn on_cancelled(&mut self) -> Result<EventResponse, DockError> {
        match std::mem::take(&mut self.drag) {
            DragState::Dragging(session) => {
                debug!(content = ?session.content, "drag cancelled");
                self.restore(session)
            }
            _ => Ok(EventResponse::default()),
        }
    }

    /// Terminal path for a released drag. `TargetNotFound` from the tree is
    /// the expected race with a concurrent toggle and falls back to a
    /// restore; other errors propagate untouched, leaving the tree in its
    /// last consistent state.
    fn commit_drop(&mut self, session: DragSession) -> Result<EventResponse, DockError> {
        if !self.registry.contains(session.content) {
            warn!(content = ?session.content, "dragged content vanished; dropping session");
            return Ok(EventResponse { highlight: Some(HighlightChange::Hide), layout_changed: true });
        }
        match session.zone {
            DropZone::None => self.restore(session),
            DropZone::Center { target } => {
                let Ok(len) = self.tree.panel(target).map(|p| p.len()) else {
                    warn!(?target, "drop target vanished before commit; restoring");
                    return self.restore(session);
                };
                self.tree.panel_mut(target)?.insert(target, len, session.content)?;
                self.registry.set_location(session.content, Some(target))?;
                self.tree.panel_mut(target)?.set_current(session.content);
                self.focused_panel = Some(target);
                self.schedule_cleanup(session.source_panel);
                debug!(content = ?session.content, ?target, "re-tabbed by drop");
                Ok(EventResponse { highlight: Some(HighlightChange::Hide), layout_changed: true })
            }
            DropZone::Split { target, orientation, insert_before } => {
                match self.tree.split(target, session.content, orientation, insert_before) {
                    Ok(new_panel) => {
                        self.registry.set_location(session.content, Some(new_panel))?;
                        self.focused_panel = Some(new_panel);
                        self.schedule_cleanup(session.source_panel);
                        debug!(content = ?session.content, ?new_panel, "split by drop");
                        Ok(EventResponse {
                            highlight: Some(HighlightChange::Hide),
                            layout_changed: true,
                        })
                    }
                    Err(DockError::TargetNotFound(_)) => {
                        warn!(?target, "drop target vanished before split; restoring");
                        self.restore(session)
                    }
                    Err(err) => Err(err),
                }
            }
        }
    }

    /// Failed or rejected drop: snap the item back to its source panel at
    /// its original index, or to the first panel when the source is gone.
    fn restore(&mut self, session: DragSession) -> Result<EventResponse, DockError> {
        if !self.registry.contains(session.content) {
            warn!(content = ?session.content, "dragged content vanished; nothing to restore");
            return Ok(EventResponse { highlight: Some(HighlightChange::Hide), layout_changed: true });
        }
        let (panel, index) = if self.tree.is_panel(session.source_panel) {
            (session.source_panel, session.source_index)
        } else {
            let fallback = self.tree.first_panel();
            warn!(source = ?session.source_panel, ?fallback, "source panel gone; restoring to fallback");
            (fallback, usize::MAX)
        };
        self.tree.panel_mut(panel)?.insert(panel, index, session.content)?;
        self.registry.set_location(session.content, Some(panel))?;
        self.tree.panel_mut(panel)?.set_current(session.content);
        self.focused_panel = Some(panel);
        trace!(content = ?session.content, title = %session.title, ?panel, "restored dragged tab");
        Ok(EventResponse { highlight: Some(HighlightChange::Hide), layout_changed: true })
    }

    fn highlight_for(&self, zone: DropZone) -> HighlightChange {
        let rect = zone
            .target()
            .and_then(|target| {
                self.tree
                    .layout(self.area)
                    .into_iter()
                    .find(|&(node, _)| node == target)
            })
            .and_then(|(_, rect)| highlight_rect(zone, rect));
        match rect {
            Some(rect) => HighlightChange::Show(rect),
            None => HighlightChange::Hide,
        }
    }

    fn detach(&mut self, id: ContentId, panel: NodeId) -> Result<(), DockError> {
        let Some(index) = self.tree.panel(panel)?.index_of(id) else {
            // Registry said the panel hosts the item but the panel does not
            // list it. Heal the registration rather than mutate further on
            // top of a broken invariant.
            warn!(?id, ?panel, "registry location disagrees with panel contents; healing");
            self.registry.set_location(id, None)?;
            return Ok(());
        };
        self.tree.panel_mut(panel)?.remove_at(panel, index)?;
        self.registry.set_location(id, None)?;
        self.schedule_cleanup(panel);
        Ok(())
    }

    fn schedule_cleanup(&mut self, node: NodeId) {
        self.pending_cleanup.push(node);
    }

    /// Safe point at the end of every public command: the triggering
    /// mutation has fully applied and no caller holds a node reference.
    fn drain_cleanup(&mut self) {
        while let Some(node) = self.pending_cleanup.pop() {
            self.tree.collapse_if_degenerate(node);
        }
        if let Some(focused) = self.focused_panel
            && !self.tree.is_panel(focused)
        {
            self.focused_panel = None;
        }
    }

    /// Structural consistency check used by tests: registry and tree must
    /// agree exactly, splitters must be non-degenerate, parent links must
    /// be coherent.
    pub fn validate(&self) -> anyhow::Result<()> {
        let panels = self.tree.panels();
        if panels.is_empty() {
            bail!("tree has no panels");
        }
        let mut listed: HashSet<ContentId> = HashSet::default();
        for &panel in &panels {
            let p = self.tree.panel(panel)?;
            for &id in p.tabs() {
                if !listed.insert(id) {
                    bail!("content {id:?} listed by more than one panel");
                }
                match self.registry.location_of(id) {
                    Ok(Some(loc)) if loc == panel => {}
                    Ok(loc) => bail!("content {id:?} listed by {panel:?} but registry says {loc:?}"),
                    Err(e) => bail!("content {id:?} listed by {panel:?} but unregistered: {e}"),
                }
            }
        }
        for id in self.registry.ids() {
            if let Ok(Some(panel)) = self.registry.location_of(id)
                && !listed.contains(&id)
            {
                bail!("registry places {id:?} in {panel:?} but no panel lists it");
            }
        }
        self.validate_node(self.tree.root(), None)?;
        Ok(())
    }

    fn validate_node(&self, node: NodeId, parent: Option<NodeId>) -> anyhow::Result<()> {
        if self.tree.parent(node) != parent {
            bail!("node {node:?} has parent {:?}, expected {parent:?}", self.tree.parent(node));
        }
        match self.tree.kind(node) {
            Some(NodeKind::Panel(_)) => Ok(()),
            Some(NodeKind::Split { children, sizes, .. }) => {
                if children.len() < 2 {
                    bail!("splitter {node:?} has {} children", children.len());
                }
                if children.len() != sizes.len() {
                    bail!("splitter {node:?} has mismatched sizes");
                }
                for &child in children {
                    self.validate_node(child, Some(node))?;
                }
                Ok(())
            }
            None => bail!("dangling node {node:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;

    const AREA: Rect = Rect { x: 0.0, y: 0.0, width: 100.0, height: 100.0 };

    fn engine_with(n: usize) -> (DockEngine, Vec<ContentId>) {
        let mut engine = DockEngine::default();
        engine.set_area(AREA);
        let ids = (0..n)
            .map(|i| engine.open(ContentHandle(i as u64), format!("tab {i}")).unwrap())
            .collect();
        (engine, ids)
    }

    fn drag(engine: &mut DockEngine, panel: NodeId, index: usize, from: Point, to: Point) {
        engine
            .handle_gesture(GestureEvent::TabPressed { panel, index, pos: from })
            .unwrap();
        engine.handle_gesture(GestureEvent::PointerMoved { pos: to }).unwrap();
        engine.handle_gesture(GestureEvent::PointerReleased { pos: to }).unwrap();
    }

    #[test]
    fn open_places_content_in_the_focused_panel() {
        let (engine, ids) = engine_with(3);
        let root = engine.tree().root();
        assert_eq!(engine.tree().panel(root).unwrap().tabs(), &ids[..]);
        assert_eq!(engine.tree().panel(root).unwrap().current(), Some(ids[2]));
        engine.validate().unwrap();
    }

    #[test]
    fn toggle_hide_removes_and_clears_location() {
        // Scenario 1: [1,2,3], hide 2.
        let (mut engine, ids) = engine_with(3);
        let root = engine.tree().root();

        assert_eq!(engine.toggle(ids[1]), Ok(false));
        assert_eq!(engine.tree().panel(root).unwrap().tabs(), &[ids[0], ids[2]]);
        assert_eq!(engine.registry().location_of(ids[1]), Ok(None));
        engine.validate().unwrap();
    }

    #[test]
    fn toggle_show_retabs_into_the_focused_panel() {
        // Scenario 2: from the hidden state, show appends, never splits.
        let (mut engine, ids) = engine_with(3);
        let root = engine.tree().root();
        engine.toggle(ids[1]).unwrap();

        assert_eq!(engine.toggle(ids[1]), Ok(true));
        assert_eq!(engine.tree().panel(root).unwrap().tabs(), &[ids[0], ids[2], ids[1]]);
        assert_eq!(engine.tree().panel(root).unwrap().current(), Some(ids[1]));
        assert_eq!(engine.registry().location_of(ids[1]), Ok(Some(root)));
        engine.validate().unwrap();
    }

    #[test]
    fn toggle_show_can_split_when_configured() {
        let settings = Settings {
            show_behavior: ShowBehavior::SplitFocused,
            ..Settings::default()
        };
        let mut engine = DockEngine::new(settings);
        engine.set_area(AREA);
        let a = engine.open(ContentHandle(1), "a").unwrap();
        let b = engine.open(ContentHandle(2), "b").unwrap();
        let root = engine.tree().root();

        engine.toggle(b).unwrap();
        engine.toggle(b).unwrap();

        assert_ne!(engine.tree().root(), root);
        assert_eq!(engine.tree().panels().len(), 2);
        assert_eq!(engine.registry().location_of(a), Ok(Some(root)));
        engine.validate().unwrap();
    }

    #[test]
    fn bottom_edge_drop_on_own_panel_splits_vertically() {
        // Scenario 3: drag item 3 to the bottom edge of its own panel.
        let (mut engine, ids) = engine_with(3);
        let root = engine.tree().root();

        drag(&mut engine, root, 2, Point::new(50.0, 2.0), Point::new(50.0, 90.0));

        let splitter = engine.tree().root();
        assert_ne!(splitter, root);
        match engine.tree().kind(splitter).unwrap() {
            NodeKind::Split { orientation, children, .. } => {
                assert_eq!(*orientation, Orientation::Vertical);
                assert_eq!(children[0], root);
                assert_eq!(children.len(), 2);
                let new_panel = children[1];
                assert_eq!(engine.tree().panel(new_panel).unwrap().tabs(), &[ids[2]]);
                assert_eq!(engine.registry().location_of(ids[2]), Ok(Some(new_panel)));
            }
            NodeKind::Panel(_) => panic!("expected a splitter root"),
        }
        assert_eq!(engine.tree().panel(root).unwrap().tabs(), &[ids[0], ids[1]]);
        engine.validate().unwrap();
    }

    #[test]
    fn drop_outside_any_panel_restores_at_original_index() {
        // Scenario 4: drop in the void; tree unchanged, index preserved.
        let (mut engine, ids) = engine_with(3);
        let root = engine.tree().root();

        drag(&mut engine, root, 0, Point::new(50.0, 2.0), Point::new(500.0, 500.0));

        assert_eq!(engine.tree().root(), root);
        assert_eq!(engine.tree().panel(root).unwrap().tabs(), &ids[..]);
        assert_eq!(engine.registry().location_of(ids[0]), Ok(Some(root)));
        engine.validate().unwrap();
    }

    #[test]
    fn two_splits_then_hiding_both_fully_collapses() {
        // Scenario 5: sequential splits, hidden in reverse order.
        let (mut engine, ids) = engine_with(3);
        let root = engine.tree().root();

        drag(&mut engine, root, 2, Point::new(50.0, 2.0), Point::new(50.0, 90.0));
        // Item 3 now lives in the bottom panel (y in [50,100)); split that
        // panel again by dragging item 2 onto its right edge.
        drag(&mut engine, root, 1, Point::new(30.0, 2.0), Point::new(98.0, 75.0));
        assert_eq!(engine.tree().panels().len(), 3);
        engine.validate().unwrap();

        engine.toggle(ids[1]).unwrap();
        engine.toggle(ids[2]).unwrap();

        assert_eq!(engine.tree().root(), root);
        assert_eq!(engine.tree().panels(), vec![root]);
        assert_eq!(engine.tree().panel(root).unwrap().tabs(), &[ids[0]]);
        engine.validate().unwrap();
    }

    #[test]
    fn split_then_hide_round_trips_to_the_original_structure() {
        let (mut engine, ids) = engine_with(2);
        let root = engine.tree().root();
        let before = engine.tree().draw_tree();
        let before_tabs = engine.tree().panel(root).unwrap().tabs().to_vec();

        drag(&mut engine, root, 1, Point::new(50.0, 2.0), Point::new(50.0, 90.0));
        assert_eq!(engine.tree().panels().len(), 2);

        engine.toggle(ids[1]).unwrap();
        engine.toggle(ids[1]).unwrap();

        assert_eq!(engine.tree().root(), root);
        assert_eq!(engine.tree().draw_tree(), before);
        assert_eq!(engine.tree().panel(root).unwrap().tabs(), &before_tabs[..]);
        engine.validate().unwrap();
    }

    #[test]
    fn center_drop_on_another_panel_retabs() {
        let (mut engine, ids) = engine_with(3);
        let root = engine.tree().root();
        drag(&mut engine, root, 2, Point::new(50.0, 2.0), Point::new(50.0, 90.0));
        let bottom = engine
            .tree()
            .panel_at(AREA, Point::new(50.0, 75.0))
            .map(|(p, _)| p)
            .unwrap();

        // Drag item 1 from the top panel into the center of the bottom one.
        drag(&mut engine, root, 0, Point::new(20.0, 2.0), Point::new(50.0, 75.0));

        assert_eq!(engine.tree().panel(bottom).unwrap().tabs(), &[ids[2], ids[0]]);
        assert_eq!(engine.tree().panel(bottom).unwrap().current(), Some(ids[0]));
        assert_eq!(engine.tree().panel(root).unwrap().tabs(), &[ids[1]]);
        engine.validate().unwrap();
    }

    #[test]
    fn dragging_the_last_tab_out_collapses_the_source_panel() {
        let (mut engine, ids) = engine_with(2);
        let root = engine.tree().root();
        drag(&mut engine, root, 1, Point::new(50.0, 2.0), Point::new(50.0, 90.0));
        let bottom = engine
            .tree()
            .panel_at(AREA, Point::new(50.0, 75.0))
            .map(|(p, _)| p)
            .unwrap();

        // Move the only remaining top tab into the bottom panel: the top
        // panel empties and the splitter must fold away.
        drag(&mut engine, root, 0, Point::new(20.0, 2.0), Point::new(50.0, 75.0));

        assert_eq!(engine.tree().panels(), vec![bottom]);
        assert_eq!(engine.tree().root(), bottom);
        assert_eq!(engine.tree().panel(bottom).unwrap().tabs(), &[ids[1], ids[0]]);
        engine.validate().unwrap();
    }

    #[test]
    fn release_under_threshold_is_a_click() {
        let (mut engine, ids) = engine_with(3);
        let root = engine.tree().root();
        engine
            .handle_gesture(GestureEvent::TabPressed { panel: root, index: 0, pos: Point::new(10.0, 2.0) })
            .unwrap();
        engine
            .handle_gesture(GestureEvent::PointerMoved { pos: Point::new(12.0, 3.0) })
            .unwrap();
        engine
            .handle_gesture(GestureEvent::PointerReleased { pos: Point::new(12.0, 3.0) })
            .unwrap();

        assert_eq!(engine.tree().panel(root).unwrap().tabs(), &ids[..]);
        assert_eq!(engine.tree().panel(root).unwrap().current(), Some(ids[0]));
        engine.validate().unwrap();
    }

    #[test]
    fn crossing_the_threshold_detaches_the_item() {
        let (mut engine, ids) = engine_with(2);
        let root = engine.tree().root();
        engine
            .handle_gesture(GestureEvent::TabPressed { panel: root, index: 1, pos: Point::new(10.0, 2.0) })
            .unwrap();
        let response = engine
            .handle_gesture(GestureEvent::PointerMoved { pos: Point::new(50.0, 40.0) })
            .unwrap();

        assert!(response.layout_changed);
        assert_eq!(engine.tree().panel(root).unwrap().tabs(), &[ids[0]]);
        assert_eq!(engine.registry().location_of(ids[1]), Ok(None));
        assert_eq!(
            response.highlight,
            Some(HighlightChange::Show(AREA)),
            "center of the only panel highlights the whole panel"
        );
    }

    #[test]
    fn highlight_updates_only_when_the_zone_changes() {
        let (mut engine, _) = engine_with(2);
        let root = engine.tree().root();
        engine
            .handle_gesture(GestureEvent::TabPressed { panel: root, index: 1, pos: Point::new(10.0, 2.0) })
            .unwrap();
        engine
            .handle_gesture(GestureEvent::PointerMoved { pos: Point::new(50.0, 40.0) })
            .unwrap();

        let same_zone = engine
            .handle_gesture(GestureEvent::PointerMoved { pos: Point::new(55.0, 45.0) })
            .unwrap();
        assert_eq!(same_zone.highlight, None);

        let edge = engine
            .handle_gesture(GestureEvent::PointerMoved { pos: Point::new(50.0, 95.0) })
            .unwrap();
        assert_eq!(edge.highlight, Some(HighlightChange::Show(AREA.bottom_half())));

        let gone = engine
            .handle_gesture(GestureEvent::PointerMoved { pos: Point::new(500.0, 500.0) })
            .unwrap();
        assert_eq!(gone.highlight, Some(HighlightChange::Hide));
    }

    #[test]
    fn cancellation_restores_like_a_missed_drop() {
        let (mut engine, ids) = engine_with(3);
        let root = engine.tree().root();
        engine
            .handle_gesture(GestureEvent::TabPressed { panel: root, index: 1, pos: Point::new(30.0, 2.0) })
            .unwrap();
        engine
            .handle_gesture(GestureEvent::PointerMoved { pos: Point::new(50.0, 90.0) })
            .unwrap();
        engine.handle_gesture(GestureEvent::Cancelled).unwrap();

        assert_eq!(engine.tree().panel(root).unwrap().tabs(), &ids[..]);
        assert_eq!(engine.registry().location_of(ids[1]), Ok(Some(root)));
        engine.validate().unwrap();
    }

    #[test]
    fn target_vanishing_mid_drag_falls_back_to_restore() {
        let (mut engine, ids) = engine_with(3);
        let root = engine.tree().root();
        drag(&mut engine, root, 2, Point::new(50.0, 2.0), Point::new(50.0, 90.0));
        let bottom = engine
            .tree()
            .panel_at(AREA, Point::new(50.0, 75.0))
            .map(|(p, _)| p)
            .unwrap();

        // Start dragging item 1 toward the bottom panel, then empty that
        // panel with a toggle while the drag is in flight.
        engine
            .handle_gesture(GestureEvent::TabPressed { panel: root, index: 0, pos: Point::new(20.0, 2.0) })
            .unwrap();
        engine
            .handle_gesture(GestureEvent::PointerMoved { pos: Point::new(50.0, 70.0) })
            .unwrap();
        engine.toggle(ids[2]).unwrap();
        assert!(!engine.tree().contains(bottom));

        // The release position now hits the collapsed-back root panel, so
        // the drop commits there rather than restoring; either way the
        // session must resolve and the tree stay consistent.
        engine
            .handle_gesture(GestureEvent::PointerReleased { pos: Point::new(50.0, 70.0) })
            .unwrap();
        assert_eq!(engine.registry().location_of(ids[0]), Ok(Some(engine.tree().first_panel())));
        engine.validate().unwrap();
    }

    #[test]
    fn source_panel_vanishing_restores_to_the_first_panel() {
        let (mut engine, ids) = engine_with(3);
        let root = engine.tree().root();
        // Split twice: bottom panel holds item 3, then its right half holds
        // item 2, leaving the layout [root[1] | [bottom[3] | right[2]]].
        drag(&mut engine, root, 2, Point::new(50.0, 2.0), Point::new(50.0, 90.0));
        drag(&mut engine, root, 1, Point::new(30.0, 2.0), Point::new(98.0, 75.0));
        let bottom = engine
            .tree()
            .panel_at(AREA, Point::new(25.0, 75.0))
            .map(|(p, _)| p)
            .unwrap();

        // Lift item 3 out of `bottom`, then hide item 2 while the drag is
        // in flight: the now-empty `bottom` gets folded away together with
        // its splitter, so the drag's source panel is dead at release.
        engine
            .handle_gesture(GestureEvent::TabPressed { panel: bottom, index: 0, pos: Point::new(25.0, 55.0) })
            .unwrap();
        engine
            .handle_gesture(GestureEvent::PointerMoved { pos: Point::new(500.0, 500.0) })
            .unwrap();
        engine.toggle(ids[1]).unwrap();
        assert!(!engine.tree().contains(bottom));

        engine
            .handle_gesture(GestureEvent::PointerReleased { pos: Point::new(500.0, 500.0) })
            .unwrap();
        let fallback = engine.tree().first_panel();
        assert_eq!(engine.registry().location_of(ids[2]), Ok(Some(fallback)));
        engine.validate().unwrap();
    }

    #[test]
    fn close_removes_content_and_collapses() {
        let (mut engine, ids) = engine_with(2);
        let root = engine.tree().root();
        drag(&mut engine, root, 1, Point::new(50.0, 2.0), Point::new(50.0, 90.0));
        assert_eq!(engine.tree().panels().len(), 2);

        assert_eq!(engine.close(ids[1]), Ok(ContentHandle(1)));
        assert_eq!(engine.tree().panels(), vec![root]);
        assert!(!engine.registry().contains(ids[1]));
        engine.validate().unwrap();
    }

    #[test]
    fn content_states_reflect_visibility() {
        let (mut engine, ids) = engine_with(2);
        engine.toggle(ids[0]).unwrap();

        let states = engine.content_states();
        assert_eq!(states.len(), 2);
        assert_eq!(states[0], ContentState { id: ids[0], title: "tab 0".into(), visible: false });
        assert_eq!(states[1], ContentState { id: ids[1], title: "tab 1".into(), visible: true });
    }

    #[test]
    fn hiding_the_last_item_keeps_the_root_panel() {
        let (mut engine, ids) = engine_with(1);
        let root = engine.tree().root();
        engine.toggle(ids[0]).unwrap();

        assert_eq!(engine.tree().panels(), vec![root]);
        assert!(engine.tree().panel(root).unwrap().is_empty());

        // And showing it again lands back in that panel.
        engine.toggle(ids[0]).unwrap();
        assert_eq!(engine.tree().panel(root).unwrap().tabs(), &[ids[0]]);
        engine.validate().unwrap();
    }
}
