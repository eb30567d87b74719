//! The panel/splitter topology: a strict tree of tab-hosting panels and
//! n-ary splitter nodes, plus the structural mutations (split, collapse)
//! and traversal queries the rest of the crate builds on.

use tracing::trace;

use crate::common::geometry::{Point, Rect};
use crate::error::DockError;
use crate::registry::{ContentId, ContentRegistry};

slotmap::new_key_type! { pub struct NodeId; }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Children sit side by side; the split axis is vertical.
    Horizontal,
    /// Children are stacked top to bottom.
    Vertical,
}

/// A tab host: ordered content ids plus the current (focused) tab.
#[derive(Default, Debug)]
pub struct Panel {
    tabs: Vec<ContentId>,
    current: usize,
}

impl Panel {
    fn with_tab(content: ContentId) -> Self {
        Self { tabs: vec![content], current: 0 }
    }

    /// Inserts at `index`, clamped to `[0, len]`. The caller is responsible
    /// for the matching registry location update; the panel never touches
    /// the registry itself.
    pub fn insert(&mut self, panel_id: NodeId, index: usize, content: ContentId) -> Result<(), DockError> {
        if self.tabs.contains(&content) {
            return Err(DockError::Duplicate(content, panel_id));
        }
        let index = index.min(self.tabs.len());
        self.tabs.insert(index, content);
        if self.tabs.len() > 1 && index <= self.current {
            self.current += 1;
        }
        Ok(())
    }

    pub fn remove_at(&mut self, panel_id: NodeId, index: usize) -> Result<ContentId, DockError> {
        if index >= self.tabs.len() {
            return Err(DockError::IndexOutOfRange {
                panel: panel_id,
                index,
                len: self.tabs.len(),
            });
        }
        let content = self.tabs.remove(index);
        if index < self.current || self.current >= self.tabs.len().max(1) {
            self.current = self.current.saturating_sub(1);
        }
        Ok(content)
    }

    pub fn index_of(&self, content: ContentId) -> Option<usize> {
        self.tabs.iter().position(|&c| c == content)
    }

    /// Returns false (not an error) when the content is not hosted here;
    /// "is this tab here" is an expected check, not a fault.
    pub fn set_current(&mut self, content: ContentId) -> bool {
        match self.index_of(content) {
            Some(index) => {
                self.current = index;
                true
            }
            None => false,
        }
    }

    pub fn current(&self) -> Option<ContentId> {
        self.tabs.get(self.current).copied()
    }

    pub fn tabs(&self) -> &[ContentId] {
        &self.tabs
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }
}

#[derive(Debug)]
pub enum NodeKind {
    Split {
        orientation: Orientation,
        children: Vec<NodeId>,
        /// Proportional extents parallel to `children`, kept summing to 1.
        sizes: Vec<f64>,
    },
    Panel(Panel),
}

#[derive(Debug)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
}

/// Owns the node arena exclusively; every node has exactly one parent slot.
#[derive(Debug)]
pub struct LayoutTree {
    nodes: slotmap::SlotMap<NodeId, Node>,
    root: NodeId,
}

impl Default for LayoutTree {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutTree {
    pub fn new() -> Self {
        let mut nodes = slotmap::SlotMap::with_key();
        let root = nodes.insert(Node {
            kind: NodeKind::Panel(Panel::default()),
            parent: None,
        });
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.nodes.get(node).map(|n| &n.kind)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|n| n.parent)
    }

    pub fn panel(&self, node: NodeId) -> Result<&Panel, DockError> {
        match self.nodes.get(node) {
            Some(Node { kind: NodeKind::Panel(panel), .. }) => Ok(panel),
            _ => Err(DockError::TargetNotFound(node)),
        }
    }

    pub fn panel_mut(&mut self, node: NodeId) -> Result<&mut Panel, DockError> {
        match self.nodes.get_mut(node) {
            Some(Node { kind: NodeKind::Panel(panel), .. }) => Ok(panel),
            _ => Err(DockError::TargetNotFound(node)),
        }
    }

    pub fn is_panel(&self, node: NodeId) -> bool {
        matches!(self.nodes.get(node), Some(Node { kind: NodeKind::Panel(_), .. }))
    }

    /// Pre-order panel enumeration, stable across calls. Menu builders rely
    /// on the ordering being deterministic.
    pub fn panels(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_panels(self.root, &mut out);
        out
    }

    fn collect_panels(&self, node: NodeId, out: &mut Vec<NodeId>) {
        match &self.nodes[node].kind {
            NodeKind::Panel(_) => out.push(node),
            NodeKind::Split { children, .. } => {
                for &child in children {
                    self.collect_panels(child, out);
                }
            }
        }
    }

    /// First panel in pre-order. Total: the tree never collapses its last
    /// panel away.
    pub fn first_panel(&self) -> NodeId {
        let mut node = self.root;
        loop {
            match &self.nodes[node].kind {
                NodeKind::Panel(_) => return node,
                NodeKind::Split { children, .. } => match children.first() {
                    Some(&child) => node = child,
                    // A childless splitter is transient; cleanup resolves it
                    // before control returns to callers.
                    None => return node,
                },
            }
        }
    }

    /// Registry fast path; the traversal is a consistency fallback used by
    /// validation and tests.
    pub fn panel_containing(
        &self,
        content: ContentId,
        registry: &ContentRegistry,
    ) -> Option<NodeId> {
        if let Ok(Some(panel)) = registry.location_of(content) {
            return Some(panel);
        }
        self.panels()
            .into_iter()
            .find(|&p| self.panel(p).is_ok_and(|panel| panel.index_of(content).is_some()))
    }

    /// Replaces `target` with a fresh 2-child splitter holding the target
    /// and a new panel containing only `content`. The splitter takes the
    /// target's slot (and size) in its parent, and divides it 50/50, so the
    /// combined apparent extent is preserved. Returns the new panel.
    ///
    /// The caller updates the registry location for `content`.
    pub fn split(
        &mut self,
        target: NodeId,
        content: ContentId,
        orientation: Orientation,
        insert_before: bool,
    ) -> Result<NodeId, DockError> {
        if !self.is_panel(target) {
            return Err(DockError::TargetNotFound(target));
        }
        let parent = self.nodes[target].parent;

        let new_panel = self.nodes.insert(Node {
            kind: NodeKind::Panel(Panel::with_tab(content)),
            parent: None,
        });

        let children = if insert_before {
            vec![new_panel, target]
        } else {
            vec![target, new_panel]
        };
        let splitter = self.nodes.insert(Node {
            kind: NodeKind::Split {
                orientation,
                children: children.clone(),
                sizes: vec![0.5, 0.5],
            },
            parent,
        });
        for child in children {
            self.nodes[child].parent = Some(splitter);
        }

        match parent {
            None => self.root = splitter,
            Some(p) => self.replace_child(p, target, splitter),
        }
        trace!(?target, ?new_panel, ?orientation, insert_before, "split panel");
        Ok(new_panel)
    }

    fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        let NodeKind::Split { children, .. } = &mut self.nodes[parent].kind else {
            unreachable!("parent slots are always splitters");
        };
        let index = children
            .iter()
            .position(|&c| c == old)
            .expect("old child must be present in its parent");
        children[index] = new;
        self.nodes[new].parent = Some(parent);
    }

    /// Detaches `child` from `parent` and renormalizes the remaining sizes.
    fn detach_child(&mut self, parent: NodeId, child: NodeId) {
        let NodeKind::Split { children, sizes, .. } = &mut self.nodes[parent].kind else {
            unreachable!("parent slots are always splitters");
        };
        let index = children
            .iter()
            .position(|&c| c == child)
            .expect("child must be present in its parent");
        children.remove(index);
        sizes.remove(index);
        let total: f64 = sizes.iter().sum();
        if total > 0.0 {
            for size in sizes.iter_mut() {
                *size /= total;
            }
        } else if !sizes.is_empty() {
            let even = 1.0 / sizes.len() as f64;
            sizes.fill(even);
        }
    }

    /// Bottom-up idempotent cleanup. Removes empty panels and degenerate
    /// splitters along the ancestor chain of `node`, folding sole children
    /// into their parent's slot. The sole root panel is kept even when
    /// empty; an editor always has somewhere to receive new content.
    pub fn collapse_if_degenerate(&mut self, node: NodeId) {
        let Some(n) = self.nodes.get(node) else { return };
        let parent = n.parent;
        match &n.kind {
            NodeKind::Panel(panel) => {
                if !panel.is_empty() {
                    return;
                }
                let Some(parent) = parent else { return };
                trace!(?node, "removing empty panel");
                self.detach_child(parent, node);
                self.nodes.remove(node);
                self.collapse_if_degenerate(parent);
            }
            NodeKind::Split { children, .. } => match children.len() {
                0 => {
                    self.nodes.remove(node);
                    match parent {
                        None => {
                            // Root of emptiness: never leave a 0-child node
                            // as the root slot.
                            self.root = self.nodes.insert(Node {
                                kind: NodeKind::Panel(Panel::default()),
                                parent: None,
                            });
                            trace!("replaced childless root splitter with a fresh panel");
                        }
                        Some(parent) => {
                            self.detach_child(parent, node);
                            self.collapse_if_degenerate(parent);
                        }
                    }
                }
                1 => {
                    let child = children[0];
                    trace!(?node, ?child, "hoisting sole child of degenerate splitter");
                    match parent {
                        None => {
                            self.root = child;
                            self.nodes[child].parent = None;
                        }
                        Some(parent) => self.replace_child(parent, node, child),
                    }
                    self.nodes.remove(node);
                    // The hoisted child may itself be empty or degenerate,
                    // and so may the chain above it.
                    self.collapse_if_degenerate(child);
                    if let Some(parent) = parent {
                        self.collapse_if_degenerate(parent);
                    }
                }
                _ => {}
            },
        }
    }

    /// Solves panel rectangles for `area` by dividing splitters along their
    /// orientation according to the stored proportions. Pre-order, parallel
    /// to [`LayoutTree::panels`].
    pub fn layout(&self, area: Rect) -> Vec<(NodeId, Rect)> {
        let mut out = Vec::new();
        self.layout_node(self.root, area, &mut out);
        out
    }

    fn layout_node(&self, node: NodeId, rect: Rect, out: &mut Vec<(NodeId, Rect)>) {
        match &self.nodes[node].kind {
            NodeKind::Panel(_) => out.push((node, rect)),
            NodeKind::Split { orientation, children, sizes } => {
                let total: f64 = sizes.iter().sum();
                let mut offset = 0.0;
                for (&child, &size) in children.iter().zip(sizes) {
                    let fraction = if total > 0.0 { size / total } else { 1.0 / children.len() as f64 };
                    let child_rect = match orientation {
                        Orientation::Horizontal => Rect::new(
                            rect.x + offset * rect.width,
                            rect.y,
                            fraction * rect.width,
                            rect.height,
                        ),
                        Orientation::Vertical => Rect::new(
                            rect.x,
                            rect.y + offset * rect.height,
                            rect.width,
                            fraction * rect.height,
                        ),
                    };
                    offset += fraction;
                    self.layout_node(child, child_rect, out);
                }
            }
        }
    }

    /// The panel under `point` when the tree occupies `area`.
    pub fn panel_at(&self, area: Rect, point: Point) -> Option<(NodeId, Rect)> {
        self.layout(area).into_iter().find(|(_, rect)| rect.contains(point))
    }

    pub fn draw_tree(&self) -> String {
        fn write_node(this: &LayoutTree, node: NodeId, out: &mut String, indent: usize) {
            for _ in 0..indent {
                out.push_str("  ");
            }
            match &this.nodes[node].kind {
                NodeKind::Panel(panel) => {
                    out.push_str(&format!("Panel {:?} {:?}\n", node, panel.tabs()));
                }
                NodeKind::Split { orientation, children, .. } => {
                    out.push_str(&format!("Split {:?}\n", orientation));
                    for &child in children {
                        write_node(this, child, out, indent + 1);
                    }
                }
            }
        }
        let mut s = String::new();
        write_node(self, self.root, &mut s, 0);
        s
    }
}
