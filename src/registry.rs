//! Authoritative bookkeeping for content items: stable identity, title,
//! host handle, and current panel.
//!
//! The registry is the source of truth for "where does this item live";
//! panels are views kept in sync by the engine layer. Ids are slotmap keys
//! and are never reused after removal, so a stale id can never silently
//! alias a newer item.

use slotmap::SlotMap;

use crate::error::DockError;
use crate::layout_engine::NodeId;

slotmap::new_key_type! { pub struct ContentId; }

/// Opaque token for the host-owned content widget/view. The core only
/// stores it and hands it back; it never interprets the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHandle(pub u64);

#[derive(Debug)]
struct ContentEntry {
    handle: ContentHandle,
    title: String,
    location: Option<NodeId>,
}

#[derive(Default, Debug)]
pub struct ContentRegistry {
    entries: SlotMap<ContentId, ContentEntry>,
}

impl ContentRegistry {
    pub fn register(&mut self, handle: ContentHandle, title: impl Into<String>) -> ContentId {
        self.entries.insert(ContentEntry {
            handle,
            title: title.into(),
            location: None,
        })
    }

    /// Fails with [`DockError::InUse`] while the item is still placed;
    /// callers must go through an explicit detach first.
    pub fn unregister(&mut self, id: ContentId) -> Result<ContentHandle, DockError> {
        if let Some(panel) = self.entries.get(id).and_then(|e| e.location) {
            return Err(DockError::InUse(id, panel));
        }
        let entry = self.entries.remove(id).ok_or(DockError::UnknownId(id))?;
        Ok(entry.handle)
    }

    pub fn set_location(&mut self, id: ContentId, panel: Option<NodeId>) -> Result<(), DockError> {
        let entry = self.entries.get_mut(id).ok_or(DockError::UnknownId(id))?;
        entry.location = panel;
        Ok(())
    }

    pub fn location_of(&self, id: ContentId) -> Result<Option<NodeId>, DockError> {
        Ok(self.entries.get(id).ok_or(DockError::UnknownId(id))?.location)
    }

    pub fn title_of(&self, id: ContentId) -> Result<&str, DockError> {
        Ok(&self.entries.get(id).ok_or(DockError::UnknownId(id))?.title)
    }

    pub fn set_title(&mut self, id: ContentId, title: impl Into<String>) -> Result<(), DockError> {
        let entry = self.entries.get_mut(id).ok_or(DockError::UnknownId(id))?;
        entry.title = title.into();
        Ok(())
    }

    pub fn handle_of(&self, id: ContentId) -> Result<ContentHandle, DockError> {
        Ok(self.entries.get(id).ok_or(DockError::UnknownId(id))?.handle)
    }

    pub fn contains(&self, id: ContentId) -> bool {
        self.entries.contains_key(id)
    }

    /// Registered ids in stable slot order. Drives deterministic menu
    /// population.
    pub fn ids(&self) -> impl Iterator<Item = ContentId> + '_ {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
