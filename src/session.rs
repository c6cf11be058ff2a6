//! The editable state of one photo-grid project.
//!
//! A [`Session`] bundles the assignment store with the active layout, the
//! caption prefix, per-page titles and the page currently being viewed.
//! Every user command is a `&mut self` method that runs to completion, and
//! rendering borrows the session mutably for its whole duration, so no
//! command can interleave with an export.

use crate::captions::{self, CaptionPolicy};
use crate::layout::{self, LayoutMode};
use crate::slots::{self, Coordinate, to_coordinate, to_ordinal};
use crate::store::{AssignmentStore, PhotoRef};
use std::collections::BTreeMap;
use thiserror::Error;

/// Title shown for pages that were never given one.
pub const DEFAULT_PAGE_TITLE: &str = "Title";

#[derive(Error, Debug, PartialEq)]
pub enum SessionError {
    #[error("{coord} is outside the {layout} grid ({capacity} slots per page)")]
    SlotOutOfRange {
        coord: Coordinate,
        layout: LayoutMode,
        capacity: usize,
    },
}

/// One slot as shown in a page preview.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotView {
    pub slot: usize,
    pub photo: Option<PhotoRef>,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub(crate) store: AssignmentStore,
    pub(crate) layout: LayoutMode,
    pub(crate) caption_prefix: String,
    pub(crate) titles: BTreeMap<usize, String>,
    pub(crate) current_page: usize,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(LayoutMode::default(), "Photo")
    }
}

impl Session {
    pub fn new(layout: LayoutMode, caption_prefix: impl Into<String>) -> Self {
        Self {
            store: AssignmentStore::new(),
            layout,
            caption_prefix: caption_prefix.into(),
            titles: BTreeMap::new(),
            current_page: 0,
        }
    }

    pub fn store(&self) -> &AssignmentStore {
        &self.store
    }

    pub fn layout(&self) -> LayoutMode {
        self.layout
    }

    pub fn capacity(&self) -> usize {
        self.layout.capacity()
    }

    pub fn caption_prefix(&self) -> &str {
        &self.caption_prefix
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    fn check(&self, coord: Coordinate) -> Result<(), SessionError> {
        if coord.fits(self.capacity()) {
            Ok(())
        } else {
            Err(SessionError::SlotOutOfRange {
                coord,
                layout: self.layout,
                capacity: self.capacity(),
            })
        }
    }

    /// Append photos to the sequence, skipping ones already present.
    pub fn add_photos<I>(&mut self, photos: I) -> usize
    where
        I: IntoIterator<Item = PhotoRef>,
    {
        photos
            .into_iter()
            .filter(|p| self.store.add_photo(p.clone()))
            .count()
    }

    /// Manually place a photo at `coord`.
    pub fn assign(&mut self, coord: Coordinate, photo: PhotoRef) -> Result<(), SessionError> {
        self.check(coord)?;
        self.store.assign(coord, photo);
        Ok(())
    }

    /// Remove the photo at `coord` from the project for good.
    pub fn remove(&mut self, coord: Coordinate) -> Result<Option<PhotoRef>, SessionError> {
        self.check(coord)?;
        let removed = self.store.remove(coord);
        if let Some(photo) = &removed {
            tracing::debug!(%coord, photo = %photo, "photo removed");
        }
        Ok(removed)
    }

    /// Set a caption. Returns `false` when `coord` holds no photo.
    pub fn set_caption(
        &mut self,
        coord: Coordinate,
        text: impl Into<String>,
    ) -> Result<bool, SessionError> {
        self.check(coord)?;
        Ok(self.store.set_caption(coord, text))
    }

    pub fn set_title(&mut self, page: usize, title: impl Into<String>) {
        self.titles.insert(page, title.into());
    }

    pub fn title(&self, page: usize) -> &str {
        self.titles
            .get(&page)
            .map(String::as_str)
            .unwrap_or(DEFAULT_PAGE_TITLE)
    }

    pub fn titles(&self) -> &BTreeMap<usize, String> {
        &self.titles
    }

    /// Switch layout, re-slotting assignments when the capacity changes.
    ///
    /// Returns whether a reconciliation pass ran. The current page resets to
    /// the first page only in that case.
    pub fn set_layout(&mut self, layout: LayoutMode) -> bool {
        let old = std::mem::replace(&mut self.layout, layout);
        let changed = layout::reconcile(&mut self.store, old, layout);
        if changed {
            self.current_page = 0;
        }
        changed
    }

    /// Change the caption prefix and renumber every caption.
    ///
    /// Blank prefixes and no-op changes are ignored and return `false`.
    pub fn set_prefix(&mut self, prefix: &str) -> bool {
        let prefix = prefix.trim();
        if prefix.is_empty() || prefix == self.caption_prefix {
            return false;
        }
        self.caption_prefix = prefix.to_string();
        let n = captions::apply_prefix(&mut self.store, prefix, CaptionPolicy::OverwriteAll);
        tracing::debug!(prefix, captions = n, "caption prefix applied");
        true
    }

    /// Caption for `coord`: the stored one, or the generated default.
    pub fn caption_for(&self, coord: Coordinate) -> String {
        self.store
            .caption_at(coord)
            .map(str::to_string)
            .unwrap_or_else(|| {
                captions::default_caption(&self.caption_prefix, to_ordinal(coord, self.capacity()))
            })
    }

    /// Pages spanned by the sequence or by any manual placement.
    pub fn page_count(&self) -> usize {
        let from_sequence = slots::page_count(self.store.sequence().len(), self.capacity());
        let from_store = self.store.last_page().map_or(0, |p| p + 1);
        from_sequence.max(from_store)
    }

    /// Move to `page`, clamped to the existing pages.
    pub fn go_to_page(&mut self, page: usize) -> usize {
        self.current_page = page.min(self.page_count() - 1);
        self.current_page
    }

    /// Move by `delta` pages, staying put at either end.
    pub fn step_page(&mut self, delta: isize) -> usize {
        let target = self.current_page as isize + delta;
        if target >= 0 && (target as usize) < self.page_count() {
            self.current_page = target as usize;
        }
        self.current_page
    }

    /// Place sequence photos into empty slots at their default coordinates.
    ///
    /// Existing placements and captions always win: a coordinate that
    /// already holds a photo is skipped, and a photo that is already placed
    /// elsewhere is not placed twice. Newly filled slots get a default
    /// caption numbered by the photo's sequence position. Returns the number
    /// of slots filled.
    pub fn fill_gaps(&mut self) -> usize {
        let capacity = self.capacity();
        let pending: Vec<_> = self
            .store
            .sequence()
            .iter()
            .enumerate()
            .map(|(i, photo)| (to_coordinate(i, capacity), i, photo.clone()))
            .filter(|(coord, _, photo)| {
                self.store.photo_at(*coord).is_none() && self.store.coordinate_of(photo).is_none()
            })
            .collect();

        for (coord, ordinal, photo) in &pending {
            self.store.assign(*coord, photo.clone());
            if self.store.caption_at(*coord).is_none() {
                self.store
                    .set_caption(*coord, captions::default_caption(&self.caption_prefix, *ordinal));
            }
        }
        pending.len()
    }

    /// Materialize and return the slots of one page, as the preview shows them.
    ///
    /// Empty slots whose default photo is not yet placed receive it, and
    /// populated slots without a caption receive their default caption.
    pub fn preview_page(&mut self, page: usize) -> Vec<SlotView> {
        let capacity = self.capacity();
        (0..capacity)
            .map(|slot| {
                let coord = Coordinate::new(page, slot);
                if self.store.photo_at(coord).is_none() {
                    let ordinal = to_ordinal(coord, capacity);
                    if let Some(photo) = self.store.sequence().get(ordinal).cloned() {
                        if self.store.coordinate_of(&photo).is_none() {
                            self.store.assign(coord, photo);
                        }
                    }
                }
                let photo = self.store.photo_at(coord).cloned();
                if photo.is_some() && self.store.caption_at(coord).is_none() {
                    let text = self.caption_for(coord);
                    self.store.set_caption(coord, text);
                }
                SlotView {
                    slot,
                    caption: photo.as_ref().map(|_| self.caption_for(coord)),
                    photo,
                }
            })
            .collect()
    }

    /// Forget all photos, assignments and titles.
    pub fn reset(&mut self) {
        self.store.clear();
        self.titles.clear();
        self.current_page = 0;
    }
}
