//! Sparse photo and caption assignments keyed by [`Coordinate`].
//!
//! The store owns three pieces of state:
//!
//! - the **ordered photo sequence**: every photo in the project, in the order
//!   it was added, each at most once. It is the ground truth for default
//!   placement and gap-filling.
//! - **photo assignments**: coordinate → photo, sparse.
//! - **caption overrides**: coordinate → caption text, sparse. A missing
//!   entry means "use the generated default".
//!
//! Assignments may diverge from the sequence through manual placement; the
//! renderer reconciles the two before drawing (see
//! [`Session::fill_gaps`](crate::session::Session::fill_gaps)).
//!
//! ## Invariants
//!
//! - Every captioned coordinate also has a photo.
//! - A photo is assigned to at most one coordinate. Assigning a photo that
//!   is already placed moves it.
//! - Removing a photo drops it from the sequence too, so no later
//!   redistribution can bring it back.

use crate::slots::Coordinate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Handle to a photo on disk. Identity is path equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoRef(PathBuf);

impl PhotoRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// File name for display, falling back to the full path.
    pub fn name(&self) -> String {
        self.0
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.0.display().to_string())
    }
}

impl fmt::Display for PhotoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<&str> for PhotoRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// One populated slot, as yielded by [`AssignmentStore::entries`].
#[derive(Debug, Clone, PartialEq)]
pub struct SlotEntry<'a> {
    pub coord: Coordinate,
    pub photo: &'a PhotoRef,
    pub caption: Option<&'a str>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentStore {
    sequence: Vec<PhotoRef>,
    photos: BTreeMap<Coordinate, PhotoRef>,
    captions: BTreeMap<Coordinate, String>,
}

impl AssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a photo to the sequence. Returns `false` if it was already there.
    pub fn add_photo(&mut self, photo: PhotoRef) -> bool {
        if self.sequence.contains(&photo) {
            return false;
        }
        self.sequence.push(photo);
        true
    }

    /// Place `photo` at `coord`, replacing whatever photo was there.
    ///
    /// The caption at `coord` is left alone. If the photo was assigned
    /// elsewhere, that coordinate is vacated along with its caption. Photos
    /// not yet in the sequence are appended to it.
    pub fn assign(&mut self, coord: Coordinate, photo: PhotoRef) {
        if let Some(previous) = self.coordinate_of(&photo).filter(|c| *c != coord) {
            self.photos.remove(&previous);
            self.captions.remove(&previous);
        }
        self.add_photo(photo.clone());
        self.photos.insert(coord, photo);
    }

    /// Set the caption at `coord`. No-op when no photo is assigned there.
    pub fn set_caption(&mut self, coord: Coordinate, text: impl Into<String>) -> bool {
        if !self.photos.contains_key(&coord) {
            return false;
        }
        self.captions.insert(coord, text.into());
        true
    }

    /// Remove the photo at `coord` from the assignments and the sequence.
    pub fn remove(&mut self, coord: Coordinate) -> Option<PhotoRef> {
        let photo = self.photos.remove(&coord)?;
        self.captions.remove(&coord);
        self.sequence.retain(|p| p != &photo);
        Some(photo)
    }

    /// Drop all assignments and captions, keeping the sequence.
    pub(crate) fn clear_assignments(&mut self) {
        self.photos.clear();
        self.captions.clear();
    }

    /// Drop everything, including the sequence.
    pub fn clear(&mut self) {
        self.clear_assignments();
        self.sequence.clear();
    }

    /// Populated coordinates in page-then-slot order.
    ///
    /// Each call starts a fresh pass over the current state.
    pub fn coordinates(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.photos.keys().copied()
    }

    /// Populated slots with their photo and caption, in page-then-slot order.
    pub fn entries(&self) -> impl Iterator<Item = SlotEntry<'_>> + '_ {
        self.photos.iter().map(|(coord, photo)| SlotEntry {
            coord: *coord,
            photo,
            caption: self.captions.get(coord).map(String::as_str),
        })
    }

    /// Populated slots on one page, in slot order.
    pub fn page_entries(&self, page: usize) -> impl Iterator<Item = SlotEntry<'_>> + '_ {
        self.photos
            .range(Coordinate::new(page, 0)..Coordinate::new(page + 1, 0))
            .map(|(coord, photo)| SlotEntry {
                coord: *coord,
                photo,
                caption: self.captions.get(coord).map(String::as_str),
            })
    }

    pub fn photo_at(&self, coord: Coordinate) -> Option<&PhotoRef> {
        self.photos.get(&coord)
    }

    pub fn caption_at(&self, coord: Coordinate) -> Option<&str> {
        self.captions.get(&coord).map(String::as_str)
    }

    pub fn coordinate_of(&self, photo: &PhotoRef) -> Option<Coordinate> {
        self.photos
            .iter()
            .find(|(_, p)| *p == photo)
            .map(|(c, _)| *c)
    }

    pub fn sequence(&self) -> &[PhotoRef] {
        &self.sequence
    }

    /// Number of assigned slots.
    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    /// Highest page index holding a photo.
    pub fn last_page(&self) -> Option<usize> {
        self.photos.keys().next_back().map(|c| c.page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(page: usize, slot: usize) -> Coordinate {
        Coordinate::new(page, slot)
    }

    fn names(store: &AssignmentStore) -> Vec<String> {
        store.sequence().iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn add_photo_rejects_duplicates() {
        let mut store = AssignmentStore::new();
        assert!(store.add_photo("a.jpg".into()));
        assert!(store.add_photo("b.jpg".into()));
        assert!(!store.add_photo("a.jpg".into()));
        assert_eq!(names(&store), vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn assign_overwrites_photo_but_keeps_caption() {
        let mut store = AssignmentStore::new();
        store.assign(c(0, 0), "a.jpg".into());
        store.set_caption(c(0, 0), "Harbour");
        store.assign(c(0, 0), "b.jpg".into());

        assert_eq!(store.photo_at(c(0, 0)), Some(&"b.jpg".into()));
        assert_eq!(store.caption_at(c(0, 0)), Some("Harbour"));
    }

    #[test]
    fn assign_appends_unknown_photo_to_sequence() {
        let mut store = AssignmentStore::new();
        store.assign(c(1, 2), "new.jpg".into());
        assert_eq!(names(&store), vec!["new.jpg"]);
    }

    #[test]
    fn assign_moves_photo_already_placed() {
        let mut store = AssignmentStore::new();
        store.assign(c(0, 0), "a.jpg".into());
        store.set_caption(c(0, 0), "Old spot");
        store.assign(c(0, 3), "a.jpg".into());

        assert_eq!(store.photo_at(c(0, 0)), None);
        assert_eq!(store.caption_at(c(0, 0)), None);
        assert_eq!(store.photo_at(c(0, 3)), Some(&"a.jpg".into()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn set_caption_without_photo_is_noop() {
        let mut store = AssignmentStore::new();
        assert!(!store.set_caption(c(0, 1), "Orphan"));
        assert_eq!(store.caption_at(c(0, 1)), None);
    }

    #[test]
    fn remove_drops_photo_caption_and_sequence_entry() {
        let mut store = AssignmentStore::new();
        store.add_photo("a.jpg".into());
        store.add_photo("b.jpg".into());
        store.assign(c(0, 0), "a.jpg".into());
        store.assign(c(0, 1), "b.jpg".into());
        store.set_caption(c(0, 1), "Bridge");

        let removed = store.remove(c(0, 1));

        assert_eq!(removed, Some("b.jpg".into()));
        assert_eq!(store.photo_at(c(0, 1)), None);
        assert_eq!(store.caption_at(c(0, 1)), None);
        assert_eq!(names(&store), vec!["a.jpg"]);
    }

    #[test]
    fn remove_empty_slot_returns_none() {
        let mut store = AssignmentStore::new();
        assert_eq!(store.remove(c(3, 0)), None);
    }

    #[test]
    fn coordinates_are_page_then_slot_and_restartable() {
        let mut store = AssignmentStore::new();
        store.assign(c(1, 0), "d.jpg".into());
        store.assign(c(0, 3), "c.jpg".into());
        store.assign(c(0, 0), "a.jpg".into());

        let first: Vec<_> = store.coordinates().collect();
        let second: Vec<_> = store.coordinates().collect();
        assert_eq!(first, vec![c(0, 0), c(0, 3), c(1, 0)]);
        assert_eq!(first, second);
    }

    #[test]
    fn page_entries_only_cover_one_page() {
        let mut store = AssignmentStore::new();
        store.assign(c(0, 1), "a.jpg".into());
        store.assign(c(1, 0), "b.jpg".into());
        store.assign(c(1, 3), "c.jpg".into());
        store.set_caption(c(1, 3), "Last");

        let page: Vec<_> = store.page_entries(1).collect();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].coord, c(1, 0));
        assert_eq!(page[1].caption, Some("Last"));
    }

    #[test]
    fn last_page_tracks_highest_assignment() {
        let mut store = AssignmentStore::new();
        assert_eq!(store.last_page(), None);
        store.assign(c(2, 0), "a.jpg".into());
        store.assign(c(0, 0), "b.jpg".into());
        assert_eq!(store.last_page(), Some(2));
    }

    #[test]
    fn photo_ref_name_is_file_name() {
        let photo = PhotoRef::new("/photos/2024/dawn.jpg");
        assert_eq!(photo.name(), "dawn.jpg");
    }
}
