//! Default caption text and prefix regeneration.
//!
//! Captions default to `"{prefix} {n}"` where `n` is the photo's 1-based
//! position in reading order. When the prefix changes, every assigned slot
//! is renumbered under the new prefix, manual edits included. That policy
//! is selected in one place, [`apply_prefix`], so a merge-style policy can
//! be added without touching callers.

use crate::store::AssignmentStore;

/// Caption for the photo at flat position `ordinal` (0-based).
pub fn default_caption(prefix: &str, ordinal: usize) -> String {
    format!("{} {}", prefix, ordinal + 1)
}

/// How a prefix change treats existing captions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptionPolicy {
    /// Rewrite every caption as `"{prefix} {n}"`, numbered across pages.
    #[default]
    OverwriteAll,
}

/// Regenerate captions after a prefix change. Returns how many were written.
pub fn apply_prefix(store: &mut AssignmentStore, prefix: &str, policy: CaptionPolicy) -> usize {
    match policy {
        CaptionPolicy::OverwriteAll => {
            let coords: Vec<_> = store.coordinates().collect();
            for (i, coord) in coords.iter().enumerate() {
                store.set_caption(*coord, default_caption(prefix, i));
            }
            coords.len()
        }
    }
}
