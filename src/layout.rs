//! Grid layout modes and re-slotting on layout change.
//!
//! Two grid shapes are supported:
//!
//! | Mode | Grid (rows × cols) | Photos per page |
//! |------|--------------------|-----------------|
//! | `2x1` | 2 × 1 | 2 |
//! | `2x2` | 2 × 2 | 4 |
//!
//! Each mode also carries the fixed document geometry used when rendering
//! (see [`GridGeometry`]).
//!
//! ## Reconciliation
//!
//! Changing capacity moves every page boundary, so stored coordinates are
//! meaningless under the new mode. [`reconcile`] re-linearizes the current
//! assignments in page-then-slot order and re-slots them one after another
//! under the new capacity. Captions travel with their photos. Photos
//! that were never placed stay in the sequence and are picked up later by
//! gap-filling.

use crate::slots::to_coordinate;
use crate::store::AssignmentStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Points per inch in the output document.
pub const POINTS_PER_INCH: f32 = 72.0;

fn inches(value: f32) -> f32 {
    value * POINTS_PER_INCH
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LayoutMode {
    #[serde(rename = "2x1")]
    TwoByOne,
    #[default]
    #[serde(rename = "2x2")]
    TwoByTwo,
}

/// Fixed table geometry for one layout mode, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    pub rows: usize,
    pub cols: usize,
    pub column_width: f32,
    pub row_height: f32,
    pub max_image_width: f32,
    pub max_image_height: f32,
    /// Space below the page title paragraph.
    pub title_space_after: f32,
    /// Space above each caption paragraph.
    pub caption_space_before: f32,
}

impl LayoutMode {
    pub const ALL: [LayoutMode; 2] = [LayoutMode::TwoByOne, LayoutMode::TwoByTwo];

    /// Photos per page.
    pub fn capacity(self) -> usize {
        let g = self.geometry();
        g.rows * g.cols
    }

    pub fn geometry(self) -> GridGeometry {
        match self {
            LayoutMode::TwoByOne => GridGeometry {
                rows: 2,
                cols: 1,
                column_width: inches(7.5),
                row_height: inches(4.0),
                max_image_width: inches(7.0),
                max_image_height: inches(3.4),
                title_space_after: 2.0,
                caption_space_before: 2.0,
            },
            LayoutMode::TwoByTwo => GridGeometry {
                rows: 2,
                cols: 2,
                column_width: inches(3.55),
                row_height: inches(4.0),
                max_image_width: inches(3.3),
                max_image_height: inches(3.4),
                title_space_after: 4.0,
                caption_space_before: 2.0,
            },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LayoutMode::TwoByOne => "2x1",
            LayoutMode::TwoByTwo => "2x2",
        }
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LayoutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "2x1" => Ok(LayoutMode::TwoByOne),
            "2x2" => Ok(LayoutMode::TwoByTwo),
            other => Err(format!("unknown layout '{other}' (expected 2x1 or 2x2)")),
        }
    }
}

/// Re-slot every assignment for a new page capacity.
///
/// Returns `false` without touching the store when the capacity is
/// unchanged.
pub fn reconcile(store: &mut AssignmentStore, old: LayoutMode, new: LayoutMode) -> bool {
    let capacity = new.capacity();
    if old.capacity() == capacity {
        return false;
    }

    let ordered: Vec<_> = store
        .entries()
        .map(|e| (e.photo.clone(), e.caption.map(str::to_string)))
        .collect();

    store.clear_assignments();
    for (i, (photo, caption)) in ordered.into_iter().enumerate() {
        let coord = to_coordinate(i, capacity);
        store.assign(coord, photo);
        if let Some(text) = caption {
            store.set_caption(coord, text);
        }
    }

    tracing::debug!(from = %old, to = %new, slots = store.len(), "layout reconciled");
    true
}
