//! Ordinal ↔ coordinate conversion.
//!
//! A photo's position can be expressed two ways: as a flat ordinal (its index
//! in reading order across the whole project) or as a [`Coordinate`] (page
//! and slot within that page). The mapping depends only on the page capacity
//! of the active layout:
//!
//! ```text
//! capacity 4:   ordinal  0 1 2 3 | 4 5 6 7 | 8 ...
//!               page     0 0 0 0 | 1 1 1 1 | 2
//!               slot     0 1 2 3 | 0 1 2 3 | 0
//! ```
//!
//! Every other module converts through these two functions. Page counting
//! and grid row/column splitting live here too, so the arithmetic exists in
//! exactly one place.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A slot position: page index plus slot index within the page.
///
/// The derived ordering (page first, then slot) is the reading order used
/// for rendering, reconciliation and caption numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub page: usize,
    pub slot: usize,
}

impl Coordinate {
    pub fn new(page: usize, slot: usize) -> Self {
        Self { page, slot }
    }

    /// Whether this coordinate is addressable under the given capacity.
    pub fn fits(self, capacity: usize) -> bool {
        self.slot < capacity
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page {} slot {}", self.page + 1, self.slot + 1)
    }
}

/// Map a flat ordinal to its coordinate.
///
/// `capacity` must be non-zero; layout modes only ever produce 2 or 4.
pub fn to_coordinate(ordinal: usize, capacity: usize) -> Coordinate {
    Coordinate {
        page: ordinal / capacity,
        slot: ordinal % capacity,
    }
}

/// Map a coordinate back to its flat ordinal.
pub fn to_ordinal(coord: Coordinate, capacity: usize) -> usize {
    coord.page * capacity + coord.slot
}

/// Number of pages needed to hold `count` photos, never less than one.
pub fn page_count(count: usize, capacity: usize) -> usize {
    count.div_ceil(capacity).max(1)
}

/// Split a slot index into `(row, column)` for a grid with `cols` columns.
pub fn grid_position(slot: usize, cols: usize) -> (usize, usize) {
    let c = to_coordinate(slot, cols);
    (c.page, c.slot)
}
