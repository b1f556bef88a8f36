#![forbid(unsafe_code)]

//! Cells claimed by block elements.

use rustc_hash::FxHashMap;
use vgrid_core::ElementId;

/// Per `(page, column)` record of rows claimed by blocks.
///
/// A claimed cell belongs to exactly one block: [`OccupancyMap::claim`]
/// refuses regions that overlap an existing claim.
#[derive(Debug, Clone, Default)]
pub struct OccupancyMap {
    cells: FxHashMap<(u32, u16, u16), ElementId>,
}

impl OccupancyMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `(page, column, row)` is claimed.
    #[inline]
    pub fn is_occupied(&self, page: u32, column: u16, row: u16) -> bool {
        self.cells.contains_key(&(page, column, row))
    }

    /// Whether every cell of the region is free.
    pub fn is_free(&self, page: u32, column: u16, row: u16, width: u16, height: u16) -> bool {
        region(column, row, width, height).all(|(c, r)| !self.is_occupied(page, c, r))
    }

    /// Claim a `width × height` region for `owner`.
    ///
    /// Returns `false` and claims nothing if any cell is already taken.
    pub fn claim(
        &mut self,
        owner: ElementId,
        page: u32,
        column: u16,
        row: u16,
        width: u16,
        height: u16,
    ) -> bool {
        if !self.is_free(page, column, row, width, height) {
            return false;
        }
        for (c, r) in region(column, row, width, height) {
            self.cells.insert((page, c, r), owner);
        }
        true
    }
}

fn region(column: u16, row: u16, width: u16, height: u16) -> impl Iterator<Item = (u16, u16)> {
    (column..column.saturating_add(width))
        .flat_map(move |c| (row..row.saturating_add(height)).map(move |r| (c, r)))
}
