#![forbid(unsafe_code)]

//! The layout map: simulator output, renderer input.

use std::collections::{BTreeMap, BTreeSet};

use vgrid_core::{ElementId, GridCoord};

use crate::annotation::SubColumn;

/// Where one element landed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub coord: GridCoord,
    pub is_block: bool,
    pub width_cells: u16,
    pub height_cells: u16,
    /// Squeeze applied in distribute mode (1 when unscaled).
    pub vertical_scale: f64,
    /// Row was computed by distribute-mode respacing and names the top edge.
    pub respaced: bool,
    /// Half-column of an annotation glyph.
    pub sub_column: Option<SubColumn>,
    /// Cells the element is raised above the grid top.
    pub elevation: u8,
}

impl Placement {
    /// A single-cell placement.
    pub fn cell(coord: GridCoord) -> Self {
        Self {
            coord,
            is_block: false,
            width_cells: 1,
            height_cells: 1,
            vertical_scale: 1.0,
            respaced: false,
            sub_column: None,
            elevation: 0,
        }
    }

    /// A block anchored at `coord`.
    pub fn block(coord: GridCoord, width_cells: u16, height_cells: u16) -> Self {
        Self {
            is_block: true,
            width_cells,
            height_cells,
            ..Self::cell(coord)
        }
    }
}

/// Per-page bookkeeping.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageSummary {
    /// Highest logical column holding an element.
    pub max_column: Option<u16>,
    /// Reserved columns the cursor skipped on this page.
    pub reserved: BTreeSet<u16>,
}

impl PageSummary {
    /// Physical column count: `max_column + 1`, raised to `minimum`.
    pub fn column_count(&self, minimum: u16) -> u16 {
        self.max_column
            .map_or(0, |c| c.saturating_add(1))
            .max(minimum)
    }
}

/// Element identity → grid placement, built once per invocation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutMap {
    placements: Vec<Option<Placement>>,
    pages: Vec<PageSummary>,
}

impl LayoutMap {
    pub(crate) fn with_capacity(elements: usize) -> Self {
        Self {
            placements: vec![None; elements],
            pages: Vec::new(),
        }
    }

    pub(crate) fn insert(&mut self, id: ElementId, placement: Placement) {
        let page = placement.coord.page;
        let last_column = placement
            .coord
            .column
            .saturating_add(placement.width_cells.saturating_sub(1));
        let summary = self.page_mut(page);
        summary.max_column = Some(summary.max_column.map_or(last_column, |c| c.max(last_column)));
        if let Some(slot) = self.placements.get_mut(id.index()) {
            debug_assert!(slot.is_none(), "element placed twice");
            *slot = Some(placement);
        }
    }

    pub(crate) fn record_reserved(&mut self, page: u32, column: u16) {
        self.page_mut(page).reserved.insert(column);
    }

    fn page_mut(&mut self, page: u32) -> &mut PageSummary {
        let index = page as usize;
        if self.pages.len() <= index {
            self.pages.resize_with(index + 1, PageSummary::default);
        }
        &mut self.pages[index]
    }

    /// Placement of an element, if it was placed.
    #[inline]
    pub fn get(&self, id: ElementId) -> Option<&Placement> {
        self.placements.get(id.index()).and_then(Option::as_ref)
    }

    /// Iterate placed elements in stream order.
    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &Placement)> {
        self.placements
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.as_ref().map(|p| (ElementId(i as u32), p)))
    }

    /// Number of placed elements.
    pub fn placed_count(&self) -> usize {
        self.placements.iter().filter(|p| p.is_some()).count()
    }

    /// Number of pages the layout spans.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Page bookkeeping, indexed by page.
    pub fn pages(&self) -> &[PageSummary] {
        &self.pages
    }

    /// Placed element ids grouped by page, each group in stream order.
    pub fn by_page(&self) -> BTreeMap<u32, Vec<ElementId>> {
        let mut groups: BTreeMap<u32, Vec<ElementId>> = BTreeMap::new();
        for (id, placement) in self.iter() {
            groups.entry(placement.coord.page).or_default().push(id);
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_tracks_page_columns() {
        let mut map = LayoutMap::with_capacity(3);
        map.insert(ElementId(0), Placement::cell(GridCoord::new(0, 2, 0.0)));
        map.insert(ElementId(2), Placement::block(GridCoord::new(1, 0, 0.0), 3, 1));
        assert_eq!(map.page_count(), 2);
        assert_eq!(map.pages()[0].max_column, Some(2));
        assert_eq!(map.pages()[1].max_column, Some(2));
        assert_eq!(map.placed_count(), 2);
        assert!(map.get(ElementId(1)).is_none());
    }

    #[test]
    fn column_count_respects_minimum() {
        let summary = PageSummary {
            max_column: Some(4),
            reserved: BTreeSet::new(),
        };
        assert_eq!(summary.column_count(0), 5);
        assert_eq!(summary.column_count(9), 9);
        assert_eq!(PageSummary::default().column_count(3), 3);
    }

    #[test]
    fn by_page_groups_in_order() {
        let mut map = LayoutMap::with_capacity(4);
        map.insert(ElementId(0), Placement::cell(GridCoord::new(0, 0, 0.0)));
        map.insert(ElementId(1), Placement::cell(GridCoord::new(1, 0, 0.0)));
        map.insert(ElementId(3), Placement::cell(GridCoord::new(0, 1, 0.0)));
        let groups = map.by_page();
        assert_eq!(groups[&0], vec![ElementId(0), ElementId(3)]);
        assert_eq!(groups[&1], vec![ElementId(1)]);
    }
}
