#![forbid(unsafe_code)]

//! Grid layout simulation.
//!
//! A single pass over the flat stream moves a `(page, column, row)` cursor
//! down each column and across columns, assigning every element a grid
//! coordinate. The pass honors:
//!
//! - hanging and first-line indents (first-line applies in the column where
//!   the owning block starts),
//! - right indents, which shorten the column,
//! - reserved columns, skipped and recorded for decoration,
//! - block occupancy: a block claims `width × height` cells no later element
//!   may use,
//! - dual sub-column annotation runs,
//! - distribute mode, which respaces each finished column.
//!
//! All state lives in one [`Simulator`] value for the duration of
//! [`simulate`]; the same stream and geometry always yield the same map.

use rustc_hash::FxHashMap;
use tracing::{debug, debug_span, trace, warn};
use vgrid_core::{
    Attributes, BlockId, BreakKind, ContentElement, ContentStream, ElementId, ElementKind,
    GridCoord, PageGeometry,
};

use crate::annotation::{self, SubColumn};
use crate::distribute::distribute;
use crate::map::{LayoutMap, Placement};
use crate::occupancy::OccupancyMap;
use crate::spacing;

/// Lay out `stream` on the grid described by `geometry`.
pub fn simulate(stream: &ContentStream, geometry: &PageGeometry) -> LayoutMap {
    let _span = debug_span!("grid_layout", elements = stream.len()).entered();
    let mut sim = Simulator::new(stream.as_slice(), geometry);
    sim.run();
    let map = sim.finish();
    debug!(
        pages = map.page_count(),
        placed = map.placed_count(),
        "grid layout complete"
    );
    map
}

/// Rows usable by the current element.
#[derive(Debug, Clone, Copy)]
struct Extent {
    indent: u16,
    capacity: u16,
}

/// An element waiting for its column to finish.
#[derive(Debug, Clone, Copy)]
struct Pending {
    id: ElementId,
    row: u16,
    /// Natural height in points.
    height: f64,
    capacity: u16,
    block: Option<(u16, u16)>,
    elevation: u8,
}

struct Simulator<'a> {
    geometry: &'a PageGeometry,
    elements: &'a [ContentElement],
    map: LayoutMap,
    occupancy: OccupancyMap,
    page: u32,
    column: u16,
    row: u16,
    /// Highest indent applied in the current column.
    column_indent: u16,
    column_used: bool,
    page_used: bool,
    block_start: FxHashMap<BlockId, (u32, u16)>,
    pending: Vec<Pending>,
    elevation: Option<u8>,
}

impl<'a> Simulator<'a> {
    fn new(elements: &'a [ContentElement], geometry: &'a PageGeometry) -> Self {
        Self {
            geometry,
            elements,
            map: LayoutMap::with_capacity(elements.len()),
            occupancy: OccupancyMap::new(),
            page: 0,
            column: 0,
            row: 0,
            column_indent: 0,
            column_used: false,
            page_used: false,
            block_start: FxHashMap::default(),
            pending: Vec::new(),
            elevation: None,
        }
    }

    fn run(&mut self) {
        let mut i = 0;
        while i < self.elements.len() {
            i = self.step(i);
        }
    }

    fn finish(mut self) -> LayoutMap {
        self.flush(true);
        self.map
    }

    #[inline]
    fn coord(&self, row: f64) -> GridCoord {
        GridCoord::new(self.page, self.column, row)
    }

    /// Process the element at `i` and return the index of the next one.
    fn step(&mut self, i: usize) -> usize {
        let element = &self.elements[i];
        let attrs = element.attrs;
        let id = ElementId(i as u32);
        let extent = self.settle(&attrs);

        match &element.kind {
            ElementKind::Glyph(metrics) => {
                if attrs.annotation {
                    return self.annotation_run(i, extent);
                }
                self.commit_block(&attrs);
                let height = metrics.extent();
                let elevation = self.take_elevation();
                self.pending.push(Pending {
                    id,
                    row: self.row,
                    height: if height.is_finite() && height > 0.0 {
                        height
                    } else {
                        self.geometry.cell_height
                    },
                    capacity: extent.capacity,
                    block: None,
                    elevation,
                });
                self.mark_used();
                self.row += 1;
            }
            ElementKind::Block {
                width_cells,
                height_cells,
                ..
            } => self.place_block(id, &attrs, *width_cells, *height_cells),
            ElementKind::Spacing { .. } => {
                let run = spacing::scan(self.elements, i);
                if let Some(cells) = spacing::cell_advance(run.width, self.geometry.cell_height) {
                    if self.row > self.column_indent {
                        self.row = self.row.saturating_add(cells);
                    } else {
                        trace!(width = run.width, "leading spacing discarded");
                    }
                }
                return i + run.len.max(1);
            }
            ElementKind::Decoration(_) | ElementKind::Float(_) | ElementKind::SideNote(_) => {
                let row = f64::from(self.row);
                self.map.insert(id, Placement::cell(self.coord(row)));
            }
            ElementKind::Break(kind) => self.structural_break(*kind),
        }
        i + 1
    }

    /// Resolve the indent for `attrs`, then move the cursor to the first
    /// usable cell at or below it.
    fn settle(&mut self, attrs: &Attributes) -> Extent {
        loop {
            let indent = self.resolve_indent(attrs);
            self.row = self.row.max(indent);
            self.column_indent = self.column_indent.max(indent);
            let capacity = self.capacity(attrs, indent);

            if self.row >= capacity {
                self.advance_column();
                continue;
            }
            if self.occupancy.is_occupied(self.page, self.column, self.row) {
                self.row += 1;
                continue;
            }
            return Extent { indent, capacity };
        }
    }

    fn resolve_indent(&self, attrs: &Attributes) -> u16 {
        if self.elevation.is_some() {
            return 0;
        }
        let indent = match attrs.block {
            Some(block) => match self.block_start.get(&block) {
                Some(&start) if start != (self.page, self.column) => attrs.indent,
                _ => attrs.first_indent(),
            },
            None => attrs.indent,
        };
        indent.min(self.geometry.row_limit.saturating_sub(1))
    }

    fn capacity(&self, attrs: &Attributes, indent: u16) -> u16 {
        self.geometry
            .row_limit
            .saturating_sub(attrs.right_indent)
            .max(indent + 1)
    }

    fn commit_block(&mut self, attrs: &Attributes) {
        if let Some(block) = attrs.block {
            self.block_start
                .entry(block)
                .or_insert((self.page, self.column));
        }
    }

    fn take_elevation(&mut self) -> u8 {
        self.elevation.take().unwrap_or(0)
    }

    fn mark_used(&mut self) {
        self.column_used = true;
        self.page_used = true;
    }

    fn place_block(&mut self, id: ElementId, attrs: &Attributes, width: u16, height: u16) {
        let geometry = self.geometry;
        let max_width = geometry.max_block_columns().max(1);
        let w = width.clamp(1, max_width);
        let h = height.clamp(1, geometry.row_limit);
        if w != width || h != height {
            warn!(
                element = id.0,
                width, height, clamped_width = w, clamped_height = h,
                "block exceeds the grid, clamped"
            );
        }

        loop {
            let extent = self.settle(attrs);
            let mut top = self.row;
            if u32::from(top) + u32::from(h) > u32::from(extent.capacity) {
                if self.column_used {
                    self.advance_column();
                    continue;
                }
                // Fresh column that cannot hold the block under its indent.
                top = top.min(geometry.row_limit - h);
            }

            let last_column = u32::from(self.column) + u32::from(w);
            let spans_reserved =
                (self.column..self.column.saturating_add(w)).any(|c| geometry.is_reserved(c));
            if last_column > u32::from(geometry.page_columns) || spans_reserved {
                self.advance_column();
                continue;
            }
            if !self.occupancy.claim(id, self.page, self.column, top, w, h) {
                self.advance_column();
                continue;
            }

            self.commit_block(attrs);
            let elevation = self.take_elevation();
            self.pending.push(Pending {
                id,
                row: top,
                height: f64::from(h) * geometry.cell_height,
                capacity: extent.capacity,
                block: Some((w, h)),
                elevation,
            });
            self.mark_used();
            self.row = top + h;
            return;
        }
    }

    /// Place the annotation run starting at `start`; returns the index after it.
    ///
    /// The run is split one column at a time so every chunk is measured
    /// against the rows actually free in the column it lands in.
    fn annotation_run(&mut self, start: usize, mut extent: Extent) -> usize {
        let end = start
            + self.elements[start..]
                .iter()
                .take_while(|e| e.attrs.annotation && matches!(e.kind, ElementKind::Glyph(_)))
                .count();
        let attrs = self.elements[start].attrs;
        self.flush(false);

        let hanging = attrs.indent.min(self.geometry.row_limit.saturating_sub(1));
        let next_capacity = self.capacity(&attrs, hanging) - hanging;
        let count = end - start;
        let mut placed = 0;
        let mut fresh = false;

        while placed < count {
            let available = self.free_rows(extent.capacity);
            // In a column just entered, the chunk has to fit where it is.
            let capacity = if fresh { available } else { next_capacity };
            let Some(chunk) = annotation::split(count - placed, available, capacity)
                .into_iter()
                .next()
            else {
                break;
            };
            if chunk.new_column && !fresh {
                self.advance_column();
                extent = self.settle(&attrs);
                fresh = true;
                continue;
            }

            trace!(
                glyphs = chunk.slots.len(),
                rows = chunk.rows,
                column = self.column,
                "annotation chunk"
            );
            self.commit_block(&attrs);
            let elevation = self.take_elevation();
            for slot in &chunk.slots {
                let id = ElementId((start + placed + slot.index) as u32);
                let row = f64::from(self.row + slot.relative_row);
                let mut placement = Placement::cell(self.coord(row));
                placement.sub_column = Some(slot.sub_column);
                if slot.relative_row == 0 && slot.sub_column == SubColumn::First {
                    placement.elevation = elevation;
                }
                self.map.insert(id, placement);
            }
            self.mark_used();
            self.row += chunk.rows;
            placed += chunk.slots.len();

            if placed < count {
                self.advance_column();
                extent = self.settle(&attrs);
                fresh = true;
            }
        }
        end
    }

    /// Contiguous unclaimed rows from the cursor down to `capacity`.
    fn free_rows(&self, capacity: u16) -> u16 {
        (self.row..capacity)
            .take_while(|&r| !self.occupancy.is_occupied(self.page, self.column, r))
            .count() as u16
    }

    fn structural_break(&mut self, kind: BreakKind) {
        match kind {
            BreakKind::Line | BreakKind::Paragraph => {
                if self.column_used {
                    self.advance_column();
                }
                if kind == BreakKind::Paragraph {
                    self.column_indent = 0;
                }
            }
            BreakKind::Column => {
                if self.column_used {
                    self.advance_column();
                }
            }
            BreakKind::Page => {
                if self.page_used {
                    self.advance_page();
                }
            }
            BreakKind::Elevate(level) => {
                if self.column_used {
                    self.advance_column();
                }
                self.elevation = Some(level);
            }
        }
    }

    fn advance_column(&mut self) {
        self.flush(true);
        self.column += 1;
        self.reset_column();
        if self.column >= self.geometry.page_columns {
            self.start_page();
        }
        while self.geometry.is_reserved(self.column) {
            self.map.record_reserved(self.page, self.column);
            self.column += 1;
            if self.column >= self.geometry.page_columns {
                self.start_page();
            }
        }
    }

    fn advance_page(&mut self) {
        self.flush(true);
        self.reset_column();
        self.start_page();
    }

    fn start_page(&mut self) {
        self.page += 1;
        self.column = 0;
        self.page_used = false;
        trace!(page = self.page, "new page");
    }

    fn reset_column(&mut self) {
        self.row = 0;
        self.column_indent = 0;
        self.column_used = false;
    }

    /// Write buffered elements into the map. With `distribute_column` set
    /// and distribute mode enabled, a glyph-only column free of claimed rows
    /// is respaced.
    fn flush(&mut self, distribute_column: bool) {
        if self.pending.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending);
        let start = pending[0].row;
        let capacity = pending.iter().map(|p| p.capacity).min().unwrap_or(start);
        // Rows claimed by a block reaching in from an earlier column stay put,
        // so a column crossed by a claim is written as placed.
        let respace = distribute_column
            && self.geometry.distribute
            && pending.iter().all(|p| p.block.is_none())
            && !(start..capacity).any(|r| self.occupancy.is_occupied(self.page, self.column, r));

        if respace {
            let available = capacity.saturating_sub(start).max(1);
            let heights: Vec<f64> = pending.iter().map(|p| p.height).collect();
            let spread = distribute(&heights, available, self.geometry.cell_height);
            for (p, offset) in pending.iter().zip(spread.rows) {
                let mut placement = Placement::cell(self.coord(f64::from(start) + offset));
                placement.vertical_scale = spread.scale;
                placement.respaced = true;
                placement.elevation = p.elevation;
                self.map.insert(p.id, placement);
            }
            return;
        }

        for p in pending {
            let coord = self.coord(f64::from(p.row));
            let mut placement = match p.block {
                Some((w, h)) => Placement::block(coord, w, h),
                None => Placement::cell(coord),
            };
            placement.elevation = p.elevation;
            self.map.insert(p.id, placement);
        }
    }
}
