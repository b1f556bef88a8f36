#![forbid(unsafe_code)]

//! Logical-to-physical column mapping and per-page frame geometry.
//!
//! Logical columns increase in placement order; vertical text reads right
//! to left, so logical column 0 is drawn at the right edge of the grid.

use vgrid_core::{PageGeometry, Rect};
use vgrid_layout::PageSummary;

/// Physical (left-to-right) index of a logical column.
#[inline]
pub const fn physical_column(logical: u16, total: u16) -> u16 {
    total.saturating_sub(1).saturating_sub(logical)
}

/// Geometry of one page being rendered.
#[derive(Debug, Clone, Copy)]
pub struct PageFrame<'a> {
    pub geometry: &'a PageGeometry,
    pub summary: &'a PageSummary,
    pub index: u32,
    pub page_number: u32,
    pub total_columns: u16,
    /// The column grid in page space.
    pub grid: Rect,
}

impl<'a> PageFrame<'a> {
    pub fn new(
        geometry: &'a PageGeometry,
        summary: &'a PageSummary,
        index: u32,
        page_number: u32,
    ) -> Self {
        let total_columns = summary.column_count(geometry.min_page_columns);
        let grid = Rect::new(
            geometry.margins.left + geometry.padding.left,
            geometry.margins.top + geometry.padding.top,
            f64::from(total_columns) * geometry.cell_width,
            geometry.column_height(),
        );
        Self {
            geometry,
            summary,
            index,
            page_number,
            total_columns,
            grid,
        }
    }

    /// Full page size: grid plus padding and margins.
    pub fn page_size(&self) -> (f64, f64) {
        let g = self.geometry;
        (
            self.grid.width + g.padding.horizontal_sum() + g.margins.horizontal_sum(),
            self.grid.height + g.padding.vertical_sum() + g.margins.vertical_sum(),
        )
    }

    /// Left edge of a logical column.
    #[inline]
    pub fn column_x(&self, logical: u16) -> f64 {
        self.grid.x
            + f64::from(physical_column(logical, self.total_columns)) * self.geometry.cell_width
    }

    /// Rectangle of a logical column.
    pub fn column_rect(&self, logical: u16) -> Rect {
        Rect::new(
            self.column_x(logical),
            self.grid.y,
            self.geometry.cell_width,
            self.grid.height,
        )
    }

    /// Top edge of a (possibly fractional) row.
    #[inline]
    pub fn row_y(&self, row: f64) -> f64 {
        self.grid.y + row * self.geometry.cell_height
    }

    /// Whether the logical column was skipped as reserved on this page.
    pub fn is_reserved(&self, logical: u16) -> bool {
        self.summary.reserved.contains(&logical) || self.geometry.is_reserved(logical)
    }
}

/// Page-number source threaded across invocations by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCounter {
    next: u32,
}

impl Default for PageCounter {
    fn default() -> Self {
        Self::new(1)
    }
}

impl PageCounter {
    /// Counter whose first page is numbered `first`.
    pub const fn new(first: u32) -> Self {
        Self { next: first }
    }

    /// Number the next page will receive.
    pub const fn peek(&self) -> u32 {
        self.next
    }

    /// Consume a page number.
    pub fn take(&mut self) -> u32 {
        let n = self.next;
        self.next = self.next.saturating_add(1);
        n
    }
}
