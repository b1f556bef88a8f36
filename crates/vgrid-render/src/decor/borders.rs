#![forbid(unsafe_code)]

use super::Drawer;
use crate::instruction::Draw;
use crate::mapping::PageFrame;

/// Outlines every body column. Reserved columns carry their own ornaments
/// and are left out.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnBorders;

impl Drawer for ColumnBorders {
    fn draw(&self, frame: &PageFrame<'_>, out: &mut dyn Draw) {
        let Some(stroke) = frame.geometry.border else {
            return;
        };
        for logical in (0..frame.total_columns).filter(|&c| !frame.is_reserved(c)) {
            out.stroke_rect(frame.column_rect(logical), stroke);
        }
    }
}
