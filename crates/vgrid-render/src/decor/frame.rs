#![forbid(unsafe_code)]

use super::Drawer;
use crate::instruction::Draw;
use crate::mapping::PageFrame;

/// Heavy frame around the column grid, set off by the configured gap.
#[derive(Debug, Clone, Copy, Default)]
pub struct OuterFrame;

impl Drawer for OuterFrame {
    fn draw(&self, frame: &PageFrame<'_>, out: &mut dyn Draw) {
        let Some(stroke) = frame.geometry.outer_frame else {
            return;
        };
        // Stroke centered on its path: push it out by half its width.
        let rect = frame
            .grid
            .outset(frame.geometry.outer_frame_gap + stroke.width / 2.0);
        out.stroke_rect(rect, stroke);
    }
}
