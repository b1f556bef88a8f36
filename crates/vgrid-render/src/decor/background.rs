#![forbid(unsafe_code)]

use vgrid_core::Rect;

use super::Drawer;
use crate::instruction::Draw;
use crate::mapping::PageFrame;

/// Fills the whole page with the configured background color.
#[derive(Debug, Clone, Copy, Default)]
pub struct Background;

impl Drawer for Background {
    fn draw(&self, frame: &PageFrame<'_>, out: &mut dyn Draw) {
        let Some(color) = frame.geometry.background else {
            return;
        };
        let (width, height) = frame.page_size();
        out.fill_rect(Rect::new(0.0, 0.0, width, height), color);
    }
}
