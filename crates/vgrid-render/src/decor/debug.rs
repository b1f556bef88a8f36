#![forbid(unsafe_code)]

use vgrid_core::{Color, DebugOverlay, Rect, Stroke};

use super::Drawer;
use crate::instruction::Draw;
use crate::mapping::PageFrame;

const GRID_COLOR: Color = Color::rgba(0, 160, 255, 96);
const BOX_COLOR: Color = Color::rgba(255, 64, 0, 160);
const HAIRLINE: f64 = 0.25;

/// Diagnostic overlay: every grid cell and every element box.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugGrid<'b> {
    /// Element boxes collected while rendering content.
    pub boxes: &'b [Rect],
}

impl Drawer for DebugGrid<'_> {
    fn draw(&self, frame: &PageFrame<'_>, out: &mut dyn Draw) {
        let overlay = frame.geometry.overlay;
        if overlay.contains(DebugOverlay::GRID) {
            let stroke = Stroke::new(GRID_COLOR, HAIRLINE);
            let (cw, ch) = (frame.geometry.cell_width, frame.geometry.cell_height);
            for column in 0..frame.total_columns {
                let x = frame.column_x(column);
                for row in 0..frame.geometry.row_limit {
                    out.stroke_rect(Rect::new(x, frame.row_y(f64::from(row)), cw, ch), stroke);
                }
            }
        }
        if overlay.contains(DebugOverlay::BOXES) {
            let stroke = Stroke::new(BOX_COLOR, HAIRLINE);
            for rect in self.boxes {
                out.stroke_rect(*rect, stroke);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::DrawInstruction;
    use vgrid_core::GridConfig;
    use vgrid_layout::PageSummary;

    #[test]
    fn grid_outlines_every_cell() {
        let geometry = GridConfig {
            row_limit: 3,
            debug_grid: true,
            ..GridConfig::default()
        }
        .geometry();
        let summary = PageSummary {
            max_column: Some(1),
            ..PageSummary::default()
        };
        let boxes = [Rect::new(0.0, 0.0, 5.0, 5.0)];
        let mut out: Vec<DrawInstruction> = Vec::new();
        DebugGrid { boxes: &boxes }.draw(&PageFrame::new(&geometry, &summary, 0, 1), &mut out);
        // Boxes are only drawn with their own flag.
        assert_eq!(out.len(), 6);
    }

    #[test]
    fn boxes_follow_flag() {
        let geometry = GridConfig {
            debug_boxes: true,
            ..GridConfig::default()
        }
        .geometry();
        let summary = PageSummary::default();
        let boxes = [Rect::new(0.0, 0.0, 5.0, 5.0), Rect::new(5.0, 0.0, 5.0, 5.0)];
        let mut out: Vec<DrawInstruction> = Vec::new();
        DebugGrid { boxes: &boxes }.draw(&PageFrame::new(&geometry, &summary, 0, 1), &mut out);
        assert_eq!(out.len(), 2);
    }
}
