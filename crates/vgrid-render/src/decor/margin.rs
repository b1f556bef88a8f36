#![forbid(unsafe_code)]

//! Element-anchored ornaments: margin side notes and floating blocks.
//!
//! Both are zero-advance elements. A side note hangs in the gap on the left
//! boundary of its anchor column, starting at the anchor row; a floating
//! block ignores the grid and is positioned from the page margins.

use vgrid_core::{AttributeRegistry, ElementId, FloatBlock, Point, SideNote};
use vgrid_layout::Placement;

use crate::instruction::{Content, Draw};
use crate::mapping::PageFrame;

/// Draw the glyphs of a side note, scaled down and centered on the column
/// boundary.
pub fn side_note(
    frame: &PageFrame<'_>,
    registry: &AttributeRegistry,
    id: ElementId,
    note: &SideNote,
    placement: &Placement,
    out: &mut dyn Draw,
) {
    let geometry = frame.geometry;
    let scale = geometry.side_note_scale;
    let color = note
        .style
        .and_then(|s| registry.style(s))
        .and_then(|s| s.color)
        .unwrap_or(geometry.side_note_color);

    let axis = frame.column_x(placement.coord.column);
    let mut y = frame.row_y(placement.coord.row);
    for glyph in &note.glyphs {
        let width = glyph.width * scale;
        out.place(
            Some(id),
            Point::new(axis - width / 2.0, y + glyph.height * scale),
            (scale, scale),
            Content::Glyph {
                ch: glyph.ch,
                color,
                size: None,
            },
        );
        out.kern(id, -width);
        let extent = glyph.extent();
        y += if extent > 0.0 {
            extent * scale
        } else {
            geometry.cell_height * scale
        };
    }
}

/// Draw a floating block at its offset from the top-left margin corner.
pub fn float_block(frame: &PageFrame<'_>, id: ElementId, float: &FloatBlock, out: &mut dyn Draw) {
    let margins = frame.geometry.margins;
    out.place(
        Some(id),
        Point::new(margins.left + float.x, margins.top + float.y),
        (1.0, 1.0),
        Content::Source {
            source: float.source,
            width: float.width,
            height: float.height,
        },
    );
}
