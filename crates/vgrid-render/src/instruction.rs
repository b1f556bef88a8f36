#![forbid(unsafe_code)]

//! Drawing instructions handed to the page-output backend.
//!
//! Coordinates are points with the origin at the page's top-left corner and
//! y growing downward. What a position names depends on the content:
//!
//! - [`Content::Glyph`]: the glyph origin, its left edge on the baseline
//! - [`Content::Mark`]: the center of the overlay glyph
//! - [`Content::Source`]: the top-left corner of the region

use vgrid_core::{Color, ElementId, Point, Rect, SourceRef, Stroke};

/// What a placement instruction draws.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// A body, annotation or caption glyph. `size` overrides the host font
    /// size when set.
    Glyph {
        ch: char,
        color: Color,
        size: Option<f64>,
    },
    /// A zero-advance overlay glyph.
    Mark { ch: char, color: Color },
    /// Opaque host content of a block or floating block.
    Source {
        source: SourceRef,
        width: f64,
        height: f64,
    },
}

/// One low-level drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawInstruction {
    /// Draw `content` at `at`.
    Place {
        element: Option<ElementId>,
        at: Point,
        content: Content,
    },
    /// Draw `content` at `at` through a scaling transform.
    Scaled {
        element: Option<ElementId>,
        at: Point,
        scale_x: f64,
        scale_y: f64,
        content: Content,
    },
    /// Corrective horizontal advance cancelling an element's natural width.
    Kern { element: ElementId, advance: f64 },
    FillRect { rect: Rect, color: Color },
    StrokeRect { rect: Rect, stroke: Stroke },
    Line { from: Point, to: Point, stroke: Stroke },
}

impl DrawInstruction {
    /// The content element this instruction draws, if any.
    pub fn element(&self) -> Option<ElementId> {
        match self {
            Self::Place { element, .. } | Self::Scaled { element, .. } => *element,
            Self::Kern { element, .. } => Some(*element),
            Self::FillRect { .. } | Self::StrokeRect { .. } | Self::Line { .. } => None,
        }
    }
}

/// One finished page.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    /// Zero-based page index within this invocation.
    pub index: u32,
    /// Number drawn in the reserved column; continues across invocations.
    pub page_number: u32,
    pub width: f64,
    pub height: f64,
    /// Physical column count.
    pub total_columns: u16,
    pub instructions: Vec<DrawInstruction>,
}

impl RenderedPage {
    /// Instructions belonging to `element`, in emission order.
    pub fn instructions_for(&self, element: ElementId) -> impl Iterator<Item = &DrawInstruction> {
        self.instructions
            .iter()
            .filter(move |i| i.element() == Some(element))
    }
}

/// Drawing primitives shared by the renderer and the decoration drawers.
///
/// Degenerate shapes (empty rectangles, zero-length lines, invisible
/// strokes) are dropped instead of emitted.
pub trait Draw {
    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke);

    fn line(&mut self, from: Point, to: Point, stroke: Stroke);

    /// Place `content` at `at`, scaled when either factor differs from 1.
    fn place(
        &mut self,
        element: Option<ElementId>,
        at: Point,
        scale: (f64, f64),
        content: Content,
    );

    fn kern(&mut self, element: ElementId, advance: f64);
}

impl Draw for Vec<DrawInstruction> {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        if rect.is_empty() || color.a() == 0 {
            return;
        }
        self.push(DrawInstruction::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: Stroke) {
        if rect.is_empty() || stroke.color.a() == 0 {
            return;
        }
        self.push(DrawInstruction::StrokeRect { rect, stroke });
    }

    fn line(&mut self, from: Point, to: Point, stroke: Stroke) {
        if from == to || stroke.color.a() == 0 {
            return;
        }
        self.push(DrawInstruction::Line { from, to, stroke });
    }

    fn place(
        &mut self,
        element: Option<ElementId>,
        at: Point,
        (scale_x, scale_y): (f64, f64),
        content: Content,
    ) {
        if scale_x == 1.0 && scale_y == 1.0 {
            self.push(DrawInstruction::Place {
                element,
                at,
                content,
            });
        } else {
            self.push(DrawInstruction::Scaled {
                element,
                at,
                scale_x,
                scale_y,
                content,
            });
        }
    }

    fn kern(&mut self, element: ElementId, advance: f64) {
        if advance != 0.0 {
            self.push(DrawInstruction::Kern { element, advance });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke() -> Stroke {
        Stroke::new(Color::BLACK, 1.0)
    }

    #[test]
    fn degenerate_shapes_are_dropped() {
        let mut out: Vec<DrawInstruction> = Vec::new();
        out.fill_rect(Rect::new(0.0, 0.0, 0.0, 10.0), Color::RED);
        out.stroke_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Stroke::new(Color::TRANSPARENT, 1.0));
        out.line(Point::new(1.0, 1.0), Point::new(1.0, 1.0), stroke());
        out.kern(ElementId(0), 0.0);
        assert!(out.is_empty());
    }

    #[test]
    fn unit_scale_places_plainly() {
        let mut out: Vec<DrawInstruction> = Vec::new();
        let glyph = Content::Mark {
            ch: '。',
            color: Color::RED,
        };
        out.place(None, Point::new(1.0, 2.0), (1.0, 1.0), glyph.clone());
        out.place(None, Point::new(1.0, 2.0), (1.0, 0.5), glyph);
        assert!(matches!(out[0], DrawInstruction::Place { .. }));
        assert!(matches!(
            out[1],
            DrawInstruction::Scaled { scale_y, .. } if scale_y == 0.5
        ));
    }

    #[test]
    fn element_filter() {
        let page = RenderedPage {
            index: 0,
            page_number: 1,
            width: 100.0,
            height: 100.0,
            total_columns: 1,
            instructions: vec![
                DrawInstruction::FillRect {
                    rect: Rect::new(0.0, 0.0, 1.0, 1.0),
                    color: Color::WHITE,
                },
                DrawInstruction::Kern {
                    element: ElementId(3),
                    advance: -20.0,
                },
            ],
        };
        assert_eq!(page.instructions_for(ElementId(3)).count(), 1);
        assert_eq!(page.instructions_for(ElementId(0)).count(), 0);
    }
}
