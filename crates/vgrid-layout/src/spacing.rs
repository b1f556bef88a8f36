#![forbid(unsafe_code)]

//! Bounded spacing summation.
//!
//! A spacing run is the maximal stretch of consecutive spacing elements.
//! The scan stops at the first element of any other kind, so it can never
//! swallow the glyph, block or forced break that follows the run.

use vgrid_core::{ContentElement, ElementKind};

/// Result of scanning one spacing run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpacingRun {
    /// Net width of the run in points.
    pub width: f64,
    /// Number of spacing elements consumed.
    pub len: usize,
}

/// Whether `kind` ends a spacing run.
///
/// Kept as an exhaustive match so a new element variant has to decide
/// explicitly.
pub const fn terminates_run(kind: &ElementKind) -> bool {
    match kind {
        ElementKind::Spacing { .. } => false,
        ElementKind::Glyph(_)
        | ElementKind::Block { .. }
        | ElementKind::Break(_)
        | ElementKind::Decoration(_)
        | ElementKind::Float(_)
        | ElementKind::SideNote(_) => true,
    }
}

/// Sum the spacing run starting at `start`.
pub fn scan(elements: &[ContentElement], start: usize) -> SpacingRun {
    let mut width = 0.0;
    let mut len = 0;
    for element in elements.iter().skip(start) {
        if terminates_run(&element.kind) {
            break;
        }
        if let ElementKind::Spacing { width: w } = element.kind {
            width += w;
        }
        len += 1;
    }
    SpacingRun { width, len }
}

/// Whole-cell advance for a run of `width` points, or `None` if the run is
/// too small to matter (one quarter of a cell or less).
pub fn cell_advance(width: f64, cell_height: f64) -> Option<u16> {
    if !width.is_finite() || width <= cell_height / 4.0 {
        return None;
    }
    let cells = (width / cell_height).round().max(1.0);
    Some(cells.min(f64::from(u16::MAX)) as u16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vgrid_core::{BreakKind, GlyphMetrics};

    fn spacing(width: f64) -> ContentElement {
        ContentElement::bare(ElementKind::Spacing { width })
    }

    fn glyph() -> ContentElement {
        ContentElement::bare(ElementKind::Glyph(GlyphMetrics::new('字', 10.0, 8.0, 2.0)))
    }

    #[test]
    fn stops_at_glyph() {
        let elements = vec![spacing(5.0), spacing(7.0), glyph(), spacing(100.0)];
        let run = scan(&elements, 0);
        assert_eq!(run, SpacingRun { width: 12.0, len: 2 });
    }

    #[test]
    fn stops_at_forced_break() {
        let elements = vec![
            spacing(5.0),
            ContentElement::bare(ElementKind::Break(BreakKind::Column)),
            spacing(5.0),
        ];
        assert_eq!(scan(&elements, 0).len, 1);
    }

    #[test]
    fn runs_to_end_of_stream() {
        let elements = vec![glyph(), spacing(1.0), spacing(2.0)];
        assert_eq!(scan(&elements, 1), SpacingRun { width: 3.0, len: 2 });
        assert_eq!(scan(&elements, 3), SpacingRun { width: 0.0, len: 0 });
    }

    #[test]
    fn quarter_cell_threshold() {
        assert_eq!(cell_advance(5.0, 20.0), None);
        assert_eq!(cell_advance(6.0, 20.0), Some(1));
        assert_eq!(cell_advance(40.0, 20.0), Some(2));
        assert_eq!(cell_advance(-40.0, 20.0), None);
    }
}
