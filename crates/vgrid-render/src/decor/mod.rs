#![forbid(unsafe_code)]

//! Decoration drawers.
//!
//! Each drawer paints one page-level ornament from the [`PageFrame`] alone.
//! The renderer runs the underlay drawers before any content and the debug
//! overlay after it:
//!
//! - [`Background`] - page fill
//! - [`ColumnBorders`] - column outlines, reserved columns excluded
//! - [`ReservedColumns`] - dividers, captions, end cap and page number
//! - [`OuterFrame`] - frame around the whole grid
//! - [`DebugGrid`] - cell grid and element boxes
//!
//! Element-anchored ornaments (side notes, floating blocks) live in
//! [`margin`].

mod background;
mod banxin;
mod borders;
mod debug;
mod frame;
pub mod margin;

pub use background::Background;
pub use banxin::{ReservedColumns, chinese_numeral};
pub use borders::ColumnBorders;
pub use debug::DebugGrid;
pub use frame::OuterFrame;

use crate::instruction::Draw;
use crate::mapping::PageFrame;

/// A page-level ornament.
pub trait Drawer {
    fn draw(&self, frame: &PageFrame<'_>, out: &mut dyn Draw);
}

/// Fraction of the cell a caption glyph fills.
pub(crate) const CAPTION_SCALE: f64 = 0.7;
/// Ascent of a full-width glyph as a fraction of its em size.
pub(crate) const ASCENT: f64 = 0.88;
