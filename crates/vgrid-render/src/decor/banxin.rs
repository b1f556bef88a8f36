#![forbid(unsafe_code)]

//! Reserved-column (banxin) ornamentation.
//!
//! A reserved column is split by two horizontal dividers at one quarter and
//! three quarters of its height. The book title runs down the upper section,
//! the end cap sits just below the upper divider with the chapter title
//! under it, and the page number (in Chinese numerals) rests on the lower
//! divider.

use smallvec::{SmallVec, smallvec};
use vgrid_core::{Color, Point, Rect, Stroke};

use super::{ASCENT, CAPTION_SCALE, Drawer};
use crate::instruction::{Content, Draw};
use crate::mapping::PageFrame;

const DIGITS: [char; 10] = ['〇', '一', '二', '三', '四', '五', '六', '七', '八', '九'];

/// Page number in Chinese numerals (`12` → `十二`, `105` → `一百〇五`).
///
/// Numbers from ten thousand up are spelled digit by digit.
pub fn chinese_numeral(n: u32) -> SmallVec<[char; 8]> {
    if n == 0 {
        return smallvec!['〇'];
    }
    if n >= 10_000 {
        return n
            .to_string()
            .bytes()
            .map(|b| DIGITS[usize::from(b - b'0')])
            .collect();
    }

    let mut out: SmallVec<[char; 8]> = SmallVec::new();
    let mut rest = n as usize;
    let mut gap = false;
    for (value, unit) in [(1000, '千'), (100, '百'), (10, '十')] {
        let digit = rest / value;
        rest %= value;
        if digit == 0 {
            gap |= !out.is_empty();
            continue;
        }
        if gap {
            out.push('〇');
            gap = false;
        }
        // 十二, not 一十二, at the head of the number.
        if !(digit == 1 && value == 10 && out.is_empty()) {
            out.push(DIGITS[digit]);
        }
        out.push(unit);
    }
    if rest > 0 {
        if gap {
            out.push('〇');
        }
        out.push(DIGITS[rest]);
    }
    out
}

/// Ornaments every reserved column recorded for the page.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReservedColumns;

impl Drawer for ReservedColumns {
    fn draw(&self, frame: &PageFrame<'_>, out: &mut dyn Draw) {
        let geometry = frame.geometry;
        let stroke = geometry
            .border
            .unwrap_or_else(|| Stroke::new(geometry.font_color, 0.6));
        for &logical in frame.summary.reserved.iter().filter(|&&c| c < frame.total_columns) {
            Ornament::new(frame, frame.column_rect(logical), stroke).draw(out);
        }
    }
}

struct Ornament<'f, 'a> {
    frame: &'f PageFrame<'a>,
    column: Rect,
    stroke: Stroke,
    color: Color,
    /// Caption glyph em size.
    size: f64,
    /// Vertical pitch of stacked caption glyphs.
    pitch: f64,
}

impl<'f, 'a> Ornament<'f, 'a> {
    fn new(frame: &'f PageFrame<'a>, column: Rect, stroke: Stroke) -> Self {
        let g = frame.geometry;
        Self {
            frame,
            column,
            stroke,
            color: g.font_color,
            size: g.cell_width.min(g.cell_height) * CAPTION_SCALE,
            pitch: g.cell_height,
        }
    }

    fn draw(&self, out: &mut dyn Draw) {
        let c = self.column;
        let upper = c.y + c.height / 4.0;
        let lower = c.y + c.height * 3.0 / 4.0;
        for y in [upper, lower] {
            out.line(Point::new(c.x, y), Point::new(c.right(), y), self.stroke);
        }

        let captions = &self.frame.geometry.captions;
        let pad = (self.pitch - self.size) / 2.0;
        if let Some(title) = &captions.book_title {
            self.stack(out, title.chars(), c.y + pad, upper);
        }

        let mut below = upper + pad;
        if let Some(cap) = captions.end_cap {
            out.place(
                None,
                Point::new(c.x + c.width / 2.0, upper + self.pitch / 2.0),
                (1.0, 1.0),
                Content::Mark {
                    ch: cap,
                    color: self.color,
                },
            );
            below += self.pitch;
        }
        if let Some(chapter) = &captions.chapter_title {
            self.stack(out, chapter.chars(), below, lower);
        }

        if captions.show_page_number {
            let digits = chinese_numeral(self.frame.page_number);
            let top = lower - pad - digits.len() as f64 * self.pitch;
            self.stack(out, digits.into_iter(), top.max(below), lower);
        }
    }

    /// Stack caption glyphs downward from `top`, dropping any that would
    /// cross `limit`.
    fn stack(&self, out: &mut dyn Draw, chars: impl Iterator<Item = char>, top: f64, limit: f64) {
        let x = self.column.x + (self.column.width - self.size) / 2.0;
        let mut y = top;
        for ch in chars {
            if y + self.size > limit {
                break;
            }
            out.place(
                None,
                Point::new(x, y + self.size * ASCENT),
                (1.0, 1.0),
                Content::Glyph {
                    ch,
                    color: self.color,
                    size: Some(self.size),
                },
            );
            y += self.pitch;
        }
    }
}
