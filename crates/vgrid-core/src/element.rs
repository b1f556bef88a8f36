#![forbid(unsafe_code)]

//! Flat content model.
//!
//! A [`ContentStream`] is the arena every later stage indexes into: an
//! element's identity is its position in the stream ([`ElementId`]), and each
//! element owns a private [`Attributes`] snapshot. Nothing is shared between
//! elements, so a stream can be laid out any number of times without
//! observable mutation.

use crate::registry::{DecorationId, StyleId};

/// Identity of an element: its index in the [`ContentStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(pub u32);

impl ElementId {
    /// Index into the owning stream.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identity of a logical block (paragraph) for first-line indent tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub u32);

/// Opaque handle to host content (a box, an image) the output writer emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceRef(pub u64);

/// Shaped glyph metrics in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphMetrics {
    /// Character the glyph draws.
    pub ch: char,
    /// Natural horizontal advance.
    pub width: f64,
    /// Ascent above the baseline.
    pub height: f64,
    /// Descent below the baseline.
    pub depth: f64,
}

impl GlyphMetrics {
    /// Create glyph metrics.
    pub const fn new(ch: char, width: f64, height: f64, depth: f64) -> Self {
        Self {
            ch,
            width,
            height,
            depth,
        }
    }

    /// Full vertical extent (`height + depth`).
    #[inline]
    pub fn extent(&self) -> f64 {
        self.height + self.depth
    }
}

/// Kinds of structural break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BreakKind {
    /// End of a source line.
    Line,
    /// End of a paragraph. Resets block indent tracking.
    Paragraph,
    /// Forced column break.
    Column,
    /// Forced page break.
    Page,
    /// Forced column break whose next element is raised `level` cells
    /// above the grid top.
    Elevate(u8),
}

/// An absolutely positioned block, placed relative to the page margins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatBlock {
    /// Offset from the left margin.
    pub x: f64,
    /// Offset from the top margin.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub source: SourceRef,
}

/// A margin note drawn in the gap beside its anchor column.
#[derive(Debug, Clone, PartialEq)]
pub struct SideNote {
    pub glyphs: Vec<GlyphMetrics>,
    pub style: Option<StyleId>,
}

/// Element payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    /// A shaped character occupying one cell.
    Glyph(GlyphMetrics),
    /// Glue along the column direction, in points.
    Spacing { width: f64 },
    /// An opaque rectangular region of whole cells.
    Block {
        width_cells: u16,
        height_cells: u16,
        source: SourceRef,
    },
    /// A line, paragraph, column or page break.
    Break(BreakKind),
    /// A zero-advance overlay glyph resolved through the registry.
    Decoration(DecorationId),
    /// A zero-advance absolutely positioned block.
    Float(FloatBlock),
    /// A zero-advance margin note.
    SideNote(SideNote),
}

impl ElementKind {
    /// Short name for diagnostics.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Glyph(_) => "glyph",
            Self::Spacing { .. } => "spacing",
            Self::Block { .. } => "block",
            Self::Break(_) => "break",
            Self::Decoration(_) => "decoration",
            Self::Float(_) => "float",
            Self::SideNote(_) => "side-note",
        }
    }
}

/// Per-element attribute snapshot.
///
/// Indents are in grid rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Attributes {
    /// Hanging indent: minimum row for every element of the block.
    pub indent: u16,
    /// Minimum row in the block's first column; falls back to `indent`.
    pub first_line_indent: Option<u16>,
    /// Rows withheld from the bottom of the column.
    pub right_indent: u16,
    /// Owning block, if any.
    pub block: Option<BlockId>,
    /// Route into the dual sub-column annotation flow.
    pub annotation: bool,
    /// Overlay drawn on top of this element.
    pub decoration: Option<DecorationId>,
    /// Color / size / alignment record.
    pub style: Option<StyleId>,
}

impl Attributes {
    /// Indent that applies in the block's first column.
    #[inline]
    pub fn first_indent(&self) -> u16 {
        self.first_line_indent.unwrap_or(self.indent)
    }
}

/// One flattened element.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentElement {
    pub kind: ElementKind,
    pub attrs: Attributes,
}

impl ContentElement {
    /// Create an element with the given attribute snapshot.
    pub fn new(kind: ElementKind, attrs: Attributes) -> Self {
        Self { kind, attrs }
    }

    /// Create an element with default attributes.
    pub fn bare(kind: ElementKind) -> Self {
        Self::new(kind, Attributes::default())
    }
}

/// The flat, ordered element arena produced by normalization.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContentStream {
    elements: Vec<ContentElement>,
}

impl ContentStream {
    /// Create an empty stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element and return its identity.
    pub fn push(&mut self, element: ContentElement) -> ElementId {
        let id = ElementId(self.elements.len() as u32);
        self.elements.push(element);
        id
    }

    /// Look up an element.
    #[inline]
    pub fn get(&self, id: ElementId) -> Option<&ContentElement> {
        self.elements.get(id.index())
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if the stream is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements in stream order.
    #[inline]
    pub fn as_slice(&self) -> &[ContentElement] {
        &self.elements
    }

    /// Iterate `(id, element)` pairs in stream order.
    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &ContentElement)> {
        self.elements
            .iter()
            .enumerate()
            .map(|(i, e)| (ElementId(i as u32), e))
    }
}

impl FromIterator<ContentElement> for ContentStream {
    fn from_iter<I: IntoIterator<Item = ContentElement>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_assigns_sequential_ids() {
        let mut stream = ContentStream::new();
        let a = stream.push(ContentElement::bare(ElementKind::Spacing { width: 1.0 }));
        let b = stream.push(ContentElement::bare(ElementKind::Break(BreakKind::Line)));
        assert_eq!(a, ElementId(0));
        assert_eq!(b, ElementId(1));
        assert_eq!(stream.len(), 2);
        assert!(stream.get(ElementId(5)).is_none());
    }

    #[test]
    fn first_indent_falls_back_to_hanging() {
        let mut attrs = Attributes {
            indent: 2,
            ..Attributes::default()
        };
        assert_eq!(attrs.first_indent(), 2);
        attrs.first_line_indent = Some(0);
        assert_eq!(attrs.first_indent(), 0);
    }

    #[test]
    fn kind_names() {
        let g = ElementKind::Glyph(GlyphMetrics::new('字', 10.0, 8.0, 2.0));
        assert_eq!(g.name(), "glyph");
        assert_eq!(ElementKind::Break(BreakKind::Column).name(), "break");
    }

    #[test]
    fn glyph_extent() {
        assert_eq!(GlyphMetrics::new('a', 1.0, 7.0, 3.0).extent(), 10.0);
    }
}
