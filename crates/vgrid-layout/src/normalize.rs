#![forbid(unsafe_code)]

//! Content stream normalization.
//!
//! Flattens the host's nested container tree into one [`ContentStream`].
//! Indentation is inherited: a container's declared margin (an explicit
//! grid indent, an explicit shift in points, or leading glue up to its first
//! visible child) becomes the indent of every descendant until a deeper
//! container declares its own. Containers tagged with a cell size are opaque
//! and become a single block element. A break follows every line and
//! paragraph container.
//!
//! # Example
//!
//! ```
//! use vgrid_core::{BreakKind, ElementKind, GlyphMetrics};
//! use vgrid_layout::normalize::{normalize, Container, Node};
//!
//! let glyph = Node::glyph(GlyphMetrics::new('天', 20.0, 16.0, 4.0));
//! let tree = vec![Node::Container(Container::paragraph(vec![glyph]).with_indent(2))];
//! let stream = normalize(&tree, 20.0);
//!
//! assert_eq!(stream.len(), 2);
//! assert_eq!(stream.as_slice()[0].attrs.indent, 2);
//! assert_eq!(stream.as_slice()[1].kind, ElementKind::Break(BreakKind::Paragraph));
//! ```

use tracing::warn;
use vgrid_core::{
    Attributes, BlockId, BreakKind, ContentElement, ContentStream, DecorationId, ElementKind,
    FloatBlock, GlyphMetrics, SideNote, SourceRef, StyleId,
};

/// Maximum container nesting followed before a subtree is dropped.
pub const MAX_NESTING: usize = 64;

/// A node of the host's content tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Glyph {
        metrics: GlyphMetrics,
        decoration: Option<DecorationId>,
    },
    /// Glue along the column direction, in points.
    Glue(f64),
    Break(BreakKind),
    Decoration(DecorationId),
    Float(FloatBlock),
    SideNote(SideNote),
    Container(Container),
}

impl Node {
    /// A plain glyph node.
    pub fn glyph(metrics: GlyphMetrics) -> Self {
        Self::Glyph {
            metrics,
            decoration: None,
        }
    }

    /// A glyph carrying an overlay decoration.
    pub fn decorated(metrics: GlyphMetrics, decoration: DecorationId) -> Self {
        Self::Glyph {
            metrics,
            decoration: Some(decoration),
        }
    }
}

/// Container role; decides which break follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContainerKind {
    /// Pure grouping, no trailing break.
    #[default]
    Group,
    /// A source line, followed by [`BreakKind::Line`].
    Line,
    /// A paragraph, followed by [`BreakKind::Paragraph`]. Opens a new block.
    Paragraph,
}

/// A container node. `None` fields inherit from the enclosing container.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Container {
    pub kind: ContainerKind,
    /// Explicit grid-unit indent.
    pub indent: Option<u16>,
    /// Explicit margin shift in points.
    pub shift: Option<f64>,
    pub first_line_indent: Option<u16>,
    pub right_indent: Option<u16>,
    pub annotation: Option<bool>,
    pub style: Option<StyleId>,
    /// Cell size tag `(width, height)`: the container becomes one block.
    pub cells: Option<(u16, u16)>,
    pub source: SourceRef,
    pub children: Vec<Node>,
}

impl Container {
    /// A grouping container.
    pub fn group(children: Vec<Node>) -> Self {
        Self {
            children,
            ..Self::default()
        }
    }

    /// A line container.
    pub fn line(children: Vec<Node>) -> Self {
        Self {
            kind: ContainerKind::Line,
            children,
            ..Self::default()
        }
    }

    /// A paragraph container.
    pub fn paragraph(children: Vec<Node>) -> Self {
        Self {
            kind: ContainerKind::Paragraph,
            children,
            ..Self::default()
        }
    }

    /// An opaque block of `width × height` cells.
    pub fn block(width: u16, height: u16, source: SourceRef) -> Self {
        Self {
            cells: Some((width, height)),
            source,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_indent(mut self, indent: u16) -> Self {
        self.indent = Some(indent);
        self
    }

    #[must_use]
    pub fn with_shift(mut self, shift: f64) -> Self {
        self.shift = Some(shift);
        self
    }

    #[must_use]
    pub fn with_first_line_indent(mut self, indent: u16) -> Self {
        self.first_line_indent = Some(indent);
        self
    }

    #[must_use]
    pub fn with_right_indent(mut self, indent: u16) -> Self {
        self.right_indent = Some(indent);
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: StyleId) -> Self {
        self.style = Some(style);
        self
    }

    /// Route the container's glyphs into the dual sub-column flow.
    #[must_use]
    pub fn annotated(mut self) -> Self {
        self.annotation = Some(true);
        self
    }
}

/// Flatten `nodes` into a content stream.
///
/// `cell_height` converts margins in points into grid rows.
pub fn normalize(nodes: &[Node], cell_height: f64) -> ContentStream {
    let mut normalizer = Normalizer {
        cell_height: if cell_height > 0.0 { cell_height } else { 1.0 },
        next_block: 0,
        stream: ContentStream::new(),
    };
    normalizer.walk(nodes, Attributes::default(), 0);
    normalizer.stream
}

struct Normalizer {
    cell_height: f64,
    next_block: u32,
    stream: ContentStream,
}

impl Normalizer {
    fn rows(&self, margin: f64) -> u16 {
        if !margin.is_finite() || margin <= 0.0 {
            return 0;
        }
        (margin / self.cell_height).round().min(f64::from(u16::MAX)) as u16
    }

    fn emit(&mut self, kind: ElementKind, attrs: Attributes) {
        self.stream.push(ContentElement::new(kind, attrs));
    }

    fn walk(&mut self, nodes: &[Node], attrs: Attributes, depth: usize) {
        for node in nodes {
            match node {
                Node::Glyph {
                    metrics,
                    decoration,
                } => {
                    let mut own = attrs;
                    own.decoration = *decoration;
                    self.emit(ElementKind::Glyph(*metrics), own);
                }
                Node::Glue(width) => self.emit(ElementKind::Spacing { width: *width }, attrs),
                Node::Break(kind) => self.emit(ElementKind::Break(*kind), attrs),
                Node::Decoration(id) => self.emit(ElementKind::Decoration(*id), attrs),
                Node::Float(float) => self.emit(ElementKind::Float(*float), attrs),
                Node::SideNote(note) => self.emit(ElementKind::SideNote(note.clone()), attrs),
                Node::Container(container) => self.container(container, attrs, depth + 1),
            }
        }
    }

    fn container(&mut self, container: &Container, inherited: Attributes, depth: usize) {
        if depth > MAX_NESTING {
            warn!(depth, "container nesting too deep, subtree dropped");
            return;
        }

        let mut attrs = inherited;
        let mut skip_leading = 0;

        if let Some(indent) = container.indent {
            attrs.indent = indent;
        } else if let Some(shift) = container.shift {
            attrs.indent = self.rows(shift);
        } else {
            let (glue, count) = leading_glue(&container.children);
            let rows = self.rows(glue);
            if rows > 0 {
                attrs.indent = rows;
                skip_leading = count;
            }
        }

        if container.first_line_indent.is_some() {
            attrs.first_line_indent = container.first_line_indent;
        }
        if let Some(right) = container.right_indent {
            attrs.right_indent = right;
        }
        if let Some(annotation) = container.annotation {
            attrs.annotation = annotation;
        }
        if container.style.is_some() {
            attrs.style = container.style;
        }
        attrs.decoration = None;

        if let Some((width, height)) = container.cells {
            self.emit(
                ElementKind::Block {
                    width_cells: width.max(1),
                    height_cells: height.max(1),
                    source: container.source,
                },
                attrs,
            );
            return;
        }

        if container.kind == ContainerKind::Paragraph {
            attrs.block = Some(BlockId(self.next_block));
            self.next_block += 1;
        }

        self.walk(&container.children[skip_leading..], attrs, depth);

        match container.kind {
            ContainerKind::Group => {}
            ContainerKind::Line => self.emit(ElementKind::Break(BreakKind::Line), attrs),
            ContainerKind::Paragraph => self.emit(ElementKind::Break(BreakKind::Paragraph), attrs),
        }
    }
}

/// Sum of glue preceding the first visible child, and how many nodes it spans.
fn leading_glue(children: &[Node]) -> (f64, usize) {
    let mut total = 0.0;
    for (i, child) in children.iter().enumerate() {
        match child {
            Node::Glue(width) => total += width,
            _ => return (total, i),
        }
    }
    (total, children.len())
}
