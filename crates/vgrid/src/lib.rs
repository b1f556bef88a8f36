#![forbid(unsafe_code)]

//! Virtual-grid vertical typesetting.
//!
//! `vgrid` lays East-Asian text out in right-to-left vertical columns on a
//! fixed grid of cells. A host hands over a tree of [`Node`]s and gets back
//! one [`RenderedPage`] of draw instructions per page:
//!
//! 1. [`normalize`] flattens the tree into a [`ContentStream`],
//! 2. [`simulate`] assigns every element a grid coordinate ([`LayoutMap`]),
//! 3. [`Renderer`] maps coordinates to page space and adds ornaments.
//!
//! [`Typesetter`] bundles the three stages with the state that outlives a
//! single region: geometry, the attribute registry and the page counter.
//!
//! ```
//! use vgrid::prelude::*;
//!
//! let mut typesetter = Typesetter::new(&GridConfig {
//!     row_limit: 4,
//!     ..GridConfig::default()
//! });
//! let nodes: Vec<Node> = "春眠不觉晓处处闻啼鸟"
//!     .chars()
//!     .map(|ch| Node::glyph(GlyphMetrics::new(ch, 20.0, 16.0, 4.0)))
//!     .collect();
//! let pages = typesetter.typeset(&nodes);
//! assert_eq!(pages.len(), 1);
//! assert_eq!(pages[0].total_columns, 3);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

// --- Core re-exports ---

pub use vgrid_core::{
    AttributeRegistry, Attributes, BlockId, BreakKind, Color, ConfigError, ContentElement,
    ContentStream, DebugOverlay, DecorationId, DecorationRecord, ElementId, ElementKind,
    FloatBlock, GlyphMetrics, GridConfig, GridCoord, HorizontalAlign, PageGeometry, Point, Rect,
    SideNote, Sides, SourceRef, Stroke, StyleId, StyleRecord, SubColumnAlign, VerticalAlign,
};

#[cfg(feature = "subscriber")]
pub use vgrid_core::logging::init as init_logging;

// --- Layout re-exports ---

pub use vgrid_layout::{
    Container, ContainerKind, LayoutMap, Node, PageSummary, Placement, SubColumn, normalize,
    simulate,
};

// --- Render re-exports ---

pub use vgrid_render::{
    Content, Draw, DrawInstruction, PageCounter, PageFrame, RenderedPage, Renderer,
    physical_column,
};

/// Top-level error type.
#[derive(Debug)]
pub enum Error {
    /// The grid configuration could not be loaded.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Standard result type for vgrid APIs.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The full pipeline plus the state it keeps between content regions.
///
/// Each call to [`typeset`](Self::typeset) lays out one region from scratch.
/// Only the page counter carries over, so consecutive regions number their
/// pages continuously.
#[derive(Debug, Clone)]
pub struct Typesetter {
    geometry: PageGeometry,
    registry: AttributeRegistry,
    counter: PageCounter,
}

impl Typesetter {
    pub fn new(config: &GridConfig) -> Self {
        Self::with_geometry(config.geometry())
    }

    pub fn with_geometry(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            registry: AttributeRegistry::new(),
            counter: PageCounter::default(),
        }
    }

    /// Build from a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(Self::new(&GridConfig::from_json_str(json)?))
    }

    /// Build from the host's flat named parameters. Bad values fall back to
    /// their defaults.
    pub fn from_params(params: &BTreeMap<String, String>) -> Self {
        Self::new(&GridConfig::from_params(params))
    }

    /// Number the first page of the next region `first`.
    #[must_use]
    pub fn starting_at_page(mut self, first: u32) -> Self {
        self.counter = PageCounter::new(first);
        self
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn registry(&self) -> &AttributeRegistry {
        &self.registry
    }

    /// Registry for registering styles and decorations before typesetting.
    pub fn registry_mut(&mut self) -> &mut AttributeRegistry {
        &mut self.registry
    }

    /// Number the next rendered page will receive.
    pub fn next_page_number(&self) -> u32 {
        self.counter.peek()
    }

    /// Flatten `nodes` into the stream the simulator consumes.
    pub fn normalize(&self, nodes: &[Node]) -> ContentStream {
        normalize(nodes, self.geometry.cell_height)
    }

    /// Assign grid coordinates without rendering.
    pub fn layout(&self, stream: &ContentStream) -> LayoutMap {
        simulate(stream, &self.geometry)
    }

    /// Render an already laid-out stream, consuming page numbers.
    pub fn render(&mut self, stream: &ContentStream, map: &LayoutMap) -> Vec<RenderedPage> {
        Renderer::new(&self.geometry, &self.registry).render(stream, map, &mut self.counter)
    }

    /// Typeset one content region.
    pub fn typeset(&mut self, nodes: &[Node]) -> Vec<RenderedPage> {
        let stream = self.normalize(nodes);
        self.typeset_stream(&stream)
    }

    /// Typeset a pre-flattened content stream.
    pub fn typeset_stream(&mut self, stream: &ContentStream) -> Vec<RenderedPage> {
        let map = self.layout(stream);
        let pages = self.render(stream, &map);
        debug!(
            elements = stream.len(),
            placed = map.placed_count(),
            pages = pages.len(),
            next_page = self.counter.peek(),
            "region typeset"
        );
        pages
    }
}

pub mod prelude {
    pub use crate::{
        AttributeRegistry, BreakKind, Color, Container, Content, DecorationRecord, Draw,
        DrawInstruction, Error, GlyphMetrics, GridConfig, Node, RenderedPage, Result, SourceRef,
        StyleRecord, Typesetter,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use tracing_test::traced_test;

    fn glyphs(text: &str) -> Vec<Node> {
        text.chars()
            .map(|ch| Node::glyph(GlyphMetrics::new(ch, 20.0, 16.0, 4.0)))
            .collect()
    }

    #[test]
    fn config_error_is_wrapped() {
        let err = Typesetter::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Json(_))));
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("invalid grid configuration"));
    }

    #[test]
    fn json_config_reaches_geometry() {
        let ts = Typesetter::from_json_str(r#"{ "row_limit": 6, "cell_width": 24.0 }"#).unwrap();
        assert_eq!(ts.geometry().row_limit, 6);
        assert_eq!(ts.geometry().cell_width, 24.0);
    }

    #[test]
    fn page_numbers_continue_across_regions() {
        let mut ts = Typesetter::new(&GridConfig::default()).starting_at_page(5);
        let first = ts.typeset(&glyphs("一二三"));
        let second = ts.typeset(&glyphs("四五"));
        assert_eq!(first[0].page_number, 5);
        assert_eq!(second[0].page_number, 6);
        assert_eq!(ts.next_page_number(), 7);
    }

    #[test]
    fn empty_region_keeps_counter() {
        let mut ts = Typesetter::new(&GridConfig::default());
        assert!(ts.typeset(&[]).is_empty());
        assert_eq!(ts.next_page_number(), 1);
    }

    #[test]
    #[traced_test]
    fn region_summary_is_logged() {
        let mut ts = Typesetter::new(&GridConfig::default());
        ts.typeset(&glyphs("天地"));
        assert!(logs_contain("region typeset"));
    }
}
