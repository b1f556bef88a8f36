#![forbid(unsafe_code)]

//! Core: content model, geometry, attribute registry and page configuration.
//!
//! - [`element`] - the flat [`ContentStream`] arena and its element variants
//! - [`registry`] - the [`AttributeRegistry`] service for style/decoration ids
//! - [`config`] - host parameters ([`GridConfig`]) and normalized [`PageGeometry`]
//! - [`geometry`] - page-space and grid-space primitives
//! - [`color`] - RGBA colors and color-spec parsing

pub mod color;
pub mod config;
pub mod element;
pub mod geometry;
pub mod logging;
pub mod registry;

pub use color::Color;
pub use config::{
    ConfigError, DebugOverlay, GridConfig, HorizontalAlign, PageGeometry, Stroke,
    SubColumnAlign, VerticalAlign,
};
pub use element::{
    Attributes, BlockId, BreakKind, ContentElement, ContentStream, ElementId, ElementKind,
    FloatBlock, GlyphMetrics, SideNote, SourceRef,
};
pub use geometry::{GridCoord, Point, Rect, Sides};
pub use registry::{AttributeRegistry, DecorationId, DecorationRecord, StyleId, StyleRecord};
