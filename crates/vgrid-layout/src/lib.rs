#![forbid(unsafe_code)]

//! Normalization and grid layout.
//!
//! This crate turns a host content tree into grid coordinates:
//!
//! - [`normalize`] - flattens nested containers into a [`ContentStream`]
//! - [`simulator`] - the cursor pass producing a [`LayoutMap`]
//! - [`annotation`] - dual sub-column (jiazhu) run splitting
//! - [`distribute`] - even spreading of a column over its height
//! - [`spacing`] - bounded spacing-run summation
//! - [`occupancy`] - cells claimed by multi-cell blocks
//!
//! # Example
//!
//! ```
//! use vgrid_core::{GlyphMetrics, PageGeometry};
//! use vgrid_layout::normalize::{normalize, Container, Node};
//! use vgrid_layout::simulate;
//!
//! let glyphs = "天地玄黄宇宙洪荒"
//!     .chars()
//!     .map(|ch| Node::glyph(GlyphMetrics::new(ch, 20.0, 16.0, 4.0)))
//!     .collect();
//! let stream = normalize(&[Node::Container(Container::paragraph(glyphs))], 20.0);
//! let map = simulate(&stream, &PageGeometry::grid(5, 20.0, 20.0));
//!
//! assert_eq!(map.page_count(), 1);
//! assert_eq!(map.pages()[0].column_count(0), 2);
//! ```
//!
//! [`ContentStream`]: vgrid_core::ContentStream

pub mod annotation;
pub mod distribute;
pub mod map;
pub mod normalize;
pub mod occupancy;
pub mod simulator;
pub mod spacing;

pub use annotation::SubColumn;
pub use map::{LayoutMap, PageSummary, Placement};
pub use normalize::{Container, ContainerKind, Node, normalize};
pub use simulator::simulate;
