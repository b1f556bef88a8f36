#![forbid(unsafe_code)]

//! Rendering of grid layouts into page instructions.
//!
//! - [`renderer`] - the [`Renderer`] turning a layout map into pages
//! - [`instruction`] - the [`DrawInstruction`] output model and [`Draw`] sink
//! - [`mapping`] - right-to-left column mapping, page frames, page numbering
//! - [`decor`] - borders, reserved-column ornaments, frames and overlays

pub mod decor;
pub mod instruction;
pub mod mapping;
pub mod renderer;

pub use instruction::{Content, Draw, DrawInstruction, RenderedPage};
pub use mapping::{PageCounter, PageFrame, physical_column};
pub use renderer::Renderer;
