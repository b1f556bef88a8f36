#![forbid(unsafe_code)]

//! Attribute registry.
//!
//! Elements carry compact ids instead of full style/decoration records. The
//! [`AttributeRegistry`] is the explicit service that resolves them; it is
//! passed into the renderer rather than living in global state.
//!
//! # Usage
//!
//! ```
//! use vgrid_core::color::Color;
//! use vgrid_core::registry::{AttributeRegistry, DecorationRecord};
//!
//! let mut registry = AttributeRegistry::new();
//! let id = registry.register_decoration(DecorationRecord::mark('。', Color::RED));
//! assert_eq!(registry.decoration(id).map(|d| d.glyph), Some('。'));
//! ```

use crate::color::Color;
use crate::config::HorizontalAlign;

const MAX_ID: u32 = 0x00FF_FFFF;

/// Handle to a [`StyleRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StyleId(pub u32);

/// Handle to a [`DecorationRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DecorationId(pub u32);

/// Text style overrides. `None` fields inherit the page defaults.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StyleRecord {
    pub color: Option<Color>,
    pub font_size: Option<f64>,
    pub align: Option<HorizontalAlign>,
}

/// A zero-advance overlay glyph (emphasis dot, proofreading mark, seal).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecorationRecord {
    pub glyph: char,
    pub color: Color,
    /// Horizontal offset as a fraction of the cell width.
    pub x_offset: f64,
    /// Vertical offset as a fraction of the cell height.
    pub y_offset: f64,
    /// Scale applied to the overlay glyph.
    pub scale: f64,
}

impl DecorationRecord {
    /// An unscaled mark centered on its anchor cell.
    pub const fn mark(glyph: char, color: Color) -> Self {
        Self {
            glyph,
            color,
            x_offset: 0.0,
            y_offset: 0.0,
            scale: 1.0,
        }
    }
}

/// Slot store shared by both record kinds. Slot 0 is reserved for "none".
#[derive(Debug, Clone)]
struct Slots<T> {
    slots: Vec<Option<T>>,
    free_list: Vec<u32>,
}

impl<T> Default for Slots<T> {
    fn default() -> Self {
        Self {
            slots: vec![None],
            free_list: Vec::new(),
        }
    }
}

impl<T: PartialEq> Slots<T> {
    fn register(&mut self, record: T) -> u32 {
        if let Some(existing) = self
            .slots
            .iter()
            .position(|slot| slot.as_ref() == Some(&record))
        {
            return existing as u32;
        }

        let id = if let Some(id) = self.free_list.pop() {
            id
        } else {
            let id = self.slots.len() as u32;
            if id > MAX_ID {
                tracing::warn!(id, "attribute registry full");
                return 0;
            }
            self.slots.push(None);
            id
        };
        self.slots[id as usize] = Some(record);
        id
    }

    fn get(&self, id: u32) -> Option<&T> {
        self.slots.get(id as usize).and_then(|slot| slot.as_ref())
    }

    fn unregister(&mut self, id: u32) -> Option<T> {
        if id == 0 {
            return None;
        }
        let record = self.slots.get_mut(id as usize)?.take()?;
        self.free_list.push(id);
        Some(record)
    }

    fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.slots.push(None);
        self.free_list.clear();
    }
}

/// Registry of style and decoration records keyed by small integer ids.
///
/// Registering a record identical to a live one returns the existing id.
#[derive(Debug, Clone, Default)]
pub struct AttributeRegistry {
    styles: Slots<StyleRecord>,
    decorations: Slots<DecorationRecord>,
}

impl AttributeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a style and return its id.
    pub fn register_style(&mut self, record: StyleRecord) -> StyleId {
        StyleId(self.styles.register(record))
    }

    /// Register a decoration and return its id.
    pub fn register_decoration(&mut self, record: DecorationRecord) -> DecorationId {
        DecorationId(self.decorations.register(record))
    }

    /// Resolve a style id.
    pub fn style(&self, id: StyleId) -> Option<&StyleRecord> {
        self.styles.get(id.0)
    }

    /// Resolve a decoration id.
    pub fn decoration(&self, id: DecorationId) -> Option<&DecorationRecord> {
        self.decorations.get(id.0)
    }

    /// Remove a style, freeing its id for reuse.
    pub fn unregister_style(&mut self, id: StyleId) -> Option<StyleRecord> {
        self.styles.unregister(id.0)
    }

    /// Remove a decoration, freeing its id for reuse.
    pub fn unregister_decoration(&mut self, id: DecorationId) -> Option<DecorationRecord> {
        self.decorations.unregister(id.0)
    }

    /// Number of live style records.
    pub fn style_count(&self) -> usize {
        self.styles.len()
    }

    /// Number of live decoration records.
    pub fn decoration_count(&self) -> usize {
        self.decorations.len()
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.styles.clear();
        self.decorations.clear();
    }
}
