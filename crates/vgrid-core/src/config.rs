#![forbid(unsafe_code)]

//! Page configuration.
//!
//! [`GridConfig`] is the flat, host-facing parameter record. It can be
//! deserialized strictly from JSON or built leniently from a `key → string`
//! map; either way [`GridConfig::geometry`] normalizes it into the immutable
//! [`PageGeometry`] the pipeline consumes. Malformed values never reach the
//! drawing stage: they are replaced by defaults and logged.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::color::Color;
use crate::geometry::Sides;

/// Column budget used when the configuration leaves it unbounded.
pub const SENTINEL_PAGE_COLUMNS: u16 = 10_000;

const DEFAULT_CELL: f64 = 20.0;
const DEFAULT_ROW_LIMIT: u16 = 20;
const DEFAULT_MARGIN: f64 = 36.0;

/// Vertical placement of a glyph inside its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    #[default]
    Center,
    Bottom,
}

/// Horizontal placement of a glyph inside its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    Start,
    #[default]
    Center,
    End,
}

/// Placement of annotation glyphs inside their half-width sub-column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubColumnAlign {
    /// Toward the outer edges of the column.
    #[default]
    Outward,
    /// Toward the column's center line.
    Inward,
    /// Centered in the sub-column.
    Center,
}

macro_rules! keyword_from_str {
    ($ty:ident { $($text:literal => $variant:ident),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ConfigError::InvalidValue {
                        key: stringify!($ty).to_string(),
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

keyword_from_str!(VerticalAlign { "top" => Top, "center" => Center, "bottom" => Bottom });
keyword_from_str!(HorizontalAlign {
    "start" => Start, "left" => Start, "center" => Center, "end" => End, "right" => End,
});
keyword_from_str!(SubColumnAlign { "outward" => Outward, "inward" => Inward, "center" => Center });

bitflags! {
    /// Diagnostic overlays drawn on top of rendered pages.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DebugOverlay: u8 {
        /// Outline every grid cell.
        const GRID  = 0b0000_0001;
        /// Outline every placed glyph and block.
        const BOXES = 0b0000_0010;
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    Json(serde_json::Error),
    /// A parameter value is out of range or unparseable.
    InvalidValue { key: String, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid grid configuration: {err}"),
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value {value:?} for parameter {key}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let Self::Json(err) = self {
            return Some(err);
        }
        None
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// Flat configuration record as handed over by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub cell_width: f64,
    pub cell_height: f64,
    /// Rows per column.
    pub row_limit: u16,
    /// Logical columns per page; 0 means unbounded.
    pub page_columns: u16,
    /// Reserved-column interval; 0 disables reservation.
    pub reserved_interval: u16,
    /// Minimum physical column count of a rendered page.
    pub min_page_columns: u16,
    pub margins: Sides,
    pub padding: Sides,
    pub vertical_align: VerticalAlign,
    pub horizontal_align: HorizontalAlign,
    pub annotation_align: SubColumnAlign,
    /// Spread each column's content over its full height.
    pub distribute: bool,
    pub font_color: String,
    pub border: bool,
    pub border_color: String,
    pub border_width: f64,
    pub outer_frame: bool,
    pub outer_frame_width: f64,
    /// Gap between the column grid and the outer frame.
    pub outer_frame_gap: f64,
    pub background: Option<String>,
    /// Caption drawn in the upper section of reserved columns.
    pub book_title: Option<String>,
    /// Caption drawn below the end cap of reserved columns.
    pub chapter_title: Option<String>,
    /// End-cap glyph marking the reserved column's upper divider.
    pub end_cap: Option<char>,
    pub show_page_number: bool,
    /// Scale of margin note glyphs relative to the cell.
    pub side_note_scale: f64,
    pub side_note_color: String,
    pub debug_grid: bool,
    pub debug_boxes: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_width: DEFAULT_CELL,
            cell_height: DEFAULT_CELL,
            row_limit: DEFAULT_ROW_LIMIT,
            page_columns: 0,
            reserved_interval: 0,
            min_page_columns: 0,
            margins: Sides::all(DEFAULT_MARGIN),
            padding: Sides::default(),
            vertical_align: VerticalAlign::default(),
            horizontal_align: HorizontalAlign::default(),
            annotation_align: SubColumnAlign::default(),
            distribute: false,
            font_color: "black".to_string(),
            border: false,
            border_color: "black".to_string(),
            border_width: 0.4,
            outer_frame: false,
            outer_frame_width: 2.0,
            outer_frame_gap: 4.0,
            background: None,
            book_title: None,
            chapter_title: None,
            end_cap: None,
            show_page_number: false,
            side_note_scale: 0.5,
            side_note_color: "vermilion".to_string(),
            debug_grid: false,
            debug_boxes: false,
        }
    }
}

impl GridConfig {
    /// Strictly parse a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build a configuration from flat named parameters.
    ///
    /// Keys are case-insensitive and accept `-` or `_`. Unparseable values
    /// keep their default and unknown keys are ignored; both are logged.
    pub fn from_params(params: &BTreeMap<String, String>) -> Self {
        let mut config = Self::default();
        for (raw_key, value) in params {
            let key = raw_key.trim().to_ascii_lowercase().replace('-', "_");
            if let Err(err) = config.apply_param(&key, value) {
                warn!(error = %err, "ignoring grid parameter");
            }
        }
        config
    }

    fn apply_param(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        let num = || value.trim().parse::<f64>().map_err(|_| invalid());
        let count = || value.trim().parse::<u16>().map_err(|_| invalid());
        let flag = || parse_flag(value).ok_or_else(invalid);
        let text = || {
            let v = value.trim();
            (!v.is_empty()).then(|| v.to_string())
        };

        match key {
            "cell_width" => self.cell_width = num()?,
            "cell_height" => self.cell_height = num()?,
            "row_limit" => self.row_limit = count()?,
            "page_columns" => self.page_columns = count()?,
            "reserved_interval" => self.reserved_interval = count()?,
            "min_page_columns" => self.min_page_columns = count()?,
            "margin" => self.margins = Sides::all(num()?),
            "margin_top" => self.margins.top = num()?,
            "margin_right" => self.margins.right = num()?,
            "margin_bottom" => self.margins.bottom = num()?,
            "margin_left" => self.margins.left = num()?,
            "padding" => self.padding = Sides::all(num()?),
            "padding_top" => self.padding.top = num()?,
            "padding_right" => self.padding.right = num()?,
            "padding_bottom" => self.padding.bottom = num()?,
            "padding_left" => self.padding.left = num()?,
            "vertical_align" => self.vertical_align = value.parse()?,
            "horizontal_align" => self.horizontal_align = value.parse()?,
            "annotation_align" => self.annotation_align = value.parse()?,
            "distribute" => self.distribute = flag()?,
            "font_color" => self.font_color = value.to_string(),
            "border" => self.border = flag()?,
            "border_color" => self.border_color = value.to_string(),
            "border_width" => self.border_width = num()?,
            "outer_frame" => self.outer_frame = flag()?,
            "outer_frame_width" => self.outer_frame_width = num()?,
            "outer_frame_gap" => self.outer_frame_gap = num()?,
            "background" => self.background = text(),
            "book_title" => self.book_title = text(),
            "chapter_title" => self.chapter_title = text(),
            "end_cap" => self.end_cap = value.trim().chars().next(),
            "show_page_number" => self.show_page_number = flag()?,
            "side_note_scale" => self.side_note_scale = num()?,
            "side_note_color" => self.side_note_color = value.to_string(),
            "debug_grid" => self.debug_grid = flag()?,
            "debug_boxes" => self.debug_boxes = flag()?,
            _ => return Err(invalid()),
        }
        Ok(())
    }

    /// Normalize into the immutable geometry used by layout and rendering.
    pub fn geometry(&self) -> PageGeometry {
        let positive = |name: &str, v: f64, default: f64| {
            if v.is_finite() && v > 0.0 {
                v
            } else {
                warn!(parameter = name, value = v, default, "non-positive size replaced");
                default
            }
        };

        let row_limit = if self.row_limit == 0 {
            warn!("row_limit of 0 replaced by 1");
            1
        } else {
            self.row_limit
        };

        let mut overlay = DebugOverlay::empty();
        overlay.set(DebugOverlay::GRID, self.debug_grid);
        overlay.set(DebugOverlay::BOXES, self.debug_boxes);

        PageGeometry {
            cell_width: positive("cell_width", self.cell_width, DEFAULT_CELL),
            cell_height: positive("cell_height", self.cell_height, DEFAULT_CELL),
            row_limit,
            page_columns: if self.page_columns == 0 {
                SENTINEL_PAGE_COLUMNS
            } else {
                self.page_columns
            },
            reserved_interval: (self.reserved_interval > 0).then_some(self.reserved_interval),
            min_page_columns: self.min_page_columns,
            margins: self.margins.sanitized(),
            padding: self.padding.sanitized(),
            vertical_align: self.vertical_align,
            horizontal_align: self.horizontal_align,
            annotation_align: self.annotation_align,
            distribute: self.distribute,
            font_color: Color::parse_or(&self.font_color, Color::BLACK),
            border: self.border.then(|| {
                Stroke::new(
                    Color::parse_or(&self.border_color, Color::BLACK),
                    self.border_width,
                )
            }),
            outer_frame: self.outer_frame.then(|| {
                Stroke::new(
                    Color::parse_or(&self.border_color, Color::BLACK),
                    self.outer_frame_width,
                )
            }),
            outer_frame_gap: self.outer_frame_gap.max(0.0),
            background: self
                .background
                .as_deref()
                .map(|spec| Color::parse_or(spec, Color::WHITE)),
            captions: ReservedCaptions {
                book_title: self.book_title.clone(),
                chapter_title: self.chapter_title.clone(),
                end_cap: self.end_cap,
                show_page_number: self.show_page_number,
            },
            side_note_scale: if self.side_note_scale.is_finite() && self.side_note_scale > 0.0 {
                self.side_note_scale.min(1.0)
            } else {
                0.5
            },
            side_note_color: Color::parse_or(&self.side_note_color, Color::RED),
            overlay,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" | "" => Some(false),
        _ => None,
    }
}

/// A stroked line style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
}

impl Stroke {
    /// Create a stroke; non-positive widths fall back to a hairline.
    pub fn new(color: Color, width: f64) -> Self {
        let width = if width.is_finite() && width > 0.0 {
            width
        } else {
            0.4
        };
        Self { color, width }
    }
}

/// Fixed content of reserved columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReservedCaptions {
    pub book_title: Option<String>,
    pub chapter_title: Option<String>,
    pub end_cap: Option<char>,
    pub show_page_number: bool,
}

/// Immutable per-invocation page geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct PageGeometry {
    pub cell_width: f64,
    pub cell_height: f64,
    pub row_limit: u16,
    /// Logical column budget per page (never 0).
    pub page_columns: u16,
    pub reserved_interval: Option<u16>,
    pub min_page_columns: u16,
    pub margins: Sides,
    pub padding: Sides,
    pub vertical_align: VerticalAlign,
    pub horizontal_align: HorizontalAlign,
    pub annotation_align: SubColumnAlign,
    pub distribute: bool,
    pub font_color: Color,
    pub border: Option<Stroke>,
    pub outer_frame: Option<Stroke>,
    pub outer_frame_gap: f64,
    pub background: Option<Color>,
    pub captions: ReservedCaptions,
    pub side_note_scale: f64,
    pub side_note_color: Color,
    pub overlay: DebugOverlay,
}

impl Default for PageGeometry {
    fn default() -> Self {
        GridConfig::default().geometry()
    }
}

impl PageGeometry {
    /// Geometry with the given grid and defaults elsewhere.
    pub fn grid(row_limit: u16, cell_width: f64, cell_height: f64) -> Self {
        GridConfig {
            row_limit,
            cell_width,
            cell_height,
            ..GridConfig::default()
        }
        .geometry()
    }

    /// Whether `column` is held for decoration.
    #[inline]
    pub fn is_reserved(&self, column: u16) -> bool {
        match self.reserved_interval {
            Some(n) => column % n.saturating_add(1) == n,
            None => false,
        }
    }

    /// Height of a full column in points.
    #[inline]
    pub fn column_height(&self) -> f64 {
        f64::from(self.row_limit) * self.cell_height
    }

    /// Widest run of consecutive columns free of reservation.
    pub fn max_block_columns(&self) -> u16 {
        match self.reserved_interval {
            Some(n) => n.min(self.page_columns),
            None => self.page_columns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_normalize() {
        let geometry = GridConfig::default().geometry();
        assert_eq!(geometry.row_limit, DEFAULT_ROW_LIMIT);
        assert_eq!(geometry.page_columns, SENTINEL_PAGE_COLUMNS);
        assert_eq!(geometry.reserved_interval, None);
        assert!(geometry.border.is_none());
        assert_eq!(geometry.font_color, Color::BLACK);
    }

    #[test]
    fn reserved_columns_follow_interval() {
        let geometry = GridConfig {
            reserved_interval: 3,
            ..GridConfig::default()
        }
        .geometry();
        let reserved: Vec<u16> = (0..12).filter(|&c| geometry.is_reserved(c)).collect();
        assert_eq!(reserved, vec![3, 7, 11]);
        assert_eq!(geometry.max_block_columns(), 3);
    }

    #[test]
    fn json_is_strict() {
        let config = GridConfig::from_json_str(r#"{"row_limit": 8, "distribute": true}"#)
            .expect("valid json");
        assert_eq!(config.row_limit, 8);
        assert!(config.distribute);
        assert!(GridConfig::from_json_str(r#"{"row_limit": "eight"}"#).is_err());
    }

    #[test]
    fn params_are_lenient() {
        let params: BTreeMap<String, String> = [
            ("Row-Limit", "12"),
            ("cell_width", "abc"),
            ("border", "yes"),
            ("border_color", "#zzz"),
            ("vertical_align", "bottom"),
            ("mystery", "1"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config = GridConfig::from_params(&params);
        assert_eq!(config.row_limit, 12);
        assert_eq!(config.cell_width, DEFAULT_CELL);
        assert!(config.border);
        assert_eq!(config.vertical_align, VerticalAlign::Bottom);

        let geometry = config.geometry();
        assert_eq!(geometry.border.map(|s| s.color), Some(Color::BLACK));
    }

    #[test]
    fn degenerate_sizes_fall_back() {
        let geometry = GridConfig {
            cell_width: -3.0,
            cell_height: f64::NAN,
            row_limit: 0,
            ..GridConfig::default()
        }
        .geometry();
        assert_eq!(geometry.cell_width, DEFAULT_CELL);
        assert_eq!(geometry.cell_height, DEFAULT_CELL);
        assert_eq!(geometry.row_limit, 1);
    }

    #[test]
    fn overlay_flags() {
        let geometry = GridConfig {
            debug_grid: true,
            ..GridConfig::default()
        }
        .geometry();
        assert!(geometry.overlay.contains(DebugOverlay::GRID));
        assert!(!geometry.overlay.contains(DebugOverlay::BOXES));
    }

    #[test]
    fn keyword_parsing() {
        assert_eq!("RIGHT".parse::<HorizontalAlign>().ok(), Some(HorizontalAlign::End));
        assert!("diagonal".parse::<VerticalAlign>().is_err());
    }
}
