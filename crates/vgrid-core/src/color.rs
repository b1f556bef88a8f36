#![forbid(unsafe_code)]

//! RGBA colors and color-spec parsing.
//!
//! Hosts hand colors over as free-form strings. Supported forms:
//! - Named colors: `black`, `red`, `vermilion`, ...
//! - Hex: `#rgb`, `#rrggbb`
//! - Space separated float triples in `[0, 1]`: `1 0 0`
//! - RGB function: `rgb(255, 0, 0)`

use std::fmt;

/// A 32-bit RGBA color, straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(transparent)]
pub struct Color(pub u32);

impl Color {
    /// Fully transparent (alpha = 0).
    pub const TRANSPARENT: Self = Self(0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque red.
    pub const RED: Self = Self::rgb(255, 0, 0);
    /// Opaque blue.
    pub const BLUE: Self = Self::rgb(0, 0, 255);

    /// Create an opaque RGB color (alpha = 255).
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Create an RGBA color with explicit alpha.
    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | (a as u32))
    }

    /// Red channel.
    #[inline]
    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Green channel.
    #[inline]
    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Blue channel.
    #[inline]
    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Alpha channel.
    #[inline]
    pub const fn a(self) -> u8 {
        self.0 as u8
    }

    /// Channels as floats in `[0, 1]`, the form PDF operators take.
    pub fn to_unit_rgb(self) -> (f64, f64, f64) {
        (
            f64::from(self.r()) / 255.0,
            f64::from(self.g()) / 255.0,
            f64::from(self.b()) / 255.0,
        )
    }

    /// Parse a color specification.
    pub fn parse(spec: &str) -> Result<Self, ParseColorError> {
        let s = spec.trim();
        let err = || ParseColorError {
            value: s.to_string(),
        };

        if s.is_empty() {
            return Err(err());
        }
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(err);
        }
        if let Some(inner) = s.strip_prefix("rgb(").and_then(|s| s.strip_suffix(')')) {
            return parse_rgb_function(inner).ok_or_else(err);
        }
        if s.contains(char::is_whitespace) {
            return parse_unit_triple(s).ok_or_else(err);
        }
        named(s).ok_or_else(err)
    }

    /// Parse a color, falling back to `default` when the spec is malformed.
    pub fn parse_or(spec: &str, default: Color) -> Color {
        match Self::parse(spec) {
            Ok(color) => color,
            Err(err) => {
                tracing::warn!(error = %err, "using default color");
                default
            }
        }
    }
}

/// Error for a color string that matches none of the supported forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError {
    pub value: String,
}

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid color spec {:?}", self.value)
    }
}

impl std::error::Error for ParseColorError {}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let mut digits = hex.chars().filter_map(|c| c.to_digit(16));
            let r = digits.next()? as u8;
            let g = digits.next()? as u8;
            let b = digits.next()? as u8;
            Some(Color::rgb(r * 17, g * 17, b * 17))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::rgb(r, g, b))
        }
        _ => None,
    }
}

fn parse_rgb_function(inner: &str) -> Option<Color> {
    let parts: Vec<&str> = inner.split(',').collect();
    if parts.len() != 3 {
        return None;
    }
    let r: u8 = parts[0].trim().parse().ok()?;
    let g: u8 = parts[1].trim().parse().ok()?;
    let b: u8 = parts[2].trim().parse().ok()?;
    Some(Color::rgb(r, g, b))
}

fn parse_unit_triple(s: &str) -> Option<Color> {
    let values: Vec<f64> = s
        .split_whitespace()
        .map(str::parse::<f64>)
        .collect::<Result<_, _>>()
        .ok()?;
    if values.len() != 3 || values.iter().any(|v| !(0.0..=1.0).contains(v)) {
        return None;
    }
    let channel = |v: f64| (v * 255.0).round() as u8;
    Some(Color::rgb(
        channel(values[0]),
        channel(values[1]),
        channel(values[2]),
    ))
}

fn named(s: &str) -> Option<Color> {
    let color = match s.to_ascii_lowercase().as_str() {
        "black" => Color::BLACK,
        "white" => Color::WHITE,
        "red" => Color::RED,
        "green" => Color::rgb(0, 128, 0),
        "blue" => Color::BLUE,
        "gray" | "grey" => Color::rgb(128, 128, 128),
        // Cinnabar red used for rulings and seals.
        "vermilion" | "zhu" => Color::rgb(227, 66, 52),
        "paper" => Color::rgb(245, 236, 215),
        "none" | "transparent" => Color::TRANSPARENT,
        _ => return None,
    };
    Some(color)
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r(), self.g(), self.b())
    }
}
