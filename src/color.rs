//! Color resolution for overlays.
//!
//! Accepts `#RGB`, `#RRGGBB`, `rgb(r, g, b)` and a small table of names.
//! Resolution never fails: anything unrecognized becomes black and a warning is
//! logged, so a bad color string cannot abort an overlay.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    static ref RGB_FUNCTION: Regex =
        Regex::new(r"^rgb\(\s*(-?\d+)\s*,\s*(-?\d+)\s*,\s*(-?\d+)\s*\)$").unwrap();
    static ref NAMED_COLORS: HashMap<&'static str, (u8, u8, u8)> = {
        let mut m = HashMap::new();
        m.insert("red", (255, 0, 0));
        m.insert("blue", (0, 0, 255));
        m.insert("green", (0, 128, 0));
        m.insert("yellow", (255, 255, 0));
        m.insert("white", (255, 255, 255));
        m.insert("black", (0, 0, 0));
        m.insert("gray", (128, 128, 128));
        m.insert("grey", (128, 128, 128));
        m.insert("orange", (255, 165, 0));
        m.insert("pink", (255, 192, 203));
        m.insert("cyan", (0, 255, 255));
        m.insert("magenta", (255, 0, 255));
        m.insert("darkgray", (64, 64, 64));
        m.insert("darkgrey", (64, 64, 64));
        m.insert("dark gray", (64, 64, 64));
        m.insert("dark grey", (64, 64, 64));
        m.insert("lightgray", (211, 211, 211));
        m.insert("lightgrey", (211, 211, 211));
        m.insert("light gray", (211, 211, 211));
        m.insert("light grey", (211, 211, 211));
        m
    };
}

/// An RGB color with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red channel (0.0 - 1.0)
    pub r: f32,
    /// Green channel (0.0 - 1.0)
    pub g: f32,
    /// Blue channel (0.0 - 1.0)
    pub b: f32,
}

impl Color {
    /// Create a new color.
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create a color from 8-bit channels.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Create a black color.
    pub fn black() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Create a white color.
    pub fn white() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    /// Resolve a user-supplied color string, falling back to black.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_pagekit::color::Color;
    ///
    /// assert_eq!(Color::resolve("#FFF"), Color::resolve("#FFFFFF"));
    /// assert_eq!(Color::resolve("rgb(255, 0, 0)"), Color::resolve("red"));
    /// assert_eq!(Color::resolve("not-a-color"), Color::black());
    /// ```
    pub fn resolve(input: &str) -> Self {
        match Self::parse(input) {
            Some(color) => color,
            None => {
                log::warn!("Unrecognized color '{}', using black", input);
                Self::black()
            },
        }
    }

    /// Parse a color string, returning `None` when it is not recognized.
    pub fn parse(input: &str) -> Option<Self> {
        let value = input.trim().to_ascii_lowercase();

        if let Some(hex) = value.strip_prefix('#') {
            return parse_hex(hex);
        }

        if let Some(caps) = RGB_FUNCTION.captures(&value) {
            let mut channels = [0u8; 3];
            for (i, channel) in channels.iter_mut().enumerate() {
                // Values too large for i64 are a parse failure, not a clamp.
                let raw: i64 = caps[i + 1].parse().ok()?;
                *channel = raw.clamp(0, 255) as u8;
            }
            return Some(Self::from_rgb8(channels[0], channels[1], channels[2]));
        }

        NAMED_COLORS
            .get(value.as_str())
            .map(|&(r, g, b)| Self::from_rgb8(r, g, b))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Parse the digits of `#RGB` or `#RRGGBB`.
fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };

    let r = u8::from_str_radix(&expanded[0..2], 16).ok()?;
    let g = u8::from_str_radix(&expanded[2..4], 16).ok()?;
    let b = u8::from_str_radix(&expanded[4..6], 16).ok()?;
    Some(Color::from_rgb8(r, g, b))
}
