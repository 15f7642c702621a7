//! Font resolution and text encoding for overlays.
//!
//! Overlays only use fonts every PDF reader ships with (the Base-14 set), so
//! nothing is embedded. Six of them are reachable through caller aliases.

mod win_ansi;

pub use win_ansi::encode_win_ansi;

use lopdf::{dictionary, Dictionary, Object};

/// A built-in font an overlay can be drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StandardFont {
    /// Helvetica (default sans-serif)
    #[default]
    Helvetica,
    /// Helvetica-Bold
    HelveticaBold,
    /// Times-Roman
    TimesRoman,
    /// Times-Bold
    TimesBold,
    /// Courier
    Courier,
    /// Courier-Bold
    CourierBold,
}

impl StandardFont {
    /// All fonts reachable through aliases.
    pub const ALL: [StandardFont; 6] = [
        StandardFont::Helvetica,
        StandardFont::HelveticaBold,
        StandardFont::TimesRoman,
        StandardFont::TimesBold,
        StandardFont::Courier,
        StandardFont::CourierBold,
    ];

    /// Resolve a caller alias, falling back to Helvetica.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_pagekit::fonts::StandardFont;
    ///
    /// assert_eq!(StandardFont::resolve("Arial"), StandardFont::Helvetica);
    /// assert_eq!(StandardFont::resolve("Times New Roman Bold"), StandardFont::TimesBold);
    /// assert_eq!(StandardFont::resolve("Comic Sans"), StandardFont::Helvetica);
    /// ```
    pub fn resolve(alias: &str) -> Self {
        match Self::from_alias(alias) {
            Some(font) => font,
            None => {
                log::warn!("Unknown font '{}', using Helvetica", alias);
                StandardFont::Helvetica
            },
        }
    }

    /// Look up an alias without falling back.
    pub fn from_alias(alias: &str) -> Option<Self> {
        let normalized = alias
            .trim()
            .to_ascii_lowercase()
            .replace(['-', '_'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        let font = match normalized.as_str() {
            "arial" | "helvetica" | "sans serif" => StandardFont::Helvetica,
            "arial bold" | "helvetica bold" => StandardFont::HelveticaBold,
            "times" | "times new roman" | "times roman" | "serif" => StandardFont::TimesRoman,
            "times bold" | "times new roman bold" | "times roman bold" => StandardFont::TimesBold,
            "courier" | "courier new" | "monospace" => StandardFont::Courier,
            "courier bold" | "courier new bold" => StandardFont::CourierBold,
            _ => return None,
        };
        Some(font)
    }

    /// PostScript name written to `/BaseFont`.
    pub fn base_font(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::TimesBold => "Times-Bold",
            StandardFont::Courier => "Courier",
            StandardFont::CourierBold => "Courier-Bold",
        }
    }

    /// Name of the font in a page's `/Resources /Font` dictionary.
    ///
    /// Prefixed so it does not collide with the document's own font names.
    pub fn resource_name(&self) -> &'static str {
        match self {
            StandardFont::Helvetica => "PkHelv",
            StandardFont::HelveticaBold => "PkHelvB",
            StandardFont::TimesRoman => "PkTimes",
            StandardFont::TimesBold => "PkTimesB",
            StandardFont::Courier => "PkCour",
            StandardFont::CourierBold => "PkCourB",
        }
    }

    /// Font dictionary for this font.
    pub fn to_dictionary(&self) -> Dictionary {
        dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => Object::Name(self.base_font().as_bytes().to_vec()),
            "Encoding" => "WinAnsiEncoding",
        }
    }
}
