//! Configuration for the transformation engine.

use serde::Deserialize;

/// Default ceiling on the size of an uploaded document (50 MiB).
pub const DEFAULT_MAX_FILE_SIZE: usize = 50 * 1024 * 1024;

/// Default ceiling on the number of pages in a document.
pub const DEFAULT_MAX_PAGE_COUNT: u32 = 1000;

/// MIME type of the documents this engine accepts.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Engine configuration.
///
/// Every field has a default, so a partial JSON object deserializes:
///
/// ```
/// use pdf_pagekit::config::EngineConfig;
///
/// let config: EngineConfig = serde_json::from_str(r#"{"max_page_count": 200}"#).unwrap();
/// assert_eq!(config.max_page_count, 200);
/// assert_eq!(config.max_file_size, 50 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum accepted input size in bytes.
    pub max_file_size: usize,

    /// Maximum accepted page count, checked right after load.
    pub max_page_count: u32,

    /// Expected declared content type of uploads.
    pub content_type: String,

    /// Flate-compress overlay content streams.
    pub compress_overlays: bool,

    /// Write `/Producer` and `/ModDate` into the Info dictionary of outputs.
    pub stamp_producer: bool,

    /// Defaults for `add_text` records.
    pub text: TextDefaults,

    /// Defaults for `highlight` records.
    pub highlight: RegionDefaults,

    /// Defaults for `delete_text` records.
    pub redaction: RedactionDefaults,

    /// Layout used when overlaying text replacements.
    pub replacement: ReplacementLayout,
}

/// Defaults applied to text overlays when the caller leaves a field out.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TextDefaults {
    /// Font alias, resolved through the font resolver.
    pub font: String,
    /// Font size in points.
    pub size: f32,
    /// Color string, resolved through the color resolver.
    pub color: String,
}

/// Defaults applied to rectangle overlays (highlight and redaction).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegionDefaults {
    /// Rectangle width in points.
    pub width: f32,
    /// Rectangle height in points.
    pub height: f32,
    /// Fill color string.
    pub color: String,
    /// Fill opacity in `[0, 1]`.
    pub opacity: f32,
}

/// Defaults for redaction covers. The fill is always opaque.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedactionDefaults {
    /// Rectangle width in points.
    pub width: f32,
    /// Rectangle height in points.
    pub height: f32,
    /// Fill color string, matching the page background.
    pub color: String,
}

/// Where replacement text lands on a page (caller coordinates, top-left origin).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReplacementLayout {
    /// Left and top margin in points.
    pub margin: f32,
    /// Vertical distance between successive replacements.
    pub line_height: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for TextDefaults {
    fn default() -> Self {
        Self {
            font: "helvetica".to_string(),
            size: 12.0,
            color: "black".to_string(),
        }
    }
}

impl Default for RegionDefaults {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 20.0,
            color: "yellow".to_string(),
            opacity: 0.4,
        }
    }
}

impl Default for RedactionDefaults {
    fn default() -> Self {
        Self {
            width: 100.0,
            height: 20.0,
            color: "white".to_string(),
        }
    }
}

impl Default for ReplacementLayout {
    fn default() -> Self {
        Self {
            margin: 50.0,
            line_height: 18.0,
        }
    }
}

impl EngineConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_page_count: DEFAULT_MAX_PAGE_COUNT,
            content_type: PDF_CONTENT_TYPE.to_string(),
            compress_overlays: true,
            stamp_producer: true,
            text: TextDefaults::default(),
            highlight: RegionDefaults::default(),
            redaction: RedactionDefaults::default(),
            replacement: ReplacementLayout::default(),
        }
    }

    /// Set the maximum input size in bytes.
    pub fn with_max_file_size(mut self, bytes: usize) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Set the maximum page count.
    pub fn with_max_page_count(mut self, pages: u32) -> Self {
        self.max_page_count = pages;
        self
    }

    /// Enable or disable overlay stream compression.
    pub fn with_compress_overlays(mut self, enable: bool) -> Self {
        self.compress_overlays = enable;
        self
    }

    /// Enable or disable Info dictionary stamping on output.
    pub fn with_stamp_producer(mut self, enable: bool) -> Self {
        self.stamp_producer = enable;
        self
    }

    /// Replace the text overlay defaults.
    pub fn with_text_defaults(mut self, text: TextDefaults) -> Self {
        self.text = text;
        self
    }
}
