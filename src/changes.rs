//! Declarative change lists.
//!
//! A change list is a JSON array of records such as
//!
//! ```json
//! [
//!   {"page": 1, "action": "add_text", "x": 72, "y": 100, "text": "Jane Doe", "size": 14},
//!   {"page": 1, "action": "highlight", "x": 72, "y": 98, "width": 120},
//!   {"page": 2, "action": "delete_text", "x": 72, "y": 300, "width": 200, "height": 14}
//! ]
//! ```
//!
//! Positions are in caller space (top-left origin). Records are applied in
//! order. A record that cannot be applied (unknown action, page out of range,
//! missing text, malformed fields) is logged and skipped; the rest still run.

use crate::color::Color;
use crate::config::EngineConfig;
use crate::document::PdfDocument;
use crate::editor::{OverlayWriter, TextStyle};
use crate::error::{Error, ErrorKind, Result};
use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// What a change record does.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ChangeAction {
    /// Draw text
    AddText,
    /// Draw a translucent rectangle
    Highlight,
    /// Cover a region with an opaque rectangle
    DeleteText,
    /// Anything else; skipped when applied
    Unknown(String),
}

impl From<String> for ChangeAction {
    fn from(action: String) -> Self {
        match action.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "add_text" => ChangeAction::AddText,
            "highlight" => ChangeAction::Highlight,
            "delete_text" => ChangeAction::DeleteText,
            _ => ChangeAction::Unknown(action),
        }
    }
}

/// One edit of a change list.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeRecord {
    /// 1-based page number
    pub page: i64,
    /// Action to perform
    pub action: ChangeAction,
    /// Left edge in points
    pub x: f32,
    /// Top edge in points, measured from the top of the page
    pub y: f32,
    /// Text to draw (`add_text` only)
    #[serde(default)]
    pub text: Option<String>,
    /// Font alias
    #[serde(default)]
    pub font: Option<String>,
    /// Font size in points
    #[serde(default)]
    pub size: Option<f32>,
    /// Color string
    #[serde(default)]
    pub color: Option<String>,
    /// Region width in points
    #[serde(default)]
    pub width: Option<f32>,
    /// Region height in points
    #[serde(default)]
    pub height: Option<f32>,
    /// Highlight opacity
    #[serde(default)]
    pub opacity: Option<f32>,
}

impl ChangeRecord {
    /// A record with only the required fields set.
    pub fn new(page: i64, action: ChangeAction, x: f32, y: f32) -> Self {
        Self {
            page,
            action,
            x,
            y,
            text: None,
            font: None,
            size: None,
            color: None,
            width: None,
            height: None,
            opacity: None,
        }
    }

    /// Set the text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the region size.
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Set the color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Outcome of applying a change list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    /// Records that produced an overlay
    pub applied: usize,
    /// Records that were skipped
    pub skipped: usize,
}

/// Records parsed from a JSON change list.
#[derive(Debug, Clone, Default)]
pub struct ChangeList {
    /// Records that deserialized, in input order
    pub records: Vec<ChangeRecord>,
    /// Number of array elements that did not form a valid record
    pub malformed: usize,
}

impl ChangeList {
    /// Parse a JSON change list.
    ///
    /// The payload must be a JSON array; anything else is rejected. Elements
    /// of the array that are not valid records are counted and skipped.
    pub fn parse(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let serde_json::Value::Array(items) = value else {
            return Err(Error::invalid("change list must be a JSON array"));
        };

        let mut list = ChangeList::default();
        for (index, item) in items.into_iter().enumerate() {
            match serde_json::from_value::<ChangeRecord>(item) {
                Ok(record) => list.records.push(record),
                Err(e) => {
                    log::warn!("Skipping malformed change record #{}: {}", index + 1, e);
                    list.malformed += 1;
                },
            }
        }
        Ok(list)
    }
}

/// Apply change records to a document, in order.
///
/// Records that cannot be applied are skipped with a warning. Failures that
/// are not the caller's fault (memory exhaustion, internal errors) abort the
/// whole batch.
pub fn apply_changes(
    doc: &mut PdfDocument,
    records: &[ChangeRecord],
    config: &EngineConfig,
) -> Result<ApplyReport> {
    let page_count = doc.page_count();
    let mut writer = OverlayWriter::new(doc).with_compression(config.compress_overlays);
    let mut report = ApplyReport::default();

    for (index, record) in records.iter().enumerate() {
        if record.page < 1 || record.page > page_count as i64 {
            log::warn!(
                "Skipping change #{}: page {} out of range (document has {} pages)",
                index + 1,
                record.page,
                page_count
            );
            report.skipped += 1;
            continue;
        }

        match apply_record(&mut writer, record, config) {
            Ok(true) => report.applied += 1,
            Ok(false) => report.skipped += 1,
            Err(e) if e.kind() == ErrorKind::InvalidInput => {
                log::warn!("Skipping change #{}: {}", index + 1, e);
                report.skipped += 1;
            },
            Err(e) => return Err(e),
        }
    }

    log::info!(
        "Applied {} change(s), skipped {}",
        report.applied,
        report.skipped
    );
    Ok(report)
}

fn apply_record(
    writer: &mut OverlayWriter<'_>,
    record: &ChangeRecord,
    config: &EngineConfig,
) -> Result<bool> {
    let page = record.page as u32;
    let position = Point::new(record.x, record.y);

    match &record.action {
        ChangeAction::AddText => {
            let Some(text) = record.text.as_deref() else {
                log::warn!("add_text on page {} has no text", page);
                return Ok(false);
            };
            let defaults = &config.text;
            let style = TextStyle::resolve(
                record.font.as_deref().unwrap_or(&defaults.font),
                record.size.unwrap_or(defaults.size),
                record.color.as_deref().unwrap_or(&defaults.color),
            );
            writer.add_text(page, text, position, &style)
        },
        ChangeAction::Highlight => {
            let defaults = &config.highlight;
            writer.add_highlight(
                page,
                position,
                record.width.unwrap_or(defaults.width),
                record.height.unwrap_or(defaults.height),
                Color::resolve(record.color.as_deref().unwrap_or(&defaults.color)),
                record.opacity.unwrap_or(defaults.opacity),
            )?;
            Ok(true)
        },
        ChangeAction::DeleteText => {
            let defaults = &config.redaction;
            writer.cover_region(
                page,
                position,
                record.width.unwrap_or(defaults.width),
                record.height.unwrap_or(defaults.height),
                Color::resolve(&defaults.color),
            )?;
            Ok(true)
        },
        ChangeAction::Unknown(action) => {
            log::warn!("Unknown change action '{}' on page {}", action, page);
            Ok(false)
        },
    }
}
