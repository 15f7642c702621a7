//! Drawing on top of existing pages.
//!
//! Every overlay becomes a new content stream appended to the page's
//! `/Contents` array. Existing content is never rewritten: the first overlay on
//! a page wraps the original streams in `q`/`Q` so whatever graphics state they
//! leave behind does not leak into the overlay, and each overlay is itself
//! wrapped in `q`/`Q`.

use crate::color::Color;
use crate::config::ReplacementLayout;
use crate::document::PdfDocument;
use crate::error::{Error, Result};
use crate::fonts::{encode_win_ansi, StandardFont};
use crate::geometry::Point;
use crate::writer::ContentStreamBuilder;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

/// Resolved text appearance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Built-in font
    pub font: StandardFont,
    /// Font size in points
    pub size: f32,
    /// Fill color
    pub color: Color,
}

impl TextStyle {
    /// Create a style from resolved parts.
    pub fn new(font: StandardFont, size: f32, color: Color) -> Self {
        Self { font, size, color }
    }

    /// Resolve caller-supplied font and color strings, falling back (with a
    /// warning) to Helvetica and black.
    pub fn resolve(font: &str, size: f32, color: &str) -> Self {
        Self::new(StandardFont::resolve(font), size, Color::resolve(color))
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::new(StandardFont::Helvetica, 12.0, Color::black())
    }
}

/// Appends overlays to the pages of one document.
///
/// Positions are interpreted in the unrotated page frame (see
/// [`PageGeometry::to_native`](crate::geometry::PageGeometry::to_native)).
/// On a page with a `/Rotate` entry, overlays rotate with the page content.
pub struct OverlayWriter<'d> {
    doc: &'d mut PdfDocument,
    compress: bool,
    /// Font objects added to this document, shared by all pages
    font_objects: HashMap<StandardFont, ObjectId>,
}

impl<'d> OverlayWriter<'d> {
    /// Create a writer for `doc`. Overlay streams are compressed by default.
    pub fn new(doc: &'d mut PdfDocument) -> Self {
        Self {
            doc,
            compress: true,
            font_objects: HashMap::new(),
        }
    }

    /// Enable or disable Flate compression of overlay streams.
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// The document being written to.
    pub fn document(&self) -> &PdfDocument {
        self.doc
    }

    /// Draw `text` with its top-left corner at `position` (caller space).
    ///
    /// Blank text is a no-op and returns `Ok(false)`. Characters outside
    /// WinAnsiEncoding are drawn as `?`.
    pub fn add_text(
        &mut self,
        page: u32,
        text: &str,
        position: Point,
        style: &TextStyle,
    ) -> Result<bool> {
        if text.trim().is_empty() {
            log::debug!("Ignoring blank text for page {}", page);
            return Ok(false);
        }
        if !style.size.is_finite() || style.size <= 0.0 {
            return Err(Error::invalid(format!("invalid font size {}", style.size)));
        }

        let page_id = self.doc.page_id(page)?;
        let geometry = self.doc.geometry(page)?;
        let (x, y) = geometry.to_native(position, style.size);

        let (encoded, substituted) = encode_win_ansi(text);
        if substituted > 0 {
            log::warn!(
                "{} character(s) on page {} cannot be drawn with {} and were replaced",
                substituted,
                page,
                style.font.base_font()
            );
        }

        self.register_font(page_id, style.font)?;

        let mut builder = ContentStreamBuilder::new();
        builder
            .save_state()
            .begin_text()
            .set_font(style.font.resource_name(), style.size)
            .fill_color(style.color)
            .text(&encoded, x, y)
            .end_text()
            .restore_state();
        self.append_overlay(page_id, &builder)?;

        log::debug!("Added text to page {} at ({}, {})", page, x, y);
        Ok(true)
    }

    /// Fill a rectangle with a translucent color.
    ///
    /// `opacity` is clamped to `[0, 1]`; values below 1 are applied through an
    /// ExtGState resource.
    pub fn add_highlight(
        &mut self,
        page: u32,
        position: Point,
        width: f32,
        height: f32,
        color: Color,
        opacity: f32,
    ) -> Result<()> {
        self.fill_region(page, position, width, height, color, opacity)?;
        log::debug!("Added highlight to page {}", page);
        Ok(())
    }

    /// Cover a region with an opaque white rectangle.
    ///
    /// This hides the region visually only. The covered text stays in the
    /// page content and remains selectable and extractable; do not use it to
    /// remove sensitive information.
    pub fn delete_text_region(
        &mut self,
        page: u32,
        position: Point,
        width: f32,
        height: f32,
    ) -> Result<()> {
        self.cover_region(page, position, width, height, Color::white())
    }

    /// Like [`delete_text_region`](Self::delete_text_region), with a cover
    /// color matching a non-white page background.
    pub fn cover_region(
        &mut self,
        page: u32,
        position: Point,
        width: f32,
        height: f32,
        color: Color,
    ) -> Result<()> {
        self.fill_region(page, position, width, height, color, 1.0)?;
        log::debug!("Covered region on page {}", page);
        Ok(())
    }

    /// Overlay replacement text on pages containing the search strings.
    ///
    /// For every page, the pairs whose `find` string occurs in the page text
    /// are drawn one per line near the top-left corner, in pair order. The
    /// original text is left in place. Returns the number of overlays written.
    pub fn replace_text(
        &mut self,
        replacements: &[(String, String)],
        layout: &ReplacementLayout,
        style: &TextStyle,
    ) -> Result<usize> {
        let mut written = 0;

        for page in 1..=self.doc.page_count() {
            let text = match self.doc.page_text(page) {
                Ok(text) => text,
                Err(e) => {
                    log::warn!("Cannot read text of page {}, skipping: {}", page, e);
                    continue;
                },
            };

            let matched = replacements
                .iter()
                .filter(|(find, _)| !find.is_empty() && text.contains(find.as_str()))
                .map(|(_, replace)| replace);

            for (line, replacement) in matched.enumerate() {
                let position = Point::new(
                    layout.margin,
                    layout.margin + line as f32 * layout.line_height,
                );
                if self.add_text(page, replacement, position, style)? {
                    written += 1;
                }
            }
        }

        log::info!("Wrote {} replacement overlay(s)", written);
        Ok(written)
    }

    fn fill_region(
        &mut self,
        page: u32,
        position: Point,
        width: f32,
        height: f32,
        color: Color,
        opacity: f32,
    ) -> Result<()> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(Error::invalid(format!(
                "invalid region size {}x{}",
                width, height
            )));
        }

        let page_id = self.doc.page_id(page)?;
        let rect = self.doc.geometry(page)?.to_native_rect(position, width, height);

        let opacity = if opacity.is_finite() {
            opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };

        let mut builder = ContentStreamBuilder::new();
        builder.save_state();
        if opacity < 1.0 {
            let gs_name = self.register_opacity(page_id, opacity)?;
            builder.set_ext_gstate(&gs_name);
        }
        builder
            .fill_color(color)
            .rect(rect.x, rect.y, rect.width, rect.height)
            .fill()
            .restore_state();

        self.append_overlay(page_id, &builder)
    }

    fn register_font(&mut self, page_id: ObjectId, font: StandardFont) -> Result<()> {
        let font_id = match self.font_objects.get(&font) {
            Some(&id) => id,
            None => {
                let id = self.doc.inner_mut().add_object(font.to_dictionary());
                self.font_objects.insert(font, id);
                id
            },
        };

        let fonts = resource_category(self.doc, page_id, "Font")?;
        if !fonts.has(font.resource_name().as_bytes()) {
            fonts.set(font.resource_name(), Object::Reference(font_id));
        }
        Ok(())
    }

    /// Register an ExtGState for `opacity` and return its resource name.
    fn register_opacity(&mut self, page_id: ObjectId, opacity: f32) -> Result<String> {
        let percent = (opacity * 100.0).round() as u32;
        let name = format!("PkGS{}", percent);
        let alpha = percent as f32 / 100.0;

        let states = resource_category(self.doc, page_id, "ExtGState")?;
        if !states.has(name.as_bytes()) {
            states.set(
                name.as_str(),
                dictionary! {
                    "Type" => "ExtGState",
                    "ca" => Object::Real(alpha),
                    "CA" => Object::Real(alpha),
                },
            );
        }
        Ok(name)
    }

    fn append_overlay(&mut self, page_id: ObjectId, builder: &ContentStreamBuilder) -> Result<()> {
        let existing = content_streams(self.doc, page_id);
        let mut contents = Vec::with_capacity(existing.len() + 3);

        if !self.doc.is_isolated(page_id) && !existing.is_empty() {
            let open = self.add_stream(b"q\n".to_vec(), false);
            let close = self.add_stream(b"Q\n".to_vec(), false);
            contents.push(Object::Reference(open));
            contents.extend(existing);
            contents.push(Object::Reference(close));
        } else {
            contents.extend(existing);
        }
        self.doc.mark_isolated(page_id);

        let overlay = if self.compress {
            self.add_stream(builder.build_compressed()?, true)
        } else {
            self.add_stream(builder.build()?, false)
        };
        contents.push(Object::Reference(overlay));

        let page = self
            .doc
            .inner_mut()
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)?;
        page.set("Contents", contents);
        Ok(())
    }

    fn add_stream(&mut self, content: Vec<u8>, deflated: bool) -> ObjectId {
        let dict = if deflated {
            dictionary! { "Filter" => "FlateDecode" }
        } else {
            Dictionary::new()
        };
        self.doc.inner_mut().add_object(Stream::new(dict, content))
    }
}

/// References (or direct streams) making up a page's content, in order.
fn content_streams(doc: &PdfDocument, page_id: ObjectId) -> Vec<Object> {
    let Ok(page) = doc.inner().get_dictionary(page_id) else {
        return Vec::new();
    };
    match page.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.inner().get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}

/// The `/Resources /<category>` dictionary of a page, created when missing.
///
/// Inherited resources are copied onto the page first. When the resources or
/// the category are indirect objects, the referenced object is modified.
fn resource_category<'a>(
    doc: &'a mut PdfDocument,
    page_id: ObjectId,
    category: &str,
) -> Result<&'a mut Dictionary> {
    doc.materialize_inherited(page_id)?;

    let resources_ref = {
        let page = doc.inner().get_dictionary(page_id)?;
        match page.get(b"Resources") {
            Ok(Object::Reference(id)) => Some(*id),
            Ok(Object::Dictionary(_)) => None,
            _ => {
                let page = doc
                    .inner_mut()
                    .get_object_mut(page_id)
                    .and_then(Object::as_dict_mut)?;
                page.set("Resources", Dictionary::new());
                None
            },
        }
    };

    let category_ref = {
        let resources = resources_dict(doc.inner(), page_id, resources_ref)?;
        resources
            .get(category.as_bytes())
            .and_then(Object::as_reference)
            .ok()
    };
    if let Some(id) = category_ref {
        return Ok(doc
            .inner_mut()
            .get_object_mut(id)
            .and_then(Object::as_dict_mut)?);
    }

    let resources = resources_dict_mut(doc.inner_mut(), page_id, resources_ref)?;
    if !matches!(resources.get(category.as_bytes()), Ok(Object::Dictionary(_))) {
        resources.set(category, Dictionary::new());
    }
    Ok(resources
        .get_mut(category.as_bytes())
        .and_then(Object::as_dict_mut)?)
}

fn resources_dict(
    doc: &Document,
    page_id: ObjectId,
    resources_ref: Option<ObjectId>,
) -> Result<&Dictionary> {
    let dict = match resources_ref {
        Some(id) => doc.get_dictionary(id)?,
        None => doc
            .get_dictionary(page_id)?
            .get(b"Resources")
            .and_then(Object::as_dict)?,
    };
    Ok(dict)
}

fn resources_dict_mut(
    doc: &mut Document,
    page_id: ObjectId,
    resources_ref: Option<ObjectId>,
) -> Result<&mut Dictionary> {
    let dict = match resources_ref {
        Some(id) => doc.get_object_mut(id).and_then(Object::as_dict_mut)?,
        None => doc
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)?
            .get_mut(b"Resources")
            .and_then(Object::as_dict_mut)?,
    };
    Ok(dict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::test_support::{decoded_contents, sample_pdf};

    fn open(pages: u32) -> PdfDocument {
        PdfDocument::from_bytes(&sample_pdf(pages)).unwrap()
    }

    #[test]
    fn test_add_text_appends_stream() {
        let mut doc = open(1);
        let style = TextStyle::resolve("courier", 10.0, "#ff0000");
        let written = OverlayWriter::new(&mut doc)
            .with_compression(false)
            .add_text(1, "Hello", Point::new(72.0, 72.0), &style)
            .unwrap();
        assert!(written);

        let content = decoded_contents(&doc, 1);
        assert!(content.contains("/PkCour 10 Tf"));
        assert!(content.contains("1 0 0 rg"));
        assert!(content.contains("1 0 0 1 72 710 Tm"));
        assert!(content.contains("(Hello) Tj"));
        // Original content is kept, wrapped in q/Q, before the overlay.
        let original = content.find("(Page 1) Tj").unwrap();
        let overlay = content.find("(Hello) Tj").unwrap();
        assert!(content.starts_with("q\n"));
        assert!(original < overlay);
    }

    #[test]
    fn test_blank_text_is_noop() {
        let mut doc = open(1);
        let objects = doc.inner().objects.len();
        let written = OverlayWriter::new(&mut doc)
            .add_text(1, "  \n", Point::new(0.0, 0.0), &TextStyle::default())
            .unwrap();
        assert!(!written);
        assert_eq!(doc.inner().objects.len(), objects);
        assert_eq!(content_streams(&doc, doc.page_id(1).unwrap()).len(), 1);
    }

    #[test]
    fn test_font_registered_on_page() {
        let mut doc = open(1);
        OverlayWriter::new(&mut doc)
            .add_text(1, "x", Point::new(0.0, 0.0), &TextStyle::resolve("Times Bold", 9.0, "black"))
            .unwrap();

        let page_id = doc.page_id(1).unwrap();
        let page = doc.inner().get_dictionary(page_id).unwrap();
        let resources = page.get(b"Resources").and_then(Object::as_dict).unwrap();
        let fonts = resources.get(b"Font").and_then(Object::as_dict).unwrap();
        assert!(fonts.has(b"PkTimesB"));
        // Fonts of the page itself are still there.
        assert!(fonts.has(b"F1"));
    }

    #[test]
    fn test_isolation_happens_once() {
        let mut doc = open(1);
        let mut writer = OverlayWriter::new(&mut doc);
        writer
            .add_highlight(1, Point::new(0.0, 0.0), 10.0, 10.0, Color::black(), 1.0)
            .unwrap();
        writer
            .add_highlight(1, Point::new(0.0, 0.0), 10.0, 10.0, Color::black(), 1.0)
            .unwrap();

        let page_id = doc.page_id(1).unwrap();
        // q, original, Q, overlay, overlay
        assert_eq!(content_streams(&doc, page_id).len(), 5);
    }

    #[test]
    fn test_highlight_opacity_registers_ext_gstate() {
        let mut doc = open(1);
        OverlayWriter::new(&mut doc)
            .with_compression(false)
            .add_highlight(1, Point::new(10.0, 30.0), 100.0, 20.0, Color::resolve("yellow"), 0.4)
            .unwrap();

        let content = decoded_contents(&doc, 1);
        assert!(content.contains("/PkGS40 gs"));
        assert!(content.contains("10 742 100 20 re"));

        let page_id = doc.page_id(1).unwrap();
        let page = doc.inner().get_dictionary(page_id).unwrap();
        let states = page
            .get(b"Resources")
            .and_then(Object::as_dict)
            .and_then(|r| r.get(b"ExtGState"))
            .and_then(Object::as_dict)
            .unwrap();
        assert!(states.has(b"PkGS40"));
    }

    #[test]
    fn test_redaction_is_opaque_white() {
        let mut doc = open(1);
        OverlayWriter::new(&mut doc)
            .with_compression(false)
            .delete_text_region(1, Point::new(0.0, 0.0), 50.0, 10.0)
            .unwrap();

        let content = decoded_contents(&doc, 1);
        assert!(content.contains("1 1 1 rg"));
        assert!(!content.contains(" gs"));
        // Display-only: the covered text is still there.
        assert!(doc.page_text(1).unwrap().contains("Page 1"));
    }

    #[test]
    fn test_region_validation() {
        let mut doc = open(1);
        let mut writer = OverlayWriter::new(&mut doc);
        let err = writer
            .delete_text_region(1, Point::new(0.0, 0.0), 0.0, 10.0)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let err = writer
            .delete_text_region(2, Point::new(0.0, 0.0), 10.0, 10.0)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_replace_text_matches_in_pair_order() {
        let mut doc = open(2);
        let replacements = vec![
            ("Page 2".to_string(), "Second".to_string()),
            ("Page".to_string(), "Any".to_string()),
            ("missing".to_string(), "Never".to_string()),
        ];
        let written = OverlayWriter::new(&mut doc)
            .with_compression(false)
            .replace_text(&replacements, &ReplacementLayout::default(), &TextStyle::default())
            .unwrap();

        // Page 1 matches "Page"; page 2 matches both.
        assert_eq!(written, 3);
        let page2 = decoded_contents(&doc, 2);
        assert!(page2.contains("1 0 0 1 50 730 Tm\n(Second) Tj"));
        assert!(page2.contains("1 0 0 1 50 712 Tm\n(Any) Tj"));
        assert!(!decoded_contents(&doc, 1).contains("Second"));
    }

    #[test]
    fn test_overlay_survives_save() {
        let mut doc = open(1);
        OverlayWriter::new(&mut doc)
            .add_text(1, "Stamped", Point::new(20.0, 20.0), &TextStyle::default())
            .unwrap();
        let bytes = doc.to_bytes(false).unwrap();
        let reloaded = PdfDocument::from_bytes(&bytes).unwrap();
        assert!(reloaded.page_text(1).unwrap().contains("Stamped"));
    }

    #[test]
    fn test_rotated_page_uses_unrotated_frame() {
        let mut doc = open(1);
        crate::editor::rotate_pages(&mut doc, &[crate::editor::Rotation::new(1, 90.0)]).unwrap();
        OverlayWriter::new(&mut doc)
            .add_text(1, "Note", Point::new(72.0, 100.0), &TextStyle::default())
            .unwrap();
        assert!(decoded_contents(&doc, 1).contains("1 0 0 1 72 680 Tm"));
    }
}
