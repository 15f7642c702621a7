//! Bytes-in, bytes-out engine operations.

use crate::changes::{apply_changes, ApplyReport, ChangeList, ChangeRecord};
use crate::color::Color;
use crate::config::EngineConfig;
use crate::document::{DocumentSummary, PdfDocument};
use crate::editor::{self, OverlayWriter, Rotation, TextStyle};
use crate::error::Result;
use crate::geometry::Point;
use crate::validator::DocumentValidator;
use indexmap::IndexMap;

/// An uploaded document: raw bytes plus the content type the client declared.
#[derive(Debug, Clone, Copy)]
pub struct DocumentInput<'a> {
    /// Raw file bytes
    pub bytes: &'a [u8],
    /// Declared MIME type
    pub content_type: &'a str,
}

impl<'a> DocumentInput<'a> {
    /// Create an input with an explicit content type.
    pub fn new(bytes: &'a [u8], content_type: &'a str) -> Self {
        Self {
            bytes,
            content_type,
        }
    }

    /// Input declared as `application/pdf`.
    pub fn pdf(bytes: &'a [u8]) -> Self {
        Self::new(bytes, crate::config::PDF_CONTENT_TYPE)
    }
}

/// Entry point for all document transformations.
///
/// Every operation validates its input, loads it into a [`PdfDocument`] owned
/// by that call, applies the change, and serializes the result. The document
/// is dropped before the call returns, on success and on every error path.
///
/// # Examples
///
/// ```no_run
/// use pdf_pagekit::api::{DocumentInput, PdfEngine};
///
/// # fn main() -> pdf_pagekit::Result<()> {
/// let bytes = std::fs::read("resume.pdf")?;
/// let engine = PdfEngine::default();
/// let trimmed = engine.delete_pages(DocumentInput::pdf(&bytes), &[2])?;
/// std::fs::write("resume-trimmed.pdf", trimmed)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct PdfEngine {
    config: EngineConfig,
}

impl PdfEngine {
    /// Create an engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn validator(&self) -> DocumentValidator {
        DocumentValidator::new(&self.config)
    }

    fn open(&self, input: DocumentInput<'_>) -> Result<PdfDocument> {
        PdfDocument::load(input.bytes, input.content_type, &self.validator())
    }

    fn save(&self, mut doc: PdfDocument) -> Result<Vec<u8>> {
        doc.to_bytes(self.config.stamp_producer)
    }

    fn writer<'d>(&self, doc: &'d mut PdfDocument) -> OverlayWriter<'d> {
        OverlayWriter::new(doc).with_compression(self.config.compress_overlays)
    }

    /// Check size and content type without parsing.
    pub fn validate(&self, input: DocumentInput<'_>) -> Result<()> {
        self.validator().validate(input.bytes, input.content_type)
    }

    /// Page count, page sizes, rotations and basic metadata.
    pub fn inspect(&self, input: DocumentInput<'_>) -> Result<DocumentSummary> {
        logged("inspect", || Ok(self.open(input)?.summary()))
    }

    /// Delete the given 1-based pages.
    ///
    /// Duplicates are ignored. A request that would remove every page is
    /// rejected as invalid input, since the result would not be a usable PDF.
    pub fn delete_pages(&self, input: DocumentInput<'_>, pages: &[u32]) -> Result<Vec<u8>> {
        logged("delete_pages", || {
            let mut doc = self.open(input)?;
            editor::delete_pages(&mut doc, pages)?;
            self.save(doc)
        })
    }

    /// Rotate pages; invalid entries are skipped.
    pub fn rotate_pages(&self, input: DocumentInput<'_>, rotations: &[Rotation]) -> Result<Vec<u8>> {
        logged("rotate_pages", || {
            let mut doc = self.open(input)?;
            editor::rotate_pages(&mut doc, rotations)?;
            self.save(doc)
        })
    }

    /// Rotate pages from a JSON request (see [`editor::parse_rotations`]).
    pub fn rotate_pages_json(&self, input: DocumentInput<'_>, json: &str) -> Result<Vec<u8>> {
        let rotations = logged("rotate_pages", || editor::parse_rotations(json))?;
        self.rotate_pages(input, &rotations)
    }

    /// Reorder pages; `order` must be a permutation of all page numbers.
    pub fn reorder_pages(&self, input: DocumentInput<'_>, order: &[u32]) -> Result<Vec<u8>> {
        logged("reorder_pages", || {
            let mut doc = self.open(input)?;
            editor::reorder_pages(&mut doc, order)?;
            self.save(doc)
        })
    }

    /// New document made of the selected pages, in selection order.
    pub fn extract_pages(&self, input: DocumentInput<'_>, selected: &[u32]) -> Result<Vec<u8>> {
        logged("extract_pages", || {
            let doc = self.open(input)?;
            let output = editor::extract_pages(&doc, selected)?;
            drop(doc);
            self.save(output)
        })
    }

    /// Split into parts starting at each split point.
    ///
    /// Returns `part_1.pdf`, `part_2.pdf`, ... in page order.
    pub fn split_pdf(
        &self,
        input: DocumentInput<'_>,
        split_points: &[u32],
    ) -> Result<IndexMap<String, Vec<u8>>> {
        logged("split_pdf", || {
            let doc = self.open(input)?;
            let parts = editor::split_pdf(&doc, split_points)?;
            drop(doc);

            let mut output = IndexMap::with_capacity(parts.len());
            for (name, part) in parts {
                output.insert(name, self.save(part)?);
            }
            Ok(output)
        })
    }

    /// Concatenate documents in list order.
    ///
    /// Every input is validated and loaded before merging starts; if one
    /// fails, the inputs loaded before it are released and nothing is merged.
    pub fn merge_pdfs(&self, inputs: &[DocumentInput<'_>]) -> Result<Vec<u8>> {
        logged("merge_pdfs", || {
            let docs = inputs
                .iter()
                .map(|&input| self.open(input))
                .collect::<Result<Vec<_>>>()?;
            let merged = editor::merge_pdfs(&docs)?;
            drop(docs);
            self.save(merged)
        })
    }

    /// Draw text on a page.
    ///
    /// Blank `text` returns the input bytes unchanged (after validation).
    #[allow(clippy::too_many_arguments)]
    pub fn add_text(
        &self,
        input: DocumentInput<'_>,
        page: u32,
        text: &str,
        position: Point,
        font: &str,
        size: f32,
        color: &str,
    ) -> Result<Vec<u8>> {
        logged("add_text", || {
            if text.trim().is_empty() {
                self.validate(input)?;
                log::debug!("Blank text, returning input unchanged");
                return Ok(input.bytes.to_vec());
            }
            let mut doc = self.open(input)?;
            let style = TextStyle::resolve(font, size, color);
            self.writer(&mut doc).add_text(page, text, position, &style)?;
            self.save(doc)
        })
    }

    /// Draw a translucent rectangle.
    pub fn add_highlight(
        &self,
        input: DocumentInput<'_>,
        page: u32,
        position: Point,
        width: f32,
        height: f32,
        color: &str,
        opacity: f32,
    ) -> Result<Vec<u8>> {
        logged("add_highlight", || {
            let mut doc = self.open(input)?;
            self.writer(&mut doc).add_highlight(
                page,
                position,
                width,
                height,
                Color::resolve(color),
                opacity,
            )?;
            self.save(doc)
        })
    }

    /// Cover a region with an opaque white rectangle.
    ///
    /// Display-only: the covered text remains in the file and can still be
    /// selected or extracted.
    pub fn delete_text_region(
        &self,
        input: DocumentInput<'_>,
        page: u32,
        position: Point,
        width: f32,
        height: f32,
    ) -> Result<Vec<u8>> {
        logged("delete_text_region", || {
            let mut doc = self.open(input)?;
            self.writer(&mut doc)
                .delete_text_region(page, position, width, height)?;
            self.save(doc)
        })
    }

    /// Overlay replacement text on every page containing a search string.
    pub fn replace_text(
        &self,
        input: DocumentInput<'_>,
        replacements: &[(String, String)],
    ) -> Result<Vec<u8>> {
        logged("replace_text", || {
            let mut doc = self.open(input)?;
            let defaults = &self.config.text;
            let style = TextStyle::resolve(&defaults.font, defaults.size, &defaults.color);
            self.writer(&mut doc)
                .replace_text(replacements, &self.config.replacement, &style)?;
            self.save(doc)
        })
    }

    /// Apply change records in order.
    pub fn apply_changes(
        &self,
        input: DocumentInput<'_>,
        records: &[ChangeRecord],
    ) -> Result<(Vec<u8>, ApplyReport)> {
        logged("apply_changes", || {
            let mut doc = self.open(input)?;
            let report = apply_changes(&mut doc, records, &self.config)?;
            Ok((self.save(doc)?, report))
        })
    }

    /// Apply a JSON change list. The payload must be a JSON array.
    ///
    /// Array elements that are not valid records count as skipped.
    pub fn apply_changes_json(
        &self,
        input: DocumentInput<'_>,
        json: &str,
    ) -> Result<(Vec<u8>, ApplyReport)> {
        let list = logged("apply_changes", || ChangeList::parse(json))?;
        let (bytes, mut report) = self.apply_changes(input, &list.records)?;
        report.skipped += list.malformed;
        Ok((bytes, report))
    }
}

/// Run an operation, logging its failure with the classified kind.
fn logged<T>(operation: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    f().map_err(|e| {
        if e.is_user_actionable() {
            log::warn!("{} rejected ({:?}): {}", operation, e.kind(), e);
        } else {
            log::error!("{} failed: {}", operation, e);
        }
        e
    })
}
