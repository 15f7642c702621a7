//! Owned handle on one loaded PDF document.
//!
//! A [`PdfDocument`] is created by loading bytes (or empty, as the target of an
//! extract/split/merge), is mutated by exactly one operation at a time, and is
//! released when dropped. Dropping is the "close" of the document: every exit
//! path of an operation, including early returns through `?`, releases it.

use crate::error::{Error, Result};
use crate::geometry::{PageGeometry, Rect};
use crate::validator::DocumentValidator;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, StringFormat};
use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;

/// US Letter, used when a page has no usable MediaBox.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Page attributes a page inherits from its ancestors in the page tree.
pub(crate) const INHERITABLE_KEYS: [&str; 4] = ["Resources", "MediaBox", "CropBox", "Rotate"];

/// Guard against cyclic /Parent chains in damaged page trees.
const MAX_TREE_DEPTH: usize = 64;

/// Producer string written to output Info dictionaries.
const PRODUCER: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));

/// Summary of one page, as reported by [`PdfDocument::summary`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageInfo {
    /// 1-based page number
    pub number: u32,
    /// MediaBox width in points
    pub width: f32,
    /// MediaBox height in points
    pub height: f32,
    /// Effective rotation in degrees (0, 90, 180, 270)
    pub rotation: i64,
}

/// Serializable overview of a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSummary {
    /// Number of pages
    pub page_count: u32,
    /// PDF version from the header
    pub version: String,
    /// Info dictionary title, if any
    pub title: Option<String>,
    /// Info dictionary author, if any
    pub author: Option<String>,
    /// Per-page information in page order
    pub pages: Vec<PageInfo>,
}

/// An open PDF document exclusively owned by one operation.
pub struct PdfDocument {
    inner: Document,
    id: Uuid,
    /// Pages whose original content has already been isolated with q/Q
    isolated_pages: HashSet<ObjectId>,
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("id", &self.id)
            .field("version", &self.inner.version)
            .field("objects", &self.inner.objects.len())
            .finish_non_exhaustive()
    }
}

impl PdfDocument {
    /// Validate and load a document from uploaded bytes.
    ///
    /// Size and content type are checked before parsing, the page count right
    /// after.
    pub fn load(
        bytes: &[u8],
        content_type: &str,
        validator: &DocumentValidator,
    ) -> Result<Self> {
        validator.validate(bytes, content_type)?;
        let doc = Self::from_bytes(bytes)?;
        validator.validate_page_count(doc.page_count())?;
        Ok(doc)
    }

    /// Parse bytes without upload validation.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(bytes).map_err(Error::load_failure)?;
        if inner.trailer.has(b"Encrypt") {
            return Err(Error::invalid("encrypted documents are not supported"));
        }
        Ok(Self::wrap(inner))
    }

    /// Create an empty document (catalog plus an empty page tree).
    pub fn new_empty(version: &str) -> Self {
        let mut inner = Document::with_version(version);
        let pages_id = inner.new_object_id();
        inner.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => 0i64,
            }),
        );
        let catalog_id = inner.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        inner.trailer.set("Root", catalog_id);
        Self::wrap(inner)
    }

    fn wrap(inner: Document) -> Self {
        let id = Uuid::new_v4();
        log::debug!("Opened document {} ({} objects)", id, inner.objects.len());
        Self {
            inner,
            id,
            isolated_pages: HashSet::new(),
        }
    }

    /// Correlation id used in log lines.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// PDF version from the header.
    pub fn version(&self) -> &str {
        &self.inner.version
    }

    /// Underlying object model.
    pub fn inner(&self) -> &Document {
        &self.inner
    }

    /// Mutable access to the underlying object model.
    pub fn inner_mut(&mut self) -> &mut Document {
        &mut self.inner
    }

    /// Number of pages.
    pub fn page_count(&self) -> u32 {
        self.inner.get_pages().len() as u32
    }

    /// Page object ids in page order.
    pub fn page_ids(&self) -> Vec<ObjectId> {
        self.inner.get_pages().into_values().collect()
    }

    /// Reject a 1-based page number outside `[1, page_count]`.
    pub fn check_page(&self, page: u32) -> Result<()> {
        let count = self.page_count();
        if page == 0 || page > count {
            return Err(Error::page_out_of_range(page, count));
        }
        Ok(())
    }

    /// Object id of a 1-based page number.
    pub fn page_id(&self, page: u32) -> Result<ObjectId> {
        let pages = self.inner.get_pages();
        pages
            .get(&page)
            .copied()
            .ok_or_else(|| Error::page_out_of_range(page, pages.len() as u32))
    }

    /// Look up an inheritable page attribute (`Resources`, `MediaBox`,
    /// `CropBox`, `Rotate`), walking up the page tree. References are
    /// resolved.
    pub fn inherited_attribute(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut current = Some(page_id);
        let mut depth = 0;

        while let Some(id) = current {
            if depth > MAX_TREE_DEPTH {
                log::warn!("Page tree deeper than {} levels, giving up", MAX_TREE_DEPTH);
                return None;
            }
            let dict = self.inner.get_dictionary(id).ok()?;
            if let Ok(value) = dict.get(key) {
                return self.resolve(value);
            }
            current = dict.get(b"Parent").and_then(Object::as_reference).ok();
            depth += 1;
        }

        None
    }

    /// Follow a reference to its object; direct objects are returned as is.
    pub fn resolve<'a>(&'a self, object: &'a Object) -> Option<&'a Object> {
        match object {
            Object::Reference(id) => self.inner.get_object(*id).ok(),
            other => Some(other),
        }
    }

    /// MediaBox of a page, Letter when missing or malformed.
    pub fn media_box(&self, page_id: ObjectId) -> Rect {
        let parsed = self
            .inherited_attribute(page_id, b"MediaBox")
            .and_then(|obj| obj.as_array().ok())
            .filter(|arr| arr.len() == 4)
            .and_then(|arr| {
                let mut values = [0.0f32; 4];
                for (slot, item) in values.iter_mut().zip(arr.iter()) {
                    *slot = number(self.resolve(item)?)?;
                }
                Some(values)
            });

        match parsed {
            Some(b) => Rect::from_box(b),
            None => {
                log::debug!("Page {:?} has no usable MediaBox, assuming Letter", page_id);
                Rect::from_box(DEFAULT_MEDIA_BOX)
            },
        }
    }

    /// Effective rotation of a page, normalized to `[0, 360)`.
    pub fn rotation(&self, page_id: ObjectId) -> i64 {
        self.inherited_attribute(page_id, b"Rotate")
            .and_then(|obj| obj.as_i64().ok())
            .map(|r| r.rem_euclid(360))
            .unwrap_or(0)
    }

    /// Coordinate frame of a 1-based page.
    pub fn geometry(&self, page: u32) -> Result<PageGeometry> {
        let page_id = self.page_id(page)?;
        Ok(PageGeometry::new(self.media_box(page_id)))
    }

    /// Text of a 1-based page as extracted by the object model.
    pub fn page_text(&self, page: u32) -> Result<String> {
        self.check_page(page)?;
        Ok(self.inner.extract_text(&[page])?)
    }

    /// Info dictionary string entry.
    fn info_string(&self, key: &[u8]) -> Option<String> {
        let info = self.resolve(self.inner.trailer.get(b"Info").ok()?)?;
        match info.as_dict().ok()?.get(key).ok()? {
            Object::String(bytes, _) => Some(decode_text_string(bytes)),
            _ => None,
        }
    }

    /// Serializable overview of the document.
    pub fn summary(&self) -> DocumentSummary {
        let pages = self
            .inner
            .get_pages()
            .into_iter()
            .map(|(number, page_id)| {
                let media_box = self.media_box(page_id);
                PageInfo {
                    number,
                    width: media_box.width,
                    height: media_box.height,
                    rotation: self.rotation(page_id),
                }
            })
            .collect::<Vec<_>>();

        DocumentSummary {
            page_count: pages.len() as u32,
            version: self.inner.version.clone(),
            title: self.info_string(b"Title"),
            author: self.info_string(b"Author"),
            pages,
        }
    }

    /// Object id of the page tree root.
    pub fn pages_root(&self) -> Result<ObjectId> {
        let catalog_id = self
            .inner
            .trailer
            .get(b"Root")
            .and_then(Object::as_reference)
            .map_err(|_| Error::CorruptedDocument("trailer has no /Root reference".into()))?;
        self.inner
            .get_dictionary(catalog_id)?
            .get(b"Pages")
            .and_then(Object::as_reference)
            .map_err(|_| Error::CorruptedDocument("catalog has no /Pages reference".into()))
    }

    /// Replace the page tree with a flat list of pages under the root node.
    ///
    /// Intermediate `/Pages` nodes are dropped. Inheritable attributes are
    /// copied onto every page first so that flattening does not change how
    /// any page renders.
    pub fn set_page_order(&mut self, page_ids: &[ObjectId]) -> Result<()> {
        let root_id = self.pages_root()?;

        for &page_id in page_ids {
            self.materialize_inherited(page_id)?;
        }

        let root = self
            .inner
            .get_object_mut(root_id)
            .and_then(Object::as_dict_mut)?;
        root.set(
            "Kids",
            page_ids
                .iter()
                .map(|&id| Object::Reference(id))
                .collect::<Vec<_>>(),
        );
        root.set("Count", page_ids.len() as i64);

        for &page_id in page_ids {
            let page = self
                .inner
                .get_object_mut(page_id)
                .and_then(Object::as_dict_mut)?;
            page.set("Parent", root_id);
        }

        Ok(())
    }

    /// Append an already-present page object to the end of the page tree.
    pub fn append_page(&mut self, page_id: ObjectId) -> Result<()> {
        let root_id = self.pages_root()?;

        let root = self
            .inner
            .get_object_mut(root_id)
            .and_then(Object::as_dict_mut)?;
        let count = root.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
        match root.get_mut(b"Kids").and_then(Object::as_array_mut) {
            Ok(kids) => kids.push(Object::Reference(page_id)),
            Err(_) => root.set("Kids", vec![Object::Reference(page_id)]),
        }
        root.set("Count", count + 1);

        let page = self
            .inner
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)?;
        page.set("Parent", root_id);
        Ok(())
    }

    /// Copy inheritable attributes from ancestors onto the page itself.
    pub fn materialize_inherited(&mut self, page_id: ObjectId) -> Result<()> {
        let mut copied: Vec<(&'static str, Object)> = Vec::new();
        {
            let page = self.inner.get_dictionary(page_id)?;
            for key in INHERITABLE_KEYS {
                if page.has(key.as_bytes()) {
                    continue;
                }
                if let Some(value) = self.inherited_attribute(page_id, key.as_bytes()) {
                    copied.push((key, value.clone()));
                }
            }
        }

        if !copied.is_empty() {
            let page = self
                .inner
                .get_object_mut(page_id)
                .and_then(Object::as_dict_mut)?;
            for (key, value) in copied {
                page.set(key, value);
            }
        }
        Ok(())
    }

    /// Whether the original content of a page has been wrapped in q/Q.
    pub(crate) fn is_isolated(&self, page_id: ObjectId) -> bool {
        self.isolated_pages.contains(&page_id)
    }

    pub(crate) fn mark_isolated(&mut self, page_id: ObjectId) {
        self.isolated_pages.insert(page_id);
    }

    /// Serialize the document.
    ///
    /// The output buffer is reserved up front with `try_reserve`, so a
    /// document too large for the available memory surfaces as
    /// [`Error::ResourceExhausted`] instead of aborting the process.
    pub fn to_bytes(&mut self, stamp_producer: bool) -> Result<Vec<u8>> {
        if stamp_producer {
            self.stamp_info()?;
        }

        let estimate = self
            .inner
            .objects
            .values()
            .map(|obj| match obj {
                Object::Stream(stream) => stream.content.len() + 128,
                _ => 64,
            })
            .sum::<usize>();

        let mut buf = Vec::new();
        buf.try_reserve(estimate)?;
        self.inner.save_to(&mut buf)?;

        log::debug!("Serialized document {} ({} bytes)", self.id, buf.len());
        Ok(buf)
    }

    /// Write `/Producer` and `/ModDate` into the Info dictionary.
    fn stamp_info(&mut self) -> Result<()> {
        let now = chrono::Utc::now().format("D:%Y%m%d%H%M%SZ").to_string();
        let producer = Object::String(PRODUCER.as_bytes().to_vec(), StringFormat::Literal);
        let mod_date = Object::String(now.into_bytes(), StringFormat::Literal);

        let info_ref = self
            .inner
            .trailer
            .get(b"Info")
            .and_then(Object::as_reference)
            .ok();

        match info_ref {
            Some(id) => {
                if let Ok(info) = self.inner.get_object_mut(id).and_then(Object::as_dict_mut) {
                    info.set("Producer", producer);
                    info.set("ModDate", mod_date);
                    return Ok(());
                }
                log::warn!("Info entry of document {} is not a dictionary, replacing", self.id);
            },
            None => {
                if let Ok(Object::Dictionary(info)) = self.inner.trailer.get_mut(b"Info") {
                    info.set("Producer", producer);
                    info.set("ModDate", mod_date);
                    return Ok(());
                }
            },
        }

        let mut info = Dictionary::new();
        info.set("Producer", producer);
        info.set("ModDate", mod_date);
        let info_id = self.inner.add_object(info);
        self.inner.trailer.set("Info", info_id);
        Ok(())
    }
}

impl Drop for PdfDocument {
    fn drop(&mut self) {
        log::debug!("Closed document {}", self.id);
    }
}

/// Numeric value of an Integer or Real object.
pub(crate) fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(f) => Some(*f),
        _ => None,
    }
}

/// Decode a PDF text string (UTF-16BE with BOM, otherwise byte-per-char).
fn decode_text_string(bytes: &[u8]) -> String {
    if bytes.starts_with(&[0xFE, 0xFF]) {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::error::ErrorKind;
    use crate::test_support::{sample_pdf, sample_pdf_with};

    #[test]
    fn test_load_counts_pages() {
        let doc = PdfDocument::from_bytes(&sample_pdf(3)).unwrap();
        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.page_ids().len(), 3);
    }

    #[test]
    fn test_load_rejects_too_many_pages() {
        let config = EngineConfig::new().with_max_page_count(2);
        let validator = DocumentValidator::new(&config);
        let err = PdfDocument::load(&sample_pdf(3), "application/pdf", &validator).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_garbage_is_corrupted() {
        let err = PdfDocument::from_bytes(b"%PDF-1.7\nthis is not a pdf").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptedDocument);
    }

    #[test]
    fn test_page_id_bounds() {
        let doc = PdfDocument::from_bytes(&sample_pdf(2)).unwrap();
        assert!(doc.page_id(1).is_ok());
        assert!(doc.page_id(2).is_ok());
        assert_eq!(doc.page_id(0).unwrap_err().kind(), ErrorKind::InvalidInput);
        assert_eq!(doc.page_id(3).unwrap_err().kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_inherited_media_box_and_rotation() {
        // sample_pdf puts MediaBox on the page tree root only
        let doc = PdfDocument::from_bytes(&sample_pdf_with(1, 595.0, 842.0)).unwrap();
        let page_id = doc.page_id(1).unwrap();
        let media_box = doc.media_box(page_id);
        assert_eq!(media_box.width, 595.0);
        assert_eq!(media_box.height, 842.0);
        assert_eq!(doc.rotation(page_id), 0);
    }

    #[test]
    fn test_page_text() {
        let doc = PdfDocument::from_bytes(&sample_pdf(2)).unwrap();
        assert!(doc.page_text(2).unwrap().contains("Page 2"));
    }

    #[test]
    fn test_summary() {
        let doc = PdfDocument::from_bytes(&sample_pdf(2)).unwrap();
        let summary = doc.summary();
        assert_eq!(summary.page_count, 2);
        assert_eq!(summary.pages[1].number, 2);
        assert_eq!(summary.pages[0].width, 612.0);
        assert_eq!(summary.title.as_deref(), Some("Sample"));
    }

    #[test]
    fn test_empty_document_round_trip() {
        let mut doc = PdfDocument::new_empty("1.7");
        assert_eq!(doc.page_count(), 0);
        let bytes = doc.to_bytes(false).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));
    }

    #[test]
    fn test_stamp_producer() {
        let mut doc = PdfDocument::from_bytes(&sample_pdf(1)).unwrap();
        let bytes = doc.to_bytes(true).unwrap();
        let reloaded = PdfDocument::from_bytes(&bytes).unwrap();
        assert_eq!(reloaded.info_string(b"Producer").as_deref(), Some(PRODUCER));
        assert_eq!(reloaded.info_string(b"Title").as_deref(), Some("Sample"));
    }

    #[test]
    fn test_decode_text_string() {
        assert_eq!(decode_text_string(b"Plain"), "Plain");
        assert_eq!(decode_text_string(&[0xFE, 0xFF, 0x00, 0x41, 0x00, 0xE9]), "Aé");
    }
}
