//! Page tree operations: delete, rotate, reorder, extract, split and merge.
//!
//! Operations that take page lists validate every index before touching the
//! document, so a bad index never leaves a half-modified document behind.
//! Rotation is the exception: bad entries are skipped and the rest applied.

use super::import::PageImporter;
use crate::document::PdfDocument;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::BTreeSet;

/// A requested rotation of one page.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Rotation {
    /// 1-based page number (unchecked)
    pub page: i64,
    /// Degrees to add to the current rotation; must be a multiple of 90
    pub degrees: f64,
}

impl Rotation {
    /// Create a rotation request.
    pub fn new(page: i64, degrees: f64) -> Self {
        Self { page, degrees }
    }
}

/// Remove pages from a document.
///
/// Duplicate page numbers are ignored. Fails without modifying the document
/// when the list is empty, any page is out of range, or every page would be
/// removed.
pub fn delete_pages(doc: &mut PdfDocument, pages: &[u32]) -> Result<()> {
    if pages.is_empty() {
        return Err(Error::invalid("no pages given to delete"));
    }
    for &page in pages {
        doc.check_page(page)?;
    }

    let unique: BTreeSet<u32> = pages.iter().copied().collect();
    if unique.len() as u32 >= doc.page_count() {
        return Err(Error::invalid("cannot delete every page of the document"));
    }

    let mut remaining = doc.page_ids();
    // Highest first so the lower indices stay valid while removing.
    for &page in unique.iter().rev() {
        remaining.remove((page - 1) as usize);
        log::debug!("Deleted page {} of {}", page, doc.id());
    }

    doc.set_page_order(&remaining)?;
    doc.inner_mut().prune_objects();

    log::info!("Deleted {} page(s), {} remain", unique.len(), remaining.len());
    Ok(())
}

/// Add rotations to pages.
///
/// Each entry is added to the page's current rotation (inherited values
/// included) and the sum is normalized to `[0, 360)`. Entries with an
/// out-of-range page or a value that is not a multiple of 90 are logged and
/// skipped. Returns the number of rotations applied.
pub fn rotate_pages(doc: &mut PdfDocument, rotations: &[Rotation]) -> Result<usize> {
    let page_count = doc.page_count();
    let mut applied = 0;

    for rotation in rotations {
        if rotation.page < 1 || rotation.page > page_count as i64 {
            log::warn!(
                "Skipping rotation of page {}: document has {} pages",
                rotation.page,
                page_count
            );
            continue;
        }
        if !rotation.degrees.is_finite() || rotation.degrees % 90.0 != 0.0 {
            log::warn!(
                "Skipping rotation of page {}: {} is not a multiple of 90",
                rotation.page,
                rotation.degrees
            );
            continue;
        }

        let page_id = doc.page_id(rotation.page as u32)?;
        let current = doc.rotation(page_id);
        // Reduce before the integer cast: values beyond i64 range saturate.
        let delta = rotation.degrees.rem_euclid(360.0) as i64;
        let updated = (current + delta).rem_euclid(360);

        let page = doc
            .inner_mut()
            .get_object_mut(page_id)
            .and_then(lopdf::Object::as_dict_mut)?;
        page.set("Rotate", updated);
        applied += 1;

        log::debug!("Rotated page {} from {} to {}", rotation.page, current, updated);
    }

    log::info!("Applied {} of {} rotation(s)", applied, rotations.len());
    Ok(applied)
}

/// Parse a rotation request.
///
/// Accepts either an object mapping page numbers to degrees
/// (`{"1": 90, "3": -90}`) or an array of `{"page": 1, "degrees": 90}`
/// entries. Numbers may also be given as numeric strings. Anything that is
/// not a number is rejected.
///
/// # Examples
///
/// ```
/// use pdf_pagekit::editor::{parse_rotations, Rotation};
///
/// let rotations = parse_rotations(r#"{"1": 90, "2": 45}"#).unwrap();
/// assert_eq!(rotations, vec![Rotation::new(1, 90.0), Rotation::new(2, 45.0)]);
///
/// assert!(parse_rotations(r#"{"1": "sideways"}"#).is_err());
/// ```
pub fn parse_rotations(json: &str) -> Result<Vec<Rotation>> {
    let value: serde_json::Value = serde_json::from_str(json)?;

    match value {
        serde_json::Value::Object(map) => map
            .iter()
            .map(|(page, degrees)| {
                let page = page
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| malformed_rotation(page))?;
                Ok(Rotation::new(page, numeric(degrees)?))
            })
            .collect(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(|item| {
                let field = |name: &str| {
                    item.get(name)
                        .ok_or_else(|| Error::invalid(format!("rotation entry without '{}'", name)))
                        .and_then(numeric)
                };
                let page = field("page")?;
                if page.fract() != 0.0 {
                    return Err(malformed_rotation(&page.to_string()));
                }
                Ok(Rotation::new(page as i64, field("degrees")?))
            })
            .collect(),
        _ => Err(Error::invalid(
            "rotations must be an object or an array of {page, degrees}",
        )),
    }
}

fn numeric(value: &serde_json::Value) -> Result<f64> {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|n| n.is_finite())
        .ok_or_else(|| malformed_rotation(&value.to_string()))
}

fn malformed_rotation(value: &str) -> Error {
    Error::invalid(format!("malformed numeric rotation: {}", value))
}

/// Reorder pages so that output page `i` is input page `order[i]`.
///
/// `order` must name every page exactly once.
pub fn reorder_pages(doc: &mut PdfDocument, order: &[u32]) -> Result<()> {
    let page_count = doc.page_count();
    if order.len() != page_count as usize {
        return Err(Error::invalid(format!(
            "page order lists {} pages, document has {}",
            order.len(),
            page_count
        )));
    }
    let mut seen = BTreeSet::new();
    for &page in order {
        doc.check_page(page)?;
        if !seen.insert(page) {
            return Err(Error::invalid(format!("page {} appears twice in the order", page)));
        }
    }

    let ids = doc.page_ids();
    let reordered: Vec<_> = order.iter().map(|&page| ids[(page - 1) as usize]).collect();
    doc.set_page_order(&reordered)?;

    log::info!("Reordered {} page(s)", page_count);
    Ok(())
}

/// Build a new document from the selected pages, in the given order.
///
/// Duplicates are allowed and produce independent copies.
pub fn extract_pages(doc: &PdfDocument, selected: &[u32]) -> Result<PdfDocument> {
    if selected.is_empty() {
        return Err(Error::invalid("no pages selected for extraction"));
    }
    for &page in selected {
        doc.check_page(page)?;
    }

    let mut output = PdfDocument::new_empty(doc.version());
    let mut importer = PageImporter::new(doc);
    for &page in selected {
        importer.import_page(&mut output, page)?;
    }

    log::info!("Extracted {} page(s) from {}", selected.len(), doc.id());
    Ok(output)
}

/// Page ranges produced by splitting before each split point.
///
/// Returned ranges are `[start, end)` with 1-based bounds and cover every
/// page exactly once.
pub fn split_ranges(page_count: u32, split_points: &[u32]) -> Result<Vec<(u32, u32)>> {
    for &point in split_points {
        if point == 0 || point > page_count {
            return Err(Error::invalid(format!(
                "Split point {} out of range (document has {} pages)",
                point, page_count
            )));
        }
    }

    let mut bounds: BTreeSet<u32> = split_points.iter().copied().collect();
    bounds.insert(1);
    bounds.insert(page_count + 1);

    let bounds: Vec<u32> = bounds.into_iter().collect();
    Ok(bounds
        .windows(2)
        .map(|pair| (pair[0], pair[1]))
        .filter(|(start, end)| start < end)
        .collect())
}

/// Split a document into consecutive parts, starting a new part at each
/// split point.
///
/// Parts are named `part_1.pdf`, `part_2.pdf`, ... in page order.
pub fn split_pdf(doc: &PdfDocument, split_points: &[u32]) -> Result<IndexMap<String, PdfDocument>> {
    let ranges = split_ranges(doc.page_count(), split_points)?;

    let mut parts = IndexMap::with_capacity(ranges.len());
    for (index, (start, end)) in ranges.into_iter().enumerate() {
        let mut part = PdfDocument::new_empty(doc.version());
        let mut importer = PageImporter::new(doc);
        for page in start..end {
            importer.import_page(&mut part, page)?;
        }
        log::debug!("Part {} covers pages {}..{}", index + 1, start, end - 1);
        parts.insert(format!("part_{}.pdf", index + 1), part);
    }

    log::info!("Split {} into {} part(s)", doc.id(), parts.len());
    Ok(parts)
}

/// Concatenate documents in list order into a new document.
pub fn merge_pdfs(docs: &[PdfDocument]) -> Result<PdfDocument> {
    let first = docs
        .first()
        .ok_or_else(|| Error::invalid("at least one document is required to merge"))?;

    let mut output = PdfDocument::new_empty(first.version());
    for source in docs {
        let mut importer = PageImporter::new(source);
        for page in 1..=source.page_count() {
            importer.import_page(&mut output, page)?;
        }
    }

    log::info!(
        "Merged {} document(s) into {} page(s)",
        docs.len(),
        output.page_count()
    );
    Ok(output)
}
