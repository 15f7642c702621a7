//! Fixture documents for unit tests.

use crate::document::PdfDocument;
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

/// A Letter-sized document whose page `n` shows the text "Page n".
pub(crate) fn sample_pdf(pages: u32) -> Vec<u8> {
    sample_pdf_with(pages, 612.0, 792.0)
}

/// Like [`sample_pdf`] with a custom page size. MediaBox and Resources live on
/// the page tree root, so every page inherits them.
pub(crate) fn sample_pdf_with(pages: u32, width: f32, height: f32) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids = Vec::new();
    for n in 1..=pages {
        let content = format!("BT\n/F1 12 Tf\n72 720 Td\n(Page {}) Tj\nET\n", n);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(pages as i64),
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(width),
                Object::Real(height),
            ],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(b"Sample".to_vec(), StringFormat::Literal),
    });
    doc.trailer.set("Info", info_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// Trimmed text of every page, in order.
pub(crate) fn page_texts(doc: &PdfDocument) -> Vec<String> {
    (1..=doc.page_count())
        .map(|page| doc.page_text(page).unwrap().trim().to_string())
        .collect()
}

/// Decoded content streams of a page, joined with newlines.
pub(crate) fn decoded_contents(doc: &PdfDocument, page: u32) -> String {
    let inner = doc.inner();
    let page_id = doc.page_id(page).unwrap();
    let contents = inner.get_dictionary(page_id).unwrap().get(b"Contents").unwrap();

    let ids: Vec<_> = match contents {
        Object::Reference(id) => match inner.get_object(*id).unwrap() {
            Object::Array(items) => items.iter().filter_map(|o| o.as_reference().ok()).collect(),
            _ => vec![*id],
        },
        Object::Array(items) => items.iter().filter_map(|o| o.as_reference().ok()).collect(),
        _ => Vec::new(),
    };

    ids.into_iter()
        .map(|id| {
            let stream = inner.get_object(id).and_then(Object::as_stream).unwrap();
            let bytes = if stream.dict.has(b"Filter") {
                stream.decompressed_content().unwrap()
            } else {
                stream.content.clone()
            };
            String::from_utf8_lossy(&bytes).trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
