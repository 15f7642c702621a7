//! Shared fixtures for integration tests.
#![allow(dead_code)]

use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use pdf_pagekit::PdfDocument;

/// Build a Letter-sized document whose page `n` shows "Page n".
pub fn create_test_pdf(pages: u32) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
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
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
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
                Object::Integer(612),
                Object::Integer(792),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(b"Test Document".to_vec(), StringFormat::Literal),
        "Author" => Object::String(b"Test Author".to_vec(), StringFormat::Literal),
    });
    doc.trailer.set("Info", info_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("Failed to build test PDF");
    buf
}

/// Trimmed text of every page of serialized output.
pub fn page_texts(bytes: &[u8]) -> Vec<String> {
    let doc = PdfDocument::from_bytes(bytes).expect("output should parse");
    (1..=doc.page_count())
        .map(|page| doc.page_text(page).unwrap().trim().to_string())
        .collect()
}

/// Page count of serialized output.
pub fn page_count(bytes: &[u8]) -> u32 {
    PdfDocument::from_bytes(bytes)
        .expect("output should parse")
        .page_count()
}
