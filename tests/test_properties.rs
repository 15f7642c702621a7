//! Property tests for page selection and split/merge.

mod common;

use common::{create_test_pdf, page_count, page_texts};
use pdf_pagekit::api::{DocumentInput, PdfEngine};
use pdf_pagekit::color::Color;
use pdf_pagekit::editor::split_ranges;
use proptest::prelude::*;

mod proptest_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn extract_preserves_selection(selection in prop::collection::vec(1u32..=6, 1..8)) {
            let bytes = create_test_pdf(6);
            let out = PdfEngine::default()
                .extract_pages(DocumentInput::pdf(&bytes), &selection)
                .unwrap();

            let expected: Vec<String> = selection.iter().map(|n| format!("Page {}", n)).collect();
            prop_assert_eq!(page_texts(&out), expected);
        }

        #[test]
        fn split_then_merge_preserves_page_count(
            pages in 1u32..=8,
            points in prop::collection::vec(1u32..=8, 0..5),
        ) {
            let points: Vec<u32> = points.into_iter().filter(|&p| p <= pages).collect();
            let bytes = create_test_pdf(pages);
            let engine = PdfEngine::default();

            let parts = engine.split_pdf(DocumentInput::pdf(&bytes), &points).unwrap();
            let inputs: Vec<DocumentInput<'_>> =
                parts.values().map(|part| DocumentInput::pdf(part)).collect();
            let merged = engine.merge_pdfs(&inputs).unwrap();

            prop_assert_eq!(page_count(&merged), pages);
        }
    }

    proptest! {
        #[test]
        fn split_ranges_cover_every_page(
            pages in 1u32..200,
            points in prop::collection::vec(1u32..200, 0..20),
        ) {
            let points: Vec<u32> = points.into_iter().filter(|&p| p <= pages).collect();
            let ranges = split_ranges(pages, &points).unwrap();

            prop_assert_eq!(ranges.first().map(|r| r.0), Some(1));
            prop_assert_eq!(ranges.last().map(|r| r.1), Some(pages + 1));
            for pair in ranges.windows(2) {
                prop_assert_eq!(pair[0].1, pair[1].0);
            }
            prop_assert!(ranges.iter().all(|(start, end)| start < end));
        }

        #[test]
        fn short_and_long_hex_agree(r in 0u8..16, g in 0u8..16, b in 0u8..16) {
            let short = format!("#{:X}{:X}{:X}", r, g, b);
            let long = format!("#{:X}{:X}{:X}{:X}{:X}{:X}", r, r, g, g, b, b);
            prop_assert_eq!(Color::resolve(&short), Color::resolve(&long));
        }

        #[test]
        fn color_resolution_never_fails(input in ".*") {
            let color = Color::resolve(&input);
            prop_assert!((0.0..=1.0).contains(&color.r));
            prop_assert!((0.0..=1.0).contains(&color.g));
            prop_assert!((0.0..=1.0).contains(&color.b));
        }
    }
}
