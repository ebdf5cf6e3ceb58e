/// Assert that a slide's XML contains a fragment
#[macro_export]
macro_rules! assert_slide_contains {
    ($pptx:expr, $n:expr, $fragment:expr) => {
        let xml = $pptx.slide($n);
        assert!(xml.contains($fragment), "Slide {} should contain '{}', but its XML was:\n{}", $n, $fragment, xml);
    };
}

/// Assert that a slide's XML does NOT contain a fragment
#[macro_export]
macro_rules! assert_slide_not_contains {
    ($pptx:expr, $n:expr, $fragment:expr) => {
        let xml = $pptx.slide($n);
        assert!(!xml.contains($fragment), "Slide {} should NOT contain '{}', but its XML was:\n{}", $n, $fragment, xml);
    };
}

/// Assert the number of pages in a PDF
#[macro_export]
macro_rules! assert_pdf_page_count {
    ($pdf:expr, $count:expr) => {
        assert_eq!($pdf.page_count(), $count, "Expected {} pages, got {}", $count, $pdf.page_count());
    };
}

/// Counts non-overlapping occurrences of `needle` in `haystack`.
pub fn occurrences(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}
