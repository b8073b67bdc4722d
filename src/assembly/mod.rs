//! Page text reconstruction from positioned spans
//!
//! Spans carry raw coordinates but no reading order. Sorting top-to-bottom,
//! then left-to-right, is exact for single-column pages and still yields a
//! usable string for complex layouts.

use std::cmp::Ordering;

use crate::document::{SpanMap, TextSpan};

/// Rebuild the text of one page of one document
///
/// Returns an empty string when the document has no spans or none of them
/// are on `page`. The result does not depend on the order spans were stored in.
pub fn assemble_page_text(span_map: &SpanMap, document_id: &str, page: u32) -> String {
    match span_map.get(document_id) {
        Some(spans) => assemble_spans(spans, page),
        None => String::new(),
    }
}

/// Join the spans of `page` in reading order, separated by single spaces
pub fn assemble_spans(spans: &[TextSpan], page: u32) -> String {
    let mut page_spans: Vec<&TextSpan> = spans.iter().filter(|s| s.page == page).collect();
    page_spans.sort_by(|a, b| reading_order(a, b));

    page_spans
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// y ascending, then x ascending; text breaks exact coordinate ties
fn reading_order(a: &TextSpan, b: &TextSpan) -> Ordering {
    a.y.total_cmp(&b.y)
        .then(a.x.total_cmp(&b.x))
        .then_with(|| a.text.cmp(&b.text))
}
