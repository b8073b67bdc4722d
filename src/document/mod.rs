//! Normalized document model: headings and positioned text spans
//!
//! Raw outlines come from an external layout tool and are loosely typed.
//! Everything is normalized here, once, so the ranking stages only ever see
//! a single `Heading` and `TextSpan` shape.

mod extractor;

pub use extractor::{ExtractError, JsonOutlineExtractor, OutlineExtractor};

use ahash::{HashMap, HashMapExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Level assigned when the extractor omits a level or emits one we can't read
pub const DEFAULT_LEVEL: u32 = 1;

/// A candidate section title extracted from a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    /// Section title text
    pub text: String,
    /// Heading depth (1 = top level)
    pub level: u32,
    /// Page the heading appears on
    pub page: u32,
    /// Identifier of the owning document (its file name)
    pub source: String,
}

impl Heading {
    pub fn new(text: impl Into<String>, level: u32, page: u32, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level,
            page,
            source: source.into(),
        }
    }

    /// Number of whitespace-delimited tokens in the title
    pub fn token_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// A fragment of body text positioned on a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    pub text: String,
    pub page: u32,
    pub x: f64,
    pub y: f64,
}

impl TextSpan {
    pub fn new(text: impl Into<String>, page: u32, x: f64, y: f64) -> Self {
        Self {
            text: text.into(),
            page,
            x,
            y,
        }
    }
}

/// Document identifier -> every span extracted from that document
pub type SpanMap = HashMap<String, Vec<TextSpan>>;

/// Create an empty span map
pub fn new_span_map() -> SpanMap {
    SpanMap::new()
}

/// Headings and spans for one document
#[derive(Debug, Clone, Default)]
pub struct Outline {
    pub headings: Vec<Heading>,
    pub spans: Vec<TextSpan>,
}

/// Outline as written by the layout tool
///
/// Every field is read as a loose JSON value so one odd entry can't make the
/// whole document unreadable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOutline {
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub outline: Vec<RawHeading>,
    #[serde(default)]
    pub spans: Vec<RawSpan>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHeading {
    #[serde(default)]
    pub text: Option<Value>,
    #[serde(default)]
    pub section_title: Option<Value>,
    #[serde(default)]
    pub level: Option<Value>,
    #[serde(default)]
    pub page: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSpan {
    #[serde(default)]
    pub text: Option<Value>,
    #[serde(default)]
    pub page: Option<Value>,
    #[serde(default)]
    pub x: Option<Value>,
    #[serde(default)]
    pub y: Option<Value>,
}

impl Outline {
    /// Normalize a raw outline, tagging every heading with `document_id`
    ///
    /// Headings and spans without a usable page number are dropped, since
    /// they could never be located again.
    pub fn from_raw(raw: RawOutline, document_id: &str) -> Self {
        let mut headings = Vec::with_capacity(raw.outline.len());
        for entry in raw.outline {
            let text = entry
                .text
                .as_ref()
                .and_then(parse_text)
                .filter(|t| !t.is_empty())
                .or_else(|| entry.section_title.as_ref().and_then(parse_text))
                .unwrap_or_default();

            let Some(page) = entry.page.as_ref().and_then(parse_page) else {
                tracing::warn!(
                    "Dropping heading '{}' from {}: missing or invalid page",
                    text,
                    document_id
                );
                continue;
            };

            let level = entry.level.as_ref().map_or(DEFAULT_LEVEL, parse_level);
            headings.push(Heading::new(text, level, page, document_id));
        }

        let total_spans = raw.spans.len();
        let spans: Vec<TextSpan> = raw
            .spans
            .into_iter()
            .filter_map(|span| {
                let page = span.page.as_ref().and_then(parse_page)?;
                Some(TextSpan::new(
                    span.text.as_ref().and_then(parse_text).unwrap_or_default(),
                    page,
                    span.x.as_ref().map_or(0.0, parse_coordinate),
                    span.y.as_ref().map_or(0.0, parse_coordinate),
                ))
            })
            .collect();

        if spans.len() < total_spans {
            tracing::debug!(
                "Dropped {} spans without a page from {}",
                total_spans - spans.len(),
                document_id
            );
        }

        Self { headings, spans }
    }
}

/// Parse a heading level, falling back to [`DEFAULT_LEVEL`]
///
/// Integers are taken as-is, floats are truncated and numeric strings are
/// parsed. Levels too deep for a `u32` saturate so they stay too deep to be
/// admitted. Anything else (including negative values and labels such as
/// `"H1"`) falls back to the default rather than excluding the heading.
pub fn parse_level(value: &Value) -> u32 {
    let parsed: Option<i128> = match value {
        Value::Number(n) => n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from))
            .or_else(|| n.as_f64().map(|f| f.trunc() as i128)),
        Value::String(s) => s.trim().parse::<i128>().ok(),
        _ => None,
    };

    match parsed {
        Some(level) if level >= 0 => u32::try_from(level).unwrap_or(u32::MAX),
        _ => DEFAULT_LEVEL,
    }
}

/// Text of a heading or span; numbers and booleans keep their JSON spelling
pub fn parse_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Span coordinate; 0 when missing or not numeric
pub fn parse_coordinate(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite()).unwrap_or(0.0)
}

/// Parse a page number; `None` when it is not a non-negative integer
pub fn parse_page(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => match n.as_u64() {
            Some(page) => u32::try_from(page).ok(),
            None => n
                .as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u32::MAX as f64)
                .map(|f| f as u32),
        },
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_level_variants() {
        assert_eq!(parse_level(&json!(2)), 2);
        assert_eq!(parse_level(&json!(3.7)), 3);
        assert_eq!(parse_level(&json!(" 2 ")), 2);
        assert_eq!(parse_level(&json!("H3")), DEFAULT_LEVEL);
        assert_eq!(parse_level(&json!(null)), DEFAULT_LEVEL);
        assert_eq!(parse_level(&json!(-4)), DEFAULT_LEVEL);
        assert_eq!(parse_level(&json!([1])), DEFAULT_LEVEL);
    }

    #[test]
    fn test_parse_level_overflow_stays_deep() {
        assert_eq!(parse_level(&json!(5_000_000_000u64)), u32::MAX);
        assert_eq!(parse_level(&json!(u64::MAX)), u32::MAX);
        assert_eq!(parse_level(&json!(1e20)), u32::MAX);
        assert_eq!(parse_level(&json!("5000000000")), u32::MAX);
        assert_eq!(parse_level(&json!(-1e20)), DEFAULT_LEVEL);

        let heading = Heading::new(
            "Appendix With Enormous Nesting Depth",
            parse_level(&json!(5_000_000_000u64)),
            1,
            "a.pdf",
        );
        assert!(!crate::ranking::admit(&heading));
    }

    #[test]
    fn test_loose_span_fields_keep_document() {
        let raw: RawOutline = serde_json::from_value(json!({
            "title": 2024,
            "outline": [
                {"text": "Annual Report Summary And Outlook", "level": 1, "page": 1},
                {"text": 1999, "section_title": "ignored", "page": 2}
            ],
            "spans": [
                {"text": 42, "page": 1, "x": "12.5", "y": "top"},
                {"text": ["bad"], "page": 1, "x": 3, "y": null},
                {"text": "Body text", "page": 1, "x": 1.0, "y": 2.0}
            ]
        }))
        .unwrap();

        let outline = Outline::from_raw(raw, "report.pdf");

        assert_eq!(outline.headings.len(), 2);
        assert_eq!(outline.headings[1].text, "1999");
        assert_eq!(outline.spans.len(), 3);
        assert_eq!(outline.spans[0], TextSpan::new("42", 1, 12.5, 0.0));
        assert_eq!(outline.spans[1], TextSpan::new("", 1, 3.0, 0.0));
        assert_eq!(outline.spans[2], TextSpan::new("Body text", 1, 1.0, 2.0));
    }

    #[test]
    fn test_parse_page_variants() {
        assert_eq!(parse_page(&json!(0)), Some(0));
        assert_eq!(parse_page(&json!(12)), Some(12));
        assert_eq!(parse_page(&json!("7")), Some(7));
        assert_eq!(parse_page(&json!(4.0)), Some(4));
        assert_eq!(parse_page(&json!(4.5)), None);
        assert_eq!(parse_page(&json!(-1)), None);
        assert_eq!(parse_page(&json!("seven")), None);
    }

    #[test]
    fn test_from_raw_normalizes_titles_and_levels() {
        let raw: RawOutline = serde_json::from_value(json!({
            "title": "Guide",
            "outline": [
                {"text": "Getting Around the City Center", "level": 1, "page": 2},
                {"section_title": "Where to Eat Near the Coast", "level": "H2", "page": 3},
                {"text": "", "section_title": "Fallback Title Used Here Instead", "page": 4},
                {"text": "No Page Heading Is Dropped", "level": 1}
            ],
            "spans": [
                {"text": "Body", "page": 2, "x": 10.0, "y": 20.0},
                {"text": "Loose"},
                {"text": "Origin", "page": 3}
            ]
        }))
        .unwrap();

        let outline = Outline::from_raw(raw, "guide.pdf");

        assert_eq!(outline.headings.len(), 3);
        assert_eq!(outline.headings[0].text, "Getting Around the City Center");
        assert_eq!(outline.headings[0].source, "guide.pdf");
        assert_eq!(outline.headings[1].text, "Where to Eat Near the Coast");
        assert_eq!(outline.headings[1].level, DEFAULT_LEVEL);
        assert_eq!(outline.headings[2].text, "Fallback Title Used Here Instead");
        assert_eq!(outline.headings[2].level, DEFAULT_LEVEL);

        assert_eq!(outline.spans.len(), 2);
        assert_eq!(outline.spans[1], TextSpan::new("Origin", 3, 0.0, 0.0));
    }

    #[test]
    fn test_token_count() {
        let heading = Heading::new("  Introduction to   Data Systems ", 1, 0, "a.pdf");
        assert_eq!(heading.token_count(), 4);
    }
}
