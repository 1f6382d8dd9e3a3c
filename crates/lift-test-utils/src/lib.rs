//! Utilities shared by Lift tests.
//!
//! Fixture helpers understand two marker styles:
//! - `/*start*/` ... `/*end*/` around a single selection ([`extract_range`]);
//! - `[#|` ... `|]` for the user selection and `[$|` ... `|]` for the range the
//!   engine is expected to pick ([`extract_marked_ranges`]). Markers nest.

use std::collections::BTreeMap;
use std::sync::Once;

use lift_core::TextRange;

/// Name under which `[#| |]` markers are reported.
pub const SELECTION: &str = "selection";
/// Name under which `[$| |]` markers are reported.
pub const EXTRACTED: &str = "extracted";

/// Extracts a byte range selection from a fixture containing `/*start*/` and
/// `/*end*/` markers.
///
/// Returns the fixture with markers removed and the selection `TextRange`
/// pointing at the extracted region.
pub fn extract_range(fixture: &str) -> (String, TextRange) {
    let start_marker = "/*start*/";
    let end_marker = "/*end*/";

    let start = fixture
        .find(start_marker)
        .expect("fixture missing /*start*/ marker");
    let after_start = start + start_marker.len();
    let end = fixture
        .find(end_marker)
        .expect("fixture missing /*end*/ marker");
    assert!(end >= after_start, "/*end*/ must come after /*start*/");

    let mut text = String::with_capacity(fixture.len());
    text.push_str(&fixture[..start]);
    text.push_str(&fixture[after_start..end]);
    text.push_str(&fixture[end + end_marker.len()..]);

    // The end shrinks by the length of the start marker.
    let range = TextRange::new(start, end - start_marker.len());
    (text, range)
}

/// Strips `[#|`, `[$|` and `|]` markers, returning the clean text and each
/// marked range keyed by [`SELECTION`] / [`EXTRACTED`].
pub fn extract_marked_ranges(fixture: &str) -> (String, BTreeMap<String, TextRange>) {
    let mut text = String::with_capacity(fixture.len());
    let mut ranges = BTreeMap::new();
    let mut open: Vec<(&'static str, usize)> = Vec::new();

    let mut rest = fixture;
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("[#|") {
            open.push((SELECTION, text.len()));
            rest = after;
        } else if let Some(after) = rest.strip_prefix("[$|") {
            open.push((EXTRACTED, text.len()));
            rest = after;
        } else if let Some(after) = rest.strip_prefix("|]") {
            let (name, start) = open.pop().expect("`|]` without an open marker");
            let previous = ranges.insert(name.to_string(), TextRange::new(start, text.len()));
            assert!(previous.is_none(), "duplicate `{name}` marker");
            rest = after;
        } else {
            let ch = rest.chars().next().expect("non-empty");
            text.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
    }
    assert!(open.is_empty(), "unclosed marker in fixture");
    (text, ranges)
}

static TEST_TRACING: Once = Once::new();

/// Routes `tracing` output through the test harness' captured writer.
///
/// Honors `RUST_LOG`; silent by default.
pub fn init_test_tracing() {
    TEST_TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("off"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
        tracing::trace!("test tracing initialized");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_start_end_markers() {
        let (text, range) = extract_range("a; /*start*/b;/*end*/ c;");
        assert_eq!(text, "a; b; c;");
        assert_eq!(&text[range.start..range.end], "b;");
    }

    #[test]
    fn extracts_nested_markers() {
        let (text, ranges) = extract_marked_ranges("x; [#|[$|var a=1;|] |]y;");
        assert_eq!(text, "x; var a=1; y;");
        let selection = ranges[SELECTION];
        let extracted = ranges[EXTRACTED];
        assert_eq!(&text[selection.start..selection.end], "var a=1; ");
        assert_eq!(&text[extracted.start..extracted.end], "var a=1;");
    }

    #[test]
    fn selection_only() {
        let (text, ranges) = extract_marked_ranges("[#|(a && b|] && c)");
        assert_eq!(text, "(a && b && c)");
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[SELECTION], TextRange::new(0, 7));
    }
}
