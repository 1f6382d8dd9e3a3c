use lift_core::TextRange;
use lift_syntax::{SyntaxNode, SyntaxToken};
use serde::{Deserialize, Serialize};
use text_size::TextSize;

/// A user selection: `length` bytes starting at `start`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub length: usize,
}

impl Span {
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    pub fn from_bounds(start: usize, end: usize) -> Self {
        Self {
            start,
            length: end.saturating_sub(start),
        }
    }

    pub fn end(self) -> usize {
        self.start.saturating_add(self.length)
    }

    pub fn range(self) -> TextRange {
        TextRange::new(self.start, self.end())
    }
}

impl From<TextRange> for Span {
    fn from(range: TextRange) -> Self {
        Span::from_bounds(range.start, range.end)
    }
}

/// The first and last non-trivia tokens inside `span`.
///
/// Whitespace and comments at either edge of the selection are skipped. Returns
/// `None` when no significant token lies inside the span.
pub fn locate_boundary_tokens(
    root: &SyntaxNode,
    span: TextRange,
) -> Option<(SyntaxToken, SyntaxToken)> {
    let text_len = usize::from(root.text_range().end());
    if span.is_empty() || span.end > text_len {
        return None;
    }

    let left = left_boundary(root, span)?;
    let right = right_boundary(root, span)?;

    let left_range: TextRange = left.text_range().into();
    let right_range: TextRange = right.text_range().into();
    if left_range.start > right_range.start {
        return None;
    }
    Some((left, right))
}

fn left_boundary(root: &SyntaxNode, span: TextRange) -> Option<SyntaxToken> {
    let mut token = root
        .token_at_offset(TextSize::from(span.start as u32))
        .right_biased()?;
    if usize::from(token.text_range().start()) < span.start {
        token = token.next_token()?;
    }
    while token.kind().is_trivia() {
        token = token.next_token()?;
    }
    let start = usize::from(token.text_range().start());
    let end = usize::from(token.text_range().end());
    (start < span.end && end <= span.end).then_some(token)
}

fn right_boundary(root: &SyntaxNode, span: TextRange) -> Option<SyntaxToken> {
    let mut token = root
        .token_at_offset(TextSize::from(span.end as u32))
        .left_biased()?;
    if usize::from(token.text_range().end()) > span.end {
        token = token.prev_token()?;
    }
    while token.kind().is_trivia() {
        token = token.prev_token()?;
    }
    let start = usize::from(token.text_range().start());
    (start >= span.start).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lift_syntax::parse_script;

    fn boundaries(text: &str, start: usize, end: usize) -> Option<(String, String)> {
        let root = parse_script(text).syntax();
        locate_boundary_tokens(&root, TextRange::new(start, end))
            .map(|(l, r)| (l.text().to_string(), r.text().to_string()))
    }

    #[test]
    fn skips_surrounding_trivia() {
        let text = "  x = 1; /* c */ y = 2;  ";
        assert_eq!(
            boundaries(text, 0, text.len()),
            Some(("x".to_string(), ";".to_string()))
        );
    }

    #[test]
    fn partial_tokens_are_excluded() {
        let text = "alpha + beta";
        // "pha + be"
        assert_eq!(
            boundaries(text, 2, 10),
            Some(("+".to_string(), "+".to_string()))
        );
    }

    #[test]
    fn whitespace_only_selection_has_no_boundaries() {
        assert_eq!(boundaries("a;   b;", 2, 5), None);
        assert_eq!(boundaries("a;", 1, 1), None);
        assert_eq!(boundaries("a;", 0, 10), None);
    }

    #[test]
    fn oversized_span_is_rejected() {
        let span = Span::new(usize::MAX - 1, 10);
        assert_eq!(span.end(), usize::MAX);
        let root = lift_syntax::parse_script("a;").syntax();
        assert_eq!(locate_boundary_tokens(&root, span.range()), None);
    }
}
