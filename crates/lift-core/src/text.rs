use serde::{Deserialize, Serialize};

/// Identifier for a workspace file.
///
/// Usually a path or URI string; Lift never interprets it.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FileId(pub String);

impl FileId {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A half-open text range `[start, end)` in UTF-8 byte offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start <= end, "invalid range: {start}..{end}");
        Self { start, end }
    }

    pub fn empty(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    pub fn contains(self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// `true` when `other` lies entirely within `self` (boundaries included).
    pub fn contains_range(self, other: TextRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn intersects(self, other: TextRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl From<text_size::TextRange> for TextRange {
    fn from(range: text_size::TextRange) -> Self {
        Self {
            start: u32::from(range.start()) as usize,
            end: u32::from(range.end()) as usize,
        }
    }
}

impl From<TextRange> for text_size::TextRange {
    fn from(range: TextRange) -> Self {
        text_size::TextRange::new(
            text_size::TextSize::from(range.start as u32),
            text_size::TextSize::from(range.end as u32),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containment_is_inclusive_at_both_ends() {
        let outer = TextRange::new(4, 10);
        assert!(outer.contains_range(TextRange::new(4, 10)));
        assert!(outer.contains_range(TextRange::new(5, 9)));
        assert!(!outer.contains_range(TextRange::new(3, 9)));
        assert!(!outer.contains_range(TextRange::new(5, 11)));
    }

    #[test]
    fn touching_ranges_do_not_intersect() {
        let a = TextRange::new(0, 3);
        let b = TextRange::new(3, 6);
        assert!(!a.intersects(b));
        assert!(a.intersects(TextRange::new(2, 4)));
    }

    #[test]
    fn converts_from_rowan_ranges() {
        let range = text_size::TextRange::new(2.into(), 7.into());
        assert_eq!(TextRange::from(range), TextRange::new(2, 7));
        assert_eq!(text_size::TextRange::from(TextRange::new(2, 7)), range);
    }

    #[test]
    fn file_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&FileId::new("/a.js")).unwrap();
        assert_eq!(json, "\"/a.js\"");
    }
}
