use similar::TextDiff;

use crate::edit::{apply_text_edits, EditError, TextEdit};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractionPreview {
    pub original: String,
    pub modified: String,
    pub unified_diff: String,
    pub edit_count: usize,
}

/// Applies `edits` to `original` and renders the change as a unified diff.
pub fn preview_edits(original: &str, edits: &[TextEdit]) -> Result<ExtractionPreview, EditError> {
    let modified = apply_text_edits(original, edits)?;
    let file = edits.first().map(|e| e.file.as_str()).unwrap_or("file");

    let diff = TextDiff::from_lines(original, &modified);
    let unified_diff = diff
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{file}"), &format!("b/{file}"))
        .to_string();

    Ok(ExtractionPreview {
        original: original.to_string(),
        modified,
        unified_diff,
        edit_count: edits.len(),
    })
}
