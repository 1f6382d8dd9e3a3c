//! Refactoring entrypoints for Lift.
//!
//! Today this crate exposes Extract Function (`extract_function`): a selected
//! expression or statement run becomes a new function in one of the enclosing
//! scopes, and the selection is replaced by a call.
//!
//! Programs are queried through [`ExtractDatabase`]; [`ScriptDatabase`] is the
//! in-memory implementation over `lift-syntax` and `lift-resolve`.

mod db;
mod edit;
pub mod extract_function;
mod preview;
pub mod printer;

pub use db::{Declaration, ExtractDatabase, Reference, ScriptDatabase, SymbolId};
pub use edit::{apply_text_edits, EditError, TextEdit, WorkspaceEdit};
pub use extract_function::{
    collect_enclosing_scopes, compute_extraction, compute_extraction_with,
    compute_extraction_with_printer, get_range_to_extract, CodeAction, ExtractError,
    FlowAnalysis, NoMappingReason, RangeToExtract, Scope, Span,
};
pub use lift_core::{CancellationToken, Cancelled, FileId, TextRange};
pub use preview::{preview_edits, ExtractionPreview};
pub use printer::{ScriptPrinter, SourcePrinter};
