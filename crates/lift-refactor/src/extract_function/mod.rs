//! Extract Function.
//!
//! Given a selection, the pipeline:
//! 1. maps the selection onto a syntactic unit ([`get_range_to_extract`]),
//!    rejecting partial nodes and jumps that would escape the unit;
//! 2. collects every scope that could host the new function
//!    ([`collect_enclosing_scopes`]);
//! 3. per scope, classifies the symbols the unit touches into parameters and
//!    outgoing values ([`FlowAnalyzer`]);
//! 4. synthesizes the function and its call site as text edits.
//!
//! Scopes with no legal parameter/return mapping are skipped. Everything that
//! goes wrong is folded into an empty result.

mod flow;
mod jumps;
mod range;
mod scopes;
mod span;
mod synth;

use lift_config::ExtractConfig;
use lift_core::{CancellationToken, Cancelled, FileId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::ExtractDatabase;
use crate::edit::{apply_text_edits, EditError, TextEdit};
use crate::preview::{preview_edits, ExtractionPreview};
use crate::printer::{ScriptPrinter, SourcePrinter};

pub use flow::{
    analyze_flow, FlowAnalysis, FlowAnalyzer, FlowParameter, OutgoingSymbol, RegionKind,
    ReturnShape,
};
pub use jumps::{check_jumps, is_jump_safe, JumpViolation, PermittedJumps};
pub use range::{get_range_to_extract, RangeToExtract};
pub use scopes::{collect_enclosing_scopes, Scope, ScopeKind};
pub use span::{locate_boundary_tokens, Span};
pub use synth::fresh_function_name;

/// One way to perform the extraction: into a specific scope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeAction {
    pub description: String,
    pub function_name: String,
    pub scope_description: String,
    pub edits: Vec<TextEdit>,
}

impl CodeAction {
    /// The file text after the extraction.
    pub fn apply(&self, original: &str) -> Result<String, EditError> {
        apply_text_edits(original, &self.edits)
    }

    pub fn preview(&self, original: &str) -> Result<ExtractionPreview, EditError> {
        preview_edits(original, &self.edits)
    }
}

/// Why a scope cannot host the extracted code.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum NoMappingReason {
    #[error("type parameter `{name}` is not visible from the target scope")]
    TypeParameterNotVisible { name: String },
    #[error("the expression writes `{name}`, which is read afterwards")]
    ExpressionWritesLiveSymbol { name: String },
    #[error("the range returns and also produces values used afterwards")]
    ReturnWithOutgoingValues,
    #[error("the range returns on some paths but may complete normally")]
    ReturnMayFallThrough,
    #[error("the range both awaits and yields")]
    AwaitAndYield,
    #[error("`{name}` is declared in the range and used outside it")]
    DeclarationUsedOutsideRange { name: String },
    #[error("a `break` or `continue` leaves the range")]
    JumpEscapesRange,
    #[error("arrow function with an expression body")]
    ExpressionBodiedArrow,
    #[error("no statement of the scope body contains the range")]
    NoInsertionPoint,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("extraction cancelled")]
    Cancelled,
    #[error("no legal mapping: {0}")]
    NoLegalMapping(#[from] NoMappingReason),
    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

impl From<Cancelled> for ExtractError {
    fn from(_: Cancelled) -> Self {
        ExtractError::Cancelled
    }
}

/// Extract-function actions for `span`, innermost scope first, with default
/// options.
pub fn compute_extraction<D: ExtractDatabase + ?Sized>(
    db: &D,
    file: &FileId,
    span: Span,
    cancel: &CancellationToken,
) -> Vec<CodeAction> {
    compute_extraction_with(db, file, span, cancel, &ExtractConfig::default())
}

pub fn compute_extraction_with<D: ExtractDatabase + ?Sized>(
    db: &D,
    file: &FileId,
    span: Span,
    cancel: &CancellationToken,
    config: &ExtractConfig,
) -> Vec<CodeAction> {
    compute_extraction_with_printer(db, file, span, cancel, config, &ScriptPrinter)
}

/// Like [`compute_extraction_with`], rendering code through `printer`.
pub fn compute_extraction_with_printer<D: ExtractDatabase + ?Sized>(
    db: &D,
    file: &FileId,
    span: Span,
    cancel: &CancellationToken,
    config: &ExtractConfig,
    printer: &dyn SourcePrinter,
) -> Vec<CodeAction> {
    match try_compute_extraction(db, file, span, cancel, config, printer) {
        Ok(actions) => actions,
        Err(ExtractError::Cancelled) => {
            tracing::debug!(file = %file, "extraction cancelled");
            Vec::new()
        }
        Err(ExtractError::Invariant(message)) => {
            tracing::error!(file = %file, %message, "extraction aborted");
            Vec::new()
        }
        Err(err @ ExtractError::NoLegalMapping(_)) => {
            tracing::debug!(file = %file, error = %err, "extraction rejected");
            Vec::new()
        }
    }
}

fn try_compute_extraction<D: ExtractDatabase + ?Sized>(
    db: &D,
    file: &FileId,
    span: Span,
    cancel: &CancellationToken,
    config: &ExtractConfig,
    printer: &dyn SourcePrinter,
) -> Result<Vec<CodeAction>, ExtractError> {
    cancel.check()?;
    let (Some(root), Some(text)) = (db.syntax(file), db.file_text(file)) else {
        tracing::debug!(file = %file, "unknown file");
        return Ok(Vec::new());
    };

    let Some(range) = get_range_to_extract(&root, span) else {
        return Ok(Vec::new());
    };
    let scopes = collect_enclosing_scopes(&range);
    tracing::debug!(
        file = %file,
        extent = ?range.text_range(),
        scopes = scopes.len(),
        "extracting range"
    );

    let name = fresh_function_name(&root, &config.function_name);
    let synthesizer = synth::Synthesizer {
        text,
        file,
        config,
        printer,
    };
    let mut analyzer = FlowAnalyzer::new(db, file, cancel);
    let mut actions = Vec::new();
    for scope in &scopes {
        let result = analyzer
            .analyze(&range, scope)
            .and_then(|flow| synthesizer.synthesize(&range, scope, &flow, &name));
        match result {
            Ok(action) => actions.push(action),
            Err(ExtractError::NoLegalMapping(reason)) => {
                tracing::debug!(scope = %scope.description(), %reason, "skipping scope");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(actions)
}
