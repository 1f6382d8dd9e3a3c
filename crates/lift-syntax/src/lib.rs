//! Syntax tree and parsing primitives for Lift scripts.
//!
//! [`parse_script`] produces a full-fidelity rowan-based syntax tree for a
//! small JavaScript/TypeScript-like language. Every byte of the input is kept
//! (trivia included), so node ranges map directly back to source offsets.
//!
//! Typed wrappers over the raw tree live in [`ast`].

pub mod ast;
mod lexer;
mod parser;
mod syntax_kind;

pub use ast::AstNode;
pub use lexer::{lex, Lexer, Token};
pub use parser::{parse_script, ScriptParse, SyntaxElement, SyntaxNode, SyntaxToken};
pub use syntax_kind::{ScriptLanguage, SyntaxKind};

use lift_core::TextRange;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    pub message: String,
    pub range: TextRange,
}

/// Converts a rowan range into the byte-offset range used across Lift.
pub fn text_range(node: &SyntaxNode) -> TextRange {
    node.text_range().into()
}
