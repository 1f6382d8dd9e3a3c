use lift_core::TextRange;
use lift_syntax::ast::{statements_of, AstNode, AssignmentExpression};
use lift_syntax::{text_range, SyntaxKind, SyntaxNode, SyntaxToken};

use super::jumps::is_jump_safe;
use super::span::{locate_boundary_tokens, Span};

/// The syntactic unit a selection denotes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RangeToExtract {
    SingleExpression(SyntaxNode),
    /// Contiguous statements sharing one block-like parent. Never empty.
    StatementSequence(Vec<SyntaxNode>),
}

impl RangeToExtract {
    pub fn first_node(&self) -> &SyntaxNode {
        match self {
            RangeToExtract::SingleExpression(node) => node,
            RangeToExtract::StatementSequence(statements) => &statements[0],
        }
    }

    pub fn last_node(&self) -> &SyntaxNode {
        match self {
            RangeToExtract::SingleExpression(node) => node,
            RangeToExtract::StatementSequence(statements) => &statements[statements.len() - 1],
        }
    }

    pub fn nodes(&self) -> &[SyntaxNode] {
        match self {
            RangeToExtract::SingleExpression(node) => std::slice::from_ref(node),
            RangeToExtract::StatementSequence(statements) => statements,
        }
    }

    pub fn text_range(&self) -> TextRange {
        TextRange::new(
            text_range(self.first_node()).start,
            text_range(self.last_node()).end,
        )
    }

    pub fn is_expression(&self) -> bool {
        matches!(self, RangeToExtract::SingleExpression(_))
    }
}

/// Maps a selection onto the syntactic unit it denotes, or `None` when the
/// selection is not extractable.
pub fn get_range_to_extract(root: &SyntaxNode, span: Span) -> Option<RangeToExtract> {
    let span = span.range();
    let Some((left, right)) = locate_boundary_tokens(root, span) else {
        tracing::debug!(?span, "selection contains no tokens");
        return None;
    };

    let (Some(start), Some(end)) = (anchor(&left, span), anchor(&right, span)) else {
        tracing::debug!(?span, "selection does not cover a complete node");
        return None;
    };
    tracing::trace!(start = ?start.kind(), end = ?end.kind(), "selection anchors");

    let range = if start == end {
        single_node_range(start)?
    } else {
        statement_range(start, end)?
    };

    let unsafe_node = range.nodes().iter().find(|node| !is_jump_safe(node));
    if let Some(node) = unsafe_node {
        tracing::debug!(kind = ?node.kind(), "selection contains a jump that would escape");
        return None;
    }
    Some(range)
}

/// Highest ancestor of `token` that lies entirely inside `span`.
fn anchor(token: &SyntaxToken, span: TextRange) -> Option<SyntaxNode> {
    let mut best = None;
    let mut current = token.parent();
    while let Some(node) = current {
        if node.kind() == SyntaxKind::SourceFile || !span.contains_range(text_range(&node)) {
            break;
        }
        current = node.parent();
        best = Some(node);
    }
    best
}

fn single_node_range(node: SyntaxNode) -> Option<RangeToExtract> {
    let kind = node.kind();
    if kind.is_statement() {
        return Some(RangeToExtract::StatementSequence(vec![node]));
    }
    if kind.is_expression() {
        if is_write_target(&node) {
            tracing::debug!(?kind, "selection is an assignment target");
            return None;
        }
        return Some(RangeToExtract::SingleExpression(node));
    }
    tracing::debug!(?kind, "selection is neither an expression nor a statement");
    None
}

/// `x` in `x = 1`, `x += 1` or `x++`: replacing it with a call is not valid.
fn is_write_target(node: &SyntaxNode) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    match parent.kind() {
        SyntaxKind::AssignmentExpression => AssignmentExpression::cast(parent)
            .and_then(|assignment| assignment.lhs())
            .is_some_and(|lhs| &lhs == node),
        SyntaxKind::PrefixUnaryExpression | SyntaxKind::PostfixUnaryExpression => parent
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .any(|tok| matches!(tok.kind(), SyntaxKind::PlusPlus | SyntaxKind::MinusMinus)),
        _ => false,
    }
}

fn statement_range(start: SyntaxNode, end: SyntaxNode) -> Option<RangeToExtract> {
    let (Some(parent), Some(end_parent)) = (start.parent(), end.parent()) else {
        return None;
    };
    if parent != end_parent {
        tracing::debug!("selection anchors have different parents");
        return None;
    }
    if !parent.kind().is_block_like() {
        tracing::debug!(parent = ?parent.kind(), "selection anchors are not in a statement list");
        return None;
    }
    if !start.kind().is_statement() || !end.kind().is_statement() {
        tracing::debug!(start = ?start.kind(), end = ?end.kind(), "selection anchors are not statements");
        return None;
    }
    if text_range(&start).start >= text_range(&end).start {
        return None;
    }

    let statements = statements_of(&parent);
    let (Some(first), Some(last)) = (
        statements.iter().position(|s| s == &start),
        statements.iter().position(|s| s == &end),
    ) else {
        tracing::error!(
            container = ?parent.kind(),
            "statement list does not contain the selection anchors"
        );
        debug_assert!(false, "statement list does not contain the selection anchors");
        return None;
    };
    Some(RangeToExtract::StatementSequence(
        statements[first..=last].to_vec(),
    ))
}
