use std::collections::HashSet;

use lift_config::ExtractConfig;
use lift_core::{FileId, TextRange};
use lift_resolve::SymbolKind;
use lift_syntax::ast::{AssignmentExpression, AstNode};
use lift_syntax::{text_range, SyntaxKind, SyntaxNode};

use super::flow::{FlowAnalysis, ReturnShape};
use super::range::RangeToExtract;
use super::scopes::Scope;
use super::{CodeAction, ExtractError, NoMappingReason};
use crate::edit::{TextEdit, WorkspaceEdit};
use crate::printer::{
    indentation_at, reindent, CallForm, CallSite, CallWrapper, ExtractedFunction, SourcePrinter,
};

/// `base`, or `base_1`, `base_2`, ... if an identifier in the file already
/// uses it.
pub fn fresh_function_name(root: &SyntaxNode, base: &str) -> String {
    let taken: HashSet<String> = root
        .descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .filter(|token| token.kind() == SyntaxKind::Identifier)
        .map(|token| token.text().to_string())
        .collect();
    if !taken.contains(base) {
        return base.to_string();
    }
    let mut suffix = 1usize;
    loop {
        let candidate = format!("{base}_{suffix}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

pub(crate) struct Synthesizer<'a> {
    pub text: &'a str,
    pub file: &'a FileId,
    pub config: &'a ExtractConfig,
    pub printer: &'a dyn SourcePrinter,
}

impl Synthesizer<'_> {
    pub fn synthesize(
        &self,
        range: &RangeToExtract,
        scope: &Scope,
        flow: &FlowAnalysis,
        name: &str,
    ) -> Result<CodeAction, ExtractError> {
        let body = scope.body().ok_or(NoMappingReason::ExpressionBodiedArrow)?;
        let anchor = range
            .first_node()
            .ancestors()
            .find(|node| node.parent().as_ref() == Some(&body))
            .ok_or(NoMappingReason::NoInsertionPoint)?;

        let insert_at = text_range(&anchor).start;
        let indent = indentation_at(self.text, insert_at);
        let function = self.function(range, flow, name);
        let mut printed = self
            .printer
            .print_function(&function, &indent, &self.config.indent_unit());
        printed.push_str("\n\n");
        printed.push_str(&indent);

        let extent = range.text_range();
        let call = self.call_site(range, flow, name);
        let replacement = self
            .printer
            .print_call_site(&call, &indentation_at(self.text, extent.start));

        let mut edit = WorkspaceEdit::new(vec![
            TextEdit::insert(self.file.clone(), insert_at, printed),
            TextEdit::replace(self.file.clone(), extent, replacement),
        ]);
        edit.normalize()
            .map_err(|err| ExtractError::Invariant(format!("synthesized edits conflict: {err}")))?;

        let scope_description = scope.description();
        Ok(CodeAction {
            description: format!("Extract to function '{name}' in {scope_description}"),
            function_name: name.to_string(),
            scope_description,
            edits: edit.edits,
        })
    }

    fn function(&self, range: &RangeToExtract, flow: &FlowAnalysis, name: &str) -> ExtractedFunction {
        let extent = range.text_range();
        let source = self.source_text(extent);

        let mut body = Vec::new();
        if flow.return_shape == ReturnShape::Expression {
            body.push(format!("return {source};"));
        } else {
            for local in &flow.locals {
                match &local.ty {
                    Some(ty) => body.push(format!("let {}: {ty};", local.name)),
                    None => body.push(format!("let {};", local.name)),
                }
            }
            body.push(source);
            match flow.return_shape {
                ReturnShape::Single => body.push(format!("return {};", flow.outgoing[0].name)),
                ReturnShape::Composite => body.push(format!("return [{}];", outgoing_names(flow).join(", "))),
                ReturnShape::Void | ReturnShape::Expression => {}
            }
        }

        ExtractedFunction {
            name: name.to_string(),
            is_async: flow.contains_await,
            is_generator: flow.contains_yield,
            parameters: flow.parameters.clone(),
            body,
        }
    }

    /// Source of `extent` with the indentation of its first line removed.
    fn source_text(&self, extent: TextRange) -> String {
        let old_indent = indentation_at(self.text, extent.start);
        reindent(&self.text[extent.start..extent.end], &old_indent, "")
    }

    fn call_site(&self, range: &RangeToExtract, flow: &FlowAnalysis, name: &str) -> CallSite {
        let wrapper = if flow.contains_await {
            CallWrapper::Await
        } else if flow.contains_yield {
            CallWrapper::YieldStar
        } else {
            CallWrapper::None
        };

        let form = match range {
            RangeToExtract::SingleExpression(node) => CallForm::Expression {
                parenthesize: needs_parentheses(node, wrapper),
            },
            RangeToExtract::StatementSequence(_) if flow.contains_return => CallForm::Return,
            RangeToExtract::StatementSequence(_) => match flow.return_shape {
                ReturnShape::Single => {
                    let symbol = &flow.outgoing[0];
                    if symbol.declared_in_range {
                        CallForm::Declare {
                            keyword: declaration_keyword(symbol.kind).to_string(),
                            name: symbol.name.clone(),
                        }
                    } else {
                        CallForm::Assign {
                            target: symbol.name.clone(),
                        }
                    }
                }
                ReturnShape::Composite => CallForm::Destructure {
                    declare: flow
                        .outgoing
                        .iter()
                        .filter(|o| o.declared_in_range)
                        .map(|o| o.name.clone())
                        .collect(),
                    targets: outgoing_names(flow),
                },
                ReturnShape::Void | ReturnShape::Expression => CallForm::Statement,
            },
        };

        CallSite {
            callee: name.to_string(),
            arguments: flow.parameters.iter().map(|p| p.name.clone()).collect(),
            bind_this: flow.uses_this,
            wrapper,
            form,
        }
    }
}

fn outgoing_names(flow: &FlowAnalysis) -> Vec<String> {
    flow.outgoing.iter().map(|o| o.name.clone()).collect()
}

fn declaration_keyword(kind: Option<SymbolKind>) -> &'static str {
    match kind {
        Some(SymbolKind::Var) => "var",
        Some(SymbolKind::Const) => "const",
        _ => "let",
    }
}

/// Whether a wrapped call must be parenthesized to replace `node`.
fn needs_parentheses(node: &SyntaxNode, wrapper: CallWrapper) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    match wrapper {
        CallWrapper::None => false,
        CallWrapper::Await => matches!(
            parent.kind(),
            SyntaxKind::MemberExpression
                | SyntaxKind::CallExpression
                | SyntaxKind::NewExpression
                | SyntaxKind::PostfixUnaryExpression
        ),
        CallWrapper::YieldStar => match parent.kind() {
            SyntaxKind::ExpressionStatement
            | SyntaxKind::ParenthesizedExpression
            | SyntaxKind::ArgumentList
            | SyntaxKind::ArrayExpression
            | SyntaxKind::VariableDeclarator
            | SyntaxKind::ReturnStatement => false,
            SyntaxKind::AssignmentExpression => AssignmentExpression::cast(parent)
                .and_then(|a| a.rhs())
                .map_or(true, |rhs| &rhs != node),
            _ => true,
        },
    }
}
