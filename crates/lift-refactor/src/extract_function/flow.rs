use std::collections::HashMap;

use lift_core::{CancellationToken, FileId, TextRange};
use lift_resolve::SymbolKind;
use lift_syntax::ast::{jump_target, AstNode, NameExpression};
use lift_syntax::{text_range, SyntaxKind, SyntaxNode};
use serde::{Deserialize, Serialize};

use super::range::RangeToExtract;
use super::scopes::Scope;
use super::{ExtractError, NoMappingReason};
use crate::db::{Declaration, ExtractDatabase, Reference, SymbolId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowParameter {
    pub name: String,
    pub ty: Option<String>,
}

/// A symbol written inside the range whose value is observed afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingSymbol {
    pub name: String,
    pub ty: Option<String>,
    /// Declared by the extracted code; the call site re-declares it.
    pub declared_in_range: bool,
    #[serde(skip)]
    pub kind: Option<SymbolKind>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionKind {
    Expression,
    Statements,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnShape {
    /// The extracted expression's value.
    Expression,
    Void,
    Single,
    /// Several outgoing values, returned as an array.
    Composite,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowAnalysis {
    pub parameters: Vec<FlowParameter>,
    pub outgoing: Vec<OutgoingSymbol>,
    /// Outer symbols the range only writes, declared out of sight of the
    /// target scope. The new function declares its own copy.
    pub locals: Vec<FlowParameter>,
    pub region: RegionKind,
    pub contains_return: bool,
    pub contains_await: bool,
    pub contains_yield: bool,
    pub uses_this: bool,
    pub return_shape: ReturnShape,
}

/// Classifies the symbols a range touches relative to one target scope.
///
/// Reference searches and declarations are cached per symbol, so one analyzer
/// should be reused for every scope of a single extraction request.
pub struct FlowAnalyzer<'a, D: ExtractDatabase + ?Sized> {
    db: &'a D,
    file: &'a FileId,
    cancel: &'a CancellationToken,
    references: HashMap<SymbolId, Vec<Reference>>,
    declarations: HashMap<SymbolId, Option<Declaration>>,
}

impl<'a, D: ExtractDatabase + ?Sized> FlowAnalyzer<'a, D> {
    pub fn new(db: &'a D, file: &'a FileId, cancel: &'a CancellationToken) -> Self {
        Self {
            db,
            file,
            cancel,
            references: HashMap::new(),
            declarations: HashMap::new(),
        }
    }

    pub fn analyze(
        &mut self,
        range: &RangeToExtract,
        scope: &Scope,
    ) -> Result<FlowAnalysis, ExtractError> {
        self.cancel.check()?;
        if scope.body().is_none() {
            return Err(NoMappingReason::ExpressionBodiedArrow.into());
        }

        let extent = range.text_range();
        let scope_range = text_range(&scope.node);
        let mut parameters: Vec<(SymbolId, FlowParameter, Vec<SymbolId>)> = Vec::new();
        let mut outgoing: Vec<(SymbolId, OutgoingSymbol, Vec<SymbolId>)> = Vec::new();
        let mut locals: Vec<(SymbolId, FlowParameter, Vec<SymbolId>)> = Vec::new();
        let mut contains_return = false;
        let mut contains_await = false;
        let mut contains_yield = false;
        let mut uses_this = false;

        for node in range.nodes().iter().flat_map(|n| n.descendants()) {
            match node.kind() {
                SyntaxKind::ReturnStatement => {
                    contains_return |= !inside_nested(&node, extent, |k| k.is_callable());
                }
                SyntaxKind::BreakStatement | SyntaxKind::ContinueStatement => {
                    let escapes = jump_target(&node)
                        .map_or(true, |target| !extent.contains_range(text_range(&target)));
                    if escapes && !inside_nested(&node, extent, |k| k.is_callable() || k.is_class_like()) {
                        return Err(NoMappingReason::JumpEscapesRange.into());
                    }
                }
                SyntaxKind::AwaitExpression => {
                    contains_await |= !inside_nested(&node, extent, |k| k.is_callable());
                }
                SyntaxKind::YieldExpression => {
                    contains_yield |= !inside_nested(&node, extent, |k| k.is_callable());
                }
                SyntaxKind::ThisExpression => {
                    uses_this |= !inside_nested(&node, extent, |k| {
                        (k.is_callable() && k != SyntaxKind::ArrowFunction) || k.is_class_like()
                    });
                }
                SyntaxKind::VariableDeclarator => {
                    let Some((symbol, decl)) = self.resolve(&node) else {
                        continue;
                    };
                    // Bindings whose whole scope is extracted cannot be seen afterwards.
                    if extent.contains_range(decl.scope_range)
                        || outgoing.iter().any(|(s, ..)| s == &symbol)
                    {
                        continue;
                    }
                    if self.has_reachable_read(range, &symbol, &decl)? {
                        tracing::trace!(name = %decl.name, "declaration is read after the range");
                        outgoing.push((
                            symbol,
                            OutgoingSymbol {
                                name: decl.name.clone(),
                                ty: decl.ty.clone(),
                                declared_in_range: true,
                                kind: Some(decl.kind),
                            },
                            decl.type_refs.clone(),
                        ));
                    }
                }
                SyntaxKind::FunctionDeclaration | SyntaxKind::ClassDeclaration => {
                    let Some((symbol, decl)) = self.resolve(&node) else {
                        continue;
                    };
                    if !extent.contains_range(decl.name_range)
                        || extent.contains_range(decl.scope_range)
                    {
                        continue;
                    }
                    let refs = self.references(&symbol)?;
                    if refs.iter().any(|r| !extent.contains_range(r.range)) {
                        return Err(NoMappingReason::DeclarationUsedOutsideRange {
                            name: decl.name.clone(),
                        }
                        .into());
                    }
                }
                SyntaxKind::NameExpression => {
                    let Some(access) = NameExpression::cast(node.clone()).map(|n| n.access()) else {
                        continue;
                    };
                    let Some((symbol, decl)) = self.resolve(&node) else {
                        continue;
                    };
                    if extent.contains_range(decl.name_range) {
                        continue;
                    }

                    if access.is_write() && !outgoing.iter().any(|(s, ..)| s == &symbol) {
                        if self.has_reachable_read(range, &symbol, &decl)? {
                            tracing::trace!(name = %decl.name, "write is observed after the range");
                            outgoing.push((
                                symbol.clone(),
                                OutgoingSymbol {
                                    name: decl.name.clone(),
                                    ty: decl.ty.clone(),
                                    declared_in_range: false,
                                    kind: Some(decl.kind),
                                },
                                decl.type_refs.clone(),
                            ));
                        } else {
                            tracing::trace!(name = %decl.name, "dead write");
                            let out_of_sight = !decl.scope_range.contains_range(scope_range);
                            if out_of_sight && !locals.iter().any(|(s, ..)| s == &symbol) {
                                locals.push((
                                    symbol.clone(),
                                    FlowParameter {
                                        name: decl.name.clone(),
                                        ty: decl.ty.clone(),
                                    },
                                    decl.type_refs.clone(),
                                ));
                            }
                        }
                    }

                    let visible_declaration = decl.kind.is_hoisted_declaration()
                        && decl.scope_range.contains_range(scope_range);
                    if access.is_read()
                        && !visible_declaration
                        && !parameters.iter().any(|(s, ..)| s == &symbol)
                    {
                        parameters.push((
                            symbol,
                            FlowParameter {
                                name: decl.name.clone(),
                                ty: decl.ty.clone(),
                            },
                            decl.type_refs.clone(),
                        ));
                    }
                }
                _ => {}
            }
        }

        // The pre-range value must survive paths that do not write.
        for (symbol, out, refs) in &outgoing {
            if !out.declared_in_range && !parameters.iter().any(|(s, ..)| s == symbol) {
                parameters.push((
                    symbol.clone(),
                    FlowParameter {
                        name: out.name.clone(),
                        ty: out.ty.clone(),
                    },
                    refs.clone(),
                ));
            }
        }
        locals.retain(|(symbol, ..)| !parameters.iter().any(|(s, ..)| s == symbol));

        let type_refs = parameters
            .iter()
            .map(|(_, _, refs)| refs)
            .chain(outgoing.iter().map(|(_, _, refs)| refs))
            .chain(locals.iter().map(|(_, _, refs)| refs))
            .flatten();
        for type_ref in type_refs {
            let Some(decl) = self.declaration(type_ref) else {
                continue;
            };
            if decl.kind == SymbolKind::TypeParameter && !decl.scope_range.contains_range(scope_range) {
                return Err(NoMappingReason::TypeParameterNotVisible { name: decl.name }.into());
            }
        }

        if contains_await && contains_yield {
            return Err(NoMappingReason::AwaitAndYield.into());
        }

        let region = if range.is_expression() {
            RegionKind::Expression
        } else {
            RegionKind::Statements
        };
        if let (RegionKind::Expression, Some((_, symbol, _))) = (region, outgoing.first()) {
            return Err(NoMappingReason::ExpressionWritesLiveSymbol {
                name: symbol.name.clone(),
            }
            .into());
        }
        if contains_return {
            if !outgoing.is_empty() {
                return Err(NoMappingReason::ReturnWithOutgoingValues.into());
            }
            let ends_with_exit = matches!(
                range.last_node().kind(),
                SyntaxKind::ReturnStatement | SyntaxKind::ThrowStatement
            );
            if !ends_with_exit {
                return Err(NoMappingReason::ReturnMayFallThrough.into());
            }
        }

        let return_shape = match (region, outgoing.len()) {
            (RegionKind::Expression, _) => ReturnShape::Expression,
            (_, 0) => ReturnShape::Void,
            (_, 1) => ReturnShape::Single,
            _ => ReturnShape::Composite,
        };

        Ok(FlowAnalysis {
            parameters: parameters.into_iter().map(|(_, p, _)| p).collect(),
            outgoing: outgoing.into_iter().map(|(_, o, _)| o).collect(),
            locals: locals.into_iter().map(|(_, l, _)| l).collect(),
            region,
            contains_return,
            contains_await,
            contains_yield,
            uses_this,
            return_shape,
        })
    }

    fn resolve(&mut self, node: &SyntaxNode) -> Option<(SymbolId, Declaration)> {
        let symbol = self.db.resolve_symbol(self.file, node)?;
        let decl = self.declaration(&symbol)?;
        Some((symbol, decl))
    }

    fn declaration(&mut self, symbol: &SymbolId) -> Option<Declaration> {
        if let Some(decl) = self.declarations.get(symbol) {
            return decl.clone();
        }
        let decl = self.db.declaration_of(symbol);
        self.declarations.insert(symbol.clone(), decl.clone());
        decl
    }

    fn references(&mut self, symbol: &SymbolId) -> Result<&[Reference], ExtractError> {
        if !self.references.contains_key(symbol) {
            self.cancel.check()?;
            let refs = self.db.find_references(symbol, self.cancel)?;
            self.references.insert(symbol.clone(), refs);
        }
        Ok(self
            .references
            .get(symbol)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }

    /// A read of `symbol` that can observe a value written by the range: one
    /// positioned after the range, or one inside a loop that encloses the range
    /// within the symbol's scope.
    fn has_reachable_read(
        &mut self,
        range: &RangeToExtract,
        symbol: &SymbolId,
        decl: &Declaration,
    ) -> Result<bool, ExtractError> {
        let extent = range.text_range();
        let loops: Vec<TextRange> = range
            .first_node()
            .ancestors()
            .skip(1)
            .take_while(|n| !n.kind().is_callable())
            .filter(|n| n.kind().is_loop())
            .map(|n| text_range(&n))
            .filter(|r| decl.scope_range.contains_range(*r))
            .collect();

        let refs = self.references(symbol)?;
        Ok(refs.iter().any(|r| {
            r.access.is_read()
                && !extent.contains_range(r.range)
                && (r.range.start >= extent.end || loops.iter().any(|l| l.contains_range(r.range)))
        }))
    }
}

/// Analyzes `range` against `scope` with a fresh cache.
pub fn analyze_flow<D: ExtractDatabase + ?Sized>(
    db: &D,
    file: &FileId,
    range: &RangeToExtract,
    scope: &Scope,
    cancel: &CancellationToken,
) -> Result<FlowAnalysis, ExtractError> {
    FlowAnalyzer::new(db, file, cancel).analyze(range, scope)
}

/// `true` when an ancestor of `node` inside `extent` matches `boundary`.
fn inside_nested(node: &SyntaxNode, extent: TextRange, boundary: impl Fn(SyntaxKind) -> bool) -> bool {
    node.ancestors()
        .skip(1)
        .take_while(|n| extent.contains_range(text_range(n)))
        .any(|n| boundary(n.kind()))
}
