use std::collections::HashMap;

use lift_core::{CancellationToken, Cancelled, TextRange};
use lift_syntax::ast::{
    Access, AstNode, Callable, CatchClause, ClassDeclaration, NameExpression, Parameter,
    TypeAnnotation, TypeParameter, TypeRef, VariableDeclarationList,
};
use lift_syntax::{text_range, SyntaxKind, SyntaxNode, SyntaxToken};

pub type ScopeId = usize;

/// File-local symbol identifier, an index into [`SymbolIndex::symbols`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocalSymbolId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    File,
    Function,
    Class,
    Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeData {
    pub parent: Option<ScopeId>,
    pub kind: ScopeKind,
    /// Range of the node that owns the scope.
    pub range: TextRange,
    names: HashMap<String, LocalSymbolId>,
}

impl ScopeData {
    pub fn lookup(&self, name: &str) -> Option<LocalSymbolId> {
        self.names.get(name).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Var,
    Let,
    Const,
    Parameter,
    Function,
    Class,
    TypeParameter,
}

impl SymbolKind {
    /// Function and class declarations: hoisted bindings that are never reassigned
    /// by ordinary code.
    pub fn is_hoisted_declaration(self) -> bool {
        matches!(self, SymbolKind::Function | SymbolKind::Class)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolData {
    pub name: String,
    pub kind: SymbolKind,
    /// Range of the declaring identifier token.
    pub name_range: TextRange,
    /// Range of the declaring node (declarator, parameter, function, ...).
    pub decl_range: TextRange,
    pub scope: ScopeId,
    /// Range of the node owning the declaring scope.
    pub scope_range: TextRange,
    /// Source text of the type annotation, if any.
    pub ty: Option<String>,
    /// Ranges of the type-name tokens inside the annotation.
    pub type_refs: Vec<TextRange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceData {
    pub symbol: LocalSymbolId,
    pub range: TextRange,
    pub access: Access,
    /// `true` for type positions (`x: T`), `false` for value names.
    pub in_type: bool,
}

/// Immutable per-file symbol table.
#[derive(Debug, Clone, Default)]
pub struct SymbolIndex {
    scopes: Vec<ScopeData>,
    symbols: Vec<SymbolData>,
    references: Vec<ReferenceData>,
    by_name_range: HashMap<TextRange, LocalSymbolId>,
    scope_by_node: HashMap<(SyntaxKind, TextRange), ScopeId>,
}

/// Cancellation is polled once per this many scanned references.
const CANCEL_CHECK_INTERVAL: usize = 256;

impl SymbolIndex {
    pub fn build(root: &SyntaxNode) -> SymbolIndex {
        let mut builder = IndexBuilder::default();
        let file_scope = builder.push_scope(None, ScopeKind::File, root);
        builder.walk(root, file_scope);
        let index = builder.finish();
        tracing::debug!(
            scopes = index.scopes.len(),
            symbols = index.symbols.len(),
            references = index.references.len(),
            "built symbol index"
        );
        index
    }

    pub fn scopes(&self) -> &[ScopeData] {
        &self.scopes
    }

    pub fn scope(&self, id: ScopeId) -> &ScopeData {
        &self.scopes[id]
    }

    /// Scope owned by `node`, if it introduces one.
    pub fn scope_of_node(&self, node: &SyntaxNode) -> Option<ScopeId> {
        self.scope_by_node
            .get(&(node.kind(), text_range(node)))
            .copied()
    }

    pub fn symbols(&self) -> impl Iterator<Item = (LocalSymbolId, &SymbolData)> + '_ {
        self.symbols
            .iter()
            .enumerate()
            .map(|(idx, data)| (LocalSymbolId(idx as u32), data))
    }

    pub fn symbol(&self, id: LocalSymbolId) -> Option<&SymbolData> {
        self.symbols.get(id.0 as usize)
    }

    /// Symbol declared or referenced by the identifier token at `range`.
    pub fn symbol_at(&self, range: TextRange) -> Option<LocalSymbolId> {
        self.by_name_range.get(&range).copied()
    }

    pub fn resolve_token(&self, token: &SyntaxToken) -> Option<LocalSymbolId> {
        self.symbol_at(token.text_range().into())
    }

    pub fn resolve_name(&self, name: &NameExpression) -> Option<LocalSymbolId> {
        self.resolve_token(&name.ident_token()?)
    }

    /// Resolves `name` as seen from `scope`.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<LocalSymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let data = &self.scopes[id];
            if let Some(symbol) = data.lookup(name) {
                return Some(symbol);
            }
            current = data.parent;
        }
        None
    }

    /// Every reference to `symbol`, in source order. Declarations are not included.
    pub fn references(
        &self,
        symbol: LocalSymbolId,
        cancel: &CancellationToken,
    ) -> Result<Vec<ReferenceData>, Cancelled> {
        let mut out = Vec::new();
        for (idx, reference) in self.references.iter().enumerate() {
            if idx % CANCEL_CHECK_INTERVAL == 0 {
                cancel.check()?;
            }
            if reference.symbol == symbol {
                out.push(*reference);
            }
        }
        Ok(out)
    }
}

struct PendingReference {
    name: String,
    range: TextRange,
    scope: ScopeId,
    access: Access,
    in_type: bool,
}

#[derive(Default)]
struct IndexBuilder {
    index: SymbolIndex,
    pending: Vec<PendingReference>,
}

impl IndexBuilder {
    fn push_scope(&mut self, parent: Option<ScopeId>, kind: ScopeKind, node: &SyntaxNode) -> ScopeId {
        let id = self.index.scopes.len();
        let range = text_range(node);
        self.index.scopes.push(ScopeData {
            parent,
            kind,
            range,
            names: HashMap::new(),
        });
        self.index.scope_by_node.insert((node.kind(), range), id);
        id
    }

    /// Nearest function or file scope; where `var` bindings land.
    fn function_scope(&self, mut scope: ScopeId) -> ScopeId {
        loop {
            let data = &self.index.scopes[scope];
            match (data.kind, data.parent) {
                (ScopeKind::Function | ScopeKind::File, _) | (_, None) => return scope,
                (_, Some(parent)) => scope = parent,
            }
        }
    }

    fn declare(
        &mut self,
        scope: ScopeId,
        token: &SyntaxToken,
        kind: SymbolKind,
        decl: &SyntaxNode,
        annotation: Option<TypeAnnotation>,
    ) {
        let name = token.text().to_string();
        let name_range: TextRange = token.text_range().into();

        // Redeclarations (`var x; var x;`) share the first symbol.
        if let Some(existing) = self.index.scopes[scope].lookup(&name) {
            self.index.by_name_range.insert(name_range, existing);
            return;
        }

        let (ty, type_refs) = match annotation.as_ref().and_then(|a| a.ty()) {
            Some(ty) => (
                Some(ty.syntax().to_string()),
                ty.syntax()
                    .descendants()
                    .filter_map(TypeRef::cast)
                    .filter_map(|t| t.name_token())
                    .map(|t| t.text_range().into())
                    .collect(),
            ),
            None => (None, Vec::new()),
        };

        let id = LocalSymbolId(self.index.symbols.len() as u32);
        self.index.symbols.push(SymbolData {
            name: name.clone(),
            kind,
            name_range,
            decl_range: text_range(decl),
            scope,
            scope_range: self.index.scopes[scope].range,
            ty,
            type_refs,
        });
        self.index.scopes[scope].names.insert(name, id);
        self.index.by_name_range.insert(name_range, id);
    }

    fn walk(&mut self, node: &SyntaxNode, scope: ScopeId) {
        let mut scope = scope;
        match node.kind() {
            kind if kind.is_callable() => {
                let Some(callable) = Callable::cast(node.clone()) else {
                    return;
                };
                let name = callable.name_token();
                if kind == SyntaxKind::FunctionDeclaration {
                    if let Some(name) = &name {
                        self.declare(scope, name, SymbolKind::Function, node, None);
                    }
                }
                scope = self.push_scope(Some(scope), ScopeKind::Function, node);
                if kind == SyntaxKind::FunctionExpression {
                    if let Some(name) = &name {
                        self.declare(scope, name, SymbolKind::Function, node, None);
                    }
                }
            }
            SyntaxKind::ClassDeclaration => {
                if let Some(name) = ClassDeclaration::cast(node.clone()).and_then(|c| c.name_token()) {
                    self.declare(scope, &name, SymbolKind::Class, node, None);
                }
                scope = self.push_scope(Some(scope), ScopeKind::Class, node);
            }
            SyntaxKind::Block => {
                let is_function_body = node.parent().is_some_and(|p| p.kind().is_callable());
                if !is_function_body {
                    scope = self.push_scope(Some(scope), ScopeKind::Block, node);
                }
            }
            SyntaxKind::ForStatement
            | SyntaxKind::ForInStatement
            | SyntaxKind::ForOfStatement
            | SyntaxKind::CatchClause
            | SyntaxKind::CaseBlock => {
                scope = self.push_scope(Some(scope), ScopeKind::Block, node);
                if let Some(param) = CatchClause::cast(node.clone()).and_then(|c| c.parameter()) {
                    if let Some(name) = param.name_token() {
                        self.declare(scope, &name, SymbolKind::Parameter, param.syntax(), param.type_annotation());
                    }
                }
            }
            SyntaxKind::VariableDeclarationList => {
                if let Some(list) = VariableDeclarationList::cast(node.clone()) {
                    self.declare_variables(&list, scope);
                }
            }
            SyntaxKind::Parameter => {
                // Catch parameters were declared with their clause.
                let in_catch = node.parent().is_some_and(|p| p.kind() == SyntaxKind::CatchClause);
                if !in_catch {
                    if let Some(param) = Parameter::cast(node.clone()) {
                        if let Some(name) = param.name_token() {
                            self.declare(scope, &name, SymbolKind::Parameter, node, param.type_annotation());
                        }
                    }
                }
            }
            SyntaxKind::TypeParameter => {
                if let Some(name) = TypeParameter::cast(node.clone()).and_then(|p| p.name_token()) {
                    self.declare(scope, &name, SymbolKind::TypeParameter, node, None);
                }
            }
            SyntaxKind::NameExpression => {
                if let Some(name) = NameExpression::cast(node.clone()) {
                    if let Some(token) = name.ident_token() {
                        self.pending.push(PendingReference {
                            name: token.text().to_string(),
                            range: token.text_range().into(),
                            scope,
                            access: name.access(),
                            in_type: false,
                        });
                    }
                }
            }
            SyntaxKind::TypeRef => {
                if let Some(token) = TypeRef::cast(node.clone()).and_then(|t| t.name_token()) {
                    self.pending.push(PendingReference {
                        name: token.text().to_string(),
                        range: token.text_range().into(),
                        scope,
                        access: Access::Read,
                        in_type: true,
                    });
                }
            }
            _ => {}
        }

        for child in node.children() {
            self.walk(&child, scope);
        }
    }

    fn declare_variables(&mut self, list: &VariableDeclarationList, scope: ScopeId) {
        let (kind, target) = match list.keyword().map(|k| k.kind()) {
            Some(SyntaxKind::LetKw) => (SymbolKind::Let, scope),
            Some(SyntaxKind::ConstKw) => (SymbolKind::Const, scope),
            _ => (SymbolKind::Var, self.function_scope(scope)),
        };
        for declarator in list.declarators() {
            if let Some(name) = declarator.name_token() {
                self.declare(target, &name, kind, declarator.syntax(), declarator.type_annotation());
            }
        }
    }

    fn finish(mut self) -> SymbolIndex {
        for pending in std::mem::take(&mut self.pending) {
            let Some(symbol) = self.index.lookup(pending.scope, &pending.name) else {
                tracing::trace!(name = %pending.name, "unresolved name");
                continue;
            };
            self.index.by_name_range.insert(pending.range, symbol);
            self.index.references.push(ReferenceData {
                symbol,
                range: pending.range,
                access: pending.access,
                in_type: pending.in_type,
            });
        }
        self.index
    }
}
