use std::collections::BTreeMap;

use lift_core::{CancellationToken, Cancelled, FileId, TextRange};
use lift_resolve::{LocalSymbolId, SymbolIndex, SymbolKind};
use lift_syntax::ast::{support, Access};
use lift_syntax::{parse_script, ParseError, SyntaxKind, SyntaxNode};
use rowan::GreenNode;

/// Workspace-unique symbol identity.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId {
    pub file: FileId,
    pub local: LocalSymbolId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub file: FileId,
    pub name: String,
    pub kind: SymbolKind,
    /// Range of the declaring identifier.
    pub name_range: TextRange,
    /// Range of the declaring node.
    pub range: TextRange,
    /// Range of the node that owns the scope the symbol is declared in.
    pub scope_range: TextRange,
    /// Source text of the type annotation.
    pub ty: Option<String>,
    /// Symbols named by the type annotation (type parameters, mostly).
    pub type_refs: Vec<SymbolId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    pub file: FileId,
    pub range: TextRange,
    pub access: Access,
}

/// Program model queried by the extraction pipeline.
///
/// Every query is `&self`; implementations are expected to be immutable
/// snapshots for the duration of one extraction call.
pub trait ExtractDatabase {
    fn file_text(&self, file: &FileId) -> Option<&str>;

    fn syntax(&self, file: &FileId) -> Option<SyntaxNode>;

    /// Symbol named by `node`: a name expression, a type reference, or any
    /// declaration whose first identifier is the declared name.
    fn resolve_symbol(&self, file: &FileId, node: &SyntaxNode) -> Option<SymbolId>;

    fn declaration_of(&self, symbol: &SymbolId) -> Option<Declaration>;

    /// All value and type references to `symbol`, in source order. The
    /// declaration itself is not a reference.
    fn find_references(
        &self,
        symbol: &SymbolId,
        cancel: &CancellationToken,
    ) -> Result<Vec<Reference>, Cancelled>;
}

#[derive(Debug, Clone)]
struct ScriptFile {
    text: String,
    green: GreenNode,
    index: SymbolIndex,
    errors: Vec<ParseError>,
}

/// In-memory [`ExtractDatabase`] over parsed scripts.
#[derive(Debug, Clone, Default)]
pub struct ScriptDatabase {
    files: BTreeMap<FileId, ScriptFile>,
}

impl ScriptDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, file: FileId, text: impl Into<String>) -> Self {
        self.set_file(file, text);
        self
    }

    /// Parses and indexes `text`, replacing any previous contents of `file`.
    pub fn set_file(&mut self, file: FileId, text: impl Into<String>) {
        let text = text.into();
        let parse = parse_script(&text);
        let index = SymbolIndex::build(&parse.syntax());
        if !parse.errors.is_empty() {
            tracing::debug!(file = %file, errors = parse.errors.len(), "file has parse errors");
        }
        self.files.insert(
            file,
            ScriptFile {
                text,
                green: parse.green,
                index,
                errors: parse.errors,
            },
        );
    }

    pub fn parse_errors(&self, file: &FileId) -> &[ParseError] {
        self.files
            .get(file)
            .map(|f| f.errors.as_slice())
            .unwrap_or_default()
    }

    pub fn symbol_index(&self, file: &FileId) -> Option<&SymbolIndex> {
        self.files.get(file).map(|f| &f.index)
    }
}

impl ExtractDatabase for ScriptDatabase {
    fn file_text(&self, file: &FileId) -> Option<&str> {
        self.files.get(file).map(|f| f.text.as_str())
    }

    fn syntax(&self, file: &FileId) -> Option<SyntaxNode> {
        self.files
            .get(file)
            .map(|f| SyntaxNode::new_root(f.green.clone()))
    }

    fn resolve_symbol(&self, file: &FileId, node: &SyntaxNode) -> Option<SymbolId> {
        let index = &self.files.get(file)?.index;
        let token = match node.kind() {
            SyntaxKind::NameExpression
            | SyntaxKind::TypeRef
            | SyntaxKind::VariableDeclarator
            | SyntaxKind::Parameter
            | SyntaxKind::TypeParameter
            | SyntaxKind::FunctionDeclaration
            | SyntaxKind::FunctionExpression
            | SyntaxKind::ClassDeclaration => support::ident_token(node)?,
            _ => return None,
        };
        let local = index.resolve_token(&token)?;
        Some(SymbolId {
            file: file.clone(),
            local,
        })
    }

    fn declaration_of(&self, symbol: &SymbolId) -> Option<Declaration> {
        let index = &self.files.get(&symbol.file)?.index;
        let data = index.symbol(symbol.local)?;
        let type_refs = data
            .type_refs
            .iter()
            .filter_map(|range| index.symbol_at(*range))
            .map(|local| SymbolId {
                file: symbol.file.clone(),
                local,
            })
            .collect();
        Some(Declaration {
            file: symbol.file.clone(),
            name: data.name.clone(),
            kind: data.kind,
            name_range: data.name_range,
            range: data.decl_range,
            scope_range: data.scope_range,
            ty: data.ty.clone(),
            type_refs,
        })
    }

    fn find_references(
        &self,
        symbol: &SymbolId,
        cancel: &CancellationToken,
    ) -> Result<Vec<Reference>, Cancelled> {
        cancel.check()?;
        let Some(file) = self.files.get(&symbol.file) else {
            return Ok(Vec::new());
        };
        let refs = file.index.references(symbol.local, cancel)?;
        tracing::trace!(symbol = ?symbol, count = refs.len(), "found references");
        Ok(refs
            .into_iter()
            .map(|r| Reference {
                file: symbol.file.clone(),
                range: r.range,
                access: r.access,
            })
            .collect())
    }
}
