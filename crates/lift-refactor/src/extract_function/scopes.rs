use lift_syntax::ast::{AstNode, Callable};
use lift_syntax::{SyntaxKind, SyntaxNode};

use super::range::RangeToExtract;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Global,
    Function,
    Method,
    FunctionExpression,
    Arrow,
}

/// A node that can host the extracted function: a callable or the file root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scope {
    pub node: SyntaxNode,
    pub kind: ScopeKind,
    pub name: Option<String>,
}

impl Scope {
    fn from_node(node: SyntaxNode) -> Option<Scope> {
        if node.kind() == SyntaxKind::SourceFile {
            return Some(Scope {
                node,
                kind: ScopeKind::Global,
                name: None,
            });
        }
        let callable = Callable::cast(node)?;
        let kind = match callable.kind() {
            SyntaxKind::FunctionDeclaration => ScopeKind::Function,
            SyntaxKind::MethodDeclaration => ScopeKind::Method,
            SyntaxKind::FunctionExpression => ScopeKind::FunctionExpression,
            _ => ScopeKind::Arrow,
        };
        Some(Scope {
            name: callable.name_token().map(|t| t.text().to_string()),
            kind,
            node: callable.syntax().clone(),
        })
    }

    /// Human-readable location used in action titles.
    pub fn description(&self) -> String {
        match (self.kind, self.name.as_deref()) {
            (ScopeKind::Global, _) => "global scope".to_string(),
            (ScopeKind::Method, Some(name)) => format!("method '{name}'"),
            (ScopeKind::Function | ScopeKind::FunctionExpression, Some(name)) => {
                format!("function '{name}'")
            }
            (ScopeKind::Arrow, _) => "arrow function".to_string(),
            (_, None) => "anonymous function".to_string(),
        }
    }

    /// The statement list new declarations go into; `None` for arrow functions
    /// with an expression body.
    pub fn body(&self) -> Option<SyntaxNode> {
        if self.kind == ScopeKind::Global {
            return Some(self.node.clone());
        }
        Callable::cast(self.node.clone())?
            .body()
            .map(|block| block.syntax().clone())
    }
}

/// Every scope enclosing `range`, innermost first, ending with the file root.
pub fn collect_enclosing_scopes(range: &RangeToExtract) -> Vec<Scope> {
    range
        .first_node()
        .ancestors()
        .skip(1)
        .filter_map(Scope::from_node)
        .collect()
}
