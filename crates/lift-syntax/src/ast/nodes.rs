use crate::ast::{support, AstNode};
use crate::parser::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name {
            syntax: SyntaxNode,
        }

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                kind == SyntaxKind::$kind
            }

            fn cast(syntax: SyntaxNode) -> Option<Self> {
                Self::can_cast(syntax.kind()).then_some(Self { syntax })
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.syntax
            }
        }
    };
}

ast_node!(SourceFile, SourceFile);
ast_node!(Block, Block);
ast_node!(ClassDeclaration, ClassDeclaration);
ast_node!(ClassBody, ClassBody);
ast_node!(TypeParameterList, TypeParameterList);
ast_node!(TypeParameter, TypeParameter);
ast_node!(ParameterList, ParameterList);
ast_node!(Parameter, Parameter);
ast_node!(TypeAnnotation, TypeAnnotation);
ast_node!(TypeRef, TypeRef);
ast_node!(VariableStatement, VariableStatement);
ast_node!(VariableDeclarationList, VariableDeclarationList);
ast_node!(VariableDeclarator, VariableDeclarator);
ast_node!(IfStatement, IfStatement);
ast_node!(ReturnStatement, ReturnStatement);
ast_node!(LabeledStatement, LabeledStatement);
ast_node!(CatchClause, CatchClause);
ast_node!(NameExpression, NameExpression);
ast_node!(AssignmentExpression, AssignmentExpression);
ast_node!(YieldExpression, YieldExpression);

impl SourceFile {
    pub fn statements(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.syntax.children().filter(|n| n.kind().is_statement())
    }
}

impl Block {
    pub fn statements(&self) -> impl Iterator<Item = SyntaxNode> + '_ {
        self.syntax.children().filter(|n| n.kind().is_statement())
    }
}

impl ClassDeclaration {
    pub fn name_token(&self) -> Option<SyntaxToken> {
        support::ident_token(&self.syntax)
    }

    pub fn type_parameter_list(&self) -> Option<TypeParameterList> {
        support::child(&self.syntax)
    }

    pub fn body(&self) -> Option<ClassBody> {
        support::child(&self.syntax)
    }
}

impl TypeParameterList {
    pub fn type_parameters(&self) -> impl Iterator<Item = TypeParameter> + '_ {
        support::children(&self.syntax)
    }
}

impl TypeParameter {
    pub fn name_token(&self) -> Option<SyntaxToken> {
        support::ident_token(&self.syntax)
    }
}

impl ParameterList {
    pub fn parameters(&self) -> impl Iterator<Item = Parameter> + '_ {
        support::children(&self.syntax)
    }
}

impl Parameter {
    pub fn name_token(&self) -> Option<SyntaxToken> {
        support::ident_token(&self.syntax)
    }

    pub fn type_annotation(&self) -> Option<TypeAnnotation> {
        support::child(&self.syntax)
    }
}

impl TypeAnnotation {
    pub fn ty(&self) -> Option<TypeRef> {
        support::child(&self.syntax)
    }
}

impl TypeRef {
    pub fn name_token(&self) -> Option<SyntaxToken> {
        support::ident_token(&self.syntax)
    }

    /// Type arguments (`Array<T>` -> `T`).
    pub fn type_arguments(&self) -> impl Iterator<Item = TypeRef> + '_ {
        support::children(&self.syntax)
    }
}

impl VariableStatement {
    pub fn declaration_list(&self) -> Option<VariableDeclarationList> {
        support::child(&self.syntax)
    }
}

impl VariableDeclarationList {
    /// The `var`/`let`/`const` keyword token.
    pub fn keyword(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|tok| {
                matches!(
                    tok.kind(),
                    SyntaxKind::VarKw | SyntaxKind::LetKw | SyntaxKind::ConstKw
                )
            })
    }

    pub fn declarators(&self) -> impl Iterator<Item = VariableDeclarator> + '_ {
        support::children(&self.syntax)
    }
}

impl VariableDeclarator {
    pub fn name_token(&self) -> Option<SyntaxToken> {
        support::ident_token(&self.syntax)
    }

    pub fn type_annotation(&self) -> Option<TypeAnnotation> {
        support::child(&self.syntax)
    }

    pub fn initializer(&self) -> Option<SyntaxNode> {
        self.syntax.children().find(|n| n.kind().is_expression())
    }
}

impl IfStatement {
    pub fn condition(&self) -> Option<SyntaxNode> {
        self.syntax.children().find(|n| n.kind().is_expression())
    }

    pub fn then_branch(&self) -> Option<SyntaxNode> {
        self.syntax.children().find(|n| n.kind().is_statement())
    }

    pub fn else_branch(&self) -> Option<SyntaxNode> {
        self.syntax.children().filter(|n| n.kind().is_statement()).nth(1)
    }
}

impl ReturnStatement {
    pub fn expression(&self) -> Option<SyntaxNode> {
        self.syntax.children().find(|n| n.kind().is_expression())
    }
}

impl LabeledStatement {
    pub fn label_token(&self) -> Option<SyntaxToken> {
        support::ident_token(&self.syntax)
    }

    pub fn body(&self) -> Option<SyntaxNode> {
        self.syntax.children().find(|n| n.kind().is_statement())
    }
}

impl CatchClause {
    pub fn parameter(&self) -> Option<Parameter> {
        support::child(&self.syntax)
    }

    pub fn body(&self) -> Option<Block> {
        support::child(&self.syntax)
    }
}

impl NameExpression {
    pub fn ident_token(&self) -> Option<SyntaxToken> {
        support::ident_token(&self.syntax)
    }
}

impl AssignmentExpression {
    pub fn lhs(&self) -> Option<SyntaxNode> {
        self.syntax.children().find(|n| n.kind().is_expression())
    }

    pub fn rhs(&self) -> Option<SyntaxNode> {
        self.syntax.children().filter(|n| n.kind().is_expression()).nth(1)
    }

    pub fn operator(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|tok| tok.kind().is_assignment_operator())
    }
}

impl YieldExpression {
    /// `yield*` delegates to another generator.
    pub fn is_delegating(&self) -> bool {
        support::token(&self.syntax, SyntaxKind::Star).is_some()
    }
}
