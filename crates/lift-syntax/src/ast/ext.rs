use super::support;
use crate::ast::{
    AstNode, Block, LabeledStatement, NameExpression, ParameterList, TypeAnnotation,
    TypeParameterList,
};
use crate::{SyntaxKind, SyntaxNode, SyntaxToken};

/// Any function-like node: function declarations and expressions, arrow
/// functions, class methods.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Callable {
    syntax: SyntaxNode,
}

impl AstNode for Callable {
    fn can_cast(kind: SyntaxKind) -> bool {
        kind.is_callable()
    }

    fn cast(syntax: SyntaxNode) -> Option<Self> {
        Self::can_cast(syntax.kind()).then_some(Self { syntax })
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.syntax
    }
}

impl Callable {
    pub fn kind(&self) -> SyntaxKind {
        self.syntax.kind()
    }

    /// Declared name; `None` for anonymous function expressions and arrows.
    pub fn name_token(&self) -> Option<SyntaxToken> {
        if self.kind() == SyntaxKind::ArrowFunction {
            return None;
        }
        support::ident_token(&self.syntax)
    }

    pub fn is_async(&self) -> bool {
        support::token(&self.syntax, SyntaxKind::AsyncKw).is_some()
    }

    pub fn is_generator(&self) -> bool {
        support::token(&self.syntax, SyntaxKind::Star).is_some()
    }

    pub fn type_parameter_list(&self) -> Option<TypeParameterList> {
        support::child(&self.syntax)
    }

    pub fn parameter_list(&self) -> Option<ParameterList> {
        support::child(&self.syntax)
    }

    pub fn return_type(&self) -> Option<TypeAnnotation> {
        support::child(&self.syntax)
    }

    /// Block body; `None` for arrow functions with an expression body.
    pub fn body(&self) -> Option<Block> {
        support::child(&self.syntax)
    }

    pub fn expression_body(&self) -> Option<SyntaxNode> {
        if self.kind() != SyntaxKind::ArrowFunction {
            return None;
        }
        self.syntax.children().find(|n| n.kind().is_expression())
    }
}

/// How a name occurrence touches its symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    Read,
    Write,
    /// Compound assignment and `++`/`--`: reads the old value, writes a new one.
    ReadWrite,
}

impl Access {
    pub fn is_read(self) -> bool {
        matches!(self, Access::Read | Access::ReadWrite)
    }

    pub fn is_write(self) -> bool {
        matches!(self, Access::Write | Access::ReadWrite)
    }
}

impl NameExpression {
    pub fn name(&self) -> Option<String> {
        self.ident_token().map(|tok| tok.text().to_string())
    }

    pub fn access(&self) -> Access {
        write_access(self.syntax()).unwrap_or(Access::Read)
    }
}

/// Write access for an assignment target, following parentheses and array
/// destructuring (`[a, b] = ...`). The head of `for (x in ...)` and
/// `for (x of ...)` is a target too.
fn write_access(target: &SyntaxNode) -> Option<Access> {
    let parent = target.parent()?;
    match parent.kind() {
        SyntaxKind::ForHeader => {
            let is_in_or_of = parent.parent().is_some_and(|stmt| {
                matches!(stmt.kind(), SyntaxKind::ForInStatement | SyntaxKind::ForOfStatement)
            });
            (is_in_or_of && parent.children().next().as_ref() == Some(target))
                .then_some(Access::Write)
        }
        SyntaxKind::ParenthesizedExpression => write_access(&parent),
        SyntaxKind::ArrayExpression => match write_access(&parent)? {
            Access::Write => Some(Access::Write),
            _ => None,
        },
        SyntaxKind::AssignmentExpression => {
            let assignment = super::AssignmentExpression::cast(parent)?;
            if assignment.lhs().as_ref() != Some(target) {
                return None;
            }
            match assignment.operator()?.kind() {
                SyntaxKind::Eq => Some(Access::Write),
                _ => Some(Access::ReadWrite),
            }
        }
        SyntaxKind::PrefixUnaryExpression | SyntaxKind::PostfixUnaryExpression => {
            let updates = parent
                .children_with_tokens()
                .filter_map(|it| it.into_token())
                .any(|tok| matches!(tok.kind(), SyntaxKind::PlusPlus | SyntaxKind::MinusMinus));
            updates.then_some(Access::ReadWrite)
        }
        _ => None,
    }
}

/// Label operand of a `break`/`continue` statement.
pub fn jump_label(statement: &SyntaxNode) -> Option<SyntaxToken> {
    match statement.kind() {
        SyntaxKind::BreakStatement | SyntaxKind::ContinueStatement => {
            support::ident_token(statement)
        }
        _ => None,
    }
}

/// The statement a `break`/`continue` leaves: the labeled statement it names,
/// else the innermost loop (or `switch`, for `break`). Never crosses a function
/// or class boundary.
pub fn jump_target(statement: &SyntaxNode) -> Option<SyntaxNode> {
    let is_break = match statement.kind() {
        SyntaxKind::BreakStatement => true,
        SyntaxKind::ContinueStatement => false,
        _ => return None,
    };
    let label = jump_label(statement);
    statement
        .ancestors()
        .skip(1)
        .take_while(|n| !n.kind().is_callable() && !n.kind().is_class_like())
        .find(|n| match &label {
            Some(label) => LabeledStatement::cast(n.clone())
                .and_then(|l| l.label_token())
                .is_some_and(|t| t.text() == label.text()),
            None => n.kind().is_loop() || (is_break && n.kind() == SyntaxKind::SwitchStatement),
        })
}

/// Statement children of a block-like container, in source order.
pub fn statements_of(container: &SyntaxNode) -> Vec<SyntaxNode> {
    if !container.kind().is_block_like() {
        return Vec::new();
    }
    container
        .children()
        .filter(|n| n.kind().is_statement())
        .collect()
}

/// The body statement of a loop (the last statement child).
pub fn loop_body(node: &SyntaxNode) -> Option<SyntaxNode> {
    if !node.kind().is_loop() {
        return None;
    }
    match node.kind() {
        SyntaxKind::DoStatement => node.children().find(|n| n.kind().is_statement()),
        _ => node.children().filter(|n| n.kind().is_statement()).last(),
    }
}
