use std::collections::VecDeque;

use lift_core::TextRange;
#[cfg(test)]
use rowan::NodeOrToken;
use rowan::{Checkpoint, GreenNode, GreenNodeBuilder};
use text_size::TextSize;

use crate::lexer::{lex, Token};
use crate::syntax_kind::{ScriptLanguage, SyntaxKind};
use crate::ParseError;

pub type SyntaxNode = rowan::SyntaxNode<ScriptLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<ScriptLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<ScriptLanguage>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptParse {
    pub green: GreenNode,
    pub errors: Vec<ParseError>,
}

impl ScriptParse {
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn token_at_offset(&self, offset: usize) -> rowan::TokenAtOffset<SyntaxToken> {
        self.syntax().token_at_offset(TextSize::from(offset as u32))
    }
}

/// Parse a whole script into a lossless syntax tree.
///
/// Parsing never fails: malformed input produces `Error` nodes plus entries in
/// [`ScriptParse::errors`].
///
/// Trivia is attached so that no node starts or ends with whitespace or
/// comments; leading trivia of a statement belongs to its parent.
pub fn parse_script(input: &str) -> ScriptParse {
    let parse = Parser::new(input).parse();
    tracing::trace!(len = input.len(), errors = parse.errors.len(), "parsed script");
    parse
}

struct Parser<'a> {
    input: &'a str,
    tokens: VecDeque<Token>,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            tokens: VecDeque::from(lex(input)),
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn parse(mut self) -> ScriptParse {
        self.builder.start_node(SyntaxKind::SourceFile.into());
        self.parse_statement_list(&[]);
        self.eat_trivia();
        self.builder.finish_node();

        ScriptParse {
            green: self.builder.finish(),
            errors: self.errors,
        }
    }

    // --- statements ---

    fn parse_statement_list(&mut self, terminators: &[SyntaxKind]) {
        loop {
            let kind = self.current();
            if kind == SyntaxKind::Eof || terminators.contains(&kind) {
                break;
            }
            let before = self.tokens.len();
            self.parse_statement();
            if self.tokens.len() == before {
                // Never loop without consuming input.
                self.start_node(SyntaxKind::Error);
                self.error_here("unexpected token");
                self.bump();
                self.finish_node();
            }
        }
    }

    fn parse_statement(&mut self) {
        match self.current() {
            SyntaxKind::LBrace => self.parse_block(),
            SyntaxKind::VarKw | SyntaxKind::LetKw | SyntaxKind::ConstKw => {
                self.parse_variable_statement()
            }
            SyntaxKind::FunctionKw => self.parse_function(SyntaxKind::FunctionDeclaration),
            SyntaxKind::AsyncKw if self.nth(1) == SyntaxKind::FunctionKw => {
                self.parse_function(SyntaxKind::FunctionDeclaration)
            }
            SyntaxKind::ClassKw => self.parse_class_declaration(),
            SyntaxKind::IfKw => self.parse_if_statement(),
            SyntaxKind::WhileKw => self.parse_while_statement(),
            SyntaxKind::DoKw => self.parse_do_statement(),
            SyntaxKind::ForKw => self.parse_for_statement(),
            SyntaxKind::ReturnKw => self.parse_return_statement(),
            SyntaxKind::BreakKw => self.parse_jump_statement(SyntaxKind::BreakStatement),
            SyntaxKind::ContinueKw => self.parse_jump_statement(SyntaxKind::ContinueStatement),
            SyntaxKind::ThrowKw => self.parse_throw_statement(),
            SyntaxKind::TryKw => self.parse_try_statement(),
            SyntaxKind::SwitchKw => self.parse_switch_statement(),
            SyntaxKind::Semicolon => {
                self.start_node(SyntaxKind::EmptyStatement);
                self.bump();
                self.finish_node();
            }
            SyntaxKind::Identifier if self.nth(1) == SyntaxKind::Colon => {
                self.start_node(SyntaxKind::LabeledStatement);
                self.bump();
                self.bump();
                self.parse_statement();
                self.finish_node();
            }
            kind if can_start_expression(kind) => {
                self.start_node(SyntaxKind::ExpressionStatement);
                self.parse_expression();
                self.expect_semicolon();
                self.finish_node();
            }
            _ => {}
        }
    }

    fn parse_block(&mut self) {
        self.start_node(SyntaxKind::Block);
        self.expect(SyntaxKind::LBrace, "expected `{`");
        self.parse_statement_list(&[SyntaxKind::RBrace]);
        self.expect(SyntaxKind::RBrace, "expected `}`");
        self.finish_node();
    }

    fn parse_variable_statement(&mut self) {
        self.start_node(SyntaxKind::VariableStatement);
        self.parse_variable_declaration_list();
        self.expect_semicolon();
        self.finish_node();
    }

    fn parse_variable_declaration_list(&mut self) {
        self.start_node(SyntaxKind::VariableDeclarationList);
        // var / let / const
        self.bump();
        self.parse_variable_declarator();
        while self.at(SyntaxKind::Comma) {
            self.bump();
            self.parse_variable_declarator();
        }
        self.finish_node();
    }

    fn parse_variable_declarator(&mut self) {
        self.start_node(SyntaxKind::VariableDeclarator);
        self.expect(SyntaxKind::Identifier, "expected variable name");
        if self.at(SyntaxKind::Colon) {
            self.parse_type_annotation();
        }
        if self.at(SyntaxKind::Eq) {
            self.bump();
            self.parse_assignment_expression();
        }
        self.finish_node();
    }

    /// Function declarations, function expressions and class methods share a shape:
    /// `async? function? *? name? <T>? (params) (: Type)? { body }`.
    fn parse_function(&mut self, kind: SyntaxKind) {
        self.start_node(kind);
        if self.at(SyntaxKind::AsyncKw) {
            self.bump();
        }
        if kind != SyntaxKind::MethodDeclaration {
            self.expect(SyntaxKind::FunctionKw, "expected `function`");
        }
        if self.at(SyntaxKind::Star) {
            self.bump();
        }
        if self.at(SyntaxKind::Identifier) {
            self.bump();
        } else if kind != SyntaxKind::FunctionExpression {
            self.error_here("expected function name");
        }
        if self.at(SyntaxKind::Less) {
            self.parse_type_parameter_list();
        }
        self.parse_parameter_list();
        if self.at(SyntaxKind::Colon) {
            self.parse_type_annotation();
        }
        self.parse_block();
        self.finish_node();
    }

    fn parse_class_declaration(&mut self) {
        self.start_node(SyntaxKind::ClassDeclaration);
        self.bump();
        self.expect(SyntaxKind::Identifier, "expected class name");
        if self.at(SyntaxKind::Less) {
            self.parse_type_parameter_list();
        }

        self.start_node(SyntaxKind::ClassBody);
        self.expect(SyntaxKind::LBrace, "expected `{`");
        loop {
            match self.current() {
                SyntaxKind::RBrace | SyntaxKind::Eof => break,
                SyntaxKind::Semicolon => self.bump(),
                SyntaxKind::Identifier | SyntaxKind::AsyncKw | SyntaxKind::Star => {
                    self.parse_function(SyntaxKind::MethodDeclaration)
                }
                _ => {
                    self.start_node(SyntaxKind::Error);
                    self.error_here("expected class member");
                    self.bump();
                    self.finish_node();
                }
            }
        }
        self.expect(SyntaxKind::RBrace, "expected `}`");
        self.finish_node();

        self.finish_node();
    }

    fn parse_type_parameter_list(&mut self) {
        self.start_node(SyntaxKind::TypeParameterList);
        self.bump();
        loop {
            self.start_node(SyntaxKind::TypeParameter);
            self.expect(SyntaxKind::Identifier, "expected type parameter name");
            self.finish_node();
            if !self.at(SyntaxKind::Comma) {
                break;
            }
            self.bump();
        }
        self.expect(SyntaxKind::Greater, "expected `>`");
        self.finish_node();
    }

    fn parse_parameter_list(&mut self) {
        self.start_node(SyntaxKind::ParameterList);
        self.expect(SyntaxKind::LParen, "expected `(`");
        while !self.at(SyntaxKind::RParen) && !self.at(SyntaxKind::Eof) {
            self.parse_parameter();
            if !self.at(SyntaxKind::Comma) {
                break;
            }
            self.bump();
        }
        self.expect(SyntaxKind::RParen, "expected `)`");
        self.finish_node();
    }

    fn parse_parameter(&mut self) {
        self.start_node(SyntaxKind::Parameter);
        self.expect(SyntaxKind::Identifier, "expected parameter name");
        if self.at(SyntaxKind::Colon) {
            self.parse_type_annotation();
        }
        if self.at(SyntaxKind::Eq) {
            self.bump();
            self.parse_assignment_expression();
        }
        self.finish_node();
    }

    fn parse_type_annotation(&mut self) {
        self.start_node(SyntaxKind::TypeAnnotation);
        self.expect(SyntaxKind::Colon, "expected `:`");
        self.parse_type_ref();
        self.finish_node();
    }

    fn parse_type_ref(&mut self) {
        self.start_node(SyntaxKind::TypeRef);
        match self.current() {
            SyntaxKind::Identifier | SyntaxKind::NullKw | SyntaxKind::ThisKw => self.bump(),
            _ => self.error_here("expected type"),
        }
        if self.at(SyntaxKind::Less) {
            self.bump();
            loop {
                self.parse_type_ref();
                if !self.at(SyntaxKind::Comma) {
                    break;
                }
                self.bump();
            }
            self.expect(SyntaxKind::Greater, "expected `>`");
        }
        while self.at(SyntaxKind::LBracket) && self.nth(1) == SyntaxKind::RBracket {
            self.bump();
            self.bump();
        }
        self.finish_node();
    }

    fn parse_if_statement(&mut self) {
        self.start_node(SyntaxKind::IfStatement);
        self.bump();
        self.parse_parenthesized_condition();
        self.parse_embedded_statement();
        if self.at(SyntaxKind::ElseKw) {
            self.bump();
            self.parse_embedded_statement();
        }
        self.finish_node();
    }

    fn parse_while_statement(&mut self) {
        self.start_node(SyntaxKind::WhileStatement);
        self.bump();
        self.parse_parenthesized_condition();
        self.parse_embedded_statement();
        self.finish_node();
    }

    fn parse_do_statement(&mut self) {
        self.start_node(SyntaxKind::DoStatement);
        self.bump();
        self.parse_embedded_statement();
        self.expect(SyntaxKind::WhileKw, "expected `while`");
        self.parse_parenthesized_condition();
        if self.at(SyntaxKind::Semicolon) {
            self.bump();
        }
        self.finish_node();
    }

    fn parse_for_statement(&mut self) {
        let checkpoint = self.checkpoint();
        self.bump();
        self.expect(SyntaxKind::LParen, "expected `(`");

        self.start_node(SyntaxKind::ForHeader);
        match self.current() {
            SyntaxKind::VarKw | SyntaxKind::LetKw | SyntaxKind::ConstKw => {
                self.parse_variable_declaration_list()
            }
            SyntaxKind::Semicolon => {}
            _ => self.parse_expression(),
        }
        let kind = if self.at(SyntaxKind::InKw) {
            self.bump();
            self.parse_expression();
            SyntaxKind::ForInStatement
        } else if self.at_contextual("of") {
            self.bump();
            self.parse_assignment_expression();
            SyntaxKind::ForOfStatement
        } else {
            self.expect(SyntaxKind::Semicolon, "expected `;`");
            if !self.at(SyntaxKind::Semicolon) {
                self.parse_expression();
            }
            self.expect(SyntaxKind::Semicolon, "expected `;`");
            if !self.at(SyntaxKind::RParen) {
                self.parse_expression();
            }
            SyntaxKind::ForStatement
        };
        self.finish_node();

        self.expect(SyntaxKind::RParen, "expected `)`");
        self.builder.start_node_at(checkpoint, kind.into());
        self.parse_embedded_statement();
        self.finish_node();
    }

    fn parse_return_statement(&mut self) {
        self.start_node(SyntaxKind::ReturnStatement);
        self.bump();
        if !self.at_statement_end() {
            self.parse_expression();
        }
        self.expect_semicolon();
        self.finish_node();
    }

    fn parse_jump_statement(&mut self, kind: SyntaxKind) {
        self.start_node(kind);
        self.bump();
        if self.at(SyntaxKind::Identifier) && !self.newline_before_current() {
            self.bump();
        }
        self.expect_semicolon();
        self.finish_node();
    }

    fn parse_throw_statement(&mut self) {
        self.start_node(SyntaxKind::ThrowStatement);
        self.bump();
        self.parse_expression();
        self.expect_semicolon();
        self.finish_node();
    }

    fn parse_try_statement(&mut self) {
        self.start_node(SyntaxKind::TryStatement);
        self.bump();
        self.parse_block();
        if self.at(SyntaxKind::CatchKw) {
            self.start_node(SyntaxKind::CatchClause);
            self.bump();
            if self.at(SyntaxKind::LParen) {
                self.bump();
                self.parse_parameter();
                self.expect(SyntaxKind::RParen, "expected `)`");
            }
            self.parse_block();
            self.finish_node();
        }
        if self.at(SyntaxKind::FinallyKw) {
            self.start_node(SyntaxKind::FinallyClause);
            self.bump();
            self.parse_block();
            self.finish_node();
        }
        self.finish_node();
    }

    fn parse_switch_statement(&mut self) {
        self.start_node(SyntaxKind::SwitchStatement);
        self.bump();
        self.parse_parenthesized_condition();

        self.start_node(SyntaxKind::CaseBlock);
        self.expect(SyntaxKind::LBrace, "expected `{`");
        loop {
            match self.current() {
                SyntaxKind::CaseKw => {
                    self.start_node(SyntaxKind::CaseClause);
                    self.bump();
                    self.parse_expression();
                    self.expect(SyntaxKind::Colon, "expected `:`");
                    self.parse_case_statements();
                    self.finish_node();
                }
                SyntaxKind::DefaultKw => {
                    self.start_node(SyntaxKind::DefaultClause);
                    self.bump();
                    self.expect(SyntaxKind::Colon, "expected `:`");
                    self.parse_case_statements();
                    self.finish_node();
                }
                SyntaxKind::RBrace | SyntaxKind::Eof => break,
                _ => {
                    self.start_node(SyntaxKind::Error);
                    self.error_here("expected `case` or `default`");
                    self.bump();
                    self.finish_node();
                }
            }
        }
        self.expect(SyntaxKind::RBrace, "expected `}`");
        self.finish_node();

        self.finish_node();
    }

    fn parse_case_statements(&mut self) {
        self.parse_statement_list(&[SyntaxKind::CaseKw, SyntaxKind::DefaultKw, SyntaxKind::RBrace]);
    }

    /// Statement in a position that requires exactly one (`if` branches, loop bodies).
    fn parse_embedded_statement(&mut self) {
        let before = self.tokens.len();
        self.parse_statement();
        if self.tokens.len() == before {
            self.error_here("expected statement");
        }
    }

    fn parse_parenthesized_condition(&mut self) {
        self.expect(SyntaxKind::LParen, "expected `(`");
        self.parse_expression();
        self.expect(SyntaxKind::RParen, "expected `)`");
    }

    // --- expressions ---

    fn parse_expression(&mut self) {
        self.parse_assignment_expression();
    }

    fn parse_assignment_expression(&mut self) {
        if self.at_arrow_function() {
            self.parse_arrow_function();
            return;
        }
        if self.at(SyntaxKind::YieldKw) {
            self.start_node(SyntaxKind::YieldExpression);
            self.bump();
            if self.at(SyntaxKind::Star) {
                self.bump();
            }
            if !self.at_statement_end() && can_start_expression(self.current()) {
                self.parse_assignment_expression();
            }
            self.finish_node();
            return;
        }

        let checkpoint = self.checkpoint();
        self.parse_conditional_expression();
        if self.current().is_assignment_operator() {
            self.builder
                .start_node_at(checkpoint, SyntaxKind::AssignmentExpression.into());
            self.bump();
            self.parse_assignment_expression();
            self.finish_node();
        }
    }

    fn parse_conditional_expression(&mut self) {
        let checkpoint = self.checkpoint();
        self.parse_binary_expression(0);
        if self.at(SyntaxKind::Question) {
            self.builder
                .start_node_at(checkpoint, SyntaxKind::ConditionalExpression.into());
            self.bump();
            self.parse_assignment_expression();
            self.expect(SyntaxKind::Colon, "expected `:`");
            self.parse_assignment_expression();
            self.finish_node();
        }
    }

    fn parse_binary_expression(&mut self, min_bp: u8) {
        let checkpoint = self.checkpoint();
        self.parse_unary_expression();
        while let Some((l_bp, r_bp)) = infix_binding_power(self.current()) {
            if l_bp < min_bp {
                break;
            }
            self.builder
                .start_node_at(checkpoint, SyntaxKind::BinaryExpression.into());
            self.bump();
            self.parse_binary_expression(r_bp);
            self.finish_node();
        }
    }

    fn parse_unary_expression(&mut self) {
        match self.current() {
            SyntaxKind::Bang
            | SyntaxKind::Minus
            | SyntaxKind::Plus
            | SyntaxKind::PlusPlus
            | SyntaxKind::MinusMinus => {
                self.start_node(SyntaxKind::PrefixUnaryExpression);
                self.bump();
                self.parse_unary_expression();
                self.finish_node();
            }
            SyntaxKind::AwaitKw => {
                self.start_node(SyntaxKind::AwaitExpression);
                self.bump();
                self.parse_unary_expression();
                self.finish_node();
            }
            _ => self.parse_postfix_expression(),
        }
    }

    fn parse_postfix_expression(&mut self) {
        let checkpoint = self.checkpoint();
        if self.at(SyntaxKind::NewKw) {
            self.parse_new_expression();
        } else {
            self.parse_primary_expression();
        }

        loop {
            match self.current() {
                SyntaxKind::Dot => {
                    self.builder
                        .start_node_at(checkpoint, SyntaxKind::MemberExpression.into());
                    self.bump();
                    self.expect_property_name();
                    self.finish_node();
                }
                SyntaxKind::LBracket => {
                    self.builder
                        .start_node_at(checkpoint, SyntaxKind::MemberExpression.into());
                    self.bump();
                    self.parse_expression();
                    self.expect(SyntaxKind::RBracket, "expected `]`");
                    self.finish_node();
                }
                SyntaxKind::LParen => {
                    self.builder
                        .start_node_at(checkpoint, SyntaxKind::CallExpression.into());
                    self.parse_argument_list();
                    self.finish_node();
                }
                SyntaxKind::PlusPlus | SyntaxKind::MinusMinus
                    if !self.newline_before_current() =>
                {
                    self.builder
                        .start_node_at(checkpoint, SyntaxKind::PostfixUnaryExpression.into());
                    self.bump();
                    self.finish_node();
                }
                _ => break,
            }
        }
    }

    fn parse_new_expression(&mut self) {
        self.start_node(SyntaxKind::NewExpression);
        self.bump();
        let checkpoint = self.checkpoint();
        self.parse_primary_expression();
        while self.at(SyntaxKind::Dot) {
            self.builder
                .start_node_at(checkpoint, SyntaxKind::MemberExpression.into());
            self.bump();
            self.expect_property_name();
            self.finish_node();
        }
        if self.at(SyntaxKind::LParen) {
            self.parse_argument_list();
        }
        self.finish_node();
    }

    fn parse_argument_list(&mut self) {
        self.start_node(SyntaxKind::ArgumentList);
        self.bump();
        while !self.at(SyntaxKind::RParen) && !self.at(SyntaxKind::Eof) {
            self.parse_assignment_expression();
            if !self.at(SyntaxKind::Comma) {
                break;
            }
            self.bump();
        }
        self.expect(SyntaxKind::RParen, "expected `)`");
        self.finish_node();
    }

    fn parse_primary_expression(&mut self) {
        match self.current() {
            SyntaxKind::Identifier => {
                self.start_node(SyntaxKind::NameExpression);
                self.bump();
                self.finish_node();
            }
            SyntaxKind::NumberLiteral
            | SyntaxKind::StringLiteral
            | SyntaxKind::TrueKw
            | SyntaxKind::FalseKw
            | SyntaxKind::NullKw => {
                self.start_node(SyntaxKind::LiteralExpression);
                self.bump();
                self.finish_node();
            }
            SyntaxKind::ThisKw => {
                self.start_node(SyntaxKind::ThisExpression);
                self.bump();
                self.finish_node();
            }
            SyntaxKind::LParen => {
                self.start_node(SyntaxKind::ParenthesizedExpression);
                self.bump();
                self.parse_expression();
                self.expect(SyntaxKind::RParen, "expected `)`");
                self.finish_node();
            }
            SyntaxKind::LBracket => {
                self.start_node(SyntaxKind::ArrayExpression);
                self.bump();
                while !self.at(SyntaxKind::RBracket) && !self.at(SyntaxKind::Eof) {
                    self.parse_assignment_expression();
                    if !self.at(SyntaxKind::Comma) {
                        break;
                    }
                    self.bump();
                }
                self.expect(SyntaxKind::RBracket, "expected `]`");
                self.finish_node();
            }
            SyntaxKind::FunctionKw | SyntaxKind::AsyncKw => {
                self.parse_function(SyntaxKind::FunctionExpression)
            }
            _ => self.error_here("expected expression"),
        }
    }

    fn at_arrow_function(&self) -> bool {
        let offset = usize::from(self.at(SyntaxKind::AsyncKw));
        match self.nth(offset) {
            SyntaxKind::Identifier => self.nth(offset + 1) == SyntaxKind::Arrow,
            SyntaxKind::LParen => {
                let Some(idx) = self.nth_index(offset) else {
                    return false;
                };
                let after = skip_balanced_parens(&self.tokens, idx);
                let next = skip_trivia(&self.tokens, after);
                match self.tokens.get(next).map(|t| t.kind) {
                    Some(SyntaxKind::Arrow) => true,
                    // `(x): T => ...`
                    Some(SyntaxKind::Colon) => {
                        let ty = skip_trivia(&self.tokens, next + 1);
                        let arrow = skip_trivia(&self.tokens, ty + 1);
                        self.tokens.get(ty).map(|t| t.kind) == Some(SyntaxKind::Identifier)
                            && self.tokens.get(arrow).map(|t| t.kind) == Some(SyntaxKind::Arrow)
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }

    fn parse_arrow_function(&mut self) {
        self.start_node(SyntaxKind::ArrowFunction);
        if self.at(SyntaxKind::AsyncKw) {
            self.bump();
        }
        if self.at(SyntaxKind::Identifier) {
            self.start_node(SyntaxKind::ParameterList);
            self.parse_parameter();
            self.finish_node();
        } else {
            self.parse_parameter_list();
        }
        if self.at(SyntaxKind::Colon) {
            self.parse_type_annotation();
        }
        self.expect(SyntaxKind::Arrow, "expected `=>`");
        if self.at(SyntaxKind::LBrace) {
            self.parse_block();
        } else {
            self.parse_assignment_expression();
        }
        self.finish_node();
    }

    // --- token plumbing ---

    fn start_node(&mut self, kind: SyntaxKind) {
        self.eat_trivia();
        self.builder.start_node(kind.into());
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.eat_trivia();
        self.builder.checkpoint()
    }

    /// Index of the `n`th non-trivia token in the queue.
    fn nth_index(&self, n: usize) -> Option<usize> {
        self.tokens
            .iter()
            .enumerate()
            .filter(|(_, tok)| !tok.kind.is_trivia())
            .nth(n)
            .map(|(idx, _)| idx)
    }

    fn nth(&self, n: usize) -> SyntaxKind {
        self.nth_index(n)
            .map(|idx| self.tokens[idx].kind)
            .unwrap_or(SyntaxKind::Eof)
    }

    fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    fn at_contextual(&self, text: &str) -> bool {
        self.nth_index(0)
            .map(|idx| self.tokens[idx])
            .is_some_and(|tok| tok.kind == SyntaxKind::Identifier && tok.text(self.input) == text)
    }

    fn at_statement_end(&self) -> bool {
        matches!(
            self.current(),
            SyntaxKind::Semicolon | SyntaxKind::RBrace | SyntaxKind::RParen | SyntaxKind::Eof
        ) || self.newline_before_current()
    }

    fn newline_before_current(&self) -> bool {
        self.tokens
            .iter()
            .take_while(|tok| tok.kind.is_trivia())
            .any(|tok| tok.text(self.input).contains('\n'))
    }

    fn eat_trivia(&mut self) {
        while self.tokens.front().is_some_and(|t| t.kind.is_trivia()) {
            self.bump_any();
        }
    }

    fn bump(&mut self) {
        self.eat_trivia();
        if let Some(tok) = self.tokens.front().copied() {
            if tok.kind == SyntaxKind::Error {
                self.errors.push(ParseError {
                    message: "unexpected character".to_string(),
                    range: tok.range,
                });
            }
        }
        self.bump_any();
    }

    fn bump_any(&mut self) {
        if let Some(tok) = self.tokens.pop_front() {
            let text = tok.text(self.input);
            self.builder.token(tok.kind.into(), text);
        }
    }

    fn expect(&mut self, kind: SyntaxKind, message: &str) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            self.error_here(message);
            false
        }
    }

    /// Property names after `.` may be keywords (`a.default`, `p.then`).
    fn expect_property_name(&mut self) {
        let kind = self.current();
        if kind == SyntaxKind::Identifier || kind.is_keyword() {
            self.eat_trivia();
            if let Some(tok) = self.tokens.pop_front() {
                self.builder
                    .token(SyntaxKind::Identifier.into(), tok.text(self.input));
            }
        } else {
            self.error_here("expected property name");
        }
    }

    /// Semicolons are optional before `}`, at end of input and after a line break.
    fn expect_semicolon(&mut self) {
        if self.at(SyntaxKind::Semicolon) {
            self.bump();
        } else if !matches!(self.current(), SyntaxKind::RBrace | SyntaxKind::Eof)
            && !self.newline_before_current()
        {
            self.error_here("expected `;`");
        }
    }

    fn error_here(&mut self, message: &str) {
        let range = self.current_range();
        self.errors.push(ParseError {
            message: message.to_string(),
            range,
        });
    }

    fn current_range(&self) -> TextRange {
        self.nth_index(0)
            .map(|idx| self.tokens[idx].range)
            .unwrap_or_else(|| TextRange::empty(self.input.len()))
    }
}

fn skip_trivia(tokens: &VecDeque<Token>, mut idx: usize) -> usize {
    while tokens.get(idx).is_some_and(|t| t.kind.is_trivia()) {
        idx += 1;
    }
    idx
}

fn skip_balanced_parens(tokens: &VecDeque<Token>, mut idx: usize) -> usize {
    // Assumes `tokens[idx]` is `(`.
    let mut depth = 0usize;
    while let Some(tok) = tokens.get(idx) {
        idx += 1;
        match tok.kind {
            SyntaxKind::LParen => depth += 1,
            SyntaxKind::RParen => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
    }
    idx
}

fn can_start_expression(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::Identifier
            | SyntaxKind::NumberLiteral
            | SyntaxKind::StringLiteral
            | SyntaxKind::TrueKw
            | SyntaxKind::FalseKw
            | SyntaxKind::NullKw
            | SyntaxKind::ThisKw
            | SyntaxKind::NewKw
            | SyntaxKind::FunctionKw
            | SyntaxKind::AsyncKw
            | SyntaxKind::AwaitKw
            | SyntaxKind::YieldKw
            | SyntaxKind::LParen
            | SyntaxKind::LBracket
            | SyntaxKind::Plus
            | SyntaxKind::Minus
            | SyntaxKind::Bang
            | SyntaxKind::PlusPlus
            | SyntaxKind::MinusMinus
    )
}

fn infix_binding_power(op: SyntaxKind) -> Option<(u8, u8)> {
    // Left-associative: (bp, bp + 1). Larger = tighter binding.
    let bp = match op {
        SyntaxKind::Star | SyntaxKind::Slash | SyntaxKind::Percent => 60,
        SyntaxKind::Plus | SyntaxKind::Minus => 50,
        SyntaxKind::Less | SyntaxKind::LessEq | SyntaxKind::Greater | SyntaxKind::GreaterEq => 40,
        SyntaxKind::EqEq | SyntaxKind::EqEqEq | SyntaxKind::BangEq | SyntaxKind::BangEqEq => 30,
        SyntaxKind::AmpAmp => 20,
        SyntaxKind::PipePipe => 10,
        _ => return None,
    };
    Some((bp, bp + 1))
}

// --- debug helpers used by tests ---

#[cfg(test)]
pub fn debug_dump(node: &SyntaxNode) -> String {
    fn go(node: &SyntaxNode, indent: usize, out: &mut String) {
        use std::fmt::Write;
        let _ = writeln!(out, "{:indent$}{:?}", "", node.kind(), indent = indent);
        for child in node.children_with_tokens() {
            match child {
                NodeOrToken::Node(n) => go(&n, indent + 2, out),
                NodeOrToken::Token(t) => {
                    if t.kind().is_trivia() {
                        continue;
                    }
                    let _ = writeln!(
                        out,
                        "{:indent$}{:?} {:?}",
                        "",
                        t.kind(),
                        t.text(),
                        indent = indent + 2
                    );
                }
            }
        }
    }

    let mut out = String::new();
    go(node, 0, &mut out);
    out
}
