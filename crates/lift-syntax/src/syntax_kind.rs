use rowan::Language;

/// Unified syntax kind for both tokens and tree nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    // --- Trivia ---
    Whitespace,
    LineComment,
    BlockComment,

    // --- Identifiers & literals ---
    Identifier,
    NumberLiteral,
    StringLiteral,

    // --- Keywords ---
    AsyncKw,
    AwaitKw,
    BreakKw,
    CaseKw,
    CatchKw,
    ClassKw,
    ConstKw,
    ContinueKw,
    DefaultKw,
    DoKw,
    ElseKw,
    FalseKw,
    FinallyKw,
    ForKw,
    FunctionKw,
    IfKw,
    InKw,
    LetKw,
    NewKw,
    NullKw,
    ReturnKw,
    SwitchKw,
    ThisKw,
    ThrowKw,
    TrueKw,
    TryKw,
    VarKw,
    WhileKw,
    YieldKw,

    // --- Punctuation ---
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Dot,
    Colon,
    Question,
    Arrow,

    // --- Operators ---
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Eq,
    EqEq,
    EqEqEq,
    BangEq,
    BangEqEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    AmpAmp,
    PipePipe,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    PlusPlus,
    MinusMinus,

    // --- Special ---
    Error,
    Eof,

    // --- Nodes: declarations ---
    SourceFile,
    FunctionDeclaration,
    ClassDeclaration,
    ClassBody,
    MethodDeclaration,
    TypeParameterList,
    TypeParameter,
    ParameterList,
    Parameter,
    TypeAnnotation,
    TypeRef,
    VariableDeclarationList,
    VariableDeclarator,

    // --- Nodes: statements ---
    Block,
    VariableStatement,
    ExpressionStatement,
    IfStatement,
    WhileStatement,
    DoStatement,
    ForStatement,
    ForInStatement,
    ForOfStatement,
    ForHeader,
    ReturnStatement,
    BreakStatement,
    ContinueStatement,
    ThrowStatement,
    TryStatement,
    CatchClause,
    FinallyClause,
    SwitchStatement,
    CaseBlock,
    CaseClause,
    DefaultClause,
    LabeledStatement,
    EmptyStatement,

    // --- Nodes: expressions ---
    LiteralExpression,
    NameExpression,
    ThisExpression,
    ParenthesizedExpression,
    ArrayExpression,
    BinaryExpression,
    AssignmentExpression,
    ConditionalExpression,
    PrefixUnaryExpression,
    PostfixUnaryExpression,
    CallExpression,
    NewExpression,
    ArgumentList,
    MemberExpression,
    FunctionExpression,
    ArrowFunction,
    AwaitExpression,
    YieldExpression,

    __Last,
}

impl SyntaxKind {
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            SyntaxKind::Whitespace | SyntaxKind::LineComment | SyntaxKind::BlockComment
        )
    }

    pub fn is_keyword(self) -> bool {
        (self as u16) >= (SyntaxKind::AsyncKw as u16) && (self as u16) <= (SyntaxKind::YieldKw as u16)
    }

    /// Node kinds that can appear in a statement list.
    pub fn is_statement(self) -> bool {
        matches!(
            self,
            SyntaxKind::Block
                | SyntaxKind::VariableStatement
                | SyntaxKind::ExpressionStatement
                | SyntaxKind::IfStatement
                | SyntaxKind::WhileStatement
                | SyntaxKind::DoStatement
                | SyntaxKind::ForStatement
                | SyntaxKind::ForInStatement
                | SyntaxKind::ForOfStatement
                | SyntaxKind::ReturnStatement
                | SyntaxKind::BreakStatement
                | SyntaxKind::ContinueStatement
                | SyntaxKind::ThrowStatement
                | SyntaxKind::TryStatement
                | SyntaxKind::SwitchStatement
                | SyntaxKind::LabeledStatement
                | SyntaxKind::EmptyStatement
                | SyntaxKind::FunctionDeclaration
                | SyntaxKind::ClassDeclaration
        )
    }

    pub fn is_expression(self) -> bool {
        matches!(
            self,
            SyntaxKind::LiteralExpression
                | SyntaxKind::NameExpression
                | SyntaxKind::ThisExpression
                | SyntaxKind::ParenthesizedExpression
                | SyntaxKind::ArrayExpression
                | SyntaxKind::BinaryExpression
                | SyntaxKind::AssignmentExpression
                | SyntaxKind::ConditionalExpression
                | SyntaxKind::PrefixUnaryExpression
                | SyntaxKind::PostfixUnaryExpression
                | SyntaxKind::CallExpression
                | SyntaxKind::NewExpression
                | SyntaxKind::MemberExpression
                | SyntaxKind::FunctionExpression
                | SyntaxKind::ArrowFunction
                | SyntaxKind::AwaitExpression
                | SyntaxKind::YieldExpression
        )
    }

    /// Function-like nodes: anything with its own parameter list and body.
    pub fn is_callable(self) -> bool {
        matches!(
            self,
            SyntaxKind::FunctionDeclaration
                | SyntaxKind::FunctionExpression
                | SyntaxKind::ArrowFunction
                | SyntaxKind::MethodDeclaration
        )
    }

    pub fn is_class_like(self) -> bool {
        matches!(self, SyntaxKind::ClassDeclaration | SyntaxKind::ClassBody)
    }

    /// Containers whose direct statement children form an ordered statement list.
    pub fn is_block_like(self) -> bool {
        matches!(
            self,
            SyntaxKind::SourceFile
                | SyntaxKind::Block
                | SyntaxKind::CaseClause
                | SyntaxKind::DefaultClause
        )
    }

    pub fn is_loop(self) -> bool {
        matches!(
            self,
            SyntaxKind::WhileStatement
                | SyntaxKind::DoStatement
                | SyntaxKind::ForStatement
                | SyntaxKind::ForInStatement
                | SyntaxKind::ForOfStatement
        )
    }

    pub fn is_assignment_operator(self) -> bool {
        matches!(
            self,
            SyntaxKind::Eq
                | SyntaxKind::PlusEq
                | SyntaxKind::MinusEq
                | SyntaxKind::StarEq
                | SyntaxKind::SlashEq
                | SyntaxKind::PercentEq
        )
    }

    pub fn from_keyword(text: &str) -> Option<SyntaxKind> {
        Some(match text {
            "async" => SyntaxKind::AsyncKw,
            "await" => SyntaxKind::AwaitKw,
            "break" => SyntaxKind::BreakKw,
            "case" => SyntaxKind::CaseKw,
            "catch" => SyntaxKind::CatchKw,
            "class" => SyntaxKind::ClassKw,
            "const" => SyntaxKind::ConstKw,
            "continue" => SyntaxKind::ContinueKw,
            "default" => SyntaxKind::DefaultKw,
            "do" => SyntaxKind::DoKw,
            "else" => SyntaxKind::ElseKw,
            "false" => SyntaxKind::FalseKw,
            "finally" => SyntaxKind::FinallyKw,
            "for" => SyntaxKind::ForKw,
            "function" => SyntaxKind::FunctionKw,
            "if" => SyntaxKind::IfKw,
            "in" => SyntaxKind::InKw,
            "let" => SyntaxKind::LetKw,
            "new" => SyntaxKind::NewKw,
            "null" => SyntaxKind::NullKw,
            "return" => SyntaxKind::ReturnKw,
            "switch" => SyntaxKind::SwitchKw,
            "this" => SyntaxKind::ThisKw,
            "throw" => SyntaxKind::ThrowKw,
            "true" => SyntaxKind::TrueKw,
            "try" => SyntaxKind::TryKw,
            "var" => SyntaxKind::VarKw,
            "while" => SyntaxKind::WhileKw,
            "yield" => SyntaxKind::YieldKw,
            _ => return None,
        })
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(value: SyntaxKind) -> Self {
        rowan::SyntaxKind(value as u16)
    }
}

/// Rowan language marker for Lift scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScriptLanguage {}

impl Language for ScriptLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> SyntaxKind {
        if raw.0 < SyntaxKind::__Last as u16 {
            // SAFETY: We've verified the numeric value is within the enum range.
            unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
        } else {
            SyntaxKind::Error
        }
    }

    fn kind_to_raw(kind: SyntaxKind) -> rowan::SyntaxKind {
        kind.into()
    }
}
