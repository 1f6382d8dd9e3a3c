use bitflags::bitflags;
use lift_syntax::ast::{jump_label, loop_body, AstNode, IfStatement, LabeledStatement};
use lift_syntax::{SyntaxKind, SyntaxNode};

bitflags! {
    /// Non-local control transfers that stay legal when a node is moved into
    /// a new function body.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PermittedJumps: u8 {
        const BREAK = 1 << 0;
        const CONTINUE = 1 << 1;
        const RETURN = 1 << 2;
        const YIELD = 1 << 3;
        const AWAIT = 1 << 4;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JumpViolation {
    UnlabeledBreak,
    UnlabeledContinue,
    UnknownLabel { label: String },
    Return,
    Yield,
    Await,
}

#[derive(Clone, Debug)]
struct JumpContext {
    permitted: PermittedJumps,
    labels: Vec<String>,
}

impl JumpContext {
    fn with_permitted(&self, permitted: PermittedJumps) -> JumpContext {
        JumpContext {
            permitted,
            labels: self.labels.clone(),
        }
    }
}

enum Step {
    Enter(JumpContext),
    Skip,
}

/// `true` when `node` can be moved into a new function body without any jump
/// inside it escaping its new home.
pub fn is_jump_safe(node: &SyntaxNode) -> bool {
    check_jumps(node).is_none()
}

/// The first jump in `node` (source order) that would be illegal in an
/// extracted function.
pub fn check_jumps(node: &SyntaxNode) -> Option<JumpViolation> {
    let context = JumpContext {
        permitted: initial_permitted(node),
        labels: Vec::new(),
    };
    visit(node, context)
}

/// Replays the transitions from the enclosing function (or class) boundary down
/// to `node`. Labels outside `node` are never visible.
fn initial_permitted(node: &SyntaxNode) -> PermittedJumps {
    let mut chain = Vec::new();
    let mut current = node.clone();
    while let Some(parent) = current.parent() {
        if parent.kind().is_callable() || parent.kind().is_class_like() {
            break;
        }
        chain.push((parent.clone(), current));
        current = parent;
    }

    let mut context = JumpContext {
        permitted: PermittedJumps::RETURN | PermittedJumps::YIELD | PermittedJumps::AWAIT,
        labels: Vec::new(),
    };
    for (parent, child) in chain.into_iter().rev() {
        if let Step::Enter(next) = transition(&parent, &child, &context) {
            context = next;
        }
    }
    context.permitted
}

/// Context for `child` when entered from `parent`.
fn transition(parent: &SyntaxNode, child: &SyntaxNode, context: &JumpContext) -> Step {
    if child.kind().is_callable() || child.kind().is_class_like() {
        return Step::Skip;
    }

    let permitted = match parent.kind() {
        kind if kind.is_loop() && loop_body(parent).as_ref() == Some(child) => {
            context.permitted | PermittedJumps::BREAK | PermittedJumps::CONTINUE
        }
        SyntaxKind::IfStatement => {
            let Some(if_stmt) = IfStatement::cast(parent.clone()) else {
                return Step::Enter(context.clone());
            };
            if if_stmt.condition().as_ref() == Some(child) {
                context.permitted
            } else {
                PermittedJumps::empty()
            }
        }
        SyntaxKind::TryStatement | SyntaxKind::CatchClause | SyntaxKind::FinallyClause
            if child.kind() == SyntaxKind::Block =>
        {
            PermittedJumps::empty()
        }
        SyntaxKind::CaseClause | SyntaxKind::DefaultClause if child.kind().is_statement() => {
            context.permitted | PermittedJumps::BREAK
        }
        _ => context.permitted,
    };
    Step::Enter(context.with_permitted(permitted))
}

fn visit(node: &SyntaxNode, mut context: JumpContext) -> Option<JumpViolation> {
    if let Some(violation) = check_node(node, &context) {
        return Some(violation);
    }

    if let Some(label) = LabeledStatement::cast(node.clone()).and_then(|l| l.label_token()) {
        context.labels.push(label.text().to_string());
    }

    for child in node.children() {
        match transition(node, &child, &context) {
            Step::Skip => continue,
            Step::Enter(child_context) => {
                if let Some(violation) = visit(&child, child_context) {
                    return Some(violation);
                }
            }
        }
    }
    None
}

fn check_node(node: &SyntaxNode, context: &JumpContext) -> Option<JumpViolation> {
    let permitted = context.permitted;
    match node.kind() {
        SyntaxKind::BreakStatement | SyntaxKind::ContinueStatement => {
            let is_break = node.kind() == SyntaxKind::BreakStatement;
            match jump_label(node) {
                Some(label) => {
                    let label = label.text().to_string();
                    (!context.labels.contains(&label))
                        .then_some(JumpViolation::UnknownLabel { label })
                }
                None if is_break => {
                    (!permitted.contains(PermittedJumps::BREAK)).then_some(JumpViolation::UnlabeledBreak)
                }
                None => (!permitted.contains(PermittedJumps::CONTINUE))
                    .then_some(JumpViolation::UnlabeledContinue),
            }
        }
        SyntaxKind::ReturnStatement => {
            (!permitted.contains(PermittedJumps::RETURN)).then_some(JumpViolation::Return)
        }
        SyntaxKind::YieldExpression => {
            (!permitted.contains(PermittedJumps::YIELD)).then_some(JumpViolation::Yield)
        }
        SyntaxKind::AwaitExpression => {
            (!permitted.contains(PermittedJumps::AWAIT)).then_some(JumpViolation::Await)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lift_syntax::parse_script;

    fn statement(text: &str, needle: &str) -> SyntaxNode {
        let root = parse_script(text).syntax();
        let offset = text.find(needle).expect("needle present");
        root.descendants()
            .filter(|n| n.kind().is_statement())
            .find(|n| usize::from(n.text_range().start()) == offset)
            .expect("statement at needle")
    }

    #[test]
    fn break_directly_in_loop_body_is_safe() {
        let text = "while (true) { break; }";
        assert_eq!(check_jumps(&statement(text, "break")), None);
    }

    #[test]
    fn loop_around_break_is_safe_to_extract() {
        let text = "while (true) { break; }";
        assert_eq!(check_jumps(&statement(text, "while")), None);
    }

    #[test]
    fn conditional_branches_clear_permissions() {
        let text = "function f() { while (x) { if (a) { return; } } }";
        assert_eq!(check_jumps(&statement(text, "if")), Some(JumpViolation::Return));

        let text = "while (x) { if (a) { break; } }";
        assert_eq!(
            check_jumps(&statement(text, "if")),
            Some(JumpViolation::UnlabeledBreak)
        );
    }

    #[test]
    fn return_at_function_level_is_safe() {
        let text = "function f() { return 1; }";
        assert_eq!(check_jumps(&statement(text, "return")), None);
    }

    #[test]
    fn labels_must_be_declared_inside() {
        let text = "l1: { if (x) {} break l1; }";
        assert_eq!(check_jumps(&statement(text, "l1:")), None);
        assert_eq!(
            check_jumps(&statement(text, "break")),
            Some(JumpViolation::UnknownLabel {
                label: "l1".to_string()
            })
        );
    }

    #[test]
    fn switch_arms_permit_break() {
        let text = "switch (x) { case 1: foo(); break; }";
        assert_eq!(check_jumps(&statement(text, "break")), None);
    }

    #[test]
    fn nested_functions_are_opaque() {
        let text = "if (a) { items.forEach(async function () { await g(); return; }); }";
        assert_eq!(check_jumps(&statement(text, "items")), None);
    }

    #[test]
    fn await_inside_try_is_rejected() {
        let text = "async function f() { try { await g(); } finally {} }";
        assert_eq!(check_jumps(&statement(text, "try")), Some(JumpViolation::Await));
    }
}
