use crate::ast::{jump_target, Access, AstNode, Callable, NameExpression, VariableStatement};
use crate::{parse_script, SyntaxKind, SyntaxNode};

fn names(root: &SyntaxNode) -> Vec<(String, Access)> {
    root.descendants()
        .filter_map(NameExpression::cast)
        .map(|name| (name.name().unwrap_or_default(), name.access()))
        .collect()
}

#[test]
fn classifies_name_access() {
    let parse = parse_script("a = b; c += 1; d++; --e; [f, g] = h; i.j = k; (l) = 2;");
    assert!(parse.errors.is_empty(), "{:?}", parse.errors);
    assert_eq!(
        names(&parse.syntax()),
        vec![
            ("a".into(), Access::Write),
            ("b".into(), Access::Read),
            ("c".into(), Access::ReadWrite),
            ("d".into(), Access::ReadWrite),
            ("e".into(), Access::ReadWrite),
            ("f".into(), Access::Write),
            ("g".into(), Access::Write),
            ("h".into(), Access::Read),
            ("i".into(), Access::Read),
            ("k".into(), Access::Read),
            ("l".into(), Access::Write),
        ]
    );
}

#[test]
fn for_in_and_for_of_heads_are_writes() {
    let parse = parse_script("for (a of b) {}\nfor (c in d) {}\nfor ([e, f] of g) {}\nfor (h; i < 1; j++) {}");
    assert!(parse.errors.is_empty(), "{:?}", parse.errors);
    assert_eq!(
        names(&parse.syntax()),
        vec![
            ("a".into(), Access::Write),
            ("b".into(), Access::Read),
            ("c".into(), Access::Write),
            ("d".into(), Access::Read),
            ("e".into(), Access::Write),
            ("f".into(), Access::Write),
            ("g".into(), Access::Read),
            ("h".into(), Access::Read),
            ("i".into(), Access::Read),
            ("j".into(), Access::ReadWrite),
        ]
    );
}

#[test]
fn callable_accessors() {
    let parse = parse_script(
        "async function f<T>(x: T, y) { await x; }\nconst g = function* () { yield 1; };\nconst h = (a) => a + 1;",
    );
    assert!(parse.errors.is_empty(), "{:?}", parse.errors);
    let callables: Vec<Callable> = parse
        .syntax()
        .descendants()
        .filter_map(Callable::cast)
        .collect();
    assert_eq!(callables.len(), 3);

    let f = &callables[0];
    assert_eq!(f.name_token().map(|t| t.text().to_string()), Some("f".into()));
    assert!(f.is_async());
    assert!(!f.is_generator());
    assert_eq!(f.type_parameter_list().map(|l| l.type_parameters().count()), Some(1));
    assert_eq!(f.parameter_list().map(|l| l.parameters().count()), Some(2));

    let g = &callables[1];
    assert_eq!(g.kind(), SyntaxKind::FunctionExpression);
    assert!(g.name_token().is_none());
    assert!(g.is_generator());

    let h = &callables[2];
    assert_eq!(h.kind(), SyntaxKind::ArrowFunction);
    assert!(h.body().is_none());
    assert_eq!(
        h.expression_body().map(|e| e.kind()),
        Some(SyntaxKind::BinaryExpression)
    );
}

#[test]
fn variable_declarations() {
    let parse = parse_script("let a: number = 1, b;");
    let stmt = parse
        .syntax()
        .children()
        .find_map(VariableStatement::cast)
        .expect("variable statement");
    let list = stmt.declaration_list().expect("declaration list");
    assert_eq!(list.keyword().map(|k| k.kind()), Some(SyntaxKind::LetKw));
    let declarators: Vec<_> = list.declarators().collect();
    assert_eq!(declarators.len(), 2);
    assert_eq!(
        declarators[0]
            .type_annotation()
            .and_then(|a| a.ty())
            .map(|t| t.syntax().to_string()),
        Some("number".into())
    );
    assert!(declarators[1].initializer().is_none());
}

#[test]
fn jump_targets() {
    let text = "outer: while (a) { switch (b) { case 1: break; } for (;;) { continue; } break outer; }";
    let parse = parse_script(text);
    assert!(parse.errors.is_empty(), "{:?}", parse.errors);
    let targets: Vec<Option<SyntaxKind>> = parse
        .syntax()
        .descendants()
        .filter(|n| matches!(n.kind(), SyntaxKind::BreakStatement | SyntaxKind::ContinueStatement))
        .map(|jump| jump_target(&jump).map(|t| t.kind()))
        .collect();
    assert_eq!(
        targets,
        vec![
            Some(SyntaxKind::SwitchStatement),
            Some(SyntaxKind::ForStatement),
            Some(SyntaxKind::LabeledStatement),
        ]
    );

    let parse = parse_script("while (a) { const f = function () { break; }; }");
    let jump = parse
        .syntax()
        .descendants()
        .find(|n| n.kind() == SyntaxKind::BreakStatement)
        .expect("break statement");
    assert_eq!(jump_target(&jump), None);
}
