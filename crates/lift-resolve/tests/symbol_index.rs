use lift_core::{CancellationToken, Cancelled, TextRange};
use lift_resolve::{LocalSymbolId, ScopeKind, SymbolIndex, SymbolKind};
use lift_syntax::ast::Access;
use lift_syntax::parse_script;
use pretty_assertions::assert_eq;

fn offset_of(text: &str, needle: &str, nth: usize) -> TextRange {
    let start = text
        .match_indices(needle)
        .nth(nth)
        .map(|(idx, _)| idx)
        .unwrap_or_else(|| panic!("`{needle}` #{nth} not found"));
    TextRange::new(start, start + needle.len())
}

fn index(text: &str) -> SymbolIndex {
    let parse = parse_script(text);
    assert!(parse.errors.is_empty(), "{:?}", parse.errors);
    SymbolIndex::build(&parse.syntax())
}

fn symbol(index: &SymbolIndex, text: &str, needle: &str, nth: usize) -> LocalSymbolId {
    index
        .symbol_at(offset_of(text, needle, nth))
        .unwrap_or_else(|| panic!("`{needle}` #{nth} does not resolve"))
}

#[test]
fn var_is_hoisted_to_function_scope() {
    let text = "function f() {\n  if (c) { var x = 1; }\n  return x;\n}";
    let index = index(text);
    let decl = symbol(&index, text, "x", 0);
    let use_site = symbol(&index, text, "x", 1);
    assert_eq!(decl, use_site);

    let data = index.symbol(decl).expect("symbol data");
    assert_eq!(data.kind, SymbolKind::Var);
    assert_eq!(index.scope(data.scope).kind, ScopeKind::Function);
}

#[test]
fn let_is_block_scoped() {
    let text = "let x = 1;\n{ let x = 2; use(x); }\nuse(x);";
    let index = index(text);
    let outer = symbol(&index, text, "x", 0);
    let inner = symbol(&index, text, "x", 1);
    assert_ne!(outer, inner);
    assert_eq!(symbol(&index, text, "x", 2), inner);
    assert_eq!(symbol(&index, text, "x", 3), outer);
}

#[test]
fn function_declarations_resolve_before_their_position() {
    let text = "g();\nfunction g() {}";
    let index = index(text);
    let call = symbol(&index, text, "g", 0);
    let data = index.symbol(call).expect("symbol data");
    assert_eq!(data.kind, SymbolKind::Function);
    assert!(data.kind.is_hoisted_declaration());
    assert_eq!(data.name_range, offset_of(text, "g", 1));
}

#[test]
fn parameters_and_type_parameters() {
    let text = "function id<T>(value: T): T { return value; }";
    let index = index(text);
    let value = symbol(&index, text, "value", 0);
    let data = index.symbol(value).expect("symbol data");
    assert_eq!(data.kind, SymbolKind::Parameter);
    assert_eq!(data.ty.as_deref(), Some("T"));
    assert_eq!(data.type_refs, vec![offset_of(text, "T", 1)]);

    let t = index.symbol_at(data.type_refs[0]).expect("type ref resolves");
    assert_eq!(index.symbol(t).map(|d| d.kind), Some(SymbolKind::TypeParameter));
    assert_eq!(symbol(&index, text, "value", 1), value);
}

#[test]
fn references_carry_access_kinds() {
    let text = "let a = 0;\na = 1;\na += 2;\nuse(a);\n[a] = pair;";
    let index = index(text);
    let a = symbol(&index, text, "a", 0);
    let refs = index
        .references(a, &CancellationToken::new())
        .expect("not cancelled");
    let accesses: Vec<Access> = refs.iter().map(|r| r.access).collect();
    assert_eq!(
        accesses,
        vec![Access::Write, Access::ReadWrite, Access::Read, Access::Write]
    );
    assert!(refs.iter().all(|r| !r.in_type));
}

#[test]
fn catch_and_loop_bindings() {
    let text = "for (let i = 0; i < 3; i++) { log(i); }\ntry { f(); } catch (e) { log(e); }";
    let index = index(text);
    let i = symbol(&index, text, "i", 0);
    assert_eq!(symbol(&index, text, "i", 3), i);
    let catch_param = text.find("(e)").expect("catch clause") + 1;
    let e = index
        .symbol_at(TextRange::new(catch_param, catch_param + 1))
        .expect("catch parameter");
    assert_eq!(index.symbol(e).map(|d| d.kind), Some(SymbolKind::Parameter));
    let use_site = text.rfind("(e)").expect("log call") + 1;
    assert_eq!(index.symbol_at(TextRange::new(use_site, use_site + 1)), Some(e));
}

#[test]
fn unresolved_names_are_not_references() {
    let text = "console.log(x);";
    let index = index(text);
    assert_eq!(index.symbol_at(offset_of(text, "console", 0)), None);
    assert_eq!(index.symbols().count(), 0);
}

#[test]
fn reference_search_observes_cancellation() {
    let text = "let a = 1; use(a);";
    let index = index(text);
    let a = symbol(&index, text, "a", 0);
    let cancel = CancellationToken::new();
    cancel.cancel();
    assert_eq!(index.references(a, &cancel), Err(Cancelled));
}
