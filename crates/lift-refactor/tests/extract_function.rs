use lift_config::ExtractConfig;
use lift_refactor::extract_function::{
    analyze_flow, collect_enclosing_scopes, FlowParameter, ReturnShape, ScopeKind,
};
use lift_refactor::{
    compute_extraction, compute_extraction_with, get_range_to_extract, CancellationToken,
    CodeAction, FileId, FlowAnalysis, ScriptDatabase, Span, TextRange,
};
use lift_test_utils::extract_range;
use pretty_assertions::assert_eq;

const FILE: &str = "main.ts";

fn extract(fixture: &str) -> (String, Vec<CodeAction>) {
    lift_test_utils::init_test_tracing();
    let (source, selection) = extract_range(fixture);
    let file = FileId::new(FILE);
    let db = ScriptDatabase::new().with_file(file.clone(), source.clone());
    assert!(db.parse_errors(&file).is_empty(), "{:?}", db.parse_errors(&file));
    let actions = compute_extraction(&db, &file, Span::from(selection), &CancellationToken::new());
    (source, actions)
}

fn assert_no_overlaps(action: &CodeAction) {
    let mut last_end = 0;
    for edit in &action.edits {
        assert!(edit.range.start >= last_end, "edits overlap at {:?}", edit.range);
        last_end = edit.range.end;
    }
}

fn apply(source: &str, action: &CodeAction) -> String {
    assert_no_overlaps(action);
    action.apply(source).expect("edits apply")
}

fn descriptions(actions: &[CodeAction]) -> Vec<&str> {
    actions.iter().map(|a| a.description.as_str()).collect()
}

fn flow(fixture: &str) -> FlowAnalysis {
    let (source, selection) = extract_range(fixture);
    let file = FileId::new(FILE);
    let db = ScriptDatabase::new().with_file(file.clone(), source);
    let root = lift_refactor::ExtractDatabase::syntax(&db, &file).expect("file exists");
    let range = get_range_to_extract(&root, Span::from(selection)).expect("extractable");
    let scope = collect_enclosing_scopes(&range)
        .into_iter()
        .next()
        .expect("at least the file scope");
    analyze_flow(&db, &file, &range, &scope, &CancellationToken::new()).expect("legal mapping")
}

fn names(parameters: &[FlowParameter]) -> Vec<&str> {
    parameters.iter().map(|p| p.name.as_str()).collect()
}

#[test]
fn top_level_statements() {
    let fixture = r#"
/*start*/x = 1;
y = 2;/*end*/
"#;
    let (source, actions) = extract(fixture);
    assert_eq!(descriptions(&actions), vec!["Extract to function 'newFunction' in global scope"]);

    let expected = r#"
function newFunction() {
    x = 1;
    y = 2;
}

newFunction();
"#;
    assert_eq!(apply(&source, &actions[0]), expected);
}

#[test]
fn live_write_is_returned_and_reassigned() {
    let fixture = r#"
function f(a: number) {
    let x = 0;
    /*start*/x = a * 2;/*end*/
    return x;
}
"#;
    let (source, actions) = extract(fixture);
    assert_eq!(
        descriptions(&actions),
        vec![
            "Extract to function 'newFunction' in function 'f'",
            "Extract to function 'newFunction' in global scope",
        ]
    );

    let expected = r#"
function f(a: number) {
    let x = 0;
    function newFunction(a: number, x) {
        x = a * 2;
        return x;
    }

    x = newFunction(a, x);
    return x;
}
"#;
    assert_eq!(apply(&source, &actions[0]), expected);

    let expected = r#"
function newFunction(a: number, x) {
    x = a * 2;
    return x;
}

function f(a: number) {
    let x = 0;
    x = newFunction(a, x);
    return x;
}
"#;
    assert_eq!(apply(&source, &actions[1]), expected);
}

#[test]
fn declaration_read_after_range_is_hoisted_to_call_site() {
    let fixture = r#"
function g() {
    /*start*/const y = 10;/*end*/
    return y;
}
"#;
    let (source, actions) = extract(fixture);
    let expected = r#"
function g() {
    function newFunction() {
        const y = 10;
        return y;
    }

    const y = newFunction();
    return y;
}
"#;
    assert_eq!(apply(&source, &actions[0]), expected);
}

#[test]
fn several_outgoing_values_use_destructuring() {
    let fixture = r#"
let total = 0;
/*start*/const item = 5;
total = total + item;/*end*/
report(total, item);
"#;
    let (source, actions) = extract(fixture);
    assert_eq!(actions.len(), 1);

    let expected = r#"
let total = 0;
function newFunction(total) {
    const item = 5;
    total = total + item;
    return [item, total];
}

let item;
[item, total] = newFunction(total);
report(total, item);
"#;
    assert_eq!(apply(&source, &actions[0]), expected);
}

#[test]
fn outer_writes_are_passed_in_and_returned() {
    let fixture = r#"
let a = 0;
let b = 0;
/*start*/a = 1;
b = 2;/*end*/
console.log(a, b);
"#;
    let (source, actions) = extract(fixture);
    let expected = r#"
let a = 0;
let b = 0;
function newFunction(a, b) {
    a = 1;
    b = 2;
    return [a, b];
}

[a, b] = newFunction(a, b);
console.log(a, b);
"#;
    assert_eq!(apply(&source, &actions[0]), expected);
}

#[test]
fn trailing_return_becomes_returned_call() {
    let fixture = r#"
function h(x) {
    log(x);
    /*start*/const y = x + 1;
    return y * 2;/*end*/
}
"#;
    let (source, actions) = extract(fixture);
    assert_eq!(actions.len(), 2);
    let expected = r#"
function h(x) {
    log(x);
    function newFunction(x) {
        const y = x + 1;
        return y * 2;
    }

    return newFunction(x);
}
"#;
    assert_eq!(apply(&source, &actions[0]), expected);
}

#[test]
fn return_that_may_fall_through_has_no_mapping() {
    let fixture = r#"
function h(xs) {
    /*start*/for (const x of xs) {
        return x;
    }/*end*/
    return null;
}
"#;
    let (_, actions) = extract(fixture);
    assert!(actions.is_empty(), "{:?}", descriptions(&actions));
}

#[test]
fn conditional_write_keeps_the_previous_value() {
    let fixture = r#"
function f(c) {
    let x = 1;
    /*start*/if (c) {
        x = 5;
    }/*end*/
    return x;
}
"#;
    let (source, actions) = extract(fixture);
    assert_eq!(actions.len(), 2);
    let expected = r#"
function f(c) {
    let x = 1;
    function newFunction(c, x) {
        if (c) {
            x = 5;
        }
        return x;
    }

    x = newFunction(c, x);
    return x;
}
"#;
    assert_eq!(apply(&source, &actions[0]), expected);
}

#[test]
fn for_of_head_write_is_returned() {
    let fixture = r#"
let x = 0;
/*start*/for (x of [1, 2]) {}/*end*/
console.log(x);
"#;
    let (source, actions) = extract(fixture);
    let expected = r#"
let x = 0;
function newFunction(x) {
    for (x of [1, 2]) {}
    return x;
}

x = newFunction(x);
console.log(x);
"#;
    assert_eq!(apply(&source, &actions[0]), expected);
}

#[test]
fn dead_write_to_a_local_out_of_sight_is_redeclared() {
    let fixture = r#"
function f() {
    let x = 0;
    /*start*/x = 1;/*end*/
}
"#;
    let (source, actions) = extract(fixture);
    assert_eq!(
        descriptions(&actions),
        vec![
            "Extract to function 'newFunction' in function 'f'",
            "Extract to function 'newFunction' in global scope",
        ]
    );

    let expected = r#"
function f() {
    let x = 0;
    function newFunction() {
        x = 1;
    }

    newFunction();
}
"#;
    assert_eq!(apply(&source, &actions[0]), expected);

    let expected = r#"
function newFunction() {
    let x;
    x = 1;
}

function f() {
    let x = 0;
    newFunction();
}
"#;
    assert_eq!(apply(&source, &actions[1]), expected);
}

#[test]
fn jumps_to_a_loop_outside_the_range_have_no_mapping() {
    for fixture in [
        "while (true) {\n    /*start*/if (x) {\n    }\n    break;/*end*/\n}\n",
        "while (true) {\n    /*start*/if (x) {\n    }\n    continue;/*end*/\n}\n",
        "switch (k) {\n    case 1:\n        /*start*/go();\n        break;/*end*/\n}\n",
    ] {
        let (_, actions) = extract(fixture);
        assert!(actions.is_empty(), "{fixture:?}: {:?}", descriptions(&actions));
    }
}

#[test]
fn loop_extracted_with_its_jumps() {
    let fixture = r#"
/*start*/while (true) {
    if (x) {
    }
    break;
}/*end*/
"#;
    let (source, actions) = extract(fixture);
    let expected = r#"
function newFunction() {
    while (true) {
        if (x) {
        }
        break;
    }
}

newFunction();
"#;
    assert_eq!(apply(&source, &actions[0]), expected);
}

#[test]
fn awaited_expression_makes_async_function() {
    let fixture = r#"
async function load(url: string) {
    const body = /*start*/await fetch(url)/*end*/;
    return body;
}
"#;
    let (source, actions) = extract(fixture);
    let expected = r#"
async function load(url: string) {
    async function newFunction(url: string) {
        return await fetch(url);
    }

    const body = await newFunction(url);
    return body;
}
"#;
    assert_eq!(apply(&source, &actions[0]), expected);
}

#[test]
fn yielding_statements_make_generator() {
    let fixture = r#"
function* gen(items) {
    /*start*/yield items[0];/*end*/
}
"#;
    let (source, actions) = extract(fixture);
    let expected = r#"
function* gen(items) {
    function* newFunction(items) {
        yield items[0];
    }

    yield* newFunction(items);
}
"#;
    assert_eq!(apply(&source, &actions[0]), expected);
}

#[test]
fn this_is_forwarded_with_call() {
    let fixture = r#"
class Counter {
    bump(step) {
        /*start*/this.total = this.total + step;/*end*/
    }
}
"#;
    let (source, actions) = extract(fixture);
    assert_eq!(
        descriptions(&actions),
        vec![
            "Extract to function 'newFunction' in method 'bump'",
            "Extract to function 'newFunction' in global scope",
        ]
    );

    let expected = r#"
function newFunction(step) {
    this.total = this.total + step;
}

class Counter {
    bump(step) {
        newFunction.call(this, step);
    }
}
"#;
    assert_eq!(apply(&source, &actions[1]), expected);
}

#[test]
fn expression_bodied_arrow_is_skipped() {
    let fixture = r#"
const f = (x) => /*start*/x + 1/*end*/;
"#;
    let (source, actions) = extract(fixture);
    assert_eq!(descriptions(&actions), vec!["Extract to function 'newFunction' in global scope"]);

    let expected = r#"
function newFunction(x) {
    return x + 1;
}

const f = (x) => newFunction(x);
"#;
    assert_eq!(apply(&source, &actions[0]), expected);
}

#[test]
fn type_parameters_limit_target_scopes() {
    let fixture = r#"
function id<T>(value: T) {
    /*start*/log(value);/*end*/
}
"#;
    let (source, actions) = extract(fixture);
    assert_eq!(descriptions(&actions), vec!["Extract to function 'newFunction' in function 'id'"]);

    let expected = r#"
function id<T>(value: T) {
    function newFunction(value: T) {
        log(value);
    }

    newFunction(value);
}
"#;
    assert_eq!(apply(&source, &actions[0]), expected);
}

#[test]
fn expression_writing_live_symbol_has_no_mapping() {
    let fixture = r#"
let n = 0;
let m = /*start*/n++/*end*/;
log(n);
"#;
    let (_, actions) = extract(fixture);
    assert!(actions.is_empty());
}

#[test]
fn function_name_avoids_collisions() {
    let fixture = r#"
function newFunction() {}
/*start*/go();/*end*/
"#;
    let (source, actions) = extract(fixture);
    assert_eq!(actions[0].function_name, "newFunction_1");

    let expected = r#"
function newFunction() {}
function newFunction_1() {
    go();
}

newFunction_1();
"#;
    assert_eq!(apply(&source, &actions[0]), expected);
}

#[test]
fn scopes_are_listed_innermost_first() {
    let fixture = r#"
function outer() {
    const inner = function () {
        /*start*/work();/*end*/
    };
    const arrow = () => {
        inner();
    };
}
"#;
    let (_, actions) = extract(fixture);
    assert_eq!(
        descriptions(&actions),
        vec![
            "Extract to function 'newFunction' in anonymous function",
            "Extract to function 'newFunction' in function 'outer'",
            "Extract to function 'newFunction' in global scope",
        ]
    );
}

#[test]
fn scope_kinds_are_collected_without_filtering() {
    let (source, selection) = extract_range("const f = (x) => /*start*/x + 1/*end*/;");
    let root = lift_syntax::parse_script(&source).syntax();
    let range = get_range_to_extract(&root, Span::from(selection)).expect("extractable");
    let kinds: Vec<ScopeKind> = collect_enclosing_scopes(&range)
        .iter()
        .map(|s| s.kind)
        .collect();
    assert_eq!(kinds, vec![ScopeKind::Arrow, ScopeKind::Global]);
}

#[test]
fn configured_name_and_tabs() {
    let (source, selection) = extract_range("function f() {\n\t/*start*/go();/*end*/\n}\n");
    let file = FileId::new(FILE);
    let db = ScriptDatabase::new().with_file(file.clone(), source.clone());
    let config = ExtractConfig {
        function_name: "helper".to_string(),
        use_tabs: true,
        ..ExtractConfig::default()
    };
    let actions = compute_extraction_with(
        &db,
        &file,
        Span::from(selection),
        &CancellationToken::new(),
        &config,
    );
    assert_eq!(
        apply(&source, &actions[0]),
        "function f() {\n\tfunction helper() {\n\t\tgo();\n\t}\n\n\thelper();\n}\n"
    );
}

#[test]
fn unextractable_selection_yields_nothing() {
    let (_, actions) = extract("x = a && /*start*/b && c/*end*/;");
    assert!(actions.is_empty());
}

#[test]
fn cancellation_yields_nothing() {
    let (source, selection) = extract_range("let a = 1;\n/*start*/a = 2;/*end*/\nuse(a);\n");
    let file = FileId::new(FILE);
    let db = ScriptDatabase::new().with_file(file.clone(), source);
    let cancel = CancellationToken::new();
    cancel.cancel();
    assert!(compute_extraction(&db, &file, Span::from(selection), &cancel).is_empty());
}

#[test]
fn unknown_file_yields_nothing() {
    let db = ScriptDatabase::new();
    let actions = compute_extraction(
        &db,
        &FileId::new("missing.ts"),
        Span::new(0, 1),
        &CancellationToken::new(),
    );
    assert!(actions.is_empty());
}

#[test]
fn parameters_follow_first_read_order() {
    let analysis = flow(
        r#"
let a = 1;
let b = 2;
/*start*/use(b, a, b);/*end*/
"#,
    );
    assert_eq!(names(&analysis.parameters), vec!["b", "a"]);
    assert!(analysis.outgoing.is_empty());
    assert_eq!(analysis.return_shape, ReturnShape::Void);
}

#[test]
fn dead_writes_are_dropped() {
    let analysis = flow(
        r#"
let x = 0;
/*start*/x = 1;/*end*/
"#,
    );
    assert!(analysis.outgoing.is_empty());
    assert!(analysis.parameters.is_empty());
    assert!(analysis.locals.is_empty());
}

#[test]
fn writes_read_by_the_next_loop_iteration_are_live() {
    let analysis = flow(
        r#"
let last = 0;
for (const v of values) {
    log(last);
    /*start*/last = v;/*end*/
}
"#,
    );
    let outgoing: Vec<&str> = analysis.outgoing.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(outgoing, vec!["last"]);
    assert_eq!(analysis.return_shape, ReturnShape::Single);
}

#[test]
fn for_of_head_is_a_write() {
    let analysis = flow(
        r#"
let item = null;
/*start*/for (item of items) {}/*end*/
show(item);
"#,
    );
    let outgoing: Vec<&str> = analysis.outgoing.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(outgoing, vec!["item"]);
    assert_eq!(names(&analysis.parameters), vec!["item"]);
}

#[test]
fn compound_assignment_reads_and_writes() {
    let analysis = flow(
        r#"
let count = 0;
/*start*/count += 1;/*end*/
show(count);
"#,
    );
    assert_eq!(names(&analysis.parameters), vec!["count"]);
    assert_eq!(analysis.outgoing.len(), 1);
    assert!(!analysis.outgoing[0].declared_in_range);
}

#[test]
fn hoisted_functions_are_not_parameters() {
    let analysis = flow(
        r#"
function helper() {}
/*start*/helper();/*end*/
"#,
    );
    assert!(analysis.parameters.is_empty());
}

#[test]
fn flow_classification_is_idempotent() {
    let fixture = r#"
let a = 0;
let b = 0;
/*start*/a = b + 1;
b = a;/*end*/
log(a, b);
"#;
    let first = flow(fixture);
    let second = flow(fixture);
    assert_eq!(first, second);
    assert_eq!(first.return_shape, ReturnShape::Composite);
}

#[test]
fn preview_renders_unified_diff() {
    let (source, actions) = extract("/*start*/go();/*end*/\n");
    let preview = actions[0].preview(&source).expect("preview");
    assert_eq!(preview.edit_count, 2);
    assert!(preview.unified_diff.starts_with("--- a/main.ts\n+++ b/main.ts\n"));
    assert!(preview.unified_diff.contains("+function newFunction() {"));
    assert!(preview.unified_diff.contains("-go();"));
}

#[test]
fn actions_serialize_to_json() {
    let (_, actions) = extract("/*start*/go();/*end*/\n");
    let json = serde_json::to_value(&actions[0]).expect("serializable");
    assert_eq!(json["function_name"], "newFunction");
    assert_eq!(json["scope_description"], "global scope");
    assert_eq!(json["edits"][0]["file"], FILE);
    assert_eq!(json["edits"][1]["replacement"], "newFunction();");
    assert_eq!(
        json["edits"][1]["range"],
        serde_json::to_value(TextRange::new(0, 5)).expect("serializable")
    );
}
