//! Rendering of synthesized code.
//!
//! The extraction pipeline builds owned descriptions of the new function and
//! its call site; a [`SourcePrinter`] turns them into source text.

use crate::extract_function::FlowParameter;

/// A function declaration to insert.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractedFunction {
    pub name: String,
    pub is_async: bool,
    pub is_generator: bool,
    pub parameters: Vec<FlowParameter>,
    /// Body items at zero indentation. An item may span several lines.
    pub body: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallWrapper {
    None,
    Await,
    /// `yield*`, delegating to the generator the call returns.
    YieldStar,
}

/// What the call site does with the call's result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallForm {
    /// The call replaces an expression.
    Expression { parenthesize: bool },
    Statement,
    Assign { target: String },
    Declare { keyword: String, name: String },
    /// `[a, b] = call;`, preceded by `let` for the names in `declare`.
    Destructure {
        declare: Vec<String>,
        targets: Vec<String>,
    },
    Return,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallSite {
    pub callee: String,
    pub arguments: Vec<String>,
    /// Call through `Function.prototype.call` so `this` is preserved.
    pub bind_this: bool,
    pub wrapper: CallWrapper,
    pub form: CallForm,
}

pub trait SourcePrinter {
    /// Renders `function` whose first line starts at `indent`; body lines are
    /// indented one more `indent_unit`.
    fn print_function(&self, function: &ExtractedFunction, indent: &str, indent_unit: &str) -> String;

    /// Renders the replacement for the extracted range. Continuation lines are
    /// indented with `indent`.
    fn print_call_site(&self, call: &CallSite, indent: &str) -> String;
}

/// Default printer for Lift scripts.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScriptPrinter;

impl SourcePrinter for ScriptPrinter {
    fn print_function(&self, function: &ExtractedFunction, indent: &str, indent_unit: &str) -> String {
        let params = function
            .parameters
            .iter()
            .map(|p| match &p.ty {
                Some(ty) => format!("{}: {ty}", p.name),
                None => p.name.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ");

        let mut out = String::new();
        if function.is_async {
            out.push_str("async ");
        }
        out.push_str("function");
        if function.is_generator {
            out.push('*');
        }
        out.push_str(&format!(" {}({params}) {{\n", function.name));

        let body_indent = format!("{indent}{indent_unit}");
        for item in &function.body {
            out.push_str(&reindent(item, "", &body_indent));
            out.push('\n');
        }
        out.push_str(indent);
        out.push('}');
        out
    }

    fn print_call_site(&self, call: &CallSite, indent: &str) -> String {
        let args = call.arguments.join(", ");
        let mut expr = if call.bind_this {
            if args.is_empty() {
                format!("{}.call(this)", call.callee)
            } else {
                format!("{}.call(this, {args})", call.callee)
            }
        } else {
            format!("{}({args})", call.callee)
        };
        expr = match call.wrapper {
            CallWrapper::None => expr,
            CallWrapper::Await => format!("await {expr}"),
            CallWrapper::YieldStar => format!("yield* {expr}"),
        };

        match &call.form {
            CallForm::Expression { parenthesize: true } => format!("({expr})"),
            CallForm::Expression { parenthesize: false } => expr,
            CallForm::Statement => format!("{expr};"),
            CallForm::Assign { target } => format!("{target} = {expr};"),
            CallForm::Declare { keyword, name } => format!("{keyword} {name} = {expr};"),
            CallForm::Destructure { declare, targets } => {
                let assignment = format!("[{}] = {expr};", targets.join(", "));
                if declare.is_empty() {
                    assignment
                } else {
                    format!("let {};\n{indent}{assignment}", declare.join(", "))
                }
            }
            CallForm::Return => format!("return {expr};"),
        }
    }
}

pub(crate) fn line_start_offset(source: &str, offset: usize) -> usize {
    source[..offset].rfind('\n').map(|p| p + 1).unwrap_or(0)
}

pub(crate) fn indentation_at(source: &str, offset: usize) -> String {
    let start = line_start_offset(source, offset);
    source[start..offset]
        .chars()
        .take_while(|c| c.is_whitespace() && *c != '\n' && *c != '\r')
        .collect()
}

/// Replaces `old_indent` with `new_indent` on every non-blank line.
pub(crate) fn reindent(block: &str, old_indent: &str, new_indent: &str) -> String {
    let mut out = String::new();
    for line in block.split_inclusive('\n') {
        let has_newline = line.ends_with('\n');
        let line = line.strip_suffix('\n').unwrap_or(line);
        let line = line.strip_prefix(old_indent).unwrap_or(line);
        if !line.trim().is_empty() {
            out.push_str(new_indent);
            out.push_str(line);
        }
        if has_newline {
            out.push('\n');
        }
    }
    out
}
