//! Pretty-printer for the generated-code tree
//!
//! Layout rules are shared by every language; the [`Syntax`] trait supplies
//! the spelling of literals, declarations, scopes and the program entry
//! point.

use super::ast::{Binding, Call, Expr, Program, Stmt};

/// Width above which argument lists are split one item per line
pub const MAX_INLINE_WIDTH: usize = 60;

/// Language-specific spelling used by [`render`]
pub trait Syntax {
    fn indent_unit(&self) -> &'static str {
        "    "
    }

    fn string(&self, value: &str) -> String;

    fn bytes(&self, value: &[u8]) -> String;

    fn boolean(&self, value: bool) -> &'static str;

    fn null(&self) -> &'static str;

    /// One line of the import block
    fn import(&self, path: &str) -> String;

    /// Statement terminator (`;` or nothing)
    fn terminator(&self) -> &'static str;

    fn binding(&self, name: &str, ty: Option<&str>, value: &str) -> String;

    /// Opening line of a resource scope, without indentation
    fn scope_open(&self, name: &str, ty: Option<&str>, value: &str) -> String;

    /// Closing line of a resource scope, if the language has one
    fn scope_close(&self) -> Option<&'static str>;

    /// Suffix for awaited and fallible calls
    fn postfix(&self, _awaited: bool, _fallible: bool) -> String {
        String::new()
    }

    fn reference_prefix(&self) -> &'static str {
        ""
    }

    /// Whether multi-line lists end with a comma
    fn trailing_comma(&self) -> bool;

    /// Indentation level of top-level statements inside the entry point
    fn body_level(&self) -> usize;

    /// Wrap the rendered statements into a runnable program
    fn wrap_entry(&self, body: Vec<String>) -> Vec<String>;
}

/// Render a program: import block, blank line, entry point, trailing newline
pub fn render<S: Syntax>(syntax: &S, program: &Program) -> String {
    let printer = Printer { syntax };

    let mut body = Vec::new();
    for stmt in &program.statements {
        printer.stmt(stmt, syntax.body_level(), &mut body);
    }

    let mut out = String::new();
    let imports = program.imports();
    for import in &imports {
        out.push_str(&syntax.import(import));
        out.push('\n');
    }
    if !imports.is_empty() {
        out.push('\n');
    }
    for line in syntax.wrap_entry(body) {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

struct Printer<'a, S> {
    syntax: &'a S,
}

impl<S: Syntax> Printer<'_, S> {
    fn indent(&self, level: usize) -> String {
        self.syntax.indent_unit().repeat(level)
    }

    fn stmt(&self, stmt: &Stmt, level: usize, out: &mut Vec<String>) {
        let pad = self.indent(level);
        let end = self.syntax.terminator();

        match stmt {
            Stmt::Let(binding) => {
                let (name, ty, value) = self.binding_parts(binding, level);
                out.push(format!("{}{}{}", pad, self.syntax.binding(name, ty, &value), end));
            }
            Stmt::Assign { target, value } => {
                out.push(format!("{}{} = {}{}", pad, self.expr(target, level), self.expr(value, level), end));
            }
            Stmt::Expr(expr) => out.push(format!("{}{}{}", pad, self.expr(expr, level), end)),
            Stmt::Scope { resource, body } => {
                let (name, ty, value) = self.binding_parts(resource, level);
                out.push(format!("{}{}", pad, self.syntax.scope_open(name, ty, &value)));
                for stmt in body {
                    self.stmt(stmt, level + 1, out);
                }
                if let Some(close) = self.syntax.scope_close() {
                    out.push(format!("{}{}", pad, close));
                }
            }
        }
    }

    fn binding_parts<'b>(&self, binding: &'b Binding, level: usize) -> (&'b str, Option<&'b str>, String) {
        (
            binding.name.as_str(),
            binding.ty.as_ref().map(|ty| ty.text.as_str()),
            self.expr(&binding.value, level),
        )
    }

    fn expr(&self, expr: &Expr, level: usize) -> String {
        match expr {
            Expr::Str(value) => self.syntax.string(value),
            Expr::Bytes(value) => self.syntax.bytes(value),
            Expr::Bool(value) => self.syntax.boolean(*value).to_string(),
            Expr::Int(value) => value.to_string(),
            Expr::Float(value) => format!("{:?}", value),
            Expr::Null => self.syntax.null().to_string(),
            Expr::Path(symbol) => symbol.text.clone(),
            Expr::Call { callee, args } => format!("{}{}", callee.text, self.args(args, level)),
            Expr::New { class, args } => format!("new {}{}", class.text, self.args(args, level)),
            Expr::Chain { receiver, calls } => self.chain(receiver, calls, level),
            Expr::Tuple(items) => self.delimited("(", items, ")", level, |e, l| self.expr(e, l)),
            Expr::List(items) => self.delimited("[", items, "]", level, |e, l| self.expr(e, l)),
            Expr::Dict(entries) => self.delimited("{", entries, "}", level, |(k, v), l| {
                format!("{}: {}", self.expr(k, l), self.expr(v, l))
            }),
            Expr::Keyword { name, value } => format!("{}={}", name, self.expr(value, level)),
            Expr::Ref(inner) => format!("{}{}", self.syntax.reference_prefix(), self.expr(inner, level)),
            Expr::Try(inner) => format!("{}{}", self.expr(inner, level), self.syntax.postfix(false, true)),
            Expr::Await(inner) => format!("{}{}", self.expr(inner, level), self.syntax.postfix(true, false)),
        }
    }

    fn args(&self, args: &[Expr], level: usize) -> String {
        self.delimited("(", args, ")", level, |e, l| self.expr(e, l))
    }

    /// A chain with more than one call puts each call on its own line
    fn chain(&self, receiver: &Expr, calls: &[Call], level: usize) -> String {
        let mut out = self.expr(receiver, level);

        if calls.len() <= 1 && !out.contains('\n') {
            for call in calls {
                out.push_str(&self.link(call, level));
            }
            return out;
        }

        let pad = self.indent(level + 1);
        for call in calls {
            out.push('\n');
            out.push_str(&pad);
            out.push_str(&self.link(call, level + 1));
        }
        out
    }

    fn link(&self, call: &Call, level: usize) -> String {
        format!(
            ".{}{}{}",
            call.method,
            self.args(&call.args, level),
            self.syntax.postfix(call.awaited, call.fallible)
        )
    }

    /// Inline when short, otherwise one item per line
    ///
    /// A lone item always hugs the delimiters.
    fn delimited<T>(
        &self,
        open: &str,
        items: &[T],
        close: &str,
        level: usize,
        item: impl Fn(&T, usize) -> String,
    ) -> String {
        match items {
            [] => format!("{}{}", open, close),
            [only] => format!("{}{}{}", open, item(only, level), close),
            _ => {
                let rendered: Vec<String> = items.iter().map(|i| item(i, level + 1)).collect();
                let inline = rendered.join(", ");
                if !inline.contains('\n') && inline.len() <= MAX_INLINE_WIDTH {
                    return format!("{}{}{}", open, inline, close);
                }

                let pad = self.indent(level + 1);
                let last = rendered.len() - 1;
                let mut out = open.to_string();
                for (n, line) in rendered.iter().enumerate() {
                    out.push('\n');
                    out.push_str(&pad);
                    out.push_str(line);
                    if n < last || self.syntax.trailing_comma() {
                        out.push(',');
                    }
                }
                out.push('\n');
                out.push_str(&self.indent(level));
                out.push_str(close);
                out
            }
        }
    }
}
