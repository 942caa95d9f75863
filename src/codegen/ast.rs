//! Generated-code tree
//!
//! A deliberately small AST covering what HTTP client snippets need:
//! bindings, method chains, literals and resource scopes. Symbols carry the
//! import that brings them into scope, so the renderer can derive the
//! import block from what the tree actually uses.

use std::collections::BTreeSet;

/// A name in generated code
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub text: String,
    /// Import path required to use `text`, in the target language's syntax
    pub import: Option<&'static str>,
}

impl Symbol {
    pub fn local(text: impl Into<String>) -> Self {
        Self { text: text.into(), import: None }
    }

    pub fn imported(text: impl Into<String>, import: &'static str) -> Self {
        Self { text: text.into(), import: Some(import) }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Str(String),
    Bytes(Vec<u8>),
    Bool(bool),
    Int(u64),
    Float(f64),
    Null,
    Path(Symbol),
    Call { callee: Symbol, args: Vec<Expr> },
    New { class: Symbol, args: Vec<Expr> },
    /// `receiver.a(..).b(..)`
    Chain { receiver: Box<Expr>, calls: Vec<Call> },
    Tuple(Vec<Expr>),
    List(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
    Keyword { name: String, value: Box<Expr> },
    Ref(Box<Expr>),
    Try(Box<Expr>),
    Await(Box<Expr>),
}

impl Expr {
    pub fn str(value: impl Into<String>) -> Self {
        Expr::Str(value.into())
    }

    pub fn path(symbol: Symbol) -> Self {
        Expr::Path(symbol)
    }

    pub fn local(name: impl Into<String>) -> Self {
        Expr::Path(Symbol::local(name))
    }

    pub fn call(callee: Symbol, args: Vec<Expr>) -> Self {
        Expr::Call { callee, args }
    }

    pub fn new_object(class: Symbol, args: Vec<Expr>) -> Self {
        Expr::New { class, args }
    }

    pub fn chain(receiver: Expr, calls: Vec<Call>) -> Self {
        Expr::Chain { receiver: Box::new(receiver), calls }
    }

    pub fn keyword(name: impl Into<String>, value: Expr) -> Self {
        Expr::Keyword { name: name.into(), value: Box::new(value) }
    }

    pub fn reference(self) -> Self {
        Expr::Ref(Box::new(self))
    }

    pub fn try_(self) -> Self {
        Expr::Try(Box::new(self))
    }

    pub fn awaited(self) -> Self {
        Expr::Await(Box::new(self))
    }

    /// List of two-element tuples
    pub fn pairs(pairs: &[(String, String)]) -> Self {
        Expr::List(
            pairs
                .iter()
                .map(|(k, v)| Expr::Tuple(vec![Expr::str(k.as_str()), Expr::str(v.as_str())]))
                .collect(),
        )
    }

    /// Dictionary with string keys and values
    pub fn str_dict<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Expr::Dict(entries.into_iter().map(|(k, v)| (Expr::str(k), Expr::str(v))).collect())
    }
}

/// One link of a method chain
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: String,
    pub args: Vec<Expr>,
    /// Rendered with `.await` where the language has it
    pub awaited: bool,
    /// Rendered with `?` where the language has it
    pub fallible: bool,
}

impl Call {
    pub fn new(method: impl Into<String>, args: Vec<Expr>) -> Self {
        Self { method: method.into(), args, awaited: false, fallible: false }
    }

    pub fn awaited(mut self) -> Self {
        self.awaited = true;
        self
    }

    pub fn fallible(mut self) -> Self {
        self.fallible = true;
        self
    }
}

/// Variable declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: String,
    /// Declared type, for languages that spell it out
    pub ty: Option<Symbol>,
    pub value: Expr,
}

impl Binding {
    pub fn new(name: impl Into<String>, value: Expr) -> Self {
        Self { name: name.into(), ty: None, value }
    }

    pub fn typed(name: impl Into<String>, ty: Symbol, value: Expr) -> Self {
        Self { name: name.into(), ty: Some(ty), value }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Let(Binding),
    Assign { target: Expr, value: Expr },
    Expr(Expr),
    /// Statements run while `resource` is open; it is closed afterwards
    Scope { resource: Binding, body: Vec<Stmt> },
}

/// A complete generated snippet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl Program {
    pub fn new(statements: Vec<Stmt>) -> Self {
        Self { statements }
    }

    /// Every import referenced by a symbol in the tree, sorted and deduplicated
    pub fn imports(&self) -> BTreeSet<&'static str> {
        let mut imports = BTreeSet::new();
        for stmt in &self.statements {
            stmt_imports(stmt, &mut imports);
        }
        imports
    }
}

fn stmt_imports(stmt: &Stmt, out: &mut BTreeSet<&'static str>) {
    match stmt {
        Stmt::Let(binding) => binding_imports(binding, out),
        Stmt::Assign { target, value } => {
            expr_imports(target, out);
            expr_imports(value, out);
        }
        Stmt::Expr(expr) => expr_imports(expr, out),
        Stmt::Scope { resource, body } => {
            binding_imports(resource, out);
            for stmt in body {
                stmt_imports(stmt, out);
            }
        }
    }
}

fn binding_imports(binding: &Binding, out: &mut BTreeSet<&'static str>) {
    if let Some(import) = binding.ty.as_ref().and_then(|ty| ty.import) {
        out.insert(import);
    }
    expr_imports(&binding.value, out);
}

fn expr_imports(expr: &Expr, out: &mut BTreeSet<&'static str>) {
    match expr {
        Expr::Str(_) | Expr::Bytes(_) | Expr::Bool(_) | Expr::Int(_) | Expr::Float(_) | Expr::Null => {}
        Expr::Path(symbol) => out.extend(symbol.import),
        Expr::Call { callee: symbol, args } | Expr::New { class: symbol, args } => {
            out.extend(symbol.import);
            args.iter().for_each(|a| expr_imports(a, out));
        }
        Expr::Chain { receiver, calls } => {
            expr_imports(receiver, out);
            calls.iter().flat_map(|c| &c.args).for_each(|a| expr_imports(a, out));
        }
        Expr::Tuple(items) | Expr::List(items) => items.iter().for_each(|i| expr_imports(i, out)),
        Expr::Dict(entries) => entries.iter().for_each(|(k, v)| {
            expr_imports(k, out);
            expr_imports(v, out);
        }),
        Expr::Keyword { value: inner, .. } | Expr::Ref(inner) | Expr::Try(inner) | Expr::Await(inner) => {
            expr_imports(inner, out)
        }
    }
}
