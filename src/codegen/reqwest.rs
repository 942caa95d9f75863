//! Rust `reqwest` backend, blocking and async flavours

use super::ast::{Binding, Call, Expr, Program, Stmt, Symbol};
use super::render::{render, Syntax};
use super::{cookie_header, text_body, Assembly, Field, StyleBackend};
use crate::errors::GenerationError;
use crate::http::Method;
use crate::request::{Body, Part, PartValue};
use crate::strings::{rust_bytes, rust_string};

/// Redirect cap used when `-L` is given without `--max-redirs` (curl's default)
const CURL_DEFAULT_MAX_REDIRECTS: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReqwestBackend {
    asynchronous: bool,
}

impl ReqwestBackend {
    pub const BLOCKING: Self = Self { asynchronous: false };
    pub const ASYNC: Self = Self { asynchronous: true };

    fn client_path(&self) -> &'static str {
        if self.asynchronous {
            "reqwest::Client"
        } else {
            "reqwest::blocking::Client"
        }
    }

    fn multipart_path(&self) -> &'static str {
        if self.asynchronous {
            "reqwest::multipart"
        } else {
            "reqwest::blocking::multipart"
        }
    }

    /// A call that performs I/O: `?` always, `.await` when async
    fn io(&self, call: Call) -> Call {
        let call = call.fallible();
        if self.asynchronous {
            call.awaited()
        } else {
            call
        }
    }

    fn io_expr(&self, expr: Expr) -> Expr {
        if self.asynchronous {
            expr.awaited().try_()
        } else {
            expr.try_()
        }
    }

    fn target(&self, method: &Method, url: &str) -> Call {
        let url = Expr::str(url);
        match method {
            Method::Get => Call::new("get", vec![url]),
            Method::Post => Call::new("post", vec![url]),
            Method::Put => Call::new("put", vec![url]),
            Method::Patch => Call::new("patch", vec![url]),
            Method::Delete => Call::new("delete", vec![url]),
            Method::Head => Call::new("head", vec![url]),
            Method::Options => Call::new(
                "request",
                vec![Expr::path(Symbol::imported("Method::OPTIONS", "reqwest::Method")), url],
            ),
            Method::Custom(name) => Call::new(
                "request",
                vec![
                    Expr::call(
                        Symbol::imported("Method::from_bytes", "reqwest::Method"),
                        vec![Expr::Bytes(name.as_bytes().to_vec())],
                    )
                    .try_(),
                    url,
                ],
            ),
        }
    }

    fn header(&self, constant: &'static str, import: &'static str, value: &str) -> Call {
        Call::new("header", vec![Expr::path(Symbol::imported(constant, import)), Expr::str(value)])
    }

    fn content_type(&self, content_type: &Option<String>, draft: &mut ReqwestDraft) {
        if let Some(content_type) = content_type {
            draft
                .request
                .push(self.header("CONTENT_TYPE", "reqwest::header::CONTENT_TYPE", content_type));
        }
    }

    fn body(&self, body: &Body, draft: &mut ReqwestDraft) {
        match body {
            Body::None => {}
            Body::Raw { bytes, content_type } => {
                self.content_type(content_type, draft);
                let literal = match text_body(bytes) {
                    Some(text) => Expr::str(text),
                    None => Expr::chain(Expr::Bytes(bytes.clone()), vec![Call::new("to_vec", vec![])]),
                };
                draft.request.push(Call::new("body", vec![literal]));
            }
            Body::UrlEncodedForm { pairs } => {
                draft.request.push(Call::new("form", vec![Expr::pairs(pairs).reference()]));
            }
            Body::Multipart { parts } => {
                let form = Expr::chain(
                    Expr::call(Symbol::imported("multipart::Form::new", self.multipart_path()), vec![]),
                    parts.iter().map(|part| self.part(part)).collect(),
                );
                draft.prelude.push(Stmt::Let(Binding::new("form", form)));
                draft.request.push(Call::new("multipart", vec![Expr::local("form")]));
            }
            Body::File { path, content_type } => {
                self.content_type(content_type, draft);
                let read = if self.asynchronous { "tokio::fs::read" } else { "std::fs::read" };
                let contents = self.io_expr(Expr::call(Symbol::local(read), vec![Expr::str(path.as_str())]));
                draft.request.push(Call::new("body", vec![contents]));
            }
        }
    }

    fn part(&self, part: &Part) -> Call {
        let name = Expr::str(part.name.as_str());
        let part_symbol = |ctor: &str| Symbol::imported(format!("multipart::Part::{}", ctor), self.multipart_path());

        match (&part.value, &part.content_type) {
            (PartValue::Text { value }, None) => Call::new("text", vec![name, Expr::str(value.as_str())]),
            (PartValue::Text { value }, Some(content_type)) => {
                let built = Expr::chain(
                    Expr::call(part_symbol("text"), vec![Expr::str(value.as_str())]),
                    vec![Call::new("mime_str", vec![Expr::str(content_type.as_str())]).fallible()],
                );
                Call::new("part", vec![name, built])
            }
            (PartValue::File { path, filename: None }, None) => {
                self.io(Call::new("file", vec![name, Expr::str(path.as_str())]))
            }
            (PartValue::File { path, filename }, content_type) => {
                let opened = self.io_expr(Expr::call(part_symbol("file"), vec![Expr::str(path.as_str())]));
                let mut calls = Vec::new();
                if let Some(filename) = filename {
                    calls.push(Call::new("file_name", vec![Expr::str(filename.as_str())]));
                }
                if let Some(content_type) = content_type {
                    calls.push(Call::new("mime_str", vec![Expr::str(content_type.as_str())]).fallible());
                }
                Call::new("part", vec![name, Expr::chain(opened, calls)])
            }
        }
    }
}

/// Accumulated builder calls
#[derive(Debug, Default)]
pub struct ReqwestDraft {
    client: Vec<Call>,
    request: Vec<Call>,
    /// Statements that must run before the request is built
    prelude: Vec<Stmt>,
}

impl StyleBackend for ReqwestBackend {
    type Draft = ReqwestDraft;

    fn name(&self) -> &'static str {
        if self.asynchronous {
            "reqwest-async"
        } else {
            "reqwest-blocking"
        }
    }

    fn resource_sensitive(&self) -> bool {
        false
    }

    fn map_field(&self, field: Field<'_>, draft: &mut ReqwestDraft) -> Result<(), GenerationError> {
        match field {
            Field::Target { method, url } => draft.request.push(self.target(method, &url)),
            Field::Header { name, value } => {
                draft.request.push(Call::new("header", vec![Expr::str(name), Expr::str(value)]))
            }
            Field::UserAgent(agent) => {
                draft.request.push(self.header("USER_AGENT", "reqwest::header::USER_AGENT", agent))
            }
            Field::Referer(referer) => {
                draft.request.push(self.header("REFERER", "reqwest::header::REFERER", referer))
            }
            Field::Cookies(cookies) => draft.request.push(self.header(
                "COOKIE",
                "reqwest::header::COOKIE",
                &cookie_header(cookies),
            )),
            Field::Body(body) => self.body(body, draft),
            Field::Auth { user, password } => {
                let password = match password {
                    Some(password) => Expr::call(Symbol::local("Some"), vec![Expr::str(password)]),
                    None => Expr::local("None::<&str>"),
                };
                draft.request.push(Call::new("basic_auth", vec![Expr::str(user), password]));
            }
            Field::Redirects { follow, max } => {
                let policy = if follow {
                    let limit = max.map(u64::from).unwrap_or(CURL_DEFAULT_MAX_REDIRECTS);
                    Expr::call(Symbol::imported("Policy::limited", "reqwest::redirect::Policy"), vec![Expr::Int(limit)])
                } else {
                    Expr::call(Symbol::imported("Policy::none", "reqwest::redirect::Policy"), vec![])
                };
                draft.client.push(Call::new("redirect", vec![policy]));
            }
            Field::InsecureTls => draft.client.push(Call::new("danger_accept_invalid_certs", vec![Expr::Bool(true)])),
            Field::Compressed => {
                for codec in ["gzip", "brotli", "deflate"] {
                    draft.client.push(Call::new(codec, vec![Expr::Bool(true)]));
                }
            }
            Field::Timeout(seconds) => draft.client.push(Call::new("timeout", vec![duration(seconds)])),
            Field::ConnectTimeout(seconds) => {
                draft.client.push(Call::new("connect_timeout", vec![duration(seconds)]))
            }
            Field::Proxy(proxy) => {
                let proxy = Expr::call(Symbol::imported("Proxy::all", "reqwest::Proxy"), vec![Expr::str(proxy)]).try_();
                draft.client.push(Call::new("proxy", vec![proxy]));
            }
        }
        Ok(())
    }

    fn assemble(&self, draft: ReqwestDraft) -> Result<Assembly, GenerationError> {
        let mut client_calls = draft.client;
        client_calls.push(Call::new("build", vec![]).fallible());
        let client = Binding::new(
            "client",
            Expr::chain(
                Expr::call(Symbol::imported("Client::builder", self.client_path()), vec![]),
                client_calls,
            ),
        );

        let mut request = draft.request;
        request.push(self.io(Call::new("send", vec![])));

        let mut body = draft.prelude;
        body.push(Stmt::Let(Binding::new("response", Expr::chain(Expr::local("client"), request))));
        body.push(Stmt::Expr(Expr::call(
            Symbol::local("println!"),
            vec![
                Expr::str("{}"),
                Expr::chain(Expr::local("response"), vec![self.io(Call::new("text", vec![]))]),
            ],
        )));

        Ok(Assembly { client, body })
    }

    fn render_ast(&self, program: &Program) -> String {
        render(&RustSyntax { asynchronous: self.asynchronous }, program)
    }
}

fn duration(seconds: f64) -> Expr {
    if seconds.fract() == 0.0 && seconds <= u64::MAX as f64 {
        Expr::call(
            Symbol::imported("Duration::from_secs", "std::time::Duration"),
            vec![Expr::Int(seconds as u64)],
        )
    } else {
        Expr::call(
            Symbol::imported("Duration::from_secs_f64", "std::time::Duration"),
            vec![Expr::Float(seconds)],
        )
    }
}

struct RustSyntax {
    asynchronous: bool,
}

impl Syntax for RustSyntax {
    fn string(&self, value: &str) -> String {
        rust_string(value)
    }

    fn bytes(&self, value: &[u8]) -> String {
        rust_bytes(value)
    }

    fn boolean(&self, value: bool) -> &'static str {
        if value {
            "true"
        } else {
            "false"
        }
    }

    fn null(&self) -> &'static str {
        "None"
    }

    fn import(&self, path: &str) -> String {
        format!("use {};", path)
    }

    fn terminator(&self) -> &'static str {
        ";"
    }

    fn binding(&self, name: &str, ty: Option<&str>, value: &str) -> String {
        match ty {
            Some(ty) => format!("let {}: {} = {}", name, ty, value),
            None => format!("let {} = {}", name, value),
        }
    }

    fn scope_open(&self, name: &str, ty: Option<&str>, value: &str) -> String {
        format!("{{ {};", self.binding(name, ty, value))
    }

    fn scope_close(&self) -> Option<&'static str> {
        Some("}")
    }

    fn postfix(&self, awaited: bool, fallible: bool) -> String {
        let mut out = String::new();
        if awaited {
            out.push_str(".await");
        }
        if fallible {
            out.push('?');
        }
        out
    }

    fn reference_prefix(&self) -> &'static str {
        "&"
    }

    fn trailing_comma(&self) -> bool {
        true
    }

    fn body_level(&self) -> usize {
        1
    }

    fn wrap_entry(&self, body: Vec<String>) -> Vec<String> {
        let mut lines = Vec::with_capacity(body.len() + 4);
        if self.asynchronous {
            lines.push("#[tokio::main]".to_string());
            lines.push("async fn main() -> Result<(), Box<dyn std::error::Error>> {".to_string());
        } else {
            lines.push("fn main() -> Result<(), Box<dyn std::error::Error>> {".to_string());
        }
        lines.extend(body);
        lines.push(format!("{}Ok(())", self.indent_unit()));
        lines.push("}".to_string());
        lines
    }
}
