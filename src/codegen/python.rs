//! Python `requests` backend

use super::ast::{Binding, Call, Expr, Program, Stmt, Symbol};
use super::render::{render, Syntax};
use super::{text_body, Assembly, Field, StyleBackend};
use crate::errors::GenerationError;
use crate::http::Method;
use crate::request::{Body, Part, PartValue};
use crate::strings::{python_bytes, python_string};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PythonBackend;

#[derive(Debug, Default)]
pub struct PythonDraft {
    method: Option<Method>,
    url: String,
    /// Keyed by lower-cased name; requests takes headers as a dict
    headers: IndexMap<String, (String, String)>,
    cookies: Option<Expr>,
    payload: Option<(&'static str, Expr)>,
    auth: Option<Expr>,
    verify: Option<bool>,
    allow_redirects: Option<bool>,
    timeout: Option<f64>,
    connect_timeout: Option<f64>,
    proxies: Option<Expr>,
    /// Statements run on the session before the request
    session: Vec<Stmt>,
    /// Files opened around the request, outermost first
    resources: Vec<Binding>,
}

impl PythonBackend {
    fn header(&self, draft: &mut PythonDraft, name: &str, value: &str) -> Result<(), GenerationError> {
        let key = name.to_ascii_lowercase();
        if draft.headers.contains_key(&key) {
            return Err(self.unsupported("repeated header names"));
        }
        draft.headers.insert(key, (name.to_string(), value.to_string()));
        Ok(())
    }

    fn open(&self, path: &str, name: String, draft: &mut PythonDraft) -> Expr {
        let file = Expr::call(Symbol::local("open"), vec![Expr::str(path), Expr::str("rb")]);
        draft.resources.push(Binding::new(name.clone(), file));
        Expr::local(name)
    }

    fn body(&self, body: &Body, draft: &mut PythonDraft) -> Result<(), GenerationError> {
        match body {
            Body::None => {}
            Body::Raw { bytes, content_type } => {
                if let Some(content_type) = content_type {
                    self.header(draft, "Content-Type", content_type)?;
                }
                let literal = match text_body(bytes) {
                    Some(text) => Expr::str(text),
                    None => Expr::Bytes(bytes.clone()),
                };
                draft.payload = Some(("data", literal));
            }
            Body::UrlEncodedForm { pairs } => draft.payload = Some(("data", Expr::pairs(pairs))),
            Body::Multipart { parts } => {
                let mut files = Vec::with_capacity(parts.len());
                for part in parts {
                    files.push(self.part(part, draft));
                }
                draft.payload = Some(("files", Expr::List(files)));
            }
            Body::File { path, content_type } => {
                if let Some(content_type) = content_type {
                    self.header(draft, "Content-Type", content_type)?;
                }
                let payload = self.open(path, "payload".to_string(), draft);
                draft.payload = Some(("data", payload));
            }
        }
        Ok(())
    }

    /// `("name", (filename, content[, content_type]))`
    fn part(&self, part: &Part, draft: &mut PythonDraft) -> Expr {
        let (filename, content) = match &part.value {
            PartValue::Text { value } => (Expr::Null, Expr::str(value.as_str())),
            PartValue::File { path, filename } => {
                let handle = self.open(path, format!("upload_{}", draft.resources.len()), draft);
                if filename.is_none() && part.content_type.is_none() {
                    return Expr::Tuple(vec![Expr::str(part.name.as_str()), handle]);
                }
                let filename = filename.clone().unwrap_or_else(|| base_name(path));
                (Expr::str(filename), handle)
            }
        };

        let mut spec = vec![filename, content];
        if let Some(content_type) = &part.content_type {
            spec.push(Expr::str(content_type.as_str()));
        }
        Expr::Tuple(vec![Expr::str(part.name.as_str()), Expr::Tuple(spec)])
    }

    fn timeout(&self, draft: &PythonDraft) -> Option<Expr> {
        match (draft.connect_timeout, draft.timeout) {
            (None, None) => None,
            (None, Some(read)) => Some(Expr::Float(read)),
            (Some(connect), read) => Some(Expr::Tuple(vec![
                Expr::Float(connect),
                read.map(Expr::Float).unwrap_or(Expr::Null),
            ])),
        }
    }
}

impl StyleBackend for PythonBackend {
    type Draft = PythonDraft;

    fn name(&self) -> &'static str {
        "python-requests"
    }

    fn resource_sensitive(&self) -> bool {
        true
    }

    fn map_field(&self, field: Field<'_>, draft: &mut PythonDraft) -> Result<(), GenerationError> {
        match field {
            Field::Target { method, url } => {
                draft.method = Some(method.clone());
                draft.url = url;
            }
            Field::Header { name, value } => self.header(draft, name, value)?,
            Field::UserAgent(agent) => self.header(draft, "User-Agent", agent)?,
            Field::Referer(referer) => self.header(draft, "Referer", referer)?,
            Field::Cookies(cookies) => {
                let mut seen = HashSet::new();
                if !cookies.iter().all(|(name, _)| seen.insert(name.as_str())) {
                    return Err(self.unsupported("repeated cookie names"));
                }
                draft.cookies = Some(Expr::str_dict(cookies.iter().map(|(n, v)| (n.as_str(), v.as_str()))));
            }
            Field::Body(body) => self.body(body, draft)?,
            Field::Auth { user, password } => {
                let password = password.ok_or_else(|| self.unsupported("basic auth without a password"))?;
                draft.auth = Some(Expr::Tuple(vec![Expr::str(user), Expr::str(password)]));
            }
            Field::Redirects { follow, max } => {
                draft.allow_redirects = Some(follow);
                if let (true, Some(max)) = (follow, max) {
                    draft.session.push(Stmt::Assign {
                        target: Expr::local("session.max_redirects"),
                        value: Expr::Int(u64::from(max)),
                    });
                }
            }
            Field::InsecureTls => draft.verify = Some(false),
            // requests already negotiates and decodes gzip and deflate
            Field::Compressed => {}
            Field::Timeout(seconds) => draft.timeout = Some(seconds),
            Field::ConnectTimeout(seconds) => draft.connect_timeout = Some(seconds),
            Field::Proxy(proxy) => {
                draft.proxies = Some(Expr::str_dict([("http", proxy), ("https", proxy)]));
            }
        }
        Ok(())
    }

    fn assemble(&self, mut draft: PythonDraft) -> Result<Assembly, GenerationError> {
        let method = draft.method.take().unwrap_or(Method::Get);
        let timeout = self.timeout(&draft);

        let (call_name, mut args) = match &method {
            Method::Custom(name) => ("request".to_string(), vec![Expr::str(name.as_str())]),
            standard => (standard.as_str().to_ascii_lowercase(), Vec::new()),
        };
        args.push(Expr::str(draft.url));

        let mut keyword = |name: &str, value: Option<Expr>| {
            if let Some(value) = value {
                args.push(Expr::keyword(name, value));
            }
        };
        if !draft.headers.is_empty() {
            let headers = draft.headers.values().map(|(n, v)| (n.as_str(), v.as_str()));
            keyword("headers", Some(Expr::str_dict(headers)));
        }
        keyword("cookies", draft.cookies);
        if let Some((name, payload)) = draft.payload {
            keyword(name, Some(payload));
        }
        keyword("auth", draft.auth);
        keyword("verify", draft.verify.map(Expr::Bool));
        keyword("allow_redirects", draft.allow_redirects.map(Expr::Bool));
        keyword("timeout", timeout);
        keyword("proxies", draft.proxies);

        let response = Binding::new(
            "response",
            Expr::chain(Expr::local("session"), vec![Call::new(call_name, args)]),
        );
        let print = Expr::call(Symbol::local("print"), vec![Expr::local("response.text")]);

        let mut inner = vec![Stmt::Let(response), Stmt::Expr(print)];
        for resource in draft.resources.into_iter().rev() {
            inner = vec![Stmt::Scope { resource, body: inner }];
        }

        let mut body = draft.session;
        body.extend(inner);

        Ok(Assembly {
            client: Binding::new("session", Expr::call(Symbol::imported("requests.Session", "requests"), vec![])),
            body,
        })
    }

    fn render_ast(&self, program: &Program) -> String {
        render(&PythonSyntax, program)
    }
}

fn base_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

struct PythonSyntax;

impl Syntax for PythonSyntax {
    fn string(&self, value: &str) -> String {
        python_string(value)
    }

    fn bytes(&self, value: &[u8]) -> String {
        python_bytes(value)
    }

    fn boolean(&self, value: bool) -> &'static str {
        if value {
            "True"
        } else {
            "False"
        }
    }

    fn null(&self) -> &'static str {
        "None"
    }

    fn import(&self, path: &str) -> String {
        format!("import {}", path)
    }

    fn terminator(&self) -> &'static str {
        ""
    }

    fn binding(&self, name: &str, _ty: Option<&str>, value: &str) -> String {
        format!("{} = {}", name, value)
    }

    fn scope_open(&self, name: &str, _ty: Option<&str>, value: &str) -> String {
        format!("with {} as {}:", value, name)
    }

    fn scope_close(&self) -> Option<&'static str> {
        None
    }

    fn trailing_comma(&self) -> bool {
        true
    }

    fn body_level(&self) -> usize {
        0
    }

    fn wrap_entry(&self, body: Vec<String>) -> Vec<String> {
        body
    }
}
