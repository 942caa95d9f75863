//! Code generation from a Request Model
//!
//! A shared driver walks the model's fields in a fixed order and hands each
//! one to a [`StyleBackend`], which records AST fragments in its own draft.
//! The backend then assembles the draft into a client declaration plus the
//! request statements, and the driver wraps them in a resource scope when
//! the target client has to be closed.

pub mod ast;
pub mod curl;
pub mod java;
pub mod python;
pub mod render;
pub mod reqwest;

use crate::errors::GenerationError;
use crate::http::Method;
use crate::request::{Auth, Body, RequestModel};
use ast::{Binding, Program, Stmt};
use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// One present field of the model, in driver order
#[derive(Debug, Clone, PartialEq)]
pub enum Field<'a> {
    /// Method and the full URL, query segments included verbatim
    ///
    /// Client-side query builders re-encode their pairs, so the query
    /// always travels inside the URL string.
    Target { method: &'a Method, url: String },
    Header { name: &'a str, value: &'a str },
    UserAgent(&'a str),
    Referer(&'a str),
    Cookies(&'a [(String, String)]),
    Body(&'a Body),
    Auth { user: &'a str, password: Option<&'a str> },
    /// Always present: curl does not follow redirects unless asked to
    Redirects { follow: bool, max: Option<u32> },
    InsecureTls,
    Compressed,
    Timeout(f64),
    ConnectTimeout(f64),
    Proxy(&'a str),
}

/// Output of [`StyleBackend::assemble`]
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    /// Declaration of the HTTP client
    pub client: Binding,
    /// Request construction and execution
    pub body: Vec<Stmt>,
}

/// Maps model fields to AST for one client library
pub trait StyleBackend {
    /// Per-generation scratch state
    type Draft: Default;

    fn name(&self) -> &'static str;

    /// Whether the client must be closed, so the body runs inside its scope
    fn resource_sensitive(&self) -> bool;

    fn map_field(&self, field: Field<'_>, draft: &mut Self::Draft) -> Result<(), GenerationError>;

    fn assemble(&self, draft: Self::Draft) -> Result<Assembly, GenerationError>;

    fn render_ast(&self, program: &Program) -> String;

    fn unsupported(&self, feature: &str) -> GenerationError {
        GenerationError::UnsupportedFeatureForStyle {
            feature: feature.to_string(),
            style: self.name(),
        }
    }
}

/// Target client style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Style {
    /// Rust reqwest blocking client
    ReqwestBlocking,
    /// Rust reqwest async client on tokio
    ReqwestAsync,
    /// Java 21 java.net.http.HttpClient
    JavaHttpclient,
    /// Python requests session
    PythonRequests,
    /// Canonical curl command line
    Curl,
}

impl Style {
    pub const ALL: [Style; 5] = [
        Style::ReqwestBlocking,
        Style::ReqwestAsync,
        Style::JavaHttpclient,
        Style::PythonRequests,
        Style::Curl,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Style::ReqwestBlocking => "reqwest-blocking",
            Style::ReqwestAsync => "reqwest-async",
            Style::JavaHttpclient => "java-httpclient",
            Style::PythonRequests => "python-requests",
            Style::Curl => "curl",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Style::ReqwestBlocking => "Rust, reqwest::blocking client",
            Style::ReqwestAsync => "Rust, async reqwest client on tokio",
            Style::JavaHttpclient => "Java 21, java.net.http.HttpClient",
            Style::PythonRequests => "Python, requests.Session",
            Style::Curl => "curl command line",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Style {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Style::ALL
            .iter()
            .copied()
            .find(|style| style.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GenerationError::UnknownStyle(s.to_string()))
    }
}

/// Generate source code for `model` in the given style
pub fn generate(model: &RequestModel, style: Style) -> Result<String, GenerationError> {
    debug!(style = %style, "Generating code");
    match style {
        Style::ReqwestBlocking => drive(&reqwest::ReqwestBackend::BLOCKING, model),
        Style::ReqwestAsync => drive(&reqwest::ReqwestBackend::ASYNC, model),
        Style::JavaHttpclient => drive(&java::JavaBackend, model),
        Style::PythonRequests => drive(&python::PythonBackend, model),
        Style::Curl => curl::command(model),
    }
}

fn drive<B: StyleBackend>(backend: &B, model: &RequestModel) -> Result<String, GenerationError> {
    let mut draft = B::Draft::default();
    for field in fields(model) {
        backend.map_field(field, &mut draft)?;
    }

    let Assembly { client, body } = backend.assemble(draft)?;
    let statements = if backend.resource_sensitive() {
        vec![Stmt::Scope { resource: client, body }]
    } else {
        let mut statements = vec![Stmt::Let(client)];
        statements.extend(body);
        statements
    };

    Ok(backend.render_ast(&Program::new(statements)))
}

/// Present fields of the model, in driver order
pub fn fields(model: &RequestModel) -> Vec<Field<'_>> {
    let mut fields = vec![Field::Target { method: &model.method, url: model.full_url() }];
    fields.extend(model.headers.iter().map(|(name, value)| Field::Header { name, value }));
    if let Some(agent) = &model.user_agent {
        fields.push(Field::UserAgent(agent));
    }
    if let Some(referer) = &model.referer {
        fields.push(Field::Referer(referer));
    }
    if !model.cookies.is_empty() {
        fields.push(Field::Cookies(&model.cookies));
    }
    if !model.body.is_none() {
        fields.push(Field::Body(&model.body));
    }
    if let Auth::Basic { user, password } = &model.auth {
        fields.push(Field::Auth { user, password: password.as_deref() });
    }
    fields.push(Field::Redirects { follow: model.follow_redirects, max: model.max_redirects });
    if model.insecure_tls {
        fields.push(Field::InsecureTls);
    }
    if model.compressed {
        fields.push(Field::Compressed);
    }
    if let Some(timeout) = model.timeout {
        fields.push(Field::Timeout(timeout));
    }
    if let Some(timeout) = model.connect_timeout {
        fields.push(Field::ConnectTimeout(timeout));
    }
    if let Some(proxy) = &model.proxy {
        fields.push(Field::Proxy(proxy));
    }

    fields
}

/// Body bytes that can be written as a plain string literal
pub(crate) fn text_body(bytes: &[u8]) -> Option<&str> {
    std::str::from_utf8(bytes).ok().filter(|text| !text.contains('\0'))
}

/// `a=1; b=2`
pub(crate) fn cookie_header(cookies: &[(String, String)]) -> String {
    cookies
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("; ")
}
