//! Java 21 `java.net.http.HttpClient` backend

use super::ast::{Binding, Call, Expr, Program, Stmt, Symbol};
use super::render::{render, Syntax};
use super::{cookie_header, text_body, Assembly, Field, StyleBackend};
use crate::errors::GenerationError;
use crate::http::Method;
use crate::request::{encode_pairs, Body, FORM_URLENCODED};
use crate::strings::java_string;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt::Write;
use url::Url;

const HTTP_CLIENT: &str = "java.net.http.HttpClient";
const HTTP_REQUEST: &str = "java.net.http.HttpRequest";
const HTTP_RESPONSE: &str = "java.net.http.HttpResponse";
const DURATION: &str = "java.time.Duration";

/// curl's port for a proxy URL without one
const DEFAULT_PROXY_PORT: u16 = 1080;

/// Headers `HttpRequest.Builder.header` rejects at runtime
const RESTRICTED_HEADERS: [&str; 5] = ["Connection", "Content-Length", "Expect", "Host", "Upgrade"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JavaBackend;

#[derive(Debug, Default)]
pub struct JavaDraft {
    method: Option<Method>,
    uri: String,
    client: Vec<Call>,
    request: Vec<Call>,
    publisher: Option<Expr>,
}

impl JavaBackend {
    fn header(&self, name: &str, value: &str) -> Call {
        Call::new("header", vec![Expr::str(name), Expr::str(value)])
    }

    fn publisher(&self, factory: &str, args: Vec<Expr>) -> Expr {
        Expr::call(Symbol::imported(format!("HttpRequest.BodyPublishers.{}", factory), HTTP_REQUEST), args)
    }

    fn body(&self, body: &Body, draft: &mut JavaDraft) -> Result<(), GenerationError> {
        let (content_type, publisher) = match body {
            Body::None => return Ok(()),
            Body::Raw { bytes, content_type } => {
                let publisher = match text_body(bytes) {
                    Some(text) => self.publisher("ofString", vec![Expr::str(text)]),
                    None => self.publisher("ofByteArray", vec![Expr::Bytes(bytes.clone())]),
                };
                (content_type.as_deref(), publisher)
            }
            Body::UrlEncodedForm { pairs } => (
                Some(FORM_URLENCODED),
                self.publisher("ofString", vec![Expr::str(encode_pairs(pairs))]),
            ),
            Body::Multipart { .. } => return Err(self.unsupported("multipart body")),
            Body::File { path, content_type } => {
                let path = Expr::call(Symbol::imported("Path.of", "java.nio.file.Path"), vec![Expr::str(path.as_str())]);
                (content_type.as_deref(), self.publisher("ofFile", vec![path]))
            }
        };

        if let Some(content_type) = content_type {
            draft.request.push(self.header("Content-Type", content_type));
        }
        draft.publisher = Some(publisher);
        Ok(())
    }

    /// The builder call that sets method and body
    fn method_call(&self, method: &Method, publisher: Option<Expr>) -> Call {
        match (method, publisher) {
            (Method::Get, None) => Call::new("GET", vec![]),
            (Method::Delete, None) => Call::new("DELETE", vec![]),
            (Method::Head, None) => Call::new("HEAD", vec![]),
            (Method::Post, publisher) => Call::new("POST", vec![publisher.unwrap_or_else(|| self.no_body())]),
            (Method::Put, publisher) => Call::new("PUT", vec![publisher.unwrap_or_else(|| self.no_body())]),
            (method, publisher) => Call::new(
                "method",
                vec![Expr::str(method.as_str()), publisher.unwrap_or_else(|| self.no_body())],
            ),
        }
    }

    fn no_body(&self) -> Expr {
        self.publisher("noBody", vec![])
    }

    fn proxy(&self, proxy: &str) -> Result<Expr, GenerationError> {
        let parsed = if proxy.contains("://") {
            Url::parse(proxy)
        } else {
            Url::parse(&format!("http://{}", proxy))
        };
        let url = parsed.map_err(|_| self.unsupported(&format!("proxy '{}'", proxy)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(self.unsupported(&format!("{} proxy", url.scheme())));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(self.unsupported("proxy credentials"));
        }
        let host = url
            .host_str()
            .ok_or_else(|| self.unsupported(&format!("proxy '{}'", proxy)))?;

        let address = Expr::new_object(
            Symbol::imported("InetSocketAddress", "java.net.InetSocketAddress"),
            vec![Expr::str(host), Expr::Int(u64::from(url.port().unwrap_or(DEFAULT_PROXY_PORT)))],
        );
        Ok(Expr::call(Symbol::imported("ProxySelector.of", "java.net.ProxySelector"), vec![address]))
    }
}

impl StyleBackend for JavaBackend {
    type Draft = JavaDraft;

    fn name(&self) -> &'static str {
        "java-httpclient"
    }

    fn resource_sensitive(&self) -> bool {
        true
    }

    fn map_field(&self, field: Field<'_>, draft: &mut JavaDraft) -> Result<(), GenerationError> {
        match field {
            Field::Target { method, url } => {
                draft.method = Some(method.clone());
                draft.uri = url;
            }
            Field::Header { name, value } => {
                if RESTRICTED_HEADERS.iter().any(|r| r.eq_ignore_ascii_case(name)) {
                    return Err(self.unsupported(&format!("{} header", name)));
                }
                draft.request.push(self.header(name, value))
            }
            Field::UserAgent(agent) => draft.request.push(self.header("User-Agent", agent)),
            Field::Referer(referer) => draft.request.push(self.header("Referer", referer)),
            Field::Cookies(cookies) => draft.request.push(self.header("Cookie", &cookie_header(cookies))),
            Field::Body(body) => self.body(body, draft)?,
            Field::Auth { user, password } => {
                let password = password.ok_or_else(|| self.unsupported("basic auth without a password"))?;
                let token = STANDARD.encode(format!("{}:{}", user, password));
                draft.request.push(self.header("Authorization", &format!("Basic {}", token)));
            }
            Field::Redirects { follow: true, max: Some(_) } => return Err(self.unsupported("redirect limit")),
            Field::Redirects { follow: true, max: None } => draft.client.push(Call::new(
                "followRedirects",
                vec![Expr::path(Symbol::imported("HttpClient.Redirect.NORMAL", HTTP_CLIENT))],
            )),
            Field::Redirects { follow: false, .. } => {}
            Field::InsecureTls => return Err(self.unsupported("insecure TLS")),
            Field::Compressed => return Err(self.unsupported("compressed responses")),
            Field::Timeout(seconds) => draft.request.push(Call::new("timeout", vec![duration(seconds)])),
            Field::ConnectTimeout(seconds) => {
                draft.client.push(Call::new("connectTimeout", vec![duration(seconds)]))
            }
            Field::Proxy(proxy) => {
                let selector = self.proxy(proxy)?;
                draft.client.push(Call::new("proxy", vec![selector]));
            }
        }
        Ok(())
    }

    fn assemble(&self, draft: JavaDraft) -> Result<Assembly, GenerationError> {
        let method = draft.method.unwrap_or(Method::Get);

        let mut client_calls = draft.client;
        client_calls.push(Call::new("build", vec![]));
        let client = Binding::typed(
            "client",
            Symbol::imported("HttpClient", HTTP_CLIENT),
            Expr::chain(Expr::call(Symbol::imported("HttpClient.newBuilder", HTTP_CLIENT), vec![]), client_calls),
        );

        let mut request_calls = vec![Call::new(
            "uri",
            vec![Expr::call(Symbol::imported("URI.create", "java.net.URI"), vec![Expr::str(draft.uri)])],
        )];
        request_calls.extend(draft.request);
        request_calls.push(self.method_call(&method, draft.publisher));
        request_calls.push(Call::new("build", vec![]));
        let request = Binding::typed(
            "request",
            Symbol::imported("HttpRequest", HTTP_REQUEST),
            Expr::chain(Expr::call(Symbol::imported("HttpRequest.newBuilder", HTTP_REQUEST), vec![]), request_calls),
        );

        let response = Binding::typed(
            "response",
            Symbol::imported("HttpResponse<String>", HTTP_RESPONSE),
            Expr::chain(
                Expr::local("client"),
                vec![Call::new(
                    "send",
                    vec![
                        Expr::local("request"),
                        Expr::call(Symbol::imported("HttpResponse.BodyHandlers.ofString", HTTP_RESPONSE), vec![]),
                    ],
                )],
            ),
        );

        let print = Expr::call(
            Symbol::local("System.out.println"),
            vec![Expr::chain(Expr::local("response"), vec![Call::new("body", vec![])])],
        );

        Ok(Assembly {
            client,
            body: vec![Stmt::Let(request), Stmt::Let(response), Stmt::Expr(print)],
        })
    }

    fn render_ast(&self, program: &Program) -> String {
        render(&JavaSyntax, program)
    }
}

/// `Duration.ofSeconds` for whole seconds, else `Duration.ofMillis`
///
/// Sub-millisecond values round up to one millisecond: a zero duration
/// makes the builder throw.
fn duration(seconds: f64) -> Expr {
    let millis = (seconds * 1000.0).round();
    if seconds.fract() == 0.0 || millis > f64::from(i32::MAX) {
        let whole = seconds.round().max(1.0) as u64;
        Expr::call(Symbol::imported("Duration.ofSeconds", DURATION), vec![Expr::Int(whole)])
    } else {
        let millis = millis.max(1.0) as u64;
        Expr::call(Symbol::imported("Duration.ofMillis", DURATION), vec![Expr::Int(millis)])
    }
}

struct JavaSyntax;

impl Syntax for JavaSyntax {
    fn string(&self, value: &str) -> String {
        java_string(value)
    }

    fn bytes(&self, value: &[u8]) -> String {
        let mut out = String::from("new byte[] {");
        for (n, b) in value.iter().enumerate() {
            if n > 0 {
                out.push_str(", ");
            }
            if *b < 0x80 {
                let _ = write!(out, "0x{:02x}", b);
            } else {
                let _ = write!(out, "(byte) 0x{:02x}", b);
            }
        }
        out.push('}');
        out
    }

    fn boolean(&self, value: bool) -> &'static str {
        if value {
            "true"
        } else {
            "false"
        }
    }

    fn null(&self) -> &'static str {
        "null"
    }

    fn import(&self, path: &str) -> String {
        format!("import {};", path)
    }

    fn terminator(&self) -> &'static str {
        ";"
    }

    fn binding(&self, name: &str, ty: Option<&str>, value: &str) -> String {
        format!("{} {} = {}", ty.unwrap_or("var"), name, value)
    }

    fn scope_open(&self, name: &str, ty: Option<&str>, value: &str) -> String {
        format!("try ({}) {{", self.binding(name, ty, value))
    }

    fn scope_close(&self) -> Option<&'static str> {
        Some("}")
    }

    fn trailing_comma(&self) -> bool {
        false
    }

    fn body_level(&self) -> usize {
        2
    }

    fn wrap_entry(&self, body: Vec<String>) -> Vec<String> {
        let indent = self.indent_unit();
        let mut lines = Vec::with_capacity(body.len() + 4);
        lines.push("public class Main {".to_string());
        lines.push(format!("{}public static void main(String[] args) throws Exception {{", indent));
        lines.extend(body);
        lines.push(format!("{}}}", indent));
        lines.push("}".to_string());
        lines
    }
}
