//! Request Model: the validated intermediate representation of a request

use crate::http::Method;
use serde::{Serialize, Serializer};
use std::fmt;
use url::form_urlencoded;

pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";
pub const APPLICATION_JSON: &str = "application/json";

/// Request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Body {
    None,
    Raw {
        #[serde(serialize_with = "serialize_lossy")]
        bytes: Vec<u8>,
        content_type: Option<String>,
    },
    UrlEncodedForm {
        pairs: Vec<(String, String)>,
    },
    Multipart {
        parts: Vec<Part>,
    },
    /// Payload read from a file when the request is sent (`-d @path`)
    File {
        path: String,
        content_type: Option<String>,
    },
}

impl Body {
    pub fn is_none(&self) -> bool {
        matches!(self, Body::None)
    }

    /// Content type the body carries on its own, without any explicit header
    pub fn implied_content_type(&self) -> Option<&str> {
        match self {
            Body::None => None,
            Body::Raw { content_type, .. } | Body::File { content_type, .. } => content_type.as_deref(),
            Body::UrlEncodedForm { .. } => Some(FORM_URLENCODED),
            Body::Multipart { .. } => Some(MULTIPART_FORM_DATA),
        }
    }
}

/// One part of a multipart body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Part {
    pub name: String,
    pub value: PartValue,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PartValue {
    Text { value: String },
    File { path: String, filename: Option<String> },
}

impl PartValue {
    pub fn is_file(&self) -> bool {
        matches!(self, PartValue::File { .. })
    }
}

/// Request authentication
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Auth {
    #[default]
    None,
    /// `password` is `None` when curl would have prompted for it
    Basic { user: String, password: Option<String> },
}

/// Non-fatal note produced while building or normalizing the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub message: String,
    pub offset: Option<usize>,
}

impl Warning {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), offset: None }
    }

    pub fn at(message: impl Into<String>, offset: usize) -> Self {
        Self { message: message.into(), offset: Some(offset) }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "{} (at offset {})", self.message, offset),
            None => f.write_str(&self.message),
        }
    }
}

/// One `name[=value]` segment of a query string
///
/// Both halves stay percent-encoded exactly as curl would send them, so a
/// bare `flag` never turns into `flag=` and `/` never turns into `%2F`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryParam {
    pub name: String,
    /// `None` when the segment has no `=`
    pub value: Option<String>,
}

impl QueryParam {
    pub fn new(name: impl Into<String>, value: Option<&str>) -> Self {
        Self { name: name.into(), value: value.map(str::to_string) }
    }

    /// Split an encoded query string on `&` without decoding it
    pub fn split(query: &str) -> Vec<QueryParam> {
        query
            .split('&')
            .map(|segment| match segment.split_once('=') {
                Some((name, value)) => Self::new(name, Some(value)),
                None => Self::new(segment, None),
            })
            .collect()
    }
}

impl fmt::Display for QueryParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={}", self.name, value),
            None => f.write_str(&self.name),
        }
    }
}

/// The HTTP request described by a curl command
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestModel {
    pub method: Method,
    /// Validated URL without query string or fragment
    pub url: String,
    pub query: Vec<QueryParam>,
    pub headers: Vec<(String, String)>,
    pub body: Body,
    pub auth: Auth,
    pub cookies: Vec<(String, String)>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub follow_redirects: bool,
    pub max_redirects: Option<u32>,
    pub insecure_tls: bool,
    pub compressed: bool,
    /// Whole-transfer timeout in seconds
    pub timeout: Option<f64>,
    pub connect_timeout: Option<f64>,
    pub proxy: Option<String>,
}

impl RequestModel {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: Body::None,
            auth: Auth::None,
            cookies: Vec::new(),
            user_agent: None,
            referer: None,
            follow_redirects: false,
            max_redirects: None,
            insecure_tls: false,
            compressed: false,
            timeout: None,
            connect_timeout: None,
            proxy: None,
        }
    }

    /// URL with the query segments appended verbatim
    pub fn full_url(&self) -> String {
        if self.query.is_empty() {
            return self.url.clone();
        }
        let query: Vec<String> = self.query.iter().map(ToString::to_string).collect();
        format!("{}?{}", self.url, query.join("&"))
    }

    /// First header with the given name, compared case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }

    /// Reconcile the body with an explicit `Content-Type` header
    ///
    /// The explicit header always wins. A disagreement is reported as a
    /// warning, and a form body under a non-form header becomes a raw body
    /// with the same encoded bytes.
    pub fn normalize(&mut self) -> Vec<Warning> {
        let mut warnings = Vec::new();

        let explicit = match self.header("Content-Type") {
            Some(value) => value.to_string(),
            None => return warnings,
        };
        let implied = match self.body.implied_content_type() {
            Some(value) => value.to_string(),
            None => return warnings,
        };

        let same = same_media_type(&explicit, &implied);
        if !same {
            warnings.push(Warning::new(format!(
                "Content-Type header '{}' overrides '{}' implied by the body",
                explicit, implied
            )));
        }

        if let Body::UrlEncodedForm { pairs } = &self.body {
            if !same {
                let bytes = encode_pairs(pairs).into_bytes();
                self.body = Body::Raw { bytes, content_type: None };
            }
        }

        if let Body::Raw { content_type, .. } | Body::File { content_type, .. } = &mut self.body {
            *content_type = None;
        }

        warnings
    }
}

/// `application/x-www-form-urlencoded` serialization of ordered pairs
pub fn encode_pairs(pairs: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter())
        .finish()
}

/// Decode `a=1&b=2` into ordered pairs
pub fn decode_pairs(text: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(text.as_bytes()).into_owned().collect()
}

/// Pairs of a form body that re-encodes to exactly `text`
///
/// `None` when decoding would lose bytes (`%20` against `+`, a bare key,
/// an invalid escape), so the body has to stay raw.
pub fn lossless_pairs(text: &str) -> Option<Vec<(String, String)>> {
    let pairs = decode_pairs(text);
    (encode_pairs(&pairs) == text).then_some(pairs)
}

/// Compare two content types by essence (`type/subtype`), ignoring parameters
pub fn same_media_type(a: &str, b: &str) -> bool {
    match (a.parse::<mime::Mime>(), b.parse::<mime::Mime>()) {
        (Ok(a), Ok(b)) => a.essence_str() == b.essence_str(),
        _ => {
            let essence = |s: &str| s.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
            essence(a) == essence(b)
        }
    }
}

fn serialize_lossy<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(bytes))
}
