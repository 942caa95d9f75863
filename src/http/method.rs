//! HTTP method enumeration and inference rules

use serde::{Serialize, Serializer};
use std::fmt;

/// HTTP GET method
pub const GET: &str = "GET";

/// HTTP POST method
pub const POST: &str = "POST";

/// HTTP PUT method
pub const PUT: &str = "PUT";

/// HTTP PATCH method
pub const PATCH: &str = "PATCH";

/// HTTP DELETE method
pub const DELETE: &str = "DELETE";

/// HTTP HEAD method
pub const HEAD: &str = "HEAD";

/// HTTP OPTIONS method
pub const OPTIONS: &str = "OPTIONS";

/// Request method as curl would send it
///
/// Standard names are matched exactly (curl sends `-X` verbatim, so
/// `-X get` is a custom verb, not GET).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Custom(String),
}

impl Method {
    /// Build a method from a `-X` argument without changing its spelling
    pub fn from_verbatim(s: &str) -> Self {
        match s {
            GET => Method::Get,
            POST => Method::Post,
            PUT => Method::Put,
            PATCH => Method::Patch,
            DELETE => Method::Delete,
            HEAD => Method::Head,
            OPTIONS => Method::Options,
            other => Method::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => GET,
            Method::Post => POST,
            Method::Put => PUT,
            Method::Patch => PATCH,
            Method::Delete => DELETE,
            Method::Head => HEAD,
            Method::Options => OPTIONS,
            Method::Custom(s) => s,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Method {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Infer HTTP method based on whether the request has data
pub fn infer(has_data: bool) -> Method {
    if has_data {
        Method::Post
    } else {
        Method::Get
    }
}
