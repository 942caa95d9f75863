//! curl command backend
//!
//! Renders the model back into one canonical curl invocation: method first,
//! then the URL, then one option per continued line. Every word goes through
//! [`shell_quote`], so the command imports back into the same model.
//!
//! A shell command has no client, imports or scopes, so this backend walks
//! the driver's fields directly instead of going through the AST.

use super::{cookie_header, fields, text_body, Field};
use crate::errors::GenerationError;
use crate::http::Method;
use crate::request::{encode_pairs, same_media_type, Body, Part, PartValue, RequestModel, APPLICATION_JSON, FORM_URLENCODED};
use crate::strings::shell_quote;

const STYLE: &str = "curl";

/// The curl command for `model`, one option per line
pub fn command(model: &RequestModel) -> Result<String, GenerationError> {
    let mut lines = Vec::new();
    for field in fields(model) {
        options(field, &mut lines)?;
    }

    let mut out = lines.join(" \\\n  ");
    out.push('\n');
    Ok(out)
}

fn unsupported(feature: &str) -> GenerationError {
    GenerationError::UnsupportedFeatureForStyle { feature: feature.to_string(), style: STYLE }
}

fn arg(flag: &str, value: &str) -> String {
    format!("{} {}", flag, shell_quote(value))
}

fn options(field: Field<'_>, lines: &mut Vec<String>) -> Result<(), GenerationError> {
    match field {
        Field::Target { method, url } => {
            lines.push(match method {
                Method::Head => "curl -I".to_string(),
                method => format!("curl {}", arg("-X", method.as_str())),
            });
            lines.push(shell_quote(&url));
        }
        Field::Header { name, value } if value.is_empty() => lines.push(arg("-H", &format!("{};", name))),
        Field::Header { name, value } => lines.push(arg("-H", &format!("{}: {}", name, value))),
        Field::UserAgent(agent) => lines.push(arg("-A", agent)),
        Field::Referer(referer) => lines.push(arg("-e", referer)),
        Field::Cookies(cookies) => lines.push(arg("-b", &cookie_header(cookies))),
        Field::Body(body) => body_options(body, lines)?,
        Field::Auth { user, password } => {
            let credentials = match password {
                Some(password) => format!("{}:{}", user, password),
                None => user.to_string(),
            };
            lines.push(arg("-u", &credentials));
        }
        Field::Redirects { follow, max } => {
            if follow {
                lines.push("-L".to_string());
            }
            if let Some(max) = max {
                lines.push(format!("--max-redirs {}", max));
            }
        }
        Field::InsecureTls => lines.push("-k".to_string()),
        Field::Compressed => lines.push("--compressed".to_string()),
        Field::Timeout(seconds) => lines.push(format!("-m {}", seconds)),
        Field::ConnectTimeout(seconds) => lines.push(format!("--connect-timeout {}", seconds)),
        Field::Proxy(proxy) => lines.push(arg("-x", proxy)),
    }
    Ok(())
}

fn body_options(body: &Body, lines: &mut Vec<String>) -> Result<(), GenerationError> {
    match body {
        Body::None => {}
        Body::Raw { bytes, content_type } => {
            let text = text_body(bytes).ok_or_else(|| unsupported("binary body"))?;
            if is_json(content_type) {
                if text.starts_with('@') {
                    return Err(unsupported("JSON body starting with '@'"));
                }
                lines.push(arg("--json", text));
                return Ok(());
            }
            content_type_header(content_type, lines);
            // --data-binary would read a leading '@' as a file name
            let flag = if text.starts_with('@') { "--data-raw" } else { "--data-binary" };
            lines.push(arg(flag, text));
        }
        Body::UrlEncodedForm { pairs } => {
            for pair in pairs {
                lines.push(arg("-d", &encode_pairs(std::slice::from_ref(pair))));
            }
        }
        Body::Multipart { parts } => {
            for part in parts {
                lines.push(part_option(part)?);
            }
        }
        Body::File { path, content_type } => {
            let reference = format!("@{}", path);
            if is_json(content_type) {
                lines.push(arg("--json", &reference));
            } else {
                content_type_header(content_type, lines);
                lines.push(arg("--data-binary", &reference));
            }
        }
    }
    Ok(())
}

fn is_json(content_type: &Option<String>) -> bool {
    matches!(content_type, Some(ct) if same_media_type(ct, APPLICATION_JSON))
}

/// A body content type curl would not imply on its own
fn content_type_header(content_type: &Option<String>, lines: &mut Vec<String>) {
    if let Some(content_type) = content_type {
        if !same_media_type(content_type, FORM_URLENCODED) {
            lines.push(arg("-H", &format!("Content-Type: {}", content_type)));
        }
    }
}

fn part_option(part: &Part) -> Result<String, GenerationError> {
    if part.name.contains('=') {
        return Err(unsupported("multipart field name containing '='"));
    }

    match (&part.value, &part.content_type) {
        (PartValue::Text { value }, content_type) => {
            let special = value.starts_with('@') || value.starts_with('<');
            match content_type {
                None if special || value.contains(";type=") => {
                    Ok(arg("--form-string", &format!("{}={}", part.name, value)))
                }
                None => Ok(arg("-F", &format!("{}={}", part.name, value))),
                Some(_) if special => Err(unsupported("typed multipart text starting with '@' or '<'")),
                Some(content_type) => Ok(arg("-F", &format!("{}={};type={}", part.name, value, content_type))),
            }
        }
        (PartValue::File { path, filename }, content_type) => {
            if path.contains(';') || filename.as_deref().is_some_and(|f| f.contains(';')) {
                return Err(unsupported("multipart file name containing ';'"));
            }
            let mut spec = format!("{}=@{}", part.name, path);
            if let Some(content_type) = content_type {
                spec.push_str(&format!(";type={}", content_type));
            }
            if let Some(filename) = filename {
                spec.push_str(&format!(";filename={}", filename));
            }
            Ok(arg("-F", &spec))
        }
    }
}
