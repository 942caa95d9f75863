//! Command parser: tokens to Request Model
//!
//! Walks the token stream against the flag table, collects per-slot state
//! and resolves flag interactions once the whole command has been read.

use super::flags::{self, DataKind, FlagSpec, FormKind, Slot};
use super::tokenizer::Token;
use crate::errors::ParseError;
use crate::http::{self, Method};
use crate::request::{
    lossless_pairs, Auth, Body, Part, PartValue, QueryParam, RequestModel, Warning,
    APPLICATION_JSON, FORM_URLENCODED,
};
use crate::strings::curl_urlencode;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use tracing::debug;
use url::Url;

/// Bytes the URL parser escapes inside a query; `%` escapes are left alone
const QUERY_ESCAPES: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'#').add(b'<').add(b'>');

/// Largest accepted `-m` / `--connect-timeout`, in seconds
///
/// Keeps every generated duration literal inside a Java `int` and far below
/// the point where `Duration::from_secs_f64` panics.
const MAX_TIMEOUT_SECONDS: f64 = i32::MAX as f64;

/// Successful parse result
#[derive(Debug, Clone)]
pub struct Parsed {
    pub model: RequestModel,
    pub warnings: Vec<Warning>,
}

/// Parse a token sequence into a normalized Request Model
pub fn parse(tokens: &[Token]) -> Result<Parsed, ParseError> {
    if tokens.is_empty() {
        return Err(ParseError::EmptyCommand);
    }

    let mut i = match tokens.first() {
        Some(first) if !first.is_operator() && first.value == "curl" => 1,
        _ => 0,
    };
    let mut state = ParseState::default();
    let mut options_done = false;

    while i < tokens.len() {
        let token = &tokens[i];
        let value = token.value.as_str();

        if token.is_operator() {
            state.warnings.push(Warning::at(
                format!("Ignoring shell text from '{}' onwards", value),
                token.offset,
            ));
            break;
        }

        if options_done {
            state.positional(token)?;
        } else if value == "--" {
            options_done = true;
        } else if value.starts_with("--") {
            let spec = flags::lookup(value).ok_or_else(|| ParseError::UnrecognizedFlag {
                flag: value.to_string(),
                offset: token.offset,
            })?;
            let arg = if spec.takes_argument() {
                i += 1;
                Some(next_argument(tokens, i, value, token.offset)?)
            } else {
                None
            };
            state.apply(spec, value, arg, token.offset)?;
        } else if value.starts_with('-') && value.len() > 1 {
            i = short_cluster(&mut state, tokens, i)?;
        } else {
            state.positional(token)?;
        }

        i += 1;
    }

    let parsed = state.finish()?;
    debug!(
        method = %parsed.model.method,
        url = %parsed.model.url,
        warnings = parsed.warnings.len(),
        "Parsed curl command"
    );
    Ok(parsed)
}

/// Argument of an arity-1 flag
struct Arg {
    value: String,
    offset: usize,
}

fn next_argument(tokens: &[Token], at: usize, flag: &str, flag_offset: usize) -> Result<Arg, ParseError> {
    match tokens.get(at) {
        Some(token) if !token.is_operator() => Ok(Arg { value: token.value.clone(), offset: token.offset }),
        _ => Err(ParseError::MissingFlagArgument { flag: flag.to_string(), offset: flag_offset }),
    }
}

/// Expand `-sSL` / `-XPOST` / `-sXPUT`; returns the index of the last consumed token
fn short_cluster(state: &mut ParseState, tokens: &[Token], at: usize) -> Result<usize, ParseError> {
    let token = &tokens[at];
    let letters: Vec<char> = token.value.chars().skip(1).collect();
    let mut consumed = at;

    for (n, &c) in letters.iter().enumerate() {
        let spec = flags::lookup_short(c).ok_or_else(|| ParseError::UnrecognizedFlag {
            flag: if letters.len() == 1 { token.value.clone() } else { format!("-{}", c) },
            offset: token.offset,
        })?;
        let spelling = format!("-{}", c);

        if !spec.takes_argument() {
            state.apply(spec, &spelling, None, token.offset)?;
            continue;
        }

        let attached: String = letters[n + 1..].iter().collect();
        let arg = if attached.is_empty() {
            consumed += 1;
            next_argument(tokens, consumed, &spelling, token.offset)?
        } else {
            Arg { value: attached, offset: token.offset + n + 2 }
        };
        state.apply(spec, &spelling, Some(arg), token.offset)?;
        break;
    }

    Ok(consumed)
}

/// Which data flags have been merged so far
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DataClass {
    Text,
    Binary,
    Json,
}

impl DataClass {
    fn of(kind: DataKind) -> Self {
        match kind {
            DataKind::Ascii | DataKind::Raw | DataKind::UrlEncode => DataClass::Text,
            DataKind::Binary => DataClass::Binary,
            DataKind::Json => DataClass::Json,
        }
    }
}

enum Chunk {
    Text(String),
    File { path: String, offset: usize },
}

struct DataAccumulator {
    class: DataClass,
    /// Spelling of the first data flag, for conflict messages
    flag: String,
    chunks: Vec<Chunk>,
}

impl DataAccumulator {
    fn file(&self) -> Option<(&str, usize)> {
        self.chunks.iter().find_map(|c| match c {
            Chunk::File { path, offset } => Some((path.as_str(), *offset)),
            Chunk::Text(_) => None,
        })
    }

    fn joined(&self) -> String {
        let separator = if self.class == DataClass::Json { "" } else { "&" };
        self.chunks
            .iter()
            .filter_map(|c| match c {
                Chunk::Text(text) => Some(text.as_str()),
                Chunk::File { .. } => None,
            })
            .collect::<Vec<_>>()
            .join(separator)
    }

    fn content_type(&self) -> &'static str {
        match self.class {
            DataClass::Json => APPLICATION_JSON,
            DataClass::Text | DataClass::Binary => FORM_URLENCODED,
        }
    }

    fn into_body(self) -> Result<Body, ParseError> {
        if let Some((path, offset)) = self.file() {
            if self.chunks.len() > 1 {
                return Err(ParseError::InvalidFlagArgument {
                    flag: self.flag.clone(),
                    reason: "a file reference cannot be combined with other data".to_string(),
                    offset,
                });
            }
            return Ok(Body::File {
                path: path.to_string(),
                content_type: Some(self.content_type().to_string()),
            });
        }

        let text = self.joined();
        if self.class == DataClass::Text && looks_like_form(&text) {
            if let Some(pairs) = lossless_pairs(&text) {
                return Ok(Body::UrlEncodedForm { pairs });
            }
        }
        Ok(Body::Raw {
            bytes: text.into_bytes(),
            content_type: Some(self.content_type().to_string()),
        })
    }
}

fn looks_like_form(text: &str) -> bool {
    let trimmed = text.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('{') || trimmed.starts_with('[') {
        return false;
    }
    text.split('&')
        .all(|segment| matches!(segment.split_once('='), Some((name, _)) if !name.is_empty()))
}

#[derive(Default)]
struct ParseState {
    method: Option<(String, usize)>,
    url: Option<(String, usize)>,
    headers: Vec<(String, String)>,
    data: Option<DataAccumulator>,
    parts: Vec<Part>,
    /// Spelling of the first form flag
    form_flag: Option<String>,
    auth: Auth,
    cookies: Vec<(String, String)>,
    /// Offset of the first `-b`
    cookie_offset: Option<usize>,
    user_agent: Option<(String, usize)>,
    referer: Option<(String, usize)>,
    insecure: bool,
    follow: bool,
    max_redirects: Option<u32>,
    get_mode: Option<(String, usize)>,
    head: bool,
    compressed: bool,
    timeout: Option<f64>,
    connect_timeout: Option<f64>,
    proxy: Option<String>,
    warnings: Vec<Warning>,
}

impl ParseState {
    fn positional(&mut self, token: &Token) -> Result<(), ParseError> {
        if self.url.is_some() {
            return Err(ParseError::UnexpectedArgument {
                value: token.value.clone(),
                offset: token.offset,
            });
        }
        self.url = Some((token.value.clone(), token.offset));
        Ok(())
    }

    fn apply(&mut self, spec: &FlagSpec, spelling: &str, arg: Option<Arg>, offset: usize) -> Result<(), ParseError> {
        let arg = match (spec.takes_argument(), arg) {
            (true, Some(arg)) => arg,
            (true, None) => {
                return Err(ParseError::MissingFlagArgument { flag: spelling.to_string(), offset })
            }
            (false, _) => Arg { value: String::new(), offset },
        };
        let invalid = |reason: &str| ParseError::InvalidFlagArgument {
            flag: spelling.to_string(),
            reason: reason.to_string(),
            offset: arg.offset,
        };

        match spec.slot {
            Slot::Method => {
                if arg.value.is_empty() {
                    return Err(invalid("method cannot be empty"));
                }
                self.method = Some((arg.value, arg.offset));
            }
            Slot::Url => {
                if self.url.is_some() {
                    return Err(ParseError::UnexpectedArgument { value: arg.value, offset: arg.offset });
                }
                self.url = Some((arg.value, arg.offset));
            }
            Slot::Header => {
                let header = parse_header(&arg.value).ok_or_else(|| invalid("expected 'Name: value'"))?;
                self.headers.push(header);
            }
            Slot::Data(kind) => self.data(kind, spelling, arg)?,
            Slot::Form(kind) => self.form(kind, spelling, arg)?,
            Slot::User => {
                let credentials = arg
                    .value
                    .split_once(':')
                    .map(|(user, password)| (user.to_string(), password.to_string()));
                self.auth = match credentials {
                    Some((user, password)) => Auth::Basic { user, password: Some(password) },
                    None => {
                        self.warnings.push(Warning::at(
                            format!(
                                "No password given for user '{}'; curl would prompt for one, the generated code sends none",
                                arg.value
                            ),
                            arg.offset,
                        ));
                        Auth::Basic { user: arg.value, password: None }
                    }
                };
            }
            Slot::Cookie => {
                if !arg.value.contains('=') {
                    return Err(invalid("reading cookies from a file is not supported; pass 'name=value' pairs"));
                }
                self.cookie_offset.get_or_insert(arg.offset);
                for segment in arg.value.split(';').map(str::trim).filter(|s| !s.is_empty()) {
                    let (name, value) = segment
                        .split_once('=')
                        .ok_or_else(|| invalid("every cookie must be 'name=value'"))?;
                    self.cookies.push((name.trim().to_string(), value.trim().to_string()));
                }
            }
            Slot::UserAgent => self.user_agent = Some((arg.value, arg.offset)),
            Slot::Referer => self.referer = Some((arg.value, arg.offset)),
            Slot::Insecure => self.insecure = true,
            Slot::FollowRedirects => self.follow = true,
            Slot::MaxRedirects => {
                self.max_redirects = match arg.value.trim() {
                    "-1" => {
                        self.warnings.push(Warning::at(
                            format!("{} -1 (unlimited) falls back to the client's default redirect limit", spelling),
                            offset,
                        ));
                        None
                    }
                    value => Some(value.parse::<u32>().map_err(|_| invalid("expected -1 or a non-negative integer"))?),
                };
            }
            Slot::GetMode => self.get_mode = Some((spelling.to_string(), offset)),
            Slot::Head => self.head = true,
            Slot::Compressed => self.compressed = true,
            Slot::MaxTime | Slot::ConnectTimeout => {
                let seconds = parse_seconds(&arg.value).ok_or_else(|| {
                    invalid(&format!("expected seconds between 0 and {}", MAX_TIMEOUT_SECONDS))
                })?;
                let timeout = if seconds == 0.0 {
                    self.warnings.push(Warning::at(
                        format!("{} 0 disables the timeout; none is generated", spelling),
                        offset,
                    ));
                    None
                } else {
                    Some(seconds)
                };
                match spec.slot {
                    Slot::MaxTime => self.timeout = timeout,
                    _ => self.connect_timeout = timeout,
                }
            }
            Slot::Proxy => {
                if arg.value.trim().is_empty() {
                    return Err(invalid("proxy cannot be empty"));
                }
                self.proxy = Some(arg.value);
            }
            Slot::NoEffect => self.warnings.push(Warning::at(
                format!("{} only changes curl's output and has no effect on generated code", spelling),
                offset,
            )),
        }
        Ok(())
    }

    fn data(&mut self, kind: DataKind, spelling: &str, arg: Arg) -> Result<(), ParseError> {
        if let Some(form_flag) = &self.form_flag {
            return Err(ParseError::ConflictingBodyFlags {
                flag: spelling.to_string(),
                previous: form_flag.clone(),
                offset: arg.offset,
            });
        }

        let class = DataClass::of(kind);
        let accumulator = self.data.get_or_insert_with(|| DataAccumulator {
            class,
            flag: spelling.to_string(),
            chunks: Vec::new(),
        });
        if accumulator.class != class {
            return Err(ParseError::ConflictingBodyFlags {
                flag: spelling.to_string(),
                previous: accumulator.flag.clone(),
                offset: arg.offset,
            });
        }

        let chunk = match kind {
            DataKind::Raw => Chunk::Text(arg.value),
            DataKind::UrlEncode => Chunk::Text(urlencode_data(&arg.value).ok_or_else(|| {
                ParseError::InvalidFlagArgument {
                    flag: spelling.to_string(),
                    reason: "reading content from a file is not supported".to_string(),
                    offset: arg.offset,
                }
            })?),
            DataKind::Ascii | DataKind::Binary | DataKind::Json => match arg.value.strip_prefix('@') {
                Some(path) => Chunk::File { path: path.to_string(), offset: arg.offset },
                None => Chunk::Text(arg.value),
            },
        };
        accumulator.chunks.push(chunk);
        Ok(())
    }

    fn form(&mut self, kind: FormKind, spelling: &str, arg: Arg) -> Result<(), ParseError> {
        if let Some(data) = &self.data {
            return Err(ParseError::ConflictingBodyFlags {
                flag: spelling.to_string(),
                previous: data.flag.clone(),
                offset: arg.offset,
            });
        }
        let invalid = |reason: &str| ParseError::InvalidFlagArgument {
            flag: spelling.to_string(),
            reason: reason.to_string(),
            offset: arg.offset,
        };

        let (name, content) = arg
            .value
            .split_once('=')
            .ok_or_else(|| invalid("expected 'name=content'"))?;

        let part = match kind {
            FormKind::Literal => Part {
                name: name.to_string(),
                value: PartValue::Text { value: content.to_string() },
                content_type: None,
            },
            FormKind::Field => {
                if content.starts_with('<') {
                    return Err(invalid("reading a field value from a file is not supported"));
                }
                match content.strip_prefix('@') {
                    Some(file) => file_part(name, file).map_err(|reason| invalid(&reason))?,
                    None => text_part(name, content),
                }
            }
        };

        self.form_flag.get_or_insert_with(|| spelling.to_string());
        self.parts.push(part);
        Ok(())
    }

    fn finish(mut self) -> Result<Parsed, ParseError> {
        let (raw_url, url_offset) = self.url.take().ok_or(ParseError::MissingUrl)?;
        let (url, query) = validate_url(&raw_url, url_offset)?;
        self.drop_overridden_headers();

        let mut model = RequestModel::new(url);
        model.query = query;

        let json = matches!(&self.data, Some(data) if data.class == DataClass::Json);

        if let Some((flag, offset)) = &self.get_mode {
            if let Some(form_flag) = &self.form_flag {
                return Err(ParseError::ConflictingBodyFlags {
                    flag: flag.clone(),
                    previous: form_flag.clone(),
                    offset: *offset,
                });
            }
            if let Some(data) = self.data.take() {
                if data.file().is_some() {
                    return Err(ParseError::ConflictingBodyFlags {
                        flag: flag.clone(),
                        previous: data.flag.clone(),
                        offset: *offset,
                    });
                }
                let joined = data.joined();
                if !joined.is_empty() {
                    let escaped = utf8_percent_encode(&joined, QUERY_ESCAPES).to_string();
                    model.query.extend(QueryParam::split(&escaped));
                }
            }
        } else if !self.parts.is_empty() {
            model.body = Body::Multipart { parts: std::mem::take(&mut self.parts) };
        } else if let Some(data) = self.data.take() {
            model.body = data.into_body()?;
        }

        model.method = match &self.method {
            Some((verbatim, _)) => Method::from_verbatim(verbatim),
            None if self.head => Method::Head,
            None if self.get_mode.is_some() => Method::Get,
            None => http::infer(!model.body.is_none()),
        };

        if json && !self.headers.iter().any(|(n, _)| n.eq_ignore_ascii_case("Accept")) {
            self.headers.push(("Accept".to_string(), APPLICATION_JSON.to_string()));
        }

        model.headers = self.headers;
        model.auth = self.auth;
        model.cookies = self.cookies;
        model.user_agent = self.user_agent.map(|(value, _)| value);
        model.referer = self.referer.map(|(value, _)| value);
        model.follow_redirects = self.follow;
        model.max_redirects = self.max_redirects;
        model.insecure_tls = self.insecure;
        model.compressed = self.compressed;
        model.timeout = self.timeout;
        model.connect_timeout = self.connect_timeout;
        model.proxy = self.proxy;

        let mut warnings = self.warnings;
        warnings.extend(model.normalize());

        Ok(Parsed { model, warnings })
    }

    /// An explicit `-H User-Agent:` / `Referer:` / `Cookie:` replaces what
    /// `-A` / `-e` / `-b` would have sent, as in curl
    fn drop_overridden_headers(&mut self) {
        let explicit = |name: &str| self.headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name));
        let (agent, referer, cookie) = (explicit("User-Agent"), explicit("Referer"), explicit("Cookie"));

        if agent {
            if let Some((_, offset)) = self.user_agent.take() {
                self.warnings.push(Warning::at("User-Agent header replaces the value given by -A", offset));
            }
        }
        if referer {
            if let Some((_, offset)) = self.referer.take() {
                self.warnings.push(Warning::at("Referer header replaces the value given by -e", offset));
            }
        }
        if cookie && !self.cookies.is_empty() {
            self.cookies.clear();
            if let Some(offset) = self.cookie_offset {
                self.warnings.push(Warning::at("Cookie header replaces the cookies given by -b", offset));
            }
        }
    }
}

/// `Name: value`, or `Name;` for an empty-valued header
fn parse_header(raw: &str) -> Option<(String, String)> {
    if let Some((name, value)) = raw.split_once(':') {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        return Some((name.to_string(), value.trim().to_string()));
    }
    let name = raw.strip_suffix(';')?.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), String::new()))
}

/// `content`, `=content` and `name=content` forms of `--data-urlencode`
fn urlencode_data(raw: &str) -> Option<String> {
    if let Some((name, content)) = raw.split_once('=') {
        return Some(if name.is_empty() {
            curl_urlencode(content)
        } else {
            format!("{}={}", name, curl_urlencode(content))
        });
    }
    if raw.contains('@') {
        return None;
    }
    Some(curl_urlencode(raw))
}

fn text_part(name: &str, content: &str) -> Part {
    let (value, content_type) = match content.rfind(";type=") {
        Some(at) => (&content[..at], Some(content[at + ";type=".len()..].to_string())),
        None => (content, None),
    };
    Part {
        name: name.to_string(),
        value: PartValue::Text { value: value.to_string() },
        content_type,
    }
}

/// `path[;type=...][;filename=...]`
fn file_part(name: &str, spec: &str) -> Result<Part, String> {
    let mut segments = spec.split(';');
    let path = segments.next().unwrap_or_default();
    if path.is_empty() {
        return Err("missing file path after '@'".to_string());
    }

    let mut content_type = None;
    let mut filename = None;
    for segment in segments {
        match segment.split_once('=') {
            Some(("type", value)) => content_type = Some(value.to_string()),
            Some(("filename", value)) => filename = Some(value.trim_matches('"').to_string()),
            _ => return Err(format!("unsupported form parameter '{}'", segment)),
        }
    }

    Ok(Part {
        name: name.to_string(),
        value: PartValue::File { path: path.to_string(), filename },
        content_type,
    })
}

fn parse_seconds(raw: &str) -> Option<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|s| s.is_finite() && (0.0..=MAX_TIMEOUT_SECONDS).contains(s))
}

/// Validate the target URL and split off its query string
fn validate_url(raw: &str, offset: usize) -> Result<(String, Vec<QueryParam>), ParseError> {
    let invalid = |reason: String| ParseError::InvalidUrl { url: raw.to_string(), reason, offset };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid("URL is empty".to_string()));
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };
    let mut url = Url::parse(&with_scheme).map_err(|e| invalid(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }

    let query = match url.query() {
        Some(query) if !query.is_empty() => QueryParam::split(query),
        _ => Vec::new(),
    };
    url.set_query(None);
    url.set_fragment(None);

    Ok((url.to_string(), query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::tokenize;

    fn parse_str(raw: &str) -> Result<Parsed, ParseError> {
        parse(&tokenize(raw).unwrap())
    }

    fn model(raw: &str) -> RequestModel {
        parse_str(raw).unwrap().model
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn query(items: &[(&str, &str)]) -> Vec<QueryParam> {
        items.iter().map(|(k, v)| QueryParam::new(*k, Some(*v))).collect()
    }

    #[test]
    fn test_simple_get() {
        let m = model("curl http://x/y");
        assert_eq!(m.method, Method::Get);
        assert_eq!(m.url, "http://x/y");
        assert!(m.headers.is_empty());
        assert_eq!(m.body, Body::None);
    }

    #[test]
    fn test_leading_curl_is_optional() {
        assert_eq!(model("http://x/y"), model("curl http://x/y"));
    }

    #[test]
    fn test_repeated_headers_keep_order() {
        let m = model("curl -H 'A: 1' -H 'B: 2' --header 'A: 3' http://x/");
        assert_eq!(m.headers, pairs(&[("A", "1"), ("B", "2"), ("A", "3")]));
    }

    #[test]
    fn test_empty_header_and_invalid_header() {
        assert_eq!(model("curl -H 'X-Empty;' http://x/").headers, pairs(&[("X-Empty", "")]));
        assert!(matches!(
            parse_str("curl -H nocolon http://x/"),
            Err(ParseError::InvalidFlagArgument { .. })
        ));
    }

    #[test]
    fn test_post_form_data() {
        let m = model("curl -X POST -d a=1 -d b=2 http://x/");
        assert_eq!(m.method, Method::Post);
        assert_eq!(m.body, Body::UrlEncodedForm { pairs: pairs(&[("a", "1"), ("b", "2")]) });
    }

    #[test]
    fn test_data_infers_post() {
        assert_eq!(model("curl -d a=1 http://x/").method, Method::Post);
    }

    #[test]
    fn test_non_form_data_is_raw() {
        let m = model(r#"curl -d '{"a":1}' http://x/"#);
        assert_eq!(
            m.body,
            Body::Raw { bytes: br#"{"a":1}"#.to_vec(), content_type: Some(FORM_URLENCODED.to_string()) }
        );
        let m = model("curl -d hello http://x/");
        assert!(matches!(m.body, Body::Raw { .. }));
    }

    #[test]
    fn test_explicit_content_type_wins() {
        let parsed = parse_str(r#"curl -H 'Content-Type: application/json' -d '{"a":1}' http://x/"#).unwrap();
        assert_eq!(parsed.model.body, Body::Raw { bytes: br#"{"a":1}"#.to_vec(), content_type: None });
        assert_eq!(parsed.warnings.len(), 1);
    }

    #[test]
    fn test_get_mode_moves_data_to_query() {
        let m = model("curl -G -d q=test http://x/s");
        assert_eq!(m.method, Method::Get);
        assert_eq!(m.query, query(&[("q", "test")]));
        assert_eq!(m.body, Body::None);
    }

    #[test]
    fn test_get_mode_appends_after_url_query() {
        let m = model("curl -G -d b=2 'http://x/s?a=1#frag'");
        assert_eq!(m.url, "http://x/s");
        assert_eq!(m.query, query(&[("a", "1"), ("b", "2")]));
        assert_eq!(m.full_url(), "http://x/s?a=1&b=2");
    }

    #[test]
    fn test_url_query_is_kept_verbatim() {
        let m = model("curl 'http://x.test/s?flag&path=/a&enc=%2F'");
        assert_eq!(m.url, "http://x.test/s");
        assert_eq!(m.query[0], QueryParam::new("flag", None));
        assert_eq!(m.full_url(), "http://x.test/s?flag&path=/a&enc=%2F");
    }

    #[test]
    fn test_get_mode_escapes_only_what_a_url_cannot_hold() {
        let m = model("curl -G -d 'q=a b' -d 'path=/x' --data-urlencode 'v=1/2' 'http://x/s?flag'");
        assert_eq!(m.full_url(), "http://x/s?flag&q=a%20b&path=/x&v=1%2F2");
    }

    #[test]
    fn test_lossy_form_data_stays_raw() {
        let m = model("curl -d 'a=%ZZ' http://x/");
        assert_eq!(
            m.body,
            Body::Raw { bytes: b"a=%ZZ".to_vec(), content_type: Some(FORM_URLENCODED.to_string()) }
        );
        let m = model("curl -d 'q=a b' http://x/");
        assert!(matches!(m.body, Body::Raw { ref bytes, .. } if bytes == b"q=a b"));
    }

    #[test]
    fn test_explicit_method_beats_get_mode() {
        let m = model("curl -G -X DELETE -d id=1 http://x/");
        assert_eq!(m.method, Method::Delete);
        assert_eq!(m.query, query(&[("id", "1")]));
    }

    #[test]
    fn test_basic_auth() {
        let m = model("curl -u alice:secret http://x/");
        assert_eq!(m.auth, Auth::Basic { user: "alice".to_string(), password: Some("secret".to_string()) });
    }

    #[test]
    fn test_user_without_password_warns() {
        let parsed = parse_str("curl -u alice http://x/").unwrap();
        assert_eq!(parsed.model.auth, Auth::Basic { user: "alice".to_string(), password: None });
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.warnings[0].offset, Some(8));
    }

    #[test]
    fn test_multipart() {
        let m = model("curl -F file=@/tmp/a.txt -F name=bob http://x/");
        assert_eq!(m.method, Method::Post);
        match m.body {
            Body::Multipart { parts } => {
                assert_eq!(parts.len(), 2);
                assert_eq!(
                    parts[0].value,
                    PartValue::File { path: "/tmp/a.txt".to_string(), filename: None }
                );
                assert_eq!(parts[1].value, PartValue::Text { value: "bob".to_string() });
            }
            other => panic!("expected multipart, got {:?}", other),
        }
    }

    #[test]
    fn test_multipart_parameters() {
        let m = model("curl -F 'doc=@a.pdf;type=application/pdf;filename=report.pdf' -F 'n=1;type=text/plain' http://x/");
        let Body::Multipart { parts } = m.body else { panic!("expected multipart") };
        assert_eq!(parts[0].content_type.as_deref(), Some("application/pdf"));
        assert_eq!(
            parts[0].value,
            PartValue::File { path: "a.pdf".to_string(), filename: Some("report.pdf".to_string()) }
        );
        assert_eq!(parts[1].content_type.as_deref(), Some("text/plain"));
        assert_eq!(parts[1].value, PartValue::Text { value: "1".to_string() });
    }

    #[test]
    fn test_form_string_is_literal() {
        let m = model("curl --form-string 'a=@x;type=y' http://x/");
        let Body::Multipart { parts } = m.body else { panic!("expected multipart") };
        assert_eq!(parts[0].value, PartValue::Text { value: "@x;type=y".to_string() });
    }

    #[test]
    fn test_form_rejections() {
        assert!(matches!(parse_str("curl -F noequals http://x/"), Err(ParseError::InvalidFlagArgument { .. })));
        assert!(matches!(parse_str("curl -F 'a=<f.txt' http://x/"), Err(ParseError::InvalidFlagArgument { .. })));
    }

    #[test]
    fn test_form_conflicts_with_data() {
        let err = parse_str("curl -d a=1 -F b=2 http://x/").unwrap_err();
        assert_eq!(
            err,
            ParseError::ConflictingBodyFlags { flag: "-F".to_string(), previous: "-d".to_string(), offset: 15 }
        );
        assert!(matches!(
            parse_str("curl -F b=2 --data a=1 http://x/"),
            Err(ParseError::ConflictingBodyFlags { .. })
        ));
    }

    #[test]
    fn test_binary_conflicts_with_data() {
        assert!(matches!(
            parse_str("curl -d a=1 --data-binary b http://x/"),
            Err(ParseError::ConflictingBodyFlags { .. })
        ));
        let m = model("curl --data-binary a=1 --data-binary b=2 http://x/");
        assert_eq!(
            m.body,
            Body::Raw { bytes: b"a=1&b=2".to_vec(), content_type: Some(FORM_URLENCODED.to_string()) }
        );
    }

    #[test]
    fn test_get_mode_conflicts_with_form() {
        assert!(matches!(
            parse_str("curl -G -F a=1 http://x/"),
            Err(ParseError::ConflictingBodyFlags { .. })
        ));
        assert!(matches!(
            parse_str("curl -G -d @q.txt http://x/"),
            Err(ParseError::ConflictingBodyFlags { .. })
        ));
    }

    #[test]
    fn test_data_urlencode() {
        let m = model("curl --data-urlencode 'q=a b&c' --data-urlencode '=x y' --data-urlencode plain http://x/");
        assert_eq!(
            m.body,
            Body::Raw {
                bytes: b"q=a%20b%26c&x%20y&plain".to_vec(),
                content_type: Some(FORM_URLENCODED.to_string())
            }
        );
        let m = model("curl --data-urlencode 'q=a.b' -d n=1 http://x/");
        assert_eq!(m.body, Body::UrlEncodedForm { pairs: pairs(&[("q", "a.b"), ("n", "1")]) });
        // curl splits on the first '=' before looking for '@'
        let m = model("curl --data-urlencode 'x@y=z w' http://x/");
        assert!(matches!(m.body, Body::Raw { ref bytes, .. } if bytes == b"x@y=z%20w"));
        assert!(matches!(
            parse_str("curl --data-urlencode name@file http://x/"),
            Err(ParseError::InvalidFlagArgument { .. })
        ));
    }

    #[test]
    fn test_data_raw_keeps_at_sign() {
        let m = model("curl --data-raw @literal http://x/");
        assert!(matches!(m.body, Body::Raw { ref bytes, .. } if bytes == b"@literal"));
    }

    #[test]
    fn test_data_file_reference() {
        let m = model("curl -d @payload.json -H 'Content-Type: application/json' http://x/");
        assert_eq!(m.body, Body::File { path: "payload.json".to_string(), content_type: None });
        assert!(matches!(
            parse_str("curl -d @a.txt -d b=1 http://x/"),
            Err(ParseError::InvalidFlagArgument { .. })
        ));
    }

    #[test]
    fn test_json_flag() {
        let m = model(r#"curl --json '{"a":' --json '1}' http://x/"#);
        assert_eq!(m.method, Method::Post);
        assert_eq!(
            m.body,
            Body::Raw { bytes: br#"{"a":1}"#.to_vec(), content_type: Some(APPLICATION_JSON.to_string()) }
        );
        assert_eq!(m.headers, pairs(&[("Accept", "application/json")]));
        assert!(matches!(
            parse_str("curl --json '{}' -d a=1 http://x/"),
            Err(ParseError::ConflictingBodyFlags { .. })
        ));
    }

    #[test]
    fn test_custom_method_verbatim() {
        assert_eq!(model("curl -X purge http://x/").method, Method::Custom("purge".to_string()));
        assert_eq!(model("curl -XPUT http://x/").method, Method::Put);
    }

    #[test]
    fn test_head_flag() {
        assert_eq!(model("curl -I http://x/").method, Method::Head);
    }

    #[test]
    fn test_short_cluster() {
        let parsed = parse_str("curl -sSLk http://x/").unwrap();
        assert!(parsed.model.follow_redirects);
        assert!(parsed.model.insecure_tls);
        assert_eq!(parsed.warnings.len(), 2);

        let m = model("curl -sXPOST http://x/");
        assert_eq!(m.method, Method::Post);

        let m = model("curl -LH 'A: 1' http://x/");
        assert_eq!(m.headers, pairs(&[("A", "1")]));
    }

    #[test]
    fn test_unrecognized_flag() {
        assert_eq!(
            parse_str("curl --frobnicate http://x/").unwrap_err(),
            ParseError::UnrecognizedFlag { flag: "--frobnicate".to_string(), offset: 5 }
        );
        assert!(matches!(parse_str("curl -Z http://x/"), Err(ParseError::UnrecognizedFlag { .. })));
    }

    #[test]
    fn test_missing_argument() {
        assert_eq!(
            parse_str("curl http://x/ -H").unwrap_err(),
            ParseError::MissingFlagArgument { flag: "-H".to_string(), offset: 15 }
        );
        assert!(matches!(
            parse_str("curl http://x/ -d | jq"),
            Err(ParseError::MissingFlagArgument { .. })
        ));
    }

    #[test]
    fn test_url_errors() {
        assert_eq!(parse_str("curl -H 'A: b'").unwrap_err(), ParseError::MissingUrl);
        assert_eq!(parse(&[]).unwrap_err(), ParseError::EmptyCommand);
        assert!(matches!(parse_str("curl http://x/ http://y/"), Err(ParseError::UnexpectedArgument { .. })));
        assert!(matches!(parse_str("curl ftp://x/"), Err(ParseError::InvalidUrl { .. })));
        assert!(matches!(parse_str("curl 'http://exa mple.com/'"), Err(ParseError::InvalidUrl { .. })));
    }

    #[test]
    fn test_scheme_defaults_to_http() {
        assert_eq!(model("curl example.com/a").url, "http://example.com/a");
        assert_eq!(model("curl --url https://x/y").url, "https://x/y");
    }

    #[test]
    fn test_double_dash_ends_options() {
        assert_eq!(model("curl -- http://x/").url, "http://x/");
        assert!(matches!(parse_str("curl http://x/ -- -d"), Err(ParseError::UnexpectedArgument { .. })));
    }

    #[test]
    fn test_operator_ends_command() {
        let parsed = parse_str("curl http://x/ | jq .").unwrap();
        assert_eq!(parsed.model.url, "http://x/");
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.warnings[0].offset, Some(15));
    }

    #[test]
    fn test_cookies() {
        let m = model("curl -b 'a=1; b=2' -b c=3 http://x/");
        assert_eq!(m.cookies, pairs(&[("a", "1"), ("b", "2"), ("c", "3")]));
        assert!(matches!(
            parse_str("curl -b cookies.txt http://x/"),
            Err(ParseError::InvalidFlagArgument { .. })
        ));
    }

    #[test]
    fn test_transport_options() {
        let m = model(
            "curl -A agent/1 -e http://ref/ --compressed -m 2.5 --connect-timeout 3 --max-redirs 4 -L -x http://proxy:8080 http://x/",
        );
        assert_eq!(m.user_agent.as_deref(), Some("agent/1"));
        assert_eq!(m.referer.as_deref(), Some("http://ref/"));
        assert!(m.compressed);
        assert_eq!(m.timeout, Some(2.5));
        assert_eq!(m.connect_timeout, Some(3.0));
        assert_eq!(m.max_redirects, Some(4));
        assert!(m.follow_redirects);
        assert_eq!(m.proxy.as_deref(), Some("http://proxy:8080"));
    }

    #[test]
    fn test_zero_timeouts_mean_none() {
        let parsed = parse_str("curl -m 0 --connect-timeout 0.0 http://x/").unwrap();
        assert_eq!(parsed.model.timeout, None);
        assert_eq!(parsed.model.connect_timeout, None);
        assert_eq!(parsed.warnings.len(), 2);
        assert_eq!(parsed.warnings[0].offset, Some(5));
    }

    #[test]
    fn test_unlimited_redirects() {
        let parsed = parse_str("curl -L --max-redirs -1 http://x/").unwrap();
        assert!(parsed.model.follow_redirects);
        assert_eq!(parsed.model.max_redirects, None);
        assert_eq!(parsed.warnings.len(), 1);
    }

    #[test]
    fn test_header_replaces_shorthand_flags() {
        let parsed = parse_str(
            "curl -A a -e http://r/ -b c=1 -H 'user-agent: b' -H 'Referer: http://s/' -H 'Cookie: d=2' http://x/",
        )
        .unwrap();
        assert_eq!(parsed.model.user_agent, None);
        assert_eq!(parsed.model.referer, None);
        assert!(parsed.model.cookies.is_empty());
        assert_eq!(parsed.model.header("User-Agent"), Some("b"));
        assert_eq!(parsed.warnings.len(), 3);
        assert_eq!(parsed.warnings[0].offset, Some(8));

        let m = model("curl -A a -H 'Accept: */*' http://x/");
        assert_eq!(m.user_agent.as_deref(), Some("a"));
    }

    #[test]
    fn test_invalid_numbers() {
        for raw in [
            "curl -m soon http://x/",
            "curl -m -1 http://x/",
            "curl -m 1e20 http://x/",
            "curl --connect-timeout inf http://x/",
            "curl --max-redirs -2 http://x/",
        ] {
            assert!(
                matches!(parse_str(raw), Err(ParseError::InvalidFlagArgument { .. })),
                "{}",
                raw
            );
        }
    }
}
