//! Integration tests for curl command import

use curlgenie::convert::import;
use curlgenie::errors::{CurlgenieError, ErrorKind, ParseError};
use curlgenie::http::Method;
use curlgenie::import::{flags, render, tokenize};
use curlgenie::request::{Auth, Body, PartValue, QueryParam};
use std::collections::HashSet;

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

// =============================================================================
// Tokenizer
// =============================================================================

#[test]
fn test_tokenize_render_round_trip() {
    let commands = [
        r#"curl -H "Authorization: Bearer abc" 'http://x/y?a=1&b=2'"#,
        r#"curl -d 'it'\''s' --data-raw "a \"b\" c" http://x/"#,
        "curl -X POST \\\n  -H 'A: 1' \\\n  http://x/",
        r#"curl -F 'f=@/tmp/a b.txt' -d '' http://x/"#,
    ];
    for raw in commands {
        let tokens = tokenize(raw).unwrap();
        let again = tokenize(&render(&tokens)).unwrap();
        let values: Vec<_> = tokens.iter().map(|t| (&t.kind, &t.value)).collect();
        let values_again: Vec<_> = again.iter().map(|t| (&t.kind, &t.value)).collect();
        assert_eq!(values, values_again, "{}", raw);
    }
}

#[test]
fn test_line_continuations() {
    let raw = "curl -X PUT \\\n  -H 'Content-Type: text/plain' \\\n  -d hello \\\n  https://api.test/items/1";
    let model = import(raw).unwrap().model;
    assert_eq!(model.method, Method::Put);
    assert_eq!(model.url, "https://api.test/items/1");
    assert_eq!(model.header("content-type"), Some("text/plain"));
}

#[test]
fn test_unterminated_quote_offset() {
    let err = import(r#"curl -H "A: b http://x/"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnterminatedQuote);
    assert_eq!(err.offset(), Some(8));
}

// =============================================================================
// Headers, method, auth
// =============================================================================

#[test]
fn test_repeated_headers_keep_count_and_order() {
    for n in 1..=5 {
        let headers: Vec<String> = (0..n).map(|i| format!("-H 'X-N: {}'", i)).collect();
        let raw = format!("curl {} http://x/y", headers.join(" "));
        let model = import(&raw).unwrap().model;
        assert_eq!(model.headers.len(), n);
        for (i, (name, value)) in model.headers.iter().enumerate() {
            assert_eq!(name, "X-N");
            assert_eq!(value, &i.to_string());
        }
    }
}

#[test]
fn test_form_post() {
    let model = import(r#"curl -X POST -d "a=1" -d "b=2" http://x/y"#).unwrap().model;
    assert_eq!(model.method, Method::Post);
    assert_eq!(model.body, Body::UrlEncodedForm { pairs: pairs(&[("a", "1"), ("b", "2")]) });
}

#[test]
fn test_get_mode() {
    let model = import(r#"curl -G -d "q=test" http://x/y"#).unwrap().model;
    assert_eq!(model.method, Method::Get);
    assert!(model.query.contains(&QueryParam::new("q", Some("test"))));
    assert!(model.body.is_none());
    assert_eq!(model.full_url(), "http://x/y?q=test");
}

#[test]
fn test_basic_auth() {
    let model = import("curl -u alice:secret http://x/y").unwrap().model;
    assert_eq!(
        model.auth,
        Auth::Basic { user: "alice".to_string(), password: Some("secret".to_string()) }
    );
}

#[test]
fn test_password_with_colon() {
    let model = import("curl -u 'alice:se:cret' http://x/y").unwrap().model;
    assert_eq!(
        model.auth,
        Auth::Basic { user: "alice".to_string(), password: Some("se:cret".to_string()) }
    );
}

#[test]
fn test_multipart_order() {
    let model = import(r#"curl -F "file=@/tmp/a.txt" -F "name=bob" http://x/y"#).unwrap().model;
    let Body::Multipart { parts } = model.body else {
        panic!("expected a multipart body");
    };
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].name, "file");
    assert!(parts[0].value.is_file());
    assert_eq!(parts[1].name, "name");
    assert_eq!(parts[1].value, PartValue::Text { value: "bob".to_string() });
}

#[test]
fn test_url_query_round_trips_byte_for_byte() {
    for url in [
        "http://x.test/s?flag&path=/a",
        "http://x.test/s?a=1&a=2&b=",
        "http://x.test/s?q=%E2%9C%93&r=a+b",
    ] {
        let model = import(&format!("curl '{}'", url)).unwrap().model;
        assert_eq!(model.full_url(), url);
    }
}

#[test]
fn test_shorthand_flags_yield_to_explicit_headers() {
    let parsed = import("curl -b a=1 -H 'cookie: b=2' http://x/").unwrap();
    assert!(parsed.model.cookies.is_empty());
    assert_eq!(parsed.model.header("Cookie"), Some("b=2"));
    assert_eq!(parsed.warnings.len(), 1);
    assert_eq!(parsed.warnings[0].offset, Some(8));
}

#[test]
fn test_unlimited_redirects_and_zero_timeout() {
    let parsed = import("curl -L --max-redirs -1 -m 0 http://x/").unwrap();
    assert!(parsed.model.follow_redirects);
    assert_eq!(parsed.model.max_redirects, None);
    assert_eq!(parsed.model.timeout, None);
    assert_eq!(parsed.warnings.len(), 2);
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_unrecognized_flag() {
    let err = import("curl --frobnicate http://x/y").unwrap_err();
    match err {
        CurlgenieError::Parse(ParseError::UnrecognizedFlag { flag, offset }) => {
            assert_eq!(flag, "--frobnicate");
            assert_eq!(offset, 5);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_error_kinds() {
    let cases = [
        ("curl -H", ErrorKind::MissingFlagArgument),
        ("curl -d a=1 -F b=2 http://x/", ErrorKind::ConflictingBodyFlags),
        ("curl -m never http://x/", ErrorKind::InvalidFlagArgument),
        ("curl -m 1e20 http://x/", ErrorKind::InvalidFlagArgument),
        ("curl ftp://x/", ErrorKind::InvalidUrl),
        ("curl -v", ErrorKind::MissingUrl),
        ("curl http://x/ http://y/", ErrorKind::UnexpectedArgument),
        ("", ErrorKind::EmptyCommand),
    ];
    for (raw, kind) in cases {
        assert_eq!(import(raw).unwrap_err().kind(), kind, "{}", raw);
    }
}

// =============================================================================
// Warnings
// =============================================================================

#[test]
fn test_warnings_are_returned_not_fatal() {
    let parsed = import("curl -sS -u bob http://x/ | jq .").unwrap();
    assert_eq!(parsed.model.url, "http://x/");
    // -s, -S, -u without password, the pipe
    assert_eq!(parsed.warnings.len(), 4);
    assert!(parsed.warnings.iter().all(|w| w.offset.is_some()));
}

// =============================================================================
// Flag table
// =============================================================================

#[test]
fn test_flag_table_spellings_are_unique_and_reachable() {
    let mut seen = HashSet::new();
    for spec in flags::all() {
        assert!(seen.insert(spec.long.to_string()), "duplicate {}", spec.long);
        assert_eq!(flags::lookup(spec.long), Some(spec));
        if let Some(short) = spec.short {
            assert!(seen.insert(format!("-{}", short)), "duplicate -{}", short);
            assert_eq!(flags::lookup_short(short), Some(spec));
            assert_eq!(flags::lookup(&format!("-{}", short)), Some(spec));
        }
    }
}
