//! Shell-aware tokenizer for curl commands
//!
//! Implements the subset of POSIX shell word splitting that copied curl
//! commands rely on: single quotes, double quotes, backslash escapes,
//! backslash-newline continuations and bash `$'...'` ANSI-C strings.
//! Unquoted control operators (`|`, `&&`, `;`, `>`, ...) are kept as
//! [`TokenKind::Operator`] tokens so the parser can stop at them.

use crate::errors::TokenizeError;
use crate::strings::shell_quote;
use serde::Serialize;

/// Kind of a shell unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    Word,
    Operator,
}

/// A single shell unit with quoting already resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    /// Character offset of the token's first character in the raw input
    pub offset: usize,
}

impl Token {
    pub fn word(value: impl Into<String>, offset: usize) -> Self {
        Self { kind: TokenKind::Word, value: value.into(), offset }
    }

    pub fn is_operator(&self) -> bool {
        self.kind == TokenKind::Operator
    }
}

/// Split a raw command string into tokens
pub fn tokenize(raw: &str) -> Result<Vec<Token>, TokenizeError> {
    let chars: Vec<char> = raw.chars().collect();
    let mut tokens = Vec::new();
    let mut current = String::new();
    // Some(offset) while a word is open, even if it is still empty (`''`)
    let mut start: Option<usize> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\n' | '\r' => {
                flush(&mut tokens, &mut current, &mut start);
                i += 1;
            }
            '\\' => match chars.get(i + 1) {
                None => return Err(TokenizeError::DanglingEscape { offset: i }),
                Some('\n') => i += 2,
                Some('\r') if chars.get(i + 2) == Some(&'\n') => i += 3,
                Some(&next) => {
                    start.get_or_insert(i);
                    current.push(next);
                    i += 2;
                }
            },
            '\'' => {
                start.get_or_insert(i);
                i = single_quoted(&chars, i, &mut current)?;
            }
            '"' => {
                start.get_or_insert(i);
                i = double_quoted(&chars, i, &mut current)?;
            }
            '$' if chars.get(i + 1) == Some(&'\'') => {
                start.get_or_insert(i);
                i = ansi_c_quoted(&chars, i, &mut current)?;
            }
            '|' | '&' | ';' | '>' | '<' => {
                flush(&mut tokens, &mut current, &mut start);
                let doubled = matches!(c, '|' | '&' | '>') && chars.get(i + 1) == Some(&c);
                let len = if doubled { 2 } else { 1 };
                tokens.push(Token {
                    kind: TokenKind::Operator,
                    value: chars[i..i + len].iter().collect(),
                    offset: i,
                });
                i += len;
            }
            _ => {
                start.get_or_insert(i);
                current.push(c);
                i += 1;
            }
        }
    }

    flush(&mut tokens, &mut current, &mut start);
    Ok(tokens)
}

/// Quote each word so that [`tokenize`] reads it back unchanged
pub fn render(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| match t.kind {
            TokenKind::Word => shell_quote(&t.value),
            TokenKind::Operator => t.value.clone(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn flush(tokens: &mut Vec<Token>, current: &mut String, start: &mut Option<usize>) {
    if let Some(offset) = start.take() {
        tokens.push(Token::word(std::mem::take(current), offset));
    }
}

/// Consume `'...'` starting at `open`; returns the index after the closing quote
fn single_quoted(chars: &[char], open: usize, out: &mut String) -> Result<usize, TokenizeError> {
    let mut j = open + 1;
    loop {
        match chars.get(j) {
            None => return Err(TokenizeError::UnterminatedQuote { quote: '\'', offset: open }),
            Some('\'') => return Ok(j + 1),
            Some(&c) => {
                out.push(c);
                j += 1;
            }
        }
    }
}

fn double_quoted(chars: &[char], open: usize, out: &mut String) -> Result<usize, TokenizeError> {
    let mut j = open + 1;
    loop {
        match chars.get(j) {
            None => return Err(TokenizeError::UnterminatedQuote { quote: '"', offset: open }),
            Some('"') => return Ok(j + 1),
            Some('\\') => match chars.get(j + 1) {
                Some(&next @ ('"' | '\\' | '$' | '`')) => {
                    out.push(next);
                    j += 2;
                }
                Some('\n') => j += 2,
                Some('\r') if chars.get(j + 2) == Some(&'\n') => j += 3,
                None => return Err(TokenizeError::UnterminatedQuote { quote: '"', offset: open }),
                Some(_) => {
                    out.push('\\');
                    j += 1;
                }
            },
            Some(&c) => {
                out.push(c);
                j += 1;
            }
        }
    }
}

/// Consume `$'...'` starting at the `$`
///
/// Escapes are decoded to bytes first because `\xHH` and octal escapes may
/// form multi-byte UTF-8 sequences together.
fn ansi_c_quoted(chars: &[char], dollar: usize, out: &mut String) -> Result<usize, TokenizeError> {
    let unterminated = TokenizeError::UnterminatedQuote { quote: '\'', offset: dollar };
    let mut bytes: Vec<u8> = Vec::new();
    let mut j = dollar + 2;

    loop {
        let c = *chars.get(j).ok_or_else(|| unterminated.clone())?;
        match c {
            '\'' => {
                let text = String::from_utf8(bytes).map_err(|_| TokenizeError::InvalidEscape {
                    offset: dollar,
                    reason: "escapes do not form valid UTF-8".to_string(),
                })?;
                out.push_str(&text);
                return Ok(j + 1);
            }
            '\\' => {
                let escape_at = j;
                let e = *chars.get(j + 1).ok_or_else(|| unterminated.clone())?;
                j += 2;
                let simple = match e {
                    'n' => Some(b'\n'),
                    't' => Some(b'\t'),
                    'r' => Some(b'\r'),
                    'a' => Some(0x07),
                    'b' => Some(0x08),
                    'e' | 'E' => Some(0x1b),
                    'f' => Some(0x0c),
                    'v' => Some(0x0b),
                    '\\' => Some(b'\\'),
                    '\'' => Some(b'\''),
                    '"' => Some(b'"'),
                    '?' => Some(b'?'),
                    _ => None,
                };
                if let Some(b) = simple {
                    bytes.push(b);
                    continue;
                }
                match e {
                    'x' => {
                        let (value, used) = read_digits(chars, j, 16, 2);
                        if used == 0 {
                            bytes.extend_from_slice(b"\\x");
                        } else {
                            bytes.push(value as u8);
                            j += used;
                        }
                    }
                    '0'..='7' => {
                        let (value, used) = read_digits(chars, j - 1, 8, 3);
                        bytes.push((value & 0xff) as u8);
                        j += used - 1;
                    }
                    'u' | 'U' => {
                        let max = if e == 'u' { 4 } else { 8 };
                        let (value, used) = read_digits(chars, j, 16, max);
                        if used == 0 {
                            bytes.push(b'\\');
                            push_char(&mut bytes, e);
                        } else {
                            let ch = char::from_u32(value).ok_or_else(|| TokenizeError::InvalidEscape {
                                offset: escape_at,
                                reason: format!("U+{:X} is not a valid character", value),
                            })?;
                            push_char(&mut bytes, ch);
                            j += used;
                        }
                    }
                    other => {
                        bytes.push(b'\\');
                        push_char(&mut bytes, other);
                    }
                }
            }
            c => {
                push_char(&mut bytes, c);
                j += 1;
            }
        }
    }
}

fn read_digits(chars: &[char], from: usize, radix: u32, max: usize) -> (u32, usize) {
    let mut value = 0u32;
    let mut used = 0;
    while used < max {
        match chars.get(from + used).and_then(|c| c.to_digit(radix)) {
            Some(d) => {
                value = value * radix + d;
                used += 1;
            }
            None => break,
        }
    }
    (value, used)
}

fn push_char(bytes: &mut Vec<u8>, c: char) {
    let mut buf = [0u8; 4];
    bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(raw: &str) -> Vec<String> {
        tokenize(raw).unwrap().into_iter().map(|t| t.value).collect()
    }

    #[test]
    fn test_tokenize_quotes() {
        assert_eq!(
            values(r#"curl -H 'Content-Type: application/json' "https://example.com""#),
            vec!["curl", "-H", "Content-Type: application/json", "https://example.com"]
        );
    }

    #[test]
    fn test_single_quotes_are_literal() {
        assert_eq!(values(r"'a\nb $HOME'"), vec![r"a\nb $HOME"]);
    }

    #[test]
    fn test_double_quote_escapes() {
        assert_eq!(values(r#""say \"hi\" \$x \q""#), vec![r#"say "hi" $x \q"#]);
    }

    #[test]
    fn test_adjacent_segments_join() {
        assert_eq!(values(r#"'a'"b"c"#), vec!["abc"]);
        assert_eq!(values("'' x"), vec!["", "x"]);
    }

    #[test]
    fn test_line_continuation() {
        let raw = "curl -X POST \\\n  -H 'A: b' \\\r\n  http://x/y";
        assert_eq!(values(raw), vec!["curl", "-X", "POST", "-H", "A: b", "http://x/y"]);
    }

    #[test]
    fn test_unquoted_backslash_escapes_next_char() {
        assert_eq!(values(r"a\ b"), vec!["a b"]);
    }

    #[test]
    fn test_ansi_c_quoting() {
        assert_eq!(values(r"$'line\nnext\t\x41\101é'"), vec!["line\nnext\tAAé"]);
        assert_eq!(values(r"$'\xc3\xa9'"), vec!["é"]);
        assert_eq!(values(r"$'it\'s'"), vec!["it's"]);
    }

    #[test]
    fn test_ansi_c_invalid_utf8() {
        let err = tokenize(r"x $'\xff'").unwrap_err();
        assert!(matches!(err, TokenizeError::InvalidEscape { offset: 2, .. }));
    }

    #[test]
    fn test_operators() {
        let tokens = tokenize("curl http://x | jq . && echo done").unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(kinds[2], TokenKind::Operator);
        assert_eq!(tokens[2].value, "|");
        assert_eq!(tokens[5].value, "&&");
    }

    #[test]
    fn test_offsets_are_char_based() {
        let tokens = tokenize("é 'x' y").unwrap();
        assert_eq!(tokens[0].offset, 0);
        assert_eq!(tokens[1].offset, 2);
        assert_eq!(tokens[2].offset, 6);
    }

    #[test]
    fn test_unterminated_quote() {
        assert_eq!(
            tokenize("curl 'oops").unwrap_err(),
            TokenizeError::UnterminatedQuote { quote: '\'', offset: 5 }
        );
        assert_eq!(
            tokenize("curl \"oops").unwrap_err(),
            TokenizeError::UnterminatedQuote { quote: '"', offset: 5 }
        );
    }

    #[test]
    fn test_dangling_escape() {
        assert_eq!(
            tokenize("curl http://x \\").unwrap_err(),
            TokenizeError::DanglingEscape { offset: 14 }
        );
    }

    #[test]
    fn test_render_round_trip() {
        let raw = r#"curl -H "X-Quote: it's" -d $'a\tb' --data '' 'http://x/?a=1&b=2' | jq"#;
        let first = tokenize(raw).unwrap();
        let second = tokenize(&render(&first)).unwrap();
        let strip = |ts: &[Token]| ts.iter().map(|t| (t.kind, t.value.clone())).collect::<Vec<_>>();
        assert_eq!(strip(&first), strip(&second));
    }
}
