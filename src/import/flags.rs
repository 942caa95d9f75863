//! Static grammar table of recognized curl flags
//!
//! Every flag the importer understands has exactly one [`FlagSpec`] entry.
//! Short and long spellings resolve to the same entry through [`lookup`].

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

/// Number of following tokens a flag consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Arity {
    Zero,
    One,
}

/// Flavour of a `-d`-family flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataKind {
    /// `-d`, `--data`, `--data-ascii`: `@file` reads a file
    Ascii,
    /// `--data-raw`: `@` has no special meaning
    Raw,
    /// `--data-binary`: never merged with the other kinds
    Binary,
    /// `--data-urlencode`
    UrlEncode,
    /// `--json`
    Json,
}

/// Flavour of a `-F`-family flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FormKind {
    /// `-F`: `@` and `<` prefixes and `;type=` suffixes are interpreted
    Field,
    /// `--form-string`: the value is taken literally
    Literal,
}

/// Request-model slot a flag writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Slot {
    Method,
    Url,
    Header,
    Data(DataKind),
    Form(FormKind),
    User,
    Cookie,
    UserAgent,
    Referer,
    Insecure,
    FollowRedirects,
    MaxRedirects,
    GetMode,
    Head,
    Compressed,
    MaxTime,
    ConnectTimeout,
    Proxy,
    /// Changes curl's console output only
    NoEffect,
}

/// One entry of the grammar table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlagSpec {
    pub canonical: &'static str,
    pub short: Option<char>,
    pub long: &'static str,
    pub arity: Arity,
    pub slot: Slot,
}

impl FlagSpec {
    const fn new(short: Option<char>, long: &'static str, arity: Arity, slot: Slot) -> Self {
        Self { canonical: long, short, long, arity, slot }
    }

    pub fn takes_argument(&self) -> bool {
        self.arity == Arity::One
    }
}

use Arity::{One, Zero};

static FLAGS: &[FlagSpec] = &[
    FlagSpec::new(Some('X'), "--request", One, Slot::Method),
    FlagSpec::new(None, "--url", One, Slot::Url),
    FlagSpec::new(Some('H'), "--header", One, Slot::Header),
    FlagSpec::new(Some('d'), "--data", One, Slot::Data(DataKind::Ascii)),
    FlagSpec::new(None, "--data-ascii", One, Slot::Data(DataKind::Ascii)),
    FlagSpec::new(None, "--data-raw", One, Slot::Data(DataKind::Raw)),
    FlagSpec::new(None, "--data-binary", One, Slot::Data(DataKind::Binary)),
    FlagSpec::new(None, "--data-urlencode", One, Slot::Data(DataKind::UrlEncode)),
    FlagSpec::new(None, "--json", One, Slot::Data(DataKind::Json)),
    FlagSpec::new(Some('F'), "--form", One, Slot::Form(FormKind::Field)),
    FlagSpec::new(None, "--form-string", One, Slot::Form(FormKind::Literal)),
    FlagSpec::new(Some('u'), "--user", One, Slot::User),
    FlagSpec::new(Some('b'), "--cookie", One, Slot::Cookie),
    FlagSpec::new(Some('A'), "--user-agent", One, Slot::UserAgent),
    FlagSpec::new(Some('e'), "--referer", One, Slot::Referer),
    FlagSpec::new(Some('k'), "--insecure", Zero, Slot::Insecure),
    FlagSpec::new(Some('L'), "--location", Zero, Slot::FollowRedirects),
    FlagSpec::new(None, "--max-redirs", One, Slot::MaxRedirects),
    FlagSpec::new(Some('G'), "--get", Zero, Slot::GetMode),
    FlagSpec::new(Some('I'), "--head", Zero, Slot::Head),
    FlagSpec::new(None, "--compressed", Zero, Slot::Compressed),
    FlagSpec::new(Some('m'), "--max-time", One, Slot::MaxTime),
    FlagSpec::new(None, "--connect-timeout", One, Slot::ConnectTimeout),
    FlagSpec::new(Some('x'), "--proxy", One, Slot::Proxy),
    FlagSpec::new(Some('s'), "--silent", Zero, Slot::NoEffect),
    FlagSpec::new(Some('S'), "--show-error", Zero, Slot::NoEffect),
    FlagSpec::new(Some('v'), "--verbose", Zero, Slot::NoEffect),
    FlagSpec::new(Some('i'), "--include", Zero, Slot::NoEffect),
    FlagSpec::new(Some('f'), "--fail", Zero, Slot::NoEffect),
];

static BY_SPELLING: Lazy<HashMap<String, &'static FlagSpec>> = Lazy::new(|| {
    let mut index = HashMap::with_capacity(FLAGS.len() * 2);
    for spec in FLAGS {
        index.insert(spec.long.to_string(), spec);
        if let Some(c) = spec.short {
            index.insert(format!("-{}", c), spec);
        }
    }
    index
});

/// Look up a flag by its exact spelling (`-H` or `--header`)
pub fn lookup(flag: &str) -> Option<&'static FlagSpec> {
    BY_SPELLING.get(flag).copied()
}

/// Look up a short flag by its letter
pub fn lookup_short(c: char) -> Option<&'static FlagSpec> {
    lookup(&format!("-{c}"))
}

/// Every recognized flag, in documentation order
pub fn all() -> &'static [FlagSpec] {
    FLAGS
}
