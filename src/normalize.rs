//! Text canonicalization for extracted review fields.
//!
//! Every function here is pure and total: any input string yields a string,
//! empty or garbage input yields an empty or lightly-stripped string, and
//! nothing panics. The heavy normalizer ([`normalize_text`]) feeds the
//! analysis pipeline; the light cleaners keep names, dates and variant
//! labels human-readable while dropping emoji and stray punctuation.

use regex::Regex;
use std::sync::LazyLock;

static SYMBOLS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{So}\p{Sk}\p{Sm}\p{Sc}]").unwrap());
static URLS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());
static MENTIONS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@\w+").unwrap());
static HASHTAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#\w+").unwrap());
static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());
static DIGIT_TOKENS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d+\b").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\s]").unwrap());
static NON_ALNUM_KEEP_HYPHEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\s-]").unwrap());

/// Reduce review text to lowercase word tokens separated by single spaces.
///
/// Strips symbols/emoji, URLs, `@mentions`, `#hashtags`, punctuation and
/// standalone numbers. Idempotent: normalizing already-normalized text is a
/// no-op.
pub fn normalize_text(s: &str) -> String {
    let s = s.to_lowercase();
    let s = SYMBOLS.replace_all(&s, "");
    let s = URLS.replace_all(&s, "");
    let s = MENTIONS.replace_all(&s, "");
    let s = HASHTAGS.replace_all(&s, "");
    let s = NON_WORD.replace_all(&s, " ");
    let s = DIGIT_TOKENS.replace_all(&s, "");
    let s = WHITESPACE.replace_all(&s, " ");
    s.trim().to_string()
}

/// Clean a reviewer name: letters, digits and spaces survive, case is kept.
///
/// Marketplace names are frequently masked ("J***n"); the mask characters
/// become a single space ("J n").
pub fn clean_name(s: &str) -> String {
    let s = SYMBOLS.replace_all(s, "");
    let s = NON_ALNUM.replace_all(&s, " ");
    let s = WHITESPACE.replace_all(&s, " ");
    s.trim().to_string()
}

/// Clean a variant label ("Grey+Proteksi" → "Grey Proteksi").
///
/// Like [`clean_name`] but hyphens survive, since variant names use them
/// ("Wi-Fi", "A16-128").
pub fn clean_variant(s: &str) -> String {
    let s = SYMBOLS.replace_all(s, "");
    let s = NON_ALNUM_KEEP_HYPHEN.replace_all(&s, " ");
    let s = WHITESPACE.replace_all(&s, " ");
    s.trim().to_string()
}

/// Clean a relative-date string, keeping letters, digits, spaces and hyphens.
pub fn clean_date(s: &str) -> String {
    let s = NON_ALNUM_KEEP_HYPHEN.replace_all(s, "");
    let s = WHITESPACE.replace_all(&s, " ");
    s.trim().to_string()
}

/// Typographic characters that downstream single-byte consumers choke on,
/// with their ASCII stand-ins.
const LEGACY_REPLACEMENTS: &[(char, &str)] = &[
    ('\u{2192}', "->"),  // →
    ('\u{2190}', "<-"),  // ←
    ('\u{2191}', "^"),   // ↑
    ('\u{2193}', "v"),   // ↓
    ('\u{2713}', "v"),   // ✓
    ('\u{2714}', "v"),   // ✔
    ('\u{2717}', "x"),   // ✗
    ('\u{2718}', "x"),   // ✘
    ('\u{2705}', "[ok]"), // ✅
    ('\u{274C}', "[x]"), // ❌
    ('\u{2018}', "'"),   // ‘
    ('\u{2019}', "'"),   // ’
    ('\u{201C}', "\""),  // “
    ('\u{201D}', "\""),  // ”
    ('\u{2026}', "..."), // …
    ('\u{2013}', "-"),   // –
    ('\u{2014}', "-"),   // —
    ('\u{2022}', "*"),   // •
    ('\u{2122}', "(tm)"), // ™
    ('\u{00A0}', " "),   // nbsp
];

/// Make a string safe for legacy single-byte (Latin-1) consumers.
///
/// Known typographic characters are replaced with ASCII equivalents first.
/// If anything outside the Latin-1 range survives (emoji, CJK, ...), all
/// non-ASCII characters are dropped wholesale: persisted output must stay
/// byte-stable for consumers that are not Unicode-aware.
pub fn sanitize_for_legacy_encoding(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match LEGACY_REPLACEMENTS.iter().find(|(c, _)| *c == ch) {
            Some((_, repl)) => out.push_str(repl),
            None => out.push(ch),
        }
    }
    if out.chars().all(|c| (c as u32) <= 0xFF) {
        out
    } else {
        out.chars().filter(|c| c.is_ascii()).collect()
    }
}
