// src/clean/stages.rs
//! Stages 1–3 of the cleaner. Pure string functions, no dictionaries involved.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https?://\S+|www\.\S+|\b[\w-]+\.(?:com|co|id|net|org|io|me|ly|gl|be)\b\S*")
        .expect("valid url regex")
});
static RE_MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"@\w+").expect("valid mention regex"));
static RE_HASHTAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"#\w+").expect("valid hashtag regex"));
static RE_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid digit regex"));

/// Decode HTML character entities left over from scraping (`&amp;`, `&#39;`, ...).
pub fn decode_entities(s: &str) -> String {
    html_escape::decode_html_entities(s).into_owned()
}

/// Stage 1.
pub fn case_fold(s: &str) -> String {
    s.to_lowercase()
}

/// Stage 2: URLs, then mentions, hashtags and digit runs. Each match becomes one space.
/// URLs go first because they may contain `@`, `#` and digits themselves.
pub fn strip_noise(s: &str) -> String {
    let mut out = RE_URL.replace_all(s, " ").into_owned();
    for re in [&*RE_MENTION, &*RE_HASHTAG, &*RE_DIGITS] {
        out = re.replace_all(&out, " ").into_owned();
    }
    out
}

/// Stage 3: every non-alphanumeric, non-whitespace char becomes a space; whitespace collapses.
pub fn strip_punctuation(s: &str) -> String {
    let spaced: String = s
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Entity decoding plus stages 1–3.
pub fn prepare(raw: &str) -> String {
    strip_punctuation(&strip_noise(&case_fold(&decode_entities(raw))))
}
