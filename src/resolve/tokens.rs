//! Placeholder tokens in image URL templates.
//!
//! Generic tokens stand for the value of the element's bound column and are
//! matched case-insensitively, in this order:
//!
//! | Token | Example |
//! |-------|---------|
//! | `{{value}}` | `https://cdn.test/{{value}}.jpg` |
//! | `{value}` | `https://cdn.test/{value}.jpg` |
//! | `%VALUE%` | `https://cdn.test/%VALUE%` |
//! | `%REFERENCE%` | `https://shop.test/p/%REFERENCE%` |
//! | `%REF%` | `https://shop.test/p/%REF%` |
//! | `%s` | `https://shop.test/search?q=%s` |
//!
//! After the generic tokens, `%COLUMN NAME%` (or `%COLUMN_NAME%`) inserts the
//! value of any other column of the row.

use std::sync::LazyLock;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::{NoExpand, Regex, RegexBuilder};

use crate::template::Row;

/// Characters left alone by `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// `%s` must not eat the start of a named token such as `%SIZE%`.
const GENERIC_TOKENS: [&str; 6] = [
    r"\{\{value\}\}",
    r"\{value\}",
    r"%VALUE%",
    r"%REFERENCE%",
    r"%REF%",
    r"%s\b",
];

static GENERIC_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    GENERIC_TOKENS
        .iter()
        .filter_map(|pattern| case_insensitive(pattern))
        .collect()
});

fn case_insensitive(pattern: &str) -> Option<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .ok()
}

/// Percent-encode a value for use inside a URL path or query component.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

fn prepare(value: &str, encode: bool) -> String {
    let value = value.trim();
    if encode {
        encode_component(value)
    } else {
        value.to_string()
    }
}

/// Expand all tokens of `template`.
///
/// `value` is the bound column's value; `row` supplies named-column tokens.
pub fn expand_url_template(template: &str, value: &str, row: &Row, encode: bool) -> String {
    let primary = prepare(value, encode);
    let mut url = template.to_string();

    for pattern in GENERIC_PATTERNS.iter() {
        if pattern.is_match(&url) {
            url = pattern.replace_all(&url, NoExpand(&primary)).into_owned();
        }
    }

    if !url.contains('%') {
        return url;
    }

    for (name, _) in row.fields() {
        let Some(raw) = row.text(name) else {
            continue;
        };
        let underscored = name.replace(' ', "_");
        let mut forms = vec![name.to_string()];
        if underscored != name {
            forms.push(underscored);
        }
        for form in forms {
            let token = format!("%{}%", regex::escape(&form));
            let Some(pattern) = case_insensitive(&token) else {
                continue;
            };
            if pattern.is_match(&url) {
                let replacement = prepare(&raw, encode);
                url = pattern.replace_all(&url, NoExpand(&replacement)).into_owned();
            }
        }
    }

    url
}
