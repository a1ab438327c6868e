//! Credential and email redaction patterns

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{REDACTED, TRUNCATION_MARKER};

/// Key names whose values are always secret
const CREDENTIAL_KEYS: &str = r"password|passwd|pwd|secret|token|api[_-]?key|credential";

/// `key <sep> value` where the key mentions a credential.
///
/// Separators are `=`, `:` or `=>`, optionally after a closing quote or
/// bracket (`"key": v`, `[key] => v`). The value is a single- or
/// double-quoted string, or a bare run up to whitespace, `;` or `&`.
static CREDENTIAL_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"(?i)(?P<key>\[?[a-z0-9_.-]*(?:{CREDENTIAL_KEYS})[a-z0-9_.-]*)(?P<sep>["'\]]?\s*(?:=>|[:=])\s*)(?P<value>'[^']*'|"[^"]*"|["']?[^\s;&'"][^\s;&]*)"#
    ))
    .expect("invalid credential pattern")
});

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}")
        .expect("invalid email pattern")
});

static SENSITIVE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i){CREDENTIAL_KEYS}")).expect("invalid sensitive key pattern")
});

/// Check if a field name holds a credential
pub fn is_sensitive_key(name: &str) -> bool {
    SENSITIVE_KEY.is_match(name)
}

/// A value left behind by an earlier pass: a piece of [`REDACTED`] or the
/// truncation marker directly after a separator
fn is_redaction_fragment(value: &str) -> bool {
    let bare = value.trim_matches(|c| c == '\'' || c == '"');
    let marker = TRUNCATION_MARKER.trim();
    (!bare.is_empty() && REDACTED.starts_with(bare))
        || bare == marker
        || bare == marker.trim_end_matches(')')
}

/// Replace credential values and email addresses with [`REDACTED`]
///
/// Quotes around a redacted value are kept so the surrounding text still
/// reads the same way.
pub fn redact(input: &str) -> Cow<'_, str> {
    let mut result = Cow::Borrowed(input);

    if CREDENTIAL_PAIR.is_match(&result) {
        let replaced = CREDENTIAL_PAIR.replace_all(&result, |caps: &Captures| {
            let value = &caps["value"];
            if is_redaction_fragment(value) {
                return caps[0].to_string();
            }
            let quote = value.chars().next().filter(|c| *c == '\'' || *c == '"');
            let masked = match quote {
                Some(q) if value.len() > 1 && value.ends_with(q) => format!("{q}{REDACTED}{q}"),
                Some(q) => format!("{q}{REDACTED}"),
                None => REDACTED.to_string(),
            };
            format!("{}{}{}", &caps["key"], &caps["sep"], masked)
        });
        result = Cow::Owned(replaced.into_owned());
    }

    if EMAIL.is_match(&result) {
        result = Cow::Owned(EMAIL.replace_all(&result, REDACTED).into_owned());
    }

    result
}
