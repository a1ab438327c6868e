//! Sanitizer for free-text fields
//!
//! Every string that ends up in a stored [`Event`](crate::types::Event) goes
//! through [`sanitize`] first:
//!
//! 1. values of credential-named keys are replaced with [`REDACTED`]
//! 2. email addresses are replaced with [`REDACTED`]
//! 3. the result is capped at [`MAX_DETAIL_CHARS`] characters, with
//!    [`TRUNCATION_MARKER`] appended when anything was cut
//!
//! `sanitize(&sanitize(x)) == sanitize(x)` for every input.

mod redact;

use std::borrow::Cow;
use std::collections::BTreeMap;

pub use redact::{is_sensitive_key, redact};

/// Replacement text for redacted values
pub const REDACTED: &str = "[REDACTED]";

/// Maximum number of characters kept from a sanitized field
pub const MAX_DETAIL_CHARS: usize = 500;

/// Appended to text that was cut by [`truncate`]
pub const TRUNCATION_MARKER: &str = " (truncated)";

/// Redact credentials and emails, then cap the length
pub fn sanitize(raw: &str) -> String {
    let redacted = redact(raw);
    truncate(&redacted, MAX_DETAIL_CHARS).into_owned()
}

/// Sanitize a structured context map
///
/// Values stored under credential-named keys are dropped entirely, the rest
/// go through [`sanitize`].
pub fn sanitize_context(context: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    context
        .iter()
        .map(|(key, value)| {
            let clean = if is_sensitive_key(key) {
                REDACTED.to_string()
            } else {
                sanitize(value)
            };
            (key.clone(), clean)
        })
        .collect()
}

/// Keep at most `max_chars` characters, appending [`TRUNCATION_MARKER`] if
/// anything was removed. Counts chars, so multi-byte text is never split.
pub fn truncate(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => Cow::Owned(format!("{}{}", &text[..cut], TRUNCATION_MARKER)),
        None => Cow::Borrowed(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacts_quoted_password() {
        let out = sanitize("password='secret123'");
        assert!(out.contains(REDACTED));
        assert!(!out.contains("secret123"));
        assert_eq!(out, "password='[REDACTED]'");
    }

    #[test]
    fn test_redacts_every_quoting_style() {
        for input in [
            "password=secret123",
            "password = \"secret123\"",
            "PASSWORD: secret123",
            "{\"db_password\": \"secret123\"}",
            "pwd='secret123",
            "api-key=secret123&user=bob",
            "'password' => 'secret123'",
            "password => secret123",
            "[password] => secret123",
            "password=secret123'x",
            "password=p@ss)secret123",
        ] {
            let out = sanitize(input);
            assert!(!out.contains("secret123"), "leaked in {input:?}: {out:?}");
            assert!(out.contains(REDACTED), "no token in {input:?}: {out:?}");
        }
    }

    #[test]
    fn test_redacts_email_and_keeps_key() {
        let out = sanitize("contact: a@b.com");
        assert!(!out.contains("a@b.com"));
        assert_eq!(out, "contact: [REDACTED]");

        let out = sanitize("notify first.last+ops@mail.example.org now");
        assert_eq!(out, "notify [REDACTED] now");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(sanitize("short text"), "short text");
        assert_eq!(sanitize(""), "");
        assert_eq!(
            sanitize("Table 'orders' doesn't exist"),
            "Table 'orders' doesn't exist"
        );
    }

    #[test]
    fn test_truncation() {
        let long = "x".repeat(1000);
        let out = sanitize(&long);
        assert!(out.ends_with(TRUNCATION_MARKER));
        assert_eq!(out.chars().count(), MAX_DETAIL_CHARS + TRUNCATION_MARKER.chars().count());

        let ten = "0123456789";
        assert_eq!(sanitize(ten), ten);

        let exact = "y".repeat(MAX_DETAIL_CHARS);
        assert_eq!(sanitize(&exact), exact);
    }

    #[test]
    fn test_truncate_is_char_safe() {
        let text = "é".repeat(10);
        let out = truncate(&text, 4);
        assert_eq!(out, format!("éééé{}", TRUNCATION_MARKER));
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            String::from("password='secret123' and mail bob@example.com"),
            String::from("\"token\": \"abc\", \"secret\": 'x y z'"),
            String::from("pwd='unterminated"),
            "z".repeat(1200),
            format!("{} password=hunter22", "a".repeat(495)),
            String::from("Array ( [db_password] => hunter22 [pwd] => 'x' )"),
        ];
        for s in &samples {
            let once = sanitize(s);
            assert_eq!(sanitize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn test_idempotent_at_every_cut_near_a_secret() {
        let tail = " password='secret123' contact: a@b.com api_key=\"k\"";
        for pad in 440..=MAX_DETAIL_CHARS {
            let input = format!("{}{}", "p".repeat(pad), tail);
            let once = sanitize(&input);
            assert!(!once.contains("secret123"));
            assert!(!once.contains("a@b.com"));
            assert_eq!(sanitize(&once), once, "pad {pad}");
        }
    }

    #[test]
    fn test_idempotent_when_cut_after_separator() {
        for sep in ["=", ": ", "=\"", "='", " => ", "] => '"] {
            let head = format!("{}password{sep}", "k".repeat(MAX_DETAIL_CHARS - 8 - sep.len()));
            assert_eq!(head.chars().count(), MAX_DETAIL_CHARS);

            let once = sanitize(&format!("{head}hunter22"));
            assert!(once.starts_with(&head));
            assert!(!once.contains("hunter22"));
            assert_eq!(sanitize(&once), once, "sep {sep:?}");
        }
    }

    #[test]
    fn test_sanitize_context() {
        let mut ctx = BTreeMap::new();
        ctx.insert("db_password".to_string(), "plain".to_string());
        ctx.insert("owner".to_string(), "jane@corp.io".to_string());
        ctx.insert("table".to_string(), "orders".to_string());

        let clean = sanitize_context(&ctx);
        assert_eq!(clean["db_password"], REDACTED);
        assert_eq!(clean["owner"], REDACTED);
        assert_eq!(clean["table"], "orders");
    }
}
