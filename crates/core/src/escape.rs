//! Escaping of markup-significant characters
//!
//! Every piece of caller-provided text that ends up in element content or in a
//! quoted attribute goes through [`escape`] exactly once.

use std::borrow::Cow;

/// Escape the five markup-significant characters `& < > " '`.
///
/// The result is safe both as element content and inside a quoted attribute
/// value, so the same function is used for text and for `href`/`src`/`alt`.
pub fn escape(text: &str) -> Cow<'_, str> {
    html_escape::encode_quoted_attribute(text)
}

/// Translate literal newlines into `<br>` elements.
///
/// Must run on already escaped text, otherwise the inserted tags would be escaped too.
pub fn newlines_to_breaks(text: &str) -> Cow<'_, str> {
    if text.contains('\n') {
        Cow::Owned(text.replace('\n', "<br>"))
    } else {
        Cow::Borrowed(text)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_markup_characters() {
        let escaped = escape(r#"<b>Tom & "Jerry"</b>"#);
        assert_eq!(escaped, "&lt;b&gt;Tom &amp; &quot;Jerry&quot;&lt;/b&gt;");
    }

    #[test]
    fn test_escape_single_quote() {
        let escaped = escape("it's");
        assert!(!escaped.contains('\''));
        assert!(escaped.starts_with("it&"));
    }

    #[test]
    fn test_escape_plain_text_is_borrowed() {
        assert!(matches!(escape("plain text"), Cow::Borrowed("plain text")));
    }

    #[test]
    fn test_newlines_to_breaks() {
        assert_eq!(newlines_to_breaks("one\ntwo\n"), "one<br>two<br>");
        assert_eq!(newlines_to_breaks("single line"), "single line");
    }
}
