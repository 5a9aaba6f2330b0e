//! Inline style wrapping for a single run of rich text

use serde::{Deserialize, Serialize};

use crate::escape::escape;

/// Suffix marking a color token as a background color (`"red_background"`).
pub const BACKGROUND_SUFFIX: &str = "_background";

/// Style flags attached to one rich text span.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
    pub color: Option<String>,
}

/// A resolved color annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color<'a> {
    Foreground(&'a str),
    Background(&'a str),
}

impl Color<'_> {
    /// Inline CSS declaration for this color, with the token escaped.
    pub fn style(&self) -> String {
        match self {
            Color::Foreground(token) => format!("color: {}", escape(token)),
            Color::Background(token) => format!("background-color: {}", escape(token)),
        }
    }
}

impl Annotations {
    /// Resolve the color token. `None`, empty and `"default"` carry no styling.
    pub fn color(&self) -> Option<Color<'_>> {
        let token = self.color.as_deref()?;
        let color = match token.strip_suffix(BACKGROUND_SUFFIX) {
            Some(base) => Color::Background(base),
            None => Color::Foreground(token),
        };

        match color {
            Color::Foreground(base) | Color::Background(base)
                if base.is_empty() || base == "default" =>
            {
                None
            }
            color => Some(color),
        }
    }
}

fn wrap(tag: &str, inner: &str) -> String {
    format!("<{tag}>{inner}</{tag}>")
}

/// Wrap already escaped content in the tags for every present annotation.
///
/// The order is fixed regardless of how the input declared the flags: bold,
/// italic, underline, strikethrough, code, then color. Each one wraps the
/// previous result, so bold ends up innermost and color outermost.
pub fn apply_annotations(content: String, annotations: &Annotations) -> String {
    let mut html = content;

    if annotations.bold {
        html = wrap("strong", &html);
    }
    if annotations.italic {
        html = wrap("em", &html);
    }
    if annotations.underline {
        html = wrap("u", &html);
    }
    if annotations.strikethrough {
        html = wrap("s", &html);
    }
    if annotations.code {
        html = wrap("code", &html);
    }
    if let Some(color) = annotations.color() {
        html = format!("<span style=\"{}\">{html}</span>", color.style());
    }

    html
}

/// Wrap content in an anchor that opens in a new browsing context.
pub fn wrap_link(content: &str, url: &str) -> String {
    format!(
        "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{content}</a>",
        escape(url)
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn with_color(color: &str) -> Annotations {
        Annotations {
            color: Some(color.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_color_foreground() {
        assert_eq!(with_color("red").color(), Some(Color::Foreground("red")));
    }

    #[test]
    fn test_color_background_suffix() {
        assert_eq!(
            with_color("blue_background").color(),
            Some(Color::Background("blue"))
        );
    }

    #[test]
    fn test_color_default_is_ignored() {
        assert_eq!(with_color("default").color(), None);
        assert_eq!(with_color("default_background").color(), None);
        assert_eq!(Annotations::default().color(), None);
    }

    #[test]
    fn test_apply_annotations_none() {
        let html = apply_annotations("text".to_string(), &Annotations::default());
        assert_eq!(html, "text");
    }

    #[test]
    fn test_apply_annotations_fixed_order() {
        let annotations = Annotations {
            bold: true,
            italic: true,
            strikethrough: true,
            underline: true,
            code: true,
            color: Some("red".to_string()),
        };

        let html = apply_annotations("x".to_string(), &annotations);
        assert_eq!(
            html,
            "<span style=\"color: red\"><code><s><u><em><strong>x</strong></em></u></s></code></span>"
        );
    }

    #[test]
    fn test_apply_annotations_background_color() {
        let html = apply_annotations("x".to_string(), &with_color("yellow_background"));
        assert_eq!(html, "<span style=\"background-color: yellow\">x</span>");
    }

    #[test]
    fn test_wrap_link_escapes_url() {
        let html = wrap_link("label", "https://example.com/?a=1&b=2");
        assert_eq!(
            html,
            "<a href=\"https://example.com/?a=1&amp;b=2\" target=\"_blank\" rel=\"noopener noreferrer\">label</a>"
        );
    }
}
