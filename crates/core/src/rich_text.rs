//! Rich text spans and their inline rendering
//!
//! A span is one formatted run of inline content. Spans are rendered in
//! sequence order and concatenated; the order is significant.

use serde::Deserialize;
use serde_json::Value;

use crate::escape::{escape, newlines_to_breaks};
use crate::inline::{apply_annotations, wrap_link, Annotations};

// ============================================================================
// Domain Models
// ============================================================================

/// One formatted run of inline content.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawRichText")]
pub struct RichText {
    pub content: SpanContent,
    pub annotations: Annotations,
    /// Fallback used when the span kind has no dedicated rendering.
    pub plain_text: String,
    pub href: Option<String>,
}

/// Kind specific data of a span.
#[derive(Debug, Clone, PartialEq)]
pub enum SpanContent {
    Text { content: String, link: Option<String> },
    Mention(Mention),
    Equation { expression: String },
    /// A span kind this renderer does not know. Rendered from `plain_text`.
    Unknown { kind: String },
}

/// Mention payload. Only dates get a dedicated rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum Mention {
    Date { start: String, end: Option<String> },
    Other { subtype: String },
}

impl RichText {
    /// Plain, unannotated text span.
    pub fn text(content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            plain_text: content.clone(),
            content: SpanContent::Text {
                content,
                link: None,
            },
            annotations: Annotations::default(),
            href: None,
        }
    }

    /// Date mention displaying `plain_text`.
    pub fn date(start: impl Into<String>, plain_text: impl Into<String>) -> Self {
        Self {
            content: SpanContent::Mention(Mention::Date {
                start: start.into(),
                end: None,
            }),
            annotations: Annotations::default(),
            plain_text: plain_text.into(),
            href: None,
        }
    }

    /// Inline equation; the expression doubles as fallback text.
    pub fn equation(expression: impl Into<String>) -> Self {
        let expression = expression.into();
        Self {
            plain_text: expression.clone(),
            content: SpanContent::Equation { expression },
            annotations: Annotations::default(),
            href: None,
        }
    }

    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn with_link(mut self, url: impl Into<String>) -> Self {
        if let SpanContent::Text { link, .. } = &mut self.content {
            *link = Some(url.into());
        }
        self
    }
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Deserialize)]
struct RawRichText {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    text: Option<RawText>,
    #[serde(default)]
    mention: Option<Value>,
    #[serde(default)]
    equation: Option<RawEquation>,
    #[serde(default)]
    annotations: Option<Annotations>,
    #[serde(default)]
    plain_text: Option<String>,
    #[serde(default)]
    href: Option<String>,
}

#[derive(Deserialize)]
struct RawText {
    #[serde(default)]
    content: String,
    #[serde(default)]
    link: Option<RawLink>,
}

#[derive(Deserialize)]
struct RawLink {
    url: String,
}

#[derive(Deserialize)]
struct RawEquation {
    expression: String,
}

fn decode_mention(mention: &Value) -> Mention {
    let subtype = mention
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default();

    if subtype == "date" {
        let date = mention.get("date");
        let start = date.and_then(|d| d.get("start")).and_then(Value::as_str);
        if let Some(start) = start {
            return Mention::Date {
                start: start.to_string(),
                end: date
                    .and_then(|d| d.get("end"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
            };
        }
    }

    Mention::Other {
        subtype: subtype.to_string(),
    }
}

impl From<RawRichText> for RichText {
    fn from(raw: RawRichText) -> Self {
        let plain_text = raw
            .plain_text
            .or_else(|| raw.text.as_ref().map(|t| t.content.clone()))
            .unwrap_or_default();

        let kind = raw.kind.unwrap_or_else(|| "text".to_string());
        let content = match (kind.as_str(), raw.text, raw.mention, raw.equation) {
            ("text", Some(text), _, _) => SpanContent::Text {
                content: text.content,
                link: text.link.map(|l| l.url),
            },
            // Known kinds with a missing payload still render escaped.
            ("text", None, _, _) => SpanContent::Text {
                content: plain_text.clone(),
                link: None,
            },
            ("mention", _, Some(mention), _) => SpanContent::Mention(decode_mention(&mention)),
            ("mention", _, None, _) => SpanContent::Mention(Mention::Other {
                subtype: String::new(),
            }),
            ("equation", _, _, Some(equation)) => SpanContent::Equation {
                expression: equation.expression,
            },
            _ => SpanContent::Unknown { kind: kind.clone() },
        };

        Self {
            content,
            annotations: raw.annotations.unwrap_or_default(),
            plain_text,
            href: raw.href,
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Concatenated plain text of a span sequence.
pub fn plain_text(spans: &[RichText]) -> String {
    spans.iter().map(|span| span.plain_text.as_str()).collect()
}

/// Render a span sequence into one inline markup string, preserving order.
pub fn render_inline(spans: &[RichText]) -> String {
    spans.iter().map(render_span).collect()
}

fn render_span(span: &RichText) -> String {
    match &span.content {
        SpanContent::Text { content, link } => {
            let escaped = escape(content);
            let html = apply_annotations(
                newlines_to_breaks(&escaped).into_owned(),
                &span.annotations,
            );
            match link.as_deref().or(span.href.as_deref()) {
                Some(url) => wrap_link(&html, url),
                None => html,
            }
        }
        // Newlines stay literal for mentions and equations.
        SpanContent::Mention(Mention::Date { start, .. }) => format!(
            "<time datetime=\"{}\">{}</time>",
            escape(start),
            escape(&span.plain_text)
        ),
        SpanContent::Mention(Mention::Other { .. }) => {
            format!("<span class=\"mention\">{}</span>", escape(&span.plain_text))
        }
        SpanContent::Equation { expression } => format!(
            "<span class=\"equation\" data-expression=\"{}\">{}</span>",
            escape(expression),
            escape(&span.plain_text)
        ),
        // Unescaped on purpose: unknown kinds pass their fallback through untouched.
        SpanContent::Unknown { .. } => span.plain_text.clone(),
    }
}

// ============================================================================
// Tests
// ============================================================================
