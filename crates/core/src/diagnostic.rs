//! Non-fatal conversion diagnostics
//!
//! Nothing in the core aborts a conversion. Problems with individual blocks are
//! collected as [`Diagnostic`] values and returned next to the markup; the
//! caller decides whether to log them, print them, or fail on them.

use serde::Serialize;
use serde_json::Value;

/// What went wrong with a block or with the input as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiagnosticKind {
    #[error("expected a sequence of blocks, found {found}")]
    NotASequence { found: &'static str },

    #[error("expected a block object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("block is missing its `type` discriminator")]
    MissingKind,

    #[error("`{kind}` block has a malformed payload: {reason}")]
    MalformedPayload { kind: String, reason: String },

    #[error("unsupported block kind `{kind}`")]
    UnsupportedKind { kind: String },

    #[error("`{parent}` block cannot contain a `{kind}` child")]
    UnexpectedChild { parent: String, kind: String },
}

/// A diagnostic tied to the block (and nesting level) it was raised for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub block_id: Option<String>,
    pub nesting_level: usize,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn new(block_id: Option<String>, nesting_level: usize, kind: DiagnosticKind) -> Self {
        Self {
            block_id,
            nesting_level,
            kind,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.block_id {
            Some(id) => write!(f, "block {id} (level {}): {}", self.nesting_level, self.kind),
            None => write!(f, "level {}: {}", self.nesting_level, self.kind),
        }
    }
}

/// Human readable name of a JSON value's type, for diagnostics.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_with_block_id() {
        let diagnostic = Diagnostic::new(
            Some("abc".to_string()),
            2,
            DiagnosticKind::UnsupportedKind {
                kind: "synced_block".to_string(),
            },
        );
        assert_eq!(
            diagnostic.to_string(),
            "block abc (level 2): unsupported block kind `synced_block`"
        );
    }

    #[test]
    fn test_display_without_block_id() {
        let diagnostic = Diagnostic::new(None, 0, DiagnosticKind::MissingKind);
        assert_eq!(
            diagnostic.to_string(),
            "level 0: block is missing its `type` discriminator"
        );
    }

    #[test]
    fn test_serialize_flattens_kind() {
        let diagnostic = Diagnostic::new(
            None,
            0,
            DiagnosticKind::NotASequence { found: "a string" },
        );
        let value = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(
            value,
            json!({
                "block_id": null,
                "nesting_level": 0,
                "type": "not_a_sequence",
                "found": "a string"
            })
        );
    }
}
