//! Top-level entry points for converting a whole block sequence
//!
//! These are the functions callers use: they accept either typed blocks or
//! JSON-shaped input and always return a [`Rendered`] value, never an error,
//! except when the input text is not JSON at all.

use serde::Serialize;
use serde_json::Value;

use crate::block::{child_values, decode_blocks, Block};
use crate::diagnostic::{json_type_name, Diagnostic, DiagnosticKind};
use crate::error::Error;
use crate::escape::escape;
use crate::render::render_blocks;

/// Output of one conversion: the markup fragment and everything that was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rendered {
    pub html: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Render an already typed block sequence.
pub fn render(blocks: &[Block]) -> Rendered {
    let mut diagnostics = Vec::new();
    let html = render_blocks(blocks, 0, &mut diagnostics);

    Rendered { html, diagnostics }
}

/// The sibling sequence of a JSON input: either a bare array or a list
/// response object carrying the blocks under `results`.
fn block_sequence(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(values) => Some(values),
        Value::Object(object) => object.get("results").and_then(Value::as_array),
        _ => None,
    }
}

/// Decode and render JSON-shaped input.
///
/// Anything that is not a block sequence renders to an empty string with a
/// single [`DiagnosticKind::NotASequence`] diagnostic.
pub fn render_value(value: &Value) -> Rendered {
    let mut diagnostics = Vec::new();

    let Some(values) = block_sequence(value) else {
        diagnostics.push(Diagnostic::new(
            None,
            0,
            DiagnosticKind::NotASequence {
                found: json_type_name(value),
            },
        ));
        return Rendered {
            html: String::new(),
            diagnostics,
        };
    };

    let blocks = decode_blocks(values, 0, &mut diagnostics);
    let html = render_blocks(&blocks, 0, &mut diagnostics);

    Rendered { html, diagnostics }
}

/// Parse JSON text and render it.
pub fn render_json_str(input: &str) -> Result<Rendered, Error> {
    let value: Value = serde_json::from_str(input)?;
    Ok(render_value(&value))
}

/// Number of block levels in JSON-shaped input; `0` for an empty or
/// non-sequence input.
///
/// The renderer imposes no limit itself; callers use this to reject
/// pathologically deep trees before rendering.
pub fn tree_depth(value: &Value) -> usize {
    block_sequence(value)
        .map(|values| sequence_depth(values))
        .unwrap_or(0)
}

fn sequence_depth(values: &[Value]) -> usize {
    values
        .iter()
        .map(|value| {
            let children = value.as_object().and_then(|object| {
                let kind = object.get("type")?.as_str()?;
                child_values(object, kind)
            });
            1 + children.map(|c| sequence_depth(c)).unwrap_or(0)
        })
        .max()
        .unwrap_or(0)
}

/// Embed a fragment into a minimal standalone HTML5 document.
pub fn wrap_document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        escape(title)
    )
}

// ============================================================================
// Tests
// ============================================================================
