//! Typed block tree and its decoding from JSON-shaped input
//!
//! Input blocks look like `{"id": .., "type": "paragraph", "has_children": false,
//! "paragraph": {..}}`: the payload lives under a key named after the block's
//! own kind. Decoding turns that into [`BlockContent`], one variant per kind,
//! and normalizes the two places children can be attached (inside the payload
//! or directly on the block) into [`Block::children`].

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::diagnostic::{json_type_name, Diagnostic, DiagnosticKind};
use crate::rich_text::RichText;

// ============================================================================
// Domain Models
// ============================================================================

/// One node of the document tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: Option<String>,
    pub has_children: bool,
    pub content: BlockContent,
    pub children: Vec<Block>,
}

/// Kind specific payload of a block.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockContent {
    Paragraph(TextBlock),
    Heading1(TextBlock),
    Heading2(TextBlock),
    Heading3(TextBlock),
    BulletedListItem(TextBlock),
    NumberedListItem(TextBlock),
    Image(ImageBlock),
    Divider,
    Quote(TextBlock),
    Code(CodeBlock),
    Callout(CalloutBlock),
    Toggle(TextBlock),
    ChildPage(ChildPageBlock),
    Bookmark(BookmarkBlock),
    ToDo(ToDoBlock),
    Equation(EquationBlock),
    Table(TableBlock),
    TableRow(TableRowBlock),
    /// A kind this renderer does not know, kept by name.
    Unsupported(String),
    /// A block that failed to decode. It keeps its slot among its siblings so
    /// it still closes an open list run, but renders to nothing.
    Skipped,
}

/// The two list flavours a run of list items can be grouped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Bulleted,
    Numbered,
}

impl ListKind {
    /// Container tag for a run of this kind.
    pub fn tag(self) -> &'static str {
        match self {
            ListKind::Bulleted => "ul",
            ListKind::Numbered => "ol",
        }
    }
}

/// Payload shared by every block that is just rich text.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TextBlock {
    #[serde(default, alias = "text")]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawFileObject")]
pub struct ImageBlock {
    pub source: FileSource,
    pub caption: Vec<RichText>,
}

/// Where a file-backed block points to.
#[derive(Debug, Clone, PartialEq)]
pub enum FileSource {
    External {
        url: String,
    },
    Uploaded {
        url: String,
        expiry_time: Option<String>,
    },
}

impl FileSource {
    pub fn url(&self) -> &str {
        match self {
            FileSource::External { url } | FileSource::Uploaded { url, .. } => url,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CodeBlock {
    #[serde(default, alias = "text")]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub caption: Vec<RichText>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CalloutBlock {
    #[serde(default, alias = "text")]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub icon: Option<Icon>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Icon {
    Emoji { emoji: String },
    External { external: IconUrl },
    File { file: IconUrl },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IconUrl {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChildPageBlock {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookmarkBlock {
    pub url: String,
    #[serde(default)]
    pub caption: Vec<RichText>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ToDoBlock {
    #[serde(default, alias = "text")]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EquationBlock {
    pub expression: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TableBlock {
    #[serde(default)]
    pub table_width: usize,
    #[serde(default)]
    pub has_column_header: bool,
    #[serde(default)]
    pub has_row_header: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TableRowBlock {
    #[serde(default)]
    pub cells: Vec<Vec<RichText>>,
}

#[derive(Deserialize)]
struct EmptyPayload {}

#[derive(Deserialize)]
struct RawFileObject {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    external: Option<IconUrl>,
    #[serde(default)]
    file: Option<HostedFile>,
    #[serde(default)]
    caption: Vec<RichText>,
}

#[derive(Deserialize)]
struct HostedFile {
    url: String,
    #[serde(default)]
    expiry_time: Option<String>,
}

impl TryFrom<RawFileObject> for ImageBlock {
    type Error = String;

    fn try_from(raw: RawFileObject) -> Result<Self, Self::Error> {
        let source = match (raw.kind.as_deref(), raw.external, raw.file) {
            (Some("external"), Some(external), _) | (None, Some(external), None) => {
                FileSource::External { url: external.url }
            }
            (Some("file"), _, Some(file)) | (None, None, Some(file)) => FileSource::Uploaded {
                url: file.url,
                expiry_time: file.expiry_time,
            },
            (kind, _, _) => {
                return Err(format!(
                    "file source `{}` has no matching url",
                    kind.unwrap_or("<missing>")
                ))
            }
        };

        Ok(Self {
            source,
            caption: raw.caption,
        })
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl Block {
    /// A childless block with no id.
    pub fn new(content: BlockContent) -> Self {
        Self {
            id: None,
            has_children: false,
            content,
            children: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Attach children and mark the block as having them.
    pub fn with_children(mut self, children: Vec<Block>) -> Self {
        self.has_children = true;
        self.children = children;
        self
    }
}

impl TextBlock {
    pub fn new(rich_text: Vec<RichText>) -> Self {
        Self {
            rich_text,
            color: None,
        }
    }
}

impl BlockContent {
    /// The wire name of this block's kind.
    pub fn kind(&self) -> &str {
        match self {
            BlockContent::Paragraph(_) => "paragraph",
            BlockContent::Heading1(_) => "heading_1",
            BlockContent::Heading2(_) => "heading_2",
            BlockContent::Heading3(_) => "heading_3",
            BlockContent::BulletedListItem(_) => "bulleted_list_item",
            BlockContent::NumberedListItem(_) => "numbered_list_item",
            BlockContent::Image(_) => "image",
            BlockContent::Divider => "divider",
            BlockContent::Quote(_) => "quote",
            BlockContent::Code(_) => "code",
            BlockContent::Callout(_) => "callout",
            BlockContent::Toggle(_) => "toggle",
            BlockContent::ChildPage(_) => "child_page",
            BlockContent::Bookmark(_) => "bookmark",
            BlockContent::ToDo(_) => "to_do",
            BlockContent::Equation(_) => "equation",
            BlockContent::Table(_) => "table",
            BlockContent::TableRow(_) => "table_row",
            BlockContent::Unsupported(kind) => kind,
            BlockContent::Skipped => "skipped",
        }
    }

    /// The list run this block belongs to, if it is a list item.
    pub fn list_kind(&self) -> Option<ListKind> {
        match self {
            BlockContent::BulletedListItem(_) => Some(ListKind::Bulleted),
            BlockContent::NumberedListItem(_) => Some(ListKind::Numbered),
            _ => None,
        }
    }

    /// Whether the renderer shows this kind's children.
    pub fn renders_children(&self) -> bool {
        matches!(
            self,
            BlockContent::Paragraph(_)
                | BlockContent::BulletedListItem(_)
                | BlockContent::NumberedListItem(_)
                | BlockContent::Quote(_)
                | BlockContent::Callout(_)
                | BlockContent::Toggle(_)
                | BlockContent::ToDo(_)
                | BlockContent::Table(_)
        )
    }

    /// Decode the payload stored under the block's kind key.
    ///
    /// Unknown kinds always succeed as [`BlockContent::Unsupported`]; known kinds
    /// fail when the payload is absent or does not match the kind's shape.
    pub fn decode(kind: &str, payload: Option<&Value>) -> Result<Self, String> {
        let content = match kind {
            "paragraph" => BlockContent::Paragraph(decode_payload(kind, payload)?),
            "heading_1" => BlockContent::Heading1(decode_payload(kind, payload)?),
            "heading_2" => BlockContent::Heading2(decode_payload(kind, payload)?),
            "heading_3" => BlockContent::Heading3(decode_payload(kind, payload)?),
            "bulleted_list_item" => BlockContent::BulletedListItem(decode_payload(kind, payload)?),
            "numbered_list_item" => BlockContent::NumberedListItem(decode_payload(kind, payload)?),
            "image" => BlockContent::Image(decode_payload(kind, payload)?),
            "divider" => {
                decode_payload::<EmptyPayload>(kind, payload)?;
                BlockContent::Divider
            }
            "quote" => BlockContent::Quote(decode_payload(kind, payload)?),
            "code" => BlockContent::Code(decode_payload(kind, payload)?),
            "callout" => BlockContent::Callout(decode_payload(kind, payload)?),
            "toggle" => BlockContent::Toggle(decode_payload(kind, payload)?),
            "child_page" => BlockContent::ChildPage(decode_payload(kind, payload)?),
            "bookmark" => BlockContent::Bookmark(decode_payload(kind, payload)?),
            "to_do" => BlockContent::ToDo(decode_payload(kind, payload)?),
            "equation" => BlockContent::Equation(decode_payload(kind, payload)?),
            "table" => BlockContent::Table(decode_payload(kind, payload)?),
            "table_row" => BlockContent::TableRow(decode_payload(kind, payload)?),
            other => BlockContent::Unsupported(other.to_string()),
        };

        Ok(content)
    }
}

fn decode_payload<T: DeserializeOwned>(kind: &str, payload: Option<&Value>) -> Result<T, String> {
    let value = payload.ok_or_else(|| format!("missing `{kind}` payload"))?;
    T::deserialize(value).map_err(|e| e.to_string())
}

// ============================================================================
// Decoding
// ============================================================================

/// Where a block's children live: inside the payload when populated, otherwise
/// directly on the block.
pub(crate) fn child_values<'a>(
    object: &'a Map<String, Value>,
    kind: &str,
) -> Option<&'a Vec<Value>> {
    object
        .get(kind)
        .and_then(|payload| payload.get("children"))
        .and_then(Value::as_array)
        .filter(|children| !children.is_empty())
        .or_else(|| object.get("children").and_then(Value::as_array))
}

/// Decode a sibling sequence. Blocks that cannot be decoded are reported and
/// kept as [`BlockContent::Skipped`], one entry per input slot.
pub fn decode_blocks(
    values: &[Value],
    nesting_level: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Block> {
    values
        .iter()
        .map(|value| decode_block(value, nesting_level, diagnostics))
        .collect()
}

fn skipped(id: Option<String>) -> Block {
    Block {
        id,
        ..Block::new(BlockContent::Skipped)
    }
}

/// Decode one block and, when its kind renders them, its whole subtree.
pub fn decode_block(
    value: &Value,
    nesting_level: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> Block {
    let Some(object) = value.as_object() else {
        diagnostics.push(Diagnostic::new(
            None,
            nesting_level,
            DiagnosticKind::NotAnObject {
                found: json_type_name(value),
            },
        ));
        return skipped(None);
    };

    let id = object.get("id").and_then(Value::as_str).map(str::to_string);

    let Some(kind) = object.get("type").and_then(Value::as_str) else {
        diagnostics.push(Diagnostic::new(
            id.clone(),
            nesting_level,
            DiagnosticKind::MissingKind,
        ));
        return skipped(id);
    };

    let content = match BlockContent::decode(kind, object.get(kind)) {
        Ok(content) => content,
        Err(reason) => {
            diagnostics.push(Diagnostic::new(
                id.clone(),
                nesting_level,
                DiagnosticKind::MalformedPayload {
                    kind: kind.to_string(),
                    reason,
                },
            ));
            return skipped(id);
        }
    };

    let has_children = object
        .get("has_children")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    // Subtrees that are never rendered are never visited either.
    let children = if has_children && content.renders_children() {
        child_values(object, kind)
            .map(|values| decode_blocks(values, nesting_level + 1, diagnostics))
            .unwrap_or_default()
    } else {
        Vec::new()
    };

    Block {
        id,
        has_children,
        content,
        children,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: Value) -> (Block, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let block = decode_block(&value, 0, &mut diagnostics);
        (block, diagnostics)
    }

    #[test]
    fn test_decode_paragraph() {
        let (block, diagnostics) = decode(json!({
            "object": "block",
            "id": "p1",
            "type": "paragraph",
            "has_children": false,
            "paragraph": {
                "rich_text": [{ "type": "text", "text": { "content": "Hi" }, "plain_text": "Hi" }],
                "color": "default"
            }
        }));

        assert!(diagnostics.is_empty());
        assert_eq!(block.id.as_deref(), Some("p1"));
        assert_eq!(block.content.kind(), "paragraph");
        match block.content {
            BlockContent::Paragraph(text) => assert_eq!(text.rich_text.len(), 1),
            other => panic!("unexpected content {other:?}"),
        }
    }

    #[test]
    fn test_decode_legacy_text_field() {
        let (block, _) = decode(json!({
            "type": "heading_1",
            "heading_1": { "text": [{ "type": "text", "text": { "content": "Title" } }] }
        }));

        match block.content {
            BlockContent::Heading1(text) => assert_eq!(text.rich_text[0].plain_text, "Title"),
            other => panic!("unexpected content {other:?}"),
        }
    }

    #[test]
    fn test_decode_missing_kind() {
        let (block, diagnostics) = decode(json!({ "id": "x", "paragraph": {} }));
        assert_eq!(block.content, BlockContent::Skipped);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::MissingKind);
        assert_eq!(diagnostics[0].block_id.as_deref(), Some("x"));
    }

    #[test]
    fn test_decode_missing_payload() {
        let (block, diagnostics) = decode(json!({ "id": "q", "type": "quote" }));
        assert_eq!(block.content, BlockContent::Skipped);
        assert!(matches!(
            &diagnostics[0].kind,
            DiagnosticKind::MalformedPayload { kind, .. } if kind == "quote"
        ));
    }

    #[test]
    fn test_decode_mismatched_payload() {
        let (block, diagnostics) = decode(json!({
            "type": "child_page",
            "child_page": { "name": "no title here" }
        }));
        assert_eq!(block.content, BlockContent::Skipped);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_decode_not_an_object() {
        let (block, diagnostics) = decode(json!(42));
        assert_eq!(block.content, BlockContent::Skipped);
        assert_eq!(
            diagnostics[0].kind,
            DiagnosticKind::NotAnObject { found: "a number" }
        );
    }

    #[test]
    fn test_decode_unknown_kind_is_unsupported() {
        let (block, diagnostics) = decode(json!({
            "type": "unsupported_future_kind",
            "has_children": true,
            "children": [{ "type": "paragraph", "paragraph": {} }]
        }));

        assert!(diagnostics.is_empty());
        assert_eq!(
            block.content,
            BlockContent::Unsupported("unsupported_future_kind".to_string())
        );
        assert!(block.children.is_empty());
    }

    #[test]
    fn test_decode_image_sources() {
        let (external, _) = decode(json!({
            "type": "image",
            "image": { "type": "external", "external": { "url": "https://example.com/a.png" } }
        }));
        let (uploaded, _) = decode(json!({
            "type": "image",
            "image": {
                "type": "file",
                "file": { "url": "https://files.example.com/b.png", "expiry_time": "2024-01-01T00:00:00Z" }
            }
        }));

        match external.content {
            BlockContent::Image(image) => assert_eq!(
                image.source,
                FileSource::External {
                    url: "https://example.com/a.png".to_string()
                }
            ),
            other => panic!("unexpected content {other:?}"),
        }
        match uploaded.content {
            BlockContent::Image(image) => {
                assert_eq!(image.source.url(), "https://files.example.com/b.png")
            }
            other => panic!("unexpected content {other:?}"),
        }
    }

    #[test]
    fn test_decode_image_without_url() {
        let (block, diagnostics) = decode(json!({
            "type": "image",
            "image": { "type": "external" }
        }));
        assert_eq!(block.content, BlockContent::Skipped);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_decode_callout_icons() {
        let (block, _) = decode(json!({
            "type": "callout",
            "callout": { "rich_text": [], "icon": { "type": "emoji", "emoji": "💡" } }
        }));
        match block.content {
            BlockContent::Callout(callout) => assert_eq!(
                callout.icon,
                Some(Icon::Emoji {
                    emoji: "💡".to_string()
                })
            ),
            other => panic!("unexpected content {other:?}"),
        }

        let (block, _) = decode(json!({
            "type": "callout",
            "callout": { "rich_text": [], "icon": { "type": "custom_emoji", "custom_emoji": {} } }
        }));
        match block.content {
            BlockContent::Callout(callout) => assert_eq!(callout.icon, Some(Icon::Other)),
            other => panic!("unexpected content {other:?}"),
        }
    }

    #[test]
    fn test_children_inside_payload_take_precedence() {
        let (block, _) = decode(json!({
            "type": "toggle",
            "has_children": true,
            "toggle": {
                "rich_text": [],
                "children": [{ "type": "divider", "divider": {} }]
            },
            "children": [
                { "type": "divider", "divider": {} },
                { "type": "divider", "divider": {} }
            ]
        }));

        assert_eq!(block.children.len(), 1);
    }

    #[test]
    fn test_children_on_block_used_when_payload_has_none() {
        let (block, _) = decode(json!({
            "type": "quote",
            "has_children": true,
            "quote": { "rich_text": [], "children": [] },
            "children": [{ "type": "divider", "divider": {} }]
        }));

        assert_eq!(block.children.len(), 1);
        assert_eq!(block.children[0].content, BlockContent::Divider);
    }

    #[test]
    fn test_children_ignored_without_has_children() {
        let (block, _) = decode(json!({
            "type": "quote",
            "quote": { "rich_text": [] },
            "children": [{ "type": "divider", "divider": {} }]
        }));

        assert!(block.children.is_empty());
    }

    #[test]
    fn test_bad_child_is_reported_one_level_down() {
        let mut diagnostics = Vec::new();
        let blocks = decode_blocks(
            &[json!({
                "id": "parent",
                "type": "bulleted_list_item",
                "has_children": true,
                "bulleted_list_item": { "rich_text": [] },
                "children": [
                    { "id": "broken", "type": "code" },
                    { "type": "divider", "divider": {} }
                ]
            })],
            0,
            &mut diagnostics,
        );

        assert_eq!(blocks[0].children.len(), 2);
        assert_eq!(blocks[0].children[0].content, BlockContent::Skipped);
        assert_eq!(blocks[0].children[0].id.as_deref(), Some("broken"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].nesting_level, 1);
        assert_eq!(diagnostics[0].block_id.as_deref(), Some("broken"));
    }

    #[test]
    fn test_malformed_sibling_keeps_its_slot() {
        let mut diagnostics = Vec::new();
        let blocks = decode_blocks(
            &[
                json!({ "type": "divider", "divider": {} }),
                json!({ "id": "bad", "type": "paragraph" }),
                json!("not a block"),
                json!({ "type": "divider", "divider": {} }),
            ],
            0,
            &mut diagnostics,
        );

        let kinds: Vec<&str> = blocks.iter().map(|b| b.content.kind()).collect();
        assert_eq!(kinds, ["divider", "skipped", "skipped", "divider"]);
        assert_eq!(blocks[1].id.as_deref(), Some("bad"));
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn test_children_of_non_rendering_kinds_are_not_decoded() {
        for (kind, payload) in [
            ("child_page", json!({ "title": "Sub page" })),
            ("heading_2", json!({ "rich_text": [] })),
        ] {
            let mut value = json!({
                "type": kind,
                "has_children": true,
                "children": [{ "id": "hidden", "type": "code" }]
            });
            value[kind] = payload;

            let (block, diagnostics) = decode(value);
            assert_eq!(block.content.kind(), kind);
            assert!(block.has_children);
            assert!(block.children.is_empty());
            assert!(diagnostics.is_empty(), "{kind}: {diagnostics:?}");
        }
    }

    #[test]
    fn test_renders_children() {
        assert!(BlockContent::Toggle(TextBlock::default()).renders_children());
        assert!(BlockContent::Table(TableBlock::default()).renders_children());
        assert!(!BlockContent::Heading1(TextBlock::default()).renders_children());
        assert!(!BlockContent::Divider.renders_children());
        assert!(!BlockContent::Skipped.renders_children());
    }
}
