//! Block tree to HTML rendering
//!
//! [`render_blocks`] walks a sibling sequence in document order. Consecutive
//! list items of the same kind are buffered and emitted as one `<ul>`/`<ol>`
//! container; every other block goes through [`render_block`], which recurses
//! back into [`render_blocks`] for its children.

use crate::block::{
    Block, BlockContent, CalloutBlock, CodeBlock, Icon, ImageBlock, ListKind, TableBlock,
    TableRowBlock, TextBlock,
};
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::escape::escape;
use crate::inline::wrap_link;
use crate::rich_text::{plain_text, render_inline};

/// Placeholder content for paragraphs without text, so they keep their height.
pub const EMPTY_PARAGRAPH: &str = "&nbsp;";

/// Alt text for images without a caption.
pub const IMAGE_ALT_PLACEHOLDER: &str = "Image";

/// Language token for code blocks that do not declare one.
pub const DEFAULT_CODE_LANGUAGE: &str = "plaintext";

// ============================================================================
// List grouping
// ============================================================================

/// Call-local accumulator for a run of list items.
#[derive(Debug, Default)]
enum ListBuffer<'a> {
    #[default]
    Closed,
    Open {
        kind: ListKind,
        items: Vec<&'a Block>,
    },
}

impl<'a> ListBuffer<'a> {
    /// Add an item, closing the open run first when it is of another kind.
    ///
    /// Returns the markup of the run that had to be closed, if any.
    fn push(
        &mut self,
        kind: ListKind,
        block: &'a Block,
        nesting_level: usize,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> String {
        let switching = matches!(self, ListBuffer::Open { kind: open, .. } if *open != kind);
        let closed = if switching {
            self.flush(nesting_level, diagnostics)
        } else {
            String::new()
        };

        match self {
            ListBuffer::Closed => {
                *self = ListBuffer::Open {
                    kind,
                    items: vec![block],
                }
            }
            ListBuffer::Open { items, .. } => items.push(block),
        }

        closed
    }

    /// Emit the buffered run as one container and reset to closed.
    fn flush(&mut self, nesting_level: usize, diagnostics: &mut Vec<Diagnostic>) -> String {
        let ListBuffer::Open { kind, items } = std::mem::take(self) else {
            return String::new();
        };
        if items.is_empty() {
            return String::new();
        }

        let mut html = format!("<{}>", kind.tag());
        for item in items {
            html.push_str(&render_list_item(item, nesting_level, diagnostics));
        }
        html.push_str(&format!("</{}>", kind.tag()));
        html
    }
}

// ============================================================================
// Tree walking
// ============================================================================

/// Render a sibling sequence at the given nesting level.
pub fn render_blocks(
    blocks: &[Block],
    nesting_level: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> String {
    let mut html = String::new();
    let mut buffer = ListBuffer::default();

    for (index, block) in blocks.iter().enumerate() {
        match block.content.list_kind() {
            Some(kind) => {
                html.push_str(&buffer.push(kind, block, nesting_level, diagnostics));

                let next_is_list_item = blocks
                    .get(index + 1)
                    .is_some_and(|next| next.content.list_kind().is_some());
                if !next_is_list_item {
                    html.push_str(&buffer.flush(nesting_level, diagnostics));
                }
            }
            None => {
                html.push_str(&buffer.flush(nesting_level, diagnostics));
                html.push_str(&render_block(block, nesting_level, diagnostics));
            }
        }
    }

    html.push_str(&buffer.flush(nesting_level, diagnostics));
    html
}

fn render_children(
    block: &Block,
    nesting_level: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> String {
    if block.has_children {
        render_blocks(&block.children, nesting_level + 1, diagnostics)
    } else {
        String::new()
    }
}

/// Children of blocks that have no natural container of their own.
fn indented_children(
    block: &Block,
    nesting_level: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> String {
    let children = render_children(block, nesting_level, diagnostics);
    if children.is_empty() {
        children
    } else {
        format!("<div class=\"block-children\">{children}</div>")
    }
}

// ============================================================================
// Block rendering
// ============================================================================

/// Render one block. Unsupported kinds produce an empty string and a diagnostic;
/// skipped blocks were already reported while decoding and produce nothing.
pub fn render_block(
    block: &Block,
    nesting_level: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> String {
    match &block.content {
        BlockContent::Paragraph(text) => {
            let inline = render_inline(&text.rich_text);
            let body = if inline.is_empty() {
                EMPTY_PARAGRAPH.to_string()
            } else {
                inline
            };
            format!(
                "<p>{body}</p>{}",
                indented_children(block, nesting_level, diagnostics)
            )
        }
        BlockContent::Heading1(text) => heading(1, text),
        BlockContent::Heading2(text) => heading(2, text),
        BlockContent::Heading3(text) => heading(3, text),
        BlockContent::BulletedListItem(_) | BlockContent::NumberedListItem(_) => {
            render_list_item(block, nesting_level, diagnostics)
        }
        BlockContent::Image(image) => render_image(image),
        BlockContent::Divider => "<hr>".to_string(),
        BlockContent::Quote(text) => format!(
            "<blockquote>{}{}</blockquote>",
            render_inline(&text.rich_text),
            render_children(block, nesting_level, diagnostics)
        ),
        BlockContent::Code(code) => render_code(code),
        BlockContent::Callout(callout) => {
            render_callout(callout, block, nesting_level, diagnostics)
        }
        BlockContent::Toggle(text) => format!(
            "<details><summary>{}</summary>{}</details>",
            render_inline(&text.rich_text),
            render_children(block, nesting_level, diagnostics)
        ),
        BlockContent::ChildPage(page) => {
            format!("<p class=\"child-page\">Page: {}</p>", escape(&page.title))
        }
        BlockContent::Bookmark(bookmark) => format!(
            "<p class=\"bookmark\">{}</p>",
            wrap_link(&escape(&bookmark.url), &bookmark.url)
        ),
        BlockContent::ToDo(todo) => format!(
            "<div class=\"to-do\"><input type=\"checkbox\" disabled{}> <span>{}</span></div>{}",
            if todo.checked { " checked" } else { "" },
            render_inline(&todo.rich_text),
            indented_children(block, nesting_level, diagnostics)
        ),
        BlockContent::Equation(equation) => {
            let expression = escape(&equation.expression);
            format!("<div class=\"equation\" data-expression=\"{expression}\">{expression}</div>")
        }
        BlockContent::Table(table) => render_table(table, block, nesting_level, diagnostics),
        BlockContent::TableRow(row) => format!(
            "<table><tbody>{}</tbody></table>",
            render_table_row(row, false, false)
        ),
        BlockContent::Unsupported(kind) => {
            diagnostics.push(Diagnostic::new(
                block.id.clone(),
                nesting_level,
                DiagnosticKind::UnsupportedKind { kind: kind.clone() },
            ));
            String::new()
        }
        BlockContent::Skipped => String::new(),
    }
}

fn heading(level: u8, text: &TextBlock) -> String {
    format!("<h{level}>{}</h{level}>", render_inline(&text.rich_text))
}

/// One `<li>`: the item's own text, then its children inside the same element.
fn render_list_item(
    block: &Block,
    nesting_level: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> String {
    let text = match &block.content {
        BlockContent::BulletedListItem(text) | BlockContent::NumberedListItem(text) => {
            render_inline(&text.rich_text)
        }
        _ => String::new(),
    };

    format!(
        "<li>{text}{}</li>",
        render_children(block, nesting_level, diagnostics)
    )
}

fn render_image(image: &ImageBlock) -> String {
    let caption = plain_text(&image.caption);
    let alt = if caption.trim().is_empty() {
        IMAGE_ALT_PLACEHOLDER
    } else {
        caption.as_str()
    };

    let mut html = format!(
        "<figure><img src=\"{}\" alt=\"{}\">",
        escape(image.source.url()),
        escape(alt)
    );
    if !image.caption.is_empty() {
        html.push_str(&format!(
            "<figcaption>{}</figcaption>",
            render_inline(&image.caption)
        ));
    }
    html.push_str("</figure>");
    html
}

fn render_code(code: &CodeBlock) -> String {
    let language = code
        .language
        .as_deref()
        .map(str::trim)
        .filter(|language| !language.is_empty())
        .unwrap_or(DEFAULT_CODE_LANGUAGE);

    format!(
        "<pre><code class=\"language-{}\">{}</code></pre>",
        escape(&language.replace(' ', "-")),
        escape(&plain_text(&code.rich_text))
    )
}

fn render_icon(icon: &Icon) -> Option<String> {
    match icon {
        Icon::Emoji { emoji } => Some(format!(
            "<span class=\"callout-icon\">{}</span>",
            escape(emoji)
        )),
        Icon::External { external: url } | Icon::File { file: url } => Some(format!(
            "<img class=\"callout-icon\" src=\"{}\" alt=\"\">",
            escape(&url.url)
        )),
        Icon::Other => None,
    }
}

fn render_callout(
    callout: &CalloutBlock,
    block: &Block,
    nesting_level: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> String {
    let icon = callout
        .icon
        .as_ref()
        .and_then(render_icon)
        .unwrap_or_default();

    format!(
        "<div class=\"callout\">{icon}<div class=\"callout-content\">{}{}</div></div>",
        render_inline(&callout.rich_text),
        render_children(block, nesting_level, diagnostics)
    )
}

fn render_table(
    table: &TableBlock,
    block: &Block,
    nesting_level: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> String {
    let mut html = String::from("<table><tbody>");
    let rows: &[Block] = if block.has_children {
        &block.children
    } else {
        &[]
    };

    let mut rendered_rows = 0;
    for child in rows {
        match &child.content {
            BlockContent::TableRow(row) => {
                let header_row = table.has_column_header && rendered_rows == 0;
                html.push_str(&render_table_row(row, header_row, table.has_row_header));
                rendered_rows += 1;
            }
            BlockContent::Skipped => {}
            other => diagnostics.push(Diagnostic::new(
                child.id.clone(),
                nesting_level + 1,
                DiagnosticKind::UnexpectedChild {
                    parent: "table".to_string(),
                    kind: other.kind().to_string(),
                },
            )),
        }
    }

    html.push_str("</tbody></table>");
    html
}

fn render_table_row(row: &TableRowBlock, header_row: bool, header_column: bool) -> String {
    let mut html = String::from("<tr>");
    for (column, cell) in row.cells.iter().enumerate() {
        let tag = if header_row || (header_column && column == 0) {
            "th"
        } else {
            "td"
        };
        html.push_str(&format!("<{tag}>{}</{tag}>", render_inline(cell)));
    }
    html.push_str("</tr>");
    html
}

// ============================================================================
// Tests
// ============================================================================
