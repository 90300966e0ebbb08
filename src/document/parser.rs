//! Markdown parsing with comrak.

use anyhow::Result;
use comrak::nodes::{AstNode, ListDelimType, ListType, NodeValue, TableAlignment};
use comrak::{Arena, Options, parse_document};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::types::{
    Clip, CodeBlockRef, Document, HeadingRef, InlineSpan, InlineStyle, LineType, ParsedDocument,
    RenderedLine, spans_to_string, truncate_spans_to_chars,
};
use crate::outline::{heading_entry, slug};

const DEFAULT_WIDTH: u16 = 80;
const CODE_RIGHT_PADDING: usize = 3;

impl Document {
    /// Parse markdown source into a Document.
    ///
    /// # Example
    ///
    /// ```
    /// use marginalia::document::Document;
    ///
    /// let doc = Document::parse("# Hello\n\nWorld").unwrap();
    /// assert_eq!(doc.headings()[0].id, "hello");
    /// ```
    ///
    /// # Errors
    ///
    /// Currently infallible; kept fallible for callers that treat rendering
    /// as a loading step.
    pub fn parse(source: &str) -> Result<Self> {
        parse(source)
    }

    /// Parse and wrap paragraphs to `width` columns.
    ///
    /// # Errors
    ///
    /// See [`Document::parse`].
    pub fn parse_with_layout(source: &str, width: u16) -> Result<Self> {
        parse_with_layout(source, width)
    }
}

/// Parse markdown source into a Document at the default width.
///
/// # Errors
///
/// See [`Document::parse`].
pub fn parse(source: &str) -> Result<Document> {
    parse_with_layout(source, DEFAULT_WIDTH)
}

/// Parse markdown source into a Document with layout and wrapping.
///
/// # Errors
///
/// See [`Document::parse`].
pub fn parse_with_layout(source: &str, width: u16) -> Result<Document> {
    let arena = Arena::new();
    let options = create_options();
    let root = parse_document(&arena, source, &options);

    let mut renderer = Renderer {
        source_lines: source.split('\n').collect(),
        wrap_width: usize::from(width.max(1)),
        out: ParsedDocument::default(),
    };
    renderer.render(root, 0, None);

    Ok(Document::from_parsed(source.to_string(), renderer.out))
}

fn create_options() -> Options {
    let mut options = Options::default();

    // GFM extensions
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;

    options
}

struct Renderer<'s> {
    source_lines: Vec<&'s str>,
    wrap_width: usize,
    out: ParsedDocument,
}

impl Renderer<'_> {
    fn push(&mut self, line: RenderedLine) {
        self.out.lines.push(line);
    }

    fn push_empty(&mut self) {
        self.push(RenderedLine::new(String::new(), LineType::Empty));
    }

    fn push_wrapped(&mut self, wrapped: Vec<WrappedLine>, line_type: LineType) {
        for line in wrapped {
            let content = spans_to_string(&line.spans);
            self.push(
                RenderedLine::with_spans(content, line_type, line.spans).with_joined(line.joined),
            );
        }
    }

    fn render_children<'a>(&mut self, node: &'a AstNode<'a>, depth: usize, marker: Option<&str>) {
        for child in node.children() {
            self.render(child, depth, marker);
        }
    }

    fn render<'a>(&mut self, node: &'a AstNode<'a>, depth: usize, list_marker: Option<&str>) {
        let value = node.data.borrow().value.clone();
        match value {
            NodeValue::Document => self.render_children(node, depth, None),

            NodeValue::Heading(heading) => {
                let source_line = node.data.borrow().sourcepos.start.line;
                self.render_heading(node, heading.level, heading.setext, source_line);
            }

            NodeValue::Paragraph => {
                let images = collect_images(node);
                if images.is_empty() {
                    let spans = collect_inline_spans(node);
                    let wrapped = wrap_spans(&spans, self.wrap_width, "", "");
                    self.push_wrapped(wrapped, LineType::Paragraph);
                } else {
                    for (alt, src) in images {
                        self.push_image(&alt, &src);
                    }
                }
                self.push_empty();
            }

            NodeValue::CodeBlock(code_block) => {
                let language = code_block
                    .info
                    .split_whitespace()
                    .next()
                    .map(ToString::to_string);
                self.render_code_block(language, &code_block.literal);
            }

            NodeValue::List(list) => {
                let delimiter = match list.delimiter {
                    ListDelimType::Paren => ')',
                    ListDelimType::Period => '.',
                };
                let last_number = list.start + node.children().count().saturating_sub(1);
                let number_width = last_number.to_string().len();

                for (index, child) in node.children().enumerate() {
                    let marker = match list.list_type {
                        ListType::Bullet => "• ".to_string(),
                        ListType::Ordered => {
                            format!("{:>number_width$}{delimiter} ", list.start + index)
                        }
                    };
                    self.render(child, depth + 1, Some(&marker));
                }
            }

            NodeValue::Item(_) | NodeValue::TaskItem(_) => {
                self.render_item(node, depth, list_marker);
            }

            NodeValue::BlockQuote => {
                self.render_blockquote(node, 1);
                self.push_empty();
            }

            NodeValue::ThematicBreak => {
                self.push(RenderedLine::decoration(
                    "---".to_string(),
                    LineType::HorizontalRule,
                ));
                self.push_empty();
            }

            NodeValue::Table(_) => {
                for line in render_table(node, self.wrap_width) {
                    self.push(line);
                }
                self.push_empty();
            }

            NodeValue::FootnoteDefinition(def) => {
                let label = format!("[^{}]: ", def.name);
                let continuation = " ".repeat(label.chars().count());
                let spans = collect_inline_spans(node);
                let wrapped = wrap_spans(&spans, self.wrap_width, &label, &continuation);
                self.push_wrapped(wrapped, LineType::Paragraph);
                self.push_empty();
            }

            NodeValue::Image(image) => {
                let alt = extract_text(node);
                self.push_image(&alt, &image.url);
            }

            _ => self.render_children(node, depth, list_marker),
        }
    }

    fn render_heading<'a>(
        &mut self,
        node: &'a AstNode<'a>,
        level: u8,
        setext: bool,
        source_line: usize,
    ) {
        let text = extract_text(node);
        // ATX headings share their id with the outline entry of the same
        // source line; setext headings have no outline entry.
        let id = (!setext)
            .then(|| source_line.checked_sub(1))
            .flatten()
            .and_then(|idx| self.source_lines.get(idx))
            .and_then(|line| heading_entry(line.strip_suffix('\r').unwrap_or(line)))
            .map_or_else(|| slug(&text), |entry| entry.id);

        // Keep headings visually separated with two rows above.
        ensure_trailing_empty_lines(&mut self.out.lines, 2);
        self.out.headings.push(HeadingRef {
            level,
            text,
            line: self.out.lines.len(),
            id,
        });

        let mut spans = vec![InlineSpan::decoration(format!(
            "{} ",
            "#".repeat(usize::from(level))
        ))];
        spans.extend(collect_inline_spans(node));
        let content = spans_to_string(&spans);
        self.push(RenderedLine::with_spans(
            content,
            LineType::Heading(level),
            spans,
        ));
        self.push_empty();
    }

    fn push_image(&mut self, alt: &str, src: &str) {
        let label = if alt.is_empty() { src } else { alt };
        self.push(RenderedLine::decoration(
            format!("[Image: {label}]"),
            LineType::Image,
        ));
    }

    fn render_code_block(&mut self, language: Option<String>, literal: &str) {
        let raw_lines: Vec<String> = literal.lines().map(ToString::to_string).collect();
        let content_width = raw_lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0)
            .min(self.wrap_width.saturating_sub(4).max(1));

        let label = format!(" {} ", language.as_deref().unwrap_or("code"));
        let frame_inner_width = content_width + 2 + CODE_RIGHT_PADDING;
        let visible_label: String = label.chars().take(frame_inner_width).collect();
        let top = format!(
            "┌{visible_label}{}┐",
            "─".repeat(frame_inner_width.saturating_sub(visible_label.chars().count()))
        );
        self.push(RenderedLine::decoration(top, LineType::CodeBlock));

        let body_start = self.out.lines.len();
        let code_style = InlineStyle {
            code: true,
            ..InlineStyle::default()
        };
        for raw_line in &raw_lines {
            let body = truncate_spans_to_chars(
                &[InlineSpan::new(raw_line.clone(), code_style)],
                content_width,
            );
            let body_len: usize = body.iter().map(|s| s.text().chars().count()).sum();
            let padding = " ".repeat(content_width.saturating_sub(body_len) + CODE_RIGHT_PADDING);

            // The cut tail follows the last visible code column, after "│ ".
            let tail: String = raw_line.chars().skip(body_len).collect();
            let clipped = if tail.is_empty() {
                Vec::new()
            } else {
                vec![Clip {
                    after: 1 + body_len,
                    text: tail,
                }]
            };

            let mut line_spans = vec![InlineSpan::decoration("│ ")];
            line_spans.extend(body);
            line_spans.push(InlineSpan::decoration(format!("{padding} │")));
            let content = spans_to_string(&line_spans);
            self.push(
                RenderedLine::with_spans(content, LineType::CodeBlock, line_spans)
                    .with_clipped(clipped),
            );
        }

        self.out.code_blocks.push(CodeBlockRef {
            line_range: body_start..self.out.lines.len(),
            language,
            raw_lines,
            highlighted: false,
            content_width,
            right_padding: CODE_RIGHT_PADDING,
        });

        self.push(RenderedLine::decoration(
            format!("└{}┘", "─".repeat(frame_inner_width)),
            LineType::CodeBlock,
        ));
        self.push_empty();
    }

    fn render_item<'a>(&mut self, node: &'a AstNode<'a>, depth: usize, list_marker: Option<&str>) {
        let indent = "  ".repeat(depth.saturating_sub(1));
        let own_task = match &node.data.borrow().value {
            NodeValue::TaskItem(symbol) => Some(if symbol.is_some() { "✓" } else { "□" }),
            _ => None,
        };
        let marker = own_task.or_else(|| find_task_marker(node)).map_or_else(
            || list_marker.unwrap_or("- ").to_string(),
            |task| format!("{task} "),
        );
        let prefix_first = format!("{indent}{marker}");
        let prefix_next = format!("{indent}{}", " ".repeat(marker.chars().count()));
        let mut paragraphs = 0usize;

        for child in node.children() {
            let is_text_block = matches!(
                child.data.borrow().value,
                NodeValue::Paragraph | NodeValue::TaskItem(_)
            );
            if is_text_block {
                if paragraphs > 0 {
                    self.push(RenderedLine::new(String::new(), LineType::ListItem(depth)));
                }
                let prefix = if paragraphs == 0 {
                    &prefix_first
                } else {
                    &prefix_next
                };
                let spans = collect_inline_spans(child);
                let wrapped = wrap_spans(&spans, self.wrap_width, prefix, &prefix_next);
                self.push_wrapped(wrapped, LineType::ListItem(depth));
                paragraphs += 1;
            } else {
                self.render(child, depth, None);
            }
        }

        if paragraphs == 0 {
            let spans = collect_inline_spans(node);
            let wrapped = wrap_spans(&spans, self.wrap_width, &prefix_first, &prefix_next);
            self.push_wrapped(wrapped, LineType::ListItem(depth));
        }
    }

    fn render_blockquote<'a>(&mut self, node: &'a AstNode<'a>, quote_depth: usize) {
        let prefix = quote_prefix(quote_depth);

        for child in node.children() {
            let value = child.data.borrow().value.clone();
            match value {
                NodeValue::Paragraph => {
                    let spans = collect_inline_spans(child);
                    let wrapped = wrap_spans(&spans, self.wrap_width, &prefix, &prefix);
                    self.push_wrapped(wrapped, LineType::BlockQuote);
                }
                NodeValue::BlockQuote => self.render_blockquote(child, quote_depth + 1),
                _ => {
                    let text = extract_text(child);
                    for raw_line in text.lines() {
                        let spans =
                            vec![InlineSpan::new(raw_line.to_string(), InlineStyle::default())];
                        let wrapped = wrap_spans(&spans, self.wrap_width, &prefix, &prefix);
                        self.push_wrapped(wrapped, LineType::BlockQuote);
                    }
                }
            }
        }
    }
}

fn ensure_trailing_empty_lines(lines: &mut Vec<RenderedLine>, count: usize) {
    let existing = lines
        .iter()
        .rev()
        .take_while(|line| matches!(line.line_type(), LineType::Empty))
        .count();
    for _ in existing..count {
        lines.push(RenderedLine::new(String::new(), LineType::Empty));
    }
}

fn quote_prefix(depth: usize) -> String {
    let mut prefix = String::from("  ");
    for _ in 0..depth {
        prefix.push_str("│ ");
    }
    prefix
}

fn render_table<'a>(table_node: &'a AstNode<'a>, wrap_width: usize) -> Vec<RenderedLine> {
    let (alignments, mut rows, has_header) = collect_table_rows(table_node);
    let num_cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    if num_cols == 0 {
        return Vec::new();
    }
    for row in &mut rows {
        row.resize(num_cols, String::new());
    }

    let mut col_widths = vec![1_usize; num_cols];
    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            col_widths[idx] = col_widths[idx].max(UnicodeWidthStr::width(cell.as_str()));
        }
    }

    // Row width is 1 + sum(col_width + 3); shrink the widest column until it fits.
    let max_table_width = wrap_width.max(4);
    while 1 + col_widths.iter().sum::<usize>() + 3 * num_cols > max_table_width {
        let Some(widest) = col_widths.iter_mut().max() else {
            break;
        };
        if *widest <= 1 {
            break;
        }
        *widest -= 1;
    }

    let border = |left, middle, right| {
        RenderedLine::decoration(
            table_border(&col_widths, left, middle, right),
            LineType::Table,
        )
    };

    let mut lines = vec![border('┌', '┬', '┐')];
    for (idx, row) in rows.iter().enumerate() {
        lines.push(table_row(row, &col_widths, &alignments));
        if has_header && idx == 0 {
            lines.push(border('├', '┼', '┤'));
        }
    }
    lines.push(border('└', '┴', '┘'));
    lines
}

fn collect_table_rows<'a>(
    table_node: &'a AstNode<'a>,
) -> (Vec<TableAlignment>, Vec<Vec<String>>, bool) {
    let alignments = match &table_node.data.borrow().value {
        NodeValue::Table(table) => table.alignments.clone(),
        _ => Vec::new(),
    };

    let mut rows = Vec::new();
    let mut has_header = false;
    for row_node in table_node.children() {
        let NodeValue::TableRow(header) = row_node.data.borrow().value else {
            continue;
        };
        has_header |= header;
        let cells = row_node
            .children()
            .filter(|cell| matches!(cell.data.borrow().value, NodeValue::TableCell))
            .map(|cell| {
                extract_text(cell)
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();
        rows.push(cells);
    }

    (alignments, rows, has_header)
}

fn table_border(widths: &[usize], left: char, middle: char, right: char) -> String {
    let inner: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    format!("{left}{}{right}", inner.join(&middle.to_string()))
}

/// Cell text is readable, the vertical rules are decoration.
fn table_row(cells: &[String], widths: &[usize], alignments: &[TableAlignment]) -> RenderedLine {
    let mut spans = vec![InlineSpan::decoration("│")];
    let mut clipped = Vec::new();
    let mut column = 1;
    for (idx, width) in widths.iter().enumerate() {
        let text = cells.get(idx).map_or("", String::as_str);
        let content = truncate_to_width(text, *width);
        let shown = content.chars().count();
        let padding = width.saturating_sub(UnicodeWidthStr::width(content.as_str()));
        let (left, right) = match alignments.get(idx).copied().unwrap_or(TableAlignment::None) {
            TableAlignment::Right => (padding, 0),
            TableAlignment::Center => (padding / 2, padding - padding / 2),
            TableAlignment::Left | TableAlignment::None => (0, padding),
        };
        let tail: String = text.chars().skip(shown).collect();
        if !tail.is_empty() {
            // Last shown character, or the cell's leading space if none fit.
            clipped.push(Clip {
                after: column + left + shown,
                text: tail,
            });
        }
        let cell = format!(
            " {}{content}{} ",
            " ".repeat(left),
            " ".repeat(right)
        );
        column += cell.chars().count() + 1;
        spans.push(InlineSpan::new(cell, InlineStyle::default()));
        spans.push(InlineSpan::decoration("│"));
    }
    let content = spans_to_string(&spans);
    RenderedLine::with_spans(content, LineType::Table, spans).with_clipped(clipped)
}

fn truncate_to_width(text: &str, max_width: usize) -> String {
    let mut out = String::new();
    let mut width = 0usize;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width {
            break;
        }
        out.push(ch);
        width += ch_width;
    }
    out
}

fn extract_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    extract_text_recursive(node, &mut text);
    text
}

fn extract_text_recursive<'a>(node: &'a AstNode<'a>, text: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(t) => text.push_str(t),
        NodeValue::Code(c) => {
            text.push('`');
            text.push_str(&c.literal);
            text.push('`');
        }
        NodeValue::FootnoteReference(reference) => {
            text.push_str(&format!("[^{}]", reference.name));
        }
        NodeValue::SoftBreak | NodeValue::LineBreak => text.push('\n'),
        _ => {
            for child in node.children() {
                extract_text_recursive(child, text);
            }
        }
    }
}

fn collect_inline_spans<'a>(node: &'a AstNode<'a>) -> Vec<InlineSpan> {
    let mut spans = Vec::new();
    collect_inline_spans_recursive(node, InlineStyle::default(), &mut spans);
    spans
}

fn collect_inline_spans_recursive<'a>(
    node: &'a AstNode<'a>,
    style: InlineStyle,
    spans: &mut Vec<InlineSpan>,
) {
    let mut next = style;
    match &node.data.borrow().value {
        NodeValue::List(_) | NodeValue::Item(_) => return,
        NodeValue::Text(t) => {
            spans.push(InlineSpan::new(t.clone(), style));
            return;
        }
        NodeValue::Code(code) => {
            let code_style = InlineStyle {
                code: true,
                emphasis: false,
                strong: false,
                strikethrough: false,
                ..style
            };
            spans.push(InlineSpan::new(code.literal.clone(), code_style));
            return;
        }
        NodeValue::FootnoteReference(reference) => {
            spans.push(InlineSpan::new(format!("[^{}]", reference.name), style));
            return;
        }
        NodeValue::SoftBreak | NodeValue::LineBreak => {
            spans.push(InlineSpan::new(" ".to_string(), style));
            return;
        }
        NodeValue::Emph => next.emphasis = true,
        NodeValue::Strong => next.strong = true,
        NodeValue::Strikethrough => next.strikethrough = true,
        NodeValue::Link(_) => next.link = true,
        _ => {}
    }
    for child in node.children() {
        collect_inline_spans_recursive(child, next, spans);
    }
}

fn find_task_marker<'a>(node: &'a AstNode<'a>) -> Option<&'static str> {
    node.children().find_map(|child| match &child.data.borrow().value {
        NodeValue::TaskItem(symbol) => Some(if symbol.is_some() { "✓" } else { "□" }),
        NodeValue::List(_) => None,
        _ => find_task_marker(child),
    })
}

/// Images in a paragraph as (alt, src) pairs.
fn collect_images<'a>(node: &'a AstNode<'a>) -> Vec<(String, String)> {
    let mut images = Vec::new();
    for descendant in node.descendants() {
        if let NodeValue::Image(image) = &descendant.data.borrow().value {
            images.push((extract_text(descendant), image.url.clone()));
        }
    }
    images
}

/// One line of wrapped inline text.
struct WrappedLine {
    spans: Vec<InlineSpan>,
    /// The break before this line fell between two non-whitespace tokens
    joined: bool,
}

/// Greedy word wrap. Prefixes become decoration spans and whitespace at the
/// start of a wrapped line is dropped.
fn wrap_spans(
    spans: &[InlineSpan],
    width: usize,
    prefix_first: &str,
    prefix_next: &str,
) -> Vec<WrappedLine> {
    let start_line = |prefix: &str| -> (Vec<InlineSpan>, usize) {
        if prefix.is_empty() {
            (Vec::new(), 0)
        } else {
            (vec![InlineSpan::decoration(prefix)], prefix.chars().count())
        }
    };

    let mut lines = Vec::new();
    let (mut current, mut current_len) = start_line(prefix_first);
    let mut joined = false;
    let mut has_word = false;
    let mut last_is_ws = false;

    for token in spans.iter().flat_map(split_inline_tokens) {
        let token_len = token.text().chars().count();
        let token_is_ws = token.text().chars().all(char::is_whitespace);

        if has_word && current_len + token_len > width {
            lines.push(WrappedLine {
                spans: std::mem::take(&mut current),
                joined,
            });
            (current, current_len) = start_line(prefix_next);
            joined = !token_is_ws && !last_is_ws;
            has_word = false;
        }
        if token_is_ws && !has_word {
            continue;
        }

        current_len += token_len;
        current.push(token);
        has_word = true;
        last_is_ws = token_is_ws;
    }

    lines.push(WrappedLine {
        spans: current,
        joined,
    });
    lines
}

fn split_inline_tokens(span: &InlineSpan) -> Vec<InlineSpan> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut ws_state: Option<bool> = None;

    for ch in span.text().chars() {
        let is_ws = ch.is_whitespace();
        if ws_state.is_some_and(|state| state != is_ws) {
            out.push(InlineSpan::new(std::mem::take(&mut buf), span.style()));
        }
        buf.push(ch);
        ws_state = Some(is_ws);
    }
    if !buf.is_empty() {
        out.push(InlineSpan::new(buf, span.style()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines_of(doc: &Document, line_type: LineType) -> Vec<String> {
        doc.lines()
            .iter()
            .filter(|l| *l.line_type() == line_type)
            .map(|l| l.content().to_string())
            .collect()
    }

    #[test]
    fn test_parse_empty_document() {
        let doc = parse("").unwrap();
        assert_eq!(doc.line_count(), 0);
    }

    #[test]
    fn test_parse_simple_paragraph() {
        let doc = parse("Hello world").unwrap();
        assert!(doc.lines().iter().any(|l| l.content().contains("Hello")));
    }

    #[test]
    fn test_parse_heading() {
        let doc = parse("# Title").unwrap();
        assert_eq!(doc.headings().len(), 1);
        assert_eq!(doc.headings()[0].text, "Title");
        assert_eq!(doc.headings()[0].level, 1);
        assert_eq!(doc.headings()[0].id, "title");
    }

    #[test]
    fn test_heading_ids_match_outline() {
        let md = "# Understanding Decentralized Systems\n\n## What is **Decentralization**?\n\n### Key Characteristics";
        let doc = parse(md).unwrap();
        let outline: Vec<String> = crate::outline::build_outline(md)
            .into_iter()
            .map(|e| e.id)
            .collect();
        let ids: Vec<String> = doc.headings().iter().map(|h| h.id.clone()).collect();
        assert_eq!(ids, outline);
    }

    #[test]
    fn test_setext_heading_uses_plain_text_slug() {
        let doc = parse("Overview Notes\n==============\n").unwrap();
        assert_eq!(doc.headings()[0].id, "overview-notes");
    }

    #[test]
    fn test_heading_prefix_is_decoration() {
        let doc = parse("## Sub").unwrap();
        let line = &doc.lines()[doc.headings()[0].line];
        assert_eq!(line.content(), "## Sub");
        let spans = line.spans().unwrap();
        assert!(spans[0].style().decoration);
        assert!(!spans[1].style().decoration);
    }

    #[test]
    fn test_heading_has_two_rows_above() {
        let doc = Document::parse_with_layout("Paragraph\n\n## Heading", 80).unwrap();
        let heading_line = doc.headings()[0].line;
        assert!(heading_line >= 2);
        assert_eq!(*doc.lines()[heading_line - 1].line_type(), LineType::Empty);
        assert_eq!(*doc.lines()[heading_line - 2].line_type(), LineType::Empty);
    }

    #[test]
    fn test_heading_line_numbers_increase() {
        let doc = parse("# First\n\nParagraph\n\n# Second").unwrap();
        assert_eq!(doc.headings()[0].line, 2);
        assert!(doc.headings()[1].line > doc.headings()[0].line);
    }

    #[test]
    fn test_parse_code_block_frame() {
        let doc = parse_with_layout("```rust\nfn main() {}\n```", 80).unwrap();
        let code_lines = lines_of(&doc, LineType::CodeBlock);
        assert!(code_lines[0].starts_with("┌ rust "));
        assert!(code_lines.last().unwrap().starts_with('└'));
        assert!(code_lines.iter().any(|l| l.starts_with("│ fn main")));
        let width = code_lines[0].chars().count();
        assert!(code_lines.iter().all(|l| l.chars().count() == width));
        assert!(!doc.lines().iter().any(|l| l.content().starts_with("```")));
    }

    #[test]
    fn test_long_code_line_keeps_clipped_tail() {
        let doc = parse_with_layout("```\nabcdefghijkl\n```", 10).unwrap();
        let line = doc
            .lines()
            .iter()
            .find(|l| l.content().starts_with("│ abcdef"))
            .unwrap();
        assert_eq!(line.content(), "│ abcdef    │");
        let clip = &line.clipped()[0];
        assert_eq!(clip.text, "ghijkl");
        assert_eq!(line.content().chars().nth(clip.after), Some('f'));
    }

    #[test]
    fn test_highlighting_keeps_clipped_tail() {
        let mut doc = parse_with_layout("```rust\nlet value = compute();\n```", 12).unwrap();
        doc.ensure_highlight_for_range(0..doc.line_count());
        let line = doc
            .lines()
            .iter()
            .find(|l| l.content().starts_with("│ let"))
            .unwrap();
        assert_eq!(line.clipped()[0].text, "e = compute();");
    }

    #[test]
    fn test_table_cell_keeps_clipped_tail() {
        let doc = parse_with_layout("| A | Notes |\n|---|---|\n| 1 | abcdefghij |", 12).unwrap();
        let row = doc
            .lines()
            .iter()
            .find(|l| l.content().contains("│ 1"))
            .unwrap();
        let clip = &row.clipped()[0];
        let shown: String = row.content().chars().skip(clip.after - 3).take(4).collect();
        assert_eq!(format!("{shown}{}", clip.text), "abcdefghij");
    }

    #[test]
    fn test_wrap_inside_word_marks_line_joined() {
        let doc = parse_with_layout("aaaa **bbbb**cccc dddd", 9).unwrap();
        let lines: Vec<_> = doc
            .lines()
            .iter()
            .filter(|l| *l.line_type() == LineType::Paragraph)
            .map(|l| (l.content().to_string(), l.is_joined()))
            .collect();
        assert_eq!(
            lines,
            vec![
                ("aaaa bbbb".to_string(), false),
                ("cccc dddd".to_string(), true),
            ]
        );
    }

    #[test]
    fn test_wrap_at_space_is_not_joined() {
        let doc = parse_with_layout("aaaa bbbb cccc", 9).unwrap();
        assert!(doc.lines().iter().all(|l| !l.is_joined()));
    }

    #[test]
    fn test_code_block_is_plain_until_range_is_highlighted() {
        let mut doc = parse_with_layout("```rust\nfn main() {}\n```", 80).unwrap();
        let find_code = |doc: &Document| {
            doc.lines()
                .iter()
                .find(|l| l.content().contains("fn main"))
                .cloned()
                .unwrap()
        };
        let before = find_code(&doc);
        assert!(before.spans().unwrap().iter().all(|s| s.style().fg.is_none()));

        doc.ensure_highlight_for_range(0..doc.line_count());
        let after = find_code(&doc);
        assert_eq!(after.content(), before.content());
        assert!(after.spans().unwrap().iter().any(|s| s.style().fg.is_some()));
    }

    #[test]
    fn test_blockquote_wraps_with_quote_prefix() {
        let md = "> This is a long block quote line that should wrap and keep the quote prefix.";
        let doc = Document::parse_with_layout(md, 30).unwrap();
        let quote_lines = lines_of(&doc, LineType::BlockQuote);
        assert!(quote_lines.len() > 1);
        for line in quote_lines {
            assert!(line.starts_with("  │ "));
            assert!(line.chars().count() <= 30);
        }
    }

    #[test]
    fn test_paragraph_wraps_to_width() {
        let md = "This is a long paragraph that should wrap at the specified width.";
        let doc = Document::parse_with_layout(md, 20).unwrap();
        let paragraph_lines = lines_of(&doc, LineType::Paragraph);
        assert!(paragraph_lines.len() > 1);
        assert!(paragraph_lines.iter().all(|l| l.chars().count() <= 20));
    }

    #[test]
    fn test_inline_styles_create_spans() {
        let md = "*em* **strong** `code` [link](https://example.com) ~~strike~~";
        let doc = parse(md).unwrap();
        let paragraph = doc
            .lines()
            .iter()
            .find(|l| *l.line_type() == LineType::Paragraph)
            .unwrap();
        let spans = paragraph.spans().unwrap();
        assert!(spans.iter().any(|s| s.style().emphasis));
        assert!(spans.iter().any(|s| s.style().strong));
        assert!(spans.iter().any(|s| s.style().code));
        assert!(spans.iter().any(|s| s.style().link));
        assert!(spans.iter().any(|s| s.style().strikethrough));
    }

    #[test]
    fn test_ordered_list_markers_align() {
        let doc = parse("9. Ninth\n10. Tenth").unwrap();
        let items = lines_of(&doc, LineType::ListItem(1));
        assert!(items[0].starts_with(" 9. "));
        assert!(items[1].starts_with("10. "));
    }

    #[test]
    fn test_list_marker_is_decoration() {
        let doc = parse("- Item").unwrap();
        let line = doc
            .lines()
            .iter()
            .find(|l| *l.line_type() == LineType::ListItem(1))
            .unwrap();
        assert_eq!(line.content(), "• Item");
        assert!(line.spans().unwrap()[0].style().decoration);
    }

    #[test]
    fn test_list_wraps_with_hanging_indent() {
        let md = "1. This is a long list item that should wrap to the next line.";
        let doc = Document::parse_with_layout(md, 20).unwrap();
        let items = lines_of(&doc, LineType::ListItem(1));
        assert!(items.len() > 1);
        assert!(items[0].starts_with("1. "));
        assert!(items[1].starts_with("   "));
    }

    #[test]
    fn test_nested_list_indents_children() {
        let doc = parse("- Parent\n  - Child").unwrap();
        assert_eq!(lines_of(&doc, LineType::ListItem(1)), vec!["• Parent"]);
        assert_eq!(lines_of(&doc, LineType::ListItem(2)), vec!["  • Child"]);
    }

    #[test]
    fn test_task_list_markers() {
        let doc = parse("- [x] Done\n  - [ ] Child").unwrap();
        let items: Vec<String> = doc
            .lines()
            .iter()
            .filter(|l| matches!(l.line_type(), LineType::ListItem(_)))
            .map(|l| l.content().to_string())
            .collect();
        assert!(items[0].starts_with("✓ Done"));
        assert!(items[1].starts_with("  □ Child"));
    }

    #[test]
    fn test_table_borders_are_decoration() {
        let doc = parse("| A | B |\n|---|---|\n| 1 | 2 |").unwrap();
        let table: Vec<_> = doc
            .lines()
            .iter()
            .filter(|l| *l.line_type() == LineType::Table)
            .collect();
        assert_eq!(table.len(), 5);
        assert!(table[0].content().starts_with('┌'));
        assert!(table[0].text_columns().iter().all(|(_, readable)| !readable));
        assert!(table[1].content().starts_with("│ A"));
        assert!(table[3].content().contains("│ 1"));
        assert!(table[4].content().starts_with('└'));
    }

    #[test]
    fn test_table_respects_layout_width() {
        let md = "| Very long heading | Value |\n|---|---:|\n| some really long content | 12345 |";
        let doc = Document::parse_with_layout(md, 24).unwrap();
        for line in lines_of(&doc, LineType::Table) {
            assert!(UnicodeWidthStr::width(line.as_str()) <= 24, "too wide: {line}");
        }
    }

    #[test]
    fn test_image_placeholder() {
        let doc = parse("![Diagram](diagram.png)").unwrap();
        assert_eq!(lines_of(&doc, LineType::Image), vec!["[Image: Diagram]"]);
    }

    #[test]
    fn test_footnotes_render() {
        let doc = parse("Alpha[^n]\n\n[^n]: Footnote text").unwrap();
        assert!(doc.lines().iter().any(|l| l.content().contains("Alpha[^n]")));
        assert!(doc.lines().iter().any(|l| l.content().starts_with("[^n]: ")));
    }

    #[test]
    fn test_rule_is_decoration() {
        let doc = parse("above\n\n---\n\nbelow").unwrap();
        assert_eq!(lines_of(&doc, LineType::HorizontalRule), vec!["---"]);
    }
}
