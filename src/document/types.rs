//! Core document types.

use std::ops::Range;

/// Result of parsing markdown, ready to be assembled into a `Document`.
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    /// Rendered lines for display
    pub lines: Vec<RenderedLine>,
    /// Heading references for TOC
    pub headings: Vec<HeadingRef>,
    /// Code blocks for lazy syntax highlighting
    pub code_blocks: Vec<CodeBlockRef>,
}

/// A parsed and rendered markdown document.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Original source text
    source: String,
    /// Rendered lines for display
    lines: Vec<RenderedLine>,
    /// Heading references for TOC
    headings: Vec<HeadingRef>,
    /// Code blocks for lazy syntax highlighting
    code_blocks: Vec<CodeBlockRef>,
}

impl Document {
    /// Create an empty document.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a new document from parsed results.
    pub(crate) fn from_parsed(source: String, result: ParsedDocument) -> Self {
        Self {
            source,
            lines: result.lines,
            headings: result.headings,
            code_blocks: result.code_blocks,
        }
    }

    /// Get the total number of rendered lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Get all headings for TOC.
    pub fn headings(&self) -> &[HeadingRef] {
        &self.headings
    }

    /// All rendered lines.
    pub fn lines(&self) -> &[RenderedLine] {
        &self.lines
    }

    pub(crate) fn lines_mut(&mut self) -> &mut [RenderedLine] {
        &mut self.lines
    }

    /// Rendered line of the first heading whose id is `id`.
    ///
    /// Duplicate ids resolve to the earliest heading.
    pub fn heading_line(&self, id: &str) -> Option<usize> {
        self.headings.iter().find(|h| h.id == id).map(|h| h.line)
    }

    /// Get visible lines for rendering.
    ///
    /// Returns lines from `offset` to `offset + count`.
    pub fn visible_lines(&self, offset: usize, count: usize) -> Vec<&RenderedLine> {
        self.lines.iter().skip(offset).take(count).collect()
    }

    /// Get a specific rendered line by index.
    pub fn line_at(&self, index: usize) -> Option<&RenderedLine> {
        self.lines.get(index)
    }

    /// Get the source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Lazily apply syntax highlighting to code blocks intersecting `range`.
    ///
    /// Comment markers already placed on the plain lines are carried over.
    pub fn ensure_highlight_for_range(&mut self, range: Range<usize>) {
        for block in &mut self.code_blocks {
            if block.highlighted
                || block.line_range.end <= range.start
                || block.line_range.start >= range.end
            {
                continue;
            }

            let highlighted = crate::highlight::highlight_code(
                block.language.as_deref(),
                &block.raw_lines.join("\n"),
            );

            for (line_idx, spans) in
                (block.line_range.start..block.line_range.end).zip(highlighted)
            {
                let Some(line) = self.lines.get_mut(line_idx) else {
                    break;
                };
                let trimmed_spans = truncate_spans_to_chars(&spans, block.content_width);
                let trimmed_len = spans_char_len(&trimmed_spans);
                let padding = " "
                    .repeat(block.content_width.saturating_sub(trimmed_len) + block.right_padding);

                let mut line_spans = Vec::new();
                line_spans.push(InlineSpan::decoration("│ "));
                line_spans.extend(trimmed_spans);
                line_spans.push(InlineSpan::decoration(format!("{padding} │")));
                line.restyle(line_spans);
            }

            block.highlighted = true;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlockRef {
    pub line_range: Range<usize>,
    pub language: Option<String>,
    pub raw_lines: Vec<String>,
    pub highlighted: bool,
    pub content_width: usize,
    pub right_padding: usize,
}

/// A single rendered line with styling information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    /// The text content of the line
    content: String,
    /// The type of line (for styling)
    line_type: LineType,
    /// Optional inline-styled spans for rendering
    spans: Vec<InlineSpan>,
    /// Readable text cut off to fit the layout width
    clipped: Vec<Clip>,
    /// Wrapped in the middle of a word, so no whitespace separates this
    /// line from the previous one
    joined: bool,
}

/// Readable text hidden by truncation.
///
/// It belongs right after character column `after` of its line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clip {
    pub after: usize,
    pub text: String,
}

impl RenderedLine {
    /// Create a new rendered line.
    pub const fn new(content: String, line_type: LineType) -> Self {
        Self::with_spans(content, line_type, Vec::new())
    }

    /// Create a new rendered line with inline spans.
    pub const fn with_spans(content: String, line_type: LineType, spans: Vec<InlineSpan>) -> Self {
        Self {
            content,
            line_type,
            spans,
            clipped: Vec::new(),
            joined: false,
        }
    }

    /// Record text that was cut from the line, ordered by column.
    pub(crate) fn with_clipped(mut self, clipped: Vec<Clip>) -> Self {
        self.clipped = clipped;
        self
    }

    pub(crate) const fn with_joined(mut self, joined: bool) -> Self {
        self.joined = joined;
        self
    }

    /// Text cut off by truncation, in column order.
    pub fn clipped(&self) -> &[Clip] {
        &self.clipped
    }

    /// Whether this line continues a word from the previous line.
    pub const fn is_joined(&self) -> bool {
        self.joined
    }

    /// A line made of a single decoration span (frames, rules, borders).
    pub fn decoration(content: String, line_type: LineType) -> Self {
        let spans = vec![InlineSpan::decoration(content.clone())];
        Self::with_spans(content, line_type, spans)
    }

    /// Get the text content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Get the line type.
    pub const fn line_type(&self) -> &LineType {
        &self.line_type
    }

    /// Get inline spans, if present.
    pub fn spans(&self) -> Option<&[InlineSpan]> {
        if self.spans.is_empty() {
            None
        } else {
            Some(&self.spans)
        }
    }

    /// Get as string slice.
    pub fn as_str(&self) -> &str {
        &self.content
    }

    /// Character columns of the line paired with whether they are readable
    /// text (as opposed to decoration such as list markers and frames).
    pub fn text_columns(&self) -> Vec<(char, bool)> {
        if self.spans.is_empty() {
            return self.content.chars().map(|ch| (ch, true)).collect();
        }
        self.spans
            .iter()
            .flat_map(|span| {
                let readable = !span.style.decoration;
                span.text.chars().map(move |ch| (ch, readable))
            })
            .collect()
    }

    /// Whether every readable column in `cols` already carries `comment_id`.
    pub fn is_marked(&self, cols: Range<usize>, comment_id: &str) -> bool {
        if self.spans.is_empty() {
            return cols.is_empty();
        }
        let mut col = 0;
        for span in &self.spans {
            let len = span.char_len();
            let overlaps = col < cols.end && col + len > cols.start;
            if overlaps && !span.style.decoration && !span.has_comment(comment_id) {
                return false;
            }
            col += len;
        }
        true
    }

    /// Attach `comment_id` to the readable text in character columns `cols`.
    ///
    /// Spans are split at the range boundaries; the line text never changes.
    /// Returns true if any span gained the marker.
    pub fn mark(&mut self, cols: Range<usize>, comment_id: &str) -> bool {
        if cols.is_empty() {
            return false;
        }
        if self.spans.is_empty() {
            self.spans = vec![InlineSpan::new(self.content.clone(), InlineStyle::default())];
        }

        let mut changed = false;
        let mut out = Vec::with_capacity(self.spans.len() + 2);
        let mut col = 0;
        for span in std::mem::take(&mut self.spans) {
            let len = span.char_len();
            let start = col;
            let end = col + len;
            col = end;
            if span.style.decoration
                || end <= cols.start
                || start >= cols.end
                || span.has_comment(comment_id)
            {
                out.push(span);
                continue;
            }
            let split_start = cols.start.saturating_sub(start).min(len);
            let split_end = cols.end.min(end) - start;
            let (before, rest) = span.split_at_char(split_start);
            let (mut inside, after) = rest.split_at_char(split_end - split_start);
            inside.comments.push(comment_id.to_string());
            changed = true;
            out.extend([before, inside, after].into_iter().filter(|s| !s.text.is_empty()));
        }
        self.spans = out;
        changed
    }

    /// Whether any span carries `comment_id`.
    pub fn has_comment(&self, comment_id: &str) -> bool {
        self.spans.iter().any(|span| span.has_comment(comment_id))
    }

    /// Replace the spans with `spans` of identical text, keeping comment
    /// markers on the same character columns.
    pub(crate) fn restyle(&mut self, spans: Vec<InlineSpan>) {
        let markers: Vec<&[String]> = self
            .spans
            .iter()
            .flat_map(|span| std::iter::repeat_n(span.comments.as_slice(), span.char_len()))
            .collect();
        let content = spans_to_string(&spans);
        if markers.iter().all(|m| m.is_empty()) {
            self.content = content;
            self.spans = spans;
            return;
        }

        let mut out: Vec<InlineSpan> = Vec::new();
        let mut col = 0;
        for span in spans {
            for ch in span.text.chars() {
                let comments = markers.get(col).copied().unwrap_or_default();
                match out.last_mut() {
                    Some(last) if last.style == span.style && last.comments == comments => {
                        last.text.push(ch);
                    }
                    _ => {
                        let mut piece = InlineSpan::new(ch.to_string(), span.style);
                        piece.comments = comments.to_vec();
                        out.push(piece);
                    }
                }
                col += 1;
            }
        }
        self.content = content;
        self.spans = out;
    }
}

/// Inline style flags for a text span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineStyle {
    pub emphasis: bool,
    pub strong: bool,
    pub code: bool,
    pub strikethrough: bool,
    pub link: bool,
    /// Layout chrome (markers, prefixes, frames) rather than document text
    pub decoration: bool,
    pub fg: Option<InlineColor>,
    pub bg: Option<InlineColor>,
}

/// RGB color for inline styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// A styled inline span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineSpan {
    text: String,
    style: InlineStyle,
    /// Ids of the comments whose highlight covers this span
    comments: Vec<String>,
}

impl InlineSpan {
    pub const fn new(text: String, style: InlineStyle) -> Self {
        Self {
            text,
            style,
            comments: Vec::new(),
        }
    }

    /// A span of layout chrome.
    pub fn decoration(text: impl Into<String>) -> Self {
        let style = InlineStyle {
            decoration: true,
            ..InlineStyle::default()
        };
        Self::new(text.into(), style)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn style(&self) -> InlineStyle {
        self.style
    }

    /// Comment ids attached to this span.
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn has_comment(&self, comment_id: &str) -> bool {
        self.comments.iter().any(|c| c == comment_id)
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    fn split_at_char(self, index: usize) -> (Self, Self) {
        let byte = self
            .text
            .char_indices()
            .nth(index)
            .map_or(self.text.len(), |(b, _)| b);
        let (head, tail) = self.text.split_at(byte);
        (
            Self {
                text: head.to_string(),
                style: self.style,
                comments: self.comments.clone(),
            },
            Self {
                text: tail.to_string(),
                style: self.style,
                comments: self.comments,
            },
        )
    }
}

/// Type of a rendered line, used for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineType {
    /// Normal paragraph text
    Paragraph,
    /// Heading with level (1-6)
    Heading(u8),
    /// Code block line
    CodeBlock,
    /// Block quote line
    BlockQuote,
    /// List item with nesting level
    ListItem(usize),
    /// Table row
    Table,
    /// Horizontal rule
    HorizontalRule,
    /// Image placeholder
    Image,
    /// Empty line
    Empty,
}

/// Reference to a heading in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingRef {
    /// Heading level (1-6)
    pub level: u8,
    /// Heading text (plain, no formatting)
    pub text: String,
    /// Line number in rendered document
    pub line: usize,
    /// Navigation target, `slug(text)`
    pub id: String,
}

pub(crate) fn spans_to_string(spans: &[InlineSpan]) -> String {
    let mut content = String::new();
    for span in spans {
        content.push_str(span.text());
    }
    content
}

fn spans_char_len(spans: &[InlineSpan]) -> usize {
    spans.iter().map(InlineSpan::char_len).sum()
}

pub(crate) fn truncate_spans_to_chars(spans: &[InlineSpan], max_len: usize) -> Vec<InlineSpan> {
    let mut out = Vec::new();
    let mut remaining = max_len;
    for span in spans {
        if remaining == 0 {
            break;
        }
        let taken: String = span.text().chars().take(remaining).collect();
        let count = taken.chars().count();
        if count > 0 {
            out.push(InlineSpan::new(taken, span.style()));
            remaining -= count;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(text: &str) -> RenderedLine {
        RenderedLine::with_spans(
            text.to_string(),
            LineType::Paragraph,
            vec![InlineSpan::new(text.to_string(), InlineStyle::default())],
        )
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::empty();
        assert_eq!(doc.line_count(), 0);
        assert!(doc.headings().is_empty());
    }

    #[test]
    fn test_rendered_line_content() {
        let line = RenderedLine::new("Hello".to_string(), LineType::Paragraph);
        assert_eq!(line.content(), "Hello");
        assert_eq!(line.as_str(), "Hello");
    }

    #[test]
    fn test_visible_lines() {
        let lines = (1..=5)
            .map(|i| RenderedLine::new(format!("Line {i}"), LineType::Paragraph))
            .collect();
        let doc = Document::from_parsed(
            "source".to_string(),
            ParsedDocument {
                lines,
                ..ParsedDocument::default()
            },
        );

        let visible = doc.visible_lines(1, 2);
        assert_eq!(visible.len(), 2);
        assert_eq!(visible[0].content(), "Line 2");
        assert_eq!(visible[1].content(), "Line 3");
        assert_eq!(doc.visible_lines(0, 10).len(), 5);
    }

    #[test]
    fn test_heading_line_resolves_first_duplicate() {
        let heading = |line| HeadingRef {
            level: 2,
            text: "Notes".to_string(),
            line,
            id: "notes".to_string(),
        };
        let doc = Document::from_parsed(
            String::new(),
            ParsedDocument {
                headings: vec![heading(3), heading(9)],
                ..ParsedDocument::default()
            },
        );
        assert_eq!(doc.heading_line("notes"), Some(3));
        assert_eq!(doc.heading_line("missing"), None);
    }

    #[test]
    fn test_mark_splits_spans_without_changing_text() {
        let mut line = paragraph("hello brave world");
        assert!(line.mark(6..11, "c1"));

        assert_eq!(line.content(), "hello brave world");
        let spans = line.spans().unwrap();
        assert_eq!(spans_to_string(spans), "hello brave world");
        let marked: Vec<_> = spans.iter().filter(|s| s.has_comment("c1")).collect();
        assert_eq!(marked.len(), 1);
        assert_eq!(marked[0].text(), "brave");
    }

    #[test]
    fn test_mark_is_idempotent() {
        let mut line = paragraph("hello brave world");
        assert!(line.mark(6..11, "c1"));
        let once = line.clone();
        assert!(line.is_marked(6..11, "c1"));
        assert!(!line.mark(6..11, "c1"));
        assert_eq!(line, once);
    }

    #[test]
    fn test_mark_skips_decoration() {
        let mut line = RenderedLine::with_spans(
            "• item".to_string(),
            LineType::ListItem(1),
            vec![
                InlineSpan::decoration("• "),
                InlineSpan::new("item".to_string(), InlineStyle::default()),
            ],
        );
        line.mark(0..6, "c1");
        let spans = line.spans().unwrap();
        assert!(!spans[0].has_comment("c1"));
        assert!(spans[1].has_comment("c1"));
        assert!(line.is_marked(0..6, "c1"));
    }

    #[test]
    fn test_mark_plain_line_creates_span() {
        let mut line = RenderedLine::new("plain text".to_string(), LineType::Table);
        assert!(line.mark(0..5, "c9"));
        assert!(line.has_comment("c9"));
        assert_eq!(line.content(), "plain text");
    }

    #[test]
    fn test_overlapping_marks_keep_both_ids() {
        let mut line = paragraph("abcdefgh");
        line.mark(0..5, "a");
        line.mark(3..8, "b");
        let spans = line.spans().unwrap();
        let both: Vec<_> = spans
            .iter()
            .filter(|s| s.has_comment("a") && s.has_comment("b"))
            .collect();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].text(), "de");
    }

    #[test]
    fn test_text_columns_flags_decoration() {
        let line = RenderedLine::decoration("───".to_string(), LineType::HorizontalRule);
        assert!(line.text_columns().iter().all(|(_, readable)| !readable));
    }

    #[test]
    fn test_restyle_keeps_markers_on_columns() {
        let mut line = paragraph("let x = 1;");
        line.mark(4..5, "c1");
        let bold = InlineStyle {
            strong: true,
            ..InlineStyle::default()
        };
        line.restyle(vec![
            InlineSpan::new("let".to_string(), bold),
            InlineSpan::new(" x = 1;".to_string(), InlineStyle::default()),
        ]);
        assert_eq!(line.content(), "let x = 1;");
        let marked: String = line
            .spans()
            .unwrap()
            .iter()
            .filter(|s| s.has_comment("c1"))
            .map(InlineSpan::text)
            .collect();
        assert_eq!(marked, "x");
        assert!(line.spans().unwrap()[0].style().strong);
    }
}
