//! Normalized content text of a rendered document.

use std::ops::Range;

use super::types::DocPoint;
use crate::document::Document;

/// The readable text of a [`Document`] with whitespace collapsed.
///
/// Decoration spans are skipped, line breaks count as whitespace unless the
/// line continues a wrapped word, every whitespace run becomes one space and
/// leading/trailing whitespace is dropped. Text cut off to fit the width is
/// included and maps to the last visible cell before the cut. Offsets into
/// this text therefore do not change when the same post is laid out at
/// another width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentText {
    text: String,
    /// Rendered position of each character of `text`
    points: Vec<DocPoint>,
}

impl ContentText {
    pub fn from_document(document: &Document) -> Self {
        let mut content = Self::default();
        // Position of the whitespace run waiting to be emitted
        let mut pending_space: Option<DocPoint> = None;

        for (line_idx, line) in document.lines().iter().enumerate() {
            if pending_space.is_none() && !line.is_joined() {
                pending_space = content
                    .points
                    .last()
                    .map(|last| DocPoint::new(last.line, last.column + 1));
            }
            let mut clips = line.clipped().iter().peekable();
            for (column, (ch, readable)) in line.text_columns().into_iter().enumerate() {
                let point = DocPoint::new(line_idx, column);
                if readable {
                    content.push(ch, point, &mut pending_space);
                }
                while let Some(clip) = clips.next_if(|clip| clip.after == column) {
                    for hidden in clip.text.chars() {
                        content.push(hidden, point, &mut pending_space);
                    }
                }
            }
        }
        content
    }

    fn push(&mut self, ch: char, point: DocPoint, pending_space: &mut Option<DocPoint>) {
        if ch.is_whitespace() {
            pending_space.get_or_insert(point);
            return;
        }
        if let Some(space) = pending_space.take() {
            if !self.text.is_empty() {
                self.text.push(' ');
                self.points.push(space);
            }
        }
        self.text.push(ch);
        self.points.push(point);
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Text of the character range `range`, if it is in bounds.
    pub fn slice(&self, range: Range<usize>) -> Option<String> {
        if range.start > range.end || range.end > self.len() {
            return None;
        }
        Some(
            self.text
                .chars()
                .skip(range.start)
                .take(range.end - range.start)
                .collect(),
        )
    }

    /// Rendered positions of the characters in `range`.
    pub fn points(&self, range: Range<usize>) -> &[DocPoint] {
        let end = range.end.min(self.len());
        &self.points[range.start.min(end)..end]
    }

    /// Number of characters rendered before the caret at `point`.
    pub fn offset_at(&self, point: DocPoint) -> usize {
        self.points.partition_point(|p| *p < point)
    }

    /// Normalized range between two carets, with surrounding whitespace
    /// trimmed off.
    pub fn range_between(&self, start: DocPoint, end: DocPoint) -> Range<usize> {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        let mut from = self.offset_at(start);
        let mut to = self.offset_at(end).max(from);

        let slice: Vec<char> = self.text.chars().skip(from).take(to - from).collect();
        let leading = slice.iter().take_while(|c| c.is_whitespace()).count();
        let trailing = slice[leading..]
            .iter()
            .rev()
            .take_while(|c| c.is_whitespace())
            .count();
        from += leading;
        to -= trailing;
        from..to
    }
}
