//! Applying comment highlights to a rendered document.

use std::collections::BTreeMap;
use std::ops::Range;

use super::content::ContentText;
use super::error::AnchorError;
use super::types::{Applied, CommentAnchor};
use crate::document::Document;

/// Mark the text covered by `anchor` in `document`.
///
/// `content` must be the [`ContentText`] of `document`. Applying an anchor
/// whose text is already marked changes nothing.
///
/// # Errors
///
/// Returns [`AnchorError::Stale`] if the range is outside the text or the
/// text there is no longer the anchor's quote.
pub fn apply_highlight(
    document: &mut Document,
    content: &ContentText,
    anchor: &CommentAnchor,
) -> Result<Applied, AnchorError> {
    let range = anchor.range.as_range();
    let matches = !range.is_empty()
        && content
            .slice(range.clone())
            .is_some_and(|text| text == anchor.quote);
    if !matches {
        return Err(AnchorError::Stale {
            id: anchor.id.clone(),
        });
    }

    let columns = columns_by_line(content, range);
    let lines = document.lines_mut();
    let already = columns.iter().all(|(line, cols)| {
        lines
            .get(*line)
            .is_some_and(|l| l.is_marked(cols.clone(), &anchor.id))
    });
    if already {
        return Ok(Applied::AlreadyPresent);
    }

    for (line, cols) in columns {
        if let Some(rendered) = lines.get_mut(line) {
            rendered.mark(cols, &anchor.id);
        }
    }
    Ok(Applied::Marked)
}

/// Apply every anchor in order, returning the ones that went stale.
pub fn reapply_all(
    document: &mut Document,
    content: &ContentText,
    anchors: &[CommentAnchor],
) -> Vec<AnchorError> {
    anchors
        .iter()
        .filter_map(|anchor| apply_highlight(document, content, anchor).err())
        .collect()
}

/// Rendered lines carrying the marker of comment `id`.
pub fn highlight_lines(document: &Document, id: &str) -> Option<Range<usize>> {
    let lines = document.lines();
    let first = lines.iter().position(|line| line.has_comment(id))?;
    let last = lines.iter().rposition(|line| line.has_comment(id))?;
    Some(first..last + 1)
}

/// Character columns covered on each rendered line.
fn columns_by_line(content: &ContentText, range: Range<usize>) -> BTreeMap<usize, Range<usize>> {
    let mut columns: BTreeMap<usize, Range<usize>> = BTreeMap::new();
    for point in content.points(range) {
        columns
            .entry(point.line)
            .and_modify(|cols| {
                cols.start = cols.start.min(point.column);
                cols.end = cols.end.max(point.column + 1);
            })
            .or_insert(point.column..point.column + 1);
    }
    columns
}
