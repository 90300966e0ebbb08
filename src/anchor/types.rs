//! Anchor data types.

use serde::{Deserialize, Serialize};

/// Character offset into the normalized content text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub offset: usize,
}

/// Half-open `[start, end)` range of normalized content text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnchorRange {
    pub start: Position,
    pub end: Position,
}

impl AnchorRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self {
            start: Position { offset: start },
            end: Position { offset: end },
        }
    }

    pub const fn len(&self) -> usize {
        self.end.offset.saturating_sub(self.start.offset)
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn as_range(&self) -> std::ops::Range<usize> {
        self.start.offset..self.end.offset
    }
}

/// A submitted comment and the text it is attached to.
///
/// Anchors are immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentAnchor {
    /// Creation time in milliseconds, unique within a store
    pub id: String,
    /// Comment body
    pub text: String,
    /// Text that was selected when the comment was created
    pub quote: String,
    pub range: AnchorRange,
}

/// A caret position in rendered coordinates (character column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DocPoint {
    pub line: usize,
    pub column: usize,
}

impl DocPoint {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Screen region a selection was made in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// The post body
    Content,
    /// The table of contents
    Navigation,
    /// The comment sidebar
    Sidebar,
}

/// A text selection gesture, from where it started to where it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: DocPoint,
    pub focus: DocPoint,
    pub region: Region,
}

impl Selection {
    pub const fn is_collapsed(&self) -> bool {
        self.anchor.line == self.focus.line && self.anchor.column == self.focus.column
    }

    /// The selection with its ends in document order.
    pub fn ordered(&self) -> (DocPoint, DocPoint) {
        if self.anchor <= self.focus {
            (self.anchor, self.focus)
        } else {
            (self.focus, self.anchor)
        }
    }
}

/// A captured selection waiting for its comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSelection {
    pub quote: String,
    pub range: AnchorRange,
}

/// Why a selection was not captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The post view is not mounted
    Unsubscribed,
    /// Made outside the post body
    OutsideContent,
    /// Start and end are the same point
    Collapsed,
    /// Covers only whitespace or decoration
    EmptyRange,
}

/// Result of offering a selection to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Pending selection stored, waiting for a comment
    Selecting,
    Ignored(IgnoreReason),
}

/// Result of applying a highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Marked,
    /// Every covered span already carried the marker
    AlreadyPresent,
}
