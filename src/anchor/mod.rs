//! Comment anchors.
//!
//! A comment is attached to a stretch of a post's text. The reader selects
//! text in the post body, the [`AnchorStore`] captures it as a pending
//! selection, and submitting a comment turns it into a [`CommentAnchor`].
//!
//! Anchors do not point at rendered lines. They store character offsets into
//! the post's [`ContentText`], which ignores layout chrome and collapses
//! whitespace, together with the quoted text. That keeps them valid when the
//! post is re-rendered at another width; if the quoted text itself changes
//! the anchor is reported stale instead of highlighting the wrong words.
//!
//! Highlights are comment ids attached to the inline spans of a
//! [`Document`](crate::document::Document); the text of a line never changes.

mod content;
mod error;
mod highlight;
mod store;
mod types;

pub use content::ContentText;
pub use error::AnchorError;
pub use highlight::{apply_highlight, highlight_lines, reapply_all};
pub use store::AnchorStore;
pub use types::{
    AnchorRange, Applied, CaptureOutcome, CommentAnchor, DocPoint, IgnoreReason,
    PendingSelection, Position, Region, Selection,
};
