//! Selection capture and comment storage.

use std::time::{SystemTime, UNIX_EPOCH};

use super::content::ContentText;
use super::types::{
    AnchorRange, CaptureOutcome, CommentAnchor, IgnoreReason, PendingSelection, Region, Selection,
};

/// Comments of one post plus the selection currently being commented on.
///
/// The store only accepts selections while subscribed, which the post view
/// does when it mounts. At most one selection is pending; a new capture
/// replaces it.
#[derive(Debug, Clone, Default)]
pub struct AnchorStore {
    anchors: Vec<CommentAnchor>,
    pending: Option<PendingSelection>,
    subscribed: bool,
    last_id: u64,
}

impl AnchorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start accepting selections.
    pub const fn subscribe(&mut self) {
        self.subscribed = true;
    }

    /// Stop accepting selections and drop any pending one.
    pub fn unsubscribe(&mut self) {
        self.subscribed = false;
        self.pending = None;
    }

    pub const fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// Offer a finished selection gesture.
    ///
    /// Accepted selections become the pending selection; the quote is the
    /// normalized text between the two carets.
    pub fn capture(&mut self, selection: &Selection, content: &ContentText) -> CaptureOutcome {
        let outcome = self.try_capture(selection, content);
        if let CaptureOutcome::Ignored(reason) = outcome {
            tracing::debug!(?reason, ?selection, "selection ignored");
        }
        outcome
    }

    fn try_capture(&mut self, selection: &Selection, content: &ContentText) -> CaptureOutcome {
        if !self.subscribed {
            return CaptureOutcome::Ignored(IgnoreReason::Unsubscribed);
        }
        if selection.region != Region::Content {
            return CaptureOutcome::Ignored(IgnoreReason::OutsideContent);
        }
        if selection.is_collapsed() {
            return CaptureOutcome::Ignored(IgnoreReason::Collapsed);
        }
        let (start, end) = selection.ordered();
        let range = content.range_between(start, end);
        let Some(quote) = content.slice(range.clone()).filter(|q| !q.is_empty()) else {
            return CaptureOutcome::Ignored(IgnoreReason::EmptyRange);
        };
        self.pending = Some(PendingSelection {
            quote,
            range: AnchorRange::new(range.start, range.end),
        });
        CaptureOutcome::Selecting
    }

    pub const fn pending(&self) -> Option<&PendingSelection> {
        self.pending.as_ref()
    }

    pub const fn is_selecting(&self) -> bool {
        self.pending.is_some()
    }

    /// Attach `text` to the pending selection.
    ///
    /// Returns the new anchor, or `None` (leaving everything untouched) if
    /// `text` is blank or nothing is pending.
    pub fn submit(&mut self, text: &str) -> Option<&CommentAnchor> {
        self.submit_at(text, now_millis())
    }

    /// [`submit`](Self::submit) with an explicit clock reading.
    ///
    /// Ids are strictly increasing even if the clock is not.
    pub fn submit_at(&mut self, text: &str, now_ms: u64) -> Option<&CommentAnchor> {
        if text.trim().is_empty() {
            return None;
        }
        let pending = self.pending.take_if(|p| !p.range.is_empty())?;
        let id = now_ms.max(self.last_id + 1);
        self.last_id = id;
        self.anchors.push(CommentAnchor {
            id: id.to_string(),
            text: text.to_string(),
            quote: pending.quote,
            range: pending.range,
        });
        tracing::debug!(id, "comment added");
        self.anchors.last()
    }

    /// Abandon the pending selection.
    pub fn dismiss(&mut self) {
        self.pending = None;
    }

    /// All comments in submission order.
    pub fn anchors(&self) -> &[CommentAnchor] {
        &self.anchors
    }

    pub fn get(&self, id: &str) -> Option<&CommentAnchor> {
        self.anchors.iter().find(|anchor| anchor.id == id)
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::types::DocPoint;
    use crate::document::Document;

    fn content() -> ContentText {
        ContentText::from_document(&Document::parse("alpha beta gamma").unwrap())
    }

    fn select(from: usize, to: usize) -> Selection {
        Selection {
            anchor: DocPoint::new(0, from),
            focus: DocPoint::new(0, to),
            region: Region::Content,
        }
    }

    fn subscribed() -> AnchorStore {
        let mut store = AnchorStore::new();
        store.subscribe();
        store
    }

    #[test]
    fn test_capture_sets_pending_selection() {
        let mut store = subscribed();
        assert_eq!(store.capture(&select(6, 10), &content()), CaptureOutcome::Selecting);
        let pending = store.pending().unwrap();
        assert_eq!(pending.quote, "beta");
        assert_eq!(pending.range, AnchorRange::new(6, 10));
    }

    #[test]
    fn test_capture_requires_subscription() {
        let mut store = AnchorStore::new();
        assert_eq!(
            store.capture(&select(6, 10), &content()),
            CaptureOutcome::Ignored(IgnoreReason::Unsubscribed)
        );
        assert!(!store.is_selecting());
    }

    #[test]
    fn test_capture_outside_content_is_ignored() {
        let mut store = subscribed();
        let mut selection = select(6, 10);
        selection.region = Region::Navigation;
        assert_eq!(
            store.capture(&selection, &content()),
            CaptureOutcome::Ignored(IgnoreReason::OutsideContent)
        );
        selection.region = Region::Sidebar;
        assert_eq!(
            store.capture(&selection, &content()),
            CaptureOutcome::Ignored(IgnoreReason::OutsideContent)
        );
    }

    #[test]
    fn test_collapsed_selection_is_ignored() {
        let mut store = subscribed();
        assert_eq!(
            store.capture(&select(4, 4), &content()),
            CaptureOutcome::Ignored(IgnoreReason::Collapsed)
        );
    }

    #[test]
    fn test_whitespace_only_selection_is_ignored() {
        let mut store = subscribed();
        assert_eq!(
            store.capture(&select(5, 6), &content()),
            CaptureOutcome::Ignored(IgnoreReason::EmptyRange)
        );
    }

    #[test]
    fn test_ignored_capture_keeps_pending() {
        let mut store = subscribed();
        store.capture(&select(6, 10), &content());
        store.capture(&select(3, 3), &content());
        assert_eq!(store.pending().unwrap().quote, "beta");
    }

    #[test]
    fn test_recapture_replaces_pending() {
        let mut store = subscribed();
        store.capture(&select(6, 10), &content());
        store.capture(&select(0, 5), &content());
        assert_eq!(store.pending().unwrap().quote, "alpha");
    }

    #[test]
    fn test_submit_appends_one_anchor_and_clears_pending() {
        let mut store = subscribed();
        store.capture(&select(6, 10), &content());
        let anchor = store.submit_at("Needs a source", 1_000).cloned().unwrap();
        assert_eq!(anchor.text, "Needs a source");
        assert_eq!(anchor.quote, "beta");
        assert_eq!(anchor.id, "1000");
        assert_eq!(store.anchors().len(), 1);
        assert!(!store.is_selecting());
    }

    #[test]
    fn test_blank_submit_is_noop() {
        let mut store = subscribed();
        store.capture(&select(6, 10), &content());
        assert!(store.submit("   \n").is_none());
        assert!(store.anchors().is_empty());
        assert!(store.is_selecting());
    }

    #[test]
    fn test_submit_without_selection_is_noop() {
        let mut store = subscribed();
        assert!(store.submit("orphan").is_none());
        assert!(store.anchors().is_empty());
    }

    #[test]
    fn test_dismiss_discards_selection() {
        let mut store = subscribed();
        store.capture(&select(6, 10), &content());
        store.dismiss();
        assert!(!store.is_selecting());
        assert!(store.submit("late").is_none());
    }

    #[test]
    fn test_unsubscribe_discards_selection() {
        let mut store = subscribed();
        store.capture(&select(6, 10), &content());
        store.unsubscribe();
        assert!(store.pending().is_none());
        assert!(!store.is_subscribed());
    }

    #[test]
    fn test_ids_strictly_increase() {
        let mut store = subscribed();
        for text in ["one", "two", "three"] {
            store.capture(&select(0, 5), &content());
            store.submit_at(text, 500);
        }
        let ids: Vec<u64> = store
            .anchors()
            .iter()
            .map(|a| a.id.parse().unwrap())
            .collect();
        assert_eq!(ids, vec![500, 501, 502]);
    }

    #[test]
    fn test_same_range_twice_keeps_both() {
        let mut store = subscribed();
        store.capture(&select(6, 10), &content());
        store.submit("first");
        store.capture(&select(6, 10), &content());
        store.submit("second");
        assert_eq!(store.anchors().len(), 2);
        let texts: Vec<&str> = store.anchors().iter().map(|a| a.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
        assert!(store.get(&store.anchors()[1].id).is_some());
    }
}
