use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::anchor::{
    AnchorStore, CaptureOutcome, ContentText, DocPoint, Region, Selection, reapply_all,
};
use crate::blog::{Post, load_posts_dir};
use crate::document::Document;
use crate::outline::{OutlineEntry, build_outline};
use crate::tracker::{HeadingTarget, ScrollSync};
use crate::ui::viewport::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// Which page is on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Screen {
    #[default]
    Index,
    Post,
}

/// A mouse selection in progress, in rendered cells.
///
/// Both points name the cell under the pointer; [`DragSelection::selection`]
/// turns them into carets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragSelection {
    pub anchor: DocPoint,
    pub focus: DocPoint,
    pub region: Region,
}

impl DragSelection {
    pub const fn new(point: DocPoint, region: Region) -> Self {
        Self {
            anchor: point,
            focus: point,
            region,
        }
    }

    pub fn is_click(&self) -> bool {
        self.anchor == self.focus
    }

    /// Caret selection covering every cell from anchor to focus.
    ///
    /// A click without movement stays collapsed.
    pub fn selection(&self) -> Selection {
        let (start, mut end) = if self.anchor <= self.focus {
            (self.anchor, self.focus)
        } else {
            (self.focus, self.anchor)
        };
        if !self.is_click() {
            end.column += 1;
        }
        Selection {
            anchor: start,
            focus: end,
            region: self.region,
        }
    }

    /// Whether the cell at `line`/`column` is inside the dragged area.
    pub fn covers(&self, line: usize, column: usize) -> bool {
        if self.region != Region::Content || self.is_click() {
            return false;
        }
        let (start, end) = if self.anchor <= self.focus {
            (self.anchor, self.focus)
        } else {
            (self.focus, self.anchor)
        };
        let point = DocPoint::new(line, column);
        start <= point && point <= end
    }
}

/// The complete application state.
///
/// All state lives here - no global or scattered state.
pub struct Model {
    pub screen: Screen,
    /// Posts listed on the index
    pub posts: Vec<Post>,
    /// File or directory the posts were loaded from; `None` for samples
    pub source_path: Option<PathBuf>,
    pub index_selected: usize,
    /// First post row shown on the index
    pub index_scroll_offset: usize,
    /// Index into `posts` of the open post
    pub current: Option<usize>,
    /// Rendered body of the open post
    pub document: Document,
    /// Normalized text of `document`, the coordinate space of comments
    pub content: ContentText,
    /// Outline of the open post, shown in the TOC
    pub outline: Vec<OutlineEntry>,
    pub tracker: ScrollSync,
    /// Comments per post id, kept for the whole session
    stores: HashMap<String, AnchorStore>,
    /// Comments of the open post that no longer match its text
    pub stale_comments: Vec<String>,
    /// Comment whose highlight was last jumped to
    pub focused_comment: Option<String>,
    pub viewport: Viewport,
    pub toc_visible: bool,
    /// Focus: true = TOC, false = post body
    pub toc_focused: bool,
    pub toc_selected: Option<usize>,
    pub toc_scroll_offset: usize,
    /// Whether the comment sidebar is pinned open
    pub comments_visible: bool,
    /// Comment being typed for the pending selection
    pub comment_draft: String,
    pub drag: Option<DragSelection>,
    pub watch_enabled: bool,
    /// Global config path shown in help
    pub config_global_path: Option<PathBuf>,
    /// Local override path shown in help
    pub config_local_path: Option<PathBuf>,
    pub help_visible: bool,
    toast: Option<Toast>,
    /// Optional maximum content wrap width in columns
    pub wrap_width: Option<u16>,
    pub should_quit: bool,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("screen", &self.screen)
            .field("posts", &self.posts.len())
            .field("current", &self.current)
            .field("active_section", &self.tracker.active())
            .finish_non_exhaustive()
    }
}

impl Model {
    /// Create a model showing `posts` on the index.
    pub fn new(posts: Vec<Post>, terminal_size: (u16, u16)) -> Self {
        Self {
            posts,
            viewport: Viewport::new(terminal_size.0, terminal_size.1.saturating_sub(1), 0),
            ..Self::default()
        }
    }

    pub fn current_post(&self) -> Option<&Post> {
        self.current.and_then(|idx| self.posts.get(idx))
    }

    /// Comments of the open post, if one is open.
    pub fn store(&self) -> Option<&AnchorStore> {
        self.current_post()
            .and_then(|post| self.stores.get(&post.id))
    }

    pub(super) fn store_mut(&mut self) -> Option<&mut AnchorStore> {
        let id = self.current_post()?.id.clone();
        Some(self.stores.entry(id).or_default())
    }

    /// Offer a finished selection to the open post's comments.
    pub(super) fn capture(&mut self, selection: &Selection) -> Option<CaptureOutcome> {
        let id = self.current_post()?.id.clone();
        let store = self.stores.entry(id).or_default();
        Some(store.capture(selection, &self.content))
    }

    /// Whether a selection is waiting for its comment.
    pub fn is_composing(&self) -> bool {
        self.store().is_some_and(AnchorStore::is_selecting)
    }

    /// The comment sidebar opens while composing or when pinned.
    pub fn sidebar_visible(&self) -> bool {
        self.screen == Screen::Post && (self.comments_visible || self.is_composing())
    }

    /// Width posts are laid out at.
    pub fn layout_width(&self) -> u16 {
        let terminal_width = crate::ui::document_content_width(
            self.viewport.width(),
            self.toc_visible,
            self.sidebar_visible(),
        );
        match self.wrap_width {
            Some(w) if w > 0 => terminal_width.min(w),
            _ => terminal_width,
        }
    }

    /// Mount the post at `index`: render it, watch its headings and start
    /// accepting selections.
    pub fn open_post(&mut self, index: usize) {
        if index >= self.posts.len() {
            return;
        }
        let _scope = crate::perf::scope("app.open_post");
        if self.current.is_some() {
            self.close_post();
        }
        let post = &self.posts[index];
        tracing::debug!(id = %post.id, "opening post");
        self.outline = build_outline(&post.content);
        self.current = Some(index);
        self.index_selected = index;
        self.screen = Screen::Post;
        self.focused_comment = None;
        if let Some(store) = self.store_mut() {
            store.subscribe();
        }
        self.render_current();
        self.viewport.go_to_top();
        self.toc_selected = None;
        self.toc_scroll_offset = 0;
        self.install_tracker();
    }

    /// Unmount the open post and return to the index.
    pub fn close_post(&mut self) {
        self.tracker.teardown();
        if let Some(store) = self.store_mut() {
            store.unsubscribe();
        }
        self.current = None;
        self.screen = Screen::Index;
        self.document = Document::empty();
        self.content = ContentText::default();
        self.outline.clear();
        self.stale_comments.clear();
        self.focused_comment = None;
        self.comment_draft.clear();
        self.drag = None;
        self.toc_focused = false;
        self.viewport.set_total_lines(0);
    }

    /// Render the open post at the current layout width and re-apply its
    /// comment highlights.
    fn render_current(&mut self) {
        let Some(post) = self.current_post() else {
            return;
        };
        let width = self.layout_width();
        let document = Document::parse_with_layout(&post.content, width)
            .with_context(|| format!("Failed to render post {}", post.id));
        self.document = match document {
            Ok(document) => document,
            Err(err) => {
                self.show_toast(ToastLevel::Error, format!("{err:#}"));
                Document::empty()
            }
        };
        self.content = ContentText::from_document(&self.document);
        self.viewport.set_total_lines(self.document.line_count());
        self.reapply_comments();
    }

    fn reapply_comments(&mut self) {
        self.stale_comments.clear();
        let store = self
            .current
            .and_then(|idx| self.posts.get(idx))
            .and_then(|post| self.stores.get(&post.id));
        let Some(store) = store else {
            return;
        };
        let stale = reapply_all(&mut self.document, &self.content, store.anchors());
        for err in &stale {
            tracing::warn!(%err, "skipping comment highlight");
            crate::perf::log_event("anchor.stale", err.to_string());
            self.stale_comments.push(err.id().to_string());
        }
        if !stale.is_empty() {
            let (noun, verb) = if stale.len() == 1 {
                ("comment", "matches")
            } else {
                ("comments", "match")
            };
            self.show_toast(
                ToastLevel::Info,
                format!("{} {noun} no longer {verb} the post", stale.len()),
            );
        }
    }

    fn install_tracker(&mut self) {
        self.tracker
            .install(HeadingTarget::from_document(&self.document));
        self.sync_active_section();
    }

    /// Feed the viewport to the tracker and follow the active section in
    /// the TOC unless the reader is driving the TOC.
    pub(super) fn sync_active_section(&mut self) {
        self.tracker.sync(&self.viewport);
        if self.toc_focused {
            return;
        }
        let Some(active) = self.tracker.active() else {
            return;
        };
        if let Some(idx) = self.outline.iter().position(|entry| entry.id == active) {
            self.toc_selected = Some(idx);
            self.keep_toc_selection_visible();
        }
    }

    pub(super) fn keep_toc_selection_visible(&mut self) {
        let Some(selected) = self.toc_selected else {
            return;
        };
        let rows = self.toc_visible_rows().max(1);
        if selected < self.toc_scroll_offset {
            self.toc_scroll_offset = selected;
        } else if selected >= self.toc_scroll_offset + rows {
            self.toc_scroll_offset = selected + 1 - rows;
        }
        self.toc_scroll_offset = self.toc_scroll_offset.min(self.max_toc_scroll_offset());
    }

    pub(super) const fn toc_visible_rows(&self) -> usize {
        // The TOC spans the viewport rows minus its top and bottom border.
        self.viewport.height().saturating_sub(2) as usize
    }

    pub(super) fn max_toc_scroll_offset(&self) -> usize {
        self.outline.len().saturating_sub(self.toc_visible_rows())
    }

    /// Post rows that fit on the index.
    pub(super) fn index_visible_rows(&self) -> usize {
        (self.viewport.height().saturating_sub(2) / crate::ui::INDEX_ROW_HEIGHT).max(1) as usize
    }

    pub(super) fn keep_index_selection_visible(&mut self) {
        let rows = self.index_visible_rows();
        if self.index_selected < self.index_scroll_offset {
            self.index_scroll_offset = self.index_selected;
        } else if self.index_selected >= self.index_scroll_offset + rows {
            self.index_scroll_offset = self.index_selected + 1 - rows;
        }
    }

    /// Re-render the open post after the layout width changed, keeping the
    /// text at the top of the viewport in place.
    pub(super) fn reflow_layout(&mut self) {
        if self.current.is_none() {
            return;
        }
        let _scope = crate::perf::scope("app.reflow_layout");
        let top = self
            .content
            .offset_at(DocPoint::new(self.viewport.offset(), 0));
        self.drag = None;
        self.render_current();
        let line = self
            .content
            .points(top..top + 1)
            .first()
            .map_or(self.viewport.offset(), |point| point.line);
        self.viewport.go_to_line(line);
        self.install_tracker();
        crate::perf::log_event(
            "layout.reflow",
            format!("width={} lines={}", self.layout_width(), self.document.line_count()),
        );
    }

    /// Highlight the open post's code blocks around the viewport.
    pub fn ensure_highlight_overscan(&mut self) {
        let height = self.viewport.height() as usize;
        let extra = height * 2;
        let start = self.viewport.offset().saturating_sub(extra);
        let end = (self.viewport.offset() + height + extra).min(self.document.line_count());
        self.document.ensure_highlight_for_range(start..end);
    }

    /// Load posts again from `source_path`, keeping comments and the open
    /// post (matched by id).
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read.
    pub(super) fn reload_from_disk(&mut self) -> Result<()> {
        let Some(source) = self.source_path.clone() else {
            return Ok(());
        };
        let posts = load_posts(&source)?;
        let open_id = self.current_post().map(|post| post.id.clone());
        let offset = self.viewport.offset();
        self.posts = posts;
        self.index_selected = self
            .index_selected
            .min(self.posts.len().saturating_sub(1));

        let Some(open_id) = open_id else {
            return Ok(());
        };
        match self.posts.iter().position(|post| post.id == open_id) {
            Some(idx) => {
                self.current = Some(idx);
                self.outline = build_outline(&self.posts[idx].content);
                self.render_current();
                self.viewport.go_to_line(offset);
                self.toc_selected = self.toc_selected.filter(|i| *i < self.outline.len());
                self.install_tracker();
            }
            None => {
                self.close_post();
                self.show_toast(ToastLevel::Warning, format!("Post {open_id} was removed"));
            }
        }
        Ok(())
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + Duration::from_secs(4),
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }
}

/// Posts from a directory, or the single post of a markdown file.
///
/// # Errors
///
/// Returns an error if the path cannot be read.
pub fn load_posts(path: &Path) -> Result<Vec<Post>> {
    if path.is_dir() {
        load_posts_dir(path)
    } else {
        Ok(vec![Post::from_file(path)?])
    }
}

// Implement Default for Model to allow std::mem::take
impl Default for Model {
    fn default() -> Self {
        Self {
            screen: Screen::Index,
            posts: Vec::new(),
            source_path: None,
            index_selected: 0,
            index_scroll_offset: 0,
            current: None,
            document: Document::empty(),
            content: ContentText::default(),
            outline: Vec::new(),
            tracker: ScrollSync::default(),
            stores: HashMap::new(),
            stale_comments: Vec::new(),
            focused_comment: None,
            viewport: Viewport::new(80, 24, 0),
            toc_visible: true,
            toc_focused: false,
            toc_selected: None,
            toc_scroll_offset: 0,
            comments_visible: false,
            comment_draft: String::new(),
            drag: None,
            watch_enabled: false,
            config_global_path: None,
            config_local_path: None,
            help_visible: false,
            toast: None,
            wrap_width: None,
            should_quit: false,
        }
    }
}
