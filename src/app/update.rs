use crate::anchor::{
    Applied, CaptureOutcome, DocPoint, IgnoreReason, Region, apply_highlight, highlight_lines,
};

use super::model::{DragSelection, Model, Screen, ToastLevel};

/// All possible events and actions in the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Index
    IndexUp,
    IndexDown,
    OpenSelected,
    OpenPost(usize),
    BackToIndex,

    // Post navigation
    ScrollUp(usize),
    ScrollDown(usize),
    PageUp,
    PageDown,
    HalfPageUp,
    HalfPageDown,
    GoToTop,
    GoToBottom,
    AnimationTick,

    // Table of contents
    ToggleToc,
    ToggleTocFocus,
    TocUp,
    TocDown,
    TocSelect,
    TocClick(usize),
    TocScrollUp,
    TocScrollDown,

    // Selection and comments
    StartSelection(DocPoint, Region),
    UpdateSelection(DocPoint),
    EndSelection(DocPoint),
    ClearSelection,
    CommentInput(char),
    CommentBackspace,
    SubmitComment,
    DismissComment,
    ToggleComments,
    NextComment,

    // Application
    ToggleWatch,
    FileChanged,
    ForceReload,
    ToggleHelp,
    HideHelp,
    Resize(u16, u16),
    Redraw,
    Quit,
}

/// Update the model in response to a message.
///
/// This is the core state transition function. I/O such as reloading posts
/// or creating the file watcher happens afterwards in the event loop.
#[allow(clippy::too_many_lines)]
pub fn update(mut model: Model, msg: Message) -> Model {
    let width_before = model.layout_width();
    let offset_before = model.viewport.offset();

    match msg {
        Message::IndexUp => {
            model.index_selected = model.index_selected.saturating_sub(1);
            model.keep_index_selection_visible();
        }
        Message::IndexDown => {
            let last = model.posts.len().saturating_sub(1);
            model.index_selected = (model.index_selected + 1).min(last);
            model.keep_index_selection_visible();
        }
        Message::OpenSelected => {
            let idx = model.index_selected;
            model.open_post(idx);
        }
        Message::OpenPost(idx) => model.open_post(idx),
        Message::BackToIndex => {
            model.close_post();
            model.keep_index_selection_visible();
        }

        Message::ScrollUp(n) => model.viewport.scroll_up(n),
        Message::ScrollDown(n) => model.viewport.scroll_down(n),
        Message::PageUp => model.viewport.page_up(),
        Message::PageDown => model.viewport.page_down(),
        Message::HalfPageUp => model.viewport.half_page_up(),
        Message::HalfPageDown => model.viewport.half_page_down(),
        Message::GoToTop => model.viewport.go_to_top(),
        Message::GoToBottom => model.viewport.go_to_bottom(),
        Message::AnimationTick => {
            model.viewport.tick_animation();
        }

        Message::ToggleToc => {
            model.toc_visible = !model.toc_visible;
            if !model.toc_visible {
                model.toc_focused = false;
            }
        }
        Message::ToggleTocFocus => {
            if model.toc_visible && !model.outline.is_empty() {
                model.toc_focused = !model.toc_focused;
                if model.toc_focused && model.toc_selected.is_none() {
                    model.toc_selected = Some(0);
                }
            }
        }
        Message::TocUp => {
            if let Some(sel) = model.toc_selected {
                model.toc_selected = Some(sel.saturating_sub(1));
                model.keep_toc_selection_visible();
            }
        }
        Message::TocDown => {
            let last = model.outline.len().saturating_sub(1);
            model.toc_selected = Some(model.toc_selected.map_or(0, |sel| (sel + 1).min(last)));
            model.keep_toc_selection_visible();
        }
        Message::TocSelect => {
            if let Some(idx) = model.toc_selected {
                scroll_to_section(&mut model, idx);
            }
        }
        Message::TocClick(idx) => {
            model.drag = None;
            if idx < model.outline.len() {
                model.toc_selected = Some(idx);
                scroll_to_section(&mut model, idx);
            }
        }
        Message::TocScrollUp => {
            model.toc_scroll_offset = model.toc_scroll_offset.saturating_sub(1);
        }
        Message::TocScrollDown => {
            model.toc_scroll_offset =
                (model.toc_scroll_offset + 1).min(model.max_toc_scroll_offset());
        }

        Message::StartSelection(point, region) => {
            model.drag = Some(DragSelection::new(point, region));
        }
        Message::UpdateSelection(point) => {
            if let Some(drag) = model.drag.as_mut() {
                drag.focus = point;
            }
        }
        Message::EndSelection(point) => {
            if let Some(mut drag) = model.drag.take() {
                drag.focus = point;
                capture_selection(&mut model, drag);
            }
        }
        Message::ClearSelection => model.drag = None,
        Message::CommentInput(ch) => {
            if model.is_composing() {
                model.comment_draft.push(ch);
            }
        }
        Message::CommentBackspace => {
            model.comment_draft.pop();
        }
        Message::SubmitComment => submit_comment(&mut model),
        Message::DismissComment => {
            if let Some(store) = model.store_mut() {
                store.dismiss();
            }
            model.comment_draft.clear();
        }
        Message::ToggleComments => {
            if model.screen == Screen::Post {
                model.comments_visible = !model.comments_visible;
            }
        }
        Message::NextComment => jump_to_next_comment(&mut model),

        Message::ToggleWatch => {
            model.watch_enabled = !model.watch_enabled;
        }
        Message::ToggleHelp => model.help_visible = !model.help_visible,
        Message::HideHelp => model.help_visible = false,
        Message::Resize(width, height) => {
            // Reserve one row for the status bar
            model.viewport.resize(width, height.saturating_sub(1));
            model.toc_scroll_offset = model.toc_scroll_offset.min(model.max_toc_scroll_offset());
            model.keep_index_selection_visible();
        }
        Message::Quit => model.should_quit = true,
        // Reloads happen in the event loop; redraw only repaints.
        Message::FileChanged | Message::ForceReload | Message::Redraw => {}
    }

    if model.layout_width() != width_before {
        model.reflow_layout();
    } else if model.screen == Screen::Post && model.viewport.offset() != offset_before {
        model.sync_active_section();
    }

    model
}

/// Start a smooth scroll that brings outline entry `idx` into the trigger
/// band. Entries without a rendered heading are skipped.
fn scroll_to_section(model: &mut Model, idx: usize) {
    let Some(entry) = model.outline.get(idx) else {
        return;
    };
    let Some(line) = model.document.heading_line(&entry.id) else {
        tracing::debug!(id = %entry.id, "no rendered heading for outline entry");
        return;
    };
    let offset = model
        .tracker
        .band()
        .offset_for(line, model.viewport.height());
    model.viewport.animate_to(offset);
    model.toc_focused = false;
}

fn capture_selection(model: &mut Model, drag: DragSelection) {
    match model.capture(&drag.selection()) {
        Some(CaptureOutcome::Selecting) => model.comment_draft.clear(),
        Some(CaptureOutcome::Ignored(IgnoreReason::EmptyRange)) => {
            model.show_toast(ToastLevel::Info, "Nothing to comment on in that selection");
        }
        Some(CaptureOutcome::Ignored(_)) | None => {}
    }
}

fn submit_comment(model: &mut Model) {
    let draft = std::mem::take(&mut model.comment_draft);
    let Some(anchor) = model
        .store_mut()
        .and_then(|store| store.submit(&draft))
        .cloned()
    else {
        model.comment_draft = draft;
        return;
    };
    match apply_highlight(&mut model.document, &model.content, &anchor) {
        Ok(Applied::Marked | Applied::AlreadyPresent) => {
            model.focused_comment = Some(anchor.id);
            model.show_toast(ToastLevel::Info, "Comment added");
        }
        Err(err) => {
            tracing::warn!(%err, "skipping comment highlight");
            model.stale_comments.push(anchor.id);
            model.show_toast(ToastLevel::Info, err.to_string());
        }
    }
}

/// Scroll to the highlight of the comment after the focused one.
fn jump_to_next_comment(model: &mut Model) {
    let Some(anchors) = model.store().map(|store| store.anchors().to_vec()) else {
        return;
    };
    let start = model
        .focused_comment
        .as_ref()
        .and_then(|id| anchors.iter().position(|anchor| &anchor.id == id))
        .map_or(0, |pos| pos + 1);

    let next = (0..anchors.len())
        .map(|step| &anchors[(start + step) % anchors.len()])
        .find_map(|anchor| {
            highlight_lines(&model.document, &anchor.id).map(|lines| (anchor.id.clone(), lines))
        });
    match next {
        Some((id, lines)) => {
            let offset = model
                .tracker
                .band()
                .offset_for(lines.start, model.viewport.height());
            model.viewport.animate_to(offset);
            model.focused_comment = Some(id);
        }
        None => model.show_toast(ToastLevel::Info, "No highlighted comments"),
    }
}
