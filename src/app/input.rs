use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;
use unicode_width::UnicodeWidthChar;

use crate::anchor::{DocPoint, Region};
use crate::app::{App, Message, Model, Screen};

use super::event_loop::ResizeDebouncer;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) => Self::handle_key(*key, model),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Resize(w, h) => {
                crate::perf::log_event("event.resize.queue", format!("width={w} height={h}"));
                resize_debouncer.queue(*w, *h, now_ms);
                None
            }
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return Some(Message::HideHelp);
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Message::Quit);
        }
        match model.screen {
            Screen::Index => index_key(key),
            Screen::Post if model.is_composing() => compose_key(key),
            Screen::Post if model.toc_focused && model.toc_visible => toc_key(key),
            Screen::Post => post_key(key, model),
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return None;
        }
        match model.screen {
            Screen::Index => index_mouse(mouse, model),
            Screen::Post => post_mouse(mouse, model),
        }
    }
}

fn index_key(key: KeyEvent) -> Option<Message> {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => Some(Message::IndexDown),
        KeyCode::Char('k') | KeyCode::Up => Some(Message::IndexUp),
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => Some(Message::OpenSelected),
        KeyCode::Char('w') => Some(Message::ToggleWatch),
        KeyCode::Char('r') => Some(Message::ForceReload),
        KeyCode::Char('?') | KeyCode::F(1) => Some(Message::ToggleHelp),
        KeyCode::Char('q') | KeyCode::Esc => Some(Message::Quit),
        _ => None,
    }
}

/// Keys while a selection waits for its comment: text goes to the draft.
fn compose_key(key: KeyEvent) -> Option<Message> {
    match key.code {
        KeyCode::Esc => Some(Message::DismissComment),
        KeyCode::Enter => Some(Message::SubmitComment),
        KeyCode::Backspace => Some(Message::CommentBackspace),
        KeyCode::Up => Some(Message::ScrollUp(1)),
        KeyCode::Down => Some(Message::ScrollDown(1)),
        KeyCode::PageUp => Some(Message::PageUp),
        KeyCode::PageDown => Some(Message::PageDown),
        KeyCode::Char(c)
            if !key.modifiers.contains(KeyModifiers::CONTROL)
                && !key.modifiers.contains(KeyModifiers::ALT) =>
        {
            Some(Message::CommentInput(c))
        }
        _ => None,
    }
}

fn toc_key(key: KeyEvent) -> Option<Message> {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => Some(Message::TocDown),
        KeyCode::Char('k') | KeyCode::Up => Some(Message::TocUp),
        KeyCode::Enter | KeyCode::Char(' ') => Some(Message::TocSelect),
        KeyCode::Tab | KeyCode::Esc => Some(Message::ToggleTocFocus),
        KeyCode::Char('t') => Some(Message::ToggleToc),
        KeyCode::Char('?') | KeyCode::F(1) => Some(Message::ToggleHelp),
        KeyCode::Char('q') => Some(Message::Quit),
        _ => None,
    }
}

fn post_key(key: KeyEvent, model: &Model) -> Option<Message> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        // Navigation
        KeyCode::Char('j') | KeyCode::Down => Some(Message::ScrollDown(1)),
        KeyCode::Char('k') | KeyCode::Up => Some(Message::ScrollUp(1)),
        KeyCode::Char(' ') | KeyCode::PageDown => Some(Message::PageDown),
        KeyCode::Char('b') | KeyCode::PageUp => Some(Message::PageUp),
        KeyCode::Char('d') if ctrl => Some(Message::HalfPageDown),
        KeyCode::Char('u') if ctrl => Some(Message::HalfPageUp),
        KeyCode::Char('g') | KeyCode::Home => Some(Message::GoToTop),
        KeyCode::Char('G') | KeyCode::End => Some(Message::GoToBottom),

        // TOC
        KeyCode::Char('t') => Some(Message::ToggleToc),
        KeyCode::Tab if model.toc_visible => Some(Message::ToggleTocFocus),

        // Comments
        KeyCode::Char('c') => Some(Message::ToggleComments),
        KeyCode::Char('n') => Some(Message::NextComment),
        KeyCode::Esc if model.drag.is_some() => Some(Message::ClearSelection),

        // Posts
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('h') | KeyCode::Left => {
            Some(Message::BackToIndex)
        }
        KeyCode::Char('w') => Some(Message::ToggleWatch),
        KeyCode::Char('r') => Some(Message::ForceReload),
        KeyCode::Char('?') | KeyCode::F(1) => Some(Message::ToggleHelp),
        KeyCode::Char('q') => Some(Message::Quit),
        _ => None,
    }
}

fn index_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
    match mouse.kind {
        MouseEventKind::ScrollDown => Some(Message::IndexDown),
        MouseEventKind::ScrollUp => Some(Message::IndexUp),
        MouseEventKind::Up(MouseButton::Left) => {
            let list = crate::ui::frame_area(model);
            // Skip the list border.
            if mouse.row == 0 || mouse.row + 2 >= list.height {
                return None;
            }
            let idx = model.index_scroll_offset
                + usize::from((mouse.row - 1) / crate::ui::INDEX_ROW_HEIGHT);
            (idx < model.posts.len()).then_some(Message::OpenPost(idx))
        }
        _ => None,
    }
}

fn post_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
    let layout = crate::ui::post_layout_for(model);
    let (col, row) = (mouse.column, mouse.row);
    let in_toc = layout.toc.filter(|toc| contains(*toc, col, row));
    let in_sidebar = layout.sidebar.is_some_and(|s| contains(s, col, row));
    let in_doc = contains(layout.document, col, row);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(toc) = in_toc {
                Some(Message::StartSelection(
                    local_point(toc, col, row),
                    Region::Navigation,
                ))
            } else if let Some(sidebar) = layout.sidebar.filter(|_| in_sidebar) {
                Some(Message::StartSelection(
                    local_point(sidebar, col, row),
                    Region::Sidebar,
                ))
            } else if in_doc {
                doc_point(model, layout.text, col, row)
                    .map(|point| Message::StartSelection(point, Region::Content))
            } else {
                None
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            let drag = model.drag?;
            region_point(model, &layout, drag.region, col, row).map(Message::UpdateSelection)
        }
        MouseEventKind::Up(MouseButton::Left) => {
            let drag = model.drag?;
            let Some(point) = region_point(model, &layout, drag.region, col, row) else {
                return Some(Message::ClearSelection);
            };
            if drag.region == Region::Navigation && drag.anchor == point {
                return Some(
                    layout
                        .toc
                        .and_then(|toc| toc_entry_at(model, toc, row))
                        .map_or(Message::ClearSelection, Message::TocClick),
                );
            }
            Some(Message::EndSelection(point))
        }
        MouseEventKind::ScrollDown if in_toc.is_some() => Some(Message::TocScrollDown),
        MouseEventKind::ScrollUp if in_toc.is_some() => Some(Message::TocScrollUp),
        MouseEventKind::ScrollDown => Some(Message::ScrollDown(3)),
        MouseEventKind::ScrollUp => Some(Message::ScrollUp(3)),
        _ => None,
    }
}

const fn contains(rect: Rect, col: u16, row: u16) -> bool {
    col >= rect.x && col < rect.x + rect.width && row >= rect.y && row < rect.y + rect.height
}

fn local_point(area: Rect, col: u16, row: u16) -> DocPoint {
    let row = row.clamp(area.y, area.y + area.height.saturating_sub(1));
    let col = col.clamp(area.x, area.x + area.width.saturating_sub(1));
    DocPoint::new(usize::from(row - area.y), usize::from(col - area.x))
}

/// Point of a drag that started in `region`, clamped into that region.
fn region_point(
    model: &Model,
    layout: &crate::ui::PostLayout,
    region: Region,
    col: u16,
    row: u16,
) -> Option<DocPoint> {
    match region {
        Region::Content => doc_point(model, layout.text, col, row),
        Region::Navigation => layout.toc.map(|toc| local_point(toc, col, row)),
        Region::Sidebar => layout.sidebar.map(|s| local_point(s, col, row)),
    }
}

/// Rendered position of the cell at `col`/`row`, clamped into the text area.
fn doc_point(model: &Model, text: Rect, col: u16, row: u16) -> Option<DocPoint> {
    let line_count = model.document.line_count();
    if text.height == 0 || line_count == 0 {
        return None;
    }
    let row = row.clamp(text.y, text.y + text.height - 1);
    let line = (model.viewport.offset() + usize::from(row - text.y)).min(line_count - 1);
    let display_col = usize::from(col.saturating_sub(text.x));
    let column = model
        .document
        .line_at(line)
        .map_or(0, |l| char_column(l.content(), display_col));
    Some(DocPoint::new(line, column))
}

/// Index of the character drawn at terminal column `display_col`, or the
/// character count past the end of the line.
pub(super) fn char_column(text: &str, display_col: usize) -> usize {
    let mut width = 0;
    for (idx, ch) in text.chars().enumerate() {
        let ch_width = ch.width().unwrap_or(0);
        if display_col < width + ch_width {
            return idx;
        }
        width += ch_width;
    }
    text.chars().count()
}

fn toc_entry_at(model: &Model, toc: Rect, row: u16) -> Option<usize> {
    // Rows inside the border only.
    if row <= toc.y || row + 1 >= toc.y + toc.height {
        return None;
    }
    let idx = model.toc_scroll_offset + usize::from(row - toc.y - 1);
    (idx < model.outline.len()).then_some(idx)
}
