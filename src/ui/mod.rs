//! Terminal UI components.
//!
//! - [`viewport`]: scroll position and smooth scrolling
//! - [`style`]: colors for rendered markdown, comments and badges
//!
//! The layout helpers here are shared by rendering and mouse handling so a
//! click always lands on the cell that was drawn there.

pub mod style;
pub mod viewport;

mod overlays;
mod render;
mod status;

use ratatui::layout::{Constraint, Layout, Rect};

use crate::app::Model;

pub use render::render;

pub const DOCUMENT_LEFT_PADDING: u16 = 2;
pub const TOC_WIDTH_PERCENT: u16 = 30;
pub const SIDEBAR_WIDTH: u16 = 36;
/// Terminal rows per post on the index
pub const INDEX_ROW_HEIGHT: u16 = 3;

/// Screen areas of the post view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostLayout {
    pub toc: Option<Rect>,
    /// Column holding the post, padding included
    pub document: Rect,
    /// Cells the post text is drawn into
    pub text: Rect,
    pub sidebar: Option<Rect>,
    pub toast: Option<Rect>,
    pub status: Rect,
}

/// Split `area` into the post view's panes.
pub fn post_layout(area: Rect, toc_visible: bool, sidebar_visible: bool, toast: bool) -> PostLayout {
    let [body, status] = Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);
    let (body, toast) = if toast {
        let [body, toast] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(body);
        (body, Some(toast))
    } else {
        (body, None)
    };

    let mut constraints = Vec::with_capacity(3);
    if toc_visible {
        constraints.push(Constraint::Percentage(TOC_WIDTH_PERCENT));
    }
    constraints.push(Constraint::Min(1));
    if sidebar_visible {
        constraints.push(Constraint::Length(sidebar_width(area.width)));
    }
    let columns = Layout::horizontal(constraints).split(body);
    let mut columns = columns.iter().copied();
    let toc = if toc_visible { columns.next() } else { None };
    let document = columns.next().unwrap_or(body);
    let sidebar = if sidebar_visible { columns.next() } else { None };

    let padding = DOCUMENT_LEFT_PADDING.min(document.width.saturating_sub(1));
    let text = Rect {
        x: document.x + padding,
        width: document.width - padding,
        ..document
    };

    PostLayout {
        toc,
        document,
        text,
        sidebar,
        toast,
        status,
    }
}

/// [`post_layout`] for the current state of `model`.
pub fn post_layout_for(model: &Model) -> PostLayout {
    post_layout(
        frame_area(model),
        model.toc_visible,
        model.sidebar_visible(),
        model.active_toast().is_some(),
    )
}

/// The full terminal area implied by the viewport (which excludes the
/// status row).
pub fn frame_area(model: &Model) -> Rect {
    Rect::new(
        0,
        0,
        model.viewport.width(),
        model.viewport.height().saturating_add(1),
    )
}

/// Columns available to post text for a terminal `total_width` wide.
pub fn document_content_width(total_width: u16, toc_visible: bool, sidebar_visible: bool) -> u16 {
    let area = Rect::new(0, 0, total_width, 2);
    post_layout(area, toc_visible, sidebar_visible, false)
        .text
        .width
        .max(1)
}

const fn sidebar_width(total_width: u16) -> u16 {
    let third = total_width / 3;
    if SIDEBAR_WIDTH < third {
        SIDEBAR_WIDTH
    } else {
        third
    }
}
