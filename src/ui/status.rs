use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, Screen, ToastLevel};

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let watch_indicator = if model.watch_enabled {
        " [watching]"
    } else {
        ""
    };

    let status = match (model.screen, model.current_post()) {
        (Screen::Post, Some(post)) => {
            let section = model
                .tracker
                .active()
                .and_then(|id| model.outline.iter().find(|entry| entry.id == id))
                .map(|entry| format!("  § {}", entry.title))
                .unwrap_or_default();
            let comments = model.store().map_or(0, |store| store.anchors().len());
            let stale = if model.stale_comments.is_empty() {
                String::new()
            } else {
                format!(" ({} stale)", model.stale_comments.len())
            };
            format!(
                " {}  [{}%]{section}  comments:{comments}{stale}{watch_indicator}  ?:help",
                post.title,
                model.viewport.scroll_percent(),
            )
        }
        _ => format!(
            " Posts  {}/{}{watch_indicator}  Enter:open  ?:help",
            (model.index_selected + 1).min(model.posts.len()),
            model.posts.len(),
        ),
    };

    let status_bar =
        Paragraph::new(status).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(status_bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
