use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap};

use crate::app::{DragSelection, Model, Screen};
use crate::document::{InlineSpan, InlineStyle, LineType, RenderedLine};

use super::{DOCUMENT_LEFT_PADDING, INDEX_ROW_HEIGHT, PostLayout, overlays, status, style};

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();

    match model.screen {
        Screen::Index => render_index(model, frame, area),
        Screen::Post => render_post(model, frame, &super::post_layout_for(model)),
    }

    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    }
}

fn render_index(model: &Model, frame: &mut Frame, area: Rect) {
    let toast_rows = u16::from(model.active_toast().is_some());
    let [list_area, toast_area, status_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(toast_rows),
        Constraint::Length(1),
    ])
    .areas(area);

    let rows = usize::from(list_area.height.saturating_sub(2) / INDEX_ROW_HEIGHT).max(1);
    let dim = Style::default().fg(Color::Indexed(245));
    let mut lines: Vec<Line> = Vec::with_capacity(rows * usize::from(INDEX_ROW_HEIGHT));
    for (idx, post) in model
        .posts
        .iter()
        .enumerate()
        .skip(model.index_scroll_offset)
        .take(rows)
    {
        let selected = idx == model.index_selected;
        let marker = if selected { "> " } else { "  " };
        let title_style = if selected {
            Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        lines.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(post.title.clone(), title_style),
            Span::raw(" "),
            Span::styled(format!(" {} ", post.status), style::status_badge(post.status)),
        ]));
        lines.push(Line::styled(format!("  {}", post.excerpt), Style::default()));
        let byline = if post.date.is_empty() {
            format!("  {}", post.author)
        } else {
            format!("  {} · {}", post.author, post.date)
        };
        lines.push(Line::styled(byline, dim));
    }
    if model.posts.is_empty() {
        lines.push(Line::styled("  No posts found", dim));
    }

    let block = Block::default()
        .title(format!("Posts ({})", model.posts.len()))
        .borders(Borders::ALL);
    frame.render_widget(Clear, list_area);
    frame.render_widget(Paragraph::new(lines).block(block), list_area);

    if toast_rows > 0 {
        status::render_toast_bar(model, frame, toast_area);
    }
    status::render_status_bar(model, frame, status_area);
}

fn render_post(model: &Model, frame: &mut Frame, layout: &PostLayout) {
    if let Some(toc) = layout.toc {
        render_toc(model, frame, toc);
    }
    render_document(model, frame, layout.document);
    if let Some(sidebar) = layout.sidebar {
        render_sidebar(model, frame, sidebar);
    }
    if let Some(toast) = layout.toast {
        status::render_toast_bar(model, frame, toast);
    }
    status::render_status_bar(model, frame, layout.status);
}

fn render_toc(model: &Model, frame: &mut Frame, area: Rect) {
    let visible_rows = area.height.saturating_sub(2) as usize;
    let max_start = model.outline.len().saturating_sub(visible_rows);
    let start = model.toc_scroll_offset.min(max_start);
    let active = model.tracker.active();

    let items: Vec<Line> = model
        .outline
        .iter()
        .enumerate()
        .skip(start)
        .take(visible_rows)
        .map(|(i, entry)| {
            let indent = "  ".repeat(entry.level.saturating_sub(1) as usize);
            let is_active = active == Some(entry.id.as_str());
            let marker = if is_active { "▸" } else { " " };
            let base = if is_active {
                style::active_section()
            } else {
                style::style_for_line_type(&LineType::Heading(entry.level))
                    .remove_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            };
            let style = if model.toc_focused && model.toc_selected == Some(i) {
                base.reversed()
            } else {
                base
            };
            Line::styled(format!("{marker}{indent} {}", entry.title), style)
        })
        .collect();

    let block = Block::default()
        .title("Contents")
        .borders(Borders::ALL)
        .border_style(if model.toc_focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        });

    frame.render_widget(Paragraph::new(items).block(block), area);
}

fn render_document(model: &Model, frame: &mut Frame, area: Rect) {
    let offset = model.viewport.offset();
    let content: Vec<Line> = model
        .document
        .visible_lines(offset, area.height as usize)
        .into_iter()
        .enumerate()
        .map(|(idx, line)| styled_line(model, offset + idx, line))
        .collect();

    let block = Block::default()
        .borders(Borders::NONE)
        .padding(Padding::left(DOCUMENT_LEFT_PADDING));
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(content).block(block), area);
}

/// Spans of one post line with comment highlights and the drag overlay.
fn styled_line(model: &Model, line_idx: usize, line: &RenderedLine) -> Line<'static> {
    let line_style = style::style_for_line_type(line.line_type());
    let plain;
    let spans = match line.spans() {
        Some(spans) => spans,
        None => {
            plain = [InlineSpan::new(line.content().to_string(), InlineStyle::default())];
            &plain[..]
        }
    };

    let focused = model.focused_comment.as_deref();
    let drag = model.drag.filter(|drag| touches_line(drag, line_idx));

    let mut out: Vec<Span<'static>> = Vec::with_capacity(spans.len());
    let mut column = 0;
    for span in spans {
        let mut span_style = style::style_for_inline(line_style, span.style());
        if !span.comments().is_empty() {
            let is_focused = focused.is_some_and(|id| span.has_comment(id));
            span_style = style::commented(span_style, is_focused);
        }

        let Some(drag) = drag else {
            out.push(Span::styled(span.text().to_string(), span_style));
            column += span.text().chars().count();
            continue;
        };
        for ch in span.text().chars() {
            let cell_style = if drag.covers(line_idx, column) {
                style::selected(span_style)
            } else {
                span_style
            };
            match out.last_mut() {
                Some(last) if last.style == cell_style => last.content.to_mut().push(ch),
                _ => out.push(Span::styled(ch.to_string(), cell_style)),
            }
            column += 1;
        }
    }
    Line::from(out)
}

fn touches_line(drag: &DragSelection, line_idx: usize) -> bool {
    let (a, b) = (drag.anchor.line, drag.focus.line);
    !drag.is_click() && a.min(b) <= line_idx && line_idx <= a.max(b)
}

fn render_sidebar(model: &Model, frame: &mut Frame, area: Rect) {
    let heading = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(Color::Indexed(245));
    let quote_style = Style::default().add_modifier(Modifier::ITALIC);

    let mut lines: Vec<Line> = Vec::new();
    let store = model.store();

    if let Some(pending) = store.and_then(|store| store.pending()) {
        lines.push(Line::styled("New comment", heading));
        lines.push(Line::styled(format!("“{}”", pending.quote), quote_style));
        lines.push(Line::from(vec![
            Span::raw("> "),
            Span::raw(model.comment_draft.clone()),
            Span::styled(" ", Style::default().bg(Color::White)),
        ]));
        lines.push(Line::styled("Enter: submit  Esc: dismiss", dim));
        lines.push(Line::raw(""));
    }

    let anchors = store.map(|store| store.anchors()).unwrap_or_default();
    lines.push(Line::styled(format!("Comments ({})", anchors.len()), heading));
    if anchors.is_empty() {
        lines.push(Line::styled("Select text to comment on it", dim));
    }
    for anchor in anchors {
        let stale = model.stale_comments.contains(&anchor.id);
        let focused = model.focused_comment.as_deref() == Some(anchor.id.as_str());
        let quote = if stale {
            Style::default()
                .fg(Color::Indexed(245))
                .add_modifier(Modifier::CROSSED_OUT)
        } else if focused {
            style::commented(quote_style, true)
        } else {
            quote_style
        };
        lines.push(Line::styled(format!("“{}”", anchor.quote), quote));
        lines.push(Line::raw(anchor.text.clone()));
        if stale {
            lines.push(Line::styled("(no longer in the post)", dim));
        }
        lines.push(Line::raw(""));
    }

    let block = Block::default()
        .title("Comments")
        .borders(Borders::ALL)
        .padding(Padding::horizontal(1))
        .border_style(if model.is_composing() {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        });
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}
