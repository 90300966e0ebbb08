use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap};

use crate::app::Model;

const KEYS: &[(&str, &[(&str, &str)])] = &[
    (
        "Posts",
        &[
            ("j/k or Up/Down", "Select post"),
            ("Enter / click", "Open post"),
            ("Esc / h / Backspace", "Back to posts"),
        ],
    ),
    (
        "Reading",
        &[
            ("j/k or Up/Down", "Scroll"),
            ("Space / b", "Page down / up"),
            ("Ctrl-d / Ctrl-u", "Half page"),
            ("g / G", "Top / bottom"),
        ],
    ),
    (
        "Contents",
        &[
            ("t", "Toggle contents"),
            ("Tab", "Focus contents"),
            ("Enter / click", "Scroll to section"),
        ],
    ),
    (
        "Comments",
        &[
            ("Mouse drag", "Select text to comment on"),
            ("Enter / Esc", "Submit / dismiss comment"),
            ("c", "Toggle comment sidebar"),
            ("n", "Next highlighted comment"),
        ],
    ),
    (
        "Other",
        &[
            ("w", "Toggle watch"),
            ("r", "Reload posts"),
            ("q / Ctrl-c", "Quit"),
            ("? / F1", "Toggle help"),
        ],
    ),
];

pub fn render_help_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(12).max(48);
    let popup_height = area.height.saturating_sub(4).max(12);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(Color::Indexed(245));

    let mut lines: Vec<Line> = Vec::new();
    for (section, keys) in KEYS {
        lines.push(Line::styled(*section, section_style));
        for (key, action) in *keys {
            lines.push(Line::raw(format!("  {key:<20}{action}")));
        }
        lines.push(Line::raw(""));
    }

    let config_path = |path: Option<&std::path::PathBuf>, missing: &str| {
        path.map_or_else(|| missing.to_string(), |p| p.display().to_string())
    };
    lines.push(Line::styled("Config", section_style));
    lines.push(Line::raw(format!(
        "  Global: {}",
        config_path(model.config_global_path.as_ref(), "<unknown>")
    )));
    lines.push(Line::raw(format!(
        "  Local override: {}",
        config_path(model.config_local_path.as_ref(), "<none>")
    )));
    lines.push(Line::raw(""));
    lines.push(Line::styled("Any key closes", dim_style));

    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .padding(Padding::uniform(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        popup,
    );
}

fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
