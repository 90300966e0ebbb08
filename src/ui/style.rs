//! Colors for rendered posts, comment highlights and index badges.
//!
//! Uses ANSI colors that adapt to the terminal's palette, with darker
//! indexed colors on light backgrounds.

use ratatui::style::{Color, Modifier, Style};

use crate::blog::PostStatus;
use crate::document::{InlineColor, InlineStyle, LineType};
use crate::highlight::Background;

fn light_background() -> bool {
    crate::highlight::background() == Background::Light
}

/// Base style of a rendered line.
pub fn style_for_line_type(line_type: &LineType) -> Style {
    let light = light_background();
    let pick = |light_color: u8, dark_color: Color| {
        if light {
            Color::Indexed(light_color)
        } else {
            dark_color
        }
    };
    match line_type {
        LineType::Heading(1) => Style::default()
            .fg(pick(24, Color::Cyan))
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        LineType::Heading(2) => Style::default()
            .fg(pick(22, Color::Green))
            .add_modifier(Modifier::BOLD),
        LineType::Heading(3) => Style::default()
            .fg(pick(58, Color::Yellow))
            .add_modifier(Modifier::BOLD),
        LineType::Heading(4) => Style::default()
            .fg(pick(24, Color::Blue))
            .add_modifier(Modifier::BOLD),
        LineType::Heading(5) => Style::default()
            .fg(pick(54, Color::Magenta))
            .add_modifier(Modifier::BOLD),
        LineType::Heading(_) => Style::default()
            .fg(pick(24, Color::Cyan))
            .add_modifier(Modifier::BOLD),
        LineType::CodeBlock => Style::default()
            .fg(pick(238, Color::Indexed(245)))
            .add_modifier(Modifier::DIM),
        LineType::BlockQuote => Style::default()
            .fg(pick(24, Color::Blue))
            .add_modifier(Modifier::ITALIC),
        LineType::HorizontalRule => Style::default()
            .fg(pick(241, Color::Indexed(240)))
            .add_modifier(Modifier::DIM),
        LineType::Image => Style::default()
            .fg(pick(90, Color::Magenta))
            .add_modifier(Modifier::ITALIC),
        LineType::ListItem(_) | LineType::Table | LineType::Paragraph | LineType::Empty => {
            Style::default()
        }
    }
}

/// Style of an inline span, merged with the line's base style.
pub fn style_for_inline(base: Style, inline: InlineStyle) -> Style {
    let mut style = base;

    if let Some(fg) = inline.fg {
        style = style
            .fg(fg_color_for_terminal(fg))
            .remove_modifier(Modifier::DIM);
    }
    if let Some(bg) = inline.bg {
        style = style.bg(Color::Rgb(bg.r, bg.g, bg.b));
    }
    if inline.emphasis {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if inline.strong {
        style = style.add_modifier(Modifier::BOLD);
    }
    if inline.strikethrough {
        style = style.add_modifier(Modifier::CROSSED_OUT);
    }
    if inline.link {
        style = style.add_modifier(Modifier::UNDERLINED);
        if inline.fg.is_none() {
            style = style.fg(if light_background() {
                Color::Blue
            } else {
                Color::LightBlue
            });
        }
    }
    if inline.code && inline.fg.is_none() {
        style = style
            .fg(if light_background() {
                Color::Indexed(88)
            } else {
                Color::Red
            })
            .add_modifier(Modifier::BOLD);
    }
    if inline.decoration {
        style = style.remove_modifier(Modifier::UNDERLINED);
    }

    style
}

/// Text carrying a comment marker.
pub fn commented(style: Style, focused: bool) -> Style {
    let bg = match (focused, light_background()) {
        (true, _) => Color::Indexed(214),
        (false, true) => Color::Indexed(229),
        (false, false) => Color::Indexed(58),
    };
    let style = style.bg(bg);
    if focused {
        style.fg(Color::Black)
    } else {
        style
    }
}

/// Text under a mouse drag that has not been captured yet.
pub fn selected(style: Style) -> Style {
    style.bg(Color::DarkGray)
}

/// Badge for a post's publication state.
pub fn status_badge(status: PostStatus) -> Style {
    let bg = match status {
        PostStatus::Draft => Color::Indexed(244),
        PostStatus::Voting => Color::Yellow,
        PostStatus::Published => Color::Green,
    };
    Style::default()
        .bg(bg)
        .fg(Color::Black)
        .add_modifier(Modifier::BOLD)
}

/// TOC entry of the section being read.
pub fn active_section() -> Style {
    Style::default()
        .fg(if light_background() {
            Color::Indexed(130)
        } else {
            Color::Yellow
        })
        .add_modifier(Modifier::BOLD)
}

fn fg_color_for_terminal(fg: InlineColor) -> Color {
    if supports_truecolor() {
        Color::Rgb(fg.r, fg.g, fg.b)
    } else {
        Color::Indexed(rgb_to_xterm_256(fg.r, fg.g, fg.b))
    }
}

fn supports_truecolor() -> bool {
    if let Ok(force) = std::env::var("MARGINALIA_TRUECOLOR") {
        let value = force.to_ascii_lowercase();
        return matches!(value.as_str(), "1" | "true" | "yes" | "on");
    }
    supports_truecolor_from_env(
        std::env::var("COLORTERM").ok().as_deref(),
        std::env::var("TERM").ok().as_deref(),
    )
}

fn supports_truecolor_from_env(colorterm: Option<&str>, term: Option<&str>) -> bool {
    let has = |value: Option<&str>, needles: &[&str]| {
        value.is_some_and(|v| {
            let lower = v.to_ascii_lowercase();
            needles.iter().any(|needle| lower.contains(needle))
        })
    };
    has(colorterm, &["truecolor", "24bit"]) || has(term, &["direct", "truecolor"])
}

fn rgb_to_xterm_256(r: u8, g: u8, b: u8) -> u8 {
    // Result is always 0-5, fits in u8
    #[allow(clippy::cast_possible_truncation)]
    let to_cube = |v: u8| ((u16::from(v) * 5) / 255) as u8;
    16 + (36 * to_cube(r)) + (6 * to_cube(g)) + to_cube(b)
}
