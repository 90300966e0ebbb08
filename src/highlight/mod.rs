//! Code block highlighting with syntect.
//!
//! The syntax set and theme are loaded once, on the first highlighted block.
//! Colors are tuned for the terminal background, which is either forced with
//! `--theme` or guessed from `COLORFGBG`.

use std::sync::{OnceLock, RwLock};

use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};

use crate::document::{InlineColor, InlineSpan, InlineStyle};

const DARK_THEMES: &[&str] = &["Monokai Extended", "base16-ocean.dark", "Solarized (dark)"];
const LIGHT_THEMES: &[&str] = &["InspiredGitHub", "Solarized (light)", "base16-ocean.light"];

/// Terminal background assumed when picking code colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Light,
    Dark,
}

static BACKGROUND_OVERRIDE: RwLock<Option<Background>> = RwLock::new(None);

/// Force the background used for highlighting, `None` to auto-detect.
///
/// Must be called before the first block is highlighted to affect the theme.
pub fn set_background(background: Option<Background>) {
    if let Ok(mut guard) = BACKGROUND_OVERRIDE.write() {
        *guard = background;
    }
}

/// The effective background: the override, else `COLORFGBG`, else dark.
pub fn background() -> Background {
    let forced = BACKGROUND_OVERRIDE.read().ok().and_then(|guard| *guard);
    forced.unwrap_or_else(|| background_from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref()))
}

/// Highlight `code` as `language` (a fence info word such as `rust` or
/// `python`), one span list per source line.
///
/// Unknown or missing languages produce plain code spans.
pub fn highlight_code(language: Option<&str>, code: &str) -> Vec<Vec<InlineSpan>> {
    let plain = InlineStyle {
        code: true,
        ..InlineStyle::default()
    };
    let Some(syntax) = language.and_then(find_syntax) else {
        return code
            .lines()
            .map(|line| vec![InlineSpan::new(line.to_string(), plain)])
            .collect();
    };

    let background = background();
    let mut highlighter = HighlightLines::new(syntax, theme());
    code.lines()
        .map(|line| match highlighter.highlight_line(line, syntax_set()) {
            Ok(ranges) => ranges
                .into_iter()
                .map(|(style, text)| {
                    let fg = InlineColor {
                        r: style.foreground.r,
                        g: style.foreground.g,
                        b: style.foreground.b,
                    };
                    let span_style = InlineStyle {
                        fg: Some(readable_on(fg, background)),
                        ..plain
                    };
                    InlineSpan::new(text.to_string(), span_style)
                })
                .collect(),
            Err(err) => {
                tracing::debug!(%err, "highlighting failed, using plain line");
                vec![InlineSpan::new(line.to_string(), plain)]
            }
        })
        .collect()
}

fn find_syntax(language: &str) -> Option<&'static SyntaxReference> {
    let set = syntax_set();
    set.find_syntax_by_token(language)
        .or_else(|| set.find_syntax_by_name(language))
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(|| {
        let _scope = crate::perf::scope("highlight.load_syntaxes");
        SyntaxSet::load_defaults_newlines()
    })
}

fn theme() -> &'static Theme {
    static THEME: OnceLock<Theme> = OnceLock::new();
    THEME.get_or_init(|| {
        let _scope = crate::perf::scope("highlight.load_theme");
        let mut themes = ThemeSet::load_defaults().themes;
        let preferred = match background() {
            Background::Dark => DARK_THEMES,
            Background::Light => LIGHT_THEMES,
        };
        preferred
            .iter()
            .find_map(|name| themes.remove(*name))
            .or_else(|| themes.into_values().next())
            .unwrap_or_default()
    })
}

/// `COLORFGBG` is `fg;bg` with ANSI color indexes; 7 and above are light.
fn background_from_colorfgbg(colorfgbg: Option<&str>) -> Background {
    let bg = colorfgbg
        .and_then(|value| value.rsplit(';').next())
        .and_then(|bg| bg.parse::<u8>().ok());
    match bg {
        Some(index) if index >= 7 => Background::Light,
        _ => Background::Dark,
    }
}

/// Darken bright theme colors on light terminals.
fn readable_on(color: InlineColor, background: Background) -> InlineColor {
    if background == Background::Dark {
        return color;
    }
    let luma = 0.0722f32.mul_add(
        f32::from(color.b),
        0.2126f32.mul_add(f32::from(color.r), 0.7152 * f32::from(color.g)),
    );
    if luma < 155.0 {
        return color;
    }
    // Scaled channels stay within 0..=255
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let darken = |channel: u8| (f32::from(channel) * 0.42).round() as u8;
    InlineColor {
        r: darken(color.r),
        g: darken(color.g),
        b: darken(color.b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_color(lines: &[Vec<InlineSpan>]) -> bool {
        lines.iter().flatten().any(|span| span.style().fg.is_some())
    }

    #[test]
    fn test_rust_block_is_colored() {
        let lines = highlight_code(Some("rust"), "fn main() {\n    let x = 1;\n}\n");
        assert_eq!(lines.len(), 3);
        assert!(has_color(&lines));
    }

    #[test]
    fn test_python_block_is_colored() {
        let lines = highlight_code(Some("python"), "items = [\n    \"Blockchain\",\n]");
        assert_eq!(lines.len(), 3);
        assert!(has_color(&lines));
    }

    #[test]
    fn test_unknown_language_is_plain() {
        let lines = highlight_code(Some("not-a-language"), "just text");
        assert_eq!(lines.len(), 1);
        assert!(!has_color(&lines));
        assert!(lines[0].iter().all(|span| span.style().code));
    }

    #[test]
    fn test_missing_language_is_plain() {
        let lines = highlight_code(None, "plain\ntext");
        assert_eq!(lines.len(), 2);
        assert!(!has_color(&lines));
    }

    #[test]
    fn test_highlighting_keeps_line_text() {
        let code = "def f(x):\n    return x * 2";
        let lines = highlight_code(Some("python"), code);
        let rebuilt: Vec<String> = lines
            .iter()
            .map(|spans| spans.iter().map(InlineSpan::text).collect())
            .collect();
        assert_eq!(rebuilt, code.lines().collect::<Vec<_>>());
    }

    #[test]
    fn test_no_background_color_is_set() {
        let lines = highlight_code(Some("rust"), "fn main() {}");
        assert!(lines.iter().flatten().all(|span| span.style().bg.is_none()));
    }

    #[test]
    fn test_colorfgbg_parsing() {
        assert_eq!(background_from_colorfgbg(Some("15;0")), Background::Dark);
        assert_eq!(background_from_colorfgbg(Some("0;15")), Background::Light);
        assert_eq!(background_from_colorfgbg(Some("garbage")), Background::Dark);
        assert_eq!(background_from_colorfgbg(None), Background::Dark);
    }

    #[test]
    fn test_light_background_darkens_bright_colors() {
        let bright = InlineColor {
            r: 240,
            g: 230,
            b: 120,
        };
        let adjusted = readable_on(bright, Background::Light);
        assert!(adjusted.r < bright.r && adjusted.g < bright.g && adjusted.b < bright.b);
        assert_eq!(readable_on(bright, Background::Dark), bright);
    }
}
