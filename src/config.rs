//! Saved default flags.
//!
//! Defaults live in a flag file: one or more CLI flags per line, `#` starts
//! a comment. The global file sits in the platform config directory and a
//! `.marginaliarc` in the working directory overrides it. Flags given on the
//! command line win over both.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::highlight::Background;

const APP_DIR: &str = "marginalia";
const LOCAL_FILE: &str = ".marginaliarc";

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Auto,
    Light,
    Dark,
}

impl ThemeMode {
    /// Background forced by this mode, `None` to auto-detect.
    pub const fn background(self) -> Option<Background> {
        match self {
            Self::Auto => None,
            Self::Light => Some(Background::Light),
            Self::Dark => Some(Background::Dark),
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub watch: bool,
    pub no_toc: bool,
    pub perf: bool,
    pub theme: Option<ThemeMode>,
    pub wrap_width: Option<u16>,
    pub render_debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge `other` over `self`: switches are or-ed, values from `other`
    /// replace values from `self`.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            watch: self.watch || other.watch,
            no_toc: self.no_toc || other.no_toc,
            perf: self.perf || other.perf,
            theme: other.theme.or(self.theme),
            wrap_width: other.wrap_width.or(self.wrap_width),
            render_debug_log: other
                .render_debug_log
                .clone()
                .or_else(|| self.render_debug_log.clone()),
        }
    }

    fn to_lines(&self) -> Vec<String> {
        let mut lines = vec!["# marginalia defaults (saved with --save)".to_string()];
        if self.watch {
            lines.push("--watch".to_string());
        }
        if self.no_toc {
            lines.push("--no-toc".to_string());
        }
        if self.perf {
            lines.push("--perf".to_string());
        }
        if let Some(theme) = self.theme {
            lines.push(format!("--theme {}", theme.as_str()));
        }
        if let Some(width) = self.wrap_width {
            lines.push(format!("--wrap-width {width}"));
        }
        if let Some(path) = &self.render_debug_log {
            lines.push(format!("--render-debug-log {}", path.display()));
        }
        lines
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join(APP_DIR).join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join(APP_DIR)
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join(APP_DIR).join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join(APP_DIR).join("config");
        }
    }

    PathBuf::from(LOCAL_FILE)
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(LOCAL_FILE)
}

/// Read the flag file at `path`; a missing file means no flags.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read.
pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

/// Write `flags` to `path`, creating the parent directory.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", flags.to_lines().join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

/// Remove the flag file at `path` if there is one.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be removed.
pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick the known flags out of a token list; anything else is skipped.
///
/// Valued flags accept both `--flag value` and `--flag=value`.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut tokens = tokens.iter().map(String::as_str).peekable();
    while let Some(token) = tokens.next() {
        let (name, inline_value) = match token.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (token, None),
        };
        match name {
            "--watch" => flags.watch = true,
            "--no-toc" => flags.no_toc = true,
            "--perf" => flags.perf = true,
            "--theme" | "--wrap-width" | "--render-debug-log" => {
                let Some(value) = inline_value.or_else(|| tokens.next()) else {
                    continue;
                };
                match name {
                    "--theme" => flags.theme = parse_theme(value),
                    "--wrap-width" => flags.wrap_width = value.parse().ok().filter(|w| *w > 0),
                    _ => flags.render_debug_log = Some(PathBuf::from(value)),
                }
            }
            _ => {}
        }
    }
    flags
}

fn parse_theme(s: &str) -> Option<ThemeMode> {
    match s {
        "auto" => Some(ThemeMode::Auto),
        "light" => Some(ThemeMode::Light),
        "dark" => Some(ThemeMode::Dark),
        _ => None,
    }
}
