//! Marginalia - a terminal blog reader with a live table of contents and
//! inline comments.
//!
//! # Usage
//!
//! ```bash
//! marginalia                     # built-in sample posts
//! marginalia posts/              # every markdown file in a directory
//! marginalia --watch post.md     # open one post and follow edits
//! marginalia --outline post.md   # print the outline as JSON
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use marginalia::app::{App, load_posts};
use marginalia::blog::sample_posts;
use marginalia::config::{
    ConfigFlags, ThemeMode, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, parse_flag_tokens, save_config_flags,
};
use marginalia::highlight::set_background;
use marginalia::outline::build_outline;
use marginalia::perf;

/// A terminal blog reader with a live table of contents and inline comments
#[derive(Parser, Debug)]
#[command(name = "marginalia", version, about, long_about = None)]
struct Cli {
    /// Markdown post or directory of posts (built-in samples if omitted)
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,

    /// Watch posts for changes and auto-reload
    #[arg(short, long)]
    watch: bool,

    /// Start with the table of contents hidden
    #[arg(long)]
    no_toc: bool,

    /// Force the code highlight theme background (light or dark)
    #[arg(long, value_enum)]
    theme: Option<ThemeMode>,

    /// Cap the width posts are wrapped at
    #[arg(long, value_name = "COLUMNS")]
    wrap_width: Option<u16>,

    /// Enable performance logging
    #[arg(long)]
    perf: bool,

    /// Write detailed render debug events to a file
    #[arg(long, value_name = "PATH")]
    render_debug_log: Option<PathBuf>,

    /// Print the outline of FILE as JSON and exit
    #[arg(long, value_name = "FILE")]
    outline: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn print_outline(path: &Path) -> Result<()> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let json = serde_json::to_string_pretty(&build_outline(&source))?;
    println!("{json}");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();

    if let Some(path) = cli.outline.as_deref() {
        return print_outline(path);
    }

    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);
    tracing::debug!(?effective, "resolved flags");

    perf::set_enabled(effective.perf);
    let render_debug_log_path = effective
        .render_debug_log
        .clone()
        .or_else(|| std::env::var_os("MARGINALIA_RENDER_DEBUG_LOG").map(PathBuf::from));
    if let Err(err) = perf::set_debug_log_path(render_debug_log_path.as_deref()) {
        tracing::warn!(
            %err,
            path = ?render_debug_log_path,
            "failed to initialize render debug log"
        );
    }

    set_background(effective.theme.and_then(ThemeMode::background));

    let (posts, open_first) = match cli.path.as_deref() {
        Some(path) if !path.exists() => anyhow::bail!("Not found: {}", path.display()),
        Some(path) => (load_posts(path)?, path.is_file()),
        None => (sample_posts(), false),
    };

    let mut app = App::new(posts)
        .with_source(cli.path)
        .with_open_first(open_first)
        .with_watch(effective.watch)
        .with_toc_visible(!effective.no_toc)
        .with_wrap_width(effective.wrap_width)
        .with_config_paths(
            Some(global_path),
            local_path.exists().then_some(local_path),
        );

    app.run().context("Application error")
}
