//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering
//!
//! Opening a post mounts it: the section tracker is installed over its
//! headings and its comment store starts accepting selections. Leaving the
//! post unmounts both.

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{DragSelection, Model, Screen, ToastLevel, load_posts};
pub use update::{Message, update};

use std::path::PathBuf;

use crate::blog::Post;

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    posts: Vec<Post>,
    source_path: Option<PathBuf>,
    open_first: bool,
    watch_enabled: bool,
    toc_visible: bool,
    wrap_width: Option<u16>,
    config_global_path: Option<PathBuf>,
    config_local_path: Option<PathBuf>,
}

impl App {
    /// Create an application listing `posts`.
    pub const fn new(posts: Vec<Post>) -> Self {
        Self {
            posts,
            source_path: None,
            open_first: false,
            watch_enabled: false,
            toc_visible: true,
            wrap_width: None,
            config_global_path: None,
            config_local_path: None,
        }
    }

    /// Remember where the posts came from so they can be reloaded.
    pub fn with_source(mut self, path: Option<PathBuf>) -> Self {
        self.source_path = path;
        self
    }

    /// Open the first post immediately instead of showing the index.
    pub const fn with_open_first(mut self, open: bool) -> Self {
        self.open_first = open;
        self
    }

    /// Enable or disable file watching.
    pub const fn with_watch(mut self, enabled: bool) -> Self {
        self.watch_enabled = enabled;
        self
    }

    /// Set initial TOC visibility.
    pub const fn with_toc_visible(mut self, visible: bool) -> Self {
        self.toc_visible = visible;
        self
    }

    /// Cap the width posts are laid out at.
    pub const fn with_wrap_width(mut self, width: Option<u16>) -> Self {
        self.wrap_width = width;
        self
    }

    /// Set config paths to show in help.
    pub fn with_config_paths(
        mut self,
        global_path: Option<PathBuf>,
        local_path: Option<PathBuf>,
    ) -> Self {
        self.config_global_path = global_path;
        self.config_local_path = local_path;
        self
    }

    /// Initial model for a terminal of `size`.
    pub fn initial_model(&self, size: (u16, u16)) -> Model {
        let mut model = Model::new(self.posts.clone(), size);
        model.source_path.clone_from(&self.source_path);
        model.watch_enabled = self.watch_enabled && self.source_path.is_some();
        model.toc_visible = self.toc_visible;
        model.wrap_width = self.wrap_width;
        model
            .config_global_path
            .clone_from(&self.config_global_path);
        model.config_local_path.clone_from(&self.config_local_path);
        if self.open_first {
            model.open_post(0);
        }
        model
    }
}
