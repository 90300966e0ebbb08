// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. anchor::AnchorStore)
    clippy::module_name_repetitions
)]

//! # Marginalia
//!
//! A terminal blog reader with a live table of contents and inline comments.
//!
//! Marginalia renders markdown posts in the terminal with:
//! - An outline of every post, shown as a table of contents
//! - The section being read tracked as you scroll
//! - Comments attached to selected text and highlighted in place
//! - Syntax-highlighted code blocks
//! - File watching for live preview
//!
//! ## Architecture
//!
//! Marginalia uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`outline`]: Heading outline and slugs
//! - [`tracker`]: Which section is being read
//! - [`anchor`]: Comment anchors over the rendered text
//! - [`document`]: Markdown parsing and rendering
//! - [`blog`]: Posts and the built-in samples
//! - [`app`]: Main application loop and state
//! - [`ui`]: Terminal UI components
//! - [`highlight`]: Syntax highlighting
//! - [`watcher`]: File watching

pub mod anchor;
pub mod app;
pub mod blog;
pub mod config;
pub mod document;
pub mod highlight;
pub mod outline;
pub mod perf;
pub mod tracker;
pub mod ui;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::anchor::{AnchorStore, CommentAnchor, ContentText};
    pub use crate::app::{App, Message, Model};
    pub use crate::document::Document;
    pub use crate::outline::{OutlineEntry, build_outline};
    pub use crate::tracker::ScrollSync;
    pub use crate::ui::viewport::Viewport;
}
