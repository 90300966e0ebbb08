use std::path::Path;
use std::time::Duration;

use crate::app::{App, Message, Model, ToastLevel};
use crate::watcher::PostWatcher;

const WATCH_DEBOUNCE: Duration = Duration::from_millis(200);

impl App {
    pub(super) fn make_post_watcher(path: &Path) -> notify::Result<PostWatcher> {
        PostWatcher::new(path, WATCH_DEBOUNCE)
    }

    /// Watcher for the model's post source, or `None` (with a toast) if it
    /// cannot be watched.
    pub(super) fn start_watching(model: &mut Model) -> Option<PostWatcher> {
        let Some(source) = model.source_path.clone() else {
            model.watch_enabled = false;
            model.show_toast(ToastLevel::Info, "Built-in posts cannot be watched");
            return None;
        };
        match Self::make_post_watcher(&source) {
            Ok(watcher) => Some(watcher),
            Err(err) => {
                model.watch_enabled = false;
                model.show_toast(ToastLevel::Warning, format!("Watch unavailable: {err}"));
                tracing::warn!(%err, path = %source.display(), "cannot watch posts");
                None
            }
        }
    }

    /// I/O that follows a state transition.
    pub(super) fn handle_message_side_effects(
        model: &mut Model,
        watcher: &mut Option<PostWatcher>,
        msg: &Message,
    ) {
        match msg {
            Message::ToggleWatch => {
                if model.watch_enabled {
                    *watcher = Self::start_watching(model);
                    if watcher.is_some() {
                        model.show_toast(ToastLevel::Info, "Watching for changes");
                    }
                } else {
                    *watcher = None;
                    model.show_toast(ToastLevel::Info, "Watch disabled");
                }
            }
            Message::FileChanged | Message::ForceReload => {
                if model.source_path.is_none() {
                    if matches!(msg, Message::ForceReload) {
                        model.show_toast(ToastLevel::Info, "Built-in posts have nothing to reload");
                    }
                    return;
                }
                match model.reload_from_disk() {
                    Ok(()) if matches!(msg, Message::ForceReload) && model.stale_comments.is_empty() => {
                        model.show_toast(ToastLevel::Info, "Reloaded");
                    }
                    Ok(()) => {}
                    Err(err) => {
                        tracing::warn!(err = %format!("{err:#}"), "reload failed");
                        model.show_toast(ToastLevel::Error, format!("Reload failed: {err:#}"));
                    }
                }
            }
            _ => {}
        }
    }
}
