use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::app::{App, Message, Model, update};
use crate::watcher::PostWatcher;

/// Frame interval while a smooth scroll is running.
const ANIMATION_FRAME_MS: u64 = 16;

pub(super) struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<(u16, u16, u64)>,
}

impl ResizeDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, width: u16, height: u16, now_ms: u64) {
        self.pending = Some((width, height, now_ms));
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<(u16, u16)> {
        let (width, height, queued_at) = self.pending?;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            Some((width, height))
        } else {
            None
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be initialized or an I/O
    /// error occurs while reading events or drawing.
    pub fn run(&mut self) -> Result<()> {
        let _run_scope = crate::perf::scope("app.run.total");

        let init_scope = crate::perf::scope("app.ratatui_init");
        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal: marginalia requires an interactive terminal")?;
        let size = terminal.size()?;
        drop(init_scope);

        let mut model = self.initial_model((size.width, size.height));
        crate::perf::log_event(
            "init.layout",
            format!(
                "terminal={}x{} posts={} layout_width={}",
                size.width,
                size.height,
                model.posts.len(),
                model.layout_width()
            ),
        );

        execute!(stdout(), EnableMouseCapture)?;
        let result = Self::event_loop(&mut terminal, &mut model);

        let _ = execute!(stdout(), DisableMouseCapture);
        ratatui::restore();
        result
    }

    fn dispatch(model: &mut Model, watcher: &mut Option<PostWatcher>, msg: Message) {
        crate::perf::log_event("event.message", format!("msg={msg:?}"));
        let side_msg = msg.clone();
        *model = update(std::mem::take(model), msg);
        Self::handle_message_side_effects(model, watcher, &side_msg);
    }

    fn event_loop(terminal: &mut DefaultTerminal, model: &mut Model) -> Result<()> {
        let start = Instant::now();
        let now_ms = || u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let mut resize_debouncer = ResizeDebouncer::new(100);
        let mut watcher = if model.watch_enabled {
            Self::start_watching(model)
        } else {
            None
        };
        let mut frame_idx: u64 = 0;
        let mut needs_render = true;

        loop {
            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            if let Some((width, height)) = resize_debouncer.take_ready(now_ms()) {
                Self::dispatch(model, &mut watcher, Message::Resize(width, height));
                needs_render = true;
            }

            if model.watch_enabled
                && watcher.as_mut().is_some_and(PostWatcher::take_change_ready)
            {
                Self::dispatch(model, &mut watcher, Message::FileChanged);
                needs_render = true;
            }

            if model.viewport.is_animating() {
                Self::dispatch(model, &mut watcher, Message::AnimationTick);
                needs_render = true;
            }

            let poll_ms = if model.viewport.is_animating() {
                ANIMATION_FRAME_MS
            } else if needs_render {
                0
            } else if resize_debouncer.is_pending() {
                10
            } else {
                250
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                let event = event::read()?;
                if let Some(msg) =
                    Self::handle_event(&event, model, now_ms(), &mut resize_debouncer)
                {
                    Self::dispatch(model, &mut watcher, msg);
                    needs_render = true;
                }

                // Coalesce key repeat bursts into a single render.
                while event::poll(Duration::from_millis(0))? {
                    let event = event::read()?;
                    if let Some(msg) =
                        Self::handle_event(&event, model, now_ms(), &mut resize_debouncer)
                    {
                        Self::dispatch(model, &mut watcher, msg);
                        needs_render = true;
                    }
                }
            }

            if needs_render {
                frame_idx += 1;
                let prep_start = Instant::now();
                model.ensure_highlight_overscan();
                let draw_start = Instant::now();
                terminal.draw(|frame| crate::ui::render(model, frame))?;
                crate::perf::log_event(
                    "frame.draw",
                    format!(
                        "frame={frame_idx} prep_ms={:.3} draw_ms={:.3} offset={} active={:?}",
                        (draw_start - prep_start).as_secs_f64() * 1000.0,
                        draw_start.elapsed().as_secs_f64() * 1000.0,
                        model.viewport.offset(),
                        model.tracker.active(),
                    ),
                );
                needs_render = false;
            }

            if model.should_quit {
                break;
            }
        }
        Ok(())
    }
}
