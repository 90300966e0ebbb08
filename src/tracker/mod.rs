//! Scroll-synchronized section tracking.
//!
//! A [`VisibilityWatcher`] compares heading targets against a trigger band
//! inside the viewport and emits an [`IntersectionEntry`] batch whenever a
//! target enters or leaves the band. [`ScrollSync`] owns the watcher's
//! lifecycle and turns batches into the active section shown in the TOC.
//!
//! Batches are tagged with the [`WatchHandle`] of the watcher that produced
//! them; a batch from a watcher that has since been replaced or torn down is
//! dropped.

use crate::document::Document;
use crate::ui::viewport::Viewport;

/// A rendered heading the tracker watches, one row tall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingTarget {
    pub id: String,
    /// Rendered line of the heading
    pub line: usize,
}

impl HeadingTarget {
    /// One target per heading of `document`, in document order.
    pub fn from_document(document: &Document) -> Vec<Self> {
        document
            .headings()
            .iter()
            .map(|h| Self {
                id: h.id.clone(),
                line: h.line,
            })
            .collect()
    }
}

/// Vertical slice of the viewport that decides which heading is being read,
/// as percentages of the viewport height from the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerBand {
    pub top_percent: u8,
    pub bottom_percent: u8,
}

impl Default for TriggerBand {
    fn default() -> Self {
        Self {
            top_percent: 20,
            bottom_percent: 80,
        }
    }
}

impl TriggerBand {
    /// Absolute rendered rows covered by the band for `viewport`.
    pub fn rows(&self, viewport: &Viewport) -> std::ops::Range<usize> {
        let height = viewport.height() as usize;
        let offset = viewport.offset();
        let top = offset + height * usize::from(self.top_percent.min(100)) / 100;
        let bottom = offset + height * usize::from(self.bottom_percent.min(100)) / 100;
        top..bottom.max(top)
    }

    /// Scroll offset that puts `line` at the top edge of the band in a
    /// viewport `height` rows tall.
    pub fn offset_for(&self, line: usize, height: u16) -> usize {
        line.saturating_sub(usize::from(height) * usize::from(self.top_percent.min(100)) / 100)
    }
}

/// A change in a target's band membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntersectionEntry {
    pub id: String,
    pub is_intersecting: bool,
}

/// Generation token of an installed watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchHandle(u64);

/// Reports band membership changes of a fixed set of targets.
#[derive(Debug, Clone)]
pub struct VisibilityWatcher {
    targets: Vec<HeadingTarget>,
    band: TriggerBand,
    /// Membership at the last observation; `None` before the first one
    last: Option<Vec<bool>>,
}

impl VisibilityWatcher {
    pub const fn new(targets: Vec<HeadingTarget>, band: TriggerBand) -> Self {
        Self {
            targets,
            band,
            last: None,
        }
    }

    pub fn targets(&self) -> &[HeadingTarget] {
        &self.targets
    }

    /// Targets inside the band at the last observation, in document order.
    pub fn intersecting(&self) -> impl Iterator<Item = &HeadingTarget> {
        let last = self.last.as_deref().unwrap_or_default();
        self.targets
            .iter()
            .zip(last)
            .filter(|(_, inside)| **inside)
            .map(|(target, _)| target)
    }

    /// Compare every target against the band and return the entries whose
    /// state changed, in document order. The first call reports every target.
    pub fn observe(&mut self, viewport: &Viewport) -> Vec<IntersectionEntry> {
        let rows = self.band.rows(viewport);
        let now: Vec<bool> = self
            .targets
            .iter()
            .map(|target| rows.contains(&target.line))
            .collect();

        let batch = self
            .targets
            .iter()
            .zip(&now)
            .enumerate()
            .filter(|(idx, (_, state))| {
                self.last
                    .as_ref()
                    .is_none_or(|last| last.get(*idx) != Some(*state))
            })
            .map(|(_, (target, state))| IntersectionEntry {
                id: target.id.clone(),
                is_intersecting: *state,
            })
            .collect();

        self.last = Some(now);
        batch
    }
}

/// Tracks the section currently being read.
#[derive(Debug, Clone, Default)]
pub struct ScrollSync {
    band: TriggerBand,
    watcher: Option<(WatchHandle, VisibilityWatcher)>,
    generation: u64,
    active: Option<String>,
}

impl ScrollSync {
    pub fn new(band: TriggerBand) -> Self {
        Self {
            band,
            ..Self::default()
        }
    }

    /// Watch `targets`, replacing any previous watcher.
    ///
    /// The active section is kept; it changes with the next batch that
    /// reports an intersecting target.
    pub fn install(&mut self, targets: Vec<HeadingTarget>) -> WatchHandle {
        if self.watcher.take().is_some() {
            tracing::debug!(generation = self.generation, "replacing section watcher");
        }
        self.generation += 1;
        let handle = WatchHandle(self.generation);
        tracing::debug!(
            generation = self.generation,
            targets = targets.len(),
            "installed section watcher"
        );
        self.watcher = Some((handle, VisibilityWatcher::new(targets, self.band)));
        handle
    }

    /// Drop the watcher and forget the active section.
    pub fn teardown(&mut self) {
        if self.watcher.take().is_some() {
            tracing::debug!(generation = self.generation, "tore down section watcher");
        }
        self.active = None;
    }

    pub const fn band(&self) -> TriggerBand {
        self.band
    }

    /// Handle of the installed watcher, if any.
    pub fn handle(&self) -> Option<WatchHandle> {
        self.watcher.as_ref().map(|(handle, _)| *handle)
    }

    /// Observe `viewport` with the installed watcher and apply the batch.
    ///
    /// Returns true if the active section changed.
    pub fn sync(&mut self, viewport: &Viewport) -> bool {
        let Some((handle, watcher)) = self.watcher.as_mut() else {
            return false;
        };
        let handle = *handle;
        let batch = watcher.observe(viewport);
        self.apply(handle, &batch)
    }

    /// Apply a notification batch produced by the watcher behind `handle`.
    ///
    /// The last intersecting entry wins. When the batch only reports the
    /// active section leaving the band, the last target still inside the
    /// band takes over; with none left the current section is kept.
    /// Batches from a replaced or torn-down watcher are ignored. Returns
    /// true if the active section changed.
    pub fn apply(&mut self, handle: WatchHandle, batch: &[IntersectionEntry]) -> bool {
        if self.handle() != Some(handle) {
            tracing::debug!(?handle, "ignoring batch from stale section watcher");
            return false;
        }
        let next = batch
            .iter()
            .rev()
            .find(|entry| entry.is_intersecting)
            .map(|entry| entry.id.clone())
            .or_else(|| self.still_in_band(batch));
        let Some(next) = next else {
            return false;
        };
        if self.active.as_deref() == Some(next.as_str()) {
            return false;
        }
        self.active = Some(next);
        true
    }

    /// Replacement for an active section that `batch` reports as leaving.
    fn still_in_band(&self, batch: &[IntersectionEntry]) -> Option<String> {
        let active = self.active.as_deref()?;
        let left = batch
            .iter()
            .any(|entry| !entry.is_intersecting && entry.id == active);
        if !left {
            return None;
        }
        let (_, watcher) = self.watcher.as_ref()?;
        watcher.intersecting().last().map(|target| target.id.clone())
    }

    /// Id of the section currently being read.
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }
}
