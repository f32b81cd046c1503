use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Which progress indicator, if any, a request drives while in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Progress {
    Hidden,
    /// The status bar indicator.
    Global,
    /// An indicator owned by a single view section.
    Target(&'static str),
}

impl Progress {
    fn slot(self) -> Option<Option<&'static str>> {
        match self {
            Progress::Hidden => None,
            Progress::Global => Some(None),
            Progress::Target(name) => Some(Some(name)),
        }
    }
}

/// Reference-counted show/hide state for every progress target.
///
/// A target stays visible while at least one request holds a guard for it.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    active: Mutex<HashMap<Option<&'static str>, usize>>,
}

impl ProgressTracker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Show the indicator for `progress` until the returned guard is dropped.
    pub fn begin(self: &Arc<Self>, progress: Progress) -> Option<ProgressGuard> {
        let slot = progress.slot()?;
        if let Ok(mut active) = self.active.lock() {
            *active.entry(slot).or_insert(0) += 1;
        }
        Some(ProgressGuard {
            tracker: Arc::clone(self),
            slot,
        })
    }

    /// Whether the indicator for `progress` is currently shown.
    pub fn is_active(&self, progress: Progress) -> bool {
        let Some(slot) = progress.slot() else {
            return false;
        };
        self.active
            .lock()
            .map(|active| active.get(&slot).copied().unwrap_or(0) > 0)
            .unwrap_or(false)
    }

    fn end(&self, slot: Option<&'static str>) {
        if let Ok(mut active) = self.active.lock() {
            if let Some(count) = active.get_mut(&slot) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    active.remove(&slot);
                }
            }
        }
    }
}

/// Hides its indicator on drop.
#[derive(Debug)]
pub struct ProgressGuard {
    tracker: Arc<ProgressTracker>,
    slot: Option<&'static str>,
}

impl Drop for ProgressGuard {
    fn drop(&mut self) {
        self.tracker.end(self.slot);
    }
}
