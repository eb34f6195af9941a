//! Latest-selection-wins ordering for overlapping fetches.
//!
//! Every selection takes a ticket with a strictly increasing generation. A
//! result may only be applied while its ticket is still the newest one, so a
//! slow response for an earlier selection can never overwrite a newer one.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Selection {
    generation: u64,
}

impl Selection {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Default)]
pub struct SelectionTracker {
    latest: AtomicU64,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new selection, superseding all earlier ones.
    pub fn begin(&self) -> Selection {
        Selection {
            generation: self.latest.fetch_add(1, Ordering::SeqCst) + 1,
        }
    }

    pub fn is_current(&self, selection: &Selection) -> bool {
        self.latest.load(Ordering::SeqCst) == selection.generation
    }

    /// Stores `value` into `slot` only if `selection` is still current.
    /// Returns whether the value was applied.
    pub fn apply<T>(&self, selection: &Selection, value: T, slot: &mut Option<T>) -> bool {
        if !self.is_current(selection) {
            return false;
        }
        *slot = Some(value);
        true
    }
}
