//! Double-buffer handoff between the drawing thread and the render thread.
//!
//! The coordinator is a single-slot mailbox, not a queue. A frame swapped in
//! before the render thread picked up the previous one replaces it, so a slow
//! display always shows the newest frame and drops the ones in between.

use crate::CanvasHandle;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Default)]
struct Slots {
    /// Canvas the render thread is showing.
    current: Option<CanvasHandle>,
    /// Latest canvas handed over but not yet picked up.
    pending: Option<CanvasHandle>,
}

#[derive(Default)]
pub struct SwapCoordinator {
    slots: Mutex<Slots>,
}

impl SwapCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make `canvas` the displayed canvas right away.
    pub fn set_canvas(&self, canvas: CanvasHandle) {
        self.slots().current = Some(canvas);
    }

    /// Hand over a finished canvas and get back the one currently displayed,
    /// which becomes the caller's next drawing target.
    ///
    /// Never blocks on the render thread. Returns `None` only when no canvas
    /// has been displayed yet.
    pub fn swap_on_vsync(&self, other: CanvasHandle) -> Option<CanvasHandle> {
        let mut slots = self.slots();
        let prev = slots.current.clone();
        tracing::debug!("Queued canvas for display");
        if slots.pending.replace(other).is_some() {
            tracing::trace!("Dropping frame that was never displayed");
        }
        prev
    }

    /// Promote the pending canvas, if any, and return the one to display.
    ///
    /// The promotion happens under the lock, so the render thread sees either
    /// the old pair or the new one, never a mix.
    pub fn take_frame(&self) -> Option<CanvasHandle> {
        let mut slots = self.slots();
        if let Some(next) = slots.pending.take() {
            tracing::debug!("Promoted pending canvas");
            slots.current = Some(next);
        }
        slots.current.clone()
    }

    pub fn current(&self) -> Option<CanvasHandle> {
        self.slots().current.clone()
    }

    pub fn has_pending(&self) -> bool {
        self.slots().pending.is_some()
    }
}

// ── Frame pacing ─────────────────────────────────────────────────────

/// Emulates vertical sync by sleeping until the next frame slot.
///
/// With a frame rate fraction of `n`, swaps are spaced at least `1/n`
/// seconds apart. A fraction of zero disables pacing.
#[derive(Debug, Default)]
pub struct FramePacer {
    last_swap: Option<Instant>,
}

impl FramePacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimum spacing between swaps for a given fraction.
    pub fn interval(framerate_fraction: u32) -> Option<Duration> {
        (framerate_fraction > 0).then(|| Duration::from_secs(1) / framerate_fraction)
    }

    /// Block until the next swap is allowed and return how long we slept.
    pub fn wait(&mut self, framerate_fraction: u32) -> Duration {
        let mut slept = Duration::ZERO;
        if let (Some(interval), Some(last)) = (Self::interval(framerate_fraction), self.last_swap) {
            let deadline = last + interval;
            let now = Instant::now();
            if deadline > now {
                slept = deadline - now;
                tracing::debug!("Pacing swap: sleeping {}µs", slept.as_micros());
                thread::sleep(slept);
            }
        }
        self.last_swap = Some(Instant::now());
        slept
    }
}
