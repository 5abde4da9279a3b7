//! Trailing-edge frame scheduling.

use crate::scene::RenderContext;
use std::cell::Cell;
use std::time::{Duration, Instant};

/// Coalesces render requests into one frame per interval.
///
/// The first request after an idle period arms a deadline one frame interval
/// away; later requests before that deadline only keep the pending flag set.
#[derive(Debug)]
pub struct FrameScheduler {
    interval: Duration,
    pending: Cell<bool>,
    deadline: Cell<Option<Instant>>,
    cancelled: Cell<bool>,
}

impl FrameScheduler {
    /// Scheduler for `fps` frames per second. Zero is treated as one.
    #[must_use]
    pub fn new(fps: u32) -> Self {
        Self {
            interval: Duration::from_millis(1000 / u64::from(fps.max(1))),
            pending: Cell::new(false),
            deadline: Cell::new(None),
            cancelled: Cell::new(false),
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Ask for a frame, arming the timer if none is running.
    pub fn request_at(&self, now: Instant) {
        if self.cancelled.get() {
            return;
        }
        self.pending.set(true);
        if self.deadline.get().is_none() {
            self.deadline.set(Some(now + self.interval));
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline.get()
    }

    /// Time left until the armed frame, zero when overdue.
    #[must_use]
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .get()
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Fire the timer if its deadline has passed. Returns whether a frame
    /// should run now.
    pub fn take_due(&self, now: Instant) -> bool {
        match self.deadline.get() {
            Some(deadline) if deadline <= now => {
                self.deadline.set(None);
                self.pending.replace(false)
            }
            _ => false,
        }
    }

    /// Drop any armed frame and refuse further requests.
    pub fn cancel(&self) {
        self.cancelled.set(true);
        self.pending.set(false);
        self.deadline.set(None);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

impl RenderContext for FrameScheduler {
    fn request_render(&self) {
        self.request_at(Instant::now());
    }
}
