//! Repeating timer capability consumed by the widget.
//!
//! The widget only registers and cancels; delivering the ticks is the host's
//! job. On each firing the host calls [`PulseWidget::tick`](crate::PulseWidget::tick),
//! which is the body of the recurring callback.

use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Identifies one registration made with [`Timer::every`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// "Repeat every `period`" with explicit cancellation.
pub trait Timer {
    type Handle;

    fn every(&mut self, period: Duration) -> Self::Handle;
    fn cancel(&mut self, handle: Self::Handle);
}

// ── Manual timer ─────────────────────────────────────────────────────

/// A timer that never fires on its own.
///
/// It only records registrations, which makes it the timer of choice for
/// tests and for offline frame export, where the host advances the
/// animation one tick at a time.
#[derive(Debug, Default)]
pub struct ManualTimer {
    next_id: u64,
    active: Vec<(TimerHandle, Duration)>,
    registrations: usize,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while at least one registration is live.
    pub fn is_armed(&self) -> bool {
        !self.active.is_empty()
    }

    /// Period of the oldest live registration.
    pub fn period(&self) -> Option<Duration> {
        self.active.first().map(|(_, period)| *period)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Total number of `every` calls ever made.
    pub fn registrations(&self) -> usize {
        self.registrations
    }
}

impl Timer for ManualTimer {
    type Handle = TimerHandle;

    fn every(&mut self, period: Duration) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.registrations += 1;
        self.active.push((handle, period));
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.active.retain(|(h, _)| *h != handle);
    }
}

// ── Tokio interval timer ─────────────────────────────────────────────

/// A timer driven by `tokio::time::interval`.
///
/// Holds at most one armed interval. The first firing happens one period
/// after registration. Ticks missed while a frame was being drawn are
/// skipped rather than bunched up.
///
/// `every` must be called from within a tokio runtime.
#[derive(Debug, Default)]
pub struct IntervalTimer {
    next_id: u64,
    armed: Option<(TimerHandle, Interval)>,
}

impl IntervalTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Resolve on the next firing. Never resolves while disarmed.
    pub async fn fired(&mut self) {
        match &mut self.armed {
            Some((_, interval)) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

impl Timer for IntervalTimer {
    type Handle = TimerHandle;

    fn every(&mut self, period: Duration) -> TimerHandle {
        // tokio panics on a zero period
        let period = period.max(Duration::from_millis(1));
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.armed = Some((handle, interval));
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if matches!(&self.armed, Some((h, _)) if *h == handle) {
            self.armed = None;
        }
    }
}
