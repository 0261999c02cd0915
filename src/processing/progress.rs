//! Completion accounting and time-remaining estimates for a run.

use std::time::{Duration, Instant};

/// Progress state owned by the coordinator for the lifetime of one run.
///
/// Successful and failed archives both count as completed.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    total: usize,
    completed: usize,
    started: Instant,
}

/// Snapshot emitted after each completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressUpdate {
    /// Archives completed so far.
    pub completed: usize,
    /// Archives in the run.
    pub total: usize,
    /// Completed share in percent.
    pub percent: f64,
    /// Time since the run started.
    pub elapsed: Duration,
    /// Average time per completed archive multiplied by the archives left.
    pub remaining: Duration,
}

impl ProgressTracker {
    /// Start tracking a run of `total` archives now.
    pub fn new(total: usize) -> Self {
        Self::starting_at(total, Instant::now())
    }

    /// Start tracking a run that began at `started`.
    pub fn starting_at(total: usize, started: Instant) -> Self {
        Self {
            total,
            completed: 0,
            started,
        }
    }

    /// Archives in the run.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Archives completed so far.
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Time since the run started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Count one more completed archive.
    pub fn record_completion(&mut self) -> ProgressUpdate {
        self.record_completion_at(Instant::now())
    }

    /// Count one more completed archive as of `now`.
    pub fn record_completion_at(&mut self, now: Instant) -> ProgressUpdate {
        self.completed = (self.completed + 1).min(self.total.max(1));
        let elapsed = now.saturating_duration_since(self.started);
        let left = self.total.saturating_sub(self.completed);
        let remaining = elapsed.mul_f64(left as f64 / self.completed as f64);
        let percent = if self.total == 0 {
            100.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        };

        ProgressUpdate {
            completed: self.completed,
            total: self.total,
            percent,
            elapsed,
            remaining,
        }
    }
}

/// Render a duration as `H:MM:SS`.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}
