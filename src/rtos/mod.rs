//! Timekeeping for blocking loops.
//!
//! The scheduler itself belongs to the kernel; this module only carries the
//! clock type handed out by [`Hardware::now`](crate::adi::Hardware::now) and
//! the bookkeeping for loops with a time limit.

use core::time::Duration;

mod instant;

pub use instant::*;

/// An optional time limit on a blocking loop, started at a fixed instant.
///
/// A `Deadline` without a limit never expires; that is how the unguarded
/// primitives stay unguarded unless a timeout is configured.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deadline {
    start: Instant,
    limit: Option<Duration>,
}

impl Deadline {
    #[inline]
    /// Starts a deadline at `start` which expires after `limit`, if any.
    pub fn new(start: Instant, limit: Option<Duration>) -> Self {
        Self { start, limit }
    }

    #[inline]
    /// Starts a deadline at `start` which never expires.
    pub fn unbounded(start: Instant) -> Self {
        Self::new(start, None)
    }

    #[inline]
    /// The time at which the deadline was started.
    pub fn start(&self) -> Instant {
        self.start
    }

    #[inline]
    /// The configured limit.
    pub fn limit(&self) -> Option<Duration> {
        self.limit
    }

    #[inline]
    /// Time elapsed between the start and `now`.
    pub fn elapsed(&self, now: Instant) -> Duration {
        now - self.start
    }

    /// Whether the limit has been reached at `now`.
    pub fn expired(&self, now: Instant) -> bool {
        match self.limit {
            Some(limit) => self.elapsed(now) >= limit,
            None => false,
        }
    }
}
