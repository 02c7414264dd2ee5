// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction.
//!
//! The batching queue handler (count/time triggers) and the poll-timeout
//! logic in the tail executor both need a monotonic clock; the checkpoint
//! cell and the classifier need wall-clock UTC time. [`Clock`] provides
//! both so tests can advance time deterministically instead of sleeping.

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Abstracts over time so tests don't need real sleeps.
pub trait Clock: Clone + Send + Sync + 'static {
    /// Monotonic instant, used for trigger/timeout arithmetic.
    fn now(&self) -> Instant;
    /// Wall-clock UTC time, used for checkpoint timestamps.
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Real clock backed by the OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock for tests: starts at a fixed instant and only moves
/// when [`FakeClock::advance`] is called.
#[derive(Clone)]
pub struct FakeClock {
    inner: Arc<Mutex<FakeClockState>>,
}

struct FakeClockState {
    monotonic: Instant,
    utc: DateTime<Utc>,
}

impl FakeClock {
    /// Create a clock anchored at `Instant::now()` / the given UTC time.
    pub fn new(utc: DateTime<Utc>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeClockState {
                monotonic: Instant::now(),
                utc,
            })),
        }
    }

    /// Advance both the monotonic and wall-clock readings by `d`.
    pub fn advance(&self, d: Duration) {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.monotonic += d;
        state.utc += d;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new(DateTime::from_timestamp(0, 0).unwrap_or_default())
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).monotonic
    }

    fn now_utc(&self) -> DateTime<Utc> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).utc
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
