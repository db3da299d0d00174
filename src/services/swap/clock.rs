// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio_util::sync::CancellationToken;

/// Time source for every delay the engine takes.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Monotonic time since the clock was created.
    fn now(&self) -> Duration;

    /// Wall-clock UNIX seconds, used for swap deadlines.
    fn unix_now(&self) -> u64;

    async fn sleep(&self, duration: Duration);
}

pub struct TokioClock {
    started: tokio::time::Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            started: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Duration {
        self.started.elapsed()
    }

    fn unix_now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Simulated clock: `sleep` advances time instantly and is recorded.
///
/// `stop_at` cancels a token once simulated time reaches the deadline, which
/// lets a daily run be driven for a fixed number of simulated days.
pub struct ManualClock {
    unix_base: u64,
    now: Mutex<Duration>,
    sleeps: Mutex<Vec<Duration>>,
    stop: Mutex<Option<(Duration, CancellationToken)>>,
}

impl ManualClock {
    pub fn new(unix_base: u64) -> Self {
        Self {
            unix_base,
            now: Mutex::new(Duration::ZERO),
            sleeps: Mutex::new(Vec::new()),
            stop: Mutex::new(None),
        }
    }

    pub fn stop_at(&self, deadline: Duration, token: CancellationToken) {
        if let Ok(mut guard) = self.stop.lock() {
            *guard = Some((deadline, token));
        }
    }

    pub fn advance(&self, by: Duration) {
        let now = {
            let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
            *guard = guard.saturating_add(by);
            *guard
        };
        let stop = self.stop.lock().ok().and_then(|g| g.clone());
        if let Some((deadline, token)) = stop
            && now >= deadline
        {
            token.cancel();
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps
            .lock()
            .map(|g| g.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn unix_now(&self) -> u64 {
        self.unix_base.saturating_add(self.now().as_secs())
    }

    async fn sleep(&self, duration: Duration) {
        if let Ok(mut guard) = self.sleeps.lock() {
            guard.push(duration);
        }
        self.advance(duration);
        tokio::task::yield_now().await;
    }
}
