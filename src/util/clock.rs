//! Wall-clock and timer seam.
//!
//! Browser (hydrate): `Date.now()` and `gloo-timers`.
//! Native: a wall-clock anchor advanced by `tokio::time`, so tests running
//! with a paused tokio clock see `now_ms()` move with their sleeps.

#[cfg(test)]
#[path = "clock_test.rs"]
mod clock_test;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

/// Milliseconds since the Unix epoch plus an async sleep.
#[async_trait(?Send)]
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
    async fn sleep(&self, duration: Duration);
}

pub type SharedClock = Arc<dyn Clock>;

#[cfg(feature = "hydrate")]
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserClock;

#[cfg(feature = "hydrate")]
#[async_trait(?Send)]
impl Clock for BrowserClock {
    #[allow(clippy::cast_possible_truncation)]
    fn now_ms(&self) -> i64 {
        js_sys::Date::now() as i64
    }

    async fn sleep(&self, duration: Duration) {
        gloo_timers::future::sleep(duration).await;
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[derive(Clone, Copy, Debug)]
pub struct TokioClock {
    anchor_ms: i64,
    anchor: tokio::time::Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl TokioClock {
    pub fn new() -> Self {
        let anchor_ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX));
        Self::starting_at(anchor_ms)
    }

    /// Clock reading `anchor_ms` right now.
    pub fn starting_at(anchor_ms: i64) -> Self {
        Self {
            anchor_ms,
            anchor: tokio::time::Instant::now(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[async_trait(?Send)]
impl Clock for TokioClock {
    fn now_ms(&self) -> i64 {
        let elapsed = i64::try_from(self.anchor.elapsed().as_millis()).unwrap_or(i64::MAX);
        self.anchor_ms.saturating_add(elapsed)
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
