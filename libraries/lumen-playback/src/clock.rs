//! Timer seam
//!
//! Settle delays and the navigation lock need a monotonic clock and a way to
//! wait. Native builds use tokio's timer (which tests can pause); the browser
//! backend provides its own implementation.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Local (not `Send`) sleep future
pub type Sleep = Pin<Box<dyn Future<Output = ()>>>;

/// Monotonic clock with timers
pub trait Clock {
    /// Time elapsed since the clock was created
    fn now(&self) -> Duration;

    /// Future that completes after `duration`
    fn sleep(&self, duration: Duration) -> Sleep;
}

/// Clock backed by `tokio::time`
///
/// Works with `#[tokio::test(start_paused = true)]`, so timer-driven flows
/// run instantly and deterministically in tests.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin: tokio::time::Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl TokioClock {
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Clock for TokioClock {
    fn now(&self) -> Duration {
        tokio::time::Instant::now().duration_since(self.origin)
    }

    fn sleep(&self, duration: Duration) -> Sleep {
        Box::pin(tokio::time::sleep(duration))
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn tokio_clock_follows_paused_time() {
        let clock = TokioClock::new();
        assert_eq!(clock.now(), Duration::ZERO);

        clock.sleep(Duration::from_millis(250)).await;
        let after_sleep = clock.now();
        assert!(after_sleep >= Duration::from_millis(250));

        tokio::time::advance(Duration::from_millis(50)).await;
        assert_eq!(clock.now(), after_sleep + Duration::from_millis(50));
    }
}
