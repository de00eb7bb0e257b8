//! Clock on browser timers

use crate::clock::{Clock, Sleep};
use gloo_timers::future::TimeoutFuture;
use std::time::Duration;

/// Wall clock via `Date.now()`, sleeping with `setTimeout`
#[derive(Debug, Clone, Copy)]
pub struct BrowserClock {
    origin_ms: f64,
}

impl BrowserClock {
    pub fn new() -> Self {
        Self {
            origin_ms: js_sys::Date::now(),
        }
    }
}

impl Default for BrowserClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for BrowserClock {
    fn now(&self) -> Duration {
        // Date.now() may step backwards; never report negative elapsed time
        let elapsed_ms = (js_sys::Date::now() - self.origin_ms).max(0.0);
        Duration::from_secs_f64(elapsed_ms / 1000.0)
    }

    fn sleep(&self, duration: Duration) -> Sleep {
        let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        Box::pin(TimeoutFuture::new(millis))
    }
}
