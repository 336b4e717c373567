use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::info;

/// Outcome of asking a [`Throttle`] whether an event may go through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Valve {
    /// Below the limit
    Open,
    /// This event is the last one allowed in the current period
    Closing,
    /// Over the limit; drop the event
    Closed,
}

struct Window {
    started: Instant,
    count: u32,
}

/// Allows at most `max_events` events per `period`.
///
/// When a period that overflowed ends, the number of suppressed events is
/// logged once.
pub struct Throttle {
    name: &'static str,
    max_events: u32,
    period: Duration,
    window: Mutex<Window>,
}

impl Throttle {
    pub fn new(name: &'static str, max_events: u32, period: Duration) -> Self {
        Self {
            name,
            max_events,
            period,
            window: Mutex::new(Window {
                started: Instant::now(),
                count: 0,
            }),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn should_throttle(&self) -> Valve {
        let mut window = self.window.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        if now.duration_since(window.started) >= self.period {
            if window.count > self.max_events {
                info!(
                    "{}: suppressed {} events in the last {:?}",
                    self.name,
                    window.count - self.max_events,
                    self.period
                );
            }
            window.started = now;
            window.count = 0;
        }

        window.count += 1;
        if window.count < self.max_events {
            Valve::Open
        } else if window.count == self.max_events {
            Valve::Closing
        } else {
            Valve::Closed
        }
    }
}
