use std::time::Duration;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// What the session should do on a heartbeat tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatTick {
    /// Send a `ping` probe
    Probe,
    /// The previous probe was never answered
    TimedOut,
}

/// Periodic liveness probe for one session.
///
/// Owned by the session task, so it needs no locking: the session calls
/// [`ack`](Self::ack) when a `pong` arrives.
pub struct HeartbeatManager {
    interval: Interval,
    pending: bool,
}

impl HeartbeatManager {
    pub fn new(period: Duration) -> Self {
        // First tick one period after connecting, not immediately
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        Self {
            interval,
            pending: false,
        }
    }

    pub async fn tick(&mut self) -> HeartbeatTick {
        self.interval.tick().await;

        if self.pending {
            HeartbeatTick::TimedOut
        } else {
            self.pending = true;
            HeartbeatTick::Probe
        }
    }

    /// Clears the pending probe (call this when a `pong` is received)
    pub fn ack(&mut self) {
        self.pending = false;
    }
}

/// Next tick of an optional heartbeat; never resolves when disabled
pub async fn next_tick(heartbeat: &mut Option<HeartbeatManager>) -> HeartbeatTick {
    match heartbeat {
        Some(manager) => manager.tick().await,
        None => std::future::pending().await,
    }
}
