/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Heartbeat and TestRequest timing.
//!
//! The monitor is polled on a timer and answers what the session should do
//! next: nothing, send a Heartbeat, probe the peer with a TestRequest, or
//! give up on a silent peer. It takes `now` explicitly so tests can drive it.

use std::time::{Duration, Instant};

/// What the session should do after a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeartbeatAction {
    /// Nothing is due.
    Idle,
    /// Nothing has been sent for a full interval.
    SendHeartbeat,
    /// The peer has been silent; probe it with this TestReqID.
    SendTestRequest(String),
    /// The peer ignored the TestRequest.
    Disconnect,
}

/// Tracks send/receive activity against the negotiated heartbeat interval.
#[derive(Debug)]
pub struct HeartbeatMonitor {
    interval: Duration,
    last_sent: Instant,
    last_received: Instant,
    pending_test: Option<Instant>,
    test_counter: u64,
}

impl HeartbeatMonitor {
    /// Creates a monitor with both clocks starting at `now`.
    ///
    /// # Arguments
    /// * `interval` - The heartbeat interval
    /// * `now` - Current instant
    #[must_use]
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last_sent: now,
            last_received: now,
            pending_test: None,
            test_counter: 0,
        }
    }

    /// Heartbeat interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Records an outbound message.
    #[inline]
    pub fn on_sent(&mut self, now: Instant) {
        self.last_sent = now;
    }

    /// Records an inbound message. Any traffic answers an outstanding probe.
    #[inline]
    pub fn on_received(&mut self, now: Instant) {
        self.last_received = now;
        self.pending_test = None;
    }

    /// Returns true while a TestRequest is unanswered.
    #[must_use]
    pub const fn is_probing(&self) -> bool {
        self.pending_test.is_some()
    }

    /// Decides the next action.
    ///
    /// The peer is probed once it has been silent for the interval plus a
    /// fifth, and abandoned if the probe itself goes unanswered for an
    /// interval. A zero interval disables heartbeats altogether.
    pub fn poll(&mut self, now: Instant) -> HeartbeatAction {
        if self.interval.is_zero() {
            return HeartbeatAction::Idle;
        }
        if let Some(sent_at) = self.pending_test {
            if now.saturating_duration_since(sent_at) >= self.interval {
                return HeartbeatAction::Disconnect;
            }
        } else if now.saturating_duration_since(self.last_received)
            >= self.interval + self.interval / 5
        {
            self.test_counter += 1;
            self.pending_test = Some(now);
            return HeartbeatAction::SendTestRequest(format!("TEST{}", self.test_counter));
        }

        if now.saturating_duration_since(self.last_sent) >= self.interval {
            HeartbeatAction::SendHeartbeat
        } else {
            HeartbeatAction::Idle
        }
    }
}
