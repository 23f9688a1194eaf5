//! Delayed, cancellable triggers.
//!
//! [`schedule`] runs a callback after a delay and returns a handle that can
//! cancel it. [`Debouncer`] builds on it: each trigger cancels the previous
//! one, so only the last trigger of a burst fires.
//!
//! A callback that already fired may have queued work before it could be
//! cancelled. Each trigger therefore carries a ticket, and the consumer asks
//! [`Debouncer::accept`] whether a ticket is still the current one.

use std::time::Duration;

use tokio::task::JoinHandle;

/// Handle to a scheduled callback.
#[derive(Debug)]
pub struct ScheduledTask {
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Cancel the callback if it has not run yet.
    pub fn cancel(&self) {
        self.handle.abort();
    }
}

/// Run `task` after `delay` on the Tokio runtime.
pub fn schedule<F>(delay: Duration, task: F) -> ScheduledTask
where
    F: FnOnce() + Send + 'static,
{
    let deadline = tokio::time::Instant::now() + delay;
    let handle = tokio::spawn(async move {
        tokio::time::sleep_until(deadline).await;
        task();
    });
    ScheduledTask { handle }
}

/// Coalesces bursts of triggers into one delayed firing.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    ticket: u64,
    pending: Option<ScheduledTask>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            ticket: 0,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancel any pending firing and schedule `fire` after the delay.
    ///
    /// `fire` receives the ticket of this trigger. Returns that ticket.
    pub fn trigger<F>(&mut self, fire: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        if let Some(previous) = self.pending.take() {
            previous.cancel();
        }

        self.ticket += 1;
        let ticket = self.ticket;
        self.pending = Some(schedule(self.delay, move || fire(ticket)));
        ticket
    }

    /// Cancel the pending firing, if any. Tickets already handed out become
    /// stale.
    pub fn cancel(&mut self) {
        if let Some(previous) = self.pending.take() {
            previous.cancel();
        }
        self.ticket += 1;
    }

    /// Claim a firing. Returns `true` exactly once for the latest trigger.
    pub fn accept(&mut self, ticket: u64) -> bool {
        if ticket == self.ticket && self.pending.is_some() {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Returns `true` while a trigger is waiting to be accepted.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
