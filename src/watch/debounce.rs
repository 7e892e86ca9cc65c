use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Trailing-edge debounce timer.
///
/// Each `trigger` pushes the deadline out by the configured delay. `fired`
/// resolves once the deadline passes with no further triggers and reports
/// how many triggers it coalesced.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
    pending: usize,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
            pending: 0,
        }
    }

    pub fn trigger(&mut self) {
        self.deadline = Some(Instant::now() + self.delay);
        self.pending += 1;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Drops any pending deadline without firing
    pub fn cancel(&mut self) {
        self.deadline = None;
        self.pending = 0;
    }

    /// Waits for the pending deadline. Never resolves while idle.
    ///
    /// Cancel safe: state only changes after the deadline is reached.
    pub async fn fired(&mut self) -> usize {
        match self.deadline {
            Some(deadline) => {
                sleep_until(deadline).await;
                self.deadline = None;
                std::mem::take(&mut self.pending)
            }
            None => std::future::pending().await,
        }
    }
}
