use crate::session::{EventSender, SessionEvent};

use std::time::Duration;

use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tracing::debug;

/// Owned background task that is aborted when dropped.
#[derive(Debug)]
pub struct TaskHandle {
    label: &'static str,
    handle: JoinHandle<()>,
}

impl TaskHandle {
    fn new(label: &'static str, handle: JoinHandle<()>) -> Self {
        Self { label, handle }
    }

    /// What this task does.
    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.handle.abort();
        debug!(task = self.label, "Task cancelled");
    }
}

/// Start the once-per-period display tick.
///
/// Ticks only prompt a redraw; elapsed time itself comes from the clock, so
/// a tick missed while the host was suspended loses nothing.
pub fn spawn_ticker(period: Duration, events: EventSender) -> TaskHandle {
    // Periods count from the spawn, not from the task's first poll.
    let first = Instant::now() + period;
    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(first, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            if events.send(SessionEvent::Tick).is_err() {
                break;
            }
        }
    });

    TaskHandle::new("tick", handle)
}

/// Deliver `event` once after `delay`.
pub fn spawn_delayed(
    label: &'static str,
    delay: Duration,
    event: SessionEvent,
    events: EventSender,
) -> TaskHandle {
    let deadline = Instant::now() + delay;
    let handle = tokio::spawn(async move {
        tokio::time::sleep_until(deadline).await;
        let _ = events.send(event);
    });

    TaskHandle::new(label, handle)
}
