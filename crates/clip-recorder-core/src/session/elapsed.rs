//! Wall-clock based elapsed recording time.
//!
//! Elapsed time is never counted from timer ticks: the host may suspend
//! timers while the app is backgrounded. It is always derived as
//! `(now - recording_start) + accumulated_background` at one-second
//! granularity, where `recording_start` anchors the foreground portion of
//! the take.

/// Elapsed-time bookkeeping for one take.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingClock {
    recording_start_ms: Option<u64>,
    accumulated_background_secs: u64,
    last_background_enter_ms: Option<u64>,
}

impl RecordingClock {
    /// Begin a fresh take at `now_ms`.
    pub fn start(&mut self, now_ms: u64) {
        self.recording_start_ms = Some(now_ms);
        self.accumulated_background_secs = 0;
        self.last_background_enter_ms = None;
    }

    /// Whole seconds of recording at `now_ms`.
    pub fn elapsed_secs(&self, now_ms: u64) -> u64 {
        match self.recording_start_ms {
            Some(start) => now_ms.saturating_sub(start) / 1000 + self.accumulated_background_secs,
            None => 0,
        }
    }

    /// The app left the foreground while recording.
    pub fn enter_background(&mut self, now_ms: u64) {
        if self.recording_start_ms.is_some() && self.last_background_enter_ms.is_none() {
            self.last_background_enter_ms = Some(now_ms);
        }
    }

    /// The app returned to the foreground. Returns the whole seconds folded
    /// into the background total, or `None` if no background interval was
    /// open.
    pub fn enter_foreground(&mut self, now_ms: u64) -> Option<u64> {
        let entered = self.last_background_enter_ms.take()?;
        let delta_secs = now_ms.saturating_sub(entered) / 1000;

        self.accumulated_background_secs += delta_secs;
        // The anchor only measures foreground time, so it moves forward by
        // exactly what was credited to the background total.
        if let Some(start) = self.recording_start_ms.as_mut() {
            *start += delta_secs * 1000;
        }

        Some(delta_secs)
    }

    /// Freeze the take and return the elapsed seconds to display while paused.
    pub fn pause(&mut self, now_ms: u64) -> u64 {
        self.enter_foreground(now_ms);
        self.elapsed_secs(now_ms)
    }

    /// Continue a paused take from `paused_secs`.
    ///
    /// The start anchor is rebuilt retroactively so the elapsed formula
    /// yields `paused_secs` at `now_ms`.
    pub fn resume(&mut self, now_ms: u64, paused_secs: u64) {
        let foreground_secs = paused_secs.saturating_sub(self.accumulated_background_secs);
        self.recording_start_ms = Some(now_ms.saturating_sub(foreground_secs * 1000));
        self.last_background_enter_ms = None;
    }

    /// Clear every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Start of the foreground portion of the take.
    pub fn recording_start_ms(&self) -> Option<u64> {
        self.recording_start_ms
    }

    /// Seconds spent backgrounded while actively recording.
    pub fn accumulated_background_secs(&self) -> u64 {
        self.accumulated_background_secs
    }

    /// When the current background interval began, if one is open.
    pub fn last_background_enter_ms(&self) -> Option<u64> {
        self.last_background_enter_ms
    }
}

/// Render seconds as `m:ss`.
pub fn format_elapsed(total_secs: u64) -> String {
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// Render milliseconds as `m:ss`.
pub fn format_millis(ms: u64) -> String {
    format_elapsed(ms / 1000)
}
