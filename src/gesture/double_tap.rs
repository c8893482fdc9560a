use std::time::Duration;

/// Fires when two taps land within the timeout. The pair is consumed, so a
/// third quick tap starts a new pair.
#[derive(Debug, Clone)]
pub struct DoubleTapDetector {
    timeout: Duration,
    last_tap: Option<Duration>,
}

impl DoubleTapDetector {
    pub fn new(timeout: Duration) -> Self { Self { timeout, last_tap: None } }

    pub fn set_timeout(&mut self, timeout: Duration) { self.timeout = timeout; }

    pub fn reset(&mut self) { self.last_tap = None; }

    /// Records a tap ending at `time`; returns true when it completes a
    /// double tap.
    pub fn on_tap(&mut self, time: Duration) -> bool {
        match self.last_tap.take() {
            Some(prev) if time.saturating_sub(prev) < self.timeout => true,
            _ => {
                self.last_tap = Some(time);
                false
            }
        }
    }
}
