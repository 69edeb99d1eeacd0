//! Trailing-edge debounce over host-supplied timestamps

/// Coalesces bursts of triggers into one deadline.
///
/// Timestamps are milliseconds from any monotonic host clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Debouncer {
    delay_ms: f64,
    deadline: Option<f64>,
}

impl Debouncer {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms: delay_ms.max(0.0),
            deadline: None,
        }
    }

    pub fn delay_ms(&self) -> f64 {
        self.delay_ms
    }

    /// Arm (or re-arm) the deadline `delay_ms` after `now`, replacing any pending one
    pub fn schedule(&mut self, now: f64) -> f64 {
        let due_at = now + self.delay_ms;
        self.deadline = Some(due_at);
        due_at
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<f64> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn is_due(&self, now: f64) -> bool {
        self.deadline.is_some_and(|due_at| now >= due_at)
    }
}
