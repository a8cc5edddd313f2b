//! Wall clock and blocking sleep.

use chrono::NaiveDateTime;
use std::time::Duration;

pub trait ClockPort {
    /// Local wall time.
    fn now(&self) -> NaiveDateTime;

    fn sleep(&self, duration: Duration);
}
