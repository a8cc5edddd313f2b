//! Local wall clock backed by chrono and `std::thread::sleep`.

use chrono::{Local, NaiveDateTime};
use std::time::Duration;

use crate::ports::clock_port::ClockPort;

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}
