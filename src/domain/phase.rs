//! Session phases derived from wall time and weekday.

use chrono::{Datelike, NaiveDateTime, NaiveTime, Weekday};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    WeekendSkip,
    /// Before market open; nothing to do but wait.
    BeforeOpen,
    PreOpen,
    BuyWindow,
    SellWindow,
    Exit,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::WeekendSkip => "WEEKEND_SKIP",
            Phase::BeforeOpen => "BEFORE_OPEN",
            Phase::PreOpen => "PRE_OPEN",
            Phase::BuyWindow => "BUY_WINDOW",
            Phase::SellWindow => "SELL_WINDOW",
            Phase::Exit => "EXIT",
        };
        f.write_str(name)
    }
}

/// The four fixed boundaries of a session, in local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSchedule {
    pub market_open: NaiveTime,
    pub buy_start: NaiveTime,
    pub sell_start: NaiveTime,
    pub exit: NaiveTime,
}

impl Default for SessionSchedule {
    fn default() -> Self {
        SessionSchedule {
            market_open: hm(9, 0),
            buy_start: hm(9, 5),
            sell_start: hm(15, 15),
            exit: hm(15, 20),
        }
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

impl SessionSchedule {
    pub fn is_ordered(&self) -> bool {
        self.market_open < self.buy_start
            && self.buy_start < self.sell_start
            && self.sell_start < self.exit
    }

    /// Weekend first, then half-open windows: `[open, buy_start)` pre-open,
    /// `[buy_start, sell_start)` buy, `[sell_start, exit)` sell.
    pub fn phase_at(&self, now: NaiveDateTime) -> Phase {
        if matches!(now.weekday(), Weekday::Sat | Weekday::Sun) {
            return Phase::WeekendSkip;
        }
        let t = now.time();
        if t >= self.exit {
            Phase::Exit
        } else if t >= self.sell_start {
            Phase::SellWindow
        } else if t >= self.buy_start {
            Phase::BuyWindow
        } else if t >= self.market_open {
            Phase::PreOpen
        } else {
            Phase::BeforeOpen
        }
    }
}
