//! Per-session mutable state owned by the main loop.

use chrono::{NaiveDateTime, Timelike};

#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    target_position_count: usize,
    bought: Vec<String>,
    pre_open_liquidated: bool,
    last_balance_report: Option<NaiveDateTime>,
}

impl SessionContext {
    pub fn new(target_position_count: usize) -> Self {
        SessionContext {
            target_position_count,
            bought: Vec::new(),
            pre_open_liquidated: false,
            last_balance_report: None,
        }
    }

    pub fn is_bought(&self, symbol: &str) -> bool {
        self.bought.iter().any(|s| s == symbol)
    }

    pub fn bought(&self) -> &[String] {
        &self.bought
    }

    pub fn bought_count(&self) -> usize {
        self.bought.len()
    }

    pub fn has_capacity(&self) -> bool {
        self.bought.len() < self.target_position_count
    }

    /// Returns false when the symbol is already recorded or the target count
    /// has been reached.
    pub fn record_bought(&mut self, symbol: &str) -> bool {
        if self.is_bought(symbol) || !self.has_capacity() {
            return false;
        }
        self.bought.push(symbol.to_string());
        true
    }

    /// True exactly once per session.
    pub fn take_pre_open_liquidation(&mut self) -> bool {
        if self.pre_open_liquidated {
            return false;
        }
        self.pre_open_liquidated = true;
        true
    }

    pub fn pre_open_liquidated(&self) -> bool {
        self.pre_open_liquidated
    }

    /// True at most once per wall-clock minute.
    pub fn take_balance_report(&mut self, now: NaiveDateTime) -> bool {
        let minute = now
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(now);
        if self.last_balance_report == Some(minute) {
            return false;
        }
        self.last_balance_report = Some(minute);
        true
    }
}
