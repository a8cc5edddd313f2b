#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use voltrader::domain::error::VoltraderError;
pub use voltrader::domain::ohlcv::OhlcvBar;
use voltrader::domain::order::{OrderRequest, OrderSide, OrderStatus};
use voltrader::domain::phase::SessionSchedule;
use voltrader::domain::position::{AccountSnapshot, Position};
use voltrader::domain::signal::SignalParams;
use voltrader::domain::trader::{Timing, TraderConfig};
use voltrader::ports::broker_port::{BrokerPort, Quote};
use voltrader::ports::clock_port::ClockPort;
use voltrader::ports::notify_port::NotifyPort;

/// Scriptable in-memory broker. Orders default to `Accepted`; accepted buys
/// fill in full and accepted sells fill up to `sell_fill_limit`.
pub struct MockBroker {
    pub ready: bool,
    pub cash: f64,
    pub quotes: HashMap<String, Quote>,
    pub bars: HashMap<String, Vec<OhlcvBar>>,
    pub holdings: RefCell<Vec<Position>>,
    pub statuses: RefCell<VecDeque<OrderStatus>>,
    pub lockout: Duration,
    pub fill_buys: bool,
    pub sell_fill_limit: Option<i64>,
    pub fail_positions: Cell<bool>,
    pub fail_quotes: bool,
    pub orders: RefCell<Vec<OrderRequest>>,
    pub position_queries: Cell<usize>,
}

impl MockBroker {
    pub fn new() -> Self {
        Self {
            ready: true,
            cash: 1_000_000.0,
            quotes: HashMap::new(),
            bars: HashMap::new(),
            holdings: RefCell::new(Vec::new()),
            statuses: RefCell::new(VecDeque::new()),
            lockout: Duration::from_millis(1_500),
            fill_buys: true,
            sell_fill_limit: None,
            fail_positions: Cell::new(false),
            fail_quotes: false,
            orders: RefCell::new(Vec::new()),
            position_queries: Cell::new(0),
        }
    }

    pub fn with_cash(mut self, cash: f64) -> Self {
        self.cash = cash;
        self
    }

    pub fn with_quote(mut self, symbol: &str, last: f64, ask: f64) -> Self {
        self.quotes.insert(
            symbol.to_string(),
            Quote {
                last_price: last,
                best_ask: ask,
                best_bid: ask - 5.0,
            },
        );
        self
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.bars.insert(symbol.to_string(), bars);
        self
    }

    /// Bars and quote for a symbol whose last price is `last`. The breakout
    /// target is 101.2 and both averages are 100.
    pub fn with_symbol(self, symbol: &str, today: NaiveDate, last: f64) -> Self {
        self.with_bars(symbol, flat_bars(today))
            .with_quote(symbol, last, last)
    }

    pub fn with_holding(self, symbol: &str, quantity: i64) -> Self {
        self.holdings.borrow_mut().push(Position {
            symbol: symbol.to_string(),
            name: format!("{} ETF", symbol),
            quantity,
        });
        self
    }

    pub fn with_statuses(self, statuses: Vec<OrderStatus>) -> Self {
        self.statuses.borrow_mut().extend(statuses);
        self
    }

    pub fn with_lockout(mut self, lockout: Duration) -> Self {
        self.lockout = lockout;
        self
    }

    pub fn with_sell_fill_limit(mut self, limit: i64) -> Self {
        self.sell_fill_limit = Some(limit);
        self
    }

    pub fn without_fills(mut self) -> Self {
        self.fill_buys = false;
        self
    }

    pub fn not_ready(mut self) -> Self {
        self.ready = false;
        self
    }

    pub fn orders(&self) -> Vec<OrderRequest> {
        self.orders.borrow().clone()
    }

    pub fn buy_orders(&self) -> Vec<OrderRequest> {
        self.orders
            .borrow()
            .iter()
            .filter(|o| o.side == OrderSide::Buy)
            .cloned()
            .collect()
    }

    pub fn sell_orders(&self) -> Vec<OrderRequest> {
        self.orders
            .borrow()
            .iter()
            .filter(|o| o.side == OrderSide::Sell)
            .cloned()
            .collect()
    }

    pub fn held(&self, symbol: &str) -> i64 {
        self.holdings
            .borrow()
            .iter()
            .filter(|p| p.symbol == symbol)
            .map(|p| p.quantity)
            .sum()
    }

    pub fn total_held(&self) -> i64 {
        self.holdings.borrow().iter().map(|p| p.quantity).sum()
    }

    fn adjust(&self, symbol: &str, delta: i64) {
        let mut holdings = self.holdings.borrow_mut();
        match holdings.iter_mut().find(|p| p.symbol == symbol) {
            Some(p) => p.quantity += delta,
            None => holdings.push(Position {
                symbol: symbol.to_string(),
                name: format!("{} ETF", symbol),
                quantity: delta,
            }),
        }
    }
}

impl BrokerPort for MockBroker {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn quote(&self, symbol: &str) -> Result<Quote, VoltraderError> {
        if self.fail_quotes {
            return Err(VoltraderError::gateway("quote", "quote service down"));
        }
        self.quotes
            .get(symbol)
            .copied()
            .ok_or_else(|| VoltraderError::gateway("quote", format!("unknown symbol {}", symbol)))
    }

    fn daily_bars(&self, symbol: &str, count: usize) -> Result<Vec<OhlcvBar>, VoltraderError> {
        let bars = self.bars.get(symbol).cloned().unwrap_or_default();
        Ok(bars.into_iter().take(count).collect())
    }

    fn available_cash(&self) -> Result<f64, VoltraderError> {
        Ok(self.cash)
    }

    fn positions(&self) -> Result<AccountSnapshot, VoltraderError> {
        if self.fail_positions.get() {
            return Err(VoltraderError::gateway("positions", "balance service down"));
        }
        Ok(AccountSnapshot {
            account_name: "mock".into(),
            evaluation_amount: 0.0,
            evaluation_pnl: 0.0,
            positions: self.holdings.borrow().clone(),
        })
    }

    fn position(&self, symbol: &str) -> Result<Position, VoltraderError> {
        self.position_queries.set(self.position_queries.get() + 1);
        Ok(Position {
            symbol: symbol.to_string(),
            name: format!("{} ETF", symbol),
            quantity: self.held(symbol),
        })
    }

    fn submit_order(&self, order: &OrderRequest) -> Result<OrderStatus, VoltraderError> {
        self.orders.borrow_mut().push(order.clone());
        let status = self
            .statuses
            .borrow_mut()
            .pop_front()
            .unwrap_or(OrderStatus::Accepted);
        if status == OrderStatus::Accepted {
            match order.side {
                OrderSide::Buy if self.fill_buys => self.adjust(&order.symbol, order.quantity),
                OrderSide::Buy => {}
                OrderSide::Sell => {
                    let filled = self
                        .sell_fill_limit
                        .map_or(order.quantity, |limit| limit.min(order.quantity));
                    self.adjust(&order.symbol, -filled);
                }
            }
        }
        Ok(status)
    }

    fn order_lockout_remaining(&self) -> Duration {
        self.lockout
    }
}

/// Clock that only moves when slept on.
pub struct MockClock {
    now: Cell<NaiveDateTime>,
    pub sleeps: RefCell<Vec<Duration>>,
}

impl MockClock {
    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            now: Cell::new(now),
            sleeps: RefCell::new(Vec::new()),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }

    pub fn set(&self, now: NaiveDateTime) {
        self.now.set(now);
    }
}

impl ClockPort for MockClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
        let step = chrono::Duration::from_std(duration).unwrap();
        self.now.set(self.now.get() + step);
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: RefCell<Vec<String>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            messages: RefCell::new(Vec::new()),
            fail: true,
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages.borrow().iter().any(|m| m.contains(needle))
    }
}

impl NotifyPort for RecordingNotifier {
    fn notify(&self, message: &str) -> Result<(), VoltraderError> {
        self.messages.borrow_mut().push(message.to_string());
        if self.fail {
            return Err(VoltraderError::Notify {
                reason: "webhook unreachable".into(),
            });
        }
        Ok(())
    }
}

pub fn friday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
}

pub fn saturday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 16).unwrap()
}

pub fn at(day: NaiveDate, h: u32, m: u32, s: u32) -> NaiveDateTime {
    day.and_hms_opt(h, m, s).unwrap()
}

/// A partial bar for `today` (open 100) followed by 20 completed days, each
/// closing at 100 with a 98..102 range.
pub fn flat_bars(today: NaiveDate) -> Vec<OhlcvBar> {
    let mut bars = vec![OhlcvBar {
        date: today,
        open: 100.0,
        high: 100.5,
        low: 99.5,
        close: 100.0,
    }];
    for i in 1..=20 {
        bars.push(OhlcvBar {
            date: today - chrono::Duration::days(i),
            open: 100.0,
            high: 102.0,
            low: 98.0,
            close: 100.0,
        });
    }
    bars
}

pub fn config(symbols: &[&str], target_position_count: usize) -> TraderConfig {
    TraderConfig {
        symbols: symbols.iter().map(|s| s.to_string()).collect(),
        target_position_count,
        allocation_fraction: 0.19,
        schedule: SessionSchedule::default(),
        timing: Timing::default(),
        signal: SignalParams::default(),
    }
}
