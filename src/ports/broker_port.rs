//! Broker gateway port trait.
//!
//! Covers connectivity, quotes, daily bars, cash, positions and order entry.
//! Every call blocks; implementations own their account selection.

use std::time::Duration;

use crate::domain::error::VoltraderError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::order::{OrderRequest, OrderStatus};
use crate::domain::position::{AccountSnapshot, Position};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub last_price: f64,
    pub best_ask: f64,
    pub best_bid: f64,
}

pub trait BrokerPort {
    /// Connectivity and trading-session readiness.
    fn is_ready(&self) -> bool;

    fn quote(&self, symbol: &str) -> Result<Quote, VoltraderError>;

    /// Up to `count` daily bars, most recent first. Includes a partial bar
    /// for the current day while the market is open.
    fn daily_bars(&self, symbol: &str, count: usize) -> Result<Vec<OhlcvBar>, VoltraderError>;

    /// Cash available for orders at full margin.
    fn available_cash(&self) -> Result<f64, VoltraderError>;

    fn positions(&self) -> Result<AccountSnapshot, VoltraderError>;

    /// Single-symbol holding; quantity 0 when unheld.
    fn position(&self, symbol: &str) -> Result<Position, VoltraderError>;

    fn submit_order(&self, order: &OrderRequest) -> Result<OrderStatus, VoltraderError>;

    /// Remaining lockout after a rate-limited submission.
    fn order_lockout_remaining(&self) -> Duration;
}
