//! Volatility-breakout signal engine.
//!
//! Daily bars arrive most recent first. When the newest bar is dated today it
//! is a partial session: its open is today's open and the bar after it is the
//! last completed day. Otherwise the newest bar is the last completed day and
//! its close stands in for today's open.

use chrono::NaiveDate;

use crate::domain::ohlcv::OhlcvBar;
use crate::ports::broker_port::BrokerPort;

pub const BREAKOUT_FACTOR: f64 = 0.3;
pub const TARGET_LOOKBACK: usize = 10;
pub const MA_LOOKBACK: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct SignalParams {
    pub breakout_factor: f64,
    /// Bars fetched for the target price.
    pub target_lookback: usize,
    /// Bars fetched for each moving average.
    pub ma_lookback: usize,
    pub ma_short: usize,
    pub ma_long: usize,
}

impl Default for SignalParams {
    fn default() -> Self {
        SignalParams {
            breakout_factor: BREAKOUT_FACTOR,
            target_lookback: TARGET_LOOKBACK,
            ma_lookback: MA_LOOKBACK,
            ma_short: 5,
            ma_long: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SignalError {
    #[error("insufficient bars: have {have}, need {need}")]
    InsufficientBars { have: usize, need: usize },

    #[error("non-finite result")]
    NonFinite,

    #[error("bar fetch failed: {0}")]
    Fetch(String),
}

/// Today's open and the index of the last completed day within the bars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSplit {
    pub today_open: f64,
    pub last_completed: usize,
}

pub fn session_split(bars: &[OhlcvBar], today: NaiveDate) -> Result<SessionSplit, SignalError> {
    let newest = bars
        .first()
        .ok_or(SignalError::InsufficientBars { have: 0, need: 1 })?;

    if newest.date == today {
        if bars.len() < 2 {
            return Err(SignalError::InsufficientBars { have: 1, need: 2 });
        }
        Ok(SessionSplit {
            today_open: newest.open,
            last_completed: 1,
        })
    } else {
        Ok(SessionSplit {
            today_open: newest.close,
            last_completed: 0,
        })
    }
}

/// today_open + (lastday.high - lastday.low) * factor
pub fn breakout_target(
    bars: &[OhlcvBar],
    today: NaiveDate,
    factor: f64,
) -> Result<f64, SignalError> {
    if bars.len() < 2 {
        return Err(SignalError::InsufficientBars {
            have: bars.len(),
            need: 2,
        });
    }
    let split = session_split(bars, today)?;
    let lastday = &bars[split.last_completed];
    finite(split.today_open + lastday.range() * factor)
}

/// Mean close over the `window` completed bars ending at the last completed day.
pub fn completed_sma(bars: &[OhlcvBar], today: NaiveDate, window: usize) -> Result<f64, SignalError> {
    let split = session_split(bars, today)?;
    let completed = &bars[split.last_completed..];
    if window == 0 || completed.len() < window {
        return Err(SignalError::InsufficientBars {
            have: completed.len(),
            need: window.max(1),
        });
    }
    let sum: f64 = completed[..window].iter().map(|b| b.close).sum();
    finite(sum / window as f64)
}

fn finite(value: f64) -> Result<f64, SignalError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SignalError::NonFinite)
    }
}

fn fetch(broker: &dyn BrokerPort, symbol: &str, count: usize) -> Result<Vec<OhlcvBar>, SignalError> {
    broker
        .daily_bars(symbol, count)
        .map_err(|e| SignalError::Fetch(e.to_string()))
}

/// Breakout target for `symbol`, or `None` (logged) when it cannot be computed.
pub fn target_price(
    broker: &dyn BrokerPort,
    symbol: &str,
    today: NaiveDate,
    params: &SignalParams,
) -> Option<f64> {
    let result = fetch(broker, symbol, params.target_lookback)
        .and_then(|bars| breakout_target(&bars, today, params.breakout_factor));
    match result {
        Ok(target) => Some(target),
        Err(e) => {
            tracing::warn!(symbol, error = %e, "target price unavailable");
            None
        }
    }
}

/// Simple moving average of completed closes, or `None` (logged).
///
/// At least `window + 1` bars are fetched so a partial bar for today never
/// leaves the window one completed day short.
pub fn moving_average(
    broker: &dyn BrokerPort,
    symbol: &str,
    today: NaiveDate,
    window: usize,
    lookback: usize,
) -> Option<f64> {
    let count = lookback.max(window + 1);
    let result = fetch(broker, symbol, count).and_then(|bars| completed_sma(&bars, today, window));
    match result {
        Ok(ma) => Some(ma),
        Err(e) => {
            tracing::warn!(symbol, window, error = %e, "moving average unavailable");
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Signal {
    pub target_price: Option<f64>,
    pub ma_short: Option<f64>,
    pub ma_long: Option<f64>,
}

impl Signal {
    pub fn is_complete(&self) -> bool {
        self.target_price.is_some() && self.ma_short.is_some() && self.ma_long.is_some()
    }

    /// Price strictly above the target and both averages. A missing component
    /// never triggers.
    pub fn breakout(&self, price: f64) -> bool {
        match (self.target_price, self.ma_short, self.ma_long) {
            (Some(target), Some(short), Some(long)) => {
                price > target && price > short && price > long
            }
            _ => false,
        }
    }
}

pub fn compute_signal(
    broker: &dyn BrokerPort,
    symbol: &str,
    today: NaiveDate,
    params: &SignalParams,
) -> Signal {
    Signal {
        target_price: target_price(broker, symbol, today, params),
        ma_short: moving_average(broker, symbol, today, params.ma_short, params.ma_lookback),
        ma_long: moving_average(broker, symbol, today, params.ma_long, params.ma_lookback),
    }
}
