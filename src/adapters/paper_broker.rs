//! Paper broker: daily bars from CSV files, instant simulated fills.
//!
//! Bars are read from `<data_dir>/<SYMBOL>.csv` with a
//! `date,open,high,low,close` header. The latest close is used as last price,
//! ask and bid. Buys fill in full when cash covers them; sells fill up to the
//! held quantity. Orders are never rate limited.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;

use crate::domain::error::VoltraderError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::order::{OrderRequest, OrderSide, OrderStatus};
use crate::domain::position::{AccountSnapshot, Position};
use crate::ports::broker_port::{BrokerPort, Quote};
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_PAPER_CASH: f64 = 10_000_000.0;

/// Status codes the paper broker answers with besides accepted.
pub const STATUS_INSUFFICIENT_CASH: i32 = 1;
pub const STATUS_NOTHING_TO_SELL: i32 = 2;
pub const STATUS_INVALID_QUANTITY: i32 = 3;

#[derive(Debug)]
struct PaperState {
    cash: f64,
    holdings: BTreeMap<String, i64>,
}

#[derive(Debug)]
pub struct PaperBroker {
    data_dir: PathBuf,
    account_name: String,
    state: RefCell<PaperState>,
}

impl PaperBroker {
    pub fn new(data_dir: PathBuf, cash: f64) -> Self {
        Self {
            data_dir,
            account_name: "paper".to_string(),
            state: RefCell::new(PaperState {
                cash,
                holdings: BTreeMap::new(),
            }),
        }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, VoltraderError> {
        let data_dir = config
            .get_string("paper", "data_dir")
            .ok_or_else(|| VoltraderError::missing("paper", "data_dir"))?;
        let cash = config.get_double("paper", "cash", DEFAULT_PAPER_CASH);
        if cash < 0.0 {
            return Err(VoltraderError::invalid(
                "paper",
                "cash",
                "cash must be non-negative",
            ));
        }
        Ok(Self::new(PathBuf::from(data_dir), cash))
    }

    /// Seed a holding, e.g. one carried over from a previous day.
    pub fn with_holding(self, symbol: &str, quantity: i64) -> Self {
        self.state
            .borrow_mut()
            .holdings
            .insert(symbol.to_string(), quantity);
        self
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{}.csv", symbol))
    }

    fn last_close(&self, symbol: &str) -> Result<f64, VoltraderError> {
        let bars = read_daily_bars(&self.csv_path(symbol))?;
        bars.first()
            .map(|b| b.close)
            .ok_or_else(|| VoltraderError::gateway("quote", format!("no bars for {}", symbol)))
    }
}

fn column<T: std::str::FromStr>(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<T, VoltraderError>
where
    T::Err: std::fmt::Display,
{
    record
        .get(index)
        .ok_or_else(|| VoltraderError::gateway("daily_bars", format!("missing {} column", name)))?
        .trim()
        .parse()
        .map_err(|e| VoltraderError::gateway("daily_bars", format!("invalid {} value: {}", name, e)))
}

/// Read a bar file, most recent bar first.
pub fn read_daily_bars(path: &Path) -> Result<Vec<OhlcvBar>, VoltraderError> {
    let content = fs::read_to_string(path).map_err(|e| {
        VoltraderError::gateway("daily_bars", format!("failed to read {}: {}", path.display(), e))
    })?;

    let mut rdr = csv::Reader::from_reader(content.as_bytes());
    let mut bars = Vec::new();

    for result in rdr.records() {
        let record = result
            .map_err(|e| VoltraderError::gateway("daily_bars", format!("CSV parse error: {}", e)))?;

        let date_str: String = column(&record, 0, "date")?;
        let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
            VoltraderError::gateway("daily_bars", format!("invalid date format: {}", e))
        })?;

        bars.push(OhlcvBar {
            date,
            open: column(&record, 1, "open")?,
            high: column(&record, 2, "high")?,
            low: column(&record, 3, "low")?,
            close: column(&record, 4, "close")?,
        });
    }

    bars.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(bars)
}

impl BrokerPort for PaperBroker {
    fn is_ready(&self) -> bool {
        self.data_dir.is_dir()
    }

    fn quote(&self, symbol: &str) -> Result<Quote, VoltraderError> {
        let price = self.last_close(symbol)?;
        Ok(Quote {
            last_price: price,
            best_ask: price,
            best_bid: price,
        })
    }

    fn daily_bars(&self, symbol: &str, count: usize) -> Result<Vec<OhlcvBar>, VoltraderError> {
        let mut bars = read_daily_bars(&self.csv_path(symbol))?;
        bars.truncate(count);
        Ok(bars)
    }

    fn available_cash(&self) -> Result<f64, VoltraderError> {
        Ok(self.state.borrow().cash)
    }

    fn positions(&self) -> Result<AccountSnapshot, VoltraderError> {
        let state = self.state.borrow();
        let mut evaluation_amount = 0.0;
        let mut positions = Vec::new();
        for (symbol, &quantity) in &state.holdings {
            if quantity == 0 {
                continue;
            }
            if let Ok(price) = self.last_close(symbol) {
                evaluation_amount += price * quantity as f64;
            }
            positions.push(Position {
                symbol: symbol.clone(),
                name: symbol.clone(),
                quantity,
            });
        }
        Ok(AccountSnapshot {
            account_name: self.account_name.clone(),
            evaluation_amount,
            evaluation_pnl: 0.0,
            positions,
        })
    }

    fn position(&self, symbol: &str) -> Result<Position, VoltraderError> {
        let quantity = self
            .state
            .borrow()
            .holdings
            .get(symbol)
            .copied()
            .unwrap_or(0);
        Ok(Position {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            quantity,
        })
    }

    fn submit_order(&self, order: &OrderRequest) -> Result<OrderStatus, VoltraderError> {
        if order.quantity <= 0 {
            return Ok(OrderStatus::Rejected(STATUS_INVALID_QUANTITY));
        }
        let price = self.last_close(&order.symbol)?;
        let mut state = self.state.borrow_mut();

        match order.side {
            OrderSide::Buy => {
                let cost = price * order.quantity as f64;
                if cost > state.cash {
                    return Ok(OrderStatus::Rejected(STATUS_INSUFFICIENT_CASH));
                }
                state.cash -= cost;
                *state.holdings.entry(order.symbol.clone()).or_insert(0) += order.quantity;
            }
            OrderSide::Sell => {
                let held = state.holdings.get(&order.symbol).copied().unwrap_or(0);
                let filled = held.min(order.quantity);
                if filled <= 0 {
                    return Ok(OrderStatus::Rejected(STATUS_NOTHING_TO_SELL));
                }
                state.cash += price * filled as f64;
                state.holdings.insert(order.symbol.clone(), held - filled);
            }
        }
        tracing::debug!(%order, price, cash = state.cash, "paper fill");
        Ok(OrderStatus::Accepted)
    }

    fn order_lockout_remaining(&self) -> Duration {
        Duration::ZERO
    }
}
