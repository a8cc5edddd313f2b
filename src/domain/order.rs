//! Order requests and broker status codes.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

/// How long an order may rest before the unfilled remainder is cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeCondition {
    /// Whole quantity fills immediately or nothing does.
    FillOrKill,
    /// Whatever fills immediately fills; the rest is cancelled.
    ImmediateOrCancel,
}

/// Orders are always priced at the best available quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceCondition {
    Best,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub side: OrderSide,
    pub symbol: String,
    pub quantity: i64,
    pub price_condition: PriceCondition,
    pub time_condition: TimeCondition,
}

impl OrderRequest {
    pub fn buy_fok(symbol: &str, quantity: i64) -> Self {
        OrderRequest {
            side: OrderSide::Buy,
            symbol: symbol.to_string(),
            quantity,
            price_condition: PriceCondition::Best,
            time_condition: TimeCondition::FillOrKill,
        }
    }

    pub fn sell_ioc(symbol: &str, quantity: i64) -> Self {
        OrderRequest {
            side: OrderSide::Sell,
            symbol: symbol.to_string(),
            quantity,
            price_condition: PriceCondition::Best,
            time_condition: TimeCondition::ImmediateOrCancel,
        }
    }
}

impl fmt::Display for OrderRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.side {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        };
        let tif = match self.time_condition {
            TimeCondition::FillOrKill => "FOK",
            TimeCondition::ImmediateOrCancel => "IOC",
        };
        write!(f, "{} {} x{} @best {}", side, self.symbol, self.quantity, tif)
    }
}

pub const STATUS_OK: i32 = 0;
pub const STATUS_RATE_LIMITED: i32 = 4;

/// Broker answer to an order submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Accepted,
    RateLimited,
    Rejected(i32),
}

impl OrderStatus {
    /// Map a raw gateway return code.
    pub fn from_code(code: i32) -> Self {
        match code {
            STATUS_OK => OrderStatus::Accepted,
            STATUS_RATE_LIMITED => OrderStatus::RateLimited,
            other => OrderStatus::Rejected(other),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            OrderStatus::Accepted => STATUS_OK,
            OrderStatus::RateLimited => STATUS_RATE_LIMITED,
            OrderStatus::Rejected(code) => *code,
        }
    }
}
