//! Core domain types and logic.

pub mod ohlcv;
pub mod position;
pub mod order;
pub mod candidates;
pub mod signal;
pub mod allocation;
pub mod session;
pub mod phase;
pub mod executor;
pub mod trader;
pub mod config_validation;
pub mod error;
