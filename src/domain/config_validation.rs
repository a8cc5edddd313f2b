//! Configuration validation.
//!
//! Checks every field before the session starts so that a bad file fails
//! with a config exit code instead of mid-session.

use chrono::NaiveTime;

use crate::domain::candidates::parse_symbols;
use crate::domain::error::VoltraderError;
use crate::domain::phase::SessionSchedule;
use crate::domain::signal::MA_LOOKBACK;
use crate::ports::config_port::ConfigPort;

pub const BROKER_KINDS: &[&str] = &["paper"];

pub const SCHEDULE_KEYS: [&str; 4] = ["market_open", "buy_start", "sell_start", "exit"];

pub const TIMING_KEYS: [&str; 6] = [
    "tick_interval",
    "symbol_pacing",
    "fill_check_delay",
    "order_pacing",
    "liquidation_pass_pacing",
    "balance_report_window",
];

pub fn validate_session_config(config: &dyn ConfigPort) -> Result<(), VoltraderError> {
    validate_symbols(config)?;
    validate_target_position_count(config)?;
    validate_allocation_fraction(config)?;
    validate_schedule(config)?;
    validate_timing(config)?;
    validate_strategy(config)?;
    validate_broker(config)?;
    Ok(())
}

fn validate_symbols(config: &dyn ConfigPort) -> Result<(), VoltraderError> {
    let raw = config
        .get_string("session", "symbols")
        .ok_or_else(|| VoltraderError::missing("session", "symbols"))?;
    parse_symbols(&raw).map_err(|e| VoltraderError::invalid("session", "symbols", e.to_string()))?;
    Ok(())
}

fn validate_target_position_count(config: &dyn ConfigPort) -> Result<(), VoltraderError> {
    let value = config.get_int("session", "target_position_count", 0);
    if value < 1 {
        return Err(VoltraderError::invalid(
            "session",
            "target_position_count",
            "target_position_count must be at least 1",
        ));
    }
    Ok(())
}

fn validate_allocation_fraction(config: &dyn ConfigPort) -> Result<(), VoltraderError> {
    let value = config.get_double("session", "allocation_fraction", 0.0);
    if !(value > 0.0 && value <= 1.0) {
        return Err(VoltraderError::invalid(
            "session",
            "allocation_fraction",
            "allocation_fraction must be in (0, 1]",
        ));
    }
    Ok(())
}

/// Parse an `HH:MM` (or `HH:MM:SS`) boundary.
pub fn parse_time(value: &str, key: &str) -> Result<NaiveTime, VoltraderError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| {
            VoltraderError::invalid("schedule", key, format!("invalid {} format, expected HH:MM", key))
        })
}

fn validate_schedule(config: &dyn ConfigPort) -> Result<(), VoltraderError> {
    let defaults = SessionSchedule::default();
    let fallback = [
        defaults.market_open,
        defaults.buy_start,
        defaults.sell_start,
        defaults.exit,
    ];

    let mut previous: Option<(&str, NaiveTime)> = None;
    for (key, default) in SCHEDULE_KEYS.into_iter().zip(fallback) {
        let time = match config.get_string("schedule", key) {
            Some(raw) => parse_time(&raw, key)?,
            None => default,
        };
        if let Some((prev_key, prev)) = previous {
            if time <= prev {
                return Err(VoltraderError::invalid(
                    "schedule",
                    key,
                    format!("{} must be after {}", key, prev_key),
                ));
            }
        }
        previous = Some((key, time));
    }
    Ok(())
}

fn validate_timing(config: &dyn ConfigPort) -> Result<(), VoltraderError> {
    for key in TIMING_KEYS {
        let value = config.get_double("timing", key, 0.0);
        if !value.is_finite() || value < 0.0 {
            return Err(VoltraderError::invalid(
                "timing",
                key,
                format!("{} must be a non-negative number of seconds", key),
            ));
        }
    }
    Ok(())
}

fn validate_strategy(config: &dyn ConfigPort) -> Result<(), VoltraderError> {
    let factor = config.get_double("strategy", "breakout_factor", 0.3);
    if !factor.is_finite() || factor <= 0.0 {
        return Err(VoltraderError::invalid(
            "strategy",
            "breakout_factor",
            "breakout_factor must be positive",
        ));
    }

    let short = config.get_int("strategy", "ma_short", 5);
    let long = config.get_int("strategy", "ma_long", 10);
    if short < 1 {
        return Err(VoltraderError::invalid(
            "strategy",
            "ma_short",
            "ma_short must be at least 1",
        ));
    }
    if long < short {
        return Err(VoltraderError::invalid(
            "strategy",
            "ma_long",
            "ma_long must not be shorter than ma_short",
        ));
    }
    if long as usize > MA_LOOKBACK {
        return Err(VoltraderError::invalid(
            "strategy",
            "ma_long",
            format!("ma_long must be at most {}", MA_LOOKBACK),
        ));
    }
    Ok(())
}

fn validate_broker(config: &dyn ConfigPort) -> Result<(), VoltraderError> {
    let kind = config
        .get_string("broker", "kind")
        .unwrap_or_else(|| "paper".to_string());
    if !BROKER_KINDS.contains(&kind.trim()) {
        return Err(VoltraderError::invalid(
            "broker",
            "kind",
            format!("unknown broker kind '{}'", kind.trim()),
        ));
    }
    Ok(())
}
