//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::log_notifier::LogNotifier;
use crate::adapters::paper_broker::PaperBroker;
use crate::adapters::system_clock::SystemClock;
use crate::domain::candidates::parse_symbols;
use crate::domain::config_validation::{parse_time, validate_session_config};
use crate::domain::error::VoltraderError;
use crate::domain::phase::SessionSchedule;
use crate::domain::signal::SignalParams;
use crate::domain::trader::{SessionEnd, Timing, Trader, TraderConfig};
use crate::ports::broker_port::BrokerPort;
use crate::ports::clock_port::ClockPort;
use crate::ports::config_port::ConfigPort;
use crate::ports::notify_port::{notify_best_effort, NotifyPort};

#[derive(Parser, Debug)]
#[command(name = "voltrader", about = "Single-session volatility breakout trader")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run today's session until liquidation or exit time
    Run {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a session configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run { config } => run_session(&config),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, VoltraderError> {
    FileConfigAdapter::from_file(path).map_err(|e| VoltraderError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let result = load_config(config_path).and_then(|adapter| build_trader_config(&adapter));
    match result {
        Ok(config) => {
            tracing::info!(
                symbols = config.symbols.len(),
                target_position_count = config.target_position_count,
                "configuration is valid"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            (&e).into()
        }
    }
}

fn run_session(config_path: &PathBuf) -> ExitCode {
    tracing::info!(path = %config_path.display(), "loading config");
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => {
            tracing::error!(error = %e, "cannot load config");
            return (&e).into();
        }
    };

    let config = match build_trader_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return (&e).into();
        }
    };

    let notifier = LogNotifier::new(
        &adapter
            .get_string("notify", "channel")
            .unwrap_or_else(|| "#stock".to_string()),
    );

    // only the paper broker ships with the crate; validation rejects other kinds
    let broker = match PaperBroker::from_config(&adapter) {
        Ok(b) => b,
        Err(e) => {
            tracing::error!(error = %e, "cannot create broker");
            return (&e).into();
        }
    };

    session_exit_code(&run_trader(config, &broker, &SystemClock, &notifier))
}

/// Start and run a session against the given ports.
pub fn run_trader(
    config: TraderConfig,
    broker: &dyn BrokerPort,
    clock: &dyn ClockPort,
    notifier: &dyn NotifyPort,
) -> Result<SessionEnd, VoltraderError> {
    let mut trader = match Trader::start(config, broker, clock, notifier) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "session start failed");
            notify_best_effort(notifier, &format!("startup -> {}", e));
            return Err(e);
        }
    };
    trader.run()
}

/// Exit code 0 for every normal session end, the error's category code otherwise.
pub fn session_exit_code(result: &Result<SessionEnd, VoltraderError>) -> ExitCode {
    match result {
        Ok(end) => {
            tracing::info!(?end, "session finished");
            ExitCode::SUCCESS
        }
        Err(e) => e.into(),
    }
}

fn duration_secs(config: &dyn ConfigPort, key: &str, default: Duration) -> Duration {
    let secs = config.get_double("timing", key, default.as_secs_f64());
    Duration::from_secs_f64(secs.max(0.0))
}

fn schedule_time(
    config: &dyn ConfigPort,
    key: &str,
    default: chrono::NaiveTime,
) -> Result<chrono::NaiveTime, VoltraderError> {
    match config.get_string("schedule", key) {
        Some(raw) => parse_time(&raw, key),
        None => Ok(default),
    }
}

/// Validate the whole file, then read it into a [`TraderConfig`].
pub fn build_trader_config(adapter: &dyn ConfigPort) -> Result<TraderConfig, VoltraderError> {
    validate_session_config(adapter)?;

    let raw_symbols = adapter
        .get_string("session", "symbols")
        .ok_or_else(|| VoltraderError::missing("session", "symbols"))?;
    let symbols = parse_symbols(&raw_symbols)
        .map_err(|e| VoltraderError::invalid("session", "symbols", e.to_string()))?;

    let defaults = SessionSchedule::default();
    let schedule = SessionSchedule {
        market_open: schedule_time(adapter, "market_open", defaults.market_open)?,
        buy_start: schedule_time(adapter, "buy_start", defaults.buy_start)?,
        sell_start: schedule_time(adapter, "sell_start", defaults.sell_start)?,
        exit: schedule_time(adapter, "exit", defaults.exit)?,
    };

    let t = Timing::default();
    let timing = Timing {
        tick_interval: duration_secs(adapter, "tick_interval", t.tick_interval),
        symbol_pacing: duration_secs(adapter, "symbol_pacing", t.symbol_pacing),
        fill_check_delay: duration_secs(adapter, "fill_check_delay", t.fill_check_delay),
        order_pacing: duration_secs(adapter, "order_pacing", t.order_pacing),
        liquidation_pass_pacing: duration_secs(
            adapter,
            "liquidation_pass_pacing",
            t.liquidation_pass_pacing,
        ),
        balance_report_window: duration_secs(
            adapter,
            "balance_report_window",
            t.balance_report_window,
        ),
    };

    let s = SignalParams::default();
    let signal = SignalParams {
        breakout_factor: adapter.get_double("strategy", "breakout_factor", s.breakout_factor),
        ma_short: adapter.get_int("strategy", "ma_short", s.ma_short as i64).max(1) as usize,
        ma_long: adapter.get_int("strategy", "ma_long", s.ma_long as i64).max(1) as usize,
        ..s
    };

    Ok(TraderConfig {
        symbols,
        target_position_count: adapter.get_int("session", "target_position_count", 1) as usize,
        allocation_fraction: adapter.get_double("session", "allocation_fraction", 0.0),
        schedule,
        timing,
        signal,
    })
}
