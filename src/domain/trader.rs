//! Phase-driven main loop.
//!
//! Each tick re-reads the clock, derives the [`Phase`] and acts on it:
//! one liquidation before the buy window opens, breakout buys during the buy
//! window, and a final liquidation that ends the session. The loop is strictly
//! sequential; every wait goes through [`ClockPort::sleep`].

use chrono::{Datelike, Timelike};
use std::time::Duration;

use crate::domain::allocation::CapitalBudget;
use crate::domain::error::VoltraderError;
use crate::domain::executor::OrderExecutor;
use crate::domain::phase::{Phase, SessionSchedule};
use crate::domain::position::AccountSnapshot;
use crate::domain::session::SessionContext;
use crate::domain::signal::SignalParams;
use crate::ports::broker_port::BrokerPort;
use crate::ports::clock_port::ClockPort;
use crate::ports::notify_port::{notify_best_effort, NotifyPort};

#[derive(Debug, Clone, PartialEq)]
pub struct Timing {
    /// Sleep at the end of every non-terminal tick.
    pub tick_interval: Duration,
    /// Sleep after each buy attempt within a tick.
    pub symbol_pacing: Duration,
    /// Wait between a buy submission and the holding check.
    pub fill_check_delay: Duration,
    /// Sleep after each liquidation order.
    pub order_pacing: Duration,
    /// Sleep after each full liquidation pass.
    pub liquidation_pass_pacing: Duration,
    /// Seconds past the minute during which the balance refresh may run.
    pub balance_report_window: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            tick_interval: Duration::from_secs(3),
            symbol_pacing: Duration::from_secs(1),
            fill_check_delay: Duration::from_secs(2),
            order_pacing: Duration::from_secs(1),
            liquidation_pass_pacing: Duration::from_secs(30),
            balance_report_window: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraderConfig {
    pub symbols: Vec<String>,
    pub target_position_count: usize,
    pub allocation_fraction: f64,
    pub schedule: SessionSchedule,
    pub timing: Timing,
    pub signal: SignalParams,
}

/// How a session ended without error. All map to exit code 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    WeekendSkip,
    Liquidated,
    PastExit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Finished(SessionEnd),
}

pub struct Trader<'a> {
    config: TraderConfig,
    broker: &'a dyn BrokerPort,
    clock: &'a dyn ClockPort,
    notifier: &'a dyn NotifyPort,
    budget: CapitalBudget,
    ctx: SessionContext,
    last_phase: Option<Phase>,
}

impl<'a> Trader<'a> {
    /// Check connectivity, log the opening balance and fix the capital budget.
    pub fn start(
        config: TraderConfig,
        broker: &'a dyn BrokerPort,
        clock: &'a dyn ClockPort,
        notifier: &'a dyn NotifyPort,
    ) -> Result<Self, VoltraderError> {
        if !broker.is_ready() {
            return Err(VoltraderError::Connectivity {
                reason: "broker gateway is not connected or not initialised for trading".into(),
            });
        }

        let snapshot = broker.positions()?;
        log_snapshot(&snapshot);

        let budget =
            CapitalBudget::from_broker(broker, config.allocation_fraction, config.target_position_count)?;
        tracing::info!(
            symbols = config.symbols.len(),
            target_position_count = config.target_position_count,
            started_at = %clock.now().format("%m/%d %H:%M:%S"),
            "session started"
        );

        let ctx = SessionContext::new(config.target_position_count);
        Ok(Trader {
            config,
            broker,
            clock,
            notifier,
            budget,
            ctx,
            last_phase: None,
        })
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn budget(&self) -> &CapitalBudget {
        &self.budget
    }

    /// Tick until the session ends. Errors are logged and notified before
    /// being returned.
    pub fn run(&mut self) -> Result<SessionEnd, VoltraderError> {
        loop {
            match self.tick() {
                Ok(TickOutcome::Finished(end)) => return Ok(end),
                Ok(TickOutcome::Continue) => self.clock.sleep(self.config.timing.tick_interval),
                Err(e) => {
                    tracing::error!(error = %e, "session aborted");
                    notify_best_effort(self.notifier, &format!("main -> error: {}", e));
                    return Err(e);
                }
            }
        }
    }

    pub fn tick(&mut self) -> Result<TickOutcome, VoltraderError> {
        let now = self.clock.now();
        let phase = self.config.schedule.phase_at(now);
        if self.last_phase != Some(phase) {
            tracing::info!(%phase, at = %now.format("%H:%M:%S"), "phase change");
            self.last_phase = Some(phase);
        }

        let executor = OrderExecutor::new(self.broker, self.clock, self.notifier, &self.config.timing);

        match phase {
            Phase::WeekendSkip => {
                tracing::info!(weekday = ?now.weekday(), "no session on weekends");
                Ok(TickOutcome::Finished(SessionEnd::WeekendSkip))
            }
            Phase::BeforeOpen => Ok(TickOutcome::Continue),
            Phase::PreOpen => {
                if self.ctx.take_pre_open_liquidation() {
                    tracing::info!("liquidating carried-over holdings before the buy window");
                    if let Err(e) = executor.liquidate_all() {
                        self.report_liquidation_failure(phase, &e);
                    }
                }
                Ok(TickOutcome::Continue)
            }
            Phase::BuyWindow => {
                for symbol in &self.config.symbols {
                    if !self.ctx.has_capacity() {
                        tracing::debug!(
                            symbol = %symbol,
                            bought = self.ctx.bought_count(),
                            "target position count reached, not buying"
                        );
                        continue;
                    }
                    let outcome =
                        executor.buy(&mut self.ctx, symbol, &self.budget, &self.config.signal);
                    tracing::debug!(symbol = %symbol, ?outcome, "buy attempt");
                    self.clock.sleep(self.config.timing.symbol_pacing);
                }

                let into_minute = Duration::new(u64::from(now.second()), now.nanosecond());
                if into_minute <= self.config.timing.balance_report_window
                    && self.ctx.take_balance_report(now)
                {
                    let snapshot = self.broker.positions()?;
                    log_snapshot(&snapshot);
                    notify_best_effort(self.notifier, &snapshot_summary(&snapshot));
                }
                Ok(TickOutcome::Continue)
            }
            Phase::SellWindow => match executor.liquidate_all() {
                Ok(()) => {
                    notify_best_effort(self.notifier, "liquidation complete -> shutting down");
                    Ok(TickOutcome::Finished(SessionEnd::Liquidated))
                }
                // retried on the next tick until the exit boundary
                Err(e) => {
                    self.report_liquidation_failure(phase, &e);
                    Ok(TickOutcome::Continue)
                }
            },
            Phase::Exit => {
                notify_best_effort(self.notifier, "past exit time -> shutting down");
                Ok(TickOutcome::Finished(SessionEnd::PastExit))
            }
        }
    }

    fn report_liquidation_failure(&self, phase: Phase, error: &VoltraderError) {
        tracing::error!(%phase, error = %error, "liquidation failed");
        notify_best_effort(
            self.notifier,
            &format!("liquidation ({}) -> error: {}", phase, error),
        );
    }
}

fn snapshot_summary(snapshot: &AccountSnapshot) -> String {
    format!(
        "account {}: {} items, quantity {}, evaluation {:.0}, pnl {:.0}",
        snapshot.account_name,
        snapshot.positions.len(),
        snapshot.total_quantity(),
        snapshot.evaluation_amount,
        snapshot.evaluation_pnl
    )
}

fn log_snapshot(snapshot: &AccountSnapshot) {
    tracing::info!("{}", snapshot_summary(snapshot));
    for (i, position) in snapshot.positions.iter().enumerate() {
        tracing::info!(
            "{} {}({}): {}",
            i + 1,
            position.symbol,
            position.name,
            position.quantity
        );
    }
}
