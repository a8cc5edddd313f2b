//! Order execution: breakout buys and full liquidation.
//!
//! Buys go out fill-or-kill at the best price and are confirmed by re-reading
//! the held quantity after a short delay. Liquidation sells every holding
//! immediate-or-cancel until the broker reports nothing held.

use std::time::Duration;

use crate::domain::allocation::CapitalBudget;
use crate::domain::error::VoltraderError;
use crate::domain::order::{OrderRequest, OrderStatus};
use crate::domain::session::SessionContext;
use crate::domain::signal::{compute_signal, SignalParams};
use crate::domain::trader::Timing;
use crate::ports::broker_port::BrokerPort;
use crate::ports::clock_port::ClockPort;
use crate::ports::notify_port::{notify_best_effort, NotifyPort};

/// Result of one buy attempt for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum BuyOutcome {
    AlreadyBought,
    /// Target price or a moving average could not be computed.
    NoSignal,
    ConditionNotMet,
    /// Breakout seen but the budget buys no whole unit at the ask.
    ZeroQuantity,
    /// Blocked for `lockout`; the symbol is retried on a later tick.
    RateLimited { lockout: Duration },
    NotFilled { status: OrderStatus },
    Bought { quantity: i64 },
    Failed { reason: String },
}

pub struct OrderExecutor<'a> {
    broker: &'a dyn BrokerPort,
    clock: &'a dyn ClockPort,
    notifier: &'a dyn NotifyPort,
    timing: &'a Timing,
}

impl<'a> OrderExecutor<'a> {
    pub fn new(
        broker: &'a dyn BrokerPort,
        clock: &'a dyn ClockPort,
        notifier: &'a dyn NotifyPort,
        timing: &'a Timing,
    ) -> Self {
        OrderExecutor {
            broker,
            clock,
            notifier,
            timing,
        }
    }

    /// Evaluate `symbol` and buy it on a breakout. Gateway failures are
    /// reported and returned as [`BuyOutcome::Failed`].
    pub fn buy(
        &self,
        ctx: &mut SessionContext,
        symbol: &str,
        budget: &CapitalBudget,
        params: &SignalParams,
    ) -> BuyOutcome {
        if ctx.is_bought(symbol) {
            return BuyOutcome::AlreadyBought;
        }
        match self.try_buy(ctx, symbol, budget, params) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(symbol, error = %e, "buy attempt failed");
                notify_best_effort(self.notifier, &format!("buy {} -> error: {}", symbol, e));
                BuyOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    fn try_buy(
        &self,
        ctx: &mut SessionContext,
        symbol: &str,
        budget: &CapitalBudget,
        params: &SignalParams,
    ) -> Result<BuyOutcome, VoltraderError> {
        let today = self.clock.now().date();
        let quote = self.broker.quote(symbol)?;
        let quantity = budget.quantity_for(quote.best_ask);

        let signal = compute_signal(self.broker, symbol, today, params);
        if !signal.is_complete() {
            tracing::debug!(symbol, ?signal, "incomplete signal, skipping");
            return Ok(BuyOutcome::NoSignal);
        }
        if !signal.breakout(quote.last_price) {
            tracing::debug!(symbol, price = quote.last_price, ?signal, "no breakout");
            return Ok(BuyOutcome::ConditionNotMet);
        }
        if quantity <= 0 {
            tracing::warn!(
                symbol,
                ask = quote.best_ask,
                budget = budget.per_symbol_budget,
                "breakout but quantity is not positive, order not submitted"
            );
            return Ok(BuyOutcome::ZeroQuantity);
        }

        tracing::info!(
            symbol,
            quantity,
            price = quote.last_price,
            "{}EA at {} meets the buy condition",
            quantity,
            quote.last_price
        );
        let order = OrderRequest::buy_fok(symbol, quantity);
        let status = self.broker.submit_order(&order)?;
        tracing::info!(%order, status = status.code(), "buy order submitted");

        match status {
            OrderStatus::RateLimited => {
                let lockout = self.broker.order_lockout_remaining();
                tracing::warn!(
                    symbol,
                    lockout_ms = lockout.as_millis() as u64,
                    "order rate limit hit, waiting out lockout"
                );
                self.clock.sleep(lockout);
                return Ok(BuyOutcome::RateLimited { lockout });
            }
            OrderStatus::Rejected(code) => {
                tracing::warn!(symbol, code, "buy order rejected");
            }
            OrderStatus::Accepted => {}
        }

        self.clock.sleep(self.timing.fill_check_delay);
        let position = self.broker.position(symbol)?;
        if position.quantity > 0 {
            if ctx.record_bought(symbol) {
                notify_best_effort(
                    self.notifier,
                    &format!(
                        "buy {} ({}) -> {}EA bought",
                        position.name, symbol, position.quantity
                    ),
                );
            }
            return Ok(BuyOutcome::Bought {
                quantity: position.quantity,
            });
        }
        Ok(BuyOutcome::NotFilled { status })
    }

    /// Sell everything until the broker reports zero total quantity.
    pub fn liquidate_all(&self) -> Result<(), VoltraderError> {
        let mut pass = 0u32;
        loop {
            let snapshot = self.broker.positions()?;
            if snapshot.is_flat() {
                tracing::info!(passes = pass, "all positions liquidated");
                return Ok(());
            }
            pass += 1;
            tracing::info!(
                pass,
                total_quantity = snapshot.total_quantity(),
                "liquidation pass"
            );

            for position in snapshot.held() {
                let order = OrderRequest::sell_ioc(&position.symbol, position.quantity);
                let status = self.broker.submit_order(&order)?;
                tracing::info!(%order, name = %position.name, status = status.code(), "sell order submitted");
                if status == OrderStatus::RateLimited {
                    let lockout = self.broker.order_lockout_remaining();
                    tracing::warn!(
                        symbol = %position.symbol,
                        lockout_ms = lockout.as_millis() as u64,
                        "order rate limit hit during liquidation"
                    );
                }
                self.clock.sleep(self.timing.order_pacing);
            }
            self.clock.sleep(self.timing.liquidation_pass_pacing);
        }
    }
}
