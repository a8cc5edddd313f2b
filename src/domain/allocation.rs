//! Per-symbol capital budget, fixed once at session start.

use crate::domain::error::VoltraderError;
use crate::ports::broker_port::BrokerPort;

#[derive(Debug, Clone, PartialEq)]
pub struct CapitalBudget {
    pub total_cash: f64,
    pub allocation_fraction: f64,
    pub per_symbol_budget: f64,
    pub target_position_count: usize,
}

impl CapitalBudget {
    pub fn new(total_cash: f64, allocation_fraction: f64, target_position_count: usize) -> Self {
        CapitalBudget {
            total_cash,
            allocation_fraction,
            per_symbol_budget: total_cash * allocation_fraction,
            target_position_count,
        }
    }

    /// Read available cash once and derive the budget from it.
    pub fn from_broker(
        broker: &dyn BrokerPort,
        allocation_fraction: f64,
        target_position_count: usize,
    ) -> Result<Self, VoltraderError> {
        let total_cash = broker.available_cash()?.floor();
        let budget = Self::new(total_cash, allocation_fraction, target_position_count);

        tracing::info!(
            total_cash = budget.total_cash,
            allocation_fraction = budget.allocation_fraction,
            per_symbol_budget = budget.per_symbol_budget,
            "capital budget fixed"
        );
        if budget.may_overallocate() {
            tracing::warn!(
                "allocation_fraction {} x {} positions exceeds available cash; later buys may be rejected",
                allocation_fraction,
                target_position_count
            );
        }
        Ok(budget)
    }

    /// Whole units affordable at `ask`. Zero when ask is not positive.
    pub fn quantity_for(&self, ask: f64) -> i64 {
        if ask <= 0.0 || !ask.is_finite() {
            return 0;
        }
        (self.per_symbol_budget / ask).floor() as i64
    }

    /// The budget is never reduced as fills come in, so more positions than
    /// `1 / allocation_fraction` would commit more than the starting cash.
    pub fn may_overallocate(&self) -> bool {
        self.allocation_fraction * self.target_position_count as f64 > 1.0
    }
}
