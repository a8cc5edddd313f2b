//! Broker-reported holdings.

/// A holding as reported by the broker. Quantity is zero for an unheld symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub symbol: String,
    pub name: String,
    pub quantity: i64,
}

impl Position {
    pub fn is_held(&self) -> bool {
        self.quantity != 0
    }
}

/// Result of the full ("ALL") balance query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountSnapshot {
    pub account_name: String,
    pub evaluation_amount: f64,
    pub evaluation_pnl: f64,
    pub positions: Vec<Position>,
}

impl AccountSnapshot {
    pub fn total_quantity(&self) -> i64 {
        self.positions.iter().map(|p| p.quantity).sum()
    }

    pub fn held(&self) -> impl Iterator<Item = &Position> {
        self.positions.iter().filter(|p| p.is_held())
    }

    pub fn is_flat(&self) -> bool {
        self.total_quantity() == 0
    }
}
