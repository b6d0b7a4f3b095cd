use serde::{Deserialize, Serialize};

// Represents a position held in a portfolio: how many shares of a ticker
// were bought at what average cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    pub ticker: String,
    pub shares: f64,
    pub avg_cost: f64,
}

impl Holding {
    pub fn new(ticker: impl Into<String>, shares: f64, avg_cost: f64) -> Self {
        Self {
            ticker: ticker.into(),
            shares,
            avg_cost,
        }
    }

    /// Mark the holding against a current market price.
    pub fn valuate(&self, current_price: f64) -> HoldingValuation {
        let current_value = self.shares * current_price;
        let cost_basis = self.shares * self.avg_cost;
        let gain_loss = current_value - cost_basis;
        // A zero cost basis makes the percentage undefined, not zero.
        let gain_loss_pct = if cost_basis > 0.0 {
            Some(gain_loss / cost_basis * 100.0)
        } else {
            None
        };

        HoldingValuation {
            ticker: self.ticker.clone(),
            shares: self.shares,
            avg_cost: self.avg_cost,
            current_price,
            current_value,
            cost_basis,
            gain_loss,
            gain_loss_pct,
        }
    }
}

/// A holding marked to market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingValuation {
    pub ticker: String,
    pub shares: f64,
    pub avg_cost: f64,
    pub current_price: f64,
    pub current_value: f64,
    pub cost_basis: f64,
    pub gain_loss: f64,
    /// `None` when the cost basis is zero (percentage undefined).
    pub gain_loss_pct: Option<f64>,
}

/// Portfolio-level totals derived from the individual valuations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_value: f64,
    pub total_cost: f64,
    pub total_gain_loss: f64,
    pub total_gain_loss_pct: Option<f64>,
    pub holdings: Vec<HoldingValuation>,
}

impl PortfolioSummary {
    pub fn from_valuations(holdings: Vec<HoldingValuation>) -> Self {
        let total_value: f64 = holdings.iter().map(|h| h.current_value).sum();
        let total_cost: f64 = holdings.iter().map(|h| h.cost_basis).sum();
        let total_gain_loss = total_value - total_cost;
        let total_gain_loss_pct = if total_cost > 0.0 {
            Some(total_gain_loss / total_cost * 100.0)
        } else {
            None
        };

        Self {
            total_value,
            total_cost,
            total_gain_loss,
            total_gain_loss_pct,
            holdings,
        }
    }
}
