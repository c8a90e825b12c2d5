//! Kelly Criterion sizing against historical win/loss statistics.
//!
//! The classic formula for asymmetric payoffs with win probability `p` and
//! payoff ratio `b = avg_win / avg_loss` is:
//! ```text
//! f* = (p*b - (1 - p)) / b
//! ```
//! The sizer applies fractional Kelly on top (half Kelly by default), a
//! correlation damping that shrinks adds as the book concentrates, and a
//! hard per-trade cap, so a hot streak in the stats can never translate
//! into an outsized stake.

use odte_core::config::KellyConfig;
use odte_core::types::StrategyStats;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Result of a Kelly sizing calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakeDecision {
    /// Whether the edge supports risking any capital.
    pub viable: bool,
    /// Dollars to risk on this trade (zero when not viable).
    pub stake: Decimal,
    /// Full Kelly fraction before the fractional multiplier.
    pub full_kelly: Decimal,
    /// Expectancy per dollar of average loss risked.
    pub edge: Decimal,
}

impl StakeDecision {
    fn no_stake(full_kelly: Decimal, edge: Decimal) -> Self {
        Self {
            viable: false,
            stake: Decimal::ZERO,
            full_kelly,
            edge,
        }
    }
}

/// Fractional-Kelly dollar sizer.
#[derive(Debug, Clone)]
pub struct KellySizer {
    config: KellyConfig,
}

impl KellySizer {
    #[must_use]
    pub fn new(config: KellyConfig) -> Self {
        Self { config }
    }

    /// Sizes a stake from strategy statistics, the account balance, and
    /// the count of positions already open.
    ///
    /// Not viable when the balance is non-positive, the stats are
    /// degenerate (win rate outside [0, 1], non-positive average win or
    /// loss), or the Kelly fraction is zero or negative. A zero-balance
    /// account therefore sizes to zero without an error.
    #[must_use]
    pub fn size(
        &self,
        stats: &StrategyStats,
        balance: Decimal,
        active_positions: u32,
    ) -> StakeDecision {
        if balance <= Decimal::ZERO
            || !(0.0..=1.0).contains(&stats.win_rate)
            || stats.avg_win <= Decimal::ZERO
            || stats.avg_loss <= Decimal::ZERO
        {
            return StakeDecision::no_stake(Decimal::ZERO, Decimal::ZERO);
        }
        let Ok(p) = Decimal::try_from(stats.win_rate) else {
            return StakeDecision::no_stake(Decimal::ZERO, Decimal::ZERO);
        };

        let b = stats.avg_win / stats.avg_loss;
        let q = Decimal::ONE - p;

        // Expectancy per dollar of average loss: p*b - q.
        let edge = p * b - q;
        let full_kelly = edge / b;

        if full_kelly <= Decimal::ZERO {
            return StakeDecision::no_stake(full_kelly, edge);
        }

        let damping = Decimal::ONE
            / (Decimal::ONE + self.config.correlation_damping * Decimal::from(active_positions));
        let mut stake = balance * full_kelly * self.config.fraction * damping;

        let cap = balance * self.config.per_trade_cap;
        if stake > cap {
            stake = cap;
        }
        if stake > balance {
            stake = balance;
        }
        // A dollar stake is quoted in cents; the fraction 0.5/1.5 would
        // otherwise carry 28 repeating digits into every downstream gate.
        let stake = stake.round_dp(2);

        StakeDecision {
            viable: stake > Decimal::ZERO,
            stake,
            full_kelly,
            edge,
        }
    }
}
