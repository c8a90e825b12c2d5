//! Boundary value types shared across the decision pipeline.
//!
//! These are plain structured values with no embedded behavior beyond
//! derived quantities. The surrounding system owns persistence; the engine
//! only reads snapshots and emits new values.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Option right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionType {
    Call,
    Put,
}

/// Direction of an entry signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalDirection {
    Buy,
    Sell,
}

/// Side of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionSide {
    Long,
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionStatus {
    Open,
    Closed,
}

/// Immutable option-chain snapshot from the market-data collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionTick {
    pub symbol: String,
    pub underlying_price: Decimal,
    pub strike: Decimal,
    pub expiration: DateTime<Utc>,
    pub bid: Decimal,
    pub ask: Decimal,
    pub iv: Decimal,
    pub delta: Decimal,
    pub gamma: Decimal,
    pub theta: Decimal,
    pub vega: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl OptionTick {
    /// Rejects ticks that cannot be priced: non-positive underlying or
    /// strike, a negative bid, or a crossed quote.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidInput` naming the offending field.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.underlying_price <= Decimal::ZERO {
            return Err(EngineError::InvalidInput(format!(
                "{}: non-positive underlying price",
                self.symbol
            )));
        }
        if self.strike <= Decimal::ZERO {
            return Err(EngineError::InvalidInput(format!(
                "{}: non-positive strike",
                self.symbol
            )));
        }
        if self.bid < Decimal::ZERO || self.ask < self.bid {
            return Err(EngineError::InvalidInput(format!(
                "{}: bad quote {}/{}",
                self.symbol, self.bid, self.ask
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn mid_price(&self) -> Decimal {
        (self.bid + self.ask) / Decimal::TWO
    }

    /// Calendar days until expiration, measured from `now`.
    #[must_use]
    pub fn dte(&self, now: DateTime<Utc>) -> i64 {
        (self.expiration - now).num_days()
    }
}

/// Per-condition audit record for the momentum validator.
///
/// A signal is emitted only when every field is true; the record is kept on
/// the signal so a reviewer can see exactly which checks passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionReport {
    pub ema_crossover: bool,
    pub rsi_confirms: bool,
    pub volume_spike: bool,
    pub vwap_breakout: bool,
    pub relative_strength: bool,
    pub in_entry_window: bool,
}

impl ConditionReport {
    #[must_use]
    pub fn all_met(&self) -> bool {
        self.ema_crossover
            && self.rsi_confirms
            && self.volume_spike
            && self.vwap_breakout
            && self.relative_strength
            && self.in_entry_window
    }
}

/// Entry signal emitted by a strategy validator. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub symbol: String,
    pub strategy: String,
    pub direction: SignalDirection,
    /// Confidence in [0, 1].
    pub confidence: f64,
    pub entry_price: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    pub target_1: Option<Decimal>,
    pub target_2: Option<Decimal>,
    /// Present for momentum signals; mean-reversion signals carry their
    /// evidence in `reasoning`.
    pub conditions: Option<ConditionReport>,
    pub reasoning: String,
    pub created_at: DateTime<Utc>,
}

/// Account-level snapshot supplied fresh on every approval call.
///
/// The engine never assumes the snapshot is current across calls; it is the
/// caller's job to serialize approvals per account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    pub balance: Decimal,
    pub daily_pnl: Decimal,
    pub delta_exposure: Decimal,
    pub theta_exposure: Decimal,
    pub consecutive_losses: u32,
    pub active_positions: u32,
}

/// An options position created on approved execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub option_symbol: String,
    pub side: PositionSide,
    pub quantity: u32,
    pub entry_price: Decimal,
    pub current_price: Decimal,
    pub status: PositionStatus,
    pub exit_reason: Option<String>,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub target_1: Decimal,
    pub target_2: Decimal,
    pub stop_loss: Decimal,
    /// Set once the target-1 scale-out has been taken, so the partial
    /// exit fires only once while price sits between the targets.
    #[serde(default)]
    pub target_1_hit: bool,
    /// Wall-clock deadline after which the position must be closed
    /// regardless of target/stop state.
    pub force_close_at: DateTime<Utc>,
}

impl Position {
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }
}

/// Historical performance for one strategy, used to estimate the Kelly edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyStats {
    pub strategy: String,
    pub win_rate: f64,
    pub avg_win: Decimal,
    pub avg_loss: Decimal,
    pub total_trades: u64,
}

/// Which gate rejected an approval request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// Signal entry price was zero or negative.
    InvalidPrice,
    /// Stop loss equals entry price, implying undefined risk.
    ZeroRisk,
    /// No capital to trade against.
    ZeroBalance,
    DailyLossLimit,
    ConsecutiveLosses,
    PortfolioRiskLimit,
    PositionSizeLimit,
    /// Kelly expectancy was zero or negative.
    NonPositiveEdge,
    /// Sizing produced less than one contract.
    SizeTooSmall,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPrice => write!(f, "invalid_price"),
            Self::ZeroRisk => write!(f, "zero_risk"),
            Self::ZeroBalance => write!(f, "zero_balance"),
            Self::DailyLossLimit => write!(f, "daily_loss_limit"),
            Self::ConsecutiveLosses => write!(f, "consecutive_losses"),
            Self::PortfolioRiskLimit => write!(f, "portfolio_risk_limit"),
            Self::PositionSizeLimit => write!(f, "position_size_limit"),
            Self::NonPositiveEdge => write!(f, "non_positive_edge"),
            Self::SizeTooSmall => write!(f, "size_too_small"),
        }
    }
}

/// Outcome of a risk-manager approval request. Not persisted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskApproval {
    pub approved: bool,
    /// Contracts to trade when approved, zero otherwise.
    pub position_size: u32,
    /// Worst-case loss for the sized position.
    pub max_loss: Decimal,
    /// Which gate tripped, when rejected.
    pub rejection: Option<RejectReason>,
    pub reason: String,
}

impl RiskApproval {
    #[must_use]
    pub fn rejected(rejection: RejectReason, reason: impl Into<String>) -> Self {
        Self {
            approved: false,
            position_size: 0,
            max_loss: Decimal::ZERO,
            rejection: Some(rejection),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn approved(position_size: u32, max_loss: Decimal, reason: impl Into<String>) -> Self {
        Self {
            approved: true,
            position_size,
            max_loss,
            rejection: None,
            reason: reason.into(),
        }
    }
}
