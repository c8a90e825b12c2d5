//! Target, stop, and forced-close evaluation for one open position.
//!
//! `track` is pure: it reads a position and a price and reports progress
//! plus the action to take, if any. Action priority is forced close, then
//! stop loss, then target 2, then target 1. Target 1 scales out half the
//! position exactly once (the position records the hit); everything else
//! closes it in full.

use chrono::{DateTime, Utc};
use odte_core::types::{Position, PositionSide};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Why a position is being closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseReason {
    Target1,
    Target2,
    StopLoss,
    ForceClose,
}

impl std::fmt::Display for CloseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Target1 => write!(f, "target_1"),
            Self::Target2 => write!(f, "target_2"),
            Self::StopLoss => write!(f, "stop_loss"),
            Self::ForceClose => write!(f, "force_close"),
        }
    }
}

/// What the monitor should do with the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitAction {
    CloseAll { reason: CloseReason },
    ClosePartial { quantity: u32, reason: CloseReason },
}

/// Snapshot of a position's standing relative to its exit levels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExitStatus {
    /// Progress toward target 1 in percent, clamped to [0, 100].
    pub target_1_progress_pct: Decimal,
    /// Progress toward target 2 in percent, clamped to [0, 100].
    pub target_2_progress_pct: Decimal,
    /// Remaining room to the stop as a percent of entry. Non-positive
    /// means the stop is breached.
    pub stop_distance_pct: Decimal,
    /// Minutes until the forced close deadline; negative once past it.
    pub minutes_to_force_close: i64,
    pub action: Option<ExitAction>,
}

/// Evaluates one position against its exit levels at `price` and `now`.
#[must_use]
pub fn track(position: &Position, price: Decimal, now: DateTime<Utc>) -> ExitStatus {
    let target_1_progress_pct = progress_pct(position, price, position.target_1);
    let target_2_progress_pct = progress_pct(position, price, position.target_2);

    // A non-positive entry price is a caller contract violation; report
    // zero distance rather than faulting on the division.
    let stop_distance_pct = if position.entry_price <= Decimal::ZERO {
        Decimal::ZERO
    } else {
        (match position.side {
            PositionSide::Long => (price - position.stop_loss) / position.entry_price,
            PositionSide::Short => (position.stop_loss - price) / position.entry_price,
        }) * Decimal::ONE_HUNDRED
    };

    let minutes_to_force_close = (position.force_close_at - now).num_minutes();

    let stop_hit = match position.side {
        PositionSide::Long => price <= position.stop_loss,
        PositionSide::Short => price >= position.stop_loss,
    };

    let action = if now >= position.force_close_at {
        Some(ExitAction::CloseAll { reason: CloseReason::ForceClose })
    } else if stop_hit {
        Some(ExitAction::CloseAll { reason: CloseReason::StopLoss })
    } else if target_2_progress_pct >= Decimal::ONE_HUNDRED {
        Some(ExitAction::CloseAll { reason: CloseReason::Target2 })
    } else if target_1_progress_pct >= Decimal::ONE_HUNDRED && !position.target_1_hit {
        Some(ExitAction::ClosePartial {
            quantity: (position.quantity / 2).max(1),
            reason: CloseReason::Target1,
        })
    } else {
        None
    };

    ExitStatus {
        target_1_progress_pct,
        target_2_progress_pct,
        stop_distance_pct,
        minutes_to_force_close,
        action,
    }
}

/// Distance covered from entry toward `target`, in percent, clamped to
/// [0, 100]. A degenerate target at the entry price reads as reached.
fn progress_pct(position: &Position, price: Decimal, target: Decimal) -> Decimal {
    let (covered, span) = match position.side {
        PositionSide::Long => (price - position.entry_price, target - position.entry_price),
        PositionSide::Short => (position.entry_price - price, position.entry_price - target),
    };
    if span <= Decimal::ZERO {
        return Decimal::ONE_HUNDRED;
    }
    (covered / span * Decimal::ONE_HUNDRED).clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}
