//! Commission-aware P&L arithmetic.
//!
//! All functions charge the round trip: commission applies per contract on
//! entry and again on exit. Gross P&L is `(exit - entry) * quantity *
//! multiplier` for longs and the mirror image for shorts.

use odte_core::config::FeeConfig;
use odte_core::types::{Position, PositionSide, SignalDirection};
use rust_decimal::Decimal;

/// Net P&L for a completed round trip.
#[must_use]
pub fn realized_pnl(
    side: PositionSide,
    entry: Decimal,
    exit: Decimal,
    quantity: u32,
    fees: &FeeConfig,
) -> Decimal {
    let qty = Decimal::from(quantity);
    let gross = match side {
        PositionSide::Long => (exit - entry) * qty * fees.contract_multiplier,
        PositionSide::Short => (entry - exit) * qty * fees.contract_multiplier,
    };
    gross - round_trip_commission(quantity, fees)
}

/// Mark-to-market P&L for an open position, net of the full round-trip
/// commission it would cost to realize it.
#[must_use]
pub fn unrealized_pnl(position: &Position, fees: &FeeConfig) -> Decimal {
    realized_pnl(
        position.side,
        position.entry_price,
        position.current_price,
        position.quantity,
        fees,
    )
}

/// Exit price at which the trade nets exactly zero after commissions.
#[must_use]
pub fn breakeven_price(side: PositionSide, entry: Decimal, fees: &FeeConfig) -> Decimal {
    let per_contract_drag = Decimal::TWO * fees.commission_per_contract / fees.contract_multiplier;
    match side {
        PositionSide::Long => entry + per_contract_drag,
        PositionSide::Short => entry - per_contract_drag,
    }
}

/// Expected fill price for a marketable order: the midpoint pushed
/// adversely by the configured fraction of the quoted spread.
#[must_use]
pub fn fill_price_with_slippage(
    bid: Decimal,
    ask: Decimal,
    direction: SignalDirection,
    fees: &FeeConfig,
) -> Decimal {
    let mid = (bid + ask) / Decimal::TWO;
    let slip = (ask - bid) * fees.slippage_spread_fraction;
    match direction {
        SignalDirection::Buy => mid + slip,
        SignalDirection::Sell => mid - slip,
    }
}

fn round_trip_commission(quantity: u32, fees: &FeeConfig) -> Decimal {
    fees.commission_per_contract * Decimal::from(quantity) * Decimal::TWO
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use odte_core::types::PositionStatus;
    use rust_decimal_macros::dec;

    fn fees() -> FeeConfig {
        FeeConfig::default()
    }

    #[test]
    fn long_round_trip_nets_commission() {
        // Gross (105 - 100) * 10 * 100 = 5000; commission 0.65 * 10 * 2 = 13.
        let pnl = realized_pnl(PositionSide::Long, dec!(100), dec!(105), 10, &fees());
        assert_eq!(pnl, dec!(4987.00));
    }

    #[test]
    fn short_round_trip_mirrors_long() {
        let pnl = realized_pnl(PositionSide::Short, dec!(105), dec!(100), 10, &fees());
        assert_eq!(pnl, dec!(4987.00));
    }

    #[test]
    fn flat_exit_loses_only_commission() {
        let pnl = realized_pnl(PositionSide::Long, dec!(2.50), dec!(2.50), 4, &fees());
        assert_eq!(pnl, dec!(-5.20));
    }

    #[test]
    fn losing_long_includes_commission_drag() {
        // Gross (2.00 - 2.50) * 10 * 100 = -500; commission 13.
        let pnl = realized_pnl(PositionSide::Long, dec!(2.50), dec!(2.00), 10, &fees());
        assert_eq!(pnl, dec!(-513.00));
    }

    #[test]
    fn unrealized_tracks_current_price() {
        let position = Position {
            symbol: "SPY".to_string(),
            option_symbol: "SPY251219C00600000".to_string(),
            side: PositionSide::Long,
            quantity: 10,
            entry_price: dec!(2.50),
            current_price: dec!(2.80),
            status: PositionStatus::Open,
            exit_reason: None,
            opened_at: Utc::now(),
            closed_at: None,
            target_1: dec!(2.70),
            target_2: dec!(2.90),
            stop_loss: dec!(2.30),
            target_1_hit: false,
            force_close_at: Utc::now(),
        };
        // Gross 0.30 * 10 * 100 = 300; commission 13.
        assert_eq!(unrealized_pnl(&position, &fees()), dec!(287.00));
    }

    #[test]
    fn breakeven_moves_by_round_trip_commission() {
        // 2 * 0.65 / 100 = 0.013 per share.
        assert_eq!(
            breakeven_price(PositionSide::Long, dec!(2.50), &fees()),
            dec!(2.513)
        );
        assert_eq!(
            breakeven_price(PositionSide::Short, dec!(2.50), &fees()),
            dec!(2.487)
        );
    }

    #[test]
    fn slippage_pushes_fills_adversely() {
        // Mid 10.00, spread 0.20, half-spread slippage 0.10.
        let buy = fill_price_with_slippage(dec!(9.90), dec!(10.10), SignalDirection::Buy, &fees());
        let sell = fill_price_with_slippage(dec!(9.90), dec!(10.10), SignalDirection::Sell, &fees());
        assert_eq!(buy, dec!(10.10));
        assert_eq!(sell, dec!(9.90));
        assert!(buy > sell);
    }
}
