//! Six-condition momentum scalp validator.
//!
//! A signal is emitted only when all six conditions agree on one
//! direction: a fresh EMA crossover, RSI confirmation, a volume spike,
//! a VWAP breakout, relative strength against the benchmark, and the
//! session entry window. Confidence is the fraction of conditions whose
//! measured strength clears the configured threshold, so a bare pass on
//! every gate still reads weaker than a decisive one.

use chrono::{DateTime, NaiveTime, Utc};
use odte_core::config::MomentumConfig;
use odte_core::types::{ConditionReport, Signal, SignalDirection};
use rust_decimal::Decimal;
use tracing::debug;

use crate::indicators::{detect_ema_crossover, ema, relative_volume, rsi, vwap, Bar, Crossover};

/// Intraday return of the traded symbol versus its benchmark, both as
/// fractions (0.01 = 1%). Supplied by the market-data collaborator.
#[derive(Debug, Clone, Copy)]
pub struct RelativeStrength {
    pub symbol_return: f64,
    pub benchmark_return: f64,
}

impl RelativeStrength {
    fn excess(&self, direction: SignalDirection) -> f64 {
        match direction {
            SignalDirection::Buy => self.symbol_return - self.benchmark_return,
            SignalDirection::Sell => self.benchmark_return - self.symbol_return,
        }
    }
}

/// Momentum strategy engine. Stateless per call; the caller owns the bar
/// history and the session clock.
#[derive(Debug, Clone)]
pub struct MomentumValidator {
    config: MomentumConfig,
}

impl MomentumValidator {
    pub const NAME: &'static str = "momentum_scalp";

    /// VWAP distance (as a fraction of VWAP) considered a full-strength
    /// breakout.
    const VWAP_FULL_STRENGTH: f64 = 0.002;
    /// EMA separation (as a fraction of the slow EMA) considered a
    /// full-strength crossover.
    const EMA_FULL_STRENGTH: f64 = 0.002;
    /// Excess return over the benchmark considered full strength.
    const RS_FULL_STRENGTH: f64 = 0.005;

    #[must_use]
    pub fn new(config: MomentumConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &MomentumConfig {
        &self.config
    }

    /// Evaluates the six entry conditions against the bar history.
    ///
    /// `session_time` is the current exchange-local clock used for the
    /// entry-window check; `now` timestamps the emitted signal. Returns
    /// `None` unless every condition holds for one direction. Missing
    /// relative-strength data fails that condition rather than defaulting
    /// it to true.
    #[must_use]
    pub fn evaluate(
        &self,
        symbol: &str,
        bars: &[Bar],
        rel: Option<RelativeStrength>,
        session_time: NaiveTime,
        now: DateTime<Utc>,
    ) -> Option<Signal> {
        // Need one extra bar so the previous-bar EMAs are well defined.
        if bars.len() <= self.config.ema_slow_period {
            debug!(symbol, bars = bars.len(), "Insufficient bars");
            return None;
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let prev_closes = &closes[..closes.len() - 1];

        let fast = ema(&closes, self.config.ema_fast_period)?;
        let slow = ema(&closes, self.config.ema_slow_period)?;
        let prev_fast = ema(prev_closes, self.config.ema_fast_period)?;
        let prev_slow = ema(prev_closes, self.config.ema_slow_period)?;
        let rsi_value = rsi(&closes, self.config.rsi_period)?;
        let vwap_value = vwap(bars)?;
        let rel_volume = relative_volume(bars)?;
        let last_close = closes[closes.len() - 1];

        let crossover = detect_ema_crossover(fast, slow, prev_fast, prev_slow);
        let direction = match crossover {
            Some(Crossover::Bullish) => SignalDirection::Buy,
            Some(Crossover::Bearish) => SignalDirection::Sell,
            // No fresh cross: read direction from alignment so the audit
            // report still describes the failed setup.
            None if fast > slow => SignalDirection::Buy,
            None if fast < slow => SignalDirection::Sell,
            None => return None,
        };

        let (rsi_confirms, rsi_strength) = match direction {
            SignalDirection::Buy => (rsi_value > 30.0, (rsi_value - 30.0) / 40.0),
            SignalDirection::Sell => (rsi_value < 70.0, (70.0 - rsi_value) / 40.0),
        };

        let vwap_distance = match direction {
            SignalDirection::Buy => (last_close - vwap_value) / vwap_value,
            SignalDirection::Sell => (vwap_value - last_close) / vwap_value,
        };

        let rs_excess = rel.map(|r| r.excess(direction));

        let report = ConditionReport {
            ema_crossover: crossover.is_some(),
            rsi_confirms,
            volume_spike: rel_volume >= self.config.volume_threshold,
            vwap_breakout: vwap_distance > 0.0,
            relative_strength: rs_excess.is_some_and(|e| e > 0.0),
            in_entry_window: session_time >= self.config.entry_window_start
                && session_time <= self.config.entry_window_end,
        };

        if !report.all_met() {
            debug!(symbol, ?direction, ?report, "Momentum conditions not met");
            return None;
        }

        let strengths = [
            (((fast - slow).abs() / slow) / Self::EMA_FULL_STRENGTH).clamp(0.0, 1.0),
            rsi_strength.clamp(0.0, 1.0),
            (rel_volume / self.config.volume_threshold / 2.0).clamp(0.0, 1.0),
            (vwap_distance / Self::VWAP_FULL_STRENGTH).clamp(0.0, 1.0),
            (rs_excess.unwrap_or(0.0) / Self::RS_FULL_STRENGTH).clamp(0.0, 1.0),
            1.0,
        ];
        let strong = strengths
            .iter()
            .filter(|s| **s >= self.config.strength_threshold)
            .count();
        let confidence = strong as f64 / strengths.len() as f64;

        let entry = Decimal::try_from(last_close).ok()?;
        let (target_1, target_2, stop_loss) = match direction {
            SignalDirection::Buy => (
                entry * (Decimal::ONE + self.config.target_1_pct),
                entry * (Decimal::ONE + self.config.target_2_pct),
                entry * (Decimal::ONE - self.config.stop_loss_pct),
            ),
            SignalDirection::Sell => (
                entry * (Decimal::ONE - self.config.target_1_pct),
                entry * (Decimal::ONE - self.config.target_2_pct),
                entry * (Decimal::ONE + self.config.stop_loss_pct),
            ),
        };

        Some(Signal {
            symbol: symbol.to_string(),
            strategy: Self::NAME.to_string(),
            direction,
            confidence,
            entry_price: entry,
            stop_loss,
            take_profit: target_2,
            target_1: Some(target_1),
            target_2: Some(target_2),
            conditions: Some(report),
            reasoning: format!(
                "{:?} cross, RSI {rsi_value:.1}, {rel_volume:.1}x volume, \
                 {:.2}% past VWAP",
                crossover.unwrap_or(Crossover::Bullish),
                vwap_distance * 100.0
            ),
            created_at: now,
        })
    }
}
