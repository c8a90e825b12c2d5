//! IV mean-reversion validator.
//!
//! Sells premium when current implied volatility ranks rich against its
//! own history, buys when it ranks cheap. The historical series is
//! caller-supplied; the lookback policy lives with the storage
//! collaborator.

use anyhow::Result;
use chrono::{DateTime, Utc};
use odte_core::config::MeanReversionConfig;
use odte_core::traits::IvHistoryProvider;
use odte_core::types::{OptionTick, Signal, SignalDirection};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

/// Percentile rank of `current_iv` within `history`:
/// (current − min) / (max − min), clamped to [0, 1].
///
/// Returns `None` when the series is shorter than `min_history`, contains
/// non-finite values, or is flat (max == min). A flat series carries no
/// rank information, so the validator abstains rather than defaulting to
/// neutral.
#[must_use]
pub fn iv_rank(history: &[f64], current_iv: f64, min_history: usize) -> Option<f64> {
    if history.len() < min_history || !current_iv.is_finite() {
        return None;
    }
    if history.iter().any(|iv| !iv.is_finite()) {
        return None;
    }

    let min = history.iter().copied().fold(f64::INFINITY, f64::min);
    let max = history.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == min {
        return None;
    }

    Some(((current_iv - min) / (max - min)).clamp(0.0, 1.0))
}

/// IV mean-reversion strategy engine. Stateless per call.
#[derive(Debug, Clone)]
pub struct IvMeanReversion {
    config: MeanReversionConfig,
}

impl IvMeanReversion {
    pub const NAME: &'static str = "iv_mean_reversion";

    #[must_use]
    pub fn new(config: MeanReversionConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &MeanReversionConfig {
        &self.config
    }

    /// Evaluates one tick against the supplied IV history.
    ///
    /// Emits a sell-premium signal at or above the high rank threshold, a
    /// buy-premium signal at or below the low threshold, and nothing in
    /// the neutral band. Confidence scales with distance from the 50th
    /// percentile. Insufficient history abstains.
    #[must_use]
    pub fn evaluate(
        &self,
        tick: &OptionTick,
        iv_history: &[f64],
        now: DateTime<Utc>,
    ) -> Option<Signal> {
        if let Err(e) = tick.validate() {
            debug!(error = %e, "Unusable tick");
            return None;
        }

        let dte = tick.dte(now);
        if dte < self.config.dte_min || dte > self.config.dte_max {
            debug!(symbol = %tick.symbol, dte, "Outside DTE window");
            return None;
        }

        let current_iv = tick.iv.to_f64()?;
        let Some(rank) = iv_rank(iv_history, current_iv, self.config.min_history) else {
            debug!(
                symbol = %tick.symbol,
                history_len = iv_history.len(),
                "Insufficient IV history, abstaining"
            );
            return None;
        };

        let mid = tick.mid_price();
        if mid <= Decimal::ZERO {
            debug!(symbol = %tick.symbol, "Non-positive mid price");
            return None;
        }

        let confidence = ((rank - 0.5).abs() * 2.0).clamp(0.0, 1.0);

        if rank >= self.config.iv_high {
            // Premium is rich: sell it. Stop if the option doubles, take
            // profit when it decays to half.
            return Some(Signal {
                symbol: tick.symbol.clone(),
                strategy: Self::NAME.to_string(),
                direction: SignalDirection::Sell,
                confidence,
                entry_price: mid,
                stop_loss: mid * Decimal::TWO,
                take_profit: mid / Decimal::TWO,
                target_1: None,
                target_2: None,
                conditions: None,
                reasoning: format!(
                    "IV rank {rank:.2} >= {:.2} (overpriced), DTE {dte}",
                    self.config.iv_high
                ),
                created_at: now,
            });
        }

        if rank <= self.config.iv_low {
            return Some(Signal {
                symbol: tick.symbol.clone(),
                strategy: Self::NAME.to_string(),
                direction: SignalDirection::Buy,
                confidence,
                entry_price: mid,
                stop_loss: mid / Decimal::TWO,
                take_profit: mid * Decimal::TWO,
                target_1: None,
                target_2: None,
                conditions: None,
                reasoning: format!(
                    "IV rank {rank:.2} <= {:.2} (underpriced), DTE {dte}",
                    self.config.iv_low
                ),
                created_at: now,
            });
        }

        debug!(symbol = %tick.symbol, rank, "IV in neutral band");
        None
    }

    /// Fetches the IV history over the configured lookback and evaluates
    /// the tick against it.
    pub async fn evaluate_with_history(
        &self,
        tick: &OptionTick,
        provider: &dyn IvHistoryProvider,
        now: DateTime<Utc>,
    ) -> Result<Option<Signal>> {
        let history = provider
            .iv_history(&tick.symbol, self.config.lookback_days)
            .await?;
        Ok(self.evaluate(tick, &history, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn tick(iv: Decimal, dte_days: i64, now: DateTime<Utc>) -> OptionTick {
        OptionTick {
            symbol: "SPY251219C00600000".to_string(),
            underlying_price: dec!(600.00),
            strike: dec!(600.00),
            expiration: now + Duration::days(dte_days),
            bid: dec!(9.90),
            ask: dec!(10.10),
            iv,
            delta: dec!(0.50),
            gamma: dec!(0.02),
            theta: dec!(-0.15),
            vega: dec!(0.30),
            timestamp: now,
        }
    }

    fn history(min: f64, max: f64) -> Vec<f64> {
        // 20 evenly spaced points.
        (0..20)
            .map(|i| min + (max - min) * f64::from(i) / 19.0)
            .collect()
    }

    #[test]
    fn rank_interpolates_between_min_and_max() {
        let series = history(0.10, 0.50);
        let rank = iv_rank(&series, 0.30, 10).unwrap();
        assert!((rank - 0.5).abs() < 1e-9);
    }

    #[test]
    fn rank_clamps_outside_observed_range() {
        let series = history(0.10, 0.50);
        assert_eq!(iv_rank(&series, 0.90, 10).unwrap(), 1.0);
        assert_eq!(iv_rank(&series, 0.01, 10).unwrap(), 0.0);
    }

    #[test]
    fn rank_abstains_on_thin_or_flat_history() {
        assert!(iv_rank(&[0.2, 0.3], 0.25, 10).is_none());
        assert!(iv_rank(&vec![0.25; 20], 0.25, 10).is_none());
    }

    #[test]
    fn high_rank_emits_sell_signal() {
        let engine = IvMeanReversion::new(MeanReversionConfig::default());
        let now = Utc::now();
        let signal = engine
            .evaluate(&tick(dec!(0.48), 35, now), &history(0.10, 0.50), now)
            .expect("signal");
        assert_eq!(signal.direction, SignalDirection::Sell);
        assert_eq!(signal.entry_price, dec!(10.00));
        assert_eq!(signal.stop_loss, dec!(20.00));
        assert!(signal.confidence > 0.8);
    }

    #[test]
    fn low_rank_emits_buy_signal() {
        let engine = IvMeanReversion::new(MeanReversionConfig::default());
        let now = Utc::now();
        let signal = engine
            .evaluate(&tick(dec!(0.12), 35, now), &history(0.10, 0.50), now)
            .expect("signal");
        assert_eq!(signal.direction, SignalDirection::Buy);
        assert_eq!(signal.take_profit, dec!(20.00));
    }

    #[test]
    fn neutral_band_emits_nothing() {
        let engine = IvMeanReversion::new(MeanReversionConfig::default());
        let now = Utc::now();
        assert!(engine
            .evaluate(&tick(dec!(0.30), 35, now), &history(0.10, 0.50), now)
            .is_none());
    }

    #[test]
    fn outside_dte_window_emits_nothing() {
        let engine = IvMeanReversion::new(MeanReversionConfig::default());
        let now = Utc::now();
        // Rank would be 1.0, but DTE 5 is below the 30-day minimum.
        assert!(engine
            .evaluate(&tick(dec!(0.50), 5, now), &history(0.10, 0.50), now)
            .is_none());
    }

    #[test]
    fn thin_history_abstains_instead_of_guessing() {
        let engine = IvMeanReversion::new(MeanReversionConfig::default());
        let now = Utc::now();
        assert!(engine
            .evaluate(&tick(dec!(0.50), 35, now), &[0.2, 0.3, 0.4], now)
            .is_none());
    }

    struct FixedHistory(Vec<f64>);

    #[async_trait::async_trait]
    impl IvHistoryProvider for FixedHistory {
        async fn iv_history(&self, _symbol: &str, _lookback_days: u32) -> Result<Vec<f64>> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn evaluate_with_history_pulls_from_the_provider() {
        let engine = IvMeanReversion::new(MeanReversionConfig::default());
        let now = Utc::now();
        let provider = FixedHistory(history(0.10, 0.50));
        let signal = engine
            .evaluate_with_history(&tick(dec!(0.48), 35, now), &provider, now)
            .await
            .unwrap()
            .expect("signal");
        assert_eq!(signal.direction, SignalDirection::Sell);
    }

    #[test]
    fn confidence_scales_with_distance_from_median() {
        let engine = IvMeanReversion::new(MeanReversionConfig::default());
        let now = Utc::now();
        let series = history(0.10, 0.50);
        let strong = engine
            .evaluate(&tick(dec!(0.50), 35, now), &series, now)
            .unwrap();
        let weak = engine
            .evaluate(&tick(dec!(0.40), 35, now), &series, now)
            .unwrap();
        assert!(strong.confidence > weak.confidence);
    }
}
