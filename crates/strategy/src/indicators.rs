//! Technical indicators for intraday momentum scanning.
//!
//! Every function returns `None` on insufficient or non-finite input; the
//! validators treat `None` as "no signal", never as zero.

use serde::{Deserialize, Serialize};

/// One OHLCV bar. Volume is f64 to keep ratio math uniform.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bar {
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    fn is_finite(&self) -> bool {
        self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
    }
}

/// Direction of an EMA crossover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Crossover {
    Bullish,
    Bearish,
}

/// Exponential moving average, seeded with the SMA of the first `period`
/// values.
#[must_use]
pub fn ema(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period || prices.iter().any(|p| !p.is_finite()) {
        return None;
    }

    let sma: f64 = prices[..period].iter().sum::<f64>() / period as f64;
    let multiplier = 2.0 / (period as f64 + 1.0);

    let mut value = sma;
    for price in &prices[period..] {
        value = (price - value) * multiplier + value;
    }
    Some(value)
}

/// Relative Strength Index over simple average gain/loss.
///
/// When there are no losses in the window the index saturates at 100 (or 50
/// if there were no moves at all).
#[must_use]
pub fn rsi(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period + 1 || prices.iter().any(|p| !p.is_finite()) {
        return None;
    }

    let deltas: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();
    let window = &deltas[deltas.len() - period..];

    let avg_gain: f64 = window.iter().filter(|d| **d > 0.0).sum::<f64>() / period as f64;
    let avg_loss: f64 = -window.iter().filter(|d| **d < 0.0).sum::<f64>() / period as f64;

    if avg_loss == 0.0 {
        return Some(if avg_gain > 0.0 { 100.0 } else { 50.0 });
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

/// Volume-weighted average price over the supplied bars.
#[must_use]
pub fn vwap(bars: &[Bar]) -> Option<f64> {
    if bars.is_empty() || bars.iter().any(|b| !b.is_finite()) {
        return None;
    }

    let mut cumulative_tpv = 0.0;
    let mut cumulative_volume = 0.0;
    for bar in bars {
        cumulative_tpv += bar.typical_price() * bar.volume;
        cumulative_volume += bar.volume;
    }

    if cumulative_volume == 0.0 {
        return None;
    }
    Some(cumulative_tpv / cumulative_volume)
}

/// Current bar volume relative to the average of all prior bars
/// (1.0 = average, 2.5 = 2.5x average).
#[must_use]
pub fn relative_volume(bars: &[Bar]) -> Option<f64> {
    if bars.len() < 2 || bars.iter().any(|b| !b.is_finite()) {
        return None;
    }

    let prior = &bars[..bars.len() - 1];
    let avg: f64 = prior.iter().map(|b| b.volume).sum::<f64>() / prior.len() as f64;
    if avg == 0.0 {
        return None;
    }
    Some(bars[bars.len() - 1].volume / avg)
}

/// Detects a fast/slow EMA crossover between the previous and current bar.
#[must_use]
pub fn detect_ema_crossover(
    fast: f64,
    slow: f64,
    prev_fast: f64,
    prev_slow: f64,
) -> Option<Crossover> {
    if ![fast, slow, prev_fast, prev_slow].iter().all(|v| v.is_finite()) {
        return None;
    }
    if prev_fast <= prev_slow && fast > slow {
        Some(Crossover::Bullish)
    } else if prev_fast >= prev_slow && fast < slow {
        Some(Crossover::Bearish)
    } else {
        None
    }
}

/// Bid-ask spread as a fraction of the midpoint. `None` for non-positive
/// or crossed quotes.
#[must_use]
pub fn spread_pct(bid: f64, ask: f64) -> Option<f64> {
    if !(bid > 0.0 && ask > 0.0 && bid.is_finite() && ask.is_finite()) || ask < bid {
        return None;
    }
    let mid = (bid + ask) / 2.0;
    Some((ask - bid) / mid)
}

/// Whether a quote is liquid enough to trade. Wide spreads mean harder
/// exits and adverse selection.
#[must_use]
pub fn spread_acceptable(bid: f64, ask: f64, max_spread_pct: f64) -> bool {
    spread_pct(bid, ask).is_some_and(|pct| pct <= max_spread_pct)
}
