//! Engine configuration.
//!
//! Every limit the risk manager and validators enforce is externally
//! overridable; the defaults below match the research-backed values the
//! strategies were tuned with, but nothing is compiled in as a constant.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub risk: RiskConfig,
    pub kelly: KellyConfig,
    pub fees: FeeConfig,
    pub momentum: MomentumConfig,
    pub mean_reversion: MeanReversionConfig,
    pub exits: ExitConfig,
}

impl EngineConfig {
    /// Checks cross-field consistency after the overlay layers merge.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidInput` naming the first bad field.
    pub fn validate(&self) -> Result<(), EngineError> {
        let fraction_fields = [
            ("risk.daily_loss_limit", self.risk.daily_loss_limit),
            ("risk.portfolio_risk_limit", self.risk.portfolio_risk_limit),
            ("risk.position_size_limit", self.risk.position_size_limit),
            ("kelly.fraction", self.kelly.fraction),
            ("kelly.per_trade_cap", self.kelly.per_trade_cap),
        ];
        for (name, value) in fraction_fields {
            if value <= Decimal::ZERO || value > Decimal::ONE {
                return Err(EngineError::InvalidInput(format!(
                    "{name} must be in (0, 1], got {value}"
                )));
            }
        }

        if self.kelly.correlation_damping < Decimal::ZERO {
            return Err(EngineError::InvalidInput(
                "kelly.correlation_damping must not be negative".to_string(),
            ));
        }
        if self.fees.contract_multiplier <= Decimal::ZERO {
            return Err(EngineError::InvalidInput(
                "fees.contract_multiplier must be positive".to_string(),
            ));
        }
        if self.momentum.entry_window_start >= self.momentum.entry_window_end {
            return Err(EngineError::InvalidInput(
                "momentum entry window start must precede end".to_string(),
            ));
        }
        if self.mean_reversion.iv_low >= self.mean_reversion.iv_high {
            return Err(EngineError::InvalidInput(
                "mean_reversion.iv_low must be below iv_high".to_string(),
            ));
        }
        if self.mean_reversion.dte_min > self.mean_reversion.dte_max {
            return Err(EngineError::InvalidInput(
                "mean_reversion.dte_min must not exceed dte_max".to_string(),
            ));
        }
        if self.mean_reversion.min_history < 2 {
            return Err(EngineError::InvalidInput(
                "mean_reversion.min_history must be at least 2".to_string(),
            ));
        }
        if self.exits.poll_interval_secs == 0 {
            return Err(EngineError::InvalidInput(
                "exits.poll_interval_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Circuit-breaker limits, all expressed as fractions of account balance
/// except the consecutive-loss count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Daily loss fraction that halts trading (0.03 = -3% of balance).
    pub daily_loss_limit: Decimal,
    /// Consecutive losing trades that halt trading.
    pub max_consecutive_losses: u32,
    /// Maximum Kelly stake as a fraction of balance.
    pub portfolio_risk_limit: Decimal,
    /// Maximum position notional as a fraction of balance.
    pub position_size_limit: Decimal,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            daily_loss_limit: Decimal::new(3, 2),      // 3%
            max_consecutive_losses: 3,
            portfolio_risk_limit: Decimal::new(5, 2),  // 5%
            position_size_limit: Decimal::new(10, 2),  // 10%
        }
    }
}

/// Fractional-Kelly sizing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KellyConfig {
    /// Fraction of full Kelly to use (0.5 = half Kelly).
    pub fraction: Decimal,
    /// Hard per-trade cap as a fraction of balance.
    pub per_trade_cap: Decimal,
    /// Per-open-position damping of the stake, applied as
    /// 1 / (1 + damping * active_positions). Concentrated books get
    /// smaller adds.
    pub correlation_damping: Decimal,
}

impl Default for KellyConfig {
    fn default() -> Self {
        Self {
            fraction: Decimal::new(5, 1),     // half Kelly
            per_trade_cap: Decimal::new(2, 2), // 2%
            correlation_damping: Decimal::new(25, 2),
        }
    }
}

/// Commission and slippage model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Per-contract commission, charged on entry and again on exit.
    pub commission_per_contract: Decimal,
    /// Standard equity-option contract multiplier.
    pub contract_multiplier: Decimal,
    /// Fraction of the bid-ask spread applied as adverse slippage.
    pub slippage_spread_fraction: Decimal,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            commission_per_contract: Decimal::new(65, 2), // $0.65
            contract_multiplier: Decimal::from(100),
            slippage_spread_fraction: Decimal::new(5, 1), // half the spread
        }
    }
}

/// Parameters for the six-condition momentum validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentumConfig {
    pub ema_fast_period: usize,
    pub ema_slow_period: usize,
    pub rsi_period: usize,
    /// Relative volume required to count as a spike (2.0 = 2x average).
    pub volume_threshold: f64,
    /// Per-condition strength above this level counts toward confidence.
    pub strength_threshold: f64,
    /// Entry window in exchange-local time.
    pub entry_window_start: NaiveTime,
    pub entry_window_end: NaiveTime,
    /// Underlying move to target 1, as a fraction of entry (0.0075 = 0.75%).
    pub target_1_pct: Decimal,
    pub target_2_pct: Decimal,
    pub stop_loss_pct: Decimal,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            ema_fast_period: 9,
            ema_slow_period: 21,
            rsi_period: 14,
            volume_threshold: 2.0,
            strength_threshold: 0.5,
            entry_window_start: NaiveTime::from_hms_opt(9, 31, 0).unwrap(),
            entry_window_end: NaiveTime::from_hms_opt(11, 30, 0).unwrap(),
            target_1_pct: Decimal::new(75, 4),  // 0.75%
            target_2_pct: Decimal::new(150, 4), // 1.50%
            stop_loss_pct: Decimal::new(50, 4), // 0.50%
        }
    }
}

/// Parameters for the IV mean-reversion validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeanReversionConfig {
    /// IV rank at or above this emits a sell-premium signal.
    pub iv_high: f64,
    /// IV rank at or below this emits a buy-premium signal.
    pub iv_low: f64,
    pub dte_min: i64,
    pub dte_max: i64,
    pub lookback_days: u32,
    /// Minimum history points before a rank is trusted.
    pub min_history: usize,
}

impl Default for MeanReversionConfig {
    fn default() -> Self {
        Self {
            iv_high: 0.70,
            iv_low: 0.30,
            dte_min: 30,
            dte_max: 45,
            lookback_days: 90,
            min_history: 10,
        }
    }
}

/// Exit-tracking parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitConfig {
    /// Forced-close time in exchange-local time.
    pub force_close_time: NaiveTime,
    /// Price-poll cadence for the exit monitor.
    pub poll_interval_secs: u64,
}

impl Default for ExitConfig {
    fn default() -> Self {
        Self {
            force_close_time: NaiveTime::from_hms_opt(15, 50, 0).unwrap(),
            poll_interval_secs: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn risk_defaults_match_strategy_research() {
        let config = RiskConfig::default();
        assert_eq!(config.daily_loss_limit, dec!(0.03));
        assert_eq!(config.max_consecutive_losses, 3);
        assert_eq!(config.portfolio_risk_limit, dec!(0.05));
        assert_eq!(config.position_size_limit, dec!(0.10));
    }

    #[test]
    fn kelly_defaults_to_half_kelly() {
        let config = KellyConfig::default();
        assert_eq!(config.fraction, dec!(0.5));
        assert_eq!(config.per_trade_cap, dec!(0.02));
    }

    #[test]
    fn defaults_pass_validation() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn validation_rejects_out_of_range_fractions() {
        let mut config = EngineConfig::default();
        config.risk.daily_loss_limit = dec!(1.5);
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.kelly.fraction = Decimal::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validation_rejects_inverted_windows() {
        let mut config = EngineConfig::default();
        config.momentum.entry_window_start = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.mean_reversion.iv_low = 0.8;
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_round_trips_through_serde() {
        let config = EngineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.risk.max_consecutive_losses, 3);
        assert_eq!(back.momentum.ema_fast_period, 9);
    }
}
