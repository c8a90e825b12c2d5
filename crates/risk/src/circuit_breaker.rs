//! Circuit-breaker trade approval.
//!
//! Gates run in a fixed order: signal sanity, account halts, Kelly edge,
//! portfolio-level limits, then contract sizing. The first tripped gate
//! rejects; limits never silently clamp a request down to fit.

use anyhow::Result;
use odte_core::config::{EngineConfig, FeeConfig, RiskConfig};
use odte_core::traits::{PortfolioProvider, StrategyStatsProvider};
use odte_core::types::{Portfolio, RejectReason, RiskApproval, Signal, StrategyStats};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::kelly::KellySizer;

/// Pre-trade risk manager. One instance per account; stateless between
/// calls, every decision works from a fresh portfolio snapshot.
pub struct CircuitBreaker {
    risk: RiskConfig,
    fees: FeeConfig,
    sizer: KellySizer,
}

impl CircuitBreaker {
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            risk: config.risk.clone(),
            fees: config.fees.clone(),
            sizer: KellySizer::new(config.kelly.clone()),
        }
    }

    /// Fetches the strategy's track record and a fresh portfolio snapshot,
    /// then evaluates the signal.
    pub async fn approve(
        &self,
        signal: &Signal,
        stats: &dyn StrategyStatsProvider,
        portfolio: &dyn PortfolioProvider,
    ) -> Result<RiskApproval> {
        let stats = stats.stats(&signal.strategy).await?;
        let portfolio = portfolio.snapshot().await?;
        Ok(self.evaluate(signal, &portfolio, &stats))
    }

    /// Runs the full gate sequence against an already-fetched snapshot.
    #[must_use]
    pub fn evaluate(
        &self,
        signal: &Signal,
        portfolio: &Portfolio,
        stats: &StrategyStats,
    ) -> RiskApproval {
        if signal.entry_price <= Decimal::ZERO {
            return self.reject(signal, RejectReason::InvalidPrice, "entry price not positive");
        }

        let risk_per_share = (signal.entry_price - signal.stop_loss).abs();
        if risk_per_share == Decimal::ZERO {
            return self.reject(signal, RejectReason::ZeroRisk, "stop loss equals entry");
        }

        if portfolio.balance <= Decimal::ZERO {
            return self.reject(signal, RejectReason::ZeroBalance, "no capital available");
        }

        let daily_return = portfolio.daily_pnl / portfolio.balance;
        if daily_return <= -self.risk.daily_loss_limit {
            return self.reject(
                signal,
                RejectReason::DailyLossLimit,
                format!(
                    "daily pnl {:.2}% breaches -{}% limit",
                    daily_return * Decimal::ONE_HUNDRED,
                    self.risk.daily_loss_limit * Decimal::ONE_HUNDRED
                ),
            );
        }

        if portfolio.consecutive_losses >= self.risk.max_consecutive_losses {
            return self.reject(
                signal,
                RejectReason::ConsecutiveLosses,
                format!("{} consecutive losses", portfolio.consecutive_losses),
            );
        }

        let decision = self
            .sizer
            .size(stats, portfolio.balance, portfolio.active_positions);
        if !decision.viable {
            return self.reject(
                signal,
                RejectReason::NonPositiveEdge,
                format!("kelly fraction {} not positive", decision.full_kelly),
            );
        }

        let stake_fraction = decision.stake / portfolio.balance;
        if stake_fraction > self.risk.portfolio_risk_limit {
            return self.reject(
                signal,
                RejectReason::PortfolioRiskLimit,
                format!(
                    "stake {:.2}% of balance exceeds {}% limit",
                    stake_fraction * Decimal::ONE_HUNDRED,
                    self.risk.portfolio_risk_limit * Decimal::ONE_HUNDRED
                ),
            );
        }

        let risk_per_contract = risk_per_share * self.fees.contract_multiplier;
        let contracts = (decision.stake / risk_per_contract).floor();
        let Some(contracts) = contracts.to_u32() else {
            // A count too large to represent is far past any notional cap.
            return self.reject(
                signal,
                RejectReason::PositionSizeLimit,
                format!("contract count {contracts} exceeds representable size"),
            );
        };
        if contracts == 0 {
            return self.reject(
                signal,
                RejectReason::SizeTooSmall,
                format!("stake {} covers no contract at {} risk each", decision.stake, risk_per_contract),
            );
        }

        let notional = Decimal::from(contracts) * signal.entry_price * self.fees.contract_multiplier;
        let notional_limit = portfolio.balance * self.risk.position_size_limit;
        if notional > notional_limit {
            return self.reject(
                signal,
                RejectReason::PositionSizeLimit,
                format!("notional {notional} exceeds limit {notional_limit}"),
            );
        }

        let max_loss = risk_per_contract * Decimal::from(contracts);
        info!(
            symbol = %signal.symbol,
            strategy = %signal.strategy,
            contracts,
            %max_loss,
            "Trade approved"
        );
        RiskApproval::approved(
            contracts,
            max_loss,
            format!("{contracts} contracts, max loss {max_loss}"),
        )
    }

    fn reject(
        &self,
        signal: &Signal,
        rejection: RejectReason,
        reason: impl Into<String>,
    ) -> RiskApproval {
        let reason = reason.into();
        warn!(
            symbol = %signal.symbol,
            strategy = %signal.strategy,
            gate = %rejection,
            reason,
            "Trade rejected"
        );
        RiskApproval::rejected(rejection, reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use odte_core::types::SignalDirection;
    use rust_decimal_macros::dec;

    fn signal(entry: Decimal, stop: Decimal) -> Signal {
        Signal {
            symbol: "SPY".to_string(),
            strategy: "momentum_scalp".to_string(),
            direction: SignalDirection::Buy,
            confidence: 1.0,
            entry_price: entry,
            stop_loss: stop,
            take_profit: entry * dec!(1.015),
            target_1: None,
            target_2: None,
            conditions: None,
            reasoning: String::new(),
            created_at: Utc::now(),
        }
    }

    fn portfolio(balance: Decimal) -> Portfolio {
        Portfolio {
            balance,
            daily_pnl: Decimal::ZERO,
            delta_exposure: Decimal::ZERO,
            theta_exposure: Decimal::ZERO,
            consecutive_losses: 0,
            active_positions: 0,
        }
    }

    fn winning_stats() -> StrategyStats {
        StrategyStats {
            strategy: "momentum_scalp".to_string(),
            win_rate: 0.6,
            avg_win: dec!(150),
            avg_loss: dec!(100),
            total_trades: 120,
        }
    }

    fn breaker() -> CircuitBreaker {
        CircuitBreaker::new(&EngineConfig::default())
    }

    #[test]
    fn approves_and_sizes_a_clean_signal() {
        // Half Kelly at 1/3 full Kelly caps to 2% of 25000 = 500 stake.
        // Risk per contract = 0.50 * 100 = 50, so 10 contracts.
        let approval = breaker().evaluate(
            &signal(dec!(2.50), dec!(2.00)),
            &portfolio(dec!(25000)),
            &winning_stats(),
        );
        assert!(approval.approved, "{}", approval.reason);
        assert_eq!(approval.position_size, 10);
        assert_eq!(approval.max_loss, dec!(500));
        assert!(approval.rejection.is_none());
    }

    #[test]
    fn rejects_non_positive_entry_price() {
        let approval = breaker().evaluate(
            &signal(Decimal::ZERO, dec!(2.00)),
            &portfolio(dec!(25000)),
            &winning_stats(),
        );
        assert_eq!(approval.rejection, Some(RejectReason::InvalidPrice));
        assert_eq!(approval.position_size, 0);
    }

    #[test]
    fn rejects_stop_equal_to_entry() {
        let approval = breaker().evaluate(
            &signal(dec!(2.50), dec!(2.50)),
            &portfolio(dec!(25000)),
            &winning_stats(),
        );
        assert_eq!(approval.rejection, Some(RejectReason::ZeroRisk));
    }

    #[test]
    fn rejects_zero_balance_without_panicking() {
        let approval = breaker().evaluate(
            &signal(dec!(2.50), dec!(2.00)),
            &portfolio(Decimal::ZERO),
            &winning_stats(),
        );
        assert_eq!(approval.rejection, Some(RejectReason::ZeroBalance));
    }

    #[test]
    fn halts_at_daily_loss_limit() {
        let mut account = portfolio(dec!(10000));
        account.daily_pnl = dec!(-300); // exactly -3%
        let approval =
            breaker().evaluate(&signal(dec!(2.50), dec!(2.00)), &account, &winning_stats());
        assert_eq!(approval.rejection, Some(RejectReason::DailyLossLimit));

        account.daily_pnl = dec!(-299);
        let approval =
            breaker().evaluate(&signal(dec!(2.50), dec!(2.00)), &account, &winning_stats());
        assert!(approval.rejection != Some(RejectReason::DailyLossLimit));
    }

    #[test]
    fn halts_after_three_consecutive_losses() {
        let mut account = portfolio(dec!(25000));
        account.consecutive_losses = 3;
        let approval =
            breaker().evaluate(&signal(dec!(2.50), dec!(2.00)), &account, &winning_stats());
        assert_eq!(approval.rejection, Some(RejectReason::ConsecutiveLosses));

        account.consecutive_losses = 2;
        let approval =
            breaker().evaluate(&signal(dec!(2.50), dec!(2.00)), &account, &winning_stats());
        assert!(approval.approved);
    }

    #[test]
    fn rejects_non_positive_edge() {
        let losing = StrategyStats {
            win_rate: 0.4,
            avg_win: dec!(100),
            ..winning_stats()
        };
        let approval =
            breaker().evaluate(&signal(dec!(2.50), dec!(2.00)), &portfolio(dec!(25000)), &losing);
        assert_eq!(approval.rejection, Some(RejectReason::NonPositiveEdge));
    }

    #[test]
    fn rejects_stake_above_portfolio_risk_limit() {
        // Loosen the per-trade cap so the raw half-Kelly stake (16.7% of
        // balance) reaches the 5% portfolio gate.
        let mut config = EngineConfig::default();
        config.kelly.per_trade_cap = dec!(0.50);
        let approval = CircuitBreaker::new(&config).evaluate(
            &signal(dec!(2.50), dec!(2.00)),
            &portfolio(dec!(25000)),
            &winning_stats(),
        );
        assert_eq!(approval.rejection, Some(RejectReason::PortfolioRiskLimit));
    }

    #[test]
    fn rejects_notional_above_position_size_limit() {
        // Tight stop means many contracts: stake 500 / (0.05 * 100) = 100
        // contracts, notional 100 * 10 * 100 = 100k against a 2.5k limit.
        let approval = breaker().evaluate(
            &signal(dec!(10.00), dec!(9.95)),
            &portfolio(dec!(25000)),
            &winning_stats(),
        );
        assert_eq!(approval.rejection, Some(RejectReason::PositionSizeLimit));
    }

    #[test]
    fn unrepresentable_contract_count_rejects_as_oversized() {
        // A vanishingly tight stop makes the per-contract risk so small
        // that the raw count overflows u32.
        let approval = breaker().evaluate(
            &signal(dec!(2.50), dec!(2.4999999999)),
            &portfolio(dec!(100000000)),
            &winning_stats(),
        );
        assert_eq!(approval.rejection, Some(RejectReason::PositionSizeLimit));
        assert_eq!(approval.position_size, 0);
    }

    #[test]
    fn rejects_when_stake_covers_no_contract() {
        // Stake caps at 2% of 5000 = 100; risk per contract is 200.
        let approval = breaker().evaluate(
            &signal(dec!(2.50), dec!(0.50)),
            &portfolio(dec!(5000)),
            &winning_stats(),
        );
        assert_eq!(approval.rejection, Some(RejectReason::SizeTooSmall));
    }

    struct FixedPortfolio(Portfolio);

    #[async_trait]
    impl PortfolioProvider for FixedPortfolio {
        async fn snapshot(&self) -> Result<Portfolio> {
            Ok(self.0.clone())
        }
    }

    struct FixedStats(StrategyStats);

    #[async_trait]
    impl StrategyStatsProvider for FixedStats {
        async fn stats(&self, _strategy: &str) -> Result<StrategyStats> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn approve_fetches_stats_and_snapshot_from_providers() {
        let stats = FixedStats(winning_stats());
        let account = FixedPortfolio(portfolio(dec!(25000)));
        let approval = breaker()
            .approve(&signal(dec!(2.50), dec!(2.00)), &stats, &account)
            .await
            .unwrap();
        assert!(approval.approved);
        assert_eq!(approval.position_size, 10);
    }
}
