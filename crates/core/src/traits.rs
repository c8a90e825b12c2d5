//! Collaborator seams.
//!
//! The engine owns no storage; everything stateful arrives through these
//! traits. Fetching the portfolio snapshot is the single suspend point in
//! the approval path.

use crate::types::{Portfolio, StrategyStats};
use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Supplies the account snapshot consumed by the risk manager.
///
/// The snapshot must be obtained atomically relative to the decision;
/// callers serialize approval calls per account.
#[async_trait]
pub trait PortfolioProvider: Send + Sync {
    async fn snapshot(&self) -> Result<Portfolio>;
}

/// Supplies the historical IV series for percentile-rank calculations.
#[async_trait]
pub trait IvHistoryProvider: Send + Sync {
    async fn iv_history(&self, symbol: &str, lookback_days: u32) -> Result<Vec<f64>>;
}

/// Supplies per-strategy performance used to estimate the Kelly edge.
#[async_trait]
pub trait StrategyStatsProvider: Send + Sync {
    async fn stats(&self, strategy: &str) -> Result<StrategyStats>;
}

/// Supplies live prices for open-position exit tracking.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    async fn latest_price(&self, symbol: &str) -> Result<Decimal>;
}
