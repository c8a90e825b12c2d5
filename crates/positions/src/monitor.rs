//! Exit monitor loop.
//!
//! Polls every `poll_interval_secs`:
//! 1. Refresh prices for open positions
//! 2. Evaluate targets, stops, and the forced-close deadline
//! 3. Apply the resulting action to the book and emit it for execution
//!
//! Price-fetch failures skip the affected position for that cycle; the
//! loop itself never exits on error.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use odte_core::config::ExitConfig;
use odte_core::traits::PriceProvider;
use odte_core::types::{Position, PositionStatus};
use tokio::sync::{mpsc, RwLock};
use tracing::{error, info};

use crate::exit_tracker::{track, ExitAction};

/// An exit the monitor decided on, for the execution layer to act on.
#[derive(Debug, Clone)]
pub struct ExitEvent {
    pub option_symbol: String,
    pub action: ExitAction,
}

pub struct ExitMonitor {
    provider: Arc<dyn PriceProvider>,
    positions: Arc<RwLock<Vec<Position>>>,
    exits: mpsc::Sender<ExitEvent>,
    config: ExitConfig,
}

impl ExitMonitor {
    #[must_use]
    pub fn new(
        provider: Arc<dyn PriceProvider>,
        positions: Arc<RwLock<Vec<Position>>>,
        exits: mpsc::Sender<ExitEvent>,
        config: ExitConfig,
    ) -> Self {
        Self {
            provider,
            positions,
            exits,
            config,
        }
    }

    /// Runs the poll loop until the exit channel closes.
    pub async fn run(&self) {
        info!(
            poll_secs = self.config.poll_interval_secs,
            force_close = %self.config.force_close_time,
            "Exit monitor started"
        );
        let mut interval = tokio::time::interval(Duration::from_secs(self.config.poll_interval_secs));

        loop {
            interval.tick().await;
            match self.poll_once(Utc::now()).await {
                Ok(triggered) if triggered > 0 => {
                    info!(count = triggered, "Exit actions triggered");
                }
                Ok(_) => {}
                Err(e) => error!(error = %e, "Exit poll failed"),
            }
            if self.exits.is_closed() {
                return;
            }
        }
    }

    /// One poll cycle. Returns the number of exit actions triggered.
    ///
    /// Prices are fetched with the book unlocked and the write lock is
    /// only held to apply actions; channel sends happen after it drops,
    /// so a consumer that takes the same lock cannot deadlock the loop.
    /// Applies actions directly to the book: full closes flip the status
    /// and stamp the reason, partial closes reduce the quantity.
    pub async fn poll_once(&self, now: DateTime<Utc>) -> Result<usize> {
        let symbols: Vec<String> = {
            let book = self.positions.read().await;
            book.iter()
                .filter(|p| p.is_open())
                .map(|p| p.option_symbol.clone())
                .collect()
        };

        let mut prices = HashMap::with_capacity(symbols.len());
        for symbol in &symbols {
            match self.provider.latest_price(symbol).await {
                Ok(price) => {
                    prices.insert(symbol.clone(), price);
                }
                Err(e) => {
                    error!(
                        option_symbol = %symbol,
                        error = %e,
                        "Price fetch failed, skipping position this cycle"
                    );
                }
            }
        }

        let mut events = Vec::new();
        {
            let mut book = self.positions.write().await;
            for position in book.iter_mut().filter(|p| p.is_open()) {
                let Some(&price) = prices.get(&position.option_symbol) else {
                    continue;
                };
                position.current_price = price;

                let status = track(position, price, now);
                let Some(action) = status.action else {
                    continue;
                };

                match action {
                    ExitAction::CloseAll { reason } => {
                        position.status = PositionStatus::Closed;
                        position.exit_reason = Some(reason.to_string());
                        position.closed_at = Some(now);
                    }
                    ExitAction::ClosePartial { quantity, reason } => {
                        position.target_1_hit = true;
                        position.quantity = position.quantity.saturating_sub(quantity);
                        if position.quantity == 0 {
                            position.status = PositionStatus::Closed;
                            position.exit_reason = Some(reason.to_string());
                            position.closed_at = Some(now);
                        }
                    }
                }

                info!(
                    option_symbol = %position.option_symbol,
                    ?action,
                    %price,
                    "Exit triggered"
                );
                events.push(ExitEvent {
                    option_symbol: position.option_symbol.clone(),
                    action,
                });
            }
        }

        let triggered = events.len();
        for event in events {
            if let Err(e) = self.exits.send(event).await {
                error!(error = %e, "Exit channel closed, action not delivered");
            }
        }

        Ok(triggered)
    }
}
