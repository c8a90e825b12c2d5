//! Shared types, configuration, and collaborator traits for the decision
//! engine. Every other crate in the workspace builds on these definitions.

pub mod config;
pub mod config_loader;
pub mod error;
pub mod traits;
pub mod types;

pub use config::{
    EngineConfig, ExitConfig, FeeConfig, KellyConfig, MeanReversionConfig, MomentumConfig,
    RiskConfig,
};
pub use config_loader::ConfigLoader;
pub use error::EngineError;
pub use traits::{IvHistoryProvider, PortfolioProvider, PriceProvider, StrategyStatsProvider};
pub use types::{
    ConditionReport, OptionTick, OptionType, Portfolio, Position, PositionSide, PositionStatus,
    RejectReason, RiskApproval, Signal, SignalDirection, StrategyStats,
};
