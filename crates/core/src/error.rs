//! Error taxonomy for the decision engine.
//!
//! Most degenerate financial inputs are modeled as typed outcomes the
//! caller inspects (rejections, abstentions); `EngineError` covers the
//! cases that are outright unusable, like malformed configuration or a
//! crossed quote. Nothing here is fatal to the process.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Non-positive prices, crossed quotes, inconsistent configuration.
    /// Rejected synchronously, never silently defaulted.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
