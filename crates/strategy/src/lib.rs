//! Strategy-specific signal validators.
//!
//! Two independent engines, both stateless per call:
//! - IV mean reversion: percentile rank of current IV against a
//!   caller-supplied history, sell rich / buy cheap.
//! - Momentum scalping: six boolean conditions that must all agree on
//!   direction before a signal is emitted.
//!
//! Missing or non-finite indicator inputs always abstain; absence of data
//! is never treated as a neutral value.

pub mod indicators;
pub mod iv_mean_reversion;
pub mod momentum;

pub use indicators::{Bar, Crossover};
pub use iv_mean_reversion::IvMeanReversion;
pub use momentum::{MomentumValidator, RelativeStrength};
