//! Position sizing and pre-trade risk approval.
//!
//! Every signal passes through the circuit breaker before execution. The
//! breaker runs a fixed sequence of gates (account halts first, then edge,
//! then size limits) and either rejects with the first gate that trips or
//! returns an approved contract count with its worst-case loss.

pub mod circuit_breaker;
pub mod kelly;

pub use circuit_breaker::CircuitBreaker;
pub use kelly::{KellySizer, StakeDecision};
