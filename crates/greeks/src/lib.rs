//! Black-Scholes pricing primitives and Greeks.
//!
//! Pure f64 math with no hidden state; safe to call concurrently from any
//! number of callers. Degenerate inputs (T=0 or sigma=0) return the
//! intrinsic-value limit instead of dividing by zero.

pub mod black_scholes;

pub use black_scholes::{bs_price, d1_d2, delta, gamma, greeks, theta, vega, Greeks, OptionKind};
