//! Black-Scholes model: d1/d2, theoretical price, and the four Greeks.
//!
//! Conventions follow standard listed-equity-options usage: theta is per
//! calendar day (annual theta / 365) and vega is per one percentage point
//! of implied volatility (raw vega / 100).

use libm::erf;
use std::f64::consts::SQRT_2;

const INV_SQRT_TWO_PI: f64 = 0.398_942_280_401_432_7;
const DAYS_PER_YEAR: f64 = 365.0;

/// Option right for pricing purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Call,
    Put,
}

/// Theoretical price and sensitivities for one contract.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Greeks {
    pub price: f64,
    pub delta: f64,
    pub gamma: f64,
    /// Per calendar day.
    pub theta: f64,
    /// Per 1% change in implied volatility.
    pub vega: f64,
}

fn norm_pdf(x: f64) -> f64 {
    INV_SQRT_TWO_PI * (-0.5 * x * x).exp()
}

fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / SQRT_2))
}

fn inputs_valid(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> bool {
    s > 0.0
        && k > 0.0
        && t >= 0.0
        && sigma >= 0.0
        && s.is_finite()
        && k.is_finite()
        && t.is_finite()
        && r.is_finite()
        && sigma.is_finite()
}

/// Computes d1 and d2. Returns `None` when time or volatility is zero and
/// the terms are undefined.
#[must_use]
pub fn d1_d2(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> Option<(f64, f64)> {
    if !inputs_valid(s, k, t, r, sigma) || t == 0.0 || sigma == 0.0 {
        return None;
    }
    let sqrt_t = t.sqrt();
    let d1 = ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / (sigma * sqrt_t);
    let d2 = d1 - sigma * sqrt_t;
    Some((d1, d2))
}

fn intrinsic_limit(kind: OptionKind, s: f64, k: f64) -> Greeks {
    // At expiry (or zero vol) the option collapses to intrinsic value and
    // delta becomes a step function; gamma, theta, and vega all vanish.
    let call_delta = if s > k { 1.0 } else { 0.0 };
    let (price, delta) = match kind {
        OptionKind::Call => ((s - k).max(0.0), call_delta),
        OptionKind::Put => ((k - s).max(0.0), call_delta - 1.0),
    };
    Greeks {
        price,
        delta,
        gamma: 0.0,
        theta: 0.0,
        vega: 0.0,
    }
}

/// Computes price, delta, gamma, theta, and vega for one option.
///
/// # Arguments
/// * `s` - Underlying price, must be positive
/// * `k` - Strike price, must be positive
/// * `t` - Time to expiry in years (0 allowed; returns the intrinsic limit)
/// * `r` - Annualized risk-free rate
/// * `sigma` - Implied volatility (0 allowed; returns the intrinsic limit)
///
/// Returns `None` for non-positive or non-finite `s`/`k`, negative `t` or
/// `sigma`, or a non-finite rate.
#[must_use]
pub fn greeks(kind: OptionKind, s: f64, k: f64, t: f64, r: f64, sigma: f64) -> Option<Greeks> {
    if !inputs_valid(s, k, t, r, sigma) {
        return None;
    }
    if t == 0.0 || sigma == 0.0 {
        return Some(intrinsic_limit(kind, s, k));
    }

    let (d1, d2) = d1_d2(s, k, t, r, sigma)?;
    let sqrt_t = t.sqrt();
    let disc = (-r * t).exp();
    let pdf_d1 = norm_pdf(d1);
    let nd1 = norm_cdf(d1);
    let nd2 = norm_cdf(d2);

    let gamma = pdf_d1 / (s * sigma * sqrt_t);
    let vega = s * pdf_d1 * sqrt_t / 100.0;
    let decay = -s * pdf_d1 * sigma / (2.0 * sqrt_t);

    let (price, delta, theta_annual) = match kind {
        OptionKind::Call => {
            let price = s * nd1 - k * disc * nd2;
            (price, nd1, decay - r * k * disc * nd2)
        }
        OptionKind::Put => {
            let price = k * disc * norm_cdf(-d2) - s * norm_cdf(-d1);
            (price, nd1 - 1.0, decay + r * k * disc * norm_cdf(-d2))
        }
    };

    Some(Greeks {
        price,
        delta,
        gamma,
        theta: theta_annual / DAYS_PER_YEAR,
        vega,
    })
}

/// Theoretical Black-Scholes price.
#[must_use]
pub fn bs_price(kind: OptionKind, s: f64, k: f64, t: f64, r: f64, sigma: f64) -> Option<f64> {
    greeks(kind, s, k, t, r, sigma).map(|g| g.price)
}

/// Option delta. Call delta lies in [0, 1], put delta in [-1, 0].
#[must_use]
pub fn delta(kind: OptionKind, s: f64, k: f64, t: f64, r: f64, sigma: f64) -> Option<f64> {
    greeks(kind, s, k, t, r, sigma).map(|g| g.delta)
}

/// Gamma, identical for calls and puts at the same strike.
#[must_use]
pub fn gamma(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> Option<f64> {
    greeks(OptionKind::Call, s, k, t, r, sigma).map(|g| g.gamma)
}

/// Theta per calendar day. Negative for long premium.
#[must_use]
pub fn theta(kind: OptionKind, s: f64, k: f64, t: f64, r: f64, sigma: f64) -> Option<f64> {
    greeks(kind, s, k, t, r, sigma).map(|g| g.theta)
}

/// Vega per 1% change in implied volatility, identical for calls and puts.
#[must_use]
pub fn vega(s: f64, k: f64, t: f64, r: f64, sigma: f64) -> Option<f64> {
    greeks(OptionKind::Call, s, k, t, r, sigma).map(|g| g.vega)
}
