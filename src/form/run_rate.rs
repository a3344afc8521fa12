//! Run-rate derivation for a chasing side.
//!
//! Both rates are expressed in runs per over (six deliveries):
//!
//!   CRR = (target − runs_left) / ((120 − balls_left) / 6)
//!   RRR = runs_left / (balls_left / 6)
//!
//! Neither denominator may reach zero: before the first ball of the chase there
//! is no current rate, and once the last ball is bowled there is no required
//! rate. Those values are left unset instead of producing `inf`/`NaN`.

use serde::{Deserialize, Serialize};

use crate::cricket::{BALLS_PER_INNINGS, BALLS_PER_OVER};

/// Derived rates as shown next to the form, rounded to two decimals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunRates {
    pub crr: Option<f64>,
    pub rrr: Option<f64>,
}

/// Current run rate, unrounded. `None` when no balls have been faced yet.
pub fn current_run_rate(target_runs: u32, runs_left: u32, balls_left: u32) -> Option<f64> {
    let balls_faced = BALLS_PER_INNINGS as f64 - balls_left as f64;
    if balls_faced <= 0.0 {
        return None;
    }
    let runs_scored = target_runs as f64 - runs_left as f64;
    Some(runs_scored / (balls_faced / BALLS_PER_OVER as f64))
}

/// Required run rate, unrounded. `None` when no balls remain.
pub fn required_run_rate(runs_left: u32, balls_left: u32) -> Option<f64> {
    if balls_left == 0 {
        return None;
    }
    Some(runs_left as f64 / (balls_left as f64 / BALLS_PER_OVER as f64))
}

/// Display rates for a complete set of inputs.
pub fn derive(target_runs: u32, runs_left: u32, balls_left: u32) -> RunRates {
    RunRates {
        crr: current_run_rate(target_runs, runs_left, balls_left).map(round2),
        rrr: required_run_rate(runs_left, balls_left).map(round2),
    }
}

/// Reactive variant used while the form is being filled in: nothing is derived
/// until a non-zero target and both remaining counts are present.
pub fn derive_partial(
    target_runs: Option<u32>,
    runs_left: Option<u32>,
    balls_left: Option<u32>,
) -> RunRates {
    match (target_runs, runs_left, balls_left) {
        (Some(target), Some(runs), Some(balls)) if target > 0 => derive(target, runs, balls),
        _ => RunRates::default(),
    }
}

/// Round half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
