#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use core::f64::consts::LN_2;
use libm::{exp, exp2, log2};

use crate::zhl16::Compartment;
use crate::{require, DecoError, Parameter};

/// Inert gas dissolved in one compartment.
#[derive(Default, Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tissue {
    pub(crate) inert_gas_pressure: f64,
}

impl Tissue {
    pub(crate) fn at(inert_gas_pressure: f64) -> Self {
        Tissue { inert_gas_pressure }
    }

    /// Current inert-gas partial pressure, bar.
    pub fn pressure(&self) -> f64 {
        self.inert_gas_pressure
    }

    /// Tissue after `minutes` breathing `inspired` bar of inert gas at constant depth.
    pub fn load(
        &self,
        compartment: &Compartment,
        inspired: f64,
        minutes: f64,
    ) -> Result<Tissue, DecoError> {
        load(
            self.inert_gas_pressure,
            inspired,
            minutes,
            compartment.half_time_minutes,
        )
        .map(Tissue::at)
    }

    /// Tissue after `minutes` of linear depth change, see [`load_linear`].
    pub fn load_linear(
        &self,
        compartment: &Compartment,
        inspired_start: f64,
        rate: f64,
        minutes: f64,
    ) -> Result<Tissue, DecoError> {
        load_linear(
            self.inert_gas_pressure,
            inspired_start,
            rate,
            minutes,
            compartment.half_time_minutes,
        )
        .map(Tissue::at)
    }
}

fn validate(minutes: f64, half_time: f64) -> Result<(), DecoError> {
    require(half_time.is_finite() && half_time > 0.0, Parameter::HalfTime)?;
    require(minutes.is_finite() && minutes >= 0.0, Parameter::Duration)
}

// P(t) = Pi + (P0 - Pi) * 2^(-t / half_time)
// P0 -> tissue pressure at the start of the segment
// Pi -> inspired inert gas pressure, constant over the segment
pub fn load(p0: f64, inspired: f64, minutes: f64, half_time: f64) -> Result<f64, DecoError> {
    validate(minutes, half_time)?;
    if minutes == 0.0 {
        return Ok(p0);
    }
    Ok(inspired + (p0 - inspired) * exp2(-minutes / half_time))
}

// Schreiner equation
// P(t) = Pi0 + R(t - 1/k) - [Pi0 - P0 - R/k] * e^(-kt)
// Pi0 -> inspired pressure at the start of the segment
// k -> ln 2 / half_time
// R -> rate of change of the inspired pressure (bar/min), fraction * ambient rate
pub fn load_linear(
    p0: f64,
    inspired_start: f64,
    rate: f64,
    minutes: f64,
    half_time: f64,
) -> Result<f64, DecoError> {
    validate(minutes, half_time)?;
    if minutes == 0.0 {
        return Ok(p0);
    }
    let k = LN_2 / half_time;
    let p = inspired_start + rate * (minutes - 1.0 / k)
        - (inspired_start - p0 - rate / k) * exp(-k * minutes);
    Ok(p.max(0.0))
}

/// Minutes for a compartment at `p0` to reach `target` while breathing `inspired`.
///
/// `None` when `target` does not lie between `p0` and `inspired`, i.e. the
/// pressure moves away from it or only approaches it asymptotically.
pub fn time_to_reach(p0: f64, inspired: f64, target: f64, half_time: f64) -> Option<f64> {
    if p0 == target {
        return Some(0.0);
    }
    let ratio = (target - inspired) / (p0 - inspired);
    if !(ratio > 0.0 && ratio < 1.0) {
        return None;
    }
    Some(-half_time * log2(ratio))
}

#[test]
fn test_zero_time_keeps_pressure() {
    let result = load(0.79, 3.95, 0.0, 4.0).unwrap();
    assert_eq!(result, 0.79);
}

#[test]
fn test_one_half_time_closes_half_the_gap() {
    let result = load(1.0, 3.0, 8.0, 8.0).unwrap();
    assert!((result - 2.0).abs() < 1e-12);
}

#[test]
fn test_rejects_bad_inputs() {
    assert_eq!(
        load(1.0, 2.0, 1.0, 0.0),
        Err(DecoError::InvalidParameter(Parameter::HalfTime))
    );
    assert_eq!(
        load(1.0, 2.0, -1.0, 4.0),
        Err(DecoError::InvalidParameter(Parameter::Duration))
    );
}

#[test]
fn test_time_to_reach_direction() {
    // off-gassing toward 0.79 passes 1.5 but never reaches 0.5
    assert!(time_to_reach(3.0, 0.79, 1.5, 4.0).is_some());
    assert!(time_to_reach(3.0, 0.79, 0.5, 4.0).is_none());
    assert!(time_to_reach(3.0, 0.79, 3.5, 4.0).is_none());
    assert_eq!(time_to_reach(3.0, 0.79, 3.0, 4.0), Some(0.0));
}
