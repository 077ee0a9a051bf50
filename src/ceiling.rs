use crate::dive_state::DiveState;
use crate::m_value::tolerated_ambient_pressure;
use crate::tissue::Tissue;
use crate::zhl16::{Compartment, COMPARTMENTS, COMPARTMENT_COUNT};
use crate::{require, DecoError, Environment, Parameter, DEFAULT_SAFETY_FACTOR};

pub fn validate_safety_factor(safety_factor: f64) -> Result<(), DecoError> {
    require(
        safety_factor > 0.0 && safety_factor <= 200.0,
        Parameter::SafetyFactor,
    )
}

// the safety factor stretches the ceiling depth, measured from the surface
pub(crate) fn scale_ceiling(raw: f64, safety_factor: f64, surface_pressure: f64) -> f64 {
    if safety_factor == DEFAULT_SAFETY_FACTOR {
        return raw;
    }
    surface_pressure + (raw - surface_pressure) * safety_factor / 100.0
}

pub(crate) fn unscale_ceiling(scaled: f64, safety_factor: f64, surface_pressure: f64) -> f64 {
    if safety_factor == DEFAULT_SAFETY_FACTOR {
        return scaled;
    }
    surface_pressure + (scaled - surface_pressure) * 100.0 / safety_factor
}

/// Minimum tolerated ambient pressure (bar) for a compartment holding
/// `tissue_pressure`, with the ceiling depth stretched by `safety_factor / 100`.
pub fn ceiling(
    tissue_pressure: f64,
    compartment: &Compartment,
    safety_factor: f64,
    surface_pressure: f64,
) -> Result<f64, DecoError> {
    validate_safety_factor(safety_factor)?;
    let raw = tolerated_ambient_pressure(tissue_pressure, compartment);
    Ok(scale_ceiling(raw, safety_factor, surface_pressure))
}

/// Direct ascent is blocked only when the ceiling lies strictly below the surface.
pub fn requires_decompression(ceiling_ambient: f64, surface_pressure: f64) -> bool {
    ceiling_ambient > surface_pressure
}

/// Ceiling as a depth, zero when the surface is reachable.
pub fn ceiling_depth_meters(ceiling_ambient: f64, environment: &Environment) -> f64 {
    environment.depth_meters(ceiling_ambient).max(0.0)
}

/// Index and ceiling of the compartment demanding the highest ambient pressure.
/// Ties go to the faster compartment.
pub fn max_ceiling(
    tissues: &[Tissue; COMPARTMENT_COUNT],
    safety_factor: f64,
    surface_pressure: f64,
) -> Result<(usize, f64), DecoError> {
    validate_safety_factor(safety_factor)?;
    let mut tissue_index = 0;
    let mut max_ceiling = f64::NEG_INFINITY;
    for (i, tissue) in tissues.iter().enumerate() {
        let tentative = scale_ceiling(
            tolerated_ambient_pressure(tissue.pressure(), &COMPARTMENTS[i]),
            safety_factor,
            surface_pressure,
        );
        if tentative > max_ceiling {
            max_ceiling = tentative;
            tissue_index = i;
        }
    }
    Ok((tissue_index, max_ceiling))
}

pub fn controlling_compartment(dive_state: &DiveState) -> Result<(usize, f64), DecoError> {
    dive_state.controlling_compartment(DEFAULT_SAFETY_FACTOR)
}

#[test]
fn test_ceiling_at_m_value() {
    // tissue pressure equal to the M-value at 2 bar puts the ceiling at 2 bar
    let compartment = &COMPARTMENTS[4];
    let p = crate::m_value::m_value(2.0, compartment);
    let result = ceiling(p, compartment, 100.0, 1.0).unwrap();
    assert!((result - 2.0).abs() < 1e-12);
}

#[test]
fn test_safety_factor_scales_depth() {
    let compartment = &COMPARTMENTS[4];
    let p = crate::m_value::m_value(2.0, compartment);
    // 10 m ceiling stretched to 15 m
    let result = ceiling(p, compartment, 150.0, 1.0).unwrap();
    assert!((result - 2.5).abs() < 1e-12);
}

#[test]
fn test_safety_factor_range() {
    let compartment = &COMPARTMENTS[0];
    assert!(ceiling(2.0, compartment, 0.0, 1.0).is_err());
    assert!(ceiling(2.0, compartment, 200.1, 1.0).is_err());
    assert!(ceiling(2.0, compartment, 200.0, 1.0).is_ok());
    assert!(ceiling(2.0, compartment, f64::NAN, 1.0).is_err());
}
