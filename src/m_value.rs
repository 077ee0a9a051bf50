use crate::ceiling::unscale_ceiling;
use crate::zhl16::Compartment;

/// Highest tissue pressure tolerated at `amb_pressure`: `A + B * P_amb`.
pub fn m_value(amb_pressure: f64, compartment: &Compartment) -> f64 {
    compartment.m_value_intercept + compartment.m_value_slope * amb_pressure
}

/// Lowest ambient pressure at which `tissue_pressure` sits on the M-value line.
pub fn tolerated_ambient_pressure(tissue_pressure: f64, compartment: &Compartment) -> f64 {
    (tissue_pressure - compartment.m_value_intercept) / compartment.m_value_slope
}

/// Highest tissue pressure whose safety-adjusted ceiling is at or above
/// `target_ambient`. Inverse of [`crate::ceiling::ceiling`] in the tissue pressure.
pub fn tolerated_tissue_pressure(
    target_ambient: f64,
    compartment: &Compartment,
    safety_factor: f64,
    surface_pressure: f64,
) -> f64 {
    m_value(
        unscale_ceiling(target_ambient, safety_factor, surface_pressure),
        compartment,
    )
}

#[test]
fn test_m_value_line_round_trip() {
    use crate::zhl16::COMPARTMENTS;
    for compartment in COMPARTMENTS.iter() {
        let m = m_value(2.5, compartment);
        assert!((tolerated_ambient_pressure(m, compartment) - 2.5).abs() < 1e-12);
    }
}
