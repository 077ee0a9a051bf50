use zhl16_deco::ceiling::ceiling;
use zhl16_deco::m_value::{m_value, tolerated_ambient_pressure, tolerated_tissue_pressure};
use zhl16_deco::zhl16::COMPARTMENTS;

#[test]
fn test_calculate_m_values() {
    let amb_pressure = 5.0;
    let result = m_value(amb_pressure, &COMPARTMENTS[15]);
    assert!((result - 5.4124365).abs() < 1e-6);
}

#[test]
fn test_m_values_grow_with_pressure() {
    for compartment in COMPARTMENTS.iter() {
        let mut previous = m_value(1.0, compartment);
        for press in 3..9 {
            let current = m_value(press as f64 / 2.0, compartment);
            assert!(current > previous);
            previous = current;
        }
    }
}

#[test]
fn test_tolerated_ambient_is_inverse_of_m_value() {
    for compartment in COMPARTMENTS.iter() {
        let p = m_value(1.6, compartment);
        assert!((tolerated_ambient_pressure(p, compartment) - 1.6).abs() < 1e-12);
    }
}

#[test]
fn test_tolerated_tissue_pressure_sits_on_the_ceiling() {
    for safety_factor in [50.0, 100.0, 130.0, 200.0] {
        for compartment in COMPARTMENTS.iter() {
            let allowed = tolerated_tissue_pressure(1.3, compartment, safety_factor, 1.0);
            let result = ceiling(allowed, compartment, safety_factor, 1.0).unwrap();
            assert!((result - 1.3).abs() < 1e-9);
        }
    }
}
