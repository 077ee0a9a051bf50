//! ZH-L16 nitrogen compartment constants.
//!
//! Values are the Shearwater tabulation of Bühlmann's set C with the 4 minute
//! leading compartment. The published `b` coefficient is the reciprocal of the
//! M-value line slope (`M = a + P_amb / b`), so each entry stores `1 / b` as
//! [`Compartment::m_value_slope`]. Workman's `M0` and `ΔM` (fsw) are not
//! stored; they follow from `A` and `B`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const COMPARTMENT_COUNT: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Compartment {
    pub half_time_minutes: f64,
    /// `A`, bar.
    pub m_value_intercept: f64,
    /// `B`, dimensionless. Tolerated ambient pressure is `(P - A) / B`.
    pub m_value_slope: f64,
}

impl Compartment {
    const fn zhl16(half_time_minutes: f64, a: f64, b: f64) -> Self {
        Compartment {
            half_time_minutes,
            m_value_intercept: a,
            m_value_slope: 1.0 / b,
        }
    }
}

pub const COMPARTMENTS: [Compartment; COMPARTMENT_COUNT] = [
    Compartment::zhl16(4.0, 1.2599, 0.5050),
    Compartment::zhl16(8.0, 1.0000, 0.6514),
    Compartment::zhl16(12.5, 0.8618, 0.7222),
    Compartment::zhl16(18.5, 0.7562, 0.7825),
    Compartment::zhl16(27.0, 0.6200, 0.8126),
    Compartment::zhl16(38.3, 0.5043, 0.8434),
    Compartment::zhl16(54.3, 0.4410, 0.8693),
    Compartment::zhl16(77.0, 0.4000, 0.8910),
    Compartment::zhl16(109.0, 0.3750, 0.9092),
    Compartment::zhl16(146.0, 0.3500, 0.9222),
    Compartment::zhl16(187.0, 0.3295, 0.9319),
    Compartment::zhl16(239.0, 0.3065, 0.9403),
    Compartment::zhl16(305.0, 0.2835, 0.9477),
    Compartment::zhl16(390.0, 0.2610, 0.9544),
    Compartment::zhl16(498.0, 0.2480, 0.9602),
    Compartment::zhl16(635.0, 0.2327, 0.9653),
];

#[test]
fn test_half_times_increase() {
    for pair in COMPARTMENTS.windows(2) {
        assert!(pair[0].half_time_minutes < pair[1].half_time_minutes);
    }
    assert_eq!(COMPARTMENTS[0].half_time_minutes, 4.0);
    assert_eq!(COMPARTMENTS[15].half_time_minutes, 635.0);
}

#[test]
fn test_coefficients_positive() {
    for c in COMPARTMENTS.iter() {
        assert!(c.m_value_intercept > 0.0);
        assert!(c.m_value_slope > 1.0);
    }
}
