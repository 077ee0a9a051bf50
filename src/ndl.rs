#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ceiling::validate_safety_factor;
use crate::dive_state::{validate_inert_fraction, DiveState};
use crate::m_value::tolerated_tissue_pressure;
use crate::tissue::time_to_reach;
use crate::zhl16::COMPARTMENTS;
use crate::{require, DecoError, Parameter};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NoDecoLimit {
    /// No compartment ever loads past its surface M-value at this depth.
    Unlimited,
    Minutes(f64),
}

/// Time left at `depth_meters` before a direct ascent stops being safe.
pub fn no_decompression_limit(
    dive_state: &DiveState,
    depth_meters: f64,
    inert_fraction: f64,
    safety_factor: f64,
) -> Result<NoDecoLimit, DecoError> {
    require(
        depth_meters.is_finite() && depth_meters >= 0.0,
        Parameter::Depth,
    )?;
    validate_inert_fraction(inert_fraction)?;
    validate_safety_factor(safety_factor)?;

    let env = dive_state.environment();
    let surface = env.surface_pressure;
    let inspired = env.inspired_pressure(env.ambient_pressure(depth_meters), inert_fraction);

    let mut limit: Option<f64> = None;
    for (tissue, compartment) in dive_state.tissues.iter().zip(COMPARTMENTS.iter()) {
        let allowed = tolerated_tissue_pressure(surface, compartment, safety_factor, surface);
        let p0 = tissue.pressure();
        if p0 > allowed {
            return Ok(NoDecoLimit::Minutes(0.0));
        }
        if inspired <= allowed {
            continue;
        }
        if let Some(minutes) = time_to_reach(p0, inspired, allowed, compartment.half_time_minutes) {
            limit = Some(limit.map_or(minutes, |l: f64| l.min(minutes)));
        }
    }

    Ok(match limit {
        Some(minutes) => NoDecoLimit::Minutes(minutes),
        None => NoDecoLimit::Unlimited,
    })
}

impl DiveState {
    /// No-decompression limit at the current depth on the current gas.
    pub fn no_decompression_limit(&self, safety_factor: f64) -> Result<NoDecoLimit, DecoError> {
        no_decompression_limit(
            self,
            self.current_depth_meters,
            self.inert_fraction,
            safety_factor,
        )
    }
}

#[test]
fn test_surface_is_unlimited() {
    let state = DiveState::default();
    assert_eq!(
        no_decompression_limit(&state, 0.0, crate::FN2, 100.0).unwrap(),
        NoDecoLimit::Unlimited
    );
}

#[test]
fn test_deeper_is_shorter() {
    let state = DiveState::default();
    let shallow = no_decompression_limit(&state, 18.0, crate::FN2, 100.0).unwrap();
    let deep = no_decompression_limit(&state, 40.0, crate::FN2, 100.0).unwrap();
    match (shallow, deep) {
        (NoDecoLimit::Minutes(s), NoDecoLimit::Minutes(d)) => assert!(s > d),
        other => panic!("unexpected limits {:?}", other),
    }
}
