#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ceiling::{ceiling_depth_meters, max_ceiling, requires_decompression};
use crate::tissue::Tissue;
use crate::zhl16::{COMPARTMENTS, COMPARTMENT_COUNT};
use crate::{require, DecoError, Environment, Parameter, FN2};

/// Tissue loading of one diver at one instant.
///
/// Tissues are only changed by replaying segments through
/// [`DiveState::advance`](crate::simulate); the scheduler works on copies.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DiveState {
    pub(crate) tissues: [Tissue; COMPARTMENT_COUNT],
    pub(crate) current_depth_meters: f64,
    pub(crate) elapsed_time_minutes: f64,
    /// Inert fraction of the gas being breathed, carried into the ascent.
    pub(crate) inert_fraction: f64,
    pub(crate) environment: Environment,
}

impl DiveState {
    /// Diver saturated at the surface breathing `inert_fraction` of inert gas.
    pub fn surface_equilibrium(
        inert_fraction: f64,
        environment: Environment,
    ) -> Result<Self, DecoError> {
        environment.validate()?;
        validate_inert_fraction(inert_fraction)?;
        let load = environment.inspired_pressure(environment.surface_pressure, inert_fraction);
        Ok(DiveState {
            tissues: [Tissue::at(load); COMPARTMENT_COUNT],
            current_depth_meters: 0.0,
            elapsed_time_minutes: 0.0,
            inert_fraction,
            environment,
        })
    }

    /// Rebuild a state from previously recorded tissue pressures.
    pub fn from_tissue_pressures(
        pressures: [f64; COMPARTMENT_COUNT],
        current_depth_meters: f64,
        elapsed_time_minutes: f64,
        inert_fraction: f64,
        environment: Environment,
    ) -> Result<Self, DecoError> {
        environment.validate()?;
        validate_inert_fraction(inert_fraction)?;
        for p in pressures.iter() {
            require(p.is_finite() && *p >= 0.0, Parameter::TissuePressure)?;
        }
        require(
            current_depth_meters.is_finite() && current_depth_meters >= 0.0,
            Parameter::Depth,
        )?;
        require(
            elapsed_time_minutes.is_finite() && elapsed_time_minutes >= 0.0,
            Parameter::Duration,
        )?;
        Ok(DiveState {
            tissues: pressures.map(Tissue::at),
            current_depth_meters,
            elapsed_time_minutes,
            inert_fraction,
            environment,
        })
    }

    pub fn tissue_pressures(&self) -> [f64; COMPARTMENT_COUNT] {
        self.tissues.map(|t| t.pressure())
    }

    pub fn current_depth_meters(&self) -> f64 {
        self.current_depth_meters
    }

    pub fn elapsed_time_minutes(&self) -> f64 {
        self.elapsed_time_minutes
    }

    pub fn inert_fraction(&self) -> f64 {
        self.inert_fraction
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn ambient_pressure(&self) -> f64 {
        self.environment.ambient_pressure(self.current_depth_meters)
    }

    /// Index and ceiling (bar) of the compartment demanding the deepest ceiling.
    pub fn controlling_compartment(&self, safety_factor: f64) -> Result<(usize, f64), DecoError> {
        max_ceiling(
            &self.tissues,
            safety_factor,
            self.environment.surface_pressure,
        )
    }

    pub fn requires_decompression(&self, safety_factor: f64) -> Result<bool, DecoError> {
        let (_, ceiling) = self.controlling_compartment(safety_factor)?;
        Ok(requires_decompression(
            ceiling,
            self.environment.surface_pressure,
        ))
    }

    pub fn ceiling_depth_meters(&self, safety_factor: f64) -> Result<f64, DecoError> {
        let (_, ceiling) = self.controlling_compartment(safety_factor)?;
        Ok(ceiling_depth_meters(ceiling, &self.environment))
    }
}

impl Default for DiveState {
    /// Air at a 1 bar surface.
    fn default() -> Self {
        let environment = Environment::default();
        let load = environment.inspired_pressure(environment.surface_pressure, FN2);
        DiveState {
            tissues: [Tissue::at(load); COMPARTMENT_COUNT],
            current_depth_meters: 0.0,
            elapsed_time_minutes: 0.0,
            inert_fraction: FN2,
            environment,
        }
    }
}

pub(crate) fn validate_inert_fraction(inert_fraction: f64) -> Result<(), DecoError> {
    require(
        (0.0..=1.0).contains(&inert_fraction),
        Parameter::InertFraction,
    )
}

/// Load all compartments for `minutes` at a constant inspired pressure.
pub(crate) fn load_tissues(
    tissues: &mut [Tissue; COMPARTMENT_COUNT],
    inspired: f64,
    minutes: f64,
) -> Result<(), DecoError> {
    for (tissue, compartment) in tissues.iter_mut().zip(COMPARTMENTS.iter()) {
        *tissue = tissue.load(compartment, inspired, minutes)?;
    }
    Ok(())
}

#[test]
fn test_default_is_surface_air() {
    let state = DiveState::default();
    for p in state.tissue_pressures() {
        assert_eq!(p, 0.79);
    }
    assert_eq!(state.current_depth_meters(), 0.0);
    assert!(!state.requires_decompression(100.0).unwrap());
}

#[test]
fn test_rejects_negative_tissue_pressure() {
    let mut pressures = [0.79; COMPARTMENT_COUNT];
    pressures[3] = -0.1;
    assert_eq!(
        DiveState::from_tissue_pressures(pressures, 0.0, 0.0, FN2, Environment::default()),
        Err(DecoError::InvalidParameter(Parameter::TissuePressure))
    );
}
