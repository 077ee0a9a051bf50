//! Staged-ascent scheduling.
//!
//! Starting at the shallowest stop the ceiling allows, each stop is held until
//! every compartment tolerates the ambient pressure of the next shallower stop
//! (or of the surface after the last one). The dive state itself is never
//! touched: tissues are copied and off-gassed privately, so scheduling the same
//! state twice gives the same stops.

use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ceiling::{max_ceiling, requires_decompression};
use crate::dive_state::{load_tissues, DiveState};
use crate::m_value::tolerated_tissue_pressure;
use crate::tissue::{time_to_reach, Tissue};
use crate::zhl16::{COMPARTMENTS, COMPARTMENT_COUNT};
use crate::{require, DecoConfig, DecoError, Parameter, StopSolver};

/// Slack allowed when checking that a stop cleared the next ceiling, bar.
pub const CEILING_TOLERANCE: f64 = 1e-9;

/// Longest ladder [`stop_ladder`] will build.
pub const MAX_LADDER_STOPS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Stop {
    pub depth_meters: f64,
    pub duration_minutes: f64,
    /// Slowest compartment to clear at this stop, `None` when nothing had to clear.
    pub governing_compartment: Option<usize>,
}

/// Mandatory stops, deepest first. Empty when a direct ascent is safe.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StopSchedule {
    stops: Vec<Stop>,
}

impl StopSchedule {
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Stop> {
        self.stops.iter()
    }

    /// `(depth_meters, duration_minutes)` per stop.
    pub fn pairs(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.stops
            .iter()
            .map(|stop| (stop.depth_meters, stop.duration_minutes))
    }

    pub fn total_minutes(&self) -> f64 {
        self.stops.iter().map(|stop| stop.duration_minutes).sum()
    }
}

impl<'a> IntoIterator for &'a StopSchedule {
    type Item = &'a Stop;
    type IntoIter = core::slice::Iter<'a, Stop>;

    fn into_iter(self) -> Self::IntoIter {
        self.stops.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DecompressionScheduler {
    config: DecoConfig,
}

impl DecompressionScheduler {
    pub fn new(config: DecoConfig) -> Self {
        DecompressionScheduler { config }
    }

    pub fn config(&self) -> &DecoConfig {
        &self.config
    }

    /// Stops required to surface from `dive_state`, using the given ladder of
    /// stop depths (meters, strictly descending).
    pub fn compute_schedule(
        &self,
        dive_state: &DiveState,
        stop_depths: &[f64],
    ) -> Result<StopSchedule, DecoError> {
        self.config.validate()?;
        validate_stop_depths(stop_depths)?;

        let env = dive_state.environment();
        let surface = env.surface_pressure;
        let safety_factor = self.config.safety_factor;

        let (controlling, ceiling) = dive_state.controlling_compartment(safety_factor)?;
        if !requires_decompression(ceiling, surface) {
            debug!("no stops, ceiling {} bar", ceiling);
            return Ok(StopSchedule::default());
        }

        // stops below the diver are not part of the ascent
        let start = stop_depths
            .iter()
            .position(|depth| *depth <= dive_state.current_depth_meters())
            .unwrap_or(stop_depths.len());
        let ladder = &stop_depths[start..];
        let first = ladder
            .iter()
            .rposition(|depth| env.ambient_pressure(*depth) >= ceiling)
            .ok_or(DecoError::InvalidParameter(Parameter::StopsAboveCeiling))?;
        debug!(
            "first stop {} m, compartment {} controls at {} bar",
            ladder[first],
            controlling,
            ceiling
        );

        let mut tissues = dive_state.tissues;
        let mut stops = Vec::with_capacity(ladder.len() - first);
        for (k, &depth) in ladder.iter().enumerate().skip(first) {
            let target = ladder
                .get(k + 1)
                .map(|next| env.ambient_pressure(*next))
                .unwrap_or(surface);
            let inspired =
                env.inspired_pressure(env.ambient_pressure(depth), dive_state.inert_fraction());

            let (minimum, governing) = match self.config.solver {
                StopSolver::ClosedForm => {
                    closed_form_stop_time(&tissues, inspired, target, depth, safety_factor, surface)?
                }
                StopSolver::Stepwise { step_minutes } => stepwise_stop_time(
                    &tissues,
                    inspired,
                    target,
                    depth,
                    step_minutes,
                    &self.config,
                    surface,
                )?,
            };

            let duration = self.config.rounding.apply(minimum);
            if duration > self.config.max_stop_minutes {
                let compartment = governing.unwrap_or(controlling);
                warn!(
                    "stop at {} m needs {} min, over the limit",
                    depth,
                    duration
                );
                return Err(DecoError::ScheduleDivergence {
                    stop_depth_meters: depth,
                    compartment,
                });
            }

            load_tissues(&mut tissues, inspired, duration)?;
            let (blocking, remaining) = max_ceiling(&tissues, safety_factor, surface)?;
            if remaining > target + CEILING_TOLERANCE {
                warn!(
                    "compartment {} still at {} bar after stop at {} m",
                    blocking,
                    remaining,
                    depth
                );
                return Err(DecoError::ScheduleDivergence {
                    stop_depth_meters: depth,
                    compartment: blocking,
                });
            }

            debug!(
                "stop {} m for {} min, compartment {}",
                depth,
                duration,
                governing
            );
            stops.push(Stop {
                depth_meters: depth,
                duration_minutes: duration,
                governing_compartment: governing,
            });
        }

        Ok(StopSchedule { stops })
    }
}

// t = -half_time * log2((P_allowed - Pi) / (P0 - Pi)), the longest over all compartments
fn closed_form_stop_time(
    tissues: &[Tissue; COMPARTMENT_COUNT],
    inspired: f64,
    target: f64,
    depth: f64,
    safety_factor: f64,
    surface: f64,
) -> Result<(f64, Option<usize>), DecoError> {
    let mut longest = 0.0;
    let mut governing = None;
    for (i, (tissue, compartment)) in tissues.iter().zip(COMPARTMENTS.iter()).enumerate() {
        let allowed = tolerated_tissue_pressure(target, compartment, safety_factor, surface);
        let p0 = tissue.pressure();
        if p0 <= allowed {
            continue;
        }
        let minutes = time_to_reach(p0, inspired, allowed, compartment.half_time_minutes).ok_or(
            DecoError::ScheduleDivergence {
                stop_depth_meters: depth,
                compartment: i,
            },
        )?;
        if minutes > longest {
            longest = minutes;
            governing = Some(i);
        }
    }
    Ok((longest, governing))
}

fn stepwise_stop_time(
    tissues: &[Tissue; COMPARTMENT_COUNT],
    inspired: f64,
    target: f64,
    depth: f64,
    step_minutes: f64,
    config: &DecoConfig,
    surface: f64,
) -> Result<(f64, Option<usize>), DecoError> {
    let mut scratch = *tissues;
    let mut elapsed = 0.0;
    let mut governing = None;
    loop {
        let (blocking, ceiling) = max_ceiling(&scratch, config.safety_factor, surface)?;
        if !requires_decompression(ceiling, target) {
            return Ok((elapsed, governing));
        }
        if elapsed >= config.max_stop_minutes {
            warn!("stop at {} m did not clear after {} min", depth, elapsed);
            return Err(DecoError::ScheduleDivergence {
                stop_depth_meters: depth,
                compartment: blocking,
            });
        }
        governing = Some(blocking);
        load_tissues(&mut scratch, inspired, step_minutes)?;
        elapsed += step_minutes;
    }
}

fn validate_stop_depths(stop_depths: &[f64]) -> Result<(), DecoError> {
    require(!stop_depths.is_empty(), Parameter::StopDepths)?;
    for depth in stop_depths.iter() {
        require(depth.is_finite() && *depth > 0.0, Parameter::StopDepths)?;
    }
    for pair in stop_depths.windows(2) {
        require(pair[0] > pair[1], Parameter::StopDepths)?;
    }
    Ok(())
}

/// Evenly spaced stop depths from `deepest_meters` (rounded down to a multiple
/// of `increment_meters`) up to `increment_meters`, e.g. `[9, 6, 3]`.
pub fn stop_ladder(increment_meters: f64, deepest_meters: f64) -> Result<Vec<f64>, DecoError> {
    require(
        increment_meters.is_finite() && increment_meters > 0.0,
        Parameter::StopDepths,
    )?;
    require(
        deepest_meters.is_finite() && deepest_meters >= increment_meters,
        Parameter::StopDepths,
    )?;
    let count = libm::floor(deepest_meters / increment_meters + 1e-9);
    require(count <= MAX_LADDER_STOPS as f64, Parameter::StopDepths)?;
    Ok((1..=count as usize)
        .rev()
        .map(|i| i as f64 * increment_meters)
        .collect())
}

/// Schedule with the default rounding and solver at the given safety factor (percent).
pub fn compute_schedule(
    dive_state: &DiveState,
    stop_depths: &[f64],
    safety_factor: f64,
) -> Result<StopSchedule, DecoError> {
    DecompressionScheduler::new(DecoConfig::new(safety_factor))
        .compute_schedule(dive_state, stop_depths)
}

#[test]
fn test_stop_ladder() {
    assert_eq!(stop_ladder(3.0, 9.0).unwrap(), alloc::vec![9.0, 6.0, 3.0]);
    assert_eq!(stop_ladder(3.0, 10.0).unwrap(), alloc::vec![9.0, 6.0, 3.0]);
    assert!(stop_ladder(3.0, 2.0).is_err());
    assert!(stop_ladder(0.0, 9.0).is_err());
}

#[test]
fn test_stop_ladder_length_is_bounded() {
    assert_eq!(stop_ladder(1.0, 1000.0).unwrap().len(), MAX_LADDER_STOPS);
    assert_eq!(
        stop_ladder(1.0, 1001.0),
        Err(DecoError::InvalidParameter(Parameter::StopDepths))
    );
    assert_eq!(
        stop_ladder(3.0, 1e30),
        Err(DecoError::InvalidParameter(Parameter::StopDepths))
    );
}

#[test]
fn test_stop_depths_must_descend() {
    let state = DiveState::default();
    assert_eq!(
        compute_schedule(&state, &[3.0, 6.0], 100.0),
        Err(DecoError::InvalidParameter(Parameter::StopDepths))
    );
    assert_eq!(
        compute_schedule(&state, &[], 100.0),
        Err(DecoError::InvalidParameter(Parameter::StopDepths))
    );
    assert_eq!(
        compute_schedule(&state, &[6.0, 6.0], 100.0),
        Err(DecoError::InvalidParameter(Parameter::StopDepths))
    );
}
