#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dive_state::{load_tissues, validate_inert_fraction, DiveState};
use crate::zhl16::COMPARTMENTS;
use crate::{require, DecoError, Parameter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SegmentKind {
    /// Constant depth for the whole segment.
    Level,
    /// Linear depth change from the current depth to the segment depth.
    Travel,
}

/// One piece of a dive profile.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Segment {
    pub depth_meters: f64,
    pub duration_minutes: f64,
    pub inert_fraction: f64, // 0 <= x <= 1
    pub kind: SegmentKind,
}

impl Segment {
    pub fn level(depth_meters: f64, duration_minutes: f64, inert_fraction: f64) -> Self {
        Segment {
            depth_meters,
            duration_minutes,
            inert_fraction,
            kind: SegmentKind::Level,
        }
    }

    pub fn travel(target_depth_meters: f64, duration_minutes: f64, inert_fraction: f64) -> Self {
        Segment {
            depth_meters: target_depth_meters,
            duration_minutes,
            inert_fraction,
            kind: SegmentKind::Travel,
        }
    }

    pub fn validate(&self) -> Result<(), DecoError> {
        require(
            self.depth_meters.is_finite() && self.depth_meters >= 0.0,
            Parameter::Depth,
        )?;
        require(
            self.duration_minutes.is_finite() && self.duration_minutes >= 0.0,
            Parameter::Duration,
        )?;
        validate_inert_fraction(self.inert_fraction)
    }
}

/// Descent at `descent_rate` (m/min) followed by `bottom_time_minutes` at depth.
pub fn square_profile(
    depth_meters: f64,
    bottom_time_minutes: f64,
    descent_rate: f64,
    inert_fraction: f64,
) -> Result<[Segment; 2], DecoError> {
    require(
        descent_rate.is_finite() && descent_rate > 0.0,
        Parameter::Duration,
    )?;
    let segments = [
        Segment::travel(depth_meters, depth_meters / descent_rate, inert_fraction),
        Segment::level(depth_meters, bottom_time_minutes, inert_fraction),
    ];
    for segment in segments.iter() {
        segment.validate()?;
    }
    Ok(segments)
}

impl DiveState {
    /// Replay `segments` in order and return the resulting state.
    ///
    /// Every segment is validated before any loading happens, so on error
    /// nothing has been applied.
    pub fn advance(&self, segments: &[Segment]) -> Result<DiveState, DecoError> {
        for segment in segments.iter() {
            segment.validate()?;
        }
        let mut next = *self;
        for segment in segments.iter() {
            next.apply(segment)?;
        }
        Ok(next)
    }

    fn apply(&mut self, segment: &Segment) -> Result<(), DecoError> {
        let env = self.environment;
        let minutes = segment.duration_minutes;
        match segment.kind {
            SegmentKind::Level => {
                let inspired = env.inspired_pressure(
                    env.ambient_pressure(segment.depth_meters),
                    segment.inert_fraction,
                );
                load_tissues(&mut self.tissues, inspired, minutes)?;
            }
            SegmentKind::Travel if minutes > 0.0 => {
                let start_amb = env.ambient_pressure(self.current_depth_meters);
                let end_amb = env.ambient_pressure(segment.depth_meters);
                let inspired_start = env.inspired_pressure(start_amb, segment.inert_fraction);
                let rate = (end_amb - start_amb) / minutes * segment.inert_fraction;
                for (tissue, compartment) in self.tissues.iter_mut().zip(COMPARTMENTS.iter()) {
                    *tissue = tissue.load_linear(compartment, inspired_start, rate, minutes)?;
                }
            }
            SegmentKind::Travel => {}
        }
        self.current_depth_meters = segment.depth_meters;
        self.elapsed_time_minutes += minutes;
        self.inert_fraction = segment.inert_fraction;
        trace!(
            "t={} min depth={} m p1={} p16={}",
            self.elapsed_time_minutes,
            self.current_depth_meters,
            self.tissues[0].pressure(),
            self.tissues[15].pressure()
        );
        Ok(())
    }
}

pub fn advance(dive_state: &DiveState, segments: &[Segment]) -> Result<DiveState, DecoError> {
    dive_state.advance(segments)
}

#[test]
fn test_advance_accumulates_time_and_depth() {
    let state = DiveState::default()
        .advance(&[
            Segment::level(20.0, 10.0, crate::FN2),
            Segment::level(10.0, 5.0, crate::FN2),
        ])
        .unwrap();
    assert_eq!(state.elapsed_time_minutes(), 15.0);
    assert_eq!(state.current_depth_meters(), 10.0);
}

#[test]
fn test_invalid_segment_leaves_nothing_applied() {
    let state = DiveState::default();
    let result = state.advance(&[
        Segment::level(20.0, 10.0, crate::FN2),
        Segment::level(-1.0, 5.0, crate::FN2),
    ]);
    assert_eq!(result, Err(DecoError::InvalidParameter(Parameter::Depth)));
    assert_eq!(state, DiveState::default());
}
