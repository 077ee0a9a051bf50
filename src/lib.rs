#![no_std]

#[cfg(any(test, feature = "std"))]
extern crate std;

extern crate alloc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[macro_use]
mod fmt;

pub mod ceiling;
pub mod deco;
pub mod dive_state;
pub mod m_value;
pub mod ndl;
pub mod simulate;
pub mod tissue;
pub mod zhl16;

pub use ceiling::controlling_compartment;
pub use deco::{compute_schedule, stop_ladder, DecompressionScheduler, Stop, StopSchedule};
pub use dive_state::DiveState;
pub use ndl::{no_decompression_limit, NoDecoLimit};
pub use simulate::{advance, Segment, SegmentKind};

/// Nitrogen fraction of air.
pub const FN2: f64 = 0.79;

/// Water vapour pressure in the lungs at 37 deg celsius, bar (47 mmHg).
pub const ALVEOLAR_WATER_VAPOR_PRESSURE: f64 = 0.0627;

/// Safety factor that leaves the M-value line untouched.
pub const DEFAULT_SAFETY_FACTOR: f64 = 100.0;

/// Most steps the stepwise solver may take at one stop (`max_stop_minutes / step_minutes`).
pub const MAX_SOLVER_STEPS: u32 = 1_000_000;

/// Physical surroundings of a dive: how depth maps to pressure and what the
/// lungs subtract from the inspired gas.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Environment {
    pub surface_pressure: f64,     // bar
    pub meters_per_bar: f64,       // m of water per bar
    pub water_vapor_pressure: f64, // bar
}

impl Environment {
    pub fn new(surface_pressure: f64) -> Self {
        Environment {
            surface_pressure,
            ..Environment::default()
        }
    }

    pub fn with_water_vapor_pressure(mut self, water_vapor_pressure: f64) -> Self {
        self.water_vapor_pressure = water_vapor_pressure;
        self
    }

    pub fn with_meters_per_bar(mut self, meters_per_bar: f64) -> Self {
        self.meters_per_bar = meters_per_bar;
        self
    }

    pub fn validate(&self) -> Result<(), DecoError> {
        require(
            self.surface_pressure.is_finite() && self.surface_pressure > 0.0,
            Parameter::Environment,
        )?;
        require(
            self.meters_per_bar.is_finite() && self.meters_per_bar > 0.0,
            Parameter::Environment,
        )?;
        require(
            self.water_vapor_pressure.is_finite()
                && self.water_vapor_pressure >= 0.0
                && self.water_vapor_pressure < self.surface_pressure,
            Parameter::Environment,
        )
    }

    pub fn ambient_pressure(&self, depth_meters: f64) -> f64 {
        self.surface_pressure + depth_meters / self.meters_per_bar
    }

    pub fn depth_meters(&self, ambient_pressure: f64) -> f64 {
        (ambient_pressure - self.surface_pressure) * self.meters_per_bar
    }

    /// Inert-gas partial pressure delivered to the alveoli at `ambient_pressure`.
    pub fn inspired_pressure(&self, ambient_pressure: f64, inert_fraction: f64) -> f64 {
        (ambient_pressure - self.water_vapor_pressure).max(0.0) * inert_fraction
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment {
            surface_pressure: 1.0,
            meters_per_bar: 10.0,
            water_vapor_pressure: 0.0,
        }
    }
}

/// How a computed minimum stop time becomes a scheduled duration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopRounding {
    /// Keep the minimum time as computed.
    Exact,
    /// Round up to the next multiple of `granularity_minutes`.
    Up { granularity_minutes: f64 },
}

impl StopRounding {
    pub fn apply(&self, minutes: f64) -> f64 {
        match *self {
            StopRounding::Exact => minutes,
            StopRounding::Up { granularity_minutes } => {
                libm::ceil(minutes / granularity_minutes) * granularity_minutes
            }
        }
    }
}

/// Strategy for finding the minimum time at a stop.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopSolver {
    /// Invert the loading equation per compartment.
    ClosedForm,
    /// Off-gas in fixed steps until the ceiling clears.
    Stepwise { step_minutes: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecoConfig {
    pub safety_factor: f64, // percent, 0 < x <= 200
    pub rounding: StopRounding,
    pub solver: StopSolver,
    pub max_stop_minutes: f64,
}

impl DecoConfig {
    pub fn new(safety_factor: f64) -> Self {
        DecoConfig {
            safety_factor,
            ..DecoConfig::default()
        }
    }

    pub fn with_rounding(mut self, rounding: StopRounding) -> Self {
        self.rounding = rounding;
        self
    }

    pub fn with_solver(mut self, solver: StopSolver) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_max_stop_minutes(mut self, max_stop_minutes: f64) -> Self {
        self.max_stop_minutes = max_stop_minutes;
        self
    }

    pub fn validate(&self) -> Result<(), DecoError> {
        ceiling::validate_safety_factor(self.safety_factor)?;
        if let StopRounding::Up { granularity_minutes } = self.rounding {
            require(
                granularity_minutes.is_finite() && granularity_minutes > 0.0,
                Parameter::Rounding,
            )?;
        }
        require(
            self.max_stop_minutes.is_finite() && self.max_stop_minutes > 0.0,
            Parameter::MaxStopTime,
        )?;
        if let StopSolver::Stepwise { step_minutes } = self.solver {
            require(
                step_minutes.is_finite()
                    && step_minutes > 0.0
                    && libm::ceil(self.max_stop_minutes / step_minutes)
                        <= MAX_SOLVER_STEPS as f64,
                Parameter::SolverStep,
            )?;
        }
        Ok(())
    }
}

impl Default for DecoConfig {
    fn default() -> Self {
        DecoConfig {
            safety_factor: DEFAULT_SAFETY_FACTOR,
            rounding: StopRounding::Up {
                granularity_minutes: 1.0,
            },
            solver: StopSolver::ClosedForm,
            // a full day at one stop is far past anything breathable from a cylinder
            max_stop_minutes: 24.0 * 60.0,
        }
    }
}

/// The input that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parameter {
    HalfTime,
    Duration,
    Depth,
    InertFraction,
    TissuePressure,
    SafetyFactor,
    StopDepths,
    /// The deepest usable stop is still shallower than the ceiling.
    StopsAboveCeiling,
    Environment,
    Rounding,
    SolverStep,
    MaxStopTime,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecoError {
    InvalidParameter(Parameter),
    /// No admissible stop time was found within the configured bound.
    ScheduleDivergence {
        stop_depth_meters: f64,
        compartment: usize,
    },
}

impl core::fmt::Display for DecoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DecoError::InvalidParameter(parameter) => {
                write!(f, "invalid parameter: {:?}", parameter)
            }
            DecoError::ScheduleDivergence {
                stop_depth_meters,
                compartment,
            } => write!(
                f,
                "compartment {} does not clear its ceiling at {} m",
                compartment + 1,
                stop_depth_meters
            ),
        }
    }
}

impl core::error::Error for DecoError {}

pub(crate) fn require(condition: bool, parameter: Parameter) -> Result<(), DecoError> {
    if condition {
        Ok(())
    } else {
        Err(DecoError::InvalidParameter(parameter))
    }
}

#[test]
fn test_surface_ambient_pressure() {
    let env = Environment::default();
    assert_eq!(env.ambient_pressure(0.0), 1.0);
    assert_eq!(env.ambient_pressure(40.0), 5.0);
    assert!((env.depth_meters(1.9) - 9.0).abs() < 1e-9);
}

#[test]
fn test_inspired_pressure_subtracts_water_vapor() {
    let env = Environment::default().with_water_vapor_pressure(ALVEOLAR_WATER_VAPOR_PRESSURE);
    let result = env.inspired_pressure(1.0, FN2);
    assert!((result - (1.0 - 0.0627) * 0.79).abs() < 1e-12);
}

#[test]
fn test_rounding_up() {
    let rounding = StopRounding::Up {
        granularity_minutes: 1.0,
    };
    assert_eq!(rounding.apply(0.0), 0.0);
    assert_eq!(rounding.apply(2.01), 3.0);
    assert_eq!(rounding.apply(3.0), 3.0);

    let half = StopRounding::Up {
        granularity_minutes: 0.5,
    };
    assert_eq!(half.apply(2.1), 2.5);
    assert_eq!(StopRounding::Exact.apply(2.1), 2.1);
}

#[test]
fn test_config_validation() {
    assert!(DecoConfig::default().validate().is_ok());
    assert_eq!(
        DecoConfig::new(0.0).validate(),
        Err(DecoError::InvalidParameter(Parameter::SafetyFactor))
    );
    assert_eq!(
        DecoConfig::default()
            .with_rounding(StopRounding::Up {
                granularity_minutes: 0.0
            })
            .validate(),
        Err(DecoError::InvalidParameter(Parameter::Rounding))
    );
    assert_eq!(
        DecoConfig::default()
            .with_solver(StopSolver::Stepwise { step_minutes: -1.0 })
            .validate(),
        Err(DecoError::InvalidParameter(Parameter::SolverStep))
    );
    assert!(Environment::new(0.0).validate().is_err());
}

#[test]
fn test_stepwise_step_count_is_bounded() {
    // one second steps over a day fit, tiny steps do not
    let per_second = DecoConfig::default().with_solver(StopSolver::Stepwise {
        step_minutes: 1.0 / 60.0,
    });
    assert!(per_second.validate().is_ok());

    for step_minutes in [1e-7, 1e-300, f64::MIN_POSITIVE] {
        assert_eq!(
            DecoConfig::default()
                .with_solver(StopSolver::Stepwise { step_minutes })
                .validate(),
            Err(DecoError::InvalidParameter(Parameter::SolverStep))
        );
    }
    // the bound follows the configured stop limit
    assert!(DecoConfig::default()
        .with_max_stop_minutes(0.05)
        .with_solver(StopSolver::Stepwise { step_minutes: 1e-7 })
        .validate()
        .is_ok());
}
