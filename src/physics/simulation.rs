//! One rocket trajectory advanced by a single update rule
//!
//! A [`Simulation`] owns its [`PhysicalState`] outright. The only writers are
//! [`Simulation::advance`] and [`Simulation::reset`], and the step factor can
//! only be changed through a setter that validates it.

use crate::physics::field::InverseSquareField;
use crate::physics::integrators::{Algorithm, Integrator, IntegratorRegistry};
use crate::physics::math::{self, Scalar, Vector};
use std::fmt;

/// Everything that can go wrong while configuring or advancing a lane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimulationError {
    /// Step factor was zero, negative, or not finite
    InvalidStepFactor(Scalar),
    /// A negative number of ticks was requested
    NegativeTickCount(i64),
    /// Target tick rate was zero, negative, or not finite
    InvalidTickRate(Scalar),
    /// The algorithm is reserved but has no update rule
    UnsupportedAlgorithm(Algorithm),
    /// The next step would leave the state non-finite; it was not applied
    NonFiniteState { algorithm: Algorithm, tick: u64 },
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::InvalidStepFactor(value) => {
                write!(f, "step factor must be positive and finite, got {value}")
            }
            SimulationError::NegativeTickCount(n) => {
                write!(f, "cannot advance by a negative number of ticks ({n})")
            }
            SimulationError::InvalidTickRate(value) => {
                write!(f, "target tick rate must be positive and finite, got {value}")
            }
            SimulationError::UnsupportedAlgorithm(algorithm) => {
                write!(f, "algorithm not implemented: {algorithm}")
            }
            SimulationError::NonFiniteState { algorithm, tick } => write!(
                f,
                "{algorithm} produced a non-finite state after tick {tick}; step rejected"
            ),
        }
    }
}

impl std::error::Error for SimulationError {}

pub fn validate_step_factor(step_factor: Scalar) -> Result<Scalar, SimulationError> {
    if step_factor.is_finite() && step_factor > 0.0 {
        Ok(step_factor)
    } else {
        Err(SimulationError::InvalidStepFactor(step_factor))
    }
}

/// Mutable part of a lane.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PhysicalState {
    pub tick: u64,
    pub position: Vector,
    pub velocity: Vector,
}

impl PhysicalState {
    pub fn new(position: Vector, velocity: Vector) -> Self {
        Self {
            tick: 0,
            position,
            velocity,
        }
    }
}

/// A rocket orbiting a fixed planet under one numerical scheme.
pub struct Simulation {
    algorithm: Algorithm,
    /// Update rule bound at construction, `None` for reserved algorithms
    integrator: Option<Box<dyn Integrator>>,
    field: InverseSquareField,
    step_factor: Scalar,
    initial: PhysicalState,
    state: PhysicalState,
}

impl Simulation {
    /// Build a lane with the standard integrators.
    ///
    /// Reserved algorithms are accepted here so the failure surfaces from
    /// [`Simulation::advance`]. Use [`Simulation::try_new`] to reject them up
    /// front.
    pub fn new(
        algorithm: Algorithm,
        field: InverseSquareField,
        initial_position: Vector,
        initial_velocity: Vector,
        step_factor: Scalar,
    ) -> Result<Self, SimulationError> {
        Self::with_registry(
            &IntegratorRegistry::default(),
            algorithm,
            field,
            initial_position,
            initial_velocity,
            step_factor,
        )
    }

    /// Like [`Simulation::new`] but fails immediately for reserved algorithms.
    pub fn try_new(
        algorithm: Algorithm,
        field: InverseSquareField,
        initial_position: Vector,
        initial_velocity: Vector,
        step_factor: Scalar,
    ) -> Result<Self, SimulationError> {
        let simulation = Self::new(
            algorithm,
            field,
            initial_position,
            initial_velocity,
            step_factor,
        )?;

        if simulation.is_supported() {
            Ok(simulation)
        } else {
            Err(SimulationError::UnsupportedAlgorithm(algorithm))
        }
    }

    pub fn with_registry(
        registry: &IntegratorRegistry,
        algorithm: Algorithm,
        field: InverseSquareField,
        initial_position: Vector,
        initial_velocity: Vector,
        step_factor: Scalar,
    ) -> Result<Self, SimulationError> {
        let step_factor = validate_step_factor(step_factor)?;
        let initial = PhysicalState::new(initial_position, initial_velocity);

        Ok(Self {
            algorithm,
            integrator: registry.create_for(algorithm).ok(),
            field,
            step_factor,
            initial,
            state: initial,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn is_supported(&self) -> bool {
        self.integrator.is_some()
    }

    pub fn field(&self) -> &InverseSquareField {
        &self.field
    }

    pub fn state(&self) -> &PhysicalState {
        &self.state
    }

    pub fn tick(&self) -> u64 {
        self.state.tick
    }

    pub fn position(&self) -> Vector {
        self.state.position
    }

    pub fn velocity(&self) -> Vector {
        self.state.velocity
    }

    pub fn initial_state(&self) -> &PhysicalState {
        &self.initial
    }

    pub fn step_factor(&self) -> Scalar {
        self.step_factor
    }

    /// Takes effect on the next call to [`Simulation::advance`].
    pub fn set_step_factor(&mut self, step_factor: Scalar) -> Result<(), SimulationError> {
        self.step_factor = validate_step_factor(step_factor)?;
        Ok(())
    }

    pub fn specific_energy(&self) -> Scalar {
        self.field
            .specific_energy(self.state.position, self.state.velocity)
    }

    /// Apply the update rule `n` times.
    ///
    /// Invalid requests are rejected before anything is touched. A step
    /// whose result is not finite is discarded and reported; the steps before
    /// it in the same call stay applied.
    pub fn advance(&mut self, n: i64) -> Result<(), SimulationError> {
        if n < 0 {
            return Err(SimulationError::NegativeTickCount(n));
        }
        let Some(integrator) = self.integrator.as_deref() else {
            return Err(SimulationError::UnsupportedAlgorithm(self.algorithm));
        };

        let dt = self.step_factor;
        for _ in 0..n {
            let mut position = self.state.position;
            let mut velocity = self.state.velocity;
            integrator.step(&mut position, &mut velocity, &self.field, dt);

            if !(math::is_finite(position) && math::is_finite(velocity)) {
                return Err(SimulationError::NonFiniteState {
                    algorithm: self.algorithm,
                    tick: self.state.tick,
                });
            }

            self.state.position = position;
            self.state.velocity = velocity;
            self.state.tick += 1;
        }

        Ok(())
    }

    pub fn reset(&mut self) {
        self.state = self.initial;
    }
}

impl Clone for Simulation {
    fn clone(&self) -> Self {
        Self {
            algorithm: self.algorithm,
            integrator: self.integrator.as_ref().map(|integrator| integrator.clone_box()),
            field: self.field,
            step_factor: self.step_factor,
            initial: self.initial,
            state: self.state,
        }
    }
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("algorithm", &self.algorithm)
            .field("step_factor", &self.step_factor)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
