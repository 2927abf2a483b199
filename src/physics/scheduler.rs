//! Wall-clock driven tick scheduling
//!
//! The scheduler turns an irregular stream of frame timestamps into whole
//! numbers of ticks. The tick index is derived from absolute time on every
//! frame, `floor(time * rate / 1000)`, and the difference to the previous
//! frame's index is what gets advanced. Fractions of a tick are never
//! accumulated, so frame-rate jitter cannot make the average tick rate drift.
//!
//! All lanes advance by the same count in the same frame, which is what keeps
//! the trajectories comparable.

use crate::physics::simulation::{self, Simulation, SimulationError};
use crate::physics::math::Scalar;
use bevy::prelude::*;
use std::time::{Duration, Instant};

/// Index of the tick due at `time_ms` for a given rate.
pub fn target_tick(time_ms: Scalar, ticks_per_second: Scalar) -> i64 {
    libm::floor(time_ms * ticks_per_second / 1000.0) as i64
}

/// Ticks due between two timestamps.
pub fn ticks_between(previous_ms: Scalar, time_ms: Scalar, ticks_per_second: Scalar) -> i64 {
    target_tick(time_ms, ticks_per_second)
        .saturating_sub(target_tick(previous_ms, ticks_per_second))
}

pub fn validate_tick_rate(ticks_per_second: Scalar) -> Result<Scalar, SimulationError> {
    if ticks_per_second.is_finite() && ticks_per_second > 0.0 {
        Ok(ticks_per_second)
    } else {
        Err(SimulationError::InvalidTickRate(ticks_per_second))
    }
}

/// A simulation plus the first error it raised, if any.
#[derive(Debug, Clone)]
pub struct Lane {
    pub simulation: Simulation,
    pub fault: Option<SimulationError>,
}

impl Lane {
    pub fn new(simulation: Simulation) -> Self {
        Self {
            simulation,
            fault: None,
        }
    }

    pub fn is_faulted(&self) -> bool {
        self.fault.is_some()
    }
}

/// Timing of one scheduler callback, handed to the diagnostics sink.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub ticks_advanced: u64,
    pub frame_interval_ms: Scalar,
    pub compute_duration: Duration,
    /// `(lane index, error)` for every lane that faulted during this frame
    pub faults: Vec<(usize, SimulationError)>,
}

impl FrameReport {
    pub fn compute_ms(&self) -> Scalar {
        self.compute_duration.as_secs_f64() * 1000.0
    }
}

/// Drives an ordered set of lanes in lockstep.
#[derive(Resource, Debug, Clone)]
pub struct TickScheduler {
    lanes: Vec<Lane>,
    ticks_per_second: Scalar,
    previous_time_ms: Option<Scalar>,
    paused: bool,
}

impl TickScheduler {
    pub fn new(ticks_per_second: Scalar) -> Result<Self, SimulationError> {
        Ok(Self {
            lanes: Vec::new(),
            ticks_per_second: validate_tick_rate(ticks_per_second)?,
            previous_time_ms: None,
            paused: false,
        })
    }

    pub fn with_lane(mut self, simulation: Simulation) -> Self {
        self.add_lane(simulation);
        self
    }

    pub fn add_lane(&mut self, simulation: Simulation) {
        self.lanes.push(Lane::new(simulation));
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn simulations(&self) -> impl Iterator<Item = &Simulation> {
        self.lanes.iter().map(|lane| &lane.simulation)
    }

    pub fn ticks_per_second(&self) -> Scalar {
        self.ticks_per_second
    }

    /// Takes effect on the next frame.
    pub fn set_ticks_per_second(&mut self, ticks_per_second: Scalar) -> Result<(), SimulationError> {
        self.ticks_per_second = validate_tick_rate(ticks_per_second)?;
        Ok(())
    }

    /// Step factor shared by the lanes, taken from the first one.
    pub fn step_factor(&self) -> Option<Scalar> {
        self.lanes.first().map(|lane| lane.simulation.step_factor())
    }

    /// Applies to every lane or, when the value is invalid, to none.
    pub fn set_step_factor(&mut self, step_factor: Scalar) -> Result<(), SimulationError> {
        let step_factor = simulation::validate_step_factor(step_factor)?;
        for lane in &mut self.lanes {
            lane.simulation.set_step_factor(step_factor)?;
        }
        Ok(())
    }

    /// Trade tick rate for step size while keeping simulated time per real
    /// second fixed: the rate is multiplied by `2^k` and the step divided by
    /// it.
    pub fn shift_accuracy(&mut self, k: i32) -> Result<(), SimulationError> {
        let factor = libm::ldexp(1.0, k);
        let ticks_per_second = validate_tick_rate(self.ticks_per_second * factor)?;

        if let Some(step_factor) = self.step_factor() {
            self.set_step_factor(step_factor / factor)?;
        }
        self.ticks_per_second = ticks_per_second;
        Ok(())
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Returns every lane to its initial conditions and clears faults.
    ///
    /// The frame clock is left alone so the next frame only advances by the
    /// time elapsed since the last one.
    pub fn reset(&mut self) {
        for lane in &mut self.lanes {
            lane.simulation.reset();
            lane.fault = None;
        }
    }

    /// Feed one frame timestamp in milliseconds.
    ///
    /// The first timestamp only primes the clock. While paused the clock keeps
    /// moving but nothing advances, so resuming does not replay the pause.
    /// Both cases return `None`, as does a timestamp that is not finite or is
    /// older than the previous one. Ignored timestamps leave the clock as is.
    pub fn on_frame(&mut self, time_ms: Scalar) -> Option<FrameReport> {
        if !time_ms.is_finite() {
            warn!("Ignoring non-finite frame timestamp {}", time_ms);
            return None;
        }

        let previous_ms = match self.previous_time_ms {
            None => {
                self.previous_time_ms = Some(time_ms);
                return None;
            }
            Some(previous_ms) if time_ms < previous_ms => {
                warn!(
                    "Ignoring frame timestamp {:.3} ms older than the previous {:.3} ms",
                    time_ms, previous_ms
                );
                return None;
            }
            Some(previous_ms) => previous_ms,
        };
        self.previous_time_ms = Some(time_ms);

        if self.paused {
            return None;
        }

        let ticks = ticks_between(previous_ms, time_ms, self.ticks_per_second);

        let started = Instant::now();
        let mut faults = Vec::new();
        for (index, lane) in self.lanes.iter_mut().enumerate() {
            if lane.is_faulted() {
                continue;
            }
            if let Err(error) = lane.simulation.advance(ticks) {
                warn!("Lane {} ({}) halted: {}", index, lane.simulation.algorithm(), error);
                lane.fault = Some(error);
                faults.push((index, error));
            }
        }

        Some(FrameReport {
            ticks_advanced: ticks.max(0) as u64,
            frame_interval_ms: time_ms - previous_ms,
            compute_duration: started.elapsed(),
            faults,
        })
    }
}
