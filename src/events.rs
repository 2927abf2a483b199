//! Centralized event definitions
//!
//! Commands from whatever control surface is attached (keyboard, scripted
//! runs, tests) reach the simulation only as [`SimulationCommand`] events, so
//! the scheduler has a single writer.

use crate::physics::math::Scalar;
use bevy::prelude::*;

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum SimulationCommand {
    /// Return every lane to its initial conditions
    Reset,
    TogglePause,
    SetStepFactor(Scalar),
    SetTargetTickRate(Scalar),
    /// Multiply the tick rate by `2^k` and divide the step factor by it
    ShiftAccuracy(i32),
    Quit,
}
