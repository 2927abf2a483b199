//! Action handlers for simulation commands
//!
//! Each handler reads [`SimulationCommand`] independently and reacts only to
//! its own variants. Invalid values are logged and dropped; the scheduler is
//! never left half-updated.

use crate::prelude::*;
use core::time::Duration;

/// Real time after which the app asks to exit, if any.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunDuration(pub Duration);

pub fn handle_reset_event(
    mut commands_reader: EventReader<SimulationCommand>,
    mut scheduler: ResMut<TickScheduler>,
) {
    for command in commands_reader.read() {
        if !matches!(command, SimulationCommand::Reset) {
            continue;
        }
        scheduler.reset();
        info!("Reset {} lanes to their initial conditions", scheduler.lanes().len());
    }
}

pub fn handle_toggle_pause_event(
    mut commands_reader: EventReader<SimulationCommand>,
    mut scheduler: ResMut<TickScheduler>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    for command in commands_reader.read() {
        if !matches!(command, SimulationCommand::TogglePause) {
            continue;
        }
        let paused = !scheduler.is_paused();
        scheduler.set_paused(paused);
        next_state.set(AppState::from_paused(paused));
        info!("Simulation {}", if paused { "paused" } else { "resumed" });
    }
}

pub fn handle_tuning_events(
    mut commands_reader: EventReader<SimulationCommand>,
    mut scheduler: ResMut<TickScheduler>,
) {
    for command in commands_reader.read() {
        let result = match *command {
            SimulationCommand::SetStepFactor(step_factor) => scheduler.set_step_factor(step_factor),
            SimulationCommand::SetTargetTickRate(rate) => scheduler.set_ticks_per_second(rate),
            SimulationCommand::ShiftAccuracy(k) => scheduler.shift_accuracy(k),
            _ => continue,
        };

        match result {
            Ok(()) => info!(
                "Step factor {:?}, target {} ticks/s",
                scheduler.step_factor(),
                scheduler.ticks_per_second()
            ),
            Err(e) => warn!("Ignoring {:?}: {}", command, e),
        }
    }
}

pub fn handle_quit_event(
    mut commands_reader: EventReader<SimulationCommand>,
    mut exit: EventWriter<AppExit>,
) {
    if commands_reader
        .read()
        .any(|command| matches!(command, SimulationCommand::Quit))
    {
        exit.write(AppExit::Success);
    }
}

pub fn quit_after_run_duration(
    time: Res<Time<Real>>,
    duration: Res<RunDuration>,
    mut commands: EventWriter<SimulationCommand>,
    mut requested: Local<bool>,
) {
    if !*requested && time.elapsed() >= duration.0 {
        info!("Run duration of {:?} reached", duration.0);
        commands.write(SimulationCommand::Quit);
        *requested = true;
    }
}
