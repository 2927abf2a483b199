//! Simulation plugin - Self-contained plugin pattern
//!
//! Owns the [`TickScheduler`] and everything that touches it: the frame
//! driver that feeds it wall-clock timestamps and the handlers for
//! [`SimulationCommand`]s. Each completed frame is published as a
//! [`FrameReport`] event for whatever diagnostics are attached.

use crate::config::ConfigError;
use crate::prelude::*;
use core::time::Duration;

mod actions;

pub use actions::RunDuration;
use actions::{
    handle_quit_event, handle_reset_event, handle_toggle_pause_event, handle_tuning_events,
    quit_after_run_duration,
};

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Commands,
    Advance,
}

pub struct SimulationPlugin {
    config: SimulationConfig,
    scheduler: TickScheduler,
    run_for: Option<Duration>,
}

impl SimulationPlugin {
    /// Validate `config` and build one lane per configured algorithm.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let scheduler = config.build_scheduler(&IntegratorRegistry::default())?;

        Ok(Self {
            config,
            scheduler,
            run_for: None,
        })
    }

    /// Quit once this much real time has passed.
    pub fn with_run_duration(mut self, duration: Duration) -> Self {
        self.run_for = Some(duration);
        self
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        match toml::to_string_pretty(&self.config) {
            Ok(toml_string) => {
                debug!("=== Current Configuration (TOML) ===\n{}", toml_string);
                debug!("=== End Configuration ===");
            }
            Err(e) => {
                error!("Failed to serialize configuration to TOML: {}", e);
            }
        }

        app.insert_resource(self.config.clone());
        app.insert_resource(self.scheduler.clone());
        app.insert_state(AppState::from_paused(self.scheduler.is_paused()));

        app.add_event::<SimulationCommand>();
        app.add_event::<FrameReport>();

        app.configure_sets(
            Update,
            (SimulationSet::Commands, SimulationSet::Advance).chain(),
        );

        app.add_systems(Startup, log_lanes);
        app.add_systems(
            Update,
            (
                handle_reset_event,
                handle_toggle_pause_event,
                handle_tuning_events,
                handle_quit_event,
            )
                .in_set(SimulationSet::Commands),
        );
        app.add_systems(Update, drive_scheduler.in_set(SimulationSet::Advance));

        if let Some(duration) = self.run_for {
            app.insert_resource(RunDuration(duration));
            app.add_systems(
                Update,
                quit_after_run_duration
                    .in_set(SimulationSet::Commands)
                    .before(handle_quit_event),
            );
        }
    }
}

fn log_lanes(scheduler: Res<TickScheduler>) {
    for (index, simulation) in scheduler.simulations().enumerate() {
        info!(
            "Lane {}: {} starting at {:?} with velocity {:?}",
            index,
            simulation.algorithm(),
            simulation.position(),
            simulation.velocity()
        );
    }
    info!(
        "Step factor {:?}, target {} ticks/s{}",
        scheduler.step_factor(),
        scheduler.ticks_per_second(),
        if scheduler.is_paused() { ", paused" } else { "" }
    );
}

/// Frame driver: one scheduler callback per app update.
fn drive_scheduler(
    time: Res<Time<Real>>,
    mut scheduler: ResMut<TickScheduler>,
    mut reports: EventWriter<FrameReport>,
) {
    // Whole nanoseconds keep integer millisecond timestamps exact
    let time_ms = time.elapsed().as_nanos() as Scalar / 1_000_000.0;
    if let Some(report) = scheduler.on_frame(time_ms) {
        reports.write(report);
    }
}
