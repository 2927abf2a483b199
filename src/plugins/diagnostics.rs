//! Simulation diagnostics module.
//!
//! Consumes the [`FrameReport`] published after every scheduler callback and
//! keeps exponentially smoothed frame statistics:
//!
//! - **Frames per second**: from the interval between frame timestamps
//! - **Compute time**: wall-clock milliseconds spent advancing all lanes
//! - **Ticks per second**: ticks actually advanced per real second
//! - **Milliseconds per tick**: compute time divided by ticks, 0 for idle frames
//!
//! Raw samples are also recorded as Bevy diagnostics under `orbitstep/`. A
//! summary line is logged at a fixed real-time interval while the simulation
//! runs, and once more when the app exits. Nothing here feeds back into the
//! physics.

use crate::config::DiagnosticsConfig;
use crate::prelude::*;
use bevy::diagnostic::{
    DEFAULT_MAX_HISTORY_LENGTH, Diagnostic, DiagnosticPath, Diagnostics, RegisterDiagnostic,
};
use core::time::Duration;

/// Exponentially weighted moving average, starting from zero.
///
/// `alpha` is the weight of the previous average, so values close to 1
/// converge slowly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ewma {
    alpha: Scalar,
    value: Scalar,
}

impl Ewma {
    pub const fn new(alpha: Scalar) -> Self {
        Self { alpha, value: 0.0 }
    }

    pub fn update(&mut self, next: Scalar) -> Scalar {
        self.value = self.alpha * self.value + (1.0 - self.alpha) * next;
        self.value
    }

    pub fn value(&self) -> Scalar {
        self.value
    }
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct FrameStats {
    pub frames_per_second: Ewma,
    pub compute_ms: Ewma,
    pub ticks_per_second: Ewma,
    pub ms_per_tick: Ewma,
    pub frames: u64,
    pub ticks: u64,
    pub compute_time: Duration,
}

impl FrameStats {
    pub fn new(config: &DiagnosticsConfig) -> Self {
        Self {
            frames_per_second: Ewma::new(config.fps_smoothing),
            compute_ms: Ewma::new(config.compute_smoothing),
            ticks_per_second: Ewma::new(config.tick_rate_smoothing),
            ms_per_tick: Ewma::new(config.ms_per_tick_smoothing),
            frames: 0,
            ticks: 0,
            compute_time: Duration::ZERO,
        }
    }

    pub fn record(&mut self, report: &FrameReport) {
        let compute_ms = report.compute_ms();

        // A zero interval has no meaningful rate
        if report.frame_interval_ms > 0.0 {
            self.frames_per_second
                .update(1000.0 / report.frame_interval_ms);
            self.ticks_per_second
                .update(report.ticks_advanced as Scalar / (report.frame_interval_ms / 1000.0));
        }
        self.compute_ms.update(compute_ms);
        self.ms_per_tick.update(if report.ticks_advanced == 0 {
            0.0
        } else {
            compute_ms / report.ticks_advanced as Scalar
        });

        self.frames += 1;
        self.ticks += report.ticks_advanced;
        self.compute_time += report.compute_duration;
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new(&DiagnosticsConfig::default())
    }
}

#[derive(Resource)]
pub struct SimulationDiagnosticsState {
    log_timer: Timer,
}

pub struct SimulationDiagnosticsPlugin {
    max_history_length: usize,
}

impl Default for SimulationDiagnosticsPlugin {
    fn default() -> Self {
        Self {
            max_history_length: DEFAULT_MAX_HISTORY_LENGTH,
        }
    }
}

impl SimulationDiagnosticsPlugin {
    pub const FRAMES_PER_SECOND: DiagnosticPath = DiagnosticPath::const_new("orbitstep/fps");
    pub const COMPUTE_MS: DiagnosticPath = DiagnosticPath::const_new("orbitstep/compute_ms");
    pub const TICKS_PER_SECOND: DiagnosticPath =
        DiagnosticPath::const_new("orbitstep/ticks_per_second");
    pub const MS_PER_TICK: DiagnosticPath = DiagnosticPath::const_new("orbitstep/ms_per_tick");

    fn register_diagnostics(&self, app: &mut App) {
        for (path, suffix) in [
            (Self::FRAMES_PER_SECOND, " fps"),
            (Self::COMPUTE_MS, " ms"),
            (Self::TICKS_PER_SECOND, " ticks/s"),
            (Self::MS_PER_TICK, " ms/tick"),
        ] {
            app.register_diagnostic(
                Diagnostic::new(path)
                    .with_suffix(suffix)
                    .with_max_history_length(self.max_history_length)
                    .with_smoothing_factor(0.0),
            );
        }
    }

    fn record_frame_reports(
        mut reports: EventReader<FrameReport>,
        mut stats: ResMut<FrameStats>,
        mut diagnostics: Diagnostics,
    ) {
        for report in reports.read() {
            stats.record(report);

            let ticks = report.ticks_advanced as Scalar;
            let compute_ms = report.compute_ms();
            if report.frame_interval_ms > 0.0 {
                let interval_ms = report.frame_interval_ms;
                diagnostics.add_measurement(&Self::FRAMES_PER_SECOND, || 1000.0 / interval_ms);
                diagnostics
                    .add_measurement(&Self::TICKS_PER_SECOND, || ticks / (interval_ms / 1000.0));
            }
            diagnostics.add_measurement(&Self::COMPUTE_MS, || compute_ms);
            if ticks > 0.0 {
                diagnostics.add_measurement(&Self::MS_PER_TICK, || compute_ms / ticks);
            }
        }
    }

    fn log_stats(
        time: Res<Time<Real>>,
        mut state: ResMut<SimulationDiagnosticsState>,
        stats: Res<FrameStats>,
        scheduler: Res<TickScheduler>,
    ) {
        if !state.log_timer.tick(time.delta()).just_finished() {
            return;
        }

        info!(
            "{:.1} fps | {:.3} ms compute | {:.1} ticks/s | {:.5} ms/tick",
            stats.frames_per_second.value(),
            stats.compute_ms.value(),
            stats.ticks_per_second.value(),
            stats.ms_per_tick.value()
        );
        log_lane_states(&scheduler);
    }

    fn log_summary_on_exit(
        mut exits: EventReader<AppExit>,
        stats: Res<FrameStats>,
        scheduler: Res<TickScheduler>,
    ) {
        if exits.read().next().is_none() {
            return;
        }

        info!(
            "Ran {} frames, {} ticks per lane, {:.3} ms total compute",
            stats.frames,
            stats.ticks,
            stats.compute_time.as_secs_f64() * 1000.0
        );
        log_lane_states(&scheduler);
    }
}

fn log_lane_states(scheduler: &TickScheduler) {
    for lane in scheduler.lanes() {
        let simulation = &lane.simulation;
        match lane.fault {
            Some(fault) => info!("  {:<16} halted: {}", simulation.algorithm().name(), fault),
            None => info!(
                "  {:<16} tick {:>8} position ({:+.6}, {:+.6}) energy {:+.9}",
                simulation.algorithm().name(),
                simulation.tick(),
                simulation.position().x,
                simulation.position().y,
                simulation.specific_energy()
            ),
        }
    }
}

impl Plugin for SimulationDiagnosticsPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<SimulationConfig>()
            .map(|config| config.diagnostics.clone())
            .unwrap_or_default();

        app.insert_resource(FrameStats::new(&config));
        app.insert_resource(SimulationDiagnosticsState {
            log_timer: Timer::new(
                Duration::from_secs_f64(config.log_interval_seconds),
                TimerMode::Repeating,
            ),
        });
        app.add_event::<FrameReport>();

        self.register_diagnostics(app);

        app.add_systems(
            Update,
            (
                Self::record_frame_reports.after(SimulationSet::Advance),
                Self::log_stats
                    .after(Self::record_frame_reports)
                    .run_if(in_state(AppState::Running)),
            ),
        );
        app.add_systems(Last, Self::log_summary_on_exit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::simulation::SimulationPlugin;
    use crate::test_utils::create_test_app;

    fn report(ticks: u64, interval_ms: Scalar, compute_ms: u64) -> FrameReport {
        FrameReport {
            ticks_advanced: ticks,
            frame_interval_ms: interval_ms,
            compute_duration: Duration::from_millis(compute_ms),
            faults: Vec::new(),
        }
    }

    #[test]
    fn test_ewma_weights_previous_value() {
        let mut average = Ewma::new(0.9);
        assert_eq!(average.value(), 0.0);

        assert!((average.update(10.0) - 1.0).abs() < 1e-12);
        assert!((average.update(10.0) - 1.9).abs() < 1e-12);

        let mut instant = Ewma::new(0.0);
        assert_eq!(instant.update(42.0), 42.0);
        assert_eq!(instant.update(7.0), 7.0);
    }

    #[test]
    fn test_frame_stats_record() {
        let mut stats = FrameStats::new(&DiagnosticsConfig {
            fps_smoothing: 0.0,
            compute_smoothing: 0.0,
            tick_rate_smoothing: 0.0,
            ms_per_tick_smoothing: 0.0,
            log_interval_seconds: 1.0,
        });

        stats.record(&report(16, 20.0, 4));
        assert_eq!(stats.frames_per_second.value(), 50.0);
        assert_eq!(stats.ticks_per_second.value(), 800.0);
        assert_eq!(stats.compute_ms.value(), 4.0);
        assert_eq!(stats.ms_per_tick.value(), 0.25);

        stats.record(&report(0, 20.0, 1));
        assert_eq!(stats.ms_per_tick.value(), 0.0);
        assert_eq!(stats.frames, 2);
        assert_eq!(stats.ticks, 16);
        assert_eq!(stats.compute_time, Duration::from_millis(5));
    }

    #[test]
    fn test_zero_interval_leaves_rates_alone() {
        let mut stats = FrameStats::default();
        stats.record(&report(0, 0.0, 0));

        assert!(stats.frames_per_second.value().is_finite());
        assert!(stats.ticks_per_second.value().is_finite());
        assert_eq!(stats.frames, 1);
    }

    #[test]
    fn test_plugin_collects_frame_reports() {
        let mut config = SimulationConfig::default();
        config.scheduler.target_tick_rate = 1000.0;

        let mut app = create_test_app(Duration::from_millis(10));
        app.add_plugins(SimulationPlugin::new(config).unwrap());
        app.add_plugins(SimulationDiagnosticsPlugin::default());

        for _ in 0..4 {
            app.update();
        }

        let stats = app.world().resource::<FrameStats>();
        assert_eq!(stats.frames, 3);
        assert_eq!(stats.ticks, 30);
        assert!(stats.frames_per_second.value() > 0.0);
        assert!(stats.frames_per_second.value() <= 100.0);

        let store = app.world().resource::<bevy::diagnostic::DiagnosticsStore>();
        let fps = store
            .get(&SimulationDiagnosticsPlugin::FRAMES_PER_SECOND)
            .and_then(|diagnostic| diagnostic.value());
        assert_eq!(fps, Some(100.0));
    }

    #[test]
    fn test_smoothing_comes_from_config() {
        let mut config = SimulationConfig::default();
        config.diagnostics.fps_smoothing = 0.5;

        let mut app = create_test_app(Duration::from_millis(10));
        app.insert_resource(config);
        app.add_plugins(SimulationDiagnosticsPlugin::default());

        let mut stats = app.world_mut().resource_mut::<FrameStats>();
        stats.record(&report(10, 10.0, 0));
        assert_eq!(stats.frames_per_second.value(), 50.0);
    }
}
