use bevy::app::ScheduleRunnerPlugin;
use bevy::diagnostic::DiagnosticsPlugin;
use bevy::log::{Level, LogPlugin};
use bevy::state::app::StatesPlugin;
use clap::Parser;
use core::time::Duration;
use orbitstep::cli::{self, Args};
use orbitstep::prelude::*;

fn main() -> AppExit {
    let args = Args::parse();

    if args.list_integrators {
        cli::handle_list_integrators();
        return AppExit::Success;
    }

    let config = match cli::load_and_apply_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return AppExit::error();
        }
    };

    if args.save_config {
        return match config.save_to_user_config() {
            Ok(path) => {
                println!("Saved configuration to {}", path.display());
                AppExit::Success
            }
            Err(e) => {
                eprintln!("Error: {}", cli::CliError::ConfigSave(e));
                AppExit::error()
            }
        };
    }

    let frame_interval = Duration::from_secs_f64(1.0 / config.scheduler.frame_rate);

    let mut simulation = match SimulationPlugin::new(config) {
        Ok(plugin) => plugin,
        Err(e) => {
            eprintln!("Error: {e}");
            return AppExit::error();
        }
    };
    if let Some(seconds) = args.duration {
        match Duration::try_from_secs_f64(seconds) {
            Ok(duration) => simulation = simulation.with_run_duration(duration),
            Err(e) => {
                eprintln!("Error: invalid --duration {seconds}: {e}");
                return AppExit::error();
            }
        }
    }

    let mut app = App::new();

    app.add_plugins((
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(frame_interval)),
        LogPlugin {
            level: if args.verbose {
                Level::DEBUG
            } else {
                Level::INFO
            },
            ..default()
        },
        StatesPlugin,
        DiagnosticsPlugin,
    ));
    app.add_plugins((simulation, SimulationDiagnosticsPlugin::default()));

    app.run()
}
