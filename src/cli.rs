//! Command line interface for orbitstep

use clap::Parser;
use std::fmt;
use std::path::PathBuf;

use crate::config::{ConfigError, SimulationConfig};
use crate::physics::integrators::{Algorithm, IntegratorRegistry};
use crate::physics::math::{Scalar, Vector};

/// CLI-specific errors
#[derive(Debug)]
pub enum CliError {
    /// Configuration file could not be loaded or failed validation
    ConfigLoad(ConfigError),
    /// Invalid integrator name provided
    InvalidIntegrator(String),
    /// Configuration could not be written
    ConfigSave(ConfigError),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::ConfigLoad(e) => write!(f, "Failed to load configuration: {e}"),
            CliError::InvalidIntegrator(msg) => write!(f, "Invalid integrator: {msg}"),
            CliError::ConfigSave(e) => write!(f, "Failed to save configuration: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigLoad(e) | CliError::ConfigSave(e) => Some(e),
            CliError::InvalidIntegrator(_) => None,
        }
    }
}

pub const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (built ",
    env!("BUILD_DATE"),
    ")"
);

/// orbitstep - compare numerical integrators on a rocket orbiting a planet
#[derive(Parser, Debug)]
#[command(version = VERSION, about, long_about = None)]
pub struct Args {
    /// Path to configuration file (TOML format)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Integrator for one lane; repeat for several lanes (e.g. -i euler -i verlet)
    #[arg(short = 'i', long = "integrator", value_name = "NAME")]
    pub integrators: Vec<String>,

    /// Simulated time per tick (overrides config file)
    #[arg(short = 's', long, value_name = "SECONDS")]
    pub step_factor: Option<Scalar>,

    /// Target ticks per second of real time (overrides config file)
    #[arg(short = 't', long, value_name = "RATE")]
    pub tick_rate: Option<Scalar>,

    /// Gravitational constant (overrides config file)
    #[arg(short = 'g', long, value_name = "VALUE")]
    pub gravity: Option<Scalar>,

    /// Replace the initial velocity with the one for a circular orbit
    #[arg(long)]
    pub circular: bool,

    /// Start paused
    #[arg(short = 'p', long)]
    pub paused: bool,

    /// Exit after this many seconds of real time
    #[arg(short = 'd', long, value_name = "SECONDS")]
    pub duration: Option<Scalar>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// List available integrators and exit
    #[arg(long)]
    pub list_integrators: bool,

    /// Write the effective configuration to the user config file and exit
    #[arg(long)]
    pub save_config: bool,
}

/// Handles the --list-integrators flag by printing available integrators and exiting
pub fn handle_list_integrators() {
    let registry = IntegratorRegistry::default();
    println!("Available integrators:");
    for name in registry.list_available() {
        println!("  - {name}");
    }

    let aliases = registry.list_aliases();
    if !aliases.is_empty() {
        println!("\nAliases:");
        for (alias, target) in aliases {
            println!("  - {alias} -> {target}");
        }
    }

    let reserved: Vec<&str> = Algorithm::ALL
        .iter()
        .filter(|algorithm| registry.create_for(**algorithm).is_err())
        .map(|algorithm| algorithm.name())
        .collect();
    if !reserved.is_empty() {
        println!("\nReserved (not implemented):");
        for name in reserved {
            println!("  - {name}");
        }
    }
}

/// Loads configuration from file or defaults, then applies command-line overrides
pub fn load_and_apply_config(args: &Args) -> Result<SimulationConfig, CliError> {
    let config = if let Some(config_path) = &args.config {
        println!("Loading configuration from: {}", config_path.display());
        SimulationConfig::load(config_path).map_err(CliError::ConfigLoad)?
    } else {
        SimulationConfig::load_from_user_config()
    };

    apply_overrides(config, args)
}

/// Command-line values win over every other configuration layer.
pub fn apply_overrides(
    mut config: SimulationConfig,
    args: &Args,
) -> Result<SimulationConfig, CliError> {
    if !args.integrators.is_empty() {
        let registry = IntegratorRegistry::default();
        let mut names = Vec::with_capacity(args.integrators.len());
        for name in &args.integrators {
            // Reserved names parse here and are rejected by validate()
            let algorithm = name.parse::<Algorithm>().map_err(|_| {
                CliError::InvalidIntegrator(
                    registry
                        .create(name)
                        .err()
                        .unwrap_or_else(|| name.clone()),
                )
            })?;
            names.push(algorithm.name().to_string());
        }

        println!("Using integrators: {}", names.join(", "));
        config.physics.algorithms = names;
    }

    if let Some(step_factor) = args.step_factor {
        println!("Overriding step factor to: {step_factor}");
        config.physics.step_factor = step_factor;
    }

    if let Some(tick_rate) = args.tick_rate {
        println!("Overriding target tick rate to: {tick_rate}");
        config.scheduler.target_tick_rate = tick_rate;
    }

    if let Some(gravity) = args.gravity {
        println!("Overriding gravitational constant to: {gravity}");
        config.physics.gravitational_constant = gravity;
    }

    if args.circular {
        let position = Vector::from(config.physics.initial_position);
        config.physics.initial_velocity = config.field().circular_velocity(position).to_array();
        println!(
            "Using circular orbit velocity: {:?}",
            config.physics.initial_velocity
        );
    }

    if args.paused {
        config.scheduler.start_paused = true;
    }

    config.validate().map_err(CliError::ConfigLoad)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::parse_from(std::iter::once("orbitstep").chain(args.iter().copied()))
    }

    #[test]
    fn test_parse_repeated_integrators() {
        let args = parse(&["-i", "euler", "--integrator", "verlet", "--paused"]);
        assert_eq!(args.integrators, vec!["euler", "verlet"]);
        assert!(args.paused);
        assert!(!args.list_integrators);
    }

    #[test]
    fn test_overrides_resolve_aliases() {
        let args = parse(&["-i", "euler_cromer", "-i", "verlet", "-s", "0.125", "-t", "480"]);
        let config = apply_overrides(SimulationConfig::default(), &args).unwrap();

        assert_eq!(
            config.physics.algorithms,
            vec!["symplectic_euler", "velocity_verlet"]
        );
        assert_eq!(config.physics.step_factor, 0.125);
        assert_eq!(config.scheduler.target_tick_rate, 480.0);
    }

    #[test]
    fn test_unknown_integrator_lists_choices() {
        let args = parse(&["-i", "rk45"]);
        let err = apply_overrides(SimulationConfig::default(), &args).unwrap_err();

        let message = err.to_string();
        assert!(matches!(err, CliError::InvalidIntegrator(_)));
        assert!(message.contains("rk45"));
        assert!(message.contains("velocity_verlet"));
    }

    #[test]
    fn test_reserved_integrator_is_rejected() {
        let args = parse(&["-i", "leapfrog"]);
        let err = apply_overrides(SimulationConfig::default(), &args).unwrap_err();
        assert!(matches!(err, CliError::ConfigLoad(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_invalid_step_factor_is_rejected() {
        let args = parse(&["--step-factor", "0"]);
        assert!(apply_overrides(SimulationConfig::default(), &args).is_err());
    }

    #[test]
    fn test_circular_velocity_override() {
        let args = parse(&["--circular"]);
        let config = apply_overrides(SimulationConfig::default(), &args).unwrap();

        // G * R^2 / r = 1e-3 / 0.3, velocity is perpendicular to the radius
        let [vx, vy] = config.physics.initial_velocity;
        assert!(vx.abs() < 1e-15);
        assert!((vx * vx + vy * vy - 1e-3 / 0.3).abs() < 1e-12);
    }
}
