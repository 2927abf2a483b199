//! Layered configuration
//!
//! Values come from, in increasing priority: built-in defaults, a TOML file
//! (an explicit path or the per-user config file), and `ORBITSTEP__*`
//! environment variables such as `ORBITSTEP__PHYSICS__STEP_FACTOR=0.125`.
//! Command-line overrides are applied on top by [`crate::cli`].

use crate::physics::field::{ForceLaw, InverseSquareField};
use crate::physics::integrators::{Algorithm, IntegratorRegistry};
use crate::physics::math::{self, Scalar, Vector};
use crate::physics::scheduler::TickScheduler;
use crate::physics::simulation::Simulation;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "ORBITSTEP";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug)]
pub enum ConfigError {
    /// A source could not be read or merged
    Load(config::ConfigError),
    Io(std::io::Error),
    Serialize(toml::ser::Error),
    /// Values parsed but describe an impossible setup
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Load(e) => write!(f, "failed to load configuration: {e}"),
            ConfigError::Io(e) => write!(f, "configuration file error: {e}"),
            ConfigError::Serialize(e) => write!(f, "failed to serialize configuration: {e}"),
            ConfigError::Invalid(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Load(e) => Some(e),
            ConfigError::Io(e) => Some(e),
            ConfigError::Serialize(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(e: config::ConfigError) -> Self {
        ConfigError::Load(e)
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(e: toml::ser::Error) -> Self {
        ConfigError::Serialize(e)
    }
}

#[derive(Resource, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub physics: PhysicsConfig,
    pub scheduler: SchedulerConfig,
    pub diagnostics: DiagnosticsConfig,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Surface gravity `G` of the planet
    pub gravitational_constant: Scalar,
    /// Reference radius `R` at which the pull equals `G`
    pub reference_radius: Scalar,
    pub planet_position: [Scalar; 2],
    pub initial_position: [Scalar; 2],
    pub initial_velocity: [Scalar; 2],
    /// Simulated time per tick
    pub step_factor: Scalar,
    /// One lane per entry, in display order; names or aliases
    pub algorithms: Vec<String>,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravitational_constant: 1000.0,
            reference_radius: 0.001,
            planet_position: [0.0, 0.0],
            initial_position: [-0.3, 0.0],
            initial_velocity: [0.0, 0.079],
            step_factor: 0.0625, // 2^-4
            algorithms: vec![
                Algorithm::ExplicitEuler.name().to_string(),
                Algorithm::SymplecticEuler.name().to_string(),
                Algorithm::VelocityVerlet.name().to_string(),
            ],
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SchedulerConfig {
    pub target_tick_rate: Scalar,
    /// How often the headless runner fires a frame, in Hz
    pub frame_rate: Scalar,
    pub start_paused: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            target_tick_rate: 960.0, // 15 * 2^6
            frame_rate: 60.0,
            start_paused: false,
        }
    }
}

/// Smoothing factors weight the previous average; `0.99` converges slowly.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DiagnosticsConfig {
    pub fps_smoothing: Scalar,
    pub compute_smoothing: Scalar,
    pub tick_rate_smoothing: Scalar,
    pub ms_per_tick_smoothing: Scalar,
    pub log_interval_seconds: Scalar,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            fps_smoothing: 0.1,
            compute_smoothing: 0.99,
            tick_rate_smoothing: 0.1,
            ms_per_tick_smoothing: 0.99,
            log_interval_seconds: 1.0,
        }
    }
}

impl SimulationConfig {
    /// Load from an explicit file, which must exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::load_layered(Some(path), true, ENV_PREFIX)
    }

    /// Load the per-user config file if there is one.
    pub fn load_from_user_config() -> Self {
        let path = Self::user_config_path();
        match Self::load_layered(path.as_deref(), false, ENV_PREFIX) {
            Ok(config) => config,
            Err(e) => {
                warn!("{}. Using defaults.", e);
                Self::default()
            }
        }
    }

    fn load_layered(
        path: Option<&Path>,
        required: bool,
        env_prefix: &str,
    ) -> Result<Self, ConfigError> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            if path.exists() {
                info!("Loading configuration from {}", path.display());
            }
            builder = builder.add_source(
                config::File::new(&path.to_string_lossy(), config::FileFormat::Toml)
                    .required(required),
            );
        }

        let config: Self = builder
            .add_source(
                config::Environment::with_prefix(env_prefix)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn user_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "orbitstep")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Write as TOML, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let header = format!(
            "# orbitstep configuration, saved {}\n\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, header + &content)?;
        Ok(())
    }

    pub fn save_to_user_config(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::user_config_path().ok_or_else(|| {
            ConfigError::Invalid("no home directory to store the config in".to_string())
        })?;
        self.save(&path)?;
        Ok(path)
    }

    pub fn force_law(&self) -> ForceLaw {
        ForceLaw {
            gravitational_constant: self.physics.gravitational_constant,
            reference_radius: self.physics.reference_radius,
        }
    }

    pub fn field(&self) -> InverseSquareField {
        InverseSquareField::new(Vector::from(self.physics.planet_position), self.force_law())
    }

    /// Parse the lane list without checking that each entry can run.
    pub fn algorithms(&self) -> Result<Vec<Algorithm>, ConfigError> {
        self.physics
            .algorithms
            .iter()
            .map(|name| {
                name.parse::<Algorithm>()
                    .map_err(|e| ConfigError::Invalid(e.to_string()))
            })
            .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let physics = &self.physics;

        let positive = [
            ("physics.gravitational_constant", physics.gravitational_constant),
            ("physics.reference_radius", physics.reference_radius),
            ("physics.step_factor", physics.step_factor),
            ("scheduler.target_tick_rate", self.scheduler.target_tick_rate),
            ("scheduler.frame_rate", self.scheduler.frame_rate),
            ("diagnostics.log_interval_seconds", self.diagnostics.log_interval_seconds),
        ];
        for (key, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{key} must be positive and finite, got {value}"
                )));
            }
        }

        let smoothing = [
            ("diagnostics.fps_smoothing", self.diagnostics.fps_smoothing),
            ("diagnostics.compute_smoothing", self.diagnostics.compute_smoothing),
            ("diagnostics.tick_rate_smoothing", self.diagnostics.tick_rate_smoothing),
            ("diagnostics.ms_per_tick_smoothing", self.diagnostics.ms_per_tick_smoothing),
        ];
        for (key, value) in smoothing {
            if !(0.0..1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{key} must be in [0, 1), got {value}"
                )));
            }
        }

        let vectors = [
            ("physics.planet_position", physics.planet_position),
            ("physics.initial_position", physics.initial_position),
            ("physics.initial_velocity", physics.initial_velocity),
        ];
        for (key, value) in vectors {
            if !math::is_finite(Vector::from(value)) {
                return Err(ConfigError::Invalid(format!("{key} must be finite")));
            }
        }

        if physics.initial_position == physics.planet_position {
            return Err(ConfigError::Invalid(
                "the rocket cannot start at the planet's position".to_string(),
            ));
        }

        if physics.algorithms.is_empty() {
            return Err(ConfigError::Invalid(
                "physics.algorithms must name at least one integrator".to_string(),
            ));
        }

        let registry = IntegratorRegistry::default();
        for algorithm in self.algorithms()? {
            registry
                .create_for(algorithm)
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }

        Ok(())
    }

    /// One lane per configured algorithm, all with the same initial
    /// conditions.
    pub fn build_scheduler(&self, registry: &IntegratorRegistry) -> Result<TickScheduler, ConfigError> {
        let invalid = |e: crate::physics::simulation::SimulationError| ConfigError::Invalid(e.to_string());

        let mut scheduler = TickScheduler::new(self.scheduler.target_tick_rate).map_err(invalid)?;
        for algorithm in self.algorithms()? {
            let simulation = Simulation::with_registry(
                registry,
                algorithm,
                self.field(),
                Vector::from(self.physics.initial_position),
                Vector::from(self.physics.initial_velocity),
                self.physics.step_factor,
            )
            .map_err(invalid)?;
            scheduler.add_lane(simulation);
        }
        scheduler.set_paused(self.scheduler.start_paused);

        Ok(scheduler)
    }
}
