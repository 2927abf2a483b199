//! Registry pattern for integrator discovery
//!
//! Each integrator is self-describing, providing its own name, aliases, and
//! convergence order. The registry indexes instances by canonical name and by
//! alias, and hands out fresh boxed copies on request. Lanes resolve their
//! update rule here once, when they are built.

use super::{Algorithm, Integrator};
use crate::physics::simulation::SimulationError;
use std::collections::HashMap;

pub struct IntegratorRegistry {
    /// Maps names (canonical and aliases) to integrator instances
    integrators: HashMap<String, Box<dyn Integrator>>,
}

impl IntegratorRegistry {
    /// Create an empty registry without any pre-registered integrators.
    pub fn new() -> Self {
        Self {
            integrators: HashMap::new(),
        }
    }

    /// Register every integrator that has an update rule.
    pub fn with_standard_integrators(mut self) -> Self {
        use super::{ExplicitEuler, SymplecticEuler, VelocityVerlet};

        self.register_integrator(Box::new(ExplicitEuler));
        self.register_integrator(Box::new(SymplecticEuler));
        self.register_integrator(Box::new(VelocityVerlet));

        self
    }

    pub fn with_integrator(mut self, integrator: Box<dyn Integrator>) -> Self {
        self.register_integrator(integrator);
        self
    }

    pub fn register_integrator(&mut self, integrator: Box<dyn Integrator>) {
        let name = integrator.name();

        for alias in integrator.aliases() {
            self.integrators
                .insert(alias.to_string(), integrator.clone_box());
        }

        self.integrators.insert(name.to_string(), integrator);
    }

    /// Look up an integrator by canonical name or alias.
    pub fn create(&self, name: &str) -> Result<Box<dyn Integrator>, String> {
        self.integrators
            .get(name)
            .map(|integrator| integrator.clone_box())
            .ok_or_else(|| {
                let alias_names: Vec<String> =
                    self.list_aliases().into_iter().map(|(a, _)| a).collect();
                format!(
                    "Unknown integrator: '{}'. Available integrators: {}. Aliases: {}",
                    name,
                    self.list_available().join(", "),
                    alias_names.join(", ")
                )
            })
    }

    /// Bind the update rule for `algorithm`, failing for reserved variants.
    pub fn create_for(&self, algorithm: Algorithm) -> Result<Box<dyn Integrator>, SimulationError> {
        self.integrators
            .get(algorithm.name())
            .map(|integrator| integrator.clone_box())
            .ok_or(SimulationError::UnsupportedAlgorithm(algorithm))
    }

    /// Translate a canonical name or alias into the algorithm it runs.
    pub fn resolve(&self, name: &str) -> Option<Algorithm> {
        let canonical = self.integrators.get(name)?.name();
        Algorithm::ALL.into_iter().find(|a| a.name() == canonical)
    }

    pub fn list_available(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .integrators
            .values()
            .map(|integrator| integrator.name().to_string())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// `(alias, canonical)` pairs sorted by alias.
    pub fn list_aliases(&self) -> Vec<(String, String)> {
        let mut aliases: Vec<(String, String)> = self
            .integrators
            .iter()
            .filter(|(key, integrator)| key.as_str() != integrator.name())
            .map(|(key, integrator)| (key.clone(), integrator.name().to_string()))
            .collect();

        aliases.sort();
        aliases
    }
}

impl Default for IntegratorRegistry {
    fn default() -> Self {
        Self::new().with_standard_integrators()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::integrators::AccelerationField;
    use crate::physics::math::{Scalar, Vector};

    #[derive(Debug, Clone)]
    struct TestIntegratorA;

    impl Integrator for TestIntegratorA {
        fn clone_box(&self) -> Box<dyn Integrator> {
            Box::new(self.clone())
        }

        fn step(&self, _: &mut Vector, _: &mut Vector, _: &dyn AccelerationField, _: Scalar) {}

        fn convergence_order(&self) -> usize {
            2
        }

        fn name(&self) -> &'static str {
            "test_a"
        }

        fn aliases(&self) -> Vec<&'static str> {
            vec!["ta", "test_alias_a"]
        }
    }

    #[test]
    fn test_standard_names() {
        let registry = IntegratorRegistry::default();
        assert_eq!(
            registry.list_available(),
            vec!["explicit_euler", "symplectic_euler", "velocity_verlet"]
        );
    }

    #[test]
    fn test_standard_aliases() {
        let aliases: HashMap<_, _> = IntegratorRegistry::default()
            .list_aliases()
            .into_iter()
            .collect();

        assert_eq!(aliases.get("euler"), Some(&"explicit_euler".to_string()));
        assert_eq!(
            aliases.get("implicit_euler"),
            Some(&"symplectic_euler".to_string())
        );
        assert_eq!(
            aliases.get("semi_implicit_euler"),
            Some(&"symplectic_euler".to_string())
        );
        assert_eq!(aliases.get("verlet"), Some(&"velocity_verlet".to_string()));
    }

    #[test]
    fn test_create_for_reserved_algorithm_fails() {
        let registry = IntegratorRegistry::default();

        for algorithm in [Algorithm::RungeKutta, Algorithm::Beeman, Algorithm::Gear] {
            assert!(matches!(
                registry.create_for(algorithm),
                Err(SimulationError::UnsupportedAlgorithm(a)) if a == algorithm
            ));
        }
        assert!(registry.create_for(Algorithm::VelocityVerlet).is_ok());
    }

    #[test]
    fn test_resolve() {
        let registry = IntegratorRegistry::default();
        assert_eq!(registry.resolve("verlet"), Some(Algorithm::VelocityVerlet));
        assert_eq!(registry.resolve("explicit_euler"), Some(Algorithm::ExplicitEuler));
        assert_eq!(registry.resolve("leapfrog"), None);
    }

    #[test]
    fn test_unknown_integrator_error() {
        let registry = IntegratorRegistry::default();

        let error = registry.create("nonexistent").err().unwrap();
        assert!(error.contains("Unknown integrator"));
        assert!(error.contains("velocity_verlet"));
        assert!(error.contains("verlet"));
    }

    #[test]
    fn test_custom_integrator_has_no_algorithm() {
        let registry = IntegratorRegistry::new().with_integrator(Box::new(TestIntegratorA));

        assert!(registry.create("ta").is_ok());
        assert_eq!(registry.create("test_alias_a").unwrap().convergence_order(), 2);
        assert_eq!(registry.resolve("test_a"), None);
    }

    #[test]
    fn test_case_sensitivity() {
        let registry = IntegratorRegistry::default();
        assert!(registry.create("Verlet").is_err());
        assert!(registry.create("verlet").is_ok());
    }

    #[test]
    fn test_empty_registry() {
        let registry = IntegratorRegistry::new();

        assert!(registry.list_available().is_empty());
        assert!(registry.list_aliases().is_empty());
        assert!(registry.create_for(Algorithm::ExplicitEuler).is_err());
    }
}
