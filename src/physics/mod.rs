pub mod field;
pub mod integrators;
pub mod math;
pub mod scheduler;
pub mod simulation;
