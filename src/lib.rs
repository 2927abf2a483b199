//! orbitstep library
//!
//! A rocket orbiting a fixed planet, advanced side by side under several
//! numerical integrators so their accuracy can be compared. The binary runs
//! it headless on Bevy's app loop; the library is also used directly by the
//! integration tests and benches.

pub mod cli;
pub mod config;
pub mod events;
pub mod physics;
pub mod plugins;
pub mod prelude;
pub mod states;

#[cfg(test)]
pub(crate) mod test_utils;
