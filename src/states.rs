use bevy::prelude::*;

/// Mirrors the scheduler's pause flag for systems that only care whether
/// the lanes are moving.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppState {
    #[default]
    Running,
    Paused,
}

impl AppState {
    pub fn from_paused(paused: bool) -> Self {
        if paused {
            AppState::Paused
        } else {
            AppState::Running
        }
    }
}
