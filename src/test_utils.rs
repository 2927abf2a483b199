//! Test utilities for plugin testing

use bevy::diagnostic::DiagnosticsPlugin;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use core::time::Duration;

use crate::prelude::*;

/// Minimal headless app whose clock advances by exactly `frame` per update.
///
/// The first update only starts the clock, so `Time<Real>::elapsed` reads
/// zero after it and `n * frame` after `n + 1` updates.
pub fn create_test_app(frame: Duration) -> App {
    let mut app = App::new();

    app.add_plugins((MinimalPlugins, StatesPlugin, DiagnosticsPlugin));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(frame));

    app
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let mut app = create_test_app(Duration::from_millis(10));

        app.update();
        assert_eq!(app.world().resource::<Time<Real>>().elapsed(), Duration::ZERO);

        app.update();
        app.update();
        assert_eq!(
            app.world().resource::<Time<Real>>().elapsed(),
            Duration::from_millis(20)
        );
    }
}
