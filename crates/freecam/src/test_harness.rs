//! Headless test rig: the full plugin in a windowless `App`, with manual
//! control of time and input so tests can script exact frame sequences.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;

use crate::config::CameraConfig;
use crate::config_io::ConfigPath;
use crate::follow::{PedestrianRoster, RosterSlot, VehicleRoster};
use crate::host::CameraCommand;
use crate::FreecamPlugin;

static RIG_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub struct TestRig {
    pub app: App,
}

impl TestRig {
    /// Build a rig with a default config and one camera at (0, 100, 0).
    ///
    /// No window, no input plugins: `Time` and the two `ButtonInput`
    /// resources are inserted by hand and driven from `tick`, so a test
    /// controls exactly what each frame sees.
    pub fn new() -> Self {
        let mut app = App::new();
        app.init_resource::<Time>();
        app.insert_resource(ButtonInput::<KeyCode>::default());
        app.insert_resource(ButtonInput::<MouseButton>::default());
        app.add_event::<MouseMotion>();

        let id = RIG_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = format!("/tmp/freecam_rig_{}_{}", std::process::id(), id);
        app.insert_resource(ConfigPath(format!("{dir}/freecam.json")));

        app.add_plugins(FreecamPlugin);
        app.world_mut()
            .spawn((Camera3d::default(), Transform::from_xyz(0.0, 100.0, 0.0)));

        // First update runs Startup (the config load) with a zero delta.
        app.update();
        Self { app }
    }

    /// Advance one frame by `dt` seconds. Edge state on the input resources
    /// is cleared afterward, the way the input plugin would between frames.
    pub fn tick(&mut self, dt: f32) {
        self.app
            .world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs_f32(dt));
        self.app.update();
        self.app
            .world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .clear();
        self.app
            .world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .clear();
    }

    pub fn press_key(&mut self, key: KeyCode) {
        self.app
            .world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(key);
    }

    pub fn release_key(&mut self, key: KeyCode) {
        self.app
            .world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .release(key);
    }

    pub fn send(&mut self, command: CameraCommand) {
        self.app.world_mut().send_event(command);
    }

    pub fn set_config(&mut self, mutate: impl FnOnce(&mut CameraConfig)) {
        let mut config = self.app.world_mut().resource_mut::<CameraConfig>();
        mutate(&mut config);
    }

    /// Spawn a transform-only entity and register it as a live vehicle.
    pub fn spawn_vehicle(&mut self, transform: Transform) -> Entity {
        let entity = self.app.world_mut().spawn(transform).id();
        self.app
            .world_mut()
            .resource_mut::<VehicleRoster>()
            .0
            .push(RosterSlot::live(entity));
        entity
    }

    /// Spawn a transform-only entity and register it as a live pedestrian.
    pub fn spawn_pedestrian(&mut self, transform: Transform) -> Entity {
        let entity = self.app.world_mut().spawn(transform).id();
        self.app
            .world_mut()
            .resource_mut::<PedestrianRoster>()
            .0
            .push(RosterSlot::live(entity));
        entity
    }

    pub fn camera_transform(&mut self) -> Transform {
        let mut query = self
            .app
            .world_mut()
            .query_filtered::<&Transform, With<Camera3d>>();
        *query.single(self.app.world())
    }

    pub fn camera_fov_degrees(&mut self) -> f32 {
        let mut query = self
            .app
            .world_mut()
            .query_filtered::<&Projection, With<Camera3d>>();
        match query.single(self.app.world()) {
            Projection::Perspective(perspective) => perspective.fov.to_degrees(),
            _ => panic!("test camera must use a perspective projection"),
        }
    }

    pub fn res<T: Resource>(&self) -> &T {
        self.app.world().resource::<T>()
    }

    pub fn res_mut<T: Resource>(&mut self) -> Mut<'_, T> {
        self.app.world_mut().resource_mut::<T>()
    }
}
