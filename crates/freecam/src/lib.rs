//! First-person camera controller for city-scale simulations.
//!
//! The crate turns a host's strategic camera into a walkable one: a toggle
//! drops into free flight at street level, entities can be followed from a
//! chase or eye pose, and a walkthrough mode auto-cycles between random
//! vehicles and pedestrians. Input from keyboard/mouse or a controller is
//! fused into one device-independent form, movement respects terrain, and
//! the configuration persists as JSON.
//!
//! Hosts add [`FreecamPlugin`], spawn a `Camera3d`, keep the rosters filled,
//! and gate their own camera control on [`host::OrbitControlEnabled`].

pub mod config;
pub mod config_io;
pub mod follow;
pub mod gamepad;
pub mod gestures;
pub mod ground;
pub mod host;
pub mod input;
pub mod keys;
pub mod mode;
pub mod walkthrough;

#[cfg(test)]
mod integration_tests;
#[cfg(test)]
mod test_harness;

use bevy::prelude::*;

pub struct FreecamPlugin;

impl Plugin for FreecamPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<config::CameraConfig>()
            .init_resource::<config_io::ConfigPath>()
            .init_resource::<gamepad::PadOverride>()
            .init_resource::<gamepad::PadSample>()
            .init_resource::<gamepad::PadWarned>()
            .init_resource::<input::MotionInput>()
            .init_resource::<input::PadGestures>()
            .init_resource::<mode::CameraMode>()
            .init_resource::<mode::FreeCamera>()
            .init_resource::<mode::StrategicPose>()
            .init_resource::<mode::ModeTransition>()
            .init_resource::<mode::SavedFov>()
            .init_resource::<follow::VehicleRoster>()
            .init_resource::<follow::PedestrianRoster>()
            .init_resource::<follow::FollowOffset>()
            .init_resource::<follow::FollowPose>()
            .init_resource::<follow::CamRng>()
            .init_resource::<walkthrough::Walkthrough>()
            .init_resource::<ground::GroundSource>()
            .init_resource::<host::SimulationPaused>()
            .init_resource::<host::OrbitControlEnabled>()
            .add_event::<host::UiHiderMessage>()
            .add_event::<host::CameraCommand>()
            .add_systems(Startup, config_io::load_config_at_startup)
            .add_systems(
                Update,
                (
                    gamepad::poll_pad,
                    input::fuse_input,
                    mode::keyboard_mode_hotkeys,
                    mode::apply_camera_commands,
                    walkthrough::advance_walkthrough,
                    follow::accumulate_follow_offset,
                    follow::place_follow_camera,
                    mode::apply_first_person_motion,
                    mode::apply_camera_pose,
                    ground::prevent_clip_ground,
                    input::update_cursor_visibility,
                    config_io::persist_config_on_change,
                )
                    .chain(),
            );
    }
}
