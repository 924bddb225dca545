//! Whole-plugin tests driven through the headless rig.

use bevy::prelude::*;

use crate::config::CameraConfig;
use crate::follow::{FollowOffset, VehicleRoster};
use crate::gamepad::{PadOverride, PadState, PadWarned};
use crate::host::{CameraCommand, OrbitControlEnabled, SimulationPaused};
use crate::input::MotionInput;
use crate::mode::{CameraMode, FreeCamera};
use crate::test_harness::TestRig;
use crate::walkthrough::Walkthrough;

#[test]
fn test_toggle_enters_first_person_and_forces_fov() {
    let mut rig = TestRig::new();
    rig.set_config(|config| {
        config.animate_transitions = false;
        config.field_of_view = 42.0;
    });
    rig.tick(0.016);

    rig.press_key(KeyCode::Tab);
    rig.tick(0.016);

    assert_eq!(*rig.res::<CameraMode>(), CameraMode::FirstPerson);
    assert!(!rig.res::<OrbitControlEnabled>().0);
    assert!((rig.camera_fov_degrees() - 42.0).abs() < 0.01);
    // The first entry adopts the strategic pose in place.
    let camera = rig.camera_transform();
    assert!((camera.translation - Vec3::new(0.0, 100.0, 0.0)).length() < 1e-3);
}

#[test]
fn test_escape_stops_following_and_restores_orbit() {
    let mut rig = TestRig::new();
    let vehicle = rig.spawn_vehicle(Transform::from_xyz(50.0, 0.0, 50.0));
    let fov_before = rig.camera_fov_degrees();

    rig.send(CameraCommand::FollowVehicle(vehicle));
    rig.tick(0.016);
    assert_eq!(
        *rig.res::<CameraMode>(),
        CameraMode::FollowingVehicle(vehicle)
    );
    assert!(!rig.res::<OrbitControlEnabled>().0);
    let camera = rig.camera_transform();
    assert!((camera.translation.y - 2.5).abs() < 1e-3);

    rig.press_key(KeyCode::Escape);
    rig.tick(0.016);
    assert_eq!(*rig.res::<CameraMode>(), CameraMode::Strategic);
    assert!(rig.res::<OrbitControlEnabled>().0);
    // Follow modes never touch the projection.
    assert!((rig.camera_fov_degrees() - fov_before).abs() < 0.01);
}

#[test]
fn test_despawned_target_returns_to_strategic() {
    let mut rig = TestRig::new();
    let vehicle = rig.spawn_vehicle(Transform::from_xyz(10.0, 0.0, 0.0));
    rig.send(CameraCommand::FollowVehicle(vehicle));
    rig.tick(0.016);

    rig.app.world_mut().despawn(vehicle);
    rig.tick(0.016);

    assert_eq!(*rig.res::<CameraMode>(), CameraMode::Strategic);
    assert!(rig.res::<OrbitControlEnabled>().0);
    assert_eq!(rig.res::<FollowOffset>().0, Vec3::ZERO);
}

#[test]
fn test_walkthrough_picks_target_and_resets_timer() {
    let mut rig = TestRig::new();
    rig.set_config(|config| config.walkthrough_timer = 5.0);
    for i in 0..4 {
        rig.spawn_vehicle(Transform::from_xyz(i as f32 * 10.0, 0.0, 0.0));
        rig.spawn_pedestrian(Transform::from_xyz(0.0, 0.0, i as f32 * 10.0));
    }

    rig.send(CameraCommand::StartWalkthrough);
    rig.tick(0.1);
    assert_eq!(*rig.res::<CameraMode>(), CameraMode::WalkthroughAuto);
    let first = rig.res::<Walkthrough>().target;
    assert!(first.is_some(), "a target is chosen on the first tick");
    assert!((rig.res::<Walkthrough>().countdown - 5.0).abs() < 1e-3);

    // Inside the window the target holds and the countdown runs down.
    for _ in 0..4 {
        rig.tick(1.0);
    }
    assert_eq!(rig.res::<Walkthrough>().target, first);
    let low = rig.res::<Walkthrough>().countdown;
    assert!(low < 1.5);

    // Crossing zero forces a fresh pick and a fresh countdown.
    rig.tick(1.0);
    rig.tick(1.0);
    assert!(rig.res::<Walkthrough>().target.is_some());
    assert!(rig.res::<Walkthrough>().countdown > low);
}

#[test]
fn test_toggle_cancels_walkthrough_before_entering_first_person() {
    let mut rig = TestRig::new();
    rig.set_config(|config| config.animate_transitions = false);
    rig.spawn_pedestrian(Transform::from_xyz(5.0, 0.0, 5.0));
    rig.send(CameraCommand::StartWalkthrough);
    rig.tick(0.016);
    assert_eq!(*rig.res::<CameraMode>(), CameraMode::WalkthroughAuto);

    rig.press_key(KeyCode::Tab);
    rig.tick(0.016);
    assert_eq!(*rig.res::<CameraMode>(), CameraMode::Strategic);
    assert!(rig.res::<Walkthrough>().target.is_none());

    rig.release_key(KeyCode::Tab);
    rig.tick(0.016);
    rig.press_key(KeyCode::Tab);
    rig.tick(0.016);
    assert_eq!(*rig.res::<CameraMode>(), CameraMode::FirstPerson);
}

#[test]
fn test_forward_key_moves_free_camera() {
    let mut rig = TestRig::new();
    rig.set_config(|config| config.animate_transitions = false);
    rig.tick(0.016);
    rig.press_key(KeyCode::Tab);
    rig.tick(0.016);
    assert_eq!(*rig.res::<CameraMode>(), CameraMode::FirstPerson);

    rig.press_key(KeyCode::KeyW);
    rig.tick(1.0);

    let camera = rig.camera_transform();
    // Default speed of 64, one second, facing -Z.
    assert!((camera.translation.z + 64.0).abs() < 1e-2);
    assert!((camera.translation.x).abs() < 1e-3);
}

#[test]
fn test_leave_transition_lands_on_strategic_pose() {
    let mut rig = TestRig::new();
    rig.set_config(|config| {
        config.animate_transitions = true;
        config.animation_speed = 1.0;
        config.field_of_view = 30.0;
    });
    // Let strategic capture run before entering.
    rig.tick(0.016);
    let strategic_fov = rig.camera_fov_degrees();

    rig.press_key(KeyCode::Tab);
    rig.tick(0.016);
    rig.release_key(KeyCode::Tab);
    rig.press_key(KeyCode::KeyW);
    rig.tick(1.0);
    rig.release_key(KeyCode::KeyW);

    rig.press_key(KeyCode::Escape);
    rig.tick(0.016);
    assert_eq!(*rig.res::<CameraMode>(), CameraMode::Strategic);
    assert!(
        !rig.res::<OrbitControlEnabled>().0,
        "the transition still owns the camera"
    );

    for _ in 0..6 {
        rig.tick(0.25);
    }
    let camera = rig.camera_transform();
    assert!((camera.translation - Vec3::new(0.0, 100.0, 0.0)).length() < 1e-3);
    assert!(rig.res::<OrbitControlEnabled>().0);
    assert!((rig.camera_fov_degrees() - strategic_fov).abs() < 0.01);
}

#[test]
fn test_clip_floor_raises_sunken_camera() {
    let mut rig = TestRig::new();
    {
        let mut query = rig
            .app
            .world_mut()
            .query_filtered::<&mut Transform, With<Camera3d>>();
        query.single_mut(rig.app.world_mut()).translation.y = -10.0;
    }
    rig.tick(0.016);
    let camera = rig.camera_transform();
    assert!((camera.translation.y - 1.5).abs() < 1e-5);
}

#[test]
fn test_pad_walk_stays_level_while_pitched() {
    let mut rig = TestRig::new();
    rig.set_config(|config| {
        config.use_controller = true;
        config.animate_transitions = false;
    });
    rig.tick(0.016);
    rig.press_key(KeyCode::Tab);
    rig.tick(0.016);
    assert_eq!(*rig.res::<CameraMode>(), CameraMode::FirstPerson);

    rig.res_mut::<FreeCamera>().pitch = -45.0;
    rig.res_mut::<PadOverride>().0 = Some(Some(PadState {
        left_y: 1.0,
        ..Default::default()
    }));
    // A single held push is a walk, not a sprint.
    for _ in 0..6 {
        rig.tick(0.1);
    }

    let camera = rig.camera_transform();
    assert!(
        (camera.translation.y - 100.0).abs() < 1e-3,
        "walking with the view pitched down must not change height"
    );
    assert!(camera.translation.z < -1.0, "the walk still travels forward");
}

#[test]
fn test_pad_sprint_flies_along_view_pitch() {
    let mut rig = TestRig::new();
    rig.set_config(|config| {
        config.use_controller = true;
        config.animate_transitions = false;
    });
    rig.tick(0.016);
    rig.press_key(KeyCode::Tab);
    rig.tick(0.016);

    rig.res_mut::<FreeCamera>().pitch = -45.0;
    let forward = PadState {
        left_y: 1.0,
        ..Default::default()
    };
    // Double push inside the tap window sustains the sprint.
    rig.res_mut::<PadOverride>().0 = Some(Some(forward));
    rig.tick(0.05);
    rig.res_mut::<PadOverride>().0 = Some(Some(PadState::default()));
    rig.tick(0.05);
    rig.res_mut::<PadOverride>().0 = Some(Some(forward));
    rig.tick(0.05);

    let camera = rig.camera_transform();
    assert!(
        camera.translation.y < 99.0,
        "sprinting follows the pitched view downward"
    );
}

#[test]
fn test_keyboard_elevate_follows_camera_up() {
    let mut rig = TestRig::new();
    rig.set_config(|config| config.animate_transitions = false);
    rig.tick(0.016);
    rig.press_key(KeyCode::Tab);
    rig.tick(0.016);

    rig.res_mut::<FreeCamera>().pitch = -45.0;
    rig.press_key(KeyCode::KeyE);
    rig.tick(1.0);

    // The camera's up axis is tilted toward -Z by the pitch, so elevating
    // moves both up and forward: 64 / sqrt(2) along each.
    let camera = rig.camera_transform();
    assert!((camera.translation.y - (100.0 + 45.25)).abs() < 0.1);
    assert!((camera.translation.z + 45.25).abs() < 0.1);
}

#[test]
fn test_rebound_cancel_key_stops_follow() {
    let mut rig = TestRig::new();
    rig.set_config(|config| config.cancel_hotkey = KeyCode::Backspace);
    let vehicle = rig.spawn_vehicle(Transform::from_xyz(5.0, 0.0, 0.0));
    rig.send(CameraCommand::FollowVehicle(vehicle));
    rig.tick(0.016);

    rig.press_key(KeyCode::Escape);
    rig.tick(0.016);
    assert_eq!(
        *rig.res::<CameraMode>(),
        CameraMode::FollowingVehicle(vehicle),
        "the old binding no longer cancels"
    );
    rig.release_key(KeyCode::Escape);

    rig.press_key(KeyCode::Backspace);
    rig.tick(0.016);
    assert_eq!(*rig.res::<CameraMode>(), CameraMode::Strategic);
}

#[test]
fn test_pad_pause_gesture_toggles_simulation() {
    let mut rig = TestRig::new();
    rig.set_config(|config| config.use_controller = true);

    let pressed = PadState {
        pause: true,
        ..Default::default()
    };
    rig.res_mut::<PadOverride>().0 = Some(Some(pressed));
    rig.tick(0.016);
    assert!(rig.res::<SimulationPaused>().0, "press latches pause on");

    rig.res_mut::<PadOverride>().0 = Some(Some(PadState::default()));
    rig.tick(0.016);
    assert!(rig.res::<SimulationPaused>().0, "release keeps it latched");

    rig.res_mut::<PadOverride>().0 = Some(Some(pressed));
    rig.tick(0.016);
    assert!(!rig.res::<SimulationPaused>().0, "second press unpauses");
}

#[test]
fn test_unavailable_pad_degrades_to_zero_input() {
    let mut rig = TestRig::new();
    rig.set_config(|config| config.use_controller = true);
    rig.res_mut::<PadOverride>().0 = Some(None);
    rig.tick(0.016);

    assert!(rig.res::<PadWarned>().0);
    assert_eq!(rig.res::<MotionInput>().axes, Vec3::ZERO);
    assert!(!rig.res::<MotionInput>().sprint);
}

#[test]
fn test_movement_keys_nudge_follow_camera() {
    let mut rig = TestRig::new();
    let walker = rig.spawn_pedestrian(Transform::from_xyz(0.0, 0.0, 0.0));
    rig.send(CameraCommand::FollowPedestrian(walker));
    rig.tick(0.016);
    let before = rig.camera_transform();
    assert!((before.translation.y - 1.7).abs() < 1e-3);

    rig.press_key(KeyCode::KeyW);
    rig.tick(1.0);

    // The nudge runs at a quarter of normal speed: 64 * 0.25.
    let after = rig.camera_transform();
    assert!((after.translation.z - (before.translation.z - 16.0)).abs() < 0.1);
}

#[test]
fn test_reset_command_restores_defaults() {
    let mut rig = TestRig::new();
    rig.set_config(|config| {
        config.move_speed = 999.0;
        config.invert_y = true;
    });
    rig.tick(0.016);

    rig.send(CameraCommand::ResetConfig);
    rig.tick(0.016);
    assert_eq!(*rig.res::<CameraConfig>(), CameraConfig::default());
}

#[test]
fn test_rosters_survive_unrelated_ticks() {
    let mut rig = TestRig::new();
    rig.spawn_vehicle(Transform::default());
    rig.spawn_vehicle(Transform::default());
    for _ in 0..5 {
        rig.tick(0.016);
    }
    assert_eq!(rig.res::<VehicleRoster>().0.len(), 2);
}
