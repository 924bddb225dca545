//! Input fusion: keyboard/mouse and controller collapse into one
//! device-independent `MotionInput` per tick. Everything downstream (free
//! movement, follow offset) reads only the fused form.

use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::config::CameraConfig;
use crate::gamepad::{ActiveDevice, PadSample};
use crate::gestures::{DoubleTapDetector, ToggleLatch};
use crate::host::SimulationPaused;
use crate::mode::CameraMode;

/// Right-stick degrees per second at full deflection, before sensitivity.
pub const RIGHT_STICK_AMPLIFICATION: f32 = 30.0;

/// Device-independent movement intent for one tick.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct MotionInput {
    /// Normalized movement axes: x strafe right, y elevate up, z forward.
    pub axes: Vec3,
    /// Yaw change this tick, degrees, sensitivity already applied.
    pub yaw_delta: f32,
    /// Pitch change this tick, degrees, sensitivity and inversion applied.
    pub pitch_delta: f32,
    /// Sprint multiplier applies this tick.
    pub sprint: bool,
    /// Project the forward vector onto the ground plane before moving.
    pub level_forward: bool,
    /// Elevate along the camera's own up axis instead of world up.
    pub local_elevate: bool,
    /// The cursor should stay visible in first-person mode this tick.
    pub cursor_visible: bool,
}

/// Controller gesture state carried across ticks, with its own clock for the
/// double-tap window.
#[derive(Resource, Default)]
pub struct PadGestures {
    pub show_cursor: ToggleLatch,
    pub pause: ToggleLatch,
    pub sprint: DoubleTapDetector,
    pub elapsed: f32,
}

/// Collapse opposing key pairs into signed axes. When both keys of a pair
/// are held, forward beats backward, left beats right, and down beats up.
pub fn digital_axes(
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
    up: bool,
    down: bool,
) -> Vec3 {
    let x = if left {
        -1.0
    } else if right {
        1.0
    } else {
        0.0
    };
    let y = if down {
        -1.0
    } else if up {
        1.0
    } else {
        0.0
    };
    let z = if forward {
        1.0
    } else if backward {
        -1.0
    } else {
        0.0
    };
    Vec3::new(x, y, z)
}

/// Rotation deltas from the right stick. Yaw is negated so pushing right
/// turns the view right; pitch inverts with the config flag.
pub fn stick_rotation(
    right_x: f32,
    right_y: f32,
    sensitivity: f32,
    invert_y: bool,
    dt: f32,
) -> (f32, f32) {
    let yaw = -right_x * RIGHT_STICK_AMPLIFICATION * sensitivity * dt;
    let mut pitch = right_y * RIGHT_STICK_AMPLIFICATION * sensitivity * dt;
    if invert_y {
        pitch = -pitch;
    }
    (yaw, pitch)
}

/// System: fuse the active device into `MotionInput`.
pub fn fuse_input(
    time: Res<Time>,
    config: Res<CameraConfig>,
    mode: Res<CameraMode>,
    sample: Res<PadSample>,
    keys: Res<ButtonInput<KeyCode>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut gestures: ResMut<PadGestures>,
    mut paused: ResMut<SimulationPaused>,
    mut motion: ResMut<MotionInput>,
) {
    let dt = time.delta_secs();
    match sample.device {
        ActiveDevice::KeyboardMouse => {
            let mut mouse_delta = Vec2::ZERO;
            for event in mouse_motion.read() {
                mouse_delta += event.delta;
            }

            motion.axes = digital_axes(
                keys.pressed(config.move_forward),
                keys.pressed(config.move_backward),
                keys.pressed(config.move_left),
                keys.pressed(config.move_right),
                keys.pressed(config.zoom_closer),
                keys.pressed(config.zoom_away),
            );
            motion.sprint = keys.pressed(config.sprint_hotkey);
            motion.level_forward = false;
            motion.local_elevate = true;
            motion.cursor_visible = keys.pressed(config.show_mouse_hotkey);

            if motion.cursor_visible {
                // Rotation suspends while the cursor is freed for the UI.
                motion.yaw_delta = 0.0;
                motion.pitch_delta = 0.0;
            } else {
                let sens = config.rotation_sensitivity;
                motion.yaw_delta = -mouse_delta.x * sens;
                motion.pitch_delta =
                    -mouse_delta.y * sens * if config.invert_y { -1.0 } else { 1.0 };
            }
        }
        ActiveDevice::Gamepad | ActiveDevice::None => {
            mouse_motion.clear();
            let state = sample.state;

            let elapsed = gestures.elapsed;
            gestures.sprint.update(
                state.left_y,
                elapsed,
                config.double_tap_interval_ms / 1000.0,
            );
            gestures.elapsed += dt;
            gestures.show_cursor.update(state.show_cursor);
            gestures.pause.update(state.pause);
            paused.0 = gestures.pause.output();

            let elevate = if state.elevate_up {
                1.0
            } else if state.elevate_down {
                -1.0
            } else {
                0.0
            };
            motion.axes = Vec3::new(state.left_x, elevate, state.left_y);
            motion.sprint = gestures.sprint.sprinting();
            // Walking stays level regardless of pitch; the sprint gesture
            // unlocks free flight along the view direction.
            motion.level_forward = !motion.sprint;
            motion.local_elevate = false;
            motion.cursor_visible = gestures.show_cursor.output();

            let (yaw, pitch) = stick_rotation(
                state.right_x,
                state.right_y,
                config.rotation_sensitivity,
                config.invert_y,
                dt,
            );
            motion.yaw_delta = yaw;
            motion.pitch_delta = pitch;
        }
    }

    if !matches!(*mode, CameraMode::FirstPerson) {
        motion.yaw_delta = 0.0;
        motion.pitch_delta = 0.0;
    }
}

/// System: mirror the fused cursor intent onto the window. The cursor is
/// captured only in first-person mode and only while no show-cursor request
/// is active.
pub fn update_cursor_visibility(
    mode: Res<CameraMode>,
    motion: Res<MotionInput>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    let Ok(mut window) = windows.get_single_mut() else {
        return;
    };
    let visible = !matches!(*mode, CameraMode::FirstPerson) || motion.cursor_visible;
    if window.cursor_options.visible != visible {
        window.cursor_options.visible = visible;
    }
}
