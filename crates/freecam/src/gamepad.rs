//! Controller snapshots and deadzone compensation.
//!
//! The rest of the crate never touches a gamepad directly: `poll_pad` runs
//! once per tick and publishes a deadzone-compensated `PadSample`, tagged
//! with the device variant that produced it. Headless hosts and tests inject
//! stick state through `PadOverride` instead of connecting a real pad.

use bevy::prelude::*;

use crate::config::CameraConfig;

/// XInput left-thumb deadzone as a fraction of full scale (7849 / 32767).
pub const LEFT_STICK_DEADZONE: f32 = 7849.0 / 32767.0;
/// XInput right-thumb deadzone as a fraction of full scale (8689 / 32767).
pub const RIGHT_STICK_DEADZONE: f32 = 8689.0 / 32767.0;

/// Raw controller snapshot for one tick. Axes are in `[-1, 1]` full-scale
/// units before deadzone compensation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PadState {
    pub left_x: f32,
    pub left_y: f32,
    pub right_x: f32,
    pub right_y: f32,
    /// Button mapped to elevate up (A on an XInput pad).
    pub elevate_up: bool,
    /// Button mapped to elevate down (right thumb click).
    pub elevate_down: bool,
    /// Button feeding the cursor-visibility toggle latch (X).
    pub show_cursor: bool,
    /// Button feeding the simulation-pause toggle latch (Y).
    pub pause: bool,
}

/// Which input source feeds the fusion layer this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveDevice {
    #[default]
    KeyboardMouse,
    Gamepad,
    /// Controller mode is configured but no usable device exists; all axes
    /// read zero and all buttons read unpressed.
    None,
}

/// Test and headless-host injection point. `Some(Some(state))` replaces the
/// real pad with a scripted snapshot; `Some(None)` simulates an unavailable
/// driver.
#[derive(Resource, Default)]
pub struct PadOverride(pub Option<Option<PadState>>);

/// Deadzone-compensated sample produced once per tick by `poll_pad`.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct PadSample {
    pub device: ActiveDevice,
    pub state: PadState,
}

/// Latch so an unavailable controller is logged once, not every tick.
#[derive(Resource, Default)]
pub struct PadWarned(pub bool);

/// Deadzone compensation for one axis.
///
/// Values inside the deadzone are zeroed. Values outside are shifted toward
/// zero by the deadzone magnitude and divided by `full_scale - deadzone`, so
/// the output is continuous at the deadzone edge and reaches exactly one at
/// full deflection.
pub fn normalize_axis(value: f32, deadzone: f32, full_scale: f32) -> f32 {
    let shifted = if value > deadzone {
        value - deadzone
    } else if value < -deadzone {
        value + deadzone
    } else {
        return 0.0;
    };
    (shifted / (full_scale - deadzone)).clamp(-1.0, 1.0)
}

/// Apply the per-stick deadzones to a raw snapshot.
pub fn compensate(raw: PadState, left_deadzone: f32, right_deadzone: f32) -> PadState {
    PadState {
        left_x: normalize_axis(raw.left_x, left_deadzone, 1.0),
        left_y: normalize_axis(raw.left_y, left_deadzone, 1.0),
        right_x: normalize_axis(raw.right_x, right_deadzone, 1.0),
        right_y: normalize_axis(raw.right_y, right_deadzone, 1.0),
        ..raw
    }
}

fn read_pad(pad: &Gamepad) -> PadState {
    PadState {
        left_x: pad.get(GamepadAxis::LeftStickX).unwrap_or(0.0),
        left_y: pad.get(GamepadAxis::LeftStickY).unwrap_or(0.0),
        right_x: pad.get(GamepadAxis::RightStickX).unwrap_or(0.0),
        right_y: pad.get(GamepadAxis::RightStickY).unwrap_or(0.0),
        elevate_up: pad.pressed(GamepadButton::South),
        elevate_down: pad.pressed(GamepadButton::RightThumb),
        show_cursor: pad.pressed(GamepadButton::West),
        pause: pad.pressed(GamepadButton::North),
    }
}

/// System: sample the controller once per tick.
///
/// Resolution order: controller disabled in config means keyboard/mouse; an
/// injected override wins next; otherwise the first connected gamepad. An
/// unavailable device degrades to all-zero input and is logged once until it
/// comes back.
pub fn poll_pad(
    config: Res<CameraConfig>,
    over: Res<PadOverride>,
    pads: Query<&Gamepad>,
    mut warned: ResMut<PadWarned>,
    mut sample: ResMut<PadSample>,
) {
    if !config.use_controller {
        *sample = PadSample {
            device: ActiveDevice::KeyboardMouse,
            state: PadState::default(),
        };
        return;
    }

    let raw = match over.0 {
        Some(injected) => injected,
        None => pads.iter().next().map(read_pad),
    };

    match raw {
        Some(state) => {
            warned.0 = false;
            sample.device = ActiveDevice::Gamepad;
            sample.state = compensate(
                state,
                config.left_stick_deadzone,
                config.right_stick_deadzone,
            );
        }
        None => {
            if !warned.0 {
                warn!("controller input selected but no gamepad is available; treating all axes as zero");
                warned.0 = true;
            }
            *sample = PadSample {
                device: ActiveDevice::None,
                state: PadState::default(),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_axis_zero_inside_deadzone() {
        assert_eq!(normalize_axis(0.0, 0.24, 1.0), 0.0);
        assert_eq!(normalize_axis(0.23, 0.24, 1.0), 0.0);
        assert_eq!(normalize_axis(-0.23, 0.24, 1.0), 0.0);
        assert_eq!(normalize_axis(0.24, 0.24, 1.0), 0.0);
    }

    #[test]
    fn test_normalize_axis_full_scale_reaches_one() {
        assert!((normalize_axis(1.0, 0.24, 1.0) - 1.0).abs() < 1e-6);
        assert!((normalize_axis(-1.0, 0.24, 1.0) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_axis_monotonic_outside_deadzone() {
        let deadzone = LEFT_STICK_DEADZONE;
        let mut prev = 0.0;
        for step in 0..100 {
            let value = deadzone + (1.0 - deadzone) * (step as f32 + 1.0) / 100.0;
            let out = normalize_axis(value, deadzone, 1.0);
            assert!(out > prev, "output must strictly increase past the deadzone");
            prev = out;
        }
    }

    #[test]
    fn test_normalize_axis_continuous_at_deadzone_edge() {
        let just_outside = normalize_axis(0.2401, 0.24, 1.0);
        assert!(just_outside > 0.0 && just_outside < 0.001);
    }

    #[test]
    fn test_compensate_uses_per_stick_deadzones() {
        let raw = PadState {
            left_x: 0.3,
            left_y: -0.3,
            right_x: 0.3,
            right_y: 0.3,
            ..Default::default()
        };
        let out = compensate(raw, 0.25, 0.35);
        assert!(out.left_x > 0.0);
        assert!(out.left_y < 0.0);
        assert_eq!(out.right_x, 0.0, "right stick has the wider deadzone");
        assert_eq!(out.right_y, 0.0);
    }

    #[test]
    fn test_compensate_preserves_buttons() {
        let raw = PadState {
            elevate_up: true,
            pause: true,
            ..Default::default()
        };
        let out = compensate(raw, 0.25, 0.25);
        assert!(out.elevate_up);
        assert!(out.pause);
        assert!(!out.elevate_down);
        assert!(!out.show_cursor);
    }
}
