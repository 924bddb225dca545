//! User-tunable camera configuration.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::gamepad::{LEFT_STICK_DEADZONE, RIGHT_STICK_DEADZONE};
use crate::keys::keycode_serde;

/// All user-tunable camera parameters.
///
/// Mutated only between ticks (settings surface, config load, reset command)
/// and persisted by `config_io`. The core never rejects out-of-range values;
/// it clamps where a value is used (pitch clamp, ground speed factor), so a
/// hand-edited config file cannot break anything.
#[derive(Resource, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees while in first-person mode.
    pub field_of_view: f32,
    /// Base movement speed in world units per second.
    pub move_speed: f32,
    /// Mouse and right-stick rotation sensitivity multiplier.
    pub rotation_sensitivity: f32,
    /// Height kept above the resolved ground, in world units.
    pub ground_offset: f32,
    /// Speed multiplier while the sprint key or gesture is active.
    pub sprint_multiplier: f32,
    /// Double-tap window for the controller sprint gesture, in milliseconds.
    pub double_tap_interval_ms: f32,
    /// Progress rate of the strategic/first-person transition blend.
    /// 1.0 means the blend takes one second.
    pub animation_speed: f32,
    /// Seconds between automatic walkthrough target switches.
    pub walkthrough_timer: f32,

    #[serde(with = "keycode_serde")]
    pub toggle_hotkey: KeyCode,
    /// Backs out of the active mode: walkthrough, then follow, then
    /// first-person.
    #[serde(with = "keycode_serde")]
    pub cancel_hotkey: KeyCode,
    #[serde(with = "keycode_serde")]
    pub show_mouse_hotkey: KeyCode,
    #[serde(with = "keycode_serde")]
    pub sprint_hotkey: KeyCode,
    #[serde(with = "keycode_serde")]
    pub move_forward: KeyCode,
    #[serde(with = "keycode_serde")]
    pub move_backward: KeyCode,
    #[serde(with = "keycode_serde")]
    pub move_left: KeyCode,
    #[serde(with = "keycode_serde")]
    pub move_right: KeyCode,
    /// Elevate toward the ground plane camera-relative up.
    #[serde(with = "keycode_serde")]
    pub zoom_closer: KeyCode,
    #[serde(with = "keycode_serde")]
    pub zoom_away: KeyCode,

    /// Read the controller instead of keyboard and mouse.
    pub use_controller: bool,
    pub invert_y: bool,
    /// Blend camera height toward the ground each tick in first-person mode.
    pub snap_to_ground: bool,
    /// Scale movement speed by sqrt of ground height, clamped to [1, 256].
    pub limit_speed_ground: bool,
    /// Hard floor at ground + offset every tick, in every mode.
    pub prevent_clip_ground: bool,
    /// Animate strategic/first-person switches instead of snapping.
    pub animate_transitions: bool,
    /// Walkthrough advances on left click instead of the timer.
    pub walkthrough_manual: bool,
    /// Let fused input nudge the camera away from a followed entity.
    pub allow_user_offset: bool,
    /// Send Hide/Show messages to the optional UI-hider collaborator.
    pub integrate_hide_ui: bool,

    /// Left stick deadzone as a fraction of full scale.
    pub left_stick_deadzone: f32,
    /// Right stick deadzone as a fraction of full scale.
    pub right_stick_deadzone: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            field_of_view: 65.0,
            move_speed: 64.0,
            rotation_sensitivity: 1.0,
            ground_offset: 1.5,
            sprint_multiplier: 10.0,
            double_tap_interval_ms: 250.0,
            animation_speed: 1.0,
            walkthrough_timer: 15.0,
            toggle_hotkey: KeyCode::Tab,
            cancel_hotkey: KeyCode::Escape,
            show_mouse_hotkey: KeyCode::Home,
            sprint_hotkey: KeyCode::ShiftLeft,
            move_forward: KeyCode::KeyW,
            move_backward: KeyCode::KeyS,
            move_left: KeyCode::KeyA,
            move_right: KeyCode::KeyD,
            zoom_closer: KeyCode::KeyE,
            zoom_away: KeyCode::KeyQ,
            use_controller: false,
            invert_y: false,
            snap_to_ground: false,
            limit_speed_ground: false,
            prevent_clip_ground: true,
            animate_transitions: true,
            walkthrough_manual: false,
            allow_user_offset: true,
            integrate_hide_ui: false,
            left_stick_deadzone: LEFT_STICK_DEADZONE,
            right_stick_deadzone: RIGHT_STICK_DEADZONE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let config = CameraConfig::default();
        assert!(config.field_of_view > 0.0 && config.field_of_view < 180.0);
        assert!(config.move_speed > 0.0);
        assert!(config.sprint_multiplier > 1.0);
        assert!(config.walkthrough_timer > 0.0);
        assert!(config.left_stick_deadzone > 0.0 && config.left_stick_deadzone < 1.0);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut config = CameraConfig::default();
        config.field_of_view = 90.0;
        config.use_controller = true;
        config.toggle_hotkey = KeyCode::Backquote;

        let json = serde_json::to_string(&config).unwrap();
        let back: CameraConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_hotkeys_serialize_as_labels() {
        let config = CameraConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"toggle_hotkey\":\"Tab\""));
        assert!(json.contains("\"move_forward\":\"W\""));
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: CameraConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CameraConfig::default());
    }

    #[test]
    fn test_unknown_key_label_fails_parse() {
        let result =
            serde_json::from_str::<CameraConfig>("{\"toggle_hotkey\":\"NotAKey\"}");
        assert!(result.is_err());
    }
}
