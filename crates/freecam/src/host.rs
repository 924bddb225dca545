//! The narrow surface shared with the host simulation.
//!
//! The camera controller owns none of the host's state. Everything that
//! crosses the boundary goes through the resources and events here: a
//! one-way pause flag, a switch for the host's own orbit camera, hide/show
//! messages for an optional UI-hider collaborator, and the command event the
//! host UI uses to drive the mode controller.

use bevy::prelude::*;

/// One-way pause side effect. The controller writes it from the gamepad
/// pause gesture; the host is expected to mirror it into its own clock every
/// frame. The controller never reads it back.
#[derive(Resource, Debug, Default)]
pub struct SimulationPaused(pub bool);

/// While false, the host's strategic/orbit camera must leave the camera
/// transform alone: first-person, follow, or an in-flight transition owns it.
#[derive(Resource, Debug)]
pub struct OrbitControlEnabled(pub bool);

impl Default for OrbitControlEnabled {
    fn default() -> Self {
        Self(true)
    }
}

/// Hide/Show messages for an optional UI-hider collaborator. Emitted only
/// when `CameraConfig::integrate_hide_ui` is set; hosts without such a
/// component simply never read the event.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiHiderMessage {
    Hide,
    Show,
}

/// Requests into the mode controller, from hotkeys or the host UI.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraCommand {
    /// Escape semantics: stop walkthrough, else stop following, else leave
    /// first-person. Does nothing in strategic mode.
    Cancel,
    /// Toggle-hotkey semantics: follow modes are cancelled first; otherwise
    /// the strategic/first-person switch is forced.
    ToggleFirstPerson,
    /// Begin auto-cycling through random vehicles and pedestrians.
    StartWalkthrough,
    FollowVehicle(Entity),
    FollowPedestrian(Entity),
    /// Restore default configuration and persist it.
    ResetConfig,
}
