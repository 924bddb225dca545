//! Camera mode controller: the strategic/first-person/follow state machine,
//! the free-flight rig, and the animated transition between poses.

use bevy::prelude::*;

use crate::config::CameraConfig;
use crate::follow::{FollowOffset, FollowPose};
use crate::ground::{ground_speed_factor, resolved_ground, GroundSource, SNAP_BLEND};
use crate::host::{CameraCommand, OrbitControlEnabled, UiHiderMessage};
use crate::input::MotionInput;
use crate::walkthrough::Walkthrough;

/// Pitch stays strictly inside straight up and straight down.
pub const PITCH_LIMIT: f32 = 89.0;

/// Transitions over a gap this short snap instead of animating.
const SHORT_HOP: f32 = 1.0;

/// The active camera mode. Exactly one applies at a time.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    /// The host's own orbit camera is in control.
    #[default]
    Strategic,
    FirstPerson,
    FollowingVehicle(Entity),
    FollowingPedestrian(Entity),
    WalkthroughAuto,
}

impl CameraMode {
    pub fn is_following(&self) -> bool {
        matches!(
            self,
            Self::FollowingVehicle(_) | Self::FollowingPedestrian(_) | Self::WalkthroughAuto
        )
    }
}

/// The free-flight rig. Owns its own yaw/pitch pair so roll can never creep
/// in through quaternion drift.
#[derive(Resource, Debug, Default)]
pub struct FreeCamera {
    pub position: Vec3,
    /// Degrees, positive turning left.
    pub yaw: f32,
    /// Degrees, positive looking up, clamped to `PITCH_LIMIT`.
    pub pitch: f32,
    /// Set on the first entry into first-person mode, which adopts the
    /// camera pose in place instead of animating.
    pub initialized: bool,
}

impl FreeCamera {
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            self.yaw.to_radians(),
            self.pitch.to_radians(),
            0.0,
        )
    }

    /// Adopt an existing camera pose as the rig state, flattening roll.
    pub fn adopt(&mut self, transform: &Transform) {
        let (yaw, pitch, _roll) = transform.rotation.to_euler(EulerRot::YXZ);
        self.position = transform.translation;
        self.yaw = yaw.to_degrees();
        self.pitch = pitch.to_degrees().clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }
}

/// The strategic pose captured every tick while the host camera is in
/// control, used as the return point for the leave animation.
#[derive(Resource, Debug)]
pub struct StrategicPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for StrategicPose {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 100.0, 0.0),
            rotation: Quat::IDENTITY,
        }
    }
}

/// An in-flight pose animation. Progress runs from 0 to 1 at
/// `animation_speed` per second.
#[derive(Debug, Clone, Copy)]
pub struct Transition {
    pub start_position: Vec3,
    pub start_rotation: Quat,
    pub target_position: Vec3,
    pub target_rotation: Quat,
    pub progress: f32,
}

impl Transition {
    /// Pose at the current progress. The endpoints are exact, not
    /// interpolated, so the landing pose carries no float error.
    pub fn sample(&self) -> (Vec3, Quat) {
        let t = self.progress.clamp(0.0, 1.0);
        if t <= 0.0 {
            return (self.start_position, self.start_rotation);
        }
        if t >= 1.0 {
            return (self.target_position, self.target_rotation);
        }
        (
            vec3_slerp(self.start_position, self.target_position, t),
            self.start_rotation.slerp(self.target_rotation, t),
        )
    }
}

/// Current transition, if one is running. While set, it owns the camera
/// transform and movement input is ignored.
#[derive(Resource, Debug, Default)]
pub struct ModeTransition(pub Option<Transition>);

/// The projection's own field of view, stashed while first-person mode
/// forces the configured one.
#[derive(Resource, Debug, Default)]
pub struct SavedFov(pub Option<f32>);

/// Spherical interpolation between positions, swinging through an arc
/// around the origin rather than cutting a straight chord. Falls back to a
/// lerp for near-zero or near-parallel vectors, where the arc is undefined.
pub fn vec3_slerp(from: Vec3, to: Vec3, t: f32) -> Vec3 {
    let from_len = from.length();
    let to_len = to.length();
    if from_len < 1e-5 || to_len < 1e-5 {
        return from.lerp(to, t);
    }
    let dot = (from.dot(to) / (from_len * to_len)).clamp(-1.0, 1.0);
    let angle = dot.acos();
    if angle.abs() < 1e-4 || (std::f32::consts::PI - angle).abs() < 1e-4 {
        return from.lerp(to, t);
    }
    let sin_total = angle.sin();
    let a = ((1.0 - t) * angle).sin() / sin_total;
    let b = (t * angle).sin() / sin_total;
    from * a + to * b
}

/// System: translate the two global hotkeys into commands.
pub fn keyboard_mode_hotkeys(
    config: Res<CameraConfig>,
    keys: Res<ButtonInput<KeyCode>>,
    mut commands: EventWriter<CameraCommand>,
) {
    if keys.just_pressed(config.cancel_hotkey) {
        commands.send(CameraCommand::Cancel);
    }
    if keys.just_pressed(config.toggle_hotkey) {
        commands.send(CameraCommand::ToggleFirstPerson);
    }
}

/// System: apply queued commands to the mode state machine.
///
/// Cancel and toggle both unwind the modes in priority order: walkthrough
/// first, then a direct follow, then first-person. The difference is only
/// that toggle enters first-person from strategic mode while cancel does
/// nothing there.
#[allow(clippy::too_many_arguments)]
pub fn apply_camera_commands(
    mut events: EventReader<CameraCommand>,
    mut config: ResMut<CameraConfig>,
    mut mode: ResMut<CameraMode>,
    mut free: ResMut<FreeCamera>,
    strategic: Res<StrategicPose>,
    mut transition: ResMut<ModeTransition>,
    mut walkthrough: ResMut<Walkthrough>,
    mut offset: ResMut<FollowOffset>,
    mut orbit: ResMut<OrbitControlEnabled>,
    mut hider: EventWriter<UiHiderMessage>,
    cameras: Query<&Transform, With<Camera3d>>,
) {
    for command in events.read() {
        match *command {
            CameraCommand::Cancel | CameraCommand::ToggleFirstPerson => {
                match *mode {
                    CameraMode::WalkthroughAuto => {
                        *mode = CameraMode::Strategic;
                        walkthrough.target = None;
                        offset.0 = Vec3::ZERO;
                        orbit.0 = true;
                        if config.integrate_hide_ui {
                            hider.send(UiHiderMessage::Show);
                        }
                    }
                    CameraMode::FollowingVehicle(_) | CameraMode::FollowingPedestrian(_) => {
                        *mode = CameraMode::Strategic;
                        offset.0 = Vec3::ZERO;
                        orbit.0 = true;
                        if config.integrate_hide_ui {
                            hider.send(UiHiderMessage::Show);
                        }
                    }
                    CameraMode::FirstPerson => {
                        *mode = CameraMode::Strategic;
                        if config.integrate_hide_ui {
                            hider.send(UiHiderMessage::Show);
                        }
                        let current = cameras.get_single().ok();
                        if config.animate_transitions {
                            if let Some(current) = current {
                                let mut leave = Transition {
                                    start_position: current.translation,
                                    start_rotation: current.rotation,
                                    target_position: strategic.position,
                                    target_rotation: strategic.rotation,
                                    progress: 0.0,
                                };
                                if current.translation.distance(strategic.position) <= SHORT_HOP
                                {
                                    // Not worth animating; land immediately
                                    // without whipping the view around.
                                    leave.progress = 1.0;
                                    leave.target_rotation = current.rotation;
                                }
                                transition.0 = Some(leave);
                            } else {
                                orbit.0 = true;
                            }
                        } else {
                            orbit.0 = true;
                        }
                    }
                    CameraMode::Strategic => {
                        if matches!(*command, CameraCommand::ToggleFirstPerson) {
                            *mode = CameraMode::FirstPerson;
                            orbit.0 = false;
                            if config.integrate_hide_ui {
                                hider.send(UiHiderMessage::Hide);
                            }
                            let current = cameras.get_single().ok();
                            if !free.initialized {
                                if let Some(current) = current {
                                    free.adopt(current);
                                }
                                free.initialized = true;
                            } else if config.animate_transitions {
                                if let Some(current) = current {
                                    let mut enter = Transition {
                                        start_position: current.translation,
                                        start_rotation: current.rotation,
                                        target_position: free.position,
                                        target_rotation: free.rotation(),
                                        progress: 0.0,
                                    };
                                    if current.translation.distance(free.position) <= SHORT_HOP {
                                        enter.progress = 1.0;
                                    }
                                    transition.0 = Some(enter);
                                }
                            }
                        }
                    }
                }
            }
            CameraCommand::StartWalkthrough => {
                *mode = CameraMode::WalkthroughAuto;
                walkthrough.countdown = config.walkthrough_timer;
                walkthrough.target = None;
                offset.0 = Vec3::ZERO;
                transition.0 = None;
                orbit.0 = false;
                if config.integrate_hide_ui {
                    hider.send(UiHiderMessage::Hide);
                }
            }
            CameraCommand::FollowVehicle(entity) => {
                *mode = CameraMode::FollowingVehicle(entity);
                offset.0 = Vec3::ZERO;
                transition.0 = None;
                orbit.0 = false;
                if config.integrate_hide_ui {
                    hider.send(UiHiderMessage::Hide);
                }
            }
            CameraCommand::FollowPedestrian(entity) => {
                *mode = CameraMode::FollowingPedestrian(entity);
                offset.0 = Vec3::ZERO;
                transition.0 = None;
                orbit.0 = false;
                if config.integrate_hide_ui {
                    hider.send(UiHiderMessage::Hide);
                }
            }
            CameraCommand::ResetConfig => {
                *config = CameraConfig::default();
            }
        }
    }
}

/// System: free-flight movement and look.
///
/// Skipped while a transition owns the camera. Rotation first, then the
/// ground lookup, then translation, so the speed limiter sees this tick's
/// position.
pub fn apply_first_person_motion(
    time: Res<Time>,
    config: Res<CameraConfig>,
    mode: Res<CameraMode>,
    motion: Res<MotionInput>,
    transition: Res<ModeTransition>,
    source: Res<GroundSource>,
    mut free: ResMut<FreeCamera>,
) {
    if !matches!(*mode, CameraMode::FirstPerson) || transition.0.is_some() {
        return;
    }
    let dt = time.delta_secs();

    free.yaw += motion.yaw_delta;
    free.pitch = (free.pitch + motion.pitch_delta).clamp(-PITCH_LIMIT, PITCH_LIMIT);

    let ground = if config.snap_to_ground || config.limit_speed_ground {
        Some(resolved_ground(source.0.as_ref(), free.position))
    } else {
        None
    };

    let mut speed = config.move_speed;
    if config.limit_speed_ground {
        if let Some(ground) = ground {
            speed *= ground_speed_factor(ground);
        }
    }
    if motion.sprint {
        speed *= config.sprint_multiplier;
    }

    let rotation = free.rotation();
    let mut forward = rotation * Vec3::NEG_Z;
    if motion.level_forward {
        forward.y = 0.0;
        forward = forward.normalize_or_zero();
    }
    let right = rotation * Vec3::X;
    // Keyboard elevation rides the camera's own up axis; the pad's elevate
    // buttons move along world up.
    let up = if motion.local_elevate {
        rotation * Vec3::Y
    } else {
        Vec3::Y
    };

    free.position += (forward * motion.axes.z + right * motion.axes.x + up * motion.axes.y)
        * speed
        * dt;

    if config.snap_to_ground {
        if let Some(ground) = ground {
            let target_y = ground + config.ground_offset;
            free.position.y += (target_y - free.position.y) * SNAP_BLEND;
        }
    }
}

/// System: the single writer of the camera transform and projection.
///
/// An in-flight transition takes precedence; otherwise the pose comes from
/// whichever mode is active. Strategic mode reverses the flow and captures
/// the host-driven pose instead.
#[allow(clippy::too_many_arguments)]
pub fn apply_camera_pose(
    time: Res<Time>,
    config: Res<CameraConfig>,
    mode: Res<CameraMode>,
    free: Res<FreeCamera>,
    follow_pose: Res<FollowPose>,
    mut strategic: ResMut<StrategicPose>,
    mut transition: ResMut<ModeTransition>,
    mut saved_fov: ResMut<SavedFov>,
    mut orbit: ResMut<OrbitControlEnabled>,
    mut cameras: Query<(&mut Transform, &mut Projection), With<Camera3d>>,
) {
    let Ok((mut transform, mut projection)) = cameras.get_single_mut() else {
        return;
    };

    if let Some(running) = transition.0.as_mut() {
        running.progress += time.delta_secs() * config.animation_speed;
        let (position, rotation) = running.sample();
        transform.translation = position;
        transform.rotation = rotation;
        if running.progress >= 1.0 {
            transition.0 = None;
            if matches!(*mode, CameraMode::Strategic) {
                orbit.0 = true;
            }
        }
    } else {
        match *mode {
            CameraMode::Strategic => {
                strategic.position = transform.translation;
                strategic.rotation = transform.rotation;
            }
            CameraMode::FirstPerson => {
                transform.translation = free.position;
                transform.rotation = free.rotation();
            }
            CameraMode::FollowingVehicle(_)
            | CameraMode::FollowingPedestrian(_)
            | CameraMode::WalkthroughAuto => {
                if let Some((position, rotation)) = follow_pose.0 {
                    transform.translation = position;
                    transform.rotation = rotation;
                }
            }
        }
    }

    if let Projection::Perspective(perspective) = projection.as_mut() {
        if matches!(*mode, CameraMode::FirstPerson) {
            if saved_fov.0.is_none() {
                saved_fov.0 = Some(perspective.fov);
            }
            perspective.fov = config.field_of_view.to_radians();
        } else if let Some(original) = saved_fov.0.take() {
            perspective.fov = original;
        }
    }
}
