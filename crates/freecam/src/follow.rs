//! Entity following: rosters, random target selection, camera placement.

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::CameraConfig;
use crate::host::{OrbitControlEnabled, UiHiderMessage};
use crate::input::MotionInput;
use crate::mode::CameraMode;
use crate::walkthrough::Walkthrough;

/// Which kind of entity a follow target is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowKind {
    Vehicle,
    Pedestrian,
}

/// One slot in a host roster. Slots mirror the host's entity tables: a slot
/// can exist but be dead, and vehicle slots can be towed trailers, which are
/// never followed.
#[derive(Debug, Clone, Copy)]
pub struct RosterSlot {
    pub entity: Entity,
    pub live: bool,
    pub towed: bool,
}

impl RosterSlot {
    pub fn live(entity: Entity) -> Self {
        Self {
            entity,
            live: true,
            towed: false,
        }
    }

    fn eligible(&self) -> bool {
        self.live && !self.towed
    }
}

/// Live vehicle table, maintained by the host.
#[derive(Resource, Default)]
pub struct VehicleRoster(pub Vec<RosterSlot>);

/// Live pedestrian table, maintained by the host.
#[derive(Resource, Default)]
pub struct PedestrianRoster(pub Vec<RosterSlot>);

/// Deterministic RNG for target selection, so walkthrough runs are
/// reproducible under a fixed seed.
#[derive(Resource)]
pub struct CamRng(pub ChaCha8Rng);

impl Default for CamRng {
    fn default() -> Self {
        Self::from_seed_u64(42)
    }
}

impl CamRng {
    pub fn from_seed_u64(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

/// Pick a uniformly random eligible entity from a roster.
///
/// Draws a skip count in `[0, live - 1)` and scans the table in index order,
/// consuming the skip on eligible slots. If the scan falls off the end (the
/// live set can shrink between the draw and the scan, and towed trailers
/// count as live but not eligible), a second pass returns the first eligible
/// slot. `None` only when nothing is eligible at all.
pub fn pick_random(slots: &[RosterSlot], rng: &mut impl Rng) -> Option<Entity> {
    let live = slots.iter().filter(|slot| slot.live).count();
    if live == 0 {
        return None;
    }
    let skip = if live > 1 { rng.gen_range(0..live - 1) } else { 0 };
    pick_with_skip(slots, skip)
}

pub(crate) fn pick_with_skip(slots: &[RosterSlot], mut skip: usize) -> Option<Entity> {
    for slot in slots {
        if !slot.eligible() {
            continue;
        }
        if skip > 0 {
            skip -= 1;
            continue;
        }
        return Some(slot.entity);
    }
    // Fallback pass: the skip count outran the eligible set.
    slots
        .iter()
        .find(|slot| slot.eligible())
        .map(|slot| slot.entity)
}

/// User nudge accumulated while following, applied on top of the pose
/// derived from the entity.
#[derive(Resource, Debug, Default)]
pub struct FollowOffset(pub Vec3);

/// Camera pose derived from the followed entity this tick, if any.
#[derive(Resource, Debug, Default)]
pub struct FollowPose(pub Option<(Vec3, Quat)>);

/// Chase distance behind a followed vehicle.
const VEHICLE_BACK: f32 = 6.0;
/// Camera height above a followed vehicle's origin.
const VEHICLE_UP: f32 = 2.5;
/// Eye height above a followed pedestrian's origin.
const PEDESTRIAN_EYE: f32 = 1.7;

/// The nudge moves at a quarter of normal movement speed so it stays gentle.
const OFFSET_SPEED_FACTOR: f32 = 0.25;

/// Camera pose for a follow target: chase pose behind vehicles, eye pose on
/// pedestrians, both looking the way the entity faces.
pub fn follow_pose(kind: FollowKind, target: &Transform, user_offset: Vec3) -> (Vec3, Quat) {
    let position = match kind {
        FollowKind::Vehicle => {
            target.translation - target.forward() * VEHICLE_BACK + Vec3::Y * VEHICLE_UP
        }
        FollowKind::Pedestrian => target.translation + Vec3::Y * PEDESTRIAN_EYE,
    };
    (position + user_offset, target.rotation)
}

/// The entity currently followed, whether directly or via walkthrough.
pub fn current_target(mode: CameraMode, walkthrough: &Walkthrough) -> Option<(FollowKind, Entity)> {
    match mode {
        CameraMode::FollowingVehicle(entity) => Some((FollowKind::Vehicle, entity)),
        CameraMode::FollowingPedestrian(entity) => Some((FollowKind::Pedestrian, entity)),
        CameraMode::WalkthroughAuto => walkthrough.target,
        _ => None,
    }
}

/// System: add the fused input as a nudge on the follow camera.
pub fn accumulate_follow_offset(
    time: Res<Time>,
    config: Res<CameraConfig>,
    motion: Res<MotionInput>,
    mode: Res<CameraMode>,
    walkthrough: Res<Walkthrough>,
    cameras: Query<&Transform, With<Camera3d>>,
    mut offset: ResMut<FollowOffset>,
) {
    if !config.allow_user_offset {
        return;
    }
    if current_target(*mode, &walkthrough).is_none() {
        return;
    }
    let Ok(camera) = cameras.get_single() else {
        return;
    };
    let speed = config.move_speed * OFFSET_SPEED_FACTOR * time.delta_secs();
    offset.0 += camera.forward() * motion.axes.z * speed
        + camera.right() * motion.axes.x * speed
        + Vec3::Y * motion.axes.y * speed;
}

/// System: derive the camera pose from the followed entity.
///
/// A despawned target stops a direct follow (back to strategic, UI restored)
/// or, in walkthrough mode, leaves the target empty so the cycle picks a new
/// one next tick.
pub fn place_follow_camera(
    config: Res<CameraConfig>,
    mut mode: ResMut<CameraMode>,
    mut walkthrough: ResMut<Walkthrough>,
    mut offset: ResMut<FollowOffset>,
    mut pose: ResMut<FollowPose>,
    mut orbit: ResMut<OrbitControlEnabled>,
    targets: Query<&Transform, Without<Camera3d>>,
    mut hider: EventWriter<UiHiderMessage>,
) {
    let Some((kind, entity)) = current_target(*mode, &walkthrough) else {
        pose.0 = None;
        return;
    };
    match targets.get(entity) {
        Ok(transform) => {
            pose.0 = Some(follow_pose(kind, transform, offset.0));
        }
        Err(_) => {
            pose.0 = None;
            offset.0 = Vec3::ZERO;
            if *mode == CameraMode::WalkthroughAuto {
                walkthrough.target = None;
            } else {
                *mode = CameraMode::Strategic;
                orbit.0 = true;
                if config.integrate_hide_ui {
                    hider.send(UiHiderMessage::Show);
                }
            }
        }
    }
}
