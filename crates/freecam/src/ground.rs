//! Terrain and network geometry resolution.
//!
//! The camera core never reads the host's terrain or network storage
//! directly; it goes through the `GroundResolver` trait, injected as a boxed
//! resource. The resolved ground height feeds three separate behaviors:
//! the first-person snap blend, the altitude speed limiter, and the
//! prevent-clip hard floor that runs in every mode.

use bevy::prelude::*;

use crate::config::CameraConfig;
use crate::mode::{CameraMode, FreeCamera};

/// The downward network probe starts this far above the camera.
pub const PROBE_ABOVE: f32 = 1.5;
/// The downward network probe extends this far below the camera.
pub const PROBE_BELOW: f32 = 1000.0;

/// Blend factor applied per tick when snapping toward the ground height.
pub const SNAP_BLEND: f32 = 0.9;

/// Host-provided terrain and network geometry queries.
pub trait GroundResolver: Send + Sync {
    /// Authoritative surface height at a horizontal position: the higher of
    /// terrain and water level.
    fn sample_height(&self, x: f32, z: f32) -> f32;

    /// Downward ray-cast against road, rail, and water network surfaces
    /// within `PROBE_ABOVE` above and `PROBE_BELOW` below `position`.
    /// `None` means no network surface was hit and no correction applies.
    fn raycast_ground(&self, position: Vec3) -> Option<f32>;
}

/// Injected resolver. Hosts replace the default flat world with an adapter
/// over their terrain and network managers.
#[derive(Resource)]
pub struct GroundSource(pub Box<dyn GroundResolver>);

impl Default for GroundSource {
    fn default() -> Self {
        Self(Box::new(FlatGround {
            terrain: 0.0,
            water: 0.0,
        }))
    }
}

/// Trivial resolver for demos and tests: constant terrain and water levels,
/// no network geometry.
pub struct FlatGround {
    pub terrain: f32,
    pub water: f32,
}

impl GroundResolver for FlatGround {
    fn sample_height(&self, _x: f32, _z: f32) -> f32 {
        self.terrain.max(self.water)
    }

    fn raycast_ground(&self, _position: Vec3) -> Option<f32> {
        None
    }
}

/// Ground height under `position`, raised by any network surface the
/// downward probe hits.
pub fn resolved_ground(resolver: &dyn GroundResolver, position: Vec3) -> f32 {
    let mut height = resolver.sample_height(position.x, position.z);
    if let Some(hit) = resolver.raycast_ground(position) {
        height = height.max(hit);
    }
    height
}

/// Altitude-based speed limiter: movement speed scales with the square root
/// of the ground height, clamped to [1, 256].
pub fn ground_speed_factor(ground_height: f32) -> f32 {
    ground_height.max(0.0).sqrt().clamp(1.0, 256.0)
}

/// Hard floor: a camera height below `ground + offset` is raised to exactly
/// that value. Idempotent for unchanged terrain.
pub fn clamp_above_ground(y: f32, ground_height: f32, offset: f32) -> f32 {
    y.max(ground_height + offset)
}

/// System: prevent-clip safety net.
///
/// Runs after all movement, every tick, in every mode. Distinct from the
/// snap-to-ground blend: this is a hard clamp, not a smoothed approach.
/// The first-person rig is clamped too so the floor does not fight the next
/// movement tick.
pub fn prevent_clip_ground(
    config: Res<CameraConfig>,
    source: Res<GroundSource>,
    mode: Res<CameraMode>,
    mut free: ResMut<FreeCamera>,
    mut cameras: Query<&mut Transform, With<Camera3d>>,
) {
    if !config.prevent_clip_ground {
        return;
    }
    let Ok(mut transform) = cameras.get_single_mut() else {
        return;
    };
    let ground = resolved_ground(source.0.as_ref(), transform.translation);
    let floor = ground + config.ground_offset;
    if transform.translation.y < floor {
        transform.translation.y = floor;
    }
    if matches!(*mode, CameraMode::FirstPerson) && free.position.y < floor {
        free.position.y = floor;
    }
}
