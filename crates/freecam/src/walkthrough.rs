//! Walkthrough: automatic cycling between random vehicles and pedestrians.

use bevy::prelude::*;
use rand::Rng;

use crate::config::CameraConfig;
use crate::follow::{pick_random, CamRng, FollowKind, FollowOffset, PedestrianRoster, VehicleRoster};
use crate::mode::CameraMode;

/// Walkthrough state: the countdown to the next switch and the current
/// target, if one has been chosen.
#[derive(Resource, Debug, Default)]
pub struct Walkthrough {
    pub countdown: f32,
    pub target: Option<(FollowKind, Entity)>,
}

/// Draw the next target kind: pedestrians twice as often as vehicles.
pub fn choose_kind(rng: &mut impl Rng) -> FollowKind {
    if rng.gen_range(0..3) == 0 {
        FollowKind::Vehicle
    } else {
        FollowKind::Pedestrian
    }
}

/// Whether the cycle should switch targets this tick. In manual mode the
/// timer is ignored and only a click (or a dead target) advances; in timed
/// mode the countdown reaching zero or a dead target does.
pub fn needs_switch(countdown: f32, target_alive: bool, manual: bool, clicked: bool) -> bool {
    if manual {
        clicked || !target_alive
    } else {
        countdown <= 0.0 || !target_alive
    }
}

/// System: run the walkthrough cycle while the mode is active.
pub fn advance_walkthrough(
    time: Res<Time>,
    config: Res<CameraConfig>,
    mode: Res<CameraMode>,
    mouse: Res<ButtonInput<MouseButton>>,
    vehicles: Res<VehicleRoster>,
    pedestrians: Res<PedestrianRoster>,
    mut rng: ResMut<CamRng>,
    mut walkthrough: ResMut<Walkthrough>,
    mut offset: ResMut<FollowOffset>,
) {
    if *mode != CameraMode::WalkthroughAuto {
        return;
    }
    if !config.walkthrough_manual {
        walkthrough.countdown -= time.delta_secs();
    }
    let target_alive = match walkthrough.target {
        Some((FollowKind::Vehicle, entity)) => vehicles
            .0
            .iter()
            .any(|slot| slot.entity == entity && slot.live),
        Some((FollowKind::Pedestrian, entity)) => pedestrians
            .0
            .iter()
            .any(|slot| slot.entity == entity && slot.live),
        None => false,
    };
    let clicked = mouse.just_pressed(MouseButton::Left);
    if !needs_switch(
        walkthrough.countdown,
        target_alive,
        config.walkthrough_manual,
        clicked,
    ) {
        return;
    }

    walkthrough.countdown = config.walkthrough_timer;
    let kind = choose_kind(&mut rng.0);
    let picked = match kind {
        FollowKind::Vehicle => pick_random(&vehicles.0, &mut rng.0),
        FollowKind::Pedestrian => pick_random(&pedestrians.0, &mut rng.0),
    };
    match picked {
        Some(entity) => {
            walkthrough.target = Some((kind, entity));
            offset.0 = Vec3::ZERO;
        }
        None => {
            // The chosen table was empty. Keep the old target only while it
            // is still alive; otherwise wait for the next tick.
            if !target_alive {
                walkthrough.target = None;
            }
        }
    }
}
