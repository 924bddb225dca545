//! CityWalk: a small demo city for the freecam controller.
//!
//! A flat ground plane, a ring of vehicles circling the center, and a
//! handful of pedestrians wandering between them. Tab drops into
//! first-person, F starts a walkthrough, V and C follow a random vehicle or
//! pedestrian, Escape backs out.

use bevy::input::mouse::MouseWheel;
use bevy::prelude::*;
use bevy::window::PresentMode;

use freecam::follow::{pick_random, CamRng, PedestrianRoster, RosterSlot, VehicleRoster};
use freecam::host::{CameraCommand, OrbitControlEnabled, SimulationPaused};
use freecam::FreecamPlugin;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "CityWalk".to_string(),
                resolution: (1280.0, 720.0).into(),
                present_mode: PresentMode::AutoVsync,
                ..default()
            }),
            ..default()
        }))
        .add_plugins(FreecamPlugin)
        .add_systems(Startup, (setup_scene, spawn_population))
        .add_systems(
            Update,
            (
                drive_vehicles,
                drive_pedestrians,
                strategic_camera_control,
                demo_hotkeys,
            ),
        )
        .run();
}

#[derive(Component)]
struct DemoVehicle {
    center: Vec3,
    radius: f32,
    /// Radians per second around the circle.
    angular_speed: f32,
    phase: f32,
}

#[derive(Component)]
struct DemoPedestrian {
    heading: Vec3,
    speed: f32,
}

const CITY_EXTENT: f32 = 200.0;

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(CITY_EXTENT * 4.0, CITY_EXTENT * 4.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.35, 0.45, 0.35))),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(EulerRot::XYZ, -0.9, 0.6, 0.0)),
    ));

    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 120.0, 160.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        Text::new(
            "Tab: first person   F: walkthrough   V: follow vehicle   C: follow pedestrian\n\
             Esc: back   WASD/QE: move   Shift: sprint   Home: free cursor\n\
             Arrows: pan   Wheel: zoom",
        ),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(12.0),
            bottom: Val::Px(12.0),
            ..default()
        },
    ));
}

fn spawn_population(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut vehicles: ResMut<VehicleRoster>,
    mut pedestrians: ResMut<PedestrianRoster>,
) {
    let car_mesh = meshes.add(Cuboid::new(2.0, 1.4, 4.5));
    let car_material = materials.add(Color::srgb(0.7, 0.2, 0.2));
    for i in 0..12 {
        let radius = 40.0 + 12.0 * (i % 4) as f32;
        let phase = i as f32 * std::f32::consts::TAU / 12.0;
        let entity = commands
            .spawn((
                Mesh3d(car_mesh.clone()),
                MeshMaterial3d(car_material.clone()),
                Transform::from_xyz(radius, 0.7, 0.0),
                DemoVehicle {
                    center: Vec3::ZERO,
                    radius,
                    angular_speed: 0.25 + 0.05 * (i % 3) as f32,
                    phase,
                },
            ))
            .id();
        vehicles.0.push(RosterSlot::live(entity));
    }

    let walker_mesh = meshes.add(Capsule3d::new(0.3, 1.2));
    let walker_material = materials.add(Color::srgb(0.2, 0.3, 0.7));
    for i in 0..20 {
        let angle = i as f32 * std::f32::consts::TAU / 20.0;
        let entity = commands
            .spawn((
                Mesh3d(walker_mesh.clone()),
                MeshMaterial3d(walker_material.clone()),
                Transform::from_xyz(angle.cos() * 20.0, 0.9, angle.sin() * 20.0),
                DemoPedestrian {
                    heading: Vec3::new(angle.cos(), 0.0, angle.sin()),
                    speed: 1.2 + 0.1 * (i % 5) as f32,
                },
            ))
            .id();
        pedestrians.0.push(RosterSlot::live(entity));
    }
}

fn drive_vehicles(
    time: Res<Time>,
    paused: Res<SimulationPaused>,
    mut vehicles: Query<(&mut Transform, &DemoVehicle)>,
) {
    if paused.0 {
        return;
    }
    let t = time.elapsed_secs();
    for (mut transform, vehicle) in &mut vehicles {
        let angle = vehicle.phase + t * vehicle.angular_speed;
        let position =
            vehicle.center + Vec3::new(angle.cos(), 0.0, angle.sin()) * vehicle.radius;
        let tangent = Vec3::new(-angle.sin(), 0.0, angle.cos());
        transform.translation = position + Vec3::Y * 0.7;
        transform.look_to(tangent, Vec3::Y);
    }
}

fn drive_pedestrians(
    time: Res<Time>,
    paused: Res<SimulationPaused>,
    mut walkers: Query<(&mut Transform, &mut DemoPedestrian)>,
) {
    if paused.0 {
        return;
    }
    let dt = time.delta_secs();
    for (mut transform, mut walker) in &mut walkers {
        transform.translation += walker.heading * walker.speed * dt;
        // Bounce off the city edge.
        if transform.translation.with_y(0.0).length() > CITY_EXTENT {
            walker.heading = -walker.heading;
        }
        let heading = walker.heading;
        transform.look_to(heading, Vec3::Y);
    }
}

/// The strategic camera: arrow-key panning and wheel zoom, active only while
/// the controller has handed the transform back.
fn strategic_camera_control(
    time: Res<Time>,
    orbit: Res<OrbitControlEnabled>,
    keys: Res<ButtonInput<KeyCode>>,
    mut wheel: EventReader<MouseWheel>,
    mut cameras: Query<&mut Transform, With<Camera3d>>,
) {
    if !orbit.0 {
        wheel.clear();
        return;
    }
    let Ok(mut transform) = cameras.get_single_mut() else {
        return;
    };
    let dt = time.delta_secs();
    let pan_speed = 60.0 * dt;

    let mut pan = Vec3::ZERO;
    if keys.pressed(KeyCode::ArrowUp) {
        pan.z -= 1.0;
    }
    if keys.pressed(KeyCode::ArrowDown) {
        pan.z += 1.0;
    }
    if keys.pressed(KeyCode::ArrowLeft) {
        pan.x -= 1.0;
    }
    if keys.pressed(KeyCode::ArrowRight) {
        pan.x += 1.0;
    }
    transform.translation += pan * pan_speed;

    let mut zoom = 0.0;
    for event in wheel.read() {
        zoom += event.y;
    }
    if zoom != 0.0 {
        let forward = transform.forward();
        transform.translation += forward * zoom * 8.0;
    }
}

fn demo_hotkeys(
    keys: Res<ButtonInput<KeyCode>>,
    vehicles: Res<VehicleRoster>,
    pedestrians: Res<PedestrianRoster>,
    mut rng: ResMut<CamRng>,
    mut commands: EventWriter<CameraCommand>,
) {
    if keys.just_pressed(KeyCode::KeyF) {
        commands.send(CameraCommand::StartWalkthrough);
    }
    if keys.just_pressed(KeyCode::KeyV) {
        if let Some(entity) = pick_random(&vehicles.0, &mut rng.0) {
            commands.send(CameraCommand::FollowVehicle(entity));
        }
    }
    if keys.just_pressed(KeyCode::KeyC) {
        if let Some(entity) = pick_random(&pedestrians.0, &mut rng.0) {
            commands.send(CameraCommand::FollowPedestrian(entity));
        }
    }
}
