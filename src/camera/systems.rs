use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;

use super::CameraConfig;
use super::entities::{CameraRig, TerrainCamera};
use crate::hex_map::HexGrid;
use crate::math;

/// Spawns the Camera3d entity with its rig.
pub fn spawn_camera(mut commands: Commands, cfg: Res<CameraConfig>) {
    let rig = CameraRig {
        focus: Vec3::ZERO,
        distance: cfg.start_distance,
    };
    commands.spawn((
        Name::new("Camera"),
        Camera3d::default(),
        Tonemapping::TonyMcMapface,
        rig.transform(cfg.pitch),
        rig,
        TerrainCamera,
    ));
}

/// Centers the rig on the grid once it has been generated.
pub fn focus_on_grid(grid: Res<HexGrid>, mut rigs: Query<&mut CameraRig, With<TerrainCamera>>) {
    let cells = grid.cells();
    let (Some(first), Some(last)) = (cells.first(), cells.last()) else {
        return;
    };
    let metrics = grid.metrics();
    let center =
        (first.coordinates().to_position(metrics) + last.coordinates().to_position(metrics)) * 0.5;
    for mut rig in &mut rigs {
        rig.focus = center;
    }
}

/// WASD pans the focus point, scroll zooms.
pub fn pan_and_zoom(
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    mut scroll: MessageReader<MouseWheel>,
    cfg: Res<CameraConfig>,
    mut rigs: Query<&mut CameraRig, With<TerrainCamera>>,
) {
    let Ok(mut rig) = rigs.single_mut() else {
        return;
    };

    // Screen up is -z.
    let mut direction = Vec3::ZERO;
    if keys.pressed(KeyCode::KeyW) {
        direction.z -= 1.0;
    }
    if keys.pressed(KeyCode::KeyS) {
        direction.z += 1.0;
    }
    if keys.pressed(KeyCode::KeyD) {
        direction.x += 1.0;
    }
    if keys.pressed(KeyCode::KeyA) {
        direction.x -= 1.0;
    }
    if direction != Vec3::ZERO {
        let speed = cfg.pan_speed * rig.distance / cfg.start_distance;
        rig.focus += direction.normalize() * speed * time.delta_secs();
    }

    let lines: f32 = scroll
        .read()
        .map(|ev| match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y / 40.0,
        })
        .sum();
    if lines != 0.0 {
        rig.distance = math::zoom_distance(
            rig.distance,
            lines,
            cfg.zoom_speed,
            cfg.min_distance,
            cfg.max_distance,
        );
    }
}

/// Rebuilds the camera transform whenever its rig moved.
pub fn apply_rig(
    cfg: Res<CameraConfig>,
    mut cameras: Query<(&CameraRig, &mut Transform), Changed<CameraRig>>,
) {
    for (rig, mut transform) in &mut cameras {
        *transform = rig.transform(cfg.pitch);
    }
}
