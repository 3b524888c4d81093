use bevy::picking::events::{Click, Pointer};
use bevy::picking::pointer::PointerButton;
use bevy::prelude::*;
use bevy_egui::egui;

use super::TerrainConfig;
use super::entities::{Brush, CellAnchor, CellAnchors, TerrainMesh};
use crate::GameState;
use crate::camera::{CameraRig, TerrainCamera};
use crate::hex_map::{CellChange, CellEdit, FbmNoise, HexCoordinates, HexGrid, HexGridError};

/// Labels more than this many cells from the camera focus are not drawn.
const LABEL_RADIUS: u32 = 6;

const PALETTE_KEYS: [KeyCode; 9] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

// ── Startup ─────────────────────────────────────────────────────────

/// Builds the [`HexGrid`] resource, the terrain mesh entity, one anchor per
/// cell and the sun.
pub fn generate_grid(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    cfg: Res<TerrainConfig>,
) {
    let p = &cfg.perturb_noise;
    let noise = FbmNoise::new(p.seed, p.octaves, p.period, p.frequency);
    let grid = match HexGrid::new(&cfg.grid, cfg.metrics.clone(), Box::new(noise)) {
        Ok(grid) => grid,
        Err(err) => {
            error!("terrain generation failed: {err}");
            return;
        }
    };

    // Vertex colors carry the cell colors; the material stays white.
    let material = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        perceptual_roughness: 0.9,
        ..default()
    });

    let terrain = commands
        .spawn((
            Name::new("HexTerrain"),
            TerrainMesh,
            Mesh3d(meshes.add(grid.mesh().to_bevy_mesh())),
            MeshMaterial3d(material),
            Transform::default(),
        ))
        .observe(edit_on_click)
        .id();

    let metrics = grid.metrics();
    let mut anchors = Vec::with_capacity(grid.cells().len());
    for (index, cell) in grid.cells().iter().enumerate() {
        let anchor = commands
            .spawn((
                CellAnchor { index },
                Name::new(format!("HexCell{}", cell.coordinates())),
                Transform::from_translation(
                    metrics.cell_anchor(cell.coordinates(), cell.elevation()),
                ),
                Visibility::default(),
            ))
            .id();
        commands.entity(terrain).add_child(anchor);
        anchors.push(anchor);
    }

    commands.spawn((
        Name::new("Sun"),
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(-40.0, 120.0, 60.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.insert_resource(CellAnchors { entities: anchors });
    commands.insert_resource(grid);
}

// ── Update: editing ─────────────────────────────────────────────────

/// Number keys pick a palette color; arrows set the target elevation and
/// Backspace goes back to painting only.
pub fn select_brush(
    keys: Res<ButtonInput<KeyCode>>,
    cfg: Res<TerrainConfig>,
    mut brush: ResMut<Brush>,
) {
    for (key, color) in PALETTE_KEYS.iter().zip(&cfg.palette) {
        if keys.just_pressed(*key) {
            brush.color = *color;
        }
    }
    if keys.just_pressed(KeyCode::ArrowUp) {
        brush.raise();
    }
    if keys.just_pressed(KeyCode::ArrowDown) {
        brush.lower();
    }
    if keys.just_pressed(KeyCode::Backspace) {
        brush.clear_elevation();
    }
    if brush.is_changed() {
        info!("brush: {:?} elevation {:?}", brush.color, brush.elevation);
    }
}

/// Observer on the terrain entity: applies the brush to the clicked cell.
pub fn edit_on_click(
    click: On<Pointer<Click>>,
    grid: Option<ResMut<HexGrid>>,
    brush: Res<Brush>,
    state: Res<State<GameState>>,
) {
    if click.button != PointerButton::Primary || *state.get() != GameState::Running {
        return;
    }
    let (Some(mut grid), Some(position)) = (grid, click.hit.position) else {
        return;
    };
    match apply_brush(&mut grid, position, brush.edit()) {
        Ok(coordinates) => debug!("edited cell {coordinates} at {position}"),
        Err(err) => warn!("ignored click at {position}: {err}"),
    }
}

/// Edits the cell under `position`, flagging the grid as changed only when a
/// cell value really changed, so rejected or no-op clicks skip the re-upload.
fn apply_brush(
    grid: &mut impl DetectChangesMut<Inner = HexGrid>,
    position: Vec3,
    edit: CellEdit,
) -> Result<HexCoordinates, HexGridError> {
    let inner = grid.bypass_change_detection();
    let coordinates = inner.cell_at(position)?.coordinates();
    let result = inner.edit_cell(position, edit);
    let pending = inner.has_pending_changes();
    if pending {
        grid.set_changed();
    }
    result.map(|_| coordinates)
}

/// Moves anchors of re-elevated cells and re-uploads the terrain mesh.
pub fn refresh_terrain(
    mut commands: Commands,
    mut grid: ResMut<HexGrid>,
    mut meshes: ResMut<Assets<Mesh>>,
    anchors: Option<Res<CellAnchors>>,
    terrain_q: Query<Entity, With<TerrainMesh>>,
    mut anchor_q: Query<&mut Transform, With<CellAnchor>>,
) {
    // Draining must not mark the grid changed again.
    let changes = grid.bypass_change_detection().drain_changes();
    if let Some(anchors) = anchors {
        for change in changes {
            let CellChange::Elevation {
                index,
                coordinates,
                new,
                ..
            } = change
            else {
                continue;
            };
            if let Some(&entity) = anchors.entities.get(index)
                && let Ok(mut transform) = anchor_q.get_mut(entity)
            {
                transform.translation = grid.metrics().cell_anchor(coordinates, new);
            }
        }
    }

    let Ok(terrain) = terrain_q.single() else {
        return;
    };
    commands
        .entity(terrain)
        .insert(Mesh3d(meshes.add(grid.mesh().to_bevy_mesh())));
}

// ── Debugging ───────────────────────────────────────────────────────

/// Draws the cube coordinates of the cells around the camera focus.
pub fn draw_hex_labels(
    mut egui_ctx: Query<&mut bevy_egui::EguiContext>,
    camera_q: Query<(&Camera, &GlobalTransform, &CameraRig), With<TerrainCamera>>,
    grid: Option<Res<HexGrid>>,
    mut ready: Local<bool>,
) {
    if !*ready {
        *ready = true;
        return;
    }
    let Some(grid) = grid else { return };
    let Ok((camera, cam_gt, rig)) = camera_q.single() else {
        return;
    };
    let Ok(mut ctx) = egui_ctx.single_mut() else {
        return;
    };
    let metrics = grid.metrics();
    let focus = HexCoordinates::from_position(rig.focus, metrics);

    let painter = ctx.get_mut().layer_painter(egui::LayerId::background());

    for cell in grid.cells() {
        if cell.coordinates().distance_to(&focus) > LABEL_RADIUS {
            continue;
        }
        let world_pos = metrics.label_position(cell.coordinates(), cell.elevation());
        if let Ok(viewport) = camera.world_to_viewport(cam_gt, world_pos) {
            painter.text(
                egui::pos2(viewport.x, viewport.y),
                egui::Align2::CENTER_CENTER,
                cell.coordinates().to_string_on_separate_lines(),
                egui::FontId::proportional(11.0),
                egui::Color32::WHITE,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex_map::{ConstantNoise, GridSettings, HexMetrics};

    fn world_with_grid() -> World {
        let mut settings = GridSettings {
            width: 3,
            height: 3,
            ..default()
        };
        settings.elevation.enabled = false;
        let grid = HexGrid::new(
            &settings,
            HexMetrics::unperturbed(),
            Box::new(ConstantNoise::NEUTRAL),
        )
        .unwrap();
        let mut world = World::new();
        world.insert_resource(grid);
        world.clear_trackers();
        world
    }

    fn paint(color: LinearRgba) -> CellEdit {
        CellEdit {
            color: Some(color),
            elevation: None,
        }
    }

    #[test]
    fn rejected_click_leaves_grid_unchanged() {
        let mut world = world_with_grid();
        let outside = Vec3::new(-500.0, 0.0, 900.0);
        let result = apply_brush(&mut world.resource_mut::<HexGrid>(), outside, paint(LinearRgba::RED));
        assert!(matches!(result, Err(HexGridError::OutOfRange { .. })));
        assert!(!world.is_resource_changed::<HexGrid>());
    }

    #[test]
    fn no_op_click_leaves_grid_unchanged() {
        let mut world = world_with_grid();
        let position = HexCoordinates::from_offset_coordinates(1, 1)
            .to_position(world.resource::<HexGrid>().metrics());
        assert!(apply_brush(&mut world.resource_mut::<HexGrid>(), position, paint(LinearRgba::WHITE)).is_ok());
        assert!(!world.is_resource_changed::<HexGrid>());
    }

    #[test]
    fn real_edit_marks_grid_changed() {
        let mut world = world_with_grid();
        let target = HexCoordinates::from_offset_coordinates(1, 1);
        let position = target.to_position(world.resource::<HexGrid>().metrics());
        let result = apply_brush(&mut world.resource_mut::<HexGrid>(), position, paint(LinearRgba::RED));
        assert_eq!(result, Ok(target));
        assert!(world.is_resource_changed::<HexGrid>());
    }
}
