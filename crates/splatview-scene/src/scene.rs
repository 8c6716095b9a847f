//! Scene setup - camera, lights, grid and the orbit target marker

use bevy::prelude::*;

use crate::camera::MainCamera;
use crate::ViewerSettings;

/// Marker component for the main directional light
#[derive(Component)]
pub struct MainDirectionalLight;

/// Marker component for grid lines
#[derive(Component)]
pub struct GridLine;

/// Marker ball shown at the orbit target
#[derive(Component)]
pub struct TargetMarker;

const GRID_LINE_THICKNESS: f32 = 0.01;

/// Plugin for scene setup
pub struct SceneSetupPlugin;

impl Plugin for SceneSetupPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::BLACK))
            .add_systems(Startup, setup_scene);
    }
}

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    settings: Res<ViewerSettings>,
) {
    let config = &settings.0;

    // Y is up
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: config.camera.fov_deg.to_radians(),
            near: config.camera.near,
            far: config.camera.far,
            ..default()
        }),
        Transform::from_translation(config.camera_position()).looking_at(Vec3::ZERO, Vec3::Y),
        MainCamera,
    ));

    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 400.0,
        ..default()
    });

    commands.spawn((
        DirectionalLight {
            illuminance: 5000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(5.0, 10.0, 7.5).looking_at(Vec3::ZERO, Vec3::Y),
        MainDirectionalLight,
    ));

    // Grid on the X-Z plane
    let divisions = config.scene.grid_divisions.max(1);
    let size = config.scene.grid_size;
    let spacing = size / divisions as f32;
    let half = size / 2.0;
    let y = config.scene.grid_height;

    let line_material = materials.add(StandardMaterial {
        base_color: Color::srgba(0.5, 0.5, 0.5, 0.6),
        unlit: true,
        alpha_mode: AlphaMode::Blend,
        ..default()
    });
    let line_mesh_x = meshes.add(Cuboid::new(size, GRID_LINE_THICKNESS, GRID_LINE_THICKNESS));
    let line_mesh_z = meshes.add(Cuboid::new(GRID_LINE_THICKNESS, GRID_LINE_THICKNESS, size));

    for i in 0..=divisions {
        let offset = -half + i as f32 * spacing;
        commands.spawn((
            Mesh3d(line_mesh_x.clone()),
            MeshMaterial3d(line_material.clone()),
            Transform::from_translation(Vec3::new(0.0, y, offset)),
            GridLine,
        ));
        commands.spawn((
            Mesh3d(line_mesh_z.clone()),
            MeshMaterial3d(line_material.clone()),
            Transform::from_translation(Vec3::new(offset, y, 0.0)),
            GridLine,
        ));
    }

    commands.spawn((
        Mesh3d(meshes.add(Sphere::new(config.scene.marker_radius))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(1.0, 1.0, 0.0),
            unlit: true,
            ..default()
        })),
        Transform::IDENTITY,
        TargetMarker,
    ));

    tracing::info!(divisions, size, "Scene ready");
}
