//! Splat point layer - `.splat` asset loading, effect pass and picking

use bevy::asset::io::Reader;
use bevy::asset::{AssetLoader, LoadContext, LoadState, RenderAssetUsages};
use bevy::prelude::*;
use bevy::render::render_resource::PrimitiveTopology;
use splatview_core::splat::PreparedSplats;
use splatview_core::{LoadProgress, SplatCloud, SplatError, ViewportState};
use thiserror::Error;

use crate::camera::DEPTH_RANGE;
use crate::redraw::NeedsRedraw;
use crate::ViewerSettings;

/// A parsed `.splat` file
#[derive(Asset, TypePath, Debug, Clone)]
pub struct SplatAsset {
    pub cloud: SplatCloud,
}

#[derive(Debug, Error)]
pub enum SplatLoadError {
    #[error("Failed to read splat data: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Format(#[from] SplatError),
}

#[derive(Default)]
pub struct SplatLoader;

impl AssetLoader for SplatLoader {
    type Asset = SplatAsset;
    type Settings = ();
    type Error = SplatLoadError;

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &(),
        _load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        let cloud = SplatCloud::from_bytes(&bytes)?;
        Ok(SplatAsset { cloud })
    }

    fn extensions(&self) -> &[&str] {
        &["splat"]
    }
}

/// Loading progress notification, mirrors the browser `loaded` event
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplatLoaded {
    pub total_loaded: u64,
    pub num_displayed: u64,
}

/// Marker for the point-cloud entity
#[derive(Component)]
pub struct SplatPoints;

/// The splat layer: source asset, world-space splats and load progress
#[derive(Resource, Default)]
pub struct SplatLayer {
    pub handle: Option<Handle<SplatAsset>>,
    pub prepared: PreparedSplats,
    pub progress: LoadProgress,
    pub failed: bool,
}

impl SplatLayer {
    pub fn is_loading(&self) -> bool {
        self.handle.is_some()
    }

    /// Nearest displayed splat under `screen`
    pub fn hit_test(
        &self,
        clip_from_world: &Mat4,
        viewport: &ViewportState,
        screen: Vec2,
        pick_radius_px: f32,
    ) -> Option<Vec3> {
        self.prepared
            .hit_test(clip_from_world, viewport, screen, pick_radius_px, DEPTH_RANGE)
    }
}

/// Point-list mesh with one vertex per splat
pub fn build_point_mesh(prepared: &PreparedSplats) -> Mesh {
    let positions: Vec<[f32; 3]> = prepared.positions.iter().map(|p| p.to_array()).collect();
    Mesh::new(PrimitiveTopology::PointList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, prepared.colors.clone())
}

pub struct SplatPlugin;

impl Plugin for SplatPlugin {
    fn build(&self, app: &mut App) {
        app.init_asset::<SplatAsset>()
            .register_asset_loader(SplatLoader)
            .add_message::<SplatLoaded>()
            .init_resource::<SplatLayer>()
            .add_systems(Startup, start_splat_load)
            .add_systems(Update, poll_splats);
    }
}

fn start_splat_load(
    settings: Res<ViewerSettings>,
    asset_server: Res<AssetServer>,
    mut layer: ResMut<SplatLayer>,
) {
    let url = settings.0.splat.url.clone();
    if url.is_empty() {
        return;
    }
    tracing::info!("Starting to load splats: {}", url);
    layer.handle = Some(asset_server.load(url));
}

fn poll_splats(
    mut commands: Commands,
    mut layer: ResMut<SplatLayer>,
    asset_server: Res<AssetServer>,
    splat_assets: Res<Assets<SplatAsset>>,
    settings: Res<ViewerSettings>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut loaded: MessageWriter<SplatLoaded>,
    mut redraw: MessageWriter<NeedsRedraw>,
) {
    let Some(handle) = layer.handle.clone() else {
        return;
    };

    match asset_server.get_load_state(handle.id()) {
        Some(LoadState::Loaded) => {
            let Some(asset) = splat_assets.get(&handle) else {
                return;
            };
            layer.handle = None;

            let config = &settings.0;
            let prepared = asset
                .cloud
                .prepare(&config.splat_transform(), &config.splat_effect());
            let total = asset.cloud.len() as u64;
            layer.progress = LoadProgress::new(total);
            layer.progress.update(total, prepared.len() as u64);
            tracing::info!(
                total,
                displayed = prepared.len(),
                "Splats loaded: {}",
                config.splat.url
            );

            commands.spawn((
                Mesh3d(meshes.add(build_point_mesh(&prepared))),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: Color::WHITE,
                    unlit: true,
                    ..default()
                })),
                Transform::IDENTITY,
                SplatPoints,
            ));
            layer.prepared = prepared;

            loaded.write(SplatLoaded {
                total_loaded: layer.progress.total_loaded,
                num_displayed: layer.progress.num_displayed,
            });
            redraw.write(NeedsRedraw);
        }
        Some(LoadState::Failed(err)) => {
            tracing::error!(path = %settings.0.splat.url, error = %err, "Error loading splats");
            layer.handle = None;
            layer.failed = true;
            redraw.write(NeedsRedraw);
        }
        _ => {
            redraw.write(NeedsRedraw);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splatview_core::{SplatEffect, ViewerConfig};

    fn cloud() -> SplatCloud {
        let mut bytes = Vec::new();
        for (i, x) in [0.0f32, 1.0, 2.0].into_iter().enumerate() {
            for v in [x, 0.0, 0.0, 0.05, 0.05, 0.05] {
                bytes.extend_from_slice(&v.to_le_bytes());
            }
            bytes.extend_from_slice(&[200, 100, 50, 255 - i as u8]);
            bytes.extend_from_slice(&[255, 128, 128, 128]);
        }
        SplatCloud::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn test_point_mesh_has_vertex_per_splat() {
        let prepared = cloud().prepare(&Mat4::IDENTITY, &SplatEffect::none());
        let mesh = build_point_mesh(&prepared);
        assert_eq!(mesh.count_vertices(), 3);
        assert!(mesh.attribute(Mesh::ATTRIBUTE_COLOR).is_some());
    }

    #[test]
    fn test_default_effect_grays_points() {
        let config = ViewerConfig::default();
        let prepared = cloud().prepare(&config.splat_transform(), &config.splat_effect());
        assert_eq!(prepared.len(), 3);
        for [r, g, b, _] in &prepared.colors {
            assert_eq!(r, g);
            assert_eq!(g, b);
        }
    }

    #[test]
    fn test_layer_without_splats_misses() {
        let layer = SplatLayer::default();
        let viewport = ViewportState::new(800, 600);
        assert_eq!(
            layer.hit_test(&Mat4::IDENTITY, &viewport, Vec2::new(400.0, 300.0), 6.0),
            None
        );
        assert!(!layer.is_loading());
    }
}
