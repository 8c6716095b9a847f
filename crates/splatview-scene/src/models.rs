//! glTF model loading, one-time recentring and world bounds tracking

use bevy::asset::LoadState;
use bevy::prelude::*;
use bevy::transform::TransformSystems;
use splatview_core::{Bounds, ViewerError};
use std::collections::HashMap;

use crate::redraw::NeedsRedraw;
use crate::ViewerSettings;

/// Lifecycle of the single viewer model
#[derive(Resource, Debug, Default)]
pub enum ModelState {
    #[default]
    Idle,
    Loading(Handle<Gltf>),
    Spawned {
        root: Entity,
        /// Whether the bounding-box centre has been moved to the origin
        centred: bool,
    },
    Failed,
}

impl ModelState {
    pub fn root(&self) -> Option<Entity> {
        match self {
            ModelState::Spawned { root, .. } => Some(*root),
            _ => None,
        }
    }

    /// A model is in the scene and recentred
    pub fn has_model(&self) -> bool {
        matches!(self, ModelState::Spawned { centred: true, .. })
    }
}

/// World-space bounds of the model, refreshed after transform propagation
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct ModelBounds(pub Option<Bounds>);

/// Marker for the model scene root
#[derive(Component)]
pub struct ModelRoot;

/// Local-space bounds per mesh asset
#[derive(Resource, Default)]
pub struct MeshBoundsCache {
    bounds: HashMap<AssetId<Mesh>, Option<Bounds>>,
}

impl MeshBoundsCache {
    fn get_or_compute(&mut self, id: AssetId<Mesh>, meshes: &Assets<Mesh>) -> Option<Bounds> {
        if let Some(cached) = self.bounds.get(&id) {
            return *cached;
        }
        // Not loaded yet, try again next frame
        let mesh = meshes.get(id)?;
        let bounds = mesh_bounds(mesh);
        self.bounds.insert(id, bounds);
        bounds
    }
}

/// Bounds of a mesh's vertex positions
pub fn mesh_bounds(mesh: &Mesh) -> Option<Bounds> {
    let positions = mesh
        .attribute(Mesh::ATTRIBUTE_POSITION)
        .and_then(|values| values.as_float3())?;
    Bounds::from_points(positions.iter().copied().map(Vec3::from))
}

pub struct ModelsPlugin;

impl Plugin for ModelsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ModelState>()
            .init_resource::<ModelBounds>()
            .init_resource::<MeshBoundsCache>()
            .add_systems(Startup, start_model_load)
            .add_systems(Update, (poll_model, centre_model).chain())
            .add_systems(
                PostUpdate,
                update_model_bounds.after(TransformSystems::Propagate),
            );
    }
}

fn start_model_load(
    settings: Res<ViewerSettings>,
    asset_server: Res<AssetServer>,
    mut state: ResMut<ModelState>,
) {
    let url = settings.0.model.url.clone();
    if url.is_empty() {
        return;
    }
    tracing::info!("Starting to load model: {}", url);
    let handle: Handle<Gltf> = asset_server.load(url);
    *state = ModelState::Loading(handle);
}

/// Check the load state and spawn the scene once the glTF is ready
fn poll_model(
    mut commands: Commands,
    mut state: ResMut<ModelState>,
    asset_server: Res<AssetServer>,
    gltf_assets: Res<Assets<Gltf>>,
    settings: Res<ViewerSettings>,
    mut redraw: MessageWriter<NeedsRedraw>,
) {
    let ModelState::Loading(handle) = &*state else {
        return;
    };
    let url = &settings.0.model.url;

    match asset_server.get_load_state(handle.id()) {
        Some(LoadState::Loaded) => {
            let scene = gltf_assets
                .get(handle)
                .and_then(|gltf| gltf.default_scene.clone().or_else(|| gltf.scenes.first().cloned()));
            match scene {
                Some(scene) => {
                    tracing::info!("Model loaded: {}", url);
                    let root = commands.spawn((SceneRoot(scene), ModelRoot)).id();
                    *state = ModelState::Spawned {
                        root,
                        centred: false,
                    };
                }
                None => {
                    let err = ViewerError::ModelLoad {
                        path: url.clone(),
                        reason: "file has no scenes".to_string(),
                    };
                    tracing::error!("Error loading GLB: {}", err);
                    *state = ModelState::Failed;
                }
            }
            redraw.write(NeedsRedraw);
        }
        Some(LoadState::Failed(reason)) => {
            let err = ViewerError::ModelLoad {
                path: url.clone(),
                reason: reason.to_string(),
            };
            tracing::error!("Error loading GLB: {}", err);
            *state = ModelState::Failed;
            redraw.write(NeedsRedraw);
        }
        _ => {
            // Still loading, keep frames coming until it finishes
            redraw.write(NeedsRedraw);
        }
    }
}

/// Move the model so its bounding-box centre sits at the origin
fn centre_model(
    mut state: ResMut<ModelState>,
    bounds: Res<ModelBounds>,
    mut roots: Query<&mut Transform, With<ModelRoot>>,
    mut redraw: MessageWriter<NeedsRedraw>,
) {
    let ModelState::Spawned {
        root,
        centred: false,
    } = *state
    else {
        return;
    };

    // Scene instances appear a frame after spawning
    let Some(bounds) = bounds.0 else {
        redraw.write(NeedsRedraw);
        return;
    };

    if let Ok(mut transform) = roots.get_mut(root) {
        let centre = bounds.center();
        transform.translation -= centre;
        tracing::debug!(x = centre.x, y = centre.y, z = centre.z, "Model recentred");
    }
    *state = ModelState::Spawned {
        root,
        centred: true,
    };
    redraw.write(NeedsRedraw);
}

pub(crate) fn update_model_bounds(
    state: Res<ModelState>,
    children_query: Query<&Children>,
    mesh_query: Query<(&Mesh3d, &GlobalTransform)>,
    meshes: Res<Assets<Mesh>>,
    mut cache: ResMut<MeshBoundsCache>,
    mut model_bounds: ResMut<ModelBounds>,
) {
    let bounds = state.root().and_then(|root| {
        let mut acc = None;
        collect_bounds(
            root,
            &children_query,
            &mesh_query,
            &meshes,
            &mut cache,
            &mut acc,
        );
        acc
    });
    if model_bounds.0 != bounds {
        model_bounds.0 = bounds;
    }
}

/// Recursively union the world bounds of every mesh below `entity`
fn collect_bounds(
    entity: Entity,
    children_query: &Query<&Children>,
    mesh_query: &Query<(&Mesh3d, &GlobalTransform)>,
    meshes: &Assets<Mesh>,
    cache: &mut MeshBoundsCache,
    acc: &mut Option<Bounds>,
) {
    if let Ok((mesh, global_transform)) = mesh_query.get(entity) {
        if let Some(local) = cache.get_or_compute(mesh.0.id(), meshes) {
            let world = local.transformed(&Mat4::from(global_transform.affine()));
            *acc = Some(match *acc {
                Some(existing) => existing.union(&world),
                None => world,
            });
        }
    }

    if let Ok(children) = children_query.get(entity) {
        for &child in &**children {
            collect_bounds(child, children_query, mesh_query, meshes, cache, acc);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::asset::RenderAssetUsages;
    use bevy::render::render_resource::PrimitiveTopology;

    #[test]
    fn test_mesh_bounds_from_positions() {
        let mut mesh = Mesh::new(PrimitiveTopology::PointList, RenderAssetUsages::default());
        mesh.insert_attribute(
            Mesh::ATTRIBUTE_POSITION,
            vec![[-1.0, 0.0, 2.0], [3.0, -2.0, 4.0], [0.0, 5.0, 3.0]],
        );
        let bounds = mesh_bounds(&mesh).unwrap();
        assert_eq!(bounds.min, Vec3::new(-1.0, -2.0, 2.0));
        assert_eq!(bounds.max, Vec3::new(3.0, 5.0, 4.0));
    }

    #[test]
    fn test_model_state_has_model_only_once_centred() {
        let root = World::new().spawn_empty().id();
        assert!(!ModelState::Idle.has_model());
        assert!(!ModelState::Failed.has_model());
        assert!(!ModelState::Spawned {
            root,
            centred: false
        }
        .has_model());
        let state = ModelState::Spawned {
            root,
            centred: true,
        };
        assert!(state.has_model());
        assert_eq!(state.root(), Some(root));
    }
}
