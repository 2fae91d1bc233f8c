//! Scene assets: loading with progress, manifest validation, and the camera,
//! lights, glTF scene and animation clips that make up the playground.
//!
//! Nothing here is required for the presentation schedule to run. A failed
//! load is logged, recorded in [`LoadReport`] and the app carries on without
//! that asset.

mod entities;
mod systems;

pub use entities::{PlaygroundScene, PresentationCamera, SceneAnimations};

use bevy::gltf::Gltf;
use bevy::prelude::*;
use thiserror::Error;

use crate::GameState;
use crate::math;

/// Asset problems found while loading. None of them is fatal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssetLoadError {
    /// The asset server gave up on a file.
    #[error("failed to load {path}: {reason}")]
    Failed {
        /// Asset path as requested.
        path: String,
        /// Loader message.
        reason: String,
    },
    /// The glTF has no node with the name the manifest expects.
    #[error("scene has no node {name:?} for role {role}")]
    MissingNode {
        /// What the node is used for.
        role: String,
        /// Expected glTF node name.
        name: String,
    },
}

/// One named node the presentation relies on.
#[derive(Clone, Debug, PartialEq, Eq, Reflect)]
pub struct ManifestEntry {
    /// What the node is used for.
    pub role: String,
    /// glTF node name.
    pub node: String,
}

/// Roles → glTF node names, checked against the loaded scene.
#[derive(Clone, Debug, Default, PartialEq, Eq, Reflect)]
pub struct SceneManifest {
    /// Expected nodes.
    pub entries: Vec<ManifestEntry>,
}

impl SceneManifest {
    /// Build from `(role, node)` pairs.
    pub fn new<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            entries: pairs
                .into_iter()
                .map(|(role, node)| ManifestEntry {
                    role: role.into(),
                    node: node.into(),
                })
                .collect(),
        }
    }

    /// The playground's ground island and its foliage groups.
    pub fn default_roles() -> Self {
        Self::new([
            ("floating ground", "Floating_Ground001"),
            ("tree leaves", "TreeLeaves"),
            ("grass", "GrassStylized1001"),
            ("bushes", "Bushes"),
        ])
    }

    /// One [`AssetLoadError::MissingNode`] per entry absent from `names`.
    pub fn validate<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Vec<AssetLoadError> {
        let names: Vec<&str> = names.into_iter().collect();
        self.entries
            .iter()
            .filter(|entry| !names.contains(&entry.node.as_str()))
            .map(|entry| AssetLoadError::MissingNode {
                role: entry.role.clone(),
                name: entry.node.clone(),
            })
            .collect()
    }
}

/// Per-plugin configuration for the scene.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct SceneConfig {
    /// glTF file with the playground scene and its animation clips.
    pub gltf_path: String,
    /// Playback speed of every animation clip.
    pub animation_speed: f32,
    /// Nodes the presentation expects in the glTF.
    pub manifest: SceneManifest,
    /// Background color.
    pub clear_color: Color,
    /// Sun color.
    pub sun_color: Color,
    /// Sun illuminance (lux).
    pub sun_illuminance: f32,
    /// Sun position; it shines towards the origin.
    pub sun_position: Vec3,
    /// Soft fill light color, standing in for ambient light.
    pub fill_color: Color,
    /// Fill illuminance (lux).
    pub fill_illuminance: f32,
    /// Bloom post-processing intensity.
    pub bloom_intensity: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            gltf_path: "Floating-Playground/playground.glb".into(),
            animation_speed: 0.6,
            manifest: SceneManifest::default_roles(),
            clear_color: Color::srgb(0.93, 0.82, 0.86),
            sun_color: Color::srgb_u8(0xFF, 0xF8, 0xB4),
            sun_illuminance: 6_000.0,
            sun_position: Vec3::new(-60.0, 100.0, 100.0),
            fill_color: Color::srgb_u8(0xFF, 0xDC, 0xED),
            fill_illuminance: 2_500.0,
            bloom_intensity: 0.11,
        }
    }
}

/// Handles of everything loaded at startup.
#[derive(Resource, Clone, Debug)]
pub struct SceneAssets {
    /// The playground glTF.
    pub gltf: Handle<Gltf>,
    /// Background ambience.
    pub ambient: Handle<AudioSource>,
    /// Scene music.
    pub music: Handle<AudioSource>,
    /// Swing squeak.
    pub squeak: Handle<AudioSource>,
    tracked: Vec<(String, UntypedHandle)>,
}

impl SceneAssets {
    /// Every tracked asset with the path it was requested by.
    pub fn tracked(&self) -> impl Iterator<Item = (&str, &UntypedHandle)> {
        self.tracked.iter().map(|(path, handle)| (path.as_str(), handle))
    }
}

#[derive(Clone, Debug)]
struct Tracked {
    path: String,
    settled: bool,
}

/// Loading progress and every non-fatal problem found along the way.
#[derive(Resource, Clone, Debug, Default)]
pub struct LoadReport {
    tracked: Vec<Tracked>,
    failures: Vec<AssetLoadError>,
    manifest_checked: bool,
}

impl LoadReport {
    /// Start tracking `path`.
    pub fn track(&mut self, path: impl Into<String>) {
        self.tracked.push(Tracked {
            path: path.into(),
            settled: false,
        });
    }

    /// `path` finished loading. Repeated calls are ignored.
    pub fn settle_loaded(&mut self, path: &str) {
        if let Some(t) = self.pending_mut(path) {
            t.settled = true;
            debug!("loaded {path}");
        }
    }

    /// `path` failed to load. Repeated calls are ignored.
    pub fn settle_failed(&mut self, path: &str, reason: impl Into<String>) {
        let Some(t) = self.pending_mut(path) else {
            return;
        };
        t.settled = true;
        self.record(AssetLoadError::Failed {
            path: path.into(),
            reason: reason.into(),
        });
    }

    /// Log and keep a problem.
    pub fn record(&mut self, err: AssetLoadError) {
        warn!("{err}");
        self.failures.push(err);
    }

    fn pending_mut(&mut self, path: &str) -> Option<&mut Tracked> {
        self.tracked
            .iter_mut()
            .find(|t| t.path == path && !t.settled)
    }

    /// Whole-percent share of settled loads.
    pub fn progress(&self) -> u32 {
        let settled = self.tracked.iter().filter(|t| t.settled).count();
        math::progress_percent(settled, self.tracked.len())
    }

    /// `true` once every tracked load succeeded or failed.
    pub fn is_complete(&self) -> bool {
        self.tracked.iter().all(|t| t.settled)
    }

    /// `true` if `path` failed to load.
    pub fn has_failed(&self, path: &str) -> bool {
        self.failures
            .iter()
            .any(|e| matches!(e, AssetLoadError::Failed { path: p, .. } if p == path))
    }

    /// Problems found so far.
    pub fn failures(&self) -> &[AssetLoadError] {
        &self.failures
    }

    /// Whether the manifest was validated against the loaded scene.
    pub fn manifest_checked(&self) -> bool {
        self.manifest_checked
    }

    fn mark_manifest_checked(&mut self) {
        self.manifest_checked = true;
    }
}

/// Loads the playground, lights it and plays its animation clips.
pub struct ScenePlugin(pub SceneConfig);

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<SceneConfig>()
            .register_type::<PresentationCamera>()
            .register_type::<PlaygroundScene>()
            .insert_resource(self.0.clone())
            .insert_resource(ClearColor(self.0.clear_color))
            .init_resource::<LoadReport>()
            .add_systems(
                Startup,
                (
                    systems::load_assets,
                    systems::spawn_camera,
                    systems::spawn_lights,
                ),
            )
            .add_systems(
                Update,
                systems::track_loading.run_if(in_state(GameState::Loading)),
            )
            .add_systems(OnExit(GameState::Loading), systems::spawn_scene)
            .add_systems(Update, systems::start_animations);
    }
}
