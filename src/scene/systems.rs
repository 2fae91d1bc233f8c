use bevy::asset::LoadState;
use bevy::audio::SpatialListener;
use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::gltf::Gltf;
use bevy::post_process::bloom::{Bloom, BloomCompositeMode};
use bevy::prelude::*;
use bevy::render::view::Hdr;

use super::entities::{PlaygroundScene, PresentationCamera, SceneAnimations};
use super::{LoadReport, SceneAssets, SceneConfig};
use crate::audio::AudioConfig;
use crate::navigation::NavigationConfig;

/// Requests every asset and starts tracking it in [`LoadReport`].
pub fn load_assets(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    cfg: Res<SceneConfig>,
    audio: Res<AudioConfig>,
    mut report: ResMut<LoadReport>,
) {
    let gltf: Handle<Gltf> = asset_server.load(cfg.gltf_path.clone());
    let ambient: Handle<AudioSource> = asset_server.load(audio.ambient_path.clone());
    let music: Handle<AudioSource> = asset_server.load(audio.music_path.clone());
    let squeak: Handle<AudioSource> = asset_server.load(audio.squeak_path.clone());

    let tracked = vec![
        (cfg.gltf_path.clone(), gltf.clone().untyped()),
        (audio.ambient_path.clone(), ambient.clone().untyped()),
        (audio.music_path.clone(), music.clone().untyped()),
        (audio.squeak_path.clone(), squeak.clone().untyped()),
    ];
    for (path, _) in &tracked {
        report.track(path.clone());
    }
    commands.insert_resource(SceneAssets {
        gltf,
        ambient,
        music,
        squeak,
        tracked,
    });
}

/// Settles finished loads and, once everything settled, checks the manifest.
pub fn track_loading(
    asset_server: Res<AssetServer>,
    assets: Option<Res<SceneAssets>>,
    gltfs: Res<Assets<Gltf>>,
    cfg: Res<SceneConfig>,
    mut report: ResMut<LoadReport>,
) {
    let Some(assets) = assets else { return };
    for (path, handle) in assets.tracked() {
        match asset_server.get_load_state(handle.id()) {
            Some(LoadState::Loaded) => report.settle_loaded(path),
            Some(LoadState::Failed(err)) => report.settle_failed(path, err.to_string()),
            _ => {}
        }
    }

    if !report.is_complete() || report.manifest_checked() {
        return;
    }
    if let Some(gltf) = gltfs.get(&assets.gltf) {
        let missing = cfg
            .manifest
            .validate(gltf.named_nodes.keys().map(|name| name.as_ref()));
        for err in missing {
            report.record(err);
        }
    }
    report.mark_manifest_checked();
    info!(
        "loading settled with {} problem(s)",
        report.failures().len()
    );
}

/// Spawns the HDR camera with bloom, tonemapping and the audio listener.
pub fn spawn_camera(
    mut commands: Commands,
    cfg: Res<SceneConfig>,
    nav: Res<NavigationConfig>,
    audio: Res<AudioConfig>,
) {
    commands.spawn((
        Name::new("Camera"),
        Camera3d::default(),
        Hdr,
        Tonemapping::TonyMcMapface,
        Bloom {
            intensity: cfg.bloom_intensity,
            composite_mode: BloomCompositeMode::Additive,
            ..Bloom::NATURAL
        },
        Projection::Perspective(PerspectiveProjection {
            fov: nav.fov_degrees.to_radians(),
            near: nav.near,
            far: nav.far,
            ..default()
        }),
        Transform::from_translation(nav.explore_vantage).looking_at(Vec3::ZERO, Vec3::Y),
        SpatialListener::new(audio.listener_gap),
        PresentationCamera,
    ));
}

/// Warm sun plus a pink fill from the opposite side.
pub fn spawn_lights(mut commands: Commands, cfg: Res<SceneConfig>) {
    commands.spawn((
        Name::new("Sun"),
        DirectionalLight {
            color: cfg.sun_color,
            illuminance: cfg.sun_illuminance,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_translation(cfg.sun_position).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.spawn((
        Name::new("Fill"),
        DirectionalLight {
            color: cfg.fill_color,
            illuminance: cfg.fill_illuminance,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_translation(-cfg.sun_position).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

/// Spawns the playground scene and builds the graph for its clips.
pub fn spawn_scene(
    mut commands: Commands,
    assets: Res<SceneAssets>,
    gltfs: Res<Assets<Gltf>>,
    mut graphs: ResMut<Assets<AnimationGraph>>,
) {
    let Some(gltf) = gltfs.get(&assets.gltf) else {
        warn!("playground scene unavailable, presenting without it");
        return;
    };
    let Some(scene) = gltf
        .default_scene
        .clone()
        .or_else(|| gltf.scenes.first().cloned())
    else {
        warn!("playground glTF contains no scene");
        return;
    };

    let (graph, nodes) = AnimationGraph::from_clips(gltf.animations.iter().cloned());
    info!("playground spawned with {} animation clips", nodes.len());
    commands.insert_resource(SceneAnimations {
        graph: graphs.add(graph),
        nodes,
    });
    commands.spawn((Name::new("Playground"), PlaygroundScene, SceneRoot(scene)));
}

/// Plays every clip, looping, on each animation player the scene spawns.
pub fn start_animations(
    mut commands: Commands,
    cfg: Res<SceneConfig>,
    animations: Option<Res<SceneAnimations>>,
    mut players: Query<(Entity, &mut AnimationPlayer), Added<AnimationPlayer>>,
) {
    let Some(animations) = animations else { return };
    for (entity, mut player) in &mut players {
        for &node in &animations.nodes {
            player.play(node).set_speed(cfg.animation_speed).repeat();
        }
        commands
            .entity(entity)
            .insert(AnimationGraphHandle(animations.graph.clone()));
    }
}
