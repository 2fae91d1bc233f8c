use bevy::audio::Volume;
use bevy::prelude::*;

use super::entities::{AmbientSound, SceneMusic, SwingSqueak};
use super::{AudioConfig, PlayerAction, PlayerPresence, plan_music};
use crate::context::SequencerContext;
use crate::scene::{LoadReport, SceneAssets};

/// Starts the ambience and the swing squeak once loading is over.
pub fn spawn_ambience(
    mut commands: Commands,
    cfg: Res<AudioConfig>,
    assets: Res<SceneAssets>,
    report: Res<LoadReport>,
) {
    if report.has_failed(&cfg.ambient_path) {
        warn!("ambience unavailable, continuing without it");
    } else {
        commands.spawn((
            Name::new("Ambience"),
            AmbientSound,
            AudioPlayer::new(assets.ambient.clone()),
            PlaybackSettings::LOOP.with_volume(Volume::Linear(cfg.ambient_volume)),
        ));
    }

    if report.has_failed(&cfg.squeak_path) {
        warn!("swing squeak unavailable, continuing without it");
    } else {
        commands.spawn((
            Name::new("Swing squeak"),
            SwingSqueak,
            AudioPlayer::new(assets.squeak.clone()),
            PlaybackSettings::LOOP
                .with_volume(Volume::Linear(cfg.squeak_volume))
                .with_spatial(true),
            Transform::from_translation(cfg.squeak_position),
        ));
    }
}

/// Applies queued [`MusicCommand`]s and notices when a one-shot track ends.
pub fn apply_music_commands(
    mut commands: Commands,
    mut ctx: ResMut<SequencerContext>,
    cfg: Res<AudioConfig>,
    assets: Res<SceneAssets>,
    report: Res<LoadReport>,
    players: Query<(Entity, Option<&AudioSink>), With<SceneMusic>>,
) {
    if !ctx.music().has_pending() {
        if players.is_empty() {
            ctx.music_mut().finished();
        }
        return;
    }

    let presence = if players.is_empty() {
        PlayerPresence::Absent
    } else if players.iter().any(|(_, sink)| sink.is_some()) {
        PlayerPresence::Ready
    } else {
        PlayerPresence::Spawning
    };
    let (actions, deferred) = plan_music(ctx.music_mut().take_commands(), presence);
    ctx.music_mut().defer(deferred);

    let mut live: Vec<Entity> = players.iter().map(|(entity, _)| entity).collect();
    for action in actions {
        match action {
            PlayerAction::Despawn => {
                for entity in live.drain(..) {
                    commands.entity(entity).despawn();
                }
            }
            PlayerAction::Spawn { looped } => {
                if report.has_failed(&cfg.music_path) {
                    warn!("scene music unavailable");
                    continue;
                }
                let settings = if looped {
                    PlaybackSettings::LOOP
                } else {
                    PlaybackSettings::DESPAWN
                };
                let entity = commands
                    .spawn((
                        Name::new("Scene music"),
                        SceneMusic,
                        AudioPlayer::new(assets.music.clone()),
                        settings.with_volume(Volume::Linear(cfg.music_volume)),
                    ))
                    .id();
                live.push(entity);
            }
            PlayerAction::Pause => {
                for sink in players.iter().filter_map(|(_, sink)| sink) {
                    sink.pause();
                }
            }
            PlayerAction::Resume => {
                for sink in players.iter().filter_map(|(_, sink)| sink) {
                    sink.play();
                }
            }
        }
    }
}
