//! Ambient loop, scene music and the positional swing squeak.
//!
//! The presentation core never touches audio entities. It records
//! [`MusicCommand`]s in [`MusicState`] and [`systems::apply_music_commands`]
//! turns them into spawned/paused/despawned players once per frame.

mod entities;
mod systems;

pub use entities::{AmbientSound, SceneMusic, SwingSqueak};

use bevy::prelude::*;

use crate::GameState;

/// Per-plugin configuration for sound.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct AudioConfig {
    /// Looping background ambience.
    pub ambient_path: String,
    /// Linear volume of the ambience.
    pub ambient_volume: f32,
    /// Scene music track.
    pub music_path: String,
    /// Linear volume of the music.
    pub music_volume: f32,
    /// Looping squeak emitted from the swing.
    pub squeak_path: String,
    /// Linear volume of the squeak.
    pub squeak_volume: f32,
    /// World position of the squeak emitter.
    pub squeak_position: Vec3,
    /// Distance between the listener's ears.
    pub listener_gap: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            ambient_path: "sounds/environment.mp3".into(),
            ambient_volume: 3.6,
            music_path: "sounds/music.mp3".into(),
            music_volume: 0.6,
            squeak_path: "sounds/swingsqueak.mp3".into(),
            squeak_volume: 1.45,
            squeak_position: Vec3::new(-7.2, 1.0, -4.2),
            listener_gap: 0.3,
        }
    }
}

/// Ambient and positional sound plus scene music playback.
pub struct SoundPlugin(pub AudioConfig);

impl Plugin for SoundPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<AudioConfig>()
            .register_type::<SceneMusic>()
            .insert_resource(self.0.clone())
            .add_systems(OnExit(GameState::Loading), systems::spawn_ambience)
            .add_systems(
                Update,
                systems::apply_music_commands.run_if(not(in_state(GameState::Loading))),
            );
    }
}

/// What the music player should do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MusicCommand {
    /// Start the track from the beginning, replacing any current playback.
    Start {
        /// Loop forever instead of playing once.
        looped: bool,
    },
    /// Pause without losing the position.
    Pause,
    /// Continue after a pause.
    Resume,
    /// Stop and forget the position.
    Stop,
}

/// Whether music is audible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MusicStatus {
    /// Nothing loaded into the player.
    #[default]
    Stopped,
    /// Audible.
    Playing,
    /// Holding its position.
    Paused,
}

/// Music status as seen by the presentation, plus unapplied commands.
#[derive(Clone, Debug, Default)]
pub struct MusicState {
    status: MusicStatus,
    commands: Vec<MusicCommand>,
}

impl MusicState {
    /// Current status.
    pub fn status(&self) -> MusicStatus {
        self.status
    }

    /// Play the track once from the start (tour soundtrack).
    pub fn play_once(&mut self) {
        self.status = MusicStatus::Playing;
        self.commands.push(MusicCommand::Start { looped: false });
    }

    /// Toolbar play/pause: start looping when stopped, otherwise flip pause.
    pub fn toggle(&mut self) -> MusicStatus {
        let (status, command) = match self.status {
            MusicStatus::Stopped => (MusicStatus::Playing, MusicCommand::Start { looped: true }),
            MusicStatus::Playing => (MusicStatus::Paused, MusicCommand::Pause),
            MusicStatus::Paused => (MusicStatus::Playing, MusicCommand::Resume),
        };
        self.status = status;
        self.commands.push(command);
        status
    }

    /// Stop playback. Always emits a command so stray players get cleaned up.
    pub fn stop(&mut self) {
        self.status = MusicStatus::Stopped;
        self.commands.push(MusicCommand::Stop);
    }

    /// The player ran out of track on its own.
    pub fn finished(&mut self) {
        if self.status == MusicStatus::Playing {
            self.status = MusicStatus::Stopped;
        }
    }

    /// `true` if commands are waiting to be applied.
    pub fn has_pending(&self) -> bool {
        !self.commands.is_empty()
    }

    /// Drain the pending commands in issue order.
    pub fn take_commands(&mut self) -> Vec<MusicCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Put commands that could not be applied yet back in front of the queue.
    pub fn defer(&mut self, commands: Vec<MusicCommand>) {
        let later = std::mem::replace(&mut self.commands, commands);
        self.commands.extend(later);
    }
}

/// The music player as found at the start of one pass of the audio glue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerPresence {
    /// No music entity.
    Absent,
    /// An entity exists but its sink is not attached yet.
    Spawning,
    /// The sink is attached and can be paused or resumed.
    Ready,
}

/// Entity-level step derived from a [`MusicCommand`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerAction {
    /// Despawn every live music entity.
    Despawn,
    /// Spawn a fresh player.
    Spawn {
        /// Loop forever instead of despawning at the end.
        looped: bool,
    },
    /// Pause the sink.
    Pause,
    /// Resume the sink.
    Resume,
}

/// Turns queued commands into player actions.
///
/// A player is despawned at most once per batch. `Pause`/`Resume` aimed at a
/// player whose sink is not attached yet are returned as deferred so they can
/// be retried next frame. Without any player they are dropped.
pub fn plan_music(
    commands: impl IntoIterator<Item = MusicCommand>,
    mut presence: PlayerPresence,
) -> (Vec<PlayerAction>, Vec<MusicCommand>) {
    let mut actions = Vec::new();
    let mut deferred = Vec::new();
    for command in commands {
        match command {
            MusicCommand::Start { looped } => {
                if presence != PlayerPresence::Absent {
                    actions.push(PlayerAction::Despawn);
                }
                actions.push(PlayerAction::Spawn { looped });
                presence = PlayerPresence::Spawning;
            }
            MusicCommand::Stop => {
                if presence != PlayerPresence::Absent {
                    actions.push(PlayerAction::Despawn);
                }
                presence = PlayerPresence::Absent;
            }
            MusicCommand::Pause | MusicCommand::Resume => match presence {
                PlayerPresence::Ready if deferred.is_empty() => actions.push(
                    if command == MusicCommand::Pause {
                        PlayerAction::Pause
                    } else {
                        PlayerAction::Resume
                    },
                ),
                PlayerPresence::Ready | PlayerPresence::Spawning => deferred.push(command),
                PlayerPresence::Absent => {}
            },
        }
    }
    (actions, deferred)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_cycles_start_pause_resume() {
        let mut music = MusicState::default();
        assert_eq!(music.toggle(), MusicStatus::Playing);
        assert_eq!(music.toggle(), MusicStatus::Paused);
        assert_eq!(music.toggle(), MusicStatus::Playing);
        assert_eq!(
            music.take_commands(),
            vec![
                MusicCommand::Start { looped: true },
                MusicCommand::Pause,
                MusicCommand::Resume
            ]
        );
        assert!(!music.has_pending());
    }

    #[test]
    fn stop_then_toggle_restarts_looped() {
        let mut music = MusicState::default();
        music.play_once();
        music.stop();
        music.toggle();
        assert_eq!(
            music.take_commands(),
            vec![
                MusicCommand::Start { looped: false },
                MusicCommand::Stop,
                MusicCommand::Start { looped: true }
            ]
        );
    }

    #[test]
    fn finished_only_affects_playing_music() {
        let mut music = MusicState::default();
        music.toggle();
        music.toggle();
        music.finished();
        assert_eq!(music.status(), MusicStatus::Paused);

        music.toggle();
        music.finished();
        assert_eq!(music.status(), MusicStatus::Stopped);
    }

    // ── player planning ─────────────────────────────────────────────

    #[test]
    fn stop_then_start_despawns_once() {
        let (actions, deferred) = plan_music(
            [MusicCommand::Stop, MusicCommand::Start { looped: false }],
            PlayerPresence::Ready,
        );
        assert_eq!(
            actions,
            vec![PlayerAction::Despawn, PlayerAction::Spawn { looped: false }]
        );
        assert!(deferred.is_empty());
    }

    #[test]
    fn pause_waits_for_the_sink() {
        let (actions, deferred) = plan_music(
            [MusicCommand::Start { looped: true }, MusicCommand::Pause],
            PlayerPresence::Absent,
        );
        assert_eq!(actions, vec![PlayerAction::Spawn { looped: true }]);
        assert_eq!(deferred, vec![MusicCommand::Pause]);

        let (actions, deferred) = plan_music(deferred, PlayerPresence::Spawning);
        assert!(actions.is_empty());
        assert_eq!(deferred, vec![MusicCommand::Pause]);

        let (actions, deferred) = plan_music(deferred, PlayerPresence::Ready);
        assert_eq!(actions, vec![PlayerAction::Pause]);
        assert!(deferred.is_empty());
    }

    #[test]
    fn pause_without_player_is_dropped() {
        let (actions, deferred) = plan_music([MusicCommand::Pause], PlayerPresence::Absent);
        assert!(actions.is_empty());
        assert!(deferred.is_empty());
    }

    #[test]
    fn deferred_commands_run_before_new_ones() {
        let mut music = MusicState::default();
        music.toggle();
        music.toggle();
        let mut taken = music.take_commands();
        let pause = taken.split_off(1);
        music.stop();
        music.defer(pause);
        assert_eq!(
            music.take_commands(),
            vec![MusicCommand::Pause, MusicCommand::Stop]
        );
    }
}
