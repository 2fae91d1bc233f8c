#![warn(missing_docs)]
//! Floating Playground viewer.
//!
//! Loads the playground scene, then presents it either as a scripted camera
//! tour or as a free orbit view with points of interest.

use bevy::app::AppExit;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, CursorOptions};
use bevy_inspector_egui::quick::WorldInspectorPlugin;

use floating_playground::GameState;
use floating_playground::audio::{AudioConfig, SoundPlugin};
use floating_playground::context::PresentationPlugin;
use floating_playground::scene::ScenePlugin;
use floating_playground::ui::UiPlugin;

#[cfg(feature = "native")]
mod cli {
    use clap::Parser;

    use floating_playground::context::PresentationSettings;
    use floating_playground::scene::SceneConfig;

    /// Command line overrides for the tuned presentation constants.
    #[derive(Parser, Debug)]
    #[command(name = "floating-playground", about = "Floating Playground viewer")]
    pub struct Cli {
        /// Length of one tour segment in milliseconds.
        #[arg(long)]
        pub segment_ms: Option<u64>,
        /// Overlap between consecutive segments in milliseconds.
        #[arg(long)]
        pub overlap_ms: Option<u64>,
        /// Show the menu after leaving explore instead of restarting the tour.
        #[arg(long)]
        pub no_rearm: bool,
        /// Playback speed of the scene's animation clips.
        #[arg(long)]
        pub animation_speed: Option<f32>,
        /// glTF scene path, relative to the asset folder.
        #[arg(long)]
        pub scene: Option<String>,
    }

    /// Defaults with the command line overrides applied.
    pub fn settings() -> (PresentationSettings, SceneConfig) {
        let mut presentation = PresentationSettings::default();
        let mut scene = SceneConfig::default();
        Cli::parse().apply(&mut presentation, &mut scene);
        (presentation, scene)
    }

    impl Cli {
        fn apply(&self, presentation: &mut PresentationSettings, scene: &mut SceneConfig) {
            if let Some(ms) = self.segment_ms {
                presentation.cinematic.segment_ms = ms;
            }
            if let Some(ms) = self.overlap_ms {
                presentation.cinematic.overlap_ms = ms;
            }
            if self.no_rearm {
                presentation.navigation.rearm_on_back = false;
            }
            if let Some(speed) = self.animation_speed {
                scene.animation_speed = speed;
            }
            if let Some(path) = &self.scene {
                scene.gltf_path = path.clone();
            }
        }
    }
}

fn main() {
    #[cfg(feature = "native")]
    let (presentation, scene) = cli::settings();
    #[cfg(not(feature = "native"))]
    let (presentation, scene) = (
        floating_playground::context::PresentationSettings::default(),
        floating_playground::scene::SceneConfig::default(),
    );

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Floating Playground".into(),
            ..default()
        }),
        ..default()
    }))
    .register_type::<GameState>()
    .init_state::<GameState>()
    .add_plugins(bevy_egui::EguiPlugin::default())
    .add_plugins(ScenePlugin(scene))
    .add_plugins(SoundPlugin(AudioConfig::default()))
    .add_plugins(PresentationPlugin(presentation))
    .add_plugins(UiPlugin)
    .add_systems(Update, exit_on_esc)
    .add_systems(Update, toggle_inspector)
    .add_plugins(WorldInspectorPlugin::new().run_if(in_state(GameState::Debugging)));

    app.run();
}

fn toggle_inspector(
    keys: Res<ButtonInput<KeyCode>>,
    state: Res<State<GameState>>,
    mut next: ResMut<NextState<GameState>>,
    mut cursors: Query<&mut CursorOptions>,
) {
    if !keys.just_pressed(KeyCode::Tab) {
        return;
    }
    let new_state = match state.get() {
        GameState::Presenting => GameState::Debugging,
        GameState::Debugging => GameState::Presenting,
        GameState::Loading => return,
    };
    next.set(new_state);
    for mut opts in &mut cursors {
        opts.visible = true;
        opts.grab_mode = CursorGrabMode::None;
    }
}

fn exit_on_esc(keys: Res<ButtonInput<KeyCode>>, mut exit: MessageWriter<AppExit>) {
    if keys.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }
}
