//! egui screens: loading progress, main menu, explore toolbar, the fade
//! overlay and POI markers.
//!
//! Widgets never mutate the presentation directly. They return [`UiAction`]s
//! which are applied to the [`SequencerContext`] after the frame's UI is built.

mod systems;

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

use crate::GameState;
use crate::context::SequencerContext;

/// Screens and overlays drawn with egui.
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            EguiPrimaryContextPass,
            systems::loading_screen.run_if(in_state(GameState::Loading)),
        )
        .add_systems(
            EguiPrimaryContextPass,
            (
                systems::fade_overlay,
                systems::poi_markers,
                systems::menu,
                systems::toolbar,
            )
                .chain()
                .run_if(not(in_state(GameState::Loading))),
        );
    }
}

/// A button press, applied after the UI pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiAction {
    /// Menu "Start".
    Engage,
    /// Menu "Explore".
    Explore,
    /// Explore toolbar "Back".
    Back,
    /// "Menu" while the tour runs.
    Menu,
    /// Explore toolbar "Hide"/"Show".
    TogglePoiHidden,
    /// Explore toolbar "Play"/"Pause".
    ToggleMusic,
    /// Explore toolbar "Stop".
    StopMusic,
    /// Explore toolbar "Reset view".
    ResetView,
    /// A POI marker was clicked.
    Focus(usize),
}

impl UiAction {
    /// Forward the press to the matching presentation operation.
    pub fn apply(self, ctx: &mut SequencerContext) {
        match self {
            UiAction::Engage => ctx.on_engage(),
            UiAction::Explore => ctx.on_explore(),
            UiAction::Back => ctx.on_back(),
            UiAction::Menu => ctx.on_menu(),
            UiAction::TogglePoiHidden => {
                ctx.toggle_poi_hidden();
            }
            UiAction::ToggleMusic => ctx.toggle_music(),
            UiAction::StopMusic => ctx.stop_music(),
            UiAction::ResetView => ctx.reset_view(),
            UiAction::Focus(index) => {
                ctx.on_point_of_interest_click(index);
            }
        }
    }
}
