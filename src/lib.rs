#![warn(missing_docs)]
//! Floating Playground: an interactive presentation of one 3D scene.
//!
//! A scripted cinematic tour of camera waypoints with fade-masked cuts, a
//! free orbit "explore" mode with clickable points of interest, and the menu
//! that switches between them.
//!
//! The presentation core ([`scheduler`], [`tween`], [`fade`], [`cinematic`],
//! [`orbit`], [`poi`], [`navigation`]) is plain data owned by
//! [`context::SequencerContext`]. Bevy systems only feed it input and time and
//! copy the resulting camera pose back onto the camera entity.

pub mod audio;
pub mod cinematic;
pub mod context;
pub mod fade;
pub mod math;
pub mod navigation;
pub mod orbit;
pub mod poi;
pub mod scene;
pub mod scheduler;
pub mod tween;
pub mod ui;

use bevy::prelude::*;

/// Application-wide state, used for system scheduling.
#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash, Reflect)]
pub enum GameState {
    /// Assets are loading; the loading screen is up.
    #[default]
    Loading,
    /// The presentation runs (menu, tour or explore).
    Presenting,
    /// Debug inspector active (Tab to toggle).
    Debugging,
}
