use bevy::prelude::*;

/// Marker for the looping background ambience.
#[derive(Component)]
pub struct AmbientSound;

/// Marker for the scene music player. At most one exists at a time.
#[derive(Component, Reflect)]
pub struct SceneMusic;

/// Marker for the positional squeak emitter on the swing.
#[derive(Component)]
pub struct SwingSqueak;
