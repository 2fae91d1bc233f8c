use bevy::prelude::*;

/// Marker for the one camera the presentation drives.
#[derive(Component, Reflect)]
pub struct PresentationCamera;

/// Marker for the spawned playground scene root.
#[derive(Component, Reflect)]
pub struct PlaygroundScene;

/// Animation graph built from every clip in the playground glTF.
#[derive(Resource)]
pub struct SceneAnimations {
    /// Graph holding one node per clip.
    pub graph: Handle<AnimationGraph>,
    /// Node of each clip, in glTF order.
    pub nodes: Vec<AnimationNodeIndex>,
}
