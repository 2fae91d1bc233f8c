use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;

use super::SequencerContext;
use crate::orbit::OrbitInput;
use crate::scene::PresentationCamera;

/// Pixels per scroll "line" for touchpads reporting pixel deltas.
const PIXELS_PER_LINE: f32 = 40.0;

/// Loading is over: show the menu.
pub fn enter_presentation(mut ctx: ResMut<SequencerContext>) {
    ctx.on_enter_presentation();
}

/// Left-drag orbits, wheel zooms. Input over egui widgets is left to egui.
pub fn read_orbit_input(
    mut ctx: ResMut<SequencerContext>,
    buttons: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut mouse_wheel: MessageReader<MouseWheel>,
    mut contexts: EguiContexts,
) {
    let drag: Vec2 = mouse_motion.read().map(|ev| ev.delta).sum();
    let scroll: f32 = mouse_wheel
        .read()
        .map(|ev| match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y / PIXELS_PER_LINE,
        })
        .sum();

    if !ctx.accepts_orbit_input() {
        return;
    }
    if contexts
        .ctx_mut()
        .is_ok_and(|ui| ui.is_pointer_over_area() || ui.wants_pointer_input())
    {
        return;
    }
    let drag = if buttons.pressed(MouseButton::Left) {
        drag
    } else {
        Vec2::ZERO
    };
    ctx.push_orbit_input(OrbitInput { drag, scroll });
}

/// Advances the presentation by one frame.
pub fn tick_context(
    time: Res<Time>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut ctx: ResMut<SequencerContext>,
) {
    let viewport = windows
        .single()
        .map(|w| Vec2::new(w.width(), w.height()))
        .unwrap_or(Vec2::ZERO);
    ctx.tick(time.delta(), viewport);
}

/// Copies the context's camera pose onto the camera entity.
pub fn sync_camera(
    ctx: Res<SequencerContext>,
    mut cameras: Query<(&mut Transform, &mut Projection), With<PresentationCamera>>,
) {
    let Ok((mut transform, mut projection)) = cameras.single_mut() else {
        return;
    };
    let pose = ctx.camera();
    *transform = Transform::from_translation(pose.position).looking_at(pose.look_at, Vec3::Y);

    if let Projection::Perspective(perspective) = projection.as_mut() {
        perspective.fov = pose.fov_degrees.to_radians();
        perspective.near = pose.near;
    }
}
