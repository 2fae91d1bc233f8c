use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::{EguiContexts, egui};

use super::UiAction;
use crate::GameState;
use crate::audio::MusicStatus;
use crate::context::SequencerContext;
use crate::fade::FadeConfig;
use crate::navigation::NavMode;
use crate::poi::PoiConfig;
use crate::scene::LoadReport;

const TITLE: &str = "Floating Playground";

fn color32(color: Color, opacity: f32) -> egui::Color32 {
    let c = color.to_srgba();
    let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    egui::Color32::from_rgba_unmultiplied(
        byte(c.red),
        byte(c.green),
        byte(c.blue),
        byte(c.alpha * opacity),
    )
}

/// Progress while assets load, then the "Engage" button.
pub fn loading_screen(
    mut contexts: EguiContexts,
    report: Res<LoadReport>,
    mut next: ResMut<NextState<GameState>>,
) {
    let Ok(ui_ctx) = contexts.ctx_mut() else {
        return;
    };
    egui::CentralPanel::default().show(ui_ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(160.0);
            ui.heading(TITLE);
            ui.add_space(12.0);
            ui.label(format!("{}%", report.progress()));
            if !report.failures().is_empty() {
                ui.small(format!("{} asset problem(s), see log", report.failures().len()));
            }
            if report.is_complete() && report.manifest_checked() {
                ui.add_space(12.0);
                if ui.button("Engage").clicked() {
                    next.set(GameState::Presenting);
                }
            } else {
                ui.spinner();
            }
        });
    });
}

/// Full-screen fade masking cinematic cuts.
pub fn fade_overlay(
    mut contexts: EguiContexts,
    ctx: Res<SequencerContext>,
    cfg: Res<FadeConfig>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    let opacity = ctx.fade().opacity();
    if opacity <= 0.0 {
        return;
    }
    let Ok(window) = windows.single() else {
        return;
    };
    let Ok(ui_ctx) = contexts.ctx_mut() else {
        return;
    };
    let screen = egui::Rect::from_min_size(
        egui::Pos2::ZERO,
        egui::vec2(window.width(), window.height()),
    );
    ui_ctx
        .layer_painter(egui::LayerId::background())
        .rect_filled(screen, 0.0, color32(cfg.color, opacity));
}

/// Clickable markers over visible points of interest.
pub fn poi_markers(
    mut contexts: EguiContexts,
    mut ctx: ResMut<SequencerContext>,
    cfg: Res<PoiConfig>,
) {
    if ctx.mode() != NavMode::Explore {
        return;
    }
    let Ok(ui_ctx) = contexts.ctx_mut() else {
        return;
    };
    let radius = cfg.marker_radius;
    let mut clicked = None;
    for (index, marker) in ctx.poi().markers().iter().enumerate() {
        if !marker.visible {
            continue;
        }
        egui::Area::new(egui::Id::new(("poi_marker", index)))
            .fixed_pos(egui::pos2(marker.anchor.x - radius, marker.anchor.y - radius))
            .order(egui::Order::Middle)
            .show(ui_ctx, |ui| {
                let (rect, response) =
                    ui.allocate_exact_size(egui::vec2(radius * 2.0, radius * 2.0), egui::Sense::click());
                let fill = if response.hovered() {
                    egui::Color32::WHITE
                } else {
                    egui::Color32::from_white_alpha(200)
                };
                let painter = ui.painter();
                painter.circle_filled(rect.center(), radius, fill);
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    (index + 1).to_string(),
                    egui::FontId::proportional(radius),
                    egui::Color32::BLACK,
                );
                if response.clicked() {
                    clicked = Some(index);
                }
            });
    }
    if let Some(index) = clicked {
        UiAction::Focus(index).apply(&mut ctx);
    }
}

/// Start / Explore menu.
pub fn menu(mut contexts: EguiContexts, mut ctx: ResMut<SequencerContext>) {
    if !ctx.menu_visible() {
        return;
    }
    let Ok(ui_ctx) = contexts.ctx_mut() else {
        return;
    };
    let mut action = None;
    egui::Window::new("main_menu")
        .title_bar(false)
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .show(ui_ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading(TITLE);
                ui.add_space(8.0);
                if ui.button("Start").clicked() {
                    action = Some(UiAction::Engage);
                }
                if ui.button("Explore").clicked() {
                    action = Some(UiAction::Explore);
                }
            });
        });
    if let Some(action) = action {
        action.apply(&mut ctx);
    }
}

/// "Menu" during the tour, the explore toolbar in explore mode.
pub fn toolbar(mut contexts: EguiContexts, mut ctx: ResMut<SequencerContext>) {
    if ctx.menu_visible() || ctx.mode() == NavMode::Menu {
        return;
    }
    let Ok(ui_ctx) = contexts.ctx_mut() else {
        return;
    };
    let exploring = ctx.mode() == NavMode::Explore;
    let hidden = ctx.poi().is_hidden();
    let music = ctx.music().status();
    let mut action = None;

    egui::Window::new("toolbar")
        .title_bar(false)
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -16.0))
        .show(ui_ctx, |ui| {
            ui.horizontal(|ui| {
                if !exploring {
                    if ui.button("Menu").clicked() {
                        action = Some(UiAction::Menu);
                    }
                    return;
                }
                if ui.button("Back").clicked() {
                    action = Some(UiAction::Back);
                }
                if ui.button(if hidden { "Show" } else { "Hide" }).clicked() {
                    action = Some(UiAction::TogglePoiHidden);
                }
                let play_label = if music == MusicStatus::Playing {
                    "Pause"
                } else {
                    "Play"
                };
                if ui.button(play_label).clicked() {
                    action = Some(UiAction::ToggleMusic);
                }
                if ui.button("Stop").clicked() {
                    action = Some(UiAction::StopMusic);
                }
                if ui.button("Reset view").clicked() {
                    action = Some(UiAction::ResetView);
                }
            });
        });
    if let Some(action) = action {
        action.apply(&mut ctx);
    }
}
