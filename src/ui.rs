/*
 * UI Module
 *
 * This module contains the egui control panel for the viewer and the small
 * statistics overlay drawn on top of the scene. The panel mirrors the
 * keyboard toggles so the debug lines can be switched with the mouse too.
 */

use nannou_egui::{egui, Egui};

use crate::camera::ZoomState;
use crate::debug::{DebugConfig, DebugInfo};
use crate::params::{FlockParams, NeighborSearch};

// What the user asked for during this frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UiResponse {
    pub config_changed: bool,
    pub respawn: bool,
}

// Update the UI and report config changes and respawn requests
pub fn update_ui(
    egui: &mut Egui,
    config: &mut DebugConfig,
    flock: &mut FlockParams,
    simulation_running: &mut bool,
    debug_info: &DebugInfo,
    zoom: ZoomState,
) -> UiResponse {
    let before = *config;
    let mut respawn = false;

    let ctx = egui.begin_frame();

    egui::Window::new("Flock Controls")
        .default_pos([10.0, 10.0])
        .show(&ctx, |ui| {
            ui.collapsing("Debug Lines", |ui| {
                ui.checkbox(&mut config.show_force_line, "Force (Y)");
                ui.checkbox(&mut config.show_repel_line, "Repel (U)");
                ui.checkbox(&mut config.show_attract_line, "Attract (I)");
                ui.checkbox(&mut config.show_follow_line, "Follow (O)");
                ui.checkbox(&mut config.show_friend_lines, "Friends (P)");
                ui.checkbox(&mut config.show_axis, "Axis (B)");
            });

            ui.collapsing("Camera", |ui| {
                ui.label("Look: hold the left mouse button and move");
                ui.label("Zoom: Z, fullscreen: F");
                ui.label(format!("Zoom state: {:?}", zoom));
            });

            ui.collapsing("Flock", |ui| {
                ui.add(egui::Slider::new(&mut flock.num_boids, FlockParams::get_num_boids_range()).text("Number of Boids"));
                ui.add(egui::Slider::new(&mut flock.spawn_min, FlockParams::get_spawn_range()).text("Spawn Min"));
                ui.add(egui::Slider::new(&mut flock.spawn_max, FlockParams::get_spawn_range()).text("Spawn Max"));

                let mut use_grid = matches!(flock.neighbor_search, NeighborSearch::Grid { .. });
                if ui.checkbox(&mut use_grid, "Spatial Grid").changed() {
                    flock.neighbor_search = if use_grid {
                        NeighborSearch::Grid { cell_size: 1.0 }
                    } else {
                        NeighborSearch::BruteForce
                    };
                }
                ui.checkbox(&mut flock.enable_parallel, "Parallel Update");

                if ui.button("Respawn Flock").clicked() {
                    respawn = true;
                }

                ui.separator();
                ui.label(format!("Boids: {}", debug_info.boid_count));
                ui.label(format!("Returning: {}", debug_info.returning_count));
                ui.label(format!("Mean friends: {:.2}", debug_info.mean_friends));
                ui.label(format!("Tick: {}", debug_info.tick));
            });

            ui.checkbox(simulation_running, "Run Simulation");
        });

    UiResponse {
        config_changed: *config != before,
        respawn,
    }
}

// Draw debug information on the screen
pub fn draw_debug_info(draw: &nannou::Draw, debug_info: &DebugInfo, window_rect: nannou::geom::Rect) {
    let margin = 20.0;
    let line_height = 20.0;
    let panel_width = 200.0;
    let panel_height = line_height * 4.0 + margin;
    let panel_x = window_rect.right() - panel_width / 2.0;
    let panel_y = window_rect.top() - panel_height / 2.0;

    draw.rect()
        .x_y(panel_x, panel_y)
        .w_h(panel_width, panel_height)
        .color(nannou::color::rgba(0.0, 0.0, 0.0, 0.7));

    let text_x = window_rect.right() - panel_width + margin;
    let text_y = window_rect.top() - margin;

    let debug_texts = [
        format!("FPS: {:.1}", debug_info.fps),
        format!("Frame time: {:.2} ms", debug_info.frame_time.as_secs_f64() * 1000.0),
        format!("Boids: {}", debug_info.boid_count),
        format!("Returning: {}", debug_info.returning_count),
    ];

    for (i, text) in debug_texts.iter().enumerate() {
        let y = text_y - (i as f32 * line_height);

        draw.text(text)
            .x_y(text_x + 70.0, y)
            .color(nannou::color::WHITE)
            .font_size(14);
    }
}
