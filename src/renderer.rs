/*
 * Renderer Module
 *
 * This module handles the rendering of the flock. Every boid is projected
 * through the first-person camera and drawn as a dot with a short heading
 * line. The debug lines enabled in DebugConfig are drawn on top:
 * - force: the summed steering force (white)
 * - repel: the separation force (red)
 * - attract: the pull towards the friends' center (green)
 * - follow: the velocity matching force (blue)
 * - friends: lines to the first few friends of each boid
 *
 * Forces are tiny next to the flock's size, so they are scaled up for display.
 */

use nannou::color::Rgba;
use nannou::prelude::*;
use tracing::warn;

use crate::app::Model;
use crate::boid::{Boid, BoidState};
use crate::camera::Camera;
use crate::debug::DebugConfig;
use crate::ui;
use crate::world::World;
use crate::{BOID_SIZE, FLOOR_SIZE};

const FORCE_LINE_SCALE: f32 = 100.0;
const HEADING_LINE_LENGTH: f32 = 0.5;
const MAX_FRIEND_LINES: usize = 10;
const AXIS_LENGTH: f32 = 5.0;
const FLOOR_HEIGHT: f32 = -0.5;
const FLOOR_DIVISIONS: usize = 10;

// Render the model
pub fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    draw.background().color(BLACK);

    let window_rect = app.window_rect();
    let viewport = glam::Vec2::new(window_rect.w(), window_rect.h());

    let camera_controller = model.camera.borrow();
    let camera = camera_controller.camera();
    let painter = Painter {
        draw: &draw,
        camera,
        viewport,
    };

    painter.floor();
    if model.config.show_axis {
        painter.axes();
    }

    for boid in model.world.boids() {
        painter.boid(boid);
        painter.debug_lines(boid, &model.world, &model.config);
    }

    ui::draw_debug_info(&draw, &model.debug_info, window_rect);

    if let Err(err) = draw.to_frame(app, &frame) {
        warn!(?err, "failed to draw the scene");
    }
    if let Err(err) = model.egui.draw_to_frame(&frame) {
        warn!(?err, "failed to draw the ui");
    }
}

struct Painter<'a> {
    draw: &'a Draw,
    camera: &'a Camera,
    viewport: glam::Vec2,
}

impl Painter<'_> {
    fn project(&self, point: glam::Vec3) -> Option<Point2> {
        self.camera
            .project(point, self.viewport)
            .map(|screen| pt2(screen.x, screen.y))
    }

    // Line between two world points, skipped when either end is off camera
    fn line(&self, from: glam::Vec3, to: glam::Vec3, color: Rgba, weight: f32) {
        if let (Some(start), Some(end)) = (self.project(from), self.project(to)) {
            self.draw.line().start(start).end(end).weight(weight).color(color);
        }
    }

    fn boid(&self, boid: &Boid) {
        let position = boid.position();
        let Some(center) = self.project(position) else {
            return;
        };

        // Size on screen follows the perspective of a BOID_SIZE offset
        let radius = self
            .project(position + self.camera.rotation() * glam::Vec3::Y * BOID_SIZE)
            .map(|edge| edge.distance(center))
            .unwrap_or(1.0)
            .max(1.0);

        let color = match boid.state() {
            BoidState::Flocking => rgba(0.95, 0.95, 0.95, 1.0),
            BoidState::Returning => rgba(1.0, 0.6, 0.2, 1.0),
        };

        self.draw.ellipse().xy(center).radius(radius).color(color);
        self.line(
            position,
            position + boid.direction() * HEADING_LINE_LENGTH,
            color,
            1.0,
        );
    }

    fn debug_lines(&self, boid: &Boid, world: &World, config: &DebugConfig) {
        let position = boid.position();

        if config.show_force_line {
            let force = boid.force_to_center() + boid.force_away() + boid.force_to_match_velocity();
            self.line(position, position + force * FORCE_LINE_SCALE, rgba(1.0, 1.0, 1.0, 0.8), 1.0);
        }
        if config.show_repel_line {
            self.line(
                position,
                position + boid.force_away() * FORCE_LINE_SCALE,
                rgba(1.0, 0.2, 0.2, 0.8),
                1.0,
            );
        }
        if config.show_attract_line {
            self.line(
                position,
                position + boid.force_to_center() * FORCE_LINE_SCALE,
                rgba(0.2, 1.0, 0.2, 0.8),
                1.0,
            );
        }
        if config.show_follow_line {
            self.line(
                position,
                position + boid.force_to_match_velocity() * FORCE_LINE_SCALE,
                rgba(0.3, 0.5, 1.0, 0.8),
                1.0,
            );
        }
        if config.show_friend_lines {
            for friend in boid
                .friends()
                .iter()
                .take(MAX_FRIEND_LINES)
                .filter_map(|tag| world.get_boid(*tag))
            {
                self.line(position, friend.position(), rgba(1.0, 1.0, 0.3, 0.4), 1.0);
            }
        }
    }

    fn axes(&self) {
        let origin = glam::Vec3::ZERO;
        self.line(origin, glam::Vec3::X * AXIS_LENGTH, rgba(1.0, 0.0, 0.0, 1.0), 2.0);
        self.line(origin, glam::Vec3::Y * AXIS_LENGTH, rgba(0.0, 1.0, 0.0, 1.0), 2.0);
        self.line(origin, glam::Vec3::Z * AXIS_LENGTH, rgba(0.0, 0.0, 1.0, 1.0), 2.0);
    }

    // Grid lines are split into segments so the part behind the camera
    // does not hide the rest
    fn floor(&self) {
        let half = FLOOR_SIZE / 2.0;
        let step = FLOOR_SIZE / FLOOR_DIVISIONS as f32;
        let color = rgba(0.2, 0.25, 0.35, 1.0);

        for i in 0..=FLOOR_DIVISIONS {
            let offset = -half + i as f32 * step;
            for j in 0..FLOOR_DIVISIONS {
                let from = -half + j as f32 * step;
                let to = from + step;
                self.line(
                    glam::Vec3::new(offset, FLOOR_HEIGHT, from),
                    glam::Vec3::new(offset, FLOOR_HEIGHT, to),
                    color,
                    1.0,
                );
                self.line(
                    glam::Vec3::new(from, FLOOR_HEIGHT, offset),
                    glam::Vec3::new(to, FLOOR_HEIGHT, offset),
                    color,
                    1.0,
                );
            }
        }
    }
}
