/*
 * Application Module
 *
 * This module defines the main application model for the flocking viewer.
 * It owns the World, wires the camera controller into it, forwards input
 * and persists the debug-line toggles whenever a key changes them.
 *
 * The simulation is stepped once per frame with the frame's elapsed time.
 */

use std::cell::RefCell;
use std::rc::Rc;

use nannou::prelude::*;
use nannou::winit::event::WindowEvent;
use nannou_egui::Egui;
use tracing::{info, warn};

use crate::camera::{Camera, CameraController};
use crate::debug::{DebugConfig, DebugInfo};
use crate::input::{ActionEffect, KeyAction};
use crate::params::{BoidParams, FlockParams};
use crate::persistence::ConfigStore;
use crate::renderer;
use crate::ui;
use crate::world::{ControllerName, World};

// Longest step handed to the simulation, e.g. after the window was dragged
const MAX_FRAME_DELTA: f32 = 0.1;

// Main model for the application
pub struct Model {
    pub world: World,
    pub flock: FlockParams,
    pub camera: Rc<RefCell<CameraController>>,
    pub config: DebugConfig,
    pub store: ConfigStore,
    pub egui: Egui,
    pub debug_info: DebugInfo,
    pub simulation_running: bool,
    pub fullscreen: bool,
    pub last_mouse: Option<glam::Vec2>,
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

// Initialize the model
pub fn model(app: &App) -> Model {
    let window_id = app
        .new_window()
        .title("Boid Flocking Simulation")
        .size(1280, 720)
        .view(renderer::view)
        .key_pressed(key_pressed)
        .mouse_moved(mouse_moved)
        .mouse_pressed(mouse_pressed)
        .mouse_released(mouse_released)
        .raw_event(raw_window_event)
        .build()
        .expect("failed to build the main window");

    let window = app
        .window(window_id)
        .expect("main window disappeared right after creation");
    let egui = Egui::from_window(&window);

    let store = ConfigStore::from_env();
    let config = store.load().unwrap_or_else(|err| {
        warn!(%err, "ignoring stored debug config");
        DebugConfig::default()
    });

    let flock = FlockParams::default();
    let camera = Rc::new(RefCell::new(CameraController::new(Camera::new())));
    let world = build_world(&flock, &camera);

    info!(boids = world.len(), config = %store.path().display(), "viewer ready");

    Model {
        world,
        flock,
        camera,
        config,
        store,
        egui,
        debug_info: DebugInfo::default(),
        simulation_running: true,
        fullscreen: false,
        last_mouse: None,
    }
}

// Update the model
pub fn update(app: &App, model: &mut Model, update: Update) {
    model.debug_info.fps = app.fps();
    model.debug_info.frame_time = update.since_last;

    model.egui.set_elapsed_time(update.since_start);
    let zoom = model.camera.borrow().state();
    let response = ui::update_ui(
        &mut model.egui,
        &mut model.config,
        &mut model.flock,
        &mut model.simulation_running,
        &model.debug_info,
        zoom,
    );
    if response.config_changed {
        store_config(model);
    }
    if response.respawn {
        model.world = build_world(&model.flock, &model.camera);
    }

    if model.simulation_running {
        let delta = update.since_last.as_secs_f32().min(MAX_FRAME_DELTA);
        model.world.update(delta);
    }

    model.debug_info.sample(&model.world);
}

// Fresh world seeded from `flock`, with the camera registered as a controller
fn build_world(flock: &FlockParams, camera: &Rc<RefCell<CameraController>>) -> World {
    let mut world = World::with_params(flock);
    if let Err(err) = world.spawn_flock(flock, BoidParams::default(), &mut rand::thread_rng()) {
        warn!(%err, "could not seed the flock");
    }
    world.add_controller(Rc::clone(camera), Some(ControllerName::Camera));
    world
}

fn store_config(model: &Model) {
    if let Err(err) = model.store.store(&model.config) {
        warn!(%err, "could not store debug config");
    }
}

pub fn key_pressed(app: &App, model: &mut Model, key: Key) {
    if key == Key::Escape {
        model.camera.borrow_mut().camera_mut().look_enabled = false;
        return;
    }

    let Some(action) = key_char(key).and_then(KeyAction::from_key) else {
        info!(?key, "no handler for key");
        return;
    };

    let effect = action.apply(&mut model.config, &mut model.camera.borrow_mut());
    if effect == ActionEffect::FullscreenToggled {
        model.fullscreen = !model.fullscreen;
        app.main_window().set_fullscreen(model.fullscreen);
    }

    // Stored after every handled key
    store_config(model);
}

fn key_char(key: Key) -> Option<char> {
    let c = match key {
        Key::Y => 'Y',
        Key::U => 'U',
        Key::I => 'I',
        Key::O => 'O',
        Key::P => 'P',
        Key::B => 'B',
        Key::Z => 'Z',
        Key::F => 'F',
        _ => return None,
    };
    Some(c)
}

// Mouse moved event handler
pub fn mouse_moved(_app: &App, model: &mut Model, pos: Point2) {
    let position = glam::Vec2::new(pos.x, pos.y);

    if let Some(last) = model.last_mouse {
        // nannou's y axis points up, mouse look expects screen-down movement
        let movement = position - last;
        model
            .camera
            .borrow_mut()
            .camera_mut()
            .look(glam::Vec2::new(movement.x, -movement.y));
    }

    model.last_mouse = Some(position);
}

// Holding the left button captures the mouse for looking around
pub fn mouse_pressed(_app: &App, model: &mut Model, button: MouseButton) {
    if button == MouseButton::Left && !model.egui.ctx().is_pointer_over_area() {
        model.camera.borrow_mut().camera_mut().look_enabled = true;
    }
}

pub fn mouse_released(_app: &App, model: &mut Model, button: MouseButton) {
    if button == MouseButton::Left {
        model.camera.borrow_mut().camera_mut().look_enabled = false;
    }
}

// Handle raw window events for egui
pub fn raw_window_event(_app: &App, model: &mut Model, event: &WindowEvent) {
    model.egui.handle_raw_event(event);
}
