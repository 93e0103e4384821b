/*
 * Camera Module
 *
 * This module defines the first-person Camera used by the viewer and the
 * CameraController that zooms it. The camera looks around with yaw/pitch
 * driven by mouse movement and projects world points to screen space
 * (origin at the window center, y up).
 *
 * Zooming is a small state machine ticked as a world controller:
 * ZoomedOut -> ZoomingIn -> ZoomedIn -> ZoomingOut -> ZoomedOut.
 * zoom() only requests the change; the next tick applies the new field of
 * view and mouse sensitivity.
 */

use std::f32::consts::FRAC_PI_2;

use glam::{EulerRot, Quat, Vec2, Vec3};

use crate::world::{Controller, Environment};

pub const OUT_FOV: f32 = 75.0;
pub const IN_FOV: f32 = 15.0;
pub const DEFAULT_MOVEMENT_FACTOR: f32 = 0.002;
// Mouse sensitivity is divided by this while zoomed in
pub const ZOOMED_MOVEMENT_DIVISOR: f32 = 8.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub movement_factor: f32,
    // Mouse look only applies while the pointer is captured
    pub look_enabled: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    pub fn new() -> Self {
        Self {
            position: Vec3::new(0.0, 10.0, 30.0),
            yaw: 0.0,
            pitch: 0.0,
            fov_degrees: OUT_FOV,
            near: 0.1,
            far: 150.0,
            movement_factor: DEFAULT_MOVEMENT_FACTOR,
            look_enabled: false,
        }
    }

    // Turn by a mouse movement in pixels
    pub fn look(&mut self, movement: Vec2) {
        if !self.look_enabled {
            return;
        }

        self.yaw -= movement.x * self.movement_factor;
        self.pitch -= movement.y * self.movement_factor;
        self.pitch = self.pitch.clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }

    // Screen position of a world point for a viewport of the given size,
    // or None when the point is outside the near/far range
    pub fn project(&self, point: Vec3, viewport: Vec2) -> Option<Vec2> {
        let view = self.rotation().inverse() * (point - self.position);
        let depth = -view.z;
        if !(depth >= self.near && depth <= self.far) {
            return None;
        }

        let focal = 1.0 / (self.fov_degrees.to_radians() * 0.5).tan();
        let scale = focal * viewport.y * 0.5 / depth;
        let screen = Vec2::new(view.x, view.y) * scale;

        screen.is_finite().then_some(screen)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ZoomState {
    #[default]
    ZoomedOut,
    ZoomingIn,
    ZoomedIn,
    ZoomingOut,
}

pub struct CameraController {
    camera: Camera,
    state: ZoomState,
    out_movement: f32,
    in_movement: f32,
}

impl CameraController {
    pub fn new(camera: Camera) -> Self {
        let out_movement = camera.movement_factor;
        Self {
            camera,
            state: ZoomState::ZoomedOut,
            out_movement,
            in_movement: out_movement / ZOOMED_MOVEMENT_DIVISOR,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn state(&self) -> ZoomState {
        self.state
    }

    // Request a zoom toggle; ignored while a change is still pending
    pub fn zoom(&mut self) {
        self.state = match self.state {
            ZoomState::ZoomedOut => ZoomState::ZoomingIn,
            ZoomState::ZoomedIn => ZoomState::ZoomingOut,
            pending => pending,
        };
    }

    fn apply_pending_zoom(&mut self) {
        match self.state {
            ZoomState::ZoomingIn => {
                self.camera.fov_degrees = IN_FOV;
                self.camera.movement_factor = self.in_movement;
                self.state = ZoomState::ZoomedIn;
            }
            ZoomState::ZoomingOut => {
                self.camera.fov_degrees = OUT_FOV;
                self.camera.movement_factor = self.out_movement;
                self.state = ZoomState::ZoomedOut;
            }
            ZoomState::ZoomedIn | ZoomState::ZoomedOut => {}
        }
    }
}

impl Controller for CameraController {
    fn update(&mut self, _delta: f32, _environment: &mut Environment) {
        self.apply_pending_zoom();
    }
}
