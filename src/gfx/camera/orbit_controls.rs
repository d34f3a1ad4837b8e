use std::f32::consts::PI;

use cgmath::{InnerSpace, Vector3};
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

use super::orbit_camera::OrbitCamera;
use crate::config::OrbitControlsConfig;

/// Keeps the polar angle away from the poles where `look_at` degenerates.
const POLE_EPSILON: f32 = 1e-6;

/// Pending rotation in spherical coordinates, consumed by [`OrbitControls::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct SphericalDelta {
    theta: f32,
    phi: f32,
}

/// Drag-to-orbit controls around the camera's target.
///
/// Input only accumulates a delta; [`OrbitControls::update`] applies it to
/// whatever eye/target offset the camera has at that moment, so other code may
/// move the eye in between.
pub struct OrbitControls {
    pub config: OrbitControlsConfig,
    delta: SphericalDelta,
    scale: f32,
    viewport_height: f32,
    is_rotating: bool,
    last_cursor: Option<(f32, f32)>,
}

impl OrbitControls {
    pub fn new(config: OrbitControlsConfig, viewport_height: u32) -> Self {
        Self {
            config,
            delta: SphericalDelta::default(),
            scale: 1.0,
            viewport_height: viewport_height.max(1) as f32,
            is_rotating: false,
            last_cursor: None,
        }
    }

    /// Viewport height in the same pixel units as cursor positions.
    pub fn set_viewport_height(&mut self, height: u32) {
        if height > 0 {
            self.viewport_height = height as f32;
        }
    }

    pub fn is_rotating(&self) -> bool {
        self.is_rotating
    }

    /// Returns true when the event was used by the controls.
    pub fn process_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                self.is_rotating = *state == ElementState::Pressed;
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(position.x as f32, position.y as f32)
            }
            // A release outside the window is never delivered, so a drag ends
            // when the cursor leaves.
            WindowEvent::CursorLeft { .. } | WindowEvent::Focused(false) => {
                self.is_rotating = false;
                self.last_cursor = None;
                false
            }
            WindowEvent::MouseWheel { delta, .. } if self.config.enable_zoom => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => *y as f32 / 50.0,
                };
                self.dolly(scroll);
                true
            }
            _ => false,
        }
    }

    /// Tracks the cursor and, while the left button is held, turns the
    /// movement since the previous position into a drag. Returns whether it
    /// rotated.
    pub fn cursor_moved(&mut self, x: f32, y: f32) -> bool {
        let previous = self.last_cursor.replace((x, y));
        match previous {
            Some((px, py)) if self.is_rotating => {
                self.drag(x - px, y - py);
                true
            }
            _ => false,
        }
    }

    /// Converts a pointer drag in pixels into rotation; a drag across the full
    /// viewport height is one full turn.
    pub fn drag(&mut self, dx: f32, dy: f32) {
        let turn = 2.0 * PI * self.config.rotate_speed / self.viewport_height;
        self.rotate_left(dx * turn);
        self.rotate_up(dy * turn);
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.delta.theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.delta.phi -= angle;
    }

    /// Positive steps move the eye towards the target.
    pub fn dolly(&mut self, steps: f32) {
        if !self.config.enable_zoom {
            return;
        }
        let zoom_scale = 0.95f32.powf(self.config.zoom_speed);
        self.scale *= zoom_scale.powf(steps);
    }

    /// Applies pending input to `camera.eye`, orbiting `camera.target`.
    ///
    /// The current eye/target distance is kept (apart from zoom), so a distance
    /// set by another system survives. A zero distance leaves the camera alone.
    /// Returns whether the eye moved.
    pub fn update(&mut self, camera: &mut OrbitCamera) -> bool {
        let offset = camera.eye - camera.target;
        let radius = offset.magnitude();
        if !radius.is_finite() || radius <= f32::EPSILON {
            self.scale = 1.0;
            return false;
        }

        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        let factor = if self.config.enable_damping {
            self.config.damping_factor
        } else {
            1.0
        };
        theta += self.delta.theta * factor;
        phi += self.delta.phi * factor;

        let min_polar = self.config.min_polar_angle.max(POLE_EPSILON);
        let max_polar = self.config.max_polar_angle.min(PI - POLE_EPSILON);
        phi = phi.clamp(min_polar, max_polar.max(min_polar));

        let radius = (radius * self.scale).clamp(
            self.config.min_distance.max(f32::EPSILON),
            self.config.max_distance,
        );

        let new_offset = Vector3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        let new_eye = camera.target + new_offset;
        let moved = (new_eye - camera.eye).magnitude2() > 1e-12;
        camera.eye = new_eye;

        if self.config.enable_damping {
            self.delta.theta *= 1.0 - self.config.damping_factor;
            self.delta.phi *= 1.0 - self.config.damping_factor;
        } else {
            self.delta = SphericalDelta::default();
        }
        self.scale = 1.0;

        moved
    }
}
