//! # Application Configuration
//!
//! Typed settings for the window, camera, orbit controls, obstacle avoidance and
//! scene layout. Every `Default` reproduces the stock walled-courtyard scene, so
//! `AppConfig::default()` is all a caller needs; [`AppConfig::from_env`] layers a
//! couple of environment overrides on top for development.
//!
//! ## Environment
//!
//! - `OBSTACLE_CAM_NO_VSYNC` - any value except `0`/`false` disables vsync
//! - `OBSTACLE_CAM_HEADLESS_FRAMES=<n>` - run `n` frames without opening a window

use std::f32::consts::{FRAC_PI_2, PI};

use cgmath::{Rad, Vector3};

/// Converts a `0xRRGGBB` literal into normalized RGB.
pub const fn rgb_hex(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

pub const WHITE: [f32; 3] = rgb_hex(0xffffff);
pub const GREEN: [f32; 3] = rgb_hex(0x008000);
pub const BLUE: [f32; 3] = rgb_hex(0x0000ff);
pub const RED: [f32; 3] = rgb_hex(0xff0000);

#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "obstacle-cam".to_string(),
            width: 1200,
            height: 800,
            vsync: true,
        }
    }
}

/// Initial camera placement and projection.
#[derive(Debug, Clone, Copy)]
pub struct CameraConfig {
    pub position: Vector3<f32>,
    pub fov_y_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 4.0, 10.0),
            fov_y_degrees: 65.0,
            znear: 2.0,
            zfar: 100.0,
        }
    }
}

/// Orbit control tuning. Angles are polar angles measured from +Y.
#[derive(Debug, Clone, Copy)]
pub struct OrbitControlsConfig {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub enable_zoom: bool,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitControlsConfig {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            min_polar_angle: 0.0,
            // Keep the camera above the ground plane
            max_polar_angle: FRAC_PI_2,
            enable_zoom: false,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
        }
    }
}

/// Tuning for the per-frame camera pull-in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvoidanceConfig {
    /// Distance kept between the camera and the occluding surface.
    pub clearance: f32,
    /// Blend factor while an obstacle blocks the view.
    pub occluded_blend: f32,
    /// Blend factor while returning to the rest distance.
    pub clear_blend: f32,
}

impl Default for AvoidanceConfig {
    fn default() -> Self {
        Self {
            clearance: 0.5,
            occluded_blend: 0.4,
            clear_blend: 0.08,
        }
    }
}

/// Capsule avatar dimensions: a cylinder capped by two hemispheres.
#[derive(Debug, Clone, Copy)]
pub struct CapsuleSpec {
    pub radius: f32,
    pub cylinder_height: f32,
    pub radial_segments: u32,
    pub position: Vector3<f32>,
}

impl Default for CapsuleSpec {
    fn default() -> Self {
        Self {
            radius: 1.0,
            cylinder_height: 2.0,
            radial_segments: 32,
            position: Vector3::new(0.0, 2.0, 0.0),
        }
    }
}

/// Shared wall box dimensions (x = width, y = height, z = depth).
#[derive(Debug, Clone, Copy)]
pub struct WallSpec {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub color: [f32; 3],
}

impl Default for WallSpec {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 10.0,
            depth: 5.0,
            color: rgb_hex(0xBA5624),
        }
    }
}

/// Where a wall stands on the ground. Walls rest on the ground, so the
/// vertical centre is always `height / 2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallPlacement {
    pub x: f32,
    pub z: f32,
    pub rotation_y: Rad<f32>,
}

impl WallPlacement {
    pub const fn new(x: f32, z: f32, rotation_y: f32) -> Self {
        Self {
            x,
            z,
            rotation_y: Rad(rotation_y),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AmbientLightSpec {
    pub color: [f32; 3],
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct PointLightSpec {
    pub position: Vector3<f32>,
    pub color: [f32; 3],
    pub intensity: f32,
}

/// Declarative description of the static scene.
#[derive(Debug, Clone)]
pub struct SceneLayout {
    pub ground_size: f32,
    pub ground_color: [f32; 3],
    pub capsule: CapsuleSpec,
    pub wall: WallSpec,
    pub walls: Vec<WallPlacement>,
    pub ambient: AmbientLightSpec,
    pub point_lights: Vec<PointLightSpec>,
}

impl Default for SceneLayout {
    fn default() -> Self {
        let quarter = PI / 2.0;
        Self {
            ground_size: 50.0,
            ground_color: rgb_hex(0x04724D),
            capsule: CapsuleSpec::default(),
            wall: WallSpec::default(),
            walls: vec![
                WallPlacement::new(4.0, -2.0, 0.0),
                WallPlacement::new(4.0, -8.0, 0.0),
                WallPlacement::new(4.0, -14.0, 0.0),
                WallPlacement::new(4.0, 4.0, 0.0),
                WallPlacement::new(4.0, 10.0, 0.0),
                WallPlacement::new(4.0, 1.0, 0.0),
                WallPlacement::new(1.0, -17.0, quarter),
                WallPlacement::new(-5.0, -17.0, quarter),
                WallPlacement::new(-11.0, -17.0, quarter),
                WallPlacement::new(2.0, 12.5, quarter),
                WallPlacement::new(-4.0, 12.5, quarter),
                WallPlacement::new(-10.0, 12.5, quarter),
            ],
            ambient: AmbientLightSpec {
                color: WHITE,
                intensity: 0.5,
            },
            point_lights: vec![
                PointLightSpec {
                    position: Vector3::new(0.0, 8.0, 0.0),
                    color: GREEN,
                    intensity: 0.5,
                },
                PointLightSpec {
                    position: Vector3::new(0.0, 8.0, 5.0),
                    color: BLUE,
                    intensity: 0.5,
                },
                PointLightSpec {
                    position: Vector3::new(0.0, 8.0, -5.0),
                    color: RED,
                    intensity: 0.5,
                },
            ],
        }
    }
}

/// Top-level configuration handed to [`crate::ObstacleCamApp`].
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub controls: OrbitControlsConfig,
    pub avoidance: AvoidanceConfig,
    pub layout: SceneLayout,
    /// When set, run this many frames without a window and exit.
    pub headless_frames: Option<u64>,
}

impl AppConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_env(|key| std::env::var(key).ok())
    }

    /// Applies overrides read through `lookup`.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("OBSTACLE_CAM_NO_VSYNC") {
            let value = value.trim().to_ascii_lowercase();
            if !value.is_empty() && value != "0" && value != "false" {
                self.window.vsync = false;
            }
        }

        if let Some(value) = lookup("OBSTACLE_CAM_HEADLESS_FRAMES") {
            match value.trim().parse::<u64>() {
                Ok(frames) => self.headless_frames = Some(frames),
                Err(err) => {
                    log::warn!("ignoring OBSTACLE_CAM_HEADLESS_FRAMES={value:?}: {err}")
                }
            }
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_are_normalized() {
        assert_eq!(rgb_hex(0xffffff), [1.0, 1.0, 1.0]);
        assert_eq!(rgb_hex(0x0000ff), [0.0, 0.0, 1.0]);
        assert_eq!(rgb_hex(0x008000)[1], 128.0 / 255.0);
    }

    #[test]
    fn default_layout_has_twelve_walls_and_three_point_lights() {
        let layout = SceneLayout::default();
        assert_eq!(layout.walls.len(), 12);
        assert_eq!(layout.point_lights.len(), 3);
        assert_eq!(layout.wall.height, 10.0);
    }

    #[test]
    fn env_overrides_are_applied() {
        let config = AppConfig::default().with_env(|key| match key {
            "OBSTACLE_CAM_NO_VSYNC" => Some("1".to_string()),
            "OBSTACLE_CAM_HEADLESS_FRAMES" => Some(" 120 ".to_string()),
            _ => None,
        });
        assert!(!config.window.vsync);
        assert_eq!(config.headless_frames, Some(120));
    }

    #[test]
    fn invalid_env_values_are_ignored() {
        let config = AppConfig::default().with_env(|key| match key {
            "OBSTACLE_CAM_NO_VSYNC" => Some("false".to_string()),
            "OBSTACLE_CAM_HEADLESS_FRAMES" => Some("lots".to_string()),
            _ => None,
        });
        assert!(config.window.vsync);
        assert_eq!(config.headless_frames, None);
    }
}
