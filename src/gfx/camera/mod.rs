//! Orbit camera, mouse controls and the obstacle-avoidance step.

pub mod camera_utils;
pub mod obstacle_avoidance;
pub mod orbit_camera;
pub mod orbit_controls;

// Re-export main types
pub use camera_utils::{Camera, CameraUniform};
pub use obstacle_avoidance::{AvoidanceOutcome, ObstacleAvoidance};
pub use orbit_camera::OrbitCamera;
pub use orbit_controls::OrbitControls;
