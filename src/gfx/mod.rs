//! # Graphics Module
//!
//! Everything between the scene description and pixels on screen.
//!
//! - **Camera** ([`camera`]) - orbit camera, mouse controls and obstacle avoidance
//! - **Geometry** ([`geometry`]) - procedural plane, box, sphere and cylinder meshes
//! - **Raycasting** ([`raycast`]) - ray/mesh intersection used to find occluders
//! - **Rendering** ([`rendering`]) - surface, pipelines and the per-frame draw
//! - **Resources** ([`resources`]) - materials, global uniforms and depth texture
//! - **Scene** ([`scene`]) - objects, lights and the obstacle list
//!
//! ```no_run
//! use obstacle_cam::{config::AppConfig, frame_loop::SceneContext};
//!
//! let mut context = SceneContext::new(&AppConfig::default(), 1.5).unwrap();
//! context.advance();
//! ```

pub mod camera;
pub mod geometry;
pub mod raycast;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
