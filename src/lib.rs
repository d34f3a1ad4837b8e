// src/lib.rs
//! Obstacle-aware orbit camera
//!
//! A small wgpu/winit scene: a capsule avatar on a ground plane, ringed by
//! walls. The camera orbits the avatar and is pulled in whenever a wall would
//! hide it.

pub mod app;
pub mod config;
pub mod error;
pub mod frame_loop;
pub mod gfx;
pub mod viewport;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::ObstacleCamApp;
pub use config::AppConfig;
pub use error::{RenderError, SceneError};
pub use frame_loop::SceneContext;
