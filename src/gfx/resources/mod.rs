// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Handles depth textures, uniform buffers and bind groups for rendering.

pub mod global_bindings;
pub mod material;
pub mod texture_resource;

// Re-export main types
pub use global_bindings::{GlobalBindings, GlobalUniform, MAX_POINT_LIGHTS};
pub use material::{Material, MaterialManager, Shading};
pub use texture_resource::TextureResource;
