// src/wgpu_utils/mod.rs
//! Small wgpu helpers shared by the renderer and the scene resources:
//! bind group builders and a typed, change-tracking uniform buffer.

pub mod binding_builder;
pub mod binding_types;
pub mod uniform_buffer;

pub use binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc};
pub use uniform_buffer::UniformBuffer;
