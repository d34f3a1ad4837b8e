// src/wgpu_utils/binding_types.rs
//! Binding type shorthands for [`BindGroupLayoutBuilder`](super::BindGroupLayoutBuilder).

/// A non-dynamic uniform buffer binding.
pub fn uniform() -> wgpu::BindingType {
    wgpu::BindingType::Buffer {
        ty: wgpu::BufferBindingType::Uniform,
        has_dynamic_offset: false,
        min_binding_size: None,
    }
}
