// src/wgpu_utils/uniform_buffer.rs
use std::marker::PhantomData;

/// `std::any::type_name` without the module path, for buffer labels.
fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    match full.rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}

/// A uniform buffer holding exactly one `Content`.
///
/// Writes go through [`UniformBuffer::update_content`], which compares bytes
/// against the last upload and skips the queue write when they match. Camera
/// and light data are refreshed every frame but rarely change while idle.
pub struct UniformBuffer<Content> {
    buffer: wgpu::Buffer,
    last_written: Vec<u8>,
    _content: PhantomData<Content>,
}

impl<Content: bytemuck::Pod> UniformBuffer<Content> {
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("UniformBuffer: {}", short_type_name::<Content>())),
            size: std::mem::size_of::<Content>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        UniformBuffer {
            buffer,
            last_written: Vec::new(),
            _content: PhantomData,
        }
    }

    /// Uploads `content` unless it is byte-identical to the previous upload.
    /// Returns whether a write was queued.
    pub fn update_content(&mut self, queue: &wgpu::Queue, content: Content) -> bool {
        let bytes = bytemuck::bytes_of(&content);
        if self.last_written == bytes {
            return false;
        }
        queue.write_buffer(&self.buffer, 0, bytes);
        self.last_written = bytes.to_vec();
        true
    }

    pub fn binding_resource(&self) -> wgpu::BindingResource<'_> {
        self.buffer.as_entire_binding()
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;

    #[test]
    fn labels_use_the_short_type_name() {
        assert_eq!(short_type_name::<Marker>(), "Marker");
        assert_eq!(short_type_name::<u32>(), "u32");
        assert_eq!(
            short_type_name::<crate::gfx::resources::GlobalUniform>(),
            "GlobalUniform"
        );
    }
}
