//! Global uniform bindings for camera and light data
//!
//! Everything here is shared by all objects in a frame and bound to group 0.

use crate::{
    gfx::{camera::camera_utils::CameraUniform, scene::Scene},
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Point lights beyond this count are not sent to the GPU.
pub const MAX_POINT_LIGHTS: usize = 4;

/// Per-frame global data. MUST match `Globals` in `scene.wgsl` exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUniform {
    view_proj: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    eye: [f32; 4],
    /// rgb premultiplied by intensity
    ambient: [f32; 4],
    /// x = number of valid entries in the light arrays
    light_count: [u32; 4],
    light_position: [[f32; 4]; MAX_POINT_LIGHTS],
    /// rgb premultiplied by intensity
    light_color: [[f32; 4]; MAX_POINT_LIGHTS],
}

impl GlobalUniform {
    pub fn new(camera: &CameraUniform, scene: &Scene) -> Self {
        let ambient = scene.ambient.radiance();
        let mut content = Self {
            view_proj: camera.view_proj,
            view: camera.view,
            eye: camera.view_position,
            ambient: [ambient[0], ambient[1], ambient[2], 1.0],
            light_count: [0; 4],
            light_position: [[0.0; 4]; MAX_POINT_LIGHTS],
            light_color: [[0.0; 4]; MAX_POINT_LIGHTS],
        };

        let lights = scene.point_lights.iter().take(MAX_POINT_LIGHTS);
        for (slot, light) in lights.enumerate() {
            let p = light.position;
            let c = light.color.map(|channel| channel * light.intensity);
            content.light_position[slot] = [p.x, p.y, p.z, 1.0];
            content.light_color[slot] = [c[0], c[1], c[2], 1.0];
            content.light_count[0] += 1;
        }

        content
    }

    pub fn light_count(&self) -> u32 {
        self.light_count[0]
    }
}

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<GlobalUniform>;

/// Bind group layout and bind group for group 0
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: wgpu::BindGroup,
    ubo: GlobalUBO,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Globals Bind Group Layout");
        let ubo = GlobalUBO::new(device);
        let bind_group = BindGroupBuilder::new(&bind_group_layout)
            .resource(ubo.binding_resource())
            .create(device, "Globals Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group,
            ubo,
        }
    }

    /// Uploads camera and light data for the coming frame
    pub fn update(&mut self, queue: &wgpu::Queue, camera: &CameraUniform, scene: &Scene) {
        self.ubo
            .update_content(queue, GlobalUniform::new(camera, scene));
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::{AmbientLight, PointLight};
    use cgmath::Vector3;

    #[test]
    fn layout_is_sixteen_byte_aligned() {
        assert_eq!(std::mem::size_of::<GlobalUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<GlobalUniform>(), 64 * 2 + 16 * 3 + 16 * 4 * 2);
    }

    #[test]
    fn lights_are_premultiplied_and_capped() {
        let mut scene = Scene::new();
        scene.set_ambient(AmbientLight::new([1.0, 1.0, 1.0], 0.5));
        for i in 0..6 {
            let position = Vector3::new(i as f32, 8.0, 0.0);
            scene.add_point_light(PointLight::new(position, [0.0, 1.0, 0.0], 0.5));
        }

        let uniform = GlobalUniform::new(&CameraUniform::default(), &scene);
        assert_eq!(uniform.light_count(), MAX_POINT_LIGHTS as u32);
        assert_eq!(uniform.ambient, [0.5, 0.5, 0.5, 1.0]);
        assert_eq!(uniform.light_color[0], [0.0, 0.5, 0.0, 1.0]);
        assert_eq!(uniform.light_position[3], [3.0, 8.0, 0.0, 1.0]);
    }
}
