//! Material system
//!
//! Materials are stored in [`MaterialManager`] and objects reference them by
//! ID. All materials share a single bind group layout (group 2) owned by the
//! renderer.

use std::collections::HashMap;
use wgpu::Device;

use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

/// Material ID for referencing materials
pub type MaterialId = String;

pub const DEFAULT_MATERIAL: &str = "default";

/// How a surface is coloured by the fragment shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shading {
    /// Diffuse colour lit by the ambient and point lights
    Lambert,
    /// View-space normal mapped to RGB, unaffected by lights
    Normal,
}

impl Shading {
    fn shader_code(self) -> u32 {
        match self {
            Shading::Lambert => 0,
            Shading::Normal => 1,
        }
    }
}

/// GPU uniform data for materials. Must match `MaterialUniform` in `scene.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub color: [f32; 4],
    /// x = shading mode, yzw unused
    pub shading: [u32; 4],
}

type MaterialUBO = UniformBuffer<MaterialUniform>;

/// Creates the layout every material bind group is built against.
pub fn create_material_layout(device: &Device) -> BindGroupLayoutWithDesc {
    BindGroupLayoutBuilder::new()
        .next_binding_fragment(binding_types::uniform())
        .create(device, "Material Bind Group Layout")
}

/// Surface appearance shared by every object that references it.
pub struct Material {
    pub name: String,
    pub color: [f32; 4],
    pub shading: Shading,
    /// Rendered without back-face culling
    pub double_sided: bool,

    material_ubo: Option<MaterialUBO>,
    bind_group: Option<wgpu::BindGroup>,
}

impl Default for Material {
    fn default() -> Self {
        Self::lambert(DEFAULT_MATERIAL, [0.8, 0.8, 0.8])
    }
}

impl Material {
    pub fn new(name: &str, color: [f32; 4], shading: Shading) -> Self {
        Self {
            name: name.to_string(),
            color,
            shading,
            double_sided: false,
            material_ubo: None,
            bind_group: None,
        }
    }

    /// Opaque diffuse material
    pub fn lambert(name: &str, rgb: [f32; 3]) -> Self {
        Self::new(name, [rgb[0], rgb[1], rgb[2], 1.0], Shading::Lambert)
    }

    /// Material that visualises surface normals
    pub fn normal(name: &str) -> Self {
        Self::new(name, [1.0; 4], Shading::Normal)
    }

    pub fn with_double_sided(mut self, double_sided: bool) -> Self {
        self.double_sided = double_sided;
        self
    }

    pub fn uniform(&self) -> MaterialUniform {
        MaterialUniform {
            color: self.color,
            shading: [self.shading.shader_code(), 0, 0, 0],
        }
    }

    /// Creates the uniform buffer and bind group on first use, then syncs the
    /// current properties.
    pub fn update_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        layout: &BindGroupLayoutWithDesc,
    ) {
        let uniform = self.uniform();
        let ubo = self
            .material_ubo
            .get_or_insert_with(|| MaterialUBO::new(device));

        if self.bind_group.is_none() {
            self.bind_group = Some(
                BindGroupBuilder::new(layout)
                    .resource(ubo.binding_resource())
                    .create(device, &format!("{} Material Bind Group", self.name)),
            );
        }

        ubo.update_content(queue, uniform);
    }

    pub fn get_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }
}

/// Centralized storage for all materials.
pub struct MaterialManager {
    materials: HashMap<MaterialId, Material>,
    default_material: Material,
}

impl Default for MaterialManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialManager {
    pub fn new() -> Self {
        Self {
            materials: HashMap::new(),
            default_material: Material::default(),
        }
    }

    /// Adds or replaces a material under its own name
    pub fn add_material(&mut self, material: Material) {
        if material.name == DEFAULT_MATERIAL {
            self.default_material = material;
        } else {
            self.materials.insert(material.name.clone(), material);
        }
    }

    pub fn get_material(&self, id: &str) -> Option<&Material> {
        if id == DEFAULT_MATERIAL {
            Some(&self.default_material)
        } else {
            self.materials.get(id)
        }
    }

    pub fn get_default_material(&self) -> &Material {
        &self.default_material
    }

    /// Material for `id`, or the default when no such material exists
    pub fn get_material_for_object(&self, id: &str) -> &Material {
        self.get_material(id)
            .unwrap_or(&self.default_material)
    }

    /// Number of materials including the default
    pub fn count(&self) -> usize {
        self.materials.len() + 1
    }

    pub fn update_all_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        layout: &BindGroupLayoutWithDesc,
    ) {
        self.default_material
            .update_gpu_resources(device, queue, layout);
        for material in self.materials.values_mut() {
            material.update_gpu_resources(device, queue, layout);
        }
    }
}
