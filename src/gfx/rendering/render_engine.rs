//! WGPU-based rendering engine
//!
//! Owns the surface, device and pipelines, and draws a [`Scene`] from an
//! [`OrbitCamera`] each frame.

use std::sync::Arc;
use wgpu::Device;

use crate::{
    config::WindowConfig,
    error::RenderError,
    frame_loop::FrameSink,
    gfx::{
        camera::OrbitCamera,
        resources::{
            global_bindings::GlobalBindings, material::create_material_layout,
            texture_resource::TextureResource,
        },
        scene::{object::DrawObject, scene::Scene},
    },
    viewport::{capped_pixel_ratio, ResizeTarget},
    wgpu_utils::{binding_types, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
};

use super::pipeline_manager::{PipelineConfig, PipelineManager};

const SCENE_PIPELINE: &str = "Scene";
const DOUBLE_SIDED_PIPELINE: &str = "SceneDoubleSided";

const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

/// Surface size in physical pixels for a logical size and pixel ratio.
pub fn physical_size(logical: (u32, u32), pixel_ratio: f32) -> (u32, u32) {
    let scale = |v: u32| ((v as f32 * pixel_ratio).round() as u32).max(1);
    (scale(logical.0), scale(logical.1))
}

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    pipeline_manager: PipelineManager,
    global_bindings: GlobalBindings,
    object_layout: BindGroupLayoutWithDesc,
    material_layout: BindGroupLayoutWithDesc,
    logical_size: (u32, u32),
    pixel_ratio: f32,
}

impl RenderEngine {
    /// Creates a render engine for `window`.
    ///
    /// `logical_size` and `device_pixel_ratio` give the initial viewport; the
    /// surface is configured at their (capped) physical size.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        window_config: &WindowConfig,
        logical_size: (u32, u32),
        device_pixel_ratio: f32,
    ) -> Result<RenderEngine, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits::downlevel_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        // Colors are authored as sRGB hex values and written unconverted.
        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or(RenderError::NoSurfaceFormat)?;

        let pixel_ratio = capped_pixel_ratio(device_pixel_ratio);
        let (width, height) = physical_size(logical_size, pixel_ratio);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: if window_config.vsync {
                wgpu::PresentMode::Fifo
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let global_bindings = GlobalBindings::new(&device);
        let object_layout = BindGroupLayoutBuilder::new()
            .next_binding_vertex(binding_types::uniform())
            .create(&device, "Transform Bind Group Layout");
        let material_layout = create_material_layout(&device);

        let device_handle: Arc<Device> = device.into();
        let queue_handle: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device_handle.clone());

        pipeline_manager.load_shader("scene", include_str!("scene.wgsl"));

        let layouts = vec![
            global_bindings.bind_group_layout().clone(),
            object_layout.layout.clone(),
            material_layout.layout.clone(),
        ];
        let base = PipelineConfig::default()
            .with_shader("scene")
            .with_depth_format(TextureResource::DEPTH_FORMAT)
            .with_color_format(format)
            .with_bind_group_layouts(layouts);

        pipeline_manager.register_pipeline(SCENE_PIPELINE, base.clone().with_label(SCENE_PIPELINE));
        pipeline_manager.register_pipeline(
            DOUBLE_SIDED_PIPELINE,
            base.with_label(DOUBLE_SIDED_PIPELINE).with_cull_mode(None),
        );
        pipeline_manager
            .create_all_pipelines()
            .map_err(RenderError::Pipeline)?;

        log::info!(
            "surface {}x{} ({:?}, {:?})",
            width,
            height,
            format,
            config.present_mode
        );

        Ok(RenderEngine {
            surface,
            device: device_handle,
            queue: queue_handle,
            config,
            depth_texture,
            pipeline_manager,
            global_bindings,
            object_layout,
            material_layout,
            logical_size,
            pixel_ratio,
        })
    }

    /// Uploads mesh, transform and material data for every object in `scene`.
    pub fn upload_scene(&self, scene: &mut Scene) {
        scene.init_gpu_resources(
            &self.device,
            &self.queue,
            &self.object_layout.layout,
            &self.material_layout,
        );
    }

    /// Renders one frame.
    ///
    /// Moved objects have their model matrices re-uploaded first. A lost or
    /// outdated surface is reconfigured and the frame skipped; only
    /// unrecoverable surface errors are returned.
    pub fn render_frame(
        &mut self,
        scene: &mut Scene,
        camera: &OrbitCamera,
    ) -> Result<(), RenderError> {
        scene.update_transforms(&self.queue);

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost or outdated, reconfiguring");
                self.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("timed out waiting for a surface texture, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        self.global_bindings
            .update(&self.queue, &camera.uniform, scene);

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);

            for object in scene.objects().iter().filter(|o| o.visible) {
                let material = scene.get_material_for_object(object);
                let pipeline_name = if material.double_sided {
                    DOUBLE_SIDED_PIPELINE
                } else {
                    SCENE_PIPELINE
                };
                let (Some(pipeline), Some(material_bind_group)) = (
                    self.pipeline_manager.pipeline(pipeline_name),
                    material.get_bind_group(),
                ) else {
                    log::trace!("skipping '{}': not ready for drawing", object.name);
                    continue;
                };

                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(2, material_bind_group, &[]);
                render_pass.draw_object(object);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    fn reconfigure(&mut self) {
        let (width, height) = physical_size(self.logical_size, self.pixel_ratio);
        let max = self.device.limits().max_texture_dimension_2d;
        self.config.width = width.min(max);
        self.config.height = height.min(max);

        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }
}

impl ResizeTarget for RenderEngine {
    fn set_size(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.logical_size = (width, height);
        self.reconfigure();
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        let ratio = capped_pixel_ratio(ratio);
        if ratio != self.pixel_ratio {
            self.pixel_ratio = ratio;
            self.reconfigure();
        }
    }

    fn size(&self) -> (u32, u32) {
        self.logical_size
    }

    fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }
}

impl FrameSink for RenderEngine {
    fn draw(&mut self, scene: &mut Scene, camera: &OrbitCamera) -> Result<(), RenderError> {
        self.render_frame(scene, camera)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physical_size_scales_and_never_hits_zero() {
        assert_eq!(physical_size((800, 600), 2.0), (1600, 1200));
        assert_eq!(physical_size((801, 601), 1.5), (1202, 902));
        assert_eq!(physical_size((0, 0), 1.0), (1, 1));
    }
}
