use std::sync::Arc;

use anyhow::Context;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    config::AppConfig,
    frame_loop::{FrameSink, SceneContext},
    gfx::rendering::RenderEngine,
    viewport::handle_resize,
};

/// Windowed application: one scene, one camera, redrawn continuously.
pub struct ObstacleCamApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    config: AppConfig,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    context: SceneContext,
    error: Option<anyhow::Error>,
}

impl ObstacleCamApp {
    /// Builds the scene; the window and GPU are created once the loop starts.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let event_loop = EventLoop::new().context("failed to create the event loop")?;
        let aspect = config.window.width as f32 / config.window.height.max(1) as f32;
        let context = SceneContext::new(&config, aspect).context("failed to build the scene")?;

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                config,
                window: None,
                render_engine: None,
                context,
                error: None,
            },
        })
    }

    /// Runs until the window closes. Returns the error that stopped the loop, if any.
    pub fn run(mut self) -> anyhow::Result<()> {
        let event_loop = self
            .event_loop
            .take()
            .context("event loop already consumed")?;
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop
            .run_app(&mut self.app_state)
            .context("event loop terminated abnormally")?;

        match self.app_state.error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:#}");
        self.error = Some(error);
        event_loop.exit();
    }
}

fn logical_size(window: &Window, physical: PhysicalSize<u32>) -> (u32, u32) {
    let logical: LogicalSize<f64> = physical.to_logical(window.scale_factor());
    (logical.width.round() as u32, logical.height.round() as u32)
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = WindowAttributes::default()
            .with_title(self.config.window.title.clone())
            .with_inner_size(LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                let error = anyhow::Error::new(e).context("failed to create the window");
                return self.fail(event_loop, error);
            }
        };

        let physical = window.inner_size();
        let (width, height) = logical_size(&window, physical);
        let scale = window.scale_factor() as f32;
        let renderer = pollster::block_on(RenderEngine::new(
            window.clone(),
            &self.config.window,
            (width, height),
            scale,
        ));
        let mut renderer = match renderer {
            Ok(renderer) => renderer,
            Err(e) => {
                let error = anyhow::Error::new(e).context("failed to initialise rendering");
                return self.fail(event_loop, error);
            }
        };

        let context = &mut self.context;
        handle_resize(&mut context.camera, &mut renderer, width, height, scale);
        context.controls.set_viewport_height(physical.height);
        renderer.upload_scene(&mut context.scene);

        self.window = Some(window);
        self.render_engine = Some(renderer);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let (Some(window), Some(render_engine)) =
            (self.window.as_ref(), self.render_engine.as_mut())
        else {
            return;
        };

        if self.context.controls.process_window_event(&event) {
            return;
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            }
            | WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical) => {
                let (width, height) = logical_size(window, physical);
                let scale = window.scale_factor() as f32;
                if handle_resize(&mut self.context.camera, render_engine, width, height, scale) {
                    self.context.controls.set_viewport_height(physical.height);
                }
            }
            WindowEvent::RedrawRequested => {
                self.context.advance();
                if let Err(e) = render_engine.draw(&mut self.context.scene, &self.context.camera) {
                    self.fail(event_loop, anyhow::Error::new(e).context("frame failed"));
                }
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}
