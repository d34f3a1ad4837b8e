//! Per-frame update order and the loop that drives it.
//!
//! Each frame runs, in order: obstacle avoidance, orbit controls, re-targeting
//! the camera onto the avatar, then drawing.

use anyhow::Context;
use cgmath::Vector3;

use crate::{
    config::AppConfig,
    error::{RenderError, SceneError},
    gfx::{
        camera::{AvoidanceOutcome, ObstacleAvoidance, OrbitCamera, OrbitControls},
        scene::{Object, ObjectId, Scene, SceneBuilder},
    },
};

/// Everything that changes from frame to frame.
pub struct SceneContext {
    pub scene: Scene,
    pub camera: OrbitCamera,
    pub controls: OrbitControls,
    pub avoidance: ObstacleAvoidance,
    pub avatar: ObjectId,
}

impl SceneContext {
    /// Builds the scene from `config.layout` and aims the camera at the avatar.
    pub fn new(config: &AppConfig, aspect: f32) -> Result<Self, SceneError> {
        let built = SceneBuilder::new(&config.layout).build()?;
        let avatar_position = built
            .scene
            .object(built.avatar)
            .map(Object::position)
            .ok_or(SceneError::UnknownObject(built.avatar))?;

        let camera = OrbitCamera::from_config(&config.camera, avatar_position, aspect);
        let controls = OrbitControls::new(config.controls, config.window.height);
        let avoidance =
            ObstacleAvoidance::new(config.avoidance, config.camera.position, avatar_position);

        Ok(Self {
            scene: built.scene,
            camera,
            controls,
            avoidance,
            avatar: built.avatar,
        })
    }

    pub fn avatar_position(&self) -> Vector3<f32> {
        self.scene
            .object(self.avatar)
            .map(Object::position)
            .unwrap_or(self.camera.target)
    }

    /// Runs one frame's camera update and refreshes the camera uniform.
    pub fn advance(&mut self) -> AvoidanceOutcome {
        let avatar = self.avatar_position();

        let outcome = self.avoidance.step(avatar, &mut self.camera, &self.scene);
        self.controls.update(&mut self.camera);
        self.camera.target = avatar;
        self.camera.update_view_proj();

        outcome
    }
}

/// Destination for rendered frames.
///
/// The scene is borrowed mutably so a sink can flush per-object GPU state.
pub trait FrameSink {
    fn draw(&mut self, scene: &mut Scene, camera: &OrbitCamera) -> Result<(), RenderError>;
}

/// Calls `step` with an increasing frame index while `should_continue` holds.
///
/// Stops at the first error. Returns the number of completed frames.
pub fn run_loop<C, S, E>(mut should_continue: C, mut step: S) -> Result<u64, E>
where
    C: FnMut() -> bool,
    S: FnMut(u64) -> Result<(), E>,
{
    let mut frames = 0;
    while should_continue() {
        step(frames)?;
        frames += 1;
    }
    Ok(frames)
}

/// Sink that renders nothing and remembers where the camera was.
#[derive(Debug, Default)]
pub struct HeadlessSink {
    pub frames: u64,
    pub last_eye: Option<Vector3<f32>>,
}

impl FrameSink for HeadlessSink {
    fn draw(&mut self, _scene: &mut Scene, camera: &OrbitCamera) -> Result<(), RenderError> {
        self.frames += 1;
        self.last_eye = Some(camera.eye);
        log::trace!(
            "frame {}: eye ({:.3}, {:.3}, {:.3})",
            self.frames,
            camera.eye.x,
            camera.eye.y,
            camera.eye.z
        );
        Ok(())
    }
}

/// Runs `frames` frames without a window.
pub fn run_headless(config: &AppConfig, frames: u64) -> anyhow::Result<HeadlessSink> {
    let aspect = config.window.width as f32 / config.window.height.max(1) as f32;
    let mut context = SceneContext::new(config, aspect).context("failed to build the scene")?;
    let mut sink = HeadlessSink::default();

    let mut remaining = frames;
    run_loop(
        || {
            let more = remaining > 0;
            remaining = remaining.saturating_sub(1);
            more
        },
        |_| {
            context.advance();
            sink.draw(&mut context.scene, &context.camera)
        },
    )?;

    if let Some(eye) = sink.last_eye {
        log::info!(
            "headless run finished after {} frames, camera at ({:.3}, {:.3}, {:.3})",
            sink.frames,
            eye.x,
            eye.y,
            eye.z
        );
    }
    Ok(sink)
}
