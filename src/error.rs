//! Error types for scene construction and rendering.

use thiserror::Error;

use crate::gfx::scene::{ObjectId, ObjectRole};

/// Errors raised while assembling the scene and its obstacle set.
#[derive(Debug, Error, PartialEq)]
pub enum SceneError {
    #[error("object {0:?} does not exist in the scene")]
    UnknownObject(ObjectId),

    /// Ground and avatar geometry would intersect every camera ray.
    #[error("'{name}' is the {role:?} and cannot be registered as an obstacle")]
    SelfOcclusion { name: String, role: ObjectRole },

    #[error("'{0}' is already registered as an obstacle")]
    DuplicateObstacle(String),

    #[error("the obstacle set is sealed; obstacles can only be added during scene construction")]
    ObstaclesSealed,
}

/// Errors raised by the GPU side of the application.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create a window surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible GPU adapter: {0}")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to open the GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("failed to acquire the next surface texture: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("the surface reports no supported texture formats")]
    NoSurfaceFormat,

    #[error("failed to create render pipelines: {}", .0.join("; "))]
    Pipeline(Vec<String>),
}
