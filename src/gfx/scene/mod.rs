//! # Scene Management Module
//!
//! Objects, lights, materials and the obstacle set the camera avoids.
//!
//! ## Key Components
//!
//! - [`Scene`] - Container that owns objects, lights, materials and obstacles
//! - [`Object`] - One or more meshes moved by a single transform
//! - [`ObstacleSet`] - Ordered, sealable registry of occluders
//! - [`SceneBuilder`] - Builds the level from a [`SceneLayout`](crate::config::SceneLayout)
//! - [`Vertex3D`] - Vertex layout shared by all meshes
//!
//! ## Usage
//!
//! ```rust
//! use obstacle_cam::config::SceneLayout;
//! use obstacle_cam::gfx::scene::SceneBuilder;
//!
//! let layout = SceneLayout::default();
//! let built = SceneBuilder::new(&layout).build().unwrap();
//! assert_eq!(built.scene.obstacles().len(), layout.walls.len());
//! ```

pub mod builder;
pub mod light;
pub mod object;
pub mod obstacles;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use builder::{BuiltScene, SceneBuilder};
pub use light::{AmbientLight, PointLight};
pub use object::{DrawObject, Mesh, Object, ObjectId, ObjectRole};
pub use obstacles::ObstacleSet;
pub use scene::{Scene, SceneStatistics};
pub use vertex::Vertex3D;
