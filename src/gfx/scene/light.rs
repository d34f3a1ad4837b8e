//! Scene light sources.

use cgmath::Vector3;

/// Uniform light applied to every surface regardless of orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

impl AmbientLight {
    pub fn new(color: [f32; 3], intensity: f32) -> Self {
        Self { color, intensity }
    }

    /// Color premultiplied by intensity, as the shader consumes it.
    pub fn radiance(&self) -> [f32; 3] {
        self.color.map(|c| c * self.intensity)
    }
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self::new([1.0, 1.0, 1.0], 0.0)
    }
}

/// Omnidirectional light without distance falloff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vector3<f32>,
    pub color: [f32; 3],
    pub intensity: f32,
}

impl PointLight {
    pub fn new(position: Vector3<f32>, color: [f32; 3], intensity: f32) -> Self {
        Self {
            position,
            color,
            intensity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambient_radiance_scales_color() {
        let ambient = AmbientLight::new([1.0, 0.5, 0.0], 0.5);
        assert_eq!(ambient.radiance(), [0.5, 0.25, 0.0]);
    }
}
