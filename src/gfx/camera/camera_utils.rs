use cgmath::{Matrix4, SquareMatrix};

pub trait Camera: Sized {
    fn build_view_matrix(&self) -> Matrix4<f32>;
    fn build_projection_matrix(&self) -> Matrix4<f32>;

    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        self.build_projection_matrix() * self.build_view_matrix()
    }
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq)]
pub struct CameraUniform {
    /// The eye position of the camera in homogenous coordinates.
    ///
    /// Homogenous coordinates are used to fullfill the 16 byte alignment requirement.
    pub view_position: [f32; 4],

    /// Contains the view projection matrix.
    pub view_proj: [[f32; 4]; 4],

    /// World-to-view matrix, used to shade by view-space normals.
    pub view: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: convert_matrix4_to_array(Matrix4::identity()),
            view: convert_matrix4_to_array(Matrix4::identity()),
        }
    }
}

pub fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    matrix4.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    #[test]
    fn matrix_array_is_column_major() {
        let translation = Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0));
        let array = convert_matrix4_to_array(translation);
        assert_eq!(array[3], [1.0, 2.0, 3.0, 1.0]);
    }
}
