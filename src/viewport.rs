//! Keeps the camera projection and the render target in step with the window.

use crate::gfx::camera::OrbitCamera;

/// Device pixel ratios above this are clamped to keep fill cost bounded on
/// very dense displays.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Something that renders at a logical size scaled by a pixel ratio.
pub trait ResizeTarget {
    /// Logical (pre-scaling) size in pixels
    fn set_size(&mut self, width: u32, height: u32);
    fn set_pixel_ratio(&mut self, ratio: f32);
    fn size(&self) -> (u32, u32);
    fn pixel_ratio(&self) -> f32;
}

/// Clamps a reported device pixel ratio into `(0, MAX_PIXEL_RATIO]`.
pub fn capped_pixel_ratio(device_pixel_ratio: f32) -> f32 {
    if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio.min(MAX_PIXEL_RATIO)
    } else {
        1.0
    }
}

/// Applies a new logical viewport size.
///
/// Returns false, changing nothing, for a zero-area size (e.g. a minimized window).
pub fn handle_resize<T: ResizeTarget + ?Sized>(
    camera: &mut OrbitCamera,
    target: &mut T,
    width: u32,
    height: u32,
    device_pixel_ratio: f32,
) -> bool {
    if width == 0 || height == 0 {
        log::debug!("ignoring zero-area resize {width}x{height}");
        return false;
    }

    camera.resize_projection(width, height);
    target.set_size(width, height);
    target.set_pixel_ratio(capped_pixel_ratio(device_pixel_ratio));
    log::debug!(
        "viewport resized to {width}x{height} at pixel ratio {}",
        target.pixel_ratio()
    );
    true
}
