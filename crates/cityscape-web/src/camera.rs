use cityscape_core::constants::{CAMERA_FAR, CAMERA_FOV_DEG, CAMERA_NEAR, CAMERA_Z};
use glam::{Mat4, Vec3, Vec4};
use web_sys as web;

#[inline]
pub fn eye() -> Vec3 {
    Vec3::new(0.0, 0.0, CAMERA_Z)
}

#[inline]
pub fn view_proj(aspect: f32) -> Mat4 {
    let proj = Mat4::perspective_rh(CAMERA_FOV_DEG.to_radians(), aspect.max(1e-3), CAMERA_NEAR, CAMERA_FAR);
    let view = Mat4::look_at_rh(eye(), Vec3::ZERO, Vec3::Y);
    proj * view
}

/// View-projection for the panorama pass. The camera sits at the origin and
/// the stage's yaw/pitch rotate the view, so dragging feels like turning on
/// the spot rather than orbiting.
#[inline]
pub fn panorama_view_proj(aspect: f32, yaw: f32, pitch: f32) -> Mat4 {
    let proj = Mat4::perspective_rh(CAMERA_FOV_DEG.to_radians(), aspect.max(1e-3), CAMERA_NEAR, CAMERA_FAR);
    let rot = Mat4::from_rotation_x(-pitch) * Mat4::from_rotation_y(-yaw);
    proj * rot
}

/// Compute a world-space ray from screen-space canvas coordinates.
///
/// - `canvas`: target canvas to derive dimensions/aspect
/// - `sx`, `sy`: pixel coordinates in the canvas' backing store space
///
/// Returns `(ray_origin, ray_direction)` in world space.
#[inline]
pub fn screen_to_world_ray(canvas: &web::HtmlCanvasElement, sx: f32, sy: f32) -> (Vec3, Vec3) {
    let width = canvas.width() as f32;
    let height = canvas.height() as f32;
    let ndc_x = (2.0 * sx / width.max(1.0)) - 1.0;
    let ndc_y = 1.0 - (2.0 * sy / height.max(1.0));
    let aspect = width / height.max(1.0);
    let inv = view_proj(aspect).inverse();
    let p_far = inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
    let p1: Vec3 = p_far.truncate() / p_far.w;
    let ro = eye();
    let rd = (p1 - ro).normalize();
    (ro, rd)
}
