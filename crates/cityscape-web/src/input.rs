use glam::{Vec2, Vec3};
use web_sys as web;

#[derive(Default, Clone, Copy)]
pub struct MouseState {
    pub x: f32,
    pub y: f32,
    pub down: bool,
}

/// Pickable floating widgets, in their fixed draw order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidgetKind {
    ViewButton,
    Home,
    Clock,
}

#[inline]
pub fn ray_sphere(ray_origin: Vec3, ray_dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray_origin - center;
    let b = oc.dot(ray_dir);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    (t >= 0.0).then_some(t)
}

/// Nearest widget under the ray, if any. Targets are `(kind, center, radius)`
/// pick spheres; overlaps resolve to the closest hit.
#[inline]
pub fn pick_widget(
    ray_origin: Vec3,
    ray_dir: Vec3,
    targets: &[(WidgetKind, Vec3, f32)],
) -> Option<WidgetKind> {
    let mut best: Option<(WidgetKind, f32)> = None;
    for (kind, center, radius) in targets {
        if let Some(t) = ray_sphere(ray_origin, ray_dir, *center, *radius) {
            match best {
                Some((_, bt)) if t >= bt => {}
                _ => best = Some((*kind, t)),
            }
        }
    }
    best.map(|(k, _)| k)
}

// ---------------- Pointer helpers ----------------
#[inline]
pub fn mouse_canvas_px(ev: &web::MouseEvent, canvas: &web::HtmlCanvasElement) -> Vec2 {
    let rect = canvas.get_bounding_client_rect();
    let x_css = ev.client_x() as f32 - rect.left() as f32;
    let y_css = ev.client_y() as f32 - rect.top() as f32;
    let sx = (x_css / rect.width().max(1.0) as f32) * canvas.width() as f32;
    let sy = (y_css / rect.height().max(1.0) as f32) * canvas.height() as f32;
    Vec2::new(sx, sy)
}

#[inline]
pub fn first_touch_client_xy(ev: &web::TouchEvent) -> Option<Vec2> {
    let touch = ev.touches().get(0)?;
    Some(Vec2::new(touch.client_x() as f32, touch.client_y() as f32))
}
