// Host-side tests for ray picking against the floating widgets.
// The main crate is wasm-only, so we include the pure-Rust module directly.

#![allow(dead_code)]
mod input {
    include!("../src/input.rs");
}

use glam::Vec3;
use input::*;

#[test]
fn ray_hits_a_sphere_straight_on() {
    let t = ray_sphere(
        Vec3::new(0.0, 0.0, 15.0),
        Vec3::new(0.0, 0.0, -1.0),
        Vec3::ZERO,
        1.5,
    );
    assert!((t.unwrap() - 13.5).abs() < 1e-4);
}

#[test]
fn ray_misses_offset_and_behind_spheres() {
    let origin = Vec3::new(0.0, 0.0, 15.0);
    let dir = Vec3::new(0.0, 0.0, -1.0);
    assert_eq!(ray_sphere(origin, dir, Vec3::new(5.0, 0.0, 0.0), 1.0), None);
    // A sphere behind the ray origin must not report a negative hit.
    assert_eq!(ray_sphere(Vec3::ZERO, Vec3::Z, Vec3::new(0.0, 0.0, -5.0), 1.0), None);
}

#[test]
fn glancing_ray_still_picks_within_the_radius() {
    let origin = Vec3::new(0.0, 0.0, 15.0);
    let center = Vec3::new(0.0, 0.0, 5.0);
    let dir = (center + Vec3::new(1.9, 0.0, 0.0) - origin).normalize();
    let hit = pick_widget(origin, dir, &[(WidgetKind::ViewButton, center, 2.0)]);
    assert_eq!(hit, Some(WidgetKind::ViewButton));

    let outside = (center + Vec3::new(2.6, 0.0, 0.0) - origin).normalize();
    assert_eq!(pick_widget(origin, outside, &[(WidgetKind::ViewButton, center, 2.0)]), None);
}

#[test]
fn nearest_widget_wins_an_overlap() {
    let targets = [
        (WidgetKind::Home, Vec3::new(0.0, 0.0, -10.0), 2.0),
        (WidgetKind::ViewButton, Vec3::new(0.0, 0.0, -5.0), 2.0),
    ];
    let hit = pick_widget(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), &targets);
    assert_eq!(hit, Some(WidgetKind::ViewButton));
}

#[test]
fn empty_targets_and_clean_misses_return_none() {
    assert_eq!(pick_widget(Vec3::ZERO, Vec3::Z, &[]), None);
    let targets = [(WidgetKind::Clock, Vec3::new(8.0, 6.0, 5.0), 1.2)];
    let hit = pick_widget(Vec3::new(0.0, 0.0, 15.0), Vec3::new(0.0, 0.0, -1.0), &targets);
    assert_eq!(hit, None);
}

#[test]
fn scene_layout_widgets_do_not_shadow_each_other() {
    // The three widgets at their scene positions and pick radii.
    let origin = Vec3::new(0.0, 0.0, 15.0);
    let targets = [
        (WidgetKind::ViewButton, Vec3::new(0.0, 0.0, 5.0), 2.0),
        (WidgetKind::Home, Vec3::new(-8.0, 6.0, 5.0), 1.0),
        (WidgetKind::Clock, Vec3::new(8.0, 6.0, 5.0), 1.2),
    ];
    for (kind, center, _) in targets {
        let dir = (center - origin).normalize();
        assert_eq!(pick_widget(origin, dir, &targets), Some(kind));
    }
}
